use super::Pipe;
use crate::Error;

/// Duplicates each item so one copy can be consumed by a side channel
/// (see [`ConsumeLeft`]) while the other continues down the chain.
#[derive(Debug)]
pub struct CloneSplit<T>(std::marker::PhantomData<T>);

impl<T> CloneSplit<T> {
    pub fn new() -> Self {
        Self(std::marker::PhantomData)
    }
}

impl<T> Default for CloneSplit<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Pipe for CloneSplit<T>
where
    T: Clone,
{
    type Input = T;

    type Output = (T, T);

    type Error = Error;

    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>, Self::Error> {
        Ok(Some((input.clone(), input)))
    }
}

/// Feeds the left half of a pair into a terminal consumer and forwards the
/// right half.
#[derive(Debug)]
pub struct ConsumeLeft<C, T> {
    consumer: C,
    _s: std::marker::PhantomData<T>,
}

impl<C, T> ConsumeLeft<C, T> {
    pub fn new(consumer: C) -> Self {
        Self {
            consumer,
            _s: std::marker::PhantomData,
        }
    }
}

impl<C, T> Pipe for ConsumeLeft<C, T>
where
    C: Pipe<Output = ()>,
{
    type Input = (C::Input, T);

    type Output = T;

    type Error = C::Error;

    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>, Self::Error> {
        self.consumer.process(input.0)?;
        Ok(Some(input.1))
    }

    fn close(&mut self) {
        self.consumer.close()
    }
}
