use crate::{
    cluster::ColorClusters,
    model::{Budget, ColorKey, Point, ShapeBundle},
    pipe::Pipe,
    Error,
};

/// A color with its full shape bundle populated; what the stitch and
/// reduce passes operate on.
#[derive(Debug, Clone)]
pub struct ColorShapes {
    pub color: ColorKey,
    pub bundle: ShapeBundle,
}

/// Walks each cluster peeling off maximal adjacency chains; a chain of one
/// becomes a singleton point. Growth is greedy and never backtracks: the
/// first adjacent point in pool order wins. Quadratic per cluster, which
/// the bounded coordinate domain keeps affordable.
#[derive(Debug, Default)]
pub struct LineDecomposer {
    budget: Budget,
}

impl LineDecomposer {
    pub fn with_budget(budget: Budget) -> Self {
        Self { budget }
    }
}

impl Pipe for LineDecomposer {
    type Input = ColorClusters;
    type Output = ColorShapes;

    type Error = Error;

    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>, Self::Error> {
        let ColorClusters {
            color,
            mut bundle,
            clusters,
        } = input;

        for cluster in clusters {
            decompose_cluster(cluster, &mut bundle, &mut self.budget)?;
        }

        trace!(
            color = %color,
            lines = bundle.lines.len(),
            singletons = bundle.points.len(),
            "decomposed clusters"
        );

        Ok(Some(ColorShapes { color, bundle }))
    }
}

/// Splits one connected cluster into chains and singletons; every cluster
/// point lands in exactly one of the two.
pub fn decompose_cluster(
    cluster: Vec<Point>,
    bundle: &mut ShapeBundle,
    budget: &mut Budget,
) -> Result<(), Error> {
    let mut pool = cluster;
    pool.sort_unstable();

    while !pool.is_empty() {
        let mut chain = vec![pool.remove(0)];
        loop {
            budget.spend(pool.len() as u64 + 1)?;
            let tail = chain[chain.len() - 1];
            let Some(found) = pool.iter().position(|p| tail.is_adjacent(*p)) else {
                break;
            };
            chain.push(pool.remove(found));
        }

        if chain.len() == 1 {
            bundle.points.push(chain[0]);
        } else {
            bundle.lines.push(chain);
        }
    }

    Ok(())
}
