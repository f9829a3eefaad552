use std::collections::{BTreeSet, VecDeque};

use crate::{
    model::{Budget, ColorKey, Point, PointSet, ShapeBundle},
    pipe::Pipe,
    squares::ColorResidual,
    Error,
};

/// A color's residual cells partitioned into maximal 8-connected clusters.
#[derive(Debug, Clone)]
pub struct ColorClusters {
    pub color: ColorKey,
    pub bundle: ShapeBundle,
    pub clusters: Vec<Vec<Point>>,
}

/// Flood-fills the residual point set into connected clusters. The
/// frontier is an explicit queue: dense maps produce clusters thousands of
/// cells deep, which must not translate into call-stack depth.
#[derive(Debug, Default)]
pub struct ClusterWalker {
    budget: Budget,
}

impl ClusterWalker {
    pub fn with_budget(budget: Budget) -> Self {
        Self { budget }
    }
}

impl Pipe for ClusterWalker {
    type Input = ColorResidual;
    type Output = ColorClusters;

    type Error = Error;

    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>, Self::Error> {
        let ColorResidual {
            color,
            bundle,
            residual,
        } = input;

        let clusters = connected_clusters(&residual, &mut self.budget)?;
        trace!(color = %color, clusters = clusters.len(), "walked components");

        Ok(Some(ColorClusters {
            color,
            bundle,
            clusters,
        }))
    }
}

/// Seeds are taken in ascending (x, y) order so cluster discovery, and
/// with it every downstream ordering, is reproducible.
pub fn connected_clusters(
    points: &PointSet,
    budget: &mut Budget,
) -> Result<Vec<Vec<Point>>, Error> {
    let mut visited: BTreeSet<Point> = BTreeSet::new();
    let mut clusters = Vec::new();

    for seed in points.iter() {
        if !visited.insert(seed) {
            continue;
        }

        let mut cluster = vec![seed];
        let mut frontier = VecDeque::from([seed]);
        while let Some(current) = frontier.pop_front() {
            budget.spend(8)?;
            for neighbor in current.neighbors() {
                if points.contains(neighbor) && visited.insert(neighbor) {
                    cluster.push(neighbor);
                    frontier.push_back(neighbor);
                }
            }
        }
        clusters.push(cluster);
    }

    Ok(clusters)
}
