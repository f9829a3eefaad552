//! Compresses a sparse per-cell colored metro-map grid into a compact set
//! of vector primitives: polylines, filled squares and singleton points.
//! Per color, the union of the emitted shapes reproduces the occupied
//! cells exactly; the win is output size, not geometry.

#[macro_use]
extern crate tracing;

use std::collections::BTreeMap;
use std::io::Write;

pub mod chains;
pub mod classify;
pub mod cluster;
pub mod model;
pub mod parse;
pub mod pipe;
pub mod reduce;
pub mod ser;
pub mod squares;
pub mod stitch;

use crate::{
    chains::LineDecomposer,
    classify::{Classifier, MapData},
    cluster::ClusterWalker,
    model::{Budget, ColorKey, OptimizedMap, ShapeBundle},
    pipe::{CloneSplit, ConsumeLeft, Pipe, Producer, TryCollector},
    reduce::LineReducer,
    squares::SquareExtractor,
    stitch::LineStitcher,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("optimization step budget of {0} exhausted")]
    BudgetExhausted(u64),
    #[error("failed to write svg markup")]
    SvgWrite(#[from] std::io::Error),
}

/// Runs the whole pipeline: classify cells, peel squares, walk connected
/// components, chain them into lines, stitch and reduce.
pub fn optimize(map: MapData) -> Result<OptimizedMap, Error> {
    optimize_with_budget(map, Budget::default())
}

/// Same as [`optimize`] with a caller-chosen step budget; exhaustion
/// returns [`Error::BudgetExhausted`] instead of running away on
/// pathological input.
pub fn optimize_with_budget(map: MapData, budget: Budget) -> Result<OptimizedMap, Error> {
    let mut classified = Classifier::classify(map.cells);
    let stations = std::mem::take(&mut classified.stations);
    let map_size = classified.map_size;

    let mut pipes = classified
        .into_colors()
        .feed(
            SquareExtractor::with_budget(budget)
                .pipe(ClusterWalker::with_budget(budget))
                .pipe(LineDecomposer::with_budget(budget))
                .pipe(LineStitcher)
                .pipe(LineReducer),
        )
        .producer()
        .feed(TryCollector::new());

    let shapes: BTreeMap<ColorKey, ShapeBundle> = match pipes.produce() {
        Some(shapes) => shapes?,
        None => BTreeMap::new(),
    };

    Ok(OptimizedMap {
        shapes,
        stations,
        map_size,
    })
}

/// Optimizes `map` and writes the SVG rendition to `output`.
pub fn map2svg(map: MapData, output: impl Write) -> Result<(), Error> {
    map2svg_styled(map, output, 1.0)
}

/// Same as [`map2svg`] with a caller-chosen stroke width.
pub fn map2svg_styled(map: MapData, output: impl Write, line_size: f32) -> Result<(), Error> {
    let mut pipes = std::iter::once(optimize(map)?).feed(
        CloneSplit::new().pipe(ConsumeLeft::new(ser::WriteSvg::with_line_size(
            output, line_size,
        ))),
    );

    std::iter::from_fn(|| pipes.produce()).try_for_each(|shapes| shapes.map(drop))
}
