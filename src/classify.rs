use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{
    model::{
        ColorKey, Point, PointSet, Station, ALLOWED_MAP_SIZES, ALLOWED_ORIENTATIONS,
        DEFAULT_MAP_SIZE, MAX_XY,
    },
    parse,
};

/// The normalized grid handed to the optimizer: one record per occupied
/// cell, already resolved from whichever schema version the map was saved
/// in.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MapData {
    pub cells: Vec<RawCell>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCell {
    pub x: i64,
    pub y: i64,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub station: Option<RawStation>,
}

/// Station annotation as it arrives. Orientation is left as raw JSON since
/// saved maps carry it as either a number or a string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawStation {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub orientation: Option<serde_json::Value>,
    #[serde(default)]
    pub transfer: bool,
    #[serde(default)]
    pub style: Option<String>,
}

/// Per-color payload fed into the shape pipeline.
#[derive(Debug, Clone)]
pub struct ColorPoints {
    pub color: ColorKey,
    pub points: PointSet,
}

#[derive(Debug, Clone, Default)]
pub struct ClassifiedMap {
    pub colors: BTreeMap<ColorKey, PointSet>,
    pub stations: Vec<Station>,
    pub map_size: u16,
}

impl ClassifiedMap {
    pub fn into_colors(self) -> impl Iterator<Item = ColorPoints> {
        self.colors
            .into_iter()
            .map(|(color, points)| ColorPoints { color, points })
    }
}

/// Groups occupied cells by color, collects stations, and picks the canvas
/// size. Cells that are out of range, colorless, or keyed by something
/// that is not a hex color are skipped, never an error; the real rejection
/// belongs to upstream validation.
#[derive(Debug, Default)]
pub struct Classifier {
    colors: BTreeMap<ColorKey, PointSet>,
    stations: Vec<Station>,
    highest_seen: u16,
}

impl Classifier {
    pub fn classify(cells: impl IntoIterator<Item = RawCell>) -> ClassifiedMap {
        let mut cells: Vec<RawCell> = cells.into_iter().collect();
        cells.sort_by_key(|cell| (cell.x, cell.y));

        let mut classifier = Classifier::default();
        for cell in cells {
            classifier.absorb(cell);
        }
        classifier.finish()
    }

    fn absorb(&mut self, cell: RawCell) {
        let Some(point) = in_domain(cell.x, cell.y) else {
            trace!(x = cell.x, y = cell.y, "dropping out-of-range cell");
            return;
        };
        if cell.color.is_empty() {
            return;
        }
        if parse::color_rgb(&cell.color).is_none() {
            trace!(color = %cell.color, "dropping cell with unparsable color key");
            return;
        }

        if let Some(station) = cell.station {
            self.stations.push(Station {
                name: station.name,
                xy: point,
                color: cell.color.clone(),
                orientation: parse_orientation(station.orientation.as_ref()),
                transfer: station.transfer,
                style: station.style,
            });
        }

        self.highest_seen = self.highest_seen.max(point.x).max(point.y);
        self.colors.entry(cell.color).or_default().insert(point);
    }

    fn finish(self) -> ClassifiedMap {
        let map_size = ALLOWED_MAP_SIZES
            .iter()
            .copied()
            .find(|&size| self.highest_seen < size)
            .unwrap_or(DEFAULT_MAP_SIZE);

        debug!(
            colors = self.colors.len(),
            stations = self.stations.len(),
            map_size,
            "classified map"
        );

        ClassifiedMap {
            colors: self.colors,
            stations: self.stations,
            map_size,
        }
    }
}

fn in_domain(x: i64, y: i64) -> Option<Point> {
    let x = u16::try_from(x).ok().filter(|&x| x <= MAX_XY)?;
    let y = u16::try_from(y).ok().filter(|&y| y <= MAX_XY)?;
    Some(Point { x, y })
}

/// Missing or unparsable orientations fall back to the first allowed code;
/// this must never fail, whatever the saved map carries.
fn parse_orientation(value: Option<&serde_json::Value>) -> i16 {
    value
        .and_then(|v| {
            v.as_i64()
                .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
        })
        .and_then(|n| i16::try_from(n).ok())
        .unwrap_or(ALLOWED_ORIENTATIONS[0])
}
