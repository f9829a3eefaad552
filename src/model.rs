use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Highest coordinate value a cell may occupy on either axis. Mirrors the
/// upstream validator's grid bound; anything beyond it is dropped on
/// classification.
pub const MAX_XY: u16 = 359;

/// Canvas sizes the renderer accepts, ascending. The chosen canvas is the
/// smallest entry strictly greater than every coordinate on the map.
pub const ALLOWED_MAP_SIZES: [u16; 6] = [80, 120, 160, 200, 240, 360];

pub const DEFAULT_MAP_SIZE: u16 = 80;

/// Station label orientation codes accepted by the renderer. The first
/// entry doubles as the default for missing or unparsable orientations.
pub const ALLOWED_ORIENTATIONS: [i16; 8] = [0, 45, -45, 90, -90, 135, -135, 180];

/// Hex color key a group of cells is drawn with. Opaque to the optimizer,
/// it only ever groups and orders.
pub type ColorKey = String;

/// One occupied cell on the grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    pub fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Chebyshev-distance-1 adjacency: the two cells differ by at most one
    /// step on each axis and are not the same cell.
    pub fn is_adjacent(self, other: Point) -> bool {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx <= 1 && dy <= 1 && (dx, dy) != (0, 0)
    }

    /// The up-to-eight neighboring cells, skipping offsets that would leave
    /// the non-negative coordinate domain.
    pub fn neighbors(self) -> impl Iterator<Item = Point> {
        const OFFSETS: [(i32, i32); 8] = [
            (0, 1),
            (0, -1),
            (1, 0),
            (-1, 0),
            (1, 1),
            (1, -1),
            (-1, 1),
            (-1, -1),
        ];
        OFFSETS.into_iter().filter_map(move |(dx, dy)| {
            let x = u16::try_from(i32::from(self.x) + dx).ok()?;
            let y = u16::try_from(i32::from(self.y) + dy).ok()?;
            Some(Point { x, y })
        })
    }
}

/// A color's occupied cells plus the per-axis occupancy counts the square
/// extractor prunes with. The counts are maintained by `insert`/`remove`
/// and never mutated independently.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointSet {
    points: BTreeSet<Point>,
    xs: BTreeMap<u16, u32>,
    ys: BTreeMap<u16, u32>,
}

impl PointSet {
    pub fn insert(&mut self, point: Point) -> bool {
        let inserted = self.points.insert(point);
        if inserted {
            *self.xs.entry(point.x).or_insert(0) += 1;
            *self.ys.entry(point.y).or_insert(0) += 1;
        }
        inserted
    }

    pub fn remove(&mut self, point: Point) -> bool {
        let removed = self.points.remove(&point);
        if removed {
            if let Some(count) = self.xs.get_mut(&point.x) {
                *count -= 1;
                if *count == 0 {
                    self.xs.remove(&point.x);
                }
            }
            if let Some(count) = self.ys.get_mut(&point.y) {
                *count -= 1;
                if *count == 0 {
                    self.ys.remove(&point.y);
                }
            }
        }
        removed
    }

    pub fn contains(&self, point: Point) -> bool {
        self.points.contains(&point)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Ascending (x, y) iteration; every downstream ordering leans on this.
    pub fn iter(&self) -> impl Iterator<Item = Point> + '_ {
        self.points.iter().copied()
    }

    /// How many occupied cells share this x coordinate.
    pub fn x_count(&self, x: u16) -> u32 {
        self.xs.get(&x).copied().unwrap_or(0)
    }

    pub fn y_count(&self, y: u16) -> u32 {
        self.ys.get(&y).copied().unwrap_or(0)
    }
}

impl FromIterator<Point> for PointSet {
    fn from_iter<T: IntoIterator<Item = Point>>(iter: T) -> Self {
        let mut set = PointSet::default();
        for point in iter {
            set.insert(point);
        }
        set
    }
}

/// Station metadata, derived once by the classifier and passed through to
/// the renderer untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    pub xy: Point,
    pub color: ColorKey,
    pub orientation: i16,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub transfer: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

/// Outline and filled-interior cell sequences, one pair per detected
/// square.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Squares {
    pub exterior: Vec<Vec<Point>>,
    pub interior: Vec<Vec<Point>>,
}

/// Everything one color draws as. The union of all cells across `lines`,
/// `points` and `squares` reproduces that color's input cells exactly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeBundle {
    pub lines: Vec<Vec<Point>>,
    pub points: Vec<Point>,
    pub squares: Squares,
}

/// Final product of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptimizedMap {
    pub shapes: BTreeMap<ColorKey, ShapeBundle>,
    pub stations: Vec<Station>,
    pub map_size: u16,
}

pub const DEFAULT_STEP_BUDGET: u64 = 20_000_000;

/// Step counter guarding the quadratic passes against pathological inputs.
/// Exhaustion fails the whole run closed instead of truncating shapes.
#[derive(Debug, Clone, Copy)]
pub struct Budget {
    limit: u64,
    spent: u64,
}

impl Default for Budget {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_BUDGET)
    }
}

impl Budget {
    pub fn new(limit: u64) -> Self {
        Self { limit, spent: 0 }
    }

    pub fn spend(&mut self, steps: u64) -> Result<(), crate::Error> {
        self.spent = self.spent.saturating_add(steps);
        if self.spent > self.limit {
            warn!(limit = self.limit, "optimization budget exhausted");
            return Err(crate::Error::BudgetExhausted(self.limit));
        }
        Ok(())
    }
}
