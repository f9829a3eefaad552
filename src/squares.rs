use crate::{
    classify::ColorPoints,
    model::{Budget, ColorKey, Point, PointSet, ShapeBundle},
    pipe::Pipe,
    Error,
};

/// Largest square side worth checking; beyond this the outline/fill split
/// stops paying for itself.
pub const LARGEST_SQUARE: u16 = 6;
pub const SMALLEST_SQUARE: u16 = 3;

/// A color after square extraction: detected squares in `bundle`, every
/// remaining cell in `residual`.
#[derive(Debug, Clone)]
pub struct ColorResidual {
    pub color: ColorKey,
    pub bundle: ShapeBundle,
    pub residual: PointSet,
}

/// Peels solid `w x w` blocks off a color's point set, largest first, so a
/// filled region becomes one primitive instead of a pile of line
/// fragments. Runs before connectivity on purpose: dense terrain would
/// otherwise drown the cluster walk.
#[derive(Debug, Default)]
pub struct SquareExtractor {
    budget: Budget,
}

impl SquareExtractor {
    pub fn with_budget(budget: Budget) -> Self {
        Self { budget }
    }
}

impl Pipe for SquareExtractor {
    type Input = ColorPoints;
    type Output = ColorResidual;

    type Error = Error;

    #[tracing::instrument(skip(self, input), fields(color = %input.color))]
    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>, Self::Error> {
        let ColorPoints { color, mut points } = input;
        let mut bundle = ShapeBundle::default();

        for width in (SMALLEST_SQUARE..=LARGEST_SQUARE).rev() {
            let (exterior, interior) = find_squares(&mut points, width, &mut self.budget)?;
            bundle.squares.exterior.extend(exterior);
            bundle.squares.interior.extend(interior);
        }

        trace!(
            squares = bundle.squares.exterior.len(),
            residual = points.len(),
            "extracted squares"
        );

        Ok(Some(ColorResidual {
            color,
            bundle,
            residual: points,
        }))
    }
}

/// Finds every solid square of side `width` in `points`, removing consumed
/// cells from the set. Returns the outline and interior sequences, one
/// pair per square.
///
/// A coordinate can only sit in such a square if at least `width` cells
/// share its x (resp. y) value, so infeasible candidates are pruned with
/// the set's projection counts before any block is scanned.
pub fn find_squares(
    points: &mut PointSet,
    width: u16,
    budget: &mut Budget,
) -> Result<(Vec<Vec<Point>>, Vec<Vec<Point>>), Error> {
    let feasible = u32::from(width);
    let mut pool: std::collections::BTreeSet<Point> = points
        .iter()
        .filter(|p| points.x_count(p.x) >= feasible && points.y_count(p.y) >= feasible)
        .collect();

    if pool.len() < usize::from(width) * usize::from(width) {
        return Ok((Vec::new(), Vec::new()));
    }

    let mut squares_ext = Vec::new();
    let mut squares_int = Vec::new();

    // Lowest remaining candidate is the block's lower corner; a block is
    // only taken whole, otherwise the candidate advances.
    while let Some(corner) = pool.first().copied() {
        budget.spend(u64::from(width) * u64::from(width))?;

        let mut exterior = Vec::new();
        let mut interior = Vec::new();
        for dx in 0..width {
            for dy in 0..width {
                let cell = Point::new(corner.x + dx, corner.y + dy);
                if dx == 0 || dy == 0 || dx == width - 1 || dy == width - 1 {
                    exterior.push(cell);
                } else {
                    interior.push(cell);
                }
            }
        }

        if exterior
            .iter()
            .chain(interior.iter())
            .all(|cell| pool.contains(cell))
        {
            for cell in exterior.iter().chain(interior.iter()) {
                pool.remove(cell);
                points.remove(*cell);
            }
            squares_ext.push(exterior);
            squares_int.push(interior);
        } else {
            pool.remove(&corner);
        }
    }

    Ok((squares_ext, squares_int))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(x0: u16, y0: u16, w: u16) -> PointSet {
        let mut set = PointSet::default();
        for dx in 0..w {
            for dy in 0..w {
                set.insert(Point::new(x0 + dx, y0 + dy));
            }
        }
        set
    }

    fn extract(points: &mut PointSet) -> (Vec<Vec<Point>>, Vec<Vec<Point>>) {
        let mut budget = Budget::default();
        let mut ext = Vec::new();
        let mut int = Vec::new();
        for width in (SMALLEST_SQUARE..=LARGEST_SQUARE).rev() {
            let (e, i) = find_squares(points, width, &mut budget).expect("budget");
            ext.extend(e);
            int.extend(i);
        }
        (ext, int)
    }

    #[test]
    fn solid_3x3_is_one_square() {
        let mut points = block(10, 10, 3);
        let (ext, int) = extract(&mut points);
        assert_eq!(ext.len(), 1);
        assert_eq!(int.len(), 1);
        assert_eq!(ext[0].len(), 8);
        assert_eq!(int[0], vec![Point::new(11, 11)]);
        assert!(points.is_empty());
    }

    #[test]
    fn larger_widths_win() {
        // 6x6 block: one square of side 6, nothing left for 5..3
        let mut points = block(0, 0, 6);
        let (ext, int) = extract(&mut points);
        assert_eq!(ext.len(), 1);
        assert_eq!(ext[0].len(), 20);
        assert_eq!(int[0].len(), 16);
        assert!(points.is_empty());
    }

    #[test]
    fn partial_block_is_left_alone() {
        let mut points = block(0, 0, 3);
        points.remove(Point::new(1, 1));
        let before = points.clone();
        let (ext, int) = extract(&mut points);
        assert!(ext.is_empty());
        assert!(int.is_empty());
        assert_eq!(points, before);
    }

    #[test]
    fn two_disjoint_squares_same_sweep() {
        let mut points = block(0, 0, 3);
        for p in block(10, 0, 3).iter() {
            points.insert(p);
        }
        let (ext, int) = extract(&mut points);
        assert_eq!(ext.len(), 2);
        assert_eq!(int.len(), 2);
        assert!(points.is_empty());
    }

    #[test]
    fn extraction_is_idempotent() {
        // 4x4 with a tail: the tail stays, rerunning finds nothing new
        let mut points = block(0, 0, 4);
        points.insert(Point::new(9, 9));
        let (ext, _) = extract(&mut points);
        assert_eq!(ext.len(), 1);
        assert_eq!(points.len(), 1);

        let (ext, int) = extract(&mut points);
        assert!(ext.is_empty());
        assert!(int.is_empty());
    }

    #[test]
    fn budget_exhaustion_is_an_error() {
        let mut points = block(0, 0, 6);
        let mut budget = Budget::new(3);
        assert!(matches!(
            find_squares(&mut points, 6, &mut budget),
            Err(Error::BudgetExhausted(3))
        ));
    }
}
