use crate::{
    chains::ColorShapes,
    model::{ColorKey, Point, ShapeBundle},
    pipe::Pipe,
    Error,
};

/// Collapses every polyline that is one uniform run into its two
/// endpoints; the renderer draws the straight segment between them, which
/// covers every original cell on the path. Runs last so the full point
/// sequences are still available to the stitcher.
#[derive(Debug, Default)]
pub struct LineReducer;

impl Pipe for LineReducer {
    type Input = ColorShapes;
    type Output = (ColorKey, ShapeBundle);

    type Error = Error;

    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>, Self::Error> {
        let ColorShapes { color, mut bundle } = input;
        for line in &mut bundle.lines {
            *line = reduce_line(std::mem::take(line));
        }
        Ok(Some((color, bundle)))
    }
}

/// `[start, end]` if the whole sequence is purely horizontal, purely
/// vertical, or steps one consistent diagonal direction; otherwise the
/// line comes back untouched. No partial reduction.
pub fn reduce_line(line: Vec<Point>) -> Vec<Point> {
    let (Some(&start), Some(&end)) = (line.first(), line.last()) else {
        return line;
    };

    if line.iter().all(|p| p.x == start.x) || line.iter().all(|p| p.y == start.y) {
        return vec![start, end];
    }

    const DIAGONALS: [(i32, i32); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
    for (dx, dy) in DIAGONALS {
        let consistent = line.windows(2).all(|pair| {
            i32::from(pair[1].x) - i32::from(pair[0].x) == dx
                && i32::from(pair[1].y) - i32::from(pair[0].y) == dy
        });
        if consistent {
            return vec![start, end];
        }
    }

    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn points(raw: &[(u16, u16)]) -> Vec<Point> {
        raw.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[rstest]
    #[case::horizontal(&[(1, 1), (2, 1), (3, 1), (4, 1)], Some((1, 1, 4, 1)))]
    #[case::vertical(&[(2, 5), (2, 4), (2, 3)], Some((2, 5, 2, 3)))]
    #[case::diagonal_se(&[(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)], Some((0, 0, 4, 4)))]
    #[case::diagonal_ne(&[(0, 4), (1, 3), (2, 2)], Some((0, 4, 2, 2)))]
    #[case::already_two_points(&[(1, 1), (2, 2)], Some((1, 1, 2, 2)))]
    #[case::elbow(&[(0, 0), (1, 0), (1, 1)], None)]
    #[case::direction_change(&[(0, 0), (1, 1), (2, 0)], None)]
    fn reduction(#[case] raw: &[(u16, u16)], #[case] reduced: Option<(u16, u16, u16, u16)>) {
        let line = points(raw);
        let result = reduce_line(line.clone());
        match reduced {
            Some((x1, y1, x2, y2)) => {
                assert_eq!(result, vec![Point::new(x1, y1), Point::new(x2, y2)]);
            }
            None => assert_eq!(result, line),
        }
    }

    #[test]
    fn reduced_line_round_trips() {
        // walking unit steps between the endpoints reproduces the cells
        let original = points(&[(0, 4), (1, 3), (2, 2), (3, 1), (4, 0)]);
        let reduced = reduce_line(original.clone());
        assert_eq!(reduced.len(), 2);

        let (start, end) = (reduced[0], reduced[1]);
        let dx = (i32::from(end.x) - i32::from(start.x)).signum();
        let dy = (i32::from(end.y) - i32::from(start.y)).signum();
        let mut walked = vec![start];
        let mut current = start;
        while current != end {
            current = Point::new(
                (i32::from(current.x) + dx) as u16,
                (i32::from(current.y) + dy) as u16,
            );
            walked.push(current);
        }
        assert_eq!(walked, original);
    }
}
