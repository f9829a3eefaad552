use crate::{chains::ColorShapes, model::Point, pipe::Pipe, Error};

/// Extends lines whose start or end sits next to another line's endpoint,
/// so junctions render as one joined stroke instead of visibly disjoint
/// fragments.
///
/// Best effort and order dependent. Accepted approximation: a line whose
/// endpoint meets another line's interior is left unstitched; only
/// endpoint-to-endpoint contact is considered.
#[derive(Debug, Default)]
pub struct LineStitcher;

impl Pipe for LineStitcher {
    type Input = ColorShapes;
    type Output = ColorShapes;

    type Error = Error;

    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>, Self::Error> {
        let ColorShapes { color, mut bundle } = input;
        stitch(&mut bundle.lines);
        Ok(Some(ColorShapes { color, bundle }))
    }
}

/// Candidates are the pre-stitch endpoint snapshot, and each line's own
/// start/end keep their pre-stitch values while the line grows.
pub fn stitch(lines: &mut [Vec<Point>]) {
    let endings: Vec<Point> = lines
        .iter()
        .flat_map(|line| [line[0], line[line.len() - 1]])
        .collect();

    for line in lines.iter_mut() {
        let start = line[0];
        let end = line[line.len() - 1];

        for &connect in &endings {
            if connect == start || connect == end {
                continue;
            }
            if start.is_adjacent(connect) {
                line.insert(0, connect);
            }
            if end.is_adjacent(connect) {
                line.push(connect);
            }
        }

        // adjacent with itself, diamond style: close the loop; a bare
        // two-point segment has nothing to close
        if line.len() > 2 && start.is_adjacent(end) {
            line.push(start);
        }
    }
}
