use std::fmt::Write as _;
use std::io::Write;

use svg::node::element::{Circle, Line, Polyline, Rectangle, Style};
use svg::Document;

use crate::{
    model::{OptimizedMap, Point},
    parse,
    pipe::Pipe,
    Error,
};

/// Terminal stage turning an [`OptimizedMap`] into SVG markup. Purely a
/// formatter: one style class per color, `<line>`/`<polyline>` per
/// polyline, `<circle>` per singleton, one filled `<rect>` per square.
/// Stations are passed through the map, not drawn here.
#[derive(Debug)]
pub struct WriteSvg<W> {
    writer: W,
    line_size: f32,
}

impl<W> WriteSvg<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            line_size: 1.0,
        }
    }

    pub fn with_line_size(writer: W, line_size: f32) -> Self {
        Self { writer, line_size }
    }
}

impl<W> Pipe for WriteSvg<W>
where
    W: Write,
{
    type Input = OptimizedMap;

    type Output = ();

    type Error = Error;

    fn process(&mut self, input: Self::Input) -> Result<Option<Self::Output>, Self::Error> {
        let size = i32::from(input.map_size);
        let mut document = Document::new().set("viewBox", (0, 0, size, size));
        document = document.add(Style::new(stylesheet(&input, self.line_size)));

        for (index, (color, bundle)) in input.shapes.iter().enumerate() {
            let class = format!("c{index}");
            let fill = css_color(color);

            for line in &bundle.lines {
                document = match line.as_slice() {
                    [] => document,
                    &[a, b] => document.add(
                        Line::new()
                            .set("class", class.clone())
                            .set("x1", i32::from(a.x))
                            .set("y1", i32::from(a.y))
                            .set("x2", i32::from(b.x))
                            .set("y2", i32::from(b.y)),
                    ),
                    points => document.add(
                        Polyline::new()
                            .set("class", class.clone())
                            .set("points", points_attr(points)),
                    ),
                };
            }

            for &point in &bundle.points {
                document = document.add(
                    Circle::new()
                        .set("cx", i32::from(point.x))
                        .set("cy", i32::from(point.y))
                        .set("r", 1)
                        .set("fill", fill.clone()),
                );
            }

            for exterior in &bundle.squares.exterior {
                let (Some(&corner), Some(&far)) = (exterior.first(), exterior.last()) else {
                    continue;
                };
                let width = f32::from(far.x - corner.x) + 1.0;
                document = document.add(
                    Rectangle::new()
                        .set("x", f32::from(corner.x) - 0.5)
                        .set("y", f32::from(corner.y) - 0.5)
                        .set("width", width)
                        .set("height", width)
                        .set("fill", fill.clone()),
                );
            }
        }

        info!(
            colors = input.shapes.len(),
            map_size = input.map_size,
            "writing svg markup"
        );
        svg::write(&mut self.writer, &document)?;
        Ok(Some(()))
    }
}

fn stylesheet(map: &OptimizedMap, line_size: f32) -> String {
    let mut css = format!(
        "line, polyline {{ stroke-width: {line_size}; fill: none; \
         stroke-linecap: round; stroke-linejoin: round; }}"
    );
    for (index, color) in map.shapes.keys().enumerate() {
        let _ = write!(css, " .c{index} {{ stroke: {} }}", css_color(color));
    }
    css
}

fn css_color(key: &str) -> String {
    match parse::color_rgb(key) {
        Some(rgb) => format!("#{:02x}{:02x}{:02x}", rgb.r, rgb.g, rgb.b),
        None => format!("#{key}"),
    }
}

fn points_attr(points: &[Point]) -> String {
    let mut attr = String::new();
    for point in points {
        if !attr.is_empty() {
            attr.push(' ');
        }
        let _ = write!(attr, "{},{}", point.x, point.y);
    }
    attr
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::model::{ShapeBundle, Squares};

    fn render(map: OptimizedMap) -> String {
        let mut buffer = Vec::new();
        WriteSvg::new(&mut buffer)
            .process(map)
            .expect("write svg")
            .expect("one document");
        String::from_utf8(buffer).expect("utf8 markup")
    }

    #[test]
    fn emits_primitives_and_classes() {
        let mut shapes = BTreeMap::new();
        shapes.insert(
            "0896d7".to_string(),
            ShapeBundle {
                lines: vec![
                    vec![Point::new(1, 1), Point::new(4, 1)],
                    vec![Point::new(1, 2), Point::new(2, 1), Point::new(3, 2)],
                ],
                points: vec![Point::new(9, 9)],
                squares: Squares {
                    exterior: vec![vec![
                        Point::new(10, 10),
                        Point::new(10, 12),
                        Point::new(12, 10),
                        Point::new(12, 12),
                    ]],
                    interior: vec![vec![Point::new(11, 11)]],
                },
            },
        );
        let markup = render(OptimizedMap {
            shapes,
            stations: Vec::new(),
            map_size: 80,
        });

        assert!(markup.contains("viewBox=\"0 0 80 80\""));
        assert!(markup.contains(".c0 { stroke: #0896d7 }"));
        assert!(markup.contains("<line"));
        assert!(markup.contains("<polyline"));
        assert!(markup.contains("points=\"1,2 2,1 3,2\""));
        assert!(markup.contains("<circle"));
        assert!(markup.contains("<rect"));
        assert!(markup.contains("width=\"3\""));
    }

    #[test]
    fn line_size_flows_into_stylesheet() {
        let mut buffer = Vec::new();
        WriteSvg::with_line_size(&mut buffer, 2.5)
            .process(OptimizedMap {
                shapes: BTreeMap::new(),
                stations: Vec::new(),
                map_size: 80,
            })
            .expect("write svg")
            .expect("one document");
        let markup = String::from_utf8(buffer).expect("utf8 markup");
        assert!(markup.contains("stroke-width: 2.5"));
    }

    #[test]
    fn empty_map_is_still_a_document() {
        let markup = render(OptimizedMap {
            shapes: BTreeMap::new(),
            stations: Vec::new(),
            map_size: 80,
        });
        assert!(markup.contains("<svg"));
        assert!(markup.contains("</svg>"));
    }
}
