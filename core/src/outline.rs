use std::fmt::Write;

use serde::Serialize;

use crate::edge::{Axis, CurvePoint, EdgeCurve, EdgeMap, CURVE_POINTS};
use crate::grid::{Cell, DIR_DOWN, DIR_LEFT, DIR_RIGHT, DIR_UP};

pub type Point = (f32, f32);

pub const FLATTEN_STEPS_DEFAULT: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum Span {
    Line { to: Point },
    Cubic { c1: Point, c2: Point, to: Point },
}

impl Span {
    pub fn end(&self) -> Point {
        match *self {
            Span::Line { to } => to,
            Span::Cubic { to, .. } => to,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum SideKind {
    Border,
    Interior { axis: Axis, line: u32, segment: u32 },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Side {
    pub kind: SideKind,
    pub spans: Vec<Span>,
    /// Curve points in traversal order; `along` stays the line parameter and
    /// `lateral` is positive away from the piece. Empty on border sides.
    pub profile: Vec<CurvePoint>,
}

/// Closed piece boundary in piece-local coordinates, starting at `(0, 0)`
/// and running top, right, bottom, left.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PieceOutline {
    pub cell: Cell,
    pub unit: f32,
    pub sides: [Side; 4],
}

struct SideFrame {
    axis: Axis,
    line: u32,
    segment: u32,
    reversed: bool,
    outward: f32,
    corner: Point,
    place: fn(CurvePoint, f32) -> Point,
}

fn side_frame(cell: Cell, dir: usize, unit: f32) -> SideFrame {
    match dir {
        DIR_UP => SideFrame {
            axis: Axis::Horizontal,
            line: cell.row,
            segment: cell.col,
            reversed: false,
            outward: -1.0,
            corner: (unit, 0.0),
            place: |p, u| (p.along * u, p.lateral * u),
        },
        DIR_RIGHT => SideFrame {
            axis: Axis::Vertical,
            line: cell.col + 1,
            segment: cell.row,
            reversed: false,
            outward: 1.0,
            corner: (unit, unit),
            place: |p, u| (u + p.lateral * u, p.along * u),
        },
        DIR_DOWN => SideFrame {
            axis: Axis::Horizontal,
            line: cell.row + 1,
            segment: cell.col,
            reversed: true,
            outward: 1.0,
            corner: (0.0, unit),
            place: |p, u| (p.along * u, u + p.lateral * u),
        },
        _ => SideFrame {
            axis: Axis::Vertical,
            line: cell.col,
            segment: cell.row,
            reversed: true,
            outward: -1.0,
            corner: (0.0, 0.0),
            place: |p, u| (p.lateral * u, p.along * u),
        },
    }
}

fn build_side(edges: &EdgeMap, cell: Cell, dir: usize, unit: f32) -> Side {
    let frame = side_frame(cell, dir, unit);
    let Some(curve) = edges.curve(frame.axis, frame.line, frame.segment) else {
        return Side {
            kind: SideKind::Border,
            spans: vec![Span::Line { to: frame.corner }],
            profile: Vec::new(),
        };
    };
    Side {
        kind: SideKind::Interior {
            axis: frame.axis,
            line: frame.line,
            segment: frame.segment,
        },
        spans: curve_spans(curve, &frame, unit),
        profile: curve_profile(curve, &frame),
    }
}

fn ordered_points(curve: &EdgeCurve, reversed: bool) -> [CurvePoint; CURVE_POINTS] {
    let mut points = curve.points;
    if reversed {
        points.reverse();
    }
    points
}

fn curve_spans(curve: &EdgeCurve, frame: &SideFrame, unit: f32) -> Vec<Span> {
    let placed = ordered_points(curve, frame.reversed).map(|p| (frame.place)(p, unit));
    placed[1..]
        .chunks_exact(3)
        .map(|chunk| Span::Cubic {
            c1: chunk[0],
            c2: chunk[1],
            to: chunk[2],
        })
        .collect()
}

fn curve_profile(curve: &EdgeCurve, frame: &SideFrame) -> Vec<CurvePoint> {
    ordered_points(curve, frame.reversed)
        .iter()
        .map(|p| CurvePoint {
            along: p.along,
            lateral: p.lateral * frame.outward,
        })
        .collect()
}

impl PieceOutline {
    pub fn build(edges: &EdgeMap, cell: Cell, unit: f32) -> Self {
        let sides = [DIR_UP, DIR_RIGHT, DIR_DOWN, DIR_LEFT].map(|dir| build_side(edges, cell, dir, unit));
        Self { cell, unit, sides }
    }

    pub fn spans(&self) -> impl Iterator<Item = &Span> + '_ {
        self.sides.iter().flat_map(|side| side.spans.iter())
    }

    pub fn to_svg_path(&self) -> String {
        let mut path = String::from("M 0.000 0.000");
        for span in self.spans() {
            match *span {
                Span::Line { to } => {
                    let _ = write!(path, " L {} {}", fmt_f32(to.0), fmt_f32(to.1));
                }
                Span::Cubic { c1, c2, to } => {
                    let _ = write!(
                        path,
                        " C {} {} {} {} {} {}",
                        fmt_f32(c1.0),
                        fmt_f32(c1.1),
                        fmt_f32(c2.0),
                        fmt_f32(c2.1),
                        fmt_f32(to.0),
                        fmt_f32(to.1)
                    );
                }
            }
        }
        path.push_str(" Z");
        path
    }

    /// Polygon approximation with `steps` samples per cubic span. The closing
    /// vertex is not repeated.
    pub fn flatten(&self, steps: usize) -> Vec<Point> {
        let steps = steps.max(1);
        let mut points = vec![(0.0, 0.0)];
        let mut current = (0.0, 0.0);
        for span in self.spans() {
            match *span {
                Span::Line { to } => points.push(to),
                Span::Cubic { c1, c2, to } => {
                    for step in 1..=steps {
                        let t = step as f32 / steps as f32;
                        points.push(cubic_point(current, c1, c2, to, t));
                    }
                }
            }
            current = span.end();
        }
        if points.len() > 1 && points.last() == points.first() {
            points.pop();
        }
        points
    }

    pub fn contains(&self, local: Point) -> bool {
        point_in_polygon(local, &self.flatten(FLATTEN_STEPS_DEFAULT))
    }
}

pub fn build_outlines(edges: &EdgeMap, unit: f32) -> Vec<PieceOutline> {
    edges
        .grid
        .cells()
        .map(|cell| PieceOutline::build(edges, cell, unit))
        .collect()
}

pub fn cubic_point(p0: Point, p1: Point, p2: Point, p3: Point, t: f32) -> Point {
    let u = 1.0 - t;
    let tt = t * t;
    let uu = u * u;
    let uuu = uu * u;
    let ttt = tt * t;
    (
        uuu * p0.0 + 3.0 * uu * t * p1.0 + 3.0 * u * tt * p2.0 + ttt * p3.0,
        uuu * p0.1 + 3.0 * uu * t * p1.1 + 3.0 * u * tt * p2.1 + ttt * p3.1,
    )
}

fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }
    let (x, y) = point;
    let mut inside = false;
    let mut j = polygon.len() - 1;
    for i in 0..polygon.len() {
        let (xi, yi) = polygon[i];
        let (xj, yj) = polygon[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

pub fn fmt_f32(value: f32) -> String {
    format!("{:.3}", value)
}
