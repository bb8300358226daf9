use serde::Serialize;

use crate::config::ShapeSettings;
use crate::grid::Grid;

pub const PUZZLE_SEED: u32 = 0x5EED_2520;
pub const CURVE_POINTS: usize = 10;

const SALT_FLIP: u32 = 0;
const SALT_B: u32 = 1;
const SALT_C: u32 = 2;
const SALT_D: u32 = 3;
const SALT_E: u32 = 4;
const LEAD_IN_SEGMENT: u32 = 0xFFFF_FFFF;

pub fn splitmix32(mut value: u32) -> u32 {
    value = value.wrapping_add(0x9E37_79B9);
    let mut z = value;
    z = (z ^ (z >> 16)).wrapping_mul(0x85EB_CA6B);
    z = (z ^ (z >> 13)).wrapping_mul(0xC2B2_AE35);
    z ^ (z >> 16)
}

/// Uniform value in `[0, 1)` derived from `seed` and `salt`.
pub fn rand_unit(seed: u32, salt: u32) -> f32 {
    let mixed = splitmix32(seed ^ splitmix32(salt));
    let top = mixed >> 8;
    top as f32 / ((1u32 << 24) as f32)
}

pub fn rand_range(seed: u32, salt: u32, min: f32, max: f32) -> f32 {
    min + (max - min) * rand_unit(seed, salt)
}

pub fn puzzle_seed(puzzle_id: u32) -> u32 {
    splitmix32(PUZZLE_SEED ^ puzzle_id)
}

pub fn segment_seed(base: u32, axis: Axis, line: u32, segment: u32) -> u32 {
    splitmix32(
        base ^ axis.index().wrapping_mul(0x9E37_79B9)
            ^ line.wrapping_mul(0x85EB_CA6B)
            ^ segment.wrapping_mul(0xC2B2_AE35),
    )
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Axis {
    /// Lines of constant y, running left to right.
    Horizontal,
    /// Lines of constant x, running top to bottom.
    Vertical,
}

impl Axis {
    fn index(self) -> u32 {
        match self {
            Axis::Horizontal => 0,
            Axis::Vertical => 1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct EdgeParams {
    pub flip: bool,
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
}

/// Normalized control point: `along` is the fraction of the segment length,
/// `lateral` the offset across the line as a fraction of the same length.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CurvePoint {
    pub along: f32,
    pub lateral: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EdgeCurve {
    pub params: EdgeParams,
    /// Three cubic spans: `0..=3`, `3..=6`, `6..=9`. Lateral values already
    /// carry the flip sign; positive points towards increasing y (horizontal
    /// lines) or increasing x (vertical lines).
    pub points: [CurvePoint; CURVE_POINTS],
}

impl EdgeCurve {
    pub fn from_params(params: EdgeParams, tab_size: f32) -> Self {
        let EdgeParams { a, b, c, d, e, .. } = params;
        let t = tab_size;
        let raw = [
            (0.0, 0.0),
            (0.2, a),
            (0.5 + b + d, -t + c),
            (0.5 - t + b, t + c),
            (0.5 - 2.0 * t + b - d, 3.0 * t + c),
            (0.5 + 2.0 * t + b - d, 3.0 * t + c),
            (0.5 + t + b, t + c),
            (0.5 + b + d, -t + c),
            (0.8, e),
            (1.0, 0.0),
        ];
        let sign = if params.flip { -1.0 } else { 1.0 };
        let points = raw.map(|(along, lateral)| CurvePoint {
            along,
            lateral: lateral * sign,
        });
        Self { params, points }
    }

    /// Tab direction relative to the line's positive side.
    pub fn tab_sign(&self) -> f32 {
        if self.params.flip {
            -1.0
        } else {
            1.0
        }
    }
}

/// Immutable per-puzzle snapshot of every interior edge curve. Both pieces
/// touching a segment read the same curve out of it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EdgeMap {
    pub grid: Grid,
    /// `horizontal[line - 1][col]` is the curve between rows `line - 1` and `line`.
    horizontal: Vec<Vec<EdgeCurve>>,
    /// `vertical[line - 1][row]` is the curve between columns `line - 1` and `line`.
    vertical: Vec<Vec<EdgeCurve>>,
}

impl EdgeMap {
    /// Settings are expected to be validated already; see
    /// [`ShapeSettings::validate`].
    pub fn generate(puzzle_id: u32, grid: Grid, settings: &ShapeSettings) -> Self {
        let base = puzzle_seed(puzzle_id);
        let build_axis = |axis: Axis| {
            (1..grid.size)
                .map(|line| build_line(base, axis, line, grid.size, settings))
                .collect::<Vec<_>>()
        };
        Self {
            grid,
            horizontal: build_axis(Axis::Horizontal),
            vertical: build_axis(Axis::Vertical),
        }
    }

    /// `line` is the grid line index (`0..=size`); border lines have no curve.
    pub fn curve(&self, axis: Axis, line: u32, segment: u32) -> Option<&EdgeCurve> {
        if line == 0 {
            return None;
        }
        let lines = match axis {
            Axis::Horizontal => &self.horizontal,
            Axis::Vertical => &self.vertical,
        };
        lines
            .get((line - 1) as usize)
            .and_then(|segments| segments.get(segment as usize))
    }

    pub fn line(&self, axis: Axis, line: u32) -> Option<&[EdgeCurve]> {
        if line == 0 {
            return None;
        }
        let lines = match axis {
            Axis::Horizontal => &self.horizontal,
            Axis::Vertical => &self.vertical,
        };
        lines.get((line - 1) as usize).map(Vec::as_slice)
    }

    pub fn curves(&self) -> impl Iterator<Item = (Axis, u32, u32, &EdgeCurve)> + '_ {
        walk_axis(Axis::Horizontal, &self.horizontal)
            .chain(walk_axis(Axis::Vertical, &self.vertical))
    }
}

fn walk_axis(
    axis: Axis,
    lines: &[Vec<EdgeCurve>],
) -> impl Iterator<Item = (Axis, u32, u32, &EdgeCurve)> + '_ {
    lines.iter().enumerate().flat_map(move |(line, segments)| {
        segments
            .iter()
            .enumerate()
            .map(move |(segment, curve)| (axis, line as u32 + 1, segment as u32, curve))
    })
}

fn build_line(base: u32, axis: Axis, line: u32, segments: u32, settings: &ShapeSettings) -> Vec<EdgeCurve> {
    let j = settings.jitter;
    let lead_in = segment_seed(base, axis, line, LEAD_IN_SEGMENT);
    let mut flip = rand_unit(lead_in, SALT_FLIP) < 0.5;
    let mut trailing = rand_range(lead_in, SALT_E, -j, j);
    let mut curves = Vec::with_capacity(segments as usize);
    for segment in 0..segments {
        let seed = segment_seed(base, axis, line, segment);
        let previous_flip = flip;
        flip = rand_unit(seed, SALT_FLIP) < 0.5;
        // Mirror the previous trailing shoulder through the joint so the
        // line stays tangent-continuous once the flip signs are applied.
        let a = if flip == previous_flip { -trailing } else { trailing };
        let params = EdgeParams {
            flip,
            a,
            b: rand_range(seed, SALT_B, -j, j),
            c: rand_range(seed, SALT_C, -j, j),
            d: rand_range(seed, SALT_D, -j, j),
            e: rand_range(seed, SALT_E, -j, j),
        };
        trailing = params.e;
        curves.push(EdgeCurve::from_params(params, settings.tab_size));
    }
    curves
}
