use kumitate_core::edge::Axis;
use kumitate_core::{
    build_outlines, Cell, CurvePoint, EdgeMap, Grid, PieceOutline, PointerInputMapper, ShapeSettings,
    SideKind, Size, Span,
};

const UNIT: f32 = 50.0;

fn edge_map(puzzle_id: u32, size: u32) -> EdgeMap {
    EdgeMap::generate(puzzle_id, Grid::new(size).expect("grid"), &ShapeSettings::default())
}

fn mirrored(profile: &[CurvePoint]) -> Vec<CurvePoint> {
    profile
        .iter()
        .rev()
        .map(|p| CurvePoint {
            along: p.along,
            lateral: -p.lateral,
        })
        .collect()
}

fn global_points(outline: &PieceOutline, side: usize) -> Vec<(f32, f32)> {
    let origin = (outline.cell.col as f32 * UNIT, outline.cell.row as f32 * UNIT);
    let mut points = Vec::new();
    for span in &outline.sides[side].spans {
        match *span {
            Span::Line { to } => points.push(to),
            Span::Cubic { c1, c2, to } => points.extend([c1, c2, to]),
        }
    }
    points
        .into_iter()
        .map(|(x, y)| (origin.0 + x, origin.1 + y))
        .collect()
}

#[test]
fn same_puzzle_id_reproduces_every_control_point() {
    let first = edge_map(314, 6);
    let second = edge_map(314, 6);
    assert_eq!(first, second);
    for ((axis_a, line_a, seg_a, a), (axis_b, line_b, seg_b, b)) in first.curves().zip(second.curves()) {
        assert_eq!((axis_a, line_a, seg_a), (axis_b, line_b, seg_b));
        assert_eq!(a.points, b.points);
    }
    assert_ne!(first, edge_map(315, 6));
}

#[test]
fn horizontal_neighbors_have_complementary_profiles() {
    let map = edge_map(21, 4);
    let outlines = build_outlines(&map, UNIT);
    for row in 0..4 {
        for col in 0..3 {
            let left = &outlines[row * 4 + col];
            let right = &outlines[row * 4 + col + 1];
            assert_eq!(right.sides[3].profile.len(), 10);
            assert_eq!(left.sides[1].profile, mirrored(&right.sides[3].profile));
            assert_eq!(left.sides[1].kind, right.sides[3].kind);
        }
    }
}

#[test]
fn vertical_neighbors_have_complementary_profiles() {
    let map = edge_map(21, 4);
    let outlines = build_outlines(&map, UNIT);
    for row in 0..3 {
        for col in 0..4 {
            let upper = &outlines[row * 4 + col];
            let lower = &outlines[(row + 1) * 4 + col];
            assert_eq!(upper.sides[2].profile, mirrored(&lower.sides[0].profile));
            assert!(matches!(
                upper.sides[2].kind,
                SideKind::Interior {
                    axis: Axis::Horizontal,
                    ..
                }
            ));
        }
    }
}

#[test]
fn shared_sides_trace_the_same_curve_in_place() {
    let map = edge_map(8, 3);
    let a = PieceOutline::build(&map, Cell::new(1, 0), UNIT);
    let b = PieceOutline::build(&map, Cell::new(1, 1), UNIT);
    let a_right = global_points(&a, 1);
    // b's left side runs bottom to top; its points reversed, shifted by the
    // start point it omits, match a's right side.
    let mut b_left = vec![(UNIT, 2.0 * UNIT)];
    b_left.extend(global_points(&b, 3));
    b_left.reverse();
    b_left.remove(0);
    assert_eq!(a_right.len(), b_left.len());
    for (p, q) in a_right.iter().zip(&b_left) {
        assert!((p.0 - q.0).abs() < 1e-3 && (p.1 - q.1).abs() < 1e-3, "{p:?} vs {q:?}");
    }
}

#[test]
fn border_sides_are_straight() {
    let map = edge_map(5, 3);
    let outlines = build_outlines(&map, UNIT);
    let corner = &outlines[8];
    assert_eq!(corner.sides[1].kind, SideKind::Border);
    assert_eq!(corner.sides[2].kind, SideKind::Border);
    assert_eq!(corner.sides[2].spans, vec![Span::Line { to: (0.0, UNIT) }]);
    let centre = &outlines[4];
    assert!(centre
        .sides
        .iter()
        .all(|side| matches!(side.kind, SideKind::Interior { .. })));
}

#[test]
fn tall_container_letterboxes_vertically() {
    let mapper = PointerInputMapper::new(Size::new(150.0, 290.0));
    let container = Size::new(300.0, 600.0);
    let fit = mapper.letterbox(container).expect("letterbox");
    // 300/600 is narrower than 150/290, so the width sets the scale.
    assert_eq!(fit.scale, 0.5);
    assert_eq!((fit.pad_x, fit.pad_y), (0.0, 10.0));
    assert_eq!(mapper.to_logical(container, (100.0, 110.0)), Some((50.0, 50.0)));
    assert_eq!(mapper.to_logical(container, (0.0, 10.0)), Some((0.0, 0.0)));
    assert_eq!(mapper.to_logical(container, (300.0, 590.0)), Some((150.0, 290.0)));
}

#[test]
fn mapping_round_trips_through_raw() {
    let mapper = PointerInputMapper::new(Size::new(200.0, 340.0));
    let container = Size::new(1280.0, 720.0);
    for logical in [(0.0, 0.0), (37.0, 120.0), (200.0, 340.0)] {
        let raw = mapper.to_raw(container, logical).expect("raw");
        let back = mapper.to_logical(container, raw).expect("logical");
        assert!((back.0 - logical.0).abs() < 1e-3);
        assert!((back.1 - logical.1).abs() < 1e-3);
    }
}
