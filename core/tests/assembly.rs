use std::collections::BTreeSet;
use std::time::Duration;

use kumitate_core::{
    solved_layout, Assembly, DragController, EngineConfig, Grid, PieceId, Placement, PointerInputMapper,
    PuzzleSpec, Session, Size, SnapRules,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

const UNIT: f32 = 50.0;

/// Every piece parked well apart, then the listed overrides applied.
fn placements(size: u32, overrides: &[(PieceId, (f32, f32))]) -> Vec<Placement> {
    let grid = Grid::new(size).expect("grid");
    let mut placements = solved_layout(grid, UNIT);
    for (id, placement) in placements.iter_mut().enumerate() {
        placement.position = (2000.0 + id as f32 * 300.0, 2000.0);
    }
    for &(id, position) in overrides {
        placements[id].position = position;
    }
    placements
}

fn assembly(size: u32, overrides: &[(PieceId, (f32, f32))]) -> Assembly {
    let grid = Grid::new(size).expect("grid");
    Assembly::new(grid, &SnapRules::default(), 50, placements(size, overrides)).expect("assembly")
}

fn position(assembly: &Assembly, id: PieceId) -> (f32, f32) {
    assembly.piece(id).map(|piece| piece.position).expect("piece")
}

fn assert_rigid(assembly: &Assembly) {
    for a in assembly.pieces() {
        for b in assembly.pieces() {
            if a.group_id != b.group_id {
                continue;
            }
            let expected = (
                (b.cell.col as f32 - a.cell.col as f32) * UNIT,
                (b.cell.row as f32 - a.cell.row as f32) * UNIT,
            );
            let actual = (b.position.0 - a.position.0, b.position.1 - a.position.1);
            assert_eq!(actual, expected, "pieces {} and {}", a.id, b.id);
        }
    }
}

fn spec(pieces: u32) -> PuzzleSpec {
    PuzzleSpec {
        id: 77,
        piece_count: pieces,
        image_ref: "catalog/lighthouse.jpg".to_string(),
    }
}

#[test]
fn near_release_merges_with_exact_offset() {
    let mut asm = assembly(3, &[(0, (0.0, 0.0)), (1, (52.0, -3.0))]);
    let outcome = asm.attempt_snap(1).expect("known piece");
    assert_eq!(outcome.merges.len(), 1);
    assert_eq!(asm.group_of(0), asm.group_of(1));
    let (p0, p1) = (position(&asm, 0), position(&asm, 1));
    assert_eq!((p1.0 - p0.0, p1.1 - p0.1), (50.0, 0.0));
    assert_rigid(&asm);
}

#[test]
fn snapping_from_the_resting_piece_lands_the_neighbor_on_its_cell() {
    let mut asm = assembly(3, &[(0, (0.0, 0.0)), (1, (52.0, -3.0))]);
    asm.attempt_snap(0).expect("known piece");
    assert_eq!(position(&asm, 0), (0.0, 0.0));
    assert_eq!(position(&asm, 1), (50.0, 0.0));
}

#[test]
fn release_at_exact_threshold_does_not_merge() {
    let mut asm = assembly(3, &[(0, (0.0, 0.0)), (1, (65.0, 0.0))]);
    let outcome = asm.attempt_snap(1).expect("known piece");
    assert!(!outcome.merged());
    assert_ne!(asm.group_of(0), asm.group_of(1));
    assert_eq!(position(&asm, 1), (65.0, 0.0));
    assert_eq!(asm.group_count(), 9);
}

#[test]
fn repeated_snap_changes_nothing() {
    let mut asm = assembly(3, &[(0, (0.0, 0.0)), (1, (48.0, 2.0)), (4, (51.0, 49.0))]);
    asm.attempt_snap(1).expect("known piece");
    let groups: Vec<_> = asm.pieces().iter().map(|p| p.group_id).collect();
    let positions: Vec<_> = asm.pieces().iter().map(|p| p.position).collect();
    let score = asm.score();
    for id in 0..9 {
        let outcome = asm.attempt_snap(id).expect("known piece");
        assert!(!outcome.merged());
    }
    assert_eq!(asm.pieces().iter().map(|p| p.group_id).collect::<Vec<_>>(), groups);
    assert_eq!(asm.pieces().iter().map(|p| p.position).collect::<Vec<_>>(), positions);
    assert_eq!(asm.score(), score);
}

fn drag_pair_into_place(form_with: PieceId) -> (BTreeSet<PieceId>, Vec<(f32, f32)>) {
    // {1, 4} is the resting group; {0, 3} is dragged in next to it.
    let mut asm = assembly(
        3,
        &[(1, (100.0, 0.0)), (4, (100.0, 50.0)), (0, (0.0, 200.0)), (3, (0.0, 250.0))],
    );
    asm.attempt_snap(1).expect("known piece");
    asm.attempt_snap(form_with).expect("known piece");
    assert_eq!(asm.group_count(), 7);

    let mut drag = DragController::new(PointerInputMapper::new(Size::new(100.0, 100.0)));
    let container = Size::new(100.0, 100.0);
    drag.pick_up(&mut asm, 0, container, (10.0, 210.0)).expect("pick up");
    drag.move_to(&mut asm, container, (63.0, 13.0));
    let outcome = drag.release(&mut asm).expect("outcome");
    assert_eq!(outcome.merges.len(), 1);
    assert_rigid(&asm);

    let group = asm.group_of(0).expect("group");
    let members: BTreeSet<PieceId> = asm.members(group).iter().copied().collect();
    let anchor = position(&asm, 1);
    let relative = [0, 1, 3, 4]
        .iter()
        .map(|&id| {
            let p = position(&asm, id);
            (p.0 - anchor.0, p.1 - anchor.1)
        })
        .collect();
    (members, relative)
}

#[test]
fn merge_result_does_not_depend_on_discovery_order() {
    // Forming the dragged pair from either end flips which adjacency
    // (0-1 or 3-4) is tested first.
    let (members_a, relative_a) = drag_pair_into_place(0);
    let (members_b, relative_b) = drag_pair_into_place(3);
    assert_eq!(members_a, BTreeSet::from([0, 1, 3, 4]));
    assert_eq!(members_a, members_b);
    assert_eq!(relative_a, relative_b);
}

#[test]
fn group_released_on_half_units_below_zero_stays_rigid() {
    let mut asm = assembly(3, &[(0, (0.0, 0.0)), (1, (50.0, 0.0))]);
    asm.attempt_snap(1).expect("known piece");
    assert_eq!(asm.group_of(0), asm.group_of(1));

    // Half the viewport's resolution: one raw pixel is half a logical unit.
    let mut drag = DragController::new(PointerInputMapper::new(Size::new(100.0, 100.0)));
    let container = Size::new(200.0, 200.0);
    drag.pick_up(&mut asm, 0, container, (10.0, 10.0)).expect("pick up");
    assert!(drag.move_to(&mut asm, container, (9.0, 9.0)));
    assert_eq!(position(&asm, 0), (-0.5, -0.5));
    assert_eq!(position(&asm, 1), (49.5, -0.5));

    let outcome = drag.release(&mut asm).expect("outcome");
    assert!(!outcome.merged());
    assert_eq!(position(&asm, 0), (-1.0, -1.0));
    assert_eq!(position(&asm, 1), (49.0, -1.0));
    assert_rigid(&asm);
}

#[test]
fn completion_fires_on_the_last_merge_only() {
    let config = EngineConfig::default();
    let layout = placements(2, &[(0, (0.0, 0.0)), (1, (200.0, 0.0)), (2, (0.0, 200.0)), (3, (200.0, 200.0))]);
    let mut session = Session::with_placements(spec(4), config, layout).expect("session");
    let container = session.viewport();
    assert_eq!(container, Size::new(100.0, 240.0));

    session.advance(Duration::from_secs(30));

    let drag_to = |session: &mut Session, from: (f32, f32), to: (f32, f32)| {
        session.pointer_down(container, from).expect("down").expect("hit");
        assert!(session.pointer_move(container, to));
        session.pointer_up().expect("report")
    };

    let first = drag_to(&mut session, (225.0, 25.0), (75.0, 25.0));
    assert!(first.outcome.merged());
    assert!(first.completion.is_none());
    assert_eq!(session.assembly().group_count(), 3);

    let second = drag_to(&mut session, (25.0, 225.0), (25.0, 75.0));
    assert!(second.completion.is_none());
    assert_eq!(session.assembly().group_count(), 2);
    assert!(session.completion().is_none());

    let last = drag_to(&mut session, (225.0, 225.0), (75.0, 75.0));
    // The resting three-piece group is absorbed in one step.
    assert_eq!(last.outcome.merges.len(), 1);
    let event = last.completion.expect("completion");
    assert!(session.is_complete());
    assert_eq!(event.elapsed_seconds, 30);
    assert_eq!(event.bonus, 440);
    assert_eq!(event.final_score, 150 + 440);
    assert_eq!(event.awarded_points, 59);
    assert_eq!(session.completion(), Some(event));

    session.advance(Duration::from_secs(10));
    assert_eq!(session.elapsed_seconds(), 30);
    assert_rigid(session.assembly());

    let json = serde_json::to_value(event).expect("json");
    assert_eq!(json["awarded_points"], 59);
    assert_eq!(json["final_score"], 590);
}

#[test]
fn cancelled_pointer_still_releases_and_snaps() {
    let layout = placements(2, &[(0, (0.0, 0.0)), (1, (200.0, 0.0))]);
    let mut session = Session::with_placements(spec(4), EngineConfig::default(), layout).expect("session");
    let container = session.viewport();
    assert_eq!(session.pointer_down(container, (225.0, 25.0)).expect("down"), Some(1));
    assert!(session.pointer_move(container, (78.2, 26.9)));
    let report = session.pointer_cancel().expect("report");
    assert!(report.outcome.merged());
    assert!(!session.is_dragging());
    assert_eq!(position(session.assembly(), 0), (3.0, 2.0));
    assert_eq!(session.score(), 50);
    assert!(session.pointer_cancel().is_none());
}

#[test]
fn scattered_session_starts_fully_separate() {
    let mut rng = StdRng::seed_from_u64(2024);
    let session = Session::new(spec(16), EngineConfig::default(), &mut rng).expect("session");
    assert_eq!(session.assembly().group_count(), 16);
    for piece in session.assembly().pieces() {
        assert_eq!(piece.group_id, piece.id);
        assert!(piece.position.1 >= 4.0 * UNIT);
    }
    let render = session.render();
    assert!(render.windows(2).all(|w| w[0].z_order <= w[1].z_order));
}
