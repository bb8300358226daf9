use std::collections::VecDeque;
use std::time::Duration;

use kumitate_core::grid::DIRECTIONS;
use kumitate_core::{
    format_elapsed, home_position, CompletionEvent, GroupId, PieceId, Point, PointerInputMapper, Session, Size,
};
use rand::rngs::StdRng;
use rand::Rng;
use tokio::time::{interval, Instant, MissedTickBehavior};

use super::err_msg;

const GRAB_SAMPLES: usize = 5;
const SETTLE_MARGIN: f32 = 1.0;

#[derive(clap::Args, Clone, Copy, Debug)]
pub(super) struct PlayerArgs {
    /// Delay between pointer events.
    #[arg(long, default_value_t = 30)]
    think_ms: u64,
    /// Session clock tick.
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,
    #[arg(long, default_value_t = 6)]
    moves_per_drag: u32,
    /// How far off the exact spot a piece is dropped, in logical units.
    #[arg(long, default_value_t = 4.0)]
    drop_jitter: f32,
    #[arg(long, default_value_t = 390.0)]
    container_width: f32,
    #[arg(long, default_value_t = 844.0)]
    container_height: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum PlayerStep {
    Down { raw: Point, piece_id: PieceId },
    Move { raw: Point },
    Up,
}

fn validate_player(args: &PlayerArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.think_ms == 0 || args.tick_ms == 0 {
        return Err(err_msg("think-ms and tick-ms must be positive"));
    }
    if args.moves_per_drag == 0 {
        return Err(err_msg("moves-per-drag must be positive"));
    }
    if !(0.0..10.0).contains(&args.drop_jitter) {
        return Err(err_msg("drop-jitter must lie in [0, 10)"));
    }
    if args.container_width <= 0.0 || args.container_height <= 0.0 {
        return Err(err_msg("container must have a positive size"));
    }
    Ok(())
}

/// Plays until the session completes. Pointer events and clock ticks are
/// interleaved on the current task.
pub(super) async fn run(
    mut session: Session,
    args: PlayerArgs,
    rng: &mut StdRng,
) -> Result<CompletionEvent, Box<dyn std::error::Error>> {
    validate_player(&args)?;
    let container = Size::new(args.container_width, args.container_height);
    let max_drags = session.assembly().pieces().len() * 4;

    let mut clock = interval(Duration::from_millis(args.tick_ms));
    clock.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut pointer = interval(Duration::from_millis(args.think_ms));
    pointer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut last_tick = Instant::now();

    let mut plan: VecDeque<PlayerStep> = VecDeque::new();
    let mut drags = 0usize;

    loop {
        tokio::select! {
            now = clock.tick() => {
                session.advance(now.saturating_duration_since(last_tick));
                last_tick = now;
            }
            _ = pointer.tick() => {
                if plan.is_empty() {
                    if drags >= max_drags {
                        return Err(err_msg("player gave up before the puzzle was complete"));
                    }
                    plan = plan_drag(&session, container, &args, rng)
                        .ok_or_else(|| err_msg("no piece can be picked up"))?;
                    drags += 1;
                }
                let Some(step) = plan.pop_front() else {
                    continue;
                };
                if !apply_step(&mut session, container, step)? {
                    plan.clear();
                }
                if let Some(event) = session.completion() {
                    tracing::info!(
                        drags,
                        score = session.score(),
                        elapsed = %format_elapsed(event.elapsed_seconds),
                        "player finished"
                    );
                    return Ok(event);
                }
            }
        }
    }
}

/// Returns false when the drag had to be abandoned.
fn apply_step(
    session: &mut Session,
    container: Size,
    step: PlayerStep,
) -> Result<bool, Box<dyn std::error::Error>> {
    match step {
        PlayerStep::Down { raw, piece_id } => match session.pointer_down(container, raw)? {
            Some(hit) if hit == piece_id => Ok(true),
            other => {
                tracing::warn!(expected = piece_id, hit = ?other, "grabbed the wrong piece");
                session.pointer_cancel();
                Ok(false)
            }
        },
        PlayerStep::Move { raw } => Ok(session.pointer_move(container, raw)),
        PlayerStep::Up => {
            if let Some(report) = session.pointer_up() {
                tracing::debug!(
                    merges = report.outcome.merges.len(),
                    groups = session.assembly().group_count(),
                    "piece dropped"
                );
            }
            Ok(true)
        }
    }
}

fn largest_group(session: &Session) -> Option<GroupId> {
    let assembly = session.assembly();
    assembly
        .pieces()
        .iter()
        .map(|piece| piece.group_id)
        .filter(|group| assembly.members(*group).len() > 1)
        .max_by_key(|group| (assembly.members(*group).len(), std::cmp::Reverse(*group)))
}

/// Where the board's top-left corner currently sits.
fn board_origin(session: &Session, anchor: Option<GroupId>) -> Point {
    let assembly = session.assembly();
    let unit = assembly.unit();
    anchor
        .and_then(|group| assembly.members(group).first())
        .and_then(|id| assembly.piece(*id))
        .map(|piece| {
            let home = home_position(piece.cell, unit);
            (piece.position.0 - home.0, piece.position.1 - home.1)
        })
        .unwrap_or((0.0, 0.0))
}

fn grab_point(session: &Session, piece_id: PieceId) -> Option<Point> {
    let assembly = session.assembly();
    let piece = assembly.piece(piece_id)?;
    let unit = assembly.unit();
    let mut offsets: Vec<f32> = (0..GRAB_SAMPLES)
        .map(|i| unit * (0.2 + 0.6 * i as f32 / (GRAB_SAMPLES - 1) as f32))
        .collect();
    // Centre first.
    offsets.sort_by(|a, b| (a - unit * 0.5).abs().total_cmp(&(b - unit * 0.5).abs()));
    for &dy in &offsets {
        for &dx in &offsets {
            let point = (piece.position.0 + dx, piece.position.1 + dy);
            if session.piece_at(point) == Some(piece_id) {
                return Some(point);
            }
        }
    }
    None
}

fn plan_drag(
    session: &Session,
    container: Size,
    args: &PlayerArgs,
    rng: &mut StdRng,
) -> Option<VecDeque<PlayerStep>> {
    let assembly = session.assembly();
    let grid = assembly.grid();
    let unit = assembly.unit();
    let anchor = largest_group(session);
    let origin = board_origin(session, anchor);

    // Pieces already dropped near their spot wait there for a neighbour,
    // unless they touch the anchor group and still failed to join it.
    let settle_radius = args.drop_jitter * std::f32::consts::SQRT_2 + SETTLE_MARGIN;
    let collect = |skip_settled: bool| -> Vec<(bool, u32, PieceId, Point)> {
        assembly
            .pieces()
            .iter()
            .filter(|piece| Some(piece.group_id) != anchor)
            .filter_map(|piece| {
                let home = home_position(piece.cell, unit);
                let target = (origin.0 + home.0, origin.1 + home.1);
                let dx = target.0 - piece.position.0;
                let dy = target.1 - piece.position.1;
                let touches_anchor = anchor.is_some_and(|group| {
                    DIRECTIONS.iter().any(|dir| {
                        grid.neighbor_id(piece.id, *dir)
                            .and_then(|id| assembly.group_of(id))
                            == Some(group)
                    })
                });
                if skip_settled && !touches_anchor && (dx * dx + dy * dy).sqrt() < settle_radius {
                    return None;
                }
                Some((touches_anchor, piece.z_order, piece.id, target))
            })
            .collect()
    };
    let mut candidates = collect(true);
    if candidates.is_empty() {
        candidates = collect(false);
    }
    candidates.sort_by(|a, b| b.0.cmp(&a.0).then(b.1.cmp(&a.1)));

    let mapper = PointerInputMapper::new(session.viewport());
    for (_, _, piece_id, target) in candidates {
        let Some(grab) = grab_point(session, piece_id) else {
            continue;
        };
        let position = assembly.piece(piece_id)?.position;
        let jitter = args.drop_jitter;
        let drop = (
            grab.0 + target.0 - position.0 + rng.random_range(-jitter..=jitter),
            grab.1 + target.1 - position.1 + rng.random_range(-jitter..=jitter),
        );
        let mut steps = VecDeque::with_capacity(args.moves_per_drag as usize + 2);
        steps.push_back(PlayerStep::Down {
            raw: mapper.to_raw(container, grab)?,
            piece_id,
        });
        for i in 1..=args.moves_per_drag {
            let t = i as f32 / args.moves_per_drag as f32;
            let logical = (grab.0 + (drop.0 - grab.0) * t, grab.1 + (drop.1 - grab.1) * t);
            steps.push_back(PlayerStep::Move {
                raw: mapper.to_raw(container, logical)?,
            });
        }
        steps.push_back(PlayerStep::Up);
        tracing::debug!(piece_id, target_x = target.0, target_y = target.1, "drag planned");
        return Some(steps);
    }
    None
}
