use std::sync::Arc;
use std::time::Duration;

use rand::Rng;
use serde::Serialize;

use crate::assembly::{Assembly, GroupId, PieceId, SnapOutcome};
use crate::clock::SessionTimer;
use crate::completion::{CompletionDetector, CompletionEvent};
use crate::config::EngineConfig;
use crate::drag::DragController;
use crate::edge::EdgeMap;
use crate::error::{DragError, EngineError};
use crate::grid::{Grid, PuzzleSpec};
use crate::input::{PointerInputMapper, Size};
use crate::layout::{scatter_layout, Placement};
use crate::outline::{build_outlines, PieceOutline, Point};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Highlight {
    group: GroupId,
    remaining: Duration,
}

/// What a renderer needs for one piece.
#[derive(Clone, Debug, Serialize)]
pub struct RenderPiece<'a> {
    pub id: PieceId,
    pub outline: &'a PieceOutline,
    pub position: Point,
    pub group_id: GroupId,
    pub z_order: u32,
    pub highlighted: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SnapReport {
    pub outcome: SnapOutcome,
    pub completion: Option<CompletionEvent>,
}

/// One play-through of one puzzle behind a pointer-event surface.
pub struct Session {
    spec: PuzzleSpec,
    config: EngineConfig,
    edges: Arc<EdgeMap>,
    outlines: Vec<PieceOutline>,
    assembly: Assembly,
    drag: DragController,
    timer: SessionTimer,
    detector: CompletionDetector,
    highlight: Option<Highlight>,
}

impl Session {
    /// Scatters the pieces with `rng`; edge shapes depend only on the
    /// puzzle id.
    pub fn new<R: Rng + ?Sized>(
        spec: PuzzleSpec,
        config: EngineConfig,
        rng: &mut R,
    ) -> Result<Self, EngineError> {
        let grid = Grid::from_spec(&spec)?;
        let placements = scatter_layout(grid, config.snap.unit, &config.layout, rng);
        Self::with_placements(spec, config, placements)
    }

    pub fn with_placements(
        spec: PuzzleSpec,
        config: EngineConfig,
        placements: Vec<Placement>,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        let grid = Grid::from_spec(&spec)?;
        let edges = Arc::new(EdgeMap::generate(spec.id, grid, &config.shape));
        let outlines = build_outlines(&edges, config.snap.unit);
        let assembly = Assembly::new(grid, &config.snap, config.scoring.merge_award, placements)?;
        let viewport = viewport_for(grid, &config);
        let mut timer = SessionTimer::new();
        timer.start();
        tracing::debug!(
            puzzle_id = spec.id,
            pieces = grid.piece_count(),
            image = %spec.image_ref,
            "session started"
        );
        Ok(Self {
            detector: CompletionDetector::new(config.scoring),
            drag: DragController::new(PointerInputMapper::new(viewport)),
            spec,
            config,
            edges,
            outlines,
            assembly,
            timer,
            highlight: None,
        })
    }

    pub fn spec(&self) -> &PuzzleSpec {
        &self.spec
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn grid(&self) -> Grid {
        self.assembly.grid()
    }

    pub fn edges(&self) -> &Arc<EdgeMap> {
        &self.edges
    }

    pub fn outline(&self, piece_id: PieceId) -> Option<&PieceOutline> {
        self.outlines.get(piece_id)
    }

    pub fn assembly(&self) -> &Assembly {
        &self.assembly
    }

    /// Logical coordinate space: the board plus the tray band below it.
    pub fn viewport(&self) -> Size {
        self.drag.mapper().viewport()
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_dragging()
    }

    pub fn highlighted_group(&self) -> Option<GroupId> {
        self.highlight.map(|highlight| highlight.group)
    }

    pub fn score(&self) -> u32 {
        self.assembly.score()
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.timer.elapsed_seconds()
    }

    /// Fraction of the merges needed for completion that have happened.
    pub fn progress(&self) -> f32 {
        let total = self.assembly.pieces().len();
        if total <= 1 {
            return 1.0;
        }
        let merged = total - self.assembly.group_count();
        merged as f32 / (total - 1) as f32
    }

    pub fn is_complete(&self) -> bool {
        self.assembly.is_complete()
    }

    pub fn completion(&self) -> Option<CompletionEvent> {
        self.detector.event()
    }

    /// Top-most piece whose outline contains the logical point.
    pub fn piece_at(&self, logical: Point) -> Option<PieceId> {
        self.assembly
            .pieces()
            .iter()
            .filter(|piece| {
                self.outlines.get(piece.id).is_some_and(|outline| {
                    outline.contains((logical.0 - piece.position.0, logical.1 - piece.position.1))
                })
            })
            .max_by_key(|piece| (piece.z_order, piece.id))
            .map(|piece| piece.id)
    }

    /// Picks up the piece under the pointer. `Ok(None)` when nothing is hit.
    pub fn pointer_down(&mut self, container: Size, raw: Point) -> Result<Option<PieceId>, EngineError> {
        if let Some(group) = self.drag.active_group() {
            return Err(DragError::AlreadyDragging(group).into());
        }
        let logical = self
            .drag
            .mapper()
            .to_logical(container, raw)
            .ok_or(DragError::DegenerateContainer)?;
        let Some(piece_id) = self.piece_at(logical) else {
            tracing::debug!(x = logical.0, y = logical.1, "pointer down on empty space");
            return Ok(None);
        };
        self.drag.pick_up(&mut self.assembly, piece_id, container, raw)?;
        Ok(Some(piece_id))
    }

    pub fn pointer_move(&mut self, container: Size, raw: Point) -> bool {
        self.drag.move_to(&mut self.assembly, container, raw)
    }

    pub fn pointer_up(&mut self) -> Option<SnapReport> {
        let outcome = self.drag.release(&mut self.assembly)?;
        Some(self.settle(outcome))
    }

    pub fn pointer_cancel(&mut self) -> Option<SnapReport> {
        let outcome = self.drag.cancel(&mut self.assembly)?;
        Some(self.settle(outcome))
    }

    /// Drives the session clock and expires the merge highlight.
    pub fn advance(&mut self, dt: Duration) {
        self.timer.advance(dt);
        if let Some(highlight) = self.highlight.as_mut() {
            highlight.remaining = highlight.remaining.saturating_sub(dt);
            if highlight.remaining.is_zero() {
                self.highlight = None;
            }
        }
    }

    pub fn render(&self) -> Vec<RenderPiece<'_>> {
        let highlighted = self.highlighted_group();
        let mut pieces: Vec<RenderPiece<'_>> = self
            .assembly
            .pieces()
            .iter()
            .zip(&self.outlines)
            .map(|(piece, outline)| RenderPiece {
                id: piece.id,
                outline,
                position: piece.position,
                group_id: piece.group_id,
                z_order: piece.z_order,
                highlighted: highlighted == Some(piece.group_id),
            })
            .collect();
        pieces.sort_by_key(|piece| (piece.z_order, piece.id));
        pieces
    }

    fn settle(&mut self, outcome: SnapOutcome) -> SnapReport {
        let mut completion = None;
        if outcome.merged() {
            self.highlight = Some(Highlight {
                group: outcome.group,
                remaining: Duration::from_millis(self.config.highlight_ms),
            });
            completion = self.detector.observe(
                self.assembly.group_count(),
                &mut self.timer,
                self.assembly.score(),
            );
        }
        SnapReport {
            outcome,
            completion,
        }
    }
}

fn viewport_for(grid: Grid, config: &EngineConfig) -> Size {
    let board = grid.size as f32 * config.snap.unit;
    Size::new(board, board + config.layout.tray_height)
}
