use crate::assembly::{Assembly, GroupId, PieceId, SnapOutcome};
use crate::error::DragError;
use crate::input::{PointerInputMapper, Size};
use crate::outline::Point;

#[derive(Clone, Copy, Debug, PartialEq)]
struct DragState {
    piece_id: PieceId,
    group: GroupId,
    /// Pointer minus grabbed piece position at pick-up, in logical units.
    grab_offset: Point,
    last: Point,
}

/// Moves at most one rigid group at a time.
#[derive(Clone, Debug)]
pub struct DragController {
    mapper: PointerInputMapper,
    state: Option<DragState>,
}

impl DragController {
    pub fn new(mapper: PointerInputMapper) -> Self {
        Self { mapper, state: None }
    }

    pub fn mapper(&self) -> &PointerInputMapper {
        &self.mapper
    }

    pub fn is_dragging(&self) -> bool {
        self.state.is_some()
    }

    pub fn active_group(&self) -> Option<GroupId> {
        self.state.map(|state| state.group)
    }

    pub fn grab_offset(&self) -> Option<Point> {
        self.state.map(|state| state.grab_offset)
    }

    pub fn pick_up(
        &mut self,
        assembly: &mut Assembly,
        piece_id: PieceId,
        container: Size,
        raw: Point,
    ) -> Result<(), DragError> {
        if let Some(state) = self.state {
            tracing::warn!(piece_id, active = state.group, "pick-up while dragging");
            return Err(DragError::AlreadyDragging(state.group));
        }
        let group = assembly
            .group_of(piece_id)
            .ok_or(DragError::UnknownPiece(piece_id))?;
        let pointer = self
            .mapper
            .to_logical(container, raw)
            .ok_or(DragError::DegenerateContainer)?;
        let z_order = assembly.raise_group(group);
        let origin = assembly
            .piece(piece_id)
            .map(|piece| piece.position)
            .ok_or(DragError::UnknownPiece(piece_id))?;
        self.state = Some(DragState {
            piece_id,
            group,
            grab_offset: (pointer.0 - origin.0, pointer.1 - origin.1),
            last: pointer,
        });
        tracing::debug!(piece_id, group, z_order, "drag started");
        Ok(())
    }

    /// Returns false when idle or when the container cannot be mapped; the
    /// last known pointer is kept in that case.
    pub fn move_to(&mut self, assembly: &mut Assembly, container: Size, raw: Point) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        let Some(pointer) = self.mapper.to_logical(container, raw) else {
            tracing::debug!(group = state.group, "pointer move ignored, no container area");
            return false;
        };
        let delta = (pointer.0 - state.last.0, pointer.1 - state.last.1);
        assembly.translate_group(state.group, delta);
        state.last = pointer;
        true
    }

    pub fn release(&mut self, assembly: &mut Assembly) -> Option<SnapOutcome> {
        let state = self.state.take()?;
        tracing::debug!(piece_id = state.piece_id, group = state.group, "drag released");
        assembly.attempt_snap(state.piece_id)
    }

    /// Lost pointer: finish the drag where it last was.
    pub fn cancel(&mut self, assembly: &mut Assembly) -> Option<SnapOutcome> {
        if let Some(state) = self.state {
            tracing::debug!(group = state.group, "drag cancelled");
        }
        self.release(assembly)
    }
}
