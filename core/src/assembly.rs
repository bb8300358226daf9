use serde::Serialize;

use crate::config::SnapRules;
use crate::error::GridError;
use crate::grid::{Cell, Grid, DIRECTIONS, DIR_DOWN, DIR_LEFT, DIR_RIGHT, DIR_UP};
use crate::layout::Placement;
use crate::outline::Point;

pub type PieceId = usize;
pub type GroupId = usize;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Piece {
    pub id: PieceId,
    pub cell: Cell,
    pub position: Point,
    pub group_id: GroupId,
    pub z_order: u32,
}

/// Group id to member list, plus the reverse lookup. Absorbed groups keep an
/// empty slot so ids stay stable.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GroupIndex {
    members: Vec<Vec<PieceId>>,
    group_of: Vec<GroupId>,
    count: usize,
}

impl GroupIndex {
    pub fn singletons(total: usize) -> Self {
        Self {
            members: (0..total).map(|id| vec![id]).collect(),
            group_of: (0..total).collect(),
            count: total,
        }
    }

    pub fn group_of(&self, piece_id: PieceId) -> Option<GroupId> {
        self.group_of.get(piece_id).copied()
    }

    pub fn members(&self, group: GroupId) -> &[PieceId] {
        self.members.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Moves every member of `from` into `into`. Cost is the size of `from`.
    fn absorb(&mut self, into: GroupId, from: GroupId) {
        if into == from || from >= self.members.len() || into >= self.members.len() {
            return;
        }
        let moved = std::mem::take(&mut self.members[from]);
        if moved.is_empty() {
            return;
        }
        for id in &moved {
            self.group_of[*id] = into;
        }
        self.members[into].extend(moved);
        self.count -= 1;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct MergeEvent {
    /// Piece of the surviving group that triggered the merge.
    pub anchor: PieceId,
    /// Its grid neighbour from the absorbed group.
    pub joined: PieceId,
    pub absorbed: GroupId,
    /// Integer translation applied to the absorbed group.
    pub offset: Point,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SnapOutcome {
    pub group: GroupId,
    pub merges: Vec<MergeEvent>,
}

impl SnapOutcome {
    pub fn merged(&self) -> bool {
        !self.merges.is_empty()
    }
}

#[derive(Clone, Debug)]
pub struct Assembly {
    grid: Grid,
    unit: f32,
    snap_distance: f32,
    merge_award: u32,
    pieces: Vec<Piece>,
    groups: GroupIndex,
    max_z_order: u32,
    score: u32,
}

impl Assembly {
    /// `placements` is indexed by piece id. Snap rules are expected to be
    /// validated already.
    pub fn new(
        grid: Grid,
        rules: &SnapRules,
        merge_award: u32,
        placements: Vec<Placement>,
    ) -> Result<Self, GridError> {
        let total = grid.piece_count();
        if placements.len() != total {
            return Err(GridError::PlacementCount {
                expected: total,
                actual: placements.len(),
            });
        }
        let pieces: Vec<Piece> = placements
            .into_iter()
            .enumerate()
            .map(|(id, placement)| Piece {
                id,
                cell: grid.cell(id),
                position: placement.position,
                group_id: id,
                z_order: placement.z_order,
            })
            .collect();
        let max_z_order = pieces.iter().map(|piece| piece.z_order).max().unwrap_or(0);
        Ok(Self {
            grid,
            unit: rules.unit,
            snap_distance: rules.snap_distance,
            merge_award,
            pieces,
            groups: GroupIndex::singletons(total),
            max_z_order,
            score: 0,
        })
    }

    pub fn grid(&self) -> Grid {
        self.grid
    }

    pub fn unit(&self) -> f32 {
        self.unit
    }

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn piece(&self, piece_id: PieceId) -> Option<&Piece> {
        self.pieces.get(piece_id)
    }

    pub fn group_of(&self, piece_id: PieceId) -> Option<GroupId> {
        self.groups.group_of(piece_id)
    }

    pub fn members(&self, group: GroupId) -> &[PieceId] {
        self.groups.members(group)
    }

    pub fn group_count(&self) -> usize {
        self.groups.count()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_complete(&self) -> bool {
        self.groups.count() == 1
    }

    pub fn max_z_order(&self) -> u32 {
        self.max_z_order
    }

    pub(crate) fn translate_group(&mut self, group: GroupId, delta: Point) {
        for &id in self.groups.members(group) {
            let piece = &mut self.pieces[id];
            piece.position = (piece.position.0 + delta.0, piece.position.1 + delta.1);
        }
    }

    /// Rounds `anchor` onto integer coordinates and lays the rest of its
    /// group out around it, so the group moves by one integer translation.
    pub(crate) fn round_group(&mut self, anchor: PieceId) {
        let Some(piece) = self.pieces.get(anchor) else {
            return;
        };
        let position = (piece.position.0.round(), piece.position.1.round());
        self.place_group(anchor, position);
    }

    /// Puts `anchor` at `position` and every other member of its group at
    /// `unit` times its cell offset from there.
    fn place_group(&mut self, anchor: PieceId, position: Point) {
        let Some(piece) = self.pieces.get(anchor) else {
            return;
        };
        let (group, origin) = (piece.group_id, piece.cell);
        for &id in self.groups.members(group) {
            let piece = &mut self.pieces[id];
            piece.position = (
                position.0 + (piece.cell.col as f32 - origin.col as f32) * self.unit,
                position.1 + (piece.cell.row as f32 - origin.row as f32) * self.unit,
            );
        }
    }

    /// Puts every member one above the current maximum stacking order.
    pub(crate) fn raise_group(&mut self, group: GroupId) -> u32 {
        let z_order = self.max_z_order.saturating_add(1);
        for &id in self.groups.members(group) {
            self.pieces[id].z_order = z_order;
        }
        self.max_z_order = z_order;
        z_order
    }

    /// Rounds the group holding `piece_id`, then merges every neighbouring
    /// group within snap distance, repeating until nothing else is in range.
    pub fn attempt_snap(&mut self, piece_id: PieceId) -> Option<SnapOutcome> {
        let group = self.groups.group_of(piece_id)?;
        self.round_group(piece_id);
        let mut merges = Vec::new();
        while let Some((anchor, joined)) = self.find_candidate(group) {
            let absorbed = self.pieces[joined].group_id;
            let offset = self.align_group(anchor, joined);
            for &id in self.groups.members(absorbed) {
                self.pieces[id].group_id = group;
            }
            self.groups.absorb(group, absorbed);
            self.score = self.score.saturating_add(self.merge_award);
            tracing::debug!(
                group,
                absorbed,
                anchor,
                joined,
                remaining = self.groups.count(),
                "groups merged"
            );
            merges.push(MergeEvent {
                anchor,
                joined,
                absorbed,
                offset,
            });
        }
        Some(SnapOutcome { group, merges })
    }

    fn expected_offset(&self, dir: usize) -> Point {
        match dir {
            DIR_UP => (0.0, -self.unit),
            DIR_RIGHT => (self.unit, 0.0),
            DIR_DOWN => (0.0, self.unit),
            DIR_LEFT => (-self.unit, 0.0),
            _ => (0.0, 0.0),
        }
    }

    fn find_candidate(&self, group: GroupId) -> Option<(PieceId, PieceId)> {
        for &member in self.groups.members(group) {
            let current = self.pieces[member].position;
            for dir in DIRECTIONS {
                let Some(neighbor) = self.grid.neighbor_id(member, dir) else {
                    continue;
                };
                if self.pieces[neighbor].group_id == group {
                    continue;
                }
                let (ex, ey) = self.expected_offset(dir);
                let other = self.pieces[neighbor].position;
                let dx = other.0 - current.0 - ex;
                let dy = other.1 - current.1 - ey;
                if (dx * dx + dy * dy).sqrt() < self.snap_distance {
                    return Some((member, neighbor));
                }
            }
        }
        None
    }

    /// Moves the group holding `joined` so `joined` lands exactly on its
    /// expected spot next to `anchor`. Returns the applied offset.
    fn align_group(&mut self, anchor: PieceId, joined: PieceId) -> Point {
        let from = self.pieces[anchor].cell;
        let to = self.pieces[joined].cell;
        let base = self.pieces[anchor].position;
        let target = (
            base.0 + (to.col as f32 - from.col as f32) * self.unit,
            base.1 + (to.row as f32 - from.row as f32) * self.unit,
        );
        let current = self.pieces[joined].position;
        let offset = ((target.0 - current.0).round(), (target.1 - current.1).round());
        self.place_group(joined, target);
        offset
    }
}
