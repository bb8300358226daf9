use serde::{Deserialize, Serialize};

use crate::error::GridError;

pub const DIR_UP: usize = 0;
pub const DIR_RIGHT: usize = 1;
pub const DIR_DOWN: usize = 2;
pub const DIR_LEFT: usize = 3;

pub const DIRECTIONS: [usize; 4] = [DIR_UP, DIR_RIGHT, DIR_DOWN, DIR_LEFT];

pub const GRID_SIZE_MIN: u32 = 2;

/// Puzzle handed over by the catalog collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PuzzleSpec {
    pub id: u32,
    pub piece_count: u32,
    pub image_ref: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
}

impl Cell {
    pub fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }
}

/// Square `size x size` grid; piece ids are row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub size: u32,
}

impl Grid {
    pub fn new(size: u32) -> Result<Self, GridError> {
        if size < GRID_SIZE_MIN {
            return Err(GridError::TooSmall(size));
        }
        Ok(Self { size })
    }

    pub fn from_spec(spec: &PuzzleSpec) -> Result<Self, GridError> {
        Self::from_piece_count(spec.piece_count)
    }

    pub fn from_piece_count(piece_count: u32) -> Result<Self, GridError> {
        let root = (piece_count as f64).sqrt().round() as u32;
        if root.checked_mul(root) != Some(piece_count) {
            return Err(GridError::NotSquare(piece_count));
        }
        Self::new(root)
    }

    pub fn piece_count(&self) -> usize {
        let size = self.size as usize;
        size * size
    }

    pub fn cell(&self, id: usize) -> Cell {
        let size = self.size as usize;
        Cell {
            row: (id / size) as u32,
            col: (id % size) as u32,
        }
    }

    pub fn id(&self, cell: Cell) -> usize {
        cell.row as usize * self.size as usize + cell.col as usize
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.piece_count()).map(move |id| self.cell(id))
    }

    pub fn neighbor_id(&self, id: usize, dir: usize) -> Option<usize> {
        let size = self.size as usize;
        if id >= self.piece_count() {
            return None;
        }
        let col = id % size;
        let row = id / size;
        match dir {
            DIR_UP if row > 0 => Some(id - size),
            DIR_RIGHT if col + 1 < size => Some(id + 1),
            DIR_DOWN if row + 1 < size => Some(id + size),
            DIR_LEFT if col > 0 => Some(id - 1),
            _ => None,
        }
    }
}
