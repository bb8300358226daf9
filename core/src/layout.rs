use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::config::LayoutSettings;
use crate::grid::{Cell, Grid};
use crate::outline::Point;

/// Starting state for one piece, indexed by piece id.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Placement {
    pub position: Point,
    pub z_order: u32,
}

pub fn home_position(cell: Cell, unit: f32) -> Point {
    (cell.col as f32 * unit, cell.row as f32 * unit)
}

/// Scatters every piece into the tray band below the board and shuffles the
/// stacking order. Independent of the edge geometry seed.
pub fn scatter_layout<R: Rng + ?Sized>(
    grid: Grid,
    unit: f32,
    settings: &LayoutSettings,
    rng: &mut R,
) -> Vec<Placement> {
    let total = grid.piece_count();
    let board = grid.size as f32 * unit;
    let max_x = (board - unit * 0.5).max(0.0);

    let mut order: Vec<u32> = (0..total as u32).collect();
    order.shuffle(rng);

    order
        .into_iter()
        .map(|z_order| {
            let x = (rng.random::<f32>() * max_x).round();
            let y = (board + settings.tray_gap + rng.random::<f32>() * settings.tray_depth).round();
            Placement {
                position: (x, y),
                z_order,
            }
        })
        .collect()
}

/// Every piece already at its home cell; the puzzle is still unmerged.
pub fn solved_layout(grid: Grid, unit: f32) -> Vec<Placement> {
    grid.cells()
        .enumerate()
        .map(|(id, cell)| Placement {
            position: home_position(cell, unit),
            z_order: id as u32,
        })
        .collect()
}
