//! Breadth-first flood fill over the tank's dense cell grid.

use std::collections::VecDeque;

use tank_sim_core::{CellCoord, GridSize};

/// Marks the 4-connected region of empty cells reachable from `start`.
///
/// Returns the number of cells that were marked. Out-of-bounds or
/// already-filled starts are no-ops that return zero. The grid itself serves
/// as the visited set: a cell is marked filled the moment it joins the
/// frontier, so no cell is queued twice and traversal order cannot change
/// the final region.
pub(crate) fn flood_fill(cells: &mut [bool], size: GridSize, start: CellCoord) -> u32 {
    let Some(start_index) = index(size, start) else {
        return 0;
    };

    if cells.get(start_index).copied().unwrap_or(true) {
        return 0;
    }

    let mut frontier = VecDeque::new();
    cells[start_index] = true;
    frontier.push_back(start);
    let mut marked = 1u32;

    while let Some(cell) = frontier.pop_front() {
        for neighbor in neighbors(cell, size) {
            let Some(neighbor_index) = index(size, neighbor) else {
                continue;
            };

            if cells[neighbor_index] {
                continue;
            }

            cells[neighbor_index] = true;
            marked = marked.saturating_add(1);
            frontier.push_back(neighbor);
        }
    }

    marked
}

fn neighbors(cell: CellCoord, size: GridSize) -> impl Iterator<Item = CellCoord> {
    let edge = size.get();
    let mut candidates = [None; 4];
    let mut count = 0;

    if let Some(row) = cell.row().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(cell.column(), row));
        count += 1;
    }

    if let Some(column) = cell.column().checked_add(1) {
        if column < edge {
            candidates[count] = Some(CellCoord::new(column, cell.row()));
            count += 1;
        }
    }

    if let Some(row) = cell.row().checked_add(1) {
        if row < edge {
            candidates[count] = Some(CellCoord::new(cell.column(), row));
            count += 1;
        }
    }

    if let Some(column) = cell.column().checked_sub(1) {
        candidates[count] = Some(CellCoord::new(column, cell.row()));
        count += 1;
    }

    candidates.into_iter().take(count).flatten()
}

fn index(size: GridSize, cell: CellCoord) -> Option<usize> {
    let edge = size.get();
    if cell.column() >= edge || cell.row() >= edge {
        return None;
    }

    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    let width = usize::try_from(edge).ok()?;
    row.checked_mul(width)?.checked_add(column)
}
