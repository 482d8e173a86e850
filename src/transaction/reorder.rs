use tracing::debug;

use super::command::UndoCommand;
use crate::grid::{Axis, Grid};
use crate::selection::SelectionSnapshot;

/// Move a set of columns or rows in front of a destination position.
///
/// The move is performed when the command is built. If the axis order
/// fingerprint did not change the command is invalid and the grid is left
/// as it was, so record it with `UndoStack::push_done` only when valid.
#[derive(Debug, Clone)]
pub struct ReorderCommand {
    axis: Axis,
    /// Moved positions before the move, ascending
    positions: Vec<usize>,
    destination: usize,
    /// First position of the moved block after the move
    block_start: usize,
    selection_before: SelectionSnapshot,
    valid: bool,
}

impl ReorderCommand {
    pub fn perform(grid: &mut Grid, axis: Axis, positions: &[usize], destination: usize) -> Self {
        let mut sorted = positions.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        let selection_before = grid.selection.snapshot();
        let before = grid.axis_mut(axis).order_fingerprint();
        let block_start = grid.axis_mut(axis).move_positions(&sorted, destination);
        let after = grid.axis_mut(axis).order_fingerprint();

        let command = Self {
            axis,
            positions: sorted,
            destination,
            block_start,
            selection_before,
            valid: before != after,
        };
        if command.valid {
            command.select_block(grid);
        } else {
            debug!(%axis, destination, "reorder changed nothing");
        }
        command
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn block_start(&self) -> usize {
        self.block_start
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    fn select_block(&self, grid: &mut Grid) {
        let Some(last) = (self.block_start + self.positions.len()).checked_sub(1) else {
            return;
        };
        match self.axis {
            Axis::Column => {
                let rows = grid.rows.count();
                grid.selection.select_columns(self.block_start, last, rows, false);
            }
            Axis::Row => {
                let cols = grid.columns.count();
                grid.selection.select_rows(self.block_start, last, cols, false);
            }
        }
    }
}

impl UndoCommand<Grid> for ReorderCommand {
    fn redo(&mut self, grid: &mut Grid) {
        let block_start = grid
            .axis_mut(self.axis)
            .move_positions(&self.positions, self.destination);
        debug_assert_eq!(block_start, self.block_start);
        self.select_block(grid);
    }

    fn undo(&mut self, grid: &mut Grid) {
        grid.axis_mut(self.axis)
            .restore_block(self.block_start, &self.positions);
        grid.selection.restore(self.selection_before.clone());
    }

    fn text(&self) -> String {
        match self.positions.len() {
            1 => format!("Move {}", self.axis),
            n => format!("Move {} {}s", n, self.axis),
        }
    }

    fn is_valid(&self) -> bool {
        self.valid
    }
}
