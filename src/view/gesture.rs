//! In-progress mouse gestures.
//!
//! A resize or zoom gesture owns its command, amends and reapplies it on
//! every drag tick, and records it once when the gesture ends. A reorder
//! gesture only tracks the drop position until release.

use tracing::debug;

use crate::config::ZoomConfig;
use crate::error::ReorderError;
use crate::grid::{Axis, Grid};
use crate::position::Pos;
use crate::transaction::{ReorderCommand, ResizeCommand, UndoCommand, UndoStack, ZoomCommand};

#[derive(Debug)]
pub enum Gesture {
    /// Rubber-band selection of body cells
    SelectCells,
    /// Dragging over column or row headers
    SelectLines(Axis),
    Resize(ResizeGesture),
    Reorder(ReorderGesture),
    /// Press on a fully selected header whose lines cannot move. Dragging
    /// off the line reports `refusal`; releasing on it selects the line.
    HeaderPress {
        axis: Axis,
        position: usize,
        refusal: ReorderError,
    },
    Zoom(ZoomGesture),
}

#[derive(Debug)]
pub struct ResizeGesture {
    command: ResizeCommand,
    press: i64,
    start_size: i32,
    zoom: f64,
}

impl ResizeGesture {
    /// Resize `indexes` of `axis` by dragging the edge of `edge_index`,
    /// pressed at pixel `press`
    pub fn start(grid: &Grid, axis: Axis, indexes: Vec<usize>, edge_index: usize, press: i64) -> Self {
        let table_axis = grid.axis(axis);
        let start_size = table_axis.size_of(edge_index);
        debug!(%axis, edge_index, start_size, "resize gesture started");
        Self {
            command: ResizeCommand::new(grid, axis, indexes, start_size),
            press,
            start_size,
            zoom: table_axis.zoom(),
        }
    }

    pub fn axis(&self) -> Axis {
        self.command.axis()
    }

    pub fn size(&self) -> i32 {
        self.command.new_size()
    }

    pub fn update(&mut self, grid: &mut Grid, coordinate: i64) {
        let delta = ((coordinate - self.press) as f64 / self.zoom) as i64;
        let size = (self.start_size as i64 + delta).clamp(0, i32::MAX as i64) as i32;
        self.command.set_new_size(size);
        self.command.redo(grid);
    }

    /// Record the gesture as one step. Returns whether anything changed.
    pub fn finish(mut self, grid: &mut Grid, history: &mut UndoStack<Grid>) -> bool {
        if self.command.is_valid() {
            history.push_done(Box::new(self.command))
        } else {
            // back to the exact raw state, explicit defaults included
            self.command.undo(grid);
            false
        }
    }

    pub fn cancel(mut self, grid: &mut Grid) {
        self.command.undo(grid);
    }
}

#[derive(Debug)]
pub struct ReorderGesture {
    axis: Axis,
    positions: Vec<usize>,
    destination: Option<usize>,
}

impl ReorderGesture {
    /// Pick up every fully selected column (or row)
    pub fn start(grid: &Grid, axis: Axis) -> Result<Self, ReorderError> {
        let positions = fully_selected(grid, axis);
        let count = grid.axis(axis).count();
        if grid.selection.is_all() || (count > 0 && positions.len() == count) {
            return Err(ReorderError::AllSelected(axis));
        }
        if positions.is_empty() {
            return Err(ReorderError::NothingSelected(axis));
        }
        debug!(%axis, moving = positions.len(), "reorder gesture started");
        Ok(Self {
            axis,
            positions,
            destination: None,
        })
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Drop position under the pointer, `None` until the first drag
    pub fn destination(&self) -> Option<usize> {
        self.destination
    }

    /// Track the drop position: in front of the hovered line, or behind it
    /// past its middle.
    pub fn update(&mut self, grid: &mut Grid, coordinate: i64, scroll: i64) {
        let table_axis = grid.axis_mut(self.axis);
        let destination = match table_axis.position_at(coordinate, scroll) {
            Pos::Before | Pos::Header => 0,
            Pos::After => table_axis.count(),
            Pos::Cell(p) => {
                let start = table_axis.start_offset(Pos::Cell(p), scroll);
                let end = table_axis.start_offset(Pos::Cell(p + 1), scroll);
                if coordinate - start > (end - start) / 2 {
                    p + 1
                } else {
                    p
                }
            }
        };
        self.destination = Some(destination);
    }

    /// Perform the move and record it when it changed the order
    pub fn finish(self, grid: &mut Grid, history: &mut UndoStack<Grid>) -> bool {
        let Some(destination) = self.destination else {
            return false;
        };
        let command = ReorderCommand::perform(grid, self.axis, &self.positions, destination);
        command.is_valid() && history.push_done(Box::new(command))
    }
}

/// Positions of every column (or row) covered from end to end
pub fn fully_selected(grid: &Grid, axis: Axis) -> Vec<usize> {
    match axis {
        Axis::Column => (0..grid.columns.count())
            .filter(|&c| grid.selection.is_column_fully_selected(c, &grid.rows))
            .collect(),
        Axis::Row => (0..grid.rows.count())
            .filter(|&r| grid.selection.is_row_fully_selected(r, &grid.columns))
            .collect(),
    }
}

#[derive(Debug)]
pub struct ZoomGesture {
    command: ZoomCommand,
    start: (f64, f64),
    range: ZoomConfig,
}

impl ZoomGesture {
    pub fn start(grid: &Grid, range: ZoomConfig) -> Self {
        let start = (grid.columns.zoom(), grid.rows.zoom());
        Self {
            command: ZoomCommand::new(grid, start.0, start.1),
            start,
            range,
        }
    }

    /// Scale both axes by `factor` relative to the zoom at gesture start
    pub fn update(&mut self, grid: &mut Grid, factor: f64) {
        let columns = self.range.clamp(self.start.0 * factor);
        let rows = self.range.clamp(self.start.1 * factor);
        self.command.set_new_zoom(columns, rows);
        self.command.redo(grid);
    }

    pub fn finish(self, history: &mut UndoStack<Grid>) -> bool {
        self.command.is_valid() && history.push_done(Box::new(self.command))
    }

    pub fn cancel(mut self, grid: &mut Grid) {
        self.command.undo(grid);
    }
}
