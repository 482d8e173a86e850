use tracing::debug;

use super::command::UndoCommand;
use crate::grid::{Axis, Grid};

/// Give one or more indexes of an axis the same explicit size
#[derive(Debug, Clone)]
pub struct ResizeCommand {
    axis: Axis,
    indexes: Vec<usize>,
    /// Raw exception entries before the resize
    old_exceptions: Vec<Option<i32>>,
    old_sizes: Vec<i32>,
    minimum_size: i32,
    new_size: i32,
}

impl ResizeCommand {
    pub fn new(grid: &Grid, axis: Axis, indexes: Vec<usize>, size: i32) -> Self {
        let sizes = grid.axis(axis).sizes();
        let old_exceptions = indexes.iter().map(|&i| sizes.exception(i)).collect();
        let old_sizes = indexes.iter().map(|&i| sizes.size_of(i)).collect();
        let minimum_size = sizes.minimum_size();
        Self {
            axis,
            indexes,
            old_exceptions,
            old_sizes,
            minimum_size,
            new_size: size.max(minimum_size),
        }
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    pub fn indexes(&self) -> &[usize] {
        &self.indexes
    }

    pub fn new_size(&self) -> i32 {
        self.new_size
    }

    /// Change the target size; the next `redo` applies it
    pub fn set_new_size(&mut self, size: i32) {
        self.new_size = size.max(self.minimum_size);
    }
}

impl UndoCommand<Grid> for ResizeCommand {
    fn redo(&mut self, grid: &mut Grid) {
        let axis = grid.axis_mut(self.axis);
        for &index in &self.indexes {
            axis.set_size(index, self.new_size);
        }
        debug!(axis = %self.axis, count = self.indexes.len(), size = self.new_size, "resized");
    }

    fn undo(&mut self, grid: &mut Grid) {
        let axis = grid.axis_mut(self.axis);
        for (&index, &old) in self.indexes.iter().zip(&self.old_exceptions) {
            axis.restore_exception(index, old);
        }
    }

    fn text(&self) -> String {
        match self.indexes.len() {
            1 => format!("Resize {}", self.axis),
            n => format!("Resize {} {}s", n, self.axis),
        }
    }

    fn is_valid(&self) -> bool {
        self.old_sizes.iter().any(|&s| s != self.new_size)
    }
}
