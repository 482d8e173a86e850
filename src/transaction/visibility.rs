use super::command::UndoCommand;
use crate::grid::{Axis, Grid};

/// Hide or show a set of indexes of one axis
#[derive(Debug, Clone)]
pub struct VisibilityCommand {
    axis: Axis,
    hide: bool,
    /// Indexes whose state actually changes, with their raw exceptions
    changes: Vec<(usize, Option<i32>)>,
}

impl VisibilityCommand {
    pub fn hide(grid: &Grid, axis: Axis, indexes: &[usize]) -> Self {
        Self::build(grid, axis, indexes, true)
    }

    pub fn unhide(grid: &Grid, axis: Axis, indexes: &[usize]) -> Self {
        Self::build(grid, axis, indexes, false)
    }

    fn build(grid: &Grid, axis: Axis, indexes: &[usize], hide: bool) -> Self {
        let sizes = grid.axis(axis).sizes();
        let mut changes: Vec<(usize, Option<i32>)> = indexes
            .iter()
            .filter(|&&i| sizes.is_hidden(i) != hide)
            .map(|&i| (i, sizes.exception(i)))
            .collect();
        changes.sort_unstable_by_key(|&(i, _)| i);
        changes.dedup_by_key(|&mut (i, _)| i);
        Self { axis, hide, changes }
    }

    pub fn indexes(&self) -> Vec<usize> {
        self.changes.iter().map(|&(i, _)| i).collect()
    }
}

impl UndoCommand<Grid> for VisibilityCommand {
    fn redo(&mut self, grid: &mut Grid) {
        let axis = grid.axis_mut(self.axis);
        for &(index, _) in &self.changes {
            if self.hide {
                axis.hide(index);
            } else {
                axis.unhide(index);
            }
        }
    }

    fn undo(&mut self, grid: &mut Grid) {
        let axis = grid.axis_mut(self.axis);
        for &(index, old) in &self.changes {
            axis.restore_exception(index, old);
        }
    }

    fn text(&self) -> String {
        let verb = if self.hide { "Hide" } else { "Show" };
        match self.changes.len() {
            1 => format!("{} {}", verb, self.axis),
            n => format!("{} {} {}s", verb, n, self.axis),
        }
    }

    fn is_valid(&self) -> bool {
        !self.changes.is_empty()
    }
}
