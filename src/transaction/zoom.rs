use super::command::UndoCommand;
use crate::grid::Grid;

/// Change the zoom of both axes as one step
#[derive(Debug, Clone, Copy)]
pub struct ZoomCommand {
    old: (f64, f64),
    new: (f64, f64),
}

impl ZoomCommand {
    pub fn new(grid: &Grid, column_zoom: f64, row_zoom: f64) -> Self {
        Self {
            old: (grid.columns.zoom(), grid.rows.zoom()),
            new: (column_zoom, row_zoom),
        }
    }

    pub fn old_zoom(&self) -> (f64, f64) {
        self.old
    }

    pub fn new_zoom(&self) -> (f64, f64) {
        self.new
    }

    pub fn set_new_zoom(&mut self, column_zoom: f64, row_zoom: f64) {
        self.new = (column_zoom, row_zoom);
    }
}

impl UndoCommand<Grid> for ZoomCommand {
    fn redo(&mut self, grid: &mut Grid) {
        grid.columns.set_zoom(self.new.0);
        grid.rows.set_zoom(self.new.1);
    }

    fn undo(&mut self, grid: &mut Grid) {
        grid.columns.set_zoom(self.old.0);
        grid.rows.set_zoom(self.old.1);
    }

    fn text(&self) -> String {
        "Zoom".to_string()
    }

    fn is_valid(&self) -> bool {
        self.old != self.new
    }
}
