use tracing::{debug, warn};

use super::command::UndoCommand;
use crate::grid::Grid;
use crate::table::{self, CellValue};

/// Write one cell, addressed by column and row index
#[derive(Debug, Clone)]
pub struct SetValueCommand {
    col: usize,
    row: usize,
    old: CellValue,
    new: CellValue,
    rejection: Option<String>,
}

impl SetValueCommand {
    /// Reads the current value and asks the data to check `value`. The
    /// command is invalid when the value is unchanged or was rejected.
    pub fn new(grid: &Grid, col: usize, row: usize, value: CellValue) -> Self {
        let data = table::read(grid.data());
        let old = data.get_value(col, row);
        let rejection = data.check_value(col, row, &value);
        if let Some(reason) = &rejection {
            debug!(col, row, %reason, "value rejected");
        }
        Self {
            col,
            row,
            old,
            new: value,
            rejection,
        }
    }

    pub fn cell(&self) -> (usize, usize) {
        (self.col, self.row)
    }

    pub fn old_value(&self) -> &CellValue {
        &self.old
    }

    pub fn new_value(&self) -> &CellValue {
        &self.new
    }

    /// Message from the data model when it refused the value
    pub fn rejection(&self) -> Option<&str> {
        self.rejection.as_deref()
    }

    fn write(&self, grid: &Grid, value: &CellValue) {
        if !table::write(grid.data()).set_value(self.col, self.row, value.clone()) {
            warn!(col = self.col, row = self.row, "data model refused value");
        }
    }
}

impl UndoCommand<Grid> for SetValueCommand {
    fn redo(&mut self, grid: &mut Grid) {
        self.write(grid, &self.new);
    }

    fn undo(&mut self, grid: &mut Grid) {
        self.write(grid, &self.old);
    }

    fn text(&self) -> String {
        "Set value".to_string()
    }

    fn is_valid(&self) -> bool {
        self.rejection.is_none() && self.old != self.new
    }
}

/// Null every selected, visible cell that holds a value
#[derive(Debug, Clone)]
pub struct DeleteCommand {
    /// (column index, row index, old value)
    cells: Vec<(usize, usize, CellValue)>,
}

impl DeleteCommand {
    pub fn new(grid: &Grid) -> Self {
        let data = table::read(grid.data());
        let cells = grid
            .selected_cells()
            .into_iter()
            .filter_map(|(col, row)| {
                let value = data.get_value(col, row);
                value.is_some().then_some((col, row, value))
            })
            .collect();
        Self { cells }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl UndoCommand<Grid> for DeleteCommand {
    fn redo(&mut self, grid: &mut Grid) {
        let mut data = table::write(grid.data());
        for &(col, row, _) in &self.cells {
            if !data.set_value(col, row, None) {
                warn!(col, row, "data model refused null");
            }
        }
    }

    fn undo(&mut self, grid: &mut Grid) {
        let mut data = table::write(grid.data());
        for (col, row, old) in &self.cells {
            if !data.set_value(*col, *row, old.clone()) {
                warn!(col, row, "data model refused restored value");
            }
        }
    }

    fn text(&self) -> String {
        match self.cells.len() {
            1 => "Delete cell".to_string(),
            n => format!("Delete {} cells", n),
        }
    }

    fn is_valid(&self) -> bool {
        !self.cells.is_empty()
    }
}
