use std::fmt;

use tracing::debug;

use crate::axis::TableAxis;
use crate::config::GridConfig;
use crate::selection::{PositionState, SelectionModel};
use crate::table::{self, SharedTable};

/// Which table dimension an operation applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Column,
    Row,
}

impl Axis {
    pub fn other(self) -> Axis {
        match self {
            Axis::Column => Axis::Row,
            Axis::Row => Axis::Column,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::Column => write!(f, "column"),
            Axis::Row => write!(f, "row"),
        }
    }
}

/// Everything an undo command may touch: both axes, the position state,
/// the selection and the shared table data.
pub struct Grid {
    pub columns: TableAxis,
    pub rows: TableAxis,
    pub positions: PositionState,
    pub selection: SelectionModel,
    data: SharedTable,
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("columns", &self.columns.count())
            .field("rows", &self.rows.count())
            .field("selection", &self.selection.areas().len())
            .finish()
    }
}

impl Grid {
    pub fn new(data: SharedTable, config: &GridConfig) -> Self {
        let (cols, rows) = {
            let data = table::read(&data);
            (data.column_count(), data.row_count())
        };
        let c = &config.columns;
        let r = &config.rows;
        Self {
            columns: TableAxis::new(cols, c.default_size, c.minimum_size, c.header_size),
            rows: TableAxis::new(rows, r.default_size, r.minimum_size, r.header_size),
            positions: PositionState::new(),
            selection: SelectionModel::new(),
            data,
        }
    }

    pub fn data(&self) -> &SharedTable {
        &self.data
    }

    pub fn axis(&self, axis: Axis) -> &TableAxis {
        match axis {
            Axis::Column => &self.columns,
            Axis::Row => &self.rows,
        }
    }

    pub fn axis_mut(&mut self, axis: Axis) -> &mut TableAxis {
        match axis {
            Axis::Column => &mut self.columns,
            Axis::Row => &mut self.rows,
        }
    }

    /// Pick up row/column count changes of the data. Shrinking truncates the
    /// axes and drops selection areas that fell off the table.
    pub fn sync_counts(&mut self) {
        let (cols, rows) = {
            let data = table::read(&self.data);
            (data.column_count(), data.row_count())
        };
        let shrunk = cols < self.columns.count() || rows < self.rows.count();
        self.columns.set_count(cols);
        self.rows.set_count(rows);
        if shrunk {
            debug!(cols, rows, "table shrank, clipping selection");
            let mut snapshot = self.selection.snapshot();
            snapshot.areas.retain_mut(|a| {
                if a.c1 >= cols || a.r1 >= rows {
                    return false;
                }
                a.c2 = a.c2.min(cols - 1);
                a.r2 = a.r2.min(rows - 1);
                true
            });
            self.selection.restore(snapshot);
        }
    }

    /// Value shown at a body position
    pub fn value_at(&self, col_position: usize, row_position: usize) -> table::CellValue {
        let col = self.columns.index_at(col_position);
        let row = self.rows.index_at(row_position);
        table::read(&self.data).get_value(col, row)
    }

    /// Cell indexes (column, row) of every visible selected cell, in
    /// position order
    pub fn selected_cells(&self) -> Vec<(usize, usize)> {
        let col_positions = self.selection.selected_columns(self.columns.count());
        let row_positions = self.selection.selected_rows(self.rows.count());
        let mut cells = Vec::new();
        for &r in &row_positions {
            if !self.rows.is_visible(r) {
                continue;
            }
            for &c in &col_positions {
                if self.columns.is_visible(c) && self.selection.is_selected(c, r) {
                    cells.push((self.columns.index_at(c), self.rows.index_at(r)));
                }
            }
        }
        cells
    }
}
