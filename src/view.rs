//! The embedding surface: one grid with its history, editors, mouse
//! gestures and background copy.
//!
//! Coordinates passed to the mouse methods are viewport pixels, header
//! included. Everything runs on the caller's thread except the copy job.

pub mod gesture;

use std::fmt;

use tracing::{debug, info};

use crate::config::GridConfig;
use crate::copy::{CopyEvent, CopyJob, CopyRequest};
use crate::editor::{CellEditor, EditKey, EditorRegistry};
use crate::error::{CopyError, EditError, ReorderError};
use crate::grid::{Axis, Grid};
use crate::position::{CellPos, Pos};
use crate::table::{self, CellValue, SharedTable};
use crate::transaction::{
    DeleteCommand, ReorderCommand, ResizeCommand, SetValueCommand, UndoCommand, UndoStack,
    VisibilityCommand, ZoomCommand,
};

pub use gesture::{fully_selected, Gesture, ReorderGesture, ResizeGesture, ZoomGesture};

/// Distance in pixels from a header edge that starts a resize
pub const RESIZE_MARGIN: i64 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

impl Direction {
    fn axis(self) -> Axis {
        match self {
            Direction::Left | Direction::Right => Axis::Column,
            Direction::Up | Direction::Down => Axis::Row,
        }
    }

    fn sign(self) -> isize {
        match self {
            Direction::Left | Direction::Up => -1,
            Direction::Right | Direction::Down => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
    };
    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ctrl: false,
    };
    pub const CTRL: Modifiers = Modifiers {
        shift: false,
        ctrl: true,
    };
}

struct EditSession {
    col: usize,
    row: usize,
    editor: Box<dyn CellEditor>,
}

pub struct TableView {
    grid: Grid,
    history: UndoStack<Grid>,
    editors: EditorRegistry,
    config: GridConfig,
    /// Body scroll offsets (x, y) in pixels
    scroll: (i64, i64),
    /// Viewport size (width, height) in pixels, header included
    viewport: (i64, i64),
    gesture: Option<Gesture>,
    edit: Option<EditSession>,
    copy: Option<CopyJob>,
}

impl fmt::Debug for TableView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableView")
            .field("grid", &self.grid)
            .field("history", &self.history)
            .field("scroll", &self.scroll)
            .field("viewport", &self.viewport)
            .field("gesture", &self.gesture)
            .field("editing", &self.edit.is_some())
            .field("copying", &self.copy.is_some())
            .finish()
    }
}

fn clamp_pos(pos: Pos, count: usize) -> Option<Pos> {
    match pos {
        Pos::Cell(p) if p >= count => count.checked_sub(1).map(Pos::Cell),
        other => Some(other),
    }
}

impl TableView {
    pub fn new(data: SharedTable, config: GridConfig) -> Self {
        Self {
            grid: Grid::new(data, &config),
            history: UndoStack::with_limit(config.undo.limit),
            editors: EditorRegistry::new(),
            config,
            scroll: (0, 0),
            viewport: (800, 600),
            gesture: None,
            edit: None,
            copy: None,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn grid_mut(&mut self) -> &mut Grid {
        &mut self.grid
    }

    pub fn history(&self) -> &UndoStack<Grid> {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut UndoStack<Grid> {
        &mut self.history
    }

    pub fn editors_mut(&mut self) -> &mut EditorRegistry {
        &mut self.editors
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    // === Viewport ===

    pub fn scroll(&self) -> (i64, i64) {
        self.scroll
    }

    pub fn viewport(&self) -> (i64, i64) {
        self.viewport
    }

    pub fn set_viewport(&mut self, width: i64, height: i64) {
        self.viewport = (width.max(0), height.max(0));
        self.set_scroll(self.scroll.0, self.scroll.1);
    }

    /// Scroll the body, clamped so the last line can reach the bottom or
    /// right edge but no further
    pub fn set_scroll(&mut self, x: i64, y: i64) {
        let max_x = (self.grid.columns.total_pixels() - self.viewport.0).max(0);
        let max_y = (self.grid.rows.total_pixels() - self.viewport.1).max(0);
        self.scroll = (x.clamp(0, max_x), y.clamp(0, max_y));
    }

    fn scroll_of(&self, axis: Axis) -> i64 {
        match axis {
            Axis::Column => self.scroll.0,
            Axis::Row => self.scroll.1,
        }
    }

    fn extent_of(&self, axis: Axis) -> i64 {
        match axis {
            Axis::Column => self.viewport.0,
            Axis::Row => self.viewport.1,
        }
    }

    /// First and last body positions at least partly inside the viewport
    pub fn visible_range(&mut self, axis: Axis) -> Option<(usize, usize)> {
        let scroll = self.scroll_of(axis);
        let extent = self.extent_of(axis);
        let table_axis = self.grid.axis_mut(axis);
        let count = table_axis.count();
        let header = table_axis.sizes().header_pixels();
        let first = table_axis.position_at(header, scroll).clamp_to_body(count)?;
        let last = table_axis
            .position_at((extent - 1).max(header), scroll)
            .clamp_to_body(count)?;
        Some((first, last))
    }

    fn scroll_to(&mut self, col: usize, row: usize) {
        let x = self
            .grid
            .columns
            .scroll_to_visible(col, self.scroll.0, self.viewport.0);
        let y = self
            .grid
            .rows
            .scroll_to_visible(row, self.scroll.1, self.viewport.1);
        self.scroll = (x, y);
    }

    /// Pick up row/column count changes of the table data
    pub fn sync_counts(&mut self) {
        self.grid.sync_counts();
        let (cols, rows) = (self.grid.columns.count(), self.grid.rows.count());
        let positions = &mut self.grid.positions;
        for cell in [&mut positions.focus, &mut positions.select, &mut positions.mouse] {
            let Some(current) = cell.get() else {
                continue;
            };
            match (clamp_pos(current.col, cols), clamp_pos(current.row, rows)) {
                (Some(col), Some(row)) => {
                    cell.set(CellPos { col, row });
                }
                _ => {
                    cell.clear();
                }
            }
        }
        if let Some(edit) = &self.edit {
            if edit.col >= cols || edit.row >= rows {
                debug!("edited cell disappeared, closing editor");
                self.edit = None;
            }
        }
        self.set_scroll(self.scroll.0, self.scroll.1);
    }

    // === Keyboard ===

    fn select_cell(&self) -> Option<(usize, usize)> {
        self.grid.positions.select.get()?.body()
    }

    fn focus_cell(&self) -> Option<(usize, usize)> {
        self.grid.positions.focus.get()?.body()
    }

    /// Put `select` on a cell. Without `extend` focus follows and the
    /// selection collapses to that cell; with it the current area stretches
    /// from focus.
    pub fn move_select_to(&mut self, col: usize, row: usize, extend: bool) {
        let cell = CellPos::new(col, row);
        match self.focus_cell() {
            Some(focus) if extend => {
                self.grid.positions.select.set(cell);
                if self.grid.selection.current_area().is_none() {
                    self.grid.selection.start(focus, false);
                }
                self.grid.selection.drag((col, row));
            }
            _ => {
                self.grid.positions.set_both(cell);
                self.grid.selection.start((col, row), false);
            }
        }
        self.scroll_to(col, row);
    }

    fn first_cell(&self) -> Option<(usize, usize)> {
        Some((self.grid.columns.first()?, self.grid.rows.first()?))
    }

    /// Arrow keys: step to the next visible cell
    pub fn navigate(&mut self, direction: Direction, extend: bool) {
        let Some((col, row)) = self.select_cell() else {
            if let Some((col, row)) = self.first_cell() {
                self.move_select_to(col, row, false);
            }
            return;
        };
        let axis = self.grid.axis(direction.axis());
        let current = match direction.axis() {
            Axis::Column => col,
            Axis::Row => row,
        };
        let next = axis
            .step(Pos::Cell(current), direction.sign())
            .cell()
            .unwrap_or(current);
        match direction.axis() {
            Axis::Column => self.move_select_to(next, row, extend),
            Axis::Row => self.move_select_to(col, next, extend),
        }
    }

    /// Page keys: move one viewport along the axis and scroll with it
    pub fn page(&mut self, direction: Direction, extend: bool) {
        let Some((col, row)) = self.select_cell() else {
            self.navigate(direction, extend);
            return;
        };
        let axis_kind = direction.axis();
        let extent = self.extent_of(axis_kind);
        let scroll = self.scroll_of(axis_kind);
        let current = match axis_kind {
            Axis::Column => col,
            Axis::Row => row,
        };

        let axis = self.grid.axis_mut(axis_kind);
        let page = (extent - axis.sizes().header_pixels()).max(1);
        let start = axis.start_offset(Pos::Cell(current), 0);
        let target = start + direction.sign() as i64 * page;
        let landed = match axis.position_at(target, 0) {
            Pos::Before | Pos::Header => axis.first(),
            Pos::After => axis.last(),
            Pos::Cell(p) => axis.first_visible_from(p).or_else(|| axis.last_visible_to(p)),
        };
        let Some(next) = landed else {
            return;
        };
        let moved = axis.start_offset(Pos::Cell(next), 0) - start;

        match axis_kind {
            Axis::Column => self.set_scroll(scroll + moved, self.scroll.1),
            Axis::Row => self.set_scroll(self.scroll.0, scroll + moved),
        }
        match axis_kind {
            Axis::Column => self.move_select_to(next, row, extend),
            Axis::Row => self.move_select_to(col, next, extend),
        }
    }

    /// First visible column of the current row
    pub fn home(&mut self, extend: bool) {
        let row = self.select_cell().map(|(_, r)| Some(r)).unwrap_or(self.grid.rows.first());
        if let (Some(col), Some(row)) = (self.grid.columns.first(), row) {
            self.move_select_to(col, row, extend);
        }
    }

    /// Last visible column of the current row
    pub fn end(&mut self, extend: bool) {
        let row = self.select_cell().map(|(_, r)| Some(r)).unwrap_or(self.grid.rows.first());
        if let (Some(col), Some(row)) = (self.grid.columns.last(), row) {
            self.move_select_to(col, row, extend);
        }
    }

    /// First visible row of the current column
    pub fn top(&mut self, extend: bool) {
        let col = self.select_cell().map(|(c, _)| Some(c)).unwrap_or(self.grid.columns.first());
        if let (Some(col), Some(row)) = (col, self.grid.rows.first()) {
            self.move_select_to(col, row, extend);
        }
    }

    /// Last visible row of the current column
    pub fn bottom(&mut self, extend: bool) {
        let col = self.select_cell().map(|(c, _)| Some(c)).unwrap_or(self.grid.columns.first());
        if let (Some(col), Some(row)) = (col, self.grid.rows.last()) {
            self.move_select_to(col, row, extend);
        }
    }

    pub fn select_all(&mut self) {
        self.grid.selection.select_all();
    }

    pub fn clear_selection(&mut self) {
        self.grid.selection.clear();
    }

    // === Mouse ===

    fn cell_under(&mut self, x: i64, y: i64) -> CellPos {
        CellPos {
            col: self.grid.columns.position_at(x, self.scroll.0),
            row: self.grid.rows.position_at(y, self.scroll.1),
        }
    }

    pub fn hover(&mut self, x: i64, y: i64) {
        let cell = self.cell_under(x, y);
        self.grid.positions.mouse.set(cell);
    }

    /// The pointer left the grid
    pub fn leave(&mut self) {
        self.grid.positions.mouse.clear();
    }

    /// Mouse button down. Pressing a fully selected header starts a
    /// reorder; the corner selects everything.
    pub fn press(&mut self, x: i64, y: i64, modifiers: Modifiers) {
        self.cancel_gesture();
        let cell = self.cell_under(x, y);
        self.grid.positions.mouse.set(cell);
        match (cell.col, cell.row) {
            (Pos::Header, Pos::Header) => self.select_all(),
            (Pos::Cell(c), Pos::Header) => self.press_header(Axis::Column, c, x, modifiers),
            (Pos::Header, Pos::Cell(r)) => self.press_header(Axis::Row, r, y, modifiers),
            (Pos::Cell(c), Pos::Cell(r)) => self.press_cell(c, r, modifiers),
            _ => {}
        }
    }

    /// Position whose far edge lies within the resize margin of
    /// `coordinate` on header cell `position`
    fn edge_at(&mut self, axis: Axis, position: usize, coordinate: i64) -> Option<usize> {
        let scroll = self.scroll_of(axis);
        let table_axis = self.grid.axis_mut(axis);
        let start = table_axis.start_offset(Pos::Cell(position), scroll);
        let end = table_axis.start_offset(Pos::Cell(position + 1), scroll);
        if end - coordinate <= RESIZE_MARGIN {
            Some(position)
        } else if coordinate - start <= RESIZE_MARGIN {
            position.checked_sub(1).and_then(|p| table_axis.last_visible_to(p))
        } else {
            None
        }
    }

    fn press_header(
        &mut self,
        axis: Axis,
        position: usize,
        coordinate: i64,
        modifiers: Modifiers,
    ) {
        if let Some(edge) = self.edge_at(axis, position, coordinate) {
            let table_axis = self.grid.axis(axis);
            let edge_index = table_axis.index_at(edge);
            let selected = fully_selected(&self.grid, axis);
            let indexes = if selected.contains(&edge) {
                selected.iter().map(|&p| table_axis.index_at(p)).collect()
            } else {
                vec![edge_index]
            };
            let gesture = ResizeGesture::start(&self.grid, axis, indexes, edge_index, coordinate);
            self.gesture = Some(Gesture::Resize(gesture));
            return;
        }

        let fully = match axis {
            Axis::Column => self
                .grid
                .selection
                .is_column_fully_selected(position, &self.grid.rows),
            Axis::Row => self
                .grid
                .selection
                .is_row_fully_selected(position, &self.grid.columns),
        };
        if fully && !modifiers.shift && !modifiers.ctrl {
            let gesture = match ReorderGesture::start(&self.grid, axis) {
                Ok(reorder) => Gesture::Reorder(reorder),
                Err(refusal) => {
                    debug!(%refusal, "reorder unavailable, waiting for drag or release");
                    Gesture::HeaderPress {
                        axis,
                        position,
                        refusal,
                    }
                }
            };
            self.gesture = Some(gesture);
            return;
        }

        if self.select_lines(axis, position, modifiers) {
            self.gesture = Some(Gesture::SelectLines(axis));
        }
    }

    /// Select the whole line at `position`, or from the focus line to it
    /// with shift. Returns `false` when the other axis has nothing visible.
    fn select_lines(&mut self, axis: Axis, position: usize, modifiers: Modifiers) -> bool {
        let other = self.grid.axis(axis.other());
        let (Some(first), Some(last)) = (other.first(), other.last()) else {
            return false;
        };
        let last_line = other.count() - 1;
        let anchor = match (modifiers.shift, self.focus_cell()) {
            (true, Some((c, r))) => match axis {
                Axis::Column => c,
                Axis::Row => r,
            },
            _ => position,
        };
        match axis {
            Axis::Column => {
                self.grid.selection.start((anchor, 0), modifiers.ctrl);
                self.grid.selection.drag((position, last_line));
                self.grid.positions.focus.set(CellPos::new(anchor, first));
                self.grid.positions.select.set(CellPos::new(position, last));
            }
            Axis::Row => {
                self.grid.selection.start((0, anchor), modifiers.ctrl);
                self.grid.selection.drag((last_line, position));
                self.grid.positions.focus.set(CellPos::new(first, anchor));
                self.grid.positions.select.set(CellPos::new(last, position));
            }
        }
        true
    }

    fn press_cell(&mut self, col: usize, row: usize, modifiers: Modifiers) {
        if modifiers.shift && self.focus_cell().is_some() {
            self.move_select_to(col, row, true);
        } else {
            self.grid.positions.set_both(CellPos::new(col, row));
            self.grid.selection.start((col, row), modifiers.ctrl);
        }
        self.gesture = Some(Gesture::SelectCells);
    }

    /// Pointer moved with the button held. Dragging a header whose lines
    /// cannot move ends the gesture with the refusal.
    pub fn drag(&mut self, x: i64, y: i64) -> Result<(), ReorderError> {
        let cell = self.cell_under(x, y);
        self.grid.positions.mouse.set(cell);
        let Some(mut gesture) = self.gesture.take() else {
            return Ok(());
        };
        let (cols, rows) = (self.grid.columns.count(), self.grid.rows.count());
        match &mut gesture {
            Gesture::SelectCells => {
                if let (Some(c), Some(r)) = (cell.col.clamp_to_body(cols), cell.row.clamp_to_body(rows)) {
                    self.grid.positions.select.set(CellPos::new(c, r));
                    self.grid.selection.drag((c, r));
                }
            }
            Gesture::SelectLines(Axis::Column) => {
                if let (Some(c), Some(last)) = (cell.col.clamp_to_body(cols), rows.checked_sub(1)) {
                    self.grid.positions.select.set_col(Pos::Cell(c));
                    self.grid.selection.drag((c, last));
                }
            }
            Gesture::SelectLines(Axis::Row) => {
                if let (Some(r), Some(last)) = (cell.row.clamp_to_body(rows), cols.checked_sub(1)) {
                    self.grid.positions.select.set_row(Pos::Cell(r));
                    self.grid.selection.drag((last, r));
                }
            }
            Gesture::Resize(resize) => {
                let coordinate = match resize.axis() {
                    Axis::Column => x,
                    Axis::Row => y,
                };
                resize.update(&mut self.grid, coordinate);
            }
            Gesture::Reorder(reorder) => {
                let (coordinate, scroll) = match reorder.axis() {
                    Axis::Column => (x, self.scroll.0),
                    Axis::Row => (y, self.scroll.1),
                };
                reorder.update(&mut self.grid, coordinate, scroll);
            }
            Gesture::HeaderPress {
                axis,
                position,
                refusal,
            } => {
                let over = match axis {
                    Axis::Column => cell.col,
                    Axis::Row => cell.row,
                };
                if over != Pos::Cell(*position) {
                    return Err(refusal.clone());
                }
            }
            Gesture::Zoom(_) => {}
        }
        self.gesture = Some(gesture);
        Ok(())
    }

    /// Button released: finish the gesture. Returns whether an undo step
    /// was recorded.
    pub fn release(&mut self, x: i64, y: i64) -> bool {
        if matches!(self.gesture, Some(Gesture::Zoom(_))) {
            return false;
        }
        if let Err(refusal) = self.drag(x, y) {
            debug!(%refusal, "reorder refused on release");
            return false;
        }
        match self.gesture.take() {
            Some(Gesture::HeaderPress { axis, position, .. }) => {
                self.select_lines(axis, position, Modifiers::NONE);
                false
            }
            Some(Gesture::Resize(resize)) => resize.finish(&mut self.grid, &mut self.history),
            Some(Gesture::Reorder(reorder)) => reorder.finish(&mut self.grid, &mut self.history),
            Some(Gesture::Zoom(zoom)) => zoom.finish(&mut self.history),
            _ => false,
        }
    }

    /// Where a reorder drag would drop, for drawing the insertion mark
    pub fn drop_position(&self) -> Result<(Axis, usize), ReorderError> {
        match &self.gesture {
            Some(Gesture::Reorder(reorder)) => reorder
                .destination()
                .map(|d| (reorder.axis(), d))
                .ok_or(ReorderError::NotActive),
            _ => Err(ReorderError::NotActive),
        }
    }

    /// Abandon the gesture, reverting anything it applied
    pub fn cancel_gesture(&mut self) {
        match self.gesture.take() {
            Some(Gesture::Resize(resize)) => resize.cancel(&mut self.grid),
            Some(Gesture::Zoom(zoom)) => zoom.cancel(&mut self.grid),
            _ => {}
        }
    }

    // === Zoom ===

    pub fn zoom_gesture_start(&mut self) {
        self.cancel_gesture();
        let gesture = ZoomGesture::start(&self.grid, self.config.zoom.clone());
        self.gesture = Some(Gesture::Zoom(gesture));
    }

    /// Scale relative to the zoom at gesture start
    pub fn zoom_gesture_update(&mut self, factor: f64) {
        if let Some(Gesture::Zoom(zoom)) = self.gesture.as_mut() {
            zoom.update(&mut self.grid, factor);
        }
    }

    pub fn zoom_gesture_end(&mut self) -> bool {
        match self.gesture.take() {
            Some(Gesture::Zoom(zoom)) => {
                let recorded = zoom.finish(&mut self.history);
                self.set_scroll(self.scroll.0, self.scroll.1);
                recorded
            }
            other => {
                self.gesture = other;
                false
            }
        }
    }

    /// Set both zooms in one undo step, clamped to the configured range
    pub fn set_zoom(&mut self, column_zoom: f64, row_zoom: f64) -> bool {
        let range = &self.config.zoom;
        let command = ZoomCommand::new(&self.grid, range.clamp(column_zoom), range.clamp(row_zoom));
        let pushed = self.push(command);
        self.set_scroll(self.scroll.0, self.scroll.1);
        pushed
    }

    pub fn zoom_by(&mut self, factor: f64) -> bool {
        let (c, r) = (self.grid.columns.zoom(), self.grid.rows.zoom());
        self.set_zoom(c * factor, r * factor)
    }

    // === Structural edits ===

    fn push(&mut self, command: impl UndoCommand<Grid> + 'static) -> bool {
        if !command.is_valid() {
            debug!(text = %command.text(), "command changes nothing, skipped");
            return false;
        }
        self.history.push(&mut self.grid, Box::new(command))
    }

    /// Positions touched by the selection, or the focus line when nothing
    /// is selected
    fn selected_lines(&self, axis: Axis) -> Vec<usize> {
        let count = self.grid.axis(axis).count();
        let lines = match axis {
            Axis::Column => self.grid.selection.selected_columns(count),
            Axis::Row => self.grid.selection.selected_rows(count),
        };
        if !lines.is_empty() {
            return lines;
        }
        match (self.focus_cell(), axis) {
            (Some((c, _)), Axis::Column) => vec![c],
            (Some((_, r)), Axis::Row) => vec![r],
            (None, _) => Vec::new(),
        }
    }

    fn indexes_of(&self, axis: Axis, positions: &[usize]) -> Vec<usize> {
        let table_axis = self.grid.axis(axis);
        positions.iter().map(|&p| table_axis.index_at(p)).collect()
    }

    /// Give the lines at `positions` one size
    pub fn resize(&mut self, axis: Axis, positions: &[usize], size: i32) -> bool {
        let indexes = self.indexes_of(axis, positions);
        if indexes.is_empty() {
            return false;
        }
        let command = ResizeCommand::new(&self.grid, axis, indexes, size);
        self.push(command)
    }

    pub fn resize_selected(&mut self, axis: Axis, size: i32) -> bool {
        let positions = self.selected_lines(axis);
        self.resize(axis, &positions, size)
    }

    /// Move the fully selected lines in front of `destination`. Returns
    /// whether the order changed.
    pub fn move_selected(&mut self, axis: Axis, destination: usize) -> Result<bool, ReorderError> {
        self.cancel_gesture();
        let gesture = ReorderGesture::start(&self.grid, axis)?;
        let command = ReorderCommand::perform(&mut self.grid, axis, gesture.positions(), destination);
        Ok(command.is_valid() && self.history.push_done(Box::new(command)))
    }

    pub fn hide_selected(&mut self, axis: Axis) -> bool {
        let positions = self.selected_lines(axis);
        let indexes = self.indexes_of(axis, &positions);
        let command = VisibilityCommand::hide(&self.grid, axis, &indexes);
        self.push(command)
    }

    pub fn unhide_all(&mut self, axis: Axis) -> bool {
        let table_axis = self.grid.axis(axis);
        let hidden: Vec<usize> = (0..table_axis.count())
            .filter(|&i| table_axis.is_hidden(i))
            .collect();
        let command = VisibilityCommand::unhide(&self.grid, axis, &hidden);
        self.push(command)
    }

    // === Data edits ===

    /// Write a cell by position. `Ok(false)` when the value is unchanged.
    pub fn set_value(&mut self, col: usize, row: usize, value: CellValue) -> Result<bool, EditError> {
        let col = self.grid.columns.index_at(col);
        let row = self.grid.rows.index_at(row);
        let command = SetValueCommand::new(&self.grid, col, row, value);
        if let Some(reason) = command.rejection() {
            return Err(EditError::Rejected(reason.to_string()));
        }
        Ok(self.push(command))
    }

    /// Null every selected cell
    pub fn delete_selection(&mut self) -> bool {
        let command = DeleteCommand::new(&self.grid);
        self.push(command)
    }

    pub fn value_at(&self, col: usize, row: usize) -> CellValue {
        self.grid.value_at(col, row)
    }

    // === Editing ===

    pub fn is_editing(&self) -> bool {
        self.edit.is_some()
    }

    /// Open the column's editor on the focus cell
    pub fn begin_edit(&mut self) -> Result<(), EditError> {
        if self.edit.is_some() {
            return Err(EditError::AlreadyEditing);
        }
        let (col_pos, row_pos) = self.focus_cell().ok_or(EditError::NoFocus)?;
        if !self.grid.columns.is_visible(col_pos) || !self.grid.rows.is_visible(row_pos) {
            return Err(EditError::NoFocus);
        }
        let col = self.grid.columns.index_at(col_pos);
        let row = self.grid.rows.index_at(row_pos);
        let mut editor = self.editors.create(col);
        editor.set_value(table::read(self.grid.data()).get_value(col, row));
        debug!(col, row, "edit started");
        self.edit = Some(EditSession { col, row, editor });
        Ok(())
    }

    pub fn editor(&self) -> Option<&dyn CellEditor> {
        self.edit.as_ref().map(|e| e.editor.as_ref())
    }

    pub fn edit_input(&mut self, key: EditKey) -> bool {
        match self.edit.as_mut() {
            Some(edit) => {
                edit.editor.input(key);
                true
            }
            None => false,
        }
    }

    /// Write the editor's value as one undo step and close the editor.
    /// A rejected value keeps the editor open.
    pub fn commit_edit(&mut self) -> Result<bool, EditError> {
        let edit = self.edit.as_ref().ok_or(EditError::NotEditing)?;
        if !edit.editor.is_valid() {
            return Err(EditError::Rejected("invalid value".to_string()));
        }
        let command = SetValueCommand::new(&self.grid, edit.col, edit.row, edit.editor.get_value());
        if let Some(reason) = command.rejection() {
            return Err(EditError::Rejected(reason.to_string()));
        }
        self.edit = None;
        Ok(self.push(command))
    }

    pub fn cancel_edit(&mut self) -> bool {
        self.edit.take().is_some()
    }

    // === History ===

    pub fn undo(&mut self) -> bool {
        self.cancel_gesture();
        self.history.undo(&mut self.grid)
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_gesture();
        self.history.redo(&mut self.grid)
    }

    pub fn set_undo_index(&mut self, index: usize) {
        self.cancel_gesture();
        self.history.set_index(&mut self.grid, index);
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_text(&self) -> Option<String> {
        self.history.undo_text()
    }

    pub fn redo_text(&self) -> Option<String> {
        self.history.redo_text()
    }

    /// The embedding application saved the data
    pub fn mark_saved(&mut self) {
        self.history.set_clean();
    }

    pub fn is_modified(&self) -> bool {
        !self.history.is_clean()
    }

    // === Copy ===

    /// Start copying the selection in the background. A copy already
    /// running is cancelled.
    pub fn copy_selection(&mut self) -> Result<(), CopyError> {
        let request = CopyRequest::from_grid(&self.grid, self.config.copy.max_cells)?;
        if let Some(job) = self.copy.take() {
            info!("replacing running copy");
            job.cancel();
        }
        let data = self.grid.data().clone();
        self.copy = Some(CopyJob::spawn(data, request, self.config.copy.chunk_rows));
        Ok(())
    }

    /// Next event of the running copy, if any. The job is dropped after
    /// its final event.
    pub fn poll_copy(&mut self) -> Option<CopyEvent> {
        let job = self.copy.as_mut()?;
        let event = job.try_recv();
        if job.is_done() {
            self.copy = None;
        }
        event
    }

    pub fn is_copying(&self) -> bool {
        self.copy.is_some()
    }

    pub fn cancel_copy(&mut self) -> bool {
        match &self.copy {
            Some(job) => {
                job.cancel();
                true
            }
            None => false,
        }
    }

    /// Status line text for the running copy
    pub fn copy_status(&self) -> Option<String> {
        self.copy.as_ref().map(|job| job.progress().format("Copying"))
    }
}

#[cfg(test)]
mod test;
