use crate::observer::{ListenerId, Observers};
use crate::position::{CellPos, Pos};

/// Old and new value of a tracked cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellChange {
    pub old: (Option<Pos>, Option<Pos>),
    pub new: (Option<Pos>, Option<Pos>),
}

/// An observable (column, row) pair. Components start unset.
#[derive(Debug, Default)]
pub struct TrackedCell {
    col: Option<Pos>,
    row: Option<Pos>,
    observers: Observers<CellChange>,
}

impl TrackedCell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn col(&self) -> Option<Pos> {
        self.col
    }

    pub fn row(&self) -> Option<Pos> {
        self.row
    }

    /// Both components, when both are set
    pub fn get(&self) -> Option<CellPos> {
        Some(CellPos {
            col: self.col?,
            row: self.row?,
        })
    }

    pub fn is_set(&self) -> bool {
        self.col.is_some() && self.row.is_some()
    }

    fn update(&mut self, col: Option<Pos>, row: Option<Pos>) -> bool {
        if col == self.col && row == self.row {
            return false;
        }
        let change = CellChange {
            old: (self.col, self.row),
            new: (col, row),
        };
        self.col = col;
        self.row = row;
        self.observers.emit(&change);
        true
    }

    pub fn set(&mut self, cell: CellPos) -> bool {
        self.update(Some(cell.col), Some(cell.row))
    }

    pub fn set_col(&mut self, col: Pos) -> bool {
        self.update(Some(col), self.row)
    }

    pub fn set_row(&mut self, row: Pos) -> bool {
        self.update(self.col, Some(row))
    }

    pub fn clear(&mut self) -> bool {
        self.update(None, None)
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&CellChange) + 'static) -> ListenerId {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.observers.unsubscribe(id)
    }
}

/// Focus (the anchor), select (the moving end) and mouse (hover) cells.
///
/// Keyboard navigation moves `select` and, without extension, pulls `focus`
/// along. A rubber-band drag moves `select` while `focus` stays put.
#[derive(Debug, Default)]
pub struct PositionState {
    pub focus: TrackedCell,
    pub select: TrackedCell,
    pub mouse: TrackedCell,
}

impl PositionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set focus and select to the same cell
    pub fn set_both(&mut self, cell: CellPos) {
        self.focus.set(cell);
        self.select.set(cell);
    }

    /// Body cells spanned by focus and select, normalized
    pub fn span(&self) -> Option<((usize, usize), (usize, usize))> {
        let (fc, fr) = self.focus.get()?.body()?;
        let (sc, sr) = self.select.get()?.body()?;
        Some(((fc.min(sc), fr.min(sr)), (fc.max(sc), fr.max(sr))))
    }
}
