use std::cmp;

use crate::axis::TableAxis;
use crate::observer::{ListenerId, Observers};

/// A normalized rectangle of body positions, both corners inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Area {
    pub c1: usize,
    pub r1: usize,
    pub c2: usize,
    pub r2: usize,
}

impl Area {
    /// Rectangle spanned by two corners in any order
    pub fn new(col_a: usize, row_a: usize, col_b: usize, row_b: usize) -> Self {
        Self {
            c1: cmp::min(col_a, col_b),
            r1: cmp::min(row_a, row_b),
            c2: cmp::max(col_a, col_b),
            r2: cmp::max(row_a, row_b),
        }
    }

    pub fn cell(col: usize, row: usize) -> Self {
        Self::new(col, row, col, row)
    }

    pub fn contains(&self, col: usize, row: usize) -> bool {
        self.c1 <= col && col <= self.c2 && self.r1 <= row && row <= self.r2
    }

    pub fn width(&self) -> usize {
        self.c2 - self.c1 + 1
    }

    pub fn height(&self) -> usize {
        self.r2 - self.r1 + 1
    }

    pub fn union(&self, other: &Area) -> Area {
        Area {
            c1: cmp::min(self.c1, other.c1),
            r1: cmp::min(self.r1, other.r1),
            c2: cmp::max(self.c2, other.c2),
            r2: cmp::max(self.r2, other.r2),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionEvent {
    Changed,
}

/// Plain copy of a selection, cheap to keep in undo commands or hand to a
/// worker thread
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionSnapshot {
    pub areas: Vec<Area>,
    pub all: bool,
}

impl SelectionSnapshot {
    pub fn is_selected(&self, col: usize, row: usize) -> bool {
        self.all || self.areas.iter().any(|a| a.contains(col, row))
    }
}

/// Ordered set of selected areas plus a compact "everything" flag.
///
/// The last area is the current one: drags only ever reshape it.
#[derive(Debug, Default)]
pub struct SelectionModel {
    areas: Vec<Area>,
    all: bool,
    /// Fixed corner of the current area
    anchor: Option<(usize, usize)>,
    observers: Observers<SelectionEvent>,
}

impl SelectionModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&SelectionEvent) + 'static) -> ListenerId {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.observers.unsubscribe(id)
    }

    fn changed(&mut self) {
        self.observers.emit(&SelectionEvent::Changed);
    }

    // === Queries ===

    pub fn areas(&self) -> &[Area] {
        &self.areas
    }

    pub fn current_area(&self) -> Option<&Area> {
        self.areas.last()
    }

    pub fn is_all(&self) -> bool {
        self.all
    }

    pub fn is_empty(&self) -> bool {
        !self.all && self.areas.is_empty()
    }

    pub fn is_selected(&self, col: usize, row: usize) -> bool {
        self.all || self.areas.iter().any(|a| a.contains(col, row))
    }

    /// Overlap depth at a cell: how many areas cover it. `all` counts once.
    pub fn selection_count(&self, col: usize, row: usize) -> usize {
        let covering = self.areas.iter().filter(|a| a.contains(col, row)).count();
        covering + usize::from(self.all)
    }

    /// Bounding box of every area, `None` for an empty or `all` selection
    pub fn bounds(&self) -> Option<Area> {
        let mut areas = self.areas.iter();
        let first = *areas.next()?;
        Some(areas.fold(first, |acc, a| acc.union(a)))
    }

    /// Every visible row position of `col` is covered by some area.
    /// Hidden rows do not need coverage.
    pub fn is_column_fully_selected(&self, col: usize, rows: &TableAxis) -> bool {
        if self.all {
            return true;
        }
        self.covers_line(rows, |row| {
            self.areas
                .iter()
                .filter(|a| a.contains(col, row))
                .map(|a| a.r2)
                .max()
        })
    }

    /// Every visible column position of `row` is covered by some area.
    /// Hidden columns do not need coverage.
    pub fn is_row_fully_selected(&self, row: usize, columns: &TableAxis) -> bool {
        if self.all {
            return true;
        }
        self.covers_line(columns, |col| {
            self.areas
                .iter()
                .filter(|a| a.contains(col, row))
                .map(|a| a.c2)
                .max()
        })
    }

    /// Walk the visible positions of `axis`, jumping to the far edge of the
    /// area covering each one. `far_edge` returns that edge, or `None` when
    /// the position is not covered.
    fn covers_line(&self, axis: &TableAxis, far_edge: impl Fn(usize) -> Option<usize>) -> bool {
        let Some(mut position) = axis.first() else {
            return false;
        };
        loop {
            let Some(edge) = far_edge(position) else {
                return false;
            };
            match axis.first_visible_from(edge + 1) {
                Some(next) => position = next,
                None => return true,
            }
        }
    }

    pub fn snapshot(&self) -> SelectionSnapshot {
        SelectionSnapshot {
            areas: self.areas.clone(),
            all: self.all,
        }
    }

    // === Mutations ===

    pub fn restore(&mut self, snapshot: SelectionSnapshot) {
        self.anchor = snapshot
            .areas
            .last()
            .map(|a| (a.c1, a.r1));
        self.areas = snapshot.areas;
        self.all = snapshot.all;
        self.changed();
    }

    pub fn clear(&mut self) {
        self.anchor = None;
        if self.is_empty() {
            return;
        }
        self.areas.clear();
        self.all = false;
        self.changed();
    }

    pub fn select_all(&mut self) {
        self.areas.clear();
        self.anchor = None;
        self.all = true;
        self.changed();
    }

    /// Begin a new area at `anchor` (normally the focus cell). Without
    /// `additive` every earlier area is dropped first.
    pub fn start(&mut self, anchor: (usize, usize), additive: bool) {
        if !additive {
            self.areas.clear();
            self.all = false;
        }
        self.anchor = Some(anchor);
        self.areas.push(Area::cell(anchor.0, anchor.1));
        self.changed();
    }

    /// Move the far corner of the current area. Starts an area at `to` when
    /// none is in progress.
    pub fn drag(&mut self, to: (usize, usize)) {
        let Some(anchor) = self.anchor else {
            self.start(to, false);
            return;
        };
        let area = Area::new(anchor.0, anchor.1, to.0, to.1);
        match self.areas.last_mut() {
            Some(last) if *last == area => return,
            Some(last) => *last = area,
            None => self.areas.push(area),
        }
        self.changed();
    }

    /// Append a finished area
    pub fn add_area(&mut self, area: Area) {
        self.anchor = Some((area.c1, area.r1));
        self.areas.push(area);
        self.changed();
    }

    /// Select whole columns `c1..=c2` over `row_count` rows
    pub fn select_columns(&mut self, c1: usize, c2: usize, row_count: usize, additive: bool) {
        let Some(last_row) = row_count.checked_sub(1) else {
            return;
        };
        if !additive {
            self.areas.clear();
            self.all = false;
        }
        self.add_area(Area::new(c1, 0, c2, last_row));
    }

    /// Select whole rows `r1..=r2` over `col_count` columns
    pub fn select_rows(&mut self, r1: usize, r2: usize, col_count: usize, additive: bool) {
        let Some(last_col) = col_count.checked_sub(1) else {
            return;
        };
        if !additive {
            self.areas.clear();
            self.all = false;
        }
        self.add_area(Area::new(0, r1, last_col, r2));
    }

    /// Column positions touched by any area, ascending
    pub fn selected_columns(&self, col_count: usize) -> Vec<usize> {
        if self.all {
            return (0..col_count).collect();
        }
        (0..col_count)
            .filter(|&c| self.areas.iter().any(|a| a.c1 <= c && c <= a.c2))
            .collect()
    }

    /// Row positions touched by any area, ascending
    pub fn selected_rows(&self, row_count: usize) -> Vec<usize> {
        if self.all {
            return (0..row_count).collect();
        }
        (0..row_count)
            .filter(|&r| self.areas.iter().any(|a| a.r1 <= r && r <= a.r2))
            .collect()
    }
}
