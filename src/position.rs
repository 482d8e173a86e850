use std::fmt;

/// A position along one axis in visual space.
///
/// The variant order is load-bearing: `Before < Header < Cell(0) < ... < After`,
/// so boundary checks can be written as plain comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Pos {
    /// Left of / above the first body cell, e.g. a drag that left the grid
    Before,
    /// The fixed header cell
    Header,
    /// A body position, `0..count`
    Cell(usize),
    /// Right of / below the last body cell
    After,
}

impl Pos {
    pub fn cell(self) -> Option<usize> {
        match self {
            Pos::Cell(p) => Some(p),
            _ => None,
        }
    }

    pub fn is_cell(self) -> bool {
        matches!(self, Pos::Cell(_))
    }

    /// Clamp sentinels onto the body range `0..count`.
    /// Returns `None` for an empty axis.
    pub fn clamp_to_body(self, count: usize) -> Option<usize> {
        if count == 0 {
            return None;
        }
        match self {
            Pos::Before | Pos::Header => Some(0),
            Pos::Cell(p) => Some(p.min(count - 1)),
            Pos::After => Some(count - 1),
        }
    }
}

impl From<usize> for Pos {
    fn from(p: usize) -> Self {
        Pos::Cell(p)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pos::Before => write!(f, "before"),
            Pos::Header => write!(f, "header"),
            Pos::Cell(p) => write!(f, "{}", p),
            Pos::After => write!(f, "after"),
        }
    }
}

/// A (column, row) pair in position space
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPos {
    pub col: Pos,
    pub row: Pos,
}

impl CellPos {
    pub fn new(col: impl Into<Pos>, row: impl Into<Pos>) -> Self {
        Self { col: col.into(), row: row.into() }
    }

    /// Both components are body cells
    pub fn body(self) -> Option<(usize, usize)> {
        Some((self.col.cell()?, self.row.cell()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_ordering() {
        assert!(Pos::Before < Pos::Header);
        assert!(Pos::Header < Pos::Cell(0));
        assert!(Pos::Cell(0) < Pos::Cell(7));
        assert!(Pos::Cell(usize::MAX) < Pos::After);
    }

    #[test]
    fn clamp_to_body() {
        assert_eq!(Pos::Before.clamp_to_body(5), Some(0));
        assert_eq!(Pos::Header.clamp_to_body(5), Some(0));
        assert_eq!(Pos::Cell(9).clamp_to_body(5), Some(4));
        assert_eq!(Pos::After.clamp_to_body(5), Some(4));
        assert_eq!(Pos::After.clamp_to_body(0), None);
    }
}
