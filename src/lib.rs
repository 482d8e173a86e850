//! Axis, selection and undo engine for a virtualized spreadsheet-style grid.
//!
//! Rows and columns have a stable logical index and a visual position that
//! changes under reordering. Each axis maps between the two and turns
//! positions into pixel offsets under hiding, resizing and zooming. Every
//! structural or data change goes through an undoable command.
//!
//! Rendering, widgets and event dispatch live with the embedding
//! application; [`TableView`] is the surface it drives.

pub mod axis;
pub mod config;
pub mod copy;
pub mod editor;
pub mod error;
pub mod grid;
pub mod observer;
pub mod position;
pub mod progress;
pub mod selection;
pub mod table;
pub mod transaction;
pub mod view;

pub use axis::{AxisEvent, TableAxis};
pub use config::GridConfig;
pub use error::{ConfigError, CopyError, EditError, ReorderError};
pub use grid::{Axis, Grid};
pub use position::{CellPos, Pos};
pub use selection::{Area, SelectionModel};
pub use table::{CellValue, MemTable, SharedTable, TableData};
pub use transaction::{UndoCommand, UndoStack};
pub use view::{Direction, Modifiers, TableView};
