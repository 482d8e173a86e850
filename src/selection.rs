//! Focus/select/mouse cell tracking and multi-area selection

pub mod model;
pub mod position_state;

pub use model::{Area, SelectionEvent, SelectionModel, SelectionSnapshot};
pub use position_state::{CellChange, PositionState, TrackedCell};
