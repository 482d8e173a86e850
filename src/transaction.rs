//! Undoable commands and the history that records them

pub mod command;
pub mod edit;
pub mod history;
pub mod reorder;
pub mod resize;
pub mod visibility;
pub mod zoom;

pub use command::UndoCommand;
pub use edit::{DeleteCommand, SetValueCommand};
pub use history::{StackEvent, UndoStack};
pub use reorder::ReorderCommand;
pub use resize::ResizeCommand;
pub use visibility::VisibilityCommand;
pub use zoom::ZoomCommand;
