use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum CopyError {
    #[error("nothing selected")]
    NothingSelected,

    #[error("selection too large to copy ({cells} cells, limit {limit})")]
    TooLarge { cells: usize, limit: usize },

    #[error("copy worker stopped unexpectedly")]
    Interrupted,

    #[error("cannot encode selection: {0}")]
    Encode(#[from] csv::Error),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReorderError {
    #[error("all {0}s selected, cannot reorder")]
    AllSelected(crate::grid::Axis),

    #[error("no {0}s selected to move")]
    NothingSelected(crate::grid::Axis),

    #[error("no reorder in progress")]
    NotActive,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EditError {
    #[error("no cell is focused")]
    NoFocus,

    #[error("an edit is already open")]
    AlreadyEditing,

    #[error("no edit is open")]
    NotEditing,

    #[error("{0}")]
    Rejected(String),
}
