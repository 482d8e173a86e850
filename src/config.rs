use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ConfigError;

/// Sizes of one axis, in units before zoom
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    pub default_size: i32,
    pub minimum_size: i32,
    pub header_size: i32,
}

impl AxisConfig {
    pub fn columns() -> Self {
        Self {
            default_size: 100,
            minimum_size: 20,
            header_size: 40,
        }
    }

    pub fn rows() -> Self {
        Self {
            default_size: 24,
            minimum_size: 8,
            header_size: 24,
        }
    }
}

impl Default for AxisConfig {
    fn default() -> Self {
        Self::columns()
    }
}

/// An `[columns]` or `[rows]` section as written; missing keys fall back
/// to that axis' own defaults
#[derive(Deserialize)]
struct AxisSection {
    default_size: Option<i32>,
    minimum_size: Option<i32>,
    header_size: Option<i32>,
}

impl AxisSection {
    fn over(self, base: AxisConfig) -> AxisConfig {
        AxisConfig {
            default_size: self.default_size.unwrap_or(base.default_size),
            minimum_size: self.minimum_size.unwrap_or(base.minimum_size),
            header_size: self.header_size.unwrap_or(base.header_size),
        }
    }
}

fn column_section<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AxisConfig, D::Error> {
    Ok(AxisSection::deserialize(deserializer)?.over(AxisConfig::columns()))
}

fn row_section<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AxisConfig, D::Error> {
    Ok(AxisSection::deserialize(deserializer)?.over(AxisConfig::rows()))
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ZoomConfig {
    #[serde(default = "ZoomConfig::default_minimum")]
    pub minimum: f64,
    #[serde(default = "ZoomConfig::default_maximum")]
    pub maximum: f64,
}

impl ZoomConfig {
    fn default_minimum() -> f64 {
        0.1
    }

    fn default_maximum() -> f64 {
        10.0
    }

    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.minimum, self.maximum)
    }
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            minimum: Self::default_minimum(),
            maximum: Self::default_maximum(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CopyConfig {
    /// Largest bounding box, in cells, a copy may cover
    #[serde(default = "CopyConfig::default_max_cells")]
    pub max_cells: usize,
    /// Rows formatted between two cancellation checks
    #[serde(default = "CopyConfig::default_chunk_rows")]
    pub chunk_rows: usize,
}

impl CopyConfig {
    fn default_max_cells() -> usize {
        1_000_000
    }

    fn default_chunk_rows() -> usize {
        crate::table::CHUNK_SIZE
    }
}

impl Default for CopyConfig {
    fn default() -> Self {
        Self {
            max_cells: Self::default_max_cells(),
            chunk_rows: Self::default_chunk_rows(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UndoConfig {
    /// Commands kept in the history, 0 for no limit
    #[serde(default)]
    pub limit: usize,
}

/// Grid settings, loadable from TOML. Every field has a default.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    #[serde(default = "AxisConfig::columns", deserialize_with = "column_section")]
    pub columns: AxisConfig,
    #[serde(default = "AxisConfig::rows", deserialize_with = "row_section")]
    pub rows: AxisConfig,
    #[serde(default)]
    pub zoom: ZoomConfig,
    #[serde(default)]
    pub copy: CopyConfig,
    #[serde(default)]
    pub undo: UndoConfig,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: AxisConfig::columns(),
            rows: AxisConfig::rows(),
            zoom: ZoomConfig::default(),
            copy: CopyConfig::default(),
            undo: UndoConfig::default(),
        }
    }
}

impl GridConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GridConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, axis) in [("columns", &self.columns), ("rows", &self.rows)] {
            if axis.minimum_size < 1 {
                return Err(ConfigError::Invalid(format!(
                    "{}.minimum_size must be at least 1, got {}",
                    name, axis.minimum_size
                )));
            }
            if axis.header_size < 0 {
                return Err(ConfigError::Invalid(format!(
                    "{}.header_size must not be negative, got {}",
                    name, axis.header_size
                )));
            }
        }
        if !(self.zoom.minimum > 0.0 && self.zoom.minimum <= self.zoom.maximum) {
            return Err(ConfigError::Invalid(format!(
                "zoom range {}..{} is empty or not positive",
                self.zoom.minimum, self.zoom.maximum
            )));
        }
        if self.copy.chunk_rows == 0 {
            return Err(ConfigError::Invalid("copy.chunk_rows must be at least 1".to_string()));
        }
        Ok(())
    }
}
