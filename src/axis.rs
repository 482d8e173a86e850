//! Geometry of one table dimension.
//!
//! - `index_map`: position <-> index bijection under reordering
//! - `size_cache`: sizes, hiding, zoom and cumulative pixel offsets
//! - `table_axis`: both of the above plus visibility-aware navigation

pub mod index_map;
pub mod size_cache;
pub mod table_axis;

pub use index_map::AxisIndexMap;
pub use size_cache::AxisSizeCache;
pub use table_axis::{AxisEvent, TableAxis};
