use std::collections::HashMap;

use tracing::{debug, trace};

use crate::axis::index_map::AxisIndexMap;
use crate::position::Pos;

/// Size model of one axis: default size, per-index exceptions, zoom and a
/// lazily extended cumulative offset cache.
///
/// Exceptions are signed: a positive value is an explicit size, a negative
/// value marks a hidden index whose magnitude is restored on unhide.
#[derive(Debug, Clone)]
pub struct AxisSizeCache {
    map: AxisIndexMap,
    default_size: i32,
    minimum_size: i32,
    header_size: i32,
    zoom: f64,
    exceptions: HashMap<usize, i32>,
    /// `offsets[p]` = pixel start of body position `p`; entry 0 is the header span
    offsets: Vec<i64>,
    /// Sum of all body pixel sizes, `None` when it needs a full recompute
    total_body: Option<i64>,
}

impl AxisSizeCache {
    pub fn new(count: usize, default_size: i32, minimum_size: i32, header_size: i32) -> Self {
        let minimum_size = minimum_size.max(1);
        Self {
            map: AxisIndexMap::new(count),
            default_size: default_size.max(minimum_size),
            minimum_size,
            header_size: header_size.max(0),
            zoom: 1.0,
            exceptions: HashMap::new(),
            offsets: Vec::new(),
            total_body: None,
        }
    }

    pub fn index_map(&self) -> &AxisIndexMap {
        &self.map
    }

    pub fn count(&self) -> usize {
        self.map.count()
    }

    pub fn index_at(&self, position: usize) -> usize {
        self.map.index_at(position)
    }

    pub fn position_of(&self, index: usize) -> usize {
        self.map.position_of(index)
    }

    pub fn order_fingerprint(&mut self) -> u64 {
        self.map.order_fingerprint()
    }

    /// Number of cached offset entries (diagnostics and tests)
    pub fn cached_offsets(&self) -> usize {
        self.offsets.len()
    }

    fn invalidate_from(&mut self, position: usize) {
        if position < self.offsets.len() {
            self.offsets.truncate(position);
        }
    }

    fn invalidate_all(&mut self) {
        self.offsets.clear();
        self.total_body = None;
    }

    fn check_index(&self, index: usize) {
        assert!(
            index < self.count(),
            "index {} out of range for axis of {}",
            index,
            self.count()
        );
    }

    // === Sizes ===

    pub fn default_size(&self) -> i32 {
        self.default_size
    }

    pub fn set_default_size(&mut self, size: i32) {
        let size = size.max(self.minimum_size);
        if size != self.default_size {
            self.default_size = size;
            self.invalidate_all();
        }
    }

    pub fn minimum_size(&self) -> i32 {
        self.minimum_size
    }

    /// Raising the minimum clamps every stored exception, hidden ones
    /// included, keeping the sign.
    pub fn set_minimum_size(&mut self, size: i32) {
        let size = size.max(1);
        self.minimum_size = size;
        let mut changed = false;
        for value in self.exceptions.values_mut() {
            if value.abs() < size {
                *value = size * value.signum();
                changed = true;
            }
        }
        if self.default_size < size {
            self.default_size = size;
            changed = true;
        }
        if changed {
            debug!(minimum = size, "minimum size raised, exceptions clamped");
            self.invalidate_all();
        }
    }

    pub fn header_size(&self) -> i32 {
        self.header_size
    }

    pub fn set_header_size(&mut self, size: i32) {
        let size = size.max(0);
        if size != self.header_size {
            self.header_size = size;
            self.offsets.clear();
        }
    }

    pub fn header_pixels(&self) -> i64 {
        self.to_pixels(self.header_size)
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        assert!(zoom > 0.0 && zoom.is_finite(), "zoom must be positive, got {}", zoom);
        if zoom != self.zoom {
            self.zoom = zoom;
            self.invalidate_all();
        }
    }

    fn to_pixels(&self, units: i32) -> i64 {
        (units as f64 * self.zoom) as i64
    }

    /// Size in units; 0 when hidden
    pub fn size_of(&self, index: usize) -> i32 {
        self.check_index(index);
        match self.exceptions.get(&index) {
            Some(&v) if v > 0 => v,
            Some(_) => 0,
            None => self.default_size,
        }
    }

    /// Size the index would have if it were visible
    pub fn restorable_size(&self, index: usize) -> i32 {
        self.check_index(index);
        self.exceptions
            .get(&index)
            .map(|v| v.abs())
            .unwrap_or(self.default_size)
    }

    pub fn pixels_of(&self, index: usize) -> i64 {
        self.to_pixels(self.size_of(index))
    }

    pub fn is_hidden(&self, index: usize) -> bool {
        self.check_index(index);
        matches!(self.exceptions.get(&index), Some(&v) if v < 0)
    }

    /// Raw exception entry, `None` when the index uses the default size
    pub fn exception(&self, index: usize) -> Option<i32> {
        self.exceptions.get(&index).copied()
    }

    pub fn exception_count(&self) -> usize {
        self.exceptions.len()
    }

    /// Write a raw exception state back exactly as it was read
    pub fn restore_exception(&mut self, index: usize, exception: Option<i32>) {
        self.check_index(index);
        if self.exceptions.get(&index).copied() == exception {
            return;
        }
        let old_pixels = self.pixels_of(index);
        match exception {
            Some(v) => {
                self.exceptions.insert(index, v);
            }
            None => {
                self.exceptions.remove(&index);
            }
        }
        self.size_changed(index, old_pixels);
    }

    /// Keep the cached total in step with one index changing size and drop
    /// every offset behind it.
    fn size_changed(&mut self, index: usize, old_pixels: i64) {
        let new_pixels = self.pixels_of(index);
        if let Some(total) = self.total_body.as_mut() {
            *total += new_pixels - old_pixels;
        }
        if new_pixels != old_pixels {
            let position = self.map.position_of(index);
            self.invalidate_from(position + 1);
        }
    }

    /// Store an explicit size, clamped to the minimum. Returns whether the
    /// stored value changed.
    pub fn set_size(&mut self, index: usize, size: i32) -> bool {
        self.check_index(index);
        let size = size.max(self.minimum_size);
        if self.exceptions.get(&index) == Some(&size) {
            return false;
        }
        let old_pixels = self.pixels_of(index);
        self.exceptions.insert(index, size);
        self.size_changed(index, old_pixels);
        trace!(index, size, "size set");
        true
    }

    /// Hide `index`. No-op when already hidden.
    pub fn hide(&mut self, index: usize) -> bool {
        self.check_index(index);
        if self.is_hidden(index) {
            return false;
        }
        let old_pixels = self.pixels_of(index);
        let size = self.restorable_size(index);
        self.exceptions.insert(index, -size);
        self.size_changed(index, old_pixels);
        true
    }

    pub fn hide_position(&mut self, position: usize) -> bool {
        let index = self.index_at(position);
        self.hide(index)
    }

    /// Unhide `index`, dropping the exception when the restored size is
    /// the default one.
    pub fn unhide(&mut self, index: usize) -> bool {
        self.check_index(index);
        let Some(&value) = self.exceptions.get(&index) else {
            return false;
        };
        if value > 0 {
            return false;
        }
        let restored = -value;
        if restored == self.default_size {
            self.exceptions.remove(&index);
        } else {
            self.exceptions.insert(index, restored);
        }
        self.size_changed(index, 0);
        true
    }

    /// Change the number of body positions. Shrinking forgets the sizes of
    /// every index that disappeared.
    pub fn set_count(&mut self, count: usize) {
        let old = self.count();
        if count == old {
            return;
        }
        self.map.set_count(count);
        if count < old {
            self.exceptions.retain(|&i, _| i < count);
            self.offsets.clear();
        } else {
            self.invalidate_from(old + 1);
        }
        self.total_body = None;
        debug!(old, count, "axis count changed");
    }

    // === Pixel geometry ===

    fn recompute_total(&self) -> i64 {
        let count = self.count();
        let mut explicit = 0usize;
        let mut total = 0i64;
        for (&index, &value) in self.exceptions.iter() {
            if index >= count {
                continue;
            }
            explicit += 1;
            if value > 0 {
                total += self.to_pixels(value);
            }
        }
        total + (count - explicit) as i64 * self.to_pixels(self.default_size)
    }

    /// Sum of all body pixel sizes, hidden positions excluded
    pub fn total_body_pixels(&mut self) -> i64 {
        match self.total_body {
            Some(total) => total,
            None => {
                let total = self.recompute_total();
                self.total_body = Some(total);
                total
            }
        }
    }

    /// Full recompute, bypassing the cache
    pub fn total_body_pixels_uncached(&self) -> i64 {
        self.recompute_total()
    }

    /// Header plus body
    pub fn total_pixels(&mut self) -> i64 {
        self.header_pixels() + self.total_body_pixels()
    }

    /// Extend the offset cache so that `offsets[position]` exists
    fn extend_offsets(&mut self, position: usize) {
        let target = position.min(self.count());
        if self.offsets.is_empty() {
            self.offsets.push(self.header_pixels());
        }
        let from = self.offsets.len();
        while self.offsets.len() <= target {
            let p = self.offsets.len() - 1;
            let start = self.offsets[p];
            let index = self.map.index_at(p);
            self.offsets.push(start + self.pixels_of(index));
        }
        if self.offsets.len() > from {
            trace!(from, to = self.offsets.len(), "offset cache extended");
        }
    }

    /// Pixel start of `position` relative to the viewport, `scroll` being the
    /// body scroll offset. The header never scrolls and starts at 0.
    /// `Cell(count)` is accepted and yields the end of the body.
    pub fn start_offset(&mut self, position: Pos, scroll: i64) -> i64 {
        match position {
            Pos::Before | Pos::Header => 0,
            Pos::Cell(p) => {
                assert!(
                    p <= self.count(),
                    "position {} out of range for axis of {}",
                    p,
                    self.count()
                );
                self.extend_offsets(p);
                self.offsets[p] - scroll
            }
            Pos::After => self.total_pixels() - scroll,
        }
    }

    /// Position under viewport coordinate `coordinate`
    pub fn position_at(&mut self, coordinate: i64, scroll: i64) -> Pos {
        if coordinate < 0 {
            return Pos::Before;
        }
        if coordinate < self.header_pixels() {
            return Pos::Header;
        }
        let target = coordinate + scroll;
        if target >= self.total_pixels() {
            return Pos::After;
        }

        let cached_end = self.offsets.last().copied();
        let complete = self.offsets.len() > self.count();
        if !complete && cached_end.map_or(true, |end| end <= target) {
            // Walk forward from the end of the cache; sequential access
            // (dragging, scrolling) stays amortized O(1).
            if self.offsets.is_empty() {
                self.offsets.push(self.header_pixels());
            }
            loop {
                let p = self.offsets.len() - 1;
                let start = self.offsets[p];
                if p >= self.count() {
                    break;
                }
                let end = start + self.pixels_of(self.map.index_at(p));
                self.offsets.push(end);
                if end > target {
                    return Pos::Cell(p);
                }
            }
        }

        // `target` lies inside the cached range
        let after = self.offsets.partition_point(|&o| o <= target);
        match after.checked_sub(1) {
            Some(p) if p < self.count() => Pos::Cell(p),
            Some(_) => Pos::After,
            None => Pos::Header,
        }
    }

    /// Move positions and drop every offset from the earliest disturbed
    /// position onward. Returns the position of the first moved item.
    pub fn move_positions(&mut self, positions: &[usize], destination: usize) -> usize {
        let earliest = positions.iter().copied().min().unwrap_or(destination).min(destination);
        let first = self.map.move_positions(positions, destination);
        self.invalidate_from(earliest + 1);
        first
    }

    pub fn restore_block(&mut self, block_start: usize, original_positions: &[usize]) {
        let earliest = original_positions
            .iter()
            .copied()
            .min()
            .unwrap_or(block_start)
            .min(block_start);
        self.map.restore_block(block_start, original_positions);
        self.invalidate_from(earliest + 1);
    }

    pub fn reset_order(&mut self) {
        self.map.reset();
        self.offsets.clear();
    }

    /// Indexes in the closed position range whose size is > 0
    pub fn visible_indexes(&self, position1: usize, position2: usize) -> Vec<usize> {
        let (lo, hi) = if position1 <= position2 {
            (position1, position2)
        } else {
            (position2, position1)
        };
        if self.count() == 0 {
            return Vec::new();
        }
        let hi = hi.min(self.count() - 1);
        (lo..=hi)
            .map(|p| self.map.index_at(p))
            .filter(|&i| self.size_of(i) > 0)
            .collect()
    }
}
