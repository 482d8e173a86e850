use tracing::debug;

use crate::axis::size_cache::AxisSizeCache;
use crate::observer::{ListenerId, Observers};
use crate::position::Pos;

/// Change notifications of a [`TableAxis`]
#[derive(Debug, Clone, PartialEq)]
pub enum AxisEvent {
    Resized { index: usize },
    Hidden { index: usize },
    Shown { index: usize },
    Moved { first: usize, len: usize },
    CountChanged { count: usize },
    /// Zoom, default, minimum or header size changed; everything may move
    LayoutChanged,
}

/// One table dimension: order, sizes and visibility-aware navigation
#[derive(Debug)]
pub struct TableAxis {
    sizes: AxisSizeCache,
    observers: Observers<AxisEvent>,
}

impl TableAxis {
    pub fn new(count: usize, default_size: i32, minimum_size: i32, header_size: i32) -> Self {
        Self {
            sizes: AxisSizeCache::new(count, default_size, minimum_size, header_size),
            observers: Observers::new(),
        }
    }

    pub fn sizes(&self) -> &AxisSizeCache {
        &self.sizes
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&AxisEvent) + 'static) -> ListenerId {
        self.observers.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.observers.unsubscribe(id)
    }

    // === Queries ===

    pub fn count(&self) -> usize {
        self.sizes.count()
    }

    pub fn index_at(&self, position: usize) -> usize {
        self.sizes.index_at(position)
    }

    pub fn position_of(&self, index: usize) -> usize {
        self.sizes.position_of(index)
    }

    pub fn size_of(&self, index: usize) -> i32 {
        self.sizes.size_of(index)
    }

    pub fn pixels_of(&self, index: usize) -> i64 {
        self.sizes.pixels_of(index)
    }

    /// Size of the index shown at `position`
    pub fn size_at(&self, position: usize) -> i32 {
        self.sizes.size_of(self.index_at(position))
    }

    pub fn is_hidden(&self, index: usize) -> bool {
        self.sizes.is_hidden(index)
    }

    pub fn zoom(&self) -> f64 {
        self.sizes.zoom()
    }

    pub fn start_offset(&mut self, position: Pos, scroll: i64) -> i64 {
        self.sizes.start_offset(position, scroll)
    }

    pub fn position_at(&mut self, coordinate: i64, scroll: i64) -> Pos {
        self.sizes.position_at(coordinate, scroll)
    }

    pub fn total_pixels(&mut self) -> i64 {
        self.sizes.total_pixels()
    }

    pub fn total_body_pixels(&mut self) -> i64 {
        self.sizes.total_body_pixels()
    }

    pub fn visible_indexes(&self, position1: usize, position2: usize) -> Vec<usize> {
        self.sizes.visible_indexes(position1, position2)
    }

    pub fn order_fingerprint(&mut self) -> u64 {
        self.sizes.order_fingerprint()
    }

    // === Visibility-aware navigation ===

    /// In bounds and not hidden
    pub fn is_visible(&self, position: usize) -> bool {
        position < self.count() && self.size_at(position) > 0
    }

    /// First visible position at or after `position`
    pub fn first_visible_from(&self, position: usize) -> Option<usize> {
        (position..self.count()).find(|&p| self.size_at(p) > 0)
    }

    /// Last visible position at or before `position`
    pub fn last_visible_to(&self, position: usize) -> Option<usize> {
        if self.count() == 0 {
            return None;
        }
        let from = position.min(self.count() - 1);
        (0..=from).rev().find(|&p| self.size_at(p) > 0)
    }

    pub fn first(&self) -> Option<usize> {
        self.first_visible_from(0)
    }

    pub fn last(&self) -> Option<usize> {
        self.count().checked_sub(1).and_then(|p| self.last_visible_to(p))
    }

    /// Nearest visible position after `position`, or `position` itself when
    /// there is none. Sentinels before the body go to `first`.
    pub fn next(&self, position: Pos) -> Pos {
        match position {
            Pos::Before | Pos::Header => self.first().map(Pos::Cell).unwrap_or(position),
            Pos::Cell(p) => self
                .first_visible_from(p + 1)
                .map(Pos::Cell)
                .unwrap_or(position),
            Pos::After => self.last().map(Pos::Cell).unwrap_or(position),
        }
    }

    /// Nearest visible position before `position`, or `position` itself when
    /// there is none. `After` goes to `last`.
    pub fn previous(&self, position: Pos) -> Pos {
        match position {
            Pos::Before | Pos::Header => self.first().map(Pos::Cell).unwrap_or(position),
            Pos::Cell(0) => position,
            Pos::Cell(p) => self
                .last_visible_to(p - 1)
                .map(Pos::Cell)
                .unwrap_or(position),
            Pos::After => self.last().map(Pos::Cell).unwrap_or(position),
        }
    }

    /// Move `steps` visible positions forward or backward, clamping at the
    /// ends.
    pub fn step(&self, position: Pos, steps: isize) -> Pos {
        let mut current = position;
        for _ in 0..steps.unsigned_abs() {
            let next = if steps > 0 {
                self.next(current)
            } else {
                self.previous(current)
            };
            if next == current {
                break;
            }
            current = next;
        }
        current
    }

    /// Scroll offset that shows `position` completely inside a viewport of
    /// `viewport` pixels (header included), changing `scroll` as little as
    /// possible.
    pub fn scroll_to_visible(&mut self, position: usize, scroll: i64, viewport: i64) -> i64 {
        let header = self.sizes.header_pixels();
        let start = self.start_offset(Pos::Cell(position), 0);
        let end = self.start_offset(Pos::Cell(position + 1), 0);
        let body_view = (viewport - header).max(0);
        if start - scroll < header {
            (start - header).max(0)
        } else if end - scroll > header + body_view {
            (end - header - body_view).min(start - header).max(0)
        } else {
            scroll
        }
    }

    // === Mutations ===

    pub fn set_size(&mut self, index: usize, size: i32) -> bool {
        let changed = self.sizes.set_size(index, size);
        if changed {
            self.observers.emit(&AxisEvent::Resized { index });
        }
        changed
    }

    pub fn restore_exception(&mut self, index: usize, exception: Option<i32>) {
        if self.sizes.exception(index) != exception {
            self.sizes.restore_exception(index, exception);
            self.observers.emit(&AxisEvent::Resized { index });
        }
    }

    pub fn hide(&mut self, index: usize) -> bool {
        let changed = self.sizes.hide(index);
        if changed {
            self.observers.emit(&AxisEvent::Hidden { index });
        }
        changed
    }

    pub fn hide_position(&mut self, position: usize) -> bool {
        let index = self.index_at(position);
        self.hide(index)
    }

    pub fn unhide(&mut self, index: usize) -> bool {
        let changed = self.sizes.unhide(index);
        if changed {
            self.observers.emit(&AxisEvent::Shown { index });
        }
        changed
    }

    pub fn move_positions(&mut self, positions: &[usize], destination: usize) -> usize {
        let first = self.sizes.move_positions(positions, destination);
        self.observers.emit(&AxisEvent::Moved {
            first,
            len: positions.len(),
        });
        first
    }

    pub fn restore_block(&mut self, block_start: usize, original_positions: &[usize]) {
        self.sizes.restore_block(block_start, original_positions);
        let first = original_positions.iter().copied().min().unwrap_or(block_start);
        self.observers.emit(&AxisEvent::Moved {
            first: first.min(block_start),
            len: original_positions.len(),
        });
    }

    /// Back to identity order
    pub fn reset_order(&mut self) {
        self.sizes.reset_order();
        self.observers.emit(&AxisEvent::LayoutChanged);
    }

    pub fn set_count(&mut self, count: usize) {
        if count != self.count() {
            self.sizes.set_count(count);
            self.observers.emit(&AxisEvent::CountChanged { count });
        }
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom != self.sizes.zoom() {
            self.sizes.set_zoom(zoom);
            debug!(zoom, "axis zoom changed");
            self.observers.emit(&AxisEvent::LayoutChanged);
        }
    }

    pub fn set_default_size(&mut self, size: i32) {
        self.sizes.set_default_size(size);
        self.observers.emit(&AxisEvent::LayoutChanged);
    }

    pub fn set_minimum_size(&mut self, size: i32) {
        self.sizes.set_minimum_size(size);
        self.observers.emit(&AxisEvent::LayoutChanged);
    }

    pub fn set_header_size(&mut self, size: i32) {
        self.sizes.set_header_size(size);
        self.observers.emit(&AxisEvent::LayoutChanged);
    }
}
