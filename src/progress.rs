//! Progress and cancellation shared with a background job
//!
//! The job updates the counter and polls the cancel flag; the view reads
//! both without waiting for the job.
//!
//! # Example
//! ```ignore
//! let progress = Progress::new(row_count);
//! for chunk in rows.chunks(chunk_rows) {
//!     if progress.is_cancelled() {
//!         break;
//!     }
//!     // format the chunk...
//!     progress.inc_by(chunk.len());
//! }
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct Progress {
    current: Arc<AtomicUsize>,
    total: Arc<AtomicUsize>,
    cancelled: Arc<AtomicBool>,
}

impl Progress {
    pub fn new(total: usize) -> Self {
        Self {
            current: Arc::new(AtomicUsize::new(0)),
            total: Arc::new(AtomicUsize::new(total)),
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    #[inline]
    pub fn set(&self, current: usize) {
        self.current.store(current, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_by(&self, n: usize) {
        self.current.fetch_add(n, Ordering::Relaxed);
    }

    #[inline]
    pub fn current(&self) -> usize {
        self.current.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.total.load(Ordering::Relaxed)
    }

    /// Progress as a percentage (0-100)
    pub fn percent(&self) -> usize {
        let total = self.total();
        if total == 0 {
            return 100;
        }
        (self.current().min(total) * 100) / total
    }

    /// Request cancellation; the job stops at its next check
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Status line text
    pub fn format(&self, operation: &str) -> String {
        let pct = self.percent();
        if pct >= 100 {
            format!("{}: done", operation)
        } else {
            format!("{}: {}%", operation, pct)
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percent_and_format() {
        let progress = Progress::new(200);
        progress.inc_by(50);
        assert_eq!(progress.percent(), 25);
        assert_eq!(progress.format("Copying"), "Copying: 25%");
        progress.set(200);
        assert_eq!(progress.format("Copying"), "Copying: done");
        assert_eq!(Progress::default().percent(), 100);
    }

    #[test]
    fn clones_share_state() {
        let progress = Progress::new(10);
        let worker = progress.clone();
        worker.inc_by(3);
        progress.cancel();
        assert_eq!(progress.current(), 3);
        assert!(worker.is_cancelled());
    }
}
