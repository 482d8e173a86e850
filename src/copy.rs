//! Background copy of the selection as tab-separated text.
//!
//! The request is a snapshot taken on the view's thread; the worker only
//! reads the shared table, chunk by chunk, and never touches the grid.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::CopyError;
use crate::grid::Grid;
use crate::progress::Progress;
use crate::selection::SelectionSnapshot;
use crate::table::{self, SharedTable, TableData};

#[derive(Debug)]
pub enum CopyEvent {
    Progress { done: usize, total: usize },
    Finished(String),
    Cancelled,
    Failed(CopyError),
}

impl CopyEvent {
    /// No further events follow
    pub fn is_final(&self) -> bool {
        !matches!(self, CopyEvent::Progress { .. })
    }
}

/// What to copy: visible columns and rows of the selection's bounding box,
/// each as (position, index), plus the selection itself. Cells in the box
/// but outside every area are copied empty.
#[derive(Debug, Clone)]
pub struct CopyRequest {
    pub columns: Vec<(usize, usize)>,
    pub rows: Vec<(usize, usize)>,
    pub selection: SelectionSnapshot,
}

impl CopyRequest {
    pub fn from_grid(grid: &Grid, max_cells: usize) -> Result<Self, CopyError> {
        let (cols, rows) = (grid.columns.count(), grid.rows.count());
        let bounds = if grid.selection.is_all() {
            (cols > 0 && rows > 0).then(|| (0, 0, cols - 1, rows - 1))
        } else {
            grid.selection.bounds().map(|b| (b.c1, b.r1, b.c2, b.r2))
        };
        let Some((c1, r1, c2, r2)) = bounds else {
            return Err(CopyError::NothingSelected);
        };

        let columns: Vec<(usize, usize)> = (c1..=c2.min(cols.saturating_sub(1)))
            .filter(|&p| grid.columns.is_visible(p))
            .map(|p| (p, grid.columns.index_at(p)))
            .collect();
        let rows: Vec<(usize, usize)> = (r1..=r2.min(rows.saturating_sub(1)))
            .filter(|&p| grid.rows.is_visible(p))
            .map(|p| (p, grid.rows.index_at(p)))
            .collect();
        if columns.is_empty() || rows.is_empty() {
            return Err(CopyError::NothingSelected);
        }

        let cells = columns.len().saturating_mul(rows.len());
        if cells > max_cells {
            return Err(CopyError::TooLarge {
                cells,
                limit: max_cells,
            });
        }
        Ok(Self {
            columns,
            rows,
            selection: grid.selection.snapshot(),
        })
    }

    pub fn cell_count(&self) -> usize {
        self.columns.len() * self.rows.len()
    }
}

fn format_rows(
    table: &(dyn TableData + Send + Sync),
    request: &CopyRequest,
    rows: &[(usize, usize)],
) -> Vec<Vec<String>> {
    rows.par_iter()
        .map(|&(row_pos, row)| {
            request
                .columns
                .iter()
                .map(|&(col_pos, col)| {
                    if request.selection.is_selected(col_pos, row_pos) {
                        table.get_value(col, row).unwrap_or_default()
                    } else {
                        String::new()
                    }
                })
                .collect()
        })
        .collect()
}

/// Format the request synchronously. Returns `Ok(None)` when cancelled.
/// `on_chunk` receives the number of rows done after each chunk.
pub fn encode(
    data: &SharedTable,
    request: &CopyRequest,
    chunk_rows: usize,
    progress: &Progress,
    mut on_chunk: impl FnMut(usize),
) -> Result<Option<String>, CopyError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .terminator(csv::Terminator::Any(b'\n'))
        .has_headers(false)
        .from_writer(Vec::new());

    for chunk in request.rows.chunks(chunk_rows.max(1)) {
        if progress.is_cancelled() {
            return Ok(None);
        }
        // The read lock is held for one chunk only, so edits can get in
        // between chunks.
        let records = {
            let guard = table::read(data);
            format_rows(&*guard, request, chunk)
        };
        for record in &records {
            writer.write_record(record)?;
        }
        progress.inc_by(chunk.len());
        on_chunk(progress.current());
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| CopyError::Encode(e.into_error().into()))?;
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}

/// A running copy. Poll it with `try_recv` from the view's thread.
#[derive(Debug)]
pub struct CopyJob {
    receiver: Receiver<CopyEvent>,
    progress: Progress,
    handle: Option<JoinHandle<()>>,
    done: bool,
}

impl CopyJob {
    pub fn spawn(data: SharedTable, request: CopyRequest, chunk_rows: usize) -> Self {
        let progress = Progress::new(request.rows.len());
        let (tx, rx) = mpsc::channel();
        info!(cells = request.cell_count(), "copy started");

        let worker_progress = progress.clone();
        let handle = thread::spawn(move || {
            run(data, request, chunk_rows, worker_progress, tx);
        });

        Self {
            receiver: rx,
            progress,
            handle: Some(handle),
            done: false,
        }
    }

    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    pub fn cancel(&self) {
        debug!("copy cancel requested");
        self.progress.cancel();
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Next event without blocking
    pub fn try_recv(&mut self) -> Option<CopyEvent> {
        if self.done {
            return None;
        }
        match self.receiver.try_recv() {
            Ok(event) => {
                if event.is_final() {
                    self.finish();
                }
                Some(event)
            }
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => {
                self.finish();
                Some(CopyEvent::Failed(CopyError::Interrupted))
            }
        }
    }

    /// Block until the job ends and return its final event
    pub fn wait(mut self) -> CopyEvent {
        loop {
            match self.receiver.recv() {
                Ok(event) if event.is_final() => {
                    self.finish();
                    return event;
                }
                Ok(_) => {}
                Err(_) => {
                    self.finish();
                    return CopyEvent::Failed(CopyError::Interrupted);
                }
            }
        }
    }

    fn finish(&mut self) {
        self.done = true;
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run(
    data: SharedTable,
    request: CopyRequest,
    chunk_rows: usize,
    progress: Progress,
    tx: Sender<CopyEvent>,
) {
    let total = request.rows.len();
    let result = encode(&data, &request, chunk_rows, &progress, |done| {
        let _ = tx.send(CopyEvent::Progress { done, total });
    });
    let event = match result {
        Ok(Some(text)) => {
            info!(bytes = text.len(), "copy finished");
            CopyEvent::Finished(text)
        }
        Ok(None) => {
            info!(rows_done = progress.current(), "copy cancelled");
            CopyEvent::Cancelled
        }
        Err(e) => CopyEvent::Failed(e),
    };
    let _ = tx.send(event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridConfig;
    use crate::selection::Area;
    use crate::table::MemTable;

    fn make_grid() -> Grid {
        let data = MemTable::from_rows(vec![
            vec!["a", "b", "c"],
            vec!["d", "e", "f"],
            vec!["g", "h", "i"],
        ]);
        Grid::new(table::share(data), &GridConfig::default())
    }

    fn encode_all(grid: &Grid, request: &CopyRequest) -> String {
        encode(grid.data(), request, 2, &Progress::new(0), |_| {})
            .unwrap()
            .unwrap()
    }

    #[test]
    fn copies_bounding_box_as_tsv() {
        let mut grid = make_grid();
        grid.selection.add_area(Area::new(0, 0, 1, 0));
        grid.selection.add_area(Area::new(1, 2, 2, 2));

        let request = CopyRequest::from_grid(&grid, 100).unwrap();
        assert_eq!(request.cell_count(), 9);
        assert_eq!(encode_all(&grid, &request), "a\tb\t\n\t\t\n\th\ti\n");
    }

    #[test]
    fn skips_hidden_and_follows_order() {
        let mut grid = make_grid();
        grid.columns.move_positions(&[2], 0);
        grid.rows.hide(1);
        grid.selection.select_all();

        let request = CopyRequest::from_grid(&grid, 100).unwrap();
        assert_eq!(encode_all(&grid, &request), "c\ta\tb\ni\tg\th\n");
    }

    #[test]
    fn refuses_empty_and_large() {
        let mut grid = make_grid();
        assert!(matches!(
            CopyRequest::from_grid(&grid, 100),
            Err(CopyError::NothingSelected)
        ));

        grid.selection.select_all();
        let err = CopyRequest::from_grid(&grid, 4).unwrap_err();
        assert!(matches!(err, CopyError::TooLarge { cells: 9, limit: 4 }));
        assert_eq!(err.to_string(), "selection too large to copy (9 cells, limit 4)");
    }

    #[test]
    fn cancelled_before_start() {
        let mut grid = make_grid();
        grid.selection.select_all();
        let request = CopyRequest::from_grid(&grid, 100).unwrap();
        let progress = Progress::new(3);
        progress.cancel();
        let result = encode(grid.data(), &request, 1, &progress, |_| {}).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn quotes_values_with_tabs() {
        let mut grid = make_grid();
        table::write(grid.data()).set_value(0, 0, Some("x\ty".to_string()));
        grid.selection.add_area(Area::new(0, 0, 1, 0));
        let request = CopyRequest::from_grid(&grid, 100).unwrap();
        assert_eq!(encode_all(&grid, &request), "\"x\ty\"\tb\n");
    }

    #[test]
    fn job_reports_progress_then_result() {
        let mut grid = make_grid();
        grid.selection.select_all();
        let request = CopyRequest::from_grid(&grid, 100).unwrap();

        let job = CopyJob::spawn(grid.data().clone(), request, 1);
        match job.wait() {
            CopyEvent::Finished(text) => assert_eq!(text, "a\tb\tc\nd\te\tf\ng\th\ti\n"),
            other => panic!("unexpected event {:?}", other),
        }
    }
}
