// src/progress.rs
use std::time::{Duration, Instant};

use crate::log::fmt_elapsed;

/// Progress reporting for long-running operations (scrape, shortlist).
/// Front-ends implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the total number of items (if known).
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called when one page has been written and checkpointed.
    fn item_done(&mut self, _page: u32, _rows: usize) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Logs one line per page with running totals and an ETA.
pub struct LogProgress {
    total: usize,
    done: usize,
    rows: usize,
    started: Option<Instant>,
}

impl LogProgress {
    pub fn new() -> Self {
        Self { total: 0, done: 0, rows: 0, started: None }
    }

    fn eta(&self, elapsed: Duration) -> Option<Duration> {
        if self.done == 0 || self.done >= self.total {
            return None;
        }
        let per_item = elapsed / self.done as u32;
        Some(per_item * (self.total - self.done) as u32)
    }
}

impl Default for LogProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress for LogProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        self.started = Some(Instant::now());
    }

    fn log(&mut self, msg: &str) {
        logf!("{msg}");
    }

    fn item_done(&mut self, page: u32, rows: usize) {
        self.done += 1;
        self.rows += rows;
        let elapsed = self.started.map(|t| t.elapsed()).unwrap_or_default();
        match self.eta(elapsed) {
            Some(eta) => logf!(
                "page {page}: {rows} rows ({}/{} pages, {} total rows, eta {})",
                self.done, self.total, self.rows, fmt_elapsed(eta.as_millis())
            ),
            None => logf!(
                "page {page}: {rows} rows ({}/{} pages, {} total rows)",
                self.done, self.total, self.rows
            ),
        }
    }

    fn finish(&mut self) {
        let elapsed = self.started.map(|t| t.elapsed()).unwrap_or_default();
        logf!(
            "{} pages, {} rows in {}",
            self.done, self.rows, fmt_elapsed(elapsed.as_millis())
        );
    }
}
