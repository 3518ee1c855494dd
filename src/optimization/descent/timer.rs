//! Scoped wall-clock timing for the rule step.
//!
//! A [`Stopwatch`] borrows the runtime history for as long as the timed block
//! runs and appends the elapsed seconds when it is dropped, so an early return
//! through `?` still records the entry.
use std::time::Instant;

/// Appends elapsed seconds to `history` on drop.
#[derive(Debug)]
pub struct Stopwatch<'a> {
    start: Instant,
    history: &'a mut Vec<f64>,
}

impl<'a> Stopwatch<'a> {
    /// Start timing; the elapsed seconds are pushed to `history` on drop.
    pub fn start(history: &'a mut Vec<f64>) -> Self {
        Self { start: Instant::now(), history }
    }
}

impl Drop for Stopwatch<'_> {
    fn drop(&mut self) {
        self.history.push(self.start.elapsed().as_secs_f64());
    }
}

/// Sum of the last `batch` entries of `history` (all of them if fewer).
pub fn batch_runtime(history: &[f64], batch: usize) -> f64 {
    let from = history.len().saturating_sub(batch.max(1));
    history[from..].iter().sum()
}
