use crate::error::AppError;
use crate::unit::Unit;
use std::time::Instant;

/// Accumulated result of one download or export run.
///
/// Counts attempted/succeeded/skipped units and keeps the failed units in
/// the order they failed, with enough context (sequence, title, cause) for
/// the operator to decide whether to re-run or investigate. Discarded after
/// being reported.
pub struct RunSummary {
    pub attempted: usize,
    pub succeeded: usize,
    pub skipped: usize,
    pub failed: Vec<(Unit, AppError)>,
    start_time: Instant,
}

impl RunSummary {
    pub fn new() -> Self {
        Self {
            attempted: 0,
            succeeded: 0,
            skipped: 0,
            failed: Vec::new(),
            start_time: Instant::now(),
        }
    }

    pub fn record_success(&mut self) {
        self.attempted += 1;
        self.succeeded += 1;
    }

    pub fn record_skip(&mut self) {
        self.skipped += 1;
    }

    pub fn record_failure(&mut self, unit: Unit, error: AppError) {
        self.attempted += 1;
        self.failed.push((unit, error));
    }

    /// Folds in failures collected before this stage (e.g. units that never
    /// resolved to a source).
    pub fn absorb_failures<I: IntoIterator<Item = (Unit, AppError)>>(&mut self, failures: I) {
        for (unit, error) in failures {
            self.record_failure(unit, error);
        }
    }

    /// True when every attempted unit succeeded or was legitimately skipped.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    /// Prints the final run report: counts, elapsed time, and an itemized
    /// failure list by sequence and title.
    pub fn report(&self) {
        println!("\nRun summary:");
        println!("  Elapsed: {:.1}s", self.start_time.elapsed().as_secs_f64());
        println!(
            "  Attempted: {}, succeeded: {}, skipped: {}, failed: {}",
            self.attempted,
            self.succeeded,
            self.skipped,
            self.failed.len()
        );

        if !self.failed.is_empty() {
            println!("\nFailed units (re-run the same command to retry):");
            for (unit, error) in &self.failed {
                println!("  {:02} - {}: {}", unit.sequence, unit.title, error);
            }
        }
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}
