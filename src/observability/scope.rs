//! OperationScope for start/complete logging of bulk operations
//!
//! - Logs `{name}_BEGIN` on creation
//! - Logs `{name}_COMPLETE` with elapsed time on `complete`
//! - Logs `{name}_FAILED` on `fail`
//! - Logs `{name}_INCOMPLETE` on drop otherwise (e.g. the future was cancelled)

use std::time::Instant;

use super::logger::Logger;

/// A scope that logs the lifecycle of one façade operation
pub struct OperationScope {
    name: &'static str,
    table: String,
    started: Instant,
    finished: bool,
}

impl OperationScope {
    /// Logs `{name}_BEGIN` at INFO level.
    pub fn begin(name: &'static str, table: &str) -> Self {
        Logger::info(&format!("{}_BEGIN", name), &[("table", table)]);

        Self {
            name,
            table: table.to_string(),
            started: Instant::now(),
            finished: false,
        }
    }

    /// Logs `{name}_COMPLETE` at INFO level with the number of records touched.
    pub fn complete(mut self, records: usize) {
        self.finished = true;
        let records = records.to_string();
        let elapsed = self.elapsed_ms();
        Logger::info(
            &format!("{}_COMPLETE", self.name),
            &[
                ("elapsed_ms", &elapsed),
                ("records", &records),
                ("table", &self.table),
            ],
        );
    }

    /// Logs `{name}_FAILED` at ERROR level.
    pub fn fail(mut self, reason: &str) {
        self.finished = true;
        let elapsed = self.elapsed_ms();
        Logger::error(
            &format!("{}_FAILED", self.name),
            &[
                ("elapsed_ms", &elapsed),
                ("reason", reason),
                ("table", &self.table),
            ],
        );
    }

    /// Record the outcome of a result and pass it through
    pub fn finish<T, E: std::fmt::Display>(
        self,
        result: Result<Vec<T>, E>,
    ) -> Result<Vec<T>, E> {
        match &result {
            Ok(records) => self.complete(records.len()),
            Err(e) => self.fail(&e.to_string()),
        }
        result
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn elapsed_ms(&self) -> String {
        self.started.elapsed().as_millis().to_string()
    }
}

impl Drop for OperationScope {
    fn drop(&mut self) {
        if !self.finished {
            Logger::warn(
                &format!("{}_INCOMPLETE", self.name),
                &[("table", &self.table)],
            );
        }
    }
}
