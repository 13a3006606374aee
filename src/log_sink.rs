//! The injected log sink from spec.md §6. The engine only ever needs to
//! bump named counters and record named scalar values; it does not know
//! or care whether those end up in a CSV row, a JSON blob or /dev/null.

use std::collections::BTreeMap;
use std::sync::Mutex;

/// Minimal structured log sink. Implementations must be safe to call from
/// the foreground thread only -- the engine never calls a sink from a
/// background I/O task.
pub trait LogSink: Send + Sync {
    /// Add `delta` to the named counter (creating it at 0 first if needed).
    fn counter(&self, name: &str, delta: i64);
    /// Record a scalar value under `name`, overwriting any previous value.
    fn record(&self, name: &str, value: f64);
}

/// A sink that discards everything. The default when the caller doesn't
/// want observability.
#[derive(Default)]
pub struct NullLogSink;

impl LogSink for NullLogSink {
    fn counter(&self, _name: &str, _delta: i64) {}
    fn record(&self, _name: &str, _value: f64) {}
}

/// An in-memory sink that keeps the last value of every counter/record,
/// used by the test suite and by `Sort::sort` to build the returned
/// `SortReport`.
#[derive(Default)]
pub struct MemoryLogSink {
    counters: Mutex<BTreeMap<String, i64>>,
    records: Mutex<BTreeMap<String, f64>>,
}

impl MemoryLogSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn counters(&self) -> BTreeMap<String, i64> {
        self.counters.lock().unwrap().clone()
    }

    pub fn records(&self) -> BTreeMap<String, f64> {
        self.records.lock().unwrap().clone()
    }

    pub fn get_counter(&self, name: &str) -> i64 {
        self.counters.lock().unwrap().get(name).copied().unwrap_or(0)
    }
}

impl LogSink for MemoryLogSink {
    fn counter(&self, name: &str, delta: i64) {
        let mut counters = self.counters.lock().unwrap();
        *counters.entry(name.to_string()).or_insert(0) += delta;
    }

    fn record(&self, name: &str, value: f64) {
        self.records.lock().unwrap().insert(name.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let sink = MemoryLogSink::new();
        sink.counter("block_reads", 1);
        sink.counter("block_reads", 1);
        sink.counter("block_reads", 3);
        assert_eq!(sink.get_counter("block_reads"), 5);
    }

    #[test]
    fn records_overwrite() {
        let sink = MemoryLogSink::new();
        sink.record("run_count", 4.0);
        sink.record("run_count", 7.0);
        assert_eq!(sink.records().get("run_count"), Some(&7.0));
    }
}
