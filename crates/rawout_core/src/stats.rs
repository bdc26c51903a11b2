//! Per-boundary write statistics.
//!
//! Counters are reset at the start of every luminosity block. When the
//! next block begins, the finished block is summarised in a
//! [`BoundaryReport`] for informational rate logging.

use std::time::{Duration, Instant};

/// Counters for the current luminosity block.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// Events written in this block.
    events: u32,
    /// Bytes encoded in this block.
    bytes: u64,
    /// Bytes encoded since the session started.
    total_bytes: u64,
    /// `total_bytes` when this block started.
    bytes_at_boundary_start: u64,
    /// When this block started.
    started_at: Instant,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStats {
    /// Creates zeroed stats starting now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            events: 0,
            bytes: 0,
            total_bytes: 0,
            bytes_at_boundary_start: 0,
            started_at: Instant::now(),
        }
    }

    /// Records one written event.
    pub fn record_event(&mut self, bytes: u64) {
        self.events = self.events.saturating_add(1);
        self.bytes += bytes;
        self.total_bytes += bytes;
    }

    /// Summarises the block that is ending, as of `now`.
    #[must_use]
    pub fn report(&self, lumi: u32, now: Instant) -> BoundaryReport {
        BoundaryReport {
            lumi,
            events: self.events,
            bytes: self.bytes,
            written_since_last: self.total_bytes - self.bytes_at_boundary_start,
            elapsed: now.saturating_duration_since(self.started_at),
        }
    }

    /// Starts a new block at `now`.
    pub fn reset(&mut self, now: Instant) {
        self.events = 0;
        self.bytes = 0;
        self.bytes_at_boundary_start = self.total_bytes;
        self.started_at = now;
    }

    /// Events written in this block.
    #[must_use]
    pub fn events(&self) -> u32 {
        self.events
    }

    /// Bytes encoded in this block.
    #[must_use]
    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Bytes encoded since the session started.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }
}

/// Summary of a finished luminosity block.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryReport {
    /// The block that finished.
    pub lumi: u32,
    /// Events written in it.
    pub events: u32,
    /// Bytes encoded in it.
    pub bytes: u64,
    /// Bytes written between the start of that block and the next.
    pub written_since_last: u64,
    /// Wall time between the start of that block and the next.
    pub elapsed: Duration,
}

impl BoundaryReport {
    /// Throughput in MB/s, zero when no time has elapsed.
    #[must_use]
    pub fn megabytes_per_second(&self) -> f64 {
        let micros = self.elapsed.as_micros();
        if micros == 0 {
            return 0.0;
        }
        // bytes per microsecond == MB/s
        self.written_since_last as f64 / micros as f64
    }
}
