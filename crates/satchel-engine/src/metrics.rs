//! Per-tick metrics for the item engine.
//!
//! [`StepMetrics`] captures timing and volume data for a single tick.

/// Timing and volume metrics collected during a single tick.
///
/// All durations are in microseconds.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StepMetrics {
    /// Wall-clock time for the entire tick, in microseconds.
    pub total_us: u64,
    /// Time spent applying drained requests, in microseconds.
    pub command_processing_us: u64,
    /// Time spent flushing and publishing the command log, in microseconds.
    pub publish_us: u64,
    /// Commands appended to the log this tick.
    pub commands_emitted: usize,
    /// Requests the arena applied this tick.
    pub requests_applied: usize,
    /// Requests the arena refused this tick.
    pub requests_rejected: usize,
    /// Live items after the tick.
    pub live_items: usize,
    /// Cumulative number of ingress rejections due to a full queue.
    pub queue_full_rejections: u64,
}
