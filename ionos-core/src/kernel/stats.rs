//! Kernel timing and throughput diagnostics

/// Counters maintained by the tick loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KernelStats {
    /// Ticks run since start
    pub tick_count: u32,
    /// Time of the most recent tick
    pub last_tick_ms: Option<u32>,
    /// Interval between the two most recent ticks
    pub last_interval_ms: u32,
    /// Largest interval observed
    pub max_interval_ms: u32,
    /// Ticks arriving more than twice the configured interval late
    pub late_ticks: u32,
    /// Events handed to the kernel or the active application
    pub events_dispatched: u32,
    /// Ticks that left events queued because of the per-tick budget
    pub events_deferred: u32,
    /// Frames committed to the display
    pub frames_presented: u32,
    /// Render or present calls that failed
    pub render_errors: u32,
    /// Application requests that failed when applied
    pub rejected_requests: u32,
}

impl KernelStats {
    /// Record the start of a tick
    pub fn record_tick(&mut self, now_ms: u32, expected_interval_ms: u32) {
        if let Some(last) = self.last_tick_ms {
            let interval = now_ms.wrapping_sub(last);
            self.last_interval_ms = interval;
            self.max_interval_ms = self.max_interval_ms.max(interval);
            if interval > expected_interval_ms.saturating_mul(2) {
                self.late_ticks = self.late_ticks.wrapping_add(1);
            }
        }
        self.last_tick_ms = Some(now_ms);
        self.tick_count = self.tick_count.wrapping_add(1);
    }
}
