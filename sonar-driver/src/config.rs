use crate::constants::{
    DEFAULT_BAUD_RATE, DELIMITER, FADE_SWEEPS, FRAME_SINK_CAPACITY, JOIN_TIMEOUT_MS,
    MAX_DISTANCE_CM, MAX_QUEUE_SIZE, MAX_RANGE_CM, MIN_DISTANCE_CM, PENDING_BUFFER_KEEP,
    PENDING_BUFFER_LIMIT, POLL_INTERVAL_MS, READ_TIMEOUT_MS, RENDER_TICK_MS, RESET_DELAY_MS,
    RING_INTERVAL_CM, SAMPLE_SINK_CAPACITY, SPOKE_STEP_DEG, STALE_TIMEOUT_MS,
};
use crate::error::SonarError;
use std::time::Duration;

/// Tunables of the serial link, the decode path and the display path.
#[derive(Clone, Debug, PartialEq)]
pub struct RadarConfig {
    pub baud_rate: u32,
    pub read_timeout: Duration,
    /// Time to wait after opening the port before flushing stale input.
    pub reset_delay: Duration,
    /// Sleep between polls when no bytes are waiting.
    pub poll_interval: Duration,
    /// Upper bound on waiting for a worker thread to exit at shutdown.
    pub join_timeout: Duration,

    pub delimiter: u8,
    /// Pending bytes without a delimiter beyond this are truncated.
    pub pending_limit: usize,
    /// Trailing window kept when the pending buffer is truncated.
    pub pending_keep: usize,
    pub min_distance_cm: u16,
    pub max_distance_cm: u16,

    pub queue_capacity: usize,
    /// Number of sweep frames kept for the fading trail.
    pub fade_depth: usize,
    pub tick_period: Duration,
    pub stale_timeout: Duration,

    pub max_range_cm: u16,
    pub ring_interval_cm: u16,
    pub spoke_step_deg: u16,

    pub sample_sink_capacity: usize,
    pub frame_sink_capacity: usize,
}

impl Default for RadarConfig {
    fn default() -> Self {
        RadarConfig {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: Duration::from_millis(READ_TIMEOUT_MS),
            reset_delay: Duration::from_millis(RESET_DELAY_MS),
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
            join_timeout: Duration::from_millis(JOIN_TIMEOUT_MS),
            delimiter: DELIMITER,
            pending_limit: PENDING_BUFFER_LIMIT,
            pending_keep: PENDING_BUFFER_KEEP,
            min_distance_cm: MIN_DISTANCE_CM,
            max_distance_cm: MAX_DISTANCE_CM,
            queue_capacity: MAX_QUEUE_SIZE,
            fade_depth: FADE_SWEEPS,
            tick_period: Duration::from_millis(RENDER_TICK_MS),
            stale_timeout: Duration::from_millis(STALE_TIMEOUT_MS),
            max_range_cm: MAX_RANGE_CM,
            ring_interval_cm: RING_INTERVAL_CM,
            spoke_step_deg: SPOKE_STEP_DEG,
            sample_sink_capacity: SAMPLE_SINK_CAPACITY,
            frame_sink_capacity: FRAME_SINK_CAPACITY,
        }
    }
}

impl RadarConfig {
    pub fn validate(&self) -> Result<(), SonarError> {
        let invalid = |msg: &str| Err(SonarError::InvalidConfig(msg.to_string()));

        if self.queue_capacity == 0 {
            return invalid("queue capacity must be positive");
        }
        if self.fade_depth == 0 {
            return invalid("fade depth must be positive");
        }
        if self.sample_sink_capacity == 0 || self.frame_sink_capacity == 0 {
            return invalid("sink capacities must be positive");
        }
        if self.min_distance_cm > self.max_distance_cm {
            return invalid("minimum distance exceeds maximum distance");
        }
        if self.pending_keep > self.pending_limit {
            return invalid("pending window exceeds pending limit");
        }
        if self.tick_period.is_zero() {
            return invalid("tick period must be positive");
        }
        if self.ring_interval_cm == 0 || self.spoke_step_deg == 0 {
            return invalid("ring interval and spoke step must be positive");
        }
        if self.delimiter.is_ascii_digit() || matches!(self.delimiter, b'.' | b'-' | b'+') {
            return invalid("delimiter collides with numeric text");
        }
        Ok(())
    }
}
