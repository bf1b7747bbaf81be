pub(crate) const DEFAULT_BAUD_RATE: u32 = 9600;
pub(crate) const READ_TIMEOUT_MS: u64 = 100;
// The microcontroller resets when the port is opened
pub(crate) const RESET_DELAY_MS: u64 = 2000;
pub(crate) const POLL_INTERVAL_MS: u64 = 10;
pub(crate) const JOIN_TIMEOUT_MS: u64 = 1000;

pub(crate) const DELIMITER: u8 = b',';
pub(crate) const PENDING_BUFFER_LIMIT: usize = 1000;
pub(crate) const PENDING_BUFFER_KEEP: usize = 500;

pub(crate) const MIN_DISTANCE_CM: u16 = 2;
pub(crate) const MAX_DISTANCE_CM: u16 = 2000;
pub(crate) const SWEEP_PERIOD: u32 = 360;
pub(crate) const SWEEP_HALF_PERIOD: u32 = 180;

pub(crate) const MAX_QUEUE_SIZE: usize = 1000;
pub(crate) const FADE_SWEEPS: usize = 4;
pub(crate) const RENDER_TICK_MS: u64 = 50;
pub(crate) const STALE_TIMEOUT_MS: u64 = 1000;

pub(crate) const MAX_RANGE_CM: u16 = 1200;
pub(crate) const RING_INTERVAL_CM: u16 = 50;
pub(crate) const SPOKE_STEP_DEG: u16 = 30;

pub(crate) const SAMPLE_SINK_CAPACITY: usize = 1000;
pub(crate) const FRAME_SINK_CAPACITY: usize = 10;
