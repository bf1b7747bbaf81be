#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::time::{Instant, SystemTime};

/// One accepted distance reading at a synthesized sweep angle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DistanceSample {
    /// Wall-clock instant at which the reading was decoded.
    pub timestamp: SystemTime,
    /// Sweep angle in degrees, always in `[0, 180]`.
    pub angle_deg: u16,
    /// Distance in centimeters, in `[2, 2000]` with the default bounds.
    pub distance_cm: u16,
}

/// Angle and arrival time of the most recently accepted sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LiveState {
    pub angle_deg: u16,
    /// `None` until the first sample arrives.
    pub timestamp: Option<SystemTime>,
    /// Monotonic instant at which the sample was picked up, for staleness.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub received: Option<Instant>,
}

impl LiveState {
    pub fn observe(&mut self, sample: &DistanceSample, received: Instant) {
        self.angle_deg = sample.angle_deg;
        self.timestamp = Some(sample.timestamp);
        self.received = Some(received);
    }
}
