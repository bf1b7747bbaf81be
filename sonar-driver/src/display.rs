use crate::aggregator::SweepHistory;
use crate::config::RadarConfig;
use crate::mapper::polar_to_cartesian;
use sonar_data::{DisplayFrame, DisplayPoint, LiveState, SweepArm};
use std::time::{Duration, Instant};

/// Composes history and live state into a renderer-agnostic frame.
pub struct DisplayFrameBuilder {
    max_range_cm: u16,
    ring_interval_cm: u16,
    spoke_step_deg: u16,
    stale_timeout: Duration,
}

impl DisplayFrameBuilder {
    pub fn new(
        max_range_cm: u16,
        ring_interval_cm: u16,
        spoke_step_deg: u16,
        stale_timeout: Duration,
    ) -> DisplayFrameBuilder {
        DisplayFrameBuilder {
            max_range_cm,
            ring_interval_cm: ring_interval_cm.max(1),
            spoke_step_deg: spoke_step_deg.max(1),
            stale_timeout,
        }
    }

    pub fn from_config(config: &RadarConfig) -> DisplayFrameBuilder {
        DisplayFrameBuilder::new(
            config.max_range_cm,
            config.ring_interval_cm,
            config.spoke_step_deg,
            config.stale_timeout,
        )
    }

    pub fn build(&self, history: &SweepHistory, live: &LiveState, now: Instant) -> DisplayFrame {
        let stale = self.is_stale(live, now);
        let max_range = self.max_range_cm as f64;
        let arm = (!stale).then(|| SweepArm {
            angle_deg: live.angle_deg,
            end: polar_to_cartesian(live.angle_deg as f64, max_range),
        });

        DisplayFrame {
            max_range_cm: max_range,
            ring_radii: self.ring_radii(),
            spoke_angles: self.spoke_angles(),
            points: self.points(history),
            arm,
            stale,
        }
    }

    /// Measured on the monotonic clock so wall-clock steps cannot keep dead data live.
    fn is_stale(&self, live: &LiveState, now: Instant) -> bool {
        match live.received {
            Some(received) => now.saturating_duration_since(received) > self.stale_timeout,
            None => true,
        }
    }

    fn ring_radii(&self) -> Vec<f64> {
        (self.ring_interval_cm..=self.max_range_cm)
            .step_by(self.ring_interval_cm as usize)
            .map(f64::from)
            .collect()
    }

    fn spoke_angles(&self) -> Vec<u16> {
        (0..=180).step_by(self.spoke_step_deg as usize).collect()
    }

    fn points(&self, history: &SweepHistory) -> Vec<DisplayPoint> {
        let newest = history.len().saturating_sub(1);
        history
            .weighted()
            .enumerate()
            .flat_map(move |(i, (frame, weight))| {
                frame
                    .samples()
                    .iter()
                    .filter(move |s| s.distance_cm <= self.max_range_cm)
                    .map(move |s| {
                        let (x, y) = polar_to_cartesian(s.angle_deg as f64, s.distance_cm as f64);
                        DisplayPoint {
                            x,
                            y,
                            weight,
                            is_newest: i == newest,
                        }
                    })
            })
            .collect()
    }
}
