#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A historical sample mapped to display coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayPoint {
    pub x: f64,
    pub y: f64,
    /// Fading weight in `(0, 1]`, highest for the newest frame.
    pub weight: f64,
    /// The point belongs to the most recent frame.
    pub is_newest: bool,
}

/// Live sweep arm, drawn from the origin to `end`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SweepArm {
    pub angle_deg: u16,
    pub end: (f64, f64),
}

/// Everything a renderer needs to draw one tick of the polar view.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DisplayFrame {
    /// Radius of the outermost ring and the length of the arm.
    pub max_range_cm: f64,
    pub ring_radii: Vec<f64>,
    pub spoke_angles: Vec<u16>,
    pub points: Vec<DisplayPoint>,
    /// `None` while stale.
    pub arm: Option<SweepArm>,
    /// No sample arrived within the staleness timeout.
    pub stale: bool,
}
