use crate::sample::DistanceSample;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Samples collected during one aggregation tick, ordered by angle.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SweepFrame {
    samples: Vec<DistanceSample>,
}

impl SweepFrame {
    /// Builds a frame from samples in arrival order.
    /// The sort is stable, so equal angles keep their arrival order.
    pub fn new(mut samples: Vec<DistanceSample>) -> SweepFrame {
        samples.sort_by_key(|s| s.angle_deg);
        SweepFrame { samples }
    }

    pub fn samples(&self) -> &[DistanceSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}
