use crate::queue::SampleQueue;
use sonar_data::{DistanceSample, LiveState, SweepFrame};
use std::collections::VecDeque;
use std::time::Instant;

/// Fixed-capacity FIFO of recent sweep frames, oldest first.
#[derive(Clone, Debug)]
pub struct SweepHistory {
    frames: VecDeque<SweepFrame>,
    capacity: usize,
}

impl SweepHistory {
    pub fn new(capacity: usize) -> SweepHistory {
        let capacity = capacity.max(1);
        SweepHistory {
            frames: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub(crate) fn push(&mut self, frame: SweepFrame) {
        if self.frames.len() == self.capacity {
            self.frames.pop_front();
        }
        self.frames.push_back(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn newest(&self) -> Option<&SweepFrame> {
        self.frames.back()
    }

    /// Frames from oldest to newest, each with its display weight
    /// `(position + 1) / capacity`.
    pub fn weighted(&self) -> impl Iterator<Item = (&SweepFrame, f64)> {
        let capacity = self.capacity as f64;
        self.frames
            .iter()
            .enumerate()
            .map(move |(i, frame)| (frame, (i + 1) as f64 / capacity))
    }
}

/// Groups whatever the decode thread queued since the last tick into one frame.
pub struct SweepAggregator {
    queue: SampleQueue,
    history: SweepHistory,
    live: LiveState,
}

impl SweepAggregator {
    pub fn new(queue: SampleQueue, fade_depth: usize) -> SweepAggregator {
        SweepAggregator {
            queue,
            history: SweepHistory::new(fade_depth),
            live: LiveState::default(),
        }
    }

    /// Drains the queue. Returns the new frame, or `None` if nothing was queued,
    /// in which case the history is left untouched.
    pub fn tick(&mut self) -> Option<&SweepFrame> {
        let drained = self.queue.drain();
        self.ingest(drained)
    }

    fn ingest(&mut self, samples: Vec<DistanceSample>) -> Option<&SweepFrame> {
        // max_by_key keeps the last of equal maxima, i.e. the latest arrival
        let latest = samples.iter().max_by_key(|s| s.timestamp)?;
        self.live.observe(latest, Instant::now());

        log::trace!("Sweep frame with {} samples", samples.len());
        self.history.push(SweepFrame::new(samples));
        self.history.newest()
    }

    pub fn history(&self) -> &SweepHistory {
        &self.history
    }

    pub fn live(&self) -> &LiveState {
        &self.live
    }
}
