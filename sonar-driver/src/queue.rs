use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use sonar_data::DistanceSample;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Bounded hand-off from the decode thread to the display thread.
///
/// Pushing never blocks: when full, the oldest queued sample is evicted.
/// Both ends are cheap clones sharing one channel.
#[derive(Clone)]
pub struct SampleQueue {
    tx: Sender<DistanceSample>,
    rx: Receiver<DistanceSample>,
    evicted: Arc<AtomicU64>,
}

impl SampleQueue {
    pub fn new(capacity: usize) -> SampleQueue {
        let (tx, rx) = bounded(capacity.max(1));
        SampleQueue {
            tx,
            rx,
            evicted: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Admits `sample`, returning the evicted oldest sample if the queue was full.
    pub fn push(&self, sample: DistanceSample) -> Option<DistanceSample> {
        let mut evicted = None;
        let mut pending = sample;
        loop {
            match self.tx.try_send(pending) {
                Ok(()) => return evicted,
                Err(TrySendError::Full(rejected)) => {
                    pending = rejected;
                    // The consumer may have drained in between; then simply retry.
                    if let Ok(oldest) = self.rx.try_recv() {
                        self.evicted.fetch_add(1, Ordering::Relaxed);
                        evicted = Some(oldest);
                    }
                }
                // Both ends live in `self`, so the channel cannot disconnect.
                Err(TrySendError::Disconnected(_)) => return evicted,
            }
        }
    }

    /// Removes and returns everything queued right now, oldest first.
    pub fn drain(&self) -> Vec<DistanceSample> {
        self.rx.try_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or(0)
    }

    /// Total samples evicted since creation.
    pub fn evicted(&self) -> u64 {
        self.evicted.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};

    fn sample(distance_cm: u16) -> DistanceSample {
        DistanceSample {
            timestamp: SystemTime::UNIX_EPOCH + Duration::from_millis(distance_cm as u64),
            angle_deg: 0,
            distance_cm,
        }
    }

    fn distances(samples: &[DistanceSample]) -> Vec<u16> {
        samples.iter().map(|s| s.distance_cm).collect()
    }

    #[test]
    fn test_push_and_drain_in_order() {
        let queue = SampleQueue::new(8);
        for d in [10, 20, 30] {
            assert!(queue.push(sample(d)).is_none());
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(distances(&queue.drain()), vec![10, 20, 30]);
        assert!(queue.is_empty());
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_push_evicts_oldest_when_full() {
        let queue = SampleQueue::new(3);
        for d in [10, 20, 30] {
            queue.push(sample(d));
        }
        let evicted = queue.push(sample(40));
        assert_eq!(evicted.map(|s| s.distance_cm), Some(10));
        queue.push(sample(50));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.evicted(), 2);
        assert_eq!(distances(&queue.drain()), vec![30, 40, 50]);
    }

    #[test]
    fn test_clones_share_the_channel() {
        let producer = SampleQueue::new(4);
        let consumer = producer.clone();
        let handle = std::thread::spawn(move || {
            for d in 2..102 {
                producer.push(sample(d));
            }
        });
        handle.join().unwrap();
        assert_eq!(consumer.capacity(), 4);
        assert_eq!(distances(&consumer.drain()), vec![98, 99, 100, 101]);
        assert_eq!(consumer.evicted(), 96);
    }
}
