mod aggregator;
mod config;
mod constants;
mod decoder;
mod display;
mod driver_threads;
mod error;
mod mapper;
mod numeric;
mod queue;
mod serial;
mod tokenizer;

use crate::driver_threads::{read_device_signal, render_frames, DecodePath, LinkState};
use crossbeam_channel::{bounded, Receiver};
use sonar_data::{ConnectionState, DisplayFrame, DistanceSample};

pub use crate::aggregator::{SweepAggregator, SweepHistory};
pub use crate::config::RadarConfig;
pub use crate::decoder::{DecodeStats, SampleDecoder};
pub use crate::display::DisplayFrameBuilder;
pub use crate::driver_threads::DriverThreads;
pub use crate::error::SonarError;
pub use crate::mapper::polar_to_cartesian;
pub use crate::queue::SampleQueue;
pub use crate::serial::{open_port, ByteSource};
pub use crate::tokenizer::{Token, TokenParser, Tokens};

/// Outputs of a running driver.
pub struct RadarStreams {
    /// One frame per render tick.
    pub frames: Receiver<DisplayFrame>,
    /// Every accepted sample, for persistence. Dropped when nobody keeps up.
    pub samples: Receiver<DistanceSample>,
}

/// Function to launch the sonar driver on a serial port.
/// # Arguments
///
/// * `port_name` - Serial port name such as `/dev/ttyUSB0`.
/// * `config` - Link, decode and display settings
///
/// Fails before any thread starts if the port cannot be opened.
pub fn run_driver(
    port_name: &str,
    config: &RadarConfig,
) -> Result<(DriverThreads, RadarStreams), SonarError> {
    config.validate()?;
    let port = open_port(port_name, config)?;
    run_pipeline(port, config)
}

/// Starts the reader and display threads over any byte source.
pub fn run_pipeline<S: ByteSource + 'static>(
    mut source: S,
    config: &RadarConfig,
) -> Result<(DriverThreads, RadarStreams), SonarError> {
    config.validate()?;

    let queue = SampleQueue::new(config.queue_capacity);
    let (sample_tx, sample_rx) = bounded(config.sample_sink_capacity);
    let (frame_tx, frame_rx) = bounded(config.frame_sink_capacity);
    let (reader_terminator_tx, reader_terminator_rx) = bounded(10);
    let (display_terminator_tx, display_terminator_rx) = bounded(10);
    let (reader_done_tx, reader_done_rx) = bounded::<()>(1);
    let (display_done_tx, display_done_rx) = bounded::<()>(1);
    let link = LinkState::new(ConnectionState::Connecting);

    let path = DecodePath {
        parser: TokenParser::new(config.delimiter, config.pending_limit, config.pending_keep),
        decoder: SampleDecoder::from_config(config),
        queue: queue.clone(),
        sample_tx,
    };
    let aggregator = SweepAggregator::new(queue, config.fade_depth);
    let builder = DisplayFrameBuilder::from_config(config);

    let reader_link = link.clone();
    let poll_interval = config.poll_interval;
    let reader_thread = std::thread::Builder::new()
        .name("sonar-reader".to_string())
        .spawn(move || {
            let _done = reader_done_tx;
            read_device_signal(&mut source, path, reader_terminator_rx, reader_link, poll_interval);
        })
        .map_err(|e| SonarError::ThreadSpawn("reader", e))?;

    let tick_period = config.tick_period;
    let display_thread = std::thread::Builder::new()
        .name("sonar-display".to_string())
        .spawn(move || {
            let _done = display_done_tx;
            render_frames(aggregator, builder, tick_period, frame_tx, display_terminator_rx);
        });

    let mut driver_threads = DriverThreads {
        reader_terminator_tx,
        display_terminator_tx,
        reader_thread: Some(reader_thread),
        display_thread: None,
        reader_done_rx,
        display_done_rx,
        link,
        join_timeout: config.join_timeout,
    };
    // On failure, dropping driver_threads stops the reader again
    driver_threads.display_thread =
        Some(display_thread.map_err(|e| SonarError::ThreadSpawn("display", e))?);

    log::info!("Sonar driver started");
    Ok((
        driver_threads,
        RadarStreams {
            frames: frame_rx,
            samples: sample_rx,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// In-memory source fed by the test; fails once `fail` is set and the data is consumed.
    #[derive(Clone, Default)]
    struct ScriptedSource {
        data: Arc<Mutex<VecDeque<u8>>>,
        fail: Arc<Mutex<bool>>,
    }

    impl ScriptedSource {
        fn write(&self, bytes: &[u8]) {
            self.data.lock().unwrap().extend(bytes);
        }

        fn disconnect(&self) {
            *self.fail.lock().unwrap() = true;
        }
    }

    impl ByteSource for ScriptedSource {
        fn bytes_available(&mut self) -> Result<usize, SonarError> {
            let n = self.data.lock().unwrap().len();
            if n == 0 && *self.fail.lock().unwrap() {
                return Err(SonarError::IoError(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    "device unplugged",
                )));
            }
            Ok(n)
        }

        fn read_available(&mut self, max: usize) -> Result<Vec<u8>, SonarError> {
            let mut data = self.data.lock().unwrap();
            let n = max.min(data.len());
            Ok(data.drain(..n).collect())
        }
    }

    fn test_config() -> RadarConfig {
        RadarConfig {
            reset_delay: Duration::ZERO,
            poll_interval: Duration::from_millis(1),
            tick_period: Duration::from_millis(10),
            stale_timeout: Duration::from_millis(200),
            ..RadarConfig::default()
        }
    }

    fn next_frame_with_points(frames: &Receiver<DisplayFrame>) -> DisplayFrame {
        loop {
            let frame = frames
                .recv_timeout(Duration::from_secs(5))
                .expect("no frame received");
            if !frame.points.is_empty() {
                return frame;
            }
        }
    }

    #[test]
    fn test_pipeline_end_to_end() {
        let source = ScriptedSource::default();
        let (mut threads, streams) = run_pipeline(source.clone(), &test_config()).unwrap();

        source.write(b"12.5,abc,-1,2500,");

        let samples: Vec<(u16, u16)> = (0..2)
            .map(|_| streams.samples.recv_timeout(Duration::from_secs(5)).unwrap())
            .map(|s| (s.angle_deg, s.distance_cm))
            .collect();
        assert_eq!(samples, vec![(0, 13), (3, 2000)]);

        // A tick may fall between the two samples, so wait for the arm to catch up
        let frame = loop {
            let frame = next_frame_with_points(&streams.frames);
            if frame.arm.map(|arm| arm.angle_deg) == Some(3) {
                break frame;
            }
        };
        assert!(!frame.stale);
        // 2000 cm is beyond the default 1200 cm display range
        assert_eq!(frame.points.len(), 1);
        assert!(frame.points[0].x.abs() < 1e-9);
        assert!((frame.points[0].y - 13.).abs() < 1e-9);

        assert_eq!(threads.connection_state(), ConnectionState::Connected);
        threads.shutdown().unwrap();
        assert_eq!(threads.connection_state(), ConnectionState::Disconnected);
        assert!(streams.samples.try_recv().is_err());
    }

    #[test]
    fn test_pipeline_survives_transport_failure() {
        let source = ScriptedSource::default();
        let (mut threads, streams) = run_pipeline(source.clone(), &test_config()).unwrap();

        source.write(b"40,41,");
        next_frame_with_points(&streams.frames);
        source.disconnect();

        // The display thread keeps ticking and eventually reports stale data
        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        let stale_frame = loop {
            let frame = streams.frames.recv_timeout(Duration::from_secs(5)).unwrap();
            if frame.stale {
                break frame;
            }
            assert!(std::time::Instant::now() < deadline, "frames never went stale");
        };
        assert!(stale_frame.arm.is_none());
        assert!(!stale_frame.points.is_empty());
        assert_eq!(threads.connection_state(), ConnectionState::ReadError);

        threads.shutdown().unwrap();
        assert_eq!(threads.connection_state(), ConnectionState::Disconnected);
    }

    /// Source whose first poll never comes back within the join timeout.
    struct StuckSource {
        entered: crossbeam_channel::Sender<()>,
        stall: Duration,
    }

    impl ByteSource for StuckSource {
        fn bytes_available(&mut self) -> Result<usize, SonarError> {
            let _ = self.entered.try_send(());
            std::thread::sleep(self.stall);
            Ok(0)
        }

        fn read_available(&mut self, _max: usize) -> Result<Vec<u8>, SonarError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_shutdown_gives_up_on_stuck_reader() {
        let (entered_tx, entered_rx) = bounded(1);
        let source = StuckSource {
            entered: entered_tx,
            stall: Duration::from_secs(3),
        };
        let config = RadarConfig {
            join_timeout: Duration::from_millis(100),
            ..test_config()
        };
        let (mut threads, _streams) = run_pipeline(source, &config).unwrap();
        entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();

        let started = std::time::Instant::now();
        assert!(matches!(threads.shutdown(), Err(SonarError::TimeoutError)));
        let waited = started.elapsed();
        assert!(waited >= Duration::from_millis(100));
        assert!(waited < Duration::from_secs(2), "shutdown waited {:?}", waited);

        // The stuck thread was detached, a second call has nothing left to wait for
        assert!(threads.shutdown().is_ok());
    }

    #[test]
    fn test_run_driver_rejects_invalid_config() {
        let config = RadarConfig {
            queue_capacity: 0,
            ..test_config()
        };
        assert!(matches!(
            run_driver("/dev/does-not-exist", &config),
            Err(SonarError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_run_driver_fails_on_missing_port() {
        assert!(run_driver("/dev/does-not-exist-sonar", &test_config()).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn test_run_driver_reads_from_serial() {
        use serialport::{SerialPort, TTYPort};
        use std::io::Write;

        let (mut master, slave) = TTYPort::pair().expect("Unable to create ptty pair");
        let name = slave.name().unwrap();
        let (threads, streams) = run_driver(&name, &test_config()).unwrap();

        master.write_all(b"100,").unwrap();
        master.write_all(b"200.4,3").unwrap();
        master.write_all(b"00,").unwrap();

        let samples: Vec<(u16, u16)> = (0..3)
            .map(|_| streams.samples.recv_timeout(Duration::from_secs(5)).unwrap())
            .map(|s| (s.angle_deg, s.distance_cm))
            .collect();
        assert_eq!(samples, vec![(0, 100), (1, 200), (2, 300)]);

        drop(threads);
    }
}
