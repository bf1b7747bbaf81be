use crate::aggregator::SweepAggregator;
use crate::decoder::SampleDecoder;
use crate::display::DisplayFrameBuilder;
use crate::error::SonarError;
use crate::queue::SampleQueue;
use crate::serial::ByteSource;
use crate::tokenizer::TokenParser;
use crossbeam_channel::{select, Receiver, RecvTimeoutError, Sender, TryRecvError, TrySendError};
use sonar_data::{ConnectionState, DisplayFrame, DistanceSample};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Struct that contains driver threads.
pub struct DriverThreads {
    pub(crate) reader_terminator_tx: Sender<bool>,
    pub(crate) display_terminator_tx: Sender<bool>,
    pub(crate) reader_thread: Option<JoinHandle<()>>,
    pub(crate) display_thread: Option<JoinHandle<()>>,
    // Disconnect once the matching thread has returned
    pub(crate) reader_done_rx: Receiver<()>,
    pub(crate) display_done_rx: Receiver<()>,
    pub(crate) link: LinkState,
    pub(crate) join_timeout: Duration,
}

impl DriverThreads {
    pub fn connection_state(&self) -> ConnectionState {
        self.link.get()
    }

    /// Stops both threads, waiting at most the join timeout for each.
    /// The serial port is released when the reader thread returns.
    /// Afterwards the connection state is `Disconnected`, also after a read error.
    pub fn shutdown(&mut self) -> Result<(), SonarError> {
        if self.reader_thread.is_none() && self.display_thread.is_none() {
            return Ok(());
        }
        log::info!("Shutting down sonar driver...");
        // A thread that already exited has dropped its receiver
        let _ = self.reader_terminator_tx.send(true);
        let _ = self.display_terminator_tx.send(true);

        let reader = wait_for_exit(
            "reader",
            &self.reader_done_rx,
            self.reader_thread.take(),
            self.join_timeout,
        );
        let display = wait_for_exit(
            "display",
            &self.display_done_rx,
            self.display_thread.take(),
            self.join_timeout,
        );
        self.link.set(ConnectionState::Disconnected);
        reader.and(display)
    }
}

fn wait_for_exit(
    name: &str,
    done_rx: &Receiver<()>,
    thread: Option<JoinHandle<()>>,
    timeout: Duration,
) -> Result<(), SonarError> {
    let thread = match thread {
        Some(thread) => thread,
        None => return Ok(()),
    };
    if let Err(RecvTimeoutError::Timeout) = done_rx.recv_timeout(timeout) {
        log::warn!("The {} thread did not exit within {:?}, detaching it", name, timeout);
        return Err(SonarError::TimeoutError);
    }
    if thread.join().is_err() {
        log::error!("The {} thread panicked", name);
    }
    Ok(())
}

impl Drop for DriverThreads {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            log::error!("{e}");
        }
    }
}

/// Connection state shared between the reader thread and the caller.
#[derive(Clone)]
pub(crate) struct LinkState(Arc<AtomicU8>);

impl LinkState {
    pub(crate) fn new(state: ConnectionState) -> LinkState {
        LinkState(Arc::new(AtomicU8::new(encode_state(state))))
    }

    pub(crate) fn set(&self, state: ConnectionState) {
        self.0.store(encode_state(state), Ordering::Release);
    }

    pub(crate) fn get(&self) -> ConnectionState {
        decode_state(self.0.load(Ordering::Acquire))
    }
}

fn encode_state(state: ConnectionState) -> u8 {
    match state {
        ConnectionState::Disconnected => 0,
        ConnectionState::Connecting => 1,
        ConnectionState::Connected => 2,
        ConnectionState::ReadError => 3,
    }
}

fn decode_state(value: u8) -> ConnectionState {
    match value {
        1 => ConnectionState::Connecting,
        2 => ConnectionState::Connected,
        3 => ConnectionState::ReadError,
        _ => ConnectionState::Disconnected,
    }
}

/// Everything the reader thread owns.
pub(crate) struct DecodePath {
    pub(crate) parser: TokenParser,
    pub(crate) decoder: SampleDecoder,
    pub(crate) queue: SampleQueue,
    pub(crate) sample_tx: Sender<DistanceSample>,
}

impl DecodePath {
    fn process(&mut self, chunk: &[u8]) {
        for token in self.parser.feed(chunk) {
            let sample = match self.decoder.decode(&token) {
                Some(sample) => sample,
                None => continue,
            };
            log::trace!("Queued: {}°, {}cm", sample.angle_deg, sample.distance_cm);
            if self.queue.push(sample).is_some() {
                log::trace!("Sample queue full, evicted the oldest sample");
            }
            // Persistence is best effort; a lagging or absent consumer loses samples
            let _ = self.sample_tx.try_send(sample);
        }
    }
}

pub(crate) fn read_device_signal<S: ByteSource>(
    source: &mut S,
    mut path: DecodePath,
    reader_terminator_rx: Receiver<bool>,
    link: LinkState,
    poll_interval: Duration,
) {
    link.set(ConnectionState::Connected);
    let mut failed = false;
    loop {
        if do_terminate(&reader_terminator_rx) {
            break;
        }

        let chunk = match read_chunk(source) {
            Ok(Some(chunk)) => chunk,
            Ok(None) => {
                std::thread::sleep(poll_interval);
                continue;
            }
            Err(e) => {
                log::error!("Serial connection lost: {e}");
                link.set(ConnectionState::ReadError);
                failed = true;
                break;
            }
        };
        path.process(&chunk);
    }

    let stats = path.decoder.stats();
    log::info!(
        "Reader stopped: {} samples accepted ({} clamped), {} rejected, {} evicted from queue",
        stats.accepted,
        stats.clamped,
        stats.rejected,
        path.queue.evicted()
    );
    // A read error stays visible until shutdown
    if !failed {
        link.set(ConnectionState::Disconnected);
    }
}

fn read_chunk<S: ByteSource>(source: &mut S) -> Result<Option<Vec<u8>>, SonarError> {
    let n_read = source.bytes_available()?;
    if n_read == 0 {
        return Ok(None);
    }
    let chunk = source.read_available(n_read)?;
    Ok((!chunk.is_empty()).then_some(chunk))
}

pub(crate) fn render_frames(
    mut aggregator: SweepAggregator,
    builder: DisplayFrameBuilder,
    tick_period: Duration,
    frame_tx: Sender<DisplayFrame>,
    display_terminator_rx: Receiver<bool>,
) {
    let ticker = crossbeam_channel::tick(tick_period);
    loop {
        select! {
            recv(display_terminator_rx) -> msg => {
                if msg.unwrap_or(true) {
                    break;
                }
            }
            recv(ticker) -> _ => {
                aggregator.tick();
                let frame = builder.build(aggregator.history(), aggregator.live(), Instant::now());
                match frame_tx.try_send(frame) {
                    Ok(()) => {}
                    Err(TrySendError::Full(_)) => log::trace!("Renderer is lagging, frame dropped"),
                    Err(TrySendError::Disconnected(_)) => {
                        log::info!("Frame receiver dropped, stopping display thread");
                        break;
                    }
                }
            }
        }
    }
}

pub(crate) fn do_terminate(terminator_rx: &Receiver<bool>) -> bool {
    match terminator_rx.try_recv() {
        Ok(terminate) => terminate,
        Err(TryRecvError::Empty) => false,
        Err(TryRecvError::Disconnected) => true,
    }
}
