use crate::config::RadarConfig;
use crate::error::SonarError;
use serialport::SerialPort;
use std::io::Read;

/// A readable connection that can report how many bytes are waiting.
pub trait ByteSource: Send {
    fn bytes_available(&mut self) -> Result<usize, SonarError>;

    /// Reads at most `max` bytes without waiting for more to arrive.
    fn read_available(&mut self, max: usize) -> Result<Vec<u8>, SonarError>;
}

impl ByteSource for Box<dyn SerialPort> {
    fn bytes_available(&mut self) -> Result<usize, SonarError> {
        get_n_read(self)
    }

    fn read_available(&mut self, max: usize) -> Result<Vec<u8>, SonarError> {
        read(self, max)
    }
}

pub(crate) fn get_n_read(port: &mut Box<dyn SerialPort>) -> Result<usize, SonarError> {
    let n_u32: u32 = port.bytes_to_read()?;
    Ok(n_u32.try_into().unwrap_or(0))
}

pub(crate) fn flush(port: &mut Box<dyn SerialPort>) -> Result<(), SonarError> {
    let n_read: usize = get_n_read(port).unwrap_or(0);
    if n_read == 0 {
        return Ok(());
    }
    let mut discarded: Vec<u8> = vec![0; n_read];
    port.read(discarded.as_mut_slice())?;
    log::debug!("Flushed {} stale bytes", n_read);
    Ok(())
}

pub(crate) fn read(port: &mut Box<dyn SerialPort>, max: usize) -> Result<Vec<u8>, SonarError> {
    let mut chunk: Vec<u8> = vec![0; max];
    let n = match port.read(chunk.as_mut_slice()) {
        Ok(n) => n,
        Err(e) if e.kind() == std::io::ErrorKind::TimedOut => 0,
        Err(e) => return Err(SonarError::IoError(e)),
    };
    chunk.truncate(n);
    Ok(chunk)
}

/// Opens the sensor port, waits out the board reset and drops its boot chatter.
pub fn open_port(port_name: &str, config: &RadarConfig) -> Result<Box<dyn SerialPort>, SonarError> {
    log::info!("Opening serial port {} at {} baud", port_name, config.baud_rate);
    let mut port = serialport::new(port_name, config.baud_rate)
        .timeout(config.read_timeout)
        .open()?;

    if !config.reset_delay.is_zero() {
        log::info!("Waiting {:?} for the device to initialize", config.reset_delay);
        std::thread::sleep(config.reset_delay);
        flush(&mut port)?;
    }

    let waiting = get_n_read(&mut port)?;
    log::info!(
        "Serial connection established on {} ({} bytes waiting)",
        port_name,
        waiting
    );
    Ok(port)
}
