#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Lifecycle of the link to the sensor.
///
/// `Disconnected -> Connecting -> Connected -> ReadError -> Disconnected`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    /// The reader hit a transport failure and is shutting down.
    ReadError,
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionState::Connected)
    }
}
