pub mod connection;
pub mod display;
pub mod sample;
pub mod sweep;

pub use connection::ConnectionState;
pub use display::{DisplayFrame, DisplayPoint, SweepArm};
pub use sample::{DistanceSample, LiveState};
pub use sweep::SweepFrame;
