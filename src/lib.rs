#![no_std]
#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]

mod angle;
mod calibration;
mod checksum;
mod driver;
mod error;
mod frame;
mod register;
mod stream;

pub use angle::{ANGLE_MAX, AngleSample, Status, to_degrees};
pub use calibration::{
    CALIBRATION_REVOLUTIONS, Calibration, CalibrationSession, CalibrationState, RotationMonitor,
    SpeedBand,
};
pub use checksum::crc8;
pub use driver::{ABZ_PULSES_MAX, Mt6835, UVW_POLE_PAIRS_MAX, ZERO_POSITION_MAX};
pub use error::Error;
pub use frame::{ACK, Command, Frame};
pub use register::{
    Address, Direction, Hysteresis, PwmContent, PwmFrequency, PwmPolarity, Register, UvwMux, ZEdge,
};
pub use stream::AngleStream;
