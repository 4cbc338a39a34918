//! Angle frame assembly and conversion.

use crate::{checksum::crc8, error::Error, register::Angle1Register};

/// Number of distinct angle codes per revolution (21-bit)
pub const ANGLE_MAX: u32 = 1 << 21;

/// Degrees per angle code, exactly 45 / 2^18
const DEGREES_PER_LSB: f32 = 360.0 / ANGLE_MAX as f32;

/// Status flags reported alongside each angle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status {
    raw: u8,
}

impl Status {
    /// Create status flags from the three status bits
    #[must_use]
    pub const fn new(raw: u8) -> Self {
        Self { raw: raw & 0b111 }
    }

    /// Get the raw status bits
    #[must_use]
    pub const fn raw(&self) -> u8 {
        self.raw
    }

    /// Supply voltage below the operating range
    #[must_use]
    pub const fn undervoltage(&self) -> bool {
        self.raw & 0b100 != 0
    }

    /// Magnetic field too weak
    #[must_use]
    pub const fn weak_field(&self) -> bool {
        self.raw & 0b010 != 0
    }

    /// Rotation faster than 120 000 rpm
    #[must_use]
    pub const fn overspeed(&self) -> bool {
        self.raw & 0b001 != 0
    }

    /// No status flag is set
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.raw == 0
    }
}

/// One decoded angle frame
///
/// A sample with `crc_valid() == false` is not a measurement. Use
/// [`Self::validated`] to turn it into an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AngleSample {
    raw: u32,
    status: Status,
    crc: u8,
    crc_valid: bool,
}

impl AngleSample {
    /// Assemble a sample from the contents of registers 0x003..=0x006
    #[must_use]
    pub fn from_bytes(bytes: [u8; 4]) -> Self {
        let [angle3, angle2, angle1, crc] = bytes;
        let angle1 = Angle1Register(angle1);

        let raw = (u32::from(angle3) << 13)
            | (u32::from(angle2) << 5)
            | u32::from(angle1.angle_low());
        let status = Status::new(angle1.status());
        let computed = crc8((raw << 3) | u32::from(status.raw()));

        Self {
            raw,
            status,
            crc,
            crc_valid: computed == crc,
        }
    }

    /// 21-bit angle code, `0..ANGLE_MAX`
    #[must_use]
    pub const fn raw(&self) -> u32 {
        self.raw
    }

    /// Angle in degrees, `0.0..360.0`
    #[must_use]
    pub fn degrees(&self) -> f32 {
        to_degrees(self.raw)
    }

    /// Status flags
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// CRC byte received from the chip
    #[must_use]
    pub const fn crc(&self) -> u8 {
        self.crc
    }

    /// Whether the received CRC matches angle and status
    #[must_use]
    pub const fn crc_valid(&self) -> bool {
        self.crc_valid
    }

    /// Return the sample only if its CRC matched
    ///
    /// # Errors
    ///
    /// Returns [`Error::CrcMismatch`] for a corrupted frame
    pub fn validated<E>(self) -> Result<Self, Error<E>> {
        if self.crc_valid {
            Ok(self)
        } else {
            Err(Error::CrcMismatch)
        }
    }
}

/// Convert a 21-bit angle code to degrees
///
/// Bits above bit 20 are ignored.
#[must_use]
pub fn to_degrees(raw: u32) -> f32 {
    #[allow(clippy::cast_precision_loss)]
    let code = (raw & (ANGLE_MAX - 1)) as f32;
    code * DEGREES_PER_LSB
}
