//! CRC-8 over the angle and status bits of an angle frame.
//!
//! Polynomial x⁸ + x² + x + 1 (0x07), initial value 0x00, no reflection and
//! no output xor. The payload is the 24-bit word `ANGLE[20:0] ++ STATUS[2:0]`
//! processed most significant bit first, which is exactly the content of
//! registers 0x003, 0x004 and 0x005 in the order they are clocked out.

use crc::{CRC_8_SMBUS, Crc};

const CRC8: Crc<u8> = Crc::<u8>::new(&CRC_8_SMBUS);

/// Mask of the bits covered by the checksum
pub const PAYLOAD_MASK: u32 = 0x00FF_FFFF;

/// Compute the checksum of a 24-bit angle/status payload
///
/// Bits above bit 23 are ignored. Angle bit 20 (payload bit 23) enters the
/// register first.
#[must_use]
pub fn crc8(payload: u32) -> u8 {
    let bytes = (payload & PAYLOAD_MASK).to_be_bytes();
    CRC8.checksum(&bytes[1..])
}
