//! Wire framing of MT6835 SPI transactions.
//!
//! Every transaction starts with a 16-bit header `command[3:0] | address[11:0]`
//! sent most significant byte first. Single-byte commands clock one more byte
//! in the same chip-select window, which carries the written data or the
//! chip's answer.

use crate::{error::Error, register::Address};

/// Acknowledgement byte returned by EEPROM burn and zero-set commands
pub const ACK: u8 = 0x55;

/// Filler clocked out while the chip answers
pub const DUMMY: u8 = 0x00;

/// Transaction command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// Read one register byte
    ReadByte = 0b0011,
    /// Write one register byte
    WriteByte = 0b0110,
    /// Program the user registers into EEPROM
    BurnEeprom = 0b1100,
    /// Use the current position as zero
    SetZero = 0b0101,
    /// Continuously read registers 0x003..=0x006
    ReadAngleBurst = 0b1010,
}

impl Command {
    /// 4-bit opcode
    #[must_use]
    pub const fn opcode(self) -> u8 {
        self as u8
    }

    /// Whether the command takes no address and answers with [`ACK`]
    #[must_use]
    pub const fn is_acknowledged(self) -> bool {
        matches!(self, Self::BurnEeprom | Self::SetZero)
    }

    /// Number of bytes clocked in one transaction
    #[must_use]
    pub const fn frame_len(self) -> usize {
        match self {
            Self::ReadAngleBurst => 2,
            _ => 3,
        }
    }
}

/// Outgoing bytes of one transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Frame {
    bytes: [u8; 3],
    len: usize,
}

impl Frame {
    /// Build the frame for `command`
    ///
    /// `data` is only sent by [`Command::WriteByte`]; the other commands clock
    /// out [`DUMMY`]. Burn and zero-set always send an all-zero address field.
    #[must_use]
    pub fn encode(command: Command, address: Address, data: u8) -> Self {
        let address = if command.is_acknowledged() {
            Address::NONE
        } else {
            address
        };
        let header = (u16::from(command.opcode()) << 12) | address.get();
        let [hi, lo] = header.to_be_bytes();
        let third = match command {
            Command::WriteByte => data,
            _ => DUMMY,
        };

        Self {
            bytes: [hi, lo, third],
            len: command.frame_len(),
        }
    }

    /// Build a frame from a raw address, rejecting addresses above 12 bits
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] if `address` does not fit in 12 bits
    pub fn encode_raw<E>(command: Command, address: u16, data: u8) -> Result<Self, Error<E>> {
        Ok(Self::encode(command, Address::try_new(address)?, data))
    }

    /// Bytes to clock out
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Interpret the three bytes clocked in during a single-byte command
    ///
    /// Returns the register value for reads, the echoed data byte for writes
    /// and [`ACK`] for acknowledged commands. The angle burst has no answer
    /// byte and is never decoded here.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAcknowledged`] if a burn or zero-set command was
    /// not answered with [`ACK`]
    pub fn decode<E>(command: Command, rx: &[u8; 3]) -> Result<u8, Error<E>> {
        let answer = rx[2];

        match command {
            Command::BurnEeprom | Command::SetZero if answer != ACK => {
                Err(Error::NotAcknowledged(answer))
            }
            _ => Ok(answer),
        }
    }
}
