//! Continuous angle reading in burst mode.

use embedded_hal::spi::SpiBus;

use crate::{angle::AngleSample, error::Error, frame::DUMMY};

/// Samples streamed by the chip after a burst command
///
/// Each item is one 4-byte group (registers 0x003..=0x006) decoded exactly as
/// [`crate::Mt6835::read_angle`] does. The sequence never ends on its own.
/// Samples with a bad CRC are yielded as data; the caller decides whether to
/// skip them. A bus error is yielded once and ends the stream, since the byte
/// alignment of the next group is unknown.
#[derive(Debug)]
pub struct AngleStream<'a, SPI> {
    spi: &'a mut SPI,
    faulted: bool,
}

impl<'a, SPI, E> AngleStream<'a, SPI>
where
    SPI: SpiBus<u8, Error = E>,
{
    pub(crate) fn new(spi: &'a mut SPI) -> Self {
        Self {
            spi,
            faulted: false,
        }
    }

    /// Stop reading
    ///
    /// Only whole groups are ever read, so stopping always leaves the chip on
    /// a group boundary. The caller releases chip select after this returns;
    /// a new burst command is needed to stream again.
    ///
    /// # Errors
    ///
    /// Returns an error if the bus could not be flushed
    pub fn stop(self) -> Result<(), Error<E>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("Stopping angle burst");

        self.spi.flush().map_err(Error::Communication)
    }
}

impl<SPI, E> Iterator for AngleStream<'_, SPI>
where
    SPI: SpiBus<u8, Error = E>,
{
    type Item = Result<AngleSample, Error<E>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.faulted {
            return None;
        }

        let mut group = [DUMMY; 4];
        if let Err(e) = self.spi.read(&mut group) {
            #[cfg(feature = "defmt")]
            defmt::warn!("Angle burst aborted by bus error");
            self.faulted = true;
            return Some(Err(Error::Communication(e)));
        }

        Some(Ok(AngleSample::from_bytes(group)))
    }
}
