/// Error type for MT6835 operations
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Communication error with the sensor
    Communication(E),
    /// The CAL_EN pin could not be driven
    CalibrationPin,
    /// CRC of an angle frame did not match
    ///
    /// Only returned by [`crate::AngleSample::validated`]; the decoder itself
    /// reports mismatches through [`crate::AngleSample::crc_valid`]
    CrcMismatch,
    /// EEPROM burn or zero-set command answered with something other than `0x55`
    NotAcknowledged(u8),
    /// Calibration succeeded and the chip has not been power cycled yet
    PowerCycleRequired,
    /// Register address does not fit in 12 bits
    InvalidAddress(u16),
    /// Value does not fit in the register field it is written to
    ValueOutOfRange,
    /// The rotation speed was not reported stable for the requested band
    RotationNotStable,
    /// A calibration session is already running
    CalibrationBusy,
    /// PWM duty cycle does not correspond to any calibration state
    UnrecognisedDutyCycle,
}
