//! Self-calibration of the non-linearity correction.
//!
//! The chip calibrates itself while the magnet turns at a steady speed inside
//! the configured band. It needs at least 64 revolutions and writes the result
//! to EEPROM. After a successful run the chip must be power cycled before it
//! is used again; [`Calibration`] enforces this by locking the driver until
//! [`Calibration::confirm_power_cycle`] is called.

use embedded_hal::{digital::OutputPin, spi::SpiDevice};

use crate::{driver::Mt6835, error::Error};

/// Revolutions the chip needs to finish a calibration
pub const CALIBRATION_REVOLUTIONS: u64 = 64;

/// Rotation speed band used during self-calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SpeedBand {
    /// 3200 to 6400 rpm
    Rpm3200To6400 = 0,
    /// 1600 to 3200 rpm
    Rpm1600To3200 = 1,
    /// 800 to 1600 rpm
    Rpm800To1600 = 2,
    /// 400 to 800 rpm
    Rpm400To800 = 3,
    /// 200 to 400 rpm
    Rpm200To400 = 4,
    /// 100 to 200 rpm
    Rpm100To200 = 5,
    /// 50 to 100 rpm
    Rpm50To100 = 6,
    /// 25 to 50 rpm
    Rpm25To50 = 7,
}

impl SpeedBand {
    pub(crate) const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0 => Self::Rpm3200To6400,
            1 => Self::Rpm1600To3200,
            2 => Self::Rpm800To1600,
            3 => Self::Rpm400To800,
            4 => Self::Rpm200To400,
            5 => Self::Rpm100To200,
            6 => Self::Rpm50To100,
            _ => Self::Rpm25To50,
        }
    }

    /// Value of the `AUTOCAL_FREQ` field
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// Lowest speed of the band in rpm
    #[must_use]
    pub const fn min_rpm(self) -> u32 {
        6400 >> (self as u32 + 1)
    }

    /// Highest speed of the band in rpm
    #[must_use]
    pub const fn max_rpm(self) -> u32 {
        6400 >> self as u32
    }

    /// Shortest possible calibration time in milliseconds
    ///
    /// Time for [`CALIBRATION_REVOLUTIONS`] at the highest speed of the band.
    #[must_use]
    pub const fn minimum_duration_ms(self) -> u64 {
        CALIBRATION_REVOLUTIONS * 60_000 / self.max_rpm() as u64
    }

    /// Calibration time in milliseconds at the lowest speed of the band
    #[must_use]
    pub const fn maximum_duration_ms(self) -> u64 {
        CALIBRATION_REVOLUTIONS * 60_000 / self.min_rpm() as u64
    }
}

/// Result of the self-calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationState {
    /// No calibration ran since power-up
    NotRun,
    /// Calibration is running
    InProgress,
    /// Calibration ended without a result
    Failed,
    /// Correction table was computed and written to EEPROM
    Succeeded,
}

impl CalibrationState {
    /// Interpret bits [7:6] of register 0x113
    #[must_use]
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::NotRun,
            0b01 => Self::InProgress,
            0b10 => Self::Failed,
            _ => Self::Succeeded,
        }
    }

    /// Interpret the PWM duty cycle shown during calibration
    ///
    /// About 50 % means in progress, about 25 % failed and above 99 %
    /// succeeded. Anything else is not a calibration signal.
    #[must_use]
    pub fn from_duty_cycle(percent: f32) -> Option<Self> {
        if percent > 99.0 && percent <= 100.0 {
            Some(Self::Succeeded)
        } else if (40.0..=60.0).contains(&percent) {
            Some(Self::InProgress)
        } else if (15.0..=35.0).contains(&percent) {
            Some(Self::Failed)
        } else {
            None
        }
    }

    /// Whether the calibration has ended
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Failed | Self::Succeeded)
    }
}

/// Reports whether the mechanism turns steadily inside a speed band
///
/// Implemented by whatever drives the rotation; the sensor cannot measure
/// this by itself before calibration.
pub trait RotationMonitor {
    /// Whether the speed is stable and inside `band`
    fn is_speed_stable(&mut self, band: SpeedBand) -> bool;
}

impl<F> RotationMonitor for F
where
    F: FnMut(SpeedBand) -> bool,
{
    fn is_speed_stable(&mut self, band: SpeedBand) -> bool {
        self(band)
    }
}

/// One calibration attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationSession {
    band: SpeedBand,
    started_at_ms: u64,
    state: CalibrationState,
}

impl CalibrationSession {
    /// Speed band the chip was told to expect
    #[must_use]
    pub const fn band(&self) -> SpeedBand {
        self.band
    }

    /// Timestamp passed to [`Calibration::start`]
    #[must_use]
    pub const fn started_at_ms(&self) -> u64 {
        self.started_at_ms
    }

    /// Last state applied to the session
    ///
    /// A success seen before [`SpeedBand::minimum_duration_ms`] is already
    /// recorded here, while [`Self::reported_state`] still shows it as in
    /// progress.
    #[must_use]
    pub const fn state(&self) -> CalibrationState {
        self.state
    }

    /// State as reported to the caller at `now_ms`
    #[must_use]
    pub const fn reported_state(&self, now_ms: u64) -> CalibrationState {
        if self.state.is_terminal() && !self.minimum_elapsed(now_ms) {
            CalibrationState::InProgress
        } else {
            self.state
        }
    }

    /// Milliseconds since the session started
    #[must_use]
    pub const fn elapsed_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.started_at_ms)
    }

    /// Whether enough time passed for the chip to possibly be done, turning at
    /// the top of the band
    #[must_use]
    pub const fn minimum_elapsed(&self, now_ms: u64) -> bool {
        self.elapsed_ms(now_ms) >= self.band.minimum_duration_ms()
    }
}

/// Self-calibration controller
///
/// Owns the `CAL_EN` pin and at most one [`CalibrationSession`]. There must be
/// one controller per chip. Polling is left to the caller; the controller
/// never waits.
#[derive(Debug)]
pub struct Calibration<PIN> {
    cal_en: PIN,
    session: Option<CalibrationSession>,
}

impl<PIN> Calibration<PIN>
where
    PIN: OutputPin,
{
    /// Create a controller driving `cal_en`
    pub fn new(cal_en: PIN) -> Self {
        Self {
            cal_en,
            session: None,
        }
    }

    /// Release the `CAL_EN` pin, consuming the controller
    pub fn release(self) -> PIN {
        self.cal_en
    }

    /// Current session, if any
    #[must_use]
    pub fn session(&self) -> Option<&CalibrationSession> {
        self.session.as_ref()
    }

    /// Start a calibration
    ///
    /// The magnet must already turn at a steady speed inside `band`;
    /// `monitor` is asked to confirm this. The band is written to the chip,
    /// then `CAL_EN` is driven low and high to start the run.
    ///
    /// # Errors
    ///
    /// - [`Error::PowerCycleRequired`] after a successful calibration
    /// - [`Error::CalibrationBusy`] while a session is in progress
    /// - [`Error::RotationNotStable`] if `monitor` does not confirm the speed
    /// - [`Error::CalibrationPin`] if `CAL_EN` could not be driven
    /// - any SPI error while writing the band
    pub fn start<SPI, E>(
        &mut self,
        sensor: &mut Mt6835<SPI>,
        band: SpeedBand,
        monitor: &mut impl RotationMonitor,
        now_ms: u64,
    ) -> Result<(), Error<E>>
    where
        SPI: SpiDevice<u8, Error = E>,
    {
        sensor.ensure_ready()?;

        if self
            .session
            .is_some_and(|s| s.state == CalibrationState::InProgress)
        {
            return Err(Error::CalibrationBusy);
        }

        if !monitor.is_speed_stable(band) {
            return Err(Error::RotationNotStable);
        }

        sensor.set_calibration_band(band)?;

        self.cal_en.set_low().map_err(|_| Error::CalibrationPin)?;
        self.cal_en.set_high().map_err(|_| Error::CalibrationPin)?;

        #[cfg(feature = "defmt")]
        defmt::info!(
            "Calibration started in band {}, at least {} ms",
            band,
            band.minimum_duration_ms()
        );

        self.session = Some(CalibrationSession {
            band,
            started_at_ms: now_ms,
            state: CalibrationState::InProgress,
        });

        Ok(())
    }

    /// Read the calibration result from register 0x113
    ///
    /// Without a session this is a plain read of the register. Within a
    /// session, the result is applied to the session:
    ///
    /// - a success always locks the driver, but is reported as in progress
    ///   until the minimum duration has passed
    /// - a failure or a "not run" seen before the minimum duration is
    ///   reported as in progress and not recorded
    /// - "not run" after the minimum duration is returned as is, since the
    ///   enable never took effect; a new [`Self::start`] is then allowed
    /// - once the session is terminal its state is returned without touching
    ///   the bus
    ///
    /// A success read without a session also locks the driver.
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails, or
    /// [`Error::PowerCycleRequired`] when polling without a session on a
    /// locked driver
    pub fn poll_status<SPI, E>(
        &mut self,
        sensor: &mut Mt6835<SPI>,
        now_ms: u64,
    ) -> Result<CalibrationState, Error<E>>
    where
        SPI: SpiDevice<u8, Error = E>,
    {
        if let Some(session) = self.session.filter(|s| s.state.is_terminal()) {
            return Ok(session.reported_state(now_ms));
        }

        let observed = sensor.calibration_state()?;
        Ok(self.observe(sensor, observed, now_ms))
    }

    /// Apply a calibration result read from the PWM duty cycle
    ///
    /// This is an alternative to [`Self::poll_status`] for setups that watch
    /// the PWM pin instead of the bus. It follows the same session rules.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnrecognisedDutyCycle`] if `percent` does not match
    /// any calibration state
    pub fn observe_duty_cycle<SPI, E>(
        &mut self,
        sensor: &mut Mt6835<SPI>,
        percent: f32,
        now_ms: u64,
    ) -> Result<CalibrationState, Error<E>>
    where
        SPI: SpiDevice<u8, Error = E>,
    {
        if let Some(session) = self.session.filter(|s| s.state.is_terminal()) {
            return Ok(session.reported_state(now_ms));
        }

        let observed =
            CalibrationState::from_duty_cycle(percent).ok_or(Error::UnrecognisedDutyCycle)?;
        Ok(self.observe(sensor, observed, now_ms))
    }

    /// Acknowledge that the chip was power cycled
    ///
    /// Unlocks the driver and discards the session. The controller cannot see
    /// the supply, so calling this without an actual power cycle leaves the
    /// chip in an undefined state.
    pub fn confirm_power_cycle<SPI>(&mut self, sensor: &mut Mt6835<SPI>) {
        #[cfg(feature = "defmt")]
        defmt::info!("Power cycle confirmed, calibration session closed");

        sensor.power_cycled();
        self.session = None;
    }

    fn observe<SPI>(
        &mut self,
        sensor: &mut Mt6835<SPI>,
        observed: CalibrationState,
        now_ms: u64,
    ) -> CalibrationState {
        if observed == CalibrationState::Succeeded {
            sensor.require_power_cycle();
        }

        let Some(session) = self.session.as_mut() else {
            return observed;
        };

        let early = !session.minimum_elapsed(now_ms);

        session.state = match observed {
            CalibrationState::Failed | CalibrationState::NotRun if early => {
                #[cfg(feature = "defmt")]
                defmt::debug!(
                    "Calibration reported {} after {} ms, too early",
                    observed,
                    session.elapsed_ms(now_ms)
                );
                CalibrationState::InProgress
            }
            other => other,
        };

        #[cfg(feature = "defmt")]
        match session.state {
            CalibrationState::Failed => defmt::warn!("Calibration failed"),
            CalibrationState::NotRun => defmt::warn!("Calibration enable did not take effect"),
            _ => {}
        }

        session.reported_state(now_ms)
    }
}
