//! Blocking driver for MT6835 magnetic position sensor

use embedded_hal::spi::{Operation, SpiBus, SpiDevice};

use crate::{
    angle::AngleSample,
    calibration::{CalibrationState, SpeedBand},
    error::Error,
    frame::{Command, DUMMY, Frame},
    register::{
        AbzResLowRegister, Address, AutocalRegister, BandwidthRegister,
        CalibrationStatusRegister, Direction, Hysteresis, PwmContent, PwmFrequency, PwmPolarity,
        PwmRegister, Register, RotHystRegister, UvwMux, UvwRegister, ZEdge,
        ZeroPositionLowRegister,
    },
    stream::AngleStream,
};

/// Largest zero position value (12-bit)
pub const ZERO_POSITION_MAX: u16 = 0x0FFF;

/// Largest ABZ resolution in pulses per revolution
pub const ABZ_PULSES_MAX: u16 = 0x3FFF + 1;

/// Largest UVW pole pair count
pub const UVW_POLE_PAIRS_MAX: u8 = 16;

/// Registers 0x003..=0x006 in the order they must be read
const ANGLE_REGISTERS: [Register; 4] = [
    Register::Angle3,
    Register::Angle2,
    Register::Angle1,
    Register::Crc,
];

/// MT6835 driver instance
///
/// The driver owns the bus for its whole lifetime. If the physical bus is
/// shared between threads, the caller must hold a lock around every call to
/// [`Self::read_angle`] so the four reads of one sample are not interleaved
/// with other traffic.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mt6835<SPI> {
    spi: SPI,
    power_cycle_required: bool,
}

impl<SPI> Mt6835<SPI> {
    /// Create a new MT6835 driver instance
    pub fn new(spi: SPI) -> Self {
        Self {
            spi,
            power_cycle_required: false,
        }
    }

    /// Release the SPI bus, consuming the driver
    pub fn release(self) -> SPI {
        self.spi
    }

    /// Whether register access is refused until the chip is power cycled
    #[must_use]
    pub fn power_cycle_required(&self) -> bool {
        self.power_cycle_required
    }

    pub(crate) fn require_power_cycle(&mut self) {
        #[cfg(feature = "defmt")]
        defmt::warn!("Calibration finished, register access locked until power cycle");
        self.power_cycle_required = true;
    }

    pub(crate) fn power_cycled(&mut self) {
        self.power_cycle_required = false;
    }

    pub(crate) fn ensure_ready<E>(&self) -> Result<(), Error<E>> {
        if self.power_cycle_required {
            return Err(Error::PowerCycleRequired);
        }
        Ok(())
    }
}

impl<SPI, E> Mt6835<SPI>
where
    SPI: SpiDevice<u8, Error = E>,
{
    /// Run one single-byte transaction
    ///
    /// The header, and the data or answer byte, are clocked in one
    /// chip-select window.
    fn transact(&mut self, command: Command, address: Address, data: u8) -> Result<u8, Error<E>> {
        self.ensure_ready()?;

        let frame = Frame::encode(command, address, data);

        #[cfg(feature = "defmt")]
        defmt::trace!("{} 0x{:03X}, frame: {:02X}", command, address.get(), frame.as_bytes());

        let mut rx = [0u8; 3];
        self.spi
            .transfer(&mut rx, frame.as_bytes())
            .map_err(Error::Communication)?;

        let answer = Frame::decode(command, &rx);

        #[cfg(feature = "defmt")]
        if let Err(Error::NotAcknowledged(byte)) = &answer {
            defmt::warn!("{} not acknowledged, got 0x{:02X}", command, byte);
        }

        answer
    }

    fn read_register(&mut self, register: Register) -> Result<u8, Error<E>> {
        let data = self.transact(Command::ReadByte, register.into(), DUMMY)?;

        #[cfg(feature = "defmt")]
        defmt::debug!("Register {} value: 0x{:02X}", register, data);

        Ok(data)
    }

    fn write_register(&mut self, register: Register, data: u8) -> Result<(), Error<E>> {
        #[cfg(feature = "defmt")]
        defmt::debug!("Writing 0x{:02X} to register {}", data, register);

        self.transact(Command::WriteByte, register.into(), data)?;
        Ok(())
    }

    fn modify_register<R>(
        &mut self,
        register: Register,
        f: impl FnOnce(&mut u8) -> R,
    ) -> Result<R, Error<E>> {
        let mut data = self.read_register(register)?;

        let result = f(&mut data);

        self.write_register(register, data)?;

        Ok(result)
    }

    /// Read one byte from an arbitrary register address
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] before touching the bus if `address`
    /// does not fit in 12 bits, otherwise any error of the transfer
    pub fn read_byte(&mut self, address: u16) -> Result<u8, Error<E>> {
        let address = Address::try_new(address)?;
        self.transact(Command::ReadByte, address, DUMMY)
    }

    /// Write one byte to an arbitrary register address
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] before touching the bus if `address`
    /// does not fit in 12 bits, otherwise any error of the transfer
    pub fn write_byte(&mut self, address: u16, data: u8) -> Result<(), Error<E>> {
        let address = Address::try_new(address)?;
        self.transact(Command::WriteByte, address, data)?;
        Ok(())
    }

    /// Read one angle sample
    ///
    /// Reads registers 0x003 to 0x006 one byte at a time. A sample whose CRC
    /// does not match is still returned, flagged through
    /// [`AngleSample::crc_valid`].
    ///
    /// # Errors
    ///
    /// Returns an error if any of the four transfers fails; no partial sample
    /// is returned in that case
    pub fn read_angle(&mut self) -> Result<AngleSample, Error<E>> {
        let mut bytes = [0u8; 4];
        for (byte, register) in bytes.iter_mut().zip(ANGLE_REGISTERS) {
            *byte = self.read_register(register)?;
        }

        let sample = AngleSample::from_bytes(bytes);

        #[cfg(feature = "defmt")]
        if !sample.crc_valid() {
            defmt::warn!("CRC mismatch in angle frame {:02X}", bytes);
        }

        Ok(sample)
    }

    /// Read `N` consecutive samples with one burst command
    ///
    /// The whole burst is a single chip-select transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails
    pub fn read_angle_burst<const N: usize>(&mut self) -> Result<[AngleSample; N], Error<E>> {
        self.ensure_ready()?;

        let frame = Frame::encode(Command::ReadAngleBurst, Register::Angle3.into(), DUMMY);
        let mut groups = [[0u8; 4]; N];

        self.spi
            .transaction(&mut [
                Operation::Write(frame.as_bytes()),
                Operation::Read(groups.as_flattened_mut()),
            ])
            .map_err(Error::Communication)?;

        Ok(groups.map(AngleSample::from_bytes))
    }

    /// Use the current position as the zero position
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAcknowledged`] if the chip did not confirm the
    /// command, or any error of the transfer
    pub fn set_zero_here(&mut self) -> Result<(), Error<E>> {
        self.transact(Command::SetZero, Address::NONE, DUMMY)?;
        Ok(())
    }

    /// Program the current register settings into EEPROM
    ///
    /// The chip must stay powered for at least 6 seconds after this call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAcknowledged`] if the chip did not confirm the
    /// command, or any error of the transfer
    pub fn burn_eeprom(&mut self) -> Result<(), Error<E>> {
        #[cfg(feature = "defmt")]
        defmt::info!("Burning EEPROM");

        self.transact(Command::BurnEeprom, Address::NONE, DUMMY)?;
        Ok(())
    }

    /// Get the user byte stored in EEPROM
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn user_id(&mut self) -> Result<u8, Error<E>> {
        self.read_register(Register::UserId)
    }

    /// Set the user byte
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_user_id(&mut self, id: u8) -> Result<(), Error<E>> {
        self.write_register(Register::UserId, id)
    }

    /// Get the 12-bit zero position (0.088° per LSB)
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn zero_position(&mut self) -> Result<u16, Error<E>> {
        let msb = self.read_register(Register::ZeroPosM)?;
        let lsb = self
            .read_register(Register::ZeroPosL)
            .map(ZeroPositionLowRegister)?;

        Ok((u16::from(msb) << 4) | u16::from(lsb.zero_pos_low()))
    }

    /// Set the 12-bit zero position, keeping the Z pulse settings
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValueOutOfRange`] if `value` exceeds 12 bits, or an
    /// error if SPI communication fails
    pub fn set_zero_position(&mut self, value: u16) -> Result<(), Error<E>> {
        if value > ZERO_POSITION_MAX {
            return Err(Error::ValueOutOfRange);
        }

        let [msb, lsb] = (value << 4).to_be_bytes();

        self.write_register(Register::ZeroPosM, msb)?;
        self.modify_register(Register::ZeroPosL, |v: &mut u8| {
            let mut r = ZeroPositionLowRegister(*v);
            r.set_zero_pos_low(lsb >> 4);
            *v = r.0;
        })
    }

    /// Get the direction in which the angle increases
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn direction(&mut self) -> Result<Direction, Error<E>> {
        let r = self.read_register(Register::RotHyst).map(RotHystRegister)?;
        Ok(if r.rot_dir() {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        })
    }

    /// Set the direction in which the angle increases
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_direction(&mut self, direction: Direction) -> Result<(), Error<E>> {
        self.modify_register(Register::RotHyst, |v: &mut u8| {
            let mut r = RotHystRegister(*v);
            r.set_rot_dir(direction == Direction::Clockwise);
            *v = r.0;
        })
    }

    /// Get the output hysteresis
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn hysteresis(&mut self) -> Result<Hysteresis, Error<E>> {
        let r = self.read_register(Register::RotHyst).map(RotHystRegister)?;
        Ok(Hysteresis::from_bits(r.hyst()))
    }

    /// Set the output hysteresis
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_hysteresis(&mut self, hysteresis: Hysteresis) -> Result<(), Error<E>> {
        self.modify_register(Register::RotHyst, |v: &mut u8| {
            let mut r = RotHystRegister(*v);
            r.set_hyst(hysteresis as u8);
            *v = r.0;
        })
    }

    /// Get the ABZ resolution in pulses per revolution (1..=16384)
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn abz_resolution(&mut self) -> Result<u16, Error<E>> {
        let msb = self.read_register(Register::AbzResM)?;
        let lsb = self
            .read_register(Register::AbzResL)
            .map(AbzResLowRegister)?;

        Ok(((u16::from(msb) << 6) | u16::from(lsb.abz_res_low())) + 1)
    }

    /// Set the ABZ resolution in pulses per revolution (1..=16384)
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValueOutOfRange`] for a resolution outside
    /// `1..=16384`, or an error if SPI communication fails
    pub fn set_abz_resolution(&mut self, pulses: u16) -> Result<(), Error<E>> {
        if pulses == 0 || pulses > ABZ_PULSES_MAX {
            return Err(Error::ValueOutOfRange);
        }

        let value = pulses - 1;
        #[allow(clippy::cast_possible_truncation)]
        let (msb, lsb) = ((value >> 6) as u8, (value & 0b11_1111) as u8);

        self.write_register(Register::AbzResM, msb)?;
        self.modify_register(Register::AbzResL, |v: &mut u8| {
            let mut r = AbzResLowRegister(*v);
            r.set_abz_res_low(lsb);
            *v = r.0;
        })
    }

    /// Get the system bandwidth setting (0 = slow and quiet, 7 = fast)
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn bandwidth(&mut self) -> Result<u8, Error<E>> {
        self.read_register(Register::Bandwidth)
            .map(|v| BandwidthRegister(v).bw())
    }

    /// Set the system bandwidth setting
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValueOutOfRange`] if `bw` exceeds 7, or an error if
    /// SPI communication fails
    pub fn set_bandwidth(&mut self, bw: u8) -> Result<(), Error<E>> {
        if bw > 0b111 {
            return Err(Error::ValueOutOfRange);
        }

        self.modify_register(Register::Bandwidth, |v: &mut u8| {
            let mut r = BandwidthRegister(*v);
            r.set_bw(bw);
            *v = r.0;
        })
    }

    /// Whether the non-linearity correction table is applied
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn nlc_enabled(&mut self) -> Result<bool, Error<E>> {
        self.read_register(Register::Pwm)
            .map(|v| PwmRegister(v).nlc_en())
    }

    /// Enable or disable the non-linearity correction table
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_nlc_enabled(&mut self, enabled: bool) -> Result<(), Error<E>> {
        self.modify_register(Register::Pwm, |v: &mut u8| {
            let mut r = PwmRegister(*v);
            r.set_nlc_en(enabled);
            *v = r.0;
        })
    }

    /// Whether the A, B and Z outputs are driven
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn abz_output_enabled(&mut self) -> Result<bool, Error<E>> {
        self.read_register(Register::AbzResL)
            .map(|v| !AbzResLowRegister(v).abz_off())
    }

    /// Enable or disable the A, B and Z outputs
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_abz_output_enabled(&mut self, enabled: bool) -> Result<(), Error<E>> {
        self.modify_register(Register::AbzResL, |v: &mut u8| {
            let mut r = AbzResLowRegister(*v);
            r.set_abz_off(!enabled);
            *v = r.0;
        })
    }

    /// Whether the A and B signals are swapped
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn ab_swapped(&mut self) -> Result<bool, Error<E>> {
        self.read_register(Register::AbzResL)
            .map(|v| AbzResLowRegister(v).ab_swap())
    }

    /// Swap the A and B signals
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_ab_swapped(&mut self, swapped: bool) -> Result<(), Error<E>> {
        self.modify_register(Register::AbzResL, |v: &mut u8| {
            let mut r = AbzResLowRegister(*v);
            r.set_ab_swap(swapped);
            *v = r.0;
        })
    }

    /// Get the Z pulse edge aligned to the zero position
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn z_edge(&mut self) -> Result<ZEdge, Error<E>> {
        let r = self
            .read_register(Register::ZeroPosL)
            .map(ZeroPositionLowRegister)?;
        Ok(if r.z_edge() {
            ZEdge::Falling
        } else {
            ZEdge::Rising
        })
    }

    /// Set the Z pulse edge aligned to the zero position
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_z_edge(&mut self, edge: ZEdge) -> Result<(), Error<E>> {
        self.modify_register(Register::ZeroPosL, |v: &mut u8| {
            let mut r = ZeroPositionLowRegister(*v);
            r.set_z_edge(edge == ZEdge::Falling);
            *v = r.0;
        })
    }

    /// Get the Z pulse width code
    ///
    /// Codes 0 to 7 select 1, 2, 4, 8, 16, 60, 120 and 180 units.
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn z_pulse_width(&mut self) -> Result<u8, Error<E>> {
        self.read_register(Register::ZeroPosL)
            .map(|v| ZeroPositionLowRegister(v).z_pulse_width())
    }

    /// Set the Z pulse width code
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValueOutOfRange`] if `code` exceeds 7, or an error if
    /// SPI communication fails
    pub fn set_z_pulse_width(&mut self, code: u8) -> Result<(), Error<E>> {
        if code > 0b111 {
            return Err(Error::ValueOutOfRange);
        }

        self.modify_register(Register::ZeroPosL, |v: &mut u8| {
            let mut r = ZeroPositionLowRegister(*v);
            r.set_z_pulse_width(code);
            *v = r.0;
        })
    }

    /// Get the phase code of Z relative to the AB pulses (0..=3)
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn z_phase(&mut self) -> Result<u8, Error<E>> {
        self.read_register(Register::Uvw)
            .map(|v| UvwRegister(v).z_phase())
    }

    /// Set the phase code of Z relative to the AB pulses
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValueOutOfRange`] if `phase` exceeds 3, or an error
    /// if SPI communication fails
    pub fn set_z_phase(&mut self, phase: u8) -> Result<(), Error<E>> {
        if phase > 0b11 {
            return Err(Error::ValueOutOfRange);
        }

        self.modify_register(Register::Uvw, |v: &mut u8| {
            let mut r = UvwRegister(*v);
            r.set_z_phase(phase);
            *v = r.0;
        })
    }

    /// Whether the UVW outputs are driven
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn uvw_output_enabled(&mut self) -> Result<bool, Error<E>> {
        self.read_register(Register::Uvw)
            .map(|v| !UvwRegister(v).uvw_off())
    }

    /// Enable or disable the UVW outputs
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_uvw_output_enabled(&mut self, enabled: bool) -> Result<(), Error<E>> {
        self.modify_register(Register::Uvw, |v: &mut u8| {
            let mut r = UvwRegister(*v);
            r.set_uvw_off(!enabled);
            *v = r.0;
        })
    }

    /// Get the function of output pins 1 to 3
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn uvw_mux(&mut self) -> Result<UvwMux, Error<E>> {
        let r = self.read_register(Register::Uvw).map(UvwRegister)?;
        Ok(if r.uvw_mux() {
            UvwMux::InvertedAbz
        } else {
            UvwMux::Uvw
        })
    }

    /// Set the function of output pins 1 to 3
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_uvw_mux(&mut self, mux: UvwMux) -> Result<(), Error<E>> {
        self.modify_register(Register::Uvw, |v: &mut u8| {
            let mut r = UvwRegister(*v);
            r.set_uvw_mux(mux == UvwMux::InvertedAbz);
            *v = r.0;
        })
    }

    /// Get the UVW resolution in pole pairs (1..=16)
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn uvw_pole_pairs(&mut self) -> Result<u8, Error<E>> {
        self.read_register(Register::Uvw)
            .map(|v| UvwRegister(v).uvw_res() + 1)
    }

    /// Set the UVW resolution in pole pairs (1..=16)
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValueOutOfRange`] if `pairs` is outside 1..=16, or an
    /// error if SPI communication fails
    pub fn set_uvw_pole_pairs(&mut self, pairs: u8) -> Result<(), Error<E>> {
        if !(1..=UVW_POLE_PAIRS_MAX).contains(&pairs) {
            return Err(Error::ValueOutOfRange);
        }

        self.modify_register(Register::Uvw, |v: &mut u8| {
            let mut r = UvwRegister(*v);
            r.set_uvw_res(pairs - 1);
            *v = r.0;
        })
    }

    /// Get the PWM output frequency
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn pwm_frequency(&mut self) -> Result<PwmFrequency, Error<E>> {
        let r = self.read_register(Register::Pwm).map(PwmRegister)?;
        Ok(if r.pwm_fq() {
            PwmFrequency::Hz497
        } else {
            PwmFrequency::Hz994
        })
    }

    /// Set the PWM output frequency
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_pwm_frequency(&mut self, frequency: PwmFrequency) -> Result<(), Error<E>> {
        self.modify_register(Register::Pwm, |v: &mut u8| {
            let mut r = PwmRegister(*v);
            r.set_pwm_fq(frequency == PwmFrequency::Hz497);
            *v = r.0;
        })
    }

    /// Get the PWM output active level
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn pwm_polarity(&mut self) -> Result<PwmPolarity, Error<E>> {
        let r = self.read_register(Register::Pwm).map(PwmRegister)?;
        Ok(if r.pwm_pol() {
            PwmPolarity::ActiveLow
        } else {
            PwmPolarity::ActiveHigh
        })
    }

    /// Set the PWM output active level
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_pwm_polarity(&mut self, polarity: PwmPolarity) -> Result<(), Error<E>> {
        self.modify_register(Register::Pwm, |v: &mut u8| {
            let mut r = PwmRegister(*v);
            r.set_pwm_pol(polarity == PwmPolarity::ActiveLow);
            *v = r.0;
        })
    }

    /// Get the quantity encoded in the PWM duty cycle
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn pwm_content(&mut self) -> Result<PwmContent, Error<E>> {
        self.read_register(Register::Pwm)
            .map(|v| PwmContent::from_bits(PwmRegister(v).pwm_sel()))
    }

    /// Set the quantity encoded in the PWM duty cycle
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValueOutOfRange`] for [`PwmContent::Reserved`], or an
    /// error if SPI communication fails
    pub fn set_pwm_content(&mut self, content: PwmContent) -> Result<(), Error<E>> {
        let bits = content.bits().ok_or(Error::ValueOutOfRange)?;

        self.modify_register(Register::Pwm, |v: &mut u8| {
            let mut r = PwmRegister(*v);
            r.set_pwm_sel(bits);
            *v = r.0;
        })
    }

    /// Whether the GPIO outputs use doubled drive strength
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn gpio_drive_doubled(&mut self) -> Result<bool, Error<E>> {
        self.read_register(Register::Autocal)
            .map(|v| AutocalRegister(v).gpio_ds())
    }

    /// Select default or doubled GPIO drive strength
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn set_gpio_drive_doubled(&mut self, doubled: bool) -> Result<(), Error<E>> {
        self.modify_register(Register::Autocal, |v: &mut u8| {
            let mut r = AutocalRegister(*v);
            r.set_gpio_ds(doubled);
            *v = r.0;
        })
    }

    /// Get the self-calibration speed band
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn calibration_band(&mut self) -> Result<SpeedBand, Error<E>> {
        self.read_register(Register::Autocal)
            .map(|v| SpeedBand::from_bits(AutocalRegister(v).autocal_freq()))
    }

    pub(crate) fn set_calibration_band(&mut self, band: SpeedBand) -> Result<(), Error<E>> {
        self.modify_register(Register::Autocal, |v: &mut u8| {
            let mut r = AutocalRegister(*v);
            r.set_autocal_freq(band.bits());
            *v = r.0;
        })
    }

    /// Read the self-calibration result from register 0x113
    ///
    /// # Errors
    ///
    /// Returns an error if SPI communication fails
    pub fn calibration_state(&mut self) -> Result<CalibrationState, Error<E>> {
        self.read_register(Register::CalStatus)
            .map(|v| CalibrationState::from_bits(CalibrationStatusRegister(v).cal_status()))
    }
}

impl<SPI, E> Mt6835<SPI>
where
    SPI: SpiBus<u8, Error = E>,
{
    /// Start continuous angle reading
    ///
    /// The caller must assert chip select before this call and keep it
    /// asserted until [`AngleStream::stop`] returns. Releasing chip select is
    /// what ends burst mode on the chip.
    ///
    /// # Errors
    ///
    /// Returns an error if the burst command could not be sent
    pub fn stream_angles(&mut self) -> Result<AngleStream<'_, SPI>, Error<E>> {
        self.ensure_ready()?;

        let frame = Frame::encode(Command::ReadAngleBurst, Register::Angle3.into(), DUMMY);

        #[cfg(feature = "defmt")]
        defmt::debug!("Starting angle burst");

        self.spi
            .write(frame.as_bytes())
            .map_err(Error::Communication)?;

        Ok(AngleStream::new(&mut self.spi))
    }
}
