//! Register addresses for MT6835 sensor.

use crate::error::Error;

/// Largest value representable in the 12-bit address field
pub const ADDRESS_MAX: u16 = 0x0FFF;

/// Register addresses for MT6835
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u16)]
pub enum Register {
    /// Free byte for the user, stored in EEPROM
    UserId = 0x001,
    /// Angle bits [20:13]
    Angle3 = 0x003,
    /// Angle bits [12:5]
    Angle2 = 0x004,
    /// Angle bits [4:0] and status bits
    Angle1 = 0x005,
    /// CRC of angle and status
    Crc = 0x006,
    /// ABZ resolution bits [13:6]
    AbzResM = 0x007,
    /// ABZ resolution bits [5:0], ABZ off, AB swap
    AbzResL = 0x008,
    /// Zero position bits [11:4]
    ZeroPosM = 0x009,
    /// Zero position bits [3:0] and Z pulse settings
    ZeroPosL = 0x00A,
    /// Z phase and UVW settings
    Uvw = 0x00B,
    /// Non-linearity correction enable and PWM settings
    Pwm = 0x00C,
    /// Rotation direction and hysteresis
    RotHyst = 0x00D,
    /// GPIO drive strength and calibration speed band
    Autocal = 0x00E,
    /// System bandwidth
    Bandwidth = 0x011,
    /// Self-calibration result
    CalStatus = 0x113,
}

impl From<Register> for u16 {
    fn from(reg: Register) -> u16 {
        reg as u16
    }
}

impl From<Register> for Address {
    fn from(reg: Register) -> Address {
        Address(reg as u16)
    }
}

/// A 12-bit register address
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Address(u16);

impl Address {
    /// Address field used by commands that carry no address
    pub const NONE: Self = Self(0);

    /// Create an address, returning `None` if it does not fit in 12 bits
    #[must_use]
    pub const fn new(raw: u16) -> Option<Self> {
        if raw > ADDRESS_MAX {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// Create an address, failing with [`Error::InvalidAddress`] if it does
    /// not fit in 12 bits
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAddress`] for addresses above `0xFFF`
    pub fn try_new<E>(raw: u16) -> Result<Self, Error<E>> {
        Self::new(raw).ok_or(Error::InvalidAddress(raw))
    }

    /// Raw address value
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}

impl From<Address> for u16 {
    fn from(address: Address) -> u16 {
        address.0
    }
}

bitfield::bitfield! {
    /// ANGLE1 (0x005)
    ///
    /// Low angle bits share the byte with the status bits
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct Angle1Register(u8);
    impl Debug;
    u8;
    /// Angle bits [4:0]
    pub angle_low, _: 7, 3;
    /// Status bits [2:0]
    pub status, _: 2, 0;
}

bitfield::bitfield! {
    /// ABZ_RES L (0x008)
    pub struct AbzResLowRegister(u8);
    impl Debug;
    u8;
    /// ABZ resolution bits [5:0]
    pub abz_res_low, set_abz_res_low: 7, 2;
    /// Disable the ABZ outputs
    pub abz_off, set_abz_off: 1;
    /// Swap A and B signals
    pub ab_swap, set_ab_swap: 0;
}

bitfield::bitfield! {
    /// ZERO_POS L (0x00A)
    pub struct ZeroPositionLowRegister(u8);
    impl Debug;
    u8;
    /// Zero position bits [3:0]
    pub zero_pos_low, set_zero_pos_low: 7, 4;
    /// Z pulse edge aligned to 0°
    ///
    /// - `0` = rising edge
    /// - `1` = falling edge
    pub z_edge, set_z_edge: 3;
    /// Z pulse width (1°, 2, 4, 8, 16, 60, 120, 180 LSB)
    pub z_pulse_width, set_z_pulse_width: 2, 0;
}

bitfield::bitfield! {
    /// UVW (0x00B)
    pub struct UvwRegister(u8);
    impl Debug;
    u8;
    /// Phase of Z relative to the AB pulses
    pub z_phase, set_z_phase: 7, 6;
    /// Output pins 1 to 3 carry `-A -B -Z` instead of UVW
    pub uvw_mux, set_uvw_mux: 5;
    /// Disable the UVW outputs
    pub uvw_off, set_uvw_off: 4;
    /// UVW pole pairs minus one
    pub uvw_res, set_uvw_res: 3, 0;
}

bitfield::bitfield! {
    /// PWM (0x00C)
    pub struct PwmRegister(u8);
    impl Debug;
    u8;
    /// Non-linearity correction enable
    pub nlc_en, set_nlc_en: 5;
    /// PWM frequency
    ///
    /// - `0` = 994 Hz
    /// - `1` = 497 Hz
    pub pwm_fq, set_pwm_fq: 4;
    /// PWM polarity, `1` = active low
    pub pwm_pol, set_pwm_pol: 3;
    /// PWM content, `0` = 12-bit angle, `2` = 12-bit speed
    pub pwm_sel, set_pwm_sel: 2, 0;
}

bitfield::bitfield! {
    /// ROT_DIR / HYST (0x00D)
    pub struct RotHystRegister(u8);
    impl Debug;
    u8;
    /// Rotation direction
    ///
    /// - `0` = angle increases counter-clockwise
    /// - `1` = angle increases clockwise
    pub rot_dir, set_rot_dir: 3;
    /// Output hysteresis window
    pub hyst, set_hyst: 2, 0;
}

bitfield::bitfield! {
    /// AUTOCAL (0x00E)
    pub struct AutocalRegister(u8);
    impl Debug;
    u8;
    /// Double GPIO drive strength
    pub gpio_ds, set_gpio_ds: 7;
    /// Self-calibration speed band
    pub autocal_freq, set_autocal_freq: 6, 4;
}

bitfield::bitfield! {
    /// BW (0x011)
    pub struct BandwidthRegister(u8);
    impl Debug;
    u8;
    /// System bandwidth, `0` is slow and quiet, `7` is fast and noisy
    pub bw, set_bw: 2, 0;
}

bitfield::bitfield! {
    /// CAL_STATUS (0x113)
    pub struct CalibrationStatusRegister(u8);
    impl Debug;
    u8;
    /// Calibration result
    ///
    /// - `00` = not run
    /// - `01` = in progress
    /// - `10` = failed
    /// - `11` = succeeded
    pub cal_status, _: 7, 6;
}

/// Output hysteresis window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Hysteresis {
    /// 0.022°
    Deg0_022 = 0,
    /// 0.044°
    Deg0_044 = 1,
    /// 0.088°
    Deg0_088 = 2,
    /// 0.176°
    Deg0_176 = 3,
    /// No hysteresis
    Off = 4,
    /// 0.003°
    Deg0_003 = 5,
    /// 0.006°
    Deg0_006 = 6,
    /// 0.011°
    Deg0_011 = 7,
}

impl Hysteresis {
    pub(crate) const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0 => Self::Deg0_022,
            1 => Self::Deg0_044,
            2 => Self::Deg0_088,
            3 => Self::Deg0_176,
            4 => Self::Off,
            5 => Self::Deg0_003,
            6 => Self::Deg0_006,
            _ => Self::Deg0_011,
        }
    }
}

/// Direction in which the reported angle increases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Angle increases when the magnet turns counter-clockwise
    CounterClockwise,
    /// Angle increases when the magnet turns clockwise
    Clockwise,
}

/// Edge of the Z pulse aligned to the zero position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ZEdge {
    /// Rising edge at 0°
    Rising,
    /// Falling edge at 0°
    Falling,
}

/// Function of output pins 1 to 3
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UvwMux {
    /// Commutation signals U, V, W
    Uvw,
    /// Inverted incremental signals `-A`, `-B`, `-Z`
    InvertedAbz,
}

/// PWM output frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmFrequency {
    /// 994 Hz
    Hz994,
    /// 497 Hz
    Hz497,
}

/// PWM output active level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmPolarity {
    /// High level is the active part of the period
    ActiveHigh,
    /// Low level is the active part of the period
    ActiveLow,
}

/// Quantity encoded in the PWM duty cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PwmContent {
    /// 12-bit angle
    Angle,
    /// 12-bit speed
    Speed,
    /// Factory test selection, read back but never written
    Reserved(u8),
}

impl PwmContent {
    pub(crate) const fn from_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0 => Self::Angle,
            2 => Self::Speed,
            other => Self::Reserved(other),
        }
    }

    pub(crate) const fn bits(self) -> Option<u8> {
        match self {
            Self::Angle => Some(0),
            Self::Speed => Some(2),
            Self::Reserved(_) => None,
        }
    }
}
