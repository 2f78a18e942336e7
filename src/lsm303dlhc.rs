// Copyright (c) 2022, Zachary D. Olkin.
// This code is provided under the MIT license.

/// The accel module holds the driver for the linear acceleration sub-device
pub mod accel;

/// The mag module holds the driver for the magnetic field and temperature sub-device
pub mod mag;

/// The interface module holds the register access layer both drivers talk through
pub mod interface;

/// Bitfield layouts of the control registers
pub mod bits;

#[cfg(feature = "defmt")]
use defmt::{Format, Formatter};
use strum::{EnumIter, FromRepr};

/// Fixed 7-bit I2C address of the accelerometer.
pub const ACCEL_ADDR: u8 = 0b001_1001;

/// Fixed 7-bit I2C address of the magnetometer.
pub const MAG_ADDR: u8 = 0b001_1110;

/// Expected value of the accelerometer identity register.
pub const ACCEL_WAI: u8 = 0x33;

/// Expected 24-bit identity of the magnetometer, spread over IRA, IRB and IRC ("H43").
pub const MAG_WAI: u32 = 0x48_34_33;

/// Standard gravity in m/s^2.
pub const STANDARD_GRAVITY: f32 = 9.806_65;

/// Converts (raw count * mg/LSB sensitivity) to m/s^2.
///
/// The output registers hold 12-bit values left-justified in 16 bits, so a count has to be
/// shifted down by 4 (divide by 16) before the mg/LSB sensitivity applies. The rest is mg -> g
/// (divide by 1000) and g -> m/s^2 (multiply by [`STANDARD_GRAVITY`]). All three are folded here.
pub const ACCEL_RAW_TO_MS2: f32 = STANDARD_GRAVITY / 1000.0 / 16.0;

/// Gauss to microtesla.
pub const GAUSS_TO_MICROTESLA: f32 = 100.0;

/// Temperature counts to degrees Celsius.
///
/// The sensor gives a 12-bit value left-shifted by 4 with 8 counts per degree, so one register
/// count is 1 / (16 * 8) degrees.
pub const TEMP_SEN: f32 = 1.0 / 128.0;

/// Raw magnetometer counts must be strictly above this to be in range.
pub const MAG_RAW_MIN: i16 = -2048;

/// Raw magnetometer counts must be strictly below this to be in range.
pub const MAG_RAW_MAX: i16 = 2047;

// Sensitivities in mg/LSB. The 16g step is not a doubling of 8g.
const ACCEL_SEN_2G: f32 = 1.0;
const ACCEL_SEN_4G: f32 = 2.0;
const ACCEL_SEN_8G: f32 = 4.0;
const ACCEL_SEN_16G: f32 = 12.0;

const BURST_READ: bool = true;
const SINGLE_REG: bool = false;

/// Power state of a sub-device as last set through the driver.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub enum PowerState {
    /// Enabled and producing output
    On,
    /// Powered down (accelerometer) or sleeping (magnetometer)
    Off,
}

/// Accelerometer power/precision modes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub enum AccelMode {
    /// 10-bit output
    Normal,
    /// 8-bit output, unlocks the 1620Hz and 5376Hz rates
    LowPower,
    /// 12-bit output
    HighResolution,
}

/// Accelerometer output data rates. Not every rate is legal in every mode, see [`AccelRate::odr_bits`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub enum AccelRate {
    /// 1Hz
    Hz1,
    /// 10Hz
    Hz10,
    /// 25Hz
    Hz25,
    /// 50Hz
    Hz50,
    /// 100Hz
    Hz100,
    /// 200Hz
    Hz200,
    /// 400Hz
    Hz400,
    /// 1.344kHz, normal and high resolution modes only
    Hz1344,
    /// 1.620kHz, low power mode only
    Hz1620,
    /// 5.376kHz, low power mode only
    Hz5376,
}

/// Accelerometer full-scale ranges. The discriminant is the FS field of CTRL_REG4_A.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, FromRepr)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub enum AccelRange {
    /// +/-2g
    G2 = 0,
    /// +/-4g
    G4 = 1,
    /// +/-8g
    G8 = 2,
    /// +/-16g
    G16 = 3,
}

/// Magnetometer output data rates. The discriminant is the DO field of CRA_REG_M.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, FromRepr)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub enum MagRate {
    /// 0.75Hz
    Hz0_75 = 0,
    /// 1.5Hz
    Hz1_5 = 1,
    /// 3Hz
    Hz3 = 2,
    /// 7.5Hz
    Hz7_5 = 3,
    /// 15Hz
    Hz15 = 4,
    /// 30Hz
    Hz30 = 5,
    /// 75Hz
    Hz75 = 6,
    /// 220Hz
    Hz220 = 7,
}

/// Magnetometer full-scale ranges. The discriminant is the GN field of CRB_REG_M.
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, FromRepr)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub enum MagRange {
    /// +/-1.3 gauss
    G1_3 = 1,
    /// +/-1.9 gauss
    G1_9 = 2,
    /// +/-2.5 gauss
    G2_5 = 3,
    /// +/-4.0 gauss
    G4_0 = 4,
    /// +/-4.7 gauss
    G4_7 = 5,
    /// +/-5.6 gauss
    G5_6 = 6,
    /// +/-8.1 gauss
    G8_1 = 7,
}

/// Magnetometer gain pair in LSB/gauss. The z axis is less sensitive than x and y.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub struct MagGain {
    /// Gain of the x and y axes
    pub xy: f32,
    /// Gain of the z axis
    pub z: f32,
}

/// One 3-axis measurement.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(Format))]
pub struct Vector3<T> {
    /// X axis
    pub x: T,
    /// Y axis
    pub y: T,
    /// Z axis
    pub z: T,
}

impl<T> Vector3<T> {
    /// Build a vector from its three components.
    pub const fn new(x: T, y: T, z: T) -> Self {
        Vector3 { x, y, z }
    }
}

impl<T> From<Vector3<T>> for [T; 3] {
    fn from(v: Vector3<T>) -> Self {
        [v.x, v.y, v.z]
    }
}

/// The possible errors that the driver can return.
///
/// The `BusError` option is for when a HAL function using the I2C bus fails.
/// This may be caused by a number of reasons. For example, the sub-device not acknowledging its address.
///
/// The other options are raised by the driver itself. Configuration is validated before anything is
/// written, so an `enable` that fails validation leaves the device untouched.
#[derive(Debug, PartialEq)]
pub enum Lsm303Error<E> {
    /// An error occurred when using the bus
    BusError(E),
    /// The identity register did not hold the expected value
    InvalidChip,
    /// The accelerometer reports low power and high resolution at the same time
    InvalidMode,
    /// The rate is not legal for the mode, or the device reports an unknown rate
    InvalidRate,
    /// The device reports an unknown full-scale range
    InvalidRange,
    /// A scaled read was requested before `enable` configured the scaling
    NotEnabled,
}

/// (rate, modes the rate is legal in, ODR bits of CTRL_REG1_A).
/// 0b1001 appears twice: it means 1344Hz outside low power and 5376Hz in low power.
const ACCEL_ODR_TABLE: [(AccelRate, &[AccelMode], u8); 10] = [
    (AccelRate::Hz1, ALL_MODES, 0b0001),
    (AccelRate::Hz10, ALL_MODES, 0b0010),
    (AccelRate::Hz25, ALL_MODES, 0b0011),
    (AccelRate::Hz50, ALL_MODES, 0b0100),
    (AccelRate::Hz100, ALL_MODES, 0b0101),
    (AccelRate::Hz200, ALL_MODES, 0b0110),
    (AccelRate::Hz400, ALL_MODES, 0b0111),
    (AccelRate::Hz1344, &[AccelMode::Normal, AccelMode::HighResolution], 0b1001),
    (AccelRate::Hz1620, &[AccelMode::LowPower], 0b1000),
    (AccelRate::Hz5376, &[AccelMode::LowPower], 0b1001),
];

const ALL_MODES: &[AccelMode] = &[
    AccelMode::Normal,
    AccelMode::LowPower,
    AccelMode::HighResolution,
];

impl AccelRate {
    /// ODR bits for this rate in `mode`, or `None` if the pair is not legal.
    pub fn odr_bits(self, mode: AccelMode) -> Option<u8> {
        ACCEL_ODR_TABLE
            .iter()
            .find(|(rate, modes, _)| *rate == self && modes.contains(&mode))
            .map(|&(_, _, bits)| bits)
    }

    /// Decode ODR bits read back from the device, given the mode it is in.
    ///
    /// Returns `None` for bit patterns with no rate in that mode (including power-down, 0b0000).
    pub fn from_odr_bits(bits: u8, mode: AccelMode) -> Option<Self> {
        ACCEL_ODR_TABLE
            .iter()
            .find(|(_, modes, b)| *b == bits && modes.contains(&mode))
            .map(|&(rate, _, _)| rate)
    }
}

impl AccelRange {
    /// Sensitivity in mg/LSB.
    pub const fn sensitivity_mg(self) -> f32 {
        match self {
            AccelRange::G2 => ACCEL_SEN_2G,
            AccelRange::G4 => ACCEL_SEN_4G,
            AccelRange::G8 => ACCEL_SEN_8G,
            AccelRange::G16 => ACCEL_SEN_16G,
        }
    }
}

impl MagRange {
    /// Gain pair for this range, in LSB/gauss.
    pub const fn gain(self) -> MagGain {
        let (xy, z) = match self {
            MagRange::G1_3 => (1100.0, 980.0),
            MagRange::G1_9 => (855.0, 760.0),
            MagRange::G2_5 => (670.0, 600.0),
            MagRange::G4_0 => (450.0, 400.0),
            MagRange::G4_7 => (400.0, 355.0),
            MagRange::G5_6 => (330.0, 295.0),
            MagRange::G8_1 => (230.0, 205.0),
        };
        MagGain { xy, z }
    }
}

impl<E> From<E> for Lsm303Error<E> {
    fn from(error: E) -> Self {
        Lsm303Error::BusError(error)
    }
}

#[cfg(feature = "defmt")]
impl<E> Format for Lsm303Error<E> {
    fn format(&self, fmt: Formatter) {
        match *self {
            Lsm303Error::BusError(_) => defmt::write!(fmt, "Bus Error!"),
            Lsm303Error::InvalidChip => defmt::write!(fmt, "Identity register mismatch!"),
            Lsm303Error::InvalidMode => defmt::write!(fmt, "Invalid accelerometer mode!"),
            Lsm303Error::InvalidRate => defmt::write!(fmt, "Invalid data rate for this mode!"),
            Lsm303Error::InvalidRange => defmt::write!(fmt, "Invalid full-scale range!"),
            Lsm303Error::NotEnabled => defmt::write!(fmt, "Read before enable!"),
        }
    }
}

enum AccelRegisters {
    WhoAmI,
    CtrlReg1,
    CtrlReg4,
    OutXL,
}

enum MagRegisters {
    CraReg,
    CrbReg,
    MrReg,
    OutXH,
    IraReg,
    TempOutH,
}

impl AccelRegisters {
    fn get_addr(&self, burst: bool) -> u8 {
        let addr = match *self {
            AccelRegisters::WhoAmI => 0x0F,
            AccelRegisters::CtrlReg1 => 0x20,
            AccelRegisters::CtrlReg4 => 0x23,
            AccelRegisters::OutXL => 0x28,
        };
        // The accelerometer only auto-increments when the MSB of the address is set
        if burst {
            1 << 7 | addr
        } else {
            addr
        }
    }
}

impl MagRegisters {
    // The magnetometer auto-increments on its own, no MSB flag.
    fn get_addr(&self) -> u8 {
        match *self {
            MagRegisters::CraReg => 0x00,
            MagRegisters::CrbReg => 0x01,
            MagRegisters::MrReg => 0x02,
            MagRegisters::OutXH => 0x03,
            MagRegisters::IraReg => 0x0A,
            MagRegisters::TempOutH => 0x31,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn odr_bits_shared_pattern() {
        assert_eq!(AccelRate::Hz1344.odr_bits(AccelMode::Normal), Some(0b1001));
        assert_eq!(AccelRate::Hz1344.odr_bits(AccelMode::HighResolution), Some(0b1001));
        assert_eq!(AccelRate::Hz5376.odr_bits(AccelMode::LowPower), Some(0b1001));
        assert_eq!(AccelRate::Hz1344.odr_bits(AccelMode::LowPower), None);
        assert_eq!(AccelRate::Hz5376.odr_bits(AccelMode::Normal), None);
        assert_eq!(AccelRate::Hz1620.odr_bits(AccelMode::LowPower), Some(0b1000));
        assert_eq!(AccelRate::Hz1620.odr_bits(AccelMode::HighResolution), None);
    }

    #[test]
    fn odr_bits_decode_matches_encode() {
        for mode in AccelMode::iter() {
            for rate in AccelRate::iter() {
                if let Some(bits) = rate.odr_bits(mode) {
                    assert_eq!(AccelRate::from_odr_bits(bits, mode), Some(rate));
                }
            }
        }
        assert_eq!(AccelRate::from_odr_bits(0b1001, AccelMode::Normal), Some(AccelRate::Hz1344));
        assert_eq!(AccelRate::from_odr_bits(0b1001, AccelMode::LowPower), Some(AccelRate::Hz5376));
        assert_eq!(AccelRate::from_odr_bits(0b0000, AccelMode::Normal), None);
        assert_eq!(AccelRate::from_odr_bits(0b1000, AccelMode::Normal), None);
        assert_eq!(AccelRate::from_odr_bits(0b1111, AccelMode::LowPower), None);
    }

    #[test]
    fn accel_sensitivity_16g_is_not_doubled() {
        assert_eq!(AccelRange::G2.sensitivity_mg(), 1.0);
        assert_eq!(AccelRange::G4.sensitivity_mg(), 2.0);
        assert_eq!(AccelRange::G8.sensitivity_mg(), 4.0);
        assert_eq!(AccelRange::G16.sensitivity_mg(), 12.0);
    }

    #[test]
    fn mag_gain_table() {
        assert_eq!(MagRange::G1_3.gain(), MagGain { xy: 1100.0, z: 980.0 });
        assert_eq!(MagRange::G1_9.gain(), MagGain { xy: 855.0, z: 760.0 });
        assert_eq!(MagRange::G2_5.gain(), MagGain { xy: 670.0, z: 600.0 });
        assert_eq!(MagRange::G4_0.gain(), MagGain { xy: 450.0, z: 400.0 });
        assert_eq!(MagRange::G4_7.gain(), MagGain { xy: 400.0, z: 355.0 });
        assert_eq!(MagRange::G5_6.gain(), MagGain { xy: 330.0, z: 295.0 });
        assert_eq!(MagRange::G8_1.gain(), MagGain { xy: 230.0, z: 205.0 });
    }

    #[test]
    fn mag_range_repr() {
        assert_eq!(MagRange::from_repr(0), None);
        for range in MagRange::iter() {
            assert_eq!(MagRange::from_repr(range as u8), Some(range));
        }
    }

    #[test]
    fn register_addresses() {
        assert_eq!(AccelRegisters::OutXL.get_addr(BURST_READ), 0xA8);
        assert_eq!(AccelRegisters::OutXL.get_addr(SINGLE_REG), 0x28);
        assert_eq!(MagRegisters::TempOutH.get_addr(), 0x31);
    }
}
