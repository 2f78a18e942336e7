// Copyright (c) 2022, Zachary D. Olkin.
// This code is provided under the MIT license.

use crate::lsm303dlhc::bits::{CraRegM, CrbRegM, MrRegM, MR_CONTINUOUS, MR_SLEEP};
use crate::lsm303dlhc::interface::I2cInterface;
use crate::lsm303dlhc::PowerState::{self, *};
use crate::lsm303dlhc::{Lsm303Error, MagGain, MagRange, MagRate, MagRegisters, Vector3};
use crate::lsm303dlhc::{GAUSS_TO_MICROTESLA, MAG_ADDR, MAG_RAW_MAX, MAG_RAW_MIN, MAG_WAI, TEMP_SEN};
#[cfg(feature = "defmt")]
use defmt::{Format, Formatter};

use embedded_hal::i2c::{I2c, SevenBitAddress};

/// The magnetometer struct. Instantiate this in your application code then use it to
/// configure and read the magnetic field and temperature sub-device.
pub struct Lsm303Mag<BUS> {
    regs: I2cInterface<BUS>,
    mag_en: PowerState,
    gain: Option<MagGain>,
}

impl<BUS, E> Lsm303Mag<BUS>
where
    BUS: I2c<SevenBitAddress, Error = E>,
{
    /// Create a new magnetometer driver on the fixed magnetometer address.
    ///
    /// The sub-device has no single who-am-i register. The three identification registers are read
    /// as one 24-bit value and `InvalidChip` returned if it does not match.
    pub fn new(bus: BUS) -> Result<Self, Lsm303Error<E>> {
        Self::new_with_address(bus, MAG_ADDR)
    }

    /// Create a new magnetometer driver on a non-default 7-bit address `addr`.
    pub fn new_with_address(bus: BUS, addr: SevenBitAddress) -> Result<Self, Lsm303Error<E>> {
        let mut mag = Lsm303Mag {
            regs: I2cInterface::new(bus, addr),
            mag_en: Off,
            gain: None,
        };

        let wai = mag.wai()?;
        if wai != MAG_WAI {
            warn!("mag: identity {:#08x}, expected {:#08x}", wai, MAG_WAI);
            return Err(Lsm303Error::InvalidChip);
        }
        debug!("mag: identity ok at {:#04x}", addr);

        Ok(mag)
    }

    /// Who Am I? Reads IRA, IRB and IRC as one big-endian 24-bit value.
    ///
    /// The expected value is [`MAG_WAI`].
    pub fn wai(&mut self) -> Result<u32, Lsm303Error<E>> {
        Ok(self.regs.read_u24_be(MagRegisters::IraReg.get_addr())?)
    }

    /// Enables the magnetometer in continuous-conversion mode.
    ///
    /// The temperature sensor is always switched on. The gain pair for `range` is cached and used
    /// by every following [`read`](Self::read) until the next `enable`.
    pub fn enable(&mut self, rate: MagRate, range: MagRange) -> Result<(), Lsm303Error<E>> {
        let mut cra = CraRegM::from_bits(0);
        cra.set_temp_en(true);
        cra.set_data_rate(rate as u8);

        let mut crb = CrbRegM::from_bits(0);
        crb.set_gain(range as u8);

        let mut mr = MrRegM::from_bits(0);
        mr.set_mode(MR_CONTINUOUS);

        self.regs.write_u8(MagRegisters::CraReg.get_addr(), cra.bits())?;
        self.regs.write_u8(MagRegisters::CrbReg.get_addr(), crb.bits())?;
        self.regs.write_u8(MagRegisters::MrReg.get_addr(), mr.bits())?;
        debug!(
            "mag: CRA_REG_M={:#04x} CRB_REG_M={:#04x}",
            cra.bits(),
            crb.bits()
        );

        self.gain = Some(range.gain());
        self.mag_en = On;
        Ok(())
    }

    /// Puts the magnetometer to sleep.
    ///
    /// The cached gain is kept. Calling `enable` again is always safe.
    pub fn disable(&mut self) -> Result<(), Lsm303Error<E>> {
        let mut mr = MrRegM::from_bits(0);
        mr.set_mode(MR_SLEEP);
        self.regs.write_u8(MagRegisters::MrReg.get_addr(), mr.bits())?;
        debug!("mag: sleeping");

        self.mag_en = Off;
        Ok(())
    }

    /// Checks if the magnetometer is enabled. Returns true if enabled, false if otherwise.
    pub fn is_enabled(&self) -> bool {
        self.mag_en == On
    }

    /// The gain pair cached by the last `enable`, if any.
    pub fn gain(&self) -> Option<MagGain> {
        self.gain
    }

    /// Read the temperature sensor.
    ///
    /// Returns the temperature in Celsius. The sensor is not factory calibrated for an absolute
    /// offset, so treat the value as relative.
    pub fn read_temperature(&mut self) -> Result<f32, Lsm303Error<E>> {
        let raw = self.regs.read_i16_be(MagRegisters::TempOutH.get_addr())?;
        Ok(raw as f32 * TEMP_SEN)
    }

    /// Reads all three axes as raw counts, in the order x, y, z.
    ///
    /// No scaling and no saturation handling.
    pub fn read_raw(&mut self) -> Result<Vector3<i16>, Lsm303Error<E>> {
        // Registers are laid out X, Z, Y
        let mut buf = [0; 6];
        self.regs.read_bytes(MagRegisters::OutXH.get_addr(), &mut buf)?;

        Ok(Vector3::new(
            i16::from_be_bytes([buf[0], buf[1]]),
            i16::from_be_bytes([buf[4], buf[5]]),
            i16::from_be_bytes([buf[2], buf[3]]),
        ))
    }

    /// Reads all three axes and returns them in microtesla.
    ///
    /// An axis whose raw count is outside the sensor's output range comes back as positive or
    /// negative infinity, following the sign of the count. That means the field is too strong for
    /// the configured range and `enable` should be called again with a wider one. Each axis is
    /// checked on its own.
    ///
    /// Returns `NotEnabled` if `enable` was never called.
    pub fn read(&mut self) -> Result<Vector3<f32>, Lsm303Error<E>> {
        let gain = self.gain.ok_or(Lsm303Error::NotEnabled)?;
        let raw = self.read_raw()?;

        Ok(Vector3::new(
            raw_to_microtesla(raw.x, gain.xy),
            raw_to_microtesla(raw.y, gain.xy),
            raw_to_microtesla(raw.z, gain.z),
        ))
    }

    /// Reads the full-scale range currently set in CRB_REG_M.
    ///
    /// Returns `InvalidRange` if the gain bits are 0b000.
    pub fn read_range(&mut self) -> Result<MagRange, Lsm303Error<E>> {
        let crb = CrbRegM::from_bits(self.regs.read_u8(MagRegisters::CrbReg.get_addr())?);
        MagRange::from_repr(crb.gain()).ok_or(Lsm303Error::InvalidRange)
    }

    /// Reads the output data rate currently set in CRA_REG_M.
    pub fn read_rate(&mut self) -> Result<MagRate, Lsm303Error<E>> {
        let cra = CraRegM::from_bits(self.regs.read_u8(MagRegisters::CraReg.get_addr())?);
        // DO is three bits, every pattern is a rate
        MagRate::from_repr(cra.data_rate()).ok_or(Lsm303Error::InvalidRate)
    }

    /// Consume the driver and hand back the bus.
    pub fn release(self) -> BUS {
        self.regs.release()
    }
}

/// Convert one raw axis count to microtesla with `gain` in LSB/gauss.
///
/// Counts outside `MAG_RAW_MIN < raw < MAG_RAW_MAX` map to infinity with the sign of the count.
pub fn raw_to_microtesla(raw: i16, gain: f32) -> f32 {
    if raw <= MAG_RAW_MIN {
        trace!("mag: axis saturated low ({})", raw);
        f32::NEG_INFINITY
    } else if raw >= MAG_RAW_MAX {
        trace!("mag: axis saturated high ({})", raw);
        f32::INFINITY
    } else {
        raw as f32 * GAUSS_TO_MICROTESLA / gain
    }
}

#[cfg(feature = "defmt")]
impl<BUS> Format for Lsm303Mag<BUS> {
    fn format(&self, fmt: Formatter) {
        defmt::write!(fmt, "LSM303DLHC magnetometer")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_range_counts_scale_by_gain() {
        assert_eq!(raw_to_microtesla(100, 1100.0), 100.0 * 100.0 / 1100.0);
        assert_eq!(raw_to_microtesla(-100, 980.0), -100.0 * 100.0 / 980.0);
        assert_eq!(raw_to_microtesla(0, 230.0), 0.0);
    }

    #[test]
    fn saturation_bounds() {
        assert_eq!(raw_to_microtesla(2046, 1100.0), 2046.0 * 100.0 / 1100.0);
        assert_eq!(raw_to_microtesla(2047, 1100.0), f32::INFINITY);
        assert_eq!(raw_to_microtesla(2048, 1100.0), f32::INFINITY);
        assert_eq!(raw_to_microtesla(i16::MAX, 1100.0), f32::INFINITY);
        assert_eq!(raw_to_microtesla(-2047, 1100.0), -2047.0 * 100.0 / 1100.0);
        assert_eq!(raw_to_microtesla(-2048, 1100.0), f32::NEG_INFINITY);
        assert_eq!(raw_to_microtesla(-2049, 1100.0), f32::NEG_INFINITY);
        assert_eq!(raw_to_microtesla(i16::MIN, 1100.0), f32::NEG_INFINITY);
    }
}
