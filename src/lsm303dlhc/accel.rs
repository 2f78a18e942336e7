// Copyright (c) 2022, Zachary D. Olkin.
// This code is provided under the MIT license.

use crate::lsm303dlhc::bits::{CtrlReg1A, CtrlReg4A};
use crate::lsm303dlhc::interface::I2cInterface;
use crate::lsm303dlhc::PowerState::{self, *};
use crate::lsm303dlhc::{AccelMode, AccelRange, AccelRate, AccelRegisters, Lsm303Error, Vector3};
use crate::lsm303dlhc::{ACCEL_ADDR, ACCEL_RAW_TO_MS2, ACCEL_WAI, BURST_READ, SINGLE_REG};
#[cfg(feature = "defmt")]
use defmt::{Format, Formatter};

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::{I2c, SevenBitAddress};

/// Time the filter and output stage need after a configuration change before reads are valid.
const SETTLE_MS: u32 = 10;

/// The accelerometer struct. Instantiate this in your application code then use it to
/// configure and read the linear acceleration sub-device.
pub struct Lsm303Accel<BUS> {
    regs: I2cInterface<BUS>,
    acc_en: PowerState,
    range: Option<AccelRange>,
}

impl<BUS, E> Lsm303Accel<BUS>
where
    BUS: I2c<SevenBitAddress, Error = E>,
{
    /// Create a new accelerometer driver on the fixed accelerometer address.
    ///
    /// The identity register is checked and `InvalidChip` returned if it does not match.
    pub fn new(bus: BUS) -> Result<Self, Lsm303Error<E>> {
        Self::new_with_address(bus, ACCEL_ADDR)
    }

    /// Create a new accelerometer driver on a non-default 7-bit address `addr`.
    pub fn new_with_address(bus: BUS, addr: SevenBitAddress) -> Result<Self, Lsm303Error<E>> {
        let mut imu = Lsm303Accel {
            regs: I2cInterface::new(bus, addr),
            acc_en: Off,
            range: None,
        };

        let wai = imu.wai()?;
        if wai != ACCEL_WAI {
            warn!("accel: identity {:#04x}, expected {:#04x}", wai, ACCEL_WAI);
            return Err(Lsm303Error::InvalidChip);
        }
        debug!("accel: identity ok at {:#04x}", addr);

        Ok(imu)
    }

    /// Who Am I? Reads the identity register and reports the value.
    ///
    /// Useful for testing that the device is properly connected. The expected value is [`ACCEL_WAI`].
    pub fn wai(&mut self) -> Result<u8, Lsm303Error<E>> {
        Ok(self.regs.read_u8(AccelRegisters::WhoAmI.get_addr(SINGLE_REG))?)
    }

    /// Enables the accelerometer with all three axes on.
    ///
    /// `rate` must be legal in `mode`: 1344Hz needs normal or high resolution mode, 1620Hz and
    /// 5376Hz need low power mode. Anything else is rejected with `InvalidRate` before any write.
    ///
    /// Blocks on `delay` for 10ms after the writes so the next read sees settled output.
    pub fn enable<D: DelayNs>(
        &mut self,
        mode: AccelMode,
        rate: AccelRate,
        range: AccelRange,
        delay: &mut D,
    ) -> Result<(), Lsm303Error<E>> {
        let odr = match rate.odr_bits(mode) {
            Some(odr) => odr,
            None => {
                warn!("accel: rate {} not allowed in mode {}", rate, mode);
                return Err(Lsm303Error::InvalidRate);
            }
        };

        let mut ctrl1 = CtrlReg1A::from_bits(0);
        ctrl1.set_odr(odr);
        ctrl1.set_lp_en(mode == AccelMode::LowPower);
        ctrl1.set_x_en(true);
        ctrl1.set_y_en(true);
        ctrl1.set_z_en(true);

        // BDU and BLE stay 0: continuous update, little endian
        let mut ctrl4 = CtrlReg4A::from_bits(0);
        ctrl4.set_fs(range as u8);
        ctrl4.set_hr(mode == AccelMode::HighResolution);

        self.regs
            .write_u8(AccelRegisters::CtrlReg1.get_addr(SINGLE_REG), ctrl1.bits())?;
        self.regs
            .write_u8(AccelRegisters::CtrlReg4.get_addr(SINGLE_REG), ctrl4.bits())?;
        debug!(
            "accel: CTRL_REG1_A={:#04x} CTRL_REG4_A={:#04x}",
            ctrl1.bits(),
            ctrl4.bits()
        );

        self.range = Some(range);
        self.acc_en = On;

        delay.delay_ms(SETTLE_MS);
        Ok(())
    }

    /// Disables the accelerometer by writing 0 to CTRL_REG1_A, which powers it down.
    ///
    /// The range cached by the last `enable` is kept. Calling `enable` again is always safe.
    pub fn disable(&mut self) -> Result<(), Lsm303Error<E>> {
        self.regs
            .write_u8(AccelRegisters::CtrlReg1.get_addr(SINGLE_REG), 0)?;
        debug!("accel: powered down");

        self.acc_en = Off;
        Ok(())
    }

    /// Checks if the accelerometer is enabled. Returns true if enabled, false if otherwise.
    pub fn is_enabled(&self) -> bool {
        self.acc_en == On
    }

    /// Reads all three axes as raw sign-extended counts, in the order x, y, z.
    ///
    /// The counts are 12-bit values left-justified in 16 bits.
    pub fn read_raw(&mut self) -> Result<Vector3<i16>, Lsm303Error<E>> {
        let mut buf = [0; 6];
        self.regs
            .read_bytes(AccelRegisters::OutXL.get_addr(BURST_READ), &mut buf)?;

        Ok(Vector3::new(
            i16::from_le_bytes([buf[0], buf[1]]),
            i16::from_le_bytes([buf[2], buf[3]]),
            i16::from_le_bytes([buf[4], buf[5]]),
        ))
    }

    /// Reads all three axes and returns them in m/s^2.
    ///
    /// Scaling uses the range cached by the last `enable`. A range changed behind the driver's
    /// back is not picked up. Returns `NotEnabled` if `enable` was never called.
    pub fn read(&mut self) -> Result<Vector3<f32>, Lsm303Error<E>> {
        let range = self.range.ok_or(Lsm303Error::NotEnabled)?;
        let raw = self.read_raw()?;

        Ok(Vector3::new(
            raw_to_ms2(raw.x, range),
            raw_to_ms2(raw.y, range),
            raw_to_ms2(raw.z, range),
        ))
    }

    /// Reads the full-scale range currently set in CTRL_REG4_A.
    pub fn read_range(&mut self) -> Result<AccelRange, Lsm303Error<E>> {
        let ctrl4 = self.read_ctrl4()?;
        // FS is two bits, every pattern is a range
        AccelRange::from_repr(ctrl4.fs()).ok_or(Lsm303Error::InvalidRange)
    }

    /// Reads the power/precision mode currently set on the device.
    ///
    /// Returns `InvalidMode` if both the low power and high resolution bits are set.
    pub fn read_mode(&mut self) -> Result<AccelMode, Lsm303Error<E>> {
        let ctrl1 = self.read_ctrl1()?;
        let ctrl4 = self.read_ctrl4()?;
        decode_mode(ctrl1, ctrl4)
    }

    /// Reads the output data rate currently set on the device.
    ///
    /// Returns `None` if the accelerometer is powered down, and `InvalidRate` if the ODR bits
    /// are not a legal rate for the mode the device is in.
    pub fn read_rate(&mut self) -> Result<Option<AccelRate>, Lsm303Error<E>> {
        let ctrl1 = self.read_ctrl1()?;
        if ctrl1.odr() == 0 {
            return Ok(None);
        }

        let ctrl4 = self.read_ctrl4()?;
        let mode = decode_mode(ctrl1, ctrl4)?;
        match AccelRate::from_odr_bits(ctrl1.odr(), mode) {
            Some(rate) => Ok(Some(rate)),
            None => Err(Lsm303Error::InvalidRate),
        }
    }

    /// Consume the driver and hand back the bus.
    pub fn release(self) -> BUS {
        self.regs.release()
    }

    fn read_ctrl1(&mut self) -> Result<CtrlReg1A, Lsm303Error<E>> {
        let bits = self
            .regs
            .read_u8(AccelRegisters::CtrlReg1.get_addr(SINGLE_REG))?;
        Ok(CtrlReg1A::from_bits(bits))
    }

    fn read_ctrl4(&mut self) -> Result<CtrlReg4A, Lsm303Error<E>> {
        let bits = self
            .regs
            .read_u8(AccelRegisters::CtrlReg4.get_addr(SINGLE_REG))?;
        Ok(CtrlReg4A::from_bits(bits))
    }
}

/// Convert one raw axis count to m/s^2 at `range`.
pub fn raw_to_ms2(raw: i16, range: AccelRange) -> f32 {
    raw as f32 * range.sensitivity_mg() * ACCEL_RAW_TO_MS2
}

fn decode_mode<E>(ctrl1: CtrlReg1A, ctrl4: CtrlReg4A) -> Result<AccelMode, Lsm303Error<E>> {
    match (ctrl1.lp_en(), ctrl4.hr()) {
        (false, false) => Ok(AccelMode::Normal),
        (true, false) => Ok(AccelMode::LowPower),
        (false, true) => Ok(AccelMode::HighResolution),
        (true, true) => Err(Lsm303Error::InvalidMode),
    }
}

#[cfg(feature = "defmt")]
impl<BUS> Format for Lsm303Accel<BUS> {
    fn format(&self, fmt: Formatter) {
        defmt::write!(fmt, "LSM303DLHC accelerometer")
    }
}
