// Copyright (c) 2022, Zachary D. Olkin.
// This code is provided under the MIT license.

use embedded_hal::i2c::{I2c, SevenBitAddress};

/// Register access to one sub-device: a bus handle bound to a 7-bit address.
///
/// Every call is one bus transaction and bus errors come back untouched.
/// Whether a multi-byte read auto-increments is up to the register address the caller passes in.
pub struct I2cInterface<BUS> {
    bus: BUS,
    addr: SevenBitAddress,
}

impl<BUS, E> I2cInterface<BUS>
where
    BUS: I2c<SevenBitAddress, Error = E>,
{
    /// Bind `bus` to the sub-device at `addr`.
    pub const fn new(bus: BUS, addr: SevenBitAddress) -> Self {
        I2cInterface { bus, addr }
    }

    /// The bound 7-bit address.
    pub fn addr(&self) -> SevenBitAddress {
        self.addr
    }

    /// Consume the interface and hand back the bus.
    pub fn release(self) -> BUS {
        self.bus
    }

    /// Read one register.
    pub fn read_u8(&mut self, reg: u8) -> Result<u8, E> {
        let mut buf = [0];
        self.bus.write_read(self.addr, &[reg], &mut buf)?;
        Ok(buf[0])
    }

    /// Write one register.
    pub fn write_u8(&mut self, reg: u8, value: u8) -> Result<(), E> {
        self.bus.write(self.addr, &[reg, value])
    }

    /// Read `buf.len()` bytes starting at `reg`.
    pub fn read_bytes(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), E> {
        self.bus.write_read(self.addr, &[reg], buf)
    }

    /// Read a signed 16-bit value stored high byte first.
    pub fn read_i16_be(&mut self, reg: u8) -> Result<i16, E> {
        let mut buf = [0, 0];
        self.read_bytes(reg, &mut buf)?;
        Ok(i16::from_be_bytes(buf))
    }

    /// Read a signed 16-bit value stored low byte first.
    pub fn read_i16_le(&mut self, reg: u8) -> Result<i16, E> {
        let mut buf = [0, 0];
        self.read_bytes(reg, &mut buf)?;
        Ok(i16::from_le_bytes(buf))
    }

    /// Read an unsigned 24-bit value stored high byte first.
    pub fn read_u24_be(&mut self, reg: u8) -> Result<u32, E> {
        let mut buf = [0; 3];
        self.read_bytes(reg, &mut buf)?;
        Ok(u32::from_be_bytes([0, buf[0], buf[1], buf[2]]))
    }
}
