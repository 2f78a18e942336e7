// Copyright (c) 2022, Zachary D. Olkin.
// This code is provided under the MIT license.

//! Shared mock transactions and helpers for the driver tests

#![allow(dead_code)]

pub use embedded_hal::i2c::ErrorKind;
pub use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction as I2cTrans};

pub const ACC_ADDR: u8 = 0b001_1001;
pub const MAG_ADDR: u8 = 0b001_1110;

/// Delay that only adds up how long it was asked to wait
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub total_ns: u64,
}

impl embedded_hal::delay::DelayNs for RecordingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

pub fn trans_accel_wai() -> I2cTrans {
    I2cTrans::write_read(ACC_ADDR, vec![0x0F], vec![0x33])
}

pub fn trans_accel_enable(ctrl1: u8, ctrl4: u8) -> Vec<I2cTrans> {
    vec![
        I2cTrans::write(ACC_ADDR, vec![0x20, ctrl1]),
        I2cTrans::write(ACC_ADDR, vec![0x23, ctrl4]),
    ]
}

pub fn trans_accel_disable() -> I2cTrans {
    I2cTrans::write(ACC_ADDR, vec![0x20, 0x00])
}

/// Burst read of OUT_X_L_A..OUT_Z_H_A, auto-increment bit set
pub fn trans_accel_out(x: i16, y: i16, z: i16) -> I2cTrans {
    let mut data = Vec::new();
    data.extend_from_slice(&x.to_le_bytes());
    data.extend_from_slice(&y.to_le_bytes());
    data.extend_from_slice(&z.to_le_bytes());
    I2cTrans::write_read(ACC_ADDR, vec![0xA8], data)
}

pub fn trans_mag_wai() -> I2cTrans {
    I2cTrans::write_read(MAG_ADDR, vec![0x0A], vec![0x48, 0x34, 0x33])
}

pub fn trans_mag_enable(cra: u8, crb: u8) -> Vec<I2cTrans> {
    vec![
        I2cTrans::write(MAG_ADDR, vec![0x00, cra]),
        I2cTrans::write(MAG_ADDR, vec![0x01, crb]),
        I2cTrans::write(MAG_ADDR, vec![0x02, 0x00]),
    ]
}

/// Burst read of OUT_X_H_M..OUT_Y_L_M, which the device lays out X, Z, Y
pub fn trans_mag_out(x: i16, y: i16, z: i16) -> I2cTrans {
    let mut data = Vec::new();
    data.extend_from_slice(&x.to_be_bytes());
    data.extend_from_slice(&z.to_be_bytes());
    data.extend_from_slice(&y.to_be_bytes());
    I2cTrans::write_read(MAG_ADDR, vec![0x03], data)
}
