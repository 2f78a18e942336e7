// Copyright (c) 2022, Zachary D. Olkin.
// This code is provided under the MIT license.

//! Device agnostic driver for the LSM303DLHC accelerometer and magnetometer.
//! The driver depends on embedded-hal, so as long as the HAL you use implements those traits, then
//! this driver should be compatible.
//!
//! The LSM303DLHC package holds two independent sub-devices on the same I2C bus, each at its own
//! fixed 7-bit address. The driver mirrors that: [`Lsm303Accel`] drives the 3-axis accelerometer and
//! [`Lsm303Mag`] drives the 3-axis magnetometer together with its onboard temperature sensor.
//!
//! Both drivers own their bus handle. Since the two sub-devices share one physical bus it is
//! recommended to hand each driver a shared-bus device (for example from `embedded-hal-bus`).
//! The drivers do no locking of their own.
//!
//! Typical use is: construct (the chip identity is checked here), `enable` with a configuration,
//! `read` repeatedly, and optionally `disable`.
//!
//! ```ignore
//! let mut acc = Lsm303Accel::new(acc_bus)?;
//! acc.enable(AccelMode::Normal, AccelRate::Hz100, AccelRange::G2, &mut delay)?;
//! let a = acc.read()?; // m/s^2
//!
//! let mut mag = Lsm303Mag::new(mag_bus)?;
//! mag.enable(MagRate::Hz15, MagRange::G1_3)?;
//! let m = mag.read()?; // microtesla, +/-inf on saturated axes
//! ```
//!
//! Enable the `defmt` feature for `defmt::Format` impls and debug logging.

#![deny(missing_docs)]
#![no_std]

#[macro_use]
mod log;

/// Main module that holds the accelerometer and magnetometer sub modules.
/// Also holds the enums, register maps and constants shared between them.
pub mod lsm303dlhc;

pub use lsm303dlhc::accel::Lsm303Accel;
pub use lsm303dlhc::interface::I2cInterface;
pub use lsm303dlhc::mag::Lsm303Mag;
pub use lsm303dlhc::{
    AccelMode, AccelRange, AccelRate, Lsm303Error, MagRange, MagRate, Vector3,
};
