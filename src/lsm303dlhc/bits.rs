// Copyright (c) 2022, Zachary D. Olkin.
// This code is provided under the MIT license.

use bitfield::bitfield;

bitfield! {
    /// bitfields of CTRL_REG1_A register
    #[derive(Clone, Copy, PartialEq)]
    pub struct CtrlReg1A(u8);
    impl Debug;
    /// output data rate, 0 powers the accelerometer down
    pub odr, set_odr: 7, 4;
    /// low power mode
    pub lp_en, set_lp_en: 3;
    /// enable Z axis
    pub z_en, set_z_en: 2;
    /// enable Y axis
    pub y_en, set_y_en: 1;
    /// enable X axis
    pub x_en, set_x_en: 0;
}

bitfield! {
    /// bitfields of CTRL_REG4_A register
    #[derive(Clone, Copy, PartialEq)]
    pub struct CtrlReg4A(u8);
    impl Debug;
    /// block data update, false = continuous update
    pub bdu, set_bdu: 7;
    /// big endian output, false = little endian
    pub ble, set_ble: 6;
    /// full-scale selection
    pub fs, set_fs: 5, 4;
    /// high resolution output mode
    pub hr, set_hr: 3;
}

bitfield! {
    /// bitfields of CRA_REG_M register
    #[derive(Clone, Copy, PartialEq)]
    pub struct CraRegM(u8);
    impl Debug;
    /// enable the temperature sensor
    pub temp_en, set_temp_en: 7;
    /// output data rate
    pub data_rate, set_data_rate: 4, 2;
}

bitfield! {
    /// bitfields of CRB_REG_M register
    #[derive(Clone, Copy, PartialEq)]
    pub struct CrbRegM(u8);
    impl Debug;
    /// gain configuration
    pub gain, set_gain: 7, 5;
}

bitfield! {
    /// bitfields of MR_REG_M register
    #[derive(Clone, Copy, PartialEq)]
    pub struct MrRegM(u8);
    impl Debug;
    /// operating mode, 0b00 continuous conversion, 0b11 sleep
    pub mode, set_mode: 1, 0;
}

/// MR_REG_M mode for continuous conversion.
pub const MR_CONTINUOUS: u8 = 0b00;

/// MR_REG_M mode for sleep.
pub const MR_SLEEP: u8 = 0b11;

macro_rules! raw_access {
    ($($name:ident),*) => {
        $(
            impl $name {
                /// Wrap a raw register value.
                pub const fn from_bits(bits: u8) -> Self {
                    $name(bits)
                }

                /// The raw register value.
                pub const fn bits(&self) -> u8 {
                    self.0
                }
            }
        )*
    };
}

raw_access!(CtrlReg1A, CtrlReg4A, CraRegM, CrbRegM, MrRegM);
