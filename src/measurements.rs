//! Decoding of the measurement registers
//!
//! All registers are 16 bit big-endian words. The shunt voltage and current registers hold signed
//! values, the bus voltage register carries three status bits below the value and the power
//! register is unsigned.
//!
//! Negative values are decoded by inverting the bits of the register without adding one. A raw
//! `0x8001` therefore decodes to `-32766` counts rather than the `-32767` a two's complement
//! reading gives, and `0xFFFF` to `-0.0`. Existing calibration workflows depend on these numbers,
//! so the decoding is kept as is.

use crate::register::{ReadRegister, Register};

/// Volts per count of the shunt voltage register
pub const SHUNT_VOLTAGE_LSB: f64 = 1e-4;

/// Volts per count of the bus voltage value
pub const BUS_VOLTAGE_LSB: f64 = 0.004;

const BUS_VOLTAGE_FLAG_BITS: u8 = 3;
const CONVERSION_READY: u16 = 0b10;
const MATH_OVERFLOW: u16 = 0b01;

/// Decode a signed register and scale it
///
/// Values above `0x7FFF` are negative with a magnitude of the bitwise complement of the word.
///
/// # Example
/// ```rust
/// use ina219_calibrated::measurements::decode_signed_16;
///
/// assert_eq!(decode_signed_16([0x00, 0x0A], 0.5), 5.0);
/// assert_eq!(decode_signed_16([0xFF, 0xF5], 0.5), -5.0);
/// ```
#[must_use]
pub fn decode_signed_16(raw: [u8; 2], scale: f64) -> f64 {
    let value = u16::from_be_bytes(raw);
    if value > 0x7FFF {
        -f64::from(!value) * scale
    } else {
        f64::from(value) * scale
    }
}

/// Decode the bus voltage register into volts, dropping the status bits
#[must_use]
pub fn decode_bus_voltage(raw: [u8; 2]) -> f64 {
    f64::from(u16::from_be_bytes(raw) >> BUS_VOLTAGE_FLAG_BITS) * BUS_VOLTAGE_LSB
}

/// Decode the power register into watts for the given current per LSB in A
#[must_use]
pub fn decode_power(raw: [u8; 2], current_lsb: f64) -> f64 {
    f64::from(u16::from_be_bytes(raw)) * 20.0 * current_lsb
}

/// Content of the shunt voltage register
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ShuntVoltageRegister(pub u16);

impl ShuntVoltageRegister {
    /// Shunt voltage in V
    #[must_use]
    pub fn volts(self) -> f64 {
        decode_signed_16(self.0.to_be_bytes(), SHUNT_VOLTAGE_LSB)
    }
}

impl Register for ShuntVoltageRegister {
    const ADDRESS: u8 = 0x01;
}

impl ReadRegister for ShuntVoltageRegister {
    fn from_bits(bits: u16) -> Self {
        Self(bits)
    }
}

/// Content of the bus voltage register
///
/// Next to the value it holds flags about the last conversion.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusVoltageRegister(pub u16);

impl BusVoltageRegister {
    /// Bus voltage in V
    #[must_use]
    pub fn volts(self) -> f64 {
        decode_bus_voltage(self.0.to_be_bytes())
    }

    /// A conversion finished since the flag was last cleared
    ///
    /// Reading the power register or writing the configuration register clears the flag.
    #[must_use]
    pub const fn is_conversion_ready(self) -> bool {
        self.0 & CONVERSION_READY != 0
    }

    /// Current or power overflowed during the last conversion and are not to be trusted
    #[must_use]
    pub const fn has_math_overflowed(self) -> bool {
        self.0 & MATH_OVERFLOW != 0
    }
}

impl Register for BusVoltageRegister {
    const ADDRESS: u8 = 0x02;
}

impl ReadRegister for BusVoltageRegister {
    fn from_bits(bits: u16) -> Self {
        Self(bits)
    }
}

/// Content of the power register
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerRegister(pub u16);

impl Register for PowerRegister {
    const ADDRESS: u8 = 0x03;
}

impl ReadRegister for PowerRegister {
    fn from_bits(bits: u16) -> Self {
        Self(bits)
    }
}

/// Content of the current register
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CurrentRegister(pub u16);

impl Register for CurrentRegister {
    const ADDRESS: u8 = 0x04;
}

impl ReadRegister for CurrentRegister {
    fn from_bits(bits: u16) -> Self {
        Self(bits)
    }
}

/// One reading of every measurement register
#[derive(Debug, Default, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Measurements {
    /// Bus voltage in V
    pub bus_voltage: f64,
    /// Shunt voltage in V
    pub shunt_voltage: f64,
    /// Current in A
    pub current: f64,
    /// Power in W
    pub power: f64,
    /// See [`BusVoltageRegister::is_conversion_ready`]
    pub conversion_ready: bool,
    /// See [`BusVoltageRegister::has_math_overflowed`]
    pub math_overflow: bool,
}
