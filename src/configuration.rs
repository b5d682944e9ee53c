//! The configuration register and the operating parameters a calibration is derived from
//!
//! [`Configuration`] is the typed content of the CONFIG register. [`OperatingConfig`] pairs it
//! with the shunt resistance, which is all [`INA219::configure`](crate::SyncIna219::configure)
//! needs.
//!
//! # Example
//! Fields not of interest can be left at the power-on defaults:
//! ```rust
//! use ina219_calibrated::configuration::{AdcMode, Configuration, Gain};
//!
//! let conf = Configuration {
//!     gain: Gain::Div2,
//!     shunt_adc: AdcMode::Avg16,
//!     ..Default::default()
//! };
//! assert_eq!(conf.as_bits(), 0b0010_1001_1110_0111);
//! ```

use crate::errors::{ConfigField, InvalidConfiguration};
use crate::register::{ReadRegister, Register, WriteRegister};
use core::time::Duration;

const fn field(reg: u16, shift: u8, mask: u16) -> u16 {
    (reg >> shift) & mask
}

const fn place(bits: u16, shift: u8) -> u16 {
    bits << shift
}

/// Reset bit of the configuration register
///
/// Writing `Reset` restores every register to its power-on value. The chip clears the bit by
/// itself, so it always reads back as `Run`.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Reset {
    /// Keep running
    #[default]
    Run = 0,
    /// Restore the power-on defaults
    Reset = 1,
}

impl Reset {
    const SHIFT: u8 = 15;

    const fn from_register(reg: u16) -> Self {
        match field(reg, Self::SHIFT, 1) {
            0 => Self::Run,
            _ => Self::Reset,
        }
    }
}

/// Full scale of the bus voltage ADC (BRNG)
#[derive(Default, Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum BusRange {
    /// 16 V full scale
    V16 = 0,
    /// 32 V full scale, the pins are still limited to 26 V
    #[default]
    V32 = 1,
}

impl BusRange {
    const SHIFT: u8 = 13;

    /// Full scale in volts
    #[must_use]
    pub const fn full_scale_volts(self) -> f64 {
        match self {
            Self::V16 => 16.0,
            Self::V32 => 32.0,
        }
    }

    const fn from_register(reg: u16) -> Self {
        match field(reg, Self::SHIFT, 1) {
            0 => Self::V16,
            _ => Self::V32,
        }
    }
}

impl TryFrom<u8> for BusRange {
    type Error = InvalidConfiguration;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::V16),
            1 => Ok(Self::V32),
            _ => Err(InvalidConfiguration::UnknownBusRange(code)),
        }
    }
}

/// Gain of the shunt voltage amplifier (PG)
///
/// The gain fixes the largest shunt voltage the chip can measure, and with the shunt resistance the
/// largest current.
#[derive(Default, Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Gain {
    /// Gain 1, ±40 mV
    Div1 = 0,
    /// Gain 1/2, ±80 mV
    Div2 = 1,
    /// Gain 1/4, ±160 mV
    Div4 = 2,
    /// Gain 1/8, ±320 mV
    #[default]
    Div8 = 3,
}

impl Gain {
    const SHIFT: u8 = 11;

    /// Largest measurable shunt voltage in volts
    #[must_use]
    pub const fn full_scale_volts(self) -> f64 {
        match self {
            Self::Div1 => 0.04,
            Self::Div2 => 0.08,
            Self::Div4 => 0.16,
            Self::Div8 => 0.32,
        }
    }

    const fn from_register(reg: u16) -> Self {
        match field(reg, Self::SHIFT, 0b11) {
            0 => Self::Div1,
            1 => Self::Div2,
            2 => Self::Div4,
            _ => Self::Div8,
        }
    }
}

impl TryFrom<u8> for Gain {
    type Error = InvalidConfiguration;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Div1),
            1 => Ok(Self::Div2),
            2 => Ok(Self::Div4),
            3 => Ok(Self::Div8),
            _ => Err(InvalidConfiguration::UnknownGain(code)),
        }
    }
}

/// Resolution or averaging of an ADC (BADC / SADC)
///
/// Every 4 bit code has a variant. Codes `0b0100` to `0b1000` select the same mode as a lower code
/// (table 5 of the datasheet) and are kept apart so the register holds exactly what was written.
#[derive(Default, Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AdcMode {
    /// One 9 bit sample
    Res9Bit = 0b0000,
    /// One 10 bit sample
    Res10Bit = 0b0001,
    /// One 11 bit sample
    Res11Bit = 0b0010,
    /// One 12 bit sample
    #[default]
    Res12Bit = 0b0011,
    /// One 9 bit sample, second code
    Res9BitCode4 = 0b0100,
    /// One 10 bit sample, second code
    Res10BitCode5 = 0b0101,
    /// One 11 bit sample, second code
    Res11BitCode6 = 0b0110,
    /// One 12 bit sample, second code
    Res12BitCode7 = 0b0111,
    /// One 12 bit sample, third code
    Res12BitCode8 = 0b1000,
    /// Mean of 2 samples of 12 bit
    Avg2 = 0b1001,
    /// Mean of 4 samples of 12 bit
    Avg4 = 0b1010,
    /// Mean of 8 samples of 12 bit
    Avg8 = 0b1011,
    /// Mean of 16 samples of 12 bit
    Avg16 = 0b1100,
    /// Mean of 32 samples of 12 bit
    Avg32 = 0b1101,
    /// Mean of 64 samples of 12 bit
    Avg64 = 0b1110,
    /// Mean of 128 samples of 12 bit
    Avg128 = 0b1111,
}

impl AdcMode {
    const BUS_SHIFT: u8 = 7;
    const SHUNT_SHIFT: u8 = 3;
    const MASK: u16 = 0b1111;

    const fn from_code(code: u16) -> Self {
        match code & Self::MASK {
            0b0000 => Self::Res9Bit,
            0b0001 => Self::Res10Bit,
            0b0010 => Self::Res11Bit,
            0b0011 => Self::Res12Bit,
            0b0100 => Self::Res9BitCode4,
            0b0101 => Self::Res10BitCode5,
            0b0110 => Self::Res11BitCode6,
            0b0111 => Self::Res12BitCode7,
            0b1000 => Self::Res12BitCode8,
            0b1001 => Self::Avg2,
            0b1010 => Self::Avg4,
            0b1011 => Self::Avg8,
            0b1100 => Self::Avg16,
            0b1101 => Self::Avg32,
            0b1110 => Self::Avg64,
            _ => Self::Avg128,
        }
    }

    fn try_from_code(code: u8, which: ConfigField) -> Result<Self, InvalidConfiguration> {
        if u16::from(code) > Self::MASK {
            return Err(InvalidConfiguration::CodeOutOfRange { field: which, code });
        }
        Ok(Self::from_code(u16::from(code)))
    }

    /// The lowest code selecting the same mode
    #[must_use]
    pub const fn canonical(self) -> Self {
        match self {
            Self::Res9BitCode4 => Self::Res9Bit,
            Self::Res10BitCode5 => Self::Res10Bit,
            Self::Res11BitCode6 => Self::Res11Bit,
            Self::Res12BitCode7 | Self::Res12BitCode8 => Self::Res12Bit,
            other => other,
        }
    }

    /// Time one conversion takes in µs
    #[must_use]
    pub const fn conversion_time_us(self) -> u32 {
        match self {
            Self::Res9Bit | Self::Res9BitCode4 => 84,
            Self::Res10Bit | Self::Res10BitCode5 => 148,
            Self::Res11Bit | Self::Res11BitCode6 => 276,
            Self::Res12Bit | Self::Res12BitCode7 | Self::Res12BitCode8 => 532,
            Self::Avg2 => 1_060,
            Self::Avg4 => 2_130,
            Self::Avg8 => 4_260,
            Self::Avg16 => 8_510,
            Self::Avg32 => 17_020,
            Self::Avg64 => 34_050,
            Self::Avg128 => 68_100,
        }
    }
}

/// Signals converted by the ADC
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum MeasuredSignals {
    /// Shunt voltage only
    ShuntVoltage = 1,
    /// Bus voltage only
    BusVoltage = 2,
    /// Shunt and bus voltage
    #[default]
    ShuntAndBusVoltage = 3,
}

/// Operating mode (MODE)
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    /// No conversions and minimal supply current, waking up takes 40 µs
    PowerDown,
    /// Conversions stopped
    AdcOff,
    /// One conversion per write of the configuration register
    Triggered(MeasuredSignals),
    /// Conversions run back to back
    Continuous(MeasuredSignals),
}

impl OperatingMode {
    const MASK: u16 = 0b111;

    const fn from_code(code: u16) -> Self {
        let signals = match code & 0b11 {
            1 => MeasuredSignals::ShuntVoltage,
            2 => MeasuredSignals::BusVoltage,
            _ => MeasuredSignals::ShuntAndBusVoltage,
        };

        match code & Self::MASK {
            0b000 => Self::PowerDown,
            0b100 => Self::AdcOff,
            0b001..=0b011 => Self::Triggered(signals),
            _ => Self::Continuous(signals),
        }
    }

    /// The three MODE bits
    #[must_use]
    pub const fn as_bits(self) -> u16 {
        match self {
            Self::PowerDown => 0b000,
            Self::AdcOff => 0b100,
            Self::Triggered(signals) => signals as u16,
            Self::Continuous(signals) => signals as u16 | 0b100,
        }
    }
}

impl Default for OperatingMode {
    fn default() -> Self {
        Self::Continuous(MeasuredSignals::ShuntAndBusVoltage)
    }
}

impl TryFrom<u8> for OperatingMode {
    type Error = InvalidConfiguration;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        if u16::from(code) > Self::MASK {
            return Err(InvalidConfiguration::CodeOutOfRange {
                field: ConfigField::Mode,
                code,
            });
        }
        Ok(Self::from_code(u16::from(code)))
    }
}

/// Content of the configuration register
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Configuration {
    /// Reset bit
    pub reset: Reset,
    /// Bus voltage full scale
    pub bus_range: BusRange,
    /// Shunt amplifier gain
    pub gain: Gain,
    /// Resolution or averaging of the bus voltage ADC
    pub bus_adc: AdcMode,
    /// Resolution or averaging of the shunt voltage ADC
    pub shunt_adc: AdcMode,
    /// What is converted and when
    pub operating_mode: OperatingMode,
}

impl Configuration {
    /// Decode the register bits
    #[must_use]
    pub const fn from_bits(reg: u16) -> Self {
        Self {
            reset: Reset::from_register(reg),
            bus_range: BusRange::from_register(reg),
            gain: Gain::from_register(reg),
            bus_adc: AdcMode::from_code(field(reg, AdcMode::BUS_SHIFT, AdcMode::MASK)),
            shunt_adc: AdcMode::from_code(field(reg, AdcMode::SHUNT_SHIFT, AdcMode::MASK)),
            operating_mode: OperatingMode::from_code(reg),
        }
    }

    /// Encode into the register bits
    #[must_use]
    pub const fn as_bits(self) -> u16 {
        place(self.reset as u16, Reset::SHIFT)
            | place(self.bus_range as u16, BusRange::SHIFT)
            | place(self.gain as u16, Gain::SHIFT)
            | place(self.bus_adc as u16, AdcMode::BUS_SHIFT)
            | place(self.shunt_adc as u16, AdcMode::SHUNT_SHIFT)
            | self.operating_mode.as_bits()
    }

    /// Time until a complete set of results is available after writing this configuration
    ///
    /// `None` if the mode does not convert at all.
    #[must_use]
    pub const fn conversion_time(self) -> Option<Duration> {
        let signals = match self.operating_mode {
            OperatingMode::PowerDown | OperatingMode::AdcOff => return None,
            OperatingMode::Triggered(signals) | OperatingMode::Continuous(signals) => signals,
        };

        let bus = self.bus_adc.conversion_time_us();
        let shunt = self.shunt_adc.conversion_time_us();
        let us = match signals {
            MeasuredSignals::ShuntVoltage => shunt,
            MeasuredSignals::BusVoltage => bus,
            MeasuredSignals::ShuntAndBusVoltage => shunt + bus,
        };

        Some(Duration::from_micros(us as u64))
    }
}

impl Register for Configuration {
    const ADDRESS: u8 = 0x00;
}

impl ReadRegister for Configuration {
    fn from_bits(bits: u16) -> Self {
        Self::from_bits(bits)
    }
}

impl WriteRegister for Configuration {
    fn as_bits(&self) -> u16 {
        Configuration::as_bits(*self)
    }
}

/// Everything a calibration is derived from: the shunt and the configuration register
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OperatingConfig {
    /// Resistance of the shunt in Ω
    pub shunt_ohms: f64,
    /// Value for the configuration register
    pub configuration: Configuration,
}

impl OperatingConfig {
    /// Operating config with the shunt and the power-on configuration
    #[must_use]
    pub fn new(shunt_ohms: f64) -> Self {
        Self {
            shunt_ohms,
            configuration: Configuration::default(),
        }
    }

    /// Build from the raw field codes of the configuration register
    ///
    /// # Example
    /// ```rust
    /// use ina219_calibrated::configuration::OperatingConfig;
    ///
    /// let config = OperatingConfig::from_codes(0.1, 1, 0x03, 0x03, 0x03, 0x07).unwrap();
    /// assert_eq!(config.configuration.as_bits(), 0x399F);
    ///
    /// assert!(OperatingConfig::from_codes(0.1, 1, 0x04, 0x03, 0x03, 0x07).is_err());
    /// ```
    ///
    /// # Errors
    /// Returns [`InvalidConfiguration`] if a code does not fit its field or does not name a
    /// setting. ADC codes are packed as given, including the ones that repeat a lower mode.
    pub fn from_codes(
        shunt_ohms: f64,
        bus_range_code: u8,
        gain_code: u8,
        bus_adc_code: u8,
        shunt_adc_code: u8,
        mode_code: u8,
    ) -> Result<Self, InvalidConfiguration> {
        Ok(Self {
            shunt_ohms,
            configuration: Configuration {
                reset: Reset::Run,
                bus_range: BusRange::try_from(bus_range_code)?,
                gain: Gain::try_from(gain_code)?,
                bus_adc: AdcMode::try_from_code(bus_adc_code, ConfigField::BusAdc)?,
                shunt_adc: AdcMode::try_from_code(shunt_adc_code, ConfigField::ShuntAdc)?,
                operating_mode: OperatingMode::try_from(mode_code)?,
            },
        })
    }
}
