//! Errors that can be returned by the different functions

use core::fmt::{Debug, Display, Formatter};

/// Field of the configuration register, used in errors
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigField {
    /// Bus ADC resolution / averaging (BADC)
    BusAdc,
    /// Shunt ADC resolution / averaging (SADC)
    ShuntAdc,
    /// Operating mode (MODE)
    Mode,
}

/// The requested configuration can not be applied
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InvalidConfiguration {
    /// The shunt resistance is zero, negative or not finite
    InvalidShunt {
        /// Resistance that was given in Ω
        shunt_ohms: f64,
    },
    /// The gain code is not one of `0..=3`
    UnknownGain(u8),
    /// The bus range code is not `0` or `1`
    UnknownBusRange(u8),
    /// A code does not fit into its field of the configuration register
    CodeOutOfRange {
        /// Field the code was meant for
        field: ConfigField,
        /// The offending code
        code: u8,
    },
    /// The calibration register value does not fit into 16 bits
    CalibrationOutOfRange {
        /// Current per LSB in A that was used
        current_lsb: f64,
        /// Resistance of the shunt in Ω
        shunt_ohms: f64,
    },
}

impl Display for InvalidConfiguration {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidShunt { shunt_ohms } => {
                write!(f, "Shunt resistance must be positive, got {shunt_ohms} Ω")
            }
            Self::UnknownGain(code) => write!(f, "Unknown gain code {code:#04x}"),
            Self::UnknownBusRange(code) => write!(f, "Unknown bus range code {code:#04x}"),
            Self::CodeOutOfRange { field, code } => {
                write!(f, "Code {code:#04x} does not fit into field {field:?}")
            }
            Self::CalibrationOutOfRange {
                current_lsb,
                shunt_ohms,
            } => write!(
                f,
                "Calibration for {current_lsb} A/LSB and {shunt_ohms} Ω does not fit into 16 bits"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidConfiguration {}

/// Errors that can happen while configuring the INA219
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum ConfigureError<BusErr> {
    /// A register write failed
    BusError(BusErr),
    /// The configuration was rejected before anything was written
    InvalidConfiguration(InvalidConfiguration),
}

impl<E> From<E> for ConfigureError<E> {
    fn from(value: E) -> Self {
        Self::BusError(value)
    }
}

impl<BusErr: Debug> Display for ConfigureError<BusErr> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BusError(err) => write!(f, "Bus error: {err:?}"),
            Self::InvalidConfiguration(err) => write!(f, "Invalid configuration: {err}"),
        }
    }
}

#[cfg(feature = "std")]
impl<BusErr> std::error::Error for ConfigureError<BusErr>
where
    BusErr: Debug + std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::BusError(err) => Some(err),
            Self::InvalidConfiguration(err) => Some(err),
        }
    }
}

/// Errors that can happen when a measurement is read
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum MeasurementError<BusErr> {
    /// The register read failed
    BusError(BusErr),
    /// No calibration is active, call `configure` first
    NotConfigured,
}

impl<E> From<E> for MeasurementError<E> {
    fn from(value: E) -> Self {
        Self::BusError(value)
    }
}

impl<BusErr: Debug> Display for MeasurementError<BusErr> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::BusError(err) => write!(f, "Bus error: {err:?}"),
            Self::NotConfigured => write!(f, "The INA219 was not configured"),
        }
    }
}

#[cfg(feature = "std")]
impl<BusErr> std::error::Error for MeasurementError<BusErr>
where
    BusErr: Debug + std::error::Error + 'static,
{
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::BusError(err) => Some(err),
            Self::NotConfigured => None,
        }
    }
}
