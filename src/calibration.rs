//! Calibration of the INA219
//!
//! The chip computes current and power itself once its calibration register is set. The value of
//! that register and the current per LSB used to scale the readings are derived together from the
//! shunt resistance and the gain, and only make sense as a pair: [`CalibrationState`].

use crate::configuration::Gain;
use crate::errors::InvalidConfiguration;
use crate::measurements::{decode_power, decode_signed_16, CurrentRegister, PowerRegister};
use crate::register::{ReadRegister, Register, WriteRegister};

/// Fixed scaling of the calibration equation, equation 1 of the datasheet
const CALIBRATION_SCALE: f64 = 0.04096;

/// Counts of the positive range of the current register
const CURRENT_COUNTS: f64 = 32_768.0;

/// `current_lsb` is rounded up to this many decimal places
const LSB_DECIMALS: f64 = 1e5;

/// Power LSB relative to the current LSB
const POWER_LSB_FACTOR: f64 = 20.0;

/// Content of the calibration register
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationRegister(pub u16);

impl Register for CalibrationRegister {
    const ADDRESS: u8 = 0x05;
}

impl ReadRegister for CalibrationRegister {
    fn from_bits(bits: u16) -> Self {
        Self(bits)
    }
}

impl WriteRegister for CalibrationRegister {
    fn as_bits(&self) -> u16 {
        self.0
    }
}

/// Current scaling and calibration register value of one configured INA219
///
/// # Example
/// A 0.1 Ω shunt at the widest gain gives 0.1 mA per LSB:
/// ```rust
/// use ina219_calibrated::calibration::CalibrationState;
/// use ina219_calibrated::configuration::Gain;
///
/// let cal = CalibrationState::new(0.1, Gain::Div8).unwrap();
/// assert_eq!(cal.current_lsb(), 0.0001);
/// assert_eq!(cal.calibration_register_value(), 4096);
/// ```
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationState {
    current_lsb: f64,
    calibration_register_value: u16,
}

impl CalibrationState {
    /// Derive the calibration for a shunt in Ω at the given gain
    ///
    /// The current per LSB is the largest measurable current spread over the 15 bit range,
    /// rounded **up** to 5 decimal places so the calibration register never saturates at full
    /// scale.
    ///
    /// # Errors
    /// [`InvalidConfiguration::InvalidShunt`] if `shunt_ohms` is not positive and finite,
    /// [`InvalidConfiguration::CalibrationOutOfRange`] if the register value does not fit 16 bits.
    pub fn new(shunt_ohms: f64, gain: Gain) -> Result<Self, InvalidConfiguration> {
        check_shunt(shunt_ohms)?;

        let max_expected_current = gain.full_scale_volts() / shunt_ohms;
        let current_lsb =
            libm::ceil((max_expected_current / CURRENT_COUNTS) * LSB_DECIMALS) / LSB_DECIMALS;

        Self::from_current_lsb(current_lsb, shunt_ohms)
    }

    /// Calibration for a chosen current per LSB in A
    ///
    /// # Errors
    /// [`InvalidConfiguration::InvalidShunt`] if `shunt_ohms` is not positive and finite,
    /// [`InvalidConfiguration::CalibrationOutOfRange`] if `current_lsb` is not positive and finite
    /// or the register value does not fit 16 bits.
    pub fn from_current_lsb(
        current_lsb: f64,
        shunt_ohms: f64,
    ) -> Result<Self, InvalidConfiguration> {
        check_shunt(shunt_ohms)?;

        let out_of_range = InvalidConfiguration::CalibrationOutOfRange {
            current_lsb,
            shunt_ohms,
        };

        if !(current_lsb.is_finite() && current_lsb > 0.0) {
            return Err(out_of_range);
        }

        let cal = libm::ceil(CALIBRATION_SCALE / (current_lsb * shunt_ohms));
        if !(cal.is_finite() && (0.0..=f64::from(u16::MAX)).contains(&cal)) {
            return Err(out_of_range);
        }

        // In range and integral after the check above
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let calibration_register_value = cal as u16;

        Ok(Self {
            current_lsb,
            calibration_register_value,
        })
    }

    /// Current per count of the current register in A
    #[must_use]
    pub const fn current_lsb(&self) -> f64 {
        self.current_lsb
    }

    /// Power per count of the power register in W
    #[must_use]
    pub fn power_lsb(&self) -> f64 {
        POWER_LSB_FACTOR * self.current_lsb
    }

    /// Value written to the calibration register
    #[must_use]
    pub const fn calibration_register_value(&self) -> u16 {
        self.calibration_register_value
    }

    /// The calibration register as written to the chip
    #[must_use]
    pub const fn register(&self) -> CalibrationRegister {
        CalibrationRegister(self.calibration_register_value)
    }

    /// Current in A for the content of the current register
    #[must_use]
    pub fn current_from_register(&self, reg: CurrentRegister) -> f64 {
        decode_signed_16(reg.0.to_be_bytes(), self.current_lsb)
    }

    /// Power in W for the content of the power register
    #[must_use]
    pub fn power_from_register(&self, reg: PowerRegister) -> f64 {
        decode_power(reg.0.to_be_bytes(), self.current_lsb)
    }
}

fn check_shunt(shunt_ohms: f64) -> Result<(), InvalidConfiguration> {
    if shunt_ohms.is_finite() && shunt_ohms > 0.0 {
        Ok(())
    } else {
        Err(InvalidConfiguration::InvalidShunt { shunt_ohms })
    }
}
