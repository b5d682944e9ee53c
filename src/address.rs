//! Bus address of the INA219
//!
//! The chip answers on one of sixteen 7-bit addresses in `0x40..=0x4F`, selected by wiring the
//! pins A0 and A1 (table 1 of the datasheet). A [`DeviceAddress`] is bound to one driver and never
//! changes afterwards.

use core::fmt::Formatter;
use core::ops::RangeInclusive;

/// Signal an address pin is tied to
///
/// # Example
/// ```rust
/// use ina219_calibrated::address::AddressPin;
///
/// assert_eq!(AddressPin::Sda.bits(), 0b10);
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum AddressPin {
    /// Tied to ground
    Gnd = 0b00,
    /// Tied to the supply
    Vs = 0b01,
    /// Tied to the data line
    Sda = 0b10,
    /// Tied to the clock line
    Scl = 0b11,
}

impl AddressPin {
    /// Two address bits selected by this pin
    #[must_use]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    const fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::Gnd,
            0b01 => Self::Vs,
            0b10 => Self::Sda,
            _ => Self::Scl,
        }
    }
}

/// 7-bit address the INA219 responds to
///
/// # Example
/// ```rust
/// use ina219_calibrated::address::{AddressPin, DeviceAddress};
///
/// let by_pins = DeviceAddress::from_pins(AddressPin::Vs, AddressPin::Gnd);
/// let by_byte = DeviceAddress::from_byte(0x41).unwrap();
/// assert_eq!(by_pins, by_byte);
///
/// assert!(DeviceAddress::from_byte(0x20).is_err());
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceAddress(u8);

impl DeviceAddress {
    const BASE: u8 = 0x40;
    const VALID: RangeInclusive<u8> = Self::BASE..=0x4F;

    /// Address selected by the wiring of A0 and A1
    #[must_use]
    pub const fn from_pins(a0: AddressPin, a1: AddressPin) -> Self {
        Self(Self::BASE | (a1.bits() << 2) | a0.bits())
    }

    /// Address from its 7-bit value
    ///
    /// # Errors
    /// Returns [`AddressOutOfRange`] if the chip can not be strapped to this address.
    pub const fn from_byte(byte: u8) -> Result<Self, AddressOutOfRange> {
        if byte >= *Self::VALID.start() && byte <= *Self::VALID.end() {
            Ok(Self(byte))
        } else {
            Err(AddressOutOfRange(byte))
        }
    }

    /// The 7-bit address as put on the bus
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self.0
    }

    /// Wiring of `(A0, A1)` that selects this address
    #[must_use]
    pub const fn pins(self) -> (AddressPin, AddressPin) {
        (
            AddressPin::from_bits(self.0),
            AddressPin::from_bits(self.0 >> 2),
        )
    }
}

impl Default for DeviceAddress {
    /// Both address pins tied to ground
    fn default() -> Self {
        Self::from_pins(AddressPin::Gnd, AddressPin::Gnd)
    }
}

impl TryFrom<u8> for DeviceAddress {
    type Error = AddressOutOfRange;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_byte(value)
    }
}

/// The byte is not an address an INA219 can be strapped to
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AddressOutOfRange(pub u8);

impl core::fmt::Display for AddressOutOfRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "address {:#04x} is outside of {:#04x}..={:#04x}",
            self.0,
            DeviceAddress::VALID.start(),
            DeviceAddress::VALID.end(),
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AddressOutOfRange {}
