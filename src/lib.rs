//! Driver for the INA219 current/power monitor with calibration from the shunt resistance
//!
//! The driver derives the calibration register value and the current per LSB from the shunt and
//! the gain in one step ([`calibration::CalibrationState`]) and returns every measurement in V, A
//! or W.
//!
//! # Example
//! ```rust,no_run
//! # #[cfg(feature = "sync")]
//! # fn run<I: embedded_hal::i2c::I2c>(i2c: I) -> Result<(), ()> {
//! use ina219_calibrated::address::DeviceAddress;
//! use ina219_calibrated::configuration::OperatingConfig;
//! use ina219_calibrated::SyncIna219;
//!
//! let mut ina = SyncIna219::new(i2c, DeviceAddress::default());
//! ina.configure(OperatingConfig::new(0.1)).map_err(|_| ())?;
//!
//! let current = ina.read_current().map_err(|_| ())?;
//! # Ok(())
//! # }
//! ```
//!
//! A driver is exclusive to one chip and every access takes `&mut self`. To share it between
//! threads or tasks put the whole driver behind one mutex.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]

pub mod address;
pub mod calibration;
pub mod configuration;
pub mod errors;
pub mod measurements;
mod register;

/// Async driver
#[cfg(feature = "async")]
#[allow(async_fn_in_trait)]
pub mod r#async;

/// Blocking driver, generated from the async one by `build.rs`
#[cfg(feature = "sync")]
#[allow(missing_docs)]
pub mod sync {
    include!(concat!(env!("OUT_DIR"), "/de-asynced.rs"));
}

#[cfg(feature = "async")]
pub use r#async::INA219 as AsyncIna219;

#[cfg(feature = "sync")]
pub use sync::INA219 as SyncIna219;

#[cfg(test)]
mod tests;
