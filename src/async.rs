use crate::address::DeviceAddress;
use crate::calibration::{CalibrationRegister, CalibrationState};
use crate::configuration::{Configuration, OperatingConfig, Reset};
use crate::errors::{ConfigureError, MeasurementError};
use crate::measurements::{
    BusVoltageRegister, CurrentRegister, Measurements, PowerRegister, ShuntVoltageRegister,
};
use crate::register::{ReadRegister, WriteRegister};
use embedded_hal_async::i2c::{I2c, Operation};

/// Register level access to the chip
///
/// Every call is one complete bus transaction. Implemented for every I2C bus, implement it directly
/// to put something else between the driver and the wire.
pub trait RegisterBus {
    /// Error of the transport
    type Error;

    /// Read the two bytes of `register`
    async fn read_register(
        &mut self,
        address: DeviceAddress,
        register: u8,
        buf: &mut [u8; 2],
    ) -> Result<(), Self::Error>;

    /// Write the two bytes of `register`
    async fn write_register(
        &mut self,
        address: DeviceAddress,
        register: u8,
        value: [u8; 2],
    ) -> Result<(), Self::Error>;
}

impl<I: I2c> RegisterBus for I {
    type Error = I::Error;

    async fn read_register(
        &mut self,
        address: DeviceAddress,
        register: u8,
        buf: &mut [u8; 2],
    ) -> Result<(), Self::Error> {
        self.write_read(address.as_byte(), &[register], buf).await
    }

    async fn write_register(
        &mut self,
        address: DeviceAddress,
        register: u8,
        value: [u8; 2],
    ) -> Result<(), Self::Error> {
        let [hi, lo] = value;
        self.write(address.as_byte(), &[register, hi, lo]).await
    }
}

macro_rules! read_many {
    ($name:ident, $(($reg:ident, $buf:ident)),+) => {
        async fn $name<$($reg),+>(&mut self) -> Result<($($reg,)+), I2C::Error>
        where
            $($reg: ReadRegister),+
        {
            $(let mut $buf: [u8; 2] = [0x00; 2];)+
            if cfg!(feature = "no_transaction") {
                let addr = self.address.as_byte();
                $(self.i2c.write_read(addr, &[$reg::ADDRESS], &mut $buf).await?;)+
            } else {
                let mut transactions = [
                    $(Operation::Write(&[$reg::ADDRESS]), Operation::Read(&mut $buf),)+
                ];
                self.i2c
                    .transaction(self.address.as_byte(), &mut transactions[..])
                    .await?;
            }

            Ok(($($reg::from_bits(u16::from_be_bytes($buf)),)+))
        }
    };
}

/// Embedded HAL compatible driver for the INA219
///
/// The driver starts out unconfigured: measurements fail with
/// [`MeasurementError::NotConfigured`] until [`Self::configure`] succeeded once. The active
/// [`CalibrationState`] belongs to this instance and the chip at its address only.
pub struct INA219<I2C> {
    i2c: I2C,
    address: DeviceAddress,
    calibration: Option<CalibrationState>,
}

impl<I2C> INA219<I2C>
where
    I2C: RegisterBus,
{
    /// Bind the driver to a bus and an address
    ///
    /// Nothing is sent on the bus, call [`Self::configure`] before reading measurements.
    pub const fn new(i2c: I2C, address: DeviceAddress) -> Self {
        INA219 {
            i2c,
            address,
            calibration: None,
        }
    }

    /// Destroy the driver returning the underlying bus
    ///
    /// This does leave the device in it's current state.
    pub fn destroy(self) -> I2C {
        self.i2c
    }

    /// Address of the chip this driver talks to
    pub const fn address(&self) -> DeviceAddress {
        self.address
    }

    /// The active calibration, `None` until configured
    pub const fn calibration(&self) -> Option<&CalibrationState> {
        self.calibration.as_ref()
    }

    /// Configure and calibrate the chip
    ///
    /// Derives the [`CalibrationState`] from the shunt and gain, then writes the configuration
    /// register followed by the calibration register. A reset bit in the configuration is cleared
    /// before writing. The new calibration only becomes active when both writes succeeded,
    /// otherwise the previous one stays in place.
    ///
    /// # Errors
    /// Returns [`ConfigureError::InvalidConfiguration`] without touching the bus if the shunt is
    /// not positive or the calibration does not fit 16 bits. Bus failures are returned as
    /// [`ConfigureError::BusError`].
    pub async fn configure(
        &mut self,
        config: OperatingConfig,
    ) -> Result<CalibrationState, ConfigureError<I2C::Error>> {
        let calibration = CalibrationState::new(config.shunt_ohms, config.configuration.gain)
            .map_err(ConfigureError::<I2C::Error>::InvalidConfiguration)?;
        let configuration = Configuration {
            reset: Reset::Run,
            ..config.configuration
        };

        self.write(configuration).await?;
        self.write(calibration.register()).await?;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "INA219 {=u8:#x}: config {=u16:#x}, calibration {=u16}, {} A/LSB",
            self.address.as_byte(),
            configuration.as_bits(),
            calibration.calibration_register_value(),
            calibration.current_lsb(),
        );

        self.calibration = Some(calibration);
        Ok(calibration)
    }

    /// Configure from the raw field codes of the configuration register
    ///
    /// See [`OperatingConfig::from_codes`] for the accepted codes.
    ///
    /// # Errors
    /// Same as [`Self::configure`], unknown codes are an [`ConfigureError::InvalidConfiguration`].
    pub async fn configure_codes(
        &mut self,
        shunt_ohms: f64,
        bus_range_code: u8,
        gain_code: u8,
        bus_adc_code: u8,
        shunt_adc_code: u8,
        mode_code: u8,
    ) -> Result<CalibrationState, ConfigureError<I2C::Error>> {
        let config = OperatingConfig::from_codes(
            shunt_ohms,
            bus_range_code,
            gain_code,
            bus_adc_code,
            shunt_adc_code,
            mode_code,
        )
        .map_err(ConfigureError::<I2C::Error>::InvalidConfiguration)?;

        self.configure(config).await
    }

    /// Restore the power-on defaults of every register
    ///
    /// The chip clears its calibration register, so the driver drops its calibration as well and
    /// has to be configured again.
    ///
    /// # Errors
    /// Returns an error if the underlying bus returned an error.
    pub async fn reset(&mut self) -> Result<(), I2C::Error> {
        self.calibration = None;

        #[cfg(feature = "defmt")]
        defmt::debug!("INA219 {=u8:#x}: reset", self.address.as_byte());

        self.write(Configuration {
            reset: Reset::Reset,
            ..Default::default()
        })
        .await
    }

    /// Read back the configuration register
    ///
    /// # Errors
    /// Returns an error if the underlying bus returned an error.
    pub async fn configuration(&mut self) -> Result<Configuration, I2C::Error> {
        self.read().await
    }

    /// Read back the calibration register
    ///
    /// # Errors
    /// Returns an error if the underlying bus returned an error.
    pub async fn calibration_register(&mut self) -> Result<CalibrationRegister, I2C::Error> {
        self.read().await
    }

    /// Start a conversion in triggered mode
    ///
    /// Reads the configuration and writes it back unchanged. In any other mode this has no effect
    /// besides clearing the conversion ready flag.
    ///
    /// # Errors
    /// Returns an error if the underlying bus returned an error.
    pub async fn trigger(&mut self) -> Result<(), I2C::Error> {
        let config = self.configuration().await?;
        self.write(config).await
    }

    /// Read the shunt voltage in V
    ///
    /// # Errors
    /// [`MeasurementError::NotConfigured`] before the first successful [`Self::configure`],
    /// [`MeasurementError::BusError`] if the read failed.
    pub async fn read_shunt_voltage(&mut self) -> Result<f64, MeasurementError<I2C::Error>> {
        self.active_calibration()?;
        let reg: ShuntVoltageRegister = self.read().await?;
        Ok(reg.volts())
    }

    /// Read the bus voltage in V
    ///
    /// # Errors
    /// [`MeasurementError::NotConfigured`] before the first successful [`Self::configure`],
    /// [`MeasurementError::BusError`] if the read failed.
    pub async fn read_bus_voltage(&mut self) -> Result<f64, MeasurementError<I2C::Error>> {
        self.active_calibration()?;
        let reg: BusVoltageRegister = self.read().await?;
        Ok(reg.volts())
    }

    /// Read the current in A
    ///
    /// # Errors
    /// [`MeasurementError::NotConfigured`] before the first successful [`Self::configure`],
    /// [`MeasurementError::BusError`] if the read failed.
    pub async fn read_current(&mut self) -> Result<f64, MeasurementError<I2C::Error>> {
        let calibration = self.active_calibration()?;
        let reg: CurrentRegister = self.read().await?;
        Ok(calibration.current_from_register(reg))
    }

    /// Read the power in W
    ///
    /// # Errors
    /// [`MeasurementError::NotConfigured`] before the first successful [`Self::configure`],
    /// [`MeasurementError::BusError`] if the read failed.
    pub async fn read_power(&mut self) -> Result<f64, MeasurementError<I2C::Error>> {
        let calibration = self.active_calibration()?;
        let reg: PowerRegister = self.read().await?;
        Ok(calibration.power_from_register(reg))
    }

    fn active_calibration(&self) -> Result<CalibrationState, MeasurementError<I2C::Error>> {
        self.calibration.ok_or(MeasurementError::NotConfigured)
    }

    async fn read<Reg: ReadRegister>(&mut self) -> Result<Reg, I2C::Error> {
        let mut buf: [u8; 2] = [0x00; 2];
        self.i2c
            .read_register(self.address, Reg::ADDRESS, &mut buf)
            .await?;
        Ok(Reg::from_bits(u16::from_be_bytes(buf)))
    }

    /// Write the value contained in the register to the address dictated by its type
    async fn write<Reg: WriteRegister>(&mut self, reg: Reg) -> Result<(), I2C::Error> {
        self.i2c
            .write_register(self.address, Reg::ADDRESS, reg.as_bits().to_be_bytes())
            .await
    }
}

impl<I2C> INA219<I2C>
where
    I2C: I2c,
{
    /// Read all measurements at once
    ///
    /// The bus voltage register is read first so the conversion ready flag is captured before
    /// reading the power register clears it. All four registers are read in one bus transaction,
    /// or in four with the `no_transaction` feature.
    ///
    /// # Errors
    /// [`MeasurementError::NotConfigured`] before the first successful [`Self::configure`],
    /// [`MeasurementError::BusError`] if a read failed.
    pub async fn read_measurements(
        &mut self,
    ) -> Result<Measurements, MeasurementError<I2C::Error>> {
        let Some(calibration) = self.calibration else {
            return Err(MeasurementError::NotConfigured);
        };

        let (bus_voltage, power, shunt_voltage, current) = self
            .read4::<BusVoltageRegister, PowerRegister, ShuntVoltageRegister, CurrentRegister>()
            .await?;

        Ok(Measurements {
            bus_voltage: bus_voltage.volts(),
            shunt_voltage: shunt_voltage.volts(),
            current: calibration.current_from_register(current),
            power: calibration.power_from_register(power),
            conversion_ready: bus_voltage.is_conversion_ready(),
            math_overflow: bus_voltage.has_math_overflowed(),
        })
    }

    read_many!(read4, (R0, b0), (R1, b1), (R2, b2), (R3, b3));
}
