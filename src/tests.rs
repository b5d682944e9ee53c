use crate::address::DeviceAddress;
use crate::calibration::CalibrationRegister;
use crate::configuration::{
    Configuration, Gain, MeasuredSignals, OperatingConfig, OperatingMode, Reset,
};
use crate::errors::{ConfigureError, InvalidConfiguration, MeasurementError};
use crate::measurements::{
    BusVoltageRegister, CurrentRegister, PowerRegister, ShuntVoltageRegister,
};
use crate::register::Register;
use crate::SyncIna219;
use embedded_hal::i2c::ErrorKind;
use embedded_hal_mock::eh1::i2c::{Mock as I2cMock, Transaction};

const DEV_ADDR: u8 = 0x40;

/// Addresses of the internal registers of the INA219
#[repr(u8)]
#[derive(Debug, Copy, Clone)]
enum RegisterName {
    Configuration = 0x00,
    ShuntVoltage = 0x01,
    BusVoltage = 0x02,
    Power = 0x03,
    Current = 0x04,
    Calibration = 0x05,
}

#[test]
fn register_names_match() {
    assert_eq!(RegisterName::Configuration as u8, Configuration::ADDRESS);
    assert_eq!(
        RegisterName::ShuntVoltage as u8,
        ShuntVoltageRegister::ADDRESS
    );
    assert_eq!(RegisterName::BusVoltage as u8, BusVoltageRegister::ADDRESS);
    assert_eq!(RegisterName::Power as u8, PowerRegister::ADDRESS);
    assert_eq!(RegisterName::Current as u8, CurrentRegister::ADDRESS);
    assert_eq!(RegisterName::Calibration as u8, CalibrationRegister::ADDRESS);
}

/// Configuration register for 32 V, ±320 mV, 12 bit and continuous conversions
const DEFAULT_CONFIG: u16 = 0x399F;

/// Create the expected `Transaction` for a register read
fn read_reg(reg: RegisterName, value: u16) -> Transaction {
    Transaction::write_read(DEV_ADDR, vec![reg as u8], value.to_be_bytes().to_vec())
}

/// Create the expected `Transaction` for a register write
fn write_reg(reg: RegisterName, value: u16) -> Transaction {
    let [hi, lo] = value.to_be_bytes();
    Transaction::write(DEV_ADDR, vec![reg as u8, hi, lo])
}

/// Transactions of configuring a 0.1 Ω shunt with the default configuration
fn configure_transactions() -> Vec<Transaction> {
    vec![
        write_reg(RegisterName::Configuration, DEFAULT_CONFIG),
        write_reg(RegisterName::Calibration, 4096),
    ]
}

/// Create an unconfigured driver that expects the given transactions
fn mock(transactions: &[Transaction]) -> SyncIna219<I2cMock> {
    SyncIna219::new(I2cMock::new(transactions), DeviceAddress::default())
}

/// Create a driver configured for a 0.1 Ω shunt that then expects the given transactions
fn mock_configured(transactions: &[Transaction]) -> SyncIna219<I2cMock> {
    let mut all_transactions = configure_transactions();
    all_transactions.extend_from_slice(transactions);

    let mut ina = mock(&all_transactions);
    ina.configure(OperatingConfig::new(0.1)).unwrap();
    ina
}

fn assert_close(is: f64, should: f64) {
    assert!((is - should).abs() < 1e-9, "{is} != {should}");
}

#[test]
fn configure_from_codes() {
    let mut ina = mock(&configure_transactions());

    let cal = ina.configure_codes(0.1, 1, 0x03, 0x03, 0x03, 0x07).unwrap();
    assert_eq!(cal.current_lsb(), 0.0001);
    assert_eq!(cal.calibration_register_value(), 0x1000);
    assert_eq!(ina.calibration(), Some(&cal));

    ina.destroy().done();
}

#[test]
fn configure_writes_config_before_calibration() {
    let mut ina = mock(&[
        write_reg(RegisterName::Configuration, 0b0000_0001_1001_1011),
        write_reg(RegisterName::Calibration, 20_480),
    ]);

    let cal = ina
        .configure_codes(0.1, 0, 0x00, 0x03, 0x03, 0x03)
        .unwrap();
    assert_close(cal.current_lsb(), 2e-5);

    ina.destroy().done();
}

#[test]
fn configure_never_resets_the_chip() {
    let mut ina = mock(&[
        write_reg(RegisterName::Configuration, 0x219F),
        write_reg(RegisterName::Calibration, 20_480),
    ]);

    let config = OperatingConfig {
        shunt_ohms: 0.1,
        configuration: Configuration {
            reset: Reset::Reset,
            gain: Gain::Div1,
            ..Configuration::default()
        },
    };
    let cal = ina.configure(config).unwrap();
    assert_eq!(ina.calibration(), Some(&cal));

    ina.destroy().done();
}

#[test]
fn configure_writes_repeated_adc_codes_as_given() {
    let mut ina = mock(&[
        write_reg(
            RegisterName::Configuration,
            (1 << 13) | (3 << 11) | (0x04 << 7) | (0x08 << 3) | 7,
        ),
        write_reg(RegisterName::Calibration, 4096),
    ]);

    ina.configure_codes(0.1, 1, 3, 0x04, 0x08, 7).unwrap();

    ina.destroy().done();
}

#[test]
fn measurements_require_configuration() {
    let mut ina = mock(&[]);

    assert_eq!(ina.read_shunt_voltage(), Err(MeasurementError::NotConfigured));
    assert_eq!(ina.read_bus_voltage(), Err(MeasurementError::NotConfigured));
    assert_eq!(ina.read_current(), Err(MeasurementError::NotConfigured));
    assert_eq!(ina.read_power(), Err(MeasurementError::NotConfigured));
    assert_eq!(ina.read_measurements(), Err(MeasurementError::NotConfigured));
    assert!(ina.calibration().is_none());

    ina.destroy().done();
}

#[test]
fn invalid_configuration_does_not_touch_the_bus() {
    let mut ina = mock(&[]);

    assert_eq!(
        ina.configure_codes(0.1, 1, 0x04, 0x03, 0x03, 0x07),
        Err(ConfigureError::InvalidConfiguration(
            InvalidConfiguration::UnknownGain(0x04)
        ))
    );
    assert_eq!(
        ina.configure(OperatingConfig::new(0.0)),
        Err(ConfigureError::InvalidConfiguration(
            InvalidConfiguration::InvalidShunt { shunt_ohms: 0.0 }
        ))
    );
    assert_eq!(
        ina.configure(OperatingConfig::new(-1.0)),
        Err(ConfigureError::InvalidConfiguration(
            InvalidConfiguration::InvalidShunt { shunt_ohms: -1.0 }
        ))
    );
    assert!(ina.calibration().is_none());

    ina.destroy().done();
}

#[test]
fn read_each_measurement() {
    let mut ina = mock_configured(&[
        read_reg(RegisterName::ShuntVoltage, 0x7FFF),
        read_reg(RegisterName::ShuntVoltage, 0x8001),
        read_reg(RegisterName::BusVoltage, 0x1007),
        read_reg(RegisterName::Current, 800),
        read_reg(RegisterName::Current, 0x8001),
        read_reg(RegisterName::Power, 640),
    ]);

    assert_close(ina.read_shunt_voltage().unwrap(), 3.2767);
    assert_close(ina.read_shunt_voltage().unwrap(), -3.2766);
    assert_close(
        ina.read_bus_voltage().unwrap(),
        f64::from(0x1007u16 >> 3) * 0.004,
    );
    assert_close(ina.read_current().unwrap(), 0.08);
    assert_close(ina.read_current().unwrap(), -3.2766);
    assert_close(ina.read_power().unwrap(), 1.28);

    ina.destroy().done();
}

#[test]
fn zero_registers_read_zero() {
    let mut ina = mock_configured(&[
        read_reg(RegisterName::ShuntVoltage, 0),
        read_reg(RegisterName::BusVoltage, 0),
        read_reg(RegisterName::Current, 0),
        read_reg(RegisterName::Power, 0),
    ]);

    assert_eq!(ina.read_shunt_voltage(), Ok(0.0));
    assert_eq!(ina.read_bus_voltage(), Ok(0.0));
    assert_eq!(ina.read_current(), Ok(0.0));
    assert_eq!(ina.read_power(), Ok(0.0));

    ina.destroy().done();
}

#[test]
fn read_errors_are_propagated() {
    let mut ina =
        mock_configured(&[read_reg(RegisterName::Current, 0).with_error(ErrorKind::Other)]);

    assert_eq!(
        ina.read_current(),
        Err(MeasurementError::BusError(ErrorKind::Other))
    );

    ina.destroy().done();
}

#[test]
fn failed_calibration_write_keeps_previous_state() {
    let mut ina = mock_configured(&[
        write_reg(RegisterName::Configuration, DEFAULT_CONFIG),
        write_reg(RegisterName::Calibration, 4096).with_error(ErrorKind::Other),
        read_reg(RegisterName::Current, 10),
    ]);
    let before = *ina.calibration().unwrap();

    // 0.5 Ω at ±320 mV also ends up at a calibration of 4096, but 20 µA per LSB
    assert_eq!(
        ina.configure(OperatingConfig::new(0.5)),
        Err(ConfigureError::BusError(ErrorKind::Other))
    );
    assert_eq!(ina.calibration(), Some(&before));
    assert_close(ina.read_current().unwrap(), 0.001);

    ina.destroy().done();
}

#[test]
fn failed_first_configuration_stays_unconfigured() {
    let mut ina = mock(&[
        write_reg(RegisterName::Configuration, DEFAULT_CONFIG).with_error(ErrorKind::Other)
    ]);

    assert_eq!(
        ina.configure(OperatingConfig::new(0.1)),
        Err(ConfigureError::BusError(ErrorKind::Other))
    );
    assert_eq!(ina.read_power(), Err(MeasurementError::NotConfigured));

    ina.destroy().done();
}

#[test]
fn reconfigure_replaces_calibration() {
    let mut ina = mock_configured(&[
        write_reg(RegisterName::Configuration, DEFAULT_CONFIG),
        write_reg(RegisterName::Calibration, 4180),
        read_reg(RegisterName::Current, 1000),
    ]);

    let cal = ina.configure(OperatingConfig::new(0.01)).unwrap();
    assert_close(cal.current_lsb(), 0.00098);
    assert_close(ina.read_current().unwrap(), 0.98);

    ina.destroy().done();
}

#[test]
fn reset_drops_calibration() {
    let mut ina = mock_configured(&[write_reg(
        RegisterName::Configuration,
        0x8000 | DEFAULT_CONFIG,
    )]);

    ina.reset().unwrap();
    assert!(ina.calibration().is_none());
    assert_eq!(ina.read_current(), Err(MeasurementError::NotConfigured));

    ina.destroy().done();
}

#[test]
fn read_back_registers() {
    let mut ina = mock_configured(&[
        read_reg(RegisterName::Configuration, DEFAULT_CONFIG),
        read_reg(RegisterName::Calibration, 4096),
    ]);

    assert_eq!(ina.configuration(), Ok(Configuration::default()));
    assert_eq!(ina.calibration_register(), Ok(CalibrationRegister(4096)));

    ina.destroy().done();
}

#[test]
fn trigger_rewrites_configuration() {
    let triggered = Configuration {
        operating_mode: OperatingMode::Triggered(MeasuredSignals::ShuntAndBusVoltage),
        ..Configuration::default()
    }
    .as_bits();

    let mut ina = mock(&[
        read_reg(RegisterName::Configuration, triggered),
        write_reg(RegisterName::Configuration, triggered),
    ]);

    ina.trigger().unwrap();

    ina.destroy().done();
}

/// Expected transactions for reading several registers at once
fn read_regs(regs: &[(RegisterName, u16)]) -> Vec<Transaction> {
    if cfg!(feature = "no_transaction") {
        return regs.iter().map(|(reg, value)| read_reg(*reg, *value)).collect();
    }

    let mut transactions = vec![Transaction::transaction_start(DEV_ADDR)];
    for (reg, value) in regs {
        transactions.push(Transaction::write(DEV_ADDR, vec![*reg as u8]));
        transactions.push(Transaction::read(DEV_ADDR, value.to_be_bytes().to_vec()));
    }
    transactions.push(Transaction::transaction_end(DEV_ADDR));
    transactions
}

#[test]
fn read_all_measurements() {
    let mut ina = mock_configured(&read_regs(&[
        (RegisterName::BusVoltage, (3000 << 3) | 0b10),
        (RegisterName::Power, 250),
        (RegisterName::ShuntVoltage, 4000),
        (RegisterName::Current, 4000),
    ]));

    let m = ina.read_measurements().unwrap();
    assert_close(m.bus_voltage, 12.0);
    assert_close(m.shunt_voltage, 0.4);
    assert_close(m.current, 0.4);
    assert_close(m.power, 0.5);
    assert!(m.conversion_ready);
    assert!(!m.math_overflow);

    ina.destroy().done();
}
