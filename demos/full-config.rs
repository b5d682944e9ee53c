use ina219_calibrated::address::{AddressPin, DeviceAddress};
use ina219_calibrated::configuration::{
    AdcMode, BusRange, Configuration, Gain, MeasuredSignals, OperatingConfig, OperatingMode, Reset,
};
use ina219_calibrated::SyncIna219;
use linux_embedded_hal::I2cdev;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let device = I2cdev::new("/dev/i2c-1")?;
    let mut ina = SyncIna219::new(device, DeviceAddress::from_pins(AddressPin::Sda, AddressPin::Gnd));

    let config = OperatingConfig {
        // 10 mΩ shunt, good for up to 4 A at ±40 mV
        shunt_ohms: 0.01,
        configuration: Configuration {
            // Be extra precise, but take some extra time
            bus_adc: AdcMode::Avg128,
            shunt_adc: AdcMode::Avg128,

            // Low voltage bus and a small shunt voltage
            bus_range: BusRange::V16,
            gain: Gain::Div1,

            // Measure both signals continuously (default)
            operating_mode: OperatingMode::Continuous(MeasuredSignals::ShuntAndBusVoltage),

            // Do not perform a reset
            reset: Reset::Run,
        },
    };

    let calibration = ina.configure(config)?;
    println!(
        "Calibration: {} ({} A/LSB)",
        calibration.calibration_register_value(),
        calibration.current_lsb()
    );

    // The chip should report exactly what was written
    assert_eq!(ina.configuration()?, config.configuration);
    assert_eq!(
        ina.calibration_register()?.0,
        calibration.calibration_register_value()
    );

    if let Some(conversion_time) = config.configuration.conversion_time() {
        std::thread::sleep(conversion_time);
    }

    let m = ina.read_measurements()?;
    println!("Bus:     {:.3} V", m.bus_voltage);
    println!("Shunt:   {:.5} V", m.shunt_voltage);
    println!("Current: {:.4} A", m.current);
    println!("Power:   {:.4} W", m.power);
    if m.math_overflow {
        println!("Current or power overflowed, the shunt or gain does not fit the load");
    }

    Ok(())
}
