use ina219_calibrated::address::DeviceAddress;
use ina219_calibrated::configuration::OperatingConfig;
use ina219_calibrated::SyncIna219;
use linux_embedded_hal::I2cdev;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let device = I2cdev::new("/dev/i2c-1")?;
    let mut ina = SyncIna219::new(device, DeviceAddress::from_byte(0x42)?);

    // 0.1 Ω shunt, everything else at the power-on defaults
    let config = OperatingConfig::new(0.1);
    ina.configure(config)?;

    // Wait until a result is ready
    if let Some(conversion_time) = config.configuration.conversion_time() {
        std::thread::sleep(conversion_time);
    }

    println!("Bus Voltage:   {:.3} V", ina.read_bus_voltage()?);
    println!("Shunt Voltage: {:.5} V", ina.read_shunt_voltage()?);
    println!("Current:       {:.4} A", ina.read_current()?);
    println!("Power:         {:.4} W", ina.read_power()?);

    Ok(())
}
