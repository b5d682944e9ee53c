use ina219_calibrated::address::DeviceAddress;
use ina219_calibrated::SyncIna219;
use linux_embedded_hal::I2cdev;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let device = I2cdev::new("/dev/i2c-1")?;
    let mut ina = SyncIna219::new(device, DeviceAddress::from_byte(0x42)?);

    // 0.1 Ω, 32 V, ±320 mV, 12 bit ADCs, triggered conversion of shunt and bus voltage
    ina.configure_codes(0.1, 1, 0x03, 0x03, 0x03, 0x03)?;

    let conversion_time = ina
        .configuration()?
        .conversion_time()
        .ok_or("the configured mode does not convert")?;

    // Writing the configuration started the first conversion
    std::thread::sleep(conversion_time);
    let m = ina.read_measurements()?;
    println!("After configuration: {m:?}");
    assert!(m.conversion_ready);

    // Reading the power register cleared the flag and nothing new was converted
    std::thread::sleep(conversion_time);
    let m = ina.read_measurements()?;
    println!("Without trigger: {m:?}");
    assert!(!m.conversion_ready);

    // But a trigger starts a new conversion
    ina.trigger()?;
    std::thread::sleep(conversion_time);
    let m = ina.read_measurements()?;
    println!("After trigger: {m:?}");
    assert!(m.conversion_ready);

    Ok(())
}
