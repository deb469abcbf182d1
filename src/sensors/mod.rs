//! Sensor subsystem — the DS18B20 probe driver.

pub mod ds18b20;
