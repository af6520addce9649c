//! Utility functions for hardware testing.
//!
//! Reads the line under test from the environment and opens it.

use serial_line::port::{available_ports, BaudRate, PortNaming, SerialPort, SystemLink, SystemPort};
use std::env;
use std::time::{Duration, Instant};

/// Test line configuration from environment.
pub struct TestLineConfig {
    pub number: u16,
    pub naming: PortNaming,
    pub baud: BaudRate,
    pub loopback_enabled: bool,
}

impl TestLineConfig {
    /// Get test configuration from environment variables.
    ///
    /// `TEST_PORT_NUMBER` is required; `TEST_PORT_NAMING`, `TEST_BAUD` and
    /// `TEST_LOOPBACK` are optional.
    pub fn from_env() -> Option<Self> {
        let number = env::var("TEST_PORT_NUMBER").ok()?.parse().ok()?;
        let naming = env::var("TEST_PORT_NAMING")
            .map(PortNaming::new)
            .unwrap_or_default();
        let baud = env::var("TEST_BAUD")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        let loopback_enabled = env::var("TEST_LOOPBACK").ok().as_deref() == Some("1");

        Some(Self {
            number,
            naming,
            baud,
            loopback_enabled,
        })
    }

    /// A disconnected port using this configuration's naming.
    pub fn port(&self) -> SystemPort {
        SystemPort::new(SystemLink::new(self.naming.clone()))
    }

    /// A port opened on the configured line.
    pub fn open(&self, read_chunk: usize) -> SystemPort {
        let mut port = self.port();
        port.open(self.number, self.baud, read_chunk)
            .expect("test line should open");
        port
    }
}

/// Skip test if hardware is not available.
pub fn skip_without_hardware() -> Option<TestLineConfig> {
    let config = TestLineConfig::from_env();
    if config.is_none() {
        println!("Skipping hardware test: TEST_PORT_NUMBER not set");
    }
    config
}

/// Print the devices the system reports, for debugging.
pub fn print_available_ports() {
    match available_ports() {
        Ok(ports) if ports.is_empty() => println!("No serial ports detected on this system"),
        Ok(ports) => {
            println!("Available serial ports ({}):", ports.len());
            for (idx, name) in ports.iter().enumerate() {
                println!("  {}. {}", idx + 1, name);
            }
        }
        Err(e) => println!("Port enumeration failed: {e}"),
    }
}

/// Poll `read_byte` until a byte arrives or `timeout` expires.
pub fn read_byte_within(port: &mut SystemPort, timeout: Duration) -> Option<u8> {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if let Ok(byte) = port.read_byte() {
            return Some(byte);
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    None
}
