//! Tests requiring an actual serial line.
//!
//! These tests are skipped if no hardware is configured.
//!
//! # Running Hardware Tests
//!
//! ```bash
//! export TEST_PORT_NUMBER=0              # line number substituted into the naming
//! export TEST_PORT_NAMING=/dev/ttyUSB{n} # optional, default: platform naming
//! export TEST_BAUD=9600                  # optional, default: 9600
//! export TEST_LOOPBACK=1                 # if the line has TX-RX loopback
//!
//! cargo test --features hardware-tests -- --ignored
//! ```

use super::utils::{print_available_ports, read_byte_within, skip_without_hardware};
use serial_line::line::read_line;
use serial_line::port::{ErrorKind, SerialPort};
use std::time::Duration;

#[test]
#[ignore] // Run with --ignored flag
fn test_real_port_open_close() {
    let Some(config) = skip_without_hardware() else {
        return;
    };
    print_available_ports();

    let mut port = config.port();
    port.open(config.number, config.baud, 0).unwrap();
    assert!(port.is_connected());
    assert_eq!(port.number(), Some(config.number));
    assert!(port.good());

    assert!(port.close().is_ok());
    assert!(!port.is_connected());
    assert!(port.close().is_ok());
}

#[test]
#[ignore]
fn test_real_port_reopen_short_circuits() {
    let Some(config) = skip_without_hardware() else {
        return;
    };
    let mut port = config.open(4);

    port.open(config.number, config.baud, 16).unwrap();
    assert_eq!(port.read_chunk(), 4);
}

#[test]
#[ignore]
fn test_real_port_read_on_idle_line_does_not_block() {
    let Some(config) = skip_without_hardware() else {
        return;
    };
    if config.loopback_enabled {
        println!("Skipping: loopback lines echo stray output");
        return;
    }
    let mut port = config.open(0);
    port.flush_input(true).unwrap();

    let err = port.read_byte().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Read);
}

#[test]
#[ignore]
fn test_real_port_purge_and_status() {
    let Some(config) = skip_without_hardware() else {
        return;
    };
    let mut port = config.open(0);

    assert!(port.flush_input(false).is_ok());
    assert!(port.flush_output(true).is_ok());
    assert_eq!(port.check_status().kind(), ErrorKind::None);
}

#[test]
#[ignore]
fn test_real_port_loopback_line() {
    let Some(config) = skip_without_hardware() else {
        return;
    };
    if !config.loopback_enabled {
        println!("Skipping loopback test: TEST_LOOPBACK not set");
        return;
    }
    let mut port = config.open(0);
    port.flush_input(true).unwrap();

    assert_eq!(port.write_str("PING\n").unwrap(), 5);
    let first = read_byte_within(&mut port, Duration::from_secs(1));
    assert_eq!(first, Some(b'P'));

    std::thread::sleep(Duration::from_millis(50));
    assert_eq!(read_line(&mut port, b'\n'), "ING");
}
