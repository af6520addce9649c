//! Shared test utilities for serial line tests.
//!
//! - Connected mock ports with a scripting handle
//! - Byte-stream builders for delimiter framing

#![allow(dead_code)]

use serial_line::port::{BaudRate, MockLink, MockPort, SerialPort};

/// Line numbers the default mock device exposes.
pub const MOCK_PORTS: [u16; 3] = [1, 2, 3];

/// A disconnected port over a device with [`MOCK_PORTS`], plus the handle
/// used to script that device.
pub fn mock_port() -> (MockPort, MockLink) {
    let link = MockLink::with_ports(MOCK_PORTS);
    (MockPort::new(link.clone()), link)
}

/// A port already open on line 1 with the given read chunk.
pub fn connected_port(read_chunk: usize) -> (MockPort, MockLink) {
    let (mut port, link) = mock_port();
    port.open(1, BaudRate::B9600, read_chunk)
        .expect("mock line 1 should open");
    (port, link)
}

/// A connected port with `data` already waiting in the input queue.
pub fn port_with_input(data: &[u8], read_chunk: usize) -> (MockPort, MockLink) {
    let (port, link) = connected_port(read_chunk);
    link.enqueue_read(data);
    (port, link)
}

/// Join `lines` into one stream, each followed by `delim`.
pub fn delimited(lines: &[&[u8]], delim: u8) -> Vec<u8> {
    let mut stream = Vec::new();
    for line in lines {
        stream.extend_from_slice(line);
        stream.push(delim);
    }
    stream
}
