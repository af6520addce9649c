//! Polling client used by the `serial-line` binary.
//!
//! The client only touches the port through its public surface: open and
//! close, single-byte or line reads, purges, and the sticky error. Reads
//! never wait, so each frame takes whatever is queued and tolerates an empty
//! line by retrying on the next frame. A line that goes away is released so
//! the caller can scan for it again.

use crate::line::read_line;
use crate::port::{BaudRate, ErrorKind, SerialPort};
use tracing::{debug, info, warn};

/// What each frame reads from the line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum Mode {
    /// One byte per frame, read as a compass heading.
    #[default]
    Compass,
    /// One delimited line per frame.
    Lines,
}

/// A value taken from the line during a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Reading {
    Angle(f32),
    Line(String),
}

/// Outcome of one poll.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Error text, or "Connected" / "Disconnected".
    pub status: String,
    pub reading: Option<Reading>,
}

/// Convert a heading byte (256 steps per turn) to degrees.
pub fn compass_angle(raw: u8) -> f32 {
    f32::from(raw) * 360.0 / 256.0
}

/// Close the port, then try each line number in turn until one opens.
///
/// Returns the number that opened.
pub fn connect<P, I>(port: &mut P, numbers: I, baud: BaudRate, read_chunk: usize) -> Option<u16>
where
    P: SerialPort + ?Sized,
    I: IntoIterator<Item = u16>,
{
    let _ = port.close();
    for number in numbers {
        match port.open(number, baud, read_chunk) {
            Ok(()) => {
                info!(number, "Successful connection to port #{number}");
                return Some(number);
            }
            Err(e) => debug!(number, error = %e, "Unsuccessful connection to port #{number}"),
        }
    }
    None
}

/// Query the line and close the port if the line has gone away.
///
/// Returns whether the port is still connected. Line faults are logged; the
/// next [`poll`] clears them.
pub fn check_line<P: SerialPort + ?Sized>(port: &mut P) -> bool {
    if !port.is_connected() {
        return false;
    }
    let number = port.number();
    let error = port.check_status().clone();
    match error.kind() {
        ErrorKind::None => {}
        ErrorKind::Unavailable => {
            warn!(?number, error = %error, "line lost");
            let _ = port.close();
        }
        kind => warn!(?number, %kind, error = %error, "line fault"),
    }
    port.is_connected()
}

/// Text describing the port: the recorded error if any, otherwise the
/// connection state.
pub fn status_text<P: SerialPort + ?Sized>(port: &P) -> String {
    if port.fail() {
        port.error().what().to_string()
    } else if port.is_connected() {
        "Connected".to_string()
    } else {
        "Disconnected".to_string()
    }
}

/// Run one frame: refresh the status and take a reading if one is queued.
pub fn poll<P: SerialPort + ?Sized>(port: &mut P, mode: Mode, delimiter: u8) -> Frame {
    if port.is_connected() {
        port.clear_error();
    }
    let status = status_text(port);

    let reading = if port.is_connected() {
        match mode {
            Mode::Compass => port.read_byte().ok().map(|b| Reading::Angle(compass_angle(b))),
            Mode::Lines => {
                let line = read_line(port, delimiter);
                (!line.is_empty()).then_some(Reading::Line(line))
            }
        }
    } else {
        None
    };

    Frame { status, reading }
}

/// Discard anything pending on both sides and release the line.
pub fn shutdown<P: SerialPort + ?Sized>(port: &mut P) {
    if port.is_connected() {
        let _ = port.flush_input(true);
        let _ = port.flush_output(true);
    }
    let _ = port.close();
}
