//! Delimiter framing over the single-byte read.
//!
//! A serial line carries no message boundaries. Everything here is built on
//! [`SerialPort::read_byte`] plus a stopping rule: the delimiter was seen, the
//! length bound was reached, or the read failed (nothing queued). Because
//! reads never wait, framing never blocks for a delimiter that has not
//! arrived, and calling it again continues with the next bytes on the line.

use crate::port::SerialPort;

/// Line-oriented reads for any [`SerialPort`], including `dyn SerialPort`.
pub trait LineIo: SerialPort {
    /// Append bytes to `buf` until `delim` is read, `max_len` bytes have been
    /// stored, or a read fails. The delimiter is consumed but not stored.
    ///
    /// Returns the port so calls can be chained; check `fail()` afterwards to
    /// tell a drained queue from a complete line.
    fn getline(&mut self, buf: &mut Vec<u8>, max_len: usize, delim: u8) -> &mut Self {
        let mut stored = 0;
        while stored < max_len {
            let Ok(byte) = self.read_byte() else { break };
            if byte == delim {
                break;
            }
            buf.push(byte);
            stored += 1;
        }
        self
    }

    /// Like [`getline`](LineIo::getline) but discards the bytes.
    fn ignore(&mut self, max_len: usize, delim: u8) -> &mut Self {
        let mut skipped = 0;
        while skipped < max_len {
            let Ok(byte) = self.read_byte() else { break };
            if byte == delim {
                break;
            }
            skipped += 1;
        }
        self
    }
}

impl<P: SerialPort + ?Sized> LineIo for P {}

/// Read one delimited line as raw bytes.
///
/// The line is bounded by the port's read chunk; a chunk of 0 scans until the
/// delimiter or until the input queue runs dry.
pub fn read_line_bytes<P: SerialPort + ?Sized>(port: &mut P, delim: u8) -> Vec<u8> {
    let bound = match port.read_chunk() {
        0 => usize::MAX,
        n => n,
    };
    let mut line = Vec::with_capacity(bound.min(256));
    port.getline(&mut line, bound, delim);
    line
}

/// Read one delimited line as text. Invalid UTF-8 is replaced.
///
/// # Example
/// ```
/// use serial_line::line::read_line;
/// use serial_line::port::{BaudRate, MockLink, MockPort, SerialPort};
///
/// let link = MockLink::with_ports([1]);
/// let mut port = MockPort::new(link.clone());
/// port.open(1, BaudRate::B9600, 16).unwrap();
///
/// link.enqueue_read(b"N 12\nN 13\n");
/// assert_eq!(read_line(&mut port, b'\n'), "N 12");
/// assert_eq!(read_line(&mut port, b'\n'), "N 13");
/// ```
pub fn read_line<P: SerialPort + ?Sized>(port: &mut P, delim: u8) -> String {
    String::from_utf8_lossy(&read_line_bytes(port, delim)).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{BaudRate, ErrorKind, MockLink, MockPort};

    fn connected(chunk: usize) -> (MockPort, MockLink) {
        let link = MockLink::with_ports([1]);
        let mut port = MockPort::new(link.clone());
        port.open(1, BaudRate::B9600, chunk).unwrap();
        (port, link)
    }

    #[test]
    fn test_getline_stops_at_delimiter() {
        let (mut port, link) = connected(0);
        link.enqueue_read(b"ab\0cd\0");

        let mut first = Vec::new();
        let mut second = Vec::new();
        port.getline(&mut first, 10, b'\0')
            .getline(&mut second, 10, b'\0');

        assert_eq!(first, b"ab");
        assert_eq!(second, b"cd");
        assert!(port.good());
        assert_eq!(link.available_bytes(), 0);
    }

    #[test]
    fn test_getline_length_bound() {
        let (mut port, link) = connected(0);
        link.enqueue_read(b"abcdef");

        let mut line = Vec::new();
        port.getline(&mut line, 4, b'\0');
        assert_eq!(line, b"abcd");
        assert!(port.good());
        assert_eq!(link.available_bytes(), 2);
    }

    #[test]
    fn test_getline_stops_when_queue_drains() {
        let (mut port, link) = connected(0);
        link.enqueue_read(b"xy");

        let mut line = Vec::new();
        port.getline(&mut line, 10, b'\n');
        assert_eq!(line, b"xy");
        assert!(port.fail());
        assert_eq!(port.error().kind(), ErrorKind::Read);
    }

    #[test]
    fn test_getline_on_disconnected_port() {
        let mut port = MockPort::new(MockLink::new());
        let mut line = Vec::new();
        port.getline(&mut line, 10, b'\n');
        assert!(line.is_empty());
        assert_eq!(port.error().kind(), ErrorKind::Unavailable);
    }

    #[test]
    fn test_ignore_skips_one_line() {
        let (mut port, link) = connected(0);
        link.enqueue_read(b"garbage\nkeep\n");

        port.ignore(64, b'\n');
        assert_eq!(read_line(&mut port, b'\n'), "keep");
    }

    #[test]
    fn test_ignore_length_bound() {
        let (mut port, link) = connected(0);
        link.enqueue_read(b"abcdef");

        port.ignore(3, b'\n');
        assert_eq!(link.available_bytes(), 3);
    }

    #[test]
    fn test_read_line_bounded_by_chunk() {
        let (mut port, link) = connected(3);
        link.enqueue_read(b"abcdef\n");

        assert_eq!(read_line(&mut port, b'\n'), "abc");
        assert_eq!(read_line(&mut port, b'\n'), "def");
    }

    #[test]
    fn test_read_line_through_trait_object() {
        let link = MockLink::with_ports([2]);
        let mut port: Box<dyn SerialPort> = Box::new(MockPort::new(link.clone()));
        port.open(2, BaudRate::B4800, 0).unwrap();
        link.enqueue_read(b"42\r");

        assert_eq!(read_line(port.as_mut(), b'\r'), "42");
        assert_eq!(read_line_bytes(port.as_mut(), b'\r'), b"");
        assert!(port.fail());
    }

    #[test]
    fn test_read_line_lossy_utf8() {
        let (mut port, link) = connected(0);
        link.enqueue_read(&[b'o', 0xFF, b'k', b'\n']);
        assert_eq!(read_line(&mut port, b'\n'), "o\u{FFFD}k");
    }
}
