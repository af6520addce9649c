//! The port state machine shared by every link.

use super::baud::BaudRate;
use super::error::{PortError, PortResult};
use super::traits::{Direction, Link, PortStatus, SerialPort};
use std::io;
use tracing::{debug, trace, warn};

/// A serial port driving a [`Link`].
///
/// `Port` owns the link for its whole lifetime and closes it when dropped.
///
/// # Example
/// ```
/// use serial_line::port::{BaudRate, MockLink, Port, SerialPort};
///
/// let link = MockLink::with_ports([3]);
/// let mut port = Port::new(link.clone());
/// port.open(3, BaudRate::B4800, 1).unwrap();
///
/// link.enqueue_read(b"A");
/// assert_eq!(port.read_byte().unwrap(), b'A');
///
/// // Nothing queued: the read fails instead of waiting.
/// assert!(port.read_byte().is_err());
/// assert!(port.fail());
/// ```
#[derive(Debug)]
pub struct Port<L: Link> {
    link: L,
    status: PortStatus,
    /// The link refused a disconnect and still holds a line.
    release_pending: bool,
}

impl<L: Link> Port<L> {
    /// Create a disconnected port.
    pub fn new(link: L) -> Self {
        Self {
            link,
            status: PortStatus::default(),
            release_pending: false,
        }
    }

    /// Create a port and open it. A failed open is recorded in the port's
    /// error rather than returned.
    pub fn open_with(link: L, number: u16, baud: BaudRate, read_chunk: usize) -> Self {
        let mut port = Self::new(link);
        let _ = port.open(number, baud, read_chunk);
        port
    }

    fn acquire(&mut self, number: u16, baud: BaudRate) -> PortResult<()> {
        if self.release_pending {
            if let Err(e) = self.release() {
                warn!(number, error = %e, "line from an earlier close is still held");
            }
        }
        self.link.connect(number, baud)?;
        if let Err(e) = self.link.configure(baud) {
            if let Err(release) = self.link.disconnect() {
                self.release_pending = true;
                warn!(number, error = %release, "failed to release line after configuration error");
            }
            return Err(e);
        }
        self.status.connected = true;
        self.status.number = Some(number);
        Ok(())
    }

    /// Drop the current line. The port ends disconnected even if the link
    /// reports a failure; the release is then retried by the next close,
    /// open or drop.
    fn release(&mut self) -> PortResult<()> {
        let number = self.status.number.take();
        let was_connected = std::mem::replace(&mut self.status.connected, false);
        if !was_connected && !self.release_pending {
            return Ok(());
        }
        match self.link.disconnect() {
            Ok(()) => {
                self.release_pending = false;
                debug!(?number, "port closed");
                Ok(())
            }
            Err(e) => {
                self.release_pending = true;
                warn!(?number, error = %e, "link reported a failure while closing");
                Err(PortError::close(format!("Failure closing port: {}", e.what())))
            }
        }
    }

    fn read_queued(&mut self, dest: &mut [u8], len: Option<usize>) -> PortResult<usize> {
        if !self.status.connected {
            return Err(PortError::unavailable(
                "Attempt to read from unconnected port.",
            ));
        }
        let wanted = self.status.transfer_len(len, dest.len());
        if wanted == 0 {
            return Ok(0);
        }
        let queued = self.link.bytes_to_read().map_err(|e| {
            PortError::read(format!("Failure retrieving data from port: {}", e.what()))
        })?;
        if queued == 0 {
            return Err(PortError::read("Nothing to read from port."));
        }
        let n = queued.min(wanted);
        let got = self.link.read_bytes(&mut dest[..n]).map_err(|e| {
            PortError::read(format!("Failure retrieving data from port: {}", e.what()))
        })?;
        trace!(requested = wanted, queued, read = got, "read");
        Ok(got)
    }

    fn write_queued(&mut self, src: &[u8], len: Option<usize>) -> PortResult<usize> {
        if !self.status.connected {
            return Err(PortError::unavailable(
                "Attempt to write to unconnected port.",
            ));
        }
        let wanted = self.status.transfer_len(len, src.len());
        if wanted == 0 {
            return Ok(0);
        }
        let written = self.link.write_bytes(&src[..wanted]).map_err(|e| {
            PortError::write(format!("Failure sending data to port: {}", e.what()))
        })?;
        trace!(requested = wanted, written, "write");
        Ok(written)
    }

    fn purge(&mut self, direction: Direction, force_abort: bool) -> PortResult<()> {
        if !self.status.connected {
            return Err(PortError::unavailable("Attempt to flush unconnected port."));
        }
        self.link.purge(direction, force_abort)
    }
}

impl<L: Link> SerialPort for Port<L> {
    fn status(&self) -> &PortStatus {
        &self.status
    }

    fn status_mut(&mut self) -> &mut PortStatus {
        &mut self.status
    }

    fn open(&mut self, number: u16, baud: BaudRate, read_chunk: usize) -> PortResult<()> {
        if self.status.connected && self.status.number == Some(number) {
            trace!(number, "already connected");
            return self.status.record(Ok(()));
        }
        if self.status.connected {
            if let Err(e) = self.release() {
                warn!(error = %e, "previous line did not close cleanly");
            }
        }

        self.status.baud_rate = baud;
        self.status.read_chunk = read_chunk;

        let result = self.acquire(number, baud);
        match &result {
            Ok(()) => debug!(number, baud = baud.as_u32(), read_chunk, "port opened"),
            Err(e) => warn!(number, kind = %e.kind(), error = %e, "open failed"),
        }
        self.status.record(result)
    }

    fn close(&mut self) -> PortResult<()> {
        let result = self.release();
        self.status.record(result)
    }

    fn read(&mut self, dest: &mut [u8], len: Option<usize>) -> PortResult<usize> {
        let result = self.read_queued(dest, len);
        self.status.record(result)
    }

    fn write(&mut self, src: &[u8], len: Option<usize>) -> PortResult<usize> {
        let result = self.write_queued(src, len);
        self.status.record(result)
    }

    fn flush_input(&mut self, force_abort: bool) -> PortResult<()> {
        let result = self.purge(Direction::Input, force_abort);
        self.status.record(result)
    }

    fn flush_output(&mut self, force_abort: bool) -> PortResult<()> {
        let result = self.purge(Direction::Output, force_abort);
        self.status.record(result)
    }

    fn check_status(&mut self) -> &PortError {
        self.status.error = if !self.status.connected {
            PortError::unavailable("Port is not connected.")
        } else {
            match self.link.line_condition() {
                Ok(None) => PortError::default(),
                Ok(Some(condition)) => condition.to_error(),
                Err(e) => e,
            }
        };
        &self.status.error
    }
}

impl<L: Link> Drop for Port<L> {
    fn drop(&mut self) {
        if self.status.connected || self.release_pending {
            let _ = self.release();
        }
    }
}

impl<L: Link> io::Read for Port<L> {
    /// Non-blocking: an empty input queue is `WouldBlock`.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        SerialPort::read(self, buf, Some(buf.len())).map_err(io::Error::from)
    }
}

impl<L: Link> io::Write for Port<L> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        SerialPort::write(self, buf, Some(buf.len())).map_err(io::Error::from)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
