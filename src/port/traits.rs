//! Core traits for serial port abstraction.
//!
//! `SerialPort` is the contract a caller programs against: connection
//! lifecycle, byte and bulk I/O, purging, and a sticky error that can be
//! polled. `Link` is the narrower seam underneath it, the raw device calls a
//! platform has to provide. [`Port`](super::Port) turns any `Link` into a
//! `SerialPort`.

use super::baud::BaudRate;
use super::error::{PortError, PortResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which side of the line a purge applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Input,
    Output,
}

/// A fault reported by the line itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineCondition {
    /// A break condition was detected.
    Break,
    /// A framing error was detected.
    Framing,
    /// A character-buffer overrun; the next character was lost.
    Overrun,
    /// The input buffer overflowed.
    RxOverflow,
    /// A parity error was detected.
    Parity,
}

impl LineCondition {
    /// The error recorded when this condition is observed.
    pub fn to_error(self) -> PortError {
        match self {
            Self::Break => PortError::hardware("The hardware detected a break condition."),
            Self::Framing => PortError::hardware("The hardware detected a framing error."),
            Self::Overrun => PortError::overflow(
                "A character-buffer overrun has occurred. The next character is lost.",
            ),
            Self::RxOverflow => PortError::overflow(
                "An input buffer overflow has occurred. There is either no room in the \
                 input buffer, or a character was received after the end-of-file (EOF) \
                 character.",
            ),
            Self::Parity => PortError::hardware("The hardware detected a parity error."),
        }
    }
}

/// The observable state of a port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortStatus {
    /// True iff the last open succeeded and no close has happened since.
    pub connected: bool,
    /// Platform number of the line; `None` while unset.
    pub number: Option<u16>,
    pub baud_rate: BaudRate,
    /// Transfer size used when a bulk call gives no explicit length.
    pub read_chunk: usize,
    /// Outcome of the most recent operation.
    pub error: PortError,
}

impl Default for PortStatus {
    fn default() -> Self {
        Self {
            connected: false,
            number: None,
            baud_rate: BaudRate::default(),
            read_chunk: 0,
            error: PortError::default(),
        }
    }
}

impl PortStatus {
    /// Record the outcome of an operation as the sticky error.
    pub fn record<T>(&mut self, result: PortResult<T>) -> PortResult<T> {
        match &result {
            Ok(_) => self.error = PortError::default(),
            Err(e) => self.error = e.clone(),
        }
        result
    }

    /// Resolve the length of a bulk transfer against a buffer of `available`
    /// bytes. `None` means the configured chunk, and a chunk of 0 means the
    /// whole buffer.
    pub fn transfer_len(&self, requested: Option<usize>, available: usize) -> usize {
        match requested {
            Some(n) => n.min(available),
            None if self.read_chunk == 0 => available,
            None => self.read_chunk.min(available),
        }
    }
}

/// Trait for a numbered serial line.
///
/// Every fallible operation returns its outcome and also records it as the
/// port's sticky error (`Ok` records the `None` sentinel), so a polling caller
/// can inspect `fail()` and `error()` instead of the return value.
pub trait SerialPort: fmt::Debug {
    /// Current state.
    fn status(&self) -> &PortStatus;

    /// Mutable state, for implementors and the provided methods.
    fn status_mut(&mut self) -> &mut PortStatus;

    /// Acquire line `number` and apply the configuration.
    ///
    /// Opening the number the port is already connected to succeeds without
    /// touching the line or the configuration. A different number releases
    /// the current line first.
    fn open(&mut self, number: u16, baud: BaudRate, read_chunk: usize) -> PortResult<()>;

    /// Release the line. Closing a disconnected port succeeds.
    fn close(&mut self) -> PortResult<()>;

    /// Close, then open with new parameters.
    ///
    /// The result and the recorded error are those of the open; on failure the
    /// port is left disconnected.
    fn change(&mut self, number: u16, baud: BaudRate, read_chunk: usize) -> PortResult<()> {
        if let Err(e) = self.close() {
            tracing::warn!(error = %e, "close before change failed");
        }
        self.open(number, baud, read_chunk)
    }

    /// Read whatever is queued, up to the resolved length, without waiting.
    ///
    /// An empty input queue is a `Read` failure. Returns the number of bytes
    /// stored at the front of `dest`.
    fn read(&mut self, dest: &mut [u8], len: Option<usize>) -> PortResult<usize>;

    /// Write up to the resolved length of `src`. A short count is not an error.
    fn write(&mut self, src: &[u8], len: Option<usize>) -> PortResult<usize>;

    /// Read a single byte.
    fn read_byte(&mut self) -> PortResult<u8> {
        let mut byte = [0u8; 1];
        match self.read(&mut byte, Some(1))? {
            1 => Ok(byte[0]),
            _ => self
                .status_mut()
                .record(Err(PortError::read("Nothing to read from port."))),
        }
    }

    /// Write a single byte.
    fn write_byte(&mut self, byte: u8) -> PortResult<()> {
        match self.write(&[byte], Some(1))? {
            1 => Ok(()),
            _ => self
                .status_mut()
                .record(Err(PortError::write("Failure sending data to port."))),
        }
    }

    /// Write the bytes of `text`.
    fn write_str(&mut self, text: &str) -> PortResult<usize> {
        self.write(text.as_bytes(), Some(text.len()))
    }

    /// Purge the output side when `output` is set, otherwise the input side.
    fn flush(&mut self, output: bool, force_abort: bool) -> PortResult<()> {
        if output {
            self.flush_output(force_abort)
        } else {
            self.flush_input(force_abort)
        }
    }

    /// Discard received bytes not yet read.
    fn flush_input(&mut self, force_abort: bool) -> PortResult<()>;

    /// Discard bytes queued for sending. With `force_abort` an in-flight
    /// transfer is terminated as well.
    fn flush_output(&mut self, force_abort: bool) -> PortResult<()>;

    /// Query the line for faults and record the result.
    fn check_status(&mut self) -> &PortError;

    fn is_connected(&self) -> bool {
        self.status().connected
    }

    fn number(&self) -> Option<u16> {
        self.status().number
    }

    fn baud(&self) -> BaudRate {
        self.status().baud_rate
    }

    fn read_chunk(&self) -> usize {
        self.status().read_chunk
    }

    /// The last recorded error, without querying the line.
    fn error(&self) -> &PortError {
        &self.status().error
    }

    fn good(&self) -> bool {
        self.status().error.is_none()
    }

    fn fail(&self) -> bool {
        !self.good()
    }

    /// Takes effect at the next open or change.
    fn set_baud_rate(&mut self, baud: BaudRate) {
        self.status_mut().baud_rate = baud;
    }

    fn set_read_chunk(&mut self, read_chunk: usize) {
        self.status_mut().read_chunk = read_chunk;
    }

    fn clear_error(&mut self) {
        self.status_mut().error = PortError::default();
    }
}

/// Raw device operations underneath a [`SerialPort`].
///
/// Implementations do not track connection state or record errors; `Port`
/// does that once for every link.
pub trait Link: Send + fmt::Debug {
    /// Acquire line `number`. Failures are `Unavailable`, `OsSpecific` or
    /// `Unknown`.
    fn connect(&mut self, number: u16, baud: BaudRate) -> PortResult<()>;

    /// Apply 8N1 framing at `baud` to the acquired line. Failures are `Open`.
    fn configure(&mut self, baud: BaudRate) -> PortResult<()>;

    /// Release the acquired line.
    fn disconnect(&mut self) -> PortResult<()>;

    /// Number of received bytes waiting in the input queue.
    fn bytes_to_read(&mut self) -> PortResult<usize>;

    /// Read into `buffer`, returning the count actually read.
    fn read_bytes(&mut self, buffer: &mut [u8]) -> PortResult<usize>;

    /// Write `data`, returning the count actually written.
    fn write_bytes(&mut self, data: &[u8]) -> PortResult<usize>;

    /// Discard pending bytes on one side of the line.
    fn purge(&mut self, direction: Direction, force_abort: bool) -> PortResult<()>;

    /// Report a pending line fault, if any.
    fn line_condition(&mut self) -> PortResult<Option<LineCondition>>;
}
