//! Port-specific error types.
//!
//! A `PortError` is a plain value: a classification (`ErrorKind`) plus a
//! human-readable message. Platform failures are folded into the taxonomy at
//! the link boundary so callers never see raw OS codes.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classification of a port failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A read failed, or nothing was queued to read.
    Read,
    /// A write failed at the transport.
    Write,
    /// The line was acquired but its configuration could not be applied.
    Open,
    /// The line could not be released.
    Close,
    /// The line does not exist, is in use, or the port is not connected.
    Unavailable,
    /// Data was lost because a buffer or queue overran.
    Overflow,
    /// The hardware detected a line fault (break, framing, parity).
    Hardware,
    /// An unclassified failure.
    Unknown,
    /// A host-side platform failure with no better classification.
    OsSpecific,
    /// No error.
    #[default]
    None,
}

impl ErrorKind {
    /// Short lowercase label, used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Open => "open",
            Self::Close => "close",
            Self::Unavailable => "unavailable",
            Self::Overflow => "overflow",
            Self::Hardware => "hardware",
            Self::Unknown => "unknown",
            Self::OsSpecific => "os_specific",
            Self::None => "none",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error recorded by a serial port operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct PortError {
    kind: ErrorKind,
    message: String,
}

/// Result type for port operations.
pub type PortResult<T> = Result<T, PortError>;

impl Default for PortError {
    fn default() -> Self {
        Self {
            kind: ErrorKind::None,
            message: "No error.".to_string(),
        }
    }
}

impl PortError {
    /// Create an error of the given kind.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn read(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Read, message)
    }

    pub fn write(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Write, message)
    }

    pub fn open(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Open, message)
    }

    pub fn close(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Close, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unavailable, message)
    }

    pub fn overflow(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Overflow, message)
    }

    pub fn hardware(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Hardware, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unknown, message)
    }

    pub fn os_specific(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::OsSpecific, message)
    }

    /// The error classification.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Alias of [`PortError::kind`].
    pub fn code(&self) -> ErrorKind {
        self.kind
    }

    /// The diagnostic message.
    pub fn what(&self) -> &str {
        &self.message
    }

    /// True for the success sentinel.
    pub fn is_none(&self) -> bool {
        self.kind == ErrorKind::None
    }

    /// Classify an I/O failure raised while acquiring a line.
    ///
    /// Missing, busy and access-denied devices are `Unavailable`; anything
    /// else is a host-side `OsSpecific` failure.
    pub fn from_acquire(
        kind: std::io::ErrorKind,
        context: impl fmt::Display,
        detail: impl fmt::Display,
    ) -> Self {
        use std::io::ErrorKind as Io;
        match kind {
            Io::NotFound | Io::PermissionDenied | Io::AddrInUse => {
                Self::unavailable(format!("{context} unavailable"))
            }
            _ => Self::os_specific(format!("{context}: {detail}")),
        }
    }
}

impl From<serialport::Error> for PortError {
    fn from(err: serialport::Error) -> Self {
        match err.kind() {
            serialport::ErrorKind::NoDevice => Self::unavailable(err.description),
            serialport::ErrorKind::InvalidInput => Self::open(err.description),
            serialport::ErrorKind::Io(_) => Self::os_specific(err.description),
            serialport::ErrorKind::Unknown => Self::unknown(err.description),
        }
    }
}

impl From<PortError> for std::io::Error {
    fn from(err: PortError) -> Self {
        use std::io::ErrorKind as Io;
        let kind = match err.kind {
            ErrorKind::Read => Io::WouldBlock,
            ErrorKind::Unavailable => Io::NotConnected,
            ErrorKind::Write => Io::WriteZero,
            ErrorKind::Open => Io::InvalidInput,
            _ => Io::Other,
        };
        std::io::Error::new(kind, err)
    }
}
