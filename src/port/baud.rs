//! Standard baud rates.
//!
//! Only the fixed set of standard rates is accepted at the port boundary;
//! the integer the transport expects is obtained through [`BaudRate::as_u32`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Returned when an integer is not one of the standard rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Unsupported baud rate: {0}")]
pub struct InvalidBaudRate(pub u32);

/// A standard serial line speed in bits per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BaudRate {
    B110,
    B300,
    B600,
    B1200,
    B2400,
    B4800,
    #[default]
    B9600,
    B14400,
    B19200,
    B28800,
    B38400,
    B56000,
    B57600,
    B115200,
}

impl BaudRate {
    /// Every supported rate, slowest first.
    pub const ALL: [BaudRate; 14] = [
        Self::B110,
        Self::B300,
        Self::B600,
        Self::B1200,
        Self::B2400,
        Self::B4800,
        Self::B9600,
        Self::B14400,
        Self::B19200,
        Self::B28800,
        Self::B38400,
        Self::B56000,
        Self::B57600,
        Self::B115200,
    ];

    /// The rate as the integer handed to the transport.
    pub const fn as_u32(self) -> u32 {
        match self {
            Self::B110 => 110,
            Self::B300 => 300,
            Self::B600 => 600,
            Self::B1200 => 1200,
            Self::B2400 => 2400,
            Self::B4800 => 4800,
            Self::B9600 => 9600,
            Self::B14400 => 14400,
            Self::B19200 => 19200,
            Self::B28800 => 28800,
            Self::B38400 => 38400,
            Self::B56000 => 56000,
            Self::B57600 => 57600,
            Self::B115200 => 115200,
        }
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = InvalidBaudRate;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .iter()
            .copied()
            .find(|rate| rate.as_u32() == value)
            .ok_or(InvalidBaudRate(value))
    }
}

impl From<BaudRate> for u32 {
    fn from(rate: BaudRate) -> Self {
        rate.as_u32()
    }
}

impl FromStr for BaudRate {
    type Err = InvalidBaudRate;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u32 = s.trim().parse().map_err(|_| InvalidBaudRate(0))?;
        Self::try_from(value)
    }
}

impl fmt::Display for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u32())
    }
}
