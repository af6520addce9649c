//! Serial Line Library
//!
//! A non-blocking RS-232 port with a sticky error status, stream-style line
//! extraction, and a small polling client built on top of it.
//!
//! # Modules
//!
//! - `port`: The port contract, its generic driver, OS and mock lines
//! - `line`: Delimiter-framed extraction (`getline`/`ignore`)
//! - `config`: Configuration management with TOML support
//! - `demo`: Polling client used by the `serial-line` binary
//! - `error`: Application-level error type for the binary

pub mod config;
pub mod demo;
pub mod error;
pub mod line;
pub mod port;

// Re-export commonly used types for convenience
pub use error::{AppError, AppResult};
pub use line::{read_line, read_line_bytes, LineIo};
pub use port::{
    available_ports, open_serial_port, BaudRate, Direction, ErrorKind, LineCondition, Link,
    MockLink, MockPort, Port, PortError, PortNaming, PortResult, PortStatus, SerialPort,
    SystemLink, SystemPort,
};

// Re-export config types
pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
