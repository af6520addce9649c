//! Port abstraction layer for serial communication.
//!
//! Provides the `SerialPort` contract, the `Link` seam underneath it, and
//! two links: the operating system's lines and a scripted mock for tests.

pub mod baud;
pub mod driver;
pub mod error;
pub mod mock;
pub mod system;
pub mod traits;

pub use baud::{BaudRate, InvalidBaudRate};
pub use driver::Port;
pub use error::{ErrorKind, PortError, PortResult};
pub use mock::{MockLink, MockPort};
pub use system::{available_ports, open_serial_port, PortNaming, SystemLink, SystemPort};
pub use traits::*;
