//! Operating-system serial lines.
//!
//! Wraps the `serialport` crate's `SerialPort` trait with our own `Link`
//! trait. Line numbers are turned into device paths through a [`PortNaming`]
//! template.

use super::baud::BaudRate;
use super::driver::Port;
use super::error::{PortError, PortResult};
use super::traits::{Direction, LineCondition, Link, SerialPort};
use std::fmt;
use std::io::{Read, Write};
use std::time::Duration;
use tracing::debug;

/// Device path template for the current platform.
#[cfg(target_os = "windows")]
pub const DEFAULT_NAMING: &str = r"\\.\COM{n}";

/// Device path template for the current platform.
#[cfg(not(target_os = "windows"))]
pub const DEFAULT_NAMING: &str = "/dev/ttyS{n}";

/// How long a transfer may wait on the device once data is known to be
/// queued.
const POLL_TIMEOUT: Duration = Duration::from_millis(10);

/// Maps a line number to a device path. `{n}` in the template is replaced
/// by the number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortNaming {
    template: String,
}

impl PortNaming {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// True when the template contains the `{n}` placeholder.
    pub fn is_valid(&self) -> bool {
        self.template.contains("{n}")
    }

    pub fn device_path(&self, number: u16) -> String {
        self.template.replace("{n}", &number.to_string())
    }
}

impl Default for PortNaming {
    fn default() -> Self {
        Self::new(DEFAULT_NAMING)
    }
}

/// A line provided by the operating system.
///
/// The `serialport` crate does not expose the device's error flags, so
/// [`line_condition`](Link::line_condition) can only detect a device that
/// has gone away. On a `SystemPort`, `check_status` reports `Unavailable`
/// for a lost line and `None` otherwise; it never yields `Hardware` or
/// `Overflow`.
pub struct SystemLink {
    naming: PortNaming,
    timeout: Duration,
    /// The open device and its path.
    port: Option<(Box<dyn serialport::SerialPort>, String)>,
}

/// A serial port on an operating-system line.
pub type SystemPort = Port<SystemLink>;

impl SystemLink {
    pub fn new(naming: PortNaming) -> Self {
        Self {
            naming,
            timeout: POLL_TIMEOUT,
            port: None,
        }
    }

    pub fn naming(&self) -> &PortNaming {
        &self.naming
    }

    /// Path of the open device, if any.
    pub fn device_path(&self) -> Option<&str> {
        self.port.as_ref().map(|(_, path)| path.as_str())
    }

    fn device(&mut self) -> PortResult<&mut Box<dyn serialport::SerialPort>> {
        self.port
            .as_mut()
            .map(|(port, _)| port)
            .ok_or_else(|| PortError::unavailable("No line is acquired."))
    }
}

impl Default for SystemLink {
    fn default() -> Self {
        Self::new(PortNaming::default())
    }
}

impl Link for SystemLink {
    fn connect(&mut self, number: u16, baud: BaudRate) -> PortResult<()> {
        let path = self.naming.device_path(number);
        let context = format!("Port #{number}");
        let port = serialport::new(&path, baud.as_u32())
            .timeout(self.timeout)
            .open()
            .map_err(|e| match e.kind() {
                serialport::ErrorKind::NoDevice => {
                    PortError::unavailable(format!("{context} unavailable"))
                }
                serialport::ErrorKind::Io(kind) => PortError::from_acquire(kind, &context, &e),
                _ => PortError::from(e),
            })?;
        debug!(number, path = %path, "line acquired");
        self.port = Some((port, path));
        Ok(())
    }

    fn configure(&mut self, baud: BaudRate) -> PortResult<()> {
        let port = self.device()?;
        let settings_error =
            |e: serialport::Error| PortError::open(format!("Failed to apply port settings: {e}"));
        port.set_baud_rate(baud.as_u32()).map_err(settings_error)?;
        port.set_data_bits(serialport::DataBits::Eight)
            .map_err(settings_error)?;
        port.set_stop_bits(serialport::StopBits::One)
            .map_err(settings_error)?;
        port.set_parity(serialport::Parity::None)
            .map_err(settings_error)?;
        port.set_flow_control(serialport::FlowControl::None)
            .map_err(settings_error)?;
        Ok(())
    }

    fn disconnect(&mut self) -> PortResult<()> {
        // Dropping the handle closes the device.
        if let Some((_, path)) = self.port.take() {
            debug!(path = %path, "line released");
        }
        Ok(())
    }

    fn bytes_to_read(&mut self) -> PortResult<usize> {
        let port = self.device()?;
        port.bytes_to_read()
            .map(|n| n as usize)
            .map_err(PortError::from)
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> PortResult<usize> {
        let port = self.device()?;
        port.read(buffer).map_err(|e| PortError::read(e.to_string()))
    }

    fn write_bytes(&mut self, data: &[u8]) -> PortResult<usize> {
        let port = self.device()?;
        port.write(data).map_err(|e| PortError::write(e.to_string()))
    }

    fn purge(&mut self, direction: Direction, force_abort: bool) -> PortResult<()> {
        let port = self.device()?;
        let buffer = match direction {
            Direction::Input => serialport::ClearBuffer::Input,
            Direction::Output => serialport::ClearBuffer::Output,
        };
        // serialport exposes no separate abort; clearing discards everything
        // pending on that side either way.
        debug!(?direction, force_abort, "purging line");
        port.clear(buffer).map_err(PortError::from)
    }

    fn line_condition(&mut self) -> PortResult<Option<LineCondition>> {
        let port = self.device()?;
        // A device that can no longer report its input queue is treated as gone.
        match port.bytes_to_read() {
            Ok(_) => Ok(None),
            Err(e) => Err(PortError::unavailable(format!("Line lost: {e}"))),
        }
    }
}

impl fmt::Debug for SystemLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SystemLink")
            .field("naming", &self.naming.template)
            .field("device", &self.device_path())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// A disconnected port for the current platform, with the default naming.
pub fn open_serial_port() -> Box<dyn SerialPort> {
    Box::new(SystemPort::new(SystemLink::default()))
}

/// Device names the operating system reports.
pub fn available_ports() -> PortResult<Vec<String>> {
    let ports = serialport::available_ports().map_err(PortError::from)?;
    Ok(ports.into_iter().map(|info| info.port_name).collect())
}
