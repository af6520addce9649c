//! Mock link implementation for testing.
//!
//! Provides a `MockLink` that simulates a set of numbered serial lines
//! without requiring actual hardware. Clones share state, so a test can keep
//! one handle to script the device while a [`Port`](super::Port) owns another.

use super::baud::BaudRate;
use super::driver::Port;
use super::error::{PortError, PortResult};
use super::traits::{Direction, LineCondition, Link};
use parking_lot::Mutex;
use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;

/// Inner state of the mock link.
#[derive(Debug, Default)]
struct MockLinkState {
    /// Line numbers that exist.
    present: BTreeSet<u16>,
    /// Line numbers held by someone else.
    busy: BTreeSet<u16>,
    /// Line currently acquired through this link.
    connected: Option<u16>,
    /// Baud rate applied by the last successful configure.
    baud: Option<BaudRate>,
    /// Bytes returned by read operations.
    read_queue: VecDeque<u8>,
    /// Every byte written, in order.
    written: Vec<u8>,
    /// Maximum bytes accepted per write call.
    write_limit: Option<usize>,
    /// Pending fault returned by the next status query.
    condition: Option<LineCondition>,
    /// Purges performed, in order.
    purges: Vec<(Direction, bool)>,
    fail_configure: bool,
    fail_disconnect: bool,
    fail_reads: bool,
    fail_writes: bool,
    connect_count: usize,
    disconnect_count: usize,
    read_calls: usize,
}

/// A serial port on a scripted device.
pub type MockPort = Port<MockLink>;

/// Scripted serial device for tests and demos.
///
/// # Example
/// ```
/// use serial_line::port::{BaudRate, MockLink, MockPort, SerialPort};
///
/// let link = MockLink::with_ports([1, 2]);
/// let mut port = MockPort::new(link.clone());
/// port.open(2, BaudRate::B9600, 0).unwrap();
///
/// port.write_byte(b'!').unwrap();
/// assert_eq!(link.written(), b"!");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockLink {
    state: Arc<Mutex<MockLinkState>>,
}

impl MockLink {
    /// A link with no lines present.
    pub fn new() -> Self {
        Self::default()
    }

    /// A link on which the given line numbers exist.
    pub fn with_ports(numbers: impl IntoIterator<Item = u16>) -> Self {
        let link = Self::new();
        link.state.lock().present.extend(numbers);
        link
    }

    /// Make line `number` exist.
    pub fn add_port(&self, number: u16) {
        self.state.lock().present.insert(number);
    }

    /// Unplug line `number`. If it is the acquired line, the next status
    /// query reports it lost.
    pub fn remove_port(&self, number: u16) {
        self.state.lock().present.remove(&number);
    }

    /// Mark line `number` as held by another process.
    pub fn set_busy(&self, number: u16, busy: bool) {
        let mut state = self.state.lock();
        if busy {
            state.busy.insert(number);
        } else {
            state.busy.remove(&number);
        }
    }

    /// Append bytes to the input queue.
    pub fn enqueue_read(&self, data: &[u8]) {
        self.state.lock().read_queue.extend(data);
    }

    /// Everything written so far.
    pub fn written(&self) -> Vec<u8> {
        self.state.lock().written.clone()
    }

    pub fn clear_written(&self) {
        self.state.lock().written.clear();
    }

    /// Accept at most `limit` bytes per write call.
    pub fn set_write_limit(&self, limit: Option<usize>) {
        self.state.lock().write_limit = limit;
    }

    /// Report `condition` on the next status query.
    pub fn raise_condition(&self, condition: LineCondition) {
        self.state.lock().condition = Some(condition);
    }

    pub fn fail_configure(&self, fail: bool) {
        self.state.lock().fail_configure = fail;
    }

    pub fn fail_disconnect(&self, fail: bool) {
        self.state.lock().fail_disconnect = fail;
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().fail_reads = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().fail_writes = fail;
    }

    /// Number of bytes waiting in the input queue.
    pub fn available_bytes(&self) -> usize {
        self.state.lock().read_queue.len()
    }

    /// The line currently acquired, if any.
    pub fn connected_number(&self) -> Option<u16> {
        self.state.lock().connected
    }

    /// Baud rate applied by the last successful configure.
    pub fn configured_baud(&self) -> Option<BaudRate> {
        self.state.lock().baud
    }

    pub fn purges(&self) -> Vec<(Direction, bool)> {
        self.state.lock().purges.clone()
    }

    pub fn connect_count(&self) -> usize {
        self.state.lock().connect_count
    }

    pub fn disconnect_count(&self) -> usize {
        self.state.lock().disconnect_count
    }

    /// Number of `read_bytes` calls that reached the device.
    pub fn read_calls(&self) -> usize {
        self.state.lock().read_calls
    }
}

impl Link for MockLink {
    fn connect(&mut self, number: u16, _baud: BaudRate) -> PortResult<()> {
        let mut state = self.state.lock();
        if !state.present.contains(&number) || state.busy.contains(&number) {
            return Err(PortError::unavailable(format!("Port #{number} unavailable")));
        }
        if state.connected.is_some() {
            return Err(PortError::os_specific("Mock link already holds a line"));
        }
        state.connected = Some(number);
        state.connect_count += 1;
        Ok(())
    }

    fn configure(&mut self, baud: BaudRate) -> PortResult<()> {
        let mut state = self.state.lock();
        if state.fail_configure {
            return Err(PortError::open("Failed to apply port settings."));
        }
        state.baud = Some(baud);
        Ok(())
    }

    fn disconnect(&mut self) -> PortResult<()> {
        let mut state = self.state.lock();
        if state.fail_disconnect {
            return Err(PortError::close("Mock handle refused to close"));
        }
        state.connected = None;
        state.baud = None;
        state.disconnect_count += 1;
        Ok(())
    }

    fn bytes_to_read(&mut self) -> PortResult<usize> {
        Ok(self.state.lock().read_queue.len())
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> PortResult<usize> {
        let mut state = self.state.lock();
        state.read_calls += 1;
        if state.fail_reads {
            return Err(PortError::read("Mock read failure"));
        }

        let mut bytes_read = 0;
        for byte in buffer.iter_mut() {
            match state.read_queue.pop_front() {
                Some(queued) => {
                    *byte = queued;
                    bytes_read += 1;
                }
                None => break,
            }
        }
        Ok(bytes_read)
    }

    fn write_bytes(&mut self, data: &[u8]) -> PortResult<usize> {
        let mut state = self.state.lock();
        if state.fail_writes {
            return Err(PortError::write("Mock write failure"));
        }
        let n = state.write_limit.map_or(data.len(), |limit| limit.min(data.len()));
        state.written.extend_from_slice(&data[..n]);
        Ok(n)
    }

    fn purge(&mut self, direction: Direction, force_abort: bool) -> PortResult<()> {
        let mut state = self.state.lock();
        if direction == Direction::Input {
            state.read_queue.clear();
        }
        state.purges.push((direction, force_abort));
        Ok(())
    }

    fn line_condition(&mut self) -> PortResult<Option<LineCondition>> {
        let mut state = self.state.lock();
        if let Some(number) = state.connected {
            if !state.present.contains(&number) {
                return Err(PortError::unavailable(format!("Line lost: Port #{number} removed")));
            }
        }
        Ok(state.condition.take())
    }
}
