//! Walkthrough of the port contract on a scripted device.
//!
//! Shows opening by number, non-blocking reads, line framing, the sticky
//! error, and switching lines with `change`. No hardware is needed.
//!
//! ```bash
//! cargo run --example port_usage
//! ```

use serial_line::line::{read_line, LineIo};
use serial_line::port::{BaudRate, MockLink, MockPort, SerialPort};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Port Contract Example ===\n");

    let link = MockLink::with_ports([2, 4]);
    let mut port = MockPort::new(link.clone());

    println!("1. Scanning lines 1..=5:");
    for number in 1..=5 {
        match port.open(number, BaudRate::B4800, 0) {
            Ok(()) => {
                println!("  #{number}: connected");
                break;
            }
            Err(e) => println!("  #{number}: {e}"),
        }
    }

    println!("\n2. Reading with nothing queued:");
    if let Err(e) = port.read_byte() {
        println!("  read failed immediately: {} ({})", e, e.kind());
    }
    println!("  fail() = {}", port.fail());

    println!("\n3. Line framing:");
    link.enqueue_read(b"$HCHDG,271.4\n$HCHDG,272.0\npartial");
    println!("  line: {}", read_line(&mut port, b'\n'));
    let mut second = Vec::new();
    port.getline(&mut second, 64, b'\n');
    println!("  line: {}", String::from_utf8_lossy(&second));
    println!("  tail: {}", read_line(&mut port, b'\n'));

    println!("\n4. Writing:");
    port.write_str("HDG?\r\n")?;
    println!("  device received {:?}", String::from_utf8_lossy(&link.written()));

    println!("\n5. Switching to line #4 at 9600:");
    port.change(4, BaudRate::B9600, 8)?;
    println!(
        "  connected to #{:?} at {} baud, chunk {}",
        port.number(),
        port.baud(),
        port.read_chunk()
    );

    port.flush_input(true)?;
    port.close()?;
    println!("\n=== Example complete ===");
    Ok(())
}
