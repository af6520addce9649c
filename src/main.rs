//! `serial-line`: polls a serial line and prints what arrives.
//!
//! Scans a range of line numbers, opens the first one available, then reads
//! once per frame. While no line is open the range is scanned again every
//! second, so a device can be plugged in or replaced while the client runs. In compass mode each byte is shown as a heading; in lines
//! mode each delimited line is printed as text.
//!
//! ```bash
//! serial-line --first 1 --count 5 --baud 4800
//! serial-line --naming /dev/ttyUSB{n} --first 0 --mode lines --frames 300
//! serial-line --list
//! ```

use clap::Parser;
use serial_line::config::{Config, ConfigLoader, LogFormat, LoggingConfig};
use serial_line::demo::{self, Mode, Reading};
use serial_line::port::{available_ports, BaudRate, SystemLink, SystemPort};
use serial_line::{AppError, AppResult};
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// How often a disconnected client scans the range again.
const RESCAN_INTERVAL: Duration = Duration::from_secs(1);

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    name = "serial-line",
    version,
    about = "Poll an RS-232 line and print what arrives.",
    long_about = "Opens the first available line in a numbered range and reads from it at a fixed rate without blocking, rescanning while no line is open. Settings come from serial-line.toml and SERIAL_LINE_* environment variables; flags override both."
)]
struct Args {
    /// Configuration file to load instead of the standard locations.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// First line number to try.
    #[arg(long)]
    first: Option<u16>,

    /// Number of consecutive line numbers to try.
    #[arg(long)]
    count: Option<u16>,

    /// Baud rate (110 to 115200).
    #[arg(short, long)]
    baud: Option<BaudRate>,

    /// Bytes per bulk read; 0 reads up to the delimiter.
    #[arg(long)]
    read_chunk: Option<usize>,

    /// Device path template, `{n}` is replaced by the line number.
    #[arg(long)]
    naming: Option<String>,

    /// What each frame reads.
    #[arg(short, long, value_enum, default_value_t = Mode::Compass)]
    mode: Mode,

    /// Stop after this many frames.
    #[arg(long)]
    frames: Option<u64>,

    /// List the serial devices the system reports and exit.
    #[arg(long)]
    list: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> AppResult<()> {
    let config = load_config(&args)?;
    init_logging(&config.logging)?;
    debug!(?config, "effective configuration");

    if args.list {
        for name in available_ports()? {
            println!("{name}");
        }
        return Ok(());
    }

    let serial = &config.serial;
    let mut port = SystemPort::new(SystemLink::new(serial.naming()));
    info!(
        first = serial.scan_first,
        count = serial.scan_count,
        baud = %serial.default_baud,
        mode = ?args.mode,
        "polling"
    );

    let interval = serial.poll_interval();
    let mut next_scan = Instant::now();
    let mut last_status = String::new();
    let mut frames = 0u64;
    while args.frames.map_or(true, |limit| frames < limit) {
        if !demo::check_line(&mut port) && Instant::now() >= next_scan {
            demo::connect(
                &mut port,
                serial.scan_range(),
                serial.default_baud,
                serial.default_read_chunk,
            );
            next_scan = Instant::now() + RESCAN_INTERVAL;
        }

        let frame = demo::poll(&mut port, args.mode, serial.delimiter);
        if frame.status != last_status {
            println!("[{}]", frame.status);
            last_status = frame.status;
        }
        match frame.reading {
            Some(Reading::Angle(angle)) => println!("Angle: {angle:.1}"),
            Some(Reading::Line(line)) => println!("{line}"),
            None => {}
        }
        frames += 1;
        thread::sleep(interval);
    }

    demo::shutdown(&mut port);
    info!(frames, "done");
    Ok(())
}

/// Load the file configuration and apply command-line overrides.
fn load_config(args: &Args) -> AppResult<Config> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from(path)?.into_config(),
        None => match ConfigLoader::load() {
            Ok(loader) => loader.into_config(),
            Err(e) => {
                eprintln!("Warning: Failed to load config, using defaults: {e}");
                ConfigLoader::with_defaults().into_config()
            }
        },
    };

    let serial = &mut config.serial;
    if let Some(first) = args.first {
        serial.scan_first = first;
    }
    if let Some(count) = args.count {
        serial.scan_count = count;
    }
    if let Some(baud) = args.baud {
        serial.default_baud = baud;
    }
    if let Some(chunk) = args.read_chunk {
        serial.default_read_chunk = chunk;
    }
    if let Some(naming) = &args.naming {
        serial.port_naming = naming.clone();
    }
    config.validate()?;
    Ok(config)
}

/// Install the global subscriber. `RUST_LOG` takes precedence over the
/// configured level. Logs go to stderr so stdout carries only readings.
fn init_logging(logging: &LoggingConfig) -> AppResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| AppError::Logging(e.to_string()))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = match logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    result.map_err(|e| AppError::Logging(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_overrides() {
        let args = Args::try_parse_from([
            "serial-line",
            "--baud",
            "4800",
            "--first",
            "3",
            "--mode",
            "lines",
            "--frames",
            "10",
        ])
        .unwrap();
        assert_eq!(args.baud, Some(BaudRate::B4800));
        assert_eq!(args.first, Some(3));
        assert_eq!(args.mode, Mode::Lines);
        assert_eq!(args.frames, Some(10));
    }

    #[test]
    fn test_cli_rejects_non_standard_baud() {
        assert!(Args::try_parse_from(["serial-line", "--baud", "12345"]).is_err());
    }
}
