//! Configuration module.
//!
//! TOML configuration with environment variable overrides.
//!
//! # Configuration Resolution
//!
//! Configuration is loaded from the following locations (in order of priority):
//!
//! 1. `SERIAL_LINE_CONFIG` environment variable (explicit path)
//! 2. `./serial-line.toml` (current directory)
//! 3. `~/.config/serial-line/serial-line.toml` (XDG on Linux/macOS)
//! 4. `%APPDATA%\serial-line\serial-line.toml` (Windows)
//! 5. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! The pattern is `SERIAL_LINE_<SECTION>_<KEY>`, for example
//! `SERIAL_LINE_SERIAL_DEFAULT_BAUD=4800` or `SERIAL_LINE_LOGGING_LEVEL=debug`.
//!
//! # Example
//!
//! ```rust,no_run
//! use serial_line::config::ConfigLoader;
//!
//! let loader = ConfigLoader::load()?;
//! let serial = &loader.config().serial;
//! println!("Default baud: {}", serial.default_baud);
//! # Ok::<(), serial_line::config::ConfigError>(())
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    apply_overrides, get_default_config_dir, get_default_config_path, resolve_config_path,
    ConfigLoader,
};
pub use schema::{Config, LogFormat, LoggingConfig, SerialConfig};
