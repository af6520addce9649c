//! Configuration loader with file resolution and environment override support.

use super::error::{ConfigError, ConfigResult};
use super::schema::{Config, LogFormat};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "SERIAL_LINE";

/// Config file name
const CONFIG_FILE_NAME: &str = "serial-line.toml";

/// Directory name under the platform config directory
const APP_DIR_NAME: &str = "serial-line";

/// Environment variable for explicit config path
const CONFIG_PATH_ENV: &str = "SERIAL_LINE_CONFIG";

/// Configuration loader with resolution and override logic.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    /// The loaded configuration
    pub config: Config,
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `SERIAL_LINE_CONFIG` environment variable (explicit path)
    /// 2. `./serial-line.toml` (current directory)
    /// 3. `serial-line/serial-line.toml` under `$XDG_CONFIG_HOME`, `~/.config`
    ///    or `%APPDATA%`
    /// 4. Built-in defaults (no file required)
    ///
    /// Environment variables override file values, and the result is
    /// validated.
    pub fn load() -> ConfigResult<Self> {
        let config_path = resolve_config_path();

        let mut config = match config_path {
            Some(ref path) => load_from_file(path)?,
            None => Config::default(),
        };
        apply_env_overrides(&mut config)?;
        config.validate()?;

        debug!(path = ?config_path, "configuration loaded");
        Ok(Self {
            config_path,
            config,
        })
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut config = load_from_file(&path)?;
        apply_env_overrides(&mut config)?;
        config.validate()?;

        Ok(Self {
            config_path: Some(path),
            config,
        })
    }

    /// Create a loader with default configuration (no file).
    ///
    /// Environment overrides that fail to parse are ignored.
    pub fn with_defaults() -> Self {
        let mut config = Config::default();
        let _ = apply_env_overrides(&mut config);

        Self {
            config_path: None,
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn into_config(self) -> Config {
        self.config
    }

    /// Save the current configuration to the file it was loaded from.
    pub fn save(&self) -> ConfigResult<()> {
        let path = self.config_path.as_ref().ok_or(ConfigError::NoPath)?;
        save_to_file(&self.config, path)
    }

    /// Save the current configuration to a specific file.
    pub fn save_to(&self, path: impl AsRef<Path>) -> ConfigResult<()> {
        save_to_file(&self.config, path.as_ref())
    }

    /// Reload configuration from file (if path is set).
    pub fn reload(&mut self) -> ConfigResult<()> {
        if let Some(ref path) = self.config_path {
            let mut config = load_from_file(path)?;
            apply_env_overrides(&mut config)?;
            config.validate()?;
            self.config = config;
        }
        Ok(())
    }
}

/// Resolve the configuration file path using standard locations.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let cwd_config = PathBuf::from(CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    get_default_config_path().filter(|path| path.exists())
}

/// Get the platform-specific config directory.
fn get_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var("APPDATA").ok().map(PathBuf::from)
    }

    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("XDG_CONFIG_HOME")
            .ok()
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var("HOME")
                    .ok()
                    .map(|h| PathBuf::from(h).join(".config"))
            })
    }
}

/// Get the default config directory for creating new config files.
pub fn get_default_config_dir() -> Option<PathBuf> {
    get_config_dir().map(|d| d.join(APP_DIR_NAME))
}

/// Get the default config file path for creating new config files.
pub fn get_default_config_path() -> Option<PathBuf> {
    get_default_config_dir().map(|d| d.join(CONFIG_FILE_NAME))
}

fn load_from_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(ConfigError::ParseError)
}

fn save_to_file(config: &Config, path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError {
            path: path.to_path_buf(),
            source: e,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    apply_overrides(config, |var| std::env::var(var).ok())
}

/// Apply `SERIAL_LINE_<SECTION>_<KEY>` overrides, reading variables through
/// `lookup`.
pub fn apply_overrides<F>(config: &mut Config, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| format!("{ENV_PREFIX}_{key}");
    let parse = |key: &str, what: &str| -> ConfigResult<Option<u64>> {
        let name = var(key);
        lookup(&name)
            .map(|v| {
                v.trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::env_parse(&name, format!("Invalid {what}")))
            })
            .transpose()
    };

    if let Some(val) = lookup(&var("SERIAL_PORT_NAMING")) {
        config.serial.port_naming = val;
    }
    if let Some(val) = lookup(&var("SERIAL_DEFAULT_BAUD")) {
        config.serial.default_baud = val
            .parse()
            .map_err(|e| ConfigError::env_parse(var("SERIAL_DEFAULT_BAUD"), format!("{e}")))?;
    }
    if let Some(val) = parse("SERIAL_DEFAULT_READ_CHUNK", "read chunk")? {
        config.serial.default_read_chunk = usize::try_from(val).map_err(|_| {
            ConfigError::env_parse(var("SERIAL_DEFAULT_READ_CHUNK"), "Read chunk too large")
        })?;
    }
    if let Some(val) = parse("SERIAL_SCAN_FIRST", "port number")? {
        config.serial.scan_first = u16::try_from(val)
            .map_err(|_| ConfigError::env_parse(var("SERIAL_SCAN_FIRST"), "Port number too large"))?;
    }
    if let Some(val) = parse("SERIAL_SCAN_COUNT", "port count")? {
        config.serial.scan_count = u16::try_from(val)
            .map_err(|_| ConfigError::env_parse(var("SERIAL_SCAN_COUNT"), "Port count too large"))?;
    }
    if let Some(val) = parse("SERIAL_POLL_INTERVAL_MS", "poll interval")? {
        config.serial.poll_interval_ms = val;
    }

    if let Some(val) = lookup(&var("LOGGING_LEVEL")) {
        config.logging.level = val;
    }
    if let Some(val) = lookup(&var("LOGGING_FORMAT")) {
        config.logging.format = match val.to_lowercase().as_str() {
            "json" => LogFormat::Json,
            "pretty" => LogFormat::Pretty,
            "compact" => LogFormat::Compact,
            other => {
                return Err(ConfigError::env_parse(
                    var("LOGGING_FORMAT"),
                    format!("Unknown log format '{other}'"),
                ))
            }
        };
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::BaudRate;
    use serial_test::serial;
    use std::collections::HashMap;
    use std::env;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_overrides_apply() {
        let mut config = Config::default();
        let lookup = lookup_from(&[
            ("SERIAL_LINE_SERIAL_DEFAULT_BAUD", "4800"),
            ("SERIAL_LINE_SERIAL_DEFAULT_READ_CHUNK", "0"),
            ("SERIAL_LINE_SERIAL_PORT_NAMING", "/dev/ttyACM{n}"),
            ("SERIAL_LINE_SERIAL_SCAN_FIRST", "0"),
            ("SERIAL_LINE_LOGGING_FORMAT", "JSON"),
        ]);

        apply_overrides(&mut config, lookup).unwrap();
        assert_eq!(config.serial.default_baud, BaudRate::B4800);
        assert_eq!(config.serial.default_read_chunk, 0);
        assert_eq!(config.serial.port_naming, "/dev/ttyACM{n}");
        assert_eq!(config.serial.scan_first, 0);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_bad_override_is_reported() {
        let mut config = Config::default();
        let err = apply_overrides(
            &mut config,
            lookup_from(&[("SERIAL_LINE_SERIAL_DEFAULT_BAUD", "12345")]),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::EnvParseError { ref var, .. } if var == "SERIAL_LINE_SERIAL_DEFAULT_BAUD"));

        let err = apply_overrides(
            &mut config,
            lookup_from(&[("SERIAL_LINE_SERIAL_SCAN_COUNT", "70000")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("SERIAL_LINE_SERIAL_SCAN_COUNT"));
    }

    #[test]
    #[serial]
    fn test_env_override() {
        env::set_var("SERIAL_LINE_SERIAL_SCAN_COUNT", "9");

        let loader = ConfigLoader::with_defaults();
        assert_eq!(loader.config().serial.scan_count, 9);

        env::remove_var("SERIAL_LINE_SERIAL_SCAN_COUNT");
    }

    #[test]
    #[serial]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("serial-line.toml");

        let mut loader = ConfigLoader::with_defaults();
        loader.config_mut().serial.default_baud = BaudRate::B57600;
        loader.config_mut().serial.delimiter = b'\r';
        loader.save_to(&path).unwrap();

        let reloaded = ConfigLoader::load_from(&path).unwrap();
        assert_eq!(reloaded.config().serial.default_baud, BaudRate::B57600);
        assert_eq!(reloaded.config().serial.delimiter, b'\r');
        assert_eq!(reloaded.config_path.as_deref(), Some(path.as_path()));
    }

    #[test]
    #[serial]
    fn test_reload_picks_up_file_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("serial-line.toml");
        std::fs::write(&path, "[serial]\ndefault_baud = 4800\n").unwrap();

        let mut loader = ConfigLoader::load_from(&path).unwrap();
        assert_eq!(loader.config().serial.default_baud, BaudRate::B4800);

        std::fs::write(&path, "[serial]\ndefault_baud = 38400\nscan_first = 3\n").unwrap();
        loader.reload().unwrap();
        assert_eq!(loader.config().serial.default_baud, BaudRate::B38400);
        assert_eq!(loader.config().serial.scan_first, 3);

        // A file that no longer validates leaves the loaded values in place.
        std::fs::write(&path, "[serial]\nscan_count = 0\n").unwrap();
        assert!(loader.reload().is_err());
        assert_eq!(loader.config().serial.scan_first, 3);

        let mut detached = ConfigLoader::with_defaults();
        assert!(detached.reload().is_ok());
    }

    #[test]
    #[serial]
    fn test_load_from_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("serial-line.toml");
        std::fs::write(&path, "[serial]\nscan_count = 0\n").unwrap();

        let err = ConfigLoader::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            ConfigLoader::load_from(&missing),
            Err(ConfigError::ReadError { .. })
        ));
    }

    #[test]
    fn test_save_without_path() {
        let loader = ConfigLoader {
            config_path: None,
            config: Config::default(),
        };
        assert!(matches!(loader.save(), Err(ConfigError::NoPath)));
    }
}
