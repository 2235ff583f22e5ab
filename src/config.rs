// Configuration loaded from the rc file (~/.cosboard/rc)
//
// The rc file is a list of `key=value` lines. Unknown keys and `#` comments
// are ignored so older binaries keep working with newer files.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Default address the live server listens on and clients connect to
pub const DEFAULT_LISTEN: &str = "127.0.0.1:7878";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Path of the SQLite roster database
    pub data_location: PathBuf,
    /// Address for `serve` to bind and for `toggle`/`watch` to connect to
    pub listen: String,
    /// Require an admin key on every toggle intent arriving over the live channel
    pub require_key: bool,
}

impl Config {
    /// Directory holding the rc file and the default database
    pub fn base_dir() -> Result<PathBuf> {
        let home = std::env::var_os("HOME")
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
            .context("Failed to determine home directory")?;
        Ok(home.join(".cosboard"))
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("rc"))
    }

    /// Get the default database path
    pub fn default_data_location() -> Result<PathBuf> {
        Ok(Self::base_dir()?.join("roster.db"))
    }

    /// Load the configuration from the rc file, falling back to defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        let defaults = Config {
            data_location: Self::default_data_location()?,
            listen: DEFAULT_LISTEN.to_string(),
            require_key: false,
        };

        if !config_path.exists() {
            return Ok(defaults);
        }

        let contents = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
        Self::parse(&contents, &config_path, defaults)
    }

    /// Apply rc file contents on top of `defaults`.
    ///
    /// Relative `data.location` paths resolve against the directory of the rc file.
    pub fn parse(contents: &str, config_path: &Path, defaults: Config) -> Result<Self> {
        let mut config = defaults;

        for (line_no, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                log::warn!("Ignoring malformed config line {}: {}", line_no + 1, line);
                continue;
            };
            let value = value.trim();

            match key.trim() {
                "data.location" => {
                    let path = PathBuf::from(value);
                    config.data_location = if path.is_relative() {
                        config_path
                            .parent()
                            .map(|dir| dir.join(&path))
                            .unwrap_or(path)
                    } else {
                        path
                    };
                }
                "live.listen" => config.listen = value.to_string(),
                "live.require_key" => {
                    config.require_key = parse_bool(value).with_context(|| {
                        format!("Invalid value for live.require_key on line {}", line_no + 1)
                    })?;
                }
                other => log::debug!("Ignoring unknown config key '{}'", other),
            }
        }

        Ok(config)
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => anyhow::bail!("expected true or false, got '{}'", value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Config {
        Config {
            data_location: PathBuf::from("/home/test/.cosboard/roster.db"),
            listen: DEFAULT_LISTEN.to_string(),
            require_key: false,
        }
    }

    #[test]
    fn test_empty_file_keeps_defaults() {
        let config = Config::parse("", Path::new("/home/test/.cosboard/rc"), defaults()).unwrap();
        assert_eq!(config, defaults());
    }

    #[test]
    fn test_relative_data_location_resolves_against_rc_dir() {
        let config = Config::parse(
            "data.location=./show.db\n",
            Path::new("/home/test/.cosboard/rc"),
            defaults(),
        )
        .unwrap();
        assert_eq!(config.data_location, PathBuf::from("/home/test/.cosboard/./show.db"));
    }

    #[test]
    fn test_absolute_data_location() {
        let config = Config::parse(
            "data.location=/srv/con/roster.db",
            Path::new("/home/test/.cosboard/rc"),
            defaults(),
        )
        .unwrap();
        assert_eq!(config.data_location, PathBuf::from("/srv/con/roster.db"));
    }

    #[test]
    fn test_live_settings() {
        let config = Config::parse(
            "# stage laptop\nlive.listen = 0.0.0.0:9000\nlive.require_key = yes\nunknown=1\n",
            Path::new("/home/test/.cosboard/rc"),
            defaults(),
        )
        .unwrap();
        assert_eq!(config.listen, "0.0.0.0:9000");
        assert!(config.require_key);
    }

    #[test]
    fn test_invalid_bool_is_rejected() {
        let result = Config::parse(
            "live.require_key=sometimes",
            Path::new("/home/test/.cosboard/rc"),
            defaults(),
        );
        assert!(result.is_err());
    }
}
