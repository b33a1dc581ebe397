//! Configuration file management for the squitter CLI.
//!
//! Reads/writes `~/.squitter/config.yaml`. The only section is `receiver`,
//! whose position is the default origin for `squitter distance`.

use std::path::{Path, PathBuf};

use squitter_core::Position;

use crate::error::CliError;

/// Full configuration structure.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub receiver: ReceiverConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReceiverConfig {
    pub name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub alt_ft: Option<f64>,
}

impl ReceiverConfig {
    /// Receiver location, if both latitude and longitude are configured.
    pub fn position(&self) -> Option<Position> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Position::from_parts(Some(lon), Some(lat), self.alt_ft)),
            _ => None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            receiver: ReceiverConfig {
                name: "default".into(),
                lat: None,
                lon: None,
                alt_ft: None,
            },
        }
    }
}

/// Default config file path (`~/.squitter/config.yaml`).
pub fn default_config_file() -> PathBuf {
    dirs_home().join(".squitter").join("config.yaml")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Load config from `path`.
///
/// Returns default config if the file doesn't exist or can't be read.
pub fn load_config(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }

    match std::fs::read_to_string(path) {
        Ok(text) => parse_config(&text),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unreadable config, using defaults");
            Config::default()
        }
    }
}

/// Save config to `path`, creating parent directories.
pub fn save_config(config: &Config, path: &Path) -> Result<(), CliError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, serialize_config(config))?;
    Ok(())
}

/// Parse simple YAML-like config text. Unknown keys are ignored.
fn parse_config(text: &str) -> Config {
    let mut config = Config::default();
    let mut current_section: Option<&str> = None;

    for line in text.lines() {
        let stripped = line.trim();
        if stripped.is_empty() || stripped.starts_with('#') {
            continue;
        }

        let is_indented = line.starts_with("  ") || line.starts_with('\t');

        let Some((key, val)) = stripped.split_once(':') else {
            continue;
        };
        let key = key.trim();
        let val = val.trim();

        if !is_indented {
            current_section = if val.is_empty() { Some(key) } else { None };
            continue;
        }

        if current_section == Some("receiver") {
            match key {
                "name" => {
                    if let Some(v) = parse_string_value(val) {
                        config.receiver.name = v;
                    }
                }
                "lat" => config.receiver.lat = parse_float_value(val),
                "lon" => config.receiver.lon = parse_float_value(val),
                "alt_ft" => config.receiver.alt_ft = parse_float_value(val),
                _ => {}
            }
        }
    }

    config
}

fn parse_string_value(val: &str) -> Option<String> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    if (val.starts_with('"') && val.ends_with('"') && val.len() >= 2)
        || (val.starts_with('\'') && val.ends_with('\'') && val.len() >= 2)
    {
        return Some(val[1..val.len() - 1].to_string());
    }
    Some(val.to_string())
}

fn parse_float_value(val: &str) -> Option<f64> {
    if val == "null" || val == "~" || val.is_empty() {
        return None;
    }
    val.parse().ok()
}

fn optional_line(key: &str, val: Option<f64>) -> String {
    match val {
        Some(v) => format!("  {key}: {v}"),
        None => format!("  {key}: null"),
    }
}

/// Serialize config to YAML-like text.
fn serialize_config(config: &Config) -> String {
    let lines = [
        "# squitter configuration".to_string(),
        String::new(),
        "receiver:".into(),
        format!("  name: \"{}\"", config.receiver.name),
        optional_line("lat", config.receiver.lat),
        optional_line("lon", config.receiver.lon),
        optional_line("alt_ft", config.receiver.alt_ft),
    ];
    lines.join("\n") + "\n"
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.receiver.name, "default");
        assert!(config.receiver.position().is_none());
    }

    #[test]
    fn test_parse_config() {
        let text = r#"
receiver:
  name: "mystation"
  lat: 35.5
  lon: -82.5
  alt_ft: 2100

other:
  lat: 1.0
"#;
        let config = parse_config(text);
        assert_eq!(config.receiver.name, "mystation");
        assert_eq!(config.receiver.lat, Some(35.5));
        assert_eq!(config.receiver.lon, Some(-82.5));
        assert_eq!(config.receiver.alt_ft, Some(2100.0));

        let pos = config.receiver.position().unwrap();
        assert_eq!(pos.longitude(), Some(-82.5));
        assert_eq!(pos.latitude(), Some(35.5));
        assert_eq!(pos.altitude(), Some(2100.0));
    }

    #[test]
    fn test_parse_config_null_values() {
        let text = r#"
receiver:
  name: 'test'
  lat: null
  lon: ~
"#;
        let config = parse_config(text);
        assert_eq!(config.receiver.name, "test");
        assert!(config.receiver.lat.is_none());
        assert!(config.receiver.lon.is_none());
        assert!(config.receiver.alt_ft.is_none());
    }

    #[test]
    fn test_position_without_altitude() {
        let receiver = ReceiverConfig {
            name: "r".into(),
            lat: Some(52.0),
            lon: Some(13.0),
            alt_ft: None,
        };
        let pos = receiver.position().unwrap();
        assert!(pos.altitude().is_none());
        assert!(pos.has_horizontal());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let config = Config {
            receiver: ReceiverConfig {
                name: "test".into(),
                lat: Some(35.5),
                lon: Some(-82.5),
                alt_ft: None,
            },
        };
        save_config(&config, &path).unwrap();
        assert_eq!(load_config(&path), config);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("absent.yaml"));
        assert_eq!(config, Config::default());
    }
}
