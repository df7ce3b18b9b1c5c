use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Environment variable naming the ambient timezone.
pub const TIMEZONE_ENV: &str = "TZPRO_TIMEZONE";

const FALLBACK_TIMEZONE: &str = "UTC";

#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// The user's own timezone; custom times are entered in it.
    pub timezone: Option<String>,
    #[serde(default)]
    pub store: StoreConfig,
}

#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct StoreConfig {
    pub path: Option<PathBuf>,
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("tzpro").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Config::default(),
    }
}

/// Reads a config file, falling back to defaults when it is missing or invalid.
pub fn load_config_from(path: &Path) -> Config {
    let Ok(content) = std::fs::read_to_string(path) else {
        return Config::default();
    };

    match toml::from_str(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "ignoring invalid config file");
            Config::default()
        }
    }
}

pub fn default_store_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tzpro")
        .join("store")
}

pub fn resolve_store_path(cli_path: Option<PathBuf>, config: &Config) -> PathBuf {
    cli_path
        .or_else(|| config.store.path.clone())
        .unwrap_or_else(default_store_path)
}

/// Picks the ambient timezone: CLI flag, then environment, then config file,
/// then the system zone, then UTC.
pub fn resolve_timezone(cli_timezone: Option<String>, config: &Config) -> String {
    let env = std::env::var(TIMEZONE_ENV).ok();
    let system = match iana_time_zone::get_timezone() {
        Ok(tz) => Some(tz),
        Err(err) => {
            tracing::debug!(%err, "cannot detect system timezone");
            None
        }
    };
    pick_timezone([cli_timezone, env, config.timezone.clone(), system])
}

fn pick_timezone(candidates: [Option<String>; 4]) -> String {
    candidates
        .into_iter()
        .flatten()
        .map(|tz| tz.trim().to_string())
        .find(|tz| !tz.is_empty())
        .unwrap_or_else(|| FALLBACK_TIMEZONE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_full_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "timezone = \"Europe/Warsaw\"\n\n[store]\npath = \"/tmp/tzpro\"\n",
        )
        .unwrap();

        let config = load_config_from(&path);
        assert_eq!(config.timezone.as_deref(), Some("Europe/Warsaw"));
        assert_eq!(config.store.path, Some(PathBuf::from("/tmp/tzpro")));
    }

    #[test]
    fn missing_or_invalid_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        assert_eq!(load_config_from(&dir.path().join("absent.toml")), Config::default());

        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "timezone = [").unwrap();
        assert_eq!(load_config_from(&path), Config::default());
    }

    #[test]
    fn store_path_precedence() {
        let config = Config {
            timezone: None,
            store: StoreConfig {
                path: Some(PathBuf::from("/from/config")),
            },
        };
        assert_eq!(
            resolve_store_path(Some(PathBuf::from("/from/cli")), &config),
            PathBuf::from("/from/cli")
        );
        assert_eq!(resolve_store_path(None, &config), PathBuf::from("/from/config"));
        assert_eq!(resolve_store_path(None, &Config::default()), default_store_path());
    }

    #[test]
    fn timezone_precedence() {
        let some = |s: &str| Some(s.to_string());
        assert_eq!(
            pick_timezone([some("Asia/Tokyo"), some("Europe/Paris"), None, some("UTC")]),
            "Asia/Tokyo"
        );
        assert_eq!(
            pick_timezone([None, some(" "), some("Europe/Paris"), some("Asia/Dubai")]),
            "Europe/Paris"
        );
        assert_eq!(pick_timezone([None, None, None, some("Asia/Dubai")]), "Asia/Dubai");
        assert_eq!(pick_timezone([None, None, None, None]), "UTC");
    }
}
