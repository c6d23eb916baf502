use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Longest watch window the API server accepts
const MAX_WATCH_TIMEOUT_SECS: u32 = 290;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid settings {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("watch_timeout_secs must be between 1 and {MAX_WATCH_TIMEOUT_SECS}, got {0}")]
    WatchTimeout(u32),

    #[error("tail_lines must not be negative, got {0}")]
    TailLines(i64),

    #[error("tick_ms must be positive")]
    TickRate,

    #[error("scroll_lines must be positive")]
    ScrollLines,
}

/// User settings, loaded once at startup
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Kubeconfig to read and write; see [`Settings::kubeconfig_path`]
    pub kubeconfig: Option<PathBuf>,

    /// Historical lines fetched when a log view opens
    pub tail_lines: i64,

    /// Length of each upstream watch window
    pub watch_timeout_secs: u32,

    /// UI tick rate in milliseconds
    pub tick_ms: u64,

    /// Log lines moved per mouse wheel notch
    pub scroll_lines: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            kubeconfig: None,
            tail_lines: 50,
            watch_timeout_secs: 5,
            tick_ms: 250,
            scroll_lines: 50,
        }
    }
}

impl Settings {
    /// `<config dir>/kubedeck/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("kubedeck").join("config.toml"))
    }

    /// Load settings from `path`, or from the default location.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => match Self::default_path() {
                Some(path) => (path, false),
                None => return Ok(Self::default()),
            },
        };

        match fs::read_to_string(&path) {
            Ok(text) => Self::parse(&text, &path),
            Err(err) if err.kind() == io::ErrorKind::NotFound && !required => Ok(Self::default()),
            Err(source) => Err(SettingsError::Read { path, source }),
        }
    }

    fn parse(text: &str, path: &Path) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(text).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the rest of the program cannot work with
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(1..=MAX_WATCH_TIMEOUT_SECS).contains(&self.watch_timeout_secs) {
            return Err(SettingsError::WatchTimeout(self.watch_timeout_secs));
        }
        if self.tail_lines < 0 {
            return Err(SettingsError::TailLines(self.tail_lines));
        }
        if self.tick_ms == 0 {
            return Err(SettingsError::TickRate);
        }
        if self.scroll_lines == 0 {
            return Err(SettingsError::ScrollLines);
        }
        Ok(())
    }

    /// The configured kubeconfig, else the first `$KUBECONFIG` entry, else
    /// `~/.kube/config`
    pub fn kubeconfig_path(&self) -> Option<PathBuf> {
        self.kubeconfig
            .clone()
            .or_else(|| {
                env::var_os("KUBECONFIG")
                    .and_then(|paths| env::split_paths(&paths).find(|p| !p.as_os_str().is_empty()))
            })
            .or_else(|| dirs::home_dir().map(|home| home.join(".kube").join("config")))
    }

    pub fn tick_rate(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.tail_lines, 50);
        assert_eq!(settings.watch_timeout_secs, 5);
        assert_eq!(settings.tick_rate(), Duration::from_millis(250));
        assert_eq!(settings.scroll_lines, 50);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "tail_lines = 200\nkubeconfig = \"/tmp/kc\"\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.tail_lines, 200);
        assert_eq!(settings.watch_timeout_secs, 5);
        assert_eq!(settings.kubeconfig_path(), Some(PathBuf::from("/tmp/kc")));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Settings::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, SettingsError::Read { .. }));
    }

    #[test]
    fn test_rejects_bad_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        fs::write(&path, "watch_timeout_secs = 600\n").unwrap();
        assert!(matches!(
            Settings::load(Some(&path)),
            Err(SettingsError::WatchTimeout(600))
        ));

        fs::write(&path, "tail_lines = \"lots\"\n").unwrap();
        assert!(matches!(
            Settings::load(Some(&path)),
            Err(SettingsError::Parse { .. })
        ));

        fs::write(&path, "scroll_lines = 0\n").unwrap();
        assert!(matches!(
            Settings::load(Some(&path)),
            Err(SettingsError::ScrollLines)
        ));

        fs::write(&path, "colour = \"blue\"\n").unwrap();
        assert!(matches!(
            Settings::load(Some(&path)),
            Err(SettingsError::Parse { .. })
        ));
    }
}
