//! Runtime configuration.
//!
//! Sources are layered with [`figment`], later ones winning:
//!
//! 1. built-in defaults ([`Config::default`]),
//! 2. a TOML file: the one given explicitly, else `camdrop.toml` in the
//!    working directory, else `camdrop.toml` in the platform config directory,
//! 3. `CAMDROP_`-prefixed environment variables (`CAMDROP_KEEP_DAYS=7`),
//! 4. command-line [`Overrides`].

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::num::{NonZeroU32, NonZeroU64};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name looked up when no configuration file is given explicitly.
pub const CONFIG_FILE: &str = "camdrop.toml";
/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "CAMDROP_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage root: uploads land here and are organized beneath it.
    pub video_dir: PathBuf,
    /// Directory holding `ftp_server.log`.
    pub log_dir: PathBuf,
    /// Files older than this many days are deleted by the retention sweep.
    pub keep_days: NonZeroU32,
    /// Pause between maintenance cycles.
    pub sweep_interval_secs: NonZeroU64,
    /// Location of the index. Defaults to `video_database.txt` at the top of
    /// `video_dir`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_file: Option<PathBuf>,
}
impl Default for Config {
    fn default() -> Self {
        Self {
            video_dir: PathBuf::from("dahua_videos"),
            log_dir: PathBuf::from("logs"),
            keep_days: NonZeroU32::new(3).unwrap_or(NonZeroU32::MIN),
            sweep_interval_secs: NonZeroU64::new(300).unwrap_or(NonZeroU64::MIN),
            index_file: None,
        }
    }
}

/// Values given on the command line. Unset fields leave the lower layers
/// alone.
#[derive(Debug, Default, Clone, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_days: Option<u32>,
}

impl Config {
    /// Loads and validates the configuration from every layer.
    ///
    /// # Errors
    /// [`ErrorKind::Missing`] if `file` is given but does not exist,
    /// [`ErrorKind::Parse`] if a layer holds a value of the wrong type
    /// (including zero for `keep_days` or `sweep_interval_secs`), and
    /// [`ErrorKind::Invalid`] if [`validate`](Self::validate) fails.
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        Self::from_figment(Self::figment(file)?.merge(Serialized::defaults(overrides)))
    }

    /// Defaults, configuration file and environment, without command-line
    /// overrides.
    pub fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));
        let file = match file {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::Missing(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => discover(),
        };
        if let Some(path) = file {
            tracing::debug!(path = %path.display(), "Reading configuration file");
            figment = figment.merge(Toml::file_exact(path));
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks what the types alone cannot.
    pub fn validate(&self) -> Result<()> {
        if self.video_dir.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("video_dir must not be empty".to_string()));
        }
        if self.log_dir.as_os_str().is_empty() {
            exn::bail!(ErrorKind::Invalid("log_dir must not be empty".to_string()));
        }
        if self.index_file.as_ref().is_some_and(|path| path.as_os_str().is_empty()) {
            exn::bail!(ErrorKind::Invalid("index_file must not be empty when set".to_string()));
        }
        Ok(())
    }

    /// Makes every relative path absolute against `base`.
    pub fn resolve(mut self, base: &Path) -> Self {
        self.video_dir = base.join(&self.video_dir);
        self.log_dir = base.join(&self.log_dir);
        self.index_file = self.index_file.map(|path| base.join(path));
        self
    }

    /// [`resolve`](Self::resolve) against the current working directory.
    pub fn resolve_from_cwd(self) -> Result<Self> {
        let cwd = std::env::current_dir().or_raise(|| ErrorKind::WorkingDirectory)?;
        Ok(self.resolve(&cwd))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.get())
    }
}

fn discover() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }
    ProjectDirs::from("", "", "camdrop")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
        .filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    fn toml_file(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn defaults() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_figment(defaults()).unwrap();
        assert_eq!(config.video_dir, Path::new("dahua_videos"));
        assert_eq!(config.log_dir, Path::new("logs"));
        assert_eq!(config.keep_days.get(), 3);
        assert_eq!(config.sweep_interval(), Duration::from_secs(300));
        assert_eq!(config.index_file, None);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = toml_file("video_dir = \"/srv/cameras\"\nkeep_days = 7\nindex_file = \"/var/lib/camdrop/index.txt\"\n");
        let config = Config::from_figment(defaults().merge(Toml::file_exact(file.path()))).unwrap();
        assert_eq!(config.video_dir, Path::new("/srv/cameras"));
        assert_eq!(config.keep_days.get(), 7);
        assert_eq!(config.index_file.as_deref(), Some(Path::new("/var/lib/camdrop/index.txt")));
        assert_eq!(config.log_dir, Path::new("logs"));
    }

    #[test]
    fn test_overrides_beat_file() {
        let file = toml_file("keep_days = 7\nlog_dir = \"/var/log/camdrop\"\n");
        let overrides = Overrides {
            keep_days: Some(1),
            ..Overrides::default()
        };
        let figment = defaults().merge(Toml::file_exact(file.path())).merge(Serialized::defaults(&overrides));
        let config = Config::from_figment(figment).unwrap();
        assert_eq!(config.keep_days.get(), 1);
        assert_eq!(config.log_dir, Path::new("/var/log/camdrop"));
    }

    #[test]
    fn test_load_explicit_file() {
        let file = toml_file("sweep_interval_secs = 60\n");
        let config = Config::load(Some(file.path()), &Overrides::default()).unwrap();
        assert_eq!(config.sweep_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_missing_explicit_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&temp_dir.path().join("nope.toml")), &Overrides::default()).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Missing(_)));
    }

    #[rstest]
    #[case("keep_days = 0")]
    #[case("keep_days = -1")]
    #[case("sweep_interval_secs = 0")]
    fn test_unparsable_values(#[case] content: &str) {
        let file = toml_file(content);
        let err = Config::from_figment(defaults().merge(Toml::file_exact(file.path()))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Parse));
    }

    #[rstest]
    #[case("video_dir = \"\"")]
    #[case("log_dir = \"\"")]
    #[case("index_file = \"\"")]
    fn test_invalid_values(#[case] content: &str) {
        let file = toml_file(content);
        let err = Config::from_figment(defaults().merge(Toml::file_exact(file.path()))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)));
    }

    #[test]
    fn test_zero_keep_days_override_is_rejected() {
        let overrides = Overrides {
            keep_days: Some(0),
            ..Overrides::default()
        };
        let err = Config::from_figment(defaults().merge(Serialized::defaults(&overrides))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Parse));
    }

    #[test]
    fn test_resolve() {
        let config = Config {
            video_dir: PathBuf::from("dahua_videos"),
            log_dir: PathBuf::from("/var/log/camdrop"),
            index_file: Some(PathBuf::from("state/index.txt")),
            ..Config::default()
        }
        .resolve(Path::new("/srv"));
        assert_eq!(config.video_dir, Path::new("/srv/dahua_videos"));
        assert_eq!(config.log_dir, Path::new("/var/log/camdrop"));
        assert_eq!(config.index_file.as_deref(), Some(Path::new("/srv/state/index.txt")));
    }
}
