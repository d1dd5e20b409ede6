use anyhow::{bail, Context, Result};
use directories::{BaseDirs, ProjectDirs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const MIN_POLL_SECS: u64 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub remind: String,
    pub reminders_file: Option<PathBuf>,
    pub poll_interval_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            remind: "remind".into(),
            reminders_file: None,
            poll_interval_secs: 60,
        }
    }
}

impl Settings {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(MIN_POLL_SECS))
    }

    /// The configured reminders file, or `~/.reminders`.
    pub fn reminders_file(&self) -> Result<PathBuf> {
        match &self.reminders_file {
            Some(path) => Ok(expand_home(path)?),
            None => Ok(home_dir()?.join(".reminders")),
        }
    }
}

/// Reads settings from `explicit` when given, otherwise from the default
/// location. Only the default file is allowed to be missing.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                bail!("settings file {} does not exist", path.display());
            }
            read_settings(path)
        }
        None => match default_config_path() {
            Some(path) if path.exists() => read_settings(&path),
            _ => Ok(Settings::default()),
        },
    }
}

fn read_settings(path: &Path) -> Result<Settings> {
    let data = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    if data.trim().is_empty() {
        return Ok(Settings::default());
    }
    let settings: Settings =
        serde_yaml::from_str(&data).with_context(|| format!("parsing {:?}", path))?;
    Ok(settings)
}

pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join("config.yml"))
}

pub fn default_log_path() -> Result<PathBuf> {
    let dirs = project_dirs().context("locating data directory")?;
    Ok(dirs.data_dir().join("remcal.log"))
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", "remcal")
}

fn home_dir() -> Result<PathBuf> {
    let dirs = BaseDirs::new().context("locating home directory")?;
    Ok(dirs.home_dir().to_path_buf())
}

fn expand_home(path: &Path) -> Result<PathBuf> {
    match path.strip_prefix("~") {
        Ok(rest) => Ok(home_dir()?.join(rest)),
        Err(_) => Ok(path.to_path_buf()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "remind: /opt/bin/remind").unwrap();
        let settings = load_settings(Some(file.path())).unwrap();
        assert_eq!(settings.remind, "/opt/bin/remind");
        assert_eq!(settings.reminders_file, None);
        assert_eq!(settings.poll_interval(), Duration::from_secs(60));
    }

    #[test]
    fn empty_file_is_default() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert_eq!(load_settings(Some(file.path())).unwrap(), Settings::default());
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_settings(Some(&dir.path().join("nope.yml"))).is_err());
    }

    #[test]
    fn garbage_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "poll_interval_secs: [not, a, number]").unwrap();
        let err = load_settings(Some(file.path())).unwrap_err();
        assert!(format!("{err:#}").contains("parsing"));
    }

    #[test]
    fn poll_interval_has_a_floor() {
        let settings = Settings {
            poll_interval_secs: 0,
            ..Settings::default()
        };
        assert_eq!(settings.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn absolute_reminders_file_is_kept() {
        let settings = Settings {
            reminders_file: Some(PathBuf::from("/srv/cal/main.rem")),
            ..Settings::default()
        };
        assert_eq!(
            settings.reminders_file().unwrap(),
            PathBuf::from("/srv/cal/main.rem")
        );
    }
}
