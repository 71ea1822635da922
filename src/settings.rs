use anyhow::{Context, Result};
use boltfall::LightningConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct Settings {
    pub(crate) fps_cap: u32,
    pub(crate) enable_color: bool,
    pub(crate) show_floor: bool,
    pub(crate) lightning: LightningConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps_cap: 30,
            enable_color: true,
            show_floor: false,
            lightning: LightningConfig::classic(),
        }
    }
}

pub(crate) fn default_settings_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from("com", "boltfall", "Boltfall")
        .context("could not resolve project directories")?;
    Ok(proj.config_dir().join("settings.json"))
}

/// Settings at `path`, or defaults when there is no file yet.
pub(crate) fn load_settings(path: &Path) -> Result<Settings> {
    if !path.exists() {
        log::info!("no settings at {}, using defaults", path.display());
        return Ok(Settings::default());
    }
    let s = fs::read_to_string(path)
        .with_context(|| format!("reading settings from {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&s)
        .with_context(|| format!("parsing settings in {}", path.display()))?;
    Ok(settings)
}

/// Like [`load_settings`] but falls back to defaults on a broken file.
pub(crate) fn load_settings_lenient(path: &Path) -> Settings {
    match load_settings(path) {
        Ok(s) => s,
        Err(e) => {
            log::warn!("{e:#}; falling back to defaults");
            Settings::default()
        }
    }
}

pub(crate) fn save_settings_atomic(path: &Path, s: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating settings directory {}", dir.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    let data = serde_json::to_vec_pretty(s)?;
    fs::write(&tmp, data).with_context(|| format!("writing {}", tmp.display()))?;
    atomic_rename(&tmp, path)?;
    Ok(())
}

fn atomic_rename(from: &Path, to: &Path) -> Result<()> {
    // rename-over-existing fails on Windows
    if to.exists() {
        let _ = fs::remove_file(to);
    }
    fs::rename(from, to)
        .with_context(|| format!("moving {} into place", to.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("boltfall-settings-{}-{name}", std::process::id()))
            .join("settings.json")
    }

    #[test]
    fn missing_file_means_defaults() {
        let path = scratch("missing");
        let s = load_settings(&path).unwrap();
        assert_eq!(s.fps_cap, 30);
        assert_eq!(s.lightning, LightningConfig::classic());
    }

    #[test]
    fn save_then_load() {
        let path = scratch("roundtrip");
        let mut s = Settings::default();
        s.show_floor = true;
        s.lightning = LightningConfig::storm();
        save_settings_atomic(&path, &s).unwrap();

        let back = load_settings(&path).unwrap();
        assert!(back.show_floor);
        assert_eq!(back.lightning, LightningConfig::storm());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn broken_file_is_an_error_unless_lenient() {
        let path = scratch("broken");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert!(load_settings(&path).is_err());
        assert_eq!(load_settings_lenient(&path).fps_cap, 30);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
