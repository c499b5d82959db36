use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{
    cli::{Cli, CloudState, ThemeColor, ThemeMode},
    domain::{
        scene::ForcedScene,
        weather::{Location, Units},
    },
};

pub const CONFIG_DIR_ENV: &str = "WEATHER_PANE_CONFIG_DIR";
const SETTINGS_FILE: &str = "settings.json";
const LOCATION_FILE: &str = "location.json";
/// A resolved location is reused for this long before it is looked up again.
pub const LOCATION_TTL_SECS: i64 = 10 * 60;
const DEFAULT_REFRESH_SECS: u64 = 600;
const MIN_REFRESH_SECS: u64 = 60;

/// Preferences the user can change from the keyboard; persisted as JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    pub cloud_state: CloudState,
    pub background_scene: ForcedScene,
    pub theme_mode: ThemeMode,
    pub theme_color: ThemeColor,
    pub units: Units,
    pub refresh_interval_secs: u64,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            cloud_state: CloudState::On,
            background_scene: ForcedScene::Auto,
            theme_mode: ThemeMode::Auto,
            theme_color: ThemeColor::Blue,
            units: Units::Celsius,
            refresh_interval_secs: DEFAULT_REFRESH_SECS,
        }
    }
}

impl RuntimeSettings {
    #[must_use]
    pub fn from_cli_defaults(cli: &Cli) -> Self {
        Self {
            cloud_state: cli.cloud_state,
            background_scene: cli.scene,
            theme_mode: cli.theme_mode,
            theme_color: cli.theme_color,
            units: cli.units,
            refresh_interval_secs: cli.refresh_interval,
        }
    }

    /// Reads a saved settings file one key at a time, so an unrecognised value only resets
    /// its own setting. `None` when the content is not a JSON object.
    #[must_use]
    pub fn from_json(content: &str) -> Option<Self> {
        let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(content) else {
            return None;
        };
        let defaults = Self::default();
        let background_scene = match fields.get("background_scene") {
            Some(Value::String(name)) => {
                let scene = ForcedScene::parse_or_default(name);
                if scene == ForcedScene::Auto && !name.trim().eq_ignore_ascii_case("auto") {
                    warn!(value = %name, "unknown background scene; following the weather");
                }
                scene
            }
            Some(_) => setting(&fields, "background_scene").unwrap_or(defaults.background_scene),
            None => defaults.background_scene,
        };
        Some(Self {
            cloud_state: setting(&fields, "cloud_state").unwrap_or(defaults.cloud_state),
            background_scene,
            theme_mode: setting(&fields, "theme_mode").unwrap_or(defaults.theme_mode),
            theme_color: setting(&fields, "theme_color").unwrap_or(defaults.theme_color),
            units: setting(&fields, "units").unwrap_or(defaults.units),
            refresh_interval_secs: setting::<u64>(&fields, "refresh_interval_secs")
                .filter(|secs| *secs >= MIN_REFRESH_SECS)
                .unwrap_or(defaults.refresh_interval_secs),
        })
    }

    /// CLI values win over saved ones only where they differ from the CLI defaults.
    #[must_use]
    pub fn with_cli_overrides(mut self, cli: &Cli) -> Self {
        if cli.cloud_state != CloudState::On {
            self.cloud_state = cli.cloud_state;
        }
        if cli.scene != ForcedScene::Auto {
            self.background_scene = cli.scene;
        }
        if cli.theme_mode != ThemeMode::Auto {
            self.theme_mode = cli.theme_mode;
        }
        if cli.theme_color != ThemeColor::Blue {
            self.theme_color = cli.theme_color;
        }
        if cli.units != Units::Celsius {
            self.units = cli.units;
        }
        if cli.refresh_interval != DEFAULT_REFRESH_SECS {
            self.refresh_interval_secs = cli.refresh_interval;
        }
        self
    }
}

/// Loads saved settings merged under the CLI, and the path to save them back to.
pub fn load_runtime_settings(cli: &Cli, enable_disk: bool) -> (RuntimeSettings, Option<PathBuf>) {
    if !enable_disk {
        return (RuntimeSettings::from_cli_defaults(cli), None);
    }
    load_runtime_settings_from(cli, config_dir())
}

pub fn load_runtime_settings_from(
    cli: &Cli,
    dir: Option<PathBuf>,
) -> (RuntimeSettings, Option<PathBuf>) {
    let Some(dir) = dir else {
        return (RuntimeSettings::from_cli_defaults(cli), None);
    };
    let path = dir.join(SETTINGS_FILE);

    let saved = fs::read_to_string(&path).ok().and_then(|content| {
        let saved = RuntimeSettings::from_json(&content);
        if saved.is_none() {
            warn!(path = %path.display(), "ignoring unreadable settings file");
        }
        saved
    });
    let settings = saved.map_or_else(
        || RuntimeSettings::from_cli_defaults(cli),
        |saved| saved.with_cli_overrides(cli),
    );
    (settings, Some(path))
}

fn setting<T: DeserializeOwned>(fields: &Map<String, Value>, key: &str) -> Option<T> {
    let value = fields.get(key)?;
    match T::deserialize(value) {
        Ok(parsed) => Some(parsed),
        Err(err) => {
            warn!(key, %err, "ignoring unreadable setting");
            None
        }
    }
}

pub fn save_runtime_settings(path: &Path, settings: &RuntimeSettings) -> anyhow::Result<()> {
    write_json(path, settings)?;
    debug!(path = %path.display(), "settings saved");
    Ok(())
}

/// Last resolved location, reused across restarts for [`LOCATION_TTL_SECS`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationCacheEntry {
    pub lat: f64,
    pub lon: f64,
    pub place: String,
    pub saved_at: DateTime<Utc>,
}

impl LocationCacheEntry {
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now - self.saved_at <= Duration::seconds(LOCATION_TTL_SECS)
    }

    #[must_use]
    pub fn from_location(location: &Location, saved_at: DateTime<Utc>) -> Self {
        Self {
            lat: location.latitude,
            lon: location.longitude,
            place: location.name.clone(),
            saved_at,
        }
    }

    #[must_use]
    pub fn to_location(&self) -> Location {
        Location {
            name: self.place.clone(),
            ..Location::from_coords(self.lat, self.lon)
        }
    }
}

#[must_use]
pub fn location_cache_path(settings_path: &Path) -> PathBuf {
    settings_path.with_file_name(LOCATION_FILE)
}

/// Fresh cached location, if any; stale or unreadable files are removed.
#[must_use]
pub fn load_cached_location(path: &Path, now: DateTime<Utc>) -> Option<LocationCacheEntry> {
    let content = fs::read_to_string(path).ok()?;
    let entry = serde_json::from_str::<LocationCacheEntry>(&content)
        .ok()
        .filter(|entry| entry.is_fresh(now));
    if entry.is_none() {
        debug!(path = %path.display(), "discarding cached location");
        let _ = fs::remove_file(path);
    }
    entry
}

pub fn save_cached_location(path: &Path, entry: &LocationCacheEntry) -> anyhow::Result<()> {
    write_json(path, entry)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("creating settings directory failed")?;
    }
    let payload = serde_json::to_string_pretty(value).context("serializing settings payload failed")?;
    fs::write(path, payload).with_context(|| format!("writing {} failed", path.display()))
}

#[must_use]
pub fn config_dir() -> Option<PathBuf> {
    config_dir_from(std::env::var_os(CONFIG_DIR_ENV), std::env::var_os("HOME"))
}

fn config_dir_from(override_dir: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    if let Some(base) = override_dir.filter(|dir| !dir.is_empty()) {
        return Some(PathBuf::from(base));
    }
    Some(PathBuf::from(home?).join(".config").join("weather-pane"))
}
