use chrono::{DateTime, FixedOffset, Timelike, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::domain::{
    solar::SolarContext,
    weather::{ConditionFamily, WeatherSnapshot, condition_family},
};

pub const MAX_INTENSITY: f32 = 1.4;

/// Renderer kinds the backdrop can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SceneId {
    ClearDay,
    Cloudy,
    Rain,
    Storm,
    NightClear,
}

impl SceneId {
    pub const ALL: [Self; 5] = [
        Self::ClearDay,
        Self::Cloudy,
        Self::Rain,
        Self::Storm,
        Self::NightClear,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClearDay => "clear-day",
            Self::Cloudy => "cloudy",
            Self::Rain => "rain",
            Self::Storm => "storm",
            Self::NightClear => "night-clear",
        }
    }

    #[must_use]
    pub fn is_precipitation(self) -> bool {
        matches!(self, Self::Rain | Self::Storm)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    #[default]
    Rain,
    Snow,
    NightRain,
}

/// Resolved light/dark theme the renderers tint for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ForcedScene {
    #[default]
    Auto,
    Clear,
    PartlyCloudy,
    Cloudy,
    MostlyCloudy,
    Overcast,
    Rain,
    Storm,
    Snow,
    Night,
}

/// Fixed field values a pinned background scene forces onto the context.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenePreset {
    pub scene_id: SceneId,
    pub variant: Variant,
    pub intensity: f32,
    pub cloud_cover: f32,
    pub is_night: bool,
}

impl ForcedScene {
    pub const ALL: [Self; 10] = [
        Self::Auto,
        Self::Clear,
        Self::PartlyCloudy,
        Self::Cloudy,
        Self::MostlyCloudy,
        Self::Overcast,
        Self::Rain,
        Self::Storm,
        Self::Snow,
        Self::Night,
    ];

    /// Name used in the settings file and on the command line.
    #[must_use]
    pub fn key(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Clear => "clear",
            Self::PartlyCloudy => "partly-cloudy",
            Self::Cloudy => "cloudy",
            Self::MostlyCloudy => "mostly-cloudy",
            Self::Overcast => "overcast",
            Self::Rain => "rain",
            Self::Storm => "storm",
            Self::Snow => "snow",
            Self::Night => "night",
        }
    }

    /// Unrecognised names fall back to following the weather.
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|scene| scene.key().eq_ignore_ascii_case(value.trim()))
            .unwrap_or(Self::Auto)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::Clear => "Clear",
            Self::PartlyCloudy => "Partly cloudy",
            Self::Cloudy => "Cloudy",
            Self::MostlyCloudy => "Mostly cloudy",
            Self::Overcast => "Overcast",
            Self::Rain => "Rain",
            Self::Storm => "Storm",
            Self::Snow => "Snow",
            Self::Night => "Night",
        }
    }

    #[must_use]
    pub fn preset(self) -> Option<ScenePreset> {
        let preset = |scene_id, variant, intensity, cloud_cover, is_night| ScenePreset {
            scene_id,
            variant,
            intensity,
            cloud_cover,
            is_night,
        };
        match self {
            Self::Auto => None,
            Self::Clear => Some(preset(SceneId::ClearDay, Variant::Rain, 0.45, 5.0, false)),
            Self::PartlyCloudy => Some(preset(SceneId::Cloudy, Variant::Rain, 0.75, 30.0, false)),
            Self::Cloudy => Some(preset(SceneId::Cloudy, Variant::Rain, 0.8, 55.0, false)),
            Self::MostlyCloudy => Some(preset(SceneId::Cloudy, Variant::Rain, 0.85, 75.0, false)),
            Self::Overcast => Some(preset(SceneId::Cloudy, Variant::Rain, 0.95, 95.0, false)),
            Self::Rain => Some(preset(SceneId::Rain, Variant::Rain, 0.9, 90.0, false)),
            Self::Storm => Some(preset(SceneId::Storm, Variant::Rain, 1.0, 95.0, false)),
            Self::Snow => Some(preset(SceneId::Rain, Variant::Snow, 0.85, 85.0, false)),
            Self::Night => Some(preset(SceneId::NightClear, Variant::Rain, 0.6, 10.0, true)),
        }
    }

    #[must_use]
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    #[must_use]
    pub fn previous(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// What the active renderer should draw. Built fresh on every refresh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneContext {
    pub scene_id: SceneId,
    pub variant: Variant,
    pub intensity: f32,
    pub cloud_cover: f32,
    pub is_night: bool,
    pub forced_scene: ForcedScene,
    pub theme: Theme,
}

impl Default for SceneContext {
    fn default() -> Self {
        Self {
            scene_id: SceneId::Cloudy,
            variant: Variant::Rain,
            intensity: 0.3,
            cloud_cover: 0.0,
            is_night: false,
            forced_scene: ForcedScene::Auto,
            theme: Theme::Dark,
        }
    }
}

/// Partial update merged into a retained [`SceneContext`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ContextPatch {
    pub scene_id: Option<SceneId>,
    pub variant: Option<Variant>,
    pub intensity: Option<f32>,
    pub cloud_cover: Option<f32>,
    pub is_night: Option<bool>,
    pub forced_scene: Option<ForcedScene>,
    pub theme: Option<Theme>,
}

impl From<SceneContext> for ContextPatch {
    fn from(ctx: SceneContext) -> Self {
        Self {
            scene_id: Some(ctx.scene_id),
            variant: Some(ctx.variant),
            intensity: Some(ctx.intensity),
            cloud_cover: Some(ctx.cloud_cover),
            is_night: Some(ctx.is_night),
            forced_scene: Some(ctx.forced_scene),
            theme: Some(ctx.theme),
        }
    }
}

fn clamp_finite(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

impl SceneContext {
    /// Intensity within `0..=1.4`, cloud cover within `0..=100`; non-finite values reset.
    #[must_use]
    pub fn clamped(mut self) -> Self {
        self.intensity = clamp_finite(self.intensity, 0.0, MAX_INTENSITY, 0.3);
        self.cloud_cover = clamp_finite(self.cloud_cover, 0.0, 100.0, 0.0);
        self
    }

    #[must_use]
    pub fn merge(mut self, patch: ContextPatch) -> Self {
        if let Some(scene_id) = patch.scene_id {
            self.scene_id = scene_id;
        }
        if let Some(variant) = patch.variant {
            self.variant = variant;
        }
        if let Some(intensity) = patch.intensity {
            self.intensity = intensity;
        }
        if let Some(cloud_cover) = patch.cloud_cover {
            self.cloud_cover = cloud_cover;
        }
        if let Some(is_night) = patch.is_night {
            self.is_night = is_night;
        }
        if let Some(forced_scene) = patch.forced_scene {
            self.forced_scene = forced_scene;
        }
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        self.clamped()
    }
}

/// Picks the scene for the given conditions. Rules are checked in order and the first
/// match chooses the scene; at night everything but rain and storm becomes the starry sky.
#[must_use]
pub fn compute_scene_context(
    is_night: bool,
    cloud_cover: Option<f32>,
    weather_code: Option<u8>,
) -> SceneContext {
    let cloud_cover = cloud_cover
        .filter(|c| c.is_finite())
        .unwrap_or(0.0)
        .clamp(0.0, 100.0);
    let mut scene_id = if is_night {
        SceneId::NightClear
    } else {
        SceneId::ClearDay
    };
    let mut variant = Variant::Rain;
    let mut intensity = (cloud_cover / 100.0).max(0.3);

    match weather_code.map(condition_family) {
        Some(ConditionFamily::Snow) => {
            scene_id = SceneId::Rain;
            variant = Variant::Snow;
            intensity = 0.7;
        }
        Some(family @ (ConditionFamily::Rain | ConditionFamily::HeavyRain)) => {
            let heavy = family == ConditionFamily::HeavyRain;
            scene_id = if heavy { SceneId::Storm } else { SceneId::Rain };
            variant = if is_night {
                Variant::NightRain
            } else {
                Variant::Rain
            };
            intensity = if heavy { 1.0 } else { 0.65 };
        }
        Some(ConditionFamily::Fog) => {
            scene_id = SceneId::Cloudy;
            intensity = 0.9;
        }
        Some(family) if family == ConditionFamily::Cloudy || cloud_cover > 55.0 => {
            scene_id = SceneId::Cloudy;
            intensity = intensity.max(0.75);
        }
        Some(ConditionFamily::Clear) => {
            intensity = if is_night { 0.5 } else { 0.4 };
        }
        Some(_) => {}
        None if cloud_cover > 60.0 => {
            scene_id = SceneId::Cloudy;
            intensity = intensity.max(0.8);
        }
        None => {}
    }

    if is_night && !scene_id.is_precipitation() {
        scene_id = SceneId::NightClear;
    }

    SceneContext {
        scene_id,
        variant,
        intensity,
        cloud_cover,
        is_night,
        ..SceneContext::default()
    }
    .clamped()
}

/// Replaces every computed field with the preset's values and tags the context.
#[must_use]
pub fn apply_forced_scene(context: SceneContext, forced: ForcedScene) -> SceneContext {
    let Some(preset) = forced.preset() else {
        return SceneContext {
            forced_scene: ForcedScene::Auto,
            ..context
        };
    };
    SceneContext {
        scene_id: preset.scene_id,
        variant: preset.variant,
        intensity: preset.intensity,
        cloud_cover: preset.cloud_cover,
        is_night: preset.is_night,
        forced_scene: forced,
        theme: context.theme,
    }
}

/// Night is before today's sunrise or from sunset on. Without sun times for the day
/// (polar day or night, or no forecast yet) the local clock decides: before 06:00 or from 19:00.
#[must_use]
pub fn is_night_time(now: DateTime<FixedOffset>, solar: Option<&SolarContext>) -> bool {
    let utc: DateTime<Utc> = now.with_timezone(&Utc);
    if let Some(is_night) = solar.and_then(|solar| solar.is_night(utc)) {
        return is_night;
    }
    let hour = now.hour();
    !(6..19).contains(&hour)
}

#[must_use]
pub fn scene_context_at(
    now: DateTime<FixedOffset>,
    solar: Option<&SolarContext>,
    snapshot: WeatherSnapshot,
) -> SceneContext {
    compute_scene_context(
        is_night_time(now, solar),
        snapshot.cloud_cover,
        snapshot.weather_code,
    )
}
