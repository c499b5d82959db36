#![allow(clippy::missing_errors_doc)]

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::domain::{scene::ForcedScene, weather::Units};

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ColorArg {
    Auto,
    Always,
    Never,
}

/// Whether the animated backdrop runs, is frozen on its last frame, or is torn down.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CloudState {
    #[default]
    On,
    Paused,
    Off,
}

impl CloudState {
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::On => Self::Paused,
            Self::Paused => Self::Off,
            Self::Off => Self::On,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::On => "On",
            Self::Paused => "Paused",
            Self::Off => "Off",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeMode {
    #[default]
    Auto,
    Dark,
    Light,
}

impl ThemeMode {
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::Auto => Self::Dark,
            Self::Dark => Self::Light,
            Self::Light => Self::Auto,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ThemeColor {
    #[default]
    Blue,
    Purple,
    Pink,
    Green,
    Orange,
    Teal,
    #[serde(alias = "gray")]
    Grey,
}

impl ThemeColor {
    pub const ALL: [Self; 7] = [
        Self::Blue,
        Self::Purple,
        Self::Pink,
        Self::Green,
        Self::Orange,
        Self::Teal,
        Self::Grey,
    ];

    #[must_use]
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Blue => "Blue",
            Self::Purple => "Purple",
            Self::Pink => "Pink",
            Self::Green => "Green",
            Self::Orange => "Orange",
            Self::Teal => "Teal",
            Self::Grey => "Grey",
        }
    }
}

#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Parser, Clone)]
#[command(
    name = "weather-pane",
    version,
    about = "Terminal weather pane with animated condition backdrops"
)]
pub struct Cli {
    /// Place name or postal code to look up
    #[arg(long)]
    pub place: Option<String>,

    /// Direct latitude (requires --lon)
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Direct longitude (requires --lat)
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Temperature units
    #[arg(long, value_enum, default_value_t = Units::Celsius)]
    pub units: Units,

    /// Target FPS (15..60)
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u8).range(15..=60))]
    pub fps: u8,

    /// Background animation state
    #[arg(long, value_enum, default_value_t = CloudState::On)]
    pub cloud_state: CloudState,

    /// Pin the background to a scene instead of following the weather
    #[arg(long, value_enum, default_value_t = ForcedScene::Auto)]
    pub scene: ForcedScene,

    /// Light or dark palette
    #[arg(long, value_enum, default_value_t = ThemeMode::Auto)]
    pub theme_mode: ThemeMode,

    /// Accent colour
    #[arg(long, value_enum, default_value_t = ThemeColor::Blue)]
    pub theme_color: ThemeColor,

    /// Lower motion mode; disables the animated background
    #[arg(long)]
    pub reduced_motion: bool,

    /// Color output policy
    #[arg(long, value_enum, default_value_t = ColorArg::Auto, conflicts_with = "no_color")]
    pub color: ColorArg,

    /// Alias for --color never
    #[arg(long, conflicts_with = "color")]
    pub no_color: bool,

    /// Refresh interval in seconds
    #[arg(long, default_value_t = 600)]
    pub refresh_interval: u64,

    /// Print a text report to stdout and exit (non-interactive)
    #[arg(long)]
    pub one_shot: bool,

    /// Write logs to this file while the pane is running
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Override the forecast API base URL
    #[arg(long, hide = true)]
    pub forecast_url: Option<String>,

    /// Override the geocoding API base URL
    #[arg(long, hide = true)]
    pub geocode_url: Option<String>,
}

impl Cli {
    pub fn validate(&self) -> anyhow::Result<()> {
        match (self.lat, self.lon) {
            (Some(_), None) | (None, Some(_)) => {
                anyhow::bail!("--lat and --lon must be provided together")
            }
            (Some(lat), Some(lon))
                if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) =>
            {
                anyhow::bail!("coordinates out of range: {lat}, {lon}")
            }
            _ => {}
        }
        if self.refresh_interval < 60 {
            anyhow::bail!("--refresh-interval must be at least 60 seconds");
        }
        Ok(())
    }

    #[must_use]
    pub fn effective_color_mode(&self) -> ColorArg {
        if self.no_color {
            ColorArg::Never
        } else {
            self.color
        }
    }

    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.lat.zip(self.lon)
    }
}
