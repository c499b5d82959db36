#![allow(dead_code)]

use chrono::{FixedOffset, NaiveDate, TimeZone, Utc};
use clap::Parser;
use weather_pane::{
    cli::Cli,
    domain::{
        scene::{ForcedScene, SceneContext, SceneId, Theme, Variant},
        weather::{
            CurrentConditions, DailyOutlook, Location, WeatherReport, parse_datetime,
        },
    },
};

pub const FORECAST_BODY: &str = r#"{
    "latitude": 59.33,
    "longitude": 18.07,
    "utc_offset_seconds": 7200,
    "current": {
        "time": "2026-06-21T12:00",
        "temperature_2m": 18.4,
        "relative_humidity_2m": 62,
        "apparent_temperature": 17.0,
        "weather_code": 63,
        "cloud_cover": 96,
        "wind_speed_10m": 4.1,
        "wind_gusts_10m": 7.9
    },
    "daily": {
        "time": ["2026-06-21", "2026-06-22"],
        "sunrise": ["2026-06-21T03:31", "2026-06-22T03:31"],
        "sunset": ["2026-06-21T22:08", "2026-06-22T22:08"],
        "daylight_duration": [67000.0, 66990.0],
        "temperature_2m_max": [24.6, 22.1],
        "temperature_2m_min": [13.2, 12.8],
        "precipitation_sum": [6.4, 0.2],
        "precipitation_probability_max": [85, 20],
        "wind_speed_10m_max": [6.1, 4.4],
        "wind_gusts_10m_max": [12.3, 8.0]
    }
}"#;

pub fn cli_with(args: &[&str]) -> Cli {
    let mut argv = vec!["weather-pane"];
    argv.extend_from_slice(args);
    Cli::parse_from(argv)
}

pub fn context(scene_id: SceneId) -> SceneContext {
    SceneContext {
        scene_id,
        variant: Variant::Rain,
        intensity: 0.7,
        cloud_cover: 60.0,
        is_night: false,
        forced_scene: ForcedScene::Auto,
        theme: Theme::Dark,
    }
}

/// Midsummer in Stockholm, fetched at a fixed instant.
pub fn midsummer_report(weather_code: u8, cloud_cover: f32) -> WeatherReport {
    let day = |day: u32| DailyOutlook {
        date: NaiveDate::from_ymd_opt(2026, 6, day).unwrap(),
        sunrise: parse_datetime(&format!("2026-06-{day}T03:31")),
        sunset: parse_datetime(&format!("2026-06-{day}T22:08")),
        daylight_duration_s: Some(67_000.0),
        temperature_max_c: Some(24.6),
        temperature_min_c: Some(13.2),
        precipitation_sum_mm: Some(4.2),
        precipitation_probability_max: Some(70.0),
        wind_speed_max_ms: Some(6.3),
        wind_gust_max_ms: Some(11.8),
    };
    WeatherReport {
        location: Location {
            name: "Stockholm".to_string(),
            country: Some("Sweden".to_string()),
            admin1: Some("Stockholm".to_string()),
            ..Location::from_coords(59.3293, 18.0686)
        },
        current: CurrentConditions {
            temperature_c: 18.4,
            apparent_temperature_c: Some(17.0),
            relative_humidity: Some(62.0),
            weather_code: Some(weather_code),
            cloud_cover: Some(cloud_cover),
            wind_speed_ms: Some(4.1),
            wind_gust_ms: Some(7.9),
        },
        daily: vec![day(21), day(22)],
        utc_offset: FixedOffset::east_opt(2 * 3600).unwrap(),
        fetched_at: Utc.with_ymd_and_hms(2026, 6, 21, 9, 55, 0).unwrap(),
    }
}
