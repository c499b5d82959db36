use chrono::{FixedOffset, NaiveDate, Utc};
use clap::Parser;

use crate::{
    cli::Cli,
    domain::weather::{CurrentConditions, DailyOutlook, Location, WeatherReport, parse_datetime},
};

pub(crate) fn test_cli() -> Cli {
    Cli::parse_from(["weather-pane", "--lat", "59.3293", "--lon", "18.0686"])
}

pub(crate) fn stockholm_location() -> Location {
    Location {
        name: "Stockholm".to_string(),
        latitude: 59.3293,
        longitude: 18.0686,
        country: Some("Sweden".to_string()),
        admin1: Some("Stockholm".to_string()),
    }
}

/// Midsummer in Stockholm with the given current code and cover.
pub(crate) fn sample_report(weather_code: Option<u8>, cloud_cover: Option<f32>) -> WeatherReport {
    let day = |date: NaiveDate, sunrise: &str, sunset: &str| DailyOutlook {
        date,
        sunrise: parse_datetime(sunrise),
        sunset: parse_datetime(sunset),
        daylight_duration_s: Some(67_000.0),
        temperature_max_c: Some(24.6),
        temperature_min_c: Some(13.2),
        precipitation_sum_mm: Some(4.2),
        precipitation_probability_max: Some(70.0),
        wind_speed_max_ms: Some(6.3),
        wind_gust_max_ms: Some(11.8),
    };
    WeatherReport {
        location: stockholm_location(),
        current: CurrentConditions {
            temperature_c: 18.4,
            apparent_temperature_c: Some(17.0),
            relative_humidity: Some(62.0),
            weather_code,
            cloud_cover,
            wind_speed_ms: Some(4.1),
            wind_gust_ms: Some(7.9),
        },
        daily: vec![
            day(
                NaiveDate::from_ymd_opt(2026, 6, 21).expect("valid date"),
                "2026-06-21T03:31",
                "2026-06-21T22:08",
            ),
            day(
                NaiveDate::from_ymd_opt(2026, 6, 22).expect("valid date"),
                "2026-06-22T03:31",
                "2026-06-22T22:08",
            ),
        ],
        utc_offset: FixedOffset::east_opt(2 * 3600).expect("valid offset"),
        fetched_at: Utc::now(),
    }
}
