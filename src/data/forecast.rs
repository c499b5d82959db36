use anyhow::{Context, Result, anyhow};
use chrono::{FixedOffset, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::domain::weather::{
    CurrentConditions, DailyOutlook, Location, WeatherReport, parse_date, parse_datetime,
};

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,apparent_temperature,\
weather_code,cloud_cover,wind_speed_10m,wind_gusts_10m";
const DAILY_FIELDS: &str = "sunrise,sunset,daylight_duration,temperature_2m_max,\
temperature_2m_min,precipitation_sum,precipitation_probability_max,wind_speed_10m_max,\
wind_gusts_10m_max";

#[derive(Debug, Clone)]
pub struct ForecastClient {
    client: Client,
    base_url: String,
}

impl Default for ForecastClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastClient {
    pub fn new() -> Self {
        Self::with_base_url(FORECAST_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(10))
                .build()
                .expect("reqwest client"),
            base_url: base_url.into(),
        }
    }

    pub async fn fetch(&self, location: Location) -> Result<WeatherReport> {
        debug!(lat = location.latitude, lon = location.longitude, "requesting forecast");
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", location.latitude.to_string()),
                ("longitude", location.longitude.to_string()),
                ("current", CURRENT_FIELDS.to_string()),
                ("daily", DAILY_FIELDS.to_string()),
                ("wind_speed_unit", "ms".to_string()),
                ("timezone", "auto".to_string()),
                ("forecast_days", "2".to_string()),
            ])
            .send()
            .await
            .context("forecast request failed")?
            .error_for_status()
            .context("forecast request returned non-success status")?;

        let payload: ForecastResponse = response
            .json()
            .await
            .context("failed to parse forecast payload")?;

        report_from_payload(payload, location)
    }
}

fn report_from_payload(payload: ForecastResponse, location: Location) -> Result<WeatherReport> {
    let current = payload
        .current
        .ok_or_else(|| anyhow!("forecast payload is missing current conditions"))?;
    let daily = payload
        .daily
        .ok_or_else(|| anyhow!("forecast payload is missing the daily outlook"))?;
    let utc_offset = FixedOffset::east_opt(payload.utc_offset_seconds.unwrap_or(0))
        .context("forecast payload has an invalid utc offset")?;

    Ok(WeatherReport {
        location,
        current: CurrentConditions {
            temperature_c: current.temperature_2m,
            apparent_temperature_c: current.apparent_temperature,
            relative_humidity: current.relative_humidity_2m,
            weather_code: current.weather_code,
            cloud_cover: current.cloud_cover,
            wind_speed_ms: current.wind_speed_10m,
            wind_gust_ms: current.wind_gusts_10m,
        },
        daily: parse_daily(&daily),
        utc_offset,
        fetched_at: Utc::now(),
    })
}

fn parse_daily(daily: &DailyBlock) -> Vec<DailyOutlook> {
    daily
        .time
        .iter()
        .enumerate()
        .filter_map(|(idx, day)| {
            let date = parse_date(day)?;
            Some(DailyOutlook {
                date,
                sunrise: daily
                    .sunrise
                    .get(idx)
                    .and_then(Option::as_deref)
                    .and_then(parse_datetime),
                sunset: daily
                    .sunset
                    .get(idx)
                    .and_then(Option::as_deref)
                    .and_then(parse_datetime),
                daylight_duration_s: daily.daylight_duration.get(idx).copied().flatten(),
                temperature_max_c: daily.temperature_2m_max.get(idx).copied().flatten(),
                temperature_min_c: daily.temperature_2m_min.get(idx).copied().flatten(),
                precipitation_sum_mm: daily.precipitation_sum.get(idx).copied().flatten(),
                precipitation_probability_max: daily
                    .precipitation_probability_max
                    .get(idx)
                    .copied()
                    .flatten(),
                wind_speed_max_ms: daily.wind_speed_10m_max.get(idx).copied().flatten(),
                wind_gust_max_ms: daily.wind_gusts_10m_max.get(idx).copied().flatten(),
            })
        })
        .collect()
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    utc_offset_seconds: Option<i32>,
    current: Option<CurrentBlock>,
    daily: Option<DailyBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentBlock {
    temperature_2m: f32,
    relative_humidity_2m: Option<f32>,
    apparent_temperature: Option<f32>,
    weather_code: Option<u8>,
    cloud_cover: Option<f32>,
    wind_speed_10m: Option<f32>,
    wind_gusts_10m: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    time: Vec<String>,
    #[serde(default)]
    sunrise: Vec<Option<String>>,
    #[serde(default)]
    sunset: Vec<Option<String>>,
    #[serde(default)]
    daylight_duration: Vec<Option<f64>>,
    #[serde(default)]
    temperature_2m_max: Vec<Option<f32>>,
    #[serde(default)]
    temperature_2m_min: Vec<Option<f32>>,
    #[serde(default)]
    precipitation_sum: Vec<Option<f32>>,
    #[serde(default)]
    precipitation_probability_max: Vec<Option<f32>>,
    #[serde(default)]
    wind_speed_10m_max: Vec<Option<f32>>,
    #[serde(default)]
    wind_gusts_10m_max: Vec<Option<f32>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(json: &str) -> ForecastResponse {
        serde_json::from_str(json).expect("valid fixture")
    }

    #[test]
    fn polar_days_keep_missing_sun_times() {
        let daily = DailyBlock {
            time: vec!["bad".to_string(), "2026-06-21".to_string()],
            sunrise: vec![None, None],
            sunset: vec![None, None],
            daylight_duration: vec![Some(86_400.0), Some(86_400.0)],
            temperature_2m_max: vec![Some(14.0), Some(15.0)],
            temperature_2m_min: vec![],
            precipitation_sum: vec![Some(0.0), Some(1.6)],
            precipitation_probability_max: vec![None, Some(45.0)],
            wind_speed_10m_max: vec![],
            wind_gusts_10m_max: vec![Some(12.0)],
        };

        let parsed = parse_daily(&daily);
        assert_eq!(parsed.len(), 1);
        assert!(parsed[0].sunrise.is_none());
        assert_eq!(parsed[0].temperature_max_c, Some(15.0));
        assert_eq!(parsed[0].temperature_min_c, None);
        assert_eq!(parsed[0].precipitation_sum_mm, Some(1.6));
        assert_eq!(parsed[0].precipitation_probability_max, Some(45.0));
        assert_eq!(parsed[0].wind_speed_max_ms, None);
        assert_eq!(parsed[0].wind_gust_max_ms, None);
    }

    #[test]
    fn missing_blocks_are_errors() {
        let location = Location::from_coords(0.0, 0.0);
        let no_current = payload(r#"{"daily":{"time":[]}}"#);
        let err = report_from_payload(no_current, location.clone()).unwrap_err();
        assert!(err.to_string().contains("current"));

        let no_daily = payload(r#"{"current":{"temperature_2m":1.0}}"#);
        let err = report_from_payload(no_daily, location).unwrap_err();
        assert!(err.to_string().contains("daily"));
    }

    #[test]
    fn offset_comes_from_payload() {
        let report = report_from_payload(
            payload(
                r#"{"utc_offset_seconds":-18000,
                    "current":{"temperature_2m":4.5,"weather_code":61,"cloud_cover":88},
                    "daily":{"time":["2026-01-10"],"sunrise":["2026-01-10T07:20"],
                             "sunset":["2026-01-10T16:45"]}}"#,
            ),
            Location::from_coords(40.7, -74.0),
        )
        .unwrap();
        assert_eq!(report.utc_offset.local_minus_utc(), -18_000);
        assert_eq!(report.current.weather_code, Some(61));
        assert_eq!(report.current.cloud_cover, Some(88.0));
        assert!(report.sunrise_utc().is_some());
    }
}
