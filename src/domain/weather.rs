use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

mod conditions;
mod conversions;

pub use conditions::{
    ConditionFamily, condition_family, describe_weather_code, is_precipitation, weather_label,
};
pub use conversions::{
    celsius_to_fahrenheit, convert_temp, local_to_utc, parse_date, parse_datetime, round_temp,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Units {
    #[default]
    Celsius,
    Fahrenheit,
}

impl Units {
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Celsius => "C",
            Self::Fahrenheit => "F",
        }
    }

    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Celsius => Self::Fahrenheit,
            Self::Fahrenheit => Self::Celsius,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub country: Option<String>,
    pub admin1: Option<String>,
}

impl Location {
    #[must_use]
    pub fn from_coords(lat: f64, lon: f64) -> Self {
        Self {
            name: "Current Location".to_string(),
            latitude: lat,
            longitude: lon,
            country: None,
            admin1: None,
        }
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        match (&self.admin1, &self.country) {
            (Some(admin), Some(country)) => format!("{}, {}, {}", self.name, admin, country),
            (None, Some(country)) => format!("{}, {}", self.name, country),
            _ => self.name.clone(),
        }
    }

    #[must_use]
    pub fn coords_label(&self) -> String {
        format!("{:.3}, {:.3}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub temperature_c: f32,
    pub apparent_temperature_c: Option<f32>,
    pub relative_humidity: Option<f32>,
    pub weather_code: Option<u8>,
    pub cloud_cover: Option<f32>,
    pub wind_speed_ms: Option<f32>,
    pub wind_gust_ms: Option<f32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyOutlook {
    pub date: NaiveDate,
    pub sunrise: Option<NaiveDateTime>,
    pub sunset: Option<NaiveDateTime>,
    pub daylight_duration_s: Option<f64>,
    pub temperature_max_c: Option<f32>,
    pub temperature_min_c: Option<f32>,
    pub precipitation_sum_mm: Option<f32>,
    /// Highest hourly chance of precipitation, in percent.
    pub precipitation_probability_max: Option<f32>,
    pub wind_speed_max_ms: Option<f32>,
    pub wind_gust_max_ms: Option<f32>,
}

#[derive(Debug, Clone)]
pub struct WeatherReport {
    pub location: Location,
    pub current: CurrentConditions,
    pub daily: Vec<DailyOutlook>,
    pub utc_offset: FixedOffset,
    pub fetched_at: DateTime<Utc>,
}

/// Scene-relevant slice of a report; what the backdrop reads on every refresh.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct WeatherSnapshot {
    pub weather_code: Option<u8>,
    pub cloud_cover: Option<f32>,
}

impl WeatherReport {
    #[must_use]
    pub fn snapshot(&self) -> WeatherSnapshot {
        WeatherSnapshot {
            weather_code: self.current.weather_code,
            cloud_cover: self.current.cloud_cover,
        }
    }

    #[must_use]
    pub fn today(&self) -> Option<&DailyOutlook> {
        self.daily.first()
    }

    #[must_use]
    pub fn tomorrow(&self) -> Option<&DailyOutlook> {
        self.daily.get(1)
    }

    #[must_use]
    pub fn sunrise_utc(&self) -> Option<DateTime<Utc>> {
        self.today()
            .and_then(|day| day.sunrise)
            .and_then(|naive| local_to_utc(naive, self.utc_offset))
    }

    #[must_use]
    pub fn sunset_utc(&self) -> Option<DateTime<Utc>> {
        self.today()
            .and_then(|day| day.sunset)
            .and_then(|naive| local_to_utc(naive, self.utc_offset))
    }

    #[must_use]
    pub fn current_temp(&self, units: Units) -> i32 {
        round_temp(convert_temp(self.current.temperature_c, units))
    }

    #[must_use]
    pub fn high_low(&self, units: Units) -> Option<(i32, i32)> {
        let today = self.today()?;
        Some((
            round_temp(convert_temp(today.temperature_max_c?, units)),
            round_temp(convert_temp(today.temperature_min_c?, units)),
        ))
    }

    #[must_use]
    pub fn local_now(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        self.utc_offset.from_utc_datetime(&now.naive_utc())
    }
}
