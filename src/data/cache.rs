use std::num::NonZeroUsize;

use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use tracing::debug;

use crate::domain::weather::WeatherReport;

/// Forecasts are reused for this long before a new request goes out.
pub const FORECAST_TTL_SECS: i64 = 5 * 60;

const CAPACITY: NonZeroUsize = NonZeroUsize::new(16).unwrap();

/// Coordinates rounded to three decimals, about 100 m.
#[must_use]
pub fn cache_key(lat: f64, lon: f64) -> String {
    format!("{lat:.3}:{lon:.3}")
}

#[derive(Debug, Clone)]
struct Entry {
    report: WeatherReport,
    stored_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ForecastCache {
    entries: LruCache<String, Entry>,
    ttl: Duration,
}

impl Default for ForecastCache {
    fn default() -> Self {
        Self::new(Duration::seconds(FORECAST_TTL_SECS))
    }
}

impl ForecastCache {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: LruCache::new(CAPACITY),
            ttl,
        }
    }

    /// Fresh report for the coordinates; expired entries are evicted on lookup.
    pub fn get(&mut self, lat: f64, lon: f64, now: DateTime<Utc>) -> Option<WeatherReport> {
        let key = cache_key(lat, lon);
        let age = now - self.entries.peek(&key)?.stored_at;
        if age > self.ttl {
            debug!(key = %key, age_secs = age.num_seconds(), "forecast cache entry expired");
            self.entries.pop(&key);
            return None;
        }
        debug!(key = %key, age_secs = age.num_seconds(), "using cached forecast");
        self.entries.get(&key).map(|entry| entry.report.clone())
    }

    pub fn insert(&mut self, report: WeatherReport, now: DateTime<Utc>) {
        let key = cache_key(report.location.latitude, report.location.longitude);
        self.entries.put(
            key,
            Entry {
                report,
                stored_at: now,
            },
        );
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
