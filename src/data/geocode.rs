use anyhow::{Context, Result};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::domain::weather::Location;

const GEOCODE_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

/// Place-name and postal-code lookup.
#[derive(Debug, Clone)]
pub struct GeocodeClient {
    client: Client,
    base_url: String,
}

impl Default for GeocodeClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GeocodeClient {
    pub fn new() -> Self {
        Self::with_base_url(GEOCODE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(8))
                .build()
                .expect("reqwest client"),
            base_url: base_url.into(),
        }
    }

    /// Best match for `query`, or `None` when nothing was found.
    pub async fn search(&self, query: &str) -> Result<Option<Location>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(None);
        }
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("name", query),
                ("count", "5"),
                ("language", "en"),
                ("format", "json"),
            ])
            .send()
            .await
            .context("geocoding request failed")?
            .error_for_status()
            .context("geocoding request returned non-success status")?;

        let payload: GeocodeResponse = response
            .json()
            .await
            .context("failed to decode geocoding response")?;

        let results = payload.results.unwrap_or_default();
        debug!(query, hits = results.len(), "geocoding finished");
        Ok(best_match(results, query))
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    results: Option<Vec<GeocodeResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    admin1: Option<String>,
    #[serde(default)]
    postcodes: Vec<String>,
}

/// An exact name or postcode match wins; otherwise the API's first result.
fn best_match(results: Vec<GeocodeResult>, query: &str) -> Option<Location> {
    let wanted = normalize(query);
    let exact = results.iter().position(|entry| {
        normalize(&entry.name) == wanted || entry.postcodes.iter().any(|code| normalize(code) == wanted)
    });
    let entry = results.into_iter().nth(exact.unwrap_or(0))?;
    Some(Location {
        name: entry.name,
        latitude: entry.latitude,
        longitude: entry.longitude,
        country: entry.country,
        admin1: entry.admin1,
    })
}

fn normalize(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .replace(['-', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
