use crate::domain::weather::Location;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const GEOIP_URL: &str = "https://ipapi.co/json/";

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    city: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    country_name: Option<String>,
    region: Option<String>,
}

/// Rough location from the public IP address; `None` on any failure.
pub async fn detect_location() -> Option<Location> {
    detect_location_from(GEOIP_URL).await
}

pub async fn detect_location_from(url: &str) -> Option<Location> {
    let client = Client::builder()
        .timeout(std::time::Duration::from_secs(5))
        .build()
        .ok()?;
    let response: IpApiResponse = client
        .get(url)
        .send()
        .await
        .ok()?
        .error_for_status()
        .ok()?
        .json()
        .await
        .ok()?;
    let location = location_from(response);
    debug!(found = location.is_some(), "ip location lookup finished");
    location
}

fn location_from(response: IpApiResponse) -> Option<Location> {
    let latitude = response.latitude?;
    let longitude = response.longitude?;
    let name = response
        .city
        .filter(|city| !city.is_empty())
        .unwrap_or_else(|| "Current Location".to_string());
    Some(Location {
        name,
        latitude,
        longitude,
        country: response.country_name,
        admin1: response.region,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinates_are_required_but_city_is_not() {
        let parsed: IpApiResponse =
            serde_json::from_str(r#"{"latitude":48.85,"longitude":2.35,"city":""}"#).unwrap();
        let location = location_from(parsed).unwrap();
        assert_eq!(location.name, "Current Location");

        let parsed: IpApiResponse = serde_json::from_str(r#"{"city":"Paris"}"#).unwrap();
        assert!(location_from(parsed).is_none());
    }
}
