mod common;

use chrono::NaiveDate;
use common::FORECAST_BODY;
use weather_pane::{
    data::{forecast::ForecastClient, geocode::GeocodeClient, geoip::detect_location_from},
    domain::weather::Location,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, query_param},
};

fn stockholm() -> Location {
    Location::from_coords(59.3293, 18.0686)
}

#[tokio::test]
async fn forecast_payload_becomes_a_report() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("timezone", "auto"))
        .and(query_param(
            "daily",
            "sunrise,sunset,daylight_duration,temperature_2m_max,temperature_2m_min,\
precipitation_sum,precipitation_probability_max,wind_speed_10m_max,wind_gusts_10m_max",
        ))
        .respond_with(ResponseTemplate::new(200).set_body_raw(FORECAST_BODY, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let report = ForecastClient::with_base_url(server.uri())
        .fetch(stockholm())
        .await
        .unwrap();

    assert_eq!(report.current.weather_code, Some(63));
    assert_eq!(report.current.cloud_cover, Some(96.0));
    assert!((report.current.temperature_c - 18.4).abs() < 1e-4);
    assert_eq!(report.utc_offset.local_minus_utc(), 7200);
    assert_eq!(report.daily.len(), 2);
    assert_eq!(
        report.daily[0].date,
        NaiveDate::from_ymd_opt(2026, 6, 21).unwrap()
    );
    assert!(report.daily[0].sunrise.is_some());
    assert_eq!(report.daily[0].precipitation_probability_max, Some(85.0));
    assert_eq!(report.daily[1].precipitation_sum_mm, Some(0.2));
    assert_eq!(report.daily[0].wind_gust_max_ms, Some(12.3));
    assert_eq!(report.location.name, "Current Location");
}

#[tokio::test]
async fn server_errors_surface_as_fetch_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = ForecastClient::with_base_url(server.uri())
        .fetch(stockholm())
        .await
        .unwrap_err();
    assert!(format!("{err:#}").contains("non-success status"));
}

#[tokio::test]
async fn payload_without_current_block_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"utc_offset_seconds": 0}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let err = ForecastClient::with_base_url(server.uri())
        .fetch(stockholm())
        .await
        .unwrap_err();
    assert!(err.to_string().contains("current conditions"));
}

#[tokio::test]
async fn geocoder_prefers_the_exact_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("name", "Stockholm"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"results": [
                {"name": "Stockholms län", "latitude": 59.4, "longitude": 18.2, "country": "Sweden"},
                {"name": "Stockholm", "latitude": 59.3293, "longitude": 18.0686,
                 "country": "Sweden", "admin1": "Stockholm"}
            ]}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let found = GeocodeClient::with_base_url(server.uri())
        .search("Stockholm")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.name, "Stockholm");
    assert_eq!(found.admin1.as_deref(), Some("Stockholm"));
}

#[tokio::test]
async fn geocoder_with_no_hits_finds_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .mount(&server)
        .await;

    let client = GeocodeClient::with_base_url(server.uri());
    assert!(client.search("Atlantis").await.unwrap().is_none());
    assert!(client.search("   ").await.unwrap().is_none());
}

#[tokio::test]
async fn ip_lookup_reads_city_and_coordinates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            r#"{"city": "Uppsala", "latitude": 59.86, "longitude": 17.64,
                "country_name": "Sweden", "region": "Uppsala"}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let location = detect_location_from(&server.uri()).await.unwrap();
    assert_eq!(location.name, "Uppsala");
    assert_eq!(location.country.as_deref(), Some("Sweden"));
}

#[tokio::test]
async fn ip_lookup_failure_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    assert!(detect_location_from(&server.uri()).await.is_none());
}
