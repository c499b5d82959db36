//! Non-interactive `--one-shot` output.

use std::{fmt::Write as _, path::Path};

use anyhow::{Result, anyhow};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::{
    app::settings::{
        RuntimeSettings, load_cached_location, load_runtime_settings, location_cache_path,
    },
    cli::Cli,
    data::{forecast::ForecastClient, geocode::GeocodeClient, geoip},
    domain::{
        details::{daily_summary, detail_sections},
        format::format_wind,
        scene::{apply_forced_scene, scene_context_at},
        solar::SolarContext,
        weather::{Location, WeatherReport, convert_temp, describe_weather_code, round_temp},
    },
};

pub async fn run_one_shot(cli: &Cli) -> Result<()> {
    cli.validate()?;
    let (settings, settings_path) = load_runtime_settings(cli, true);
    let location = resolve_location(cli, settings_path.as_deref()).await?;
    let client = cli
        .forecast_url
        .clone()
        .map_or_else(ForecastClient::new, ForecastClient::with_base_url);
    let report = client.fetch(location).await?;
    print!("{}", text_report(&report, Utc::now(), &settings));
    Ok(())
}

/// Coordinates, then place lookup, then the cached location, then IP lookup.
pub async fn resolve_location(cli: &Cli, settings_path: Option<&Path>) -> Result<Location> {
    if let Some((lat, lon)) = cli.coordinates() {
        return Ok(Location::from_coords(lat, lon));
    }
    if let Some(place) = cli.place.as_deref() {
        let geocoder = cli
            .geocode_url
            .clone()
            .map_or_else(GeocodeClient::new, GeocodeClient::with_base_url);
        return geocoder
            .search(place)
            .await?
            .ok_or_else(|| anyhow!("no location found for \"{place}\""));
    }
    if let Some(entry) =
        settings_path.and_then(|path| load_cached_location(&location_cache_path(path), Utc::now()))
    {
        info!(place = %entry.place, "using cached location");
        return Ok(entry.to_location());
    }
    geoip::detect_location()
        .await
        .ok_or_else(|| anyhow!("could not detect location; pass --place or --lat/--lon"))
}

#[must_use]
pub fn text_report(report: &WeatherReport, now: DateTime<Utc>, settings: &RuntimeSettings) -> String {
    let units = settings.units;
    let solar = SolarContext::from_report(report, now);
    let current = &report.current;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} ({})",
        report.location.display_name(),
        report.location.coords_label()
    );
    let _ = writeln!(
        out,
        "{}",
        describe_weather_code(current.weather_code, current.cloud_cover)
    );

    let mut temperature = format!("{}°{}", report.current_temp(units), units.symbol());
    if let Some(feels) = current.apparent_temperature_c {
        let _ = write!(temperature, " (feels {}°)", round_temp(convert_temp(feels, units)));
    }
    if let Some((high, low)) = report.high_low(units) {
        let _ = write!(temperature, ", H {high}° L {low}°");
    }
    let _ = writeln!(out, "Temperature: {temperature}");
    if let Some(humidity) = current.relative_humidity {
        let _ = writeln!(out, "Humidity: {humidity:.0}%");
    }
    let _ = writeln!(
        out,
        "Wind: {}",
        format_wind(current.wind_speed_ms, current.wind_gust_ms)
    );

    let context = apply_forced_scene(
        scene_context_at(report.local_now(now), Some(&solar), report.snapshot()),
        settings.background_scene,
    );
    let _ = writeln!(
        out,
        "Backdrop: {} ({})",
        context.scene_id.as_str(),
        context.forced_scene.label()
    );

    let _ = writeln!(out, "\n{}", daily_summary(&solar, Some(report), now, units));

    for section in detail_sections(&solar, now, Some(report), units) {
        let _ = writeln!(out, "\n{}", section.title);
        for row in &section.rows {
            let _ = writeln!(out, "  {:<18} {}", row.label, row.value);
        }
    }
    out
}
