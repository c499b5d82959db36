use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use crossterm::event::Event;
use rand::{SeedableRng, rngs::StdRng};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::{
    app::{
        backdrop::{Backdrop, BackdropSettings, SceneInputs},
        events::{AppEvent, schedule_retry, start_frame_task, start_refresh_task},
        settings::{RuntimeSettings, load_runtime_settings, save_runtime_settings},
    },
    cli::Cli,
    data::{cache::ForecastCache, forecast::ForecastClient, geocode::GeocodeClient},
    domain::{
        scene::Theme,
        solar::SolarContext,
        weather::{Location, WeatherReport},
    },
    resilience::backoff::Backoff,
    ui::{
        canvas::{CELL_PX_H, CELL_PX_W, Canvas},
        layout::sun_strip_size,
        scenes::starry_night::Starfield,
        theme::{ColorCapability, detect_color_capability, resolve_theme_from_env},
    },
};

mod fetch;
mod input;

/// Day/night and sky changes are picked up at least this often without new weather.
const SCENE_REFRESH: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Loading,
    Ready,
    Error,
    Quit,
}

#[derive(Debug)]
pub struct AppState {
    pub mode: AppMode,
    pub running: bool,
    pub status: String,
    pub last_error: Option<String>,
    pub location: Option<Location>,
    pub report: Option<WeatherReport>,
    pub solar: Option<SolarContext>,
    pub settings: RuntimeSettings,
    pub settings_path: Option<PathBuf>,
    pub theme: Theme,
    pub capability: ColorCapability,
    pub reduced_motion: bool,
    pub backdrop: Backdrop,
    pub sun_strip: Canvas,
    pub forecast_cache: ForecastCache,
    pub backoff: Backoff,
    pub fetch_in_flight: bool,
    pub viewport: (u16, u16),
    starfield: Starfield,
    forecast: ForecastClient,
    geocoder: GeocodeClient,
    started_at: Instant,
    last_frame_at: Instant,
    last_scene_refresh: Instant,
}

impl AppState {
    pub fn new(cli: &Cli) -> Self {
        let (settings, settings_path) = load_runtime_settings(cli, true);
        let capability = detect_color_capability(cli.effective_color_mode());
        let viewport = crossterm::terminal::size().unwrap_or((80, 24));
        Self::with_settings(cli, settings, settings_path, capability, viewport)
    }

    pub fn with_settings(
        cli: &Cli,
        settings: RuntimeSettings,
        settings_path: Option<PathBuf>,
        capability: ColorCapability,
        viewport: (u16, u16),
    ) -> Self {
        let now = Instant::now();
        let (strip_w, strip_h) = sun_strip_size(viewport.0, viewport.1);
        Self {
            mode: AppMode::Loading,
            running: true,
            status: "Initializing...".to_string(),
            last_error: None,
            location: None,
            report: None,
            solar: None,
            theme: resolve_theme_from_env(settings.theme_mode),
            settings,
            settings_path,
            capability,
            reduced_motion: cli.reduced_motion,
            backdrop: Backdrop::new(viewport.0, viewport.1, capability.supports_shading()),
            sun_strip: Canvas::new(strip_w, strip_h),
            forecast_cache: ForecastCache::default(),
            backoff: Backoff::default(),
            fetch_in_flight: false,
            viewport,
            starfield: Starfield::new(StdRng::from_rng(&mut rand::rng())),
            forecast: cli
                .forecast_url
                .clone()
                .map_or_else(ForecastClient::new, ForecastClient::with_base_url),
            geocoder: cli
                .geocode_url
                .clone()
                .map_or_else(GeocodeClient::new, GeocodeClient::with_base_url),
            started_at: now,
            last_frame_at: now,
            last_scene_refresh: now,
        }
    }

    pub async fn handle_event(
        &mut self,
        event: AppEvent,
        tx: &mpsc::Sender<AppEvent>,
        cli: &Cli,
    ) -> Result<()> {
        match event {
            AppEvent::Bootstrap => {
                cli.validate()?;
                let fps = if self.reduced_motion { cli.fps.min(20) } else { cli.fps };
                start_frame_task(tx.clone(), fps);
                start_refresh_task(tx.clone(), self.settings.refresh_interval_secs);
                self.refresh_backdrop(Utc::now());
                self.start_fetch(tx, cli, false).await?;
            }
            AppEvent::TickFrame => self.on_frame(Instant::now(), Utc::now()),
            AppEvent::TickRefresh => {
                self.refresh_backdrop(Utc::now());
                self.start_fetch(tx, cli, false).await?;
            }
            AppEvent::Input(event) => self.handle_input(event, tx, cli).await?,
            AppEvent::FetchStarted => {
                self.fetch_in_flight = true;
                self.status = "Fetching weather...".to_string();
                if self.report.is_none() {
                    self.mode = AppMode::Loading;
                }
            }
            AppEvent::LocationResolved(location) => {
                info!(place = %location.name, lat = location.latitude, lon = location.longitude, "location resolved");
                self.remember_location(&location, Utc::now());
                self.location = Some(location.clone());
                self.fetch_forecast(tx, location, false).await?;
            }
            AppEvent::FetchSucceeded(report) => self.apply_report(report, Utc::now()),
            AppEvent::FetchFailed(err) => {
                self.fetch_in_flight = false;
                let delay = self.backoff.next_delay();
                warn!(error = %err, retry_in_secs = delay.as_secs(), failures = self.backoff.failures(), "weather fetch failed");
                self.status = format!("Retrying in {}s", delay.as_secs());
                self.last_error = Some(err);
                if self.report.is_none() {
                    self.mode = AppMode::Error;
                }
                schedule_retry(tx.clone(), delay);
            }
            AppEvent::Quit => {
                self.mode = AppMode::Quit;
            }
        }

        Ok(())
    }

    pub fn apply_report(&mut self, report: WeatherReport, now: DateTime<Utc>) {
        self.fetch_in_flight = false;
        self.forecast_cache.insert(report.clone(), report.fetched_at);
        self.solar = Some(SolarContext::from_report(&report, now));
        debug!(place = %report.location.name, code = ?report.current.weather_code, "weather updated");
        self.location = Some(report.location.clone());
        self.report = Some(report);
        self.mode = AppMode::Ready;
        self.last_error = None;
        self.status = "Updated".to_string();
        self.backoff.reset();
        self.refresh_backdrop(now);
    }

    fn backdrop_settings(&self) -> BackdropSettings {
        BackdropSettings {
            cloud_state: self.settings.cloud_state,
            forced_scene: self.settings.background_scene,
            theme: self.theme,
            reduced_motion: self.reduced_motion,
        }
    }

    /// Recomputes the backdrop scene from the latest weather and sun times.
    pub fn refresh_backdrop(&mut self, now: DateTime<Utc>) {
        let settings = self.backdrop_settings();
        let inputs = scene_inputs(self.report.as_ref(), self.solar.as_ref(), now);
        self.backdrop.refresh(&inputs, &settings);
        self.last_scene_refresh = Instant::now();
    }

    pub(crate) fn apply_cloud_state(&mut self, now: DateTime<Utc>) {
        let settings = self.backdrop_settings();
        let inputs = scene_inputs(self.report.as_ref(), self.solar.as_ref(), now);
        self.backdrop.set_cloud_state(&inputs, &settings);
    }

    /// Advances the backdrop and the sun-path starfield by one frame.
    pub fn on_frame(&mut self, now: Instant, wall: DateTime<Utc>) {
        let delta = now.saturating_duration_since(self.last_frame_at);
        self.last_frame_at = now;

        self.backdrop.poll_resize(now);
        if now.saturating_duration_since(self.last_scene_refresh) >= SCENE_REFRESH {
            self.refresh_backdrop(wall);
        }
        self.backdrop
            .tick(now.saturating_duration_since(self.started_at).as_secs_f64());

        let (strip_w, strip_h) = sun_strip_size(self.viewport.0, self.viewport.1);
        self.sun_strip.resize(strip_w, strip_h);
        self.sun_strip.clear();
        self.starfield
            .resize(f32::from(strip_w) * CELL_PX_W, f32::from(strip_h) * CELL_PX_H);
        let delta = if self.reduced_motion {
            0.0
        } else {
            delta.as_secs_f32()
        };
        #[allow(clippy::cast_possible_truncation)]
        let opacity = self
            .solar
            .as_ref()
            .map_or(0.0, |solar| solar.night_opacity(wall) as f32);
        self.starfield.update(&mut self.sun_strip, delta, opacity);
    }

    pub(crate) fn persist_settings(&self) {
        let Some(path) = self.settings_path.as_deref() else {
            return;
        };
        if let Err(err) = save_runtime_settings(path, &self.settings) {
            warn!(%err, "failed to save settings");
        }
    }
}

fn scene_inputs<'a>(
    report: Option<&WeatherReport>,
    solar: Option<&'a SolarContext>,
    now: DateTime<Utc>,
) -> SceneInputs<'a> {
    SceneInputs {
        now: report.map_or_else(
            || now.with_timezone(&Local).fixed_offset(),
            |report| report.local_now(now),
        ),
        snapshot: report.map(WeatherReport::snapshot).unwrap_or_default(),
        solar,
    }
}

#[cfg(test)]
mod tests;
