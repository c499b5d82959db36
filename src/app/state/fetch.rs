use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::AppState;
use crate::{
    app::{
        events::AppEvent,
        settings::{LocationCacheEntry, load_cached_location, location_cache_path, save_cached_location},
    },
    cli::Cli,
    data::geoip,
    domain::weather::Location,
};

impl AppState {
    /// Resolves the location if needed and starts a forecast fetch. `force` skips the
    /// forecast cache.
    pub(crate) async fn start_fetch(
        &mut self,
        tx: &mpsc::Sender<AppEvent>,
        cli: &Cli,
        force: bool,
    ) -> anyhow::Result<()> {
        if self.fetch_in_flight {
            return Ok(());
        }
        self.fetch_in_flight = true;
        tx.send(AppEvent::FetchStarted).await?;

        if let Some(location) = self.location.clone() {
            return self.fetch_forecast(tx, location, force).await;
        }
        if let Some((lat, lon)) = cli.coordinates() {
            tx.send(AppEvent::LocationResolved(Location::from_coords(lat, lon)))
                .await?;
            return Ok(());
        }
        if let Some(place) = cli.place.clone() {
            self.status = format!("Looking up {place}...");
            self.start_place_lookup(tx, place);
            return Ok(());
        }
        if let Some(entry) = self.cached_location(Utc::now()) {
            debug!(place = %entry.place, "using cached location");
            tx.send(AppEvent::LocationResolved(entry.to_location())).await?;
            return Ok(());
        }
        self.status = "Detecting location...".to_string();
        start_ip_lookup(tx);
        Ok(())
    }

    fn start_place_lookup(&self, tx: &mpsc::Sender<AppEvent>, place: String) {
        let geocoder = self.geocoder.clone();
        let tx2 = tx.clone();
        tokio::spawn(async move {
            let event = match geocoder.search(&place).await {
                Ok(Some(location)) => AppEvent::LocationResolved(location),
                Ok(None) => AppEvent::FetchFailed(format!("No location found for \"{place}\"")),
                Err(err) => AppEvent::FetchFailed(format!("{err:#}")),
            };
            let _ = tx2.send(event).await;
        });
    }

    /// Serves a fresh cached forecast directly; otherwise spawns a request.
    pub(crate) async fn fetch_forecast(
        &mut self,
        tx: &mpsc::Sender<AppEvent>,
        location: Location,
        force: bool,
    ) -> anyhow::Result<()> {
        if !force {
            let cached = self
                .forecast_cache
                .get(location.latitude, location.longitude, Utc::now());
            if let Some(report) = cached {
                tx.send(AppEvent::FetchSucceeded(report)).await?;
                return Ok(());
            }
        }

        let client = self.forecast.clone();
        let tx2 = tx.clone();
        tokio::spawn(async move {
            let event = match client.fetch(location).await {
                Ok(report) => AppEvent::FetchSucceeded(report),
                Err(err) => AppEvent::FetchFailed(format!("{err:#}")),
            };
            let _ = tx2.send(event).await;
        });
        Ok(())
    }

    fn cached_location(&self, now: DateTime<Utc>) -> Option<LocationCacheEntry> {
        let path = location_cache_path(self.settings_path.as_deref()?);
        load_cached_location(&path, now)
    }

    pub(crate) fn remember_location(&self, location: &Location, now: DateTime<Utc>) {
        let Some(settings_path) = self.settings_path.as_deref() else {
            return;
        };
        let path = location_cache_path(settings_path);
        let entry = LocationCacheEntry::from_location(location, now);
        if let Err(err) = save_cached_location(&path, &entry) {
            warn!(%err, "failed to cache location");
        }
    }
}

fn start_ip_lookup(tx: &mpsc::Sender<AppEvent>) {
    let tx2 = tx.clone();
    tokio::spawn(async move {
        let event = match geoip::detect_location().await {
            Some(location) => AppEvent::LocationResolved(location),
            None => AppEvent::FetchFailed(
                "Could not detect location; pass --place or --lat/--lon".to_string(),
            ),
        };
        let _ = tx2.send(event).await;
    });
}
