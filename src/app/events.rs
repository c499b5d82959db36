use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures::StreamExt;
use rand::Rng;
use tokio::{
    sync::mpsc::Sender,
    time::{MissedTickBehavior, interval, sleep},
};

use crate::domain::weather::{Location, WeatherReport};

#[derive(Debug)]
pub enum AppEvent {
    Bootstrap,
    TickFrame,
    TickRefresh,
    Input(Event),
    FetchStarted,
    LocationResolved(Location),
    FetchSucceeded(WeatherReport),
    FetchFailed(String),
    Quit,
}

pub fn spawn_input_task() -> impl futures::Stream<Item = Event> {
    EventStream::new().filter_map(|event| async move { event.ok() })
}

#[must_use]
pub fn frame_interval(fps: u8) -> Duration {
    Duration::from_millis(1000_u64 / u64::from(fps.clamp(1, 60)))
}

pub fn start_frame_task(tx: Sender<AppEvent>, fps: u8) {
    tokio::spawn(async move {
        let mut ticker = interval(frame_interval(fps));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            if tx.send(AppEvent::TickFrame).await.is_err() {
                break;
            }
        }
    });
}

/// Periodic forecast refresh with ±10% jitter.
pub fn start_refresh_task(tx: Sender<AppEvent>, refresh_secs: u64) {
    tokio::spawn(async move {
        let base = refresh_secs.max(60);
        loop {
            sleep(jittered(base)).await;
            if tx.send(AppEvent::TickRefresh).await.is_err() {
                break;
            }
        }
    });
}

fn jittered(base_secs: u64) -> Duration {
    let jitter = rand::rng().random_range(-0.1f64..0.1f64);
    #[allow(clippy::cast_precision_loss)]
    let secs = (base_secs as f64 * (1.0 + jitter)).max(1.0);
    Duration::from_secs_f64(secs)
}

pub fn schedule_retry(tx: Sender<AppEvent>, delay: Duration) {
    tokio::spawn(async move {
        sleep(delay.max(Duration::from_secs(1))).await;
        let _ = tx.send(AppEvent::TickRefresh).await;
    });
}
