use std::time::{Duration, Instant};

use chrono::{DateTime, TimeZone, Utc};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc;

use super::{AppMode, AppState, input::Command, input::command_for};
use crate::{
    app::{
        events::AppEvent,
        settings::{LocationCacheEntry, RuntimeSettings, location_cache_path, save_cached_location},
    },
    cli::{Cli, CloudState},
    domain::{
        scene::{ForcedScene, SceneId},
        weather::Units,
    },
    test_support::{sample_report, stockholm_location, test_cli},
    ui::theme::ColorCapability,
};

fn state_with(cli: &Cli, settings_path: Option<std::path::PathBuf>) -> AppState {
    AppState::with_settings(
        cli,
        RuntimeSettings::from_cli_defaults(cli),
        settings_path,
        ColorCapability::TrueColor,
        (80, 30),
    )
}

fn state() -> AppState {
    state_with(&test_cli(), None)
}

/// 12:00 local time in Stockholm on the sample report's day.
fn midday() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 21, 10, 0, 0).unwrap()
}

fn key(ch: char) -> AppEvent {
    AppEvent::Input(Event::Key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE)))
}

#[test]
fn keys_map_to_commands() {
    let press = |code| KeyEvent::new(code, KeyModifiers::NONE);
    assert_eq!(command_for(press(KeyCode::Char('s'))), Some(Command::NextScene));
    assert_eq!(command_for(press(KeyCode::Char('S'))), Some(Command::PreviousScene));
    assert_eq!(command_for(press(KeyCode::Esc)), Some(Command::Quit));
    assert_eq!(command_for(press(KeyCode::Char('x'))), None);
    assert_eq!(
        command_for(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        Some(Command::Quit)
    );

    let mut release = press(KeyCode::Char('q'));
    release.kind = KeyEventKind::Release;
    assert_eq!(command_for(release), None);
}

#[tokio::test]
async fn quit_key_requests_quit() {
    let cli = test_cli();
    let mut state = state();
    let (tx, mut rx) = mpsc::channel(8);
    state.handle_event(key('q'), &tx, &cli).await.unwrap();
    let event = rx.recv().await.unwrap();
    state.handle_event(event, &tx, &cli).await.unwrap();
    assert_eq!(state.mode, AppMode::Quit);
}

#[tokio::test]
async fn cloud_key_cycles_on_paused_off() {
    let cli = test_cli();
    let mut state = state();
    let (tx, _rx) = mpsc::channel(8);
    state.apply_report(sample_report(Some(61), Some(90.0)), midday());
    assert_eq!(state.backdrop.scene_id(), Some(SceneId::Rain));
    assert!(state.backdrop.is_running());

    state.handle_event(key('c'), &tx, &cli).await.unwrap();
    assert_eq!(state.settings.cloud_state, CloudState::Paused);
    assert!(state.backdrop.is_active());
    assert!(!state.backdrop.is_running());

    state.handle_event(key('c'), &tx, &cli).await.unwrap();
    assert_eq!(state.settings.cloud_state, CloudState::Off);
    assert!(!state.backdrop.is_active());

    state.handle_event(key('c'), &tx, &cli).await.unwrap();
    assert_eq!(state.settings.cloud_state, CloudState::On);
    assert!(state.backdrop.is_running());
}

#[tokio::test]
async fn scene_keys_pin_and_release_the_background() {
    let cli = test_cli();
    let mut state = state();
    let (tx, _rx) = mpsc::channel(8);
    state.apply_report(sample_report(Some(0), Some(5.0)), midday());

    state.handle_event(key('s'), &tx, &cli).await.unwrap();
    assert_eq!(state.settings.background_scene, ForcedScene::Clear);
    state.handle_event(key('S'), &tx, &cli).await.unwrap();
    state.handle_event(key('S'), &tx, &cli).await.unwrap();
    assert_eq!(state.settings.background_scene, ForcedScene::Night);
    let context = state.backdrop.context().unwrap();
    assert_eq!(context.scene_id, SceneId::NightClear);
    assert_eq!(context.forced_scene, ForcedScene::Night);

    state.handle_event(key('s'), &tx, &cli).await.unwrap();
    assert_eq!(state.settings.background_scene, ForcedScene::Auto);
    assert_eq!(
        state.backdrop.context().unwrap().forced_scene,
        ForcedScene::Auto
    );
}

#[tokio::test]
async fn reduced_motion_keeps_the_backdrop_off() {
    let cli = Cli {
        reduced_motion: true,
        ..test_cli()
    };
    let mut state = state_with(&cli, None);
    let (tx, _rx) = mpsc::channel(8);
    state.apply_report(sample_report(Some(61), Some(90.0)), midday());
    assert!(!state.backdrop.is_active());

    state.handle_event(key('c'), &tx, &cli).await.unwrap();
    state.handle_event(key('c'), &tx, &cli).await.unwrap();
    state.handle_event(key('c'), &tx, &cli).await.unwrap();
    assert_eq!(state.settings.cloud_state, CloudState::On);
    assert!(!state.backdrop.is_active());
}

#[tokio::test]
async fn successful_fetch_updates_weather_and_scene() {
    let cli = test_cli();
    let mut state = state();
    let (tx, _rx) = mpsc::channel(8);
    state.fetch_in_flight = true;
    state.backoff.next_delay();

    state
        .handle_event(
            AppEvent::FetchSucceeded(sample_report(Some(95), Some(100.0))),
            &tx,
            &cli,
        )
        .await
        .unwrap();

    assert_eq!(state.mode, AppMode::Ready);
    assert!(!state.fetch_in_flight);
    assert!(state.solar.is_some());
    assert_eq!(state.forecast_cache.len(), 1);
    assert_eq!(state.backoff.failures(), 0);
    assert_eq!(state.backdrop.scene_id(), Some(SceneId::Storm));
}

#[tokio::test]
async fn failed_fetch_backs_off_and_keeps_old_weather() {
    let cli = test_cli();
    let mut state = state();
    let (tx, _rx) = mpsc::channel(8);

    state
        .handle_event(AppEvent::FetchFailed("offline".to_string()), &tx, &cli)
        .await
        .unwrap();
    assert_eq!(state.mode, AppMode::Error);
    assert_eq!(state.status, "Retrying in 10s");
    assert_eq!(state.last_error.as_deref(), Some("offline"));

    state.apply_report(sample_report(Some(3), Some(80.0)), midday());
    state
        .handle_event(AppEvent::FetchFailed("offline".to_string()), &tx, &cli)
        .await
        .unwrap();
    assert_eq!(state.mode, AppMode::Ready);
    assert!(state.report.is_some());
    assert_eq!(state.backoff.failures(), 1);
}

#[tokio::test]
async fn coordinates_resolve_without_lookup() {
    let cli = test_cli();
    let mut state = state();
    let (tx, mut rx) = mpsc::channel(8);

    state.handle_event(AppEvent::TickRefresh, &tx, &cli).await.unwrap();
    assert!(matches!(rx.recv().await, Some(AppEvent::FetchStarted)));
    match rx.recv().await {
        Some(AppEvent::LocationResolved(location)) => {
            assert!((location.latitude - 59.3293).abs() < 1e-9);
            assert!((location.longitude - 18.0686).abs() < 1e-9);
        }
        other => panic!("unexpected event: {other:?}"),
    }

    state.handle_event(AppEvent::TickRefresh, &tx, &cli).await.unwrap();
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn cached_forecast_is_served_without_a_request() {
    let cli = test_cli();
    let mut state = state();
    let (tx, mut rx) = mpsc::channel(8);
    let report = sample_report(Some(2), Some(40.0));
    state.forecast_cache.insert(report, Utc::now());

    state
        .handle_event(AppEvent::LocationResolved(stockholm_location()), &tx, &cli)
        .await
        .unwrap();
    assert!(matches!(rx.recv().await, Some(AppEvent::FetchSucceeded(_))));
    assert_eq!(state.location, Some(stockholm_location()));
}

#[tokio::test]
async fn cached_location_is_used_when_no_place_is_given() {
    let dir = tempfile::tempdir().unwrap();
    let settings_path = dir.path().join("settings.json");
    let entry = LocationCacheEntry::from_location(&stockholm_location(), Utc::now());
    save_cached_location(&location_cache_path(&settings_path), &entry).unwrap();

    let cli = Cli {
        lat: None,
        lon: None,
        ..test_cli()
    };
    let mut state = state_with(&cli, Some(settings_path));
    let (tx, mut rx) = mpsc::channel(8);
    state.handle_event(AppEvent::TickRefresh, &tx, &cli).await.unwrap();

    assert!(matches!(rx.recv().await, Some(AppEvent::FetchStarted)));
    match rx.recv().await {
        Some(AppEvent::LocationResolved(location)) => assert_eq!(location.name, "Stockholm"),
        other => panic!("unexpected event: {other:?}"),
    }
}

#[tokio::test]
async fn settings_keys_are_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let settings_path = dir.path().join("settings.json");
    let cli = test_cli();
    let mut state = state_with(&cli, Some(settings_path.clone()));
    let (tx, _rx) = mpsc::channel(8);

    state.handle_event(key('u'), &tx, &cli).await.unwrap();
    state.handle_event(key('a'), &tx, &cli).await.unwrap();
    assert_eq!(state.settings.units, Units::Fahrenheit);

    let saved: RuntimeSettings =
        serde_json::from_str(&std::fs::read_to_string(&settings_path).unwrap()).unwrap();
    assert_eq!(saved, state.settings);
}

#[tokio::test]
async fn resize_is_applied_after_the_debounce() {
    let cli = test_cli();
    let mut state = state();
    let (tx, _rx) = mpsc::channel(8);
    state.apply_report(sample_report(Some(0), None), midday());

    state
        .handle_event(AppEvent::Input(Event::Resize(120, 40)), &tx, &cli)
        .await
        .unwrap();
    assert_eq!(state.viewport, (120, 40));
    assert_eq!(state.backdrop.size(), (80, 30));

    state.on_frame(Instant::now() + Duration::from_millis(200), midday());
    assert_eq!(state.backdrop.size(), (120, 40));
}

#[test]
fn sun_strip_shows_stars_only_at_night() {
    let mut state = state();
    let night = Utc.with_ymd_and_hms(2026, 6, 21, 21, 30, 0).unwrap();
    state.apply_report(sample_report(Some(0), Some(0.0)), night);

    state.on_frame(Instant::now(), night);
    assert_eq!(
        (state.sun_strip.width(), state.sun_strip.height()),
        (78, 7)
    );
    assert!(!state.sun_strip.is_empty());

    state.on_frame(Instant::now(), midday());
    assert!(state.sun_strip.is_empty());
}
