use chrono::{Duration, FixedOffset, TimeZone, Utc};

use super::*;

fn kyiv_march() -> SolarContext {
    let now = Utc.with_ymd_and_hms(2013, 3, 5, 9, 0, 0).unwrap();
    SolarContext::build(
        now,
        50.5,
        30.5,
        FixedOffset::east_opt(2 * 3600).unwrap(),
        None,
        None,
    )
}

#[test]
fn computed_times_fill_missing_api_values() {
    let ctx = kyiv_march();
    let sunrise = ctx.sunrise.expect("computed sunrise");
    let expected = Utc.with_ymd_and_hms(2013, 3, 5, 4, 34, 56).unwrap();
    assert!((sunrise - expected).num_seconds().abs() <= 120);
    assert!(ctx.day_length.is_some());
}

#[test]
fn api_sun_times_take_precedence() {
    let now = Utc.with_ymd_and_hms(2013, 3, 5, 9, 0, 0).unwrap();
    let api_rise = Utc.with_ymd_and_hms(2013, 3, 5, 4, 40, 0).unwrap();
    let api_set = Utc.with_ymd_and_hms(2013, 3, 5, 15, 40, 0).unwrap();
    let ctx = SolarContext::build(
        now,
        50.5,
        30.5,
        FixedOffset::east_opt(7200).unwrap(),
        Some(api_rise),
        Some(api_set),
    );
    assert_eq!(ctx.sunrise, Some(api_rise));
    assert_eq!(ctx.day_length, Some(Duration::hours(11)));
    assert_eq!(ctx.is_night(api_rise - Duration::minutes(1)), Some(true));
    assert_eq!(ctx.is_night(api_rise), Some(false));
    assert_eq!(ctx.is_night(api_set), Some(true));
}

#[test]
fn polar_day_has_no_night_answer() {
    let now = Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap();
    let ctx = SolarContext::build(now, 78.2, 15.6, FixedOffset::east_opt(0).unwrap(), None, None);
    assert_eq!(ctx.is_night(now), None);
    assert_eq!(ctx.sky_palette(now), SkyPalette::UNKNOWN);
    assert!((ctx.night_opacity(now) - 1.0).abs() < f64::EPSILON);
}

#[test]
fn next_event_walks_through_the_day() {
    let ctx = kyiv_march();
    let before_dawn = Utc.with_ymd_and_hms(2013, 3, 5, 2, 0, 0).unwrap();
    let event = ctx.next_event(before_dawn).expect("event");
    assert_eq!(event.kind, SolarEventKind::AstronomicalDawn);

    let morning = Utc.with_ymd_and_hms(2013, 3, 5, 9, 0, 0).unwrap();
    assert_eq!(
        ctx.next_event(morning).map(|e| e.kind),
        Some(SolarEventKind::SolarNoon)
    );
}

#[test]
fn next_event_rolls_over_to_tomorrow() {
    let ctx = kyiv_march();
    let late = Utc.with_ymd_and_hms(2013, 3, 5, 21, 0, 0).unwrap();
    let event = ctx.next_event(late).expect("tomorrow's first event");
    assert_eq!(event.kind, SolarEventKind::AstronomicalDawn);
    assert!(event.time > late);
}

#[test]
fn sky_palette_follows_daylight() {
    let ctx = kyiv_march();
    let midday = Utc.with_ymd_and_hms(2013, 3, 5, 10, 0, 0).unwrap();
    let midnight = Utc.with_ymd_and_hms(2013, 3, 5, 22, 30, 0).unwrap();
    assert_eq!(ctx.sky_palette(midday), SkyPalette::DAY);
    assert_eq!(ctx.sky_palette(midnight), SkyPalette::NIGHT);

    let sunset = ctx.sunset.expect("sunset");
    let dusk_blend = ctx.sky_palette(sunset + Duration::minutes(10));
    assert_ne!(dusk_blend, SkyPalette::GOLDEN);
    assert_ne!(dusk_blend, SkyPalette::CIVIL);
}

#[test]
fn palette_lerp_hits_both_ends() {
    assert_eq!(SkyPalette::NIGHT.lerp(SkyPalette::DAY, 0.0), SkyPalette::NIGHT);
    assert_eq!(SkyPalette::NIGHT.lerp(SkyPalette::DAY, 1.0), SkyPalette::DAY);
    assert_eq!(SkyPalette::NIGHT.lerp(SkyPalette::DAY, 7.0), SkyPalette::DAY);
}

#[test]
fn day_progress_brackets_daylight() {
    let ctx = kyiv_march();
    let sunrise = ctx.sunrise.unwrap();
    let sunset = ctx.sunset.unwrap();
    let mid = sunrise + (sunset - sunrise) / 2;
    assert!((ctx.day_progress(mid).unwrap() - 0.5).abs() < 0.01);
    assert!(ctx.day_progress(sunrise - Duration::hours(1)).unwrap() < 0.0);
    assert!(ctx.day_progress(sunset + Duration::hours(1)).unwrap() > 1.0);
    assert!(ctx.night_opacity(mid).abs() < f64::EPSILON);
    assert!((ctx.night_opacity(sunset + Duration::hours(4)) - 1.0).abs() < f64::EPSILON);
}

#[test]
fn sun_path_peaks_near_solar_noon() {
    let ctx = kyiv_march();
    let samples = ctx.sun_path(15);
    assert_eq!(samples.len(), 96);
    let peak = samples
        .iter()
        .max_by(|a, b| a.altitude_deg.total_cmp(&b.altitude_deg))
        .unwrap();
    let noon_minute = ctx.minute_of_day(ctx.today.solar_noon);
    assert!((f64::from(peak.minutes) - noon_minute).abs() <= 15.0);
    assert!((peak.azimuth_deg - 180.0).abs() < 10.0);
}

#[test]
fn moon_labels_cover_the_cycle() {
    assert_eq!(moon_label(0.0), "New Moon");
    assert_eq!(moon_label(0.1), "Waxing Crescent");
    assert_eq!(moon_label(0.25), "First Quarter");
    assert_eq!(moon_label(0.5), "Full Moon");
    assert_eq!(moon_label(0.75), "Last Quarter");
    assert_eq!(moon_label(0.9), "Waning Crescent");
    assert_eq!(moon_label(0.99), "New Moon");
}

#[test]
fn season_info_counts_days_to_next_marker() {
    let now = Utc.with_ymd_and_hms(2026, 3, 10, 9, 0, 0).unwrap();
    let info = season_info(now);
    assert_eq!(info.current, Season::Winter);
    assert_eq!(info.next_name, "March Equinox");
    assert_eq!(info.days_until_next, 10);
    assert_eq!(info.previous_name, "December Solstice");

    let summer = season_info(Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap());
    assert_eq!(summer.current, Season::Summer);
    assert_eq!(summer.next_name, "September Equinox");
}
