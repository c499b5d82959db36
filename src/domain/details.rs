//! Detail rows shown under each card of the pane (solar noon, twilight, night, moon,
//! daylight, season, sky events, current weather) and the one-line daily summary.

use chrono::{DateTime, Duration, NaiveTime, Utc};

use crate::domain::{
    astro,
    events::{next_astronomical_event, relative_event_date},
    format::{
        PLACEHOLDER, format_azimuth, format_countdown, format_degrees, format_duration_hm,
        format_hemisphere, format_moon_distance, format_percent, format_signed_minutes,
        format_time_detail, format_wind, overlap_duration,
    },
    solar::{SolarContext, moon_label, season_info},
    weather::{
        Units, WeatherReport, convert_temp, describe_weather_code, round_temp, weather_label,
    },
};

/// Daily chance of precipitation above which the summary mentions it.
const PRECIP_MENTION_PERCENT: f32 = 30.0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailSection {
    pub title: &'static str,
    pub rows: Vec<DetailRow>,
}

impl DetailSection {
    fn new(title: &'static str) -> Self {
        Self {
            title,
            rows: Vec::new(),
        }
    }

    fn row(mut self, label: &'static str, value: impl Into<String>) -> Self {
        self.rows.push(DetailRow {
            label,
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|row| row.label == label)
            .map(|row| row.value.as_str())
    }
}

fn time(solar: &SolarContext, t: Option<DateTime<Utc>>) -> String {
    format_time_detail(t.map(|t| solar.local(t)))
}

#[must_use]
pub fn detail_sections(
    solar: &SolarContext,
    now: DateTime<Utc>,
    report: Option<&WeatherReport>,
    units: Units,
) -> Vec<DetailSection> {
    let mut sections = vec![
        solar_noon_section(solar),
        sunrise_section(solar),
        sunset_section(solar),
        night_section(solar),
        moon_section(solar, now),
        daylight_section(solar),
        season_section(solar, now),
        sky_events_section(solar, now),
    ];
    if let Some(report) = report {
        sections.push(weather_section(report, units));
    }
    sections
}

fn solar_noon_section(solar: &SolarContext) -> DetailSection {
    let noon = solar.today.solar_noon;
    let pos = solar.sun_position(noon);
    let local_noon = solar.local(noon);
    let clock_noon = local_noon
        .date_naive()
        .and_time(NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN));
    let offset = local_noon.naive_local() - clock_noon;
    let fraction = solar.sunrise.zip(solar.sunset).map(|(rise, set)| {
        let day = (set - rise).num_seconds() as f64;
        (noon - rise).num_seconds() as f64 / day * 100.0
    });

    DetailSection::new("Solar noon")
        .row("Time", time(solar, Some(noon)))
        .row("Altitude", format_degrees(pos.altitude.to_degrees()))
        .row("Azimuth", format_azimuth(astro::north_azimuth_deg(pos.azimuth)))
        .row("Offset from 12:00", format_signed_minutes(offset))
        .row(
            "Day fraction",
            fraction.map_or_else(|| PLACEHOLDER.to_string(), |f| format_percent(f, 1)),
        )
}

fn sunrise_section(solar: &SolarContext) -> DetailSection {
    let t = &solar.today;
    DetailSection::new("Sunrise")
        .row("Sunrise", time(solar, solar.sunrise))
        .row("Civil dawn", time(solar, t.dawn.or(solar.sunrise)))
        .row("Nautical dawn", time(solar, t.nautical_dawn))
        .row("Astronomical dawn", time(solar, t.night_end))
        .row("Golden hour ends", time(solar, t.golden_hour_end))
        .row("Tomorrow", time(solar, solar.tomorrow_sunrise))
}

fn sunset_section(solar: &SolarContext) -> DetailSection {
    let t = &solar.today;
    DetailSection::new("Sunset")
        .row("Sunset", time(solar, solar.sunset))
        .row("Golden hour starts", time(solar, t.golden_hour))
        .row("Civil dusk", time(solar, t.dusk.or(solar.sunset)))
        .row("Nautical dusk", time(solar, t.nautical_dusk))
        .row("Astronomical dusk", time(solar, t.night))
        .row("Tomorrow", time(solar, solar.tomorrow_sunset))
}

fn moonlight_text(solar: &SolarContext) -> String {
    let moon = solar.moon_times;
    if moon.always_up {
        return "Moon above horizon all night".to_string();
    }
    if moon.always_down {
        return "No moonrise tonight".to_string();
    }
    let (Some(dusk), Some(dawn)) = solar.night_window() else {
        return PLACEHOLDER.to_string();
    };
    let rise = moon.rise.unwrap_or(dusk);
    let set = moon.set.unwrap_or(dawn);
    let overlap = overlap_duration(&dusk, &dawn, &rise, &set);
    if overlap > Duration::zero() {
        format!("{} of moonlight", format_duration_hm(overlap))
    } else {
        "No moonlight window".to_string()
    }
}

fn night_section(solar: &SolarContext) -> DetailSection {
    let (dusk, dawn) = solar.night_window();
    let (next_dusk, next_dawn) = solar.tomorrow_night_window();
    let length = |start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>| {
        start
            .zip(end)
            .map_or_else(|| PLACEHOLDER.to_string(), |(s, e)| format_duration_hm(e - s))
    };

    DetailSection::new("Night")
        .row("Astronomical dusk", time(solar, dusk))
        .row("Astronomical dawn", time(solar, dawn))
        .row("Length", length(dusk, dawn))
        .row("Moonlight", moonlight_text(solar))
        .row("Tomorrow", length(next_dusk, next_dawn))
}

fn moon_section(solar: &SolarContext, now: DateTime<Utc>) -> DetailSection {
    let illum = solar.moon_illumination(now);
    let pos = solar.moon_position(now);
    let rise_set = format!(
        "{} · {}",
        solar
            .moon_times
            .rise
            .map_or_else(|| "No rise".to_string(), |t| format!("Rise {}", time(solar, Some(t)))),
        solar
            .moon_times
            .set
            .map_or_else(|| "No set".to_string(), |t| format!("Set {}", time(solar, Some(t)))),
    );

    DetailSection::new("Moon")
        .row("Phase", moon_label(illum.phase))
        .row("Illumination", format_percent(illum.fraction * 100.0, 1))
        .row("Phase angle", format_degrees(illum.angle.to_degrees()))
        .row("Altitude", format_degrees(pos.altitude.to_degrees()))
        .row("Distance", format_moon_distance(pos.distance_km))
        .row("Rise / set", rise_set)
}

fn daylight_section(solar: &SolarContext) -> DetailSection {
    let t = &solar.today;
    let golden = match (
        solar.sunrise,
        t.golden_hour_end,
        t.golden_hour,
        solar.sunset,
    ) {
        (Some(am_start), Some(am_end), Some(pm_start), Some(pm_end)) => format!(
            "AM {}-{} · PM {}-{}",
            time(solar, Some(am_start)),
            time(solar, Some(am_end)),
            time(solar, Some(pm_start)),
            time(solar, Some(pm_end)),
        ),
        _ => PLACEHOLDER.to_string(),
    };
    let above_horizon = solar.day_length.map_or_else(
        || PLACEHOLDER.to_string(),
        |len| {
            let share = len.num_seconds() as f64 / 86_400.0 * 100.0;
            format!("{} ({} of day)", format_duration_hm(len), format_percent(share, 1))
        },
    );
    let change = match (solar.day_length, solar.day_length_tomorrow) {
        (Some(today), Some(tomorrow)) if today == tomorrow => "No change".to_string(),
        (Some(today), Some(tomorrow)) => {
            format!("{} daylight", format_signed_minutes(tomorrow - today))
        }
        _ => PLACEHOLDER.to_string(),
    };

    DetailSection::new("Daylight")
        .row("Dawn", time(solar, t.dawn.or(solar.sunrise)))
        .row("Dusk", time(solar, t.dusk.or(solar.sunset)))
        .row("Golden hour", golden)
        .row("Above horizon", above_horizon)
        .row("Tomorrow", change)
}

fn season_section(solar: &SolarContext, now: DateTime<Utc>) -> DetailSection {
    let info = season_info(now);
    let days = |n: i64| match n {
        0 => "Today".to_string(),
        1 => "1 day".to_string(),
        n => format!("{n} days"),
    };
    DetailSection::new("Season")
        .row("Current", format!("{} ({})", info.current.label(), info.current.months()))
        .row("Next", info.next_name)
        .row("Next in", days(info.days_until_next))
        .row(
            "Next on",
            solar.local(info.next_date).format("%B %-d, %H:%M").to_string(),
        )
        .row("Since previous", days(info.days_since_previous))
        .row("Hemisphere", format_hemisphere(solar.latitude))
}

fn sky_events_section(solar: &SolarContext, now: DateTime<Utc>) -> DetailSection {
    let section = DetailSection::new("Sky events");
    let Some(upcoming) = next_astronomical_event(now) else {
        return section
            .row("Next", "No upcoming events")
            .row("When", PLACEHOLDER)
            .row("Type", PLACEHOLDER)
            .row("Date", PLACEHOLDER)
            .row("Visible from", PLACEHOLDER)
            .row("After that", PLACEHOLDER);
    };
    let local = solar.local(upcoming.next_at);
    let after = upcoming.following.map_or_else(
        || "None listed".to_string(),
        |(event, at)| format!("{} ({})", event.name, relative_event_date(at, now)),
    );
    section
        .row("Next", upcoming.next.name)
        .row("When", relative_event_date(upcoming.next_at, now))
        .row("Type", upcoming.next.kind.label())
        .row(
            "Date",
            format!("{} at {}", local.format("%b %-d, %Y"), format_time_detail(Some(local))),
        )
        .row("Visible from", upcoming.next.visibility)
        .row("After that", after)
}

fn weather_section(report: &WeatherReport, units: Units) -> DetailSection {
    let current = &report.current;
    let today = report.today();
    let precipitation = today.map_or_else(
        || PLACEHOLDER.to_string(),
        |day| match (day.precipitation_probability_max, day.precipitation_sum_mm) {
            (Some(chance), Some(sum)) => format!("{chance:.0}% chance · {sum:.1} mm"),
            (Some(chance), None) => format!("{chance:.0}% chance"),
            (None, Some(sum)) => format!("{sum:.1} mm"),
            (None, None) => PLACEHOLDER.to_string(),
        },
    );
    let temp = |c: f32| format!("{}°{}", round_temp(convert_temp(c, units)), units.symbol());
    DetailSection::new("Weather")
        .row(
            "Conditions",
            describe_weather_code(current.weather_code, current.cloud_cover),
        )
        .row("Temperature", temp(current.temperature_c))
        .row(
            "Feels like",
            current
                .apparent_temperature_c
                .map_or_else(|| PLACEHOLDER.to_string(), temp),
        )
        .row(
            "Humidity",
            current
                .relative_humidity
                .map_or_else(|| PLACEHOLDER.to_string(), |h| format_percent(f64::from(h), 0)),
        )
        .row("Wind", format_wind(current.wind_speed_ms, current.wind_gust_ms))
        .row("Precipitation", precipitation)
        .row(
            "Wind today",
            format_wind(
                today.and_then(|day| day.wind_speed_max_ms),
                today.and_then(|day| day.wind_gust_max_ms),
            ),
        )
}

/// `in 2 hours, 5 minutes` for a sun event later today; `None` once it has passed or is a
/// day or more away.
fn time_until(target: DateTime<Utc>, now: DateTime<Utc>) -> Option<String> {
    let remaining = target - now;
    if remaining <= Duration::zero() || remaining >= Duration::days(1) {
        return None;
    }
    if remaining < Duration::minutes(2) {
        return Some("in moments".to_string());
    }
    Some(format_countdown(remaining))
}

fn upcoming_sun_phrase(solar: &SolarContext, now: DateTime<Utc>) -> Option<String> {
    let (sunrise, sunset) = solar.sunrise.zip(solar.sunset)?;
    time_until(sunrise, now)
        .map(|rel| format!("Sunrise {rel}"))
        .or_else(|| time_until(sunset, now).map(|rel| format!("Sunset {rel}")))
}

fn capitalized(text: &str) -> String {
    let mut chars = text.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Two sentences for the banner: the next sun event with the day's range, then conditions and
/// the moon, e.g. `Sunset in 3 hours, 25°C high, 13°C low. Light rain with 70% chance of
/// precipitation, Waxing Gibbous (62% illuminated).`
#[must_use]
pub fn daily_summary(
    solar: &SolarContext,
    report: Option<&WeatherReport>,
    now: DateTime<Utc>,
    units: Units,
) -> String {
    let sun = upcoming_sun_phrase(solar, now).or_else(|| {
        solar
            .sunrise
            .filter(|sunrise| *sunrise <= now)
            .map(|sunrise| format!("Sunrise was at {}", time(solar, Some(sunrise))))
    });
    let today = report.and_then(WeatherReport::today);
    let symbol = units.symbol();
    let temps = today.and_then(|day| {
        let max = round_temp(convert_temp(day.temperature_max_c?, units));
        Some(match day.temperature_min_c {
            Some(min) => format!(
                "{max}°{symbol} high, {}°{symbol} low",
                round_temp(convert_temp(min, units))
            ),
            None => format!("High of {max}°{symbol}"),
        })
    });
    let conditions = report.and_then(|report| {
        let desc = weather_label(report.current.weather_code?).to_lowercase();
        Some(
            match today
                .and_then(|day| day.precipitation_probability_max)
                .filter(|chance| *chance > PRECIP_MENTION_PERCENT)
            {
                Some(chance) => format!("{desc} with {chance:.0}% chance of precipitation"),
                None => desc,
            },
        )
    });
    let illum = solar.moon_illumination(now);
    let moon = format!(
        "{} ({:.0}% illuminated)",
        moon_label(illum.phase),
        illum.fraction * 100.0
    );

    let lead: Vec<String> = [sun, temps].into_iter().flatten().collect();
    let rest: Vec<String> = conditions.into_iter().chain([moon]).collect();
    let mut sentences = Vec::with_capacity(2);
    if !lead.is_empty() {
        sentences.push(format!("{}.", lead.join(", ")));
    }
    sentences.push(format!("{}.", capitalized(&rest.join(", "))));
    sentences.join(" ")
}

/// Narrow-layout variant: `Sunset in 3 hours · 25°/13° · Waxing Gibbous`.
#[must_use]
pub fn short_summary(
    solar: &SolarContext,
    report: Option<&WeatherReport>,
    now: DateTime<Utc>,
    units: Units,
) -> String {
    let mut parts: Vec<String> = upcoming_sun_phrase(solar, now).into_iter().collect();
    if let Some((high, low)) = report.and_then(|report| report.high_low(units)) {
        parts.push(format!("{high}°/{low}°"));
    }
    parts.push(moon_label(solar.moon_illumination(now).phase).to_string());
    parts.join(" · ")
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone, Utc};

    use super::*;
    use crate::test_support::sample_report;

    fn context() -> (SolarContext, DateTime<Utc>) {
        let now = Utc.with_ymd_and_hms(2013, 3, 5, 9, 0, 0).unwrap();
        let ctx = SolarContext::build(
            now,
            50.5,
            30.5,
            FixedOffset::east_opt(7200).unwrap(),
            None,
            None,
        );
        (ctx, now)
    }

    #[test]
    fn sections_cover_every_card_without_weather() {
        let (ctx, now) = context();
        let sections = detail_sections(&ctx, now, None, Units::Celsius);
        let titles: Vec<_> = sections.iter().map(|s| s.title).collect();
        assert_eq!(
            titles,
            [
                "Solar noon",
                "Sunrise",
                "Sunset",
                "Night",
                "Moon",
                "Daylight",
                "Season",
                "Sky events"
            ]
        );
    }

    #[test]
    fn solar_noon_row_reads_local_time() {
        let (ctx, now) = context();
        let sections = detail_sections(&ctx, now, None, Units::Celsius);
        let noon = &sections[0];
        // 10:10 UTC is 12:10 in UTC+2.
        assert_eq!(noon.value("Time"), Some("12:10 PM"));
        assert!(noon.value("Offset from 12:00").unwrap().starts_with('+'));
        assert_eq!(sections[6].value("Hemisphere"), Some("Northern Hemisphere"));
    }

    #[test]
    fn moon_section_uses_phase_labels() {
        let (ctx, _) = context();
        let midnight = Utc.with_ymd_and_hms(2013, 3, 5, 0, 0, 0).unwrap();
        let sections = detail_sections(&ctx, midnight, None, Units::Celsius);
        let moon = sections.iter().find(|s| s.title == "Moon").unwrap();
        assert_eq!(moon.value("Phase"), Some("Last Quarter"));
        assert_eq!(moon.value("Illumination"), Some("48.5%"));
    }

    fn midsummer(hour: u32, minute: u32) -> (WeatherReport, SolarContext, DateTime<Utc>) {
        let report = sample_report(Some(61), Some(90.0));
        let now = Utc.with_ymd_and_hms(2026, 6, 21, hour, minute, 0).unwrap();
        let solar = SolarContext::from_report(&report, now);
        (report, solar, now)
    }

    #[test]
    fn sky_events_show_the_next_two_in_order() {
        let (report, solar, now) = midsummer(10, 0);
        let sections = detail_sections(&solar, now, Some(&report), Units::Celsius);
        let events = sections.iter().find(|s| s.title == "Sky events").unwrap();
        assert_eq!(events.value("Next"), Some("Total Solar Eclipse"));
        assert_eq!(events.value("When"), Some("in 1 month"));
        assert_eq!(events.value("Type"), Some("Solar Eclipse"));
        assert_eq!(events.value("Date"), Some("Aug 12, 2026 at 7:47 PM"));
        assert_eq!(
            events.value("After that"),
            Some("Perseids Meteor Shower Peak (in 1 month)")
        );
    }

    #[test]
    fn sky_events_run_out_gracefully() {
        let (_, solar, _) = midsummer(10, 0);
        let later = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        let sections = detail_sections(&solar, later, None, Units::Celsius);
        let events = sections.last().unwrap();
        assert_eq!(events.value("Next"), Some("No upcoming events"));
        assert_eq!(events.value("After that"), Some(PLACEHOLDER));
    }

    #[test]
    fn weather_section_reports_daily_precipitation_and_wind() {
        let (report, solar, now) = midsummer(10, 0);
        let sections = detail_sections(&solar, now, Some(&report), Units::Celsius);
        let weather = sections.last().unwrap();
        assert_eq!(weather.title, "Weather");
        assert_eq!(weather.value("Precipitation"), Some("70% chance · 4.2 mm"));
        assert!(weather.value("Wind today").unwrap().starts_with("6.3 m/s"));
    }

    #[test]
    fn summary_leads_with_the_next_sun_event_and_range() {
        let (report, solar, now) = midsummer(10, 0);
        let summary = daily_summary(&solar, Some(&report), now, Units::Celsius);
        assert!(
            summary.starts_with(
                "Sunset in 10 hours, 8 minutes, 25°C high, 13°C low. \
                 Light rain with 70% chance of precipitation, "
            ),
            "{summary}"
        );
        assert!(summary.ends_with("% illuminated)."), "{summary}");
    }

    #[test]
    fn summary_after_sunset_recalls_sunrise() {
        let (report, solar, now) = midsummer(21, 0);
        let summary = daily_summary(&solar, Some(&report), now, Units::Fahrenheit);
        assert!(
            summary.starts_with("Sunrise was at 3:31 AM, 76°F high, 56°F low. "),
            "{summary}"
        );
    }

    #[test]
    fn summary_skips_unlikely_precipitation() {
        let (mut report, solar, now) = midsummer(1, 0);
        report.daily[0].precipitation_probability_max = Some(20.0);
        let summary = daily_summary(&solar, Some(&report), now, Units::Celsius);
        assert!(summary.starts_with("Sunrise in 31 minutes, "), "{summary}");
        assert!(summary.contains(" Light rain, "), "{summary}");
    }

    #[test]
    fn summary_without_weather_keeps_sun_and_moon() {
        let (_, solar, now) = midsummer(10, 0);
        let summary = daily_summary(&solar, None, now, Units::Celsius);
        assert!(summary.starts_with("Sunset in 10 hours, 8 minutes. "), "{summary}");
        assert!(summary.ends_with("% illuminated)."), "{summary}");
    }

    #[test]
    fn short_summary_joins_with_dots() {
        let (report, solar, now) = midsummer(10, 0);
        let short = short_summary(&solar, Some(&report), now, Units::Celsius);
        assert!(short.starts_with("Sunset in 10 hours, 8 minutes · 25°/13° · "), "{short}");
        assert_eq!(short.matches(" · ").count(), 2);
    }
}
