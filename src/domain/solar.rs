#![allow(clippy::cast_precision_loss)]

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, TimeZone, Utc};

use crate::domain::{
    astro::{self, MoonIllumination, MoonPosition, MoonTimes, SunPosition, SunTimes},
    weather::{WeatherReport, local_to_utc},
};

/// Sun and moon facts for one location and one local day, rebuilt on every weather refresh.
#[derive(Debug, Clone)]
pub struct SolarContext {
    pub latitude: f64,
    pub longitude: f64,
    pub offset: FixedOffset,
    pub local_midnight: DateTime<Utc>,
    pub today: SunTimes,
    pub tomorrow: SunTimes,
    pub day_after: SunTimes,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub tomorrow_sunrise: Option<DateTime<Utc>>,
    pub tomorrow_sunset: Option<DateTime<Utc>>,
    pub day_length: Option<Duration>,
    pub day_length_tomorrow: Option<Duration>,
    pub moon_times: MoonTimes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolarEventKind {
    AstronomicalDawn,
    NauticalDawn,
    CivilDawn,
    Sunrise,
    GoldenHourEnd,
    SolarNoon,
    GoldenHour,
    Sunset,
    CivilDusk,
    NauticalDusk,
    AstronomicalDusk,
}

impl SolarEventKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::AstronomicalDawn => "Astronomical Dawn",
            Self::NauticalDawn => "Nautical Dawn",
            Self::CivilDawn => "Civil Dawn",
            Self::Sunrise => "Sunrise",
            Self::GoldenHourEnd => "Golden Hour End",
            Self::SolarNoon => "Solar Noon",
            Self::GoldenHour => "Golden Hour",
            Self::Sunset => "Sunset",
            Self::CivilDusk => "Civil Dusk",
            Self::NauticalDusk => "Nautical Dusk",
            Self::AstronomicalDusk => "Astronomical Dusk",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolarEvent {
    pub kind: SolarEventKind,
    pub time: DateTime<Utc>,
}

/// Three vertical colour stops for the sky behind the sun path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkyPalette {
    pub top: [u8; 3],
    pub middle: [u8; 3],
    pub bottom: [u8; 3],
}

impl SkyPalette {
    pub const NIGHT: Self = Self {
        top: [0x02, 0x05, 0x10],
        middle: [0x0a, 0x19, 0x29],
        bottom: [0x00, 0x00, 0x00],
    };
    pub const NAUTICAL: Self = Self {
        top: [0x1a, 0x28, 0x40],
        middle: [0x2d, 0x46, 0x63],
        bottom: [0x0a, 0x14, 0x24],
    };
    pub const CIVIL: Self = Self {
        top: [0x4a, 0x6f, 0xa5],
        middle: [0xff, 0x9a, 0x56],
        bottom: [0xff, 0xd8, 0x9b],
    };
    pub const GOLDEN: Self = Self {
        top: [0xff, 0x6b, 0x35],
        middle: [0xf7, 0x93, 0x1e],
        bottom: [0xff, 0xd8, 0x9b],
    };
    pub const DAY: Self = Self {
        top: [0x1e, 0x4d, 0x8b],
        middle: [0x4a, 0x90, 0xc8],
        bottom: [0x87, 0xce, 0xeb],
    };
    pub const UNKNOWN: Self = Self {
        top: [0x0a, 0x19, 0x29],
        middle: [0x0f, 0x27, 0x44],
        bottom: [0x00, 0x00, 0x00],
    };

    #[must_use]
    pub fn lerp(self, other: Self, t: f64) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mix = |a: [u8; 3], b: [u8; 3]| {
            let mut out = [0_u8; 3];
            for (idx, slot) in out.iter_mut().enumerate() {
                let value = f64::from(a[idx]) + (f64::from(b[idx]) - f64::from(a[idx])) * t;
                *slot = value.round().clamp(0.0, 255.0) as u8;
            }
            out
        };
        Self {
            top: mix(self.top, other.top),
            middle: mix(self.middle, other.middle),
            bottom: mix(self.bottom, other.bottom),
        }
    }
}

/// One point of the day's sun-altitude curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathSample {
    pub minutes: u32,
    pub altitude_deg: f64,
    pub azimuth_deg: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Autumn => "Autumn",
            Self::Winter => "Winter",
        }
    }

    #[must_use]
    pub fn months(self) -> &'static str {
        match self {
            Self::Spring => "March - May",
            Self::Summer => "June - August",
            Self::Autumn => "September - November",
            Self::Winter => "December - February",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonInfo {
    pub current: Season,
    pub next_name: &'static str,
    pub next_date: DateTime<Utc>,
    pub days_until_next: i64,
    pub previous_name: &'static str,
    pub days_since_previous: i64,
}

fn fraction_between(now: DateTime<Utc>, start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let span = (end - start).num_milliseconds() as f64;
    if span <= 0.0 {
        return 1.0;
    }
    (now - start).num_milliseconds() as f64 / span
}

impl SolarContext {
    /// Computes today's and tomorrow's sun times for the local day containing `now`.
    /// `sunrise` and `sunset` from the forecast win over the computed ones when present.
    #[must_use]
    pub fn build(
        now: DateTime<Utc>,
        latitude: f64,
        longitude: f64,
        offset: FixedOffset,
        sunrise: Option<DateTime<Utc>>,
        sunset: Option<DateTime<Utc>>,
    ) -> Self {
        let local_date = offset.from_utc_datetime(&now.naive_utc()).date_naive();
        let at_local = |days: i64, time: NaiveTime| {
            let date = local_date + Duration::days(days);
            local_to_utc(date.and_time(time), offset).unwrap_or(now)
        };
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN);
        let local_midnight = at_local(0, NaiveTime::MIN);

        let today = astro::sun_times(at_local(0, noon), latitude, longitude);
        let tomorrow = astro::sun_times(at_local(1, noon), latitude, longitude);
        let day_after = astro::sun_times(at_local(2, noon), latitude, longitude);

        let sunrise = sunrise.or(today.sunrise);
        let sunset = sunset.or(today.sunset);
        let day_length = sunrise.zip(sunset).map(|(rise, set)| set - rise);
        let day_length_tomorrow = tomorrow.sunrise.zip(tomorrow.sunset).map(|(r, s)| s - r);

        Self {
            latitude,
            longitude,
            offset,
            local_midnight,
            today,
            tomorrow,
            day_after,
            sunrise,
            sunset,
            tomorrow_sunrise: tomorrow.sunrise,
            tomorrow_sunset: tomorrow.sunset,
            day_length,
            day_length_tomorrow,
            moon_times: astro::moon_times(local_midnight, latitude, longitude),
        }
    }

    #[must_use]
    pub fn with_tomorrow(
        mut self,
        sunrise: Option<DateTime<Utc>>,
        sunset: Option<DateTime<Utc>>,
    ) -> Self {
        self.tomorrow_sunrise = sunrise.or(self.tomorrow_sunrise);
        self.tomorrow_sunset = sunset.or(self.tomorrow_sunset);
        self
    }

    #[must_use]
    pub fn with_day_lengths(mut self, today: Option<Duration>, tomorrow: Option<Duration>) -> Self {
        self.day_length = today.or(self.day_length);
        self.day_length_tomorrow = tomorrow.or(self.day_length_tomorrow);
        self
    }

    #[must_use]
    pub fn from_report(report: &WeatherReport, now: DateTime<Utc>) -> Self {
        let offset = report.utc_offset;
        let to_utc = |value| local_to_utc(value, offset);
        let daylight = |seconds: f64| Duration::milliseconds((seconds * 1000.0).round() as i64);
        let tomorrow = report.tomorrow();

        Self::build(
            now,
            report.location.latitude,
            report.location.longitude,
            offset,
            report.sunrise_utc(),
            report.sunset_utc(),
        )
        .with_tomorrow(
            tomorrow.and_then(|day| day.sunrise).and_then(to_utc),
            tomorrow.and_then(|day| day.sunset).and_then(to_utc),
        )
        .with_day_lengths(
            report
                .today()
                .and_then(|day| day.daylight_duration_s)
                .map(daylight),
            tomorrow
                .and_then(|day| day.daylight_duration_s)
                .map(daylight),
        )
    }

    #[must_use]
    pub fn local(&self, t: DateTime<Utc>) -> DateTime<FixedOffset> {
        self.offset.from_utc_datetime(&t.naive_utc())
    }

    /// `None` when the sun neither rises nor sets today.
    #[must_use]
    pub fn is_night(&self, now: DateTime<Utc>) -> Option<bool> {
        let (sunrise, sunset) = self.sunrise.zip(self.sunset)?;
        Some(now < sunrise || now >= sunset)
    }

    fn events_of(
        times: &SunTimes,
        sunrise: Option<DateTime<Utc>>,
        sunset: Option<DateTime<Utc>>,
    ) -> [(SolarEventKind, Option<DateTime<Utc>>); 11] {
        [
            (SolarEventKind::AstronomicalDawn, times.night_end),
            (SolarEventKind::NauticalDawn, times.nautical_dawn),
            (SolarEventKind::CivilDawn, times.dawn),
            (SolarEventKind::Sunrise, sunrise),
            (SolarEventKind::GoldenHourEnd, times.golden_hour_end),
            (SolarEventKind::SolarNoon, Some(times.solar_noon)),
            (SolarEventKind::GoldenHour, times.golden_hour),
            (SolarEventKind::Sunset, sunset),
            (SolarEventKind::CivilDusk, times.dusk),
            (SolarEventKind::NauticalDusk, times.nautical_dusk),
            (SolarEventKind::AstronomicalDusk, times.night),
        ]
    }

    /// Earliest of today's events still ahead of `now`, then tomorrow's.
    #[must_use]
    pub fn next_event(&self, now: DateTime<Utc>) -> Option<SolarEvent> {
        let upcoming = |events: [(SolarEventKind, Option<DateTime<Utc>>); 11]| {
            events
                .into_iter()
                .filter_map(|(kind, time)| time.filter(|t| *t > now).map(|time| SolarEvent { kind, time }))
                .min_by_key(|event| event.time)
        };
        upcoming(Self::events_of(&self.today, self.sunrise, self.sunset)).or_else(|| {
            upcoming(Self::events_of(
                &self.tomorrow,
                self.tomorrow_sunrise,
                self.tomorrow_sunset,
            ))
        })
    }

    #[must_use]
    pub fn sky_palette(&self, now: DateTime<Utc>) -> SkyPalette {
        let (Some(sunrise), Some(sunset)) = (self.sunrise, self.sunset) else {
            return SkyPalette::UNKNOWN;
        };
        let t = &self.today;
        // (start, end, from, to); a band applies while `now` is before its end.
        let bands = [
            (Some(DateTime::<Utc>::MIN_UTC), t.night_end.or(t.nautical_dawn), SkyPalette::NIGHT, SkyPalette::NIGHT),
            (t.nautical_dawn, t.dawn, SkyPalette::NIGHT, SkyPalette::NAUTICAL),
            (t.dawn, Some(sunrise), SkyPalette::NAUTICAL, SkyPalette::CIVIL),
            (Some(sunrise), t.golden_hour_end, SkyPalette::CIVIL, SkyPalette::DAY),
            (t.golden_hour_end, t.golden_hour, SkyPalette::DAY, SkyPalette::DAY),
            (t.golden_hour, Some(sunset), SkyPalette::DAY, SkyPalette::GOLDEN),
            (Some(sunset), t.dusk, SkyPalette::GOLDEN, SkyPalette::CIVIL),
            (t.dusk, t.nautical_dusk, SkyPalette::CIVIL, SkyPalette::NAUTICAL),
            (t.nautical_dusk, t.night, SkyPalette::NAUTICAL, SkyPalette::NIGHT),
        ];
        for (start, end, from, to) in bands {
            let (Some(start), Some(end)) = (start, end) else {
                continue;
            };
            if now < end {
                if from == to {
                    return from;
                }
                return from.lerp(to, fraction_between(now, start, end));
            }
        }
        SkyPalette::NIGHT
    }

    /// 0 at sunrise, 1 at sunset; slightly below 0 before dawn and above 1 after dusk.
    #[must_use]
    pub fn day_progress(&self, now: DateTime<Utc>) -> Option<f64> {
        let (sunrise, sunset) = self.sunrise.zip(self.sunset)?;
        let day_end = self.local_midnight + Duration::days(1);
        let progress = if now < sunrise {
            fraction_between(now, self.local_midnight, sunrise) * -0.1
        } else if now > sunset {
            1.0 + fraction_between(now, sunset, day_end) * 0.1
        } else {
            fraction_between(now, sunrise, sunset)
        };
        Some(progress)
    }

    /// Star visibility for the sun-path strip: 0 in daylight, ramping to 1 around sunset.
    #[must_use]
    pub fn night_opacity(&self, now: DateTime<Utc>) -> f64 {
        let Some(progress) = self.day_progress(now) else {
            return 1.0;
        };
        let opacity = if !(-0.05..=1.05).contains(&progress) {
            1.0
        } else if progress < 0.0 {
            progress.abs() / 0.05
        } else if progress > 1.0 {
            (progress - 1.0) / 0.05
        } else {
            0.0
        };
        opacity.clamp(0.0, 1.0)
    }

    /// Sun altitude over the local day, one sample every `step_minutes`.
    #[must_use]
    pub fn sun_path(&self, step_minutes: u32) -> Vec<PathSample> {
        let step = step_minutes.max(1);
        (0..1440)
            .step_by(step as usize)
            .map(|minutes| {
                let time = self.local_midnight + Duration::minutes(i64::from(minutes));
                let pos = self.sun_position(time);
                PathSample {
                    minutes,
                    altitude_deg: pos.altitude.to_degrees(),
                    azimuth_deg: astro::north_azimuth_deg(pos.azimuth),
                }
            })
            .collect()
    }

    /// Minutes since local midnight, for placing `now` on the sun path.
    #[must_use]
    pub fn minute_of_day(&self, now: DateTime<Utc>) -> f64 {
        ((now - self.local_midnight).num_seconds() as f64 / 60.0).clamp(0.0, 1439.0)
    }

    #[must_use]
    pub fn sun_position(&self, t: DateTime<Utc>) -> SunPosition {
        astro::sun_position(t, self.latitude, self.longitude)
    }

    #[must_use]
    pub fn moon_position(&self, t: DateTime<Utc>) -> MoonPosition {
        astro::moon_position(t, self.latitude, self.longitude)
    }

    #[must_use]
    pub fn moon_illumination(&self, t: DateTime<Utc>) -> MoonIllumination {
        astro::moon_illumination(t)
    }

    /// Tonight's astronomical dusk and the following astronomical dawn, with fallbacks to
    /// shallower twilights where the sun never gets 18° below the horizon.
    #[must_use]
    pub fn night_window(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let dusk = self
            .today
            .night
            .or(self.today.nautical_dusk)
            .or(self.sunset);
        let dawn = self
            .tomorrow
            .night_end
            .or(self.tomorrow.nautical_dawn)
            .or(self.tomorrow.dawn)
            .or(self.tomorrow_sunrise);
        (dusk, dawn)
    }

    #[must_use]
    pub fn tomorrow_night_window(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        (
            self.tomorrow.night.or(self.tomorrow.nautical_dusk),
            self.day_after.night_end.or(self.day_after.nautical_dawn),
        )
    }
}

#[must_use]
pub fn moon_label(phase: f64) -> &'static str {
    match phase {
        p if !(0.03..=0.97).contains(&p) => "New Moon",
        p if p < 0.22 => "Waxing Crescent",
        p if p < 0.28 => "First Quarter",
        p if p < 0.47 => "Waxing Gibbous",
        p if p < 0.53 => "Full Moon",
        p if p < 0.72 => "Waning Gibbous",
        p if p < 0.78 => "Last Quarter",
        _ => "Waning Crescent",
    }
}

const SEASON_MARKERS: [(&str, u32, u32, u32); 4] = [
    ("March Equinox", 3, 20, 9),
    ("June Solstice", 6, 21, 14),
    ("September Equinox", 9, 22, 18),
    ("December Solstice", 12, 21, 15),
];

fn season_markers(year: i32) -> Vec<(&'static str, DateTime<Utc>)> {
    SEASON_MARKERS
        .iter()
        .filter_map(|&(name, month, day, hour)| {
            Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
                .single()
                .map(|date| (name, date))
        })
        .collect()
}

/// Meteorological-ish season from fixed equinox and solstice instants (UTC).
#[must_use]
pub fn season_info(now: DateTime<Utc>) -> SeasonInfo {
    let year = now.year();
    let mut events = season_markers(year - 1);
    events.extend(season_markers(year));
    events.extend(season_markers(year + 1));

    let next_idx = events
        .iter()
        .position(|(_, date)| *date > now)
        .unwrap_or(events.len() - 1);
    let prev_idx = next_idx.checked_sub(1).unwrap_or(events.len() - 1);
    let (next_name, next_date) = events[next_idx];
    let (previous_name, previous_date) = events[prev_idx];

    let this_year = season_markers(year);
    let current = match this_year.as_slice() {
        [(_, spring), (_, summer), (_, autumn), (_, winter)] => {
            if now >= *spring && now < *summer {
                Season::Spring
            } else if now >= *summer && now < *autumn {
                Season::Summer
            } else if now >= *autumn && now < *winter {
                Season::Autumn
            } else {
                Season::Winter
            }
        }
        _ => Season::Winter,
    };

    SeasonInfo {
        current,
        next_name,
        next_date,
        days_until_next: (next_date - now).num_days().max(0),
        previous_name,
        days_since_previous: (now - previous_date).num_days().max(0),
    }
}

#[cfg(test)]
mod tests;
