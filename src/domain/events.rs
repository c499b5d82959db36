//! Upcoming eclipses, meteor-shower peaks, equinoxes and solstices.

use chrono::{DateTime, TimeZone, Utc};
use EventKind::{Equinox, LunarEclipse, MeteorShower, SolarEclipse, Solstice};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    MeteorShower,
    LunarEclipse,
    SolarEclipse,
    Solstice,
    Equinox,
}

impl EventKind {
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::MeteorShower => "Meteor Shower",
            Self::LunarEclipse => "Lunar Eclipse",
            Self::SolarEclipse => "Solar Eclipse",
            Self::Solstice => "Solstice",
            Self::Equinox => "Equinox",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AstronomicalEvent {
    pub name: &'static str,
    /// Peak or maximum, UTC `(year, month, day, hour, minute)`.
    pub peak: (i32, u32, u32, u32, u32),
    pub kind: EventKind,
    pub visibility: &'static str,
    pub details: &'static str,
}

impl AstronomicalEvent {
    #[must_use]
    pub fn at(&self) -> Option<DateTime<Utc>> {
        let (year, month, day, hour, minute) = self.peak;
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).single()
    }
}

const fn event(
    name: &'static str,
    peak: (i32, u32, u32, u32, u32),
    kind: EventKind,
    visibility: &'static str,
    details: &'static str,
) -> AstronomicalEvent {
    AstronomicalEvent {
        name,
        peak,
        kind,
        visibility,
        details,
    }
}

const WORLDWIDE_AFTER_MIDNIGHT: &str = "Worldwide (best after midnight)";

#[rustfmt::skip]
pub static EVENTS: &[AstronomicalEvent] = &[
    event("Quadrantids Meteor Shower Peak", (2025, 1, 3, 10, 0), MeteorShower, WORLDWIDE_AFTER_MIDNIGHT, "Up to 120 meteors/hour at peak"),
    event("Partial Lunar Eclipse", (2025, 3, 14, 6, 58), LunarEclipse, "Americas, Europe, Africa", "Moon passes through Earth's penumbra"),
    event("Partial Solar Eclipse", (2025, 3, 29, 10, 48), SolarEclipse, "North America, Europe", "Partial eclipse visible from multiple continents"),
    event("Lyrids Meteor Shower Peak", (2025, 4, 22, 8, 0), MeteorShower, WORLDWIDE_AFTER_MIDNIGHT, "Up to 20 meteors/hour, debris from Comet Thatcher"),
    event("Eta Aquarids Meteor Shower Peak", (2025, 5, 6, 10, 0), MeteorShower, "Best in Southern Hemisphere", "Up to 60 meteors/hour, debris from Halley's Comet"),
    event("June Solstice", (2025, 6, 21, 2, 42), Solstice, "Worldwide", "Summer solstice (Northern) / Winter (Southern)"),
    event("Perseids Meteor Shower Peak", (2025, 8, 12, 16, 0), MeteorShower, "Worldwide (Northern Hemisphere favored)", "Up to 100 meteors/hour, one of the best annual showers"),
    event("Partial Lunar Eclipse", (2025, 9, 7, 18, 11), LunarEclipse, "Europe, Africa, Asia, Australia", "Moon partially enters Earth's umbra"),
    event("Annular Solar Eclipse", (2025, 9, 21, 19, 43), SolarEclipse, "Pacific, South America", "Ring of fire eclipse visible from path"),
    event("September Equinox", (2025, 9, 22, 18, 19), Equinox, "Worldwide", "Autumn equinox (Northern) / Spring (Southern)"),
    event("Orionids Meteor Shower Peak", (2025, 10, 21, 12, 0), MeteorShower, "Worldwide", "Up to 25 meteors/hour, debris from Halley's Comet"),
    event("Geminids Meteor Shower Peak", (2025, 12, 14, 7, 0), MeteorShower, "Worldwide", "Up to 120 meteors/hour, one of the best annual showers"),
    event("December Solstice", (2025, 12, 21, 15, 3), Solstice, "Worldwide", "Winter solstice (Northern) / Summer (Southern)"),
    event("Ursids Meteor Shower Peak", (2025, 12, 22, 12, 0), MeteorShower, "Northern Hemisphere", "Up to 10 meteors/hour"),
    event("Quadrantids Meteor Shower Peak", (2026, 1, 4, 4, 0), MeteorShower, WORLDWIDE_AFTER_MIDNIGHT, "Up to 120 meteors/hour at peak"),
    event("Total Lunar Eclipse", (2026, 3, 3, 11, 33), LunarEclipse, "Americas, Europe, Africa, Asia", "Total eclipse, Blood Moon visible"),
    event("March Equinox", (2026, 3, 20, 14, 46), Equinox, "Worldwide", "Spring equinox (Northern) / Autumn (Southern)"),
    event("Lyrids Meteor Shower Peak", (2026, 4, 22, 20, 0), MeteorShower, WORLDWIDE_AFTER_MIDNIGHT, "Up to 20 meteors/hour"),
    event("Eta Aquarids Meteor Shower Peak", (2026, 5, 6, 6, 0), MeteorShower, "Best in Southern Hemisphere", "Up to 60 meteors/hour"),
    event("June Solstice", (2026, 6, 21, 8, 24), Solstice, "Worldwide", "Summer solstice (Northern) / Winter (Southern)"),
    event("Total Solar Eclipse", (2026, 8, 12, 17, 47), SolarEclipse, "Arctic, Greenland, Iceland, Spain", "Path of totality across Europe"),
    event("Perseids Meteor Shower Peak", (2026, 8, 13, 4, 0), MeteorShower, "Worldwide (Northern Hemisphere favored)", "Up to 100 meteors/hour"),
    event("Partial Lunar Eclipse", (2026, 8, 28, 4, 13), LunarEclipse, "Americas, Europe, Africa", "Partial lunar eclipse visible"),
    event("September Equinox", (2026, 9, 23, 0, 5), Equinox, "Worldwide", "Autumn equinox (Northern) / Spring (Southern)"),
    event("Orionids Meteor Shower Peak", (2026, 10, 21, 18, 0), MeteorShower, "Worldwide", "Up to 25 meteors/hour"),
    event("Geminids Meteor Shower Peak", (2026, 12, 14, 12, 0), MeteorShower, "Worldwide", "Up to 120 meteors/hour"),
    event("December Solstice", (2026, 12, 21, 20, 50), Solstice, "Worldwide", "Winter solstice (Northern) / Summer (Southern)"),
    event("Quadrantids Meteor Shower Peak", (2027, 1, 3, 22, 0), MeteorShower, WORLDWIDE_AFTER_MIDNIGHT, "Up to 120 meteors/hour at peak"),
    event("Penumbral Lunar Eclipse", (2027, 2, 20, 23, 13), LunarEclipse, "Americas, Europe, Africa, Asia", "Subtle shading on Moon's surface"),
    event("March Equinox", (2027, 3, 20, 20, 25), Equinox, "Worldwide", "Spring equinox (Northern) / Autumn (Southern)"),
    event("Total Lunar Eclipse", (2027, 7, 18, 16, 2), LunarEclipse, "Americas, Europe, Africa", "Total lunar eclipse, Blood Moon"),
    event("Total Solar Eclipse", (2027, 8, 2, 10, 7), SolarEclipse, "North Africa, Middle East", "Total eclipse with 6+ minutes of totality"),
    event("Penumbral Lunar Eclipse", (2027, 8, 17, 7, 13), LunarEclipse, "Asia, Australia, Pacific", "Penumbral eclipse"),
];

/// The first event after `now` and the one following it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpcomingEvents {
    pub next: &'static AstronomicalEvent,
    pub next_at: DateTime<Utc>,
    pub following: Option<(&'static AstronomicalEvent, DateTime<Utc>)>,
}

/// `None` once every listed event has passed.
#[must_use]
pub fn next_astronomical_event(now: DateTime<Utc>) -> Option<UpcomingEvents> {
    let mut upcoming: Vec<_> = EVENTS
        .iter()
        .filter_map(|event| event.at().filter(|at| *at > now).map(|at| (event, at)))
        .collect();
    upcoming.sort_by_key(|(_, at)| *at);
    let mut upcoming = upcoming.into_iter();
    let (next, next_at) = upcoming.next()?;
    Some(UpcomingEvents {
        next,
        next_at,
        following: upcoming.next(),
    })
}

/// `Tomorrow`, `in 3 weeks`, ...; a full date once the event is a year or more away.
#[must_use]
pub fn relative_event_date(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (at - now).num_seconds().div_euclid(86_400);
    let plural = |count: i64, unit: &str| {
        if count == 1 {
            format!("in {count} {unit}")
        } else {
            format!("in {count} {unit}s")
        }
    };
    match days {
        ..=0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        2..=6 => plural(days, "day"),
        7..=29 => plural(days / 7, "week"),
        30..=364 => plural(days / 30, "month"),
        _ => at.format("%B %-d, %Y").to_string(),
    }
}
