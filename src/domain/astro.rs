//! Sun and moon positions, event times and lunar illumination.
//!
//! Angles are radians. Azimuth is measured from south, positive towards west; use
//! [`north_azimuth_deg`] to turn it into a compass bearing.

#![allow(clippy::many_single_char_names, clippy::cast_precision_loss)]

use std::f64::consts::PI;

use chrono::{DateTime, Duration, TimeZone, Utc};

const RAD: f64 = PI / 180.0;
const DAY_MS: f64 = 86_400_000.0;
const J1970: f64 = 2_440_588.0;
const J2000: f64 = 2_451_545.0;
const J0: f64 = 0.0009;
const OBLIQUITY: f64 = RAD * 23.4397;
const SUN_DISTANCE_KM: f64 = 149_598_000.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunPosition {
    pub azimuth: f64,
    pub altitude: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonPosition {
    pub azimuth: f64,
    pub altitude: f64,
    pub distance_km: f64,
    pub parallactic_angle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonIllumination {
    pub fraction: f64,
    /// 0 new, 0.25 first quarter, 0.5 full, 0.75 last quarter.
    pub phase: f64,
    pub angle: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MoonTimes {
    pub rise: Option<DateTime<Utc>>,
    pub set: Option<DateTime<Utc>>,
    pub always_up: bool,
    pub always_down: bool,
}

/// Sun event times for one day. Events the sun never reaches at this latitude are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SunTimes {
    pub solar_noon: DateTime<Utc>,
    pub nadir: DateTime<Utc>,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub sunrise_end: Option<DateTime<Utc>>,
    pub sunset_start: Option<DateTime<Utc>>,
    pub dawn: Option<DateTime<Utc>>,
    pub dusk: Option<DateTime<Utc>>,
    pub nautical_dawn: Option<DateTime<Utc>>,
    pub nautical_dusk: Option<DateTime<Utc>>,
    pub night_end: Option<DateTime<Utc>>,
    pub night: Option<DateTime<Utc>>,
    pub golden_hour_end: Option<DateTime<Utc>>,
    pub golden_hour: Option<DateTime<Utc>>,
}

fn to_julian(t: DateTime<Utc>) -> f64 {
    t.timestamp_millis() as f64 / DAY_MS - 0.5 + J1970
}

fn from_julian(j: f64) -> DateTime<Utc> {
    let millis = ((j + 0.5 - J1970) * DAY_MS).round() as i64;
    Utc.timestamp_millis_opt(millis)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

fn to_days(t: DateTime<Utc>) -> f64 {
    to_julian(t) - J2000
}

fn right_ascension(l: f64, b: f64) -> f64 {
    (l.sin() * OBLIQUITY.cos() - b.tan() * OBLIQUITY.sin()).atan2(l.cos())
}

fn declination(l: f64, b: f64) -> f64 {
    (b.sin() * OBLIQUITY.cos() + b.cos() * OBLIQUITY.sin() * l.sin()).asin()
}

fn azimuth(h: f64, phi: f64, dec: f64) -> f64 {
    h.sin().atan2(h.cos() * phi.sin() - dec.tan() * phi.cos())
}

fn altitude(h: f64, phi: f64, dec: f64) -> f64 {
    (phi.sin() * dec.sin() + phi.cos() * dec.cos() * h.cos()).asin()
}

fn sidereal_time(d: f64, lw: f64) -> f64 {
    RAD * (280.16 + 360.985_623_5 * d) - lw
}

fn astro_refraction(h: f64) -> f64 {
    let h = h.max(0.0);
    0.000_296_7 / (h + 0.003_125_36 / (h + 0.089_011_79)).tan()
}

fn solar_mean_anomaly(d: f64) -> f64 {
    RAD * (357.5291 + 0.985_600_28 * d)
}

fn ecliptic_longitude(m: f64) -> f64 {
    let center = RAD * (1.9148 * m.sin() + 0.02 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin());
    let perihelion = RAD * 102.9372;
    m + center + perihelion + PI
}

struct EquatorialCoords {
    dec: f64,
    ra: f64,
    dist: f64,
}

fn sun_coords(d: f64) -> EquatorialCoords {
    let l = ecliptic_longitude(solar_mean_anomaly(d));
    EquatorialCoords {
        dec: declination(l, 0.0),
        ra: right_ascension(l, 0.0),
        dist: SUN_DISTANCE_KM,
    }
}

fn moon_coords(d: f64) -> EquatorialCoords {
    let l = RAD * (218.316 + 13.176_396 * d);
    let m = RAD * (134.963 + 13.064_993 * d);
    let f = RAD * (93.272 + 13.229_350 * d);

    let lon = l + RAD * 6.289 * m.sin();
    let lat = RAD * 5.128 * f.sin();
    EquatorialCoords {
        ra: right_ascension(lon, lat),
        dec: declination(lon, lat),
        dist: 385_001.0 - 20_905.0 * m.cos(),
    }
}

#[must_use]
pub fn sun_position(t: DateTime<Utc>, lat: f64, lon: f64) -> SunPosition {
    let lw = RAD * -lon;
    let phi = RAD * lat;
    let d = to_days(t);
    let c = sun_coords(d);
    let h = sidereal_time(d, lw) - c.ra;
    SunPosition {
        azimuth: azimuth(h, phi, c.dec),
        altitude: altitude(h, phi, c.dec),
    }
}

fn julian_cycle(d: f64, lw: f64) -> f64 {
    (d - J0 - lw / (2.0 * PI)).round()
}

fn approx_transit(ht: f64, lw: f64, n: f64) -> f64 {
    J0 + (ht + lw) / (2.0 * PI) + n
}

fn solar_transit_j(ds: f64, m: f64, l: f64) -> f64 {
    J2000 + ds + 0.0053 * m.sin() - 0.0069 * (2.0 * l).sin()
}

fn hour_angle(h: f64, phi: f64, dec: f64) -> Option<f64> {
    let cos_h = (h.sin() - phi.sin() * dec.sin()) / (phi.cos() * dec.cos());
    (-1.0..=1.0).contains(&cos_h).then(|| cos_h.acos())
}

/// Rise and set times for one sun altitude (degrees).
struct DayGeometry {
    lw: f64,
    phi: f64,
    dec: f64,
    n: f64,
    m: f64,
    l: f64,
    j_noon: f64,
}

impl DayGeometry {
    fn new(t: DateTime<Utc>, lat: f64, lon: f64) -> Self {
        let lw = RAD * -lon;
        let phi = RAD * lat;
        let d = to_days(t);
        let n = julian_cycle(d, lw);
        let ds = approx_transit(0.0, lw, n);
        let m = solar_mean_anomaly(ds);
        let l = ecliptic_longitude(m);
        Self {
            lw,
            phi,
            dec: declination(l, 0.0),
            n,
            m,
            l,
            j_noon: solar_transit_j(ds, m, l),
        }
    }

    fn rise_set(&self, angle_deg: f64) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let Some(w) = hour_angle(angle_deg * RAD, self.phi, self.dec) else {
            return (None, None);
        };
        let a = approx_transit(w, self.lw, self.n);
        let j_set = solar_transit_j(a, self.m, self.l);
        let j_rise = self.j_noon - (j_set - self.j_noon);
        (Some(from_julian(j_rise)), Some(from_julian(j_set)))
    }
}

#[must_use]
pub fn sun_times(t: DateTime<Utc>, lat: f64, lon: f64) -> SunTimes {
    let geo = DayGeometry::new(t, lat, lon);
    let (sunrise, sunset) = geo.rise_set(-0.833);
    let (sunrise_end, sunset_start) = geo.rise_set(-0.3);
    let (dawn, dusk) = geo.rise_set(-6.0);
    let (nautical_dawn, nautical_dusk) = geo.rise_set(-12.0);
    let (night_end, night) = geo.rise_set(-18.0);
    let (golden_hour_end, golden_hour) = geo.rise_set(6.0);

    SunTimes {
        solar_noon: from_julian(geo.j_noon),
        nadir: from_julian(geo.j_noon - 0.5),
        sunrise,
        sunset,
        sunrise_end,
        sunset_start,
        dawn,
        dusk,
        nautical_dawn,
        nautical_dusk,
        night_end,
        night,
        golden_hour_end,
        golden_hour,
    }
}

#[must_use]
pub fn moon_position(t: DateTime<Utc>, lat: f64, lon: f64) -> MoonPosition {
    let lw = RAD * -lon;
    let phi = RAD * lat;
    let d = to_days(t);
    let c = moon_coords(d);
    let h = sidereal_time(d, lw) - c.ra;
    let alt = altitude(h, phi, c.dec);
    let parallactic_angle = h
        .sin()
        .atan2(phi.tan() * c.dec.cos() - c.dec.sin() * h.cos());

    MoonPosition {
        azimuth: azimuth(h, phi, c.dec),
        altitude: alt + astro_refraction(alt),
        distance_km: c.dist,
        parallactic_angle,
    }
}

#[must_use]
pub fn moon_illumination(t: DateTime<Utc>) -> MoonIllumination {
    let d = to_days(t);
    let s = sun_coords(d);
    let m = moon_coords(d);

    let elongation = (s.dec.sin() * m.dec.sin() + s.dec.cos() * m.dec.cos() * (s.ra - m.ra).cos())
        .clamp(-1.0, 1.0)
        .acos();
    let inc = (s.dist * elongation.sin()).atan2(m.dist - s.dist * elongation.cos());
    let angle = (s.dec.cos() * (s.ra - m.ra).sin()).atan2(
        s.dec.sin() * m.dec.cos() - s.dec.cos() * m.dec.sin() * (s.ra - m.ra).cos(),
    );
    let direction = if angle < 0.0 { -1.0 } else { 1.0 };

    MoonIllumination {
        fraction: (1.0 + inc.cos()) / 2.0,
        phase: 0.5 + 0.5 * inc * direction / PI,
        angle,
    }
}

fn hours_later(t: DateTime<Utc>, hours: f64) -> DateTime<Utc> {
    t + Duration::milliseconds((hours * 3_600_000.0).round() as i64)
}

/// Moonrise and moonset within the 24 hours starting at `day_start`.
///
/// Scans two-hour windows and fits a parabola through three altitude samples in each.
#[must_use]
pub fn moon_times(day_start: DateTime<Utc>, lat: f64, lon: f64) -> MoonTimes {
    let hc = 0.133 * RAD;
    let alt_at = |hours: f64| moon_position(hours_later(day_start, hours), lat, lon).altitude - hc;

    let mut h0 = alt_at(0.0);
    let mut rise = None;
    let mut set = None;
    let mut ye = 0.0;

    let mut i = 1.0;
    while i <= 24.0 {
        let h1 = alt_at(i);
        let h2 = alt_at(i + 1.0);

        let a = (h0 + h2) / 2.0 - h1;
        let b = (h2 - h0) / 2.0;
        let xe = -b / (2.0 * a);
        ye = (a * xe + b) * xe + h1;
        let d = b * b - 4.0 * a * h1;

        if d >= 0.0 {
            let dx = d.sqrt() / (a.abs() * 2.0);
            let mut x1 = xe - dx;
            let x2 = xe + dx;
            let mut roots = 0;
            if x1.abs() <= 1.0 {
                roots += 1;
            }
            if x2.abs() <= 1.0 {
                roots += 1;
            }
            if x1 < -1.0 {
                x1 = x2;
            }

            if roots == 1 {
                if h0 < 0.0 {
                    rise = Some(i + x1);
                } else {
                    set = Some(i + x1);
                }
            } else if roots == 2 {
                let (r, s) = if ye < 0.0 { (x2, x1) } else { (x1, x2) };
                rise = Some(i + r);
                set = Some(i + s);
            }
        }

        if rise.is_some() && set.is_some() {
            break;
        }
        h0 = h2;
        i += 2.0;
    }

    let both_missing = rise.is_none() && set.is_none();
    MoonTimes {
        rise: rise.map(|h| hours_later(day_start, h)),
        set: set.map(|h| hours_later(day_start, h)),
        always_up: both_missing && ye > 0.0,
        always_down: both_missing && ye <= 0.0,
    }
}

/// Compass bearing in degrees (0 = north, clockwise) for a south-based azimuth in radians.
#[must_use]
pub fn north_azimuth_deg(azimuth: f64) -> f64 {
    (azimuth.to_degrees() + 180.0).rem_euclid(360.0)
}
