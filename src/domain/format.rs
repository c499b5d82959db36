//! Text formatting shared by the detail panel, the sun-path strip and one-shot output.

use chrono::{DateTime, Duration, FixedOffset, Timelike};

pub const PLACEHOLDER: &str = "—";

/// `h:mm AM` clock split into time and meridiem.
#[must_use]
pub fn clock_parts(time: DateTime<FixedOffset>) -> (String, &'static str) {
    let hour = time.hour();
    let meridiem = if hour >= 12 { "PM" } else { "AM" };
    let hour12 = match hour % 12 {
        0 => 12,
        h => h,
    };
    (format!("{hour12}:{:02}", time.minute()), meridiem)
}

#[must_use]
pub fn format_time_detail(time: Option<DateTime<FixedOffset>>) -> String {
    match time {
        Some(time) => {
            let (clock, meridiem) = clock_parts(time);
            format!("{clock} {meridiem}")
        }
        None => PLACEHOLDER.to_string(),
    }
}

/// Compact `Xh Ym` duration; zero renders as `0m`.
#[must_use]
pub fn format_duration_hm(duration: Duration) -> String {
    let total_minutes = (duration.num_seconds().abs() as f64 / 60.0).round() as i64;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    let mut parts = Vec::with_capacity(2);
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 || hours == 0 {
        parts.push(format!("{minutes}m"));
    }
    parts.join(" ")
}

/// Long form used by the countdown lines: `2 hrs, 5 min`.
#[must_use]
pub fn format_hours_minutes(duration: Duration) -> String {
    let sign = if duration < Duration::zero() { "-" } else { "" };
    let secs = duration.num_seconds().abs();
    let hours = secs / 3600;
    let minutes = ((secs % 3600) as f64 / 60.0).round() as i64;
    let plural = if hours == 1 { "" } else { "s" };
    format!("{sign}{hours} hr{plural}, {minutes} min")
}

fn plural(count: i64, unit: &str) -> String {
    if count == 1 {
        format!("{count} {unit}")
    } else {
        format!("{count} {unit}s")
    }
}

/// Countdown to the next solar event: `in 2 hours, 5 minutes`.
#[must_use]
pub fn format_countdown(remaining: Duration) -> String {
    let total_minutes = remaining.num_minutes();
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 && minutes > 0 {
        format!("in {}, {}", plural(hours, "hour"), plural(minutes, "minute"))
    } else if hours > 0 {
        format!("in {}", plural(hours, "hour"))
    } else if minutes > 0 {
        format!("in {}", plural(minutes, "minute"))
    } else {
        format!("in {}", plural(remaining.num_seconds().max(0), "second"))
    }
}

#[must_use]
pub fn format_signed_minutes(duration: Duration) -> String {
    let minutes = (duration.num_seconds() as f64 / 60.0).round() as i64;
    match minutes.signum() {
        0 => "Aligned".to_string(),
        1 => format!("+{minutes} min"),
        _ => format!("-{} min", minutes.abs()),
    }
}

#[must_use]
pub fn format_percent(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return PLACEHOLDER.to_string();
    }
    format!("{value:.decimals$}%")
}

#[must_use]
pub fn azimuth_to_cardinal(deg: f64) -> &'static str {
    const DIRECTIONS: [&str; 9] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW", "N"];
    if deg.is_nan() {
        return "";
    }
    let idx = (deg.rem_euclid(360.0) / 45.0).round() as usize;
    DIRECTIONS[idx.min(DIRECTIONS.len() - 1)]
}

#[must_use]
pub fn format_azimuth(deg: f64) -> String {
    if deg.is_nan() {
        return PLACEHOLDER.to_string();
    }
    let wrapped = deg.rem_euclid(360.0);
    format!("{wrapped:.0}° {}", azimuth_to_cardinal(wrapped))
}

#[must_use]
pub fn format_degrees(deg: f64) -> String {
    format!("{deg:.1}°")
}

#[must_use]
pub fn format_moon_distance(km: f64) -> String {
    if km.is_nan() {
        return PLACEHOLDER.to_string();
    }
    let digits = (km.round() as i64).to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx).is_multiple_of(3) {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{grouped} km")
}

#[must_use]
pub fn format_hemisphere(lat: f64) -> &'static str {
    if lat > 0.5 {
        "Northern Hemisphere"
    } else if lat < -0.5 {
        "Southern Hemisphere"
    } else {
        "Near Equator"
    }
}

#[must_use]
pub fn format_wind(speed_ms: Option<f32>, gust_ms: Option<f32>) -> String {
    const MPH_PER_MS: f32 = 2.236_94;
    let Some(speed) = speed_ms.filter(|v| !v.is_nan()) else {
        return PLACEHOLDER.to_string();
    };
    let primary = format!("{speed:.1} m/s ({:.1} mph)", speed * MPH_PER_MS);
    match gust_ms {
        Some(gust) if gust > speed + 0.3 => {
            format!("{primary} · gusts {gust:.1} m/s ({:.1} mph)", gust * MPH_PER_MS)
        }
        _ => primary,
    }
}

/// Length of the intersection of `[start, end)` and `[other_start, other_end)`.
#[must_use]
pub fn overlap_duration<Tz: chrono::TimeZone>(
    start: &DateTime<Tz>,
    end: &DateTime<Tz>,
    other_start: &DateTime<Tz>,
    other_end: &DateTime<Tz>,
) -> Duration {
    let lo = if start > other_start { start } else { other_start };
    let hi = if end < other_end { end } else { other_end };
    let overlap = hi.clone() - lo.clone();
    overlap.max(Duration::zero())
}
