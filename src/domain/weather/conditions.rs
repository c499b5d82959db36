/// WMO weather-code families as the backdrop sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionFamily {
    Clear,
    Cloudy,
    Fog,
    Rain,
    HeavyRain,
    Snow,
    Unknown,
}

#[must_use]
pub fn condition_family(code: u8) -> ConditionFamily {
    match code {
        0 | 1 => ConditionFamily::Clear,
        2 | 3 => ConditionFamily::Cloudy,
        45 | 48 => ConditionFamily::Fog,
        63 | 65 | 82 | 95 | 96 | 99 => ConditionFamily::HeavyRain,
        51 | 53 | 55 | 56 | 57 | 61 | 66 | 67 | 80 | 81 => ConditionFamily::Rain,
        71 | 73 | 75 | 77 | 85 | 86 => ConditionFamily::Snow,
        _ => ConditionFamily::Unknown,
    }
}

#[must_use]
pub fn is_precipitation(code: u8) -> bool {
    matches!(
        condition_family(code),
        ConditionFamily::Rain | ConditionFamily::HeavyRain | ConditionFamily::Snow
    )
}

const WEATHER_LABELS: &[(u8, &str)] = &[
    (0, "Clear sky"),
    (1, "Mainly clear"),
    (2, "Partly cloudy"),
    (3, "Overcast"),
    (45, "Fog"),
    (48, "Depositing rime fog"),
    (51, "Light drizzle"),
    (53, "Moderate drizzle"),
    (55, "Dense drizzle"),
    (56, "Light freezing drizzle"),
    (57, "Dense freezing drizzle"),
    (61, "Light rain"),
    (63, "Moderate rain"),
    (65, "Heavy rain"),
    (66, "Light freezing rain"),
    (67, "Heavy freezing rain"),
    (71, "Light snow fall"),
    (73, "Moderate snow fall"),
    (75, "Heavy snow fall"),
    (77, "Snow grains"),
    (80, "Light rain showers"),
    (81, "Moderate rain showers"),
    (82, "Violent rain showers"),
    (85, "Light snow showers"),
    (86, "Heavy snow showers"),
    (95, "Thunderstorm"),
    (96, "Thunderstorm with light hail"),
    (99, "Thunderstorm with heavy hail"),
];

#[must_use]
pub fn weather_label(code: u8) -> &'static str {
    WEATHER_LABELS
        .iter()
        .find_map(|(candidate, label)| (*candidate == code).then_some(*label))
        .unwrap_or("Conditions unavailable")
}

#[must_use]
pub fn describe_weather_code(code: Option<u8>, cloud_cover: Option<f32>) -> String {
    let Some(code) = code else {
        return "—".to_string();
    };
    let base = weather_label(code);
    match cloud_cover {
        Some(cover) => format!("{base} · {}% cloud cover", cover.round()),
        None => base.to_string(),
    }
}
