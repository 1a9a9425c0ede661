use chrono::{DateTime, Offset, Utc};
use chrono_tz::Tz;

/// Location fragments that pin down a zone when the city has none.
const LOCATION_HINTS: &[(&[&str], Tz)] = &[
    (
        &["tokyo", "shinjuku", "mitaka", "kichijoji", "hnd"],
        chrono_tz::Asia::Tokyo,
    ),
    (&["beijing", "pek"], chrono_tz::Asia::Shanghai),
    (&["barcelona", "bcn"], chrono_tz::Europe::Madrid),
];

pub const TIME_TBD: &str = "Time tbd";

fn parse_zone(name: Option<&str>) -> Option<Tz> {
    name.map(str::trim)
        .filter(|n| !n.is_empty())
        .and_then(|n| n.parse().ok())
}

/// Zone named by the location text, if any hint matches.
pub fn zone_from_location(location: &str) -> Option<Tz> {
    let location = location.to_lowercase();
    LOCATION_HINTS
        .iter()
        .find(|(hints, _)| hints.iter().any(|hint| location.contains(hint)))
        .map(|(_, tz)| *tz)
}

/// City zone, then location hints, then the trip's home zone, then UTC.
pub fn resolve_zone(
    city_zone: Option<&str>,
    location: Option<&str>,
    fallback: Option<&str>,
) -> Tz {
    parse_zone(city_zone)
        .or_else(|| location.and_then(zone_from_location))
        .or_else(|| parse_zone(fallback))
        .unwrap_or(chrono_tz::UTC)
}

/// Short zone label such as `JST`, `CEST` or `UTC+05:30`.
pub fn abbreviation(instant: DateTime<Utc>, tz: Tz) -> String {
    let local = instant.with_timezone(&tz);
    let name = local.format("%Z").to_string();
    if !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphabetic())
        && !name.starts_with("GMT")
    {
        return name;
    }

    let offset_minutes = local.offset().fix().local_minus_utc() / 60;
    let mapped = match tz.name() {
        "Asia/Tokyo" => Some("JST"),
        "Asia/Shanghai" => Some("CST"),
        "Europe/Madrid" | "Europe/Paris" if offset_minutes == 120 => Some("CEST"),
        "Europe/Madrid" | "Europe/Paris" => Some("CET"),
        "Europe/London" if offset_minutes == 60 => Some("BST"),
        "Europe/London" => Some("GMT"),
        "UTC" | "Etc/UTC" => Some("UTC"),
        _ => None,
    };
    if let Some(abbr) = mapped {
        return abbr.to_string();
    }

    let sign = if offset_minutes >= 0 { '+' } else { '-' };
    let abs = offset_minutes.abs();
    format!("UTC{}{:02}:{:02}", sign, abs / 60, abs % 60)
}

/// `HH:MM ABBR` in the given zone, or `Time tbd` without a start.
pub fn format_start(start: Option<DateTime<Utc>>, tz: Tz) -> String {
    match start {
        Some(instant) => format!(
            "{} {}",
            instant.with_timezone(&tz).format("%H:%M"),
            abbreviation(instant, tz)
        ),
        None => TIME_TBD.to_string(),
    }
}
