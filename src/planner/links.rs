use std::sync::OnceLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use serde::Serialize;
use url::Url;

const MAX_PLAIN_NAME_CHARS: usize = 60;

/// What a pasted map link says about a place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedLink {
    pub name: Option<String>,
    pub link: String,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

fn at_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"@(-?\d+\.?\d*),(-?\d+\.?\d*)").expect("valid regex"))
}

fn bang_lat_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"!3d(-?\d+\.?\d*)").expect("valid regex"))
}

fn bang_lng_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"!4d(-?\d+\.?\d*)").expect("valid regex"))
}

fn decode(segment: &str) -> String {
    percent_decode_str(segment).decode_utf8_lossy().into_owned()
}

fn non_empty(s: String) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn name_from_url(url: &Url, q: &str) -> Option<String> {
    let mut segments: Vec<&str> = url
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();
    let last = segments.pop().unwrap_or_default();

    let from_q = q.split(',').next().map(str::to_string).and_then(non_empty);
    let from_place = segments
        .iter()
        .position(|seg| seg.eq_ignore_ascii_case("place"))
        .and_then(|idx| segments.get(idx + 1))
        .map(|seg| decode(&seg.replace('+', " ")).replace(['-', '_'], " "))
        .and_then(non_empty);
    let from_path = non_empty(decode(&last.replace(['-', '_'], " ")));

    from_q.or(from_place).or(from_path)
}

fn coordinates(url: &Url, q: &str) -> Option<(f64, f64)> {
    let href = url.as_str();
    let pair = |lat: &str, lng: &str| -> Option<(f64, f64)> {
        let lat: f64 = lat.trim().parse().ok()?;
        let lng: f64 = lng.trim().parse().ok()?;
        (lat.is_finite() && lng.is_finite()).then_some((lat, lng))
    };

    let mut found = at_pattern()
        .captures(href)
        .and_then(|c| pair(&c[1], &c[2]));

    let q_parts: Vec<&str> = q.split(',').collect();
    if let [lat, lng] = q_parts.as_slice() {
        if let Some(coords) = pair(lat, lng) {
            found = Some(coords);
        }
    }

    if let (Some(lat), Some(lng)) = (
        bang_lat_pattern().captures(href),
        bang_lng_pattern().captures(href),
    ) {
        if let Some(coords) = pair(&lat[1], &lng[1]) {
            found = Some(coords);
        }
    }

    found
}

/// Pulls a name and coordinates out of a map link. Text that is not a URL
/// becomes the name, cut to 60 characters. Blank input yields nothing.
pub fn parse_place_link(raw: &str) -> Option<ParsedLink> {
    let cleaned = raw.trim();
    if cleaned.is_empty() {
        return None;
    }

    let Ok(url) = Url::parse(cleaned) else {
        return Some(ParsedLink {
            name: Some(cleaned.chars().take(MAX_PLAIN_NAME_CHARS).collect()),
            link: cleaned.to_string(),
            lat: None,
            lng: None,
        });
    };

    let q = url
        .query_pairs()
        .find(|(key, _)| key == "q")
        .map(|(_, value)| value.into_owned())
        .unwrap_or_default();
    let coords = coordinates(&url, &q);

    Some(ParsedLink {
        name: name_from_url(&url, &q),
        link: cleaned.to_string(),
        lat: coords.map(|(lat, _)| lat),
        lng: coords.map(|(_, lng)| lng),
    })
}
