//! Per-field text parsers.
//!
//! Every function here works on plain text already pulled out of the tree.
//! A pattern that does not match yields an empty value, never an error.

use std::sync::LazyLock;

use regex::Regex;

use worldcruise_shared::Segments;

/// Opens the description.
pub const TRIP_MARKER: &str = "The Trip: ";
/// Ends the description and carries the departure dates/locations.
pub const DEPARTURE_MARKER: &str = "Departure Date: ";
/// Carries the `;`-separated itinerary legs.
pub const SEGMENTS_MARKER: &str = "Itinerary Segments: ";
/// Carries the fare.
pub const PRICE_MARKER: &str = "Price: ";

/// Number of marker searches made per cruise heading.
pub const MARKER_COUNT: usize = 4;

static YEAR_SECTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^20[2-5][3-5] World Cruises").expect("valid regex")
});
static SHIP_IN_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[a-zA-Z]* - ([a-zA-Z0-9 ]*)").expect("valid regex")
});
static POSSESSIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:’s|'s?)$").expect("valid regex")
});
static DATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[A-Z][a-z]+ [1-3]?\d, \d{4}").expect("valid regex")
});
static SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"([a-zA-Z ]+) \(([a-z0-9 ]+)\)").expect("valid regex")
});
static DAYS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d+)(?:\s|-)(?:day|night|days|nights)").expect("valid regex")
});
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d+").expect("valid regex")
});
static DEPARTS_RE: LazyLock<Regex> = LazyLock::new(|| {
    // The optional group picks up borough suffixes such as "New York (Brooklyn)".
    Regex::new(r"(?:from|departs|in) ((?:[A-Z][a-z]+\s?)+(?:\([A-Z][a-z]+\))?)").expect("valid regex")
});
static ROUNDTRIP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"roundtrip from ((?:[A-Z][a-z]+\s?)+)").expect("valid regex")
});
static ROUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"((?:[A-Z][a-z]+\s?)+) to (?:[A-Z][a-z]+\s?)+").expect("valid regex")
});
static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\s?\d{1,3}(?:,\d{3})*").expect("valid regex")
});

// ---------------------------------------------------------------------------
// Title + year
// ---------------------------------------------------------------------------

/// Year of a `"20XX World Cruises"` section heading.
pub fn section_year(text: &str) -> Option<&str> {
    let text = text.trim_start();
    if YEAR_SECTION_RE.is_match(text) {
        text.split_whitespace().next()
    } else {
        None
    }
}

/// `"<Name> (<Year>)"`.
pub fn format_title(name: &str, year: &str) -> String {
    format!("{name} ({year})")
}

// ---------------------------------------------------------------------------
// Description
// ---------------------------------------------------------------------------

/// Space-join description fragments and drop the leading trip marker.
///
/// Every fragment is kept, including whitespace-only text between tags.
pub fn join_description<'a>(pieces: impl IntoIterator<Item = &'a str>) -> String {
    let mut joined = String::new();
    for piece in pieces {
        joined.push(' ');
        joined.push_str(piece);
    }
    joined.replace(&format!(" {TRIP_MARKER}"), "")
}

// ---------------------------------------------------------------------------
// Ship names
// ---------------------------------------------------------------------------

/// Ship name from a `"<Line> - <Ship>"` heading.
pub fn ship_from_heading(heading: &str) -> Option<String> {
    SHIP_IN_HEADING_RE
        .captures(heading)
        .map(|caps| caps[1].to_string())
}

/// Ship names from description link texts.
///
/// Possessive endings are stripped and links naming the cruise line itself
/// (any text contained in the title) are dropped.
pub fn ships_from_links(links: &[String], title: &str) -> Vec<String> {
    links
        .iter()
        .map(|link| POSSESSIVE_RE.replace(link.trim(), "").into_owned())
        .filter(|name| !title.contains(name.as_str()))
        .collect()
}

// ---------------------------------------------------------------------------
// Dates, segments, days
// ---------------------------------------------------------------------------

/// All long-form dates (`"January 5, 2023"`) in the text.
pub fn departure_dates(text: &str) -> Vec<String> {
    DATE_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Segment text with the marker removed.
pub fn strip_segments_marker(text: &str) -> String {
    text.replace(SEGMENTS_MARKER, "")
}

/// Parse `"<Location> (<N> <unit>); ..."` into ordered legs.
///
/// All-or-nothing: one unparseable piece empties the whole mapping.
pub fn parse_segments(text: &str) -> Segments {
    let mut segments = Segments::new();
    for piece in text.split("; ") {
        let Some(caps) = SEGMENT_RE.captures(piece) else {
            return Segments::new();
        };
        let Some(days) = caps[2]
            .split_whitespace()
            .next()
            .and_then(|n| n.parse::<u64>().ok())
        else {
            return Segments::new();
        };
        segments.insert(caps[1].trim(), days);
    }
    segments
}

/// Trip length: an explicit `"N-night"`/`"N days"` count in the description,
/// else the largest number in the raw segment text. Counts that overflow
/// `u64` are treated as absent.
pub fn trip_days(description: &str, segments_text: &str) -> Option<u64> {
    DAYS_RE
        .captures(description)
        .and_then(|caps| caps[1].parse().ok())
        .or_else(|| {
            NUMBER_RE
                .find_iter(segments_text)
                .filter_map(|m| m.as_str().parse::<u64>().ok())
                .max()
        })
}

// ---------------------------------------------------------------------------
// Departure location
// ---------------------------------------------------------------------------

/// Departure locations, trying progressively looser patterns.
///
/// 1. `from/departs/in <Place>` in the departure text (all matches)
/// 2. `roundtrip from <Place>` in the description (all matches)
/// 3. the origin of the first `<Place> to <Place>` in description + segments
pub fn departure_locations(departure: &str, description: &str, segments_text: &str) -> Vec<String> {
    let found = capture_all(&DEPARTS_RE, departure);
    if !found.is_empty() {
        return found;
    }

    let found = capture_all(&ROUNDTRIP_RE, description);
    if !found.is_empty() {
        return found;
    }

    let combined = format!("{description}{segments_text}");
    ROUTE_RE
        .captures(&combined)
        .map(|caps| vec![caps[1].trim().to_string()])
        .unwrap_or_default()
}

fn capture_all(re: &Regex, text: &str) -> Vec<String> {
    re.captures_iter(text)
        .map(|caps| caps[1].trim().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Price
// ---------------------------------------------------------------------------

/// First dollar amount in the text, whitespace removed; empty if none.
pub fn parse_price(text: &str) -> String {
    PRICE_RE
        .find(text)
        .map(|m| m.as_str().chars().filter(|c| !c.is_whitespace()).collect())
        .unwrap_or_default()
}
