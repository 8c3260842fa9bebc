//! Per-heading record extraction.
//!
//! An [`ExtractionSession`] lives for one pass over one document. It owns the
//! ship-name cache: ship names tend to repeat year over year for the same
//! cruise line, so a later heading without ship info reuses an earlier one.

use std::collections::HashMap;

use scraper::ElementRef;
use tracing::{debug, instrument};

use worldcruise_shared::{CruiseRecord, ExtractConfig, Result, WorldCruiseError};

use crate::fields::{
    self, DEPARTURE_MARKER, MARKER_COUNT, PRICE_MARKER, SEGMENTS_MARKER, TRIP_MARKER,
};
use crate::headings::heading_text;
use crate::siblings::{SiblingWalk, following_blocks, preceding_texts};

/// Extraction state scoped to a single document pass.
pub struct ExtractionSession<'c> {
    config: &'c ExtractConfig,
    /// Heading name → ship names last resolved for it.
    ship_cache: HashMap<String, Vec<String>>,
}

impl<'c> ExtractionSession<'c> {
    pub fn new(config: &'c ExtractConfig) -> Self {
        Self {
            config,
            ship_cache: HashMap::new(),
        }
    }

    /// Build the record for one cruise heading.
    #[instrument(skip_all, fields(heading = %heading_text(heading)))]
    pub fn extract(&mut self, heading: ElementRef<'_>) -> Result<CruiseRecord> {
        let raw = heading_text(heading);
        let container = heading
            .parent()
            .and_then(ElementRef::wrap)
            .ok_or_else(|| WorldCruiseError::structure(&raw, "heading has no parent element"))?;

        let year = resolve_year(container).ok_or_else(|| {
            WorldCruiseError::structure(&raw, "no preceding \"20XX World Cruises\" section heading")
        })?;

        let config = self.config;
        let overrides = &config.overrides;
        let name = overrides.title(&raw).unwrap_or(&raw).to_string();
        let title = fields::format_title(&name, &year);

        let limit = config.max_lookahead.saturating_mul(MARKER_COUNT);
        let blocks = following_blocks(container, limit);
        let mut walk = SiblingWalk::new(&title, blocks, config.max_lookahead);

        // Description runs from the trip marker up to the departure paragraph.
        let anchor = walk.seek(TRIP_MARKER)?;
        let departure = if walk.block(anchor).contains(DEPARTURE_MARKER) {
            anchor
        } else {
            walk.seek(DEPARTURE_MARKER)?
        };
        let description =
            fields::join_description(walk.span(anchor, departure).iter().map(|b| b.text.as_str()));

        let ship = self.resolve_ships(&name, &title, &walk.block(anchor).links);

        let departure_text = walk.block(departure).text.clone();
        let dep_date = match overrides.departure_dates(&title) {
            Some(dates) => dates.to_vec(),
            None => fields::departure_dates(&departure_text),
        };

        let segments_idx = walk.seek(SEGMENTS_MARKER)?;
        let segments_text = fields::strip_segments_marker(&walk.block(segments_idx).text);
        let segments = fields::parse_segments(&segments_text);
        let days = fields::trip_days(&description, &segments_text);

        let dep_loc = match overrides.departure_locations(&title) {
            Some(locations) => locations.to_vec(),
            None => fields::departure_locations(&departure_text, &description, &segments_text),
        };

        let price_idx = walk.seek(PRICE_MARKER)?;
        let price = fields::parse_price(&walk.block(price_idx).text);

        if price.is_empty() {
            debug!(%title, "no price found");
        }
        if segments.is_empty() {
            debug!(%title, "segments unparseable");
        }
        if dep_loc.is_empty() {
            debug!(%title, "no departure location found");
        }

        Ok(CruiseRecord {
            title,
            price,
            days,
            description,
            dep_loc,
            dep_date,
            ship,
            segments,
        })
    }

    /// Ship names, first match wins: heading, override table, description
    /// links, cache.
    fn resolve_ships(&mut self, name: &str, title: &str, anchor_links: &[String]) -> Vec<String> {
        if let Some(ship) = fields::ship_from_heading(name) {
            let ships = vec![ship];
            self.ship_cache.insert(name.to_string(), ships.clone());
            return ships;
        }

        if let Some(ships) = self.config.overrides.ship_names(title) {
            return ships.to_vec();
        }

        let linked = fields::ships_from_links(anchor_links, title);
        if !linked.is_empty() {
            self.ship_cache.insert(name.to_string(), linked.clone());
            return linked;
        }

        match self.ship_cache.get(name) {
            Some(cached) => {
                debug!(%title, ?cached, "reusing cached ship names");
                cached.clone()
            }
            None => {
                debug!(%title, "no ship names found");
                Vec::new()
            }
        }
    }
}

/// Year from the nearest preceding `"20XX World Cruises"` sibling.
fn resolve_year(container: ElementRef<'_>) -> Option<String> {
    preceding_texts(container).find_map(|text| fields::section_year(&text).map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    fn first_heading(doc: &Html) -> ElementRef<'_> {
        let h3 = Selector::parse("h3").unwrap();
        doc.select(&h3).next().unwrap()
    }

    #[test]
    fn extracts_single_entry() {
        let doc = Html::parse_document(
            r#"<h2>2024 World Cruises</h2>
<div><h3>Seabourn - Seabourn Sojourn</h3></div>
<p>The Trip: A 145-day voyage sailing roundtrip from Los Angeles.</p>
<p>Departure Date: January 5, 2024</p>
<p>Itinerary Segments: Los Angeles to Sydney (40 days); Sydney to Los Angeles (105 days)</p>
<p>Price: from $54,999</p>"#,
        );
        let cfg = ExtractConfig::default();
        let mut session = ExtractionSession::new(&cfg);
        let record = session.extract(first_heading(&doc)).unwrap();

        assert_eq!(record.title, "Seabourn - Seabourn Sojourn (2024)");
        assert_eq!(record.ship, vec!["Seabourn Sojourn".to_string()]);
        assert_eq!(record.days, Some(145));
        assert_eq!(record.dep_date, vec!["January 5, 2024".to_string()]);
        assert_eq!(record.dep_loc, vec!["Los Angeles".to_string()]);
        assert_eq!(record.segments.get("Sydney to Los Angeles"), Some(105));
        assert_eq!(record.price, "$54,999");
        assert_eq!(
            record.description,
            "A 145-day voyage sailing roundtrip from Los Angeles. \n"
        );
    }

    #[test]
    fn departure_marker_inside_anchor() {
        let doc = Html::parse_document(
            r#"<h2>2023 World Cruises</h2>
<div><h3>Azamara</h3></div>
<p>The Trip: Short notice. Departure Date: March 3, 2023 from Miami</p>
<p>Itinerary Segments: Miami to Miami (30 nights)</p>
<p>Price: $9,999</p>"#,
        );
        let cfg = ExtractConfig::default();
        let record = ExtractionSession::new(&cfg).extract(first_heading(&doc)).unwrap();
        assert_eq!(record.description, "");
        assert_eq!(record.dep_date, vec!["March 3, 2023".to_string()]);
        assert_eq!(record.dep_loc, vec!["Miami".to_string()]);
        assert_eq!(record.days, Some(30));
    }

    #[test]
    fn missing_year_section_is_structure_error() {
        let doc = Html::parse_document(
            "<h2>Intro</h2><div><h3>Azamara</h3></div><p>The Trip: x</p>",
        );
        let cfg = ExtractConfig::default();
        let err = ExtractionSession::new(&cfg)
            .extract(first_heading(&doc))
            .unwrap_err();
        assert!(matches!(err, WorldCruiseError::Structure { .. }));
        assert!(err.to_string().contains("Azamara"));
    }

    #[test]
    fn missing_price_marker_is_structure_error() {
        let doc = Html::parse_document(
            r#"<h2>2023 World Cruises</h2>
<div><h3>Azamara</h3></div>
<p>The Trip: x</p>
<p>Departure Date: March 3, 2023</p>
<p>Itinerary Segments: TBA</p>"#,
        );
        let cfg = ExtractConfig::default();
        let err = ExtractionSession::new(&cfg)
            .extract(first_heading(&doc))
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("Azamara (2023)"));
        assert!(msg.contains("Price: "));
    }

    #[test]
    fn lookahead_bounds_the_scan() {
        let doc = Html::parse_document(
            r#"<h2>2023 World Cruises</h2><div><h3>Azamara</h3></div><p>a</p><p>b</p><p>c</p><p>The Trip: x</p>"#,
        );
        let cfg = ExtractConfig {
            max_lookahead: 2,
            ..ExtractConfig::default()
        };
        let err = ExtractionSession::new(&cfg)
            .extract(first_heading(&doc))
            .unwrap_err();
        assert!(err.to_string().contains("within 2 siblings"));
    }
}
