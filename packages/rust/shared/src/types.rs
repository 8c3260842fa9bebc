//! Core domain types for extracted cruise itineraries.
//!
//! Both [`Segments`] and [`CruiseCatalog`] are ordered maps that serialize as
//! JSON objects in insertion order, so the output mirrors document order.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Result;

// ---------------------------------------------------------------------------
// Segments
// ---------------------------------------------------------------------------

/// Itinerary legs in document order: location name → day count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segments(Vec<(String, u64)>);

impl Segments {
    /// Create an empty segment mapping.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Insert a leg. A repeated location keeps its original position and
    /// takes the new day count.
    pub fn insert(&mut self, location: impl Into<String>, days: u64) {
        let location = location.into();
        match self.0.iter_mut().find(|(name, _)| *name == location) {
            Some(entry) => entry.1 = days,
            None => self.0.push((location, days)),
        }
    }

    /// Day count for a location, if present.
    pub fn get(&self, location: &str) -> Option<u64> {
        self.0
            .iter()
            .find(|(name, _)| name == location)
            .map(|(_, days)| *days)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate legs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(name, days)| (name.as_str(), *days))
    }

    /// Largest day count across all legs.
    pub fn max_days(&self) -> Option<u64> {
        self.0.iter().map(|(_, days)| *days).max()
    }
}

impl FromIterator<(String, u64)> for Segments {
    fn from_iter<I: IntoIterator<Item = (String, u64)>>(iter: I) -> Self {
        let mut segments = Segments::new();
        for (location, days) in iter {
            segments.insert(location, days);
        }
        segments
    }
}

impl Serialize for Segments {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (location, days) in &self.0 {
            map.serialize_entry(location, days)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Segments {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct SegmentsVisitor;

        impl<'de> Visitor<'de> for SegmentsVisitor {
            type Value = Segments;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of location names to day counts")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Segments, A::Error> {
                let mut segments = Segments::new();
                while let Some((location, days)) = access.next_entry::<String, u64>()? {
                    segments.insert(location, days);
                }
                Ok(segments)
            }
        }

        deserializer.deserialize_map(SegmentsVisitor)
    }
}

// ---------------------------------------------------------------------------
// CruiseRecord
// ---------------------------------------------------------------------------

/// One extracted world cruise.
///
/// The title is the catalog key and is not repeated inside the JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CruiseRecord {
    /// `"<Name> (<Year>)"`, unique within a catalog.
    #[serde(skip)]
    pub title: String,
    /// Literal dollar amount such as `"$12,345"`, or empty when unknown.
    pub price: String,
    /// Trip length in days.
    pub days: Option<u64>,
    pub description: String,
    /// Departure locations.
    pub dep_loc: Vec<String>,
    /// Departure dates in long form, e.g. `"January 5, 2023"`.
    pub dep_date: Vec<String>,
    /// Ship names.
    pub ship: Vec<String>,
    #[serde(default)]
    pub segments: Segments,
}

// ---------------------------------------------------------------------------
// CruiseCatalog
// ---------------------------------------------------------------------------

/// All extracted cruises keyed by title, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CruiseCatalog {
    records: Vec<CruiseRecord>,
}

impl CruiseCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record keyed by its title.
    ///
    /// A title already present keeps its position; the previous record is
    /// replaced and returned.
    pub fn insert(&mut self, record: CruiseRecord) -> Option<CruiseRecord> {
        match self.records.iter_mut().find(|r| r.title == record.title) {
            Some(existing) => Some(std::mem::replace(existing, record)),
            None => {
                self.records.push(record);
                None
            }
        }
    }

    pub fn get(&self, title: &str) -> Option<&CruiseRecord> {
        self.records.iter().find(|r| r.title == title)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CruiseRecord> {
        self.records.iter()
    }

    /// Titles in insertion order.
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.title.as_str())
    }

    /// Render as pretty-printed JSON with 2-space indentation.
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a catalog previously written by [`CruiseCatalog::to_json_pretty`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Serialize for CruiseCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for record in &self.records {
            map.serialize_entry(&record.title, record)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for CruiseCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = CruiseCatalog;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of cruise titles to cruise records")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<CruiseCatalog, A::Error> {
                let mut catalog = CruiseCatalog::new();
                while let Some((title, mut record)) =
                    access.next_entry::<String, CruiseRecord>()?
                {
                    record.title = title;
                    catalog.insert(record);
                }
                Ok(catalog)
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record(title: &str) -> CruiseRecord {
        CruiseRecord {
            title: title.into(),
            price: "$12,345".into(),
            days: Some(111),
            description: "A grand voyage to Sète and Nouméa".into(),
            dep_loc: vec!["Fort Lauderdale".into()],
            dep_date: vec!["January 5, 2023".into(), "January 19, 2023".into()],
            ship: vec!["Coral Princess".into()],
            segments: [("Pacific".to_string(), 20), ("Caribbean".to_string(), 10)]
                .into_iter()
                .collect(),
        }
    }

    #[test]
    fn segments_keep_first_position_on_repeat() {
        let mut segments = Segments::new();
        segments.insert("Atlantic", 12);
        segments.insert("Pacific", 30);
        segments.insert("Atlantic", 14);

        let legs: Vec<_> = segments.iter().collect();
        assert_eq!(legs, vec![("Atlantic", 14), ("Pacific", 30)]);
        assert_eq!(segments.max_days(), Some(30));
    }

    #[test]
    fn record_serializes_fields_in_output_order() {
        let json = serde_json::to_string(&sample_record("Princess Cruises (2023)")).unwrap();
        let order = ["\"price\"", "\"days\"", "\"description\"", "\"dep_loc\"", "\"dep_date\"", "\"ship\"", "\"segments\""];
        let positions: Vec<usize> = order.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(!json.contains("\"title\""));
        // Segment order follows insertion, not key order.
        assert!(json.find("\"Pacific\"").unwrap() < json.find("\"Caribbean\"").unwrap());
    }

    #[test]
    fn missing_days_serializes_as_null() {
        let mut record = sample_record("Oceania Cruises (2023)");
        record.days = None;
        let value = serde_json::to_value(&record).unwrap();
        assert!(value["days"].is_null());
    }

    #[test]
    fn catalog_json_roundtrip_preserves_order_and_unicode() {
        let mut catalog = CruiseCatalog::new();
        catalog.insert(sample_record("Viking Cruises (2024)"));
        catalog.insert(sample_record("Azamara (2023)"));

        let json = catalog.to_json_pretty().unwrap();
        assert!(json.starts_with("{\n  \"Viking Cruises (2024)\": {\n    \"price\""));
        assert!(json.contains("Sète"));

        let parsed = CruiseCatalog::from_json(&json).unwrap();
        assert_eq!(parsed, catalog);
        let titles: Vec<&str> = parsed.titles().collect();
        assert_eq!(titles, vec!["Viking Cruises (2024)", "Azamara (2023)"]);
    }

    #[test]
    fn catalog_insert_replaces_duplicate_in_place() {
        let mut catalog = CruiseCatalog::new();
        catalog.insert(sample_record("A (2023)"));
        catalog.insert(sample_record("B (2023)"));

        let mut replacement = sample_record("A (2023)");
        replacement.price = String::new();
        let previous = catalog.insert(replacement);

        assert_eq!(previous.map(|r| r.price), Some("$12,345".to_string()));
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.titles().next(), Some("A (2023)"));
        assert_eq!(catalog.get("A (2023)").unwrap().price, "");
    }
}
