//! Year-section and cruise-heading discovery.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static YEAR_IN_HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"20\d{2}").expect("valid regex")
});

/// Year label → text of the `<h2>` that opens that year's section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearIndex {
    years: BTreeMap<String, String>,
}

impl YearIndex {
    /// Heading text for a year, if the document has that section.
    pub fn heading(&self, year: &str) -> Option<&str> {
        self.years.get(year).map(String::as_str)
    }

    pub fn contains(&self, year: &str) -> bool {
        self.years.contains_key(year)
    }

    pub fn len(&self) -> usize {
        self.years.len()
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }

    /// Years in ascending order.
    pub fn years(&self) -> impl Iterator<Item = &str> {
        self.years.keys().map(String::as_str)
    }
}

/// Headings located in a parsed article.
#[derive(Debug)]
pub struct HeadingIndex<'a> {
    pub years: YearIndex,
    /// Cruise `<h3>` headings in document order.
    pub cruise_headings: Vec<ElementRef<'a>>,
}

/// Index year sections and cruise headings.
///
/// Year `<h2>`s get consecutive years starting at `first_year` in document
/// order. The last `trailing` `<h3>`s are page furniture and are dropped.
pub fn index_headings(doc: &Html, first_year: u16, trailing: usize) -> HeadingIndex<'_> {
    let h2 = Selector::parse("h2").unwrap();
    let h3 = Selector::parse("h3").unwrap();

    let years = doc
        .select(&h2)
        .map(|el| el.text().collect::<String>())
        .filter(|text| YEAR_IN_HEADING_RE.is_match(text))
        .enumerate()
        .map(|(i, text)| ((u32::from(first_year) + i as u32).to_string(), text.trim().to_string()))
        .collect();

    let mut cruise_headings: Vec<ElementRef<'_>> = doc.select(&h3).collect();
    cruise_headings.truncate(cruise_headings.len().saturating_sub(trailing));

    HeadingIndex {
        years: YearIndex { years },
        cruise_headings,
    }
}

/// Trimmed text of a heading element.
pub fn heading_text(heading: ElementRef<'_>) -> String {
    heading.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_fixture(name: &str) -> Html {
        let path = format!("../../../fixtures/html/{name}");
        let content = std::fs::read_to_string(&path)
            .unwrap_or_else(|_| panic!("missing fixture: {path}"));
        Html::parse_document(&content)
    }

    #[test]
    fn year_sections_map_by_ordinal() {
        let doc = load_fixture("world-cruises.html");
        let index = index_headings(&doc, 2023, 2);

        let years: Vec<&str> = index.years.years().collect();
        assert_eq!(years, vec!["2023", "2024", "2025"]);
        assert_eq!(index.years.heading("2024"), Some("2024 World Cruises"));
        assert!(!index.years.contains("2026"));
    }

    #[test]
    fn trailing_headings_excluded() {
        let doc = load_fixture("world-cruises.html");
        let index = index_headings(&doc, 2023, 2);

        let names: Vec<String> = index.cruise_headings.iter().map(|h| heading_text(*h)).collect();
        assert_eq!(names.len(), 9);
        assert_eq!(names.first().map(String::as_str), Some("Princess Cruises"));
        assert_eq!(names.last().map(String::as_str), Some("Oceania"));
        assert!(!names.iter().any(|n| n == "Related Articles"));
    }

    #[test]
    fn fewer_headings_than_trailing_count() {
        let doc = Html::parse_document("<h3>Only</h3>");
        let index = index_headings(&doc, 2023, 2);
        assert!(index.cruise_headings.is_empty());
        assert!(index.years.is_empty());
    }
}
