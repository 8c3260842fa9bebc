//! End-to-end extraction run: source → HTML tree → headings → records → JSON.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use scraper::Html;
use tracing::{debug, info, instrument, warn};

use worldcruise_extract::{ExtractionSession, heading_text, index_headings};
use worldcruise_loader::{DocumentSource, LoadOptions};
use worldcruise_shared::{CruiseCatalog, ExtractConfig, Result};

use crate::output::write_catalog;

/// Configuration for a single extraction run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Where the article HTML comes from.
    pub source: DocumentSource,
    /// Path of the JSON catalog to write.
    pub output: PathBuf,
    /// Extraction settings and override tables.
    pub extract: ExtractConfig,
    /// Fetch settings (only used for URL sources).
    pub load: LoadOptions,
}

/// Result of a completed run.
#[derive(Debug)]
pub struct RunResult {
    /// Where the catalog was written.
    pub output_path: PathBuf,
    /// Number of records in the catalog.
    pub record_count: usize,
    /// Total elapsed time.
    pub elapsed: Duration,
}

/// Progress callback for reporting run status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called once the number of cruise headings is known.
    fn headings_found(&self, total: usize);
    /// Called after each record is extracted.
    fn record_extracted(&self, title: &str, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, result: &RunResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn headings_found(&self, _total: usize) {}
    fn record_extracted(&self, _title: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &RunResult) {}
}

/// Extract every cruise heading of a parsed article into a catalog.
///
/// Any structure error aborts the whole pass. Records are inserted in
/// document order; a repeated title keeps its first position and the later
/// record.
#[instrument(skip_all, fields(max_lookahead = config.max_lookahead))]
pub fn extract_catalog(
    doc: &Html,
    config: &ExtractConfig,
    progress: &dyn ProgressReporter,
) -> Result<CruiseCatalog> {
    let index = index_headings(doc, config.first_year, config.trailing_headings);
    let total = index.cruise_headings.len();

    info!(
        years = index.years.len(),
        headings = total,
        "headings indexed"
    );
    if index.years.is_empty() && total > 0 {
        warn!("no year section headings found");
    }
    progress.headings_found(total);

    let mut session = ExtractionSession::new(config);
    let mut catalog = CruiseCatalog::new();

    for (i, heading) in index.cruise_headings.iter().enumerate() {
        let record = session.extract(*heading)?;
        let title = record.title.clone();

        if let Some(year) = title_year(&title).filter(|y| !index.years.contains(y)) {
            warn!(%title, year, "year is not one of the indexed year sections");
        }

        debug!(%title, heading = %heading_text(*heading), "record extracted");
        progress.record_extracted(&title, i + 1, total);

        if catalog.insert(record).is_some() {
            warn!(%title, "duplicate title, later record replaces earlier one");
        }
    }

    Ok(catalog)
}

/// Run the full extraction.
///
/// 1. Load the article (file or URL)
/// 2. Parse into an HTML tree
/// 3. Extract one record per cruise heading
/// 4. Write the catalog as JSON
///
/// Output is only written after every heading has been processed.
#[instrument(skip_all, fields(source = %config.source, output = %config.output.display()))]
pub async fn run(config: &RunConfig, progress: &dyn ProgressReporter) -> Result<RunResult> {
    let start = Instant::now();
    config.extract.validate()?;

    info!(source = %config.source, "starting extraction run");

    progress.phase("Loading article");
    let document = worldcruise_loader::load(&config.source, &config.load).await?;

    progress.phase("Extracting cruises");
    let catalog = {
        let doc = document.parse();
        extract_catalog(&doc, &config.extract, progress)?
    };

    progress.phase("Writing catalog");
    write_catalog(&catalog, &config.output)?;

    let result = RunResult {
        output_path: config.output.clone(),
        record_count: catalog.len(),
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        records = result.record_count,
        output = %result.output_path.display(),
        elapsed_ms = result.elapsed.as_millis(),
        "extraction run complete"
    );

    Ok(result)
}

/// Year from a `"<Name> (<Year>)"` title.
fn title_year(title: &str) -> Option<&str> {
    title
        .rsplit_once(" (")
        .and_then(|(_, rest)| rest.strip_suffix(')'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use worldcruise_shared::WorldCruiseError;

    fn fixture_path(name: &str) -> PathBuf {
        PathBuf::from(format!("../../../fixtures/html/{name}"))
    }

    fn run_config(source: DocumentSource, output: PathBuf) -> RunConfig {
        RunConfig {
            source,
            output,
            extract: ExtractConfig::default(),
            load: LoadOptions::default(),
        }
    }

    #[derive(Default)]
    struct CountingProgress {
        headings: AtomicUsize,
        records: AtomicUsize,
        done: AtomicUsize,
    }

    impl ProgressReporter for CountingProgress {
        fn phase(&self, _name: &str) {}
        fn headings_found(&self, total: usize) {
            self.headings.store(total, Ordering::SeqCst);
        }
        fn record_extracted(&self, _title: &str, _current: usize, _total: usize) {
            self.records.fetch_add(1, Ordering::SeqCst);
        }
        fn done(&self, _result: &RunResult) {
            self.done.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn title_year_parsing() {
        assert_eq!(title_year("Oceania Cruises (2023)"), Some("2023"));
        assert_eq!(title_year("Line (Ship) (2024)"), Some("2024"));
        assert_eq!(title_year("No year"), None);
    }

    #[test]
    fn catalog_from_fixture() {
        let html = std::fs::read_to_string(fixture_path("world-cruises.html")).unwrap();
        let doc = Html::parse_document(&html);
        let progress = CountingProgress::default();

        let catalog = extract_catalog(&doc, &ExtractConfig::default(), &progress).unwrap();

        assert_eq!(catalog.len(), 9);
        assert_eq!(progress.headings.load(Ordering::SeqCst), 9);
        assert_eq!(progress.records.load(Ordering::SeqCst), 9);
        assert_eq!(catalog.titles().next(), Some("Princess Cruises (2023)"));
        assert!(catalog.titles().all(|t| title_year(t).is_some()));

        let princess = catalog.get("Princess Cruises (2023)").unwrap();
        assert_eq!(
            princess.dep_date,
            vec!["January 5, 2023".to_string(), "January 19, 2023".to_string()]
        );
    }

    #[test]
    fn repeated_heading_keeps_first_position() {
        let doc = Html::parse_document(
            r#"<h2>2024 World Cruises</h2>
<div><h3>Azamara</h3></div>
<p>The Trip: First pass.</p><p>Departure Date: May 1, 2024</p>
<p>Itinerary Segments: TBA</p><p>Price: $1</p>
<div><h3>Seabourn</h3></div>
<p>The Trip: Middle.</p><p>Departure Date: May 2, 2024</p>
<p>Itinerary Segments: TBA</p><p>Price: $2</p>
<div><h3>Azamara</h3></div>
<p>The Trip: Second pass.</p><p>Departure Date: May 3, 2024</p>
<p>Itinerary Segments: TBA</p><p>Price: $3</p>"#,
        );
        let config = ExtractConfig {
            trailing_headings: 0,
            ..ExtractConfig::default()
        };

        let catalog = extract_catalog(&doc, &config, &SilentProgress).unwrap();
        let titles: Vec<&str> = catalog.titles().collect();
        assert_eq!(titles, vec!["Azamara (2024)", "Seabourn (2024)"]);
        assert_eq!(catalog.get("Azamara (2024)").unwrap().price, "$3");
    }

    #[tokio::test]
    async fn run_writes_catalog() {
        let tmp = std::env::temp_dir().join("worldcruise-run-fixture");
        let _ = std::fs::remove_dir_all(&tmp);
        let output = tmp.join("world-cruises.json");
        let config = run_config(
            DocumentSource::File(fixture_path("world-cruises.html")),
            output.clone(),
        );
        let progress = CountingProgress::default();

        let result = run(&config, &progress).await.unwrap();
        assert_eq!(result.record_count, 9);
        assert_eq!(result.output_path, output);
        assert_eq!(progress.done.load(Ordering::SeqCst), 1);

        let written = std::fs::read_to_string(&output).unwrap();
        let value: serde_json::Value = serde_json::from_str(&written).unwrap();
        let queen_mary = &value["Cunard Line - Queen Mary 2 (2023)"];
        assert_eq!(queen_mary["days"], 113);
        assert_eq!(queen_mary["segments"], serde_json::json!({}));
        assert_eq!(queen_mary["dep_loc"][0], "New York (Brooklyn)");

        let first_record = &written[..written.find("},").unwrap()];
        let fields: Vec<usize> = ["price", "days", "description", "dep_loc", "dep_date", "ship", "segments"]
            .iter()
            .map(|f| first_record.find(&format!("\"{f}\"")).unwrap())
            .collect();
        assert!(fields.windows(2).all(|w| w[0] < w[1]));

        let parsed = CruiseCatalog::from_json(&written).unwrap();
        assert_eq!(parsed.len(), 9);

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn structure_error_leaves_no_output() {
        let tmp = std::env::temp_dir().join("worldcruise-run-broken");
        let _ = std::fs::remove_dir_all(&tmp);
        std::fs::create_dir_all(&tmp).unwrap();

        let input = tmp.join("broken.html");
        std::fs::write(
            &input,
            r#"<h2>2023 World Cruises</h2>
<div><h3>Azamara</h3></div><p>The Trip: x</p><p>Departure Date: May 1, 2023</p>
<div><h3>Footer</h3></div><div><h3>Newsletter</h3></div>"#,
        )
        .unwrap();
        let output = tmp.join("world-cruises.json");

        let err = run(&run_config(DocumentSource::File(input), output.clone()), &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, WorldCruiseError::Structure { .. }));
        assert!(!output.exists());

        let _ = std::fs::remove_dir_all(&tmp);
    }

    #[tokio::test]
    async fn missing_input_is_load_error() {
        let output = std::env::temp_dir().join("worldcruise-run-missing.json");
        let config = run_config(
            DocumentSource::File(PathBuf::from("/nonexistent/article.html")),
            output.clone(),
        );
        let err = run(&config, &SilentProgress).await.unwrap_err();
        assert!(matches!(err, WorldCruiseError::Load(_)));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn zero_lookahead_rejected() {
        let mut config = run_config(
            DocumentSource::File(fixture_path("world-cruises.html")),
            std::env::temp_dir().join("worldcruise-run-zero.json"),
        );
        config.extract.max_lookahead = 0;
        let err = run(&config, &SilentProgress).await.unwrap_err();
        assert!(matches!(err, WorldCruiseError::Validation { .. }));
    }
}
