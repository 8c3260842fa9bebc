//! Document loading for the world cruise extractor.
//!
//! The article is normally read from a saved local copy. It can also be
//! fetched over HTTP with a single unauthenticated GET; there is no retry.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;
use scraper::Html;
use tracing::{debug, info, instrument};
use url::Url;

use worldcruise_shared::{Result, WorldCruiseError};

/// Maximum number of redirects to follow when fetching the article.
const MAX_REDIRECTS: usize = 5;

/// Default timeout in seconds for the article fetch.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum response size we consider valid (20 MB).
const MAX_RESPONSE_SIZE: u64 = 20 * 1024 * 1024;

/// User-Agent string for fetch requests.
const USER_AGENT: &str = concat!("worldcruise/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Source + result
// ---------------------------------------------------------------------------

/// Where the article HTML comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// A saved copy on disk.
    File(PathBuf),
    /// A live page fetched over HTTP.
    Url(Url),
}

impl DocumentSource {
    /// Parse a URL string into a fetch source.
    pub fn url(raw: &str) -> Result<Self> {
        let url = Url::parse(raw)
            .map_err(|e| WorldCruiseError::validation(format!("invalid URL {raw:?}: {e}")))?;
        match url.scheme() {
            "http" | "https" => Ok(Self::Url(url)),
            other => Err(WorldCruiseError::validation(format!(
                "unsupported URL scheme {other:?} in {raw:?}"
            ))),
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Url(url) => write!(f, "{url}"),
        }
    }
}

/// Raw article HTML plus where it came from.
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    /// Display form of the source (path or URL).
    pub origin: String,
    /// The undecoded HTML text.
    pub html: String,
}

impl LoadedDocument {
    /// Parse the HTML into a navigable tree.
    pub fn parse(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

/// Options for loading.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Timeout for the HTTP request in seconds.
    pub timeout_secs: u64,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

// ---------------------------------------------------------------------------
// Main entry point
// ---------------------------------------------------------------------------

/// Load the article from a file or URL.
#[instrument(skip_all, fields(source = %source))]
pub async fn load(source: &DocumentSource, opts: &LoadOptions) -> Result<LoadedDocument> {
    let html = match source {
        DocumentSource::File(path) => read_file(path)?,
        DocumentSource::Url(url) => {
            let client = build_client(opts)?;
            fetch(&client, url).await?
        }
    };

    info!(bytes = html.len(), "document loaded");

    Ok(LoadedDocument {
        origin: source.to_string(),
        html,
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String> {
    debug!(?path, "reading local document");
    std::fs::read_to_string(path)
        .map_err(|e| WorldCruiseError::Load(format!("{}: {e}", path.display())))
}

/// Build a reqwest client with appropriate settings.
fn build_client(opts: &LoadOptions) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .timeout(Duration::from_secs(opts.timeout_secs))
        .build()
        .map_err(|e| WorldCruiseError::Load(format!("failed to build HTTP client: {e}")))
}

/// GET the article and return its body text.
async fn fetch(client: &Client, url: &Url) -> Result<String> {
    debug!(%url, "fetching document");

    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| WorldCruiseError::Load(format!("{url}: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(WorldCruiseError::Load(format!("{url}: HTTP {status}")));
    }

    if let Some(len) = response.content_length() {
        if len > MAX_RESPONSE_SIZE {
            return Err(WorldCruiseError::Load(format!(
                "{url}: response too large ({len} bytes, max {MAX_RESPONSE_SIZE})"
            )));
        }
    }

    response
        .text()
        .await
        .map_err(|e| WorldCruiseError::Load(format!("{url}: failed to read body: {e}")))
}
