//! Page download and text extraction for the research tool.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use scraper::{ElementRef, Html, Node, Selector};
use thiserror::Error;
use tracing::{debug, warn};

/// Prefix of the string returned when a page could not be fetched.
pub const FETCH_ERROR_TAG: &str = "[ERRO_EXTRACAO";

pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_CHARS: usize = 4000;

const USER_AGENT: &str = "Mozilla/5.0";
const STRIPPED_TAGS: &[&str] = &["script", "style", "nav", "header", "footer", "aside", "noscript"];
const CONTENT_REGIONS: &[&str] = &["main", "article", "body"];

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error(transparent)]
    Request(#[from] reqwest::Error),
    #[error("HTTP status {0}")]
    Status(StatusCode),
    #[error("invalid selector '{selector}': {message}")]
    Selector {
        selector: &'static str,
        message: String,
    },
}

/// Formats a failure as the sentinel string callers look for.
pub fn fetch_error_sentinel(err: &FetchError) -> String {
    format!("{FETCH_ERROR_TAG}:{err}]")
}

pub fn is_fetch_error(text: &str) -> bool {
    text.contains(FETCH_ERROR_TAG)
}

/// Something that turns a URL into cleaned page text.
///
/// Never fails: errors come back as a string containing [`FETCH_ERROR_TAG`].
pub trait PageFetcher: Send + Sync {
    fn fetch(&self, url: &str) -> String;
}

/// [`PageFetcher`] backed by a blocking HTTP client.
#[derive(Debug, Clone)]
pub struct WebFetcher {
    client: Client,
    max_chars: usize,
}

impl WebFetcher {
    pub fn new(timeout: Duration, max_chars: usize) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(FetchError::Client)?;
        Ok(Self { client, max_chars })
    }

    fn try_fetch(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }
        let html = response.text()?;
        extract_page_text(&html, self.max_chars)
    }
}

impl PageFetcher for WebFetcher {
    fn fetch(&self, url: &str) -> String {
        debug!(url, "fetching documentation page");
        match self.try_fetch(url) {
            Ok(text) => {
                debug!(url, chars = text.chars().count(), "page text extracted");
                text
            }
            Err(err) => {
                warn!(url, error = %err, "page fetch failed");
                fetch_error_sentinel(&err)
            }
        }
    }
}

/// Extracts readable text from an HTML page.
///
/// Prefers `main`, then `article`, then `body`. Text under navigation, chrome
/// and script elements is dropped. Lines are trimmed, blank lines removed and
/// the result cut to `max_chars` characters.
pub fn extract_page_text(html: &str, max_chars: usize) -> Result<String, FetchError> {
    let document = Html::parse_document(html);

    let mut region = None;
    for &name in CONTENT_REGIONS {
        let selector = Selector::parse(name).map_err(|err| FetchError::Selector {
            selector: name,
            message: err.to_string(),
        })?;
        if let Some(element) = document.select(&selector).next() {
            region = Some(element);
            break;
        }
    }
    let region = region.unwrap_or_else(|| document.root_element());

    let text = visible_lines(region).join("\n");
    Ok(truncate_chars(&text, max_chars))
}

fn visible_lines(region: ElementRef<'_>) -> Vec<String> {
    region
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => {
                let hidden = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .is_some_and(|element| STRIPPED_TAGS.contains(&element.name()))
                });
                (!hidden).then_some(&**text)
            }
            _ => None,
        })
        .flat_map(str::lines)
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => text[..byte_index].to_string(),
        None => text.to_string(),
    }
}
