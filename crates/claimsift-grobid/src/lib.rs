//! GROBID service client.
//!
//! Sends PDF bytes to a remote GROBID instance's fulltext endpoint and
//! parses the returned TEI XML into a [`ParsedArticle`] (title, abstract,
//! body sections). PDF structure recovery itself is entirely GROBID's
//! job; this crate only speaks its HTTP and XML surfaces.

mod tei;

use std::time::Duration;

use thiserror::Error;

pub use tei::{ParsedArticle, TeiSection, parse_tei};

/// Public GROBID instance used when no URL is configured.
pub const DEFAULT_GROBID_URL: &str = "https://cloud.science-miner.com/grobid";

/// Default per-request timeout. Fulltext processing of a long paper can
/// take tens of seconds on the public instance.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Error, Debug)]
pub enum GrobidError {
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("GROBID returned HTTP {0}")]
    Status(u16),
    #[error("GROBID returned an empty document")]
    Empty,
}

/// Client for one GROBID service instance.
#[derive(Debug, Clone)]
pub struct GrobidClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl GrobidClient {
    /// Create a client for the service at `base_url` with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    /// Create a client with an explicit per-request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            timeout,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Process a PDF through `processFulltextDocument` and parse the result.
    ///
    /// GROBID answers 204 when it cannot extract anything from the PDF;
    /// that and a structurally empty TEI document both surface as
    /// [`GrobidError::Empty`].
    pub async fn process_fulltext(&self, pdf: &[u8]) -> Result<ParsedArticle, GrobidError> {
        let url = format!("{}/api/processFulltextDocument", self.base_url);

        let part = reqwest::multipart::Part::bytes(pdf.to_vec())
            .file_name("upload.pdf")
            .mime_str("application/pdf")?;
        let form = reqwest::multipart::Form::new().part("input", part);

        let resp = self
            .http
            .post(&url)
            .multipart(form)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = resp.status();
        if status.as_u16() == 204 {
            return Err(GrobidError::Empty);
        }
        if !status.is_success() {
            return Err(GrobidError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        tracing::trace!(url = %url, bytes = body.len(), "received TEI document");

        let article = parse_tei(body.as_bytes());
        if article.is_empty() {
            return Err(GrobidError::Empty);
        }
        Ok(article)
    }
}
