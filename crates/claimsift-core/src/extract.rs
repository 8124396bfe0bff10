//! PDF content extraction: source trait, GROBID adapter, and cache-backed
//! fetch orchestration.
//!
//! The extractor does no PDF parsing of its own. A [`ContentSource`]
//! produces the flat section list for a document; the production source
//! forwards the bytes to a remote GROBID service and reshapes the parsed
//! article. Extraction failures surface as [`ExtractError`] and are never
//! cached.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use thiserror::Error;

use claimsift_grobid::{GrobidClient, GrobidError, ParsedArticle};

use crate::cache::{ContentCache, content_hash};
use crate::{PdfSection, SectionKind};

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("GROBID error: {0}")]
    Grobid(#[from] GrobidError),
    #[error("content source error: {0}")]
    Source(String),
}

/// A provider of structured content for uploaded PDFs.
pub trait ContentSource: Send + Sync {
    /// Name used in logs (e.g. "grobid").
    fn name(&self) -> &str;

    /// Extract the flat section list for a PDF.
    fn extract<'a>(
        &'a self,
        pdf: &'a [u8],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<PdfSection>, ExtractError>> + Send + 'a>>;
}

/// Production [`ContentSource`] backed by a remote GROBID service.
pub struct GrobidSource {
    client: GrobidClient,
}

impl GrobidSource {
    pub fn new(client: GrobidClient) -> Self {
        Self { client }
    }
}

impl ContentSource for GrobidSource {
    fn name(&self) -> &str {
        "grobid"
    }

    fn extract<'a>(
        &'a self,
        pdf: &'a [u8],
    ) -> Pin<Box<dyn Future<Output = Result<Vec<PdfSection>, ExtractError>> + Send + 'a>> {
        Box::pin(async move {
            let article = self.client.process_fulltext(pdf).await?;
            tracing::debug!(
                title = %article.title,
                sections = article.sections.len(),
                "parsed article"
            );
            Ok(sections_from_article(&article))
        })
    }
}

/// Flatten a parsed article into the section list shown to the user.
///
/// The abstract always occupies id 0 under the fixed title "Abstract";
/// body sections follow with 1-based ids and their own headings.
pub fn sections_from_article(article: &ParsedArticle) -> Vec<PdfSection> {
    let mut sections = Vec::with_capacity(article.sections.len() + 1);
    sections.push(PdfSection {
        id: 0,
        kind: SectionKind::Abstract,
        title: "Abstract".to_string(),
        text: article.abstract_text.clone(),
    });
    for (idx, section) in article.sections.iter().enumerate() {
        sections.push(PdfSection {
            id: idx + 1,
            kind: SectionKind::Paragraph,
            title: section.heading.clone(),
            text: section.text.clone(),
        });
    }
    sections
}

/// Placeholder section list shown when a PDF cannot be parsed.
pub fn error_sections() -> Vec<PdfSection> {
    vec![PdfSection {
        id: 0,
        kind: SectionKind::Abstract,
        title: "Error parsing PDF".to_string(),
        text: "Sorry, we might have problem parsing a given PDF".to_string(),
    }]
}

/// Outcome of a section fetch.
#[derive(Debug, Clone)]
pub struct SectionFetch {
    /// SHA-224 hex digest of the PDF bytes.
    pub hash: String,
    pub sections: Arc<Vec<PdfSection>>,
    /// Whether the sections were served from the cache.
    pub from_cache: bool,
}

/// Fetch the section list for a PDF, consulting the cache first.
///
/// Identical bytes hash to the same key, so a repeated upload is served
/// from the cache without touching the source again. Failed extractions
/// propagate the error and leave the cache untouched.
pub async fn fetch_sections(
    source: &dyn ContentSource,
    cache: &ContentCache,
    pdf: &[u8],
) -> Result<SectionFetch, ExtractError> {
    let hash = content_hash(pdf);

    if let Some(sections) = cache.get(&hash) {
        return Ok(SectionFetch {
            hash,
            sections,
            from_cache: true,
        });
    }

    tracing::debug!(
        source = source.name(),
        hash = %hash,
        bytes = pdf.len(),
        "extracting PDF content"
    );
    let sections = source.extract(pdf).await?;
    let sections = cache.insert(hash.clone(), sections);

    Ok(SectionFetch {
        hash,
        sections,
        from_cache: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use claimsift_grobid::TeiSection;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Configurable mock implementing [`ContentSource`] for tests.
    ///
    /// Returns responses in order, repeating the last one, and counts calls.
    struct MockSource {
        responses: Mutex<Vec<Result<Vec<PdfSection>, String>>>,
        fallback: Result<Vec<PdfSection>, String>,
        calls: AtomicUsize,
    }

    impl MockSource {
        fn always(response: Result<Vec<PdfSection>, String>) -> Self {
            Self {
                responses: Mutex::new(Vec::new()),
                fallback: response,
                calls: AtomicUsize::new(0),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl ContentSource for MockSource {
        fn name(&self) -> &str {
            "mock"
        }

        fn extract<'a>(
            &'a self,
            _pdf: &'a [u8],
        ) -> Pin<Box<dyn Future<Output = Result<Vec<PdfSection>, ExtractError>> + Send + 'a>>
        {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let response = {
                let mut seq = self.responses.lock().unwrap();
                seq.pop().unwrap_or_else(|| self.fallback.clone())
            };
            Box::pin(async move { response.map_err(ExtractError::Source) })
        }
    }

    fn two_sections() -> Vec<PdfSection> {
        vec![
            PdfSection {
                id: 0,
                kind: SectionKind::Abstract,
                title: "Abstract".to_string(),
                text: "Summary.".to_string(),
            },
            PdfSection {
                id: 1,
                kind: SectionKind::Paragraph,
                title: "Introduction".to_string(),
                text: "We begin.".to_string(),
            },
        ]
    }

    #[test]
    fn article_reshape_puts_abstract_first() {
        let article = ParsedArticle {
            title: "A Study of Claims".to_string(),
            abstract_text: "We study claims in papers.".to_string(),
            sections: vec![
                TeiSection {
                    heading: "Introduction".to_string(),
                    text: "Claims matter.".to_string(),
                },
                TeiSection {
                    heading: "Methods".to_string(),
                    text: "We classify sentences.".to_string(),
                },
            ],
        };

        let sections = sections_from_article(&article);
        assert_eq!(sections.len(), 3);

        assert_eq!(sections[0].id, 0);
        assert_eq!(sections[0].kind, SectionKind::Abstract);
        assert_eq!(sections[0].title, "Abstract");
        assert_eq!(sections[0].text, "We study claims in papers.");

        assert_eq!(sections[1].id, 1);
        assert_eq!(sections[1].kind, SectionKind::Paragraph);
        assert_eq!(sections[1].title, "Introduction");
        assert_eq!(sections[2].id, 2);
        assert_eq!(sections[2].title, "Methods");
    }

    #[test]
    fn reshape_of_empty_article_still_has_abstract() {
        let sections = sections_from_article(&ParsedArticle::default());
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].kind, SectionKind::Abstract);
        assert_eq!(sections[0].text, "");
    }

    #[test]
    fn error_placeholder_is_exactly_one_abstract() {
        let sections = error_sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].id, 0);
        assert_eq!(sections[0].kind, SectionKind::Abstract);
        assert_eq!(sections[0].title, "Error parsing PDF");
        assert_eq!(
            sections[0].text,
            "Sorry, we might have problem parsing a given PDF"
        );
    }

    #[tokio::test]
    async fn second_identical_upload_served_from_cache() {
        let source = MockSource::always(Ok(two_sections()));
        let cache = ContentCache::new();
        let pdf = b"%PDF-1.4 fake document";

        let first = fetch_sections(&source, &cache, pdf).await.unwrap();
        assert!(!first.from_cache);
        assert_eq!(first.sections.len(), 2);
        assert_eq!(source.call_count(), 1);

        let second = fetch_sections(&source, &cache, pdf).await.unwrap();
        assert!(second.from_cache);
        assert_eq!(second.hash, first.hash);
        assert!(Arc::ptr_eq(&first.sections, &second.sections));
        // The source must not be called again for identical bytes.
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn distinct_documents_use_distinct_keys() {
        let source = MockSource::always(Ok(two_sections()));
        let cache = ContentCache::new();

        let a = fetch_sections(&source, &cache, b"%PDF- doc a").await.unwrap();
        let b = fetch_sections(&source, &cache, b"%PDF- doc b").await.unwrap();
        assert_ne!(a.hash, b.hash);
        assert_eq!(source.call_count(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let source = MockSource::always(Err("connection refused".to_string()));
        let cache = ContentCache::new();
        let pdf = b"%PDF-1.4 unreachable";

        let err = fetch_sections(&source, &cache, pdf).await.unwrap_err();
        assert!(matches!(err, ExtractError::Source(_)));
        assert!(cache.is_empty());

        // A retry reaches the source again instead of replaying the failure.
        let _ = fetch_sections(&source, &cache, pdf).await.unwrap_err();
        assert_eq!(source.call_count(), 2);
    }

    #[tokio::test]
    async fn recovery_after_failure_is_cached() {
        let source = MockSource {
            // Responses pop from the back: first call fails, second succeeds.
            responses: Mutex::new(vec![Ok(two_sections()), Err("timeout".to_string())]),
            fallback: Ok(two_sections()),
            calls: AtomicUsize::new(0),
        };
        let cache = ContentCache::new();
        let pdf = b"%PDF-1.4 flaky";

        assert!(fetch_sections(&source, &cache, pdf).await.is_err());
        assert!(cache.is_empty());

        let fetch = fetch_sections(&source, &cache, pdf).await.unwrap();
        assert!(!fetch.from_cache);
        assert_eq!(cache.len(), 1);

        let cached = fetch_sections(&source, &cache, pdf).await.unwrap();
        assert!(cached.from_cache);
        assert_eq!(source.call_count(), 2);
    }
}
