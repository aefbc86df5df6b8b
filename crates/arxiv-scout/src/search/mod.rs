//! Paper Search Endpoint
//!
//! Abstractions and implementations for fetching ArXiv search feeds.

mod arxiv;
mod mock;

pub use arxiv::ArxivHttpClient;
pub use mock::{MockFeedClient, SAMPLE_FEED};

use async_trait::async_trait;

use crate::error::Result;

/// Public ArXiv query endpoint
pub const DEFAULT_ENDPOINT: &str = "http://export.arxiv.org/api/query";

/// Result count when the caller gives none (or zero)
pub const DEFAULT_MAX_RESULTS: u32 = 5;

/// One search: free-text query plus result limit
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: u32,
}

impl SearchRequest {
    /// A zero limit means "use the default"
    pub fn new(query: impl Into<String>, max_results: u32) -> Self {
        Self {
            query: query.into(),
            max_results: if max_results == 0 { DEFAULT_MAX_RESULTS } else { max_results },
        }
    }

    /// Full query URL: all-fields search, limited, sorted by relevance
    pub fn url(&self, endpoint: &str) -> String {
        format!(
            "{endpoint}?search_query=all:{}&max_results={}&sortBy=relevance",
            encode_component(&self.query),
            self.max_results,
        )
    }
}

/// URI-component encoding that leaves `!'()*` literal, like browsers do
fn encode_component(raw: &str) -> String {
    let mut encoded = urlencoding::encode(raw).into_owned();
    for (escaped, mark) in [("%21", "!"), ("%27", "'"), ("%28", "("), ("%29", ")"), ("%2A", "*")] {
        encoded = encoded.replace(escaped, mark);
    }
    encoded
}

/// Feed client trait (Strategy pattern)
///
/// One call performs exactly one request and returns the raw body.
#[async_trait]
pub trait FeedClient: Send + Sync {
    async fn fetch(&self, request: &SearchRequest) -> Result<String>;

    /// Client name for logs
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_encodes_query() {
        let url = SearchRequest::new("diffusion models", 0).url(DEFAULT_ENDPOINT);
        assert_eq!(
            url,
            "http://export.arxiv.org/api/query?search_query=all:diffusion%20models&max_results=5&sortBy=relevance"
        );
    }

    #[test]
    fn test_url_keeps_requested_count() {
        let url = SearchRequest::new("graph neural nets & LLMs", 12).url(DEFAULT_ENDPOINT);
        assert!(url.contains("all:graph%20neural%20nets%20%26%20LLMs"));
        assert!(url.contains("max_results=12"));
    }

    #[test]
    fn test_url_keeps_unreserved_marks() {
        let url = SearchRequest::new("RL (offline)! it's *fast* 100%", 5).url(DEFAULT_ENDPOINT);
        assert!(url.contains("all:RL%20(offline)!%20it's%20*fast*%20100%25&"));
    }

    #[test]
    fn test_zero_uses_default() {
        assert_eq!(SearchRequest::new("x", 0).max_results, DEFAULT_MAX_RESULTS);
        assert_eq!(SearchRequest::new("x", 3).max_results, 3);
    }
}
