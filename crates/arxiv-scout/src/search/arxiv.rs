//! ArXiv HTTP Client

use std::time::Duration;

use async_trait::async_trait;

use super::{FeedClient, SearchRequest};
use crate::error::{Result, ScoutError};

/// Fetches Atom feeds from the ArXiv query API
pub struct ArxivHttpClient {
    client: reqwest::Client,
    endpoint: String,
}

impl ArxivHttpClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ScoutError::Config(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl FeedClient for ArxivHttpClient {
    async fn fetch(&self, request: &SearchRequest) -> Result<String> {
        let url = request.url(&self.endpoint);
        tracing::debug!(%url, "Fetching ArXiv feed");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            // Body still goes to extraction; an error feed fails there
            tracing::warn!(%status, "ArXiv returned non-success status");
        }

        Ok(response.text().await?)
    }

    fn name(&self) -> &str {
        "ArXiv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ArxivHttpClient {
        ArxivHttpClient::new(format!("{}/api/query", server.uri()), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_fetch_sends_query_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/query"))
            .and(query_param("search_query", "all:diffusion models"))
            .and(query_param("max_results", "5"))
            .and(query_param("sortBy", "relevance"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<feed/>"))
            .expect(1)
            .mount(&server)
            .await;

        let body = client_for(&server)
            .fetch(&SearchRequest::new("diffusion models", 0))
            .await
            .unwrap();
        assert_eq!(body, "<feed/>");
    }

    #[tokio::test]
    async fn test_non_success_body_is_returned() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("<feed>oops</feed>"))
            .mount(&server)
            .await;

        let body = client_for(&server)
            .fetch(&SearchRequest::new("x", 1))
            .await
            .unwrap();
        assert_eq!(body, "<feed>oops</feed>");
    }

    #[tokio::test]
    async fn test_connection_failure_is_network_error() {
        let client = ArxivHttpClient::new("http://127.0.0.1:9/api/query", Duration::from_secs(2)).unwrap();
        let result = client.fetch(&SearchRequest::new("x", 1)).await;
        assert!(matches!(result, Err(ScoutError::Network(_))));
    }
}
