//! Mock Feed Client
//!
//! For testing and offline demos. Serves a fixed feed and records the URLs
//! it would have requested.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{FeedClient, SearchRequest, DEFAULT_ENDPOINT};
use crate::error::{Result, ScoutError};

/// Two-entry Atom feed in the shape the ArXiv API returns
pub const SAMPLE_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:opensearch="http://a9.com/-/spec/opensearch/1.1/" xmlns:arxiv="http://arxiv.org/schemas/atom">
  <id>https://arxiv.org/api/cHxbiOdZaP56ODnBPIenZhzg5f8</id>
  <title>arXiv Query: search_query=all:diffusion models&amp;id_list=&amp;start=0&amp;max_results=5</title>
  <updated>2024-05-01T00:00:00-04:00</updated>
  <opensearch:totalResults>2</opensearch:totalResults>
  <opensearch:startIndex>0</opensearch:startIndex>
  <opensearch:itemsPerPage>5</opensearch:itemsPerPage>
  <entry>
    <id>http://arxiv.org/abs/2006.11239v2</id>
    <updated>2020-12-16T21:15:40Z</updated>
    <published>2020-06-19T17:24:44Z</published>
    <title>Denoising Diffusion Probabilistic
  Models</title>
    <summary>  We present high quality image synthesis results using diffusion
probabilistic models, a class of latent variable models inspired by
considerations from nonequilibrium thermodynamics.
</summary>
    <author>
      <name>Jonathan Ho</name>
    </author>
    <author>
      <name>Ajay Jain</name>
    </author>
    <author>
      <name>Pieter Abbeel</name>
    </author>
    <link href="http://arxiv.org/abs/2006.11239v2" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2006.11239v2" rel="related" type="application/pdf"/>
    <arxiv:primary_category xmlns:arxiv="http://arxiv.org/schemas/atom" term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cs.LG" scheme="http://arxiv.org/schemas/atom"/>
    <category term="stat.ML" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2112.10752v2</id>
    <updated>2022-04-13T11:38:44Z</updated>
    <published>2021-12-20T18:55:25Z</published>
    <title>High-Resolution Image Synthesis with Latent Diffusion Models</title>
    <summary>By decomposing the image formation process into a sequential application
of denoising autoencoders, diffusion models achieve state-of-the-art
synthesis results on image data &amp; beyond.</summary>
    <author>
      <name>Robin Rombach</name>
    </author>
    <author>
      <name>Andreas Blattmann</name>
    </author>
    <link href="http://arxiv.org/abs/2112.10752v2" rel="alternate" type="text/html"/>
    <link title="pdf" href="http://arxiv.org/pdf/2112.10752v2" rel="related" type="application/pdf"/>
    <arxiv:primary_category xmlns:arxiv="http://arxiv.org/schemas/atom" term="cs.CV" scheme="http://arxiv.org/schemas/atom"/>
    <category term="cs.CV" scheme="http://arxiv.org/schemas/atom"/>
  </entry>
</feed>
"#;

/// Feed client that never touches the network
pub struct MockFeedClient {
    body: Option<String>,
    endpoint: String,
    requested: Mutex<Vec<String>>,
}

impl Default for MockFeedClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFeedClient {
    /// Serve `SAMPLE_FEED`
    pub fn new() -> Self {
        Self::with_body(SAMPLE_FEED)
    }

    pub fn with_body(body: impl Into<String>) -> Self {
        Self {
            body: Some(body.into()),
            endpoint: DEFAULT_ENDPOINT.into(),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Every fetch fails as if the endpoint were unreachable
    pub fn unreachable() -> Self {
        Self {
            body: None,
            ..Self::new()
        }
    }

    /// URLs requested so far, in order
    pub fn requested_urls(&self) -> Vec<String> {
        self.requested
            .lock()
            .map(|urls| urls.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl FeedClient for MockFeedClient {
    async fn fetch(&self, request: &SearchRequest) -> Result<String> {
        if let Ok(mut urls) = self.requested.lock() {
            urls.push(request.url(&self.endpoint));
        }

        self.body
            .clone()
            .ok_or_else(|| ScoutError::Api("mock endpoint unreachable".into()))
    }

    fn name(&self) -> &str {
        "MockFeed"
    }
}
