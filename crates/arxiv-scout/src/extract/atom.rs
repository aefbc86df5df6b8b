//! Atom Feed Extractor
//!
//! Deterministic extraction straight from the ArXiv Atom XML, no model involved.

use async_trait::async_trait;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::PaperExtractor;
use crate::error::{xml_error, Result, ScoutError};
use crate::model::Paper;

const PDF_BASE: &str = "https://arxiv.org/pdf/";

/// Parses `<entry>` elements into papers
#[derive(Clone, Copy, Debug, Default)]
pub struct AtomExtractor;

impl AtomExtractor {
    pub const fn new() -> Self {
        Self
    }

    /// Synchronous core of the extractor
    pub fn parse(&self, feed: &str) -> Result<Vec<Paper>> {
        let mut reader = Reader::from_str(feed);
        reader.config_mut().trim_text(true);

        let mut path: Vec<String> = Vec::new();
        let mut saw_feed = false;
        let mut entry: Option<EntryBuilder> = None;
        let mut papers = Vec::new();

        loop {
            match reader.read_event().map_err(xml_error)? {
                Event::Start(e) => {
                    let name = local_name(&e);
                    if path.is_empty() {
                        saw_feed = name == "feed";
                    }
                    if let Some(builder) = entry.as_mut() {
                        builder.attributes(&name, &e)?;
                    } else if name == "entry" {
                        entry = Some(EntryBuilder::default());
                    }
                    path.push(name);
                }
                Event::Empty(e) => {
                    if path.is_empty() {
                        saw_feed = local_name(&e) == "feed";
                    }
                    if let Some(builder) = entry.as_mut() {
                        builder.attributes(&local_name(&e), &e)?;
                    }
                }
                Event::Text(t) => {
                    if let Some(builder) = entry.as_mut() {
                        let text = t.unescape().map_err(xml_error)?;
                        builder.text(&path, &text);
                    }
                }
                Event::CData(c) => {
                    if let Some(builder) = entry.as_mut() {
                        let raw = c.into_inner();
                        builder.text(&path, &String::from_utf8_lossy(&raw));
                    }
                }
                Event::End(_) => match (path.pop().as_deref(), entry.take()) {
                    (Some("entry"), Some(builder)) => papers.push(builder.finish(papers.len())?),
                    (Some("author"), Some(mut builder)) => {
                        builder.close_author();
                        entry = Some(builder);
                    }
                    (_, builder) => entry = builder,
                },
                Event::Eof => break,
                _ => {}
            }
        }

        if !path.is_empty() {
            return Err(ScoutError::Xml(format!("unexpected end of document inside <{}>", path.join("/"))));
        }
        if !saw_feed {
            return Err(ScoutError::Xml("document is not an Atom feed".into()));
        }

        Ok(papers)
    }
}

#[async_trait]
impl PaperExtractor for AtomExtractor {
    async fn extract(&self, feed: &str) -> Result<Vec<Paper>> {
        self.parse(feed)
    }

    fn name(&self) -> &str {
        "atom"
    }
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

/// Collapse runs of whitespace (feeds wrap titles and abstracts)
fn collapse(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[derive(Debug, Default)]
struct EntryBuilder {
    id: String,
    title: String,
    summary: String,
    authors: Vec<String>,
    author_name: String,
    primary_category: Option<String>,
    first_category: Option<String>,
    pdf_titled: Option<String>,
    pdf_typed: Option<String>,
}

impl EntryBuilder {
    fn attributes(&mut self, name: &str, e: &BytesStart<'_>) -> Result<()> {
        if !matches!(name, "link" | "primary_category" | "category") {
            return Ok(());
        }

        let mut href = None;
        let mut title = None;
        let mut mime = None;
        let mut term = None;
        for attr in e.attributes() {
            let attr = attr.map_err(xml_error)?;
            let value = attr.unescape_value().map_err(xml_error)?.into_owned();
            match attr.key.local_name().as_ref() {
                b"href" => href = Some(value),
                b"title" => title = Some(value),
                b"type" => mime = Some(value),
                b"term" => term = Some(value),
                _ => {}
            }
        }

        match name {
            "link" => {
                if title.as_deref() == Some("pdf") && self.pdf_titled.is_none() {
                    self.pdf_titled = href;
                } else if mime.as_deref() == Some("application/pdf") && self.pdf_typed.is_none() {
                    self.pdf_typed = href;
                }
            }
            "primary_category" => self.primary_category = self.primary_category.take().or(term),
            _ => self.first_category = self.first_category.take().or(term),
        }
        Ok(())
    }

    /// Route text by the element path: only direct children of `<entry>` and
    /// `<author><name>` matter
    fn text(&mut self, path: &[String], text: &str) {
        let Some((leaf, parents)) = path.split_last() else {
            return;
        };
        let target = match (parents.last().map(String::as_str), leaf.as_str()) {
            (Some("entry"), "id") => &mut self.id,
            (Some("entry"), "title") => &mut self.title,
            (Some("entry"), "summary") => &mut self.summary,
            (Some("author"), "name") => &mut self.author_name,
            _ => return,
        };
        if !target.is_empty() {
            target.push(' ');
        }
        target.push_str(text);
    }

    fn close_author(&mut self) {
        let name = collapse(&std::mem::take(&mut self.author_name));
        if !name.is_empty() {
            self.authors.push(name);
        }
    }

    fn finish(self, index: usize) -> Result<Paper> {
        let id = self.id.trim();
        if id.contains("/api/errors") {
            let message = collapse(&self.summary);
            return Err(ScoutError::Api(if message.is_empty() { id.to_string() } else { message }));
        }

        let arxiv_id = id
            .split_once("/abs/")
            .map_or(id, |(_, rest)| rest)
            .trim_matches('/')
            .to_string();

        let pdf_url = self
            .pdf_titled
            .or(self.pdf_typed)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| {
                if arxiv_id.is_empty() {
                    String::new()
                } else {
                    format!("{PDF_BASE}{arxiv_id}")
                }
            });

        let paper = Paper {
            title: collapse(&self.title),
            authors: self.authors,
            abstract_text: collapse(&self.summary),
            primary_category: self
                .primary_category
                .or(self.first_category)
                .unwrap_or_default()
                .trim()
                .to_string(),
            pdf_url,
            arxiv_id,
        };
        paper.validate(index)?;
        Ok(paper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::SAMPLE_FEED;

    fn entry(body: &str) -> String {
        format!(r#"<feed xmlns="http://www.w3.org/2005/Atom" xmlns:arxiv="http://arxiv.org/schemas/atom"><entry>{body}</entry></feed>"#)
    }

    const MINIMAL: &str = r#"<id>http://arxiv.org/abs/2401.00001v1</id>
        <title>T</title><summary>S</summary>
        <author><name>A B</name></author>"#;

    #[test]
    fn test_parses_sample_feed() {
        let papers = AtomExtractor::new().parse(SAMPLE_FEED).unwrap();
        assert_eq!(papers.len(), 2);

        let ddpm = &papers[0];
        assert_eq!(ddpm.title, "Denoising Diffusion Probabilistic Models");
        assert_eq!(ddpm.authors, vec!["Jonathan Ho", "Ajay Jain", "Pieter Abbeel"]);
        assert_eq!(ddpm.primary_category, "cs.LG");
        assert_eq!(ddpm.pdf_url, "http://arxiv.org/pdf/2006.11239v2");
        assert_eq!(ddpm.arxiv_id, "2006.11239v2");
        assert!(ddpm.abstract_text.starts_with("We present high quality image synthesis"));
        assert!(!ddpm.abstract_text.contains('\n'));

        assert_eq!(papers[1].primary_category, "cs.CV");
        assert!(papers[1].abstract_text.ends_with("image data & beyond."));
    }

    #[test]
    fn test_feed_title_is_not_a_paper_title() {
        let papers = AtomExtractor::new().parse(SAMPLE_FEED).unwrap();
        assert!(papers.iter().all(|p| !p.title.starts_with("arXiv Query")));
    }

    #[test]
    fn test_empty_feed_yields_no_papers() {
        let feed = r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>arXiv Query</title></feed>"#;
        assert!(AtomExtractor::new().parse(feed).unwrap().is_empty());
    }

    #[test]
    fn test_category_and_pdf_fallbacks() {
        let xml = entry(&format!(
            r#"{MINIMAL}<category term="math.CO"/><category term="cs.DM"/>
            <link href="http://arxiv.org/abs/2401.00001v1" rel="alternate" type="text/html"/>"#
        ));
        let papers = AtomExtractor::new().parse(&xml).unwrap();
        assert_eq!(papers[0].primary_category, "math.CO");
        assert_eq!(papers[0].pdf_url, "https://arxiv.org/pdf/2401.00001v1");

        let typed = entry(&format!(
            r#"{MINIMAL}<arxiv:primary_category term="cs.AI"/>
            <link href="http://export.arxiv.org/pdf/2401.00001v1" type="application/pdf"/>"#
        ));
        let papers = AtomExtractor::new().parse(&typed).unwrap();
        assert_eq!(papers[0].primary_category, "cs.AI");
        assert_eq!(papers[0].pdf_url, "http://export.arxiv.org/pdf/2401.00001v1");
    }

    #[test]
    fn test_missing_field_fails_whole_extraction() {
        let xml = format!(
            r#"<feed xmlns="http://www.w3.org/2005/Atom">
            <entry>{MINIMAL}<category term="cs.LG"/></entry>
            <entry><id>http://arxiv.org/abs/2401.00002v1</id><title>No authors</title>
              <summary>S</summary><category term="cs.LG"/></entry>
            </feed>"#
        );
        assert!(matches!(
            AtomExtractor::new().parse(&xml),
            Err(ScoutError::MissingField { index: 1, field: "authors" })
        ));
    }

    #[test]
    fn test_missing_category_is_rejected() {
        assert!(matches!(
            AtomExtractor::new().parse(&entry(MINIMAL)),
            Err(ScoutError::MissingField { field: "primaryCategory", .. })
        ));
    }

    #[test]
    fn test_api_error_entry() {
        let xml = entry(
            r#"<id>http://arxiv.org/api/errors#incorrect_id_format_for_1234</id>
            <title>Error</title><summary>incorrect id format for 1234</summary>"#,
        );
        match AtomExtractor::new().parse(&xml) {
            Err(ScoutError::Api(msg)) => assert_eq!(msg, "incorrect id format for 1234"),
            other => panic!("expected API error, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_xml() {
        let parser = AtomExtractor::new();
        assert!(matches!(parser.parse("<feed><entry></feed>"), Err(ScoutError::Xml(_))));
        assert!(matches!(parser.parse("<feed><entry>"), Err(ScoutError::Xml(_))));
        assert!(matches!(parser.parse("Rate exceeded."), Err(ScoutError::Xml(_))));
    }

    #[tokio::test]
    async fn test_trait_object() {
        let extractor: Box<dyn PaperExtractor> = Box::new(AtomExtractor::new());
        assert_eq!(extractor.name(), "atom");
        assert_eq!(extractor.extract(SAMPLE_FEED).await.unwrap().len(), 2);
    }
}
