//! Domain Models
//!
//! Paper records extracted from ArXiv search results. Nothing here outlives
//! a single request.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoutError};

/// Primary categories counted as AI/ML research
pub const AI_CATEGORIES: [&str; 7] = [
    "cs.LG", "cs.AI", "cs.CV", "cs.CL", "cs.NE", "stat.ML", "eess.IV",
];

/// One ArXiv paper. Every field is required and non-empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    pub title: String,

    /// Author names in feed order
    pub authors: Vec<String>,

    #[serde(rename = "abstract")]
    pub abstract_text: String,

    /// Short category code, e.g. "cs.LG"
    pub primary_category: String,

    pub pdf_url: String,

    /// ArXiv accession string, e.g. "2301.01234v2"
    pub arxiv_id: String,
}

impl Paper {
    /// Check the schema invariants. `index` is the record's position, for errors.
    pub fn validate(&self, index: usize) -> Result<()> {
        let missing = |field: &'static str| -> Result<()> { Err(ScoutError::MissingField { index, field }) };

        if self.title.trim().is_empty() {
            return missing("title");
        }
        if self.authors.is_empty() || self.authors.iter().any(|a| a.trim().is_empty()) {
            return missing("authors");
        }
        if self.abstract_text.trim().is_empty() {
            return missing("abstract");
        }
        if self.primary_category.trim().is_empty() {
            return missing("primaryCategory");
        }
        if self.pdf_url.trim().is_empty() {
            return missing("pdfUrl");
        }
        if self.arxiv_id.trim().is_empty() {
            return missing("arxivId");
        }
        Ok(())
    }

    /// Is the primary category one of the AI/ML codes?
    pub fn is_ai_related(&self) -> bool {
        AI_CATEGORIES.contains(&self.primary_category.trim())
    }
}

/// Papers returned by one search, in relevance order
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub papers: Vec<Paper>,
}

impl SearchResults {
    /// Fails on the first invalid record; no partial results
    pub fn validate(&self) -> Result<()> {
        self.papers
            .iter()
            .enumerate()
            .try_for_each(|(i, paper)| paper.validate(i))
    }

    /// JSON schema handed to structured-output models
    pub fn json_schema() -> serde_json::Value {
        let text = serde_json::json!({"type": "string", "minLength": 1});
        serde_json::json!({
            "type": "object",
            "properties": {
                "papers": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "title": text,
                            "authors": {"type": "array", "items": text, "minItems": 1},
                            "abstract": text,
                            "primaryCategory": text,
                            "pdfUrl": text,
                            "arxivId": text,
                        },
                        "required": ["title", "authors", "abstract", "primaryCategory", "pdfUrl", "arxivId"],
                        "additionalProperties": false,
                    }
                }
            },
            "required": ["papers"],
            "additionalProperties": false,
        })
    }
}

#[cfg(test)]
pub(crate) fn sample_paper(title: &str) -> Paper {
    Paper {
        title: title.into(),
        authors: vec!["Ada Lovelace".into()],
        abstract_text: "We study things.".into(),
        primary_category: "cs.LG".into(),
        pdf_url: "https://arxiv.org/pdf/2401.00001v1".into(),
        arxiv_id: "2401.00001v1".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_field_names() {
        let json = serde_json::to_value(sample_paper("T")).unwrap();
        for key in ["title", "authors", "abstract", "primaryCategory", "pdfUrl", "arxivId"] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        assert!(sample_paper("T").validate(0).is_ok());

        let mut no_authors = sample_paper("T");
        no_authors.authors.clear();
        assert!(matches!(
            no_authors.validate(3),
            Err(ScoutError::MissingField { index: 3, field: "authors" })
        ));

        let mut blank_author = sample_paper("T");
        blank_author.authors.push("  ".into());
        assert!(blank_author.validate(0).is_err());

        let mut no_pdf = sample_paper("T");
        no_pdf.pdf_url = String::new();
        assert!(matches!(no_pdf.validate(0), Err(ScoutError::MissingField { field: "pdfUrl", .. })));
    }

    #[test]
    fn test_results_validation_is_all_or_nothing() {
        let mut bad = sample_paper("B");
        bad.arxiv_id = " ".into();
        let results = SearchResults { papers: vec![sample_paper("A"), bad] };
        assert!(matches!(
            results.validate(),
            Err(ScoutError::MissingField { index: 1, field: "arxivId" })
        ));
    }

    #[test]
    fn test_ai_classification() {
        let mut paper = sample_paper("T");
        assert!(paper.is_ai_related());
        paper.primary_category = "math.CO".into();
        assert!(!paper.is_ai_related());
        paper.primary_category = "stat.ML".into();
        assert!(paper.is_ai_related());
    }

    #[test]
    fn test_missing_json_field_fails_deserialization() {
        let json = r#"{"papers": [{"title": "T", "authors": ["A"], "abstract": "x", "pdfUrl": "u", "arxivId": "1"}]}"#;
        assert!(serde_json::from_str::<SearchResults>(json).is_err());
    }
}
