//! # arxiv-scout
//!
//! Research paper scout for hackathon participants: searches ArXiv, extracts
//! structured paper records and lets the model suggest project ideas.
//!
//! ## Request Flow
//!
//! ```text
//! ┌──────────┐   ≤ 3 steps   ┌──────────────┐  GET   ┌────────────┐
//! │  Scout   │──────────────▶│ searchArxiv  │───────▶│ ArXiv API  │
//! │ (Agent)  │◀──────────────│    tool      │◀───────│ Atom feed  │
//! └──────────┘  JSON papers  └──────┬───────┘        └────────────┘
//!                                   │
//!                          ┌────────▼────────┐
//!                          │ PaperExtractor  │  atom | llm | atom+llm
//!                          └─────────────────┘
//! ```

pub mod svckit;
pub mod search;
pub mod extract;
pub mod scout;
pub mod welcome;
pub mod model;
pub mod error;

pub use error::{Result, ScoutError};
pub use extract::{build_extractor, ExtractionMode, PaperExtractor};
pub use model::{Paper, SearchResults, AI_CATEGORIES};
pub use scout::{Scout, ScoutConfig};
pub use search::{ArxivHttpClient, FeedClient, MockFeedClient, SearchRequest};
pub use welcome::{welcome, Welcome};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::SearchArxivTool;
}

/// Prompt used when the request body is blank
pub const DEFAULT_QUERY: &str = "Find papers about diffusion models";

/// Returned in place of any failed run
pub const FALLBACK_MESSAGE: &str = "Sorry, there was an error processing your request.";

/// System prompt for the paper scout agent
pub const SCOUT_SYSTEM_PROMPT: &str = r"You are an ArXiv research paper scout for hackathon students. 

Your job:
1. Search ArXiv for papers related to the user's topic
2. Classify each paper as ML-related, AI Agent related, Generative AI related, or not based on the primary category
3. For each paper, include the title, authors, 1-2 sentence abstract summary, category, AND the PDF URL link
4. Suggest several hackathon project ideas inspired by the papers with a short summary, a pitch, and conceptual ideas

If there are no good papers found, try again up to 3 times.

AI-related categories include: cs.LG, cs.AI, cs.CV, cs.CL, cs.NE, stat.ML, eess.IV

IMPORTANT: 
- Keep abstracts to 1-2 sentences max
- ALWAYS include clickable links to papers (use the pdfUrl from the tool results)
- Do NOT include implementation tips or tech stack recommendations
- Do NOT mention time frames or how long projects take

Format your response clearly with paper summaries (including links) and project ideas.";
