//! Discovery metadata shown to clients before the first request

use serde::Serialize;

pub const WELCOME_MESSAGE: &str =
    "ArXiv Paper Scout - Find research papers and get hackathon project ideas! 🚀";

const EXAMPLE_PROMPTS: [&str; 3] = [
    "Find papers about AI agents and suggest hackathon projects",
    "Search for diffusion models research and classify which are ML-focused",
    "What are the latest papers on reinforcement learning?",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExamplePrompt {
    pub data: &'static str,
    pub content_type: &'static str,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Welcome {
    pub welcome: &'static str,
    pub prompts: Vec<ExamplePrompt>,
}

pub fn welcome() -> Welcome {
    Welcome {
        welcome: WELCOME_MESSAGE,
        prompts: EXAMPLE_PROMPTS
            .iter()
            .map(|data| ExamplePrompt { data, content_type: "text/plain" })
            .collect(),
    }
}
