//! Summarization stage — condenses a message into 2-3 actionable sentences.

use std::sync::Arc;

use tracing::debug;

use crate::llm::{TextGenerator, is_generation_error};
use crate::pipeline::prompts;

/// One summarized message.
#[derive(Debug, Clone)]
pub struct SummarizedEmail {
    pub subject: String,
    pub original_content: String,
    pub summary: String,
}

pub struct Summarizer {
    generator: Arc<dyn TextGenerator>,
}

impl Summarizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Summarize one message. A summary has no safe fallback value, so this
    /// is the one stage that annotates failures instead of substituting:
    /// error-prefixed output is wrapped as `"Unable to generate summary: ..."`.
    pub async fn summarize(&self, content: &str, subject: &str) -> SummarizedEmail {
        let prompt = prompts::summarizer_prompt(content, subject);
        let mut summary = self
            .generator
            .generate(prompts::SUMMARIZER_SYSTEM, &prompt)
            .await;

        if is_generation_error(&summary) {
            summary = format!("Unable to generate summary: {summary}");
        }

        debug!(subject = %subject, "Summarized message");

        SummarizedEmail {
            subject: subject.to_string(),
            original_content: content.to_string(),
            summary,
        }
    }
}
