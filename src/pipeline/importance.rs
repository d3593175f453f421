//! Importance-rating stage — places a message on a 5-level ordered scale.

use std::sync::Arc;

use tracing::debug;

use crate::llm::TextGenerator;
use crate::pipeline::normalize::normalize_label;
use crate::pipeline::prompts;

/// The ordered severity scale, least to most important.
pub const IMPORTANCE_SCALE: [&str; 5] = ["low", "medium", "high", "urgent", "critical"];

/// Scale-order string returned with every rating for downstream display.
pub const SCALE_DESCRIPTION: &str = "low -> medium -> high -> urgent -> critical";

/// Error prefixes after the lower-casing this stage applies to raw output.
const LOWERCASE_ERROR_PREFIXES: [&str; 3] = ["api error", "request failed", "no response"];

/// One rated message.
#[derive(Debug, Clone)]
pub struct ImportanceRating {
    pub subject: String,
    pub category: String,
    pub summary: String,
    pub importance: String,
    pub scale: String,
}

pub struct ImportanceRater {
    generator: Arc<dyn TextGenerator>,
}

impl ImportanceRater {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Rate one message from its summary, category, and subject. Raw output
    /// is lower-cased before normalization; fallback is `"medium"`.
    pub async fn rate(&self, summary: &str, category: &str, subject: &str) -> ImportanceRating {
        let prompt = prompts::importance_prompt(summary, category, subject);
        let raw = self
            .generator
            .generate(prompts::IMPORTANCE_SYSTEM, &prompt)
            .await
            .to_lowercase();

        let importance = normalize_label(
            raw.trim(),
            &IMPORTANCE_SCALE,
            &LOWERCASE_ERROR_PREFIXES,
            "medium",
        );
        debug!(subject = %subject, importance = %importance, "Rated message");

        ImportanceRating {
            subject: subject.to_string(),
            category: category.to_string(),
            summary: summary.to_string(),
            importance,
            scale: SCALE_DESCRIPTION.to_string(),
        }
    }
}
