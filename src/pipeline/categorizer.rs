//! Categorization stage — maps message content onto a fixed topic label.

use std::sync::Arc;

use tracing::debug;

use crate::llm::{ERROR_PREFIXES, TextGenerator};
use crate::pipeline::normalize::normalize_label;
use crate::pipeline::prompts;

/// The closed category set, in tie-break order (see `normalize_label`).
pub const CATEGORIES: [&str; 6] = ["Promotion", "Spam", "Work", "Personal", "Finance", "Other"];

/// One categorized message.
#[derive(Debug, Clone)]
pub struct CategorizedEmail {
    pub id: String,
    pub content: String,
    pub category: String,
}

pub struct Categorizer {
    generator: Arc<dyn TextGenerator>,
}

impl Categorizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Classify one message. The result is always a member of [`CATEGORIES`]
    /// or an error-prefixed string — exact matches are case-sensitive,
    /// anything else goes through the substring fallback with `"Other"` as
    /// the last resort.
    pub async fn categorize(&self, content: &str, id: &str) -> CategorizedEmail {
        let prompt = prompts::categorizer_prompt(content, &CATEGORIES);
        let raw = self
            .generator
            .generate(prompts::CATEGORIZER_SYSTEM, &prompt)
            .await;

        let category = normalize_label(raw.trim(), &CATEGORIES, &ERROR_PREFIXES, "Other");
        debug!(id = %id, category = %category, "Categorized message");

        CategorizedEmail {
            id: id.to_string(),
            content: content.to_string(),
            category,
        }
    }

    /// Classify a batch of `(id, content)` pairs, preserving input order.
    pub async fn categorize_batch(&self, emails: &[(String, String)]) -> Vec<CategorizedEmail> {
        let mut results = Vec::with_capacity(emails.len());
        for (id, content) in emails {
            results.push(self.categorize(content, id).await);
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::testing::ScriptedGenerator;

    #[tokio::test]
    async fn exact_category_is_kept() {
        let categorizer = Categorizer::new(Arc::new(ScriptedGenerator::always("Work")));
        let result = categorizer.categorize("quarterly review", "msg-1").await;
        assert_eq!(result.category, "Work");
        assert_eq!(result.id, "msg-1");
        assert_eq!(result.content, "quarterly review");
    }

    #[tokio::test]
    async fn verbose_response_falls_back_to_substring() {
        let categorizer = Categorizer::new(Arc::new(ScriptedGenerator::always(
            "This is clearly spam, delete it.",
        )));
        let result = categorizer.categorize("buy now!!!", "msg-2").await;
        assert_eq!(result.category, "Spam");
    }

    #[tokio::test]
    async fn unrecognized_response_becomes_other() {
        let categorizer = Categorizer::new(Arc::new(ScriptedGenerator::always("no idea")));
        let result = categorizer.categorize("???", "msg-3").await;
        assert_eq!(result.category, "Other");
    }

    #[tokio::test]
    async fn api_error_passes_through() {
        let categorizer = Categorizer::new(Arc::new(ScriptedGenerator::always(
            "API Error: rate limited",
        )));
        let result = categorizer.categorize("body", "msg-4").await;
        assert_eq!(result.category, "API Error: rate limited");
    }

    #[tokio::test]
    async fn batch_preserves_input_order() {
        let categorizer = Categorizer::new(Arc::new(ScriptedGenerator::always("Finance")));
        let emails = vec![
            ("a".to_string(), "invoice".to_string()),
            ("b".to_string(), "statement".to_string()),
        ];
        let results = categorizer.categorize_batch(&emails).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "a");
        assert_eq!(results[1].id, "b");
    }
}
