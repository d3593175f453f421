//! Three-stage evaluation pipeline: Categorize → Summarize → Rate.
//!
//! Strictly sequential — the importance rating consumes the summary and
//! category outputs, so the stages cannot run in parallel. A stage that
//! fails (an error-prefixed string) does not halt the pipeline: its output
//! threads into the next stage as plain text, and evaluation always
//! produces a complete [`EvaluationRecord`].

pub mod categorizer;
pub mod importance;
pub mod normalize;
pub mod prompts;
pub mod summarizer;

use std::sync::Arc;

use tracing::info;

use crate::llm::TextGenerator;
use crate::monitor::message::EmailMessage;
use crate::pipeline::categorizer::Categorizer;
use crate::pipeline::importance::ImportanceRater;
use crate::pipeline::summarizer::Summarizer;

/// The combined result of evaluating one message. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct EvaluationRecord {
    pub message_id: String,
    pub subject: String,
    pub sender: String,
    pub body: String,
    pub category: String,
    pub summary: String,
    pub importance: String,
    pub scale: String,
}

/// Sequences the three stages over one message.
pub struct EmailPipeline {
    categorizer: Categorizer,
    summarizer: Summarizer,
    rater: ImportanceRater,
}

impl EmailPipeline {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            categorizer: Categorizer::new(Arc::clone(&generator)),
            summarizer: Summarizer::new(Arc::clone(&generator)),
            rater: ImportanceRater::new(generator),
        }
    }

    /// Run the full pipeline over one message.
    pub async fn evaluate(&self, message: &EmailMessage) -> EvaluationRecord {
        info!(id = %message.id, subject = %message.subject, "Evaluating message");

        let categorized = self
            .categorizer
            .categorize(&message.body, &message.subject)
            .await;

        let summarized = self
            .summarizer
            .summarize(&message.body, &message.subject)
            .await;

        let rating = self
            .rater
            .rate(&summarized.summary, &categorized.category, &message.subject)
            .await;

        info!(
            id = %message.id,
            category = %categorized.category,
            importance = %rating.importance,
            "Evaluation complete"
        );

        EvaluationRecord {
            message_id: message.id.clone(),
            subject: message.subject.clone(),
            sender: message.sender.clone(),
            body: message.body.clone(),
            category: categorized.category,
            summary: summarized.summary,
            importance: rating.importance,
            scale: rating.scale,
        }
    }
}
