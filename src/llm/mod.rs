//! Text generation for the evaluation pipeline.
//!
//! One capability interface, one shared client. Each pipeline stage holds an
//! `Arc<dyn TextGenerator>` rather than owning its own HTTP machinery.
//!
//! Failures surface as sentinel string prefixes instead of structured errors:
//! the normalizer recognizes them and lets them pass through untouched, so a
//! failed generation stays diagnosable all the way to the persisted artifact.

mod client;

pub use client::ChatCompletionsClient;

use async_trait::async_trait;

/// Recognized generation-failure prefixes.
///
/// - `"API Error"` — the backend returned a structured error payload
/// - `"Request Failed"` — the call itself could not complete
/// - `"No response"` — success status but no usable content
pub const ERROR_PREFIXES: [&str; 3] = ["API Error", "Request Failed", "No response"];

/// True if `text` starts with one of the recognized failure prefixes.
/// Case-insensitive: the importance stage compares after lower-casing.
pub fn is_generation_error(text: &str) -> bool {
    let lowered = text.to_lowercase();
    ERROR_PREFIXES
        .iter()
        .any(|p| lowered.starts_with(&p.to_lowercase()))
}

/// The single generation capability every pipeline stage consumes.
///
/// Returns generated text, or a sentinel-prefixed failure string — never
/// panics and never raises past this boundary.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, system_message: &str, prompt: &str) -> String;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_all_three_prefixes() {
        assert!(is_generation_error("API Error: rate limited"));
        assert!(is_generation_error("Request Failed: connection refused"));
        assert!(is_generation_error("No response from API"));
    }

    #[test]
    fn recognizes_lowercased_prefixes() {
        assert!(is_generation_error("api error: rate limited"));
        assert!(is_generation_error("no response from api"));
    }

    #[test]
    fn ordinary_text_is_not_an_error() {
        assert!(!is_generation_error("Work"));
        assert!(!is_generation_error("The API errored")); // prefix, not substring
    }
}
