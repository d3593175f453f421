//! Prompt templates and per-stage system messages.
//!
//! All prompt text lives here so the stages stay thin.

pub const CATEGORIZER_SYSTEM: &str =
    "You are an email classifier. Respond only with the category name.";

pub const SUMMARIZER_SYSTEM: &str =
    "You are an email content summarizer focused on extracting actionable information.";

pub const IMPORTANCE_SYSTEM: &str = "You are an email importance classifier. You must respond \
     with only one word from: low, medium, high, urgent, critical.";

const RULE: &str = "------------------------------------------------------------";

/// Classification prompt embedding the fixed category list.
pub fn categorizer_prompt(content: &str, categories: &[&str]) -> String {
    format!(
        "You are an email classification system.\n\n\
         AVAILABLE CATEGORIES:\n{}\n\n\
         EMAIL CONTENT:\n{RULE}\n{content}\n{RULE}\n\n\
         CLASSIFICATION GUIDELINES:\n\
         - Promotional content -> Promotion\n\
         - Suspicious/unwanted content -> Spam\n\
         - Business/professional content -> Work\n\
         - Personal communications -> Personal\n\
         - Banking/financial content -> Finance\n\
         - Everything else -> Other\n\n\
         TASK: Analyze the email content and classify it into ONE of the categories above.\n\n\
         RESPONSE: Respond with ONLY the category name.",
        categories.join(", "),
    )
}

/// Summarization prompt asking for a brief 2-3 sentence summary.
pub fn summarizer_prompt(content: &str, subject: &str) -> String {
    let subject = if subject.is_empty() { "N/A" } else { subject };
    format!(
        "You are an email summarizer. Extract only the essential information from this email.\n\n\
         EMAIL DETAILS:\nSubject: {subject}\n\n\
         EMAIL CONTENT:\n{RULE}\n{content}\n{RULE}\n\n\
         SUMMARY REQUIREMENTS:\n\
         Create a brief, natural summary in 2-3 sentences that covers:\n\
         - What the sender wants or needs\n\
         - Key details like dates, names, deadlines, or important information\n\
         - Any urgency or next steps required\n\n\
         FORMATTING GUIDELINES:\n\
         - Write in plain language without bullet points, numbered lists, or asterisks\n\
         - Keep it conversational and easy to read\n\
         - Focus on actionable information only\n\n\
         TASK: Provide a clear, concise summary following the above guidelines."
    )
}

/// Importance-rating prompt embedding the ordered scale and evaluation
/// criteria. The criteria are informational for the model, not separately
/// scored.
pub fn importance_prompt(summary: &str, category: &str, subject: &str) -> String {
    let subject = if subject.is_empty() { "N/A" } else { subject };
    format!(
        "You are an email importance analyzer. Rate the importance of this email.\n\n\
         EMAIL DETAILS:\nSubject: {subject}\nCategory: {category}\n\n\
         EMAIL SUMMARY:\n{RULE}\n{summary}\n{RULE}\n\n\
         IMPORTANCE SCALE:\n\
         - LOW: Routine emails, newsletters, non-urgent notifications, general information, social updates\n\
         - MEDIUM: Regular work communications, meeting requests, follow-ups, planned tasks, non-urgent updates\n\
         - HIGH: Important business matters, time-sensitive requests, deadline reminders, significant decisions needed\n\
         - URGENT: Critical deadlines (within 24-48 hours), important client issues, system problems, immediate action required\n\
         - CRITICAL: Emergency situations, security alerts, system failures, legal issues, CEO-level communications, immediate crisis response needed\n\n\
         EVALUATION CRITERIA:\n\
         1. Time sensitivity and deadlines (immediate, hours, days, weeks)\n\
         2. Business impact (revenue, operations, reputation)\n\
         3. Action urgency required from recipient\n\
         4. Sender's authority/position in organization\n\
         5. Consequences of delay (minor inconvenience vs major business impact)\n\
         6. Security or legal implications\n\n\
         TASK: Rate this email's importance using the scale above.\n\n\
         RESPONSE: Respond with ONLY one word: low, medium, high, urgent, or critical"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categorizer_prompt_lists_all_categories() {
        let prompt = categorizer_prompt("hello", &["Promotion", "Spam", "Other"]);
        assert!(prompt.contains("Promotion, Spam, Other"));
        assert!(prompt.contains("hello"));
    }

    #[test]
    fn summarizer_prompt_defaults_missing_subject() {
        let prompt = summarizer_prompt("body", "");
        assert!(prompt.contains("Subject: N/A"));
    }

    #[test]
    fn importance_prompt_embeds_category_and_summary() {
        let prompt = importance_prompt("server down", "Work", "Outage");
        assert!(prompt.contains("Category: Work"));
        assert!(prompt.contains("server down"));
        assert!(prompt.contains("Subject: Outage"));
    }
}
