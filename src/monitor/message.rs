//! Fetched-message model and MIME parsing.

use chrono::{DateTime, Local};
use mail_parser::MessageParser;

use crate::error::MailboxError;

/// One fetched message, immutable for the duration of a polling cycle. Only
/// its derived artifacts are persisted.
#[derive(Debug, Clone)]
pub struct EmailMessage {
    /// Transport-assigned opaque id.
    pub id: String,
    pub subject: String,
    pub sender: String,
    pub body: String,
    pub received_at: DateTime<Local>,
}

/// Parse raw RFC822 bytes into an [`EmailMessage`].
///
/// Subjects arrive RFC 2047-encoded; `mail-parser` decodes them. The body is
/// the first non-attachment `text/plain` part, falling back to stripped
/// `text/html` when no plain part exists.
pub fn parse_email(id: &str, raw: &[u8]) -> Result<EmailMessage, MailboxError> {
    let parsed = MessageParser::default()
        .parse(raw)
        .ok_or_else(|| MailboxError::UnparseableMessage { id: id.to_string() })?;

    let subject = parsed.subject().unwrap_or("(no subject)").to_string();
    let sender = render_sender(&parsed);
    let body = extract_body(&parsed);

    Ok(EmailMessage {
        id: id.to_string(),
        subject,
        sender,
        body,
        received_at: Local::now(),
    })
}

/// Render the From header as `Name <addr>` when a display name exists.
fn render_sender(parsed: &mail_parser::Message) -> String {
    let Some(addr) = parsed.from().and_then(|from| from.first()) else {
        return "unknown".to_string();
    };

    let address = addr.address().unwrap_or("unknown");
    match addr.name() {
        Some(name) if !name.is_empty() => format!("{name} <{address}>"),
        _ => address.to_string(),
    }
}

fn extract_body(parsed: &mail_parser::Message) -> String {
    if let Some(text) = parsed.body_text(0) {
        return text.to_string();
    }
    if let Some(html) = parsed.body_html(0) {
        return strip_html(html.as_ref());
    }
    String::new()
}

/// Strip HTML tags and collapse whitespace (basic).
fn strip_html(html: &str) -> String {
    let mut result = String::new();
    let mut in_tag = false;
    for ch in html.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => result.push(ch),
            _ => {}
        }
    }
    result.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_message_parses() {
        let raw = b"From: Alice <alice@example.com>\r\n\
                    Subject: Hello\r\n\
                    Content-Type: text/plain\r\n\
                    \r\n\
                    Just checking in.\r\n";
        let msg = parse_email("1", raw).unwrap();
        assert_eq!(msg.id, "1");
        assert_eq!(msg.subject, "Hello");
        assert_eq!(msg.sender, "Alice <alice@example.com>");
        assert_eq!(msg.body.trim(), "Just checking in.");
    }

    #[test]
    fn encoded_subject_is_decoded() {
        let raw = b"From: bob@example.com\r\n\
                    Subject: =?UTF-8?B?SGVsbG8gV29ybGQ=?=\r\n\
                    Content-Type: text/plain\r\n\
                    \r\n\
                    body\r\n";
        let msg = parse_email("2", raw).unwrap();
        assert_eq!(msg.subject, "Hello World");
        assert_eq!(msg.sender, "bob@example.com");
    }

    #[test]
    fn missing_subject_gets_placeholder() {
        let raw = b"From: bob@example.com\r\n\
                    Content-Type: text/plain\r\n\
                    \r\n\
                    body\r\n";
        let msg = parse_email("3", raw).unwrap();
        assert_eq!(msg.subject, "(no subject)");
    }

    #[test]
    fn multipart_prefers_plain_text_over_attachment() {
        let raw = b"From: carol@example.com\r\n\
                    Subject: Report\r\n\
                    Content-Type: multipart/mixed; boundary=\"b1\"\r\n\
                    \r\n\
                    --b1\r\n\
                    Content-Type: text/plain\r\n\
                    \r\n\
                    See attached report.\r\n\
                    --b1\r\n\
                    Content-Type: text/plain; name=\"data.txt\"\r\n\
                    Content-Disposition: attachment; filename=\"data.txt\"\r\n\
                    \r\n\
                    raw,data,here\r\n\
                    --b1--\r\n";
        let msg = parse_email("4", raw).unwrap();
        assert_eq!(msg.body.trim(), "See attached report.");
    }

    #[test]
    fn html_only_message_is_stripped() {
        let raw = b"From: dave@example.com\r\n\
                    Subject: Promo\r\n\
                    Content-Type: text/html\r\n\
                    \r\n\
                    <p>Big <b>sale</b> today</p>\r\n";
        let msg = parse_email("5", raw).unwrap();
        assert!(msg.body.contains("Big"));
        assert!(!msg.body.contains('<'));
    }

    #[test]
    fn strip_html_collapses_whitespace() {
        assert_eq!(strip_html("<div>  Hello   World </div>"), "Hello World");
    }

    #[test]
    fn garbage_bytes_are_an_error() {
        assert!(parse_email("6", &[]).is_err());
    }
}
