//! Mailbox monitor — owns the polling loop.
//!
//! State machine: connect → snapshot → poll forever. The startup connection
//! is fatal when it fails; every later failure is logged, followed by a
//! short wait and a reconnect. The loop only stops on an external interrupt
//! (handled in `main`).
//!
//! Unseen-id dedup: a snapshot taken right after connecting suppresses the
//! pre-existing unread backlog, so only messages that become unseen after
//! startup count as new. After each batch the seen set is replaced with the
//! current ids, not unioned — anything no longer unseen drops out of
//! consideration.

pub mod imap;
pub mod message;
pub mod storage;

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::{info, warn};

use crate::config::{MailConfig, StorageSettings};
use crate::error::{MailboxError, Result};
use crate::monitor::imap::ImapSession;
use crate::monitor::message::parse_email;
use crate::monitor::storage::ArtifactStore;
use crate::pipeline::EmailPipeline;

/// Ids that are unseen now but were not in the seen set.
pub fn new_message_ids(
    current: &BTreeSet<String>,
    seen: &BTreeSet<String>,
) -> BTreeSet<String> {
    current.difference(seen).cloned().collect()
}

/// Result of one poll cycle against the mailbox.
struct PollOutcome {
    current_ids: BTreeSet<String>,
    /// `(id, raw RFC822 bytes)` for each newly unseen message, in transport
    /// order.
    fetched: Vec<(String, Vec<u8>)>,
}

/// One blocking poll cycle: re-select, search, fetch the delta.
fn poll_mailbox(
    session: &mut ImapSession,
    seen: &BTreeSet<String>,
) -> std::result::Result<PollOutcome, MailboxError> {
    session.select_inbox()?;
    let current_ids = session.search_unseen()?;

    let mut fetched = Vec::new();
    for id in new_message_ids(&current_ids, seen) {
        let raw = session.fetch(&id)?;
        fetched.push((id, raw));
    }

    Ok(PollOutcome {
        current_ids,
        fetched,
    })
}

pub struct MailboxMonitor {
    mail: MailConfig,
    poll_interval: Duration,
    retry_interval: Duration,
    pipeline: EmailPipeline,
    store: ArtifactStore,
}

impl MailboxMonitor {
    pub fn new(mail: MailConfig, storage: &StorageSettings, pipeline: EmailPipeline) -> Self {
        Self {
            mail,
            poll_interval: Duration::from_secs(storage.poll_interval_secs),
            retry_interval: Duration::from_secs(storage.retry_interval_secs),
            pipeline,
            store: ArtifactStore::new(storage),
        }
    }

    /// Run the monitor until externally interrupted.
    pub async fn run(&self) -> Result<()> {
        // Startup connect + snapshot. Failure here is fatal, not retried.
        let (session, seen) = self.connect_and_snapshot().await?;
        info!(
            ignored = seen.len(),
            host = %self.mail.imap_host,
            "Monitor active; ignoring existing unread messages"
        );

        let mut session = Some(session);
        let mut seen = seen;

        loop {
            let Some(active) = session.take() else {
                match self.reconnect().await {
                    Ok(s) => session = Some(s),
                    Err(e) => {
                        warn!(error = %e, "Reconnect failed; retrying");
                        tokio::time::sleep(self.retry_interval).await;
                    }
                }
                continue;
            };

            let seen_snapshot = seen.clone();
            let cycle = tokio::task::spawn_blocking(move || {
                let mut s = active;
                let outcome = poll_mailbox(&mut s, &seen_snapshot);
                (s, outcome)
            })
            .await;

            match cycle {
                Ok((s, Ok(outcome))) => {
                    session = Some(s);
                    if !outcome.fetched.is_empty() {
                        info!(count = outcome.fetched.len(), "New mail arrived");
                        for (id, raw) in &outcome.fetched {
                            self.process_message(id, raw).await;
                        }
                        seen = outcome.current_ids;
                    }
                    tokio::time::sleep(self.poll_interval).await;
                }
                Ok((_, Err(e))) => {
                    // Drop the session; reconnect on the next iteration.
                    warn!(error = %e, "Poll cycle failed; will reconnect");
                    tokio::time::sleep(self.retry_interval).await;
                }
                Err(e) => {
                    warn!(error = %e, "Poll task panicked; will reconnect");
                    tokio::time::sleep(self.retry_interval).await;
                }
            }
        }
    }

    async fn connect_and_snapshot(
        &self,
    ) -> Result<(ImapSession, BTreeSet<String>)> {
        let config = self.mail.clone();
        let result = tokio::task::spawn_blocking(
            move || -> std::result::Result<(ImapSession, BTreeSet<String>), MailboxError> {
                let mut session = ImapSession::connect(&config)?;
                session.select_inbox()?;
                let seen = session.search_unseen()?;
                Ok((session, seen))
            },
        )
        .await
        .map_err(|e| MailboxError::Protocol(format!("connect task panicked: {e}")))?;
        Ok(result?)
    }

    async fn reconnect(&self) -> std::result::Result<ImapSession, MailboxError> {
        info!(host = %self.mail.imap_host, "Reconnecting to mailbox");
        let config = self.mail.clone();
        tokio::task::spawn_blocking(move || {
            let mut session = ImapSession::connect(&config)?;
            session.select_inbox()?;
            Ok(session)
        })
        .await
        .map_err(|e| MailboxError::Protocol(format!("connect task panicked: {e}")))?
    }

    /// Parse, persist raw, evaluate, persist evaluated. Parse failures skip
    /// the message; artifact write failures are logged and dropped without
    /// losing the pipeline result.
    async fn process_message(&self, id: &str, raw: &[u8]) {
        let message = match parse_email(id, raw) {
            Ok(message) => message,
            Err(e) => {
                warn!(id = %id, error = %e, "Skipping unparseable message");
                return;
            }
        };

        info!(id = %id, from = %message.sender, subject = %message.subject, "Processing message");

        if let Err(e) = self.store.save_raw(&message) {
            warn!(id = %id, error = %e, "Failed to save raw artifact");
        }

        let record = self.pipeline.evaluate(&message).await;

        if let Err(e) = self.store.save_evaluated(&message, &record) {
            warn!(id = %id, error = %e, "Failed to save evaluated artifact");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Local;

    use super::*;
    use crate::llm::testing::ScriptedGenerator;

    fn ids(values: &[&str]) -> BTreeSet<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn delta_is_current_minus_seen() {
        let seen = ids(&["1", "2", "3"]);
        let current = ids(&["1", "2", "3", "4", "5"]);
        assert_eq!(new_message_ids(&current, &seen), ids(&["4", "5"]));
    }

    #[test]
    fn seen_set_is_replaced_not_unioned() {
        let mut seen = ids(&["1", "2", "3"]);
        // Message 2 was read elsewhere; 4 and 5 arrived.
        let current = ids(&["1", "3", "4", "5"]);
        assert_eq!(new_message_ids(&current, &seen), ids(&["4", "5"]));

        // After the batch the monitor assigns current wholesale: 2 is gone.
        seen = current;
        assert_eq!(seen, ids(&["1", "3", "4", "5"]));
    }

    #[test]
    fn empty_delta_when_nothing_new() {
        let seen = ids(&["1", "2"]);
        assert!(new_message_ids(&seen.clone(), &seen).is_empty());
    }

    fn test_monitor(dir: &std::path::Path, generator: ScriptedGenerator) -> MailboxMonitor {
        let storage = StorageSettings {
            raw_dir: dir.join("mails").display().to_string(),
            evaluated_dir: dir.join("evaluated").display().to_string(),
            poll_interval_secs: 10,
            retry_interval_secs: 5,
        };
        let mail = MailConfig {
            imap_host: "imap.example.com".to_string(),
            imap_port: 993,
            username: "user".to_string(),
            password: "pass".to_string(),
        };
        MailboxMonitor::new(mail, &storage, EmailPipeline::new(Arc::new(generator)))
    }

    #[tokio::test]
    async fn end_to_end_message_produces_both_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let monitor = test_monitor(
            tmp.path(),
            ScriptedGenerator::staged(
                "Work",
                "Unusual login detected; verify account.",
                "critical",
            ),
        );

        let raw = b"From: security@bank.com\r\n\
                    Subject: Security Alert\r\n\
                    Content-Type: text/plain\r\n\
                    \r\n\
                    We detected unusual activity on your account.\r\n";
        monitor.process_message("9", raw).await;

        let date = Local::now().date_naive().format("%Y-%m-%d");
        let raw_path = tmp.path().join("mails").join(format!("{date}_Security Alert.txt"));
        let eval_path = tmp
            .path()
            .join("evaluated")
            .join(format!("{date}_Security Alert.txt"));

        assert!(raw_path.exists());
        let evaluated = std::fs::read_to_string(eval_path).unwrap();
        assert!(evaluated.contains("Category: Work"));
        assert!(evaluated.contains("Importance: critical"));
        assert!(evaluated.contains("Summary: Unusual login detected; verify account."));
        assert!(evaluated.contains("unusual activity on your account"));
    }

    #[tokio::test]
    async fn unparseable_message_is_skipped_without_artifacts() {
        let tmp = tempfile::tempdir().unwrap();
        let monitor = test_monitor(tmp.path(), ScriptedGenerator::always("Work"));

        monitor.process_message("10", &[]).await;

        assert!(!tmp.path().join("mails").exists());
        assert!(!tmp.path().join("evaluated").exists());
    }
}
