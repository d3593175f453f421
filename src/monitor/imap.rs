//! Raw IMAP-over-TLS session.
//!
//! Blocking socket I/O — callers run these methods under
//! `tokio::task::spawn_blocking`. Only the operations the monitor needs are
//! implemented: login, select, search unseen, fetch, logout.

use std::collections::BTreeSet;
use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::config::MailConfig;
use crate::error::MailboxError;

const READ_TIMEOUT: Duration = Duration::from_secs(30);

type TlsStream = rustls::StreamOwned<rustls::ClientConnection, TcpStream>;

/// An authenticated IMAP session. Dropped on any poll-cycle error; the
/// monitor reconnects by calling [`ImapSession::connect`] again.
pub struct ImapSession {
    tls: TlsStream,
    tag_counter: u32,
}

impl ImapSession {
    /// Connect, read the greeting, and log in. Startup connection failures
    /// are fatal for the whole run; later ones trigger reconnects.
    pub fn connect(config: &MailConfig) -> Result<Self, MailboxError> {
        let tcp = TcpStream::connect((&*config.imap_host, config.imap_port)).map_err(|e| {
            MailboxError::Connect {
                host: config.imap_host.clone(),
                port: config.imap_port,
                reason: e.to_string(),
            }
        })?;
        tcp.set_read_timeout(Some(READ_TIMEOUT))?;

        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let tls_config = Arc::new(
            rustls::ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth(),
        );
        let server_name = rustls_pki_types::ServerName::try_from(config.imap_host.clone())
            .map_err(|e| MailboxError::Tls(e.to_string()))?;
        let conn = rustls::ClientConnection::new(tls_config, server_name)
            .map_err(|e| MailboxError::Tls(e.to_string()))?;
        let tls = rustls::StreamOwned::new(conn, tcp);

        let mut session = Self { tls, tag_counter: 0 };

        let greeting = session.read_line()?;
        debug!(greeting = %greeting.trim_end(), "IMAP greeting");

        let login = session.command(&format!(
            "LOGIN \"{}\" \"{}\"",
            config.username, config.password
        ))?;
        if !login.last().is_some_and(|l| l.contains("OK")) {
            return Err(MailboxError::LoginRejected {
                user: config.username.clone(),
            });
        }

        Ok(session)
    }

    /// `SELECT "INBOX"` — run at startup and again at the top of every cycle
    /// to refresh the mailbox view.
    pub fn select_inbox(&mut self) -> Result<(), MailboxError> {
        let resp = self.command("SELECT \"INBOX\"")?;
        if resp.last().is_some_and(|l| l.contains("OK")) {
            Ok(())
        } else {
            Err(MailboxError::Protocol("SELECT INBOX rejected".to_string()))
        }
    }

    /// `SEARCH UNSEEN` — ids of messages not yet flagged `\Seen`, used purely
    /// as a change-detection mechanism.
    pub fn search_unseen(&mut self) -> Result<BTreeSet<String>, MailboxError> {
        let resp = self.command("SEARCH UNSEEN")?;
        let mut ids = BTreeSet::new();
        for line in &resp {
            if let Some(rest) = line.strip_prefix("* SEARCH") {
                ids.extend(rest.split_whitespace().map(str::to_string));
            }
        }
        Ok(ids)
    }

    /// `FETCH {id} RFC822` — the raw message bytes.
    pub fn fetch(&mut self, id: &str) -> Result<Vec<u8>, MailboxError> {
        let resp = self.command(&format!("FETCH {id} RFC822"))?;
        // First line is the untagged FETCH response, last is the tagged OK;
        // everything between is the literal.
        let raw: String = resp
            .iter()
            .skip(1)
            .take(resp.len().saturating_sub(2))
            .cloned()
            .collect();
        Ok(raw.into_bytes())
    }

    /// Best-effort `LOGOUT`.
    pub fn logout(mut self) {
        let _ = self.command("LOGOUT");
    }

    fn next_tag(&mut self) -> String {
        self.tag_counter += 1;
        format!("A{}", self.tag_counter)
    }

    /// Send a tagged command and collect response lines up to the tagged
    /// completion line.
    fn command(&mut self, cmd: &str) -> Result<Vec<String>, MailboxError> {
        let tag = self.next_tag();
        let full = format!("{tag} {cmd}\r\n");
        self.tls.write_all(full.as_bytes())?;
        self.tls.flush()?;

        let mut lines = Vec::new();
        loop {
            let line = self.read_line()?;
            let done = line.starts_with(&tag);
            lines.push(line);
            if done {
                break;
            }
        }
        Ok(lines)
    }

    fn read_line(&mut self) -> Result<String, MailboxError> {
        let mut buf = Vec::new();
        loop {
            let mut byte = [0u8; 1];
            match self.tls.read(&mut byte) {
                Ok(0) => {
                    return Err(MailboxError::Protocol("connection closed".to_string()));
                }
                Ok(_) => {
                    buf.push(byte[0]);
                    if buf.ends_with(b"\r\n") {
                        return Ok(String::from_utf8_lossy(&buf).to_string());
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    // Session methods need a live IMAP server; this pins the shape of the
    // untagged SEARCH response line they parse.

    #[test]
    fn search_line_prefix_parses_ids() {
        let line = "* SEARCH 4 5 12\r\n";
        let ids: Vec<&str> = line
            .strip_prefix("* SEARCH")
            .unwrap()
            .split_whitespace()
            .collect();
        assert_eq!(ids, vec!["4", "5", "12"]);
    }
}
