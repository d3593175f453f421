//! Artifact persistence — raw and evaluated messages as flat text files.
//!
//! Filename policy: `{YYYY-MM-DD}_{sanitized subject}.txt`. Two messages on
//! the same day with the same truncated subject overwrite silently; there is
//! no uniqueness suffix.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tracing::debug;

use crate::config::StorageSettings;
use crate::error::StorageError;
use crate::monitor::message::EmailMessage;
use crate::pipeline::EvaluationRecord;

const SEPARATOR: &str = "============================================================";

/// Characters stripped from subjects before use as a filename.
const ILLEGAL_CHARS: [char; 9] = ['\\', '/', '*', '?', ':', '"', '<', '>', '|'];

/// Maximum sanitized-subject length, to keep filenames within OS limits.
const MAX_SUBJECT_LEN: usize = 50;

/// Strip illegal filename characters, truncate to 50 chars, trim whitespace.
pub fn sanitize_subject(subject: &str) -> String {
    let stripped: String = subject.chars().filter(|c| !ILLEGAL_CHARS.contains(c)).collect();
    stripped.chars().take(MAX_SUBJECT_LEN).collect::<String>().trim().to_string()
}

/// `{date}_{sanitized subject}.txt`
pub fn artifact_filename(subject: &str, date: NaiveDate) -> String {
    format!("{}_{}.txt", date.format("%Y-%m-%d"), sanitize_subject(subject))
}

/// Writes raw and evaluated artifacts into their two directories, creating
/// them on demand.
pub struct ArtifactStore {
    raw_dir: PathBuf,
    evaluated_dir: PathBuf,
}

impl ArtifactStore {
    pub fn new(settings: &StorageSettings) -> Self {
        Self {
            raw_dir: PathBuf::from(&settings.raw_dir),
            evaluated_dir: PathBuf::from(&settings.evaluated_dir),
        }
    }

    /// Persist the original message: header lines, a separator, the body.
    pub fn save_raw(&self, message: &EmailMessage) -> Result<PathBuf, StorageError> {
        let contents = format!(
            "Subject: {}\nFrom: {}\nDate: {}\n\n{SEPARATOR}\nContent:\n{}",
            message.subject,
            message.sender,
            message.received_at.format("%Y-%m-%d %H:%M:%S"),
            message.body,
        );
        self.write_artifact(&self.raw_dir, &message.subject, &contents)
    }

    /// Persist the evaluated form: the same headers plus the pipeline
    /// results, then the original body.
    pub fn save_evaluated(
        &self,
        message: &EmailMessage,
        record: &EvaluationRecord,
    ) -> Result<PathBuf, StorageError> {
        let contents = format!(
            "Subject: {}\nFrom: {}\nDate: {}\nCategory: {}\nImportance: {}\nSummary: {}\n\n\
             {SEPARATOR}\nOriginal Message:\n{}",
            message.subject,
            message.sender,
            message.received_at.format("%Y-%m-%d %H:%M:%S"),
            record.category,
            record.importance,
            record.summary,
            message.body,
        );
        self.write_artifact(&self.evaluated_dir, &message.subject, &contents)
    }

    fn write_artifact(
        &self,
        dir: &Path,
        subject: &str,
        contents: &str,
    ) -> Result<PathBuf, StorageError> {
        fs::create_dir_all(dir).map_err(|source| StorageError::CreateDir {
            path: dir.display().to_string(),
            source,
        })?;

        let path = dir.join(artifact_filename(subject, Local::now().date_naive()));
        fs::write(&path, contents).map_err(|source| StorageError::Write {
            path: path.display().to_string(),
            source,
        })?;

        debug!(path = %path.display(), "Saved artifact");
        Ok(path)
    }
}
