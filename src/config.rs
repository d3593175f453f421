//! Environment-driven configuration.
//!
//! Everything is read once at startup into [`Settings`] and passed down to
//! component constructors — no ambient env reads inside the pipeline.

use secrecy::SecretString;

use crate::error::ConfigError;

/// Default chat-completions endpoint (OpenAI-compatible).
const DEFAULT_API_URL: &str = "https://g4f.space/v1/chat/completions";

/// Default generation model.
const DEFAULT_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

/// Mailbox transport configuration.
#[derive(Debug, Clone)]
pub struct MailConfig {
    pub imap_host: String,
    pub imap_port: u16,
    pub username: String,
    pub password: String,
}

/// Text-generation backend configuration.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_url: String,
    pub api_key: SecretString,
    pub model: String,
}

/// Artifact directories and polling cadence.
#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub raw_dir: String,
    pub evaluated_dir: String,
    pub poll_interval_secs: u64,
    pub retry_interval_secs: u64,
}

/// Full application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub mail: MailConfig,
    pub llm: LlmSettings,
    pub storage: StorageSettings,
}

impl Settings {
    /// Build settings from environment variables.
    ///
    /// `MAIL_USERNAME`, `MAIL_APP_PASSWORD` and `API_KEY_OPENAI` are
    /// required; everything else has a default.
    pub fn from_env() -> Result<Self, ConfigError> {
        let username = require_env("MAIL_USERNAME")?;
        let password = require_env("MAIL_APP_PASSWORD")?;
        let api_key = require_env("API_KEY_OPENAI")?;

        let imap_host =
            std::env::var("MAIL_IMAP_HOST").unwrap_or_else(|_| "imap.gmail.com".to_string());
        let imap_port = parse_env("MAIL_IMAP_PORT", 993)?;

        let api_url =
            std::env::var("MAILFLOW_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let model =
            std::env::var("MAILFLOW_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        let raw_dir = std::env::var("MAILFLOW_RAW_DIR").unwrap_or_else(|_| "mails".to_string());
        let evaluated_dir =
            std::env::var("MAILFLOW_EVALUATED_DIR").unwrap_or_else(|_| "evaluated".to_string());
        let poll_interval_secs = parse_env("MAILFLOW_POLL_INTERVAL_SECS", 10)?;
        let retry_interval_secs = parse_env("MAILFLOW_RETRY_INTERVAL_SECS", 5)?;

        Ok(Self {
            mail: MailConfig {
                imap_host,
                imap_port,
                username,
                password,
            },
            llm: LlmSettings {
                api_url,
                api_key: SecretString::from(api_key),
                model,
            },
            storage: StorageSettings {
                raw_dir,
                evaluated_dir,
                poll_interval_secs,
                retry_interval_secs,
            },
        })
    }
}

fn require_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("cannot parse {raw:?}"),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_username_is_fatal() {
        // SAFETY: test runs single-threaded over these vars.
        unsafe { std::env::remove_var("MAIL_USERNAME") };
        let err = Settings::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "MAIL_USERNAME"));
    }

    #[test]
    fn parse_env_defaults_when_unset() {
        unsafe { std::env::remove_var("MAILFLOW_TEST_UNSET") };
        let v: u64 = parse_env("MAILFLOW_TEST_UNSET", 42).unwrap();
        assert_eq!(v, 42);
    }

    #[test]
    fn parse_env_rejects_garbage() {
        unsafe { std::env::set_var("MAILFLOW_TEST_GARBAGE", "not-a-number") };
        let err = parse_env::<u64>("MAILFLOW_TEST_GARBAGE", 0).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        unsafe { std::env::remove_var("MAILFLOW_TEST_GARBAGE") };
    }
}
