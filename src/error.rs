// src/error.rs
//! Typed errors for the translation pipeline and its remote collaborators.
//!
//! A model reply without the bracketed emoji list is NOT an error: the parser
//! returns an empty sequence for it.

use std::path::PathBuf;
use std::time::Duration;

/// Failure of one of the remote services (entity analysis, sentiment, generation).
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    #[error("{service}: request failed: {source}")]
    Transport {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service}: HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("{service}: quota exceeded: {body}")]
    Quota { service: &'static str, body: String },

    #[error("{service}: malformed response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },

    #[error("{service}: no response within {timeout:?}")]
    Timeout {
        service: &'static str,
        timeout: Duration,
    },

    #[error("{service}: not configured: {message}")]
    Config {
        service: &'static str,
        message: String,
    },
}

impl RemoteError {
    /// Name of the service that failed, for metrics labels.
    pub fn service(&self) -> &'static str {
        match self {
            RemoteError::Transport { service, .. }
            | RemoteError::Status { service, .. }
            | RemoteError::Quota { service, .. }
            | RemoteError::Decode { service, .. }
            | RemoteError::Timeout { service, .. }
            | RemoteError::Config { service, .. } => service,
        }
    }
}

/// The emoji catalog resource could not be loaded. There is no fallback catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("reading emoji catalog from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything `EmojiTranslator` can fail with.
#[derive(Debug, thiserror::Error)]
pub enum TranslateError {
    #[error("message text is empty")]
    EmptyInput,

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl TranslateError {
    /// Short stage label used by metrics and logs.
    pub fn stage(&self) -> &'static str {
        match self {
            TranslateError::EmptyInput => "input",
            TranslateError::Remote(e) => e.service(),
            TranslateError::Catalog(_) => "catalog",
        }
    }
}

/// Telegram Bot API failures.
#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("telegram request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("telegram API error {code}: {description}")]
    Api { code: i64, description: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_error_reports_its_service() {
        let e = RemoteError::Quota {
            service: "language",
            body: "slow down".into(),
        };
        assert_eq!(e.service(), "language");
        assert!(e.to_string().contains("quota exceeded"));
    }

    #[test]
    fn translate_error_is_transparent_over_remote() {
        let e: TranslateError = RemoteError::Timeout {
            service: "gemini",
            timeout: Duration::from_secs(3),
        }
        .into();
        assert_eq!(e.stage(), "gemini");
        assert_eq!(e.to_string(), "gemini: no response within 3s");
    }
}
