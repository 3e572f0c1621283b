//! Error types for drafts-sync.

use std::path::PathBuf;

use thiserror::Error;

use drafts_core::SchemaError;
use drafts_extractor::ExtractError;

/// All errors that can abort a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// `git` ran but exited unsuccessfully (bad revision, shallow history).
    #[error("git {args} failed ({status}): {stderr}")]
    Git {
        args: String,
        status: String,
        stderr: String,
    },

    /// `git` could not be started at all.
    #[error("could not run git: {0}")]
    GitSpawn(#[source] std::io::Error),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// A required setting was not provided.
    #[error("{0} is not set")]
    MissingConfig(&'static str),

    /// Signing the service-account assertion failed.
    #[error("service account key error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// The remote API answered with a non-success status.
    #[error("{context}: HTTP {status}: {body}")]
    Http {
        context: String,
        status: u16,
        body: String,
    },

    /// The request never got an answer (DNS, TLS, timeout).
    #[error("{context}: {source}")]
    Transport {
        context: String,
        #[source]
        source: ureq::Transport,
    },

    /// The response body was not the JSON we expected.
    #[error("{context}: invalid response body: {source}")]
    Decode {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Split a `ureq` failure into a status or transport error.
pub(crate) fn http_err(context: impl Into<String>, err: ureq::Error) -> SyncError {
    let context = context.into();
    match err {
        ureq::Error::Status(status, response) => SyncError::Http {
            context,
            status,
            body: response.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(source) => SyncError::Transport { context, source },
    }
}

pub(crate) fn decode_err(context: impl Into<String>, source: std::io::Error) -> SyncError {
    SyncError::Decode {
        context: context.into(),
        source,
    }
}
