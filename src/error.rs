// SPDX-FileCopyrightText: 2026 Sephyi <me@sephy.io>
//
// SPDX-License-Identifier: PolyForm-Noncommercial-1.0.0

// miette's Diagnostic derive generates code that triggers this false positive
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    #[error(
        "People do not match the assignment (not assigned: [{}], not listed: [{}])",
        missing.join(", "),
        unexpected.join(", ")
    )]
    #[diagnostic(
        code(splitzie::split::people_mismatch),
        help("Every person must appear exactly once as an assignment key")
    )]
    PeopleMismatch {
        /// Listed as people but absent from the assignment.
        missing: Vec<String>,
        /// Present in the assignment but not listed as people.
        unexpected: Vec<String>,
    },

    #[error(
        "Assigned items do not match the bill (unassigned: [{}], not on bill: [{}])",
        unassigned.join(", "),
        unknown.join(", ")
    )]
    #[diagnostic(
        code(splitzie::split::item_mismatch),
        help("Every bill item must be assigned to at least one person")
    )]
    ItemMismatch {
        /// On the bill but nobody was assigned to it.
        unassigned: Vec<String>,
        /// Assigned to someone but missing from the bill.
        unknown: Vec<String>,
    },

    #[error("Item '{item}' has a negative price")]
    #[diagnostic(code(splitzie::split::negative_price))]
    NegativePrice { item: String },

    #[error("Split invariant violated: {0}")]
    #[diagnostic(
        code(splitzie::split::invariant),
        help("This is a bug; the input passed validation but could not be split")
    )]
    SplitInvariant(String),

    #[error("Malformed extraction: {0}")]
    #[diagnostic(code(splitzie::extract::malformed))]
    MalformedExtraction(String),

    #[error("Extraction failed after {attempts} attempt(s): {last}")]
    #[diagnostic(
        code(splitzie::extract::failed),
        help("Try a sharper image or a more explicit context")
    )]
    ExtractionFailed { attempts: u32, last: Box<Error> },

    #[error("Provider '{provider}' error: {message}")]
    #[diagnostic(code(splitzie::provider::error))]
    Provider { provider: String, message: String },

    #[error("Provider '{provider}' unavailable: {message}")]
    #[diagnostic(
        code(splitzie::provider::unavailable),
        help("The request may succeed if retried")
    )]
    ProviderUnavailable { provider: String, message: String },

    #[error("Invalid image: {0}")]
    #[diagnostic(
        code(splitzie::image::invalid),
        help("Upload a PNG, JPEG, GIF or WebP image")
    )]
    InvalidImage(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(splitzie::config::error))]
    Config(String),

    #[error("Server error: {0}")]
    #[diagnostic(code(splitzie::server::error))]
    Server(String),

    #[error("MongoDB error: {0}")]
    #[diagnostic(
        code(splitzie::mongo::error),
        help("Check the [mongo] section or the MONGO_* environment variables")
    )]
    Mongo(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("HTTP client error: {0}")]
    #[diagnostic(code(splitzie::http::client))]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether another extraction attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::MalformedExtraction(_) | Error::ProviderUnavailable { .. }
        )
    }

    /// True for failures caused by the extracted data rather than the
    /// service itself.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::PeopleMismatch { .. } | Error::ItemMismatch { .. } | Error::NegativePrice { .. }
        )
    }
}

impl From<mongodb::error::Error> for Error {
    fn from(e: mongodb::error::Error) -> Self {
        Error::Mongo(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
