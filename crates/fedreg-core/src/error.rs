//! # Error Types — Validation and Catalog Failures
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.
//!
//! ## Design
//!
//! - Grammar, policy, and catalog rejections are distinct variants so an
//!   API layer can map them to distinct response codes.
//! - A failed catalog reload carries the underlying JSON error and leaves
//!   the previously active snapshot untouched.

use thiserror::Error;

/// Rejection of an identifier during parsing or generation.
#[derive(Error, Debug)]
pub enum UrnError {
    /// The raw string does not match the URN grammar.
    #[error("identifier does not match the URN grammar: {raw}")]
    MalformedIdentifier {
        /// The offending input.
        raw: String,
    },

    /// The namespace id differs from the one this instance is configured for.
    #[error("unexpected namespace '{found}', expected '{expected}'")]
    UnexpectedNamespace { found: String, expected: String },

    /// The jurisdiction code fails the configured secondary pattern.
    #[error("jurisdiction '{jurisdiction}' does not match pattern '{pattern}'")]
    JurisdictionPatternMismatch {
        jurisdiction: String,
        pattern: String,
    },

    /// A supplied UUID is not a canonical UUID.
    #[error("invalid UUID '{value}'")]
    InvalidUuid { value: String },

    /// The category is outside the effective allow-list for the jurisdiction.
    #[error("category '{category}' not in the allowed catalog for jurisdiction '{jurisdiction}'")]
    CategoryNotAllowed {
        category: String,
        jurisdiction: String,
    },

    /// The record type is outside the effective allow-list for the jurisdiction.
    #[error("record type '{record_type}' not in the allowed catalog for jurisdiction '{jurisdiction}'")]
    RecordTypeNotAllowed {
        record_type: String,
        jurisdiction: String,
    },
}

/// Rejection of a catalog configuration during reload.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The per-jurisdiction overrides JSON failed to parse.
    #[error("malformed jurisdiction overrides JSON: {source}")]
    InvalidOverrides {
        #[source]
        source: serde_json::Error,
    },
}
