//! Defines the custom error type for the `core` module.

use thiserror::Error;

/// The primary error type for the `core` module.
///
/// Almost everything in this crate degrades to an empty result or an
/// accumulated warning string instead of failing the call; the variants
/// here cover the few conditions a caller must be able to distinguish
/// from "no results".
#[derive(Debug, Error)]
pub enum CoreError {
    /// The search query could not be compiled as a regular expression.
    #[error("Invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// A search was requested with an empty query string.
    #[error("Query cannot be empty")]
    EmptyQuery,

    /// A directory listing failed; carries the human-readable message
    /// the lister produced.
    #[error("{0}")]
    Listing(String),
}
