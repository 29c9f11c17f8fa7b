//! Error type shared by the parser, the trie and the codecs.

use thiserror::Error;

/// Result type of all fallible operations of this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing prefixes or (de)serializing a trie.
///
/// Looking up a prefix that is not stored is never an error; such lookups return `None` or an
/// empty collection instead.
#[derive(Debug, Error)]
pub enum Error {
    /// The textual prefix could not be parsed for the address family of the trie.
    #[error("malformed prefix `{input}`: {reason}")]
    MalformedPrefix {
        /// The text that was given.
        input: String,
        /// What is wrong with it.
        reason: String,
    },

    /// `serialize` or `deserialize` was called on a trie without a configured serializer.
    #[error("no serializer specified")]
    MissingSerializer,

    /// The encoded tree is structurally invalid.
    #[error("invalid trie encoding: {0}")]
    Format(String),

    /// The tree-shaped (JSON) encoding could not be read or written.
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The flattened (binary) encoding could not be read or written.
    #[error(transparent)]
    Binary(#[from] bincode::Error),
}

impl Error {
    pub(crate) fn malformed(input: &str, reason: impl ToString) -> Self {
        Self::MalformedPrefix {
            input: input.to_string(),
            reason: reason.to_string(),
        }
    }
}
