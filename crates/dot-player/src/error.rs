//! Error types for the player
//!
//! Nothing here is fatal to a running widget: page payload problems fall back
//! to defaults and delete failures are shown to the user as a notice.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while setting the player up
#[derive(Debug, Error)]
pub enum PlayerError {
    /// Library or config file could not be read
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON payload (library, config, dot font) is malformed
    #[error("Malformed {what}: {source}")]
    Format {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// An album cover could not be decoded
    #[error("Failed to decode cover image {what}: {source}")]
    Image {
        what: String,
        #[source]
        source: image::ImageError,
    },

    /// Dot font glyph keys must be single characters
    #[error("Dot font glyph key '{0}' is not a single character")]
    GlyphKey(String),

    /// Command line could not be parsed
    #[error("Invalid arguments: {0}")]
    Args(String),

    /// The native window failed to start
    #[error("Failed to start player window: {0}")]
    Window(String),
}

/// Why a delete request did not remove the song
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeleteError {
    /// The server answered but refused
    #[error("{0}")]
    Rejected(String),

    /// The request never got an answer
    #[error("request failed: {0}")]
    Transport(String),

    /// The answer was not the expected JSON
    #[error("unexpected response: {0}")]
    BadResponse(String),
}
