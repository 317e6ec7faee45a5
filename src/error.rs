//! Error taxonomy for one publish attempt.
//!
//! Every failure is typed and local to the attempt that produced it; nothing
//! is retried automatically and no partial transaction ever leaves the
//! builder.

use thiserror::Error;

/// Low-level BCS decode/encode failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The byte stream does not conform to the expected BCS layout: a read
    /// ran past the end of the buffer, a declared length is inconsistent
    /// with the remaining bytes, or a tag/length prefix is out of range.
    #[error("malformed encoding: {0}")]
    MalformedEncoding(String),
}

impl CodecError {
    pub(crate) fn at(offset: usize, msg: impl std::fmt::Display) -> Self {
        CodecError::MalformedEncoding(format!("{msg} (at offset {offset})"))
    }
}

/// Failure of a single publish attempt.
#[derive(Debug, Error)]
pub enum PublishError {
    /// No `package-metadata.bcs` in the selected file set.
    #[error("no package metadata found in the selected files")]
    MetadataNotFound,

    /// More than one file matched the metadata filename. The original
    /// first-match-wins behavior silently publishes the wrong package, so
    /// ambiguity is an error here.
    #[error("multiple package metadata candidates: `{0}` and `{1}`")]
    AmbiguousMetadata(String, String),

    /// The metadata file (or a nested module/dependency record) failed to
    /// decode.
    #[error("malformed package metadata: {0}")]
    MalformedMetadata(#[from] CodecError),

    /// Metadata names a module with no matching compiled bytecode file.
    #[error("no compiled bytecode found for module `{module}`")]
    BytecodeNotFound { module: String },

    /// Resource-account seed string is not valid hex.
    #[error("invalid hex seed: {0}")]
    InvalidHexSeed(String),

    /// Node unreachable, returned an error, or the account does not exist.
    #[error("account lookup failed: {0}")]
    AccountLookupFailed(String),

    /// Attempt started without a usable wallet network context.
    #[error("no wallet network info: {0}")]
    NoWalletNetwork(String),

    /// Surfaced verbatim from the external signer.
    #[error("signing rejected: {0}")]
    SigningRejected(String),
}
