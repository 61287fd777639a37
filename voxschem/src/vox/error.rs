use crate::vox::chunk::ChunkTag;

/// Errors that may occur while decoding `.vox` data.
///
/// Any of these aborts the decoding of the entire file; there are no partial results.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// There was no data at all to decode.
    #[error("no .vox content was loaded")]
    ContentNotLoaded,

    /// The file did not start with the `VOX ` header.
    #[non_exhaustive]
    #[error("not a MagicaVoxel .vox file (header was {found:?})")]
    Header {
        /// The header bytes that were found instead.
        found: [u8; 4],
    },

    /// The file is a `.vox` file, but not of the version we can read.
    #[non_exhaustive]
    #[error("unsupported .vox version {found} (only version {expected} is supported)")]
    UnsupportedVersion {
        /// Version number in the file.
        found: i32,
        /// Version number we support.
        expected: i32,
    },

    /// The data ended in the middle of something.
    #[non_exhaustive]
    #[error(
        "data ended unexpectedly: {needed} bytes needed at offset {offset} \
        but only {available} available"
    )]
    Truncated {
        /// Offset, relative to the start of the buffer being read, of the incomplete read.
        offset: usize,
        /// Number of bytes the read required.
        needed: usize,
        /// Number of bytes that remained.
        available: usize,
    },

    /// A chunk which must have no content of its own did have content.
    #[non_exhaustive]
    #[error("{chunk} chunk must have no content, but has {len} bytes")]
    UnexpectedContent {
        /// Type of the offending chunk.
        chunk: ChunkTag,
        /// Length of the unwanted content.
        len: usize,
    },

    /// A chunk's header or content had a value its type does not allow.
    #[non_exhaustive]
    #[error("{chunk} chunk is invalid: {reason}")]
    InvalidChunk {
        /// Type of the offending chunk.
        chunk: ChunkTag,
        /// What was wrong with it.
        reason: &'static str,
    },

    /// Chunks were not in the order a `.vox` file requires.
    #[non_exhaustive]
    #[error("expected {expected} chunk, found {}", describe_found(.found))]
    UnexpectedChunkOrder {
        /// Type of chunk that should have been next.
        expected: ChunkTag,
        /// Type of chunk that was next, or [`None`] if there were no more chunks.
        found: Option<ChunkTag>,
    },

    /// A chunk had a type tag which is not one we know how to decode.
    #[error("unrecognized chunk type {0}")]
    UnrecognizedChunk(ChunkTag),
}

/// Classification of [`DecodeError`]s.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[non_exhaustive]
pub enum DecodeErrorKind {
    /// The data is not a `.vox` file of a supported version.
    Format,
    /// The data ended before a complete file was read.
    TruncatedInput,
    /// A chunk's content did not have the shape its type requires, or chunks
    /// were not in the required order.
    Structural,
    /// A chunk had an unknown type tag.
    UnrecognizedChunkType,
}

impl DecodeError {
    /// Returns which general category this error falls into.
    pub fn kind(&self) -> DecodeErrorKind {
        match self {
            DecodeError::Header { .. } | DecodeError::UnsupportedVersion { .. } => {
                DecodeErrorKind::Format
            }
            DecodeError::ContentNotLoaded | DecodeError::Truncated { .. } => {
                DecodeErrorKind::TruncatedInput
            }
            DecodeError::UnexpectedContent { .. }
            | DecodeError::InvalidChunk { .. }
            | DecodeError::UnexpectedChunkOrder { .. } => DecodeErrorKind::Structural,
            DecodeError::UnrecognizedChunk(_) => DecodeErrorKind::UnrecognizedChunkType,
        }
    }
}

#[allow(clippy::ref_option, reason = "signature dictated by thiserror field access")]
fn describe_found(found: &Option<ChunkTag>) -> String {
    match found {
        Some(tag) => tag.to_string(),
        None => String::from("end of data"),
    }
}
