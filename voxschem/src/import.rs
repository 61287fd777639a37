use std::io;
use std::path::Path;
use std::sync::Arc;

use crate::file::Fileish;
use crate::vox::{self, DecodeError, Scene};

/// Reads and decodes the `.vox` file at `path`.
pub fn decode(path: &Path) -> Result<Scene, ImportError> {
    decode_file(Arc::new(path.to_owned()))
}

/// Reads and decodes a `.vox` file from any [`Fileish`] source.
///
/// The contents are read completely before decoding begins.
pub fn decode_file(file: Arc<dyn Fileish>) -> Result<Scene, ImportError> {
    let bytes = file.read().map_err(|error| ImportError {
        source_path: file.display_full_path(),
        detail: ImportErrorKind::Read { error },
    })?;
    log::debug!(
        "read {len} bytes from {path}",
        len = bytes.len(),
        path = file.display_full_path()
    );
    vox::decode_bytes(&bytes).map_err(|error| ImportError {
        source_path: file.display_full_path(),
        detail: ImportErrorKind::Decode(error),
    })
}

/// Fatal errors that may be encountered while importing a file.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
#[error("failed to import '{source_path}'")]
pub struct ImportError {
    /// The path, as produced by [`Fileish::display_full_path()`], of the file being imported.
    pub source_path: String,

    #[source]
    pub(crate) detail: ImportErrorKind,
}

impl ImportError {
    /// Specific reason why the import failed.
    pub fn kind(&self) -> &ImportErrorKind {
        &self.detail
    }

    /// The decoding error, if the file was read but its contents were not valid.
    pub fn decode_error(&self) -> Option<&DecodeError> {
        match &self.detail {
            ImportErrorKind::Decode(error) => Some(error),
            ImportErrorKind::Read { .. } => None,
        }
    }
}

/// Specific reason why an import operation failed.
/// Always contained within an [`ImportError`].
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ImportErrorKind {
    /// An IO error occurred while reading the data to import.
    #[non_exhaustive]
    #[error("failed to read data")]
    Read {
        /// The IO error that occurred while reading.
        #[source]
        error: io::Error,
    },

    /// The data was not a valid `.vox` file.
    #[error("failed to decode the data")]
    Decode(#[source] DecodeError),
}
