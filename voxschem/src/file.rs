//! Sources of `.vox` data that are not necessarily files on the disk [`std::fs`] accesses.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// A “file” that `.vox` data can be read from and which has a name for error messages.
pub trait Fileish: fmt::Debug + Send + Sync {
    /// Path of the file, for display purposes such as in an error, not a path that can
    /// necessarily be opened.
    fn display_full_path(&self) -> String;

    /// Obtains the entire file contents.
    fn read(&self) -> Result<Vec<u8>, io::Error>;
}

impl Fileish for PathBuf {
    fn display_full_path(&self) -> String {
        self.display().to_string()
    }

    fn read(&self) -> Result<Vec<u8>, io::Error> {
        std::fs::read(self)
    }
}

/// General-purpose implementation of [`Fileish`] whose contents come from a function.
pub struct NonDiskFile<O> {
    name: String,
    opener: O,
}

impl<O> fmt::Debug for NonDiskFile<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self { name, opener: _ } = self;
        f.debug_struct("NonDiskFile")
            .field("name", name)
            .finish_non_exhaustive()
    }
}

impl<O> NonDiskFile<O> {
    /// Construct a new [`NonDiskFile`] from its parts.
    pub fn from_name_and_data_source(name: String, opener: O) -> Self {
        Self { name, opener }
    }
}

impl<O> Fileish for NonDiskFile<O>
where
    O: Fn() -> Result<Vec<u8>, io::Error> + Send + Sync,
{
    fn display_full_path(&self) -> String {
        self.name.clone()
    }

    fn read(&self) -> Result<Vec<u8>, io::Error> {
        (self.opener)()
    }
}
