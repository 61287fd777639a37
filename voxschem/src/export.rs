use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::{ffi, fs};

use crate::mapping::{self, BlockTable, ConversionOptions, OutputArrays};
use crate::schematic;
use crate::vox::{Model, Scene};

impl Scene {
    /// Converts the voxels of the model at `model_index` to blocks.
    ///
    /// Fails only if there is no such model or it is too large to be a schematic.
    pub fn block_arrays(
        &self,
        model_index: usize,
        options: &ConversionOptions,
    ) -> Result<OutputArrays, ExportError> {
        let model = self.model(model_index)?;
        // Refuse before allocating arrays for a size that could never be written.
        schematic::check_extent(model.extent(), model_index)?;
        let table = BlockTable::new(self.colors(), options);
        Ok(mapping::map_model(model, self.palette(), &table))
    }

    /// Writes the first model as a schematic file at `path`.
    pub fn export(&self, path: &Path, options: &ConversionOptions) -> Result<(), ExportError> {
        self.export_model(0, path, options)
    }

    /// Writes the model at `model_index` as a schematic file at `path`.
    ///
    /// The file is only created once the schematic has been completely encoded.
    pub fn export_model(
        &self,
        model_index: usize,
        path: &Path,
        options: &ConversionOptions,
    ) -> Result<(), ExportError> {
        let bytes = self.encode_schematic(model_index, options)?;
        fs::write(path, bytes)?;
        log::info!(
            "wrote model {model_index} to {path}",
            path = path.display()
        );
        Ok(())
    }

    /// Writes every model as a schematic file.
    ///
    /// If there is more than one model, each file is named by inserting a hyphen and the
    /// model index before the extension of `base_path`; i.e. "foo.schematic" becomes
    /// "foo-0.schematic", "foo-1.schematic", and so on.
    /// Returns the paths written.
    pub fn export_all(
        &self,
        base_path: &Path,
        options: &ConversionOptions,
    ) -> Result<Vec<PathBuf>, ExportError> {
        let multiple = self.models().len() > 1;
        (0..self.models().len())
            .map(|model_index| {
                let path = if multiple {
                    member_export_path(base_path, model_index)
                } else {
                    base_path.to_owned()
                };
                self.export_model(model_index, &path, options)?;
                Ok(path)
            })
            .collect()
    }

    /// Writes the model at `model_index` as a schematic to `writer`.
    pub fn write_schematic(
        &self,
        model_index: usize,
        mut writer: impl Write,
        options: &ConversionOptions,
    ) -> Result<(), ExportError> {
        let bytes = self.encode_schematic(model_index, options)?;
        writer.write_all(&bytes)?;
        writer.flush()?;
        Ok(())
    }

    fn encode_schematic(
        &self,
        model_index: usize,
        options: &ConversionOptions,
    ) -> Result<Vec<u8>, ExportError> {
        let arrays = self.block_arrays(model_index, options)?;
        schematic::encode(&schematic::to_nbt(&arrays, model_index)?)
    }

    fn model(&self, model_index: usize) -> Result<&Model, ExportError> {
        self.models()
            .get(model_index)
            .ok_or(ExportError::NoSuchModel {
                model_index,
                model_count: self.models().len(),
            })
    }
}

/// Calculate the file path to use for one of several models exported to separate files.
fn member_export_path(base_path: &Path, model_index: usize) -> PathBuf {
    let mut new_file_name: ffi::OsString =
        base_path.file_stem().unwrap_or_default().to_owned();
    new_file_name.push("-");
    new_file_name.push(model_index.to_string());
    if let Some(extension) = base_path.extension() {
        new_file_name.push(".");
        new_file_name.push(extension);
    }
    base_path.with_file_name(new_file_name)
}

/// Fatal errors that may be encountered during an export operation.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ExportError {
    /// IO error while writing the data to a file or stream.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The requested model does not exist.
    #[non_exhaustive]
    #[error("there is no model {model_index}; the scene has {model_count} models")]
    NoSuchModel {
        /// Index of the requested model.
        model_index: usize,
        /// Number of models in the scene.
        model_count: usize,
    },

    /// The model cannot be represented as a schematic.
    #[non_exhaustive]
    #[error("model {model_index} cannot be exported: {reason}")]
    NotRepresentable {
        /// Index of the model being exported.
        model_index: usize,
        /// The reason why it cannot be represented.
        reason: String,
    },

    /// The NBT encoder failed.
    #[error("could not encode schematic")]
    Encode(#[source] quartz_nbt::io::NbtIoError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn member_path() {
        assert_eq!(
            member_export_path(Path::new("/tmp/out/castle.schematic"), 3),
            PathBuf::from("/tmp/out/castle-3.schematic")
        );
        assert_eq!(
            member_export_path(Path::new("castle"), 0),
            PathBuf::from("castle-0")
        );
    }
}
