//! Decoding of MagicaVoxel `.vox` files.
//!
//! The format is documented at
//! <https://github.com/ephtracy/voxel-model/blob/master/MagicaVoxel-file-format-vox.txt>.
//! Only the chunk types of version 150 files are understood: `MAIN`, `PACK`, `SIZE`,
//! `XYZI`, `RGBA`, and `MATT`. Any other chunk type is an error.

mod chunk;
mod cursor;
mod error;
mod scene;

pub use chunk::ChunkTag;
pub use error::{DecodeError, DecodeErrorKind};
pub use scene::{GridExtent, MaterialProperty, MaterialRecord, Model, Scene, VoxelSample};

use chunk::ChunkContent;
use cursor::Cursor;

/// The only `.vox` version this decoder accepts.
pub const SUPPORTED_VERSION: i32 = 150;

const HEADER: &[u8] = b"VOX";

/// Decodes the complete contents of a `.vox` file.
pub fn decode_bytes(bytes: &[u8]) -> Result<Scene, DecodeError> {
    let mut cursor = Cursor::for_file(bytes)?;

    let header: [u8; 4] = cursor.read_array()?;
    if header.trim_ascii_end() != HEADER {
        return Err(DecodeError::Header { found: header });
    }
    let version = cursor.read_i32()?;
    if version != SUPPORTED_VERSION {
        return Err(DecodeError::UnsupportedVersion {
            found: version,
            expected: SUPPORTED_VERSION,
        });
    }

    let main = chunk::read_chunk(&mut cursor)?;
    if main.content != ChunkContent::Main {
        return Err(DecodeError::UnexpectedChunkOrder {
            expected: ChunkTag::MAIN,
            found: Some(main.tag()),
        });
    }
    if !cursor.is_at_end() {
        log::warn!(
            "ignoring {} bytes following the MAIN chunk",
            cursor.remaining()
        );
    }

    let scene = scene::assemble_scene(main.children.into_vec())?;
    log::info!(
        "Loaded MagicaVoxel .vox format: version {version}, {models} models, \
        {palette} palette, {materials} materials",
        models = scene.models().len(),
        palette = if scene.palette_is_default() {
            "default"
        } else {
            "custom"
        },
        materials = scene.materials().len(),
    );
    Ok(scene)
}
