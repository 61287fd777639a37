//! Construction of `.vox` data for tests.
//!
//! This module is not a stable public API.

use crate::color::{Color, PALETTE_LEN};
use crate::vox::SUPPORTED_VERSION;

/// Builds the bytes of a `.vox` file chunk by chunk.
///
/// The chunks added become the children of the file's `MAIN` chunk, in the order they
/// were added. No validation is done, so that malformed files can be built too.
#[derive(Clone, Debug)]
pub struct VoxBuilder {
    header: [u8; 4],
    version: i32,
    children: Vec<u8>,
}

impl Default for VoxBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl VoxBuilder {
    /// A file of the supported version with no chunks under `MAIN`.
    pub fn new() -> Self {
        Self {
            header: *b"VOX ",
            version: SUPPORTED_VERSION,
            children: Vec::new(),
        }
    }

    /// Replaces the 4-byte file header.
    #[must_use]
    pub fn header(mut self, header: [u8; 4]) -> Self {
        self.header = header;
        self
    }

    /// Replaces the version number.
    #[must_use]
    pub fn version(mut self, version: i32) -> Self {
        self.version = version;
        self
    }

    /// Adds a chunk with arbitrary tag and content.
    #[must_use]
    pub fn raw_chunk(mut self, tag: &[u8; 4], content: &[u8], children: &[u8]) -> Self {
        self.children.extend(Self::chunk(tag, content, children));
        self
    }

    /// Adds a `PACK` chunk.
    #[must_use]
    pub fn pack(self, model_count: i32) -> Self {
        self.raw_chunk(b"PACK", &Self::ints(&[model_count]), &[])
    }

    /// Adds a `SIZE` chunk and an `XYZI` chunk.
    /// Each sample is `[x, y, z, color_index]` in file order.
    #[must_use]
    pub fn model(self, [width, length, height]: [i32; 3], samples: &[[u8; 4]]) -> Self {
        let count = i32::try_from(samples.len()).expect("too many samples");
        let mut xyzi = Self::ints(&[count]);
        xyzi.extend(samples.iter().flatten());
        self.raw_chunk(b"SIZE", &Self::ints(&[width, length, height]), &[])
            .raw_chunk(b"XYZI", &xyzi, &[])
    }

    /// Adds an `RGBA` chunk. `colors` are padded with transparent black to 256 entries,
    /// as MagicaVoxel writes them.
    #[must_use]
    pub fn palette(self, colors: &[Color]) -> Self {
        assert!(colors.len() <= PALETTE_LEN, "too many colors");
        let content: Vec<u8> = colors
            .iter()
            .copied()
            .chain(core::iter::repeat(Color::TRANSPARENT))
            .take(PALETTE_LEN)
            .flat_map(<[u8; 4]>::from)
            .collect();
        self.raw_chunk(b"RGBA", &content, &[])
    }

    /// Adds a `MATT` chunk. `values` must have one entry per property flag bit set.
    #[must_use]
    pub fn material(self, id: i32, kind: i32, weight: f32, flags: i32, values: &[f32]) -> Self {
        let mut content = Self::ints(&[id, kind]);
        content.extend(weight.to_le_bytes());
        content.extend(flags.to_le_bytes());
        content.extend(values.iter().flat_map(|v| v.to_le_bytes()));
        self.raw_chunk(b"MATT", &content, &[])
    }

    /// Returns the bytes of the complete file.
    pub fn build(&self) -> Vec<u8> {
        let mut bytes = self.header.to_vec();
        bytes.extend(self.version.to_le_bytes());
        bytes.extend(Self::chunk(b"MAIN", &[], &self.children));
        bytes
    }

    /// Returns the bytes of one chunk, whose children are the already-encoded `children`.
    pub fn chunk(tag: &[u8; 4], content: &[u8], children: &[u8]) -> Vec<u8> {
        let length = |bytes: &[u8]| i32::try_from(bytes.len()).expect("chunk too long");
        let mut bytes = tag.to_vec();
        bytes.extend(length(content).to_le_bytes());
        bytes.extend(length(children).to_le_bytes());
        bytes.extend(content);
        bytes.extend(children);
        bytes
    }

    /// Returns the little-endian encoding of `values`.
    pub fn ints(values: &[i32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_le_bytes()).collect()
    }
}
