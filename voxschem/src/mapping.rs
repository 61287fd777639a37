//! Choosing a block for each voxel.
//!
//! Each distinct palette color is given a [`BlockId`], either from a caller-supplied
//! table of [`ColorMapping`]s or by finding the nearest color in a built-in table of
//! blocks. Voxels whose color has no block take [`ConversionOptions::default_block`].

use core::fmt;
use core::num::ParseIntError;
use core::str::FromStr;
use std::collections::HashMap;
use std::sync::LazyLock;

use crate::color::{Color, ColorCandidate, ColorSet, Palette, nearest_match};
use crate::vox::{GridExtent, Model};


// -------------------------------------------------------------------------------------------------

/// Identifies a block type and its metadata value, written as `"<id>"` or `"<id>:<meta>"`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(try_from = "String", into = "String")]
#[expect(clippy::exhaustive_structs)]
pub struct BlockId {
    /// Numeric block type.
    pub id: i32,
    /// Block metadata, such as the color of wool.
    pub meta: i32,
}

impl BlockId {
    /// Stone, the block used when nothing else is specified.
    pub const DEFAULT: Self = Self::new(1, 0);

    /// Air; the value of cells which no voxel occupies.
    pub const AIR: Self = Self::new(0, 0);

    #[allow(missing_docs)]
    pub const fn new(id: i32, meta: i32) -> Self {
        Self { id, meta }
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let &Self { id, meta } = self;
        if meta == 0 {
            write!(f, "{id}")
        } else {
            write!(f, "{id}:{meta}")
        }
    }
}

impl FromStr for BlockId {
    type Err = MappingError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let integer = |part: &str| {
            part.parse::<i32>().map_err(|source| MappingError::Integer {
                text: text.to_owned(),
                source,
            })
        };
        let mut parts = text.split(':');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(id), None, None) => Ok(Self::new(integer(id)?, 0)),
            (Some(id), Some(meta), None) => Ok(Self::new(integer(id)?, integer(meta)?)),
            _ => Err(MappingError::Syntax {
                text: text.to_owned(),
            }),
        }
    }
}

impl TryFrom<String> for BlockId {
    type Error = MappingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BlockId> for String {
    fn from(value: BlockId) -> Self {
        value.to_string()
    }
}

/// A block identifier could not be parsed.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum MappingError {
    /// The identifier did not have one or two `:`-separated parts.
    #[non_exhaustive]
    #[error("block identifier {text:?} is not of the form \"<id>\" or \"<id>:<meta>\"")]
    Syntax {
        /// The identifier as given.
        text: String,
    },

    /// A part of the identifier was not an integer.
    #[non_exhaustive]
    #[error("block identifier {text:?} contains a non-integer")]
    Integer {
        /// The identifier as given.
        text: String,
        #[allow(missing_docs)]
        source: ParseIntError,
    },
}

// -------------------------------------------------------------------------------------------------

/// Broad category of a block in the built-in table.
///
/// Only [`BlockKind::Solid`] blocks are chosen by nearest-color matching.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum BlockKind {
    /// An opaque full cube.
    Solid,
    /// A see-through block such as glass or leaves.
    Transparent,
    /// Water or lava.
    Liquid,
    /// A block which emits light.
    Light,
    /// Any category not listed above.
    #[serde(other)]
    Other,
}

/// An entry of the built-in block table.
#[derive(Clone, Debug, PartialEq, serde::Deserialize)]
pub struct BlockCandidate {
    color: Color,
    #[serde(rename = "numeric_id")]
    block: BlockId,
    #[serde(rename = "type")]
    kind: BlockKind,
}

impl BlockCandidate {
    /// The block this entry stands for.
    pub fn block(&self) -> BlockId {
        self.block
    }
}

impl ColorCandidate for BlockCandidate {
    type Kind = BlockKind;

    fn color(&self) -> Color {
        self.color
    }

    fn kind(&self) -> &BlockKind {
        &self.kind
    }
}

static BUILTIN_BLOCKS: LazyLock<Vec<BlockCandidate>> = LazyLock::new(|| {
    serde_json::from_str(include_str!("mapping/blocks.json"))
        .expect("built-in block table should be valid")
});

/// The built-in table of blocks and their typical colors, used when no
/// [`ConversionOptions::explicit_mapping`] is given.
pub fn builtin_blocks() -> &'static [BlockCandidate] {
    &BUILTIN_BLOCKS
}

// -------------------------------------------------------------------------------------------------

/// One row of an explicit color-to-block table.
///
/// Serialized as `{"color": [r, g, b], "numeric_id": "35:14"}`; the color may also have
/// a fourth alpha component, and is opaque otherwise.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[expect(clippy::exhaustive_structs)]
pub struct ColorMapping {
    /// Palette color to match exactly.
    pub color: Color,
    /// Block to use for voxels of that color.
    #[serde(rename = "numeric_id")]
    pub block: BlockId,
}

/// Parameters of the conversion from voxels to blocks.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub struct ConversionOptions {
    /// Block for voxels whose color has no block assigned.
    pub default_block: BlockId,

    /// If present and not empty, the complete table of colors and their blocks.
    /// Nearest-color matching against the built-in table is then not done at all.
    pub explicit_mapping: Option<Vec<ColorMapping>>,
}

impl ConversionOptions {
    /// Options with [`BlockId::DEFAULT`] and no explicit mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets [`Self::default_block`].
    #[must_use]
    pub fn with_default_block(mut self, block: BlockId) -> Self {
        self.default_block = block;
        self
    }

    /// Sets [`Self::explicit_mapping`].
    #[must_use]
    pub fn with_explicit_mapping(mut self, mapping: Option<Vec<ColorMapping>>) -> Self {
        self.explicit_mapping = mapping;
        self
    }
}

/// Lookup from palette colors to blocks, built once per conversion.
#[derive(Debug)]
pub(crate) struct BlockTable {
    blocks: HashMap<Color, BlockId>,
    default_block: BlockId,
}

impl BlockTable {
    /// Builds the table for the colors of a scene.
    pub fn new(colors: &ColorSet, options: &ConversionOptions) -> Self {
        // An empty explicit table counts as not given.
        let explicit_mapping = options
            .explicit_mapping
            .as_deref()
            .filter(|mapping| !mapping.is_empty());
        let blocks: HashMap<Color, BlockId> = match explicit_mapping {
            Some(mapping) => {
                log::debug!("using explicit mapping of {} colors", mapping.len());
                // Later rows replace earlier rows for the same color.
                mapping.iter().map(|row| (row.color, row.block)).collect()
            }
            None => {
                log::debug!("matching {} palette colors to built-in blocks", colors.len());
                colors
                    .iter()
                    .filter_map(|color| {
                        let candidate =
                            nearest_match(color, builtin_blocks(), &BlockKind::Solid)?;
                        Some((color, candidate.block()))
                    })
                    .collect()
            }
        };
        Self {
            blocks,
            default_block: options.default_block,
        }
    }

    /// Returns the block for a voxel's color index.
    pub fn block_for(&self, palette: &Palette, color_index: u8) -> BlockId {
        palette
            .color_for_index(color_index)
            .and_then(|color| self.blocks.get(&color).copied())
            .unwrap_or(self.default_block)
    }
}

// -------------------------------------------------------------------------------------------------

/// Blocks of one model, as flat arrays in the cell order of a schematic.
///
/// The cell at `(x, y, z)` is at index `(y * length + z) * width + x`, where `y` is the
/// vertical axis. Cells no voxel occupies hold [`BlockId::AIR`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OutputArrays {
    extent: GridExtent,
    block_ids: Vec<i32>,
    block_meta: Vec<i32>,
}

impl OutputArrays {
    pub(crate) fn from_parts(
        extent: GridExtent,
        block_ids: Vec<i32>,
        block_meta: Vec<i32>,
    ) -> Self {
        debug_assert_eq!(extent.volume(), Some(block_ids.len()));
        debug_assert_eq!(block_ids.len(), block_meta.len());
        Self {
            extent,
            block_ids,
            block_meta,
        }
    }

    /// Dimensions of the arrays. `height` is the vertical axis.
    pub fn extent(&self) -> GridExtent {
        self.extent
    }

    /// Block type of each cell.
    pub fn block_ids(&self) -> &[i32] {
        &self.block_ids
    }

    /// Block metadata of each cell.
    pub fn block_meta(&self) -> &[i32] {
        &self.block_meta
    }

    /// Returns the block at the given cell, or [`None`] if it is out of bounds.
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<BlockId> {
        let GridExtent {
            width,
            length,
            height,
        } = self.extent;
        if x >= width || y >= height || z >= length {
            return None;
        }
        let index = (y * length + z) * width + x;
        Some(BlockId::new(self.block_ids[index], self.block_meta[index]))
    }
}

/// Converts the voxels of `model` to blocks.
///
/// The caller must ensure that the model's volume fits in memory.
pub(crate) fn map_model(model: &Model, palette: &Palette, table: &BlockTable) -> OutputArrays {
    let extent = model.extent();
    let GridExtent {
        width,
        length,
        height,
    } = extent;
    let volume = width * length * height;
    let mut block_ids = vec![0; volume];
    let mut block_meta = vec![0; volume];

    let mut outside = 0usize;
    for sample in model.samples() {
        // The stored (x, y, z) are used as (z, x, y) respectively.
        let z = usize::from(sample.x);
        let x = usize::from(sample.y);
        let y = usize::from(sample.z);
        if x >= width || y >= height || z >= length {
            outside += 1;
            continue;
        }
        let index = (y * length + z) * width + x;
        let block = table.block_for(palette, sample.color_index);
        block_ids[index] = block.id;
        block_meta[index] = block.meta;
    }
    if outside > 0 {
        log::warn!("skipped {outside} voxels outside of the model's size {extent:?}");
    }

    OutputArrays::from_parts(extent, block_ids, block_meta)
}
