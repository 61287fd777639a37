//! Conversion of [MagicaVoxel] `.vox` models into block `.schematic` files.
//!
//! Conversion happens in two steps:
//!
//! 1. [`decode()`] (or [`decode_bytes()`] for data already in memory) reads a `.vox`
//!    file into a [`Scene`] of models, a palette, and materials.
//! 2. [`Scene::export()`] chooses a block for each voxel according to its palette color,
//!    and writes the blocks of a model as a gzip-compressed NBT schematic in the
//!    Minecraft “Alpha” block numbering.
//!
//! Decoding is strict: any malformed or unrecognized data is an error and produces no
//! [`Scene`]. Choosing blocks is lenient: a color with no block gets the
//! [`ConversionOptions::default_block`].
//!
//! [MagicaVoxel]: https://ephtracy.github.io/

// Crate-specific lint settings. (General settings can be found in the workspace manifest.)
#![forbid(unsafe_code)]

// -------------------------------------------------------------------------------------------------

pub mod color;
mod export;
pub use export::*;
pub mod file;
mod import;
pub use import::*;
pub mod mapping;
pub use mapping::{BlockId, ColorMapping, ConversionOptions, MappingError, OutputArrays};
mod schematic;
pub mod vox;
pub use vox::{DecodeError, DecodeErrorKind, Scene, decode_bytes};

#[cfg(any(test, feature = "_special_testing"))]
#[doc(hidden)]
pub mod testing;
