use std::collections::{BTreeMap, VecDeque};

use crate::color::{ColorSet, Palette};
use crate::vox::DecodeError;
use crate::vox::chunk::{Chunk, ChunkContent, ChunkTag};

// -------------------------------------------------------------------------------------------------

/// One voxel of a [`Model`], exactly as stored in the file.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[expect(clippy::exhaustive_structs)]
pub struct VoxelSample {
    #[allow(missing_docs)]
    pub x: u8,
    #[allow(missing_docs)]
    pub y: u8,
    #[allow(missing_docs)]
    pub z: u8,
    /// 1-based index into the scene's [`Palette`]; 0 refers to no color.
    pub color_index: u8,
}

impl VoxelSample {
    #[allow(missing_docs)]
    pub const fn new(x: u8, y: u8, z: u8, color_index: u8) -> Self {
        Self {
            x,
            y,
            z,
            color_index,
        }
    }
}

/// Dimensions of a [`Model`], in the order the `SIZE` chunk declares them.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
#[expect(clippy::exhaustive_structs)]
pub struct GridExtent {
    #[allow(missing_docs)]
    pub width: usize,
    #[allow(missing_docs)]
    pub length: usize,
    #[allow(missing_docs)]
    pub height: usize,
}

impl GridExtent {
    #[allow(missing_docs)]
    pub const fn new(width: usize, length: usize, height: usize) -> Self {
        Self {
            width,
            length,
            height,
        }
    }

    /// Number of cells within the extent, or [`None`] if that overflows.
    pub fn volume(self) -> Option<usize> {
        self.width.checked_mul(self.length)?.checked_mul(self.height)
    }
}

/// A voxel model: one `SIZE` chunk and the `XYZI` chunk following it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Model {
    pub(crate) extent: GridExtent,
    pub(crate) samples: Vec<VoxelSample>,
}

impl Model {
    /// Constructs a model. The samples are not checked against the extent.
    pub fn new(extent: GridExtent, samples: Vec<VoxelSample>) -> Self {
        Self { extent, samples }
    }

    /// Declared dimensions of the model.
    pub fn extent(&self) -> GridExtent {
        self.extent
    }

    /// Voxels of the model, in file order.
    pub fn samples(&self) -> &[VoxelSample] {
        &self.samples
    }
}

// -------------------------------------------------------------------------------------------------

/// Optional numeric properties of a [`MaterialRecord`], in the order their flag bits and
/// values appear in a `MATT` chunk.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[expect(clippy::exhaustive_enums)]
#[allow(missing_docs)]
pub enum MaterialProperty {
    Plastic,
    Roughness,
    Specular,
    Ior,
    Attenuation,
    Power,
    Glow,
}

impl MaterialProperty {
    /// All properties, in flag bit order.
    pub const ALL: [Self; 7] = [
        Self::Plastic,
        Self::Roughness,
        Self::Specular,
        Self::Ior,
        Self::Attenuation,
        Self::Power,
        Self::Glow,
    ];

    /// Name of the property as MagicaVoxel displays it.
    pub fn name(self) -> &'static str {
        match self {
            Self::Plastic => "plastic",
            Self::Roughness => "roughness",
            Self::Specular => "specular",
            Self::Ior => "IOR",
            Self::Attenuation => "attenuation",
            Self::Power => "power",
            Self::Glow => "glow",
        }
    }
}

/// Material parameters from a `MATT` chunk.
///
/// These are carried through decoding but do not affect block conversion.
#[derive(Clone, Debug, PartialEq)]
#[expect(clippy::exhaustive_structs)]
pub struct MaterialRecord {
    /// Material ID, which is also the palette index it applies to.
    pub id: i32,
    /// Material type (diffuse, metal, glass, emissive).
    pub kind: i32,
    /// Blend weight of the material type.
    pub weight: f32,
    /// Properties whose flag bits were set.
    pub properties: BTreeMap<MaterialProperty, f32>,
    /// The "is total power" flag. Unlike the other flags, it has no accompanying value.
    pub is_total_power: bool,
}

impl MaterialRecord {
    /// Flag bit, following the [`MaterialProperty`] bits, which sets
    /// [`MaterialRecord::is_total_power`].
    pub(crate) const TOTAL_POWER_FLAG: i32 = 1 << MaterialProperty::ALL.len();
}

// -------------------------------------------------------------------------------------------------

/// The complete decoded contents of a `.vox` file.
#[derive(Clone, Debug)]
pub struct Scene {
    models: Vec<Model>,
    palette: Palette,
    palette_is_default: bool,
    materials: Vec<MaterialRecord>,
    /// Distinct colors of `palette`, used as the domain for block matching.
    colors: ColorSet,
}

impl Scene {
    /// Constructs a [`Scene`]. If `palette` is [`None`], the default palette is used.
    pub fn new(
        models: Vec<Model>,
        palette: Option<Palette>,
        materials: Vec<MaterialRecord>,
    ) -> Self {
        let palette_is_default = palette.is_none();
        let palette = palette.unwrap_or_default();
        let colors = palette.entries().iter().copied().collect();
        Self {
            models,
            palette,
            palette_is_default,
            materials,
            colors,
        }
    }

    /// Models in file order.
    pub fn models(&self) -> &[Model] {
        &self.models
    }

    /// The palette from the file, or the default palette if the file has none.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Whether the file lacked a palette so that the default palette is in use.
    pub fn palette_is_default(&self) -> bool {
        self.palette_is_default
    }

    /// Material records in file order.
    pub fn materials(&self) -> &[MaterialRecord] {
        &self.materials
    }

    /// Distinct colors of the palette, in palette order.
    pub fn colors(&self) -> &ColorSet {
        &self.colors
    }
}

/// Assembles a [`Scene`] from the children of the `MAIN` chunk.
///
/// The expected sequence is an optional `PACK`, then a `SIZE` and `XYZI` pair for each
/// model, then an optional `RGBA`, then `MATT` chunks.
pub(crate) fn assemble_scene(chunks: Vec<Chunk>) -> Result<Scene, DecodeError> {
    let mut chunks = VecDeque::from(chunks);

    let model_count = match chunks.pop_front() {
        Some(Chunk {
            content: ChunkContent::Pack { model_count },
            ..
        }) => model_count,
        Some(other) => {
            chunks.push_front(other);
            1
        }
        None => 1,
    };
    log::debug!("file has {model_count} models");

    // Don't trust the count for preallocation beyond what the chunks can hold.
    let mut models = Vec::with_capacity(model_count.min(chunks.len() / 2));
    for _ in 0..model_count {
        let extent = match chunks.pop_front() {
            Some(Chunk {
                content: ChunkContent::Size(extent),
                ..
            }) => extent,
            other => return Err(out_of_order(ChunkTag::SIZE, other.as_ref())),
        };
        let samples = match chunks.pop_front() {
            Some(Chunk {
                content: ChunkContent::Xyzi(samples),
                ..
            }) => samples,
            other => return Err(out_of_order(ChunkTag::XYZI, other.as_ref())),
        };
        models.push(Model { extent, samples });
    }

    let palette = match chunks.pop_front() {
        Some(Chunk {
            content: ChunkContent::Rgba(palette),
            ..
        }) => Some(palette),
        Some(other) => {
            chunks.push_front(other);
            None
        }
        None => None,
    };
    if palette.is_none() {
        log::debug!("file has no palette; using default palette");
    }

    let materials = chunks
        .into_iter()
        .filter_map(|chunk| match chunk.content {
            ChunkContent::Matt(material) => Some(material),
            other => {
                log::warn!(
                    "ignoring {tag} chunk found among materials",
                    tag = other.tag()
                );
                None
            }
        })
        .collect();

    Ok(Scene::new(models, palette, materials))
}

fn out_of_order(expected: ChunkTag, found: Option<&Chunk>) -> DecodeError {
    DecodeError::UnexpectedChunkOrder {
        expected,
        found: found.map(Chunk::tag),
    }
}
