//! Decoding of the chunk tree that makes up the body of a `.vox` file.
//!
//! Each chunk is laid out as:
//!
//! ```text
//! tag: [u8; 4]
//! content length: i32
//! children length: i32
//! content: [u8; content length]
//! children: chunks totalling children length bytes
//! ```

use core::{fmt, mem};
use std::collections::BTreeMap;

use crate::color::{Color, PALETTE_LEN, Palette};
use crate::vox::cursor::Cursor;
use crate::vox::{DecodeError, GridExtent, MaterialProperty, MaterialRecord, VoxelSample};

// -------------------------------------------------------------------------------------------------

/// The 4-byte type identifier of a chunk.
///
/// Displayed as ASCII text with trailing whitespace removed.
#[derive(Clone, Copy, Eq, Hash, PartialEq)]
#[expect(clippy::exhaustive_structs)]
pub struct ChunkTag(pub [u8; 4]);

impl ChunkTag {
    pub(crate) const MAIN: Self = Self(*b"MAIN");
    pub(crate) const PACK: Self = Self(*b"PACK");
    pub(crate) const SIZE: Self = Self(*b"SIZE");
    pub(crate) const XYZI: Self = Self(*b"XYZI");
    pub(crate) const RGBA: Self = Self(*b"RGBA");
    pub(crate) const MATT: Self = Self(*b"MATT");

    /// The tag with trailing ASCII whitespace removed.
    pub fn trimmed(&self) -> &[u8] {
        self.0.trim_ascii_end()
    }
}

impl fmt::Display for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&String::from_utf8_lossy(self.trimmed()))
    }
}

impl fmt::Debug for ChunkTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkTag({:?})", String::from_utf8_lossy(&self.0))
    }
}

// -------------------------------------------------------------------------------------------------

/// A decoded chunk and its decoded children.
#[derive(Debug, PartialEq)]
pub(crate) struct Chunk {
    pub content: ChunkContent,
    pub children: ChunkList,
}

/// Children of a [`Chunk`].
///
/// Dropping is iterative so that arbitrarily deep trees can be dropped.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct ChunkList(Vec<Chunk>);

impl ChunkList {
    pub fn into_vec(mut self) -> Vec<Chunk> {
        mem::take(&mut self.0)
    }

    fn push(&mut self, chunk: Chunk) {
        self.0.push(chunk);
    }
}

impl From<Vec<Chunk>> for ChunkList {
    fn from(chunks: Vec<Chunk>) -> Self {
        Self(chunks)
    }
}

impl Drop for ChunkList {
    fn drop(&mut self) {
        let mut stack = mem::take(&mut self.0);
        while let Some(mut chunk) = stack.pop() {
            stack.append(&mut chunk.children.0);
        }
    }
}

/// The decoded content of one [`Chunk`], according to its type.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum ChunkContent {
    /// Container for the rest of the file; has no content of its own.
    Main,
    /// Number of models in the file.
    Pack { model_count: usize },
    Size(GridExtent),
    Xyzi(Vec<VoxelSample>),
    Rgba(Palette),
    Matt(MaterialRecord),
}

impl Chunk {
    pub fn tag(&self) -> ChunkTag {
        self.content.tag()
    }
}

impl ChunkContent {
    pub fn tag(&self) -> ChunkTag {
        match self {
            ChunkContent::Main => ChunkTag::MAIN,
            ChunkContent::Pack { .. } => ChunkTag::PACK,
            ChunkContent::Size(_) => ChunkTag::SIZE,
            ChunkContent::Xyzi(_) => ChunkTag::XYZI,
            ChunkContent::Rgba(_) => ChunkTag::RGBA,
            ChunkContent::Matt(_) => ChunkTag::MATT,
        }
    }

    /// Decodes the content bytes of a chunk whose type is `tag`.
    fn decode(tag: ChunkTag, content: &[u8]) -> Result<Self, DecodeError> {
        let invalid = |reason: &'static str| DecodeError::InvalidChunk { chunk: tag, reason };
        let mut cursor = Cursor::new(content);

        Ok(match tag.trimmed() {
            b"MAIN" => {
                if !content.is_empty() {
                    return Err(DecodeError::UnexpectedContent {
                        chunk: tag,
                        len: content.len(),
                    });
                }
                ChunkContent::Main
            }
            b"PACK" => ChunkContent::Pack {
                model_count: cursor.read_len(|| invalid("model count is negative"))?,
            },
            b"SIZE" => {
                let mut dimension = || cursor.read_len(|| invalid("size is negative"));
                ChunkContent::Size(GridExtent {
                    width: dimension()?,
                    length: dimension()?,
                    height: dimension()?,
                })
            }
            b"XYZI" => {
                let count = cursor.read_len(|| invalid("voxel count is negative"))?;
                // Don't trust the count for preallocation beyond what the content can hold.
                let mut samples = Vec::with_capacity(count.min(cursor.remaining() / 4));
                for _ in 0..count {
                    let [x, y, z, color_index] = cursor.read_array()?;
                    samples.push(VoxelSample {
                        x,
                        y,
                        z,
                        color_index,
                    });
                }
                ChunkContent::Xyzi(samples)
            }
            b"RGBA" => {
                // Only 255 entries are stored; the final slot of the palette is left empty.
                let mut entries = [Color::TRANSPARENT; PALETTE_LEN];
                for entry in &mut entries[..PALETTE_LEN - 1] {
                    *entry = Color::from(cursor.read_array::<4>()?);
                }
                ChunkContent::Rgba(Palette::new(entries))
            }
            b"MATT" => {
                let id = cursor.read_i32()?;
                let kind = cursor.read_i32()?;
                let weight = cursor.read_f32()?;
                let flags = cursor.read_i32()?;
                let mut properties = BTreeMap::new();
                for (bit, property) in MaterialProperty::ALL.into_iter().enumerate() {
                    if flags & (1 << bit) != 0 {
                        properties.insert(property, cursor.read_f32()?);
                    }
                }
                ChunkContent::Matt(MaterialRecord {
                    id,
                    kind,
                    weight,
                    properties,
                    is_total_power: flags & MaterialRecord::TOTAL_POWER_FLAG != 0,
                })
            }
            _ => return Err(DecodeError::UnrecognizedChunk(tag)),
        })
    }
}

// -------------------------------------------------------------------------------------------------

/// A chunk whose header and content have been read but whose children are still being read.
struct PendingChunk<'a> {
    tag: ChunkTag,
    content: &'a [u8],
    /// Cursor offset at which this chunk's children end.
    children_end: usize,
    children: ChunkList,
}

impl<'a> PendingChunk<'a> {
    fn read_header(cursor: &mut Cursor<'a>) -> Result<Self, DecodeError> {
        let tag = ChunkTag(cursor.read_array()?);
        let invalid = |reason: &'static str| DecodeError::InvalidChunk { chunk: tag, reason };
        let content_length = cursor.read_len(|| invalid("content length is negative"))?;
        let children_length = cursor.read_len(|| invalid("children length is negative"))?;
        log::trace!(
            "found chunk {tag} at offset {offset}: content {content_length} bytes, children {children_length} bytes",
            offset = cursor.offset() - 12,
        );
        let content = cursor.read_raw(content_length)?;
        Ok(Self {
            tag,
            content,
            children_end: cursor.offset().saturating_add(children_length),
            children: ChunkList::default(),
        })
    }

    fn finish(self) -> Result<Chunk, DecodeError> {
        Ok(Chunk {
            content: ChunkContent::decode(self.tag, self.content)?,
            children: self.children,
        })
    }
}

/// Reads one chunk, including all of its descendants, from `cursor`.
///
/// Children are read until the cursor reaches the end of the parent's declared children
/// length. Nesting depth is limited only by the size of the data, since the tree is walked
/// with an explicit stack rather than recursion.
pub(crate) fn read_chunk(cursor: &mut Cursor<'_>) -> Result<Chunk, DecodeError> {
    let mut stack: Vec<PendingChunk<'_>> = vec![PendingChunk::read_header(cursor)?];
    loop {
        let needs_child = stack
            .last()
            .is_some_and(|pending| cursor.offset() < pending.children_end);
        if needs_child {
            let child = PendingChunk::read_header(cursor)?;
            stack.push(child);
            continue;
        }

        let Some(pending) = stack.pop() else {
            unreachable!("chunk stack emptied without returning");
        };
        let chunk = pending.finish()?;
        match stack.last_mut() {
            Some(parent) => parent.children.push(chunk),
            None => return Ok(chunk),
        }
    }
}

// -------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::VoxBuilder;
    use pretty_assertions::assert_eq;

    fn read_one(bytes: &[u8]) -> Result<Chunk, DecodeError> {
        read_chunk(&mut Cursor::new(bytes))
    }

    #[test]
    fn tag_display_trims_trailing_space() {
        assert_eq!(ChunkTag(*b"VOX ").to_string(), "VOX");
        assert_eq!(format!("{:?}", ChunkTag(*b"VOX ")), "ChunkTag(\"VOX \")");
    }

    #[test]
    fn size_chunk() {
        let bytes = VoxBuilder::chunk(b"SIZE", &VoxBuilder::ints(&[3, 4, 5]), &[]);
        assert_eq!(
            read_one(&bytes),
            Ok(Chunk {
                content: ChunkContent::Size(GridExtent {
                    width: 3,
                    length: 4,
                    height: 5
                }),
                children: ChunkList::default(),
            })
        );
    }

    #[test]
    fn size_chunk_negative() {
        let bytes = VoxBuilder::chunk(b"SIZE", &VoxBuilder::ints(&[3, -4, 5]), &[]);
        assert_eq!(
            read_one(&bytes),
            Err(DecodeError::InvalidChunk {
                chunk: ChunkTag::SIZE,
                reason: "size is negative"
            })
        );
    }

    #[test]
    fn pack_chunk_negative() {
        let bytes = VoxBuilder::chunk(b"PACK", &VoxBuilder::ints(&[-1]), &[]);
        assert_eq!(
            read_one(&bytes).unwrap_err().kind(),
            crate::vox::DecodeErrorKind::Structural
        );
    }

    #[test]
    fn main_with_content_is_rejected() {
        let bytes = VoxBuilder::chunk(b"MAIN", &[1, 2], &[]);
        assert_eq!(
            read_one(&bytes),
            Err(DecodeError::UnexpectedContent {
                chunk: ChunkTag::MAIN,
                len: 2
            })
        );
    }

    #[test]
    fn xyzi_truncated_samples() {
        let mut content = VoxBuilder::ints(&[2]);
        content.extend([1, 2, 3, 4, 5, 6]);
        let bytes = VoxBuilder::chunk(b"XYZI", &content, &[]);
        assert_eq!(
            read_one(&bytes),
            Err(DecodeError::Truncated {
                offset: 8,
                needed: 4,
                available: 2
            })
        );
    }

    #[test]
    fn rgba_reads_255_entries() {
        let content: Vec<u8> = (0..255u8).flat_map(|i| [i, i, i, 255]).collect();
        let bytes = VoxBuilder::chunk(b"RGBA", &content, &[]);
        let Ok(Chunk {
            content: ChunkContent::Rgba(palette),
            ..
        }) = read_one(&bytes)
        else {
            panic!("not a palette");
        };
        assert_eq!(palette.entries()[0], Color::opaque(0, 0, 0));
        assert_eq!(palette.entries()[254], Color::opaque(254, 254, 254));
        // Known quirk: the last slot is never read from the file.
        assert_eq!(palette.entries()[255], Color::TRANSPARENT);
    }

    #[test]
    fn rgba_accepts_full_256_entry_content() {
        let content: Vec<u8> = (0..=255u8).flat_map(|i| [i, 0, 0, 255]).collect();
        let bytes = VoxBuilder::chunk(b"RGBA", &content, &[]);
        let Ok(Chunk {
            content: ChunkContent::Rgba(palette),
            ..
        }) = read_one(&bytes)
        else {
            panic!("not a palette");
        };
        assert_eq!(palette.entries()[255], Color::TRANSPARENT);
    }

    #[test]
    fn matt_properties_follow_flag_bits() {
        let mut content = VoxBuilder::ints(&[7, 3]);
        content.extend(0.5f32.to_le_bytes());
        // roughness, IOR, and isTotalPower
        content.extend(0b1000_1010i32.to_le_bytes());
        content.extend(0.25f32.to_le_bytes());
        content.extend(1.5f32.to_le_bytes());
        let bytes = VoxBuilder::chunk(b"MATT", &content, &[]);
        assert_eq!(
            read_one(&bytes),
            Ok(Chunk {
                content: ChunkContent::Matt(MaterialRecord {
                    id: 7,
                    kind: 3,
                    weight: 0.5,
                    properties: BTreeMap::from([
                        (MaterialProperty::Roughness, 0.25),
                        (MaterialProperty::Ior, 1.5),
                    ]),
                    is_total_power: true,
                }),
                children: ChunkList::default(),
            })
        );
    }

    #[test]
    fn unknown_tag() {
        let bytes = VoxBuilder::chunk(b"nTRN", &[], &[]);
        assert_eq!(
            read_one(&bytes),
            Err(DecodeError::UnrecognizedChunk(ChunkTag(*b"nTRN")))
        );
    }

    #[test]
    fn nested_children() {
        let grandchild = VoxBuilder::chunk(b"PACK", &VoxBuilder::ints(&[2]), &[]);
        let child = VoxBuilder::chunk(b"MAIN", &[], &grandchild);
        let sibling = VoxBuilder::chunk(b"PACK", &VoxBuilder::ints(&[1]), &[]);
        let bytes = VoxBuilder::chunk(b"MAIN", &[], &[child, sibling].concat());
        assert_eq!(
            read_one(&bytes),
            Ok(Chunk {
                content: ChunkContent::Main,
                children: ChunkList::from(vec![
                    Chunk {
                        content: ChunkContent::Main,
                        children: ChunkList::from(vec![Chunk {
                            content: ChunkContent::Pack { model_count: 2 },
                            children: ChunkList::default(),
                        }]),
                    },
                    Chunk {
                        content: ChunkContent::Pack { model_count: 1 },
                        children: ChunkList::default(),
                    },
                ]),
            })
        );
    }

    #[test]
    fn deep_nesting_does_not_overflow_the_stack() {
        let depth: i32 = 100_000;
        let mut bytes = Vec::new();
        for level in 0..depth {
            let remaining = depth - level - 1;
            bytes.extend(b"MAIN");
            bytes.extend(0i32.to_le_bytes());
            bytes.extend((remaining * 12).to_le_bytes());
        }
        let root = read_one(&bytes).unwrap();

        let mut chunk = &root;
        let mut count = 1;
        while let Some(child) = chunk.children.0.first() {
            chunk = child;
            count += 1;
        }
        assert_eq!(count, depth);
        drop(root);
    }
}
