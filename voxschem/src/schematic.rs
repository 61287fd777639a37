//! The `.schematic` container: an NBT compound, gzip-compressed.
//!
//! Layout of the root compound, which is named `Schematic`:
//!
//! | Name           | Tag        | Contents                                  |
//! |----------------|------------|-------------------------------------------|
//! | `Width`        | Short      | size along x                              |
//! | `Length`       | Short      | size along z                              |
//! | `Height`       | Short      | size along y, the vertical axis           |
//! | `Materials`    | String     | `"Alpha"`                                 |
//! | `Blocks`       | Byte array | block ids in `(y * Length + z) * Width + x` order |
//! | `Data`         | Byte array | block metadata, in the same order         |
//! | `Entities`     | List       | empty                                     |
//! | `TileEntities` | List       | empty                                     |

use quartz_nbt::io::{Flavor, write_nbt};
use quartz_nbt::{NbtCompound, NbtList, NbtTag};

use crate::ExportError;
use crate::mapping::OutputArrays;
use crate::vox::GridExtent;

pub(crate) const ROOT_NAME: &str = "Schematic";
pub(crate) const MATERIALS: &str = "Alpha";

/// Largest number of cells a model may have to be exported.
///
/// This is the volume addressable by the 8-bit voxel coordinates of a `.vox` model, and
/// bounds the memory a small file can make the conversion allocate.
pub(crate) const MAX_VOLUME: usize = 256 * 256 * 256;

/// Dimensions of a schematic, as stored.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct SchematicSize {
    pub width: i16,
    pub length: i16,
    pub height: i16,
}

/// Checks that a model of size `extent` fits in a schematic.
///
/// This is done before any block arrays are allocated.
pub(crate) fn check_extent(
    extent: GridExtent,
    model_index: usize,
) -> Result<SchematicSize, ExportError> {
    let not_representable = |reason: String| ExportError::NotRepresentable {
        model_index,
        reason,
    };
    let dimension = |value: usize| {
        i16::try_from(value).map_err(|_| {
            not_representable(format!(
                "size {extent:?} exceeds the maximum of {max} in some axis",
                max = i16::MAX
            ))
        })
    };
    let size = SchematicSize {
        width: dimension(extent.width)?,
        length: dimension(extent.length)?,
        height: dimension(extent.height)?,
    };
    match extent.volume() {
        Some(volume) if volume <= MAX_VOLUME => Ok(size),
        _ => Err(not_representable(format!(
            "size {extent:?} has more than {MAX_VOLUME} cells"
        ))),
    }
}

/// Builds the NBT compound for one model's blocks.
pub(crate) fn to_nbt(arrays: &OutputArrays, model_index: usize) -> Result<NbtCompound, ExportError> {
    let SchematicSize {
        width,
        length,
        height,
    } = check_extent(arrays.extent(), model_index)?;

    let to_bytes = |values: &[i32], what: &str| -> Result<Vec<i8>, ExportError> {
        values
            .iter()
            .map(|&value| {
                u8::try_from(value)
                    .map(|byte| i8::from_ne_bytes([byte]))
                    .map_err(|_| ExportError::NotRepresentable {
                        model_index,
                        reason: format!("{what} {value} is not in the range 0 to 255"),
                    })
            })
            .collect()
    };

    let mut nbt = NbtCompound::new();
    nbt.insert("Width", NbtTag::Short(width));
    nbt.insert("Length", NbtTag::Short(length));
    nbt.insert("Height", NbtTag::Short(height));
    nbt.insert("Materials", NbtTag::String(MATERIALS.to_owned()));
    nbt.insert(
        "Blocks",
        NbtTag::ByteArray(to_bytes(arrays.block_ids(), "block id")?),
    );
    nbt.insert(
        "Data",
        NbtTag::ByteArray(to_bytes(arrays.block_meta(), "block metadata")?),
    );
    nbt.insert("Entities", NbtTag::List(NbtList::new()));
    nbt.insert("TileEntities", NbtTag::List(NbtList::new()));
    Ok(nbt)
}

/// Serializes a schematic compound to compressed bytes.
pub(crate) fn encode(nbt: &NbtCompound) -> Result<Vec<u8>, ExportError> {
    let mut bytes = Vec::new();
    write_nbt(&mut bytes, Some(ROOT_NAME), nbt, Flavor::GzCompressed)
        .map_err(ExportError::Encode)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use quartz_nbt::io::read_nbt;

    #[test]
    fn extent_limits() {
        assert_eq!(
            check_extent(GridExtent::new(32767, 1, 2), 0).unwrap(),
            SchematicSize {
                width: 32767,
                length: 1,
                height: 2
            }
        );
        assert!(matches!(
            check_extent(GridExtent::new(1, 32768, 1), 3),
            Err(ExportError::NotRepresentable { model_index: 3, .. })
        ));
        assert!(matches!(
            check_extent(GridExtent::new(2000, 2000, 2000), 0),
            Err(ExportError::NotRepresentable { .. })
        ));
    }

    #[test]
    fn volume_limit() {
        assert!(check_extent(GridExtent::new(256, 256, 256), 0).is_ok());
        assert!(check_extent(GridExtent::new(4096, 4096, 1), 0).is_ok());
        let error = check_extent(GridExtent::new(32767, 32767, 2), 0).unwrap_err();
        assert_eq!(
            error.to_string(),
            "model 0 cannot be exported: size GridExtent { width: 32767, length: 32767, height: 2 } \
            has more than 16777216 cells"
        );
    }

    #[test]
    fn encoded_layout() {
        let arrays = OutputArrays::from_parts(
            GridExtent::new(2, 1, 1),
            vec![35, 200],
            vec![14, 0],
        );
        let bytes = encode(&to_nbt(&arrays, 0).unwrap()).unwrap();
        // gzip magic number
        assert_eq!(bytes[..2], [0x1f_u8, 0x8b]);

        let (nbt, root_name) =
            read_nbt(&mut std::io::Cursor::new(bytes), Flavor::GzCompressed).unwrap();
        assert_eq!(root_name, "Schematic");
        assert_eq!(
            nbt.inner().keys().map(String::as_str).collect::<Vec<_>>(),
            [
                "Width",
                "Length",
                "Height",
                "Materials",
                "Blocks",
                "Data",
                "Entities",
                "TileEntities"
            ]
        );
        assert_eq!(nbt.get::<_, i16>("Width").unwrap(), 2);
        assert_eq!(nbt.get::<_, i16>("Length").unwrap(), 1);
        assert_eq!(nbt.get::<_, i16>("Height").unwrap(), 1);
        assert_eq!(nbt.get::<_, &str>("Materials").unwrap(), "Alpha");
        assert_eq!(nbt.get::<_, &[i8]>("Blocks").unwrap(), [35i8, -56]);
        assert_eq!(nbt.get::<_, &[i8]>("Data").unwrap(), [14i8, 0]);
        assert_eq!(nbt.get::<_, &NbtList>("Entities").unwrap().len(), 0);
        assert_eq!(nbt.get::<_, &NbtList>("TileEntities").unwrap().len(), 0);
    }

    #[test]
    fn encoding_is_deterministic() {
        let arrays = OutputArrays::from_parts(GridExtent::new(1, 2, 1), vec![1, 35], vec![0, 3]);
        let first = encode(&to_nbt(&arrays, 0).unwrap()).unwrap();
        let second = encode(&to_nbt(&arrays, 0).unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn block_id_out_of_range() {
        let arrays = OutputArrays::from_parts(GridExtent::new(1, 1, 1), vec![256], vec![0]);
        let error = to_nbt(&arrays, 1).unwrap_err();
        assert_eq!(
            error.to_string(),
            "model 1 cannot be exported: block id 256 is not in the range 0 to 255"
        );
    }

    #[test]
    fn negative_meta_out_of_range() {
        let arrays = OutputArrays::from_parts(GridExtent::new(1, 1, 1), vec![1], vec![-1]);
        assert!(matches!(
            to_nbt(&arrays, 0),
            Err(ExportError::NotRepresentable { .. })
        ));
    }
}
