//! Object placement records for ADT format.
//!
//! - **MDDF**: M2 model (doodad) placement referencing MMID/MMDX chunks
//! - **MODF**: WMO placement referencing MWID/MWMO chunks
//!
//! Both chunks are packed arrays of fixed-size records; cells reference
//! placements by their index in these arrays through MCRF.

use binrw::{BinRead, BinWrite};

use crate::record::FixedRecord;

/// M2 model placement (doodad) - 36 bytes per entry.
///
/// # Binary Layout
///
/// ```text
/// Offset | Size | Field     | Description
/// -------|------|-----------|------------------------------------------
/// 0x00   |  4   | nameId    | MMID entry index
/// 0x04   |  4   | uniqueId  | Unique identifier across loaded ADTs
/// 0x08   | 12   | position  | World coordinates (X, Y, Z)
/// 0x14   | 12   | rotation  | Rotation in degrees (X, Y, Z)
/// 0x20   |  2   | scale     | 1024 = 1.0 scale factor
/// 0x22   |  2   | flags     | MDDFFlags
/// ```
///
/// Reference: <https://wowdev.wiki/ADT/v18#MDDF_chunk>
#[derive(Debug, Clone, Copy, Default, PartialEq, BinRead, BinWrite)]
#[brw(little)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DoodadPlacement {
    /// Reference to MMID chunk entry (offset index into MMDX)
    pub name_id: u32,

    /// Unique identifier across all loaded ADT files
    pub unique_id: u32,

    /// World position [X, Y, Z] in WoW coordinates
    pub position: [f32; 3],

    /// Rotation angles in degrees [X, Y, Z]
    pub rotation: [f32; 3],

    /// Scale factor (1024 = 1.0)
    pub scale: u16,

    /// MDDFFlags bitfield
    pub flags: u16,
}

impl DoodadPlacement {
    /// `name_id` is a file data id rather than an MMID index.
    pub const FLAG_FILE_DATA_ID: u16 = 0x40;

    /// Placement of model `name_id` at `position` with unit scale.
    #[must_use]
    pub fn new(name_id: u32, unique_id: u32, position: [f32; 3]) -> Self {
        Self {
            name_id,
            unique_id,
            position,
            scale: 1024,
            ..Self::default()
        }
    }

    /// Convert scale to floating point (1024 = 1.0).
    #[must_use]
    pub fn scale_factor(&self) -> f32 {
        f32::from(self.scale) / 1024.0
    }

    /// Check if nameId is a file data ID instead of MMID offset (Legion+).
    #[must_use]
    pub fn uses_file_data_id(&self) -> bool {
        self.flags & Self::FLAG_FILE_DATA_ID != 0
    }
}

impl FixedRecord for DoodadPlacement {
    const SIZE: usize = 36;
}

/// WMO placement - 64 bytes per entry.
///
/// # Binary Layout
///
/// ```text
/// Offset | Size | Field       | Description
/// -------|------|-------------|------------------------------------------
/// 0x00   |  4   | nameId      | MWID entry index
/// 0x04   |  4   | uniqueId    | Unique identifier across loaded ADTs
/// 0x08   | 12   | position    | World coordinates (X, Y, Z)
/// 0x14   | 12   | rotation    | Rotation in degrees (X, Y, Z)
/// 0x20   | 12   | extentsMin  | Bounding box lower corner
/// 0x2C   | 12   | extentsMax  | Bounding box upper corner
/// 0x38   |  2   | flags       | MODFFlags
/// 0x3A   |  2   | doodadSet   | Doodad set index
/// 0x3C   |  2   | nameSet     | Name set index
/// 0x3E   |  2   | scale       | 1024 = 1.0 (Legion+, 0 before)
/// ```
///
/// Reference: <https://wowdev.wiki/ADT/v18#MODF_chunk>
#[derive(Debug, Clone, Copy, Default, PartialEq, BinRead, BinWrite)]
#[brw(little)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WmoPlacement {
    /// Reference to MWID chunk entry
    pub name_id: u32,

    /// Unique identifier across all loaded ADT files
    pub unique_id: u32,

    /// World position [X, Y, Z]
    pub position: [f32; 3],

    /// Rotation angles in degrees [X, Y, Z]
    pub rotation: [f32; 3],

    /// Bounding box minimum corner
    pub extents_min: [f32; 3],

    /// Bounding box maximum corner
    pub extents_max: [f32; 3],

    /// MODFFlags bitfield
    pub flags: u16,

    /// Doodad set index
    pub doodad_set: u16,

    /// Name set index
    pub name_set: u16,

    /// Scale factor (1024 = 1.0)
    pub scale: u16,
}

impl WmoPlacement {
    /// `name_id` is a file data id rather than an MWID index.
    pub const FLAG_FILE_DATA_ID: u16 = 0x8;

    /// Placement of object `name_id` at `position`.
    #[must_use]
    pub fn new(name_id: u32, unique_id: u32, position: [f32; 3]) -> Self {
        Self {
            name_id,
            unique_id,
            position,
            ..Self::default()
        }
    }

    /// Check if nameId is a file data ID instead of MWID index.
    #[must_use]
    pub fn uses_file_data_id(&self) -> bool {
        self.flags & Self::FLAG_FILE_DATA_ID != 0
    }
}

impl FixedRecord for WmoPlacement {
    const SIZE: usize = 64;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordTable;
    use pretty_assertions::assert_eq;

    #[test]
    fn doodad_layout() {
        let doodad = DoodadPlacement {
            name_id: 3,
            unique_id: 77,
            position: [1.0, 2.0, 3.0],
            rotation: [0.0, 90.0, 0.0],
            scale: 2048,
            flags: DoodadPlacement::FLAG_FILE_DATA_ID,
        };
        let mut out = Vec::new();
        doodad.encode_into(&mut out).unwrap();
        assert_eq!(out.len(), 36);
        assert_eq!(&out[32..36], &[0x00, 0x08, 0x40, 0x00]);
        assert_eq!(DoodadPlacement::decode(&out).unwrap(), doodad);
        assert_eq!(doodad.scale_factor(), 2.0);
        assert!(doodad.uses_file_data_id());
    }

    #[test]
    fn wmo_layout() {
        let mut wmo = WmoPlacement::new(1, 2, [10.0, 20.0, 30.0]);
        wmo.doodad_set = 5;
        wmo.flags = WmoPlacement::FLAG_FILE_DATA_ID;
        let mut out = Vec::new();
        wmo.encode_into(&mut out).unwrap();
        assert_eq!(out.len(), 64);
        assert_eq!(&out[0x3A..0x3C], &[5, 0]);
        assert!(WmoPlacement::decode(&out).unwrap().uses_file_data_id());
    }

    #[test]
    fn placement_tables() {
        let table = RecordTable::from_records(vec![
            DoodadPlacement::new(0, 1, [0.0; 3]),
            DoodadPlacement::new(1, 2, [5.0; 3]),
        ]);
        let bytes = table.encode().unwrap();
        assert_eq!(bytes.len(), 72);
        let back = RecordTable::<DoodadPlacement>::decode(&bytes).unwrap();
        assert_eq!(back.get(1).unwrap().unique_id, 2);
        assert_eq!(back.get(1).unwrap().scale, 1024);
    }
}
