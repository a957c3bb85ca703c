//! Terrain cells (MCNK) as held by a document.
//!
//! A cell is a container chunk: a 128-byte header followed by subchunks at
//! offsets relative to the start of the cell. Each subchunk the header points
//! at becomes its own mobile region, nested in the cell, so that growing one
//! of them moves its siblings, the following cells and every offset that
//! addresses them. Bytes between subchunks are carried through untouched.
//!
//! Texture layers after the first own an alpha map. Each map is a region
//! nested in MCAL, addressed by the `offset_in_mcal` field of its MCLY record.

use std::fmt;

use log::{debug, warn};

use crate::alpha::{AlphaEncoding, AlphaGrid, AlphaMap};
use crate::chunk_header::ChunkHeader;
use crate::chunk_id::ChunkId;
use crate::chunks::mcnk::mcse::decode_emitters;
use crate::chunks::mcnk::{
    CellField, LiquidChunk, MclyFlags, MclyLayer, McnkFlags, McnkHeader, McnrChunk, McrfChunk,
    McseChunk, McshChunk, McvtChunk, SoundEmitter, VertexColors,
};
use crate::chunks::simple::CELL_COUNT;
use crate::error::{AdtError, Result};
use crate::io_helpers::slice_at;
use crate::layout::{Canvas, Link, Part, RawRegion, SizeField, fill_gaps};
use crate::record::{FixedRecord, RecordTable};
use crate::relocation::{ChunkKey, Origin, Relocator};
use crate::version::AdtVersion;

/// Cells per row and per column of a tile.
pub const GRID_SIZE: usize = 16;

/// Position of a cell in the 16x16 grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellCoord {
    /// Row (0-15, north to south)
    pub row: usize,
    /// Column (0-15, west to east)
    pub col: usize,
}

impl CellCoord {
    /// Coordinate of row `row`, column `col`.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Row-major index (MCIN order).
    #[must_use]
    pub const fn index(self) -> usize {
        self.row * GRID_SIZE + self.col
    }

    /// Coordinate of row-major index `index`.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self {
            row: index / GRID_SIZE,
            col: index % GRID_SIZE,
        }
    }

    /// Every coordinate in row-major order.
    pub fn all() -> impl Iterator<Item = CellCoord> {
        (0..CELL_COUNT).map(Self::from_index)
    }

    pub(crate) fn checked_index(self) -> Result<usize> {
        if self.row >= GRID_SIZE || self.col >= GRID_SIZE {
            return Err(AdtError::CellOutOfRange {
                row: self.row,
                col: self.col,
            });
        }
        Ok(self.index())
    }
}

impl From<(usize, usize)> for CellCoord {
    fn from((row, col): (usize, usize)) -> Self {
        Self::new(row, col)
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Alpha map of a layer and the region it occupies in MCAL.
#[derive(Debug, Clone)]
pub(crate) struct MaskSlot {
    pub(crate) region: ChunkKey,
    pub(crate) map: AlphaMap,
}

/// One entry of a cell's texture layer stack.
#[derive(Debug, Clone)]
pub struct TextureLayer {
    pub(crate) texture_id: u32,
    pub(crate) flags: MclyFlags,
    pub(crate) effect_id: u32,
    pub(crate) offset: Link,
    pub(crate) mask: Option<MaskSlot>,
}

impl TextureLayer {
    /// Index into the texture filename table.
    #[must_use]
    pub fn texture_id(&self) -> u32 {
        self.texture_id
    }

    /// Blend flags.
    #[must_use]
    pub fn flags(&self) -> MclyFlags {
        self.flags
    }

    /// Ground effect id.
    #[must_use]
    pub fn effect_id(&self) -> u32 {
        self.effect_id
    }

    /// Change the ground effect id.
    pub fn set_effect_id(&mut self, effect_id: u32) {
        self.effect_id = effect_id;
    }

    /// Alpha map blending this layer over the ones below.
    #[must_use]
    pub fn alpha_map(&self) -> Option<&AlphaMap> {
        self.mask.as_ref().map(|mask| &mask.map)
    }

    fn record(&self, reloc: &Relocator) -> Result<MclyLayer> {
        Ok(MclyLayer {
            texture_id: self.texture_id,
            flags: self.flags,
            offset_in_mcal: self.offset.render(reloc)?,
            effect_id: self.effect_id,
        })
    }
}

/// Parsed MCLY: the layers plus bytes past the last counted record.
#[derive(Debug, Clone, Default)]
pub(crate) struct LayerStack {
    pub(crate) layers: Vec<TextureLayer>,
    pub(crate) trailing: Vec<u8>,
}

impl LayerStack {
    fn encode(&self, reloc: &Relocator) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.layers.len() * MclyLayer::SIZE + self.trailing.len());
        for layer in &self.layers {
            layer.record(reloc)?.encode_into(&mut out)?;
        }
        out.extend_from_slice(&self.trailing);
        Ok(out)
    }
}

/// One MCNK terrain cell.
#[derive(Debug, Clone)]
pub struct Cell {
    pub(crate) coord: CellCoord,
    pub(crate) key: ChunkKey,
    pub(crate) header: McnkHeader,
    pub(crate) links: [Link; CellField::ALL.len()],
    pub(crate) heights: Option<Part<McvtChunk>>,
    pub(crate) normals: Option<Part<McnrChunk>>,
    pub(crate) layers: Option<Part<LayerStack>>,
    pub(crate) refs: Option<Part<McrfChunk>>,
    /// MCAL; the data holds the bytes no alpha map claims.
    pub(crate) alpha: Option<Part<Vec<RawRegion>>>,
    pub(crate) shadow: Option<Part<McshChunk>>,
    pub(crate) sounds: Option<Part<McseChunk>>,
    pub(crate) liquid: Option<Part<LiquidChunk>>,
    pub(crate) colors: Option<Part<VertexColors>>,
    pub(crate) lighting: Option<Part<VertexColors>>,
    pub(crate) size_alpha: SizeField,
    pub(crate) size_shadow: SizeField,
    pub(crate) size_liquid: SizeField,
    pub(crate) gaps: Vec<RawRegion>,
}

/// Where a header offset found its subchunk.
#[derive(Debug, Clone, Copy)]
struct Located {
    address: u64,
    len: u64,
}

impl Located {
    fn data<'a>(&self, bytes: &'a [u8]) -> Result<&'a [u8]> {
        slice_at(
            bytes,
            self.address + ChunkHeader::SIZE,
            self.len - ChunkHeader::SIZE,
        )
    }
}

impl Cell {
    /// Parse the cell at `address` and register its regions.
    pub(crate) fn read(
        bytes: &[u8],
        reloc: &mut Relocator,
        coord: CellCoord,
        address: u64,
        version: AdtVersion,
        high_res_alpha: bool,
    ) -> Result<Self> {
        let chunk = ChunkHeader::expect_at(bytes, address, ChunkId::MCNK)?;
        let data = slice_at(bytes, address + ChunkHeader::SIZE, u64::from(chunk.size))?;
        if data.len() < McnkHeader::SIZE {
            return Err(AdtError::InvalidChunkSize {
                chunk: ChunkId::MCNK,
                expected: McnkHeader::SIZE,
                actual: data.len(),
            });
        }
        let header = McnkHeader::decode(data)?;
        let end = address + chunk.total_size();
        let body_start = address + ChunkHeader::SIZE + McnkHeader::SIZE as u64;
        let key = reloc.register_chunk(ChunkId::MCNK, address, chunk.total_size(), None);

        let hole_mask = version.has_high_res_holes() && header.flags.high_res_holes();
        let mut links = [Link::Absent; CellField::ALL.len()];
        let mut located: [Option<Located>; CellField::ALL.len()] = [None; CellField::ALL.len()];
        let mut claimed = Vec::new();

        for field in CellField::ALL {
            let value = field.read(&header);
            if hole_mask && matches!(field, CellField::Heights | CellField::Normals) {
                links[field.index()] = Link::Raw(value);
                continue;
            }
            if value == 0 {
                continue;
            }

            let target = address + u64::from(value);
            if target < body_start || target > end {
                warn!(
                    "cell {coord}: {} offset {value:#x} lies outside the cell",
                    field.chunk_id()
                );
                links[field.index()] = Link::Raw(value);
                continue;
            }

            let field_address = address + ChunkHeader::SIZE + field.header_offset();
            links[field.index()] = Link::Handle(reloc.register_offset(
                field_address,
                Origin::start_of(key),
                target,
            ));

            let Some(len) = locate(bytes, field, &header, target, end)? else {
                continue;
            };
            if claimed.iter().any(|&(at, _, _)| at == target) {
                warn!(
                    "cell {coord}: {} shares its offset with another subchunk",
                    field.chunk_id()
                );
                continue;
            }
            located[field.index()] = Some(Located {
                address: target,
                len,
            });
            claimed.push((target, len, field.chunk_id()));
        }
        debug!(
            "cell {coord} at {address:#x}: {} subchunks in {} bytes",
            claimed.len(),
            chunk.total_size()
        );

        let register = |reloc: &mut Relocator, field: CellField| {
            located[field.index()].map(|at| {
                let part_key = reloc.register_chunk(field.chunk_id(), at.address, at.len, Some(key));
                (part_key, at)
            })
        };

        let heights = match register(reloc, CellField::Heights) {
            Some((k, at)) => Some(Part::new(k, McvtChunk::decode(at.data(bytes)?)?)),
            None => None,
        };
        let normals = match register(reloc, CellField::Normals) {
            Some((k, at)) => Some(Part::new(k, McnrChunk::decode(at.data(bytes)?)?)),
            None => None,
        };
        let layer_records = match register(reloc, CellField::Layers) {
            Some((k, at)) => {
                let count = header.n_layers as usize;
                let data = at.data(bytes)?;
                let records = RecordTable::<MclyLayer>::decode_count(data, count).map_err(|_| {
                    AdtError::InvalidChunkSize {
                        chunk: ChunkId::MCLY,
                        expected: count * MclyLayer::SIZE,
                        actual: data.len(),
                    }
                })?;
                Some((k, records))
            }
            None => None,
        };
        let refs = match register(reloc, CellField::References) {
            Some((k, at)) => Some(Part::new(
                k,
                McrfChunk::decode(
                    at.data(bytes)?,
                    header.n_doodad_refs as usize,
                    header.n_map_obj_refs as usize,
                )?,
            )),
            None => None,
        };
        let alpha_key = register(reloc, CellField::AlphaMaps).map(|(k, _)| k);
        let shadow = match register(reloc, CellField::Shadow) {
            Some((k, at)) => Some(Part::new(k, McshChunk::new(at.data(bytes)?.to_vec()))),
            None => None,
        };
        let sounds = match register(reloc, CellField::SoundEmitters) {
            Some((k, at)) => Some(Part::new(
                k,
                decode_emitters(at.data(bytes)?, header.n_snd_emitters as usize)?,
            )),
            None => None,
        };
        let liquid = match register(reloc, CellField::Liquid) {
            Some((k, at)) => Some(Part::new(
                k,
                LiquidChunk::new(slice_at(bytes, at.address, at.len)?.to_vec()),
            )),
            None => None,
        };
        let colors = match register(reloc, CellField::VertexColors) {
            Some((k, at)) => Some(Part::new(
                k,
                VertexColors::decode(ChunkId::MCCV, at.data(bytes)?)?,
            )),
            None => None,
        };
        let lighting = match register(reloc, CellField::VertexLighting) {
            Some((k, at)) => Some(Part::new(
                k,
                VertexColors::decode(ChunkId::MCLV, at.data(bytes)?)?,
            )),
            None => None,
        };

        let do_not_fix = header.flags.do_not_fix_alpha_map();
        let mut mask_claims = Vec::new();
        let layers = match layer_records {
            Some((layer_key, records)) => {
                let records_start = reloc.data_start(layer_key);
                let mut layers = Vec::with_capacity(records.len());
                for (index, record) in records.iter().enumerate() {
                    let mut layer = TextureLayer {
                        texture_id: record.texture_id,
                        flags: record.flags,
                        effect_id: record.effect_id,
                        offset: Link::Raw(record.offset_in_mcal),
                        mask: None,
                    };
                    if index > 0 && record.flags.use_alpha_map() {
                        let Some(alpha_key) = alpha_key else {
                            return Err(AdtError::ChunkParseError {
                                chunk: ChunkId::MCAL,
                                offset: address,
                                details: format!(
                                    "layer {index} of cell {coord} uses an alpha map but the cell has no MCAL"
                                ),
                            });
                        };
                        let field = records_start
                            + records.offset_of(index)
                            + MclyLayer::OFFSET_FIELD;
                        let encoding = AlphaEncoding::select(
                            high_res_alpha,
                            record.flags.alpha_map_compressed(),
                            do_not_fix,
                        );
                        let (mask, link) =
                            read_mask(bytes, reloc, alpha_key, field, record.offset_in_mcal, encoding)
                                .map_err(|err| AdtError::ChunkParseError {
                                    chunk: ChunkId::MCAL,
                                    offset: reloc.data_start(alpha_key),
                                    details: format!("alpha map of layer {index} in cell {coord}: {err}"),
                                })?;
                        mask_claims.push((
                            reloc.address(mask.region),
                            mask.map.encoded_len(),
                            ChunkId::MCAL,
                        ));
                        layer.offset = link;
                        layer.mask = Some(mask);
                    }
                    layers.push(layer);
                }
                Some(Part::new(
                    layer_key,
                    LayerStack {
                        layers,
                        trailing: records.trailing().to_vec(),
                    },
                ))
            }
            None => None,
        };

        let alpha = match alpha_key {
            Some(alpha_key) => {
                let gaps = fill_gaps(
                    reloc,
                    bytes,
                    reloc.data_start(alpha_key),
                    reloc.end(alpha_key),
                    &mut mask_claims,
                    Some(alpha_key),
                )?;
                Some(Part::new(alpha_key, gaps))
            }
            None => None,
        };
        let gaps = fill_gaps(reloc, bytes, body_start, end, &mut claimed, Some(key))?;

        let size_of = |part: Option<ChunkKey>, stored: u32, reloc: &Relocator| match part {
            Some(k) => SizeField::detect(stored, reloc.chunk(k).len - ChunkHeader::SIZE),
            None => SizeField::Raw(stored),
        };
        let size_alpha = size_of(alpha.as_ref().map(|p| p.key), header.size_alpha, &*reloc);
        let size_shadow = size_of(shadow.as_ref().map(|p| p.key), header.size_shadow, &*reloc);
        let size_liquid = size_of(liquid.as_ref().map(|p| p.key), header.size_liquid, &*reloc);

        Ok(Self {
            coord,
            key,
            header,
            links,
            heights,
            normals,
            layers,
            refs,
            alpha,
            shadow,
            sounds,
            liquid,
            colors,
            lighting,
            size_alpha,
            size_shadow,
            size_liquid,
            gaps,
        })
    }

    /// Place the cell and everything nested in it on `canvas`.
    pub(crate) fn write(&self, reloc: &Relocator, canvas: &mut Canvas) -> Result<()> {
        let mut header = self.header;
        if let Some(layers) = &self.layers {
            header.n_layers = layers.data.layers.len() as u32;
        }
        if let Some(refs) = &self.refs {
            header.n_doodad_refs = refs.data.doodad_refs.len() as u32;
            header.n_map_obj_refs = refs.data.object_refs.len() as u32;
        }
        if let Some(sounds) = &self.sounds {
            header.n_snd_emitters = sounds.data.len() as u32;
        }
        for field in CellField::ALL {
            field.write(&mut header, self.links[field.index()].render(reloc)?);
        }
        if let Some(alpha) = &self.alpha {
            header.size_alpha = self.size_alpha.render(reloc.chunk(alpha.key).len);
        }
        if let Some(shadow) = &self.shadow {
            header.size_shadow = self.size_shadow.render(reloc.chunk(shadow.key).len);
        }
        if let Some(liquid) = &self.liquid {
            header.size_liquid = self.size_liquid.render(reloc.chunk(liquid.key).len);
        }

        let mut body = Vec::with_capacity(McnkHeader::SIZE);
        header.encode_into(&mut body)?;
        canvas.put_container(reloc, ChunkId::MCNK, self.key, &body)?;

        if let Some(part) = &self.heights {
            canvas.put_part(reloc, ChunkId::MCVT, part.key, &part.data.encode()?)?;
        }
        if let Some(part) = &self.normals {
            canvas.put_part(reloc, ChunkId::MCNR, part.key, &part.data.encode()?)?;
        }
        if let Some(part) = &self.layers {
            canvas.put_part(reloc, ChunkId::MCLY, part.key, &part.data.encode(reloc)?)?;
        }
        if let Some(part) = &self.refs {
            canvas.put_part(reloc, ChunkId::MCRF, part.key, &part.data.encode())?;
        }
        if let Some(part) = &self.alpha {
            canvas.put_container(reloc, ChunkId::MCAL, part.key, &[])?;
            for layer in self.layers() {
                if let Some(mask) = &layer.mask {
                    let address = reloc.address(mask.region);
                    debug_assert_eq!(layer.offset.key().map(|k| reloc.target(k)), Some(address));
                    canvas.put(ChunkId::MCAL, address, mask.map.encoded())?;
                }
            }
            canvas.put_raw(reloc, &part.data)?;
        }
        if let Some(part) = &self.shadow {
            canvas.put_part(reloc, ChunkId::MCSH, part.key, part.data.bytes())?;
        }
        if let Some(part) = &self.sounds {
            canvas.put_part(reloc, ChunkId::MCSE, part.key, &part.data.encode()?)?;
        }
        if let Some(part) = &self.liquid {
            canvas.put(ChunkId::MCLQ, reloc.address(part.key), part.data.bytes())?;
        }
        if let Some(part) = &self.colors {
            canvas.put_part(reloc, ChunkId::MCCV, part.key, &part.data.encode()?)?;
        }
        if let Some(part) = &self.lighting {
            canvas.put_part(reloc, ChunkId::MCLV, part.key, &part.data.encode()?)?;
        }
        canvas.put_raw(reloc, &self.gaps)
    }

    /// Grid position.
    #[must_use]
    pub fn coord(&self) -> CellCoord {
        self.coord
    }

    /// Row in the grid.
    #[must_use]
    pub fn row(&self) -> usize {
        self.coord.row
    }

    /// Column in the grid.
    #[must_use]
    pub fn col(&self) -> usize {
        self.coord.col
    }

    /// Header as read. Counts, offsets and sizes are recomputed on write.
    #[must_use]
    pub fn header(&self) -> &McnkHeader {
        &self.header
    }

    /// Cell flags.
    #[must_use]
    pub fn flags(&self) -> McnkFlags {
        self.header.flags
    }

    /// AreaTable id.
    #[must_use]
    pub fn area_id(&self) -> u32 {
        self.header.area_id
    }

    /// Change the AreaTable id.
    pub fn set_area_id(&mut self, area_id: u32) {
        self.header.area_id = area_id;
    }

    /// Low resolution hole mask (4x4 bits).
    #[must_use]
    pub fn holes(&self) -> u16 {
        self.header.holes
    }

    /// Change the low resolution hole mask.
    pub fn set_holes(&mut self, holes: u16) {
        self.header.holes = holes;
    }

    /// 64-bit hole mask stored in place of the height and normal offsets.
    #[must_use]
    pub fn high_res_holes(&self) -> Option<u64> {
        match (self.links[CellField::Heights.index()], self.links[CellField::Normals.index()]) {
            (Link::Raw(low), Link::Raw(high)) if self.header.flags.high_res_holes() => {
                Some(u64::from(low) | (u64::from(high) << 32))
            }
            _ => None,
        }
    }

    /// World position of the cell corner.
    #[must_use]
    pub fn position(&self) -> [f32; 3] {
        self.header.position
    }

    /// Move the cell corner.
    pub fn set_position(&mut self, position: [f32; 3]) {
        self.header.position = position;
    }

    /// Height map.
    #[must_use]
    pub fn heights(&self) -> Option<&McvtChunk> {
        self.heights.as_ref().map(|p| &p.data)
    }

    /// Mutable height map.
    pub fn heights_mut(&mut self) -> Option<&mut McvtChunk> {
        self.heights.as_mut().map(|p| &mut p.data)
    }

    /// Vertex normals.
    #[must_use]
    pub fn normals(&self) -> Option<&McnrChunk> {
        self.normals.as_ref().map(|p| &p.data)
    }

    /// Mutable vertex normals.
    pub fn normals_mut(&mut self) -> Option<&mut McnrChunk> {
        self.normals.as_mut().map(|p| &mut p.data)
    }

    /// Texture layers, base layer first.
    #[must_use]
    pub fn layers(&self) -> &[TextureLayer] {
        self.layers
            .as_ref()
            .map_or(&[] as &[TextureLayer], |p| p.data.layers.as_slice())
    }

    /// Mutable texture layers; the stack itself is edited through the document.
    pub fn layers_mut(&mut self) -> &mut [TextureLayer] {
        match self.layers.as_mut() {
            Some(part) => part.data.layers.as_mut_slice(),
            None => &mut [],
        }
    }

    /// MDDF indices referenced by the cell.
    #[must_use]
    pub fn doodad_refs(&self) -> &[u32] {
        self.refs.as_ref().map_or(&[] as &[u32], |p| p.data.doodad_refs())
    }

    /// MODF indices referenced by the cell.
    #[must_use]
    pub fn object_refs(&self) -> &[u32] {
        self.refs.as_ref().map_or(&[] as &[u32], |p| p.data.object_refs())
    }

    /// Baked shadow map.
    #[must_use]
    pub fn shadow(&self) -> Option<&McshChunk> {
        self.shadow.as_ref().map(|p| &p.data)
    }

    /// Mutable shadow map.
    pub fn shadow_mut(&mut self) -> Option<&mut McshChunk> {
        self.shadow.as_mut().map(|p| &mut p.data)
    }

    /// Sound emitters.
    #[must_use]
    pub fn sound_emitters(&self) -> &[SoundEmitter] {
        self.sounds
            .as_ref()
            .map_or(&[] as &[SoundEmitter], |p| p.data.as_slice())
    }

    /// Mutable sound emitters.
    pub fn sound_emitters_mut(&mut self) -> &mut [SoundEmitter] {
        match self.sounds.as_mut() {
            Some(part) => part.data.as_mut_slice(),
            None => &mut [],
        }
    }

    /// Legacy liquid, carried opaquely.
    #[must_use]
    pub fn liquid(&self) -> Option<&LiquidChunk> {
        self.liquid.as_ref().map(|p| &p.data)
    }

    /// Vertex colors (MCCV).
    #[must_use]
    pub fn vertex_colors(&self) -> Option<&VertexColors> {
        self.colors.as_ref().map(|p| &p.data)
    }

    /// Mutable vertex colors.
    pub fn vertex_colors_mut(&mut self) -> Option<&mut VertexColors> {
        self.colors.as_mut().map(|p| &mut p.data)
    }

    /// Vertex lighting (MCLV).
    #[must_use]
    pub fn vertex_lighting(&self) -> Option<&VertexColors> {
        self.lighting.as_ref().map(|p| &p.data)
    }

    /// Whether the subchunk behind `field` was parsed.
    #[must_use]
    pub fn has_subchunk(&self, field: CellField) -> bool {
        match field {
            CellField::Heights => self.heights.is_some(),
            CellField::Normals => self.normals.is_some(),
            CellField::Layers => self.layers.is_some(),
            CellField::References => self.refs.is_some(),
            CellField::AlphaMaps => self.alpha.is_some(),
            CellField::Shadow => self.shadow.is_some(),
            CellField::SoundEmitters => self.sounds.is_some(),
            CellField::Liquid => self.liquid.is_some(),
            CellField::VertexColors => self.colors.is_some(),
            CellField::VertexLighting => self.lighting.is_some(),
        }
    }

    /// Encoding a mask with `flags` would use in this cell.
    pub(crate) fn mask_encoding(&self, flags: MclyFlags, high_res_alpha: bool) -> AlphaEncoding {
        AlphaEncoding::select(
            high_res_alpha,
            flags.alpha_map_compressed(),
            self.header.flags.do_not_fix_alpha_map(),
        )
    }

    /// Append an empty subchunk at the end of the cell and point `field` at it.
    fn attach(&mut self, reloc: &mut Relocator, field: CellField) -> ChunkKey {
        let position = reloc.end(self.key);
        reloc.grow(self.key, position, ChunkHeader::SIZE);
        let part = reloc.register_chunk(
            field.chunk_id(),
            position,
            ChunkHeader::SIZE,
            Some(self.key),
        );
        let field_address = reloc.address(self.key) + ChunkHeader::SIZE + field.header_offset();
        self.links[field.index()].retarget(
            reloc,
            field_address,
            Origin::start_of(self.key),
            position,
        );
        debug!("cell {}: created {} at {position:#x}", self.coord, field.chunk_id());
        part
    }

    fn ensure_refs(&mut self, reloc: &mut Relocator) -> ChunkKey {
        match &self.refs {
            Some(part) => part.key,
            None => {
                let key = self.attach(reloc, CellField::References);
                self.refs = Some(Part::new(key, McrfChunk::default()));
                key
            }
        }
    }

    fn ensure_layers(&mut self, reloc: &mut Relocator) -> ChunkKey {
        match &self.layers {
            Some(part) => part.key,
            None => {
                let key = self.attach(reloc, CellField::Layers);
                self.layers = Some(Part::new(key, LayerStack::default()));
                key
            }
        }
    }

    fn ensure_alpha(&mut self, reloc: &mut Relocator) -> ChunkKey {
        match &self.alpha {
            Some(part) => part.key,
            None => {
                let key = self.attach(reloc, CellField::AlphaMaps);
                self.alpha = Some(Part::new(key, Vec::new()));
                self.size_alpha = SizeField::Derived {
                    includes_header: true,
                };
                key
            }
        }
    }

    /// Append `index` to the doodad reference list.
    pub(crate) fn add_doodad_ref(&mut self, reloc: &mut Relocator, index: u32) {
        let key = self.ensure_refs(reloc);
        if let Some(refs) = self.refs.as_mut() {
            let position = reloc.data_start(key) + refs.data.doodad_offset(refs.data.doodad_refs.len());
            reloc.grow(key, position, 4);
            refs.data.doodad_refs.push(index);
        }
    }

    /// Append `index` to the object reference list.
    pub(crate) fn add_object_ref(&mut self, reloc: &mut Relocator, index: u32) {
        let key = self.ensure_refs(reloc);
        if let Some(refs) = self.refs.as_mut() {
            let position = reloc.data_start(key) + refs.data.object_offset(refs.data.object_refs.len());
            reloc.grow(key, position, 4);
            refs.data.object_refs.push(index);
        }
    }

    /// Strip every reference to doodad `index` and renumber the later ones.
    pub(crate) fn remove_doodad_ref(&mut self, reloc: &mut Relocator, index: u32) {
        let Some(refs) = self.refs.as_mut() else {
            return;
        };
        for slot in (0..refs.data.doodad_refs.len()).rev() {
            if refs.data.doodad_refs[slot] == index {
                let position = reloc.data_start(refs.key) + refs.data.doodad_offset(slot);
                refs.data.doodad_refs.remove(slot);
                reloc.shrink(refs.key, position, 4);
            }
        }
        for value in &mut refs.data.doodad_refs {
            if *value > index {
                *value -= 1;
            }
        }
    }

    /// Strip every reference to object `index` and renumber the later ones.
    pub(crate) fn remove_object_ref(&mut self, reloc: &mut Relocator, index: u32) {
        let Some(refs) = self.refs.as_mut() else {
            return;
        };
        for slot in (0..refs.data.object_refs.len()).rev() {
            if refs.data.object_refs[slot] == index {
                let position = reloc.data_start(refs.key) + refs.data.object_offset(slot);
                refs.data.object_refs.remove(slot);
                reloc.shrink(refs.key, position, 4);
            }
        }
        for value in &mut refs.data.object_refs {
            if *value > index {
                *value -= 1;
            }
        }
    }

    /// Shift texture ids after a removed texture down by one.
    pub(crate) fn renumber_textures(&mut self, removed: u32) {
        for layer in self.layers_mut() {
            if layer.texture_id > removed {
                layer.texture_id -= 1;
            }
        }
    }

    /// Append a layer; arguments have been validated by the caller.
    pub(crate) fn push_layer(
        &mut self,
        reloc: &mut Relocator,
        texture_id: u32,
        flags: MclyFlags,
        effect_id: u32,
        alpha: Option<AlphaGrid>,
        high_res_alpha: bool,
    ) -> usize {
        let layers_key = self.ensure_layers(reloc);
        let index = self.layers().len();
        let flags = if index == 0 {
            flags.without_alpha()
        } else if high_res_alpha {
            MclyFlags::new(flags.value | MclyFlags::USE_ALPHA_MAP)
        } else {
            MclyFlags::new(
                (flags.value | MclyFlags::USE_ALPHA_MAP) & !MclyFlags::ALPHA_MAP_COMPRESSED,
            )
        };

        let position = reloc.data_start(layers_key) + (index * MclyLayer::SIZE) as u64;
        reloc.grow(layers_key, position, MclyLayer::SIZE as u64);
        let layer = TextureLayer {
            texture_id,
            flags,
            effect_id,
            offset: Link::Raw(0),
            mask: None,
        };
        if let Some(part) = self.layers.as_mut() {
            part.data.layers.push(layer);
        }

        if index > 0 {
            let grid = alpha.unwrap_or_default();
            let map = AlphaMap::new(grid, self.mask_encoding(flags, high_res_alpha));
            self.append_mask(reloc, index, map);
        }
        index
    }

    /// Give layer `index` a mask at the end of MCAL.
    fn append_mask(&mut self, reloc: &mut Relocator, index: usize, map: AlphaMap) {
        let alpha_key = self.ensure_alpha(reloc);
        let Some(layers) = self.layers.as_mut() else {
            return;
        };
        let position = reloc.end(alpha_key);
        reloc.grow(alpha_key, position, map.encoded_len());
        let region = reloc.register_chunk(ChunkId::RAW, position, map.encoded_len(), Some(alpha_key));
        let field = reloc.data_start(layers.key)
            + (index * MclyLayer::SIZE) as u64
            + MclyLayer::OFFSET_FIELD;
        let layer = &mut layers.data.layers[index];
        layer
            .offset
            .retarget(reloc, field, Origin::data_of(alpha_key), position);
        layer.mask = Some(MaskSlot { region, map });
    }

    /// Drop the mask of layer `index`, leaving the layer without one.
    fn remove_mask(&mut self, reloc: &mut Relocator, index: usize) {
        let (Some(layers), Some(alpha)) = (self.layers.as_mut(), self.alpha.as_ref()) else {
            return;
        };
        let layer = &mut layers.data.layers[index];
        let Some(mask) = layer.mask.take() else {
            return;
        };
        layer.offset.clear(reloc);
        let region = reloc.release_chunk(mask.region);
        reloc.shrink(alpha.key, region.address, region.len);
    }

    /// Remove layer `index`; the caller has checked that it exists.
    pub(crate) fn remove_layer(&mut self, reloc: &mut Relocator, index: usize) {
        let count = self.layers().len();
        if index == 0 && count > 1 {
            self.remove_mask(reloc, 1);
            if let Some(next) = self.layers_mut().get_mut(1) {
                next.flags = next.flags.without_alpha();
                next.offset = Link::Raw(0);
            }
        } else {
            self.remove_mask(reloc, index);
        }

        let Some(layers) = self.layers.as_mut() else {
            return;
        };
        let mut removed = layers.data.layers.remove(index);
        removed.offset.clear(reloc);
        let position = reloc.data_start(layers.key) + (index * MclyLayer::SIZE) as u64;
        reloc.shrink(layers.key, position, MclyLayer::SIZE as u64);
    }

    /// Swap the mask of layer `index` for `map`, resizing its region.
    pub(crate) fn replace_mask(&mut self, reloc: &mut Relocator, index: usize, map: AlphaMap) {
        let Some(mask) = self
            .layers
            .as_mut()
            .and_then(|p| p.data.layers.get_mut(index))
            .and_then(|layer| layer.mask.as_mut())
        else {
            return;
        };
        let address = reloc.address(mask.region);
        let old_len = mask.map.encoded_len();
        let new_len = map.encoded_len();
        if new_len > old_len {
            reloc.grow(mask.region, address + old_len, new_len - old_len);
        } else if new_len < old_len {
            reloc.shrink(mask.region, address + new_len, old_len - new_len);
        }
        mask.map = map;
    }

    /// Re-encode every mask whose encoding no longer matches its flags.
    pub(crate) fn reencode_masks(&mut self, reloc: &mut Relocator, high_res_alpha: bool) {
        for index in 0..self.layers().len() {
            let layer = &self.layers()[index];
            let Some(map) = layer.alpha_map() else {
                continue;
            };
            let encoding = self.mask_encoding(layer.flags, high_res_alpha);
            if map.encoding() != encoding {
                let map = map.reencoded(encoding);
                self.replace_mask(reloc, index, map);
            }
        }
    }

    /// Apply blend flags to layer `index`; alpha bits follow the mask.
    pub(crate) fn set_layer_flags(
        &mut self,
        reloc: &mut Relocator,
        index: usize,
        flags: MclyFlags,
        high_res_alpha: bool,
    ) {
        let Some(layer) = self.layers_mut().get_mut(index) else {
            return;
        };
        layer.flags = if layer.mask.is_none() {
            flags.without_alpha()
        } else if high_res_alpha {
            MclyFlags::new(flags.value | MclyFlags::USE_ALPHA_MAP)
        } else {
            MclyFlags::new(
                (flags.value | MclyFlags::USE_ALPHA_MAP) & !MclyFlags::ALPHA_MAP_COMPRESSED,
            )
        };
        self.reencode_masks(reloc, high_res_alpha);
    }

    /// Replace the cell flags, keeping the bit that changes the header layout.
    pub(crate) fn set_flags(&mut self, reloc: &mut Relocator, flags: McnkFlags, high_res_alpha: bool) {
        let kept = self.header.flags.value & McnkFlags::HIGH_RES_HOLES;
        self.header.flags =
            McnkFlags { value: (flags.value & !McnkFlags::HIGH_RES_HOLES) | kept };
        self.reencode_masks(reloc, high_res_alpha);
    }
}

/// Size of the subchunk `field` points at, if one is there.
fn locate(
    bytes: &[u8],
    field: CellField,
    header: &McnkHeader,
    target: u64,
    end: u64,
) -> Result<Option<u64>> {
    if target + ChunkHeader::SIZE > end {
        return Ok(None);
    }
    let sub = ChunkHeader::read_at(bytes, target)?;
    if !sub.is_chunk(field.chunk_id()) {
        warn!(
            "expected {} at {target:#x}, found {}; keeping the bytes as they are",
            field.chunk_id(),
            sub.id
        );
        return Ok(None);
    }
    let len = if field == CellField::Liquid && header.size_liquid >= ChunkHeader::SIZE as u32 {
        u64::from(header.size_liquid)
    } else {
        sub.total_size()
    };
    if target + len > end {
        return Err(AdtError::TruncatedChunk {
            chunk: sub.id,
            offset: target,
            declared: sub.size,
            available: end.saturating_sub(target + ChunkHeader::SIZE),
        });
    }
    Ok(Some(len))
}

fn read_mask(
    bytes: &[u8],
    reloc: &mut Relocator,
    alpha_key: ChunkKey,
    field: u64,
    offset: u32,
    encoding: AlphaEncoding,
) -> Result<(MaskSlot, Link)> {
    let start = reloc.data_start(alpha_key);
    let end = reloc.end(alpha_key);
    let address = start + u64::from(offset);
    if address >= end {
        return Err(AdtError::InvalidSubchunkOffset {
            parent: ChunkId::MCAL,
            offset,
            chunk_size: (end - start) as u32,
        });
    }
    let map = AlphaMap::decode(slice_at(bytes, address, end - address)?, encoding)?;
    let region = reloc.register_chunk(ChunkId::RAW, address, map.encoded_len(), Some(alpha_key));
    let link = Link::Handle(reloc.register_offset(field, Origin::data_of(alpha_key), address));
    Ok((MaskSlot { region, map }, link))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alpha::encode;
    use crate::io_helpers::write_u32_array;
    use pretty_assertions::assert_eq;

    const TRAILER: [u8; 4] = [1, 2, 3, 4];

    /// A cell at `address` with heights, two layers, one low resolution
    /// alpha map and four trailing bytes.
    fn sample_cell(address: u64) -> Vec<u8> {
        let mut header = McnkHeader {
            flags: McnkFlags {
                value: McnkFlags::DO_NOT_FIX_ALPHA_MAP,
            },
            n_layers: 2,
            ofs_height: 136,
            ofs_layer: 724,
            ofs_alpha: 764,
            size_alpha: 8 + 2048,
            area_id: 12,
            ..McnkHeader::default()
        };
        header.position = [1.0, 2.0, 3.0];

        let mut body = Vec::new();
        header.encode_into(&mut body).unwrap();

        body.extend_from_slice(&ChunkHeader::new(ChunkId::MCVT, 580).to_bytes());
        for i in 0..145 {
            body.extend_from_slice(&(i as f32).to_le_bytes());
        }

        body.extend_from_slice(&ChunkHeader::new(ChunkId::MCLY, 32).to_bytes());
        write_u32_array(&mut body, [0, 0, 0, 0]);
        write_u32_array(&mut body, [1, MclyFlags::USE_ALPHA_MAP, 0, 7]);

        body.extend_from_slice(&ChunkHeader::new(ChunkId::MCAL, 2048).to_bytes());
        body.extend_from_slice(&encode(&AlphaGrid::filled(170), AlphaEncoding::LowRes));
        body.extend_from_slice(&TRAILER);

        let mut bytes = vec![0xEE; address as usize];
        bytes.extend_from_slice(&ChunkHeader::new(ChunkId::MCNK, body.len() as u32).to_bytes());
        bytes.extend_from_slice(&body);
        bytes
    }

    fn read(bytes: &[u8], address: u64) -> (Relocator, Cell) {
        let mut reloc = Relocator::new();
        let cell = Cell::read(
            bytes,
            &mut reloc,
            CellCoord::new(2, 3),
            address,
            AdtVersion::WotLK,
            false,
        )
        .unwrap();
        (reloc, cell)
    }

    fn write(reloc: &Relocator, cell: &Cell, prefix: &[u8]) -> Vec<u8> {
        let mut canvas = Canvas::new(reloc.extent()).unwrap();
        canvas.put(ChunkId::RAW, 0, prefix).unwrap();
        cell.write(reloc, &mut canvas).unwrap();
        canvas.finish().unwrap()
    }

    #[test]
    fn reads_subchunks_and_masks() {
        let bytes = sample_cell(16);
        let (reloc, cell) = read(&bytes, 16);

        assert_eq!(cell.area_id(), 12);
        assert_eq!(cell.heights().unwrap().heights()[144], 144.0);
        assert!(cell.has_subchunk(CellField::AlphaMaps));
        assert!(!cell.has_subchunk(CellField::References));
        assert_eq!(cell.layers().len(), 2);
        assert!(cell.layers()[0].alpha_map().is_none());

        let mask = cell.layers()[1].alpha_map().unwrap();
        assert_eq!(mask.encoding(), AlphaEncoding::LowRes);
        assert_eq!(mask.grid().get(63, 63), 170);
        assert_eq!(cell.layers()[1].effect_id(), 7);
        assert_eq!(cell.gaps.len(), 1);
        assert_eq!(reloc.extent(), bytes.len() as u64);
    }

    #[test]
    fn untouched_cell_round_trips() {
        let bytes = sample_cell(16);
        let (reloc, cell) = read(&bytes, 16);
        assert_eq!(write(&reloc, &cell, &bytes[..16]), bytes);
    }

    #[test]
    fn adding_a_layer_appends_its_mask() {
        let bytes = sample_cell(16);
        let (mut reloc, mut cell) = read(&bytes, 16);

        let index = cell.push_layer(
            &mut reloc,
            0,
            MclyFlags::new(MclyFlags::ALPHA_MAP_COMPRESSED),
            0,
            Some(AlphaGrid::filled(255)),
            false,
        );
        assert_eq!(index, 2);
        let layer = &cell.layers()[2];
        assert!(layer.flags().use_alpha_map());
        assert!(!layer.flags().alpha_map_compressed());

        let out = write(&reloc, &cell, &bytes[..16]);
        assert_eq!(out.len(), bytes.len() + 16 + 2048);

        let (_, reread) = read(&out, 16);
        assert_eq!(reread.layers().len(), 3);
        assert_eq!(reread.layers()[2].alpha_map().unwrap().grid().get(0, 0), 255);
        assert_eq!(reread.layers()[1].alpha_map().unwrap().grid().get(0, 0), 170);
        assert_eq!(reread.header.size_alpha, 8 + 2 * 2048);
        assert!(reread.alpha.as_ref().unwrap().data.is_empty());
        assert_eq!(reread.gaps.len(), 1);
    }

    #[test]
    fn removing_the_base_layer_promotes_the_next() {
        let bytes = sample_cell(16);
        let (mut reloc, mut cell) = read(&bytes, 16);

        cell.remove_layer(&mut reloc, 0);
        assert_eq!(cell.layers().len(), 1);
        assert_eq!(cell.layers()[0].texture_id(), 1);
        assert!(!cell.layers()[0].flags().use_alpha_map());
        assert!(cell.layers()[0].alpha_map().is_none());

        let out = write(&reloc, &cell, &bytes[..16]);
        assert_eq!(out.len(), bytes.len() - 16 - 2048);
        let (_, reread) = read(&out, 16);
        assert_eq!(reread.layers().len(), 1);
        assert_eq!(reread.header.size_alpha, 8);
    }

    #[test]
    fn references_are_created_on_demand() {
        let bytes = sample_cell(16);
        let (mut reloc, mut cell) = read(&bytes, 16);

        cell.add_doodad_ref(&mut reloc, 5);
        cell.add_object_ref(&mut reloc, 1);
        cell.add_doodad_ref(&mut reloc, 9);
        assert_eq!(cell.doodad_refs(), &[5, 9]);
        assert_eq!(cell.object_refs(), &[1]);

        let out = write(&reloc, &cell, &bytes[..16]);
        let (mut reloc, mut reread) = read(&out, 16);
        assert_eq!(reread.doodad_refs(), &[5, 9]);
        assert_eq!(reread.object_refs(), &[1]);

        reread.remove_doodad_ref(&mut reloc, 5);
        assert_eq!(reread.doodad_refs(), &[8]);
    }

    #[test]
    fn mask_without_alpha_chunk_is_a_format_error() {
        let mut bytes = sample_cell(0);
        // Drop the MCAL offset.
        bytes[8 + 0x24..8 + 0x28].copy_from_slice(&0u32.to_le_bytes());
        let mut reloc = Relocator::new();
        let err = Cell::read(
            &bytes,
            &mut reloc,
            CellCoord::new(0, 0),
            0,
            AdtVersion::WotLK,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, AdtError::ChunkParseError { chunk, .. } if chunk == ChunkId::MCAL));
    }

    #[test]
    fn offsets_outside_the_cell_are_kept_raw() {
        let mut bytes = sample_cell(0);
        bytes[8 + 0x2C..8 + 0x30].copy_from_slice(&0xFFFF_u32.to_le_bytes());
        let mut reloc = Relocator::new();
        let cell = Cell::read(
            &bytes,
            &mut reloc,
            CellCoord::new(0, 0),
            0,
            AdtVersion::WotLK,
            false,
        )
        .unwrap();
        assert_eq!(cell.links[CellField::Shadow.index()], Link::Raw(0xFFFF));
        assert_eq!(write(&reloc, &cell, &[]), bytes);
    }

    #[test]
    fn coordinates() {
        assert_eq!(CellCoord::new(2, 3).index(), 35);
        assert_eq!(CellCoord::from_index(255), CellCoord::new(15, 15));
        assert_eq!(CellCoord::from((1, 4)).to_string(), "(1, 4)");
        assert!(CellCoord::new(16, 0).checked_index().is_err());
        assert_eq!(CellCoord::all().count(), 256);
    }
}
