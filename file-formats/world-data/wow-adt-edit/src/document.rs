//! The editable ADT tile.
//!
//! [`AdtDocument::read`] parses a whole root ADT into typed chunks and
//! registers every chunk and offset field with a [`Relocator`]. Bytes that no
//! parsed chunk claims (unknown chunks, padding, unreferenced data) are kept as
//! raw regions, so writing an unmodified document reproduces its input
//! exactly.
//!
//! ```no_run
//! use wow_adt_edit::{AdtDocument, CellCoord, DocumentOptions};
//!
//! # fn main() -> wow_adt_edit::Result<()> {
//! let mut doc = AdtDocument::from_path("Azeroth_32_48.adt", DocumentOptions::default())?;
//! let texture = doc.add_texture_filename("Tileset\\Grass\\GrassLight.blp")?;
//! doc.add_texture_layer(CellCoord::new(0, 0), texture as u32, Default::default(), 0, None)?;
//! doc.save("Azeroth_32_48.adt")?;
//! # Ok(())
//! # }
//! ```

use std::borrow::Cow;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

use log::{debug, info, warn};

use crate::builder::blank_tile;
use crate::cell::{Cell, CellCoord};
use crate::chunk_header::ChunkHeader;
use crate::chunk_id::ChunkId;
use crate::chunks::mcnk::CellField;
use crate::chunks::placement::{DoodadPlacement, WmoPlacement};
use crate::chunks::simple::{CELL_COUNT, HeaderSlot, McinEntry, MfboChunk, MhdrChunk, MverChunk};
use crate::chunks::strings::StringTable;
use crate::error::{AdtError, Result};
use crate::io_helpers::slice_at;
use crate::layout::{Canvas, Link, Part, RawRegion, SizeField, fill_gaps};
use crate::names::{NameKind, NameOffsets, NameTables, resolve};
use crate::options::{DocumentOptions, WriteOptions};
use crate::record::{FixedRecord, RecordTable};
use crate::relocation::{ChunkKey, Origin, Relocator};
use crate::source::AssetSource;
use crate::version::AdtVersion;

/// One MCIN entry as the document holds it.
#[derive(Debug, Clone)]
pub(crate) struct IndexEntry {
    pub(crate) link: Link,
    pub(crate) size: SizeField,
    pub(crate) flags: u32,
    pub(crate) async_id: u32,
}

/// MCIN, with the cell offsets and sizes derived on write.
#[derive(Debug, Clone, Default)]
pub(crate) struct CellIndex {
    pub(crate) entries: Vec<IndexEntry>,
    pub(crate) trailing: Vec<u8>,
}

impl CellIndex {
    fn encode(&self, reloc: &Relocator, cells: &[Cell]) -> Result<Vec<u8>> {
        let mut out =
            Vec::with_capacity(self.entries.len() * McinEntry::SIZE + self.trailing.len());
        for (entry, cell) in self.entries.iter().zip(cells) {
            McinEntry {
                offset: entry.link.render(reloc)?,
                size: entry.size.render(reloc.chunk(cell.key).len),
                flags: entry.flags,
                async_id: entry.async_id,
            }
            .encode_into(&mut out)?;
        }
        out.extend_from_slice(&self.trailing);
        Ok(out)
    }
}

/// An offset field of the document, named by what it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OffsetSite {
    /// An MHDR slot.
    Header(HeaderSlot),
    /// The MCIN entry of a cell, by row-major index.
    CellIndex(usize),
    /// An MMID entry.
    ModelName(usize),
    /// An MWID entry.
    ObjectName(usize),
    /// A subchunk offset in an MCNK header.
    CellField {
        /// Owning cell
        cell: CellCoord,
        /// Which header field
        field: CellField,
    },
    /// The MCAL offset of a texture layer.
    LayerMask {
        /// Owning cell
        cell: CellCoord,
        /// Layer index
        layer: usize,
    },
}

/// A root ADT tile held in memory for editing.
///
/// Every method that changes the layout takes `&mut self`; share a document
/// between threads by wrapping it in a lock.
#[derive(Debug, Clone)]
pub struct AdtDocument {
    pub(crate) options: DocumentOptions,
    pub(crate) version: AdtVersion,
    pub(crate) reloc: Relocator,
    pub(crate) mver: Part<MverChunk>,
    pub(crate) mhdr: Part<MhdrChunk>,
    pub(crate) header_links: [Link; HeaderSlot::ALL.len()],
    pub(crate) cell_index: Part<CellIndex>,
    pub(crate) textures: Part<StringTable>,
    pub(crate) models: Part<StringTable>,
    pub(crate) model_offsets: Part<NameOffsets>,
    pub(crate) objects: Part<StringTable>,
    pub(crate) object_offsets: Part<NameOffsets>,
    pub(crate) doodads: Part<RecordTable<DoodadPlacement>>,
    pub(crate) wmos: Part<RecordTable<WmoPlacement>>,
    pub(crate) flight_bounds: Option<Part<RecordTable<MfboChunk>>>,
    pub(crate) liquids: Option<Part<Vec<u8>>>,
    pub(crate) texture_flags: Option<Part<RecordTable<u32>>>,
    pub(crate) cells: Vec<Cell>,
    pub(crate) gaps: Vec<RawRegion>,
}

/// Where an MHDR slot found its chunk.
type Found = [Option<(u64, ChunkHeader)>; HeaderSlot::ALL.len()];

impl AdtDocument {
    /// Parse a root ADT file.
    ///
    /// The first malformed structure aborts the read. Anomalies that do not
    /// prevent editing, like subchunk offsets that point outside their cell,
    /// are logged and carried through unchanged.
    pub fn read(bytes: &[u8], options: DocumentOptions) -> Result<Self> {
        let file_len = bytes.len() as u64;
        let mut reloc = Relocator::new();
        let mut claimed = Vec::new();

        let header = ChunkHeader::expect_at(bytes, 0, ChunkId::MVER)?;
        let (mver_key, data) = claim(bytes, &mut reloc, &mut claimed, 0, header)?;
        if data.len() != MverChunk::SIZE {
            return Err(AdtError::InvalidChunkSize {
                chunk: ChunkId::MVER,
                expected: MverChunk::SIZE,
                actual: data.len(),
            });
        }
        let mver = MverChunk::decode(data)?;
        AdtVersion::check_mver(mver.version)?;

        let mhdr_address = header.total_size();
        let header = ChunkHeader::expect_at(bytes, mhdr_address, ChunkId::MHDR)?;
        let (mhdr_key, data) = claim(bytes, &mut reloc, &mut claimed, mhdr_address, header)?;
        if data.len() != MhdrChunk::SIZE {
            return Err(AdtError::InvalidChunkSize {
                chunk: ChunkId::MHDR,
                expected: MhdrChunk::SIZE,
                actual: data.len(),
            });
        }
        let mhdr = MhdrChunk::decode(data)?;
        let mhdr_data = reloc.data_start(mhdr_key);

        let mut header_links = [Link::Absent; HeaderSlot::ALL.len()];
        let mut found: Found = [None; HeaderSlot::ALL.len()];
        for slot in HeaderSlot::ALL {
            let value = mhdr.offset(slot);
            let id = slot.chunk_id();
            if value == 0 {
                if slot.is_required() {
                    return Err(AdtError::MissingRequiredChunk(id));
                }
                continue;
            }
            let field = mhdr_data + slot.field_offset();
            let target = mhdr_data + u64::from(value);
            if target + ChunkHeader::SIZE > file_len {
                if slot.is_required() {
                    return Err(AdtError::OffsetOutOfBounds {
                        chunk: id,
                        offset: value,
                        file_position: field,
                    });
                }
                warn!("MHDR offset for {id} ({value:#x}) lies outside the file");
                header_links[slot.index()] = Link::Raw(value);
                continue;
            }
            header_links[slot.index()] =
                Link::Handle(reloc.register_offset(field, Origin::data_of(mhdr_key), target));

            if slot == HeaderSlot::Mfbo && !mhdr.has_mfbo() {
                debug!("MFBO offset set without the MHDR flag; not parsing it");
                continue;
            }
            match ChunkHeader::expect_at(bytes, target, id) {
                Ok(header) => found[slot.index()] = Some((target, header)),
                Err(err) if slot.is_required() => return Err(err),
                Err(err) => warn!("ignoring optional {id}: {err}"),
            }
        }

        let (address, header) = required(&found, HeaderSlot::Mcin)?;
        let (mcin_key, data) = claim(bytes, &mut reloc, &mut claimed, address, header)?;
        if data.len() < CELL_COUNT * McinEntry::SIZE {
            return Err(AdtError::InvalidChunkSize {
                chunk: ChunkId::MCIN,
                expected: CELL_COUNT * McinEntry::SIZE,
                actual: data.len(),
            });
        }
        let raw_index = RecordTable::<McinEntry>::decode_count(data, CELL_COUNT)?;

        let textures = string_part(bytes, &mut reloc, &mut claimed, &found, HeaderSlot::Mtex)?;
        let models = string_part(bytes, &mut reloc, &mut claimed, &found, HeaderSlot::Mmdx)?;
        let model_offsets =
            offsets_part(bytes, &mut reloc, &mut claimed, &found, HeaderSlot::Mmid, &models)?;
        let objects = string_part(bytes, &mut reloc, &mut claimed, &found, HeaderSlot::Mwmo)?;
        let object_offsets =
            offsets_part(bytes, &mut reloc, &mut claimed, &found, HeaderSlot::Mwid, &objects)?;

        let (address, header) = required(&found, HeaderSlot::Mddf)?;
        let (key, data) = claim(bytes, &mut reloc, &mut claimed, address, header)?;
        let doodads = Part::new(key, RecordTable::decode(data)?);

        let (address, header) = required(&found, HeaderSlot::Modf)?;
        let (key, data) = claim(bytes, &mut reloc, &mut claimed, address, header)?;
        let wmos = Part::new(key, RecordTable::decode(data)?);

        let flight_bounds = match found[HeaderSlot::Mfbo.index()] {
            Some((address, header)) => {
                let (key, data) = claim(bytes, &mut reloc, &mut claimed, address, header)?;
                Some(Part::new(key, RecordTable::decode(data)?))
            }
            None => None,
        };
        let liquids = match found[HeaderSlot::Mh2o.index()] {
            Some((address, header)) => {
                let (key, data) = claim(bytes, &mut reloc, &mut claimed, address, header)?;
                Some(Part::new(key, data.to_vec()))
            }
            None => None,
        };
        let texture_flags = match found[HeaderSlot::Mtxf.index()] {
            Some((address, header)) => {
                let (key, data) = claim(bytes, &mut reloc, &mut claimed, address, header)?;
                Some(Part::new(key, RecordTable::decode(data)?))
            }
            None => None,
        };

        let version = options.version.unwrap_or_else(|| {
            AdtVersion::detect_from_chunks(
                flight_bounds.is_some(),
                liquids.is_some(),
                texture_flags.is_some(),
            )
        });
        debug!("reading {file_len} byte ADT as {version}");

        let mcin_data = reloc.data_start(mcin_key);
        let mut entries = Vec::with_capacity(CELL_COUNT);
        let mut cells = Vec::with_capacity(CELL_COUNT);
        for (index, entry) in raw_index.iter().enumerate() {
            let field = mcin_data + raw_index.offset_of(index);
            if entry.offset == 0 {
                return Err(AdtError::MissingRequiredChunk(ChunkId::MCNK));
            }
            let address = u64::from(entry.offset);
            if address + ChunkHeader::SIZE > file_len {
                return Err(AdtError::OffsetOutOfBounds {
                    chunk: ChunkId::MCNK,
                    offset: entry.offset,
                    file_position: field,
                });
            }
            let cell = Cell::read(
                bytes,
                &mut reloc,
                CellCoord::from_index(index),
                address,
                version,
                options.high_res_alpha,
            )?;
            let len = reloc.chunk(cell.key).len;
            claimed.push((address, len, ChunkId::MCNK));
            entries.push(IndexEntry {
                link: Link::Handle(reloc.register_offset(field, Origin::FileStart, address)),
                size: SizeField::detect(entry.size, len - ChunkHeader::SIZE),
                flags: entry.flags,
                async_id: entry.async_id,
            });
            cells.push(cell);
        }
        let cell_index = Part::new(
            mcin_key,
            CellIndex {
                entries,
                trailing: raw_index.trailing().to_vec(),
            },
        );

        let gaps = fill_gaps(&mut reloc, bytes, 0, file_len, &mut claimed, None)?;
        debug!(
            "tracking {} regions and {} offsets, {} raw",
            reloc.chunk_count(),
            reloc.offset_count(),
            gaps.len()
        );

        Ok(Self {
            options: DocumentOptions {
                version: Some(version),
                ..options
            },
            version,
            reloc,
            mver: Part::new(mver_key, mver),
            mhdr: Part::new(mhdr_key, mhdr),
            header_links,
            cell_index,
            textures,
            models,
            model_offsets,
            objects,
            object_offsets,
            doodads,
            wmos,
            flight_bounds,
            liquids,
            texture_flags,
            cells,
            gaps,
        })
    }

    /// Read a whole ADT from `reader`.
    pub fn read_from<R: Read>(reader: &mut R, options: DocumentOptions) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::read(&bytes, options)
    }

    /// Read the ADT stored at `path`.
    pub fn from_path(path: impl AsRef<Path>, options: DocumentOptions) -> Result<Self> {
        let path = path.as_ref();
        info!("loading {}", path.display());
        Self::read(&fs::read(path)?, options)
    }

    /// Read tile `id` from an asset source.
    pub fn load<S: AssetSource + ?Sized>(
        source: &S,
        id: &str,
        options: DocumentOptions,
    ) -> Result<Self> {
        Self::read(&source.read(id)?, options)
    }

    /// A flat tile with every required chunk and 256 empty cells.
    ///
    /// Without an explicit version the tile is laid out for WotLK.
    pub fn new(options: DocumentOptions) -> Result<Self> {
        let version = options.version.unwrap_or(AdtVersion::WotLK);
        Self::read(&blank_tile(version)?, options.with_version(version))
    }

    /// Serialize the document.
    ///
    /// Every region is written at its tracked address, so chunk order and any
    /// uninterpreted bytes are kept as read.
    pub fn write(&self) -> Result<Vec<u8>> {
        let reloc = &self.reloc;
        let mut canvas = Canvas::new(reloc.extent())?;

        canvas.put_part(reloc, ChunkId::MVER, self.mver.key, &record_bytes(&self.mver.data)?)?;
        let mut mhdr = self.mhdr.data;
        for (value, link) in mhdr.offsets.iter_mut().zip(&self.header_links) {
            *value = link.render(reloc)?;
        }
        canvas.put_part(reloc, ChunkId::MHDR, self.mhdr.key, &record_bytes(&mhdr)?)?;
        canvas.put_part(
            reloc,
            ChunkId::MCIN,
            self.cell_index.key,
            &self.cell_index.data.encode(reloc, &self.cells)?,
        )?;
        canvas.put_part(reloc, ChunkId::MTEX, self.textures.key, &self.textures.data.encode())?;
        canvas.put_part(reloc, ChunkId::MMDX, self.models.key, &self.models.data.encode())?;
        canvas.put_part(
            reloc,
            ChunkId::MMID,
            self.model_offsets.key,
            &self.model_offsets.data.encode(reloc)?,
        )?;
        canvas.put_part(reloc, ChunkId::MWMO, self.objects.key, &self.objects.data.encode())?;
        canvas.put_part(
            reloc,
            ChunkId::MWID,
            self.object_offsets.key,
            &self.object_offsets.data.encode(reloc)?,
        )?;
        canvas.put_part(reloc, ChunkId::MDDF, self.doodads.key, &self.doodads.data.encode()?)?;
        canvas.put_part(reloc, ChunkId::MODF, self.wmos.key, &self.wmos.data.encode()?)?;
        if let Some(part) = &self.flight_bounds {
            canvas.put_part(reloc, ChunkId::MFBO, part.key, &part.data.encode()?)?;
        }
        if let Some(part) = &self.liquids {
            canvas.put_part(reloc, ChunkId::MH2O, part.key, &part.data)?;
        }
        if let Some(part) = &self.texture_flags {
            canvas.put_part(reloc, ChunkId::MTXF, part.key, &part.data.encode()?)?;
        }

        for cell in &self.cells {
            cell.write(reloc, &mut canvas)?;
        }
        canvas.put_raw(reloc, &self.gaps)?;
        canvas.finish()
    }

    /// Serialize after the extra passes `options` asks for.
    pub fn write_with(&mut self, options: WriteOptions) -> Result<Vec<u8>> {
        if options.optimize {
            let report = self.optimize()?;
            info!("optimized before writing: {report}");
        }
        self.write()
    }

    /// Serialize into `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        writer.write_all(&self.write()?)?;
        Ok(())
    }

    /// Serialize to the file at `path`, replacing it.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.write()?;
        fs::write(path.as_ref(), bytes)?;
        Ok(())
    }

    /// Client generation the layout is interpreted for.
    #[must_use]
    pub fn version(&self) -> AdtVersion {
        self.version
    }

    /// Options in effect, with the detected version filled in.
    #[must_use]
    pub fn options(&self) -> DocumentOptions {
        self.options
    }

    /// MHDR flags.
    #[must_use]
    pub fn header_flags(&self) -> u32 {
        self.mhdr.data.flags
    }

    /// Texture filenames (MTEX).
    #[must_use]
    pub fn textures(&self) -> &StringTable {
        &self.textures.data
    }

    /// Per-texture flags (MTXF), when the tile has them.
    #[must_use]
    pub fn texture_flags(&self) -> Option<&[u32]> {
        self.texture_flags.as_ref().map(|part| part.data.as_slice())
    }

    /// Per-texture flags for in-place edits; the count follows MTEX.
    pub fn texture_flags_mut(&mut self) -> Option<&mut [u32]> {
        self.texture_flags
            .as_mut()
            .map(|part| part.data.as_mut_slice())
    }

    /// Model filename block (MMDX), in storage order.
    #[must_use]
    pub fn models(&self) -> &StringTable {
        &self.models.data
    }

    /// Number of MMID entries, i.e. valid doodad `name_id`s.
    #[must_use]
    pub fn model_count(&self) -> usize {
        self.model_offsets.data.len()
    }

    /// Filename that MMID entry `index` points at.
    #[must_use]
    pub fn model_name(&self, index: usize) -> Option<Cow<'_, str>> {
        let string = resolve(&self.reloc, &self.models, &self.model_offsets, index)?;
        self.models.data.get(string)
    }

    /// Stored MMID values.
    pub fn model_offsets(&self) -> Result<Vec<u32>> {
        self.model_offsets
            .data
            .links
            .iter()
            .map(|link| link.render(&self.reloc))
            .collect()
    }

    /// WMO filename block (MWMO), in storage order.
    #[must_use]
    pub fn objects(&self) -> &StringTable {
        &self.objects.data
    }

    /// Number of MWID entries, i.e. valid WMO `name_id`s.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.object_offsets.data.len()
    }

    /// Filename that MWID entry `index` points at.
    #[must_use]
    pub fn object_name(&self, index: usize) -> Option<Cow<'_, str>> {
        let string = resolve(&self.reloc, &self.objects, &self.object_offsets, index)?;
        self.objects.data.get(string)
    }

    /// Stored MWID values.
    pub fn object_offsets(&self) -> Result<Vec<u32>> {
        self.object_offsets
            .data
            .links
            .iter()
            .map(|link| link.render(&self.reloc))
            .collect()
    }

    /// Doodad placements (MDDF).
    #[must_use]
    pub fn doodads(&self) -> &[DoodadPlacement] {
        self.doodads.data.as_slice()
    }

    /// Doodad placements for edits that keep the record count.
    pub fn doodads_mut(&mut self) -> &mut [DoodadPlacement] {
        self.doodads.data.as_mut_slice()
    }

    /// WMO placements (MODF).
    #[must_use]
    pub fn wmos(&self) -> &[WmoPlacement] {
        self.wmos.data.as_slice()
    }

    /// WMO placements for edits that keep the record count.
    pub fn wmos_mut(&mut self) -> &mut [WmoPlacement] {
        self.wmos.data.as_mut_slice()
    }

    /// Flight bounds (MFBO), when present and flagged in MHDR.
    #[must_use]
    pub fn flight_bounds(&self) -> Option<&MfboChunk> {
        self.flight_bounds.as_ref().and_then(|part| part.data.get(0))
    }

    /// Mutable flight bounds, when present.
    pub fn flight_bounds_mut(&mut self) -> Option<&mut MfboChunk> {
        self.flight_bounds
            .as_mut()
            .and_then(|part| part.data.get_mut(0))
    }

    /// Raw MH2O data; the water layout is carried through untouched.
    #[must_use]
    pub fn liquids(&self) -> Option<&[u8]> {
        self.liquids.as_ref().map(|part| part.data.as_slice())
    }

    /// Cell at `coord`.
    pub fn cell(&self, coord: CellCoord) -> Result<&Cell> {
        Ok(&self.cells[coord.checked_index()?])
    }

    /// Cell at `coord`, for edits that keep every size unchanged.
    pub fn cell_mut(&mut self, coord: CellCoord) -> Result<&mut Cell> {
        Ok(&mut self.cells[coord.checked_index()?])
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Every tracked offset field and the absolute address it resolves to.
    ///
    /// Fields kept verbatim (zero, or pointing nowhere this crate can
    /// follow) are not listed.
    #[must_use]
    pub fn offset_sites(&self) -> Vec<(OffsetSite, u64)> {
        let reloc = &self.reloc;
        let mut sites = Vec::with_capacity(reloc.offset_count());
        let mut push = |site: OffsetSite, link: Link| {
            if let Some(key) = link.key() {
                sites.push((site, reloc.target(key)));
            }
        };

        for slot in HeaderSlot::ALL {
            push(OffsetSite::Header(slot), self.header_links[slot.index()]);
        }
        for (index, entry) in self.cell_index.data.entries.iter().enumerate() {
            push(OffsetSite::CellIndex(index), entry.link);
        }
        for (index, &link) in self.model_offsets.data.links.iter().enumerate() {
            push(OffsetSite::ModelName(index), link);
        }
        for (index, &link) in self.object_offsets.data.links.iter().enumerate() {
            push(OffsetSite::ObjectName(index), link);
        }
        for cell in &self.cells {
            for field in CellField::ALL {
                push(
                    OffsetSite::CellField {
                        cell: cell.coord,
                        field,
                    },
                    cell.links[field.index()],
                );
            }
            for (layer, entry) in cell.layers().iter().enumerate() {
                push(
                    OffsetSite::LayerMask {
                        cell: cell.coord,
                        layer,
                    },
                    entry.offset,
                );
            }
        }
        sites
    }

    /// Serialized size of the document.
    #[must_use]
    pub fn encoded_len(&self) -> u64 {
        self.reloc.extent()
    }

    /// Borrow one pair of name and offset tables with the registry.
    pub(crate) fn name_tables(&mut self, kind: NameKind) -> NameTables<'_> {
        let (names, offsets) = match kind {
            NameKind::Model => (&mut self.models, &mut self.model_offsets),
            NameKind::Object => (&mut self.objects, &mut self.object_offsets),
        };
        NameTables {
            kind,
            names,
            offsets,
            reloc: &mut self.reloc,
        }
    }
}

/// Register a top-level chunk and return its data.
fn claim<'a>(
    bytes: &'a [u8],
    reloc: &mut Relocator,
    claimed: &mut Vec<(u64, u64, ChunkId)>,
    address: u64,
    header: ChunkHeader,
) -> Result<(ChunkKey, &'a [u8])> {
    let data = slice_at(bytes, address + ChunkHeader::SIZE, u64::from(header.size))?;
    let key = reloc.register_chunk(header.id, address, header.total_size(), None);
    claimed.push((address, header.total_size(), header.id));
    debug!("{} at {address:#x}, {} bytes", header.id, header.size);
    Ok((key, data))
}

fn required(found: &Found, slot: HeaderSlot) -> Result<(u64, ChunkHeader)> {
    found[slot.index()].ok_or(AdtError::MissingRequiredChunk(slot.chunk_id()))
}

fn string_part(
    bytes: &[u8],
    reloc: &mut Relocator,
    claimed: &mut Vec<(u64, u64, ChunkId)>,
    found: &Found,
    slot: HeaderSlot,
) -> Result<Part<StringTable>> {
    let (address, header) = required(found, slot)?;
    let (key, data) = claim(bytes, reloc, claimed, address, header)?;
    Ok(Part::new(key, StringTable::decode(data)))
}

fn offsets_part(
    bytes: &[u8],
    reloc: &mut Relocator,
    claimed: &mut Vec<(u64, u64, ChunkId)>,
    found: &Found,
    slot: HeaderSlot,
    names: &Part<StringTable>,
) -> Result<Part<NameOffsets>> {
    let (address, header) = required(found, slot)?;
    let (key, data) = claim(bytes, reloc, claimed, address, header)?;
    let table = RecordTable::<u32>::decode(data)?;
    Ok(Part::new(key, NameOffsets::link(reloc, table, key, names)))
}

fn record_bytes<T: FixedRecord>(record: &T) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(T::SIZE);
    record.encode_into(&mut out)?;
    Ok(out)
}
