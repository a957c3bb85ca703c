//! Structural edits.
//!
//! Every operation checks all of its arguments before touching the document:
//! an `Err` means nothing changed. Once validated, the edit updates the parsed
//! table, then tells the [`Relocator`](crate::relocation::Relocator) where bytes
//! were inserted or removed so every offset downstream follows.

use log::debug;

use crate::alpha::{AlphaGrid, AlphaMap};
use crate::cell::CellCoord;
use crate::chunks::mcnk::{MAX_LAYERS, MclyFlags, McnkFlags};
use crate::chunks::placement::{DoodadPlacement, WmoPlacement};
use crate::chunks::strings::validate_name;
use crate::document::AdtDocument;
use crate::error::{AdtError, Result};
use crate::names::{NameKind, resize_entry};
use crate::record::FixedRecord;

impl AdtDocument {
    /// Add a texture filename, or find the existing entry.
    ///
    /// Tiles with per-texture flags (MTXF) get a zeroed flags record too.
    pub fn add_texture_filename(&mut self, name: &str) -> Result<usize> {
        validate_name(name)?;
        if let Some(index) = self.textures.data.position(name) {
            return Ok(index);
        }

        let position = self.reloc.data_start(self.textures.key) + self.textures.data.entries_len();
        let index = self.textures.data.push(name);
        self.reloc
            .grow(self.textures.key, position, name.len() as u64 + 1);

        if let Some(flags) = self.texture_flags.as_mut() {
            let position = self.reloc.data_start(flags.key) + flags.data.offset_of(flags.data.len());
            flags.data.push(0);
            self.reloc.grow(flags.key, position, u32::SIZE as u64);
        }
        debug!("texture {index} added: {name}");
        Ok(index)
    }

    /// Remove texture `index` and shift later texture ids down.
    ///
    /// Layers still using `index` keep the now shifted value; prune them
    /// first if that matters.
    pub fn remove_texture_filename(&mut self, index: usize) -> Result<()> {
        let count = self.textures.data.len();
        if index >= count {
            return Err(AdtError::IndexOutOfRange {
                table: "MTEX",
                index,
                len: count,
            });
        }

        let position = self.reloc.data_start(self.textures.key) + self.textures.data.offset_of(index);
        let len = self.textures.data.entry_len(index);
        self.textures.data.remove(index);
        self.reloc.shrink(self.textures.key, position, len);

        if let Some(flags) = self.texture_flags.as_mut() {
            if index < flags.data.len() {
                let position = self.reloc.data_start(flags.key) + flags.data.offset_of(index);
                flags.data.remove(index);
                self.reloc.shrink(flags.key, position, u32::SIZE as u64);
            }
        }
        for cell in &mut self.cells {
            cell.renumber_textures(index as u32);
        }
        debug!("texture {index} removed");
        Ok(())
    }

    /// Rename texture `index` in place.
    pub fn replace_texture_filename(&mut self, index: usize, name: &str) -> Result<()> {
        let count = self.textures.data.len();
        if index >= count {
            return Err(AdtError::IndexOutOfRange {
                table: "MTEX",
                index,
                len: count,
            });
        }
        validate_name(name)?;
        match self.textures.data.position(name) {
            Some(existing) if existing == index => return Ok(()),
            Some(_) => return Err(AdtError::DuplicateName(name.to_string())),
            None => {}
        }

        let start = self.reloc.data_start(self.textures.key) + self.textures.data.offset_of(index);
        let old_len = self.textures.data.entry_len(index);
        self.textures.data.replace(index, name);
        resize_entry(
            &mut self.reloc,
            self.textures.key,
            start,
            old_len,
            name.len() as u64 + 1,
        );
        Ok(())
    }

    /// Add a model filename with its MMID entry, or find the existing one.
    pub fn add_model_filename(&mut self, name: &str) -> Result<usize> {
        self.add_name(NameKind::Model, name)
    }

    /// Remove model `index` and shift later doodad `name_id`s down.
    pub fn remove_model_filename(&mut self, index: usize) -> Result<()> {
        self.remove_name(NameKind::Model, index)
    }

    /// Rename model `index` in place.
    pub fn replace_model_filename(&mut self, index: usize, name: &str) -> Result<()> {
        self.replace_name(NameKind::Model, index, name)
    }

    /// Add a WMO filename with its MWID entry, or find the existing one.
    pub fn add_object_filename(&mut self, name: &str) -> Result<usize> {
        self.add_name(NameKind::Object, name)
    }

    /// Remove WMO `index` and shift later object `name_id`s down.
    pub fn remove_object_filename(&mut self, index: usize) -> Result<()> {
        self.remove_name(NameKind::Object, index)
    }

    /// Rename WMO `index` in place.
    pub fn replace_object_filename(&mut self, index: usize, name: &str) -> Result<()> {
        self.replace_name(NameKind::Object, index, name)
    }

    fn add_name(&mut self, kind: NameKind, name: &str) -> Result<usize> {
        validate_name(name)?;
        let mut tables = self.name_tables(kind);
        if let Some(index) = tables.find(name) {
            return Ok(index);
        }
        Ok(tables.push(name))
    }

    fn remove_name(&mut self, kind: NameKind, index: usize) -> Result<()> {
        let mut tables = self.name_tables(kind);
        tables.check_index(index)?;
        tables.require_paired(index)?;
        tables.remove(index);

        let removed = index as u32;
        match kind {
            NameKind::Model => {
                for placement in self.doodads.data.iter_mut() {
                    if !placement.uses_file_data_id() && placement.name_id > removed {
                        placement.name_id -= 1;
                    }
                }
            }
            NameKind::Object => {
                for placement in self.wmos.data.iter_mut() {
                    if !placement.uses_file_data_id() && placement.name_id > removed {
                        placement.name_id -= 1;
                    }
                }
            }
        }
        debug!("{} entry {index} removed", kind.table());
        Ok(())
    }

    fn replace_name(&mut self, kind: NameKind, index: usize, name: &str) -> Result<()> {
        let mut tables = self.name_tables(kind);
        tables.check_index(index)?;
        validate_name(name)?;
        tables.require_paired(index)?;
        match tables.find(name) {
            Some(existing) if existing == index => return Ok(()),
            Some(_) => return Err(AdtError::DuplicateName(name.to_string())),
            None => {}
        }
        tables.replace(index, name);
        Ok(())
    }

    /// Place a model and reference it from `cells`.
    ///
    /// Unless the placement is flagged as using a file data id, its
    /// `name_id` must index MMID. Repeated cells are referenced once.
    pub fn add_model_instance(
        &mut self,
        cells: &[CellCoord],
        placement: DoodadPlacement,
    ) -> Result<usize> {
        let targets = checked_cells(cells)?;
        let count = self.model_count();
        if !placement.uses_file_data_id() && placement.name_id as usize >= count {
            return Err(AdtError::InvalidModelReference {
                index: placement.name_id,
                count: count as u32,
            });
        }

        let index = self.doodads.data.len();
        let position = self.reloc.data_start(self.doodads.key) + self.doodads.data.offset_of(index);
        self.doodads.data.push(placement);
        self.reloc
            .grow(self.doodads.key, position, DoodadPlacement::SIZE as u64);
        for cell in targets {
            self.cells[cell].add_doodad_ref(&mut self.reloc, index as u32);
        }
        debug!("doodad {index} placed in {} cells", cells.len());
        Ok(index)
    }

    /// Remove doodad `index` and every cell reference to it.
    pub fn remove_model_instance(&mut self, index: usize) -> Result<()> {
        let count = self.doodads.data.len();
        if index >= count {
            return Err(AdtError::IndexOutOfRange {
                table: "MDDF",
                index,
                len: count,
            });
        }

        for cell in &mut self.cells {
            cell.remove_doodad_ref(&mut self.reloc, index as u32);
        }
        let position = self.reloc.data_start(self.doodads.key) + self.doodads.data.offset_of(index);
        self.doodads.data.remove(index);
        self.reloc
            .shrink(self.doodads.key, position, DoodadPlacement::SIZE as u64);
        Ok(())
    }

    /// Place a WMO and reference it from `cells`.
    pub fn add_object_instance(
        &mut self,
        cells: &[CellCoord],
        placement: WmoPlacement,
    ) -> Result<usize> {
        let targets = checked_cells(cells)?;
        let count = self.object_count();
        if !placement.uses_file_data_id() && placement.name_id as usize >= count {
            return Err(AdtError::InvalidModelReference {
                index: placement.name_id,
                count: count as u32,
            });
        }

        let index = self.wmos.data.len();
        let position = self.reloc.data_start(self.wmos.key) + self.wmos.data.offset_of(index);
        self.wmos.data.push(placement);
        self.reloc
            .grow(self.wmos.key, position, WmoPlacement::SIZE as u64);
        for cell in targets {
            self.cells[cell].add_object_ref(&mut self.reloc, index as u32);
        }
        debug!("object {index} placed in {} cells", cells.len());
        Ok(index)
    }

    /// Remove WMO placement `index` and every cell reference to it.
    pub fn remove_object_instance(&mut self, index: usize) -> Result<()> {
        let count = self.wmos.data.len();
        if index >= count {
            return Err(AdtError::IndexOutOfRange {
                table: "MODF",
                index,
                len: count,
            });
        }

        for cell in &mut self.cells {
            cell.remove_object_ref(&mut self.reloc, index as u32);
        }
        let position = self.reloc.data_start(self.wmos.key) + self.wmos.data.offset_of(index);
        self.wmos.data.remove(index);
        self.reloc
            .shrink(self.wmos.key, position, WmoPlacement::SIZE as u64);
        Ok(())
    }

    /// Append a texture layer to a cell.
    ///
    /// The first layer is the opaque base and takes no mask; later layers
    /// get `alpha`, or a fully transparent mask when `None`. Alpha flags are
    /// set from that and the document's mask resolution.
    pub fn add_texture_layer(
        &mut self,
        cell: CellCoord,
        texture_id: u32,
        flags: MclyFlags,
        effect_id: u32,
        alpha: Option<AlphaGrid>,
    ) -> Result<usize> {
        let at = cell.checked_index()?;
        let layers = self.cells[at].layers().len();
        if layers >= MAX_LAYERS {
            return Err(AdtError::TooManyLayers {
                row: cell.row,
                col: cell.col,
                max: MAX_LAYERS,
            });
        }
        let textures = self.textures.data.len();
        if texture_id as usize >= textures {
            return Err(AdtError::InvalidTextureReference {
                index: texture_id,
                count: textures as u32,
            });
        }
        if layers == 0 && alpha.is_some() {
            return Err(AdtError::LayerWithoutAlpha { layer: 0 });
        }

        let high_res = self.options.high_res_alpha;
        let index = self.cells[at].push_layer(
            &mut self.reloc,
            texture_id,
            flags,
            effect_id,
            alpha,
            high_res,
        );
        debug!("cell {cell}: layer {index} added with texture {texture_id}");
        Ok(index)
    }

    /// Remove a layer and its mask.
    ///
    /// Removing the base layer promotes the next one, which loses its mask.
    pub fn remove_texture_layer(&mut self, cell: CellCoord, index: usize) -> Result<()> {
        let at = self.checked_layer(cell, index)?;
        self.cells[at].remove_layer(&mut self.reloc, index);
        debug!("cell {cell}: layer {index} removed");
        Ok(())
    }

    /// Replace the mask of a layer, keeping its encoding.
    pub fn set_alpha_map(&mut self, cell: CellCoord, layer: usize, grid: AlphaGrid) -> Result<()> {
        let at = self.checked_layer(cell, layer)?;
        let encoding = match self.cells[at].layers()[layer].alpha_map() {
            Some(map) => map.encoding(),
            None => return Err(AdtError::LayerWithoutAlpha { layer }),
        };
        self.cells[at].replace_mask(&mut self.reloc, layer, AlphaMap::new(grid, encoding));
        Ok(())
    }

    /// Change the blend flags of a layer.
    ///
    /// The alpha bits follow whether the layer has a mask; a change of the
    /// compression bit re-encodes the mask.
    pub fn set_layer_flags(&mut self, cell: CellCoord, layer: usize, flags: MclyFlags) -> Result<()> {
        let at = self.checked_layer(cell, layer)?;
        let high_res = self.options.high_res_alpha;
        self.cells[at].set_layer_flags(&mut self.reloc, layer, flags, high_res);
        Ok(())
    }

    /// Point a layer at another texture.
    pub fn set_layer_texture(&mut self, cell: CellCoord, layer: usize, texture_id: u32) -> Result<()> {
        let at = self.checked_layer(cell, layer)?;
        let textures = self.textures.data.len();
        if texture_id as usize >= textures {
            return Err(AdtError::InvalidTextureReference {
                index: texture_id,
                count: textures as u32,
            });
        }
        self.cells[at].layers_mut()[layer].texture_id = texture_id;
        Ok(())
    }

    /// Switch between 8-bit and 4-bit masks, re-encoding every mask.
    ///
    /// 4-bit masks cannot be compressed, so the compression bit is dropped
    /// when switching to them.
    pub fn set_high_res_alpha(&mut self, high_res_alpha: bool) {
        if self.options.high_res_alpha == high_res_alpha {
            return;
        }
        self.options.high_res_alpha = high_res_alpha;
        for cell in &mut self.cells {
            if !high_res_alpha {
                for layer in cell.layers_mut() {
                    layer.flags = MclyFlags::new(layer.flags.value & !MclyFlags::ALPHA_MAP_COMPRESSED);
                }
            }
            cell.reencode_masks(&mut self.reloc, high_res_alpha);
        }
        debug!("alpha maps re-encoded, high resolution: {high_res_alpha}");
    }

    /// Replace the flags of a cell.
    ///
    /// The high resolution hole bit changes how the header is laid out and is
    /// kept as read. Toggling "do not fix alpha map" re-encodes 4-bit masks.
    pub fn set_cell_flags(&mut self, cell: CellCoord, flags: McnkFlags) -> Result<()> {
        let at = cell.checked_index()?;
        let high_res = self.options.high_res_alpha;
        self.cells[at].set_flags(&mut self.reloc, flags, high_res);
        Ok(())
    }

    fn checked_layer(&self, cell: CellCoord, layer: usize) -> Result<usize> {
        let at = cell.checked_index()?;
        let count = self.cells[at].layers().len();
        if layer >= count {
            return Err(AdtError::IndexOutOfRange {
                table: "MCLY",
                index: layer,
                len: count,
            });
        }
        Ok(at)
    }
}

/// Validate and de-duplicate cell coordinates, keeping their order.
fn checked_cells(cells: &[CellCoord]) -> Result<Vec<usize>> {
    let mut indices: Vec<usize> = Vec::with_capacity(cells.len());
    for cell in cells {
        let index = cell.checked_index()?;
        if !indices.contains(&index) {
            indices.push(index);
        }
    }
    Ok(indices)
}
