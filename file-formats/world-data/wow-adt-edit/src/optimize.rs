//! Pre-write pruning of data nothing uses.

use std::fmt;

use log::{debug, warn};

use crate::cell::CellCoord;
use crate::document::AdtDocument;
use crate::error::Result;
use crate::names::NameKind;

/// What [`AdtDocument::optimize`] removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OptimizeReport {
    /// Layers whose mask was fully transparent.
    pub layers_removed: usize,
    /// Texture filenames no layer used.
    pub textures_removed: usize,
    /// Model filenames no doodad placement used.
    pub models_removed: usize,
    /// WMO filenames no object placement used.
    pub objects_removed: usize,
}

impl OptimizeReport {
    /// Whether anything was removed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for OptimizeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} layers, {} textures, {} models, {} objects removed",
            self.layers_removed, self.textures_removed, self.models_removed, self.objects_removed
        )
    }
}

impl AdtDocument {
    /// Remove layers that show nothing, then the filenames left unused.
    ///
    /// Runs in order: masked layers with an all-zero mask, texture filenames
    /// no layer points at, then model and WMO filenames no placement points
    /// at. A model or WMO table whose offsets are not paired with its names
    /// is left alone.
    pub fn optimize(&mut self) -> Result<OptimizeReport> {
        let mut report = OptimizeReport::default();

        for coord in CellCoord::all() {
            let cell = self.cell(coord)?;
            let transparent: Vec<usize> = cell
                .layers()
                .iter()
                .enumerate()
                .filter(|(_, layer)| layer.alpha_map().is_some_and(|map| map.grid().is_transparent()))
                .map(|(index, _)| index)
                .rev()
                .collect();
            for index in transparent {
                self.remove_texture_layer(coord, index)?;
                report.layers_removed += 1;
            }
        }

        let mut used = vec![false; self.textures().len()];
        for cell in self.cells() {
            for layer in cell.layers() {
                if let Some(slot) = used.get_mut(layer.texture_id() as usize) {
                    *slot = true;
                }
            }
        }
        for index in (0..used.len()).rev().filter(|&index| !used[index]) {
            self.remove_texture_filename(index)?;
            report.textures_removed += 1;
        }

        report.models_removed = self.prune_names(NameKind::Model)?;
        report.objects_removed = self.prune_names(NameKind::Object)?;

        debug!("optimize: {report}");
        Ok(report)
    }

    fn prune_names(&mut self, kind: NameKind) -> Result<usize> {
        if let Some(index) = self.name_tables(kind).unpaired() {
            warn!(
                "{} entry {index} is not paired with its name, skipping unused name removal",
                kind.table()
            );
            return Ok(0);
        }

        let count = match kind {
            NameKind::Model => self.model_count(),
            NameKind::Object => self.object_count(),
        };
        let mut used = vec![false; count];
        let ids: Vec<u32> = match kind {
            NameKind::Model => self
                .doodads()
                .iter()
                .filter(|placement| !placement.uses_file_data_id())
                .map(|placement| placement.name_id)
                .collect(),
            NameKind::Object => self
                .wmos()
                .iter()
                .filter(|placement| !placement.uses_file_data_id())
                .map(|placement| placement.name_id)
                .collect(),
        };
        for id in ids {
            if let Some(slot) = used.get_mut(id as usize) {
                *slot = true;
            }
        }

        let mut removed = 0;
        for index in (0..count).rev().filter(|&index| !used[index]) {
            match kind {
                NameKind::Model => self.remove_model_filename(index)?,
                NameKind::Object => self.remove_object_filename(index)?,
            }
            removed += 1;
        }
        Ok(removed)
    }
}
