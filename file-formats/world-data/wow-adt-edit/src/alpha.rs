//! Alpha map codec.
//!
//! Every texture layer after the first blends over the layers below it with a
//! 64x64 grid of opacity samples. On disk the grid uses one of four encodings,
//! chosen per layer from the document's resolution setting, the layer's
//! "compressed" flag and the cell's "do not fix alpha map" flag:
//!
//! | Encoding | Size | Layout |
//! |---|---|---|
//! | [`AlphaEncoding::LowRes`] | 2048 | 4-bit samples, low nibble first |
//! | [`AlphaEncoding::LowResBroken`] | 2048 | as above, last row/column copied from their neighbours on decode |
//! | [`AlphaEncoding::HighRes`] | 4096 | one byte per sample |
//! | [`AlphaEncoding::HighResCompressed`] | variable | run-length stream |
//!
//! Decoding always yields a dense [`AlphaGrid`], so editing code never deals
//! with the wire format.
//!
//! Reference: <https://wowdev.wiki/ADT/v18#MCAL_sub-chunk>

use std::fmt;

use crate::error::{AdtError, Result};

/// Width and height of an alpha map.
pub const ALPHA_MAP_SIZE: usize = 64;

/// Number of samples in an alpha map.
pub const ALPHA_SAMPLES: usize = ALPHA_MAP_SIZE * ALPHA_MAP_SIZE;

/// Encoded size of a low resolution map.
pub const LOW_RES_BYTES: usize = ALPHA_SAMPLES / 2;

/// Longest run a single control byte can describe.
pub const MAX_RUN: usize = 0x7F;

const FILL_FLAG: u8 = 0x80;

/// Wire encoding of one alpha map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AlphaEncoding {
    /// 4-bit samples; decode copies column 62 to 63 and row 62 to 63.
    ///
    /// Old clients wrote 63x63 maps and relied on this copy. Files written
    /// that way keep their look only if the copy is reproduced exactly.
    LowResBroken,
    /// 4-bit samples, all 64x64 stored.
    LowRes,
    /// 8-bit samples, uncompressed.
    HighRes,
    /// 8-bit samples, run-length encoded.
    HighResCompressed,
}

impl AlphaEncoding {
    /// Pick the encoding for a layer.
    ///
    /// `compressed` is the layer's 0x200 flag; `do_not_fix` is the cell's
    /// 0x8000 flag. Compression only exists for high resolution maps.
    #[must_use]
    pub fn select(high_res: bool, compressed: bool, do_not_fix: bool) -> Self {
        match (high_res, compressed, do_not_fix) {
            (true, true, _) => Self::HighResCompressed,
            (true, false, _) => Self::HighRes,
            (false, _, true) => Self::LowRes,
            (false, _, false) => Self::LowResBroken,
        }
    }

    /// Encoded size for the fixed-size encodings.
    #[must_use]
    pub fn fixed_len(self) -> Option<usize> {
        match self {
            Self::LowResBroken | Self::LowRes => Some(LOW_RES_BYTES),
            Self::HighRes => Some(ALPHA_SAMPLES),
            Self::HighResCompressed => None,
        }
    }

    /// Whether samples are stored with 4 bits of precision.
    #[must_use]
    pub fn is_low_res(self) -> bool {
        matches!(self, Self::LowResBroken | Self::LowRes)
    }
}

/// A dense 64x64 grid of opacity samples, row-major.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct AlphaGrid {
    samples: Box<[u8; ALPHA_SAMPLES]>,
}

impl Default for AlphaGrid {
    fn default() -> Self {
        Self::filled(0)
    }
}

impl fmt::Debug for AlphaGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let min = self.samples.iter().min().copied().unwrap_or(0);
        let max = self.samples.iter().max().copied().unwrap_or(0);
        f.debug_struct("AlphaGrid")
            .field("min", &min)
            .field("max", &max)
            .finish_non_exhaustive()
    }
}

impl AlphaGrid {
    /// Grid with every sample set to `value`.
    #[must_use]
    pub fn filled(value: u8) -> Self {
        Self {
            samples: Box::new([value; ALPHA_SAMPLES]),
        }
    }

    /// Grid from 4096 row-major samples.
    #[must_use]
    pub fn from_samples(samples: &[u8]) -> Option<Self> {
        let samples: [u8; ALPHA_SAMPLES] = samples.try_into().ok()?;
        Some(Self {
            samples: Box::new(samples),
        })
    }

    /// Sample at column `x`, row `y`.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        self.samples[y * ALPHA_MAP_SIZE + x]
    }

    /// Set the sample at column `x`, row `y`.
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        self.samples[y * ALPHA_MAP_SIZE + x] = value;
    }

    /// One row of samples.
    #[must_use]
    pub fn row(&self, y: usize) -> &[u8] {
        &self.samples[y * ALPHA_MAP_SIZE..(y + 1) * ALPHA_MAP_SIZE]
    }

    /// All samples, row-major.
    #[must_use]
    pub fn samples(&self) -> &[u8] {
        &self.samples[..]
    }

    /// True when the layer is invisible everywhere.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.samples.iter().all(|&s| s == 0)
    }

    fn copy_broken_edges(&mut self) {
        let last = ALPHA_MAP_SIZE - 1;
        for y in 0..ALPHA_MAP_SIZE {
            let value = self.get(last - 1, y);
            self.set(last, y, value);
        }
        let (head, tail) = self.samples.split_at_mut(last * ALPHA_MAP_SIZE);
        tail.copy_from_slice(&head[(last - 1) * ALPHA_MAP_SIZE..]);
    }
}

/// Decode one alpha map from the start of `data`.
///
/// Returns the grid and the number of bytes consumed.
pub fn decode(data: &[u8], encoding: AlphaEncoding) -> Result<(AlphaGrid, usize)> {
    match encoding {
        AlphaEncoding::LowRes | AlphaEncoding::LowResBroken => {
            let raw = data.get(..LOW_RES_BYTES).ok_or(AdtError::UnexpectedEof)?;
            let mut grid = AlphaGrid::filled(0);
            for (i, byte) in raw.iter().enumerate() {
                grid.samples[2 * i] = expand_nibble(byte & 0x0F);
                grid.samples[2 * i + 1] = expand_nibble(byte >> 4);
            }
            if encoding == AlphaEncoding::LowResBroken {
                grid.copy_broken_edges();
            }
            Ok((grid, LOW_RES_BYTES))
        }
        AlphaEncoding::HighRes => {
            let raw = data.get(..ALPHA_SAMPLES).ok_or(AdtError::UnexpectedEof)?;
            let grid = AlphaGrid::from_samples(raw).ok_or(AdtError::UnexpectedEof)?;
            Ok((grid, ALPHA_SAMPLES))
        }
        AlphaEncoding::HighResCompressed => decode_compressed(data),
    }
}

fn decode_compressed(data: &[u8]) -> Result<(AlphaGrid, usize)> {
    let mut grid = AlphaGrid::filled(0);
    let mut pos = 0;
    let mut written = 0;

    while written < ALPHA_SAMPLES {
        let control = *data.get(pos).ok_or(AdtError::UnexpectedEof)?;
        pos += 1;
        let count = usize::from(control & !FILL_FLAG);
        if written + count > ALPHA_SAMPLES {
            return Err(AdtError::ChunkParseError {
                chunk: crate::ChunkId::MCAL,
                offset: pos as u64 - 1,
                details: format!("run of {count} overflows the alpha map at sample {written}"),
            });
        }

        if control & FILL_FLAG != 0 {
            let value = *data.get(pos).ok_or(AdtError::UnexpectedEof)?;
            pos += 1;
            grid.samples[written..written + count].fill(value);
        } else {
            let raw = data.get(pos..pos + count).ok_or(AdtError::UnexpectedEof)?;
            pos += count;
            grid.samples[written..written + count].copy_from_slice(raw);
        }
        written += count;
    }

    Ok((grid, pos))
}

/// Encode `grid` with `encoding`.
///
/// Low resolution encodings keep the top four bits of precision
/// (`sample / 17`), so only multiples of 17 survive a round trip.
#[must_use]
pub fn encode(grid: &AlphaGrid, encoding: AlphaEncoding) -> Vec<u8> {
    match encoding {
        AlphaEncoding::LowRes | AlphaEncoding::LowResBroken => grid
            .samples
            .chunks_exact(2)
            .map(|pair| compress_nibble(pair[0]) | (compress_nibble(pair[1]) << 4))
            .collect(),
        AlphaEncoding::HighRes => grid.samples.to_vec(),
        AlphaEncoding::HighResCompressed => encode_compressed(grid),
    }
}

/// Greedy left-to-right run-length encoder. Runs never cross a row.
fn encode_compressed(grid: &AlphaGrid) -> Vec<u8> {
    let mut out = Vec::new();

    for y in 0..ALPHA_MAP_SIZE {
        let row = grid.row(y);
        let mut i = 0;
        while i < row.len() {
            let run = row[i..]
                .iter()
                .take(MAX_RUN)
                .take_while(|&&v| v == row[i])
                .count();
            if run >= 2 {
                out.push(FILL_FLAG | run as u8);
                out.push(row[i]);
                i += run;
                continue;
            }

            let start = i;
            i += 1;
            while i < row.len() && i - start < MAX_RUN && !(i + 1 < row.len() && row[i] == row[i + 1])
            {
                i += 1;
            }
            out.push((i - start) as u8);
            out.extend_from_slice(&row[start..i]);
        }
    }

    out
}

fn expand_nibble(nibble: u8) -> u8 {
    // nibble * 255 / 15
    nibble * 17
}

fn compress_nibble(sample: u8) -> u8 {
    sample / 17
}

/// An alpha map as stored in MCAL: the decoded grid plus its wire bytes.
///
/// Maps read from a file keep their original bytes until the grid or the
/// encoding changes, so untouched maps are written back verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlphaMap {
    grid: AlphaGrid,
    encoding: AlphaEncoding,
    encoded: Vec<u8>,
}

impl AlphaMap {
    /// Encode a grid.
    #[must_use]
    pub fn new(grid: AlphaGrid, encoding: AlphaEncoding) -> Self {
        let encoded = encode(&grid, encoding);
        Self {
            grid,
            encoding,
            encoded,
        }
    }

    /// Decode from the start of `data`, keeping the consumed bytes.
    pub fn decode(data: &[u8], encoding: AlphaEncoding) -> Result<Self> {
        let (grid, used) = decode(data, encoding)?;
        Ok(Self {
            grid,
            encoding,
            encoded: data[..used].to_vec(),
        })
    }

    /// The decoded samples.
    #[must_use]
    pub fn grid(&self) -> &AlphaGrid {
        &self.grid
    }

    /// Current wire encoding.
    #[must_use]
    pub fn encoding(&self) -> AlphaEncoding {
        self.encoding
    }

    /// Bytes written to MCAL.
    #[must_use]
    pub fn encoded(&self) -> &[u8] {
        &self.encoded
    }

    /// Size of the wire bytes.
    #[must_use]
    pub fn encoded_len(&self) -> u64 {
        self.encoded.len() as u64
    }

    /// Re-encode with another encoding, returning the new map.
    #[must_use]
    pub fn reencoded(&self, encoding: AlphaEncoding) -> Self {
        if encoding == self.encoding {
            return self.clone();
        }
        Self::new(self.grid.clone(), encoding)
    }
}
