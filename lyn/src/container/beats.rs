//! Harvesting beat markers from a reference SNS file
//!
//! Rhythm titles store on-beat markers as a `cue ` chunk (plus any label
//! chunks that follow it) between `fact` and `data`. The harvester copies
//! that whole byte span verbatim so it can be spliced into newly assembled
//! containers; nothing inside the span is interpreted beyond the marker
//! count.

use std::{fs, io, path::Path};
use thiserror::Error;

const CUE_MAGIC: &[u8; 4] = b"cue ";
const DATA_MAGIC: &[u8; 4] = b"data";

/// The raw beat-marker byte span lifted out of a reference SNS
///
/// Holds every byte from the start of the `cue ` chunk up to (but not
/// including) the `data` chunk, ready to be re-emitted verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeatChunk {
    bytes: Vec<u8>,
    marker_count: u32,
}

impl BeatChunk {
    /// Harvest the beat bytes from a reference SNS
    ///
    /// Finds the first `cue ` chunk, skips past it using its declared size,
    /// then copies everything up to the first `data` magic that follows.
    pub fn from_sns(bytes: &[u8]) -> Result<Self, HarvestError> {
        let cue = find(bytes, 0, CUE_MAGIC).ok_or(HarvestError::MissingCue)?;

        if cue + 12 > bytes.len() {
            return Err(HarvestError::MissingData);
        }

        let chunk_size = u32::from_le_bytes(bytes[cue + 4..cue + 8].try_into().unwrap()) as usize;
        let marker_count = u32::from_le_bytes(bytes[cue + 8..cue + 12].try_into().unwrap());

        let search = (cue + 8 + chunk_size).min(bytes.len());
        let data = find(bytes, search, DATA_MAGIC).ok_or(HarvestError::MissingData)?;

        Ok(Self {
            bytes: bytes[cue..data].to_vec(),
            marker_count,
        })
    }

    /// Harvest the beat bytes from a reference SNS on disk
    pub fn from_file<P>(path: P) -> Result<Self, FromFileError>
    where
        P: AsRef<Path>,
    {
        let bytes = fs::read(path)?;
        Ok(Self::from_sns(&bytes)?)
    }

    /// The verbatim bytes, `cue ` chunk header included
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// How many beat markers the `cue ` chunk declares
    pub fn marker_count(&self) -> u32 {
        self.marker_count
    }
}

fn find(bytes: &[u8], start: usize, magic: &[u8; 4]) -> Option<usize> {
    bytes
        .get(start..)?
        .windows(magic.len())
        .position(|window| window == magic)
        .map(|position| position + start)
}

/// An error describing what could go wrong harvesting a [`BeatChunk`]
#[derive(Debug, Error)]
pub enum HarvestError {
    /// The reference contains no `cue ` chunk at all
    #[error("No cue chunk was found in the reference file")]
    MissingCue,

    /// No `data` chunk follows the `cue ` chunk
    #[error("No data chunk follows the cue chunk")]
    MissingData,
}

/// An error describing what could go wrong reading a [`BeatChunk`] from a file
#[derive(Debug, Error)]
pub enum FromFileError {
    /// Reading the reference file failed
    #[error("Reading the reference file failed")]
    Io(#[from] io::Error),

    /// The reference file holds no usable beat chunk
    #[error("Harvesting the beat chunk failed")]
    Harvest(#[from] HarvestError),
}
