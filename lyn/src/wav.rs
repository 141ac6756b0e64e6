//! Reading the 16-bit PCM WAV files that feed the encoders

use std::{fs, io, path::Path};
use thiserror::Error;

const RIFF_MAGIC: &[u8; 4] = b"RIFF";
const WAVE_MAGIC: &[u8; 4] = b"WAVE";

/// The WAVE format tag for plain PCM
const FORMAT_PCM: u16 = 1;

/// A 16-bit PCM stream pulled out of a WAV file
///
/// Samples are stored the way the file stores them: frame-interleaved,
/// channel 0 first within each frame.
pub struct PcmWav {
    /// The number of interleaved channels
    pub channel_count: u16,

    /// The sample rate in Hz
    pub sample_rate: u32,

    /// All samples, frame-interleaved
    pub samples: Vec<i16>,
}

impl PcmWav {
    /// Parse a WAV file from its raw bytes
    ///
    /// Walks the RIFF chunk list for `fmt ` and `data`, skipping anything
    /// else (odd-sized chunks are padded to even offsets, per RIFF). Only
    /// uncompressed 16-bit PCM is accepted.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FromBytesError> {
        if bytes.len() < 12 {
            return Err(FromBytesError::TooSmall);
        }

        if &bytes[0..4] != RIFF_MAGIC || &bytes[8..12] != WAVE_MAGIC {
            return Err(FromBytesError::BadMagic);
        }

        let mut format: Option<(u16, u16, u32, u16)> = None;
        let mut data: Option<&[u8]> = None;

        let mut offset = 12;
        while offset + 8 <= bytes.len() {
            let id: [u8; 4] = bytes[offset..offset + 4].try_into().unwrap();
            let size = u32::from_le_bytes(bytes[offset + 4..offset + 8].try_into().unwrap()) as usize;

            let start = offset + 8;
            let end = start.checked_add(size).filter(|&end| end <= bytes.len());
            let Some(end) = end else {
                break;
            };

            match &id {
                b"fmt " if size >= 16 => {
                    let field =
                        |at: usize| u16::from_le_bytes(bytes[start + at..start + at + 2].try_into().unwrap());
                    let format_tag = field(0);
                    let channel_count = field(2);
                    let sample_rate =
                        u32::from_le_bytes(bytes[start + 4..start + 8].try_into().unwrap());
                    let bits_per_sample = field(14);

                    format = Some((format_tag, channel_count, sample_rate, bits_per_sample));
                }
                b"data" => {
                    data = Some(&bytes[start..end]);
                }
                _ => (),
            }

            // RIFF pads odd-sized chunk bodies with one byte
            offset = end + size % 2;
        }

        let (format_tag, channel_count, sample_rate, bits_per_sample) =
            format.ok_or(FromBytesError::MissingFmt)?;
        let data = data.ok_or(FromBytesError::MissingData)?;

        if format_tag != FORMAT_PCM {
            return Err(FromBytesError::UnsupportedFormat(format_tag));
        }

        if bits_per_sample != 16 {
            return Err(FromBytesError::UnsupportedBitDepth(bits_per_sample));
        }

        if channel_count == 0 {
            return Err(FromBytesError::MissingFmt);
        }

        let samples = data
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect();

        Ok(Self {
            channel_count,
            sample_rate,
            samples,
        })
    }

    /// Read and parse a WAV file from disk
    pub fn from_file<P>(path: P) -> Result<Self, FromFileError>
    where
        P: AsRef<Path>,
    {
        let bytes = fs::read(path)?;
        Ok(Self::from_bytes(&bytes)?)
    }

    /// The number of sample frames (samples per channel)
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channel_count as usize
    }

    /// Copy out one channel's samples, deinterleaved
    pub fn channel(&self, index: u16) -> Vec<i16> {
        debug_assert!(index < self.channel_count);

        self.samples
            .iter()
            .skip(index as usize)
            .step_by(self.channel_count as usize)
            .copied()
            .collect()
    }
}

/// An error describing what could go wrong parsing a [`PcmWav`] from bytes
#[derive(Debug, Error)]
pub enum FromBytesError {
    /// The input ends before the RIFF header does
    #[error("The file is too small to be a WAV file")]
    TooSmall,

    /// The RIFF/WAVE magic is not where it should be
    #[error("The RIFF/WAVE magic is missing")]
    BadMagic,

    /// No `fmt ` chunk was found
    #[error("The fmt chunk is missing")]
    MissingFmt,

    /// No `data` chunk was found
    #[error("The data chunk is missing")]
    MissingData,

    /// The audio is compressed or otherwise not plain PCM
    #[error("Unsupported audio format tag {0:#06X}, only PCM is supported")]
    UnsupportedFormat(u16),

    /// The samples are not 16-bit
    #[error("Unsupported bit depth {0}, only 16-bit samples are supported")]
    UnsupportedBitDepth(u16),
}

/// An error describing what could go wrong reading a [`PcmWav`] from a file
#[derive(Debug, Error)]
pub enum FromFileError {
    /// Reading the file from disk failed
    #[error("Reading the file failed")]
    Io(#[from] io::Error),

    /// The file contents are not a usable WAV
    #[error("Parsing the WAV data failed")]
    Parse(#[from] FromBytesError),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a minimal WAV file in memory
    fn wav_bytes(channel_count: u16, sample_rate: u32, samples: &[i16]) -> Vec<u8> {
        let data_len = samples.len() * 2;
        let mut bytes = Vec::new();

        bytes.extend_from_slice(b"RIFF");
        bytes.extend_from_slice(&((4 + 24 + 8 + data_len) as u32).to_le_bytes());
        bytes.extend_from_slice(b"WAVE");

        bytes.extend_from_slice(b"fmt ");
        bytes.extend_from_slice(&16u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&channel_count.to_le_bytes());
        bytes.extend_from_slice(&sample_rate.to_le_bytes());
        bytes.extend_from_slice(&(sample_rate * u32::from(channel_count) * 2).to_le_bytes());
        bytes.extend_from_slice(&(channel_count * 2).to_le_bytes());
        bytes.extend_from_slice(&16u16.to_le_bytes());

        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&(data_len as u32).to_le_bytes());
        for sample in samples {
            bytes.extend_from_slice(&sample.to_le_bytes());
        }

        bytes
    }

    #[test]
    fn parse() {
        let wav = PcmWav::from_bytes(&wav_bytes(2, 32000, &[1, -1, 2, -2])).unwrap();

        assert_eq!(wav.channel_count, 2);
        assert_eq!(wav.sample_rate, 32000);
        assert_eq!(wav.samples, [1, -1, 2, -2]);
        assert_eq!(wav.frame_count(), 2);
        assert_eq!(wav.channel(0), [1, 2]);
        assert_eq!(wav.channel(1), [-1, -2]);
    }

    #[test]
    fn skips_unknown_chunks() {
        let mut bytes = wav_bytes(1, 48000, &[7]);

        // Splice a LIST chunk between the header and fmt
        let mut spliced = bytes[..12].to_vec();
        spliced.extend_from_slice(b"LIST");
        spliced.extend_from_slice(&4u32.to_le_bytes());
        spliced.extend_from_slice(b"INFO");
        spliced.extend_from_slice(&bytes.split_off(12));

        let wav = PcmWav::from_bytes(&spliced).unwrap();
        assert_eq!(wav.samples, [7]);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            PcmWav::from_bytes(&[0; 4]),
            Err(FromBytesError::TooSmall)
        ));

        assert!(matches!(
            PcmWav::from_bytes(&[0; 64]),
            Err(FromBytesError::BadMagic)
        ));

        let mut float = wav_bytes(1, 44100, &[0]);
        float[20] = 3; // IEEE float format tag
        assert!(matches!(
            PcmWav::from_bytes(&float),
            Err(FromBytesError::UnsupportedFormat(3))
        ));

        let mut eight_bit = wav_bytes(1, 44100, &[0]);
        eight_bit[34] = 8;
        assert!(matches!(
            PcmWav::from_bytes(&eight_bit),
            Err(FromBytesError::UnsupportedBitDepth(8))
        ));

        let headerless = &wav_bytes(1, 44100, &[0])[..12];
        assert!(matches!(
            PcmWav::from_bytes(headerless),
            Err(FromBytesError::MissingFmt)
        ));
    }
}
