//! Assembling the LyN SNS and SON sound containers
//!
//! Both containers are RIFF trees with proprietary format tags; SON
//! additionally wraps the RIFF in an outer box and leads with a `LySE`
//! descriptor chunk. All sizes and integer fields are little-endian, and
//! every chunk body here is even-sized, so no padding bytes ever appear
//! between chunks.

pub mod beats;

pub use beats::BeatChunk;

/// The codec carried in the `data` chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    /// GameCube ADPCM frames, 8-byte interleaved when multi-channel
    Dsp,

    /// Repackaged Vorbis streams, block-interleaved behind a length header
    Vorbis,
}

/// Optional SNS-only additions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extras {
    /// A plain SNS
    None,

    /// Prefix the container with the fixed Just-Dance `LySE` header
    JustDance,

    /// Splice harvested beat bytes between `fact` and `data`
    CustomBeats(BeatChunk),
}

/// Everything needed to assemble a container around an encoded payload
pub struct SoundData {
    /// The payload codec
    pub codec: Codec,

    /// The source channel count
    pub channel_count: u16,

    /// The sample rate written into `fmt `
    pub sample_rate: u32,

    /// PCM sample frames per channel, written into `fact`
    pub sample_count: u32,

    /// The interleaved encoded payload of the `data` chunk
    pub payload: Vec<u8>,
}

const DSP_FORMAT_TAG: u16 = 0x5050;
const VORBIS_FORMAT_TAG: u16 = 0x3156;
const EXTENSIBLE_FORMAT_TAG: u16 = 0xFFFE;

/// The `fmt ` byte rate LyN writes for every DSP stream, regardless of rate
const DSP_BYTE_RATE: u32 = 128_000;

const FACT_MARKER: &[u8; 4] = b"LyN ";
const SNS_FACT_TRAILER: (u32, u32) = (3, 7);
const SON_FACT_TRAILER: (u32, u32) = (4, 14);

/// The `LySE` descriptor flag marking streams longer than ten seconds
const LONG_AUDIO_FLAG: u32 = 0x21;

/// The WAVEFORMATEXTENSIBLE subformat GUID for four-channel DSP
const DSP_SUBFORMAT: [u8; 16] = [
    0x50, 0x50, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xAA, 0x00, 0x38, 0x9B, 0x71,
];

/// The fixed 20-byte prefix Just-Dance titles expect in front of the SNS
const JUST_DANCE_PREFIX: [u8; 20] = [
    0x4C, 0x79, 0x53, 0x45, 0x0C, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x00, 0x00,
    0x00, 0x1F, 0x00, 0x00, 0x00,
];

impl SoundData {
    /// Assemble an SNS container
    pub fn to_sns(&self, extras: &Extras) -> Vec<u8> {
        let beats = match extras {
            Extras::CustomBeats(chunk) => Some(chunk),
            _ => None,
        };

        let riff = self.riff(false, false, beats);

        match extras {
            Extras::JustDance => {
                let mut bytes = JUST_DANCE_PREFIX.to_vec();
                bytes.extend_from_slice(&riff);
                bytes
            }
            _ => riff,
        }
    }

    /// Assemble a SON container
    ///
    /// `four_channel` selects the WAVEFORMATEXTENSIBLE `fmt ` layout used
    /// when a stereo DSP payload has been doubled up to four channels.
    pub fn to_son(&self, four_channel: bool) -> Vec<u8> {
        let riff = self.riff(true, four_channel, None);
        let son_size = (riff.len() - 4 + 0x0C) as u32;

        let mut bytes = Vec::with_capacity(riff.len() + 36);
        bytes.extend_from_slice(&son_size.to_le_bytes());
        bytes.extend_from_slice(&son_size.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes.extend_from_slice(b"SON\0");
        bytes.extend_from_slice(&0u64.to_le_bytes());
        bytes.extend_from_slice(&riff);
        bytes.extend_from_slice(&0u32.to_le_bytes());
        bytes
    }

    /// Build the RIFF tree shared by both containers
    fn riff(&self, son: bool, four_channel: bool, beats: Option<&BeatChunk>) -> Vec<u8> {
        let mut chunks = Vec::new();

        if son {
            push_chunk(&mut chunks, b"LySE", &self.lyse_descriptor());
        }

        push_chunk(&mut chunks, b"fmt ", &self.fmt_body(four_channel));
        push_chunk(&mut chunks, b"fact", &self.fact_body(son));

        if let Some(beats) = beats {
            chunks.extend_from_slice(beats.as_bytes());
        }

        push_chunk(&mut chunks, b"data", &self.payload);

        let mut riff = Vec::with_capacity(chunks.len() + 12);
        riff.extend_from_slice(b"RIFF");
        riff.extend_from_slice(&((chunks.len() + 4) as u32).to_le_bytes());
        riff.extend_from_slice(b"WAVE");
        riff.extend_from_slice(&chunks);
        riff
    }

    fn fmt_body(&self, four_channel: bool) -> Vec<u8> {
        let mut body = Vec::new();

        if four_channel {
            body.extend_from_slice(&EXTENSIBLE_FORMAT_TAG.to_le_bytes());
            body.extend_from_slice(&4u16.to_le_bytes());
            body.extend_from_slice(&self.sample_rate.to_le_bytes());
            body.extend_from_slice(&DSP_BYTE_RATE.to_le_bytes());
            body.extend_from_slice(&0u16.to_le_bytes());
            body.extend_from_slice(&4u16.to_le_bytes());
            body.extend_from_slice(&0x16u16.to_le_bytes());
            body.extend_from_slice(&0u16.to_le_bytes());
            body.extend_from_slice(&0u32.to_le_bytes());
            body.extend_from_slice(&DSP_SUBFORMAT);
            return body;
        }

        let (tag, byte_rate, bits) = match self.codec {
            Codec::Dsp => (DSP_FORMAT_TAG, DSP_BYTE_RATE, 4u16),
            Codec::Vorbis => (
                VORBIS_FORMAT_TAG,
                self.sample_rate * u32::from(self.channel_count) * 2,
                16,
            ),
        };

        body.extend_from_slice(&tag.to_le_bytes());
        body.extend_from_slice(&self.channel_count.to_le_bytes());
        body.extend_from_slice(&self.sample_rate.to_le_bytes());
        body.extend_from_slice(&byte_rate.to_le_bytes());
        body.extend_from_slice(&4u16.to_le_bytes());
        body.extend_from_slice(&bits.to_le_bytes());
        body.extend_from_slice(&0u16.to_le_bytes());
        body
    }

    fn fact_body(&self, son: bool) -> Vec<u8> {
        let (first, second) = if son {
            SON_FACT_TRAILER
        } else {
            SNS_FACT_TRAILER
        };

        let mut body = Vec::with_capacity(16);
        body.extend_from_slice(&self.sample_count.to_le_bytes());
        body.extend_from_slice(FACT_MARKER);
        body.extend_from_slice(&first.to_le_bytes());
        body.extend_from_slice(&second.to_le_bytes());
        body
    }

    fn lyse_descriptor(&self) -> Vec<u8> {
        let flag = if u64::from(self.sample_count) > u64::from(self.sample_rate) * 10 {
            LONG_AUDIO_FLAG
        } else {
            0
        };

        let mut body = Vec::with_capacity(16);
        body.extend_from_slice(&1u32.to_le_bytes());
        body.extend_from_slice(&0x10u32.to_le_bytes());
        body.extend_from_slice(&flag.to_le_bytes());
        body.extend_from_slice(&0u32.to_le_bytes());
        body
    }
}

fn push_chunk(out: &mut Vec<u8>, id: &[u8; 4], body: &[u8]) {
    out.extend_from_slice(id);
    out.extend_from_slice(&(body.len() as u32).to_le_bytes());
    out.extend_from_slice(body);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{adpcm, interleave};

    fn silence() -> SoundData {
        SoundData {
            codec: Codec::Dsp,
            channel_count: 1,
            sample_rate: 32000,
            sample_count: 14,
            payload: adpcm::encode(&[0; 14]),
        }
    }

    fn chunk_at<'a>(bytes: &'a [u8], id: &[u8; 4]) -> &'a [u8] {
        let at = bytes
            .windows(4)
            .position(|window| window == id)
            .unwrap_or_else(|| panic!("{id:?} chunk missing"));
        let size = u32::from_le_bytes(bytes[at + 4..at + 8].try_into().unwrap()) as usize;
        &bytes[at + 8..at + 8 + size]
    }

    #[test]
    fn tiny_mono_dsp_sns() {
        let sns = silence().to_sns(&Extras::None);

        // RIFF(12) + fmt(26) + fact(24) + data(16)
        assert_eq!(sns.len(), 78);

        assert_eq!(&sns[0..4], b"RIFF");
        assert_eq!(sns[4..8], 70u32.to_le_bytes());
        assert_eq!(&sns[8..12], b"WAVE");

        let fmt = chunk_at(&sns, b"fmt ");
        assert_eq!(fmt.len(), 0x12);
        assert_eq!(fmt[0..2], DSP_FORMAT_TAG.to_le_bytes());
        assert_eq!(fmt[2..4], 1u16.to_le_bytes());
        assert_eq!(fmt[4..8], 32000u32.to_le_bytes());
        assert_eq!(fmt[8..12], 128_000u32.to_le_bytes());
        assert_eq!(fmt[12..14], 4u16.to_le_bytes());
        assert_eq!(fmt[14..16], 4u16.to_le_bytes());
        assert_eq!(fmt[16..18], 0u16.to_le_bytes());

        let fact = chunk_at(&sns, b"fact");
        assert_eq!(fact.len(), 0x10);
        assert_eq!(fact[0..4], 14u32.to_le_bytes());
        assert_eq!(&fact[4..8], b"LyN ");
        assert_eq!(fact[8..12], 3u32.to_le_bytes());
        assert_eq!(fact[12..16], 7u32.to_le_bytes());

        // One silent frame: coefficient 0, scale 0, all nibbles 0
        assert_eq!(chunk_at(&sns, b"data"), [0; 8]);
    }

    #[test]
    fn vorbis_fmt_fields() {
        let data = SoundData {
            codec: Codec::Vorbis,
            channel_count: 2,
            sample_rate: 44100,
            sample_count: 44100,
            payload: vec![0; 16],
        };

        let fmt = chunk_at(&data.to_sns(&Extras::None), b"fmt ").to_vec();
        assert_eq!(fmt[0..2], VORBIS_FORMAT_TAG.to_le_bytes());
        assert_eq!(fmt[4..8], 44100u32.to_le_bytes());
        assert_eq!(fmt[8..12], (44100u32 * 2 * 2).to_le_bytes());
        assert_eq!(fmt[14..16], 16u16.to_le_bytes());
    }

    #[test]
    fn stereo_payload_lands_in_data() {
        let left = adpcm::encode(&[1000; 28]);
        let right = adpcm::encode(&[-1000; 28]);
        let payload = interleave::dsp_channels(&[left.clone(), right.clone()]);

        let data = SoundData {
            codec: Codec::Dsp,
            channel_count: 2,
            sample_rate: 32000,
            sample_count: 28,
            payload: payload.clone(),
        };

        let stored = chunk_at(&data.to_sns(&Extras::None), b"data").to_vec();
        assert_eq!(stored, payload);

        // Frame blocks alternate left, right
        assert_eq!(stored[0..8], left[0..8]);
        assert_eq!(stored[8..16], right[0..8]);
        assert_eq!(stored[16..24], left[8..16]);
        assert_eq!(stored[24..32], right[8..16]);
    }

    #[test]
    fn just_dance_prefix_strips_to_plain_sns() {
        let data = silence();
        let prefixed = data.to_sns(&Extras::JustDance);

        assert_eq!(prefixed[..20], JUST_DANCE_PREFIX);
        assert_eq!(prefixed[20..], data.to_sns(&Extras::None)[..]);
    }

    #[test]
    fn custom_beats_splice_between_fact_and_data() {
        let mut reference = b"padding".to_vec();
        reference.extend_from_slice(b"cue \x0C\x00\x00\x00\x03\x00\x00\x0012345678");
        reference.extend_from_slice(b"data\x00\x00\x00\x00");
        let beats = BeatChunk::from_sns(&reference).unwrap();

        let data = silence();
        let sns = data.to_sns(&Extras::CustomBeats(beats.clone()));

        // The span sits verbatim after the fact chunk
        let fact = sns.windows(4).position(|window| window == b"fact").unwrap();
        let splice_start = fact + 8 + 0x10;
        let splice_end = splice_start + beats.as_bytes().len();
        assert_eq!(&sns[splice_start..splice_end], beats.as_bytes());
        assert_eq!(&sns[splice_end..splice_end + 4], b"data");

        // And the RIFF size field covers it
        let plain = data.to_sns(&Extras::None);
        let grown = u32::from_le_bytes(sns[4..8].try_into().unwrap());
        let base = u32::from_le_bytes(plain[4..8].try_into().unwrap());
        assert_eq!(grown, base + beats.as_bytes().len() as u32);
    }

    #[test]
    fn son_wrapping() {
        let data = silence();
        let son = data.to_son(false);

        let son_size = u32::from_le_bytes(son[0..4].try_into().unwrap());
        assert_eq!(son[4..8], son_size.to_le_bytes());
        assert_eq!(son[8..12], 0u32.to_le_bytes());
        assert_eq!(son[12..16], 2u32.to_le_bytes());
        assert_eq!(son[16..20], 0u32.to_le_bytes());
        assert_eq!(&son[20..24], b"SON\0");
        assert_eq!(son[24..32], 0u64.to_le_bytes());
        assert_eq!(&son[32..36], b"RIFF");
        assert_eq!(son[son.len() - 4..], 0u32.to_le_bytes());

        // The size field counts the RIFF bytes plus the 12-byte lead-in
        let riff_len = son.len() - 32 - 4;
        assert_eq!(son_size as usize, riff_len - 4 + 0x0C);

        // SON mode: leading LySE chunk and the (4, 14) fact trailer
        assert_eq!(&son[44..48], b"LySE");
        let fact = chunk_at(&son, b"fact");
        assert_eq!(fact[8..12], 4u32.to_le_bytes());
        assert_eq!(fact[12..16], 14u32.to_le_bytes());
    }

    #[test]
    fn son_long_audio_flag() {
        let mut data = silence();
        data.sample_rate = 100;
        data.sample_count = 1000;

        let lyse = chunk_at(&data.to_son(false), b"LySE").to_vec();
        assert_eq!(lyse[0..4], 1u32.to_le_bytes());
        assert_eq!(lyse[4..8], 0x10u32.to_le_bytes());
        assert_eq!(lyse[8..12], 0u32.to_le_bytes());

        // One sample past ten seconds flips the flag
        data.sample_count = 1001;
        let lyse = chunk_at(&data.to_son(false), b"LySE").to_vec();
        assert_eq!(lyse[8..12], LONG_AUDIO_FLAG.to_le_bytes());
    }

    #[test]
    fn four_channel_son_fmt() {
        let data = SoundData {
            codec: Codec::Dsp,
            channel_count: 2,
            sample_rate: 32000,
            sample_count: 28,
            payload: vec![0; 64],
        };

        let fmt = chunk_at(&data.to_son(true), b"fmt ").to_vec();
        assert_eq!(fmt.len(), 0x28);
        assert_eq!(fmt[0..2], EXTENSIBLE_FORMAT_TAG.to_le_bytes());
        assert_eq!(fmt[2..4], 4u16.to_le_bytes());
        assert_eq!(fmt[8..12], 128_000u32.to_le_bytes());
        assert_eq!(fmt[12..14], 0u16.to_le_bytes());
        assert_eq!(fmt[14..16], 4u16.to_le_bytes());
        assert_eq!(fmt[16..18], 0x16u16.to_le_bytes());
        assert_eq!(fmt[24..40], DSP_SUBFORMAT);
    }
}
