//! Multiplexing per-channel encoded streams into a single payload
//!
//! DSP streams interleave at frame granularity; Vorbis streams interleave
//! in large fixed blocks behind a small length header. Both pad with plain
//! zero bytes, never with synthetic frames.

use crate::adpcm::BYTES_PER_FRAME;

/// The block stride at which multi-channel Vorbis payloads are multiplexed
pub const VORBIS_BLOCK_LEN: usize = 0x2134;

/// Interleave encoded DSP channel streams at 8-byte frame granularity
///
/// Shorter streams are padded with trailing zero bytes up to the longest
/// one, then whole frames are taken round-robin: channel 0, channel 1, ...
/// A single stream comes back unchanged.
pub fn dsp_channels(streams: &[Vec<u8>]) -> Vec<u8> {
    let longest = streams.iter().map(Vec::len).max().unwrap_or(0);
    let block_count = longest.div_ceil(BYTES_PER_FRAME);

    let mut payload = Vec::with_capacity(block_count * BYTES_PER_FRAME * streams.len());
    for block in 0..block_count {
        let start = block * BYTES_PER_FRAME;
        for stream in streams {
            push_padded(&mut payload, stream, start, BYTES_PER_FRAME);
        }
    }

    payload
}

/// Interleave repackaged Vorbis channel streams in [`VORBIS_BLOCK_LEN`] blocks
///
/// The payload opens with a `u32` block length followed by each channel's
/// logical (unpadded) length as a `u32`, all little-endian. Every stream is
/// zero-padded to the common block count, then whole blocks are taken
/// round-robin.
pub fn vorbis_channels(streams: &[Vec<u8>]) -> Vec<u8> {
    let block_count = streams
        .iter()
        .map(|stream| stream.len().div_ceil(VORBIS_BLOCK_LEN))
        .max()
        .unwrap_or(0);

    let mut payload =
        Vec::with_capacity(4 + 4 * streams.len() + block_count * VORBIS_BLOCK_LEN * streams.len());

    payload.extend_from_slice(&(VORBIS_BLOCK_LEN as u32).to_le_bytes());
    for stream in streams {
        payload.extend_from_slice(&(stream.len() as u32).to_le_bytes());
    }

    for block in 0..block_count {
        let start = block * VORBIS_BLOCK_LEN;
        for stream in streams {
            push_padded(&mut payload, stream, start, VORBIS_BLOCK_LEN);
        }
    }

    payload
}

/// Append `len` bytes of `stream` starting at `start`, zero-filling past its end
fn push_padded(payload: &mut Vec<u8>, stream: &[u8], start: usize, len: usize) {
    let available = stream.len().saturating_sub(start).min(len);
    if available > 0 {
        payload.extend_from_slice(&stream[start..start + available]);
    }
    payload.resize(payload.len() + len - available, 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dsp_stereo() {
        let left = vec![0x11; 16];
        let right = vec![0x22; 16];

        let payload = dsp_channels(&[left, right]);

        assert_eq!(payload.len(), 32);
        assert_eq!(payload[0..8], [0x11; 8]);
        assert_eq!(payload[8..16], [0x22; 8]);
        assert_eq!(payload[16..24], [0x11; 8]);
        assert_eq!(payload[24..32], [0x22; 8]);
    }

    #[test]
    fn dsp_pads_short_streams_with_zero_bytes() {
        let left = vec![0x11; 16];
        let right = vec![0x22; 8];

        let payload = dsp_channels(&[left, right]);

        assert_eq!(payload.len(), 32);
        // The second right-channel block is padding, not an encoded frame
        assert_eq!(payload[24..32], [0; 8]);
    }

    #[test]
    fn dsp_mono_passthrough() {
        let stream = vec![1, 2, 3, 4, 5, 6, 7, 8];
        assert_eq!(dsp_channels(&[stream.clone()]), stream);
    }

    #[test]
    fn dsp_deinterleave_reverses() {
        let left: Vec<u8> = (0..24).collect();
        let right: Vec<u8> = (100..124).collect();

        let payload = dsp_channels(&[left.clone(), right.clone()]);

        let mut recovered = [Vec::new(), Vec::new()];
        for (index, block) in payload.chunks_exact(BYTES_PER_FRAME).enumerate() {
            recovered[index % 2].extend_from_slice(block);
        }

        assert_eq!(recovered[0], left);
        assert_eq!(recovered[1], right);
    }

    #[test]
    fn vorbis_header_and_blocks() {
        let first = vec![0xAA; 3];
        let second = vec![0xBB; VORBIS_BLOCK_LEN + 1];

        let payload = vorbis_channels(&[first, second]);

        // Header: block length, then each channel's logical length
        assert_eq!(payload[0..4], (VORBIS_BLOCK_LEN as u32).to_le_bytes());
        assert_eq!(payload[4..8], 3u32.to_le_bytes());
        assert_eq!(payload[8..12], (VORBIS_BLOCK_LEN as u32 + 1).to_le_bytes());

        // Both streams round up to two blocks
        assert_eq!(payload.len(), 12 + 4 * VORBIS_BLOCK_LEN);

        let header = 12;
        assert_eq!(payload[header..header + 3], [0xAA; 3]);
        assert!(payload[header + 3..header + VORBIS_BLOCK_LEN].iter().all(|&byte| byte == 0));
        assert_eq!(
            payload[header + VORBIS_BLOCK_LEN..header + 2 * VORBIS_BLOCK_LEN],
            [0xBB; VORBIS_BLOCK_LEN]
        );
    }

    #[test]
    fn vorbis_stride_recovers_padded_streams() {
        let streams = [vec![1; 100], vec![2; 200]];
        let payload = vorbis_channels(&streams);

        let header = 4 + 4 * streams.len();
        for (channel, stream) in streams.iter().enumerate() {
            let mut recovered = Vec::new();
            let mut offset = header + channel * VORBIS_BLOCK_LEN;
            while offset < payload.len() {
                recovered.extend_from_slice(&payload[offset..offset + VORBIS_BLOCK_LEN]);
                offset += streams.len() * VORBIS_BLOCK_LEN;
            }

            let mut padded = stream.clone();
            padded.resize(VORBIS_BLOCK_LEN, 0);
            assert_eq!(recovered, padded);
        }
    }
}
