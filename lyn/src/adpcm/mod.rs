//! The GameCube ADPCM codec ("DSP") used for LyN sound data
//!
//! Every frame packs 14 samples into 8 bytes: a header byte selecting one of
//! the eight [`COEFFICIENT_PAIRS`] and a power-of-two scale, followed by
//! fourteen signed 4-bit residuals. The encoder searches all coefficient
//! pairs per frame and keeps the one with the smallest squared
//! reconstruction error, feeding the *decoded* samples back into the
//! prediction history so that encoder and decoder state never drift apart.

mod coefficients;

pub use coefficients::COEFFICIENT_PAIRS;

/// The number of PCM samples encoded by a single frame
pub const SAMPLES_PER_FRAME: usize = 14;

/// The size in bytes of a single encoded frame
pub const BYTES_PER_FRAME: usize = 8;

/// The largest usable scale exponent
///
/// Residuals that don't fit even at this scale are silently clamped to the
/// 4-bit range by the quantizer.
const MAX_SCALE: u32 = 12;

/// The two most recent decoded samples, carried across frames
///
/// Prediction always runs over decoded history, never over the raw input,
/// so the state here matches what a decoder reconstructs bit for bit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct History {
    newer: i32,
    older: i32,
}

impl History {
    fn push(&mut self, sample: i32) {
        self.older = self.newer;
        self.newer = sample;
    }
}

/// The result of quantizing one frame against one coefficient pair
struct Candidate {
    error: i64,
    scale: u32,
    nibbles: [i32; SAMPLES_PER_FRAME],
    history: History,
}

/// Encode 16-bit PCM samples into LyN DSP frames
///
/// The output is always `ceil(len / 14) * 8` bytes; a trailing partial frame
/// is padded with zero samples before encoding.
pub fn encode(samples: &[i16]) -> Vec<u8> {
    encode_with_progress(samples, |_, _| ())
}

/// [`encode`], reporting progress after every frame as `(frames done, frames total)`
pub fn encode_with_progress(
    samples: &[i16],
    mut progress: impl FnMut(usize, usize),
) -> Vec<u8> {
    let frame_count = samples.len().div_ceil(SAMPLES_PER_FRAME);
    let mut encoded = Vec::with_capacity(frame_count * BYTES_PER_FRAME);

    let mut history = History::default();
    for (index, chunk) in samples.chunks(SAMPLES_PER_FRAME).enumerate() {
        let mut frame = [0; SAMPLES_PER_FRAME];
        frame[..chunk.len()].copy_from_slice(chunk);

        let (bytes, next) = encode_frame(&frame, history);
        encoded.extend_from_slice(&bytes);
        history = next;

        progress(index + 1, frame_count);
    }

    encoded
}

/// Decode LyN DSP frames back into 16-bit PCM
///
/// This is the exact feedback path the encoder simulates; it exists so that
/// reconstruction can be checked against the encoder's own error metric.
/// Trailing bytes that don't fill a whole frame are ignored.
pub fn decode(bytes: &[u8]) -> Vec<i16> {
    let mut samples = Vec::with_capacity(bytes.len() / BYTES_PER_FRAME * SAMPLES_PER_FRAME);

    let mut history = History::default();
    for frame in bytes.chunks_exact(BYTES_PER_FRAME) {
        let factor = 1 << (frame[0] & 0xF);
        let (c1, c2) = pair(usize::from(frame[0] >> 4) & 0x7);

        for index in 0..SAMPLES_PER_FRAME {
            let byte = frame[1 + index / 2];
            let bits = if index % 2 == 0 { byte >> 4 } else { byte & 0xF };
            let quantized = ((i32::from(bits)) << 28) >> 28;

            let decoded = reconstruct(quantized, factor, c1, c2, history);
            samples.push(decoded as i16);
            history.push(decoded);
        }
    }

    samples
}

/// Search all coefficient pairs for the best encoding of one frame
fn encode_frame(
    samples: &[i16; SAMPLES_PER_FRAME],
    history: History,
) -> ([u8; BYTES_PER_FRAME], History) {
    let mut best: Option<(usize, Candidate)> = None;

    for index in 0..COEFFICIENT_PAIRS.len() {
        let candidate = quantize(index, samples, history);

        // Strict comparison; ties go to the lowest coefficient index
        match &best {
            Some((_, leader)) if leader.error <= candidate.error => (),
            _ => best = Some((index, candidate)),
        }
    }

    let (index, chosen) = best.expect("the coefficient table is never empty");

    let mut bytes = [0; BYTES_PER_FRAME];
    bytes[0] = ((index as u8) << 4) | chosen.scale as u8;
    for (position, &nibble) in chosen.nibbles.iter().enumerate() {
        let bits = (nibble & 0xF) as u8;
        if position % 2 == 0 {
            bytes[1 + position / 2] = bits << 4;
        } else {
            bytes[1 + position / 2] |= bits;
        }
    }

    (bytes, chosen.history)
}

/// Quantize one frame against one coefficient pair at its best-fitting scale
fn quantize(index: usize, samples: &[i16; SAMPLES_PER_FRAME], history: History) -> Candidate {
    let (c1, c2) = pair(index);
    let scale = fit_scale(c1, c2, samples, history);
    let factor = 1 << scale;

    let mut state = history;
    let mut error = 0;
    let mut nibbles = [0; SAMPLES_PER_FRAME];

    for (nibble, &sample) in nibbles.iter_mut().zip(samples) {
        let weighted = c1 * state.newer + c2 * state.older;
        let residual = i32::from(sample) - ((weighted + 1024) >> 11);

        // Truncating division; negative residuals round toward zero
        let quantized = ((residual + (factor >> 1)) / factor).clamp(-8, 7);
        *nibble = quantized;

        let approximated = ((quantized * factor) << 11) + 1024 + weighted;
        let decoded = (approximated >> 11).clamp(-32768, 32767);
        let difference = i64::from(i32::from(sample) - decoded);
        error += difference * difference;

        state.push(decoded);
    }

    Candidate {
        error,
        scale,
        nibbles,
        history: state,
    }
}

/// Find the smallest scale whose 4-bit range covers the frame's residuals
///
/// The peak residual is measured along the ideal path, where the history is
/// advanced with the true input samples rather than decoded ones.
fn fit_scale(c1: i32, c2: i32, samples: &[i16; SAMPLES_PER_FRAME], history: History) -> u32 {
    let mut ideal = history;
    let mut peak = 0;

    for &sample in samples {
        let predicted = (c1 * ideal.newer + c2 * ideal.older + 1024) >> 11;
        peak = peak.max((i32::from(sample) - predicted).abs());
        ideal.push(i32::from(sample));
    }

    let mut scale = 0;
    while scale < MAX_SCALE && peak > (8 << scale) - 1 {
        scale += 1;
    }

    scale
}

/// Rebuild one sample from its quantized residual and the decoded history
fn reconstruct(quantized: i32, factor: i32, c1: i32, c2: i32, history: History) -> i32 {
    let weighted = c1 * history.newer + c2 * history.older;
    let approximated = ((quantized * factor) << 11) + 1024 + weighted;
    (approximated >> 11).clamp(-32768, 32767)
}

fn pair(index: usize) -> (i32, i32) {
    let (c1, c2) = COEFFICIENT_PAIRS[index];
    (i32::from(c1), i32::from(c2))
}
