//! Conversion of standard 16-bit PCM WAV audio into the sound containers
//! used by Ubisoft's LyN engine (Rabbids Go Home and friends).
//!
//! The engine accepts two payload codecs inside its RIFF-shaped SNS and
//! SON containers: GameCube ADPCM ("DSP"), encoded right here in
//! [`adpcm`], and Vorbis ("OGG"), where an externally encoded stream is
//! [repackaged](ogg::rewrite_vendor) to carry the vendor string the engine
//! expects. Multi-channel payloads are multiplexed by [`interleave`] and
//! wrapped by [`container`], optionally splicing in beat markers harvested
//! from a reference file.
//!
//! This crate does everything byte-exact and nothing more: resampling and
//! Vorbis compression are jobs for external tools.

pub mod adpcm;
pub mod container;
pub mod interleave;
pub mod ogg;
pub mod wav;
