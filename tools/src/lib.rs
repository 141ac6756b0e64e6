//! # LyN Tools
//!
//! The [LyN engine](https://en.wikipedia.org/wiki/Rabbids_Go_Home) behind Rabbids Go Home and a handful of other Ubisoft titles streams its audio from proprietary SNS and SON containers. This crate provides a command-line utility that converts standard 16-bit PCM WAV files into those containers, encoding to GameCube ADPCM in-process or wrapping externally compressed Vorbis.
//!
//! Resampling, downmixing and Vorbis compression are delegated to `ffmpeg`/`oggenc`, which need to be on your `PATH` for the options that use them.
//!
//! ## Convert
//!
//! ```console
//! lyn-tools-convert 0.1.0
//! Stijn Frishert <info@stijnfrishert.com>
//! Convert a WAV file into an SNS or SON container
//!
//! USAGE:
//!     lyn-tools convert [OPTIONS] <INPUT>
//!
//! ARGS:
//!     <INPUT>    The 16-bit PCM WAV file to convert
//!
//! OPTIONS:
//!     -c, --codec <CODEC>              The payload codec [default: dsp] [possible values: dsp, ogg]
//!         --container <CONTAINER>      The container envelope [default: sns] [possible values: sns, son]
//!         --beats <BEATS>              Splice the beat markers of this reference SNS into the output (SNS only)
//!         --four-channel               Duplicate stereo DSP channels into a four-channel SON
//!     -h, --help                       Print help information
//!         --just-dance                 Prepend the Just-Dance header (SNS only)
//!     -m, --mono                       Downmix multi-channel input to mono before encoding
//!     -n, --normalize                  Apply loudness normalization before encoding
//!     -o, --output <OUTPUT>            The output path; defaults to the input with the container's extension
//!     -r, --sample-rate <SAMPLE_RATE>  Resample to this rate before encoding
//!     -V, --version                    Print version information
//! ```
//!
//! ### Example
//!
//! ```console
//! 4ntler@mbp > lyn-tools convert -r 32000 menu_theme.wav
//! menu_theme.wav | 32000 Hz | 2 channel(s) | 481280 frames
//!   encoding channel 1/2
//!   encoding channel 2/2
//! Wrote menu_theme.sns (550134 bytes)
//! ```
//!
//! ## Beats
//!
//! ```console
//! lyn-tools-beats 0.1.0
//! Stijn Frishert <info@stijnfrishert.com>
//! Inspect the beat markers of a reference SNS
//!
//! USAGE:
//!     lyn-tools beats <PATH>
//!
//! ARGS:
//!     <PATH>    The reference SNS to inspect
//!
//! OPTIONS:
//!     -h, --help       Print help information
//!     -V, --version    Print version information
//! ```
//!
//! ### Example
//!
//! ```console
//! 4ntler@mbp > lyn-tools beats just_dance_track.sns
//! just_dance_track.sns | 128 beat markers | 1544 bytes
//! ```

pub mod beats;
pub mod convert;
pub mod external;
