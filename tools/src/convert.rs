//! The WAV → SNS/SON conversion pipeline

use crate::external;
use anyhow::{bail, Context, Result};
use clap::{Args, ValueEnum};
use lyn::{
    adpcm,
    container::{BeatChunk, Codec, Extras, SoundData},
    interleave,
    ogg,
    wav::PcmWav,
};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;

/// Convert a WAV file into a LyN sound container
#[derive(Args)]
#[clap(author, version)]
pub struct ConvertArgs {
    /// The 16-bit PCM WAV file to convert
    input: PathBuf,

    /// The output path; defaults to the input with the container's extension
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// The payload codec
    #[clap(short, long, value_enum, default_value = "dsp")]
    codec: CodecChoice,

    /// The container envelope
    #[clap(long, value_enum, default_value = "sns")]
    container: ContainerChoice,

    /// Resample to this rate before encoding
    #[clap(short = 'r', long)]
    sample_rate: Option<u32>,

    /// Downmix multi-channel input to mono before encoding
    #[clap(short, long)]
    mono: bool,

    /// Apply loudness normalization before encoding
    #[clap(short, long)]
    normalize: bool,

    /// Duplicate stereo DSP channels into a four-channel SON
    #[clap(long)]
    four_channel: bool,

    /// Prepend the Just-Dance header (SNS only)
    #[clap(long)]
    just_dance: bool,

    /// Splice the beat markers of this reference SNS into the output (SNS only)
    #[clap(long)]
    beats: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecChoice {
    Dsp,
    Ogg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerChoice {
    Sns,
    Son,
}

pub fn convert(args: ConvertArgs) -> Result<()> {
    validate(&args)?;

    let extras = match &args.beats {
        Some(reference) => Extras::CustomBeats(
            BeatChunk::from_file(reference)
                .with_context(|| format!("Harvesting beats from {} failed", reference.display()))?,
        ),
        None if args.just_dance => Extras::JustDance,
        None => Extras::None,
    };

    let original = PcmWav::from_file(&args.input)
        .with_context(|| format!("Reading {} failed", args.input.display()))?;

    // Everything transient lives in here and is unlinked when we leave,
    // whether or not the conversion makes it to the end
    let workspace = tempfile::tempdir().context("Could not create a working directory")?;

    let (wav, source) = match preprocessed(&args, &original, workspace.path())? {
        Some(path) => (
            PcmWav::from_file(&path).context("Reading the preprocessed WAV failed")?,
            path,
        ),
        None => (original, args.input.clone()),
    };

    println!(
        "{} | {} Hz | {} channel(s) | {} frames",
        args.input.display(),
        wav.sample_rate,
        wav.channel_count,
        wav.frame_count()
    );

    let (codec, payload) = match args.codec {
        CodecChoice::Dsp => (Codec::Dsp, dsp_payload(&wav, args.four_channel)?),
        CodecChoice::Ogg => (
            Codec::Vorbis,
            vorbis_payload(&wav, &source, workspace.path())?,
        ),
    };

    let data = SoundData {
        codec,
        channel_count: wav.channel_count,
        sample_rate: wav.sample_rate,
        sample_count: wav.frame_count() as u32,
        payload,
    };

    let bytes = match args.container {
        ContainerChoice::Sns => data.to_sns(&extras),
        ContainerChoice::Son => data.to_son(args.four_channel),
    };

    let destination = output_path(&args);
    write_atomically(&destination, &bytes)
        .with_context(|| format!("Writing {} failed", destination.display()))?;

    println!("Wrote {} ({} bytes)", destination.display(), bytes.len());
    Ok(())
}

/// Reject option combinations the containers can't express
fn validate(args: &ConvertArgs) -> Result<()> {
    if args.four_channel {
        if args.container != ContainerChoice::Son {
            bail!("--four-channel is only available for SON output");
        }

        if args.codec != CodecChoice::Dsp {
            bail!("--four-channel is only available for the DSP codec");
        }
    }

    if args.container == ContainerChoice::Son && (args.just_dance || args.beats.is_some()) {
        bail!("--just-dance and --beats are only available for SNS output");
    }

    if args.just_dance && args.beats.is_some() {
        bail!("--just-dance and --beats cannot be combined");
    }

    Ok(())
}

/// Run the external preprocessor if any preprocessing was asked for
///
/// Returns the path of the preprocessed WAV inside the workspace, or
/// [`None`] when the input can be encoded as-is.
fn preprocessed(
    args: &ConvertArgs,
    original: &PcmWav,
    workspace: &Path,
) -> Result<Option<PathBuf>> {
    let mono = args.mono && original.channel_count > 1;
    let resample = args.sample_rate.filter(|&rate| rate != original.sample_rate);

    if !mono && resample.is_none() && !args.normalize {
        return Ok(None);
    }

    let output = workspace.join("preprocessed.wav");
    external::preprocess(&args.input, &output, resample, mono, args.normalize)
        .context("Preprocessing the input failed")?;

    Ok(Some(output))
}

/// Encode every channel to DSP frames and interleave them
fn dsp_payload(wav: &PcmWav, four_channel: bool) -> Result<Vec<u8>> {
    if four_channel && wav.channel_count != 2 {
        bail!(
            "--four-channel requires stereo input, got {} channel(s)",
            wav.channel_count
        );
    }

    let mut streams = Vec::with_capacity(wav.channel_count as usize);
    for channel in 0..wav.channel_count {
        println!("  encoding channel {}/{}", channel + 1, wav.channel_count);
        streams.push(adpcm::encode(&wav.channel(channel)));
    }

    if four_channel {
        // Channels 2 and 3 are byte-for-byte copies of 0 and 1
        let duplicates = streams.clone();
        streams.extend(duplicates);
    }

    Ok(interleave::dsp_channels(&streams))
}

/// Compress every channel to Vorbis, repackage, and block-interleave
fn vorbis_payload(wav: &PcmWav, source: &Path, workspace: &Path) -> Result<Vec<u8>> {
    let mut streams = Vec::with_capacity(wav.channel_count as usize);
    for channel in 0..wav.channel_count {
        println!("  compressing channel {}/{}", channel + 1, wav.channel_count);

        let channel_wav = if wav.channel_count == 1 {
            source.to_path_buf()
        } else {
            let path = workspace.join(format!("channel{channel}.wav"));
            external::extract_channel(source, &path, channel)
                .context("Splitting the input into channels failed")?;
            path
        };

        let encoded = workspace.join(format!("channel{channel}.ogg"));
        external::encode_vorbis(&channel_wav, &encoded).context("Vorbis encoding failed")?;

        let bytes = fs::read(&encoded).context("Reading the encoded Vorbis stream failed")?;
        streams.push(ogg::rewrite_vendor(&bytes));
    }

    Ok(interleave::vorbis_channels(&streams))
}

fn output_path(args: &ConvertArgs) -> PathBuf {
    match &args.output {
        Some(path) => path.clone(),
        None => args.input.with_extension(match args.container {
            ContainerChoice::Sns => "sns",
            ContainerChoice::Son => "son",
        }),
    }
}

/// Write the container in one observable step
///
/// The bytes land in a temporary file next to the destination first, then
/// move into place with a rename; a half-written output never exists under
/// the destination name.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(directory)?;
    file.write_all(bytes)?;
    file.persist(path)?;
    Ok(())
}
