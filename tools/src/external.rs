//! Driving the external resampler and Vorbis encoder
//!
//! Resampling, downmixing, loudness normalization and Vorbis compression
//! are delegated to `ffmpeg` (and `oggenc`, when available). The commands
//! run to completion before conversion continues; their stderr only
//! surfaces in the debug log.

use std::{
    env, io,
    path::{Path, PathBuf},
    process::{Command, ExitStatus},
};
use thiserror::Error;

/// Resample/downmix/normalize a WAV into a fresh 16-bit PCM WAV
pub fn preprocess(
    input: &Path,
    output: &Path,
    sample_rate: Option<u32>,
    mono: bool,
    normalize: bool,
) -> Result<(), ToolError> {
    let mut command = Command::new(locate("ffmpeg")?);
    command.arg("-y").arg("-i").arg(input);

    if mono {
        command.args(["-ac", "1"]);
    }

    if let Some(rate) = sample_rate {
        command.args(["-ar", &rate.to_string()]);
    }

    if normalize {
        command.args(["-af", "loudnorm=I=-16:TP=-1.5:LRA=11"]);
    }

    command.arg(output);
    run("ffmpeg", &mut command)
}

/// Extract a single channel of a WAV into its own mono WAV
pub fn extract_channel(input: &Path, output: &Path, channel: u16) -> Result<(), ToolError> {
    let mut command = Command::new(locate("ffmpeg")?);
    command
        .arg("-y")
        .arg("-i")
        .arg(input)
        .arg("-filter_complex")
        .arg(format!("[0:a]pan=mono|c0=c{channel}[a]"))
        .args(["-map", "[a]"])
        .arg(output);

    run("ffmpeg", &mut command)
}

/// Compress a WAV into an Ogg Vorbis stream at quality 6
///
/// `oggenc` is preferred when it can be found; otherwise `ffmpeg`'s
/// libvorbis backend produces an equivalent stream.
pub fn encode_vorbis(input: &Path, output: &Path) -> Result<(), ToolError> {
    if let Ok(oggenc) = locate("oggenc") {
        let mut command = Command::new(oggenc);
        command.args(["-q", "6", "-o"]).arg(output).arg(input);
        return run("oggenc", &mut command);
    }

    let mut command = Command::new(locate("ffmpeg")?);
    command
        .arg("-y")
        .arg("-i")
        .arg(input)
        .args(["-c:a", "libvorbis", "-q:a", "6"])
        .arg(output);

    run("ffmpeg", &mut command)
}

/// Find a tool on the `PATH`
fn locate(name: &'static str) -> Result<PathBuf, ToolError> {
    let paths = env::var_os("PATH").ok_or(ToolError::Missing(name))?;

    for directory in env::split_paths(&paths) {
        for candidate in [directory.join(name), directory.join(format!("{name}.exe"))] {
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }

    Err(ToolError::Missing(name))
}

/// Run a prepared command to completion, requiring a zero exit code
fn run(tool: &'static str, command: &mut Command) -> Result<(), ToolError> {
    log::debug!("running {command:?}");

    let output = command.output()?;
    if !output.status.success() {
        log::debug!("{tool} stderr: {}", String::from_utf8_lossy(&output.stderr));
        return Err(ToolError::Failed {
            tool,
            status: output.status,
        });
    }

    Ok(())
}

/// An error describing what could go wrong driving an external tool
#[derive(Debug, Error)]
pub enum ToolError {
    /// The tool is not installed anywhere on the `PATH`
    #[error("Could not find `{0}` on the PATH")]
    Missing(&'static str),

    /// The tool ran but reported failure
    #[error("`{tool}` exited with {status}")]
    Failed {
        tool: &'static str,
        status: ExitStatus,
    },

    /// The tool could not be spawned or awaited
    #[error("Running the external tool failed")]
    Io(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locate_reports_missing_tools() {
        assert!(matches!(
            locate("surely-not-an-installed-tool"),
            Err(ToolError::Missing(_))
        ));
    }
}
