//! The `beats` subcommand

use anyhow::{Context, Result};
use clap::Args;
use lyn::container::BeatChunk;
use std::path::PathBuf;

/// Report the beat markers stored in a reference SNS file
#[derive(Args)]
#[clap(author, version)]
pub struct BeatsArgs {
    /// The reference SNS to inspect
    path: PathBuf,
}

pub fn beats(args: &BeatsArgs) -> Result<()> {
    let bytes = std::fs::read(&args.path)
        .with_context(|| format!("Reading {} failed", args.path.display()))?;

    let chunk = BeatChunk::from_sns(&bytes).context("Harvesting the beat chunk failed")?;

    println!(
        "{} | {} beat markers | {} bytes",
        args.path.display(),
        chunk.marker_count(),
        chunk.as_bytes().len()
    );

    Ok(())
}
