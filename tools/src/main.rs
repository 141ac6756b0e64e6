use anyhow::Result;
use clap::Parser;
use lyn_tools::{
    beats::{beats, BeatsArgs},
    convert::{convert, ConvertArgs},
};

#[derive(Parser)]
#[clap(author, version, about = "Convert WAV audio to LyN engine sound containers")]
enum Cli {
    /// Convert a WAV file into an SNS or SON container
    Convert(ConvertArgs),

    /// Inspect the beat markers of a reference SNS
    Beats(BeatsArgs),
}

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse() {
        Cli::Convert(args) => convert(args),
        Cli::Beats(args) => beats(&args),
    }
}
