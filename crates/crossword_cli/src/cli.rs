use std::path::PathBuf;

use clap::{ArgAction, Parser};
use crossword_engine::CrosswordType;

#[derive(Parser, Debug)]
#[command(
    name = "smh-crossword",
    version,
    about = "Download Sydney Morning Herald crosswords as Across Lite files"
)]
pub struct Cli {
    #[arg(
        value_name = "{cryptic|mini|quick}...",
        default_values_t = [CrosswordType::Cryptic],
        help = "Crossword types to download"
    )]
    pub types: Vec<CrosswordType>,
    #[arg(
        short = 'd',
        long = "date",
        value_name = "DATE",
        help = "Single date or inclusive range in the form START:END. Accepts most formats; defaults to today in Sydney"
    )]
    pub date: Option<String>,
    #[arg(
        short,
        long,
        default_value = ".",
        help = "Output directory for multiple files, or a filename when a single crossword is requested"
    )]
    pub output: PathBuf,
    #[arg(long, value_name = "FILE", help = "RON file with fetch settings")]
    pub config: Option<PathBuf>,
    #[arg(long, value_name = "URL", help = "Override the crossword base URL")]
    pub base_url: Option<String>,
    #[arg(long, value_name = "FILE", help = "Also append log output to this file")]
    pub log_file: Option<PathBuf>,
    #[arg(short, long, action = ArgAction::Count, help = "Increase log verbosity")]
    pub verbose: u8,
}

impl Cli {
    /// Requested types without repeats, in the order given.
    pub fn unique_types(&self) -> Vec<CrosswordType> {
        let mut kinds = Vec::with_capacity(self.types.len());
        for kind in &self.types {
            if !kinds.contains(kind) {
                kinds.push(*kind);
            }
        }
        kinds
    }
}
