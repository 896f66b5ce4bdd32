//! CLI entry point for batch interpretation of SOM class maps

use clap::Parser;
use somgrid::io::cli::{Cli, FileProcessor};

fn main() -> somgrid::Result<()> {
    let cli = Cli::parse();
    let mut processor = FileProcessor::new(cli);
    processor.process()
}
