// src/bin/dedupe.rs
use clap::Parser;
use poem_scrape::cli::{run_dedupe, DedupeArgs};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = DedupeArgs::parse();
    poem_scrape::log::init(&args.log_level);
    run_dedupe(&args)
}
