// src/bin/bands.rs
use clap::Parser;
use poem_scrape::cli::{run_bands, BandArgs};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = BandArgs::parse();
    poem_scrape::log::init(&args.log_level);
    run_bands(&args)
}
