// src/bin/shortlist.rs
use clap::Parser;
use poem_scrape::cli::{run_shortlist, ShortlistArgs};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = ShortlistArgs::parse();
    poem_scrape::log::init(&args.log_level);
    run_shortlist(&args)
}
