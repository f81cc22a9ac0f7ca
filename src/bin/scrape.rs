// src/bin/scrape.rs
use clap::Parser;
use poem_scrape::cli::{run_scrape, ScrapeArgs};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = ScrapeArgs::parse();
    poem_scrape::log::init(&args.log_level);
    run_scrape(&args)
}
