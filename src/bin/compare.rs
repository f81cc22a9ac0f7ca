// src/bin/compare.rs
use clap::Parser;
use poem_scrape::cli::{run_compare, CompareArgs};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = CompareArgs::parse();
    poem_scrape::log::init(&args.log_level);
    run_compare(&args)
}
