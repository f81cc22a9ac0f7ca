// src/bin/forum_post.rs
use clap::Parser;
use poem_scrape::cli::{run_forum, ForumArgs};

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = ForumArgs::parse();
    poem_scrape::log::init(&args.log_level);
    run_forum(&args)
}
