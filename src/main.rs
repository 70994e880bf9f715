/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Main executable for crystal-graph

use clap::Parser;
use crystal_graph::cli::{self, Cli};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG overrides the -v flags
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(cli.log_level()))
        .init();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    cli::run(&cli, &mut out)
}
