mod cli;
mod commands;

use clap::Parser;

use cli::Cli;
use libdoc_cache::cli_utils::libdoc_cache_prefix;
use libdoc_cache::logging;

fn main() {
    // Initialize structured logging (stderr only)
    logging::init();

    // Parse CLI arguments; usage errors exit non-zero before anything runs
    let cli = Cli::parse();

    if let Err(e) = commands::run::run(cli) {
        eprintln!("{} {:#}", libdoc_cache_prefix(), e);
        std::process::exit(1);
    }
}
