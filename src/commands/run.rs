/// Main command: process the libraries and print the report
use anyhow::{Context, Result};

use libdoc_cache::cli_utils::split_list;
use libdoc_cache::config::{load_config_with_discovery, RunSettings};
use libdoc_cache::interpreter::ROBOT_MODULE;
use libdoc_cache::{
    BatchRunner, HostEnvironment, LibdocGenerator, LibraryProcessor, LibraryReference,
    ModuleResolver, PythonInterpreter, PythonLoader,
};

use crate::cli::Cli;

pub fn run(cli: Cli) -> Result<()> {
    let file_config = load_config_with_discovery(cli.config.as_deref())?;
    let settings = RunSettings::merge(cli.python, split_list(&cli.search_paths), file_config);

    let interpreter = PythonInterpreter::new(&settings.python, settings.search_paths);
    tracing::debug!(
        python = %interpreter.executable().display(),
        search_paths = ?interpreter.search_paths(),
        "using interpreter"
    );

    if !interpreter
        .has_module(ROBOT_MODULE)
        .context("Robot framework is not installed.")?
    {
        anyhow::bail!("Robot framework is not installed.");
    }

    let environment = HostEnvironment::probe(&interpreter)?;
    let references = LibraryReference::parse_list(&cli.libraries);

    let processor = LibraryProcessor::new(
        ModuleResolver::new(PythonLoader::new(interpreter.clone())),
        LibdocGenerator::new(interpreter),
    );
    let mut runner = BatchRunner::new(processor, environment);

    let report = runner.run(&references, &cli.cache_dir)?;
    println!("{}", report.to_json(cli.pretty)?);

    Ok(())
}
