use anyhow::Context;
use clap::Parser;
use console::style;
use foldersync::commands::sync;
use foldersync::config::{Cli, Command};
use foldersync::manifest::Manifest;
use foldersync::Config;
use std::path::Path;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", style("error:").red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "foldersync=error",
        1 => "foldersync=info",
        _ => "foldersync=debug",
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level)),
        )
        .init();
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    match cli.command {
        Command::Sync(args) => {
            let config = Config::try_from(args)?;
            let report = sync::run(&config)?;

            println!("{}", report.summary());
            match report.error_summary() {
                Some(errors) => {
                    eprintln!("{}", style(errors).yellow());
                    Ok(ExitCode::FAILURE)
                }
                None => Ok(ExitCode::SUCCESS),
            }
        }
        Command::Inspect { folder } => {
            inspect(&folder)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn inspect(folder: &Path) -> anyhow::Result<()> {
    let manifest = Manifest::load(folder)
        .with_context(|| format!("no readable manifest in {}", folder.display()))?;

    println!("foldersync v{}", foldersync::VERSION);
    println!("  Sync type:     {}", manifest.sync_type);
    println!("  Source:        {}", manifest.first_folder.display());
    println!("  Destination:   {}", manifest.last_folder.display());
    println!("  Last modified: {}", manifest.last_modified);
    if let Some(root) = manifest.root() {
        println!("  Files:         {}", root.file_count());
        println!("  Folders:       {}", root.dir_count());
    }
    Ok(())
}
