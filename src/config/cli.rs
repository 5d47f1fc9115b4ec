//! Command-line arguments

use super::{Config, FileConfig};
use crate::types::{FolderPair, SyncError, SyncMode};
use clap::{ArgGroup, Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;

/// One-way folder synchronization
#[derive(Debug, Parser)]
#[command(name = "foldersync", version, about)]
pub struct Cli {
    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Mirror SOURCE onto DESTINATION
    Sync(SyncArgs),

    /// Show the manifest stored in a synced source folder
    Inspect {
        /// Folder containing JSONSync.json
        folder: PathBuf,
    },
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("mode").required(true).args(["single", "multi"])))]
pub struct SyncArgs {
    /// Sync one host folder to one destination
    #[arg(short = 's', long)]
    pub single: bool,

    /// Multi-folder sync (not available yet)
    #[arg(short = 'm', long)]
    pub multi: bool,

    /// Host folder whose contents are mirrored
    pub source: PathBuf,

    /// Folder receiving the copies
    pub destination: PathBuf,

    /// Worker threads
    #[arg(long)]
    pub threads: Option<usize>,

    /// TOML file with default settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Do not fsync copied files
    #[arg(long)]
    pub no_fsync: bool,

    /// Skip files whose destination copy has the same size and mtime
    #[arg(long)]
    pub skip_unchanged: bool,

    /// Hide progress bars
    #[arg(short, long)]
    pub quiet: bool,
}

impl TryFrom<SyncArgs> for Config {
    type Error = SyncError;

    /// Defaults, then the config file, then flags.
    fn try_from(args: SyncArgs) -> Result<Self, Self::Error> {
        let mode = if args.multi {
            SyncMode::Multi
        } else {
            SyncMode::Single
        };
        let folders = FolderPair::new(
            absolute(args.source),
            absolute(args.destination),
            mode,
        );

        let mut config = Config::new(folders);
        config.show_progress = true;
        if let Some(path) = &args.config {
            config = config.merge_file(&FileConfig::load(path)?);
        }

        if let Some(threads) = args.threads {
            config.threads = threads;
        }
        if args.no_fsync {
            config.fsync = false;
        }
        if args.skip_unchanged {
            config.skip_unchanged = true;
        }
        if args.quiet {
            config.show_progress = false;
        }
        Ok(config)
    }
}

// Missing paths are left as given; validation reports them later.
fn absolute(path: PathBuf) -> PathBuf {
    fs::canonicalize(&path).unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("foldersync").chain(args.iter().copied()))
    }

    fn sync_args(cli: Cli) -> SyncArgs {
        match cli.command {
            Command::Sync(args) => args,
            other => panic!("expected sync, got {other:?}"),
        }
    }

    #[test]
    fn test_sync_requires_a_mode_flag() {
        assert!(parse(&["sync", "/a", "/b"]).is_err());
        assert!(parse(&["sync", "-s", "-m", "/a", "/b"]).is_err());
        assert!(parse(&["sync", "--single", "/a", "/b"]).is_ok());
    }

    #[test]
    fn test_cli_flags_override_defaults() {
        let args = sync_args(
            parse(&["sync", "-s", "/a", "/b", "--threads", "2", "--no-fsync", "--quiet"])
                .expect("valid args"),
        );
        let config = Config::try_from(args).expect("config");
        assert_eq!(config.threads, 2);
        assert!(!config.fsync);
        assert!(!config.show_progress);
        assert!(!config.skip_unchanged);
        assert_eq!(config.folders.mode(), SyncMode::Single);
    }

    #[test]
    fn test_skip_unchanged_flag() {
        let args = sync_args(
            parse(&["sync", "-s", "/a", "/b", "--skip-unchanged"]).expect("valid args"),
        );
        let config = Config::try_from(args).expect("config");
        assert!(config.skip_unchanged);
    }

    #[test]
    fn test_multi_flag_selects_multi_mode() {
        let args = sync_args(parse(&["sync", "-m", "/a", "/b"]).expect("valid args"));
        let config = Config::try_from(args).expect("config");
        assert_eq!(config.folders.mode(), SyncMode::Multi);
    }

    #[test]
    fn test_flags_win_over_config_file() {
        let temp = TempDir::new().expect("create temp dir");
        let file = temp.path().join("foldersync.toml");
        fs::write(&file, "threads = 16\nskip_unchanged = true\n").expect("write config");
        let file_arg = file.to_string_lossy().into_owned();

        let args = sync_args(
            parse(&["sync", "-s", "/a", "/b", "--config", &file_arg, "--threads", "3"])
                .expect("valid args"),
        );
        let config = Config::try_from(args).expect("config");
        assert_eq!(config.threads, 3);
        assert!(config.skip_unchanged);
    }

    #[test]
    fn test_existing_paths_are_made_absolute() {
        let temp = TempDir::new().expect("create temp dir");
        let src = temp.path().join("src");
        fs::create_dir(&src).expect("create src");
        let dotted = src.join("..").join("src");
        let dotted_arg = dotted.to_string_lossy().into_owned();

        let args = sync_args(parse(&["sync", "-s", &dotted_arg, "/b"]).expect("valid args"));
        let config = Config::try_from(args).expect("config");
        assert_eq!(
            config.folders.source(),
            fs::canonicalize(&src).expect("canonicalize")
        );
    }

    #[test]
    fn test_inspect_subcommand() {
        let cli = parse(&["-v", "inspect", "/a"]).expect("valid args");
        assert_eq!(cli.verbose, 1);
        assert!(matches!(cli.command, Command::Inspect { .. }));
    }
}
