use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands::{self, CommandReport};
use crate::proj::codec::CompressionFormat;

/// proj is a tool for managing many different projects, and archiving
/// projects that you're no longer actively working on.
///
/// It assumes you have a working folder containing active projects, and an
/// archive folder with inactive projects. proj organises inactive projects by
/// year and by quarter (e.g. 2013/q3/my-project).
///
/// The archive directory comes from PROJ_ARCHIVE or the config file written by
/// `proj init`.
#[derive(Debug, Parser)]
#[command(name = "proj", version)]
struct Cli {
    /// Print the command report as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Move an active project to the archive.
    Archive {
        #[arg(required = true, value_name = "FOLDER")]
        folders: Vec<PathBuf>,
        /// Don't make any changes.
        #[arg(short = 'n', long)]
        dry_run: bool,
        /// Do not compress the folder.
        #[arg(long)]
        no_compress: bool,
    },
    /// List the contents of the archive directory.
    List {
        #[arg(value_name = "PATTERN")]
        patterns: Vec<String>,
    },
    /// Restore a project from the archive.
    Restore {
        #[arg(value_name = "FOLDER")]
        name: String,
    },
    /// Write a config file pointing at an archive directory.
    Init {
        archive_dir: PathBuf,
        /// Archive folders without compressing them.
        #[arg(long)]
        no_compress: bool,
        /// Compression format: tar, gztar, bztar or xztar.
        #[arg(long, value_parser = parse_format)]
        format: Option<CompressionFormat>,
        /// Overwrite an existing config file.
        #[arg(long)]
        force: bool,
    },
    /// Show resolved paths and configuration.
    Status,
}

fn parse_format(raw: &str) -> Result<CompressionFormat, String> {
    raw.parse::<CompressionFormat>().map_err(|err| err.to_string())
}

fn render(report: &CommandReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for line in &report.details {
        println!("{line}");
    }
    for issue in &report.issues {
        eprintln!("error: {issue}");
    }
    Ok(())
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let report = match &cli.command {
        Command::Archive {
            folders,
            dry_run,
            no_compress,
        } => commands::archive::run(&commands::archive::ArchiveOptions {
            folders: folders.clone(),
            dry_run: *dry_run,
            no_compress: *no_compress,
        })?,
        Command::List { patterns } => commands::list::run(patterns)?,
        Command::Restore { name } => commands::restore::run(name)?,
        Command::Init {
            archive_dir,
            no_compress,
            format,
            force,
        } => commands::init::run(&commands::init::InitOptions {
            archive_dir: archive_dir.clone(),
            no_compress: *no_compress,
            format: *format,
            force: *force,
        })?,
        Command::Status => commands::status::run()?,
    };

    render(&report, cli.json)?;
    if !report.ok {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn archive_accepts_short_dry_run() {
        let cli = Cli::try_parse_from(["proj", "archive", "-n", "a", "b"]).expect("parse");
        match cli.command {
            Command::Archive {
                folders,
                dry_run,
                no_compress,
            } => {
                assert_eq!(folders, vec![PathBuf::from("a"), PathBuf::from("b")]);
                assert!(dry_run);
                assert!(!no_compress);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn archive_requires_a_folder() {
        assert!(Cli::try_parse_from(["proj", "archive"]).is_err());
    }

    #[test]
    fn init_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["proj", "init", "/srv", "--format", "cheese"]).is_err());
        let cli =
            Cli::try_parse_from(["proj", "init", "/srv", "--format", "xztar"]).expect("parse");
        assert!(matches!(
            cli.command,
            Command::Init {
                format: Some(CompressionFormat::Xztar),
                ..
            }
        ));
    }
}
