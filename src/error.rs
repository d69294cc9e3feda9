use std::path::PathBuf;

use thiserror::Error;

/// User-facing failures. `main` prints these as a one-line message and exits 1;
/// anything else is treated as an underlying fault and printed with its cause chain.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("folder does not exist: {}", .0.display())]
    SourceMissing(PathBuf),
    #[error("no files in folder: {}", .0.display())]
    NoFiles(PathBuf),
    #[error("archive destination already exists: {}", .0.display())]
    DestinationExists(PathBuf),
    #[error("a folder of the same name already exists: {0}")]
    RestoreTargetExists(String),
    #[error("no project matches: {0}")]
    NoMatch(String),
    #[error("please set PROJ_ARCHIVE to your archive's location")]
    ArchiveDirUnset,
    #[error("archive directory does not exist: {}", .0.display())]
    ArchiveDirMissing(PathBuf),
    #[error("unknown compression format: {0} (use tar, gztar, bztar or xztar)")]
    UnknownFormat(String),
    #[error("config file already exists: {} (use --force to overwrite)", .0.display())]
    ConfigExists(PathBuf),
}

/// One-line rendering for the CLI: bare message for user errors, full cause
/// chain for everything else.
pub fn describe(err: &anyhow::Error) -> String {
    match err.downcast_ref::<CommandError>() {
        Some(command_err) => command_err.to_string(),
        None => format!("{err:#}"),
    }
}
