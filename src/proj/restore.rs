use crate::error::CommandError;
use crate::proj::config::Config;
use crate::proj::fsutil::{move_path, remove_path};
use crate::proj::list::{greatest_path, quarter_dirs};
use crate::proj::warn::{self, WarnEvent};
use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreMatch {
    pub source: PathBuf,
    pub compressed: bool,
    /// How many archived entries matched before picking `source`.
    pub candidates: usize,
}

fn find_named(archive_dir: &Path, file_name: &str) -> Result<Vec<PathBuf>> {
    Ok(quarter_dirs(archive_dir)?
        .into_iter()
        .map(|(_, dir)| dir.join(file_name))
        .filter(|path| fs::symlink_metadata(path).is_ok())
        .collect())
}

fn normalize_name(name: &str) -> &str {
    name.trim_end_matches(['/', '\\'])
}

/// Locate the archived entry for `name`, preferring an uncompressed match.
///
/// Duplicates resolve to the lexicographically greatest path, which follows
/// year/quarter order but is not a true mtime comparison.
pub fn find_restore_match(name: &str, config: &Config) -> Result<RestoreMatch> {
    let name = normalize_name(name);
    let mut compressed = false;
    let mut matches = find_named(&config.archive_dir, name)?;
    if matches.is_empty() {
        let packed = format!("{name}{}", config.compression_extension());
        matches = find_named(&config.archive_dir, &packed)?;
        compressed = true;
    }

    let candidates = matches.len();
    let Some(source) = greatest_path(matches) else {
        return Err(CommandError::NoMatch(name.to_string()).into());
    };

    if candidates > 1 {
        warn::emit(WarnEvent {
            code: "MULTIPLE_MATCHES",
            stage: "restore",
            action: "pick-greatest-path",
            project: name,
            archive: &source.display().to_string(),
            reason: "duplicate-archive-entries",
            err: &format!("{candidates} candidates"),
        });
    }

    Ok(RestoreMatch {
        source,
        compressed,
        candidates,
    })
}

/// Where `name` would be restored to inside `work_dir`, provided nothing is there yet.
pub fn restore_target(name: &str, work_dir: &Path) -> Result<PathBuf> {
    let name = normalize_name(name);
    let target = work_dir.join(name);
    if fs::symlink_metadata(&target).is_ok() {
        return Err(CommandError::RestoreTargetExists(name.to_string()).into());
    }
    Ok(target)
}

fn discard_partial_restore(target: &Path, artifact: &Path) {
    if fs::symlink_metadata(target).is_err() {
        return;
    }
    if let Err(err) = remove_path(target) {
        warn::emit(WarnEvent {
            code: "PARTIAL_RESTORE_CLEANUP_FAILED",
            stage: "restore",
            action: "remove-partial-target",
            project: &target.display().to_string(),
            archive: &artifact.display().to_string(),
            reason: "unpack-failed",
            err: &format!("{err:#}"),
        });
    }
}

/// Reverse the archive step for an already-located match.
pub fn restore_from(found: &RestoreMatch, target: &Path, config: &Config) -> Result<()> {
    if !found.compressed {
        return move_path(&found.source, target);
    }

    if let Err(err) = config.compression_format.unpack(&found.source, target) {
        discard_partial_restore(target, &found.source);
        return Err(err);
    }
    fs::remove_file(&found.source)
        .with_context(|| format!("failed to remove {}", found.source.display()))
}

/// Restore `name` into `work_dir`, returning the archived entry that was used.
pub fn restore_into(name: &str, config: &Config, work_dir: &Path) -> Result<RestoreMatch> {
    let target = restore_target(name, work_dir)?;
    let found = find_restore_match(name, config)?;
    restore_from(&found, &target, config)?;
    Ok(found)
}

/// Restore `name` from the archive into the current directory.
pub fn restore(name: &str, config: &Config) -> Result<RestoreMatch> {
    let cwd = env::current_dir().context("failed to resolve current directory")?;
    restore_into(name, config, &cwd)
}
