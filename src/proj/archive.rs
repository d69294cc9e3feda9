use crate::error::CommandError;
use crate::proj::codec::CompressionFormat;
use crate::proj::config::Config;
use crate::proj::fsutil::{last_modified, mkdir_p, move_path, remove_path};
use crate::proj::quarter::quarter_of;
use crate::proj::warn::{self, WarnEvent};
use anyhow::{Context, Result, anyhow};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Where one project goes, computed before anything is touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchivePlan {
    pub source: PathBuf,
    /// Final location, including the compression extension when `compressed`.
    pub destination: PathBuf,
    pub compressed: bool,
}

fn project_name(source: &Path) -> Result<OsString> {
    if let Some(name) = source.file_name() {
        return Ok(name.to_owned());
    }
    let canonical = fs::canonicalize(source)
        .with_context(|| format!("failed to resolve {}", source.display()))?;
    canonical
        .file_name()
        .map(ToOwned::to_owned)
        .ok_or_else(|| anyhow!("cannot derive a project name from {}", source.display()))
}

fn with_extension_suffix(path: &Path, ext: &str) -> PathBuf {
    let mut raw = path.as_os_str().to_owned();
    raw.push(ext);
    PathBuf::from(raw)
}

/// `<archive_dir>/<year>/<quarter>/<basename>` for `source`, without any extension.
pub fn archive_path(source: &Path, config: &Config) -> Result<PathBuf> {
    if !source.exists() {
        return Err(CommandError::SourceMissing(source.to_path_buf()).into());
    }
    let Some(t) = last_modified(source)? else {
        return Err(CommandError::NoFiles(source.to_path_buf()).into());
    };

    let (year, quarter) = quarter_of(&t);
    Ok(config
        .archive_dir
        .join(year)
        .join(quarter)
        .join(project_name(source)?))
}

pub fn plan_archive(source: &Path, config: &Config) -> Result<ArchivePlan> {
    let dest = archive_path(source, config)?;
    let compressed = config.compression && source.is_dir();
    let destination = if compressed {
        with_extension_suffix(&dest, config.compression_extension())
    } else {
        dest
    };

    Ok(ArchivePlan {
        source: source.to_path_buf(),
        destination,
        compressed,
    })
}

fn discard_partial_artifact(source: &Path, artifact: &Path) {
    if fs::symlink_metadata(artifact).is_err() {
        return;
    }
    if let Err(err) = fs::remove_file(artifact) {
        warn::emit(WarnEvent {
            code: "PARTIAL_ARTIFACT_CLEANUP_FAILED",
            stage: "archive",
            action: "remove-partial-artifact",
            project: &source.display().to_string(),
            archive: &artifact.display().to_string(),
            reason: "compression-failed",
            err: &err.to_string(),
        });
    }
}

/// Run `compress` to produce `artifact` from `source`, then drop `source`.
///
/// Either the artifact exists complete and the source is gone, or the source
/// is untouched and no artifact is left behind. A compression error is returned
/// as-is after cleanup.
pub fn archive_compressed_with<F>(source: &Path, artifact: &Path, compress: F) -> Result<()>
where
    F: FnOnce(&Path, &Path) -> Result<()>,
{
    if let Err(err) = compress(source, artifact) {
        discard_partial_artifact(source, artifact);
        return Err(err);
    }
    remove_path(source)
}

pub fn archive_compressed(source: &Path, artifact: &Path, format: CompressionFormat) -> Result<()> {
    archive_compressed_with(source, artifact, |src, dest| format.pack(src, dest))
}

pub fn execute_plan(plan: &ArchivePlan, config: &Config) -> Result<()> {
    if fs::symlink_metadata(&plan.destination).is_ok() {
        return Err(CommandError::DestinationExists(plan.destination.clone()).into());
    }
    if let Some(parent) = plan.destination.parent() {
        mkdir_p(parent)?;
    }

    if plan.compressed {
        archive_compressed(&plan.source, &plan.destination, config.compression_format)
    } else {
        move_path(&plan.source, &plan.destination)
    }
}

/// Move (or compress) `source` into its dated slot under the archive dir,
/// returning the plan that was carried out.
pub fn archive(source: &Path, config: &Config) -> Result<ArchivePlan> {
    let plan = plan_archive(source, config)?;
    execute_plan(&plan, config)?;
    Ok(plan)
}
