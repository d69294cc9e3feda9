use crate::proj::warn::{self, WarnEvent};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Every regular file reachable under `root`, skipping symlinks. A file root
/// yields itself.
pub fn iter_files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.with_context(|| format!("failed to walk {}", root.display()))?;
        if entry.path_is_symlink() || !entry.file_type().is_file() {
            continue;
        }
        out.push(entry.into_path());
    }
    Ok(out)
}

pub fn time_modified(path: &Path) -> Result<DateTime<Utc>> {
    let modified = fs::metadata(path)
        .and_then(|meta| meta.modified())
        .with_context(|| format!("failed to read mtime of {}", path.display()))?;
    Ok(DateTime::<Utc>::from(modified))
}

/// Latest mtime among the files under `root`, or `None` when there are none.
pub fn last_modified(root: &Path) -> Result<Option<DateTime<Utc>>> {
    let mut latest: Option<DateTime<Utc>> = None;
    for file in iter_files(root)? {
        let t = time_modified(&file)?;
        match latest {
            Some(best) if t <= best => {}
            _ => latest = Some(t),
        }
    }
    Ok(latest)
}

/// The equivalent of `mkdir -p`.
pub fn mkdir_p(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("failed to create {}", path.display()))
}

pub fn remove_path(path: &Path) -> Result<()> {
    let meta = fs::symlink_metadata(path)
        .with_context(|| format!("failed to stat {}", path.display()))?;
    let removed = if meta.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    removed.with_context(|| format!("failed to remove {}", path.display()))
}

fn copy_recursive(from: &Path, to: &Path) -> Result<()> {
    for entry in WalkDir::new(from) {
        let entry = entry.with_context(|| format!("failed to walk {}", from.display()))?;
        let rel = entry.path().strip_prefix(from)?;
        let target = if rel.as_os_str().is_empty() {
            to.to_path_buf()
        } else {
            to.join(rel)
        };
        let file_type = entry.file_type();
        if file_type.is_dir() {
            mkdir_p(&target)?;
        } else if file_type.is_symlink() {
            let link = fs::read_link(entry.path())
                .with_context(|| format!("failed to read link {}", entry.path().display()))?;
            #[cfg(unix)]
            std::os::unix::fs::symlink(&link, &target)
                .with_context(|| format!("failed to link {}", target.display()))?;
            #[cfg(not(unix))]
            fs::copy(entry.path(), &target)
                .with_context(|| format!("failed to copy {}", link.display()))?;
        } else {
            fs::copy(entry.path(), &target).with_context(|| {
                format!(
                    "failed to copy {} to {}",
                    entry.path().display(),
                    target.display()
                )
            })?;
        }
    }
    Ok(())
}

fn discard_partial_copy(from: &Path, to: &Path) {
    if fs::symlink_metadata(to).is_err() {
        return;
    }
    if let Err(err) = remove_path(to) {
        warn::emit(WarnEvent {
            code: "PARTIAL_COPY_CLEANUP_FAILED",
            stage: "move",
            action: "remove-partial-copy",
            project: &from.display().to_string(),
            archive: &to.display().to_string(),
            reason: "cross-device-copy-failed",
            err: &format!("{err:#}"),
        });
    }
}

/// Move a file or directory, falling back to copy-then-remove across devices.
pub fn move_path(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        mkdir_p(parent)?;
    }

    match fs::rename(from, to) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::CrossesDevices => {
            if let Err(copy_err) = copy_recursive(from, to) {
                discard_partial_copy(from, to);
                return Err(copy_err);
            }
            remove_path(from)
        }
        Err(err) => Err(err)
            .with_context(|| format!("failed to move {} to {}", from.display(), to.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::time::SystemTime;
    use tempfile::tempdir;

    fn touch_at(path: &Path, t: SystemTime) {
        fs::write(path, "").expect("write");
        fs::File::options()
            .write(true)
            .open(path)
            .expect("open")
            .set_modified(t)
            .expect("set mtime");
    }

    #[test]
    fn mkdir_p_creates_nested_and_is_idempotent() {
        let tmp = tempdir().expect("tempdir");
        let dest = tmp.path().join("mouse/a/b/c");
        assert!(!dest.is_dir());
        mkdir_p(&dest).expect("mkdir");
        assert!(dest.is_dir());
        mkdir_p(&dest).expect("mkdir again");
    }

    #[test]
    fn last_modified_picks_newest_file() {
        let tmp = tempdir().expect("tempdir");
        let root = tmp.path().join("proj");
        fs::create_dir_all(root.join("sub")).expect("mkdir");

        let old = Utc.with_ymd_and_hms(2001, 2, 3, 0, 0, 0).unwrap();
        let new = Utc.with_ymd_and_hms(2011, 8, 9, 0, 0, 0).unwrap();
        touch_at(&root.join("a"), old.into());
        touch_at(&root.join("sub/b"), new.into());

        assert_eq!(last_modified(&root).expect("scan"), Some(new));
    }

    #[test]
    fn last_modified_of_single_file_is_its_own() {
        let tmp = tempdir().expect("tempdir");
        let file = tmp.path().join("notes.txt");
        let t = Utc.with_ymd_and_hms(1999, 12, 31, 0, 0, 0).unwrap();
        touch_at(&file, t.into());
        assert_eq!(last_modified(&file).expect("scan"), Some(t));
    }

    #[test]
    fn empty_dir_has_no_timestamp() {
        let tmp = tempdir().expect("tempdir");
        assert_eq!(last_modified(tmp.path()).expect("scan"), None);
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_ignored_when_scanning() {
        let tmp = tempdir().expect("tempdir");
        let target = tmp.path().join("target.txt");
        touch_at(&target, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap().into());

        let root = tmp.path().join("proj");
        fs::create_dir_all(&root).expect("mkdir");
        std::os::unix::fs::symlink(&target, root.join("link")).expect("symlink");

        assert!(iter_files(&root).expect("iter").is_empty());
        assert_eq!(last_modified(&root).expect("scan"), None);
    }

    #[test]
    fn move_path_moves_directory_tree() {
        let tmp = tempdir().expect("tempdir");
        let from = tmp.path().join("from");
        fs::create_dir_all(from.join("deep")).expect("mkdir");
        fs::write(from.join("deep/data"), "payload").expect("write");

        let to = tmp.path().join("a/b/to");
        move_path(&from, &to).expect("move");

        assert!(!from.exists());
        assert_eq!(
            fs::read_to_string(to.join("deep/data")).expect("read"),
            "payload"
        );
    }

    #[test]
    fn discard_partial_copy_removes_leftovers() {
        let tmp = tempdir().expect("tempdir");
        let from = tmp.path().join("from");
        let to = tmp.path().join("to");
        fs::create_dir_all(to.join("half")).expect("mkdir");
        fs::write(to.join("half/written"), "partial").expect("write");

        discard_partial_copy(&from, &to);
        assert!(!to.exists());

        discard_partial_copy(&from, &to);
        assert!(!to.exists());
    }

    #[test]
    fn copy_recursive_preserves_contents() {
        let tmp = tempdir().expect("tempdir");
        let from = tmp.path().join("from");
        fs::create_dir_all(from.join("x/y")).expect("mkdir");
        fs::write(from.join("x/y/z"), "zed").expect("write");

        let to = tmp.path().join("to");
        copy_recursive(&from, &to).expect("copy");
        assert_eq!(fs::read_to_string(to.join("x/y/z")).expect("read"), "zed");
        assert!(from.join("x/y/z").exists());
    }
}
