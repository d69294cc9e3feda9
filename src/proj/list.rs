use crate::proj::config::Config;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn visible_subdirs(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut out = Vec::new();
    let read_dir =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    for entry in read_dir {
        let path = entry?.path();
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        if is_hidden(&name) || !path.is_dir() {
            continue;
        }
        out.push((name, path));
    }
    Ok(out)
}

/// Every `<archive_dir>/<year>/<quarter>` directory, as `(relative, absolute)` pairs.
pub fn quarter_dirs(archive_dir: &Path) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut out = Vec::new();
    if !archive_dir.is_dir() {
        return Ok(out);
    }
    for (year, year_dir) in visible_subdirs(archive_dir)? {
        for (quarter, quarter_dir) in visible_subdirs(&year_dir)? {
            out.push((Path::new(&year).join(quarter), quarter_dir));
        }
    }
    Ok(out)
}

fn sort_lexically(paths: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    let mut out = paths.into_iter().collect::<Vec<_>>();
    out.sort_by(|a, b| a.to_string_lossy().cmp(&b.to_string_lossy()));
    out
}

/// Archive entries whose name contains every pattern, relative to the archive
/// dir and sorted. No patterns matches everything.
pub fn list_projects(patterns: &[String], config: &Config) -> Result<Vec<PathBuf>> {
    let mut matches = BTreeSet::new();
    for (relative, quarter_dir) in quarter_dirs(&config.archive_dir)? {
        let read_dir = fs::read_dir(&quarter_dir)
            .with_context(|| format!("failed to read {}", quarter_dir.display()))?;
        for entry in read_dir {
            let name = entry?.file_name().to_string_lossy().into_owned();
            if is_hidden(&name) {
                continue;
            }
            if patterns.iter().all(|p| name.contains(p.as_str())) {
                matches.insert(relative.join(&name));
            }
        }
    }
    Ok(sort_lexically(matches))
}

pub(crate) fn greatest_path(paths: Vec<PathBuf>) -> Option<PathBuf> {
    sort_lexically(paths).pop()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn seed(archive: &Path, rel: &str) {
        let path = archive.join(rel);
        fs::create_dir_all(&path).expect("mkdir entry");
    }

    fn names(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_archive_lists_nothing() {
        let tmp = tempdir().expect("tempdir");
        let cfg = Config::uncompressed(tmp.path());
        assert!(list_projects(&[], &cfg).expect("list").is_empty());
        assert!(list_projects(&names(&["a", "b", "c"]), &cfg).expect("list").is_empty());
    }

    #[test]
    fn missing_archive_dir_lists_nothing() {
        let tmp = tempdir().expect("tempdir");
        let cfg = Config::uncompressed(tmp.path().join("does-not-exist"));
        assert!(list_projects(&[], &cfg).expect("list").is_empty());
    }

    #[test]
    fn lists_sorted_relative_paths() {
        let tmp = tempdir().expect("tempdir");
        seed(tmp.path(), "2013/q3/zebra");
        seed(tmp.path(), "2000/q1/apple");
        fs::write(tmp.path().join("2000/q1/banana.tar.bz2"), "").expect("write artifact");

        let got = list_projects(&[], &Config::uncompressed(tmp.path())).expect("list");
        assert_eq!(
            got,
            vec![
                PathBuf::from("2000/q1/apple"),
                PathBuf::from("2000/q1/banana.tar.bz2"),
                PathBuf::from("2013/q3/zebra"),
            ]
        );
    }

    #[test]
    fn patterns_intersect() {
        let tmp = tempdir().expect("tempdir");
        seed(tmp.path(), "2010/q2/web-api");
        seed(tmp.path(), "2011/q1/web-frontend");
        seed(tmp.path(), "2012/q4/cli-api");
        let cfg = Config::uncompressed(tmp.path());

        assert_eq!(
            list_projects(&names(&["web", "api"]), &cfg).expect("list"),
            vec![PathBuf::from("2010/q2/web-api")]
        );
        assert_eq!(
            list_projects(&names(&["api"]), &cfg).expect("list"),
            vec![PathBuf::from("2010/q2/web-api"), PathBuf::from("2012/q4/cli-api")]
        );
        assert!(list_projects(&names(&["nothing"]), &cfg).expect("list").is_empty());
    }

    #[test]
    fn only_exactly_two_levels_deep_count() {
        let tmp = tempdir().expect("tempdir");
        seed(tmp.path(), "2000/q1/proj/inner");
        fs::write(tmp.path().join("stray.txt"), "").expect("write stray");
        fs::write(tmp.path().join("2000/loose.txt"), "").expect("write loose");
        seed(tmp.path(), ".cache/q1/hidden-year");
        seed(tmp.path(), "2000/q1/.hidden");

        let got = list_projects(&[], &Config::uncompressed(tmp.path())).expect("list");
        assert_eq!(got, vec![PathBuf::from("2000/q1/proj")]);
    }

    #[test]
    fn greatest_path_is_string_order() {
        let got = greatest_path(vec![
            PathBuf::from("/a/2020/q1/x"),
            PathBuf::from("/a/2000/q1/x"),
            PathBuf::from("/a/2020/q2/x"),
        ]);
        assert_eq!(got, Some(PathBuf::from("/a/2020/q2/x")));
        assert_eq!(greatest_path(Vec::new()), None);
    }
}
