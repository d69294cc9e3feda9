use crate::proj::paths::ProjPaths;
use crate::proj::util::now_epoch_secs;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AuditEvent {
    pub at_epoch_secs: u64,
    pub action: String,
    pub source: String,
    pub destination: String,
}

pub fn audit_log_path(paths: &ProjPaths) -> PathBuf {
    paths.logs_dir.join("audit.log")
}

pub fn append_event(
    paths: &ProjPaths,
    action: &str,
    source: &str,
    destination: &str,
) -> Result<()> {
    fs::create_dir_all(&paths.logs_dir)
        .with_context(|| format!("failed to create {}", paths.logs_dir.display()))?;
    let event = AuditEvent {
        at_epoch_secs: now_epoch_secs()?,
        action: action.to_string(),
        source: source.to_string(),
        destination: destination.to_string(),
    };

    let line = format!("{}\n", serde_json::to_string(&event)?);
    let path = audit_log_path(paths);
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    file.write_all(line.as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn appends_one_json_line_per_event() {
        let tmp = tempdir().expect("tempdir");
        let paths = ProjPaths {
            proj_home: tmp.path().to_path_buf(),
            config_file: tmp.path().join("config.toml"),
            logs_dir: tmp.path().join("logs"),
        };

        append_event(&paths, "archive", "/work/a", "/srv/2000/q1/a").expect("first");
        append_event(&paths, "restore", "/srv/2000/q1/a", "/work/a").expect("second");

        let raw = fs::read_to_string(audit_log_path(&paths)).expect("read");
        let events = raw
            .lines()
            .map(|line| serde_json::from_str::<AuditEvent>(line).expect("parse"))
            .collect::<Vec<_>>();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].action, "archive");
        assert_eq!(events[1].destination, "/work/a");
    }
}
