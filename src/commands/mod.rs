pub mod archive;
pub mod init;
pub mod list;
pub mod restore;
pub mod status;

use crate::proj::audit;
use crate::proj::paths::ProjPaths;
use crate::proj::warn::{self, WarnEvent};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct CommandReport {
    pub command: String,
    pub ok: bool,
    pub details: Vec<String>,
    pub issues: Vec<String>,
}

impl CommandReport {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ok: true,
            details: Vec::new(),
            issues: Vec::new(),
        }
    }

    pub fn detail(&mut self, text: impl Into<String>) {
        self.details.push(text.into());
    }

    pub fn issue(&mut self, text: impl Into<String>) {
        self.ok = false;
        self.issues.push(text.into());
    }
}

pub fn transfer_line(from: &Path, to: &Path) -> String {
    format!("{} --> {}", from.display(), to.display())
}

/// Append to the audit log; a failure here only warns.
pub fn record_audit(paths: &ProjPaths, action: &str, source: &Path, destination: &Path) {
    let absolute = |p: &Path| {
        std::path::absolute(p)
            .unwrap_or_else(|_| p.to_path_buf())
            .display()
            .to_string()
    };
    let source = absolute(source);
    let destination = absolute(destination);
    if let Err(err) = audit::append_event(paths, action, &source, &destination) {
        warn::emit(WarnEvent {
            code: "AUDIT_WRITE_FAILED",
            stage: action,
            action: "append-audit-log",
            project: &source,
            archive: &destination,
            reason: "audit-log-unwritable",
            err: &format!("{err:#}"),
        });
    }
}
