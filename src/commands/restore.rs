use anyhow::Result;
use std::path::Path;

use crate::commands::{CommandReport, record_audit, transfer_line};
use crate::proj::config::load_config;
use crate::proj::paths::resolve_paths;
use crate::proj::restore::restore;

pub fn run(name: &str) -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let config = load_config(&paths)?;
    let mut report = CommandReport::new("restore");

    let found = restore(name, &config)?;
    report.detail(transfer_line(&found.source, Path::new(name)));
    if found.candidates > 1 {
        report.detail(format!(
            "picked the last of {} archived copies",
            found.candidates
        ));
    }
    record_audit(&paths, "restore", &found.source, Path::new(name));

    Ok(report)
}
