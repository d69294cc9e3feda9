use anyhow::Result;

use crate::commands::CommandReport;
use crate::proj::config::load_config;
use crate::proj::list::list_projects;
use crate::proj::paths::resolve_paths;

pub fn run(patterns: &[String]) -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let config = load_config(&paths)?;
    let mut report = CommandReport::new("list");

    for entry in list_projects(patterns, &config)? {
        report.detail(entry.display().to_string());
    }

    Ok(report)
}
