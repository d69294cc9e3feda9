use anyhow::Result;
use std::path::PathBuf;

use crate::commands::{CommandReport, record_audit, transfer_line};
use crate::error::{self, CommandError};
use crate::proj::archive::{archive, plan_archive};
use crate::proj::config::load_config;
use crate::proj::paths::resolve_paths;

#[derive(Debug, Clone)]
pub struct ArchiveOptions {
    pub folders: Vec<PathBuf>,
    pub dry_run: bool,
    pub no_compress: bool,
}

pub fn run(opts: &ArchiveOptions) -> Result<CommandReport> {
    if let Some(missing) = opts.folders.iter().find(|f| !f.exists()) {
        return Err(CommandError::SourceMissing(missing.clone()).into());
    }

    let paths = resolve_paths()?;
    let mut config = load_config(&paths)?;
    if opts.no_compress {
        config = config.without_compression();
    }

    let mut report = CommandReport::new("archive");
    for folder in &opts.folders {
        let outcome = if opts.dry_run {
            plan_archive(folder, &config)
        } else {
            archive(folder, &config)
        };

        match outcome {
            Ok(plan) => {
                report.detail(transfer_line(&plan.source, &plan.destination));
                if !opts.dry_run {
                    record_audit(&paths, "archive", &plan.source, &plan.destination);
                }
            }
            Err(err) => {
                report.issue(error::describe(&err));
                break;
            }
        }
    }

    Ok(report)
}
