use anyhow::Result;
use std::env;

use crate::commands::CommandReport;
use crate::error;
use crate::proj::config::{env_value_issues, resolve_partial};
use crate::proj::paths::resolve_paths;

include!(concat!(env!("OUT_DIR"), "/proj_env_allowlist.rs"));

fn unknown_proj_vars(vars: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out = vars
        .into_iter()
        .filter(|key| key.starts_with("PROJ_"))
        .filter(|key| !GENERATED_PROJ_ENV_ALLOWLIST.contains(&key.as_str()))
        .collect::<Vec<_>>();
    out.sort();
    out
}

pub fn run() -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut report = CommandReport::new("status");

    report.detail(format!("proj_home={}", paths.proj_home.display()));
    report.detail(format!("config_file={}", paths.config_file.display()));
    report.detail(format!("logs_dir={}", paths.logs_dir.display()));
    if !paths.config_file.exists() {
        report.detail("config file not found; using environment only");
    }

    match resolve_partial(&paths).and_then(|partial| partial.into_config()) {
        Ok(config) => {
            report.detail(format!("archive_dir={}", config.archive_dir.display()));
            report.detail(format!("compression={}", config.compression));
            report.detail(format!("compression_format={}", config.compression_format));
            report.detail(format!(
                "compression_extension={}",
                config.compression_extension()
            ));
            if !config.archive_dir.is_dir() {
                report.issue(format!(
                    "archive directory does not exist: {}",
                    config.archive_dir.display()
                ));
            }
        }
        Err(err) => report.issue(error::describe(&err)),
    }

    for issue in env_value_issues(|var| env::var(var).ok()) {
        report.issue(issue);
    }
    for key in unknown_proj_vars(env::vars().map(|(key, _)| key)) {
        report.issue(format!("unknown environment variable {key}"));
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allowlist_knows_the_config_vars() {
        for key in ["PROJ_ARCHIVE", "PROJ_COMPRESSION", "PROJ_COMPRESSION_FORMAT", "PROJ_HOME"] {
            assert!(GENERATED_PROJ_ENV_ALLOWLIST.contains(&key), "{key}");
        }
    }

    #[test]
    fn flags_only_unknown_proj_vars() {
        let got = unknown_proj_vars(
            ["PROJ_ARCHVE", "PROJ_ARCHIVE", "HOME", "PATH", "PROJ_LOGS_DIR"]
                .into_iter()
                .map(String::from),
        );
        assert_eq!(got, vec!["PROJ_ARCHVE".to_string()]);
    }
}
