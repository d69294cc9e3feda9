use anyhow::Result;
use std::path::PathBuf;

use crate::commands::CommandReport;
use crate::error::CommandError;
use crate::proj::codec::CompressionFormat;
use crate::proj::config::Config;
use crate::proj::fsutil::mkdir_p;
use crate::proj::paths::resolve_paths;

#[derive(Debug, Clone)]
pub struct InitOptions {
    pub archive_dir: PathBuf,
    pub no_compress: bool,
    pub format: Option<CompressionFormat>,
    pub force: bool,
}

pub fn run(opts: &InitOptions) -> Result<CommandReport> {
    let paths = resolve_paths()?;
    let mut report = CommandReport::new("init");
    if paths.config_file.exists() {
        if !opts.force {
            return Err(CommandError::ConfigExists(paths.config_file).into());
        }
        if let Ok(previous) = Config::load(&paths.config_file) {
            report.detail(format!(
                "replacing config for archive_dir={}",
                previous.archive_dir.display()
            ));
        }
    }

    let archive_dir = std::path::absolute(&opts.archive_dir)?;
    mkdir_p(&archive_dir)?;

    let mut config = if opts.no_compress {
        Config::uncompressed(archive_dir)
    } else {
        Config::new(archive_dir)
    };
    if let Some(format) = opts.format {
        config.compression_format = format;
    }
    config.save(&paths.config_file)?;

    report.detail(format!("config_file={}", paths.config_file.display()));
    report.detail(format!("archive_dir={}", config.archive_dir.display()));
    report.detail(format!("compression={}", config.compression));
    report.detail(format!("compression_format={}", config.compression_format));
    Ok(report)
}
