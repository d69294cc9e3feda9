use crate::error::CommandError;
use crate::proj::codec::CompressionFormat;
use crate::proj::paths::ProjPaths;
use crate::proj::warn::{self, WarnEvent};
use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub archive_dir: PathBuf,
    #[serde(default = "default_compression")]
    pub compression: bool,
    #[serde(default)]
    pub compression_format: CompressionFormat,
}

fn default_compression() -> bool {
    true
}

impl Config {
    pub fn new(archive_dir: impl Into<PathBuf>) -> Self {
        Self {
            archive_dir: archive_dir.into(),
            compression: default_compression(),
            compression_format: CompressionFormat::default(),
        }
    }

    pub fn uncompressed(archive_dir: impl Into<PathBuf>) -> Self {
        Self {
            compression: false,
            ..Self::new(archive_dir)
        }
    }

    /// Copy of this config with compression switched off (`--no-compress`).
    pub fn without_compression(&self) -> Self {
        Self {
            compression: false,
            ..self.clone()
        }
    }

    pub fn compression_extension(&self) -> &'static str {
        self.compression_format.extension()
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw =
            fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&raw)
            .map_err(|err| anyhow!("failed to parse proj config {}: {err}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let data = toml::to_string_pretty(self)?;
        fs::write(path, data).with_context(|| format!("failed to write {}", path.display()))?;
        Ok(())
    }
}

/// Settings as merged from file and environment, before `archive_dir` is checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialConfig {
    pub archive_dir: Option<PathBuf>,
    pub compression: Option<bool>,
    pub compression_format: Option<String>,
}

impl PartialConfig {
    /// Apply the `PROJ_*` environment overrides through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(dir) = non_empty("PROJ_ARCHIVE") {
            self.archive_dir = Some(PathBuf::from(dir));
        }
        if let Some(flag) = non_empty("PROJ_COMPRESSION").and_then(|v| parse_bool(&v)) {
            self.compression = Some(flag);
        }
        if let Some(format) = non_empty("PROJ_COMPRESSION_FORMAT") {
            self.compression_format = Some(format);
        }
    }

    /// An unknown format is an error only while compression is on; otherwise
    /// the default format stands in and a warning is emitted.
    pub fn into_config(self) -> Result<Config> {
        let archive_dir = self.archive_dir.ok_or(CommandError::ArchiveDirUnset)?;
        let archive_dir = std::path::absolute(&archive_dir)
            .with_context(|| format!("failed to resolve {}", archive_dir.display()))?;
        let compression = self.compression.unwrap_or_else(default_compression);
        let compression_format = match self.compression_format {
            Some(raw) => match raw.parse::<CompressionFormat>() {
                Ok(format) => format,
                Err(err) if compression => return Err(err.into()),
                Err(err) => {
                    warn::emit(WarnEvent {
                        code: "UNKNOWN_COMPRESSION_FORMAT",
                        stage: "config",
                        action: "use-default-format",
                        project: "na",
                        archive: &archive_dir.display().to_string(),
                        reason: "compression-disabled",
                        err: &err.to_string(),
                    });
                    CompressionFormat::default()
                }
            },
            None => CompressionFormat::default(),
        };

        Ok(Config {
            archive_dir,
            compression,
            compression_format,
        })
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" | "true" | "TRUE" | "yes" | "on" => Some(true),
        "0" | "false" | "FALSE" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Environment values that are set but cannot be understood.
pub fn env_value_issues<F>(lookup: F) -> Vec<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut issues = Vec::new();
    if let Some(raw) = lookup("PROJ_COMPRESSION") {
        let raw = raw.trim();
        if !raw.is_empty() && parse_bool(raw).is_none() {
            issues.push(format!("unrecognised PROJ_COMPRESSION value: {raw}"));
        }
    }
    issues
}

fn read_file_config(path: &Path) -> Result<PartialConfig> {
    if !path.exists() {
        return Ok(PartialConfig::default());
    }
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&raw)
        .map_err(|err| anyhow!("failed to parse proj config {}: {err}", path.display()))
}

/// Merge the config file and environment without requiring an archive dir.
pub fn resolve_partial(paths: &ProjPaths) -> Result<PartialConfig> {
    let mut partial = read_file_config(&paths.config_file)?;
    partial.apply_env(|var| env::var(var).ok());
    Ok(partial)
}

/// Resolve the full configuration; the archive dir must be set and exist.
pub fn load_config(paths: &ProjPaths) -> Result<Config> {
    let cfg = resolve_partial(paths)?.into_config()?;
    if !cfg.archive_dir.is_dir() {
        return Err(CommandError::ArchiveDirMissing(cfg.archive_dir).into());
    }
    Ok(cfg)
}
