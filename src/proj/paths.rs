use anyhow::Result;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ProjPaths {
    pub proj_home: PathBuf,
    pub config_file: PathBuf,
    pub logs_dir: PathBuf,
}

fn required_home_dir() -> Result<PathBuf> {
    if let Some(home) = dirs::home_dir() {
        return Ok(home);
    }
    Err(anyhow::anyhow!("HOME directory could not be resolved"))
}

fn env_or_default_path(var: &str, fallback: PathBuf) -> PathBuf {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => fallback,
    }
}

/// Default home for proj's own files (config, logs, `.env`).
pub fn default_proj_home() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".proj"))
}

pub fn resolve_paths() -> Result<ProjPaths> {
    let proj_home = match env::var("PROJ_HOME") {
        Ok(v) if !v.trim().is_empty() => PathBuf::from(v.trim()),
        _ => required_home_dir()?.join(".proj"),
    };

    let config_file = env_or_default_path("PROJ_CONFIG_PATH", proj_home.join("config.toml"));
    let logs_dir = env_or_default_path("PROJ_LOGS_DIR", proj_home.join("logs"));

    Ok(ProjPaths {
        proj_home,
        config_file,
        logs_dir,
    })
}
