use std::env;
use std::path::PathBuf;

fn fallback_dotenv_path(
    proj_home: Option<PathBuf>,
    default_home: Option<PathBuf>,
) -> Option<PathBuf> {
    let base = proj_home.or(default_home)?;
    Some(base.join(".env"))
}

pub fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    let fallback = fallback_dotenv_path(
        env::var_os("PROJ_HOME").map(PathBuf::from),
        crate::proj::paths::default_proj_home(),
    );

    let Some(path) = fallback else {
        return;
    };
    if path.is_file() {
        let _ = dotenvy::from_path(&path);
    }
}

#[cfg(test)]
mod tests {
    use super::fallback_dotenv_path;
    use std::path::PathBuf;

    #[test]
    fn fallback_prefers_proj_home() {
        let got = fallback_dotenv_path(
            Some(PathBuf::from("/workspace/proj")),
            Some(PathBuf::from("/home/alice/.proj")),
        );

        let want = Some(PathBuf::from("/workspace/proj/.env"));
        assert_eq!(got, want);
    }

    #[test]
    fn fallback_uses_default_home_when_proj_home_unset() {
        let got = fallback_dotenv_path(None, Some(PathBuf::from("/home/alice/.proj")));
        let want = Some(PathBuf::from("/home/alice/.proj/.env"));
        assert_eq!(got, want);
    }

    #[test]
    fn no_home_means_no_fallback() {
        assert_eq!(fallback_dotenv_path(None, None), None);
    }
}
