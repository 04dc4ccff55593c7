use std::env;
use std::path::PathBuf;

pub const CONFIG_PATH_ENV: &str = "TRACKED_FILE_CONFIG";
const CONFIG_FILE_NAME: &str = ".trackedfilerc";

/// Config file named by `TRACKED_FILE_CONFIG`, else `~/.trackedfilerc` when present.
pub fn resolve_config_path() -> Option<PathBuf> {
    let from_env = env::var(CONFIG_PATH_ENV)
        .ok()
        .filter(|raw| !raw.trim().is_empty());
    if let Some(raw) = from_env {
        return Some(expand_path(&raw));
    }

    home_dir()
        .map(|home| home.join(CONFIG_FILE_NAME))
        .filter(|path| path.exists())
}

pub fn expand_path(input: &str) -> PathBuf {
    let rest = match input {
        "~" => Some(""),
        _ => input.strip_prefix("~/"),
    };

    match (rest, home_dir()) {
        (Some(""), Some(home)) => home,
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(input),
    }
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from).or_else(|| {
        #[cfg(target_os = "windows")]
        {
            env::var_os("USERPROFILE").map(PathBuf::from)
        }
        #[cfg(not(target_os = "windows"))]
        {
            None
        }
    })
}
