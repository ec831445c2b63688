//! Standard paths used by the user-secrets tool

use crate::platform::{Environment, Platform};
use std::path::{Path, PathBuf};

/// File name of a project's secrets store
pub const STORE_FILE_NAME: &str = "secrets.json";

/// Tool paths
pub struct Paths {
    /// Config directory (~/.config/user-secrets)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("user-secrets");

        Self { config }
    }

    /// Default config file location
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.yaml")
    }
}

/// Directory holding every project's secrets store on `platform`.
///
/// Windows keeps stores under `%APPDATA%\Microsoft\UserSecrets`, falling back
/// to the roaming profile under the home directory when `APPDATA` is unset.
/// Every other platform uses `~/.microsoft/usersecrets`.
///
/// Returns `None` only when a home directory is needed and unknown.
pub fn store_base(platform: Platform, env: &dyn Environment) -> Option<PathBuf> {
    match platform {
        Platform::Windows => {
            let app_data = match env.var("APPDATA").filter(|v| !v.is_empty()) {
                Some(dir) => PathBuf::from(dir),
                None => env.home_dir()?.join("AppData").join("Roaming"),
            };
            Some(app_data.join("Microsoft").join("UserSecrets"))
        }
        Platform::MacOs | Platform::Linux | Platform::Other => {
            Some(env.home_dir()?.join(".microsoft").join("usersecrets"))
        }
    }
}

/// Full path of the store file for `id` under `base`
pub fn store_path(base: &Path, id: &str) -> PathBuf {
    base.join(id).join(STORE_FILE_NAME)
}
