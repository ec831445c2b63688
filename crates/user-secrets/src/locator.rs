//! Locator - find or create a project's UserSecretsId and its store file

use crate::error::{Result, SecretsError};
use crate::identifier;
use crate::manifest::{self, Manifest};
use crate::store;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use user_secrets_core::{store_base, store_path, Environment, Platform, SystemEnvironment};

/// Project file extensions recognised when searching a directory
pub const MANIFEST_EXTENSIONS: &[&str] = &["csproj", "fsproj", "vbproj"];

/// Outcome of resolving a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// The manifest that was read
    pub manifest: PathBuf,
    /// The project's UserSecretsId
    pub id: String,
    /// Whether the id was generated and written into the manifest
    pub created_id: bool,
    /// Path of the secrets.json store
    pub store: PathBuf,
    /// Whether the store file was created
    pub created_store: bool,
}

impl Resolution {
    /// File name of the manifest, for display
    pub fn manifest_name(&self) -> String {
        self.manifest
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.manifest.display().to_string())
    }
}

/// Resolves manifests against the store layout of one platform
pub struct Locator<'a> {
    platform: Platform,
    env: &'a dyn Environment,
}

impl Locator<'static> {
    /// Locator for the running system
    pub fn system() -> Self {
        static SYSTEM: SystemEnvironment = SystemEnvironment;
        Self::new(Platform::current(), &SYSTEM)
    }
}

impl<'a> Locator<'a> {
    pub fn new(platform: Platform, env: &'a dyn Environment) -> Self {
        Self { platform, env }
    }

    /// Find the manifest's UserSecretsId, adding one if it has none, and make
    /// sure its store file exists.
    ///
    /// The manifest is only written when the id had to be generated, and
    /// only as the last step: once the store path is known and the store
    /// file exists. A failure before that leaves the manifest untouched.
    pub fn resolve(&self, manifest_path: &Path) -> Result<Resolution> {
        let content =
            fs::read_to_string(manifest_path).map_err(|e| SecretsError::io(manifest_path, e))?;
        let mut manifest = Manifest::parse(&content)?;

        let existing = manifest.user_secrets_id();
        let created_id = existing.is_none();
        let id = match existing {
            Some(id) => {
                debug!(id = %id, manifest = %manifest_path.display(), "found UserSecretsId");
                id
            }
            None => identifier::from_manifest_path(manifest_path),
        };

        if !identifier::is_valid(&id) {
            return Err(SecretsError::InvalidId(id));
        }

        let store = self.store_path(&id)?;

        // Render the new manifest before touching the filesystem
        let rewritten = if created_id {
            manifest.set_user_secrets_id(&id)?;
            Some(manifest.to_xml()?)
        } else {
            None
        };

        let created_store = store::ensure_store_file(&store)?;
        if created_store {
            info!(store = %store.display(), "created secrets store");
        }

        if let Some(xml) = rewritten {
            manifest::replace_file(manifest_path, &content, &xml)?;
            info!(id = %id, manifest = %manifest_path.display(), "added UserSecretsId");
        }

        Ok(Resolution {
            manifest: manifest_path.to_path_buf(),
            id,
            created_id,
            store,
            created_store,
        })
    }

    /// Path of the store file for `id`
    pub fn store_path(&self, id: &str) -> Result<PathBuf> {
        let base = store_base(self.platform, self.env).ok_or(SecretsError::NoHomeDir)?;
        Ok(store_path(&base, id))
    }
}

/// The single project file in `dir`
pub fn discover_manifest(dir: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(dir).map_err(|e| SecretsError::io(dir, e))?;

    let mut candidates = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| SecretsError::io(dir, e))?.path();
        let is_manifest = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| MANIFEST_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()));
        if is_manifest && path.is_file() {
            candidates.push(path);
        }
    }
    candidates.sort();

    match candidates.len() {
        1 => Ok(candidates.remove(0)),
        0 => Err(SecretsError::ManifestDiscovery(format!(
            "No project file (*.csproj, *.fsproj, *.vbproj) found in {}",
            dir.display()
        ))),
        _ => {
            let names: Vec<String> = candidates
                .iter()
                .filter_map(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .collect();
            Err(SecretsError::ManifestDiscovery(format!(
                "Several project files found in {}: {}. Pass one explicitly.",
                dir.display(),
                names.join(", ")
            )))
        }
    }
}
