//! Identifier synthesis for projects that have no UserSecretsId yet

use regex::Regex;
use std::ffi::OsStr;
use std::path::{Component, Path};
use std::sync::OnceLock;

fn separators() -> &'static Regex {
    static SEPARATORS: OnceLock<Regex> = OnceLock::new();
    SEPARATORS.get_or_init(|| Regex::new(r"[^a-z0-9]+").expect("separator pattern is valid"))
}

/// Identifier for the manifest at `path`, derived from its file stem.
///
/// e.g. "src/My.Web_App!.csproj" -> "my-web-app-"
pub fn from_manifest_path(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    slugify(&stem)
}

/// Lowercase `name` and collapse every run of characters other than ASCII
/// letters and digits into a single dash
pub fn slugify(name: &str) -> String {
    separators()
        .replace_all(&name.to_lowercase(), "-")
        .into_owned()
}

/// Whether an identifier can safely name a single directory under the
/// store root.
///
/// Separators of either platform and `:` (drive prefixes and alternate data
/// streams on Windows) are refused everywhere, so an id valid on one machine
/// is valid on all of them.
pub fn is_valid(id: &str) -> bool {
    if id.contains(['/', '\\', ':', '\0']) {
        return false;
    }

    let mut components = Path::new(id).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(name)), None) if name == OsStr::new(id)
    )
}
