//! Editor - hand the store file to the user's editor

use crate::error::{Result, SecretsError};
use std::path::Path;
use std::process::Command;
use tracing::debug;
use user_secrets_core::{Environment, Platform};

/// Pick the editor command: `$VISUAL`, `$EDITOR`, the configured one, then
/// a platform default
pub fn resolve_editor(env: &dyn Environment, configured: Option<&str>, platform: Platform) -> String {
    env.var("VISUAL")
        .filter(|v| !v.trim().is_empty())
        .or_else(|| env.var("EDITOR").filter(|v| !v.trim().is_empty()))
        .or_else(|| configured.filter(|v| !v.trim().is_empty()).map(str::to_string))
        .unwrap_or_else(|| match platform {
            Platform::Windows => "notepad".to_string(),
            _ => "vi".to_string(),
        })
}

/// Split an editor setting into program and arguments.
///
/// A setting that names an existing file is taken whole, so paths with
/// spaces ("C:\Program Files\Notepad++\notepad++.exe") work unquoted.
/// Anything else is split on whitespace, e.g. "code --wait".
pub fn command_line(editor: &str) -> (String, Vec<String>) {
    let trimmed = editor.trim();
    if Path::new(trimmed).is_file() {
        return (trimmed.to_string(), Vec::new());
    }

    let mut parts = trimmed.split_whitespace().map(str::to_string);
    let program = parts.next().unwrap_or_default();
    (program, parts.collect())
}

/// Open `path` in `editor` and wait for it to exit
pub fn open(editor: &str, path: &Path) -> Result<()> {
    let (program, args) = command_line(editor);

    debug!(editor, path = %path.display(), "launching editor");

    let status = Command::new(&program)
        .args(&args)
        .arg(path)
        .status()
        .map_err(|source| SecretsError::Editor {
            editor: editor.to_string(),
            source,
        })?;

    if !status.success() {
        return Err(SecretsError::EditorStatus {
            editor: editor.to_string(),
            status,
        });
    }

    Ok(())
}
