//! Saved session: the signed-in user's snapshot, persisted between
//! invocations.
//!
//! The snapshot is re-resolved against the user collection on startup, so
//! an admin edit to the account (department, role, name) is visible on the
//! next command without a fresh login. If the record has since been
//! deleted, the saved snapshot keeps working until an explicit logout.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use stockroom_model::User;

pub fn session_path(data_dir: &Path) -> PathBuf {
    data_dir.join("session.json")
}

/// The saved session user, if any.
pub fn load(path: &Path) -> Result<Option<User>> {
    if !path.exists() {
        return Ok(None);
    }
    let text = fs::read_to_string(path)
        .with_context(|| format!("read session file {}", path.display()))?;
    let user = serde_json::from_str(&text)
        .with_context(|| format!("parse session file {}", path.display()))?;
    Ok(Some(user))
}

pub fn save(path: &Path, user: &User) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("create directory {}", parent.display()))?;
    }
    let text = serde_json::to_string_pretty(user).context("encode session user")?;
    fs::write(path, text).with_context(|| format!("write session file {}", path.display()))
}

pub fn clear(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_file(path)
            .with_context(|| format!("remove session file {}", path.display()))?;
    }
    Ok(())
}
