// src/export/fs_utils.rs

use crate::errors::{AppError, AppResult};
use crate::ui::messages::warning;
use std::path::Path;

/// Refuse to clobber an existing report unless `force` is set, and make
/// sure the parent directory exists.
pub(crate) fn ensure_writable(path: &Path, force: bool) -> AppResult<()> {
    if path.exists() && !force {
        warning(format!("The file '{}' already exists.", path.display()));
        return Err(AppError::Export(
            "existing file not overwritten (use --force)".into(),
        ));
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent)?;
    }

    Ok(())
}
