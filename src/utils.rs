//! Artifact file naming

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};

/// Suffix appended to every downloaded artifact
pub const ARTIFACT_EXTENSION: &str = "zip";

/// Build the file name an artifact is stored under: `{slug}-{version}.zip`
///
/// The name depends on nothing but `slug` and `version`, so a repeated pair
/// always maps to the same file and a later download replaces an earlier one.
/// Names that could leave the download directory are rejected.
///
/// # Examples
///
/// ```
/// use plugin_crawler::utils::artifact_file_name;
///
/// assert_eq!(artifact_file_name("foo", "1.0").unwrap(), "foo-1.0.zip");
/// assert!(artifact_file_name("../etc", "1.0").is_err());
/// ```
pub fn artifact_file_name(slug: &str, version: &str) -> Result<String> {
    if slug.is_empty() {
        return Err(Error::InvalidEntry("empty slug".to_string()));
    }
    for (field, value) in [("slug", slug), ("version", version)] {
        if value.contains(['/', '\\', '\0']) {
            return Err(Error::InvalidEntry(format!(
                "{field} '{}' contains a path separator or NUL",
                value.escape_debug()
            )));
        }
    }
    Ok(format!("{slug}-{version}.{ARTIFACT_EXTENSION}"))
}

/// Full destination path of an artifact inside `dir`
pub fn artifact_path(dir: &Path, slug: &str, version: &str) -> Result<PathBuf> {
    Ok(dir.join(artifact_file_name(slug, version)?))
}
