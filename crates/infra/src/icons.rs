//! Icon name lookup

use std::path::{Path, PathBuf};
use tracing::trace;

use analog_media_core::domain::device::IconRef;

/// Environment variable overriding the bundled resource directory
pub const RESOURCE_DIR_ENV: &str = "ANALOG_MEDIA_RES_DIR";

/// Resolves bare icon names against a list of directories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconLocator {
    search_dirs: Vec<PathBuf>,
}

impl Default for IconLocator {
    /// `~/.local/share/icons`, `/usr/share/icons`, then the resource directory
    fn default() -> Self {
        let mut search_dirs = Vec::new();
        if let Some(data) = dirs::data_local_dir() {
            search_dirs.push(data.join("icons"));
        }
        search_dirs.push(PathBuf::from("/usr/share/icons"));
        search_dirs.push(
            std::env::var_os(RESOURCE_DIR_ENV)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/usr/share/analog-media/res")),
        );
        Self { search_dirs }
    }
}

impl IconLocator {
    pub fn new(search_dirs: Vec<PathBuf>) -> Self {
        Self { search_dirs }
    }

    pub fn search_dirs(&self) -> &[PathBuf] {
        &self.search_dirs
    }

    /// First existing file for `icon`; absolute paths and unknown names are
    /// returned unchanged
    pub fn locate(&self, icon: &IconRef) -> IconRef {
        if Path::new(icon.as_str()).is_absolute() {
            return icon.clone();
        }
        for dir in &self.search_dirs {
            let candidate = dir.join(icon.as_str());
            if candidate.is_file() {
                trace!(icon = %icon, path = %candidate.display(), "Resolved icon");
                return IconRef::new(candidate.to_string_lossy().into_owned());
            }
        }
        icon.clone()
    }
}
