use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const ALF_DIR: &str = ".alf";
pub const EXPORTS_DIR: &str = ".alf/exports";

pub const CONFIG_FILE: &str = ".alf/config.yaml";
pub const SESSION_FILE: &str = ".alf/session.json";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn session_path(root: &Path) -> PathBuf {
    root.join(SESSION_FILE)
}

/// Resolve the export directory: an absolute configured dir is used as-is,
/// a relative one is joined onto the project root.
pub fn export_dir(root: &Path, configured: Option<&str>) -> PathBuf {
    match configured {
        Some(dir) if Path::new(dir).is_absolute() => PathBuf::from(dir),
        Some(dir) => root.join(dir),
        None => root.join(EXPORTS_DIR),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_helpers() {
        let root = Path::new("/tmp/proj");
        assert_eq!(config_path(root), PathBuf::from("/tmp/proj/.alf/config.yaml"));
        assert_eq!(session_path(root), PathBuf::from("/tmp/proj/.alf/session.json"));
    }

    #[test]
    fn export_dir_resolution() {
        let root = Path::new("/tmp/proj");
        assert_eq!(export_dir(root, None), PathBuf::from("/tmp/proj/.alf/exports"));
        assert_eq!(export_dir(root, Some("out")), PathBuf::from("/tmp/proj/out"));
        assert_eq!(export_dir(root, Some("/var/alf")), PathBuf::from("/var/alf"));
    }
}
