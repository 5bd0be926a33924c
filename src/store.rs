///
/// # Auxiliary relational store helpers
///
/// Each process-backend import materializes its result into one relational
/// store file, `<database>.db`, attached by the generated script. A store
/// may be accompanied by write-ahead / shared-memory sidecar files; when a
/// caller asks for an overwrite, the store and its sidecars are removed
/// together. Removal is best-effort — a sidecar that never existed or
/// cannot be deleted is not an error.
///

use std::path::{Path, PathBuf};

/// Sidecar suffixes appended to the store file name.
const SIDECAR_SUFFIXES: &[&str] = &["-wal", "-shm", ".wal"];

/// Store file name for a logical database name.
pub fn store_file(database: &str) -> PathBuf {
    PathBuf::from(format!("{}.db", database))
}

/// Remove the store file and any sidecars. Advisory: failures are ignored.
pub fn reset_store(store: &Path) {
    let _ = std::fs::remove_file(store);
    let base = store.as_os_str().to_string_lossy().into_owned();
    for suffix in SIDECAR_SUFFIXES {
        let _ = std::fs::remove_file(format!("{}{}", base, suffix));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_store_file_name() {
        assert_eq!(store_file("shop"), PathBuf::from("shop.db"));
    }

    #[test]
    fn test_reset_removes_store_and_sidecars() {
        let dir = TempDir::new().unwrap();
        let store = dir.path().join("shop.db");
        for name in ["shop.db", "shop.db-wal", "shop.db-shm", "shop.db.wal"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        let unrelated = dir.path().join("other.db");
        std::fs::write(&unrelated, b"x").unwrap();

        reset_store(&store);

        assert!(!store.exists());
        assert!(!dir.path().join("shop.db-wal").exists());
        assert!(!dir.path().join("shop.db-shm").exists());
        assert!(!dir.path().join("shop.db.wal").exists());
        assert!(unrelated.exists());
    }

    #[test]
    fn test_reset_missing_store_is_silent() {
        let dir = TempDir::new().unwrap();
        reset_store(&dir.path().join("never-existed.db"));
    }
}
