//! Directory-backed durable storage.
//!
//! Each key is one file, `{dir}/{key}.json`. Writes go through a temporary
//! file and a rename so a crash mid-write leaves the previous value intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use vitrina_core::{Storage, StorageError};

/// Durable [`Storage`] rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir` for storage, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`.
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.dir.join(format!("{file}.json"))
    }
}

impl Storage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use vitrina_core::{CartStore, Product};

    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = FileStorage::open(dir.path()).unwrap();
        assert_eq!(storage.get_item("cart").unwrap(), None);
        storage.set_item("cart", "[]").unwrap();
        assert_eq!(storage.get_item("cart").unwrap().as_deref(), Some("[]"));
        storage.remove_item("cart").unwrap();
        assert_eq!(storage.get_item("cart").unwrap(), None);
        storage.remove_item("cart").unwrap();
    }

    #[test]
    fn test_key_is_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        let path = storage.path_for("../evil/key");
        assert_eq!(path.parent(), Some(dir.path()));
        assert_eq!(path.file_name().unwrap(), ".._evil_key.json");
    }

    #[test]
    fn test_cart_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut cart = CartStore::new(FileStorage::open(dir.path()).unwrap());
            cart.add(Product::new("p2", "Torta", Decimal::from(300)));
            cart.add(Product::new("p2", "Torta", Decimal::from(300)));
        }
        let cart = CartStore::new(FileStorage::open(dir.path()).unwrap());
        assert_eq!(cart.count(), 2);
        assert_eq!(cart.total(), Decimal::from(600));
    }

    #[test]
    fn test_unreadable_entry_surfaces_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();
        // A directory where the file should be cannot be read as text.
        fs::create_dir_all(storage.path_for("cart")).unwrap();
        assert!(matches!(storage.get_item("cart"), Err(StorageError::Io(_))));
    }
}
