use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{KeyValueStore, StorageError, check_quota, validate_key};

const EXTENSION: &str = "json";

/// Stores each key as `<dir>/<key>.json`.
///
/// Writes go to a temporary file that is renamed over the target, so a
/// crash mid-write leaves the previous value intact. The quota covers the
/// combined size of every value in the directory.
#[derive(Clone, Debug)]
pub struct FileStore {
    dir: PathBuf,
    quota: Option<usize>,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore {
            dir: dir.into(),
            quota: None,
        }
    }

    pub fn with_quota(mut self, quota: Option<usize>) -> Self {
        self.quota = quota;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.{}", key, EXTENSION)))
    }

    /// Bytes used by every stored value except `key`.
    fn usage_excluding(&self, key: &str) -> Result<usize, StorageError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e.into()),
        };

        let own = format!("{}.{}", key, EXTENSION);
        let mut total = 0usize;
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if entry.file_name().to_str() == Some(own.as_str()) {
                continue;
            }
            total = total.saturating_add(entry.metadata()?.len() as usize);
        }
        Ok(total)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        if self.quota.is_some() {
            let needed = self.usage_excluding(key)?.saturating_add(value.len());
            check_quota(self.quota, needed)?;
        }

        fs::create_dir_all(&self.dir)?;
        let tmp = self.dir.join(format!(".{}.{}.tmp", key, EXTENSION));
        fs::write(&tmp, value)?;
        if let Err(e) = fs::rename(&tmp, &path) {
            let _ = fs::remove_file(&tmp);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_reads_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("not-yet-created"));
        assert!(store.get("spreadsheetData").unwrap().is_none());
    }

    #[test]
    fn set_get_remove() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("data"));
        store.set("spreadsheetData", "[[1]]").unwrap();
        assert_eq!(store.get("spreadsheetData").unwrap().as_deref(), Some("[[1]]"));
        assert!(dir.path().join("data/spreadsheetData.json").is_file());

        store.set("spreadsheetData", "[[2]]").unwrap();
        assert_eq!(store.get("spreadsheetData").unwrap().as_deref(), Some("[[2]]"));

        store.remove("spreadsheetData").unwrap();
        store.remove("spreadsheetData").unwrap();
        assert!(store.get("spreadsheetData").unwrap().is_none());
    }

    #[test]
    fn quota_counts_other_keys_but_not_the_replaced_value() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path()).with_quota(Some(10));
        store.set("a", "123456").unwrap();
        store.set("a", "1234567890").unwrap();
        let err = store.set("b", "12345").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { needed: 15, quota: 10 }));
        assert!(store.get("b").unwrap().is_none());
    }

    #[test]
    fn rejects_path_like_keys() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path());
        assert!(matches!(
            store.set("../x", "1"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
