// Key-value backing stores

use eyre::{Context, Result, eyre};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Durable string key-value storage the task store mirrors itself to
pub trait KvStore {
    /// Read the value stored under `key`, or `None` if it was never set
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite the value stored under `key`
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

impl<K: KvStore + ?Sized> KvStore for Box<K> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }
}

/// In-process storage that is lost when dropped
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    entries: HashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One file per key inside a directory: `{dir}/{key}.json`
#[derive(Debug, Clone)]
pub struct FileKv {
    base_path: PathBuf,
}

impl FileKv {
    /// Open or create a file store rooted at the given directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path).context("Failed to create store directory")?;
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn key_path(&self, key: &str) -> Result<PathBuf> {
        validate_key(key)?;
        Ok(self.base_path.join(format!("{}.json", key)))
    }
}

impl KvStore for FileKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let value = fs::read_to_string(&path).with_context(|| format!("Failed to read {:?}", path))?;
        Ok(Some(value))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key)?;
        let tmp_path = self.base_path.join(format!("{}.json.tmp", key));
        let lock_path = self.base_path.join(format!("{}.lock", key));

        // Serialize writers on a sidecar lock; the data file is replaced by rename
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&lock_path)
            .context("Failed to open lock file")?;
        lock.lock_exclusive().context("Failed to acquire file lock")?;

        let mut file = File::create(&tmp_path).context("Failed to create temporary key file")?;
        file.write_all(value.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &path).with_context(|| format!("Failed to replace {:?}", path))?;

        debug!(key, bytes = value.len(), "FileKv::set: wrote key");

        // Lock is released when lock file is dropped
        Ok(())
    }
}

/// Validate a storage key
pub(crate) fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(eyre!("Key cannot be empty"));
    }
    if key.len() > 64 {
        return Err(eyre!("Key too long: {} (max 64 chars)", key));
    }
    if !key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-') {
        return Err(eyre!("Invalid key: {} (must be alphanumeric with _/-)", key));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_memory_kv_get_set() {
        let mut kv = MemoryKv::new();
        assert_eq!(kv.get("tasks").unwrap(), None);

        kv.set("tasks", "[]").unwrap();
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some("[]"));

        kv.set("tasks", "[1]").unwrap();
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_file_kv_creates_directory() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested/store");

        let kv = FileKv::open(&dir).unwrap();
        assert!(dir.exists());
        assert_eq!(kv.base_path(), dir.as_path());
    }

    #[test]
    fn test_file_kv_missing_key() {
        let temp = TempDir::new().unwrap();
        let kv = FileKv::open(temp.path()).unwrap();
        assert_eq!(kv.get("darkMode").unwrap(), None);
    }

    #[test]
    fn test_file_kv_overwrite_shrinks_file() {
        let temp = TempDir::new().unwrap();
        let mut kv = FileKv::open(temp.path()).unwrap();

        kv.set("darkMode", "false").unwrap();
        kv.set("darkMode", "true").unwrap();

        assert_eq!(kv.get("darkMode").unwrap().as_deref(), Some("true"));
        let raw = fs::read_to_string(temp.path().join("darkMode.json")).unwrap();
        assert_eq!(raw, "true");
        kv.set("darkMode", "x").unwrap();
        assert_eq!(fs::read_to_string(temp.path().join("darkMode.json")).unwrap(), "x");
    }

    #[test]
    fn test_file_kv_set_leaves_no_temp_file() {
        let temp = TempDir::new().unwrap();
        let mut kv = FileKv::open(temp.path()).unwrap();

        kv.set("tasks", "[]").unwrap();
        assert!(temp.path().join("tasks.json").exists());
        assert!(!temp.path().join("tasks.json.tmp").exists());
    }

    #[test]
    fn test_file_kv_interrupted_write_keeps_previous_value() {
        let temp = TempDir::new().unwrap();
        let mut kv = FileKv::open(temp.path()).unwrap();
        kv.set("tasks", r#"[{"id":"a"}]"#).unwrap();

        // A crash mid-write leaves only a partial temporary file behind
        fs::write(temp.path().join("tasks.json.tmp"), r#"[{"id""#).unwrap();
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some(r#"[{"id":"a"}]"#));

        kv.set("tasks", "[]").unwrap();
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some("[]"));
        assert!(!temp.path().join("tasks.json.tmp").exists());
    }

    #[test]
    fn test_file_kv_survives_reopen() {
        let temp = TempDir::new().unwrap();
        {
            let mut kv = FileKv::open(temp.path()).unwrap();
            kv.set("tasks", r#"[{"id":"a"}]"#).unwrap();
        }

        let kv = FileKv::open(temp.path()).unwrap();
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some(r#"[{"id":"a"}]"#));
    }

    #[test]
    fn test_boxed_kv_delegates() {
        let mut kv: Box<dyn KvStore> = Box::new(MemoryKv::new());
        kv.set("tasks", "[]").unwrap();
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some("[]"));
    }

    #[test]
    fn test_validate_key() {
        assert!(validate_key("tasks").is_ok());
        assert!(validate_key("darkMode").is_ok());
        assert!(validate_key("dark_mode-2").is_ok());

        assert!(validate_key("").is_err());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key(&"a".repeat(65)).is_err());
    }
}
