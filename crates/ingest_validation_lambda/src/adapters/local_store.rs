use std::fs;
use std::path::{Path, PathBuf};

use crate::adapters::object_store::ObjectStore;

/// Filesystem store laid out as `<root>/<bucket>/<key>`, for running the
/// partition job without S3.
#[derive(Debug, Clone)]
pub struct LocalObjectStore {
    root: PathBuf,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn object_path(&self, bucket: &str, key: &str) -> PathBuf {
        self.root.join(bucket).join(key)
    }
}

impl ObjectStore for LocalObjectStore {
    fn read_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, String> {
        let path = self.object_path(bucket, key);
        fs::read(&path).map_err(|error| format!("failed to read {}: {error}", path.display()))
    }

    fn write_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), String> {
        let path = self.object_path(bucket, key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|error| format!("failed to create {}: {error}", parent.display()))?;
        }
        fs::write(&path, body).map_err(|error| format!("failed to write {}: {error}", path.display()))
    }

    fn list_keys(&self, bucket: &str, prefix: &str) -> Result<Vec<String>, String> {
        let bucket_root = self.root.join(bucket);
        if !bucket_root.exists() {
            return Ok(Vec::new());
        }

        let mut keys = Vec::new();
        collect_keys(&bucket_root, &bucket_root, &mut keys)?;
        keys.retain(|key| key.starts_with(prefix));
        Ok(keys)
    }

    fn delete_object(&self, bucket: &str, key: &str) -> Result<(), String> {
        let path = self.object_path(bucket, key);
        fs::remove_file(&path).map_err(|error| format!("failed to delete {}: {error}", path.display()))
    }
}

fn collect_keys(bucket_root: &Path, dir: &Path, keys: &mut Vec<String>) -> Result<(), String> {
    let entries =
        fs::read_dir(dir).map_err(|error| format!("failed to list {}: {error}", dir.display()))?;
    for entry in entries {
        let path = entry
            .map_err(|error| format!("failed to list {}: {error}", dir.display()))?
            .path();
        if path.is_dir() {
            collect_keys(bucket_root, &path, keys)?;
        } else if let Ok(relative) = path.strip_prefix(bucket_root) {
            let key = relative
                .components()
                .map(|component| component.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            keys.push(key);
        }
    }
    Ok(())
}
