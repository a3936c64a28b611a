//! Directory-backed object store.
//!
//! A directory plays the role of a bucket:
//!
//! ```text
//! bucket/
//! ├── 20240101.png             ← object, last-modified = file mtime
//! ├── 20240101.png.meta.json   ← {"prompt": "...", "model": "...", "seed": "..."}
//! └── latest.png
//! ```
//!
//! Sidecar files are never listed as objects. A missing sidecar means the
//! object carries no attributes.

use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{ListEntry, ListPage, ListRequest, ObjectMetadata, ObjectStore, StoreError, paginate};

const SIDECAR_SUFFIX: &str = ".meta.json";

#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the metadata sidecar for `key`.
    pub fn sidecar_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}{SIDECAR_SUFFIX}"))
    }
}

#[async_trait]
impl ObjectStore for FsStore {
    async fn list_page(&self, request: ListRequest) -> Result<ListPage, StoreError> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || list_blocking(&root, &request))
            .await
            .map_err(|e| StoreError::Request(format!("listing task failed: {e}")))?
    }

    async fn head_object(&self, key: &str) -> Result<ObjectMetadata, StoreError> {
        let store = self.clone();
        let key = key.to_string();
        tokio::task::spawn_blocking(move || store.head_blocking(&key))
            .await
            .map_err(|e| StoreError::Request(format!("metadata task failed: {e}")))?
    }
}

fn list_blocking(root: &Path, request: &ListRequest) -> Result<ListPage, StoreError> {
    let display = root.display().to_string();
    let dir = fs::read_dir(root).map_err(|e| StoreError::Io(display.clone(), e))?;

    let mut objects = Vec::new();
    for entry in dir {
        let entry = entry.map_err(|e| StoreError::Io(display.clone(), e))?;
        let file_type = entry.file_type().map_err(|e| StoreError::Io(display.clone(), e))?;
        if !file_type.is_file() {
            continue;
        }
        // Non-UTF-8 names cannot be keys
        let Ok(name) = entry.file_name().into_string() else {
            continue;
        };
        if name.ends_with(SIDECAR_SUFFIX) {
            continue;
        }
        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        objects.push((name, size));
    }
    objects.sort_unstable_by(|a, b| a.0.cmp(&b.0));

    let (page, next_continuation) = paginate(&objects, request);
    Ok(ListPage {
        entries: page
            .iter()
            .map(|(key, size)| ListEntry {
                key: key.clone(),
                size: *size,
            })
            .collect(),
        next_continuation,
    })
}

impl FsStore {
    fn head_blocking(&self, key: &str) -> Result<ObjectMetadata, StoreError> {
        if !is_plain_key(key) {
            return Err(StoreError::NotFound(key.to_string()));
        }

        let path = self.root.join(key);
        let meta = fs::metadata(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound(key.to_string()),
            _ => StoreError::Io(path.display().to_string(), e),
        })?;
        if !meta.is_file() {
            return Err(StoreError::NotFound(key.to_string()));
        }
        let last_modified = meta
            .modified()
            .map_err(|e| StoreError::Io(path.display().to_string(), e))?;

        let sidecar = self.sidecar_path(key);
        let attributes = match fs::read_to_string(&sidecar) {
            Ok(content) => parse_attributes(key, &content)?,
            Err(e) if e.kind() == ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(StoreError::Io(sidecar.display().to_string(), e)),
        };

        Ok(ObjectMetadata {
            last_modified,
            attributes,
        })
    }
}

/// Keys name files directly inside the root.
fn is_plain_key(key: &str) -> bool {
    !key.is_empty() && key != "." && key != ".." && !key.contains(['/', '\\'])
}

fn parse_attributes(key: &str, content: &str) -> Result<HashMap<String, String>, StoreError> {
    serde_json::from_str(content).map_err(|e| StoreError::Metadata {
        key: key.to_string(),
        reason: e.to_string(),
    })
}
