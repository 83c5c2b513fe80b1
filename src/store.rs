// Progress store: the filename -> public link mapping that makes a run
// resumable. It is rewritten after every successful upload.

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Original local file name -> public link.
pub type UploadMap = BTreeMap<String, String>;

#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
    retry: RetryPolicy,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>, retry: RetryPolicy) -> Self {
        ProgressStore {
            path: path.into(),
            retry,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the mapping left by earlier runs.
    ///
    /// A missing file is a fresh start. An unreadable or corrupt file is
    /// logged and also treated as a fresh start; it will be overwritten by
    /// the next save.
    pub fn load(&self) -> UploadMap {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return UploadMap::new(),
            Err(e) => {
                log::warn!("cannot read {}: {e}; starting fresh", self.path.display());
                return UploadMap::new();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(e) => {
                log::warn!("{} is not a valid mapping: {e}; starting fresh", self.path.display());
                UploadMap::new()
            }
        }
    }

    /// Persist `map`, retrying failed writes.
    pub fn save(&self, map: &UploadMap) -> Result<()> {
        let bytes = to_pretty_json(map)?;
        self.retry.run(&format!("save {}", self.path.display()), |_| {
            self.write_replace(&bytes)
        })
    }

    /// Write next to the target and rename over it, so a crash mid-write
    /// leaves the previous mapping intact.
    fn write_replace(&self, bytes: &[u8]) -> Result<()> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, bytes).map_err(|e| Error::io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| Error::io(&self.path, e))
    }
}

/// Four-space indented JSON; non-ASCII text is written as-is.
fn to_pretty_json(map: &UploadMap) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    map.serialize(&mut ser)?;
    out.push(b'\n');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    fn store_in(dir: &Path) -> ProgressStore {
        ProgressStore::new(dir.join("uploaded_files.json"), RetryPolicy::new(2, Duration::ZERO))
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        assert!(store_in(dir.path()).load().is_empty());
    }

    #[test]
    fn corrupt_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::write(store.path(), "{\"a.jpg\": ").unwrap();
        assert!(store.load().is_empty());

        fs::write(store.path(), "[1, 2, 3]").unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_load_keeps_unicode() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let mut map = UploadMap::new();
        map.insert("опора_1.jpg".into(), "https://disk.example/i/Опора".into());
        map.insert("b.png".into(), "https://disk.example/i/b".into());

        store.save(&map).unwrap();
        let loaded = store.load();
        assert_eq!(loaded, map);
        store.save(&loaded).unwrap();
        assert_eq!(store.load(), map);

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("опора_1.jpg"));
        assert!(text.contains("\n    \""));
        assert!(!text.contains("\\u"));
    }

    #[test]
    fn save_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store.save(&UploadMap::new()).unwrap();
        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("uploaded_files.json")]);
    }

    #[test]
    fn save_into_missing_directory_fails_after_retries() {
        let dir = tempdir().unwrap();
        let store = ProgressStore::new(
            dir.path().join("nope").join("out.json"),
            RetryPolicy::new(2, Duration::ZERO),
        );
        match store.save(&UploadMap::new()) {
            Err(Error::Exhausted { attempts, .. }) => assert_eq!(attempts, 2),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
