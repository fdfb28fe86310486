//! Filesystem utilities for code generation

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Write content to a file, creating parent directories if needed
pub fn write_file<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> io::Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(path, contents)
}

/// Destination for finished artifact files
pub trait ArtifactStore {
    fn write(&mut self, path: &Path, contents: &str) -> io::Result<()>;
}

/// Writes artifacts to the local filesystem
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskStore;

impl ArtifactStore for DiskStore {
    fn write(&mut self, path: &Path, contents: &str) -> io::Result<()> {
        write_file(path, contents)
    }
}

/// Keeps artifacts in memory, keyed by path
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    files: BTreeMap<PathBuf, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }

    pub fn exists(&self, path: impl AsRef<Path>) -> bool {
        self.files.contains_key(path.as_ref())
    }

    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        self.files.keys().map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl ArtifactStore for MemoryStore {
    fn write(&mut self, path: &Path, contents: &str) -> io::Result<()> {
        self.files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Entities").join("Account.cs");

        write_file(&path, "public partial class Account\n{\n}\n").unwrap();

        assert!(path.exists());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "public partial class Account\n{\n}\n"
        );
    }

    #[test]
    fn test_memory_store_overwrites() {
        let mut store = MemoryStore::new();
        store.write(Path::new("out/entities.cs"), "first").unwrap();
        store.write(Path::new("out/entities.cs"), "second").unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get("out/entities.cs"), Some("second"));
        assert!(!store.exists("out/optionsets.cs"));
    }
}
