//! Annotation lookup seam and stores
//!
//! Decoders only ever *read* annotations, through [`AnnotationLookup`]. The
//! working set and its persistence (a flat string-to-string JSON object,
//! human-editable) live here, outside the decode path, so tests can inject
//! an in-memory fake.
//!
//! Key formats, kept compatible with existing annotation files:
//! - `{fc}_{bit}` for coil/discrete response bits (e.g. `01_0`, `02_15`)
//! - `{fc}_reg_{index}` for register response values (e.g. `03_reg_0`)
//! - `{fc}_addr_{address}` for single writes (e.g. `05_addr_1`)
//! - `15_coil_{address}` / `16_reg_{address}` for multiple writes

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::Result;

/// Read-only annotation lookup injected into the decoders
pub trait AnnotationLookup {
    fn lookup(&self, key: &str) -> Option<&str>;
}

/// Empty store for decoding without annotations
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAnnotations;

impl AnnotationLookup for NoAnnotations {
    fn lookup(&self, _key: &str) -> Option<&str> {
        None
    }
}

/// In-memory annotation set.
///
/// BTreeMap keeps listings and exports in stable key order.
#[derive(Debug, Default, Clone)]
pub struct MemoryAnnotations {
    entries: BTreeMap<String, String>,
}

impl MemoryAnnotations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update an annotation
    pub fn set(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), text.into());
    }

    /// Remove an annotation, returning its previous text
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl AnnotationLookup for MemoryAnnotations {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

impl FromIterator<(String, String)> for MemoryAnnotations {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// File-backed annotation store (flat JSON object, UTF-8)
#[derive(Debug)]
pub struct AnnotationFile {
    path: PathBuf,
    annotations: MemoryAnnotations,
}

impl AnnotationFile {
    /// Open an annotation file, starting empty if it does not exist yet
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let annotations = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            let entries: BTreeMap<String, String> = serde_json::from_str(&raw)?;
            debug!("loaded {} annotations from {}", entries.len(), path.display());
            MemoryAnnotations { entries }
        } else {
            debug!("annotation file {} not found, starting empty", path.display());
            MemoryAnnotations::new()
        };
        Ok(Self { path, annotations })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn annotations(&self) -> &MemoryAnnotations {
        &self.annotations
    }

    pub fn annotations_mut(&mut self) -> &mut MemoryAnnotations {
        &mut self.annotations
    }

    /// Persist the current set back to the JSON file
    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.annotations.entries)?;
        fs::write(&self.path, json)?;
        info!("saved {} annotations to {}", self.annotations.len(), self.path.display());
        Ok(())
    }

    /// Export the set as a timestamped plain-text file next to the store,
    /// one `key: text` line per annotation. Returns the export path.
    pub fn export_text(&self) -> Result<PathBuf> {
        let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        let name = format!("modbus_annotations_{stamp}.txt");
        let export_path = self
            .path
            .parent()
            .map(|dir| dir.join(&name))
            .unwrap_or_else(|| PathBuf::from(&name));

        let mut file = fs::File::create(&export_path)?;
        writeln!(file, "Modbus annotation export")?;
        writeln!(file, "{}", "=".repeat(50))?;
        writeln!(file, "exported: {}", chrono::Local::now().format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(file)?;
        for (key, text) in self.annotations.iter() {
            writeln!(file, "{key}: {text}")?;
        }
        Ok(export_path)
    }
}

impl AnnotationLookup for AnnotationFile {
    fn lookup(&self, key: &str) -> Option<&str> {
        self.annotations.lookup(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_lookup() {
        let mut store = MemoryAnnotations::new();
        store.set("03_reg_0", "setpoint");
        assert_eq!(store.lookup("03_reg_0"), Some("setpoint"));
        assert_eq!(store.lookup("03_reg_1"), None);
    }

    #[test]
    fn test_memory_set_overwrites() {
        let mut store = MemoryAnnotations::new();
        store.set("05_addr_1", "pump enable");
        store.set("05_addr_1", "valve enable");
        assert_eq!(store.lookup("05_addr_1"), Some("valve enable"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotations.json");

        let mut store = AnnotationFile::open(&path).unwrap();
        assert!(store.annotations().is_empty());
        store.annotations_mut().set("01_0", "run contactor");
        store.annotations_mut().set("16_reg_100", "target current");
        store.save().unwrap();

        let reloaded = AnnotationFile::open(&path).unwrap();
        assert_eq!(reloaded.lookup("01_0"), Some("run contactor"));
        assert_eq!(reloaded.lookup("16_reg_100"), Some("target current"));
    }

    #[test]
    fn test_file_is_flat_json_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotations.json");

        let mut store = AnnotationFile::open(&path).unwrap();
        store.annotations_mut().set("03_reg_0", "setpoint");
        store.save().unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["03_reg_0"], "setpoint");
    }

    #[test]
    fn test_export_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotations.json");

        let mut store = AnnotationFile::open(&path).unwrap();
        store.annotations_mut().set("15_coil_1", "door lock");
        let export = store.export_text().unwrap();

        let text = fs::read_to_string(export).unwrap();
        assert!(text.contains("15_coil_1: door lock"));
    }

    #[test]
    fn test_malformed_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("annotations.json");
        fs::write(&path, "not json").unwrap();
        assert!(AnnotationFile::open(&path).is_err());
    }
}
