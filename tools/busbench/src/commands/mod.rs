//! CLI subcommand implementations

pub mod annotate;
pub mod build;
pub mod can;
pub mod parse;
pub mod send;

use std::path::Path;

use anyhow::{Context, Result};
use busbench_modbus::AnnotationFile;

/// Open the annotation store, surfacing a readable error for a corrupt file
pub fn open_annotations(path: &Path) -> Result<AnnotationFile> {
    AnnotationFile::open(path)
        .with_context(|| format!("failed to load annotation store {}", path.display()))
}

/// Timestamp prefix used on data lines, as the live tool prints them
pub fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S%.3f").to_string()
}
