//! `busbench annotate` - manage the annotation store
//!
//! Key formats (shared with the decoders):
//!   01_0        coil/discrete response bit
//!   03_reg_0    register response value
//!   05_addr_1   single write address
//!   15_coil_1   multiple-write coil address
//!   16_reg_100  multiple-write register address

use std::path::Path;

use anyhow::{bail, Result};
use clap::Subcommand;
use colored::Colorize;

use busbench_modbus::AnnotationLookup;

#[derive(Subcommand)]
pub enum AnnotateAction {
    /// Add or update an annotation
    Add {
        /// Annotation key, e.g. 03_reg_0
        key: String,
        /// Free-text note attached to the key
        text: String,
    },

    /// Remove an annotation
    Remove { key: String },

    /// Look up one annotation
    Find { key: String },

    /// List all annotations
    List,

    /// Remove every annotation from the store
    Clear {
        /// Confirm the wipe
        #[arg(long)]
        yes: bool,
    },

    /// Export the store to a timestamped text file
    Export,
}

pub fn run(action: AnnotateAction, path: &Path) -> Result<()> {
    let mut store = super::open_annotations(path)?;

    match action {
        AnnotateAction::Add { key, text } => {
            if key.trim().is_empty() || text.trim().is_empty() {
                bail!("key and annotation text must not be empty");
            }
            store.annotations_mut().set(key.clone(), text);
            store.save()?;
            println!("{} {key}", "added/updated:".green());
        }
        AnnotateAction::Remove { key } => match store.annotations_mut().remove(&key) {
            Some(_) => {
                store.save()?;
                println!("{} {key}", "removed:".green());
            }
            None => bail!("annotation '{key}' does not exist"),
        },
        AnnotateAction::Find { key } => match store.lookup(&key) {
            Some(text) => println!("{key}: {text}"),
            None => bail!("annotation '{key}' does not exist"),
        },
        AnnotateAction::List => {
            if store.annotations().is_empty() {
                println!("annotation store {} is empty", path.display());
            } else {
                for (key, text) in store.annotations().iter() {
                    println!("{}: {text}", key.bold());
                }
            }
        }
        AnnotateAction::Clear { yes } => {
            if !yes {
                bail!("refusing to clear {} annotations without --yes", store.annotations().len());
            }
            store.annotations_mut().clear();
            store.save()?;
            println!("{}", "annotation store cleared".green());
        }
        AnnotateAction::Export => {
            let exported = store.export_text()?;
            println!("exported to {}", exported.display());
        }
    }
    Ok(())
}
