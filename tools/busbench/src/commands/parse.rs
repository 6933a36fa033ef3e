//! `busbench parse` - offline frame decode with annotations

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use busbench_modbus::parse;

pub fn run(function_code: &str, data: &str, annotations: &Path) -> Result<()> {
    let store = super::open_annotations(annotations)?;
    let report = parse(function_code, data, &store)?;

    for line in report.lines() {
        if line.starts_with("===") {
            println!("{}", line.bold());
        } else if line.contains("MISMATCH") {
            println!("{}", line.red());
        } else if line.contains("CRC: OK") {
            println!("{}", line.green());
        } else {
            println!("{line}");
        }
    }
    Ok(())
}
