//! Text rendering of decode reports
//!
//! Produces the multi-line report shown by the parser window and the CLI:
//! raw bytes, length, classified role, CRC verdict, then the decoded field
//! list with annotations.

use std::fmt::Write;

use crate::types::DecodeReport;

/// Render bytes as space-separated uppercase hex pairs
pub fn hex_bytes(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 3);
    for (i, byte) in data.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        let _ = write!(out, "{byte:02X}");
    }
    out
}

/// Render a decode report as the formatted multi-line text report
pub fn render(frame: &[u8], report: &DecodeReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Modbus function code {} decode ===", report.function_code);
    let _ = writeln!(out, "raw data: {}", hex_bytes(frame));
    let _ = writeln!(out, "length: {} bytes", frame.len());
    let _ = writeln!(out, "role: {}", report.role);

    match report.crc {
        Some(verdict) if verdict.valid => {
            let _ = writeln!(out, "CRC: OK (0x{:04X})", verdict.calculated);
        }
        Some(verdict) => {
            let _ = writeln!(
                out,
                "CRC: MISMATCH (received 0x{:04X}, calculated 0x{:04X})",
                verdict.received, verdict.calculated
            );
        }
        None => {
            let _ = writeln!(out, "CRC: not checked (frame shorter than 3 bytes)");
        }
    }

    for field in &report.fields {
        let _ = write!(out, "  {}: {} ({})", field.label, field.raw_hex, field.value);
        if let Some(annotation) = &field.annotation {
            let _ = write!(out, " - {annotation}");
        }
        out.push('\n');
    }

    out
}
