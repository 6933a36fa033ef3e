//! Function-code decoders and the hex-entry parse path
//!
//! Four decoder families (coil/discrete read, register read, single write,
//! multiple write), each producing an ordered field list and consulting the
//! injected annotation lookup. The frame-role classifier selects the request
//! or response shape; CRC mismatch and truncated input are reported as fields,
//! never as errors, so partial reports still render.

use tracing::debug;

use crate::annotations::AnnotationLookup;
use crate::error::{CodecError, Result};
use crate::frame::{check_crc, classify};
use crate::report;
use crate::types::{DecodeReport, DecodedField, FrameRole, FunctionCode};

const INSUFFICIENT: &str = "insufficient data";

/// Offline parser entry point: decimal function-code string ("01".."16"),
/// hex entry optionally separated by spaces/commas/semicolons, and an
/// annotation store. Returns the formatted multi-line report.
pub fn parse(
    function_code: &str,
    hex_entry: &str,
    annotations: &dyn AnnotationLookup,
) -> Result<String> {
    let code: FunctionCode = function_code.parse()?;
    let frame = parse_hex_entry(hex_entry)?;
    let decoded = decode_frame(code, &frame, annotations);
    Ok(report::render(&frame, &decoded))
}

/// Parse a hand-entered hex string into bytes.
///
/// Spaces, commas and semicolons are accepted as separators; any other
/// non-hex character rejects the whole entry before decoding. A trailing
/// lone nibble is ignored, matching the tool's long-standing entry behavior.
pub fn parse_hex_entry(input: &str) -> Result<Vec<u8>> {
    let cleaned: Vec<u8> = input
        .bytes()
        .filter(|b| !matches!(b, b' ' | b',' | b';'))
        .collect();

    if let Some(&bad) = cleaned.iter().find(|b| !b.is_ascii_hexdigit()) {
        return Err(CodecError::Format(format!(
            "'{}' is not a hexadecimal digit",
            bad as char
        )));
    }

    Ok(cleaned
        .chunks_exact(2)
        .map(|pair| (nibble(pair[0]) << 4) | nibble(pair[1]))
        .collect())
}

fn nibble(digit: u8) -> u8 {
    match digit {
        b'0'..=b'9' => digit - b'0',
        b'a'..=b'f' => digit - b'a' + 10,
        _ => digit - b'A' + 10,
    }
}

/// Decode one frame under the declared function code.
///
/// The classifier picks the request or response shape; the CRC verdict is
/// computed over everything but the two trailing bytes. Frames shorter than
/// 3 bytes get a single "insufficient length" field and no verdict.
pub fn decode_frame(
    code: FunctionCode,
    frame: &[u8],
    annotations: &dyn AnnotationLookup,
) -> DecodeReport {
    let role = classify(frame);
    let crc = check_crc(frame);
    debug!("decoding fc {} frame of {} bytes as {}", code.menu_code(), frame.len(), role);

    let mut fields = Vec::new();
    if crc.is_none() {
        fields.push(DecodedField::notice("insufficient length"));
        return DecodeReport { function_code: code, role, crc, fields };
    }

    match code {
        FunctionCode::ReadCoils | FunctionCode::ReadDiscreteInputs => match role {
            FrameRole::Request => decode_read_request(frame, &mut fields),
            FrameRole::Response => decode_coil_response(code, frame, annotations, &mut fields),
        },
        FunctionCode::ReadHoldingRegisters | FunctionCode::ReadInputRegisters => match role {
            FrameRole::Request => decode_read_request(frame, &mut fields),
            FrameRole::Response => decode_register_response(code, frame, annotations, &mut fields),
        },
        // Request and response share the same 8-byte shape
        FunctionCode::WriteSingleCoil | FunctionCode::WriteSingleRegister => {
            decode_single_write(code, frame, annotations, &mut fields)
        }
        FunctionCode::WriteMultipleCoils | FunctionCode::WriteMultipleRegisters => match role {
            FrameRole::Request => decode_multi_write_request(code, frame, annotations, &mut fields),
            FrameRole::Response => decode_multi_write_response(frame, &mut fields),
        },
    }

    DecodeReport { function_code: code, role, crc, fields }
}

/// Big-endian u16 at `offset`, if both bytes are present
fn be_u16(frame: &[u8], offset: usize) -> Option<u16> {
    Some(u16::from_be_bytes([
        *frame.get(offset)?,
        *frame.get(offset + 1)?,
    ]))
}

fn push_byte(fields: &mut Vec<DecodedField>, label: &str, byte: u8) {
    fields.push(DecodedField::new(label, format!("{byte:02X}"), i64::from(byte)));
}

fn push_u16(fields: &mut Vec<DecodedField>, frame: &[u8], offset: usize, label: &str) {
    match be_u16(frame, offset) {
        Some(value) => {
            fields.push(DecodedField::new(label, format!("{value:04X}"), i64::from(value)));
        }
        None => fields.push(DecodedField::notice(INSUFFICIENT)),
    }
}

fn push_crc(fields: &mut Vec<DecodedField>, frame: &[u8], offset: usize) {
    if frame.len() < offset + 2 {
        fields.push(DecodedField::notice(INSUFFICIENT));
        return;
    }
    let (lo, hi) = (frame[offset], frame[offset + 1]);
    fields.push(DecodedField::new(
        "CRC",
        format!("{lo:02X} {hi:02X}"),
        i64::from(u16::from_le_bytes([lo, hi])),
    ));
}

fn on_off(bit: u8) -> &'static str {
    if bit == 1 {
        "on"
    } else {
        "off"
    }
}

/// Fixed request shape shared by the four read families:
/// slave, function code, starting address, quantity, CRC.
fn decode_read_request(frame: &[u8], fields: &mut Vec<DecodedField>) {
    push_byte(fields, "slave address", frame[0]);
    push_byte(fields, "function code", frame[1]);
    push_u16(fields, frame, 2, "starting address");
    push_u16(fields, frame, 4, "quantity");
    push_crc(fields, frame, 6);
}

/// Coil/discrete response: leading byte-count, then each payload bit
/// individually, keyed `{fc}_{global_bit}` for annotation lookup.
fn decode_coil_response(
    code: FunctionCode,
    frame: &[u8],
    annotations: &dyn AnnotationLookup,
    fields: &mut Vec<DecodedField>,
) {
    let byte_count = frame[0] as usize;
    push_byte(fields, "byte count", frame[0]);

    let payload = &frame[1..frame.len() - 2];
    if payload.len() < byte_count {
        fields.push(DecodedField::notice(INSUFFICIENT));
    }

    for (offset, &byte) in payload.iter().take(byte_count).enumerate() {
        fields.push(DecodedField::new(
            format!("byte {} ({byte:08b})", offset + 1),
            format!("{byte:02X}"),
            i64::from(byte),
        ));
        for bit_pos in 0..8 {
            let bit = (byte >> bit_pos) & 1;
            let global_bit = offset * 8 + bit_pos;
            let key = format!("{}_{global_bit}", code.menu_code());
            fields.push(
                DecodedField::new(
                    format!("bit {global_bit} ({})", on_off(bit)),
                    format!("{bit}"),
                    i64::from(bit),
                )
                .with_annotation(annotations.lookup(&key).map(str::to_string)),
            );
        }
    }
}

/// Register response: leading byte-count, then big-endian 16-bit registers
/// keyed `{fc}_reg_{index}`.
fn decode_register_response(
    code: FunctionCode,
    frame: &[u8],
    annotations: &dyn AnnotationLookup,
    fields: &mut Vec<DecodedField>,
) {
    let byte_count = frame[0] as usize;
    push_byte(fields, "byte count", frame[0]);

    let register_count = byte_count / 2;
    fields.push(DecodedField::new(
        "register count",
        format!("{register_count:02X}"),
        register_count as i64,
    ));

    let payload = &frame[1..frame.len() - 2];
    for index in 0..register_count {
        let Some(value) = be_u16(payload, index * 2) else {
            fields.push(DecodedField::notice(INSUFFICIENT));
            break;
        };
        let key = format!("{}_reg_{index}", code.menu_code());
        fields.push(
            DecodedField::new(format!("register {index}"), format!("{value:04X}"), i64::from(value))
                .with_annotation(annotations.lookup(&key).map(str::to_string)),
        );
    }
}

/// Single write (05/06): request and response share one 8-byte shape,
/// decoded identically. Annotation key is `{fc}_addr_{address}`.
fn decode_single_write(
    code: FunctionCode,
    frame: &[u8],
    annotations: &dyn AnnotationLookup,
    fields: &mut Vec<DecodedField>,
) {
    if frame.len() < 8 {
        fields.push(DecodedField::notice(INSUFFICIENT));
        return;
    }

    push_byte(fields, "slave address", frame[0]);
    push_byte(fields, "function code", frame[1]);

    // Both reads are safe past the length check above
    let address = u16::from_be_bytes([frame[2], frame[3]]);
    let value = u16::from_be_bytes([frame[4], frame[5]]);
    fields.push(DecodedField::new("address", format!("{address:04X}"), i64::from(address)));

    let key = format!("{}_addr_{address}", code.menu_code());
    let annotation = annotations.lookup(&key).map(str::to_string);
    let value_field = if code == FunctionCode::WriteSingleCoil {
        // 0xFF00 is the only "on" encoding; everything else renders "off"
        let status = if value == 0xFF00 { "on" } else { "off" };
        DecodedField::new(format!("coil value ({status})"), format!("{value:04X}"), i64::from(value))
    } else {
        DecodedField::new("register value", format!("{value:04X}"), i64::from(value))
    };
    fields.push(value_field.with_annotation(annotation));

    push_crc(fields, frame, 6);
}

/// Multiple write request (15/16): fixed header, then the payload between
/// offset 7 and the CRC. Coils are keyed `15_coil_{address}`, registers
/// `16_reg_{address}`, both by absolute address (start + i).
fn decode_multi_write_request(
    code: FunctionCode,
    frame: &[u8],
    annotations: &dyn AnnotationLookup,
    fields: &mut Vec<DecodedField>,
) {
    push_byte(fields, "slave address", frame[0]);
    push_byte(fields, "function code", frame[1]);
    push_u16(fields, frame, 2, "starting address");
    push_u16(fields, frame, 4, "quantity");

    let (Some(start), Some(quantity)) = (be_u16(frame, 2), be_u16(frame, 4)) else {
        return;
    };

    match frame.get(6) {
        Some(&byte_count) => push_byte(fields, "byte count", byte_count),
        None => {
            fields.push(DecodedField::notice(INSUFFICIENT));
            return;
        }
    }

    let payload = if frame.len() >= 9 { &frame[7..frame.len() - 2] } else { &[][..] };

    if code == FunctionCode::WriteMultipleCoils {
        for i in 0..quantity as usize {
            let Some(&byte) = payload.get(i / 8) else {
                break;
            };
            let bit = (byte >> (i % 8)) & 1;
            let address = start as usize + i;
            let key = format!("15_coil_{address}");
            fields.push(
                DecodedField::new(
                    format!("coil {address} ({})", on_off(bit)),
                    format!("{bit}"),
                    i64::from(bit),
                )
                .with_annotation(annotations.lookup(&key).map(str::to_string)),
            );
        }
    } else {
        for i in 0..quantity as usize {
            let Some(value) = be_u16(payload, i * 2) else {
                break;
            };
            let address = start as usize + i;
            let key = format!("16_reg_{address}");
            fields.push(
                DecodedField::new(
                    format!("register {address}"),
                    format!("{value:04X}"),
                    i64::from(value),
                )
                .with_annotation(annotations.lookup(&key).map(str::to_string)),
            );
        }
    }

    push_crc(fields, frame, frame.len().saturating_sub(2));
}

/// Multiple write response: only the fixed header is reported. The payload
/// is deliberately not re-decoded here; the echo carries no values anyway
/// and the original decoder never did. See DESIGN.md.
fn decode_multi_write_response(frame: &[u8], fields: &mut Vec<DecodedField>) {
    push_byte(fields, "slave address", frame[0]);
    match frame.get(1) {
        Some(&fc) => push_byte(fields, "function code", fc),
        None => {
            fields.push(DecodedField::notice(INSUFFICIENT));
            return;
        }
    }
    push_u16(fields, frame, 2, "starting address");
    push_u16(fields, frame, 4, "quantity");
    push_crc(fields, frame, frame.len().saturating_sub(2));
}
