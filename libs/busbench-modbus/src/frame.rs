//! Frame construction, CRC checking and request/response classification

use tracing::debug;

use crate::crc::{append_crc, crc16};
use crate::error::{CodecError, Result};
use crate::types::{CrcVerdict, FrameRole, FunctionCode};

/// Wire values of the eight supported function codes, used by the shape
/// heuristic in [`classify`].
const KNOWN_FUNCTION_BYTES: [u8; 8] = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x0F, 0x10];

/// Build a Modbus RTU read request frame.
///
/// Layout: `[slave, code, start_hi, start_lo, qty_hi, qty_lo, crc_lo, crc_hi]`.
/// Only the four read function codes (01-04) are supported; the tool's write
/// path does not go through the builder.
pub fn build_read_request(
    slave: u8,
    code: FunctionCode,
    start_address: u16,
    quantity: u16,
) -> Result<Vec<u8>> {
    if !code.is_read() {
        return Err(CodecError::UnsupportedFunction(format!(
            "{code} is not a read function code"
        )));
    }

    let mut frame = Vec::with_capacity(8);
    frame.push(slave);
    frame.push(code.into());
    frame.extend_from_slice(&start_address.to_be_bytes());
    frame.extend_from_slice(&quantity.to_be_bytes());
    Ok(append_crc(frame))
}

/// Check the trailing CRC of a frame (low byte at len-2, high byte at len-1)
/// against a fresh computation over the preceding bytes.
///
/// Returns `None` for frames shorter than 3 bytes, where no CRC check is
/// meaningful.
pub fn check_crc(frame: &[u8]) -> Option<CrcVerdict> {
    if frame.len() < 3 {
        return None;
    }
    let split = frame.len() - 2;
    let received = u16::from_le_bytes([frame[split], frame[split + 1]]);
    let calculated = crc16(&frame[..split]);
    if received != calculated {
        debug!(
            "CRC mismatch: received 0x{:04X}, calculated 0x{:04X}",
            received, calculated
        );
    }
    Some(CrcVerdict {
        valid: received == calculated,
        received,
        calculated,
    })
}

/// Decide whether a raw frame looks like a master request or a slave response.
///
/// Heuristic: a frame of length >= 6 whose second byte is one of the eight
/// known function-code values is a request; anything else is a response
/// (responses start with a byte-count in this tool's frame model).
///
/// There is no authoritative direction signal in RTU, so a response whose
/// byte-count happens to equal a function-code value is misclassified. This
/// is a known limitation kept for compatibility, not a bug to fix here.
pub fn classify(frame: &[u8]) -> FrameRole {
    if frame.len() >= 6 && KNOWN_FUNCTION_BYTES.contains(&frame[1]) {
        FrameRole::Request
    } else {
        FrameRole::Response
    }
}
