//! Modbus RTU frame codec for busbench
//!
//! This library implements the protocol core shared by the live send/scan
//! path and the offline parser/annotator: CRC16 validation, request frame
//! construction, request/response role classification and per-function-code
//! field decoding with annotation lookup.
//!
//! The core is purely synchronous: every operation is a computation over its
//! input bytes. Serial transports, scan timers and annotation persistence
//! are collaborator concerns layered on top.

pub mod annotations;
pub mod crc;
pub mod decode;
pub mod error;
pub mod frame;
pub mod report;
pub mod types;

pub use annotations::{AnnotationFile, AnnotationLookup, MemoryAnnotations, NoAnnotations};
pub use crc::crc16;
pub use decode::{decode_frame, parse, parse_hex_entry};
pub use error::{CodecError, Result};
pub use frame::{build_read_request, check_crc, classify};
pub use types::{CrcVerdict, DecodeReport, DecodedField, FrameRole, FunctionCode};
