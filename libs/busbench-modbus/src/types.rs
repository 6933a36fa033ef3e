//! Core data model: function codes, frame roles, verdicts and decoded fields

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CodecError;

/// Modbus function codes supported by the tool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FunctionCode {
    ReadCoils = 0x01,
    ReadDiscreteInputs = 0x02,
    ReadHoldingRegisters = 0x03,
    ReadInputRegisters = 0x04,
    WriteSingleCoil = 0x05,
    WriteSingleRegister = 0x06,
    WriteMultipleCoils = 0x0F,
    WriteMultipleRegisters = 0x10,
}

impl FunctionCode {
    pub const ALL: [FunctionCode; 8] = [
        FunctionCode::ReadCoils,
        FunctionCode::ReadDiscreteInputs,
        FunctionCode::ReadHoldingRegisters,
        FunctionCode::ReadInputRegisters,
        FunctionCode::WriteSingleCoil,
        FunctionCode::WriteSingleRegister,
        FunctionCode::WriteMultipleCoils,
        FunctionCode::WriteMultipleRegisters,
    ];

    /// Decimal two-digit label as shown in the function-code menu and used
    /// as the annotation key prefix ("15"/"16", not the wire values 0F/10).
    pub fn menu_code(&self) -> &'static str {
        match self {
            FunctionCode::ReadCoils => "01",
            FunctionCode::ReadDiscreteInputs => "02",
            FunctionCode::ReadHoldingRegisters => "03",
            FunctionCode::ReadInputRegisters => "04",
            FunctionCode::WriteSingleCoil => "05",
            FunctionCode::WriteSingleRegister => "06",
            FunctionCode::WriteMultipleCoils => "15",
            FunctionCode::WriteMultipleRegisters => "16",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FunctionCode::ReadCoils => "read coils",
            FunctionCode::ReadDiscreteInputs => "read discrete inputs",
            FunctionCode::ReadHoldingRegisters => "read holding registers",
            FunctionCode::ReadInputRegisters => "read input registers",
            FunctionCode::WriteSingleCoil => "write single coil",
            FunctionCode::WriteSingleRegister => "write single register",
            FunctionCode::WriteMultipleCoils => "write multiple coils",
            FunctionCode::WriteMultipleRegisters => "write multiple registers",
        }
    }

    /// The four read families (01-04) that the frame builder supports
    pub fn is_read(&self) -> bool {
        matches!(
            self,
            FunctionCode::ReadCoils
                | FunctionCode::ReadDiscreteInputs
                | FunctionCode::ReadHoldingRegisters
                | FunctionCode::ReadInputRegisters
        )
    }
}

impl From<FunctionCode> for u8 {
    fn from(code: FunctionCode) -> u8 {
        code as u8
    }
}

impl TryFrom<u8> for FunctionCode {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x01 => Ok(FunctionCode::ReadCoils),
            0x02 => Ok(FunctionCode::ReadDiscreteInputs),
            0x03 => Ok(FunctionCode::ReadHoldingRegisters),
            0x04 => Ok(FunctionCode::ReadInputRegisters),
            0x05 => Ok(FunctionCode::WriteSingleCoil),
            0x06 => Ok(FunctionCode::WriteSingleRegister),
            0x0F => Ok(FunctionCode::WriteMultipleCoils),
            0x10 => Ok(FunctionCode::WriteMultipleRegisters),
            _ => Err(CodecError::UnsupportedFunction(format!("0x{value:02X}"))),
        }
    }
}

impl FromStr for FunctionCode {
    type Err = CodecError;

    /// Parses the decimal menu form: "01".."06", "15", "16"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "01" | "1" => Ok(FunctionCode::ReadCoils),
            "02" | "2" => Ok(FunctionCode::ReadDiscreteInputs),
            "03" | "3" => Ok(FunctionCode::ReadHoldingRegisters),
            "04" | "4" => Ok(FunctionCode::ReadInputRegisters),
            "05" | "5" => Ok(FunctionCode::WriteSingleCoil),
            "06" | "6" => Ok(FunctionCode::WriteSingleRegister),
            "15" => Ok(FunctionCode::WriteMultipleCoils),
            "16" => Ok(FunctionCode::WriteMultipleRegisters),
            other => Err(CodecError::UnsupportedFunction(other.to_string())),
        }
    }
}

impl fmt::Display for FunctionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.menu_code(), self.description())
    }
}

/// Shape-based request/response classification result.
///
/// The classifier has no authoritative direction signal (RTU carries no
/// transaction IDs), so this is a heuristic verdict and can misclassify a
/// response whose byte-count field collides with a known function code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRole {
    Request,
    Response,
}

impl fmt::Display for FrameRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameRole::Request => write!(f, "request"),
            FrameRole::Response => write!(f, "response"),
        }
    }
}

/// Outcome of checking a frame's trailing CRC against a fresh computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrcVerdict {
    pub valid: bool,
    pub received: u16,
    pub calculated: u16,
}

/// One decoded field of a frame, with an optional user annotation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedField {
    pub label: String,
    pub raw_hex: String,
    pub value: i64,
    pub annotation: Option<String>,
}

impl DecodedField {
    pub fn new(label: impl Into<String>, raw_hex: impl Into<String>, value: i64) -> Self {
        Self {
            label: label.into(),
            raw_hex: raw_hex.into(),
            value,
            annotation: None,
        }
    }

    pub fn with_annotation(mut self, annotation: Option<String>) -> Self {
        self.annotation = annotation;
        self
    }

    /// Textual field carrying no numeric content, e.g. "insufficient data"
    pub fn notice(label: impl Into<String>) -> Self {
        Self::new(label, "--", 0)
    }
}

/// Structured result of decoding one frame
#[derive(Debug, Clone)]
pub struct DecodeReport {
    pub function_code: FunctionCode,
    pub role: FrameRole,
    /// None when the frame was too short for CRC checking (< 3 bytes)
    pub crc: Option<CrcVerdict>,
    pub fields: Vec<DecodedField>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_code_round_trip() {
        for code in FunctionCode::ALL {
            let byte: u8 = code.into();
            assert_eq!(FunctionCode::try_from(byte).unwrap(), code);
        }
    }

    #[test]
    fn test_menu_code_uses_decimal_labels() {
        assert_eq!(FunctionCode::WriteMultipleCoils.menu_code(), "15");
        assert_eq!(FunctionCode::WriteMultipleRegisters.menu_code(), "16");
        assert_eq!("15".parse::<FunctionCode>().unwrap(), FunctionCode::WriteMultipleCoils);
        assert_eq!("16".parse::<FunctionCode>().unwrap(), FunctionCode::WriteMultipleRegisters);
    }

    #[test]
    fn test_unknown_codes_rejected() {
        assert!(FunctionCode::try_from(0x07).is_err());
        assert!("0F".parse::<FunctionCode>().is_err());
        assert!("17".parse::<FunctionCode>().is_err());
    }

    #[test]
    fn test_read_family() {
        assert!(FunctionCode::ReadInputRegisters.is_read());
        assert!(!FunctionCode::WriteSingleCoil.is_read());
    }
}
