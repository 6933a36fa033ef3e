//! Illustrative GB/T 27930 frame forging
//!
//! GB/T 27930 carries EV charging communication between a BMS and a charger
//! over CAN, with J1939-style 29-bit identifiers. This crate only *forges*
//! frames for exercising displays and logs: the CAN IDs are composed from the
//! real message PGNs, but payloads are synthesized at random. There is no
//! field-level decoding and no bus I/O here, deliberately.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use thiserror::Error;
use tracing::debug;

/// Default source address of the BMS per GB/T 27930
pub const ADDR_BMS: u8 = 0xF4;
/// Default source address of the charger
pub const ADDR_CHARGER: u8 = 0x56;

#[derive(Debug, Error)]
pub enum Gbt27930Error {
    #[error("unknown message type: {0}")]
    UnknownMessage(String),
}

/// Charging session stage a message belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Handshake,
    Configuration,
    Charging,
    Ending,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Handshake => write!(f, "handshake"),
            Stage::Configuration => write!(f, "configuration"),
            Stage::Charging => write!(f, "charging"),
            Stage::Ending => write!(f, "ending"),
        }
    }
}

/// GB/T 27930 message catalogue (charger- and BMS-side)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    /// Charger handshake
    Chm,
    /// BMS handshake
    Bhm,
    /// Charger recognition
    Crm,
    /// BMS and vehicle recognition
    Brm,
    /// Battery charging parameters
    Bcp,
    /// Charger time synchronization
    Cts,
    /// Charger max output capability
    Cml,
    /// Battery charging readiness
    Bro,
    /// Charger output readiness
    Cro,
    /// Battery charging demand
    Bcl,
    /// Battery charging total status
    Bcs,
    /// Charger charging status
    Ccs,
    /// Battery status
    Bsm,
    /// BMS charging stop
    Bst,
    /// Charger charging stop
    Cst,
    /// BMS charging statistics
    Bsd,
    /// Charger charging statistics
    Csd,
    /// BMS error
    Bem,
    /// Charger error
    Cem,
}

impl Message {
    pub const ALL: [Message; 19] = [
        Message::Chm,
        Message::Bhm,
        Message::Crm,
        Message::Brm,
        Message::Bcp,
        Message::Cts,
        Message::Cml,
        Message::Bro,
        Message::Cro,
        Message::Bcl,
        Message::Bcs,
        Message::Ccs,
        Message::Bsm,
        Message::Bst,
        Message::Cst,
        Message::Bsd,
        Message::Csd,
        Message::Bem,
        Message::Cem,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Message::Chm => "CHM",
            Message::Bhm => "BHM",
            Message::Crm => "CRM",
            Message::Brm => "BRM",
            Message::Bcp => "BCP",
            Message::Cts => "CTS",
            Message::Cml => "CML",
            Message::Bro => "BRO",
            Message::Cro => "CRO",
            Message::Bcl => "BCL",
            Message::Bcs => "BCS",
            Message::Ccs => "CCS",
            Message::Bsm => "BSM",
            Message::Bst => "BST",
            Message::Cst => "CST",
            Message::Bsd => "BSD",
            Message::Csd => "CSD",
            Message::Bem => "BEM",
            Message::Cem => "CEM",
        }
    }

    /// Parameter group number (PDU1 format: low byte zero, destination
    /// address fills the PS field)
    pub fn pgn(&self) -> u32 {
        match self {
            Message::Chm => 0x2600,
            Message::Bhm => 0x2700,
            Message::Crm => 0x0100,
            Message::Brm => 0x0200,
            Message::Bcp => 0x0600,
            Message::Cts => 0x0700,
            Message::Cml => 0x0800,
            Message::Bro => 0x0900,
            Message::Cro => 0x0A00,
            Message::Bcl => 0x1000,
            Message::Bcs => 0x1100,
            Message::Ccs => 0x1200,
            Message::Bsm => 0x1300,
            Message::Bst => 0x1900,
            Message::Cst => 0x1A00,
            Message::Bsd => 0x1C00,
            Message::Csd => 0x1D00,
            Message::Bem => 0x1E00,
            Message::Cem => 0x1F00,
        }
    }

    /// J1939 priority field; GB/T 27930 assigns priority 6 to every message
    pub fn priority(&self) -> u8 {
        6
    }

    pub fn stage(&self) -> Stage {
        match self {
            Message::Chm | Message::Bhm | Message::Crm | Message::Brm => Stage::Handshake,
            Message::Bcp | Message::Cts | Message::Cml | Message::Bro | Message::Cro => {
                Stage::Configuration
            }
            Message::Bcl | Message::Bcs | Message::Ccs | Message::Bsm => Stage::Charging,
            Message::Bst | Message::Cst | Message::Bsd | Message::Csd | Message::Bem
            | Message::Cem => Stage::Ending,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Message::Chm => "charger handshake",
            Message::Bhm => "BMS handshake",
            Message::Crm => "charger recognition",
            Message::Brm => "BMS and vehicle recognition",
            Message::Bcp => "battery charging parameters",
            Message::Cts => "charger time synchronization",
            Message::Cml => "charger max output capability",
            Message::Bro => "battery charging readiness",
            Message::Cro => "charger output readiness",
            Message::Bcl => "battery charging demand",
            Message::Bcs => "battery charging total status",
            Message::Ccs => "charger charging status",
            Message::Bsm => "battery status",
            Message::Bst => "BMS charging stop",
            Message::Cst => "charger charging stop",
            Message::Bsd => "BMS charging statistics",
            Message::Csd => "charger charging statistics",
            Message::Bem => "BMS error",
            Message::Cem => "charger error",
        }
    }
}

impl FromStr for Message {
    type Err = Gbt27930Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.to_ascii_uppercase();
        Message::ALL
            .into_iter()
            .find(|m| m.name() == upper)
            .ok_or_else(|| Gbt27930Error::UnknownMessage(s.to_string()))
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.description())
    }
}

/// A forged CAN frame: 29-bit identifier plus an 8-byte payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanFrame {
    pub id: u32,
    pub data: [u8; 8],
}

impl fmt::Display for CanFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ID=0x{:08X} data=", self.id)?;
        for (i, byte) in self.data.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

/// Compose the 29-bit identifier: priority, PGN (PDU1, so the destination
/// address occupies the PS byte), source address.
pub fn can_id(message: Message, source: u8, destination: u8) -> u32 {
    (u32::from(message.priority()) << 26)
        | ((message.pgn() | u32::from(destination)) << 8)
        | u32::from(source)
}

/// Forge an illustrative frame for the given message: real identifier,
/// random payload. Display-path exercise only.
pub fn forge(message: Message, source: u8, destination: u8, rng: &mut impl Rng) -> CanFrame {
    let mut data = [0u8; 8];
    rng.fill(&mut data);
    let frame = CanFrame { id: can_id(message, source, destination), data };
    debug!("forged {} frame {}", message.name(), frame);
    frame
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_can_id_composition() {
        // CRM from charger (0x56) to BMS (0xF4): priority 6, PGN 0x0100
        assert_eq!(can_id(Message::Crm, ADDR_CHARGER, ADDR_BMS), 0x1801F456);
        // BCL from BMS to charger
        assert_eq!(can_id(Message::Bcl, ADDR_BMS, ADDR_CHARGER), 0x181056F4);
    }

    #[test]
    fn test_message_name_round_trip() {
        for message in Message::ALL {
            assert_eq!(message.name().parse::<Message>().unwrap(), message);
        }
        assert!("XYZ".parse::<Message>().is_err());
    }

    #[test]
    fn test_stage_assignment() {
        assert_eq!(Message::Chm.stage(), Stage::Handshake);
        assert_eq!(Message::Cml.stage(), Stage::Configuration);
        assert_eq!(Message::Bcs.stage(), Stage::Charging);
        assert_eq!(Message::Cst.stage(), Stage::Ending);
    }

    #[test]
    fn test_forge_is_deterministic_per_seed() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let fa = forge(Message::Brm, ADDR_BMS, ADDR_CHARGER, &mut a);
        let fb = forge(Message::Brm, ADDR_BMS, ADDR_CHARGER, &mut b);
        assert_eq!(fa, fb);
        assert_eq!(fa.id, can_id(Message::Brm, ADDR_BMS, ADDR_CHARGER));
    }
}
