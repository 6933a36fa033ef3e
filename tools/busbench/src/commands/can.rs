//! `busbench can27930` - forge illustrative GB/T 27930 frames
//!
//! Simulation only: real identifiers, random payloads, no CAN bus.

use anyhow::{bail, Result};
use colored::Colorize;

use busbench_gbt27930::{forge, Message, ADDR_BMS, ADDR_CHARGER};

pub fn run(message: Option<&str>, src: Option<u8>, dst: Option<u8>, list: bool) -> Result<()> {
    if list {
        println!("{}", "GB/T 27930 message catalogue".bold());
        for message in Message::ALL {
            println!(
                "  {:<4} PGN 0x{:04X}  {:<13} {}",
                message.name(),
                message.pgn(),
                format!("[{}]", message.stage()),
                message.description()
            );
        }
        return Ok(());
    }

    let Some(message) = message else {
        bail!("either --message or --list is required");
    };
    let message: Message = message.parse()?;

    // BMS-side messages default to BMS -> charger, charger-side the reverse
    let bms_originated = message.name().starts_with('B');
    let src = src.unwrap_or(if bms_originated { ADDR_BMS } else { ADDR_CHARGER });
    let dst = dst.unwrap_or(if bms_originated { ADDR_CHARGER } else { ADDR_BMS });

    let frame = forge(message, src, dst, &mut rand::thread_rng());
    println!("{} [{}]", message, message.stage());
    println!("{}", frame.to_string().bold());
    Ok(())
}
