//! `busbench build` - construct a Modbus RTU read request frame

use anyhow::Result;
use colored::Colorize;

use busbench_modbus::report::hex_bytes;
use busbench_modbus::{build_read_request, FunctionCode};

pub fn run(slave: u8, function_code: &str, start: u16, quantity: u16) -> Result<()> {
    let code: FunctionCode = function_code.parse()?;
    let frame = build_read_request(slave, code, start, quantity)?;

    println!(
        "request: slave {slave}, {code}, start {start}, quantity {quantity}"
    );
    println!("{}", hex_bytes(&frame).bold());
    Ok(())
}
