//! busbench - Modbus RTU / GB/T 27930 exerciser
//!
//! Operator-facing CLI around the busbench codec libraries: offline frame
//! parsing with annotations, request building, simulated send/scan cycles
//! and illustrative GB/T 27930 frame forging. Transmission is synthesized;
//! no serial or CAN hardware is touched.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "busbench")]
#[command(about = "Modbus RTU / GB/T 27930 frame exerciser and annotator")]
#[command(long_about = "busbench - Modbus RTU / GB/T 27930 frame exerciser and annotator

Frame operations:
  parse       Decode a hand-entered Modbus frame with annotations
  build       Build a Modbus RTU read request frame
  send        Build, (simulated) exchange and decode, optionally on a scan timer

Annotations:
  annotate    Manage the annotation store (add, remove, find, list, export)

GB/T 27930:
  can27930    Forge an illustrative GB/T 27930 CAN frame

Examples:
  busbench parse -f 03 -d \"04 00 0A 00 0B B4 05\"
  busbench build --slave 1 -f 03 --start 0 --quantity 2
  busbench send --slave 1 -f 03 --start 0 --quantity 2 --scan 5 --interval-ms 500
  busbench annotate add 03_reg_0 \"line voltage\"
  busbench can27930 --message CRM")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Annotation store path (flat JSON object)
    #[arg(
        short = 'a',
        long = "annotations",
        global = true,
        env = "BUSBENCH_ANNOTATIONS",
        default_value = "modbus_annotations.json"
    )]
    annotations: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a hand-entered Modbus frame
    Parse {
        /// Function code, decimal menu form: 01..06, 15, 16
        #[arg(short = 'f', long = "function-code")]
        function_code: String,

        /// Frame bytes as hex, separated by spaces/commas/semicolons
        #[arg(short = 'd', long = "data")]
        data: String,
    },

    /// Build a Modbus RTU read request frame
    Build {
        /// Slave address (0-255)
        #[arg(short, long)]
        slave: u8,

        /// Function code: 01, 02, 03 or 04
        #[arg(short = 'f', long = "function-code")]
        function_code: String,

        /// Starting address
        #[arg(long, default_value_t = 0)]
        start: u16,

        /// Number of coils/registers
        #[arg(short, long, default_value_t = 1)]
        quantity: u16,
    },

    /// Build a request, run a simulated exchange and decode the response
    Send {
        /// Slave address (0-255)
        #[arg(short, long)]
        slave: u8,

        /// Function code: 01, 02, 03 or 04
        #[arg(short = 'f', long = "function-code")]
        function_code: String,

        /// Starting address
        #[arg(long, default_value_t = 0)]
        start: u16,

        /// Number of coils/registers
        #[arg(short, long, default_value_t = 1)]
        quantity: u16,

        /// Repeat the exchange this many times (scan mode)
        #[arg(long, default_value_t = 1)]
        scan: u32,

        /// Delay between scan cycles in milliseconds
        #[arg(long = "interval-ms", default_value_t = 1000)]
        interval_ms: u64,
    },

    /// Manage the annotation store
    Annotate {
        #[command(subcommand)]
        action: commands::annotate::AnnotateAction,
    },

    /// Forge an illustrative GB/T 27930 CAN frame
    Can27930 {
        /// Message type (CHM, BHM, CRM, BRM, BCP, CTS, CML, BRO, CRO,
        /// BCL, BCS, CCS, BSM, BST, CST, BSD, CSD, BEM, CEM)
        #[arg(short, long)]
        message: Option<String>,

        /// Source address (decimal), defaults per message direction
        #[arg(long)]
        src: Option<u8>,

        /// Destination address (decimal), defaults per message direction
        #[arg(long)]
        dst: Option<u8>,

        /// List the message catalogue instead of forging
        #[arg(short, long)]
        list: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .init();

    match cli.command {
        Commands::Parse { function_code, data } => {
            commands::parse::run(&function_code, &data, &cli.annotations)
        }
        Commands::Build { slave, function_code, start, quantity } => {
            commands::build::run(slave, &function_code, start, quantity)
        }
        Commands::Send { slave, function_code, start, quantity, scan, interval_ms } => {
            commands::send::run(slave, &function_code, start, quantity, scan, interval_ms, &cli.annotations)
        }
        Commands::Annotate { action } => commands::annotate::run(action, &cli.annotations),
        Commands::Can27930 { message, src, dst, list } => {
            commands::can::run(message.as_deref(), src, dst, list)
        }
    }
}
