//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a slot as `primary`, `secondary` or a raw slot number
fn parse_slot(s: &str) -> Result<u8, String> {
    match s.to_ascii_lowercase().as_str() {
        "primary" => Ok(0),
        "secondary" => Ok(1),
        other => other
            .parse::<u8>()
            .map_err(|e| format!("Invalid slot: {}", e)),
    }
}

#[derive(Parser)]
#[command(name = "flashmap")]
#[command(author, version, about = "Bootloader flash area map tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Layout file (TOML format), defaults to the built-in area table
    #[arg(long, global = true)]
    pub layout: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Area selection shared by the read, write and erase commands
#[derive(clap::Args, Debug, Clone)]
pub struct AreaArgs {
    /// Flash image file (created fully erased if missing)
    #[arg(short = 'f', long)]
    pub image_file: PathBuf,

    /// Area id or name (e.g. 2, image-0-secondary, scratch)
    #[arg(short, long)]
    pub area: String,

    /// Offset within the area (hex with 0x prefix, or decimal)
    #[arg(long, default_value = "0", value_parser = parse_hex_u32)]
    pub offset: u32,

    /// Length in bytes (defaults to the rest of the area)
    #[arg(long, value_parser = parse_hex_u32)]
    pub length: Option<u32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Layout operations
    #[command(subcommand)]
    Layout(LayoutCommands),

    /// List the sectors of an area
    Sectors {
        /// Area id or name
        area: String,
    },

    /// Resolve an image slot to its area
    Slot {
        /// Slot: primary, secondary, or a raw slot number
        #[arg(value_parser = parse_slot)]
        slot: u8,

        /// Image index
        #[arg(long, default_value_t = 0)]
        image: u8,
    },

    /// Read an area of a flash image to a file
    Read {
        #[command(flatten)]
        target: AreaArgs,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Program a file into an area of a flash image
    Write {
        #[command(flatten)]
        target: AreaArgs,

        /// Input file path
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Erase pages of an area of a flash image
    Erase {
        #[command(flatten)]
        target: AreaArgs,
    },
}

#[derive(Subcommand)]
pub enum LayoutCommands {
    /// Show the area table
    Show,

    /// Write the area table as TOML
    Dump {
        /// Output file (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the area table against the device geometry
    Check,
}
