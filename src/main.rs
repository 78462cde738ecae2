//! flashmap - Bootloader flash area map tool
//!
//! Inspects the flash area table a bootloader is built with (or one
//! described in a TOML layout file) and exercises it against flash image
//! files. Image files are driven through an emulated internal flash
//! controller, so reads, writes and erases are validated exactly as they
//! are on the device.

mod cli;
mod commands;
mod error;
mod image;

use clap::Parser;
use cli::{Cli, Commands, LayoutCommands};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let layout = commands::load_layout(cli.layout.as_deref())?;

    let result = match cli.command {
        Commands::Layout(subcmd) => match subcmd {
            LayoutCommands::Show => commands::layout::cmd_show(&layout),
            LayoutCommands::Dump { output } => {
                commands::layout::cmd_dump(&layout, output.as_deref())
            }
            LayoutCommands::Check => commands::layout::cmd_check(&layout),
        },
        Commands::Sectors { area } => commands::sectors::cmd_sectors(&layout, &area),
        Commands::Slot { slot, image } => commands::slot::cmd_slot(&layout, image, slot),
        Commands::Read { target, output } => commands::io::cmd_read(&layout, &target, &output),
        Commands::Write { target, input } => commands::io::cmd_write(&layout, &target, &input),
        Commands::Erase { target } => commands::io::cmd_erase(&layout, &target),
    };

    result?;
    Ok(())
}
