//! Layout command implementations

use std::path::Path;

use flashmap_core::area::{format_size, Layout};

use crate::error::Result;

/// Show the area table
pub fn cmd_show(layout: &Layout) -> Result<()> {
    print_layout(layout);
    Ok(())
}

/// Write the area table as TOML to a file or stdout
pub fn cmd_dump(layout: &Layout, output: Option<&Path>) -> Result<()> {
    match output {
        Some(out) => {
            layout.to_toml_file(out)?;
            println!("Saved layout to {:?}", out);
        }
        None => print!("{}", layout.to_toml_string()),
    }
    Ok(())
}

/// Validate the area table
pub fn cmd_check(layout: &Layout) -> Result<()> {
    layout.validate()?;
    println!(
        "Layout OK: {} areas, {} unused",
        layout.areas.len(),
        format_size(layout.unused_bytes())
    );
    Ok(())
}

/// Print a layout in human-readable format
fn print_layout(layout: &Layout) {
    let geo = &layout.geometry;

    if let Some(name) = &layout.name {
        println!("Layout: {}", name);
    }
    println!(
        "Device: {} at 0x{:08X}, {} pages, {} byte programming, erased 0x{:02X}",
        format_size(geo.total_size),
        geo.base_address,
        format_size(geo.page_size),
        geo.program_granularity,
        geo.erased_value
    );
    println!();
    println!(
        "{:<4} {:<20} {:<21} {:>10} {:>10}",
        "ID", "Name", "Offset", "Size", "Address"
    );
    println!("{}", "-".repeat(69));

    for area in &layout.areas {
        println!(
            "{:<4} {:<20} 0x{:08X}-0x{:08X} {:>10} 0x{:08X}",
            area.id,
            area.kind().to_string(),
            area.base_offset,
            area.end() - 1,
            format_size(area.size),
            geo.base_address.wrapping_add(area.base_offset)
        );
    }

    let unused = layout.unused_bytes();
    if unused > 0 {
        println!();
        println!("{} not covered by any area", format_size(unused));
    }
}
