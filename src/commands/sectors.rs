//! Sectors command implementation

use flashmap_core::area::{format_size, Layout};
use flashmap_core::sectors;
use flashmap_core::validate::validate_device;

use super::resolve_area;
use crate::error::Result;

/// List the sectors of an area
pub fn cmd_sectors(layout: &Layout, area: &str) -> Result<()> {
    let area = resolve_area(layout, area)?;
    validate_device(&area)?;
    let sectors = sectors::to_sectors(&layout.geometry, &area)?;

    println!(
        "Area {} ({}): {} sectors of {}",
        area.id,
        area.kind(),
        sectors.len(),
        format_size(layout.geometry.page_size)
    );
    println!("{:<6} {:>12} {:>12}", "Sector", "Offset", "Device");
    for (index, sector) in sectors.iter().enumerate() {
        println!(
            "{:<6} {:>#12x} {:>#12x}",
            index,
            sector.base_offset - area.base_offset,
            sector.base_offset
        );
    }
    Ok(())
}
