//! Slot command implementation

use flashmap_core::area::{format_size, Layout};
use flashmap_core::slot;

use crate::error::Result;

/// Resolve an image slot to its area and print it
pub fn cmd_slot(layout: &Layout, image: u8, slot: u8) -> Result<()> {
    let id = slot::id_from_slot(image, slot)?;
    let area = layout.open(id)?;

    println!(
        "image {} slot {} -> area {} ({}) at 0x{:08X}, {}",
        image,
        slot,
        area.id,
        area.kind(),
        area.base_offset,
        format_size(area.size)
    );
    Ok(())
}
