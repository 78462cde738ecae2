//! Request validation
//!
//! Every read, write and erase passes through these checks before the
//! flash controller is touched. A request that fails here has had no
//! effect on the device.

use crate::area::FlashArea;
use crate::error::{Error, Result};
use crate::geometry::{FlashGeometry, INTERNAL_FLASH_DEVICE};

/// Check that an area lives on the internal flash
pub fn validate_device(area: &FlashArea) -> Result<()> {
    if area.device_id != INTERNAL_FLASH_DEVICE {
        return Err(Error::UnsupportedDevice {
            device_id: area.device_id,
        });
    }
    Ok(())
}

/// Check that `[offset, offset + len)` lies within the area
pub fn validate_rw(area: &FlashArea, offset: u32, len: u32) -> Result<()> {
    match offset.checked_add(len) {
        Some(end) if end <= area.size => Ok(()),
        _ => Err(Error::OutOfBounds {
            offset,
            len,
            area_size: area.size,
        }),
    }
}

/// Check that `[offset, offset + len)` of an area lies on the device
///
/// Returns the device offset of the start of the range.
pub fn validate_mapped(geometry: &FlashGeometry, area: &FlashArea, offset: u32, len: u32) -> Result<u32> {
    let range = area
        .base_offset
        .checked_add(offset)
        .and_then(|start| start.checked_add(len).map(|end| (start, end)));
    match range {
        Some((start, end)) if end <= geometry.total_size => Ok(start),
        _ => Err(Error::OutOfBounds {
            offset,
            len,
            area_size: area.size,
        }),
    }
}

/// Check that an erase request covers whole pages
pub fn validate_erase(geometry: &FlashGeometry, offset: u32, len: u32) -> Result<()> {
    if !geometry.is_page_aligned(offset) || !geometry.is_page_aligned(len) {
        return Err(Error::Misaligned {
            offset,
            len,
            align: geometry.page_size,
        });
    }
    Ok(())
}

/// Check that a program request starts on a program-granularity boundary
pub fn validate_program(geometry: &FlashGeometry, offset: u32, len: u32) -> Result<()> {
    if !geometry.is_program_aligned(offset) {
        return Err(Error::Misaligned {
            offset,
            len,
            align: geometry.program_granularity,
        });
    }
    Ok(())
}

/// Convert a buffer length into a flash length
///
/// Anything that does not fit in 32 bits cannot fit in an area either.
pub(crate) fn buffer_len(area: &FlashArea, offset: u32, len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::OutOfBounds {
        offset,
        len: u32::MAX,
        area_size: area.size,
    })
}
