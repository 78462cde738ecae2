//! Area types
//!
//! Core types for flash areas that work in no_std environments.

use core::fmt;

/// Logical identifier of a flash area
pub type AreaId = u8;

/// Area holding the bootloader itself
pub const FLASH_AREA_BOOTLOADER: AreaId = 0;
/// Primary slot of image 0
pub const FLASH_AREA_IMAGE_0_PRIMARY: AreaId = 1;
/// Secondary slot of image 0
pub const FLASH_AREA_IMAGE_0_SECONDARY: AreaId = 2;
/// Scratch area used by swap-with-scratch upgrades
pub const FLASH_AREA_SCRATCH: AreaId = 3;

/// Area id of the primary slot of an image
///
/// Image 0 uses ids 1/2; later images skip over the scratch id. Returns
/// `None` when the id would not fit in an [`AreaId`].
pub const fn image_primary(image_index: u8) -> Option<AreaId> {
    if image_index == 0 {
        return Some(FLASH_AREA_IMAGE_0_PRIMARY);
    }
    match image_index.checked_mul(2) {
        Some(id) => id.checked_add(2),
        None => None,
    }
}

/// Area id of the secondary slot of an image
pub const fn image_secondary(image_index: u8) -> Option<AreaId> {
    match image_primary(image_index) {
        Some(id) => id.checked_add(1),
        None => None,
    }
}

/// A named region of the internal flash
///
/// Areas are plain values held in a constant table; handing out references
/// to them is free and nothing is ever released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashArea {
    /// Logical area id
    pub id: AreaId,
    /// Device backing this area
    pub device_id: u8,
    /// Offset of the area from the start of the device
    pub base_offset: u32,
    /// Size of the area in bytes
    pub size: u32,
}

impl FlashArea {
    /// Create a new area
    pub const fn new(id: AreaId, device_id: u8, base_offset: u32, size: u32) -> Self {
        Self {
            id,
            device_id,
            base_offset,
            size,
        }
    }

    /// Device offset one past the last byte of the area
    pub const fn end(&self) -> u32 {
        self.base_offset + self.size
    }

    /// Translate an area-relative offset into a device offset
    ///
    /// Returns `None` if the result does not fit in 32 bits.
    pub const fn device_offset(&self, offset: u32) -> Option<u32> {
        self.base_offset.checked_add(offset)
    }

    /// Check if a device offset is within this area
    pub fn contains(&self, device_offset: u32) -> bool {
        device_offset >= self.base_offset && device_offset < self.end()
    }

    /// Check if this area overlaps with another
    pub fn overlaps(&self, other: &FlashArea) -> bool {
        self.base_offset < other.end() && other.base_offset < self.end()
    }

    /// What this area is used for, derived from its id
    pub fn kind(&self) -> AreaKind {
        AreaKind::of(self.id)
    }
}

/// One erase sector of an area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlashSector {
    /// Offset of the sector, relative to the start of the area
    pub offset: u32,
    /// Size of the sector in bytes
    pub size: u32,
}

impl FlashSector {
    /// Create a new sector
    pub const fn new(offset: u32, size: u32) -> Self {
        Self { offset, size }
    }

    /// Offset one past the last byte of the sector
    pub const fn end(&self) -> u32 {
        self.offset + self.size
    }
}

/// Role of an area, derived from its id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaKind {
    /// The bootloader image
    Bootloader,
    /// Primary slot of an image
    Primary(u8),
    /// Secondary slot of an image
    Secondary(u8),
    /// Swap scratch space
    Scratch,
}

impl AreaKind {
    /// Classify an area id
    pub const fn of(id: AreaId) -> Self {
        match id {
            FLASH_AREA_BOOTLOADER => Self::Bootloader,
            FLASH_AREA_IMAGE_0_PRIMARY => Self::Primary(0),
            FLASH_AREA_IMAGE_0_SECONDARY => Self::Secondary(0),
            FLASH_AREA_SCRATCH => Self::Scratch,
            _ => {
                let image = (id - 2) / 2;
                if id % 2 == 0 {
                    Self::Primary(image)
                } else {
                    Self::Secondary(image)
                }
            }
        }
    }
}

impl fmt::Display for AreaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bootloader => write!(f, "bootloader"),
            Self::Primary(image) => write!(f, "image-{}-primary", image),
            Self::Secondary(image) => write!(f, "image-{}-secondary", image),
            Self::Scratch => write!(f, "scratch"),
        }
    }
}
