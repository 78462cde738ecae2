//! The area table
//!
//! The default table is a compile-time constant describing how the
//! bootloader, both image slots and the scratch area are laid out in the
//! internal flash. Any other table (for instance one loaded from a layout
//! file) must pass [`validate_table`] before it is used.

use core::fmt;

use super::types::*;
use crate::error::{Error, Result};
use crate::geometry::{FlashGeometry, INTERNAL_FLASH_DEVICE, MAX_PROGRAM_GRANULARITY};

/// Areas of the internal flash
///
/// | id | area               | offset   | size   |
/// |----|--------------------|----------|--------|
/// | 0  | bootloader         | 0x00000  | 24 KiB |
/// | 1  | image-0-primary    | 0x06000  | 50 KiB |
/// | 2  | image-0-secondary  | 0x12800  | 50 KiB |
/// | 3  | scratch            | 0x1F000  | 4 KiB  |
pub static FLASH_AREAS: [FlashArea; 4] = [
    FlashArea::new(FLASH_AREA_BOOTLOADER, INTERNAL_FLASH_DEVICE, 0x0000_0000, 24 * 1024),
    FlashArea::new(FLASH_AREA_IMAGE_0_PRIMARY, INTERNAL_FLASH_DEVICE, 0x0000_6000, 50 * 1024),
    FlashArea::new(FLASH_AREA_IMAGE_0_SECONDARY, INTERNAL_FLASH_DEVICE, 0x0001_2800, 50 * 1024),
    FlashArea::new(FLASH_AREA_SCRATCH, INTERNAL_FLASH_DEVICE, 0x0001_F000, 4 * 1024),
];

/// Find an area by id
pub fn open(areas: &[FlashArea], id: AreaId) -> Result<&FlashArea> {
    areas
        .iter()
        .find(|area| area.id == id)
        .ok_or(Error::NotFound { id })
}

/// Release an area obtained from [`open`]
///
/// Areas are static, so this does nothing.
pub fn close(_area: &FlashArea) {}

/// Check a table against the device geometry
///
/// Every area must be on the internal flash, be non-empty, start and end
/// on a page boundary, lie within the device, and not overlap any other
/// area. Ids must be unique.
pub fn validate_table(
    areas: &[FlashArea],
    geometry: &FlashGeometry,
) -> core::result::Result<(), LayoutError> {
    if geometry.page_size == 0
        || geometry.program_granularity == 0
        || geometry.program_granularity as usize > MAX_PROGRAM_GRANULARITY
        || geometry.page_size % geometry.program_granularity != 0
        || geometry.total_size % geometry.page_size != 0
    {
        return Err(LayoutError::InvalidGeometry);
    }

    for area in areas {
        if area.device_id != INTERNAL_FLASH_DEVICE {
            return Err(LayoutError::UnsupportedDevice {
                id: area.id,
                device_id: area.device_id,
            });
        }
        if area.size == 0 {
            return Err(LayoutError::EmptyArea { id: area.id });
        }
        if !geometry.is_page_aligned(area.base_offset) || !geometry.is_page_aligned(area.size) {
            return Err(LayoutError::UnalignedArea { id: area.id });
        }
        match area.base_offset.checked_add(area.size) {
            Some(end) if end <= geometry.total_size => {}
            _ => return Err(LayoutError::AreaOutOfBounds { id: area.id }),
        }
    }

    for (i, a) in areas.iter().enumerate() {
        for b in areas.iter().skip(i + 1) {
            if a.id == b.id {
                return Err(LayoutError::DuplicateId { id: a.id });
            }
            if a.overlaps(b) {
                return Err(LayoutError::OverlappingAreas {
                    first: a.id,
                    second: b.id,
                });
            }
        }
    }

    Ok(())
}

/// Errors that can occur when validating or loading an area table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    /// Geometry constants are inconsistent
    InvalidGeometry,
    /// Area is not on the internal flash
    UnsupportedDevice {
        /// Offending area id
        id: AreaId,
        /// Device the area claims to live on
        device_id: u8,
    },
    /// Area has zero size
    EmptyArea {
        /// Offending area id
        id: AreaId,
    },
    /// Area offset or size is not a multiple of the page size
    UnalignedArea {
        /// Offending area id
        id: AreaId,
    },
    /// Area extends beyond the device
    AreaOutOfBounds {
        /// Offending area id
        id: AreaId,
    },
    /// Two areas share an id
    DuplicateId {
        /// The duplicated id
        id: AreaId,
    },
    /// Two areas overlap
    OverlappingAreas {
        /// First overlapping area id
        first: AreaId,
        /// Second overlapping area id
        second: AreaId,
    },
    /// Failed to parse layout file
    ParseError,
    /// I/O error
    IoError,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGeometry => write!(f, "invalid flash geometry"),
            Self::UnsupportedDevice { id, device_id } => {
                write!(f, "area {} is on unsupported device {}", id, device_id)
            }
            Self::EmptyArea { id } => write!(f, "area {} is empty", id),
            Self::UnalignedArea { id } => {
                write!(f, "area {} is not aligned to the page size", id)
            }
            Self::AreaOutOfBounds { id } => write!(f, "area {} extends beyond the device", id),
            Self::DuplicateId { id } => write!(f, "duplicate area id {}", id),
            Self::OverlappingAreas { first, second } => {
                write!(f, "areas {} and {} overlap", first, second)
            }
            Self::ParseError => write!(f, "failed to parse layout"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for LayoutError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_valid() {
        assert_eq!(validate_table(&FLASH_AREAS, &FlashGeometry::INTERNAL), Ok(()));
    }

    #[test]
    fn test_default_areas_are_disjoint() {
        for (i, a) in FLASH_AREAS.iter().enumerate() {
            for (j, b) in FLASH_AREAS.iter().enumerate() {
                if i != j {
                    assert!(
                        a.end() <= b.base_offset || b.end() <= a.base_offset,
                        "areas {} and {} overlap",
                        a.id,
                        b.id
                    );
                }
            }
        }
    }

    #[test]
    fn test_default_table_fills_device() {
        let used: u32 = FLASH_AREAS.iter().map(|a| a.size).sum();
        assert_eq!(used, FlashGeometry::INTERNAL.total_size);
    }

    #[test]
    fn test_open() {
        let area = open(&FLASH_AREAS, FLASH_AREA_IMAGE_0_SECONDARY).unwrap();
        assert_eq!(area.base_offset, 0x0001_2800);
        assert_eq!(area.size, 51200);
        close(area);

        assert_eq!(open(&FLASH_AREAS, 9), Err(Error::NotFound { id: 9 }));
    }

    #[test]
    fn test_validate_rejects_overlap() {
        let areas = [
            FlashArea::new(0, INTERNAL_FLASH_DEVICE, 0x0000, 0x2000),
            FlashArea::new(1, INTERNAL_FLASH_DEVICE, 0x1000, 0x2000),
        ];
        assert_eq!(
            validate_table(&areas, &FlashGeometry::INTERNAL),
            Err(LayoutError::OverlappingAreas { first: 0, second: 1 })
        );
    }

    #[test]
    fn test_validate_rejects_unaligned_size() {
        let areas = [FlashArea::new(0, INTERNAL_FLASH_DEVICE, 0x0000, 0x0900)];
        assert_eq!(
            validate_table(&areas, &FlashGeometry::INTERNAL),
            Err(LayoutError::UnalignedArea { id: 0 })
        );
    }

    #[test]
    fn test_validate_rejects_out_of_device() {
        let areas = [FlashArea::new(0, INTERNAL_FLASH_DEVICE, 0x1F000, 0x2000)];
        assert_eq!(
            validate_table(&areas, &FlashGeometry::INTERNAL),
            Err(LayoutError::AreaOutOfBounds { id: 0 })
        );

        let wrapping = [FlashArea::new(0, INTERNAL_FLASH_DEVICE, 0xFFFF_F800, 0x1000)];
        assert_eq!(
            validate_table(&wrapping, &FlashGeometry::INTERNAL),
            Err(LayoutError::AreaOutOfBounds { id: 0 })
        );
    }

    #[test]
    fn test_validate_rejects_external_device() {
        let areas = [
            FlashArea::new(0, INTERNAL_FLASH_DEVICE, 0x0000, 0x0800),
            FlashArea::new(5, 1, 0x0800, 0x0800),
        ];
        assert_eq!(
            validate_table(&areas, &FlashGeometry::INTERNAL),
            Err(LayoutError::UnsupportedDevice { id: 5, device_id: 1 })
        );
    }

    #[test]
    fn test_validate_rejects_duplicate_id() {
        let areas = [
            FlashArea::new(1, INTERNAL_FLASH_DEVICE, 0x0000, 0x0800),
            FlashArea::new(1, INTERNAL_FLASH_DEVICE, 0x0800, 0x0800),
        ];
        assert_eq!(
            validate_table(&areas, &FlashGeometry::INTERNAL),
            Err(LayoutError::DuplicateId { id: 1 })
        );
    }

    #[test]
    fn test_validate_rejects_bad_geometry() {
        let geometry = FlashGeometry {
            program_granularity: 3,
            ..FlashGeometry::INTERNAL
        };
        assert_eq!(
            validate_table(&FLASH_AREAS, &geometry),
            Err(LayoutError::InvalidGeometry)
        );
    }
}
