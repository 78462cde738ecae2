//! Sector enumeration
//!
//! The internal flash has one uniform page size, so the sectors of an area
//! are simply its pages in order. Sector lists are recomputed on every
//! query and held in fixed-capacity vectors so no allocator is needed.

use heapless::Vec;

use crate::area::{FlashArea, FlashSector};
use crate::error::{Error, Result};
use crate::geometry::FlashGeometry;

/// Largest number of sectors a single area may span
pub const MAX_SECTORS: usize = 128;

/// All sectors of one area
pub type Sectors = Vec<FlashSector, MAX_SECTORS>;

/// Number of sectors an area spans
pub fn sector_count(geometry: &FlashGeometry, area: &FlashArea) -> usize {
    area.size.div_ceil(geometry.page_size) as usize
}

/// Iterate over the sectors of an area, in increasing offset order
fn iter_sectors(
    geometry: &FlashGeometry,
    area: &FlashArea,
) -> impl Iterator<Item = FlashSector> {
    let page_size = geometry.page_size;
    let size = area.size;
    (0..size)
        .step_by(page_size as usize)
        .map(move |offset| FlashSector::new(offset, page_size.min(size - offset)))
}

/// List every sector of an area
///
/// Offsets are relative to the start of the area. Fails with
/// [`Error::TooManySectors`] if the area spans more than [`MAX_SECTORS`]
/// pages.
pub fn get_sectors(geometry: &FlashGeometry, area: &FlashArea) -> Result<Sectors> {
    let needed = sector_count(geometry, area);
    if needed > MAX_SECTORS {
        return Err(Error::TooManySectors {
            needed,
            capacity: MAX_SECTORS,
        });
    }

    let mut sectors = Sectors::new();
    for sector in iter_sectors(geometry, area) {
        sectors.push(sector).map_err(|_| Error::TooManySectors {
            needed,
            capacity: MAX_SECTORS,
        })?;
    }
    Ok(sectors)
}

/// Fill a caller-provided buffer with the sectors of an area
///
/// Returns the number of sectors written.
pub fn get_sectors_into(
    geometry: &FlashGeometry,
    area: &FlashArea,
    buf: &mut [FlashSector],
) -> Result<usize> {
    let needed = sector_count(geometry, area);
    if needed > buf.len() {
        return Err(Error::TooManySectors {
            needed,
            capacity: buf.len(),
        });
    }

    for (slot, sector) in buf.iter_mut().zip(iter_sectors(geometry, area)) {
        *slot = sector;
    }
    Ok(needed)
}

/// The sector of an area containing an area-relative offset
pub fn get_sector(geometry: &FlashGeometry, area: &FlashArea, offset: u32) -> Result<FlashSector> {
    if offset >= area.size {
        return Err(Error::OutOfBounds {
            offset,
            len: 0,
            area_size: area.size,
        });
    }
    Ok(FlashSector::new(geometry.page_floor(offset), geometry.page_size))
}

/// The page containing a device offset
///
/// The returned sector's offset is a device offset, truncated down to the
/// page boundary.
pub fn sector_from_offset(geometry: &FlashGeometry, device_offset: u32) -> FlashSector {
    FlashSector::new(geometry.page_floor(device_offset), geometry.page_size)
}

/// Describe every sector of an area as a flash area of its own
///
/// Each entry carries the parent area's id and device and the sector's
/// absolute device offset.
pub fn to_sectors(geometry: &FlashGeometry, area: &FlashArea) -> Result<Vec<FlashArea, MAX_SECTORS>> {
    let sectors = get_sectors(geometry, area)?;
    let mut out = Vec::new();
    for sector in &sectors {
        let base = area
            .device_offset(sector.offset)
            .ok_or(Error::OutOfBounds {
                offset: sector.offset,
                len: sector.size,
                area_size: area.size,
            })?;
        out.push(FlashArea::new(area.id, area.device_id, base, sector.size))
            .map_err(|_| Error::TooManySectors {
                needed: sectors.len(),
                capacity: MAX_SECTORS,
            })?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::FLASH_AREAS;
    use crate::geometry::INTERNAL_FLASH_DEVICE;

    const GEO: FlashGeometry = FlashGeometry::INTERNAL;

    #[test]
    fn test_primary_slot_has_25_sectors() {
        let area = FlashArea::new(1, INTERNAL_FLASH_DEVICE, 0x6000, 51200);
        let sectors = get_sectors(&GEO, &area).unwrap();
        assert_eq!(sectors.len(), 25);
        assert!(sectors.iter().all(|s| s.size == 2048));
        assert_eq!(sectors.last().unwrap().offset, 49152);
    }

    #[test]
    fn test_sectors_cover_area_exactly() {
        for area in &FLASH_AREAS {
            let sectors = get_sectors(&GEO, area).unwrap();
            let mut expected = 0;
            for sector in &sectors {
                assert_eq!(sector.offset, expected);
                expected = sector.end();
            }
            assert_eq!(expected, area.size);
        }
    }

    #[test]
    fn test_get_sectors_into() {
        let area = FLASH_AREAS[3];
        let mut buf = [FlashSector::default(); 4];
        assert_eq!(get_sectors_into(&GEO, &area, &mut buf), Ok(2));
        assert_eq!(buf[0], FlashSector::new(0, 2048));
        assert_eq!(buf[1], FlashSector::new(2048, 2048));
        assert_eq!(buf[2], FlashSector::default());

        let mut small = [FlashSector::default(); 1];
        assert_eq!(
            get_sectors_into(&GEO, &area, &mut small),
            Err(Error::TooManySectors {
                needed: 2,
                capacity: 1
            })
        );
    }

    #[test]
    fn test_too_many_sectors() {
        let geo = FlashGeometry {
            total_size: 1024 * 1024,
            ..GEO
        };
        let area = FlashArea::new(1, INTERNAL_FLASH_DEVICE, 0, 512 * 1024);
        assert_eq!(
            get_sectors(&geo, &area),
            Err(Error::TooManySectors {
                needed: 256,
                capacity: MAX_SECTORS
            })
        );
    }

    #[test]
    fn test_get_sector() {
        let area = FLASH_AREAS[1];
        assert_eq!(get_sector(&GEO, &area, 0), Ok(FlashSector::new(0, 2048)));
        assert_eq!(get_sector(&GEO, &area, 5000), Ok(FlashSector::new(4096, 2048)));
        assert_eq!(
            get_sector(&GEO, &area, 51199),
            Ok(FlashSector::new(49152, 2048))
        );
        assert!(matches!(
            get_sector(&GEO, &area, 51200),
            Err(Error::OutOfBounds { .. })
        ));
    }

    #[test]
    fn test_sector_from_offset() {
        assert_eq!(sector_from_offset(&GEO, 0x6000), FlashSector::new(0x6000, 2048));
        assert_eq!(sector_from_offset(&GEO, 0x67FF), FlashSector::new(0x6000, 2048));
        assert_eq!(sector_from_offset(&GEO, 0x6800), FlashSector::new(0x6800, 2048));
    }

    #[test]
    fn test_to_sectors() {
        let area = FLASH_AREAS[2];
        let sectors = to_sectors(&GEO, &area).unwrap();
        assert_eq!(sectors.len(), 25);
        assert_eq!(sectors[0], FlashArea::new(2, INTERNAL_FLASH_DEVICE, 0x12800, 2048));
        assert_eq!(sectors[24].base_offset, 0x12800 + 49152);
        assert!(sectors.iter().all(|s| s.id == area.id));
    }

    #[test]
    fn test_to_sectors_errors() {
        let geo = FlashGeometry {
            total_size: 1024 * 1024,
            ..GEO
        };
        let large = FlashArea::new(1, INTERNAL_FLASH_DEVICE, 0, 512 * 1024);
        assert_eq!(
            to_sectors(&geo, &large),
            Err(Error::TooManySectors {
                needed: 256,
                capacity: MAX_SECTORS
            })
        );

        let wrapping = FlashArea::new(1, INTERNAL_FLASH_DEVICE, 0xFFFF_F800, 0x1000);
        assert_eq!(
            to_sectors(&GEO, &wrapping),
            Err(Error::OutOfBounds {
                offset: 2048,
                len: 2048,
                area_size: 0x1000
            })
        );
    }
}
