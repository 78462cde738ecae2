//! The flash area map

use heapless::Vec;

use crate::area::{self, validate_table, AreaId, FlashArea, FlashSector, LayoutError, FLASH_AREAS};
use crate::controller::{ControllerGuard, FlashController};
use crate::error::{EraseVerifyFailure, Error, Result};
use crate::geometry::{FlashGeometry, MAX_PROGRAM_GRANULARITY};
use crate::sectors::{self, Sectors, MAX_SECTORS};
use crate::validate::{
    buffer_len, validate_device, validate_erase, validate_mapped, validate_program, validate_rw,
};

/// Bounds-checked access to the areas of the internal flash
///
/// The map owns the flash controller, so only one sequence of flash
/// operations can be in progress at a time.
pub struct FlashMap<'a, C: FlashController> {
    controller: C,
    geometry: FlashGeometry,
    areas: &'a [FlashArea],
}

impl<C: FlashController> FlashMap<'static, C> {
    /// Create a map over the built-in area table and internal flash geometry
    pub fn new(controller: C) -> Self {
        debug_assert!(validate_table(&FLASH_AREAS, &FlashGeometry::INTERNAL).is_ok());
        Self {
            controller,
            geometry: FlashGeometry::INTERNAL,
            areas: &FLASH_AREAS,
        }
    }
}

impl<'a, C: FlashController> FlashMap<'a, C> {
    /// Create a map over a custom area table
    ///
    /// The table is validated against the geometry, and the controller's
    /// mapped view must cover the whole device.
    pub fn with_table(
        controller: C,
        geometry: FlashGeometry,
        areas: &'a [FlashArea],
    ) -> core::result::Result<Self, LayoutError> {
        validate_table(areas, &geometry)?;
        if controller.mapped().len() < geometry.total_size as usize {
            return Err(LayoutError::InvalidGeometry);
        }
        Ok(Self {
            controller,
            geometry,
            areas,
        })
    }

    /// Device geometry
    pub fn geometry(&self) -> &FlashGeometry {
        &self.geometry
    }

    /// The area table
    pub fn areas(&self) -> &'a [FlashArea] {
        self.areas
    }

    /// Get a reference to the flash controller
    pub fn controller(&self) -> &C {
        &self.controller
    }

    /// Get a mutable reference to the flash controller
    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    /// Consume the map and return the flash controller
    pub fn into_controller(self) -> C {
        self.controller
    }

    /// Find an area by id
    pub fn open(&self, id: AreaId) -> Result<&'a FlashArea> {
        area::open(self.areas, id)
    }

    /// Release an area
    pub fn close(&self, area: &FlashArea) {
        area::close(area)
    }

    /// Check that an area is on the internal flash and in this map's table
    fn check_area(&self, area: &FlashArea) -> Result<()> {
        validate_device(area)?;
        if !self.areas.contains(area) {
            log::error!("area {} is not in the area table", area.id);
            return Err(Error::NotFound { id: area.id });
        }
        Ok(())
    }

    /// Program granularity of the device backing an area
    pub fn align(&self, _area: &FlashArea) -> u32 {
        self.geometry.program_granularity
    }

    /// Erased byte value of the device backing an area
    pub fn erased_value(&self, _area: &FlashArea) -> u8 {
        self.geometry.erased_value
    }

    /// Read `dst.len()` bytes from an area
    pub fn read(&self, area: &FlashArea, offset: u32, dst: &mut [u8]) -> Result<()> {
        self.check_area(area)?;
        let len = buffer_len(area, offset, dst.len())?;
        validate_rw(area, offset, len)?;
        let start = validate_mapped(&self.geometry, area, offset, len)? as usize;

        log::debug!(
            "read area {} offset 0x{:X} len 0x{:X}",
            area.id,
            offset,
            len
        );

        let src = self
            .controller
            .mapped()
            .get(start..start + dst.len())
            .ok_or(Error::OutOfBounds {
                offset,
                len,
                area_size: area.size,
            })?;
        dst.copy_from_slice(src);
        Ok(())
    }

    /// Program `src` into an area
    ///
    /// The data is programmed one program-granularity chunk at a time in
    /// increasing address order, with a trailing partial chunk padded with
    /// the erased value. The target range must already be erased. The first
    /// failing chunk aborts the write; earlier chunks stay programmed.
    pub fn write(&mut self, area: &FlashArea, offset: u32, src: &[u8]) -> Result<()> {
        self.check_area(area)?;
        let len = buffer_len(area, offset, src.len())?;
        validate_rw(area, offset, len)?;
        let mut addr = validate_mapped(&self.geometry, area, offset, len)?;
        validate_program(&self.geometry, offset, len)?;

        if src.is_empty() {
            return Ok(());
        }

        log::debug!(
            "write area {} offset 0x{:X} len 0x{:X}",
            area.id,
            offset,
            len
        );

        let granularity = self.geometry.program_granularity as usize;
        let erased = self.geometry.erased_value;

        let mut guard = ControllerGuard::unlock(&mut self.controller).map_err(|status| {
            log::error!("failed to unlock flash for programming: {:?}", status);
            Error::ProgramFailed { addr, status }
        })?;

        for chunk in src.chunks(granularity) {
            let mut buf = [erased; MAX_PROGRAM_GRANULARITY];
            buf[..chunk.len()].copy_from_slice(chunk);

            log::trace!("program 0x{:08X}", addr);
            if let Err(status) = guard.program(addr, &buf[..granularity]) {
                log::error!("program failed at 0x{:08X}: {:?}", addr, status);
                return Err(Error::ProgramFailed { addr, status });
            }
            addr += granularity as u32;
        }

        Ok(())
    }

    /// Erase whole pages of an area
    ///
    /// `offset` and `len` must be multiples of the page size. The pages are
    /// erased with a single command and then read back.
    ///
    /// # Panics
    ///
    /// Panics if any byte of the range does not read back as the erased
    /// value after the erase command reported success.
    pub fn erase(&mut self, area: &FlashArea, offset: u32, len: u32) -> Result<()> {
        self.check_area(area)?;
        validate_erase(&self.geometry, offset, len)?;
        validate_rw(area, offset, len)?;
        let addr = validate_mapped(&self.geometry, area, offset, len)?;

        if len == 0 {
            return Ok(());
        }

        let first_page = self.geometry.page_of(addr);
        let last_page = self.geometry.page_of(addr + len - 1);
        let count = last_page - first_page + 1;

        log::debug!(
            "erase area {} offset 0x{:X} len 0x{:X} (pages {}..={})",
            area.id,
            offset,
            len,
            first_page,
            last_page
        );

        {
            let mut guard = ControllerGuard::unlock(&mut self.controller).map_err(|status| {
                log::error!("failed to unlock flash for erase: {:?}", status);
                Error::EraseFailed { addr, status }
            })?;
            guard.erase_pages(first_page, count).map_err(|status| {
                log::error!("erase failed at 0x{:08X}: {:?}", addr, status);
                Error::EraseFailed { addr, status }
            })?;
        }

        self.check_erased_range(area, offset, addr, len)
    }

    /// Read back an erased range and abort if any byte is not blank
    fn check_erased_range(&self, area: &FlashArea, offset: u32, addr: u32, len: u32) -> Result<()> {
        let erased = self.geometry.erased_value;
        let start = addr as usize;
        let range = self
            .controller
            .mapped()
            .get(start..start + len as usize)
            .ok_or(Error::OutOfBounds {
                offset,
                len,
                area_size: area.size,
            })?;

        if let Some(pos) = range.iter().position(|&byte| byte != erased) {
            let failure = EraseVerifyFailure {
                addr: addr + pos as u32,
                expected: erased,
                found: range[pos],
            };
            log::error!("{}", failure);
            panic!("{}", failure);
        }

        Ok(())
    }

    /// List every sector of an area
    pub fn get_sectors(&self, area: &FlashArea) -> Result<Sectors> {
        self.check_area(area)?;
        sectors::get_sectors(&self.geometry, area)
    }

    /// Fill a caller-provided buffer with the sectors of an area
    pub fn get_sectors_into(&self, area: &FlashArea, buf: &mut [FlashSector]) -> Result<usize> {
        self.check_area(area)?;
        sectors::get_sectors_into(&self.geometry, area, buf)
    }

    /// The sector of an area containing an area-relative offset
    pub fn get_sector(&self, area: &FlashArea, offset: u32) -> Result<FlashSector> {
        self.check_area(area)?;
        sectors::get_sector(&self.geometry, area, offset)
    }

    /// The page containing a device offset
    pub fn sector_from_offset(&self, device_offset: u32) -> FlashSector {
        sectors::sector_from_offset(&self.geometry, device_offset)
    }

    /// Describe every sector of the area with this id as an area of its own
    pub fn to_sectors(&self, id: AreaId) -> Result<Vec<FlashArea, MAX_SECTORS>> {
        let area = self.open(id)?;
        self.check_area(area)?;
        sectors::to_sectors(&self.geometry, area)
    }
}
