//! Device geometry
//!
//! The internal flash has a single uniform page size, so the whole device
//! is described by a handful of constants.

/// Device id of the internal flash, the only device this crate drives
pub const INTERNAL_FLASH_DEVICE: u8 = 0;

/// Largest program granularity a geometry may declare
pub const MAX_PROGRAM_GRANULARITY: usize = 256;

/// Geometry of the internal flash device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashGeometry {
    /// Address at which the device is memory mapped
    pub base_address: u32,
    /// Total device size in bytes
    pub total_size: u32,
    /// Smallest erasable unit, in bytes
    pub page_size: u32,
    /// Smallest atomically programmable unit, in bytes
    pub program_granularity: u32,
    /// Value every byte reads back as after an erase
    pub erased_value: u8,
}

impl FlashGeometry {
    /// Internal flash of the target MCU: 128 KiB, 2 KiB pages,
    /// double-word (8 byte) programming, mapped at 0x0800_0000
    pub const INTERNAL: Self = Self {
        base_address: 0x0800_0000,
        total_size: 128 * 1024,
        page_size: 2048,
        program_granularity: 8,
        erased_value: 0xFF,
    };

    /// Number of pages in the device
    pub const fn page_count(&self) -> u32 {
        self.total_size / self.page_size
    }

    /// Index of the page containing a device offset
    pub const fn page_of(&self, offset: u32) -> u32 {
        offset / self.page_size
    }

    /// Truncate a device offset down to the start of its page
    pub const fn page_floor(&self, offset: u32) -> u32 {
        offset - offset % self.page_size
    }

    /// Check whether a value is a multiple of the page size
    pub const fn is_page_aligned(&self, value: u32) -> bool {
        value % self.page_size == 0
    }

    /// Check whether a value is a multiple of the program granularity
    pub const fn is_program_aligned(&self, value: u32) -> bool {
        value % self.program_granularity == 0
    }
}

impl Default for FlashGeometry {
    fn default() -> Self {
        Self::INTERNAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_geometry() {
        let geo = FlashGeometry::INTERNAL;
        assert_eq!(geo.page_count(), 64);
        assert!(geo.is_page_aligned(0x6000));
        assert!(!geo.is_page_aligned(0x6001));
        assert!(geo.is_program_aligned(16));
        assert!(!geo.is_program_aligned(12));
    }

    #[test]
    fn test_page_floor() {
        let geo = FlashGeometry::INTERNAL;
        assert_eq!(geo.page_floor(0), 0);
        assert_eq!(geo.page_floor(2047), 0);
        assert_eq!(geo.page_floor(2048), 2048);
        assert_eq!(geo.page_floor(0x6123), 0x6000);
        assert_eq!(geo.page_of(0x6123), 12);
    }
}
