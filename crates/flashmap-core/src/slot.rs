//! Slot resolution
//!
//! Maps an (image index, slot) pair to the id of the area holding that
//! copy of the image. The scratch area is never a slot.

use core::fmt;

use crate::area::{image_primary, image_secondary, AreaId};
use crate::error::{Error, Result};

/// Which copy of an image a slot holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SlotRole {
    /// The bootable copy
    Primary = 0,
    /// The staged upgrade candidate
    Secondary = 1,
}

impl SlotRole {
    /// Area id of this slot for an image
    pub const fn area_id(self, image_index: u8) -> Result<AreaId> {
        let id = match self {
            Self::Primary => image_primary(image_index),
            Self::Secondary => image_secondary(image_index),
        };
        match id {
            Some(id) => Ok(id),
            None => Err(Error::InvalidImage { image_index }),
        }
    }
}

impl TryFrom<u8> for SlotRole {
    type Error = Error;

    fn try_from(slot: u8) -> Result<Self> {
        match slot {
            0 => Ok(Self::Primary),
            1 => Ok(Self::Secondary),
            _ => Err(Error::InvalidSlot { slot }),
        }
    }
}

impl fmt::Display for SlotRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Secondary => write!(f, "secondary"),
        }
    }
}

/// Area id of a slot, given the raw slot number (0 primary, 1 secondary)
pub fn id_from_slot(image_index: u8, slot: u8) -> Result<AreaId> {
    SlotRole::try_from(slot)?.area_id(image_index)
}

/// Area id of a slot of image 0
pub fn id_from_slot_default(slot: u8) -> Result<AreaId> {
    id_from_slot(0, slot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::{open, FLASH_AREAS, FLASH_AREA_SCRATCH};

    #[test]
    fn test_image_0_slots_are_distinct_and_open() {
        let primary = id_from_slot(0, 0).unwrap();
        let secondary = id_from_slot(0, 1).unwrap();
        assert_ne!(primary, secondary);
        assert!(open(&FLASH_AREAS, primary).is_ok());
        assert!(open(&FLASH_AREAS, secondary).is_ok());
    }

    #[test]
    fn test_default_image() {
        assert_eq!(id_from_slot_default(0), id_from_slot(0, 0));
        assert_eq!(id_from_slot_default(1), id_from_slot(0, 1));
    }

    #[test]
    fn test_invalid_slot() {
        for slot in [2, 3, 0xFF] {
            assert_eq!(id_from_slot(0, slot), Err(Error::InvalidSlot { slot }));
        }
    }

    #[test]
    fn test_second_image_skips_scratch() {
        assert_eq!(id_from_slot(1, 0), Ok(4));
        assert_eq!(id_from_slot(1, 1), Ok(5));
        for image in 0..=126 {
            for slot in 0..2 {
                assert_ne!(id_from_slot(image, slot), Ok(FLASH_AREA_SCRATCH));
            }
        }
    }

    #[test]
    fn test_image_index_overflow() {
        assert_eq!(
            SlotRole::Primary.area_id(200),
            Err(Error::InvalidImage { image_index: 200 })
        );
    }

    #[test]
    fn test_role_conversion() {
        assert_eq!(SlotRole::try_from(SlotRole::Secondary as u8), Ok(SlotRole::Secondary));
        assert_eq!(std::format!("{}", SlotRole::Primary), "primary");
    }
}
