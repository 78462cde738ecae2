//! Error types for flashmap-core
//!
//! This module provides a no_std compatible error type that is returned by
//! every fallible flash area operation.

use core::fmt;

use crate::controller::FlashStatus;

/// Core error type - no_std compatible, Copy for efficiency
///
/// A failed erase verification is deliberately not represented here: a
/// range that reads back non-blank after a successful erase command aborts
/// the process (see [`crate::FlashMap::erase`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Registry errors
    /// No area with this id exists in the table
    NotFound {
        /// The requested area id
        id: u8,
    },
    /// The area lives on a device other than the internal flash
    UnsupportedDevice {
        /// Device id recorded in the area
        device_id: u8,
    },

    // Request validation errors
    /// `offset + length` exceeds the area size
    OutOfBounds {
        /// Requested area-relative offset
        offset: u32,
        /// Requested length in bytes
        len: u32,
        /// Size of the area
        area_size: u32,
    },
    /// Offset or length is not a multiple of the required granularity
    Misaligned {
        /// Requested area-relative offset
        offset: u32,
        /// Requested length in bytes
        len: u32,
        /// Granularity the request must be aligned to
        align: u32,
    },
    /// Caller-provided sector buffer cannot hold every sector of the area
    TooManySectors {
        /// Number of sectors the area spans
        needed: usize,
        /// Capacity that was available
        capacity: usize,
    },

    // Hardware errors
    /// Programming a chunk failed; the area is left partially written
    ProgramFailed {
        /// Physical device offset of the failing chunk
        addr: u32,
        /// Controller error flags reported for the chunk
        status: FlashStatus,
    },
    /// The page erase command failed
    EraseFailed {
        /// Physical device offset of the first page in the command
        addr: u32,
        /// Controller error flags reported for the command
        status: FlashStatus,
    },

    // Slot errors
    /// Slot number is neither primary nor secondary
    InvalidSlot {
        /// The rejected slot number
        slot: u8,
    },
    /// Image index has no representable area id
    InvalidImage {
        /// The rejected image index
        image_index: u8,
    },
}

/// Details of a range that is not blank after a successful erase command
///
/// This is never returned; it is the message the erase path panics with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EraseVerifyFailure {
    /// Physical device offset of the first non-blank byte
    pub addr: u32,
    /// The erased value the byte should hold
    pub expected: u8,
    /// The byte value found
    pub found: u8,
}

impl fmt::Display for EraseVerifyFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "erase verify failed at 0x{:08X}: expected 0x{:02X}, found 0x{:02X}",
            self.addr, self.expected, self.found
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { id } => write!(f, "flash area {} not found", id),
            Self::UnsupportedDevice { device_id } => {
                write!(f, "flash device {} is not supported", device_id)
            }
            Self::OutOfBounds {
                offset,
                len,
                area_size,
            } => write!(
                f,
                "range 0x{:08X}+0x{:X} exceeds area size 0x{:X}",
                offset, len, area_size
            ),
            Self::Misaligned { offset, len, align } => write!(
                f,
                "range 0x{:08X}+0x{:X} is not aligned to 0x{:X}",
                offset, len, align
            ),
            Self::TooManySectors { needed, capacity } => write!(
                f,
                "area has {} sectors but only {} fit",
                needed, capacity
            ),
            Self::ProgramFailed { addr, status } => {
                write!(f, "program failed at 0x{:08X} ({:?})", addr, status)
            }
            Self::EraseFailed { addr, status } => {
                write!(f, "erase failed at 0x{:08X} ({:?})", addr, status)
            }
            Self::InvalidSlot { slot } => write!(f, "invalid slot {}", slot),
            Self::InvalidImage { image_index } => {
                write!(f, "image index {} has no flash area", image_index)
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
