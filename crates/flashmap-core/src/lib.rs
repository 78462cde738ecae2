//! flashmap-core - Flash area map for bootloaders
//!
//! This crate presents named regions of a single internal flash device
//! (bootloader, primary slot, secondary slot, scratch) as bounds-checked
//! areas. An image boot engine opens an area by id and reads, programs or
//! erases it through [`FlashMap`]; every request is validated against the
//! area before the flash controller is touched.
//!
//! It is designed to be `no_std` compatible so it can run inside the
//! bootloader itself.
//!
//! # Features
//!
//! - `std` - Enable standard library support (includes `alloc`), TOML
//!   layout files and `std::error::Error` impls
//! - `alloc` - Enable heap allocation for owned layouts
//!
//! # Example
//!
//! ```ignore
//! use flashmap_core::{slot, FlashController, FlashMap, SlotRole};
//!
//! fn stage_header<C: FlashController>(controller: C, header: &[u8]) -> flashmap_core::Result<()> {
//!     let mut map = FlashMap::new(controller);
//!     let id = slot::id_from_slot_default(SlotRole::Secondary as u8)?;
//!     let area = *map.open(id)?;
//!     map.erase(&area, 0, map.geometry().page_size)?;
//!     map.write(&area, 0, header)
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod area;
pub mod controller;
pub mod error;
pub mod flash;
pub mod geometry;
pub mod sectors;
pub mod slot;
pub mod validate;

#[cfg(test)]
pub(crate) mod mock;

pub use area::{AreaId, FlashArea, FlashSector};
pub use controller::{FlashController, FlashStatus};
pub use error::{Error, Result};
pub use flash::FlashMap;
pub use geometry::FlashGeometry;
pub use slot::SlotRole;
