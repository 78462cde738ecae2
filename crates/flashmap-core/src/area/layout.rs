//! Owned area layouts
//!
//! Host-side tools work with layouts that are not baked into the binary.
//! A [`Layout`] owns its area table together with the geometry it was
//! written for.

use alloc::string::String;
use alloc::vec::Vec;

use super::table::{validate_table, LayoutError, FLASH_AREAS};
use super::types::{AreaId, FlashArea};
use crate::error::Result;
use crate::geometry::FlashGeometry;

/// An owned flash area layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    /// Optional name for this layout
    pub name: Option<String>,
    /// Geometry of the device the areas live on
    pub geometry: FlashGeometry,
    /// Areas in this layout, sorted by offset
    pub areas: Vec<FlashArea>,
}

impl Layout {
    /// Create an empty layout for a device
    pub fn new(geometry: FlashGeometry) -> Self {
        Self {
            name: None,
            geometry,
            areas: Vec::new(),
        }
    }

    /// The layout compiled into the bootloader
    pub fn internal() -> Self {
        Self {
            name: Some(String::from("internal")),
            geometry: FlashGeometry::INTERNAL,
            areas: FLASH_AREAS.to_vec(),
        }
    }

    /// Add an area to the layout
    pub fn add_area(&mut self, area: FlashArea) {
        self.areas.push(area);
    }

    /// Find an area by id
    pub fn open(&self, id: AreaId) -> Result<&FlashArea> {
        super::table::open(&self.areas, id)
    }

    /// Sort areas by device offset
    pub fn sort_by_offset(&mut self) {
        self.areas.sort_by_key(|area| area.base_offset);
    }

    /// Check the layout against its geometry
    pub fn validate(&self) -> core::result::Result<(), LayoutError> {
        validate_table(&self.areas, &self.geometry)
    }

    /// Bytes of the device not covered by any area
    pub fn unused_bytes(&self) -> u32 {
        let used: u32 = self.areas.iter().map(|area| area.size).sum();
        self.geometry.total_size.saturating_sub(used)
    }
}

impl Default for Layout {
    fn default() -> Self {
        Self::internal()
    }
}
