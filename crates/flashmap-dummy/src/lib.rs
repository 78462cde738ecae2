//! flashmap-dummy - In-memory internal flash emulator for testing
//!
//! This crate provides a dummy flash controller that emulates the internal
//! flash of the target MCU in memory. It enforces the same rules as the
//! real controller (lock state, double-word alignment, program only over
//! erased memory) and can inject faults, so it is useful for testing the
//! flash map and for host tools without real hardware.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(feature = "alloc")]
use alloc::vec;
#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use flashmap_core::FlashGeometry;
#[cfg(feature = "alloc")]
use flashmap_core::{FlashController, FlashStatus};

/// Configuration for the dummy flash
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Flash size in bytes
    pub size: usize,
    /// Page size for erase
    pub page_size: usize,
    /// Size of one program operation
    pub program_granularity: usize,
    /// Value of an erased byte
    pub erased_value: u8,
}

impl DummyConfig {
    /// Configuration matching a device geometry
    pub fn from_geometry(geometry: &FlashGeometry) -> Self {
        Self {
            size: geometry.total_size as usize,
            page_size: geometry.page_size as usize,
            program_granularity: geometry.program_granularity as usize,
            erased_value: geometry.erased_value,
        }
    }
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self::from_geometry(&FlashGeometry::INTERNAL)
    }
}

/// A controller call recorded by [`DummyFlash`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DummyOp {
    /// Unlock sequence
    Unlock,
    /// Lock
    Lock,
    /// Program one chunk
    Program {
        /// Device offset
        offset: u32,
        /// Chunk length
        len: usize,
    },
    /// Page erase
    Erase {
        /// First page index
        first_page: u32,
        /// Number of pages
        count: u32,
    },
}

/// Dummy flash controller
///
/// Emulates the internal flash in memory for testing purposes.
#[cfg(feature = "alloc")]
pub struct DummyFlash {
    config: DummyConfig,
    data: Vec<u8>,
    locked: bool,
    ops: Vec<DummyOp>,
    protected_pages: Vec<u32>,
    stuck_bytes: Vec<usize>,
    fail_unlock: bool,
    fail_program_after: Option<usize>,
    programs: usize,
}

#[cfg(feature = "alloc")]
impl DummyFlash {
    /// Create a new, fully erased dummy flash with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let data = vec![config.erased_value; config.size];
        Self {
            config,
            data,
            locked: true,
            ops: Vec::new(),
            protected_pages: Vec::new(),
            stuck_bytes: Vec::new(),
            fail_unlock: false,
            fail_program_after: None,
            programs: 0,
        }
    }

    /// Create a new dummy flash matching the internal flash of the target
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Create a dummy flash with pre-filled data
    pub fn with_data(config: DummyConfig, initial_data: &[u8]) -> Self {
        let mut flash = Self::new(config);
        let len = core::cmp::min(initial_data.len(), flash.data.len());
        flash.data[..len].copy_from_slice(&initial_data[..len]);
        flash
    }

    /// Get a reference to the flash data
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get a mutable reference to the flash data
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Get the configuration
    pub fn config(&self) -> &DummyConfig {
        &self.config
    }

    /// Whether the controller is currently locked
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Every controller call made so far, in order
    pub fn ops(&self) -> &[DummyOp] {
        &self.ops
    }

    /// Forget the recorded controller calls
    pub fn clear_ops(&mut self) {
        self.ops.clear();
    }

    /// Number of program operations recorded
    pub fn program_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, DummyOp::Program { .. }))
            .count()
    }

    /// Write-protect a page; erasing it fails with `WRPERR`
    pub fn protect_page(&mut self, page: u32) {
        self.protected_pages.push(page);
    }

    /// Make a byte read back as `0x00` after every erase
    pub fn stick_byte(&mut self, offset: usize) {
        self.stuck_bytes.push(offset);
    }

    /// Make the unlock sequence fail
    pub fn fail_unlock(&mut self, fail: bool) {
        self.fail_unlock = fail;
    }

    /// Let `count` more program operations succeed, then fail the next one
    pub fn fail_program_after(&mut self, count: usize) {
        self.fail_program_after = Some(self.programs + count);
    }

    fn check_program(&self, offset: usize, chunk: &[u8]) -> Result<(), FlashStatus> {
        if self.locked {
            return Err(FlashStatus::PGSERR);
        }
        if offset % self.config.program_granularity != 0 {
            return Err(FlashStatus::PGAERR);
        }
        if chunk.len() != self.config.program_granularity {
            return Err(FlashStatus::SIZERR);
        }
        let target = self
            .data
            .get(offset..offset + chunk.len())
            .ok_or(FlashStatus::OPERR)?;
        if target.iter().any(|&b| b != self.config.erased_value) {
            return Err(FlashStatus::PROGERR);
        }
        Ok(())
    }
}

#[cfg(feature = "alloc")]
impl FlashController for DummyFlash {
    fn mapped(&self) -> &[u8] {
        &self.data
    }

    fn unlock(&mut self) -> Result<(), FlashStatus> {
        self.ops.push(DummyOp::Unlock);
        if self.fail_unlock {
            return Err(FlashStatus::LOCKED);
        }
        self.locked = false;
        Ok(())
    }

    fn lock(&mut self) {
        self.ops.push(DummyOp::Lock);
        self.locked = true;
    }

    fn program(&mut self, offset: u32, chunk: &[u8]) -> Result<(), FlashStatus> {
        self.ops.push(DummyOp::Program {
            offset,
            len: chunk.len(),
        });

        let index = self.programs;
        self.programs += 1;
        if self.fail_program_after == Some(index) {
            return Err(FlashStatus::PROGERR);
        }

        let start = offset as usize;
        self.check_program(start, chunk)?;

        log::trace!("dummy: program 0x{:08X} ({} bytes)", offset, chunk.len());

        // Programming can only clear bits
        for (byte, &value) in self.data[start..start + chunk.len()].iter_mut().zip(chunk) {
            *byte &= value;
        }
        Ok(())
    }

    fn erase_pages(&mut self, first_page: u32, count: u32) -> Result<(), FlashStatus> {
        self.ops.push(DummyOp::Erase { first_page, count });

        if self.locked {
            return Err(FlashStatus::PGSERR);
        }

        let page_size = self.config.page_size;
        let start = first_page as usize * page_size;
        let end = start + count as usize * page_size;
        if end > self.data.len() {
            return Err(FlashStatus::OPERR);
        }
        if self
            .protected_pages
            .iter()
            .any(|page| (first_page..first_page + count).contains(page))
        {
            return Err(FlashStatus::WRPERR);
        }

        log::trace!("dummy: erase pages {}..{}", first_page, first_page + count);

        self.data[start..end].fill(self.config.erased_value);
        for &stuck in &self.stuck_bytes {
            if (start..end).contains(&stuck) {
                self.data[stuck] = 0x00;
            }
        }
        Ok(())
    }
}
