//! Flash controller interface
//!
//! The vendor's low-level flash driver is consumed through the
//! [`FlashController`] trait: a memory-mapped view for reads, plus the
//! register-driven unlock/program/erase/lock sequence for changes.
//! Implementations block until the hardware reports completion; any timeout
//! or retry policy lives in the implementation, not here.

use bitflags::bitflags;

bitflags! {
    /// Flash controller error flags
    ///
    /// These mirror the error bits of the controller's status register so
    /// that a failed operation can report exactly what the hardware said.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FlashStatus: u32 {
        /// Operation error (end of operation with error)
        const OPERR   = 1 << 1;
        /// Programming error: target double word was not erased
        const PROGERR = 1 << 3;
        /// Write protection error
        const WRPERR  = 1 << 4;
        /// Programming alignment error
        const PGAERR  = 1 << 5;
        /// Size error
        const SIZERR  = 1 << 6;
        /// Programming sequence error
        const PGSERR  = 1 << 7;
        /// Fast programming data miss error
        const MISERR  = 1 << 8;
        /// Fast programming error
        const FASTERR = 1 << 9;
        /// PCROP read protection error
        const RDERR   = 1 << 14;
        /// Option validity error
        const OPTVERR = 1 << 15;
        /// Controller is still locked after the unlock sequence
        const LOCKED  = 1 << 31;

        /// Every hardware-reported error bit
        const ERRORS = Self::OPERR.bits()
            | Self::PROGERR.bits()
            | Self::WRPERR.bits()
            | Self::PGAERR.bits()
            | Self::SIZERR.bits()
            | Self::PGSERR.bits()
            | Self::MISERR.bits()
            | Self::FASTERR.bits()
            | Self::RDERR.bits()
            | Self::OPTVERR.bits();
    }
}

/// Low-level access to the internal flash controller
///
/// All offsets are relative to the start of the device. Callers only
/// invoke [`program`](Self::program) and
/// [`erase_pages`](Self::erase_pages) between [`unlock`](Self::unlock)
/// and [`lock`](Self::lock), which [`ControllerGuard`] enforces.
pub trait FlashController {
    /// The whole device as it appears in the memory map
    fn mapped(&self) -> &[u8];

    /// Unlock the controller for program/erase
    fn unlock(&mut self) -> Result<(), FlashStatus>;

    /// Lock the controller again
    fn lock(&mut self);

    /// Program one program-granularity chunk at a device offset
    fn program(&mut self, offset: u32, chunk: &[u8]) -> Result<(), FlashStatus>;

    /// Erase `count` consecutive pages starting at page `first_page`
    fn erase_pages(&mut self, first_page: u32, count: u32) -> Result<(), FlashStatus>;
}

impl<C: FlashController + ?Sized> FlashController for &mut C {
    fn mapped(&self) -> &[u8] {
        (**self).mapped()
    }

    fn unlock(&mut self) -> Result<(), FlashStatus> {
        (**self).unlock()
    }

    fn lock(&mut self) {
        (**self).lock()
    }

    fn program(&mut self, offset: u32, chunk: &[u8]) -> Result<(), FlashStatus> {
        (**self).program(offset, chunk)
    }

    fn erase_pages(&mut self, first_page: u32, count: u32) -> Result<(), FlashStatus> {
        (**self).erase_pages(first_page, count)
    }
}

/// An unlocked flash controller
///
/// The controller is locked again when the guard is dropped, so every exit
/// path out of a program or erase sequence, including `?` returns,
/// leaves it locked.
pub struct ControllerGuard<'a, C: FlashController + ?Sized> {
    controller: &'a mut C,
}

impl<'a, C: FlashController + ?Sized> ControllerGuard<'a, C> {
    /// Unlock the controller
    ///
    /// If the unlock sequence fails the controller is locked again before
    /// the error is returned.
    pub fn unlock(controller: &'a mut C) -> Result<Self, FlashStatus> {
        if let Err(status) = controller.unlock() {
            controller.lock();
            return Err(status);
        }
        Ok(Self { controller })
    }

    /// Program one chunk
    pub fn program(&mut self, offset: u32, chunk: &[u8]) -> Result<(), FlashStatus> {
        self.controller.program(offset, chunk)
    }

    /// Erase a page range
    pub fn erase_pages(&mut self, first_page: u32, count: u32) -> Result<(), FlashStatus> {
        self.controller.erase_pages(first_page, count)
    }
}

impl<C: FlashController + ?Sized> Drop for ControllerGuard<'_, C> {
    fn drop(&mut self) {
        self.controller.lock();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockController, Op};
    use std::vec;

    #[test]
    fn test_guard_locks_on_drop() {
        let mut ctrl = MockController::new(4096);
        {
            let mut guard = ControllerGuard::unlock(&mut ctrl).unwrap();
            guard.program(0, &[0; 8]).unwrap();
        }
        assert_eq!(
            ctrl.ops,
            vec![Op::Unlock, Op::Program(0, vec![0; 8]), Op::Lock]
        );
        assert!(ctrl.locked);
    }

    #[test]
    fn test_guard_locks_after_failed_unlock() {
        let mut ctrl = MockController::new(4096);
        ctrl.fail_unlock = true;
        assert_eq!(
            ControllerGuard::unlock(&mut ctrl).err(),
            Some(FlashStatus::LOCKED)
        );
        assert_eq!(ctrl.ops, vec![Op::Unlock, Op::Lock]);
        assert!(ctrl.locked);
    }

    #[test]
    fn test_errors_mask() {
        assert!(FlashStatus::ERRORS.contains(FlashStatus::PROGERR));
        assert!(!FlashStatus::ERRORS.contains(FlashStatus::LOCKED));
    }
}
