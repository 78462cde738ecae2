//! Mock flash controller for unit tests
//!
//! Simulates the internal flash in memory and records every controller
//! call in order:
//! - Memory starts as all 0xFF (erased state)
//! - Programming only clears bits
//! - Faults can be injected into unlock, program and erase

use std::vec;
use std::vec::Vec;

use crate::controller::{FlashController, FlashStatus};

const PAGE_SIZE: usize = 2048;

/// A recorded controller call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Unlock,
    Lock,
    Program(u32, Vec<u8>),
    Erase(u32, u32),
}

pub struct MockController {
    pub memory: Vec<u8>,
    pub ops: Vec<Op>,
    pub locked: bool,
    pub fail_unlock: bool,
    /// Fail the program call with this index (counted from 0)
    pub fail_program_at: Option<usize>,
    pub fail_erase: bool,
    /// Byte that reads back as 0x00 after being erased
    pub stuck_byte: Option<usize>,
    programs: usize,
}

impl MockController {
    pub fn new(size: usize) -> Self {
        Self {
            memory: vec![0xFF; size],
            ops: Vec::new(),
            locked: true,
            fail_unlock: false,
            fail_program_at: None,
            fail_erase: false,
            stuck_byte: None,
            programs: 0,
        }
    }

    /// Recorded program calls as (offset, length)
    pub fn programs(&self) -> Vec<(u32, usize)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Program(offset, data) => Some((*offset, data.len())),
                _ => None,
            })
            .collect()
    }

    /// Recorded erase calls as (first page, count)
    pub fn erases(&self) -> Vec<(u32, u32)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Erase(first, count) => Some((*first, *count)),
                _ => None,
            })
            .collect()
    }
}

impl FlashController for MockController {
    fn mapped(&self) -> &[u8] {
        &self.memory
    }

    fn unlock(&mut self) -> Result<(), FlashStatus> {
        self.ops.push(Op::Unlock);
        if self.fail_unlock {
            return Err(FlashStatus::LOCKED);
        }
        self.locked = false;
        Ok(())
    }

    fn lock(&mut self) {
        self.ops.push(Op::Lock);
        self.locked = true;
    }

    fn program(&mut self, offset: u32, chunk: &[u8]) -> Result<(), FlashStatus> {
        assert!(!self.locked, "program while locked");
        self.ops.push(Op::Program(offset, chunk.to_vec()));
        let index = self.programs;
        self.programs += 1;
        if self.fail_program_at == Some(index) {
            return Err(FlashStatus::PROGERR);
        }
        let start = offset as usize;
        for (byte, &value) in self.memory[start..start + chunk.len()].iter_mut().zip(chunk) {
            *byte &= value;
        }
        Ok(())
    }

    fn erase_pages(&mut self, first_page: u32, count: u32) -> Result<(), FlashStatus> {
        assert!(!self.locked, "erase while locked");
        self.ops.push(Op::Erase(first_page, count));
        if self.fail_erase {
            return Err(FlashStatus::WRPERR);
        }
        let start = first_page as usize * PAGE_SIZE;
        let end = start + count as usize * PAGE_SIZE;
        self.memory[start..end].fill(0xFF);
        if let Some(stuck) = self.stuck_byte {
            if (start..end).contains(&stuck) {
                self.memory[stuck] = 0x00;
            }
        }
        Ok(())
    }
}
