/*!
Canonical F100-L architectural state (registers + condition flags) and
inline-friendly fetch helpers.

`CpuState` is the single authoritative owner of all architecturally
visible registers. It intentionally excludes:
  - Memory store logic (behind the `MemoryPort` trait)
  - Instruction decode / dispatch logic
  - Timing / cycle accounting (out of scope for this core)

Registers
=========
  PC   15-bit program counter, masked after every increment or jump
  ACC  16-bit accumulator
  OR   16-bit operand register: the visible shadow of the last operand
       fetched or written, and the low half of double-length shifts
  CR   condition register (see `cr`)
  IR   decoded view of the current instruction word (see `ir`)

The link stack pointer is *not* a register: it is the word at memory
address 0, conventionally always odd.
*/

use crate::cpu::cr::ConditionReg;
use crate::cpu::ir::InstructionWord;
use crate::memory::{MemoryPort, OutOfRange};

/// Program addresses are 15 bits wide.
pub const PC_MASK: u16 = 0x7FFF;

/// Reset/interrupt vector base with the AdSel pin driven high.
pub const VECTOR_BASE_ADSEL_HIGH: u16 = 2048;
/// Reset/interrupt vector base with the AdSel pin driven low.
pub const VECTOR_BASE_ADSEL_LOW: u16 = 16384;

/// Pure architectural register / flag container for the F100-L.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CpuState {
    pub pc: u16,
    pub acc: u16,
    pub or: u16,
    pub cr: ConditionReg,
    pub ir: InstructionWord,
    /// State of the external AdSel pin, sampled at reset and interrupt entry.
    pub adsel: bool,
}

impl Default for CpuState {
    fn default() -> Self {
        Self::new(true)
    }
}

impl CpuState {
    /// Create a power-up state and apply the reset sequence.
    pub fn new(adsel: bool) -> Self {
        let mut state = Self {
            pc: 0,
            acc: 0,
            or: 0,
            cr: ConditionReg::new(),
            ir: InstructionWord::default(),
            adsel,
        };
        state.reset();
        state
    }

    /// Hardware reset: PC from the AdSel-selected vector base, CR cleared.
    /// ACC and OR are architecturally undefined at reset; they keep their
    /// prior contents, matching the hardware.
    pub fn reset(&mut self) {
        self.pc = self.vector_base();
        self.cr.reset();
        self.ir.update(0);
    }

    /// Vector base selected by the AdSel pin (shared by reset and
    /// interrupt entry).
    #[inline]
    pub fn vector_base(&self) -> u16 {
        if self.adsel {
            VECTOR_BASE_ADSEL_HIGH
        } else {
            VECTOR_BASE_ADSEL_LOW
        }
    }

    /// Advance PC by `delta`, wrapping within the 15-bit program space.
    #[inline]
    pub fn advance_pc(&mut self, delta: u16) {
        self.pc = self.pc.wrapping_add(delta) & PC_MASK;
    }

    /// Jump to `target`, masked to the 15-bit program space.
    #[inline]
    pub fn jump(&mut self, target: u16) {
        self.pc = target & PC_MASK;
    }

    /// Fetch the word at PC and advance PC by one.
    #[inline]
    pub fn fetch<M: MemoryPort>(&mut self, mem: &mut M) -> Result<u16, OutOfRange> {
        let word = mem.read(self.pc)?;
        self.advance_pc(1);
        Ok(word)
    }

    /// Fetch an operand word holding a 15-bit address.
    #[inline]
    pub fn fetch_addr<M: MemoryPort>(&mut self, mem: &mut M) -> Result<u16, OutOfRange> {
        Ok(self.fetch(mem)? & PC_MASK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::Ram;

    #[test]
    fn reset_selects_vector_by_adsel() {
        assert_eq!(CpuState::new(true).pc, 2048);
        assert_eq!(CpuState::new(false).pc, 16384);
    }

    #[test]
    fn reset_clears_condition_register() {
        let mut state = CpuState::new(true);
        state.cr.unpack(0x7F);
        state.reset();
        assert_eq!(state.cr.pack(), 0);
    }

    #[test]
    fn pc_wraps_at_15_bits() {
        let mut state = CpuState::new(true);
        state.pc = 0x7FFF;
        state.advance_pc(1);
        assert_eq!(state.pc, 0);
        state.jump(0xFFFF);
        assert_eq!(state.pc, 0x7FFF);
    }

    #[test]
    fn fetch_reads_and_advances() {
        let mut state = CpuState::new(true);
        let mut ram = Ram::new(4096);
        ram.poke(2048, 0xBEEF);
        assert_eq!(state.fetch(&mut ram).unwrap(), 0xBEEF);
        assert_eq!(state.pc, 2049);
    }

    #[test]
    fn fetch_addr_masks_to_15_bits() {
        let mut state = CpuState::new(true);
        let mut ram = Ram::new(4096);
        ram.poke(2048, 0xFFFF);
        assert_eq!(state.fetch_addr(&mut ram).unwrap(), 0x7FFF);
    }
}
