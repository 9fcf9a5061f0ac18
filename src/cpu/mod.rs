/*!
cpu - public facade for the F100-L CPU core.

Module layout:

    cr.rs         - ConditionReg: the seven condition flags + packing.
    ir.rs         - InstructionWord: bit-field decode view of one word.
    state.rs      - CpuState: PC/ACC/OR/CR/IR + fetch helpers.
    addressing.rs - the six addressing modes and operand resolution.
    dispatch/     - per-function-code execution handlers and the step
                    orchestrator.

The public surface is the `Cpu` facade wrapping `CpuState`. One `step()`
is one fetch-decode-execute transaction; there is no internal suspension
point and no retry. Every terminating condition propagates out of
`step()` as either a `Status::Halted` value (expected termination,
carrying the 10-bit halt number) or a `CoreError` (fault).

Usage:
```ignore
let mut ram = Ram::default();
let mut cpu = Cpu::new(true);
loop {
    match cpu.step(&mut ram)? {
        Status::Running => {}
        Status::Halted(n) => break,
    }
}
```
*/

pub mod addressing;
pub mod cr;
pub mod ir;
pub mod state;

pub(crate) mod dispatch;

use std::fmt;

use log::debug;

use crate::memory::{MemoryPort, OutOfRange};
use crate::cpu::state::PC_MASK;

pub use crate::cpu::cr::ConditionReg;
pub use crate::cpu::ir::InstructionWord;
pub use crate::cpu::state::CpuState;

/// Outcome of one successfully executed instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// The instruction completed; the core is ready for the next step.
    Running,
    /// A HALT instruction was executed. Carries the 10-bit halt number.
    /// The core does not resume from inside; only an external reset
    /// restarts execution.
    Halted(u16),
}

/// Faults that terminate the fetch-execute loop.
///
/// All are single-transaction and unrecoverable: there are no retries
/// anywhere in the core, and user-visible handling belongs to the
/// embedding program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreError {
    /// The function field of the fetched word names no implemented
    /// instruction class (F=14 on this CPU).
    UnsupportedOpcode { function: u8, pc: u16 },
    /// A field combination that the assembler can never emit was reached
    /// at decode time (auto-index addressing on CAL, malformed F=0
    /// qualifier fields).
    IllegalInstruction { word: u16, pc: u16 },
    /// A memory transaction addressed beyond the configured top word.
    Memory(OutOfRange),
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::UnsupportedOpcode { function, pc } => write!(
                f,
                "cannot execute opcode with function field 0x{function:X} at 0x{pc:04X}"
            ),
            CoreError::IllegalInstruction { word, pc } => write!(
                f,
                "illegal instruction encoding 0x{word:04X} at 0x{pc:04X}"
            ),
            CoreError::Memory(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for CoreError {}

impl From<OutOfRange> for CoreError {
    fn from(e: OutOfRange) -> Self {
        CoreError::Memory(e)
    }
}

/// The F100-L CPU core.
#[derive(Debug, Clone)]
pub struct Cpu {
    state: CpuState,
}

impl Cpu {
    /// Construct a CPU with the given AdSel pin state and apply reset.
    pub fn new(adsel: bool) -> Self {
        Self {
            state: CpuState::new(adsel),
        }
    }

    /// Immutable view of the architectural state (inspection / tests).
    pub fn state(&self) -> &CpuState {
        &self.state
    }

    /// Mutable view of the architectural state (tests / embedders).
    pub fn state_mut(&mut self) -> &mut CpuState {
        &mut self.state
    }

    /// External reset: PC from the AdSel-selected vector, CR cleared.
    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn pc(&self) -> u16 {
        self.state.pc
    }

    pub fn acc(&self) -> u16 {
        self.state.acc
    }

    /// The operand register (shadow of the last operand).
    pub fn or(&self) -> u16 {
        self.state.or
    }

    pub fn cr(&self) -> &ConditionReg {
        &self.state.cr
    }

    pub fn set_acc(&mut self, v: u16) {
        self.state.acc = v;
    }

    pub fn set_pc(&mut self, v: u16) {
        self.state.jump(v);
    }

    /// Execute one fetch-decode-execute transaction.
    pub fn step<M: MemoryPort>(&mut self, mem: &mut M) -> Result<Status, CoreError> {
        dispatch::step(&mut self.state, mem)
    }

    /// Step until HALT or a fault. `max_instructions` of 0 means no limit.
    ///
    /// Returns the final status and the number of instructions retired;
    /// `Status::Running` means the instruction limit was reached first.
    pub fn run<M: MemoryPort>(
        &mut self,
        mem: &mut M,
        max_instructions: u64,
    ) -> Result<(Status, u64), CoreError> {
        let mut retired = 0;
        while max_instructions == 0 || retired < max_instructions {
            let status = self.step(mem)?;
            retired += 1;
            if let Status::Halted(_) = status {
                return Ok((status, retired));
            }
        }
        Ok((Status::Running, retired))
    }

    /// External interrupt entry for channel 0-63 (six significant bits).
    ///
    /// Pushes PC and the packed CR onto the link stack exactly as CAL
    /// does (including the M clear), sets the interrupt-disable flag and
    /// jumps to `vector base + 2 * channel`, the base following the same
    /// AdSel rule as reset.
    pub fn interrupt<M: MemoryPort>(
        &mut self,
        mem: &mut M,
        channel: u8,
    ) -> Result<(), CoreError> {
        let channel = (channel & 0x3F) as u16;
        let sp = mem.read(0)?;
        mem.write(sp.wrapping_add(1) & PC_MASK, self.state.pc)?;
        mem.write(sp.wrapping_add(2) & PC_MASK, self.state.cr.pack())?;
        mem.write(0, sp.wrapping_add(2) & PC_MASK)?;
        self.state.cr.m = false;
        self.state.cr.i = true;
        let target = self.state.vector_base() + 2 * channel;
        debug!("interrupt channel {channel} entry to 0x{target:04X}");
        self.state.jump(target);
        Ok(())
    }
}
