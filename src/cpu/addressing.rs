/*!
Addressing-mode resolution shared by the opcode handlers.

Six modes, selected by the I, N, P and R fields of the instruction word:

  Immediate            I=0, N=0   operand is the next stream word
  Direct               I=0, N!=0  operand at the 11-bit address N
  Immediate indirect   I=1, P=0   operand address is the next stream word
  Pointer indirect     I=1, P!=0, R=0
  Pointer pre-inc      I=1, P!=0, R=1
  Pointer post-dec     I=1, P!=0, R=3

The pointer family reads the pointer word stored at address P, uses its
(15-bit) value as the effective address, and rewrites the pointer cell on
every access - incremented before use for R=1, decremented after use for
R=3, unchanged for R=0. The rewrite targets the pointer cell itself, never
the addressed data word.

Responsibilities end at operand resolution: these helpers never touch ACC,
OR or the condition register. PC only moves when a mode consumes operand
words from the instruction stream. Callers that shadow the operand into OR
do so themselves with the returned value.
*/

use crate::cpu::ir::InstructionWord;
use crate::cpu::state::{CpuState, PC_MASK};
use crate::memory::{MemoryPort, OutOfRange};

/// The six F100-L addressing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrMode {
    Immediate,
    Direct,
    ImmediateIndirect,
    PointerIndirect,
    PointerPreInc,
    PointerPostDec,
}

/// Classify the addressing mode encoded in `ir`.
pub fn mode(ir: &InstructionWord) -> AddrMode {
    if ir.i() == 0 {
        if ir.n() == 0 {
            AddrMode::Immediate
        } else {
            AddrMode::Direct
        }
    } else if ir.p() == 0 {
        AddrMode::ImmediateIndirect
    } else {
        match ir.r() {
            1 => AddrMode::PointerPreInc,
            3 => AddrMode::PointerPostDec,
            _ => AddrMode::PointerIndirect,
        }
    }
}

/// True when `ir` selects an auto-indexing pointer mode (illegal for CAL).
pub fn is_auto_index(ir: &InstructionWord) -> bool {
    matches!(
        mode(ir),
        AddrMode::PointerPreInc | AddrMode::PointerPostDec
    )
}

/// Resolve the effective operand address without reading the operand.
///
/// Used by write-only and jump-style handlers (STO, JMP, CAL). In
/// immediate mode the effective address is the D word's own slot in the
/// instruction stream, and PC skips past it. Pointer modes perform the
/// pointer-cell rewrite here.
pub fn resolve_address<M: MemoryPort>(
    state: &mut CpuState,
    mem: &mut M,
) -> Result<u16, OutOfRange> {
    match mode(&state.ir) {
        AddrMode::Immediate => {
            let ea = state.pc;
            state.advance_pc(1);
            Ok(ea)
        }
        AddrMode::Direct => Ok(state.ir.n()),
        AddrMode::ImmediateIndirect => state.fetch_addr(mem),
        _ => {
            let p = state.ir.p();
            let mut pointer = mem.read(p)? & PC_MASK;
            if state.ir.r() == 1 {
                pointer = pointer.wrapping_add(1) & PC_MASK;
            }
            let ea = pointer;
            if state.ir.r() == 3 {
                pointer = pointer.wrapping_sub(1) & PC_MASK;
            }
            mem.write(p, pointer)?;
            Ok(ea)
        }
    }
}

/// Resolve the operand value and its effective address.
///
/// In the post-decrement mode the operand is read *before* the pointer
/// cell is rewritten, so a pointer aimed at its own cell yields the
/// pre-decrement value.
pub fn resolve_operand<M: MemoryPort>(
    state: &mut CpuState,
    mem: &mut M,
) -> Result<(u16, u16), OutOfRange> {
    match mode(&state.ir) {
        AddrMode::Immediate => {
            let ea = state.pc;
            let value = state.fetch(mem)?;
            Ok((value, ea))
        }
        AddrMode::Direct => {
            let ea = state.ir.n();
            Ok((mem.read(ea)?, ea))
        }
        AddrMode::ImmediateIndirect => {
            let ea = state.fetch_addr(mem)?;
            Ok((mem.read(ea)?, ea))
        }
        _ => {
            let p = state.ir.p();
            let mut pointer = mem.read(p)? & PC_MASK;
            if state.ir.r() == 1 {
                pointer = pointer.wrapping_add(1) & PC_MASK;
            }
            let ea = pointer;
            let value = mem.read(ea)?;
            if state.ir.r() == 3 {
                pointer = pointer.wrapping_sub(1) & PC_MASK;
            }
            mem.write(p, pointer)?;
            Ok((value, ea))
        }
    }
}
