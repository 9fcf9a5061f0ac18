/*!
load_store - LDA, STO and ICZ handlers.

STO resolves an address without reading the operand; in immediate mode
that address is the D word's own slot, so `STO ,D` stores into the
instruction stream itself and execution continues past the stored word.

ICZ is the increment-and-jump-if-non-zero primitive: it takes a normal
first operand plus a second stream word holding the 15-bit jump target.
The condition register is unaffected.
*/

use crate::cpu::addressing::{mode, resolve_address, resolve_operand, AddrMode};
use crate::cpu::state::CpuState;
use crate::cpu::CoreError;
use crate::memory::MemoryPort;

pub(crate) fn lda<M: MemoryPort>(
    state: &mut CpuState,
    mem: &mut M,
) -> Result<(), CoreError> {
    let (operand, _) = resolve_operand(state, mem)?;
    state.or = operand;
    state.acc = operand;
    state.cr.update_zs(state.acc);
    state.cr.v = false;
    Ok(())
}

pub(crate) fn sto<M: MemoryPort>(
    state: &mut CpuState,
    mem: &mut M,
) -> Result<(), CoreError> {
    let ea = resolve_address(state, mem)?;
    mem.write(ea, state.acc)?;
    state.cr.update_zs(state.acc);
    state.cr.v = false;
    Ok(())
}

pub(crate) fn icz<M: MemoryPort>(
    state: &mut CpuState,
    mem: &mut M,
) -> Result<(), CoreError> {
    let immediate = mode(&state.ir) == AddrMode::Immediate;
    let (operand, ea) = resolve_operand(state, mem)?;
    state.or = operand;
    let target = state.fetch_addr(mem)?;

    let result = operand.wrapping_add(1);
    // The immediate form has no storable source location; the counter
    // only survives in ACC.
    if !immediate {
        mem.write(ea, result)?;
    }
    state.acc = result;
    if result != 0 {
        state.jump(target);
    }
    Ok(())
}
