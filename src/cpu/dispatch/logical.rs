/*!
logical - AND and NEQ (exclusive-or) handlers.

Both force the carry flag to a fixed value: AND leaves C=1, NEQ leaves
C=0. V is untouched. The mnemonic NEQ ("not equal") is the F100-L's name
for XOR.
*/

use crate::cpu::addressing::resolve_operand;
use crate::cpu::state::CpuState;
use crate::cpu::CoreError;
use crate::memory::MemoryPort;

pub(crate) fn and<M: MemoryPort>(
    state: &mut CpuState,
    mem: &mut M,
) -> Result<(), CoreError> {
    let (operand, _) = resolve_operand(state, mem)?;
    state.or = operand;
    state.acc &= operand;
    state.cr.c = true;
    state.cr.update_zs(state.acc);
    Ok(())
}

pub(crate) fn neq<M: MemoryPort>(
    state: &mut CpuState,
    mem: &mut M,
) -> Result<(), CoreError> {
    let (operand, _) = resolve_operand(state, mem)?;
    state.or = operand;
    state.acc ^= operand;
    state.cr.c = false;
    state.cr.update_zs(state.acc);
    Ok(())
}
