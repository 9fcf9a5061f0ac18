/*!
bits - CLR/SET and the conditional bit jumps JBC/JBS/JCS/JSC.

Both groups test or rewrite bit B of a selected operand: the
accumulator, the condition register as a flat 7-bit pattern, or a memory
word addressed by a following stream word. Jumps take one further stream
word, the 15-bit destination.

  CLR/SET    rewrite the bit unconditionally; flags are only affected
             when the target is the CR itself
  JBC/JBS    jump when the bit is clear / set
  JCS/JSC    as JBC/JBS, but additionally set (JCS) or clear (JSC) the
             tested bit - only when the jump is taken

Clearing or setting a CR bit above bit 6 is a no-op: the register is
seven bits wide and the packed form ignores the rest.
*/

use crate::cpu::dispatch::{read_target, select_target, write_target};
use crate::cpu::state::CpuState;
use crate::cpu::CoreError;
use crate::memory::MemoryPort;

/// CLR (J=3) / SET (J=2), routed here for S=3. J<2 has no assigned
/// meaning in this group and is surfaced as a decode fault.
pub(crate) fn bit_modify<M: MemoryPort>(
    state: &mut CpuState,
    mem: &mut M,
    opcode_pc: u16,
) -> Result<(), CoreError> {
    let ir = state.ir;
    if ir.j() < 2 {
        return Err(CoreError::IllegalInstruction {
            word: ir.content(),
            pc: opcode_pc,
        });
    }
    let mask = 1u16 << ir.b();
    let set = ir.j() == 2;

    let target = select_target(state, mem)?;
    let value = read_target(state, mem, target)?;
    let result = if set { value | mask } else { value & !mask };
    write_target(state, mem, target, result)?;
    Ok(())
}

/// JBC (J=0), JBS (J=1), JCS (J=2), JSC (J=3), routed here for S=2.
pub(crate) fn bit_jump<M: MemoryPort>(
    state: &mut CpuState,
    mem: &mut M,
) -> Result<(), CoreError> {
    let ir = state.ir;
    let mask = 1u16 << ir.b();

    let target = select_target(state, mem)?;
    let operand = read_target(state, mem, target)?;
    let destination = state.fetch_addr(mem)?;

    // Even J values test for clear, odd for set.
    let taken = if ir.j() & 1 == 0 {
        operand & mask == 0
    } else {
        operand & mask != 0
    };
    if !taken {
        return Ok(());
    }
    state.jump(destination);

    // JCS sets, JSC clears - only on the taken path.
    let rewrite = match ir.j() {
        2 => Some(operand | mask),
        3 => Some(operand & !mask),
        _ => None,
    };
    if let Some(result) = rewrite {
        write_target(state, mem, target, result)?;
    }
    Ok(())
}
