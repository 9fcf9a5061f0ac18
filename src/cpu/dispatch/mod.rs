/*!
dispatch - orchestrator for a single F100-L CPU step.

One step:
1. Fetch the opcode word at PC (PC advances past it).
2. Decode into the instruction register.
3. Map the 4-bit function field onto the closed `Function` set; F=14 is
   the one hole and surfaces as `UnsupportedOpcode`.
4. F=0 routes on the T and S qualifier fields: T=1 is HALT, otherwise
   S=2 selects the conditional bit jumps, S=3 the bit set/clear group,
   and anything else the shift/rotate group.
5. Everything else dispatches straight to its family handler.

Handlers receive the mutable `CpuState` and the memory port explicitly;
there are no back-references, and the HALT control signal is the
`Status::Halted` value returned from here rather than anything thrown
through the call stack.
*/

pub(crate) mod arithmetic;
pub(crate) mod bits;
pub(crate) mod control_flow;
pub(crate) mod load_store;
pub(crate) mod logical;
pub(crate) mod shifts;

use log::trace;
use num_enum::TryFromPrimitive;

use crate::cpu::state::CpuState;
use crate::cpu::{CoreError, Status};
use crate::memory::{MemoryPort, OutOfRange};

/// The instruction classes selected by the function field. F=0 is a
/// group of four sub-classes told apart by the T and S fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, TryFromPrimitive)]
#[repr(u8)]
pub(crate) enum Function {
    Group0 = 0,
    Sjm = 1,
    Cal = 2,
    Rtn = 3,
    Sto = 4,
    Ads = 5,
    Sbs = 6,
    Icz = 7,
    Lda = 8,
    Add = 9,
    Sub = 10,
    Cmp = 11,
    And = 12,
    Neq = 13,
    Jmp = 15,
}

/// Execute one fetch-decode-execute transaction.
pub(crate) fn step<M: MemoryPort>(
    state: &mut CpuState,
    mem: &mut M,
) -> Result<Status, CoreError> {
    let opcode_pc = state.pc;
    let word = state.fetch(mem)?;
    state.ir.update(word);

    let function = Function::try_from(state.ir.f()).map_err(|_| {
        CoreError::UnsupportedOpcode {
            function: state.ir.f(),
            pc: opcode_pc,
        }
    })?;
    trace!(
        "{:04X}: {:04X} {:?} acc={:04X} or={:04X} cr={:02X}",
        opcode_pc,
        word,
        function,
        state.acc,
        state.or,
        state.cr.pack()
    );

    match function {
        Function::Group0 => return group0(state, mem, opcode_pc),
        Function::Sjm => control_flow::sjm(state),
        Function::Cal => control_flow::cal(state, mem, opcode_pc)?,
        Function::Rtn => control_flow::rtn_rtc(state, mem)?,
        Function::Sto => load_store::sto(state, mem)?,
        Function::Ads => arithmetic::add(state, mem, true)?,
        Function::Sbs => arithmetic::sub(state, mem, true)?,
        Function::Icz => load_store::icz(state, mem)?,
        Function::Lda => load_store::lda(state, mem)?,
        Function::Add => arithmetic::add(state, mem, false)?,
        Function::Sub => arithmetic::sub(state, mem, false)?,
        Function::Cmp => arithmetic::cmp(state, mem)?,
        Function::And => logical::and(state, mem)?,
        Function::Neq => logical::neq(state, mem)?,
        Function::Jmp => control_flow::jmp(state, mem)?,
    }
    Ok(Status::Running)
}

/// Operand select for the F=0 families (R field): the accumulator, the
/// condition register as a flat bit pattern, or a memory word whose
/// 15-bit address follows in the instruction stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Target {
    Acc,
    Cr,
    Mem(u16),
}

/// Decode the R field, consuming the operand-address word for R=3.
pub(super) fn select_target<M: MemoryPort>(
    state: &mut CpuState,
    mem: &mut M,
) -> Result<Target, OutOfRange> {
    Ok(match state.ir.r() {
        1 => Target::Cr,
        3 => Target::Mem(state.fetch_addr(mem)?),
        _ => Target::Acc,
    })
}

/// Read the selected operand. Memory reads shadow into OR.
pub(super) fn read_target<M: MemoryPort>(
    state: &mut CpuState,
    mem: &mut M,
    target: Target,
) -> Result<u16, OutOfRange> {
    Ok(match target {
        Target::Acc => state.acc,
        Target::Cr => state.cr.pack(),
        Target::Mem(ea) => {
            let value = mem.read(ea)?;
            state.or = value;
            value
        }
    })
}

/// Write the selected operand back. Memory writes shadow into OR; a CR
/// write lands in the live flags (bits above bit 6 do not exist).
pub(super) fn write_target<M: MemoryPort>(
    state: &mut CpuState,
    mem: &mut M,
    target: Target,
    value: u16,
) -> Result<(), OutOfRange> {
    match target {
        Target::Acc => state.acc = value,
        Target::Cr => state.cr.unpack(value),
        Target::Mem(ea) => {
            mem.write(ea, value)?;
            state.or = value;
        }
    }
    Ok(())
}

/// Secondary routing for the F=0 instruction group.
fn group0<M: MemoryPort>(
    state: &mut CpuState,
    mem: &mut M,
    opcode_pc: u16,
) -> Result<Status, CoreError> {
    if state.ir.t() == 1 {
        // HALT. The 10 LSBs of the opcode word are the halt number.
        let number = state.ir.content() & 0x03FF;
        return Ok(Status::Halted(number));
    }
    match state.ir.s() {
        2 => bits::bit_jump(state, mem)?,
        3 => bits::bit_modify(state, mem, opcode_pc)?,
        _ => shifts::shift(state, mem)?,
    }
    Ok(Status::Running)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::boot_with;

    #[test]
    fn halt_carries_the_ten_bit_number() {
        let (mut cpu, mut ram) = boot_with(&[0x07FF]); // HALT 0x3FF
        assert_eq!(cpu.step(&mut ram).unwrap(), Status::Halted(0x3FF));
    }

    #[test]
    fn halt_number_spans_the_overlapping_qualifier_fields() {
        // The number overlaps the S/J/B fields; only T selects HALT.
        let (mut cpu, mut ram) = boot_with(&[0x05A5]); // HALT 0x1A5
        assert_eq!(cpu.step(&mut ram).unwrap(), Status::Halted(0x1A5));
    }

    #[test]
    fn and_neq_halt_scenario() {
        // AND ,0x0000 ; NEQ ,0xFFFF ; HALT - the ACC ends all-ones and
        // each logical op forces its own carry value.
        let (mut cpu, mut ram) =
            boot_with(&[0xC000, 0x0000, 0xD000, 0xFFFF, 0x0400]);
        assert_eq!(cpu.step(&mut ram).unwrap(), Status::Running);
        assert_eq!(cpu.acc(), 0x0000);
        assert!(cpu.cr().c);
        assert_eq!(cpu.step(&mut ram).unwrap(), Status::Running);
        assert_eq!(cpu.acc(), 0xFFFF);
        assert!(!cpu.cr().c);
        assert_eq!(cpu.step(&mut ram).unwrap(), Status::Halted(0));
    }
}
