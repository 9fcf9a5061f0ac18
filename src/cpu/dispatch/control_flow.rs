/*!
control_flow - JMP, SJM, CAL and RTN/RTC handlers.

The call/return convention runs through the link stack, whose pointer is
the word at memory address 0 (kept odd by convention):

  CAL   (LSP+1) <- return PC, (LSP+2) <- packed CR, (0) <- LSP+2,
        PC <- target, M <- 0
  RTN   PC <- (LSP-1), CR bits 0-5 <- (LSP) with F preserved, (0) <- LSP-2
  RTC   as RTN but without the flag restore

JMP transfers to the *effective address* of its operand: N for direct,
the fetched word for immediate-indirect, the pointer value for the
pointer modes. The immediate form has nothing to jump to; it discards
the D word and falls through.
*/

use crate::cpu::addressing::{is_auto_index, mode, resolve_address, AddrMode};
use crate::cpu::state::{CpuState, PC_MASK};
use crate::cpu::CoreError;
use crate::memory::MemoryPort;

/// JMP: unconditional transfer to the effective operand address.
pub(crate) fn jmp<M: MemoryPort>(
    state: &mut CpuState,
    mem: &mut M,
) -> Result<(), CoreError> {
    let immediate = mode(&state.ir) == AddrMode::Immediate;
    let ea = resolve_address(state, mem)?;
    if !immediate {
        state.jump(ea);
    }
    Ok(())
}

/// SJM: PC <- PC + ACC. Addressing fields are ignored entirely, so the
/// instruction never consumes an operand word. PC has already moved past
/// the opcode when the sum is formed.
pub(crate) fn sjm(state: &mut CpuState) {
    state.jump(state.pc.wrapping_add(state.acc));
}

/// CAL: push return linkage onto the link stack and transfer.
///
/// Auto-index addressing can never be assembled for CAL; reaching it at
/// decode time is a fault, not an execution.
pub(crate) fn cal<M: MemoryPort>(
    state: &mut CpuState,
    mem: &mut M,
    opcode_pc: u16,
) -> Result<(), CoreError> {
    if is_auto_index(&state.ir) {
        return Err(CoreError::IllegalInstruction {
            word: state.ir.content(),
            pc: opcode_pc,
        });
    }

    let immediate = mode(&state.ir) == AddrMode::Immediate;
    let ea = resolve_address(state, mem)?;
    let sp = mem.read(0)?;

    // Immediate CAL discards the D operand: the call target is the D
    // word's own address, and that address doubles as the pushed return
    // PC, so a matching RTN lands there as well.
    if immediate {
        state.jump(ea);
    }
    mem.write(sp.wrapping_add(1) & PC_MASK, state.pc)?;
    mem.write(sp.wrapping_add(2) & PC_MASK, state.cr.pack())?;
    mem.write(0, sp.wrapping_add(2) & PC_MASK)?;
    state.jump(ea);
    state.cr.m = false;
    Ok(())
}

/// RTN (I=0) and RTC (I=1): pop the link stack into PC. RTN additionally
/// restores CR bits 0-5 from the stacked word, preserving the external
/// fail flag in bit 6.
pub(crate) fn rtn_rtc<M: MemoryPort>(
    state: &mut CpuState,
    mem: &mut M,
) -> Result<(), CoreError> {
    let sp = mem.read(0)?;
    let return_pc = mem.read(sp.wrapping_sub(1) & PC_MASK)?;
    state.jump(return_pc);
    if state.ir.i() == 0 {
        let stacked = mem.read(sp & PC_MASK)? & 0x3F;
        let preserved = state.cr.pack() & 0x40;
        state.cr.unpack(preserved | stacked);
    }
    mem.write(0, sp.wrapping_sub(2) & PC_MASK)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::Status;
    use crate::test_utils::boot_with;

    #[test]
    fn jmp_direct() {
        let (mut cpu, mut ram) = boot_with(&[0xF123]);
        cpu.step(&mut ram).unwrap();
        assert_eq!(cpu.pc(), 0x0123);
    }

    #[test]
    fn jmp_immediate_indirect() {
        let (mut cpu, mut ram) = boot_with(&[0xF800, 0x3000]);
        cpu.step(&mut ram).unwrap();
        assert_eq!(cpu.pc(), 0x3000);
    }

    #[test]
    fn jmp_pointer_uses_the_pointer_value_as_target() {
        // JMP /0x50 with (0x50)=0x2222: transfer to 0x2222.
        let (mut cpu, mut ram) = boot_with(&[0xF850]);
        ram.poke(0x0050, 0x2222);
        cpu.step(&mut ram).unwrap();
        assert_eq!(cpu.pc(), 0x2222);
    }

    #[test]
    fn jmp_immediate_is_a_no_op() {
        // JMP ,D discards the D word and falls through.
        let (mut cpu, mut ram) = boot_with(&[0xF000, 0x1234]);
        cpu.step(&mut ram).unwrap();
        assert_eq!(cpu.pc(), 2050);
    }

    #[test]
    fn sjm_adds_acc_to_the_advanced_pc() {
        let (mut cpu, mut ram) = boot_with(&[0x1000]);
        cpu.state_mut().acc = 0x10;
        cpu.step(&mut ram).unwrap();
        // Opcode fetch moved PC to 2049 before the sum.
        assert_eq!(cpu.pc(), 2049 + 0x10);
    }

    #[test]
    fn sjm_wraps_in_the_15_bit_space() {
        let (mut cpu, mut ram) = boot_with(&[0x1000]);
        cpu.state_mut().acc = 0xFFFF;
        cpu.step(&mut ram).unwrap();
        assert_eq!(cpu.pc(), ((2049u32 + 0xFFFF) & 0x7FFF) as u16);
    }

    #[test]
    fn cal_pushes_linkage_and_m_clears() {
        // CAL 0x0300 with LSP=0x0101.
        let (mut cpu, mut ram) = boot_with(&[0x2300]);
        cpu.state_mut().cr.c = true;
        cpu.state_mut().cr.m = true;
        let cr_at_call = cpu.cr().pack();
        cpu.step(&mut ram).unwrap();
        assert_eq!(cpu.pc(), 0x0300);
        assert_eq!(ram.peek(0x0102), 2049); // return PC
        assert_eq!(ram.peek(0x0103), cr_at_call);
        assert_eq!(ram.peek(0), 0x0103);
        assert!(!cpu.cr().m);
    }

    #[test]
    fn cal_then_rtn_restores_pc_and_flags() {
        // CAL 0x0300 ; (target) RTN ; back at 2049.
        let (mut cpu, mut ram) = boot_with(&[0x2300]);
        ram.poke(0x0300, 0x3000); // RTN: F=3, I=0
        cpu.state_mut().cr.c = true;
        let flags_at_call = cpu.cr().pack() & 0x3F;
        cpu.step(&mut ram).unwrap(); // CAL
        cpu.state_mut().cr.unpack(0x02); // clobber flags inside the call
        cpu.step(&mut ram).unwrap(); // RTN
        assert_eq!(cpu.pc(), 2049);
        assert_eq!(ram.peek(0), 0x0101); // LSP balanced
        assert_eq!(cpu.cr().pack() & 0x3F, flags_at_call);
    }

    #[test]
    fn rtn_preserves_the_fail_flag() {
        let (mut cpu, mut ram) = boot_with(&[0x3000]);
        ram.poke(0, 0x0103);
        ram.poke(0x0102, 0x1111); // return PC
        ram.poke(0x0103, 0x007F); // stacked CR: everything set
        cpu.state_mut().cr.f = false;
        cpu.step(&mut ram).unwrap();
        assert_eq!(cpu.pc(), 0x1111);
        assert!(!cpu.cr().f); // bit 6 untouched
        assert!(cpu.cr().m);
        assert!(cpu.cr().c);
    }

    #[test]
    fn rtc_skips_the_flag_restore() {
        // RTC: F=3 with I=1.
        let (mut cpu, mut ram) = boot_with(&[0x3800]);
        ram.poke(0, 0x0103);
        ram.poke(0x0102, 0x1111);
        ram.poke(0x0103, 0x003F);
        cpu.step(&mut ram).unwrap();
        assert_eq!(cpu.pc(), 0x1111);
        assert_eq!(cpu.cr().pack(), 0);
        assert_eq!(ram.peek(0), 0x0101);
    }

    #[test]
    fn cal_immediate_calls_the_following_word() {
        // CAL ,D: the D slot is the first instruction of the callee and
        // also the pushed return address.
        let (mut cpu, mut ram) = boot_with(&[0x2000, 0x0400]); // CAL ,D ; HALT
        let halted = cpu.step(&mut ram).unwrap();
        assert_eq!(halted, Status::Running);
        assert_eq!(cpu.pc(), 2049);
        assert_eq!(ram.peek(0x0102), 2049);
        // The next step executes the D word itself.
        assert_eq!(cpu.step(&mut ram).unwrap(), Status::Halted(0));
    }

    #[test]
    fn cal_rejects_auto_index_addressing() {
        let (mut cpu, mut ram) = boot_with(&[0x2940]); // CAL /0x40+
        let err = cpu.step(&mut ram).unwrap_err();
        assert_eq!(
            err,
            CoreError::IllegalInstruction {
                word: 0x2940,
                pc: 2048
            }
        );
    }

    #[test]
    fn cal_pointer_indirect_is_legal() {
        let (mut cpu, mut ram) = boot_with(&[0x2840]); // CAL /0x40
        ram.poke(0x0040, 0x0500);
        cpu.step(&mut ram).unwrap();
        assert_eq!(cpu.pc(), 0x0500);
        assert_eq!(ram.peek(0x0102), 2049);
    }
}
