#![doc = r#"
f100l library crate.

Instruction-accurate emulator core for the Ferranti F100-L, a 16-bit
minicomputer CPU. The crate exposes the core modules for use by the
`f100emu` binary and by embedding programs.

Modules:
- cpu: the CPU core (facade + registers + addressing + dispatch)
- memory: the word-addressed MemoryPort contract and the flat Ram store
- loader: plain-hex / raw-binary image readers and the hex dump writer

The core is fully synchronous: one `Cpu::step` performs exactly one
fetch-decode-execute transaction against the supplied `MemoryPort`, and
every terminating condition - the HALT signal, an unsupported function
code, an out-of-range access - propagates to the caller of `step`.
"#]

pub mod cpu;
pub mod loader;
pub mod memory;

// Re-export commonly used types at the crate root for convenience.
pub use cpu::{ConditionReg, CoreError, Cpu, CpuState, InstructionWord, Status};
pub use memory::{MemoryPort, OutOfRange, Ram};

// Shared test utilities (only compiled for tests)
#[cfg(test)]
pub mod test_utils;
