/*!
Shared test helpers.

Most handler tests want the same scene: a freshly reset CPU (AdSel high,
so PC=2048), a program loaded at the reset vector, and a link stack
pointer parked at an odd address well clear of the program. `boot_with`
builds exactly that.
*/

use crate::cpu::Cpu;
use crate::memory::Ram;

/// Conventional link stack base used by the tests (odd, per the calling
/// convention).
pub const TEST_LSP: u16 = 0x0101;

/// Build a CPU + RAM pair with `words` loaded at the reset vector and
/// the link stack pointer initialized at address 0.
pub fn boot_with(words: &[u16]) -> (Cpu, Ram) {
    let mut ram = Ram::default();
    ram.poke(0, TEST_LSP);
    ram.load(2048, words);
    (Cpu::new(true), ram)
}
