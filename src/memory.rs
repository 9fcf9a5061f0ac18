/*!
Memory port: word-addressable store consumed by the CPU core.

The F100-L is word-addressed (there is no byte access on the memory bus),
so the port trades in `u16` words at `u16` addresses. The store size is
configurable; any access above the configured top word is a hard
`OutOfRange` fault that terminates the fetch-execute loop.

`Ram` is the flat in-process implementation used by the runner binary and
the tests. It also carries two diagnostic facilities that are not part of
the execution semantics:

- read/write counters, reported by the runner at exit
- a set of written addresses, so post-run dumps can bound themselves to
  the modified region
*/

use std::collections::BTreeSet;
use std::fmt;

/// Default store size in words (the full 15-bit program address space).
pub const DEFAULT_RAM_WORDS: usize = 32 * 1024;

/// Power-up fill pattern. Uninitialized reads stand out in traces and
/// dumps, and runaway execution lands on an unsupported function code.
pub const POWER_UP_WORD: u16 = 0xDEAD;

/// Access fault: address above the configured memory top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRange {
    pub addr: u16,
}

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "memory out of range error for address 0x{:04X}", self.addr)
    }
}

impl std::error::Error for OutOfRange {}

/// Word-addressed memory contract between the CPU core and the embedding
/// program. At most one transaction is in flight per `step()`, so no
/// locking discipline is required of implementations.
pub trait MemoryPort {
    fn read(&mut self, addr: u16) -> Result<u16, OutOfRange>;
    fn write(&mut self, addr: u16, data: u16) -> Result<(), OutOfRange>;
}

/// Flat word-addressable RAM with range checking and access diagnostics.
pub struct Ram {
    data: Vec<u16>,
    reads: u64,
    writes: u64,
    written: BTreeSet<u16>,
}

impl Default for Ram {
    fn default() -> Self {
        Self::new(DEFAULT_RAM_WORDS)
    }
}

impl Ram {
    /// Create a RAM of `words` words, filled with the power-up pattern.
    pub fn new(words: usize) -> Self {
        Self {
            data: vec![POWER_UP_WORD; words],
            reads: 0,
            writes: 0,
            written: BTreeSet::new(),
        }
    }

    /// Highest valid word address.
    #[inline]
    pub fn memtop(&self) -> u16 {
        (self.data.len() - 1) as u16
    }

    /// Load an image starting at `base`, without counting as CPU writes.
    pub fn load(&mut self, base: u16, words: &[u16]) {
        let base = base as usize;
        self.data[base..base + words.len()].copy_from_slice(words);
    }

    /// Direct read without range checking or accounting (tests/tools).
    #[inline]
    pub fn peek(&self, addr: u16) -> u16 {
        self.data[addr as usize]
    }

    /// Direct write without range checking or accounting (tests/tools).
    #[inline]
    pub fn poke(&mut self, addr: u16, data: u16) {
        self.data[addr as usize] = data;
    }

    /// Number of CPU read transactions performed.
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// Number of CPU write transactions performed.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Addresses written by the CPU since construction, in order.
    pub fn written_addresses(&self) -> impl Iterator<Item = u16> + '_ {
        self.written.iter().copied()
    }

    /// Expose the full contents (read-only) for dump tooling.
    pub fn words(&self) -> &[u16] {
        &self.data
    }
}

impl MemoryPort for Ram {
    fn read(&mut self, addr: u16) -> Result<u16, OutOfRange> {
        self.reads += 1;
        self.data
            .get(addr as usize)
            .copied()
            .ok_or(OutOfRange { addr })
    }

    fn write(&mut self, addr: u16, data: u16) -> Result<(), OutOfRange> {
        self.writes += 1;
        match self.data.get_mut(addr as usize) {
            Some(slot) => {
                *slot = data;
                self.written.insert(addr);
                Ok(())
            }
            None => Err(OutOfRange { addr }),
        }
    }
}
