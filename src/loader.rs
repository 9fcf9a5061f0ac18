/*!
Program image readers and the post-run dump writer.

The assembler boundary is a mapping from word address to 16-bit words;
this module converts the two on-disk forms of that mapping into a word
vector ready to hand to `Ram::load`:

- plain hex: any stream of hex digits, with arbitrary separators and
  punctuation ignored; every four digits form one word. Byte order
  within the word is selectable because historical tool output differs;
  the default is the little-endian pairing used by the reference tools.
- raw binary: big-endian byte pairs.

Trailing digits or bytes that do not complete a word are discarded, the
same as the reference readers.

`write_hex_dump` emits the classic sixteen-words-per-row format with an
ASCII gutter, suitable for diffing runs against each other.
*/

use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Parse a plain-hex image. `big_endian` selects the byte pairing
/// within each word.
pub fn parse_hex_image(text: &str, big_endian: bool) -> Vec<u16> {
    let digits: Vec<u16> = text
        .chars()
        .filter_map(|c| c.to_digit(16))
        .map(|d| d as u16)
        .collect();
    digits
        .chunks_exact(4)
        .map(|quad| {
            let first = (quad[0] << 4) | quad[1];
            let second = (quad[2] << 4) | quad[3];
            if big_endian {
                (first << 8) | second
            } else {
                (second << 8) | first
            }
        })
        .collect()
}

/// Parse a raw binary image of big-endian byte pairs.
pub fn parse_bin_image(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
        .collect()
}

/// Read a plain-hex image file.
pub fn read_hex_file(path: &Path, big_endian: bool) -> io::Result<Vec<u16>> {
    Ok(parse_hex_image(&fs::read_to_string(path)?, big_endian))
}

/// Read a raw binary image file.
pub fn read_bin_file(path: &Path) -> io::Result<Vec<u16>> {
    Ok(parse_bin_image(&fs::read(path)?))
}

fn printable(byte: u8) -> char {
    if (32..127).contains(&byte) {
        byte as char
    } else {
        '.'
    }
}

/// Write `words` in the sixteen-per-row hex dump format:
/// `ADDR: w0 w1 ... w15  <ascii>`.
pub fn write_hex_dump<W: Write>(out: &mut W, words: &[u16]) -> io::Result<()> {
    for (row, chunk) in words.chunks(16).enumerate() {
        write!(out, "{:04X}: ", row * 16)?;
        for word in chunk {
            write!(out, "{word:04X} ")?;
        }
        for _ in chunk.len()..16 {
            write!(out, "     ")?;
        }
        write!(out, " ")?;
        for word in chunk {
            write!(
                out,
                "{}{}",
                printable((word >> 8) as u8),
                printable(*word as u8)
            )?;
        }
        writeln!(out)?;
    }
    Ok(())
}
