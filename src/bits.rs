//! Single-bit sinks and sources the codec reads and writes through.

use {bitvec::prelude::*, std::io};

/// Something that accepts bits one at a time.
pub trait BitSink {
    fn write_bit(&mut self, bit: bool) -> io::Result<()>;

    fn write_bits(&mut self, bits: &BitSlice<Local, u8>) -> io::Result<()> {
        for &bit in bits.iter() {
            self.write_bit(bit)?;
        }
        Ok(())
    }
}

/// Something that yields bits one at a time until it runs dry.
pub trait BitSource {
    /// The next bit, or `None` once the source is exhausted.
    fn read_bit(&mut self) -> io::Result<Option<bool>>;

    /// Number of bits read so far.
    fn position(&self) -> u64;
}

impl BitSink for BitVec<Local, u8> {
    fn write_bit(&mut self, bit: bool) -> io::Result<()> {
        self.push(bit);
        Ok(())
    }

    fn write_bits(&mut self, bits: &BitSlice<Local, u8>) -> io::Result<()> {
        self.extend_from_slice(bits);
        Ok(())
    }
}

/// Reads an exact number of bits out of a borrowed bit slice.
///
/// The slice length is the whole story: there is no padding to skip, so the
/// cursor is exhausted exactly where the meaningful bits end.
#[derive(Debug, Clone)]
pub struct BitCursor<'a> {
    bits: &'a BitSlice<Local, u8>,
    position: usize,
}

impl<'a> BitCursor<'a> {
    pub fn new(bits: &'a BitSlice<Local, u8>) -> Self {
        BitCursor { bits, position: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.bits.len() - self.position
    }
}

impl BitSource for BitCursor<'_> {
    fn read_bit(&mut self) -> io::Result<Option<bool>> {
        if self.position == self.bits.len() {
            return Ok(None);
        }
        let bit = self.bits[self.position];
        self.position += 1;
        Ok(Some(bit))
    }

    fn position(&self) -> u64 {
        self.position as u64
    }
}

/// Render bits as a string of `0` and `1`.
pub fn render(bits: &BitSlice<Local, u8>) -> String {
    bits.iter().map(|&bit| if bit { '1' } else { '0' }).collect()
}
