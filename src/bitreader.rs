//! A reader that pulls bits out of a byte slice, least significant bit first,
//! which is the bit order of Brotli stream headers.

#[derive(Debug)]
pub struct BitReader<'a> {
    /// The underlying bytes.
    input: &'a [u8],
    /// Index of the next bit to read (also the number of bits consumed).
    pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, pos: 0 }
    }

    /// Set all of the bits above 'keep' to zero.
    pub fn clear_upper_bits(bits: u64, keep: usize) -> u64 {
        if keep == 0 {
            return 0;
        }
        let amt: u32 = (64 - keep) as u32;
        let shl = bits.overflowing_shl(amt).0;
        shl.overflowing_shr(amt).0
    }

    /// Read 'num' bits. The first bit read lands in the lowest position of
    /// the result. Returns None if the input runs out.
    #[must_use]
    pub fn read_bits(&mut self, num: usize) -> Option<u64> {
        debug_assert!(num <= 57, "Reading too many bits");
        if self.remaining() < num {
            return None;
        }

        let mut res: u64 = 0;
        let mut filled = 0;
        while filled < num {
            let byte = self.input[self.pos / 8] as u64;
            let offset = self.pos % 8;
            // Take as many bits as we can from the current byte.
            let take = (8 - offset).min(num - filled);
            let bits = Self::clear_upper_bits(byte >> offset, take);
            res |= bits << filled;
            filled += take;
            self.pos += take;
        }
        Some(res)
    }

    /// Read a single bit as a boolean.
    #[must_use]
    pub fn read_flag(&mut self) -> Option<bool> {
        Some(self.read_bits(1)? == 1)
    }

    /// Skip to the next byte boundary. Returns the value of the skipped
    /// padding bits.
    pub fn align(&mut self) -> u64 {
        let pad = (8 - self.pos % 8) % 8;
        // The padding is always available because it ends at a byte edge.
        self.read_bits(pad).unwrap_or(0)
    }

    /// Skip 'bytes' whole bytes. The reader must be byte aligned.
    #[must_use]
    pub fn skip_bytes(&mut self, bytes: usize) -> Option<()> {
        debug_assert!(self.pos % 8 == 0, "Skipping unaligned bytes");
        let bits = bytes.checked_mul(8)?;
        if self.remaining() < bits {
            return None;
        }
        self.pos += bits;
        Some(())
    }

    /// Returns the number of bits that were read.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of bits left in the input.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.input.len() * 8 - self.pos
    }
}
