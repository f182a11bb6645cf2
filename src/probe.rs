//! Reads the decompressed size of a Brotli stream from its meta-block headers
//! without decoding any compressed data.
//!
//! The probe walks the leading meta-blocks of the stream. Metadata blocks and
//! uncompressed blocks can be skipped without decoding, so their lengths are
//! summed. The walk stops at the first compressed meta-block: if that block is
//! the last one its length completes the total, otherwise the size cannot be
//! known cheaply and the probe gives up.

use crate::bitreader::BitReader;

/// Decode the window size. Returns None for reserved encodings (including the
/// marker of the large-window extension).
fn read_window_bits(reader: &mut BitReader) -> Option<u32> {
    if !reader.read_flag()? {
        return Some(16);
    }
    let n = reader.read_bits(3)? as u32;
    if n != 0 {
        return Some(17 + n);
    }
    let m = reader.read_bits(3)? as u32;
    match m {
        0 => Some(17),
        1 => None,
        _ => Some(8 + m),
    }
}

/// Skip the body of a metadata meta-block.
fn skip_metadata(reader: &mut BitReader) -> Option<()> {
    // Reserved bit.
    if reader.read_flag()? {
        return None;
    }
    let skip_bytes = reader.read_bits(2)? as usize;
    let mut skip_len = 0;
    if skip_bytes > 0 {
        let raw = reader.read_bits(skip_bytes * 8)? as usize;
        // The last byte of a multi-byte length must not be zero.
        if skip_bytes > 1 && raw >> ((skip_bytes - 1) * 8) == 0 {
            return None;
        }
        skip_len = raw + 1;
    }
    if reader.align() != 0 {
        return None;
    }
    reader.skip_bytes(skip_len)
}

/// Returns the number of bytes that 'input' decompresses to, if it can be
/// read from the stream headers.
pub fn decompressed_size(input: &[u8]) -> Option<usize> {
    let mut reader = BitReader::new(input);
    let _window = read_window_bits(&mut reader)?;
    let mut total: usize = 0;

    loop {
        let is_last = reader.read_flag()?;
        if is_last && reader.read_flag()? {
            // ISLASTEMPTY: the stream ends here.
            return Some(total);
        }

        let nibbles = match reader.read_bits(2)? {
            3 => 0,
            code => code as usize + 4,
        };

        if nibbles == 0 {
            if is_last {
                return None;
            }
            skip_metadata(&mut reader)?;
            continue;
        }

        let raw = reader.read_bits(nibbles * 4)? as usize;
        // The top nibble of a long length must not be zero.
        if nibbles > 4 && raw >> ((nibbles - 1) * 4) == 0 {
            return None;
        }
        let length = raw + 1;

        if is_last {
            return total.checked_add(length);
        }

        let is_uncompressed = reader.read_flag()?;
        if !is_uncompressed {
            return None;
        }
        if reader.align() != 0 {
            return None;
        }
        reader.skip_bytes(length)?;
        total = total.checked_add(length)?;
    }
}
