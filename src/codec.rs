//! The boundary between the binding layer and the native codec. The binding
//! only talks to the codec through the 'NativeCodec' trait. 'BrotliCodec' is
//! the implementation that drives the brotli library.

use std::io::{self, Read, Write};

use brotli::enc::backward_references::{BrotliEncoderMode, BrotliEncoderParams};

use crate::params::{CompressionParameters, Mode};
use crate::probe;

/// A failure reported by the native codec. The codec may attach a message;
/// many failures carry none.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeFailure {
    pub detail: Option<String>,
}

impl NativeFailure {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: Some(detail.into()),
        }
    }

    /// A failure without any diagnostic.
    pub fn silent() -> Self {
        Self { detail: None }
    }
}

impl From<io::Error> for NativeFailure {
    fn from(err: io::Error) -> Self {
        NativeFailure::new(err.to_string())
    }
}

/// The callback that receives decompressed chunks. The chunk is only valid
/// for the duration of the call. The callback returns the number of bytes it
/// consumed.
pub type ChunkCallback<'a> = dyn FnMut(&[u8]) -> usize + 'a;

/// The call surface of a native compression library.
pub trait NativeCodec {
    /// Compress 'input' into 'output' and return the number of bytes written.
    /// The call fails if the result does not fit into 'output'.
    fn compress(
        &self,
        params: &CompressionParameters,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize, NativeFailure>;

    /// Decompress 'input' and hand the output to 'sink' in order, one chunk
    /// at a time. If 'sink' consumes less than a whole chunk the codec stops
    /// and reports failure.
    fn decompress(
        &self,
        input: &[u8],
        sink: &mut ChunkCallback,
    ) -> Result<(), NativeFailure>;

    /// Returns the decompressed size of 'input' if it can be found without
    /// decoding.
    fn decompressed_size(&self, _input: &[u8]) -> Option<usize> {
        None
    }
}

/// A writer over a fixed slice that fails once the slice is full, instead of
/// silently dropping bytes.
struct SliceWriter<'a> {
    buffer: &'a mut [u8],
    len: usize,
}

impl<'a> Write for SliceWriter<'a> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let avail = self.buffer.len() - self.len;
        if buf.len() > avail {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "output buffer is too small",
            ));
        }
        self.buffer[self.len..self.len + buf.len()].copy_from_slice(buf);
        self.len += buf.len();
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn encoder_mode(mode: Mode) -> BrotliEncoderMode {
    match mode {
        Mode::Generic => BrotliEncoderMode::BROTLI_MODE_GENERIC,
        Mode::Text => BrotliEncoderMode::BROTLI_MODE_TEXT,
        Mode::Font => BrotliEncoderMode::BROTLI_MODE_FONT,
    }
}

/// Drives the brotli library.
#[derive(Debug, Clone, Copy)]
pub struct BrotliCodec {
    /// The size of the scratch buffer that decompressed chunks come from.
    chunk_size: usize,
}

impl Default for BrotliCodec {
    fn default() -> Self {
        Self::new(crate::config::Config::global().chunk_size)
    }
}

impl BrotliCodec {
    /// Creates a codec that hands out chunks of up to 'chunk_size' bytes. A
    /// size of zero is raised to one.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl NativeCodec for BrotliCodec {
    fn compress(
        &self,
        params: &CompressionParameters,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<usize, NativeFailure> {
        let mut enc = BrotliEncoderParams::default();
        enc.mode = encoder_mode(params.mode());
        enc.quality = params.quality();
        enc.lgwin = params.window_bits();
        enc.lgblock = params.block_bits();

        let mut reader = input;
        let mut writer = SliceWriter {
            buffer: output,
            len: 0,
        };
        brotli::BrotliCompress(&mut reader, &mut writer, &enc)?;
        Ok(writer.len)
    }

    fn decompress(
        &self,
        input: &[u8],
        sink: &mut ChunkCallback,
    ) -> Result<(), NativeFailure> {
        let mut decoder = brotli::Decompressor::new(input, self.chunk_size);
        let mut scratch = vec![0u8; self.chunk_size];

        loop {
            let n = match decoder.read(&mut scratch) {
                Ok(0) => return Ok(()),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            log::trace!("Delivering a chunk of {} bytes", n);
            if sink(&scratch[..n]) != n {
                return Err(NativeFailure::new("output callback refused a chunk"));
            }
        }
    }

    fn decompressed_size(&self, input: &[u8]) -> Option<usize> {
        probe::decompressed_size(input)
    }
}
