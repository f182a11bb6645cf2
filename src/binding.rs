//! The binding core: validates parameters, sizes buffers, calls the native
//! codec and turns its status into a 'Result'.

use crate::codec::{BrotliCodec, NativeCodec, NativeFailure};
use crate::config::{Config, OutputSizing, ParameterDomain};
use crate::error::{Error, FailureKind, Operation, Result};
use crate::params::CompressionParameters;
use crate::sink::ChunkSink;

fn codec_failure(
    operation: Operation,
    kind: FailureKind,
    failure: NativeFailure,
) -> Error {
    Error::CodecFailure {
        operation,
        kind,
        detail: failure.detail,
    }
}

/// Calls into a 'NativeCodec'. A binding holds no state between calls.
#[derive(Debug, Clone)]
pub struct Binding<C: NativeCodec = BrotliCodec> {
    codec: C,
    domain: ParameterDomain,
    sizing: OutputSizing,
}

impl Default for Binding<BrotliCodec> {
    fn default() -> Self {
        Self::with_codec(BrotliCodec::default())
    }
}

impl Binding<BrotliCodec> {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: NativeCodec> Binding<C> {
    /// Creates a binding around 'codec' that uses the process-wide policy.
    pub fn with_codec(codec: C) -> Self {
        let config = Config::global();
        Self {
            codec,
            domain: config.domain,
            sizing: config.sizing,
        }
    }

    /// Replace the output sizing policy used by 'compress'.
    pub fn with_sizing(mut self, sizing: OutputSizing) -> Self {
        self.sizing = sizing;
        self
    }

    pub fn codec(&self) -> &C {
        &self.codec
    }

    pub fn sizing(&self) -> OutputSizing {
        self.sizing
    }

    /// Compress 'data' in a single codec call. The parameters are checked
    /// before anything is allocated.
    pub fn compress(
        &self,
        data: &[u8],
        params: &CompressionParameters,
    ) -> Result<Vec<u8>> {
        params.validate(&self.domain)?;

        let capacity =
            self.sizing.capacity_for(data.len()).ok_or_else(|| {
                Error::CodecFailure {
                    operation: Operation::Compress,
                    kind: FailureKind::OutputCapacity,
                    detail: Some(String::from("input is too large")),
                }
            })?;
        log::debug!(
            "Compressing {} bytes into a buffer of {} bytes",
            data.len(),
            capacity
        );

        let mut output = vec![0u8; capacity];
        let written =
            self.codec.compress(params, data, &mut output).map_err(|f| {
                codec_failure(Operation::Compress, FailureKind::Stream, f)
            })?;

        // The codec can't report more than it was given room for.
        if written > capacity {
            return Err(Error::CodecFailure {
                operation: Operation::Compress,
                kind: FailureKind::Stream,
                detail: Some(format!(
                    "codec reported {} bytes for a {} byte buffer",
                    written, capacity
                )),
            });
        }
        output.truncate(written);
        Ok(output)
    }

    /// Decompress 'data'. Either the whole output is returned or nothing.
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        self.run_decompress(data, ChunkSink::new())
    }

    /// Decompress 'data' but refuse to produce more than 'capacity' bytes.
    /// Exceeding the capacity is reported as a failure of kind
    /// 'OutputCapacity'.
    pub fn decompress_with_capacity(
        &self,
        data: &[u8],
        capacity: usize,
    ) -> Result<Vec<u8>> {
        self.run_decompress(data, ChunkSink::with_limit(capacity))
    }

    /// Returns the decompressed size of 'data' if the codec can tell it
    /// cheaply.
    pub fn decompressed_size(&self, data: &[u8]) -> Option<usize> {
        self.codec.decompressed_size(data)
    }

    fn run_decompress(
        &self,
        data: &[u8],
        mut sink: ChunkSink,
    ) -> Result<Vec<u8>> {
        let status = self
            .codec
            .decompress(data, &mut |chunk: &[u8]| sink.accept(chunk));

        // A refused chunk means the output did not fit, whatever the codec
        // made of it.
        if sink.overflowed() {
            return Err(Error::CodecFailure {
                operation: Operation::Decompress,
                kind: FailureKind::OutputCapacity,
                detail: sink.limit().map(|l| format!("limit is {} bytes", l)),
            });
        }

        match status {
            Ok(()) => {
                log::debug!(
                    "Decompressed {} bytes from {} chunks",
                    sink.len(),
                    sink.num_chunks()
                );
                Ok(sink.into_bytes())
            }
            Err(f) => Err(codec_failure(
                Operation::Decompress,
                FailureKind::Stream,
                f,
            )),
        }
    }
}
