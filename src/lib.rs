pub mod adaptive;
pub mod binding;
pub mod bitreader;
pub mod codec;
pub mod config;
pub mod error;
#[cfg(feature = "c-abi")]
pub mod ffi;
pub mod params;
pub mod probe;
pub mod sink;

pub use adaptive::{AdaptiveDecompressor, Recovered};
pub use binding::Binding;
pub use codec::{BrotliCodec, NativeCodec, NativeFailure};
pub use config::Config;
pub use error::{Error, FailureKind, Operation, Result};
pub use params::{CompressionParameters, Mode};

/// Returns the version of this crate.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Compress 'data' with the brotli codec.
///
/// 'quality' ranges from 0 to 11, 'window_bits' (the base 2 logarithm of the
/// sliding window) from 10 to 24, and 'block_bits' (the base 2 logarithm of
/// the maximum input block) from 16 to 24, where 0 lets the encoder pick one
/// based on the quality. The usual choice is `Mode::Generic`, 11, 22 and 0.
pub fn compress(
    data: &[u8],
    mode: Mode,
    quality: i32,
    window_bits: i32,
    block_bits: i32,
) -> Result<Vec<u8>> {
    let params =
        CompressionParameters::new(mode, quality, window_bits, block_bits);
    Binding::new().compress(data, &params)
}

/// Decompress a brotli stream.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    Binding::new().decompress(data)
}
