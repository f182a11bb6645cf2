//! C-ABI entry points, so that C callers can use the codec through the same
//! narrow surface the binding layer uses.
//!
//! Enabled with:
//!   cargo build --release --features c-abi
//!
//! All functions return 1 on success and 0 on failure.

use std::os::raw::{c_char, c_int, c_void};
use std::slice;

use crate::codec::{BrotliCodec, NativeCodec};
use crate::config::Config;
use crate::params::{CompressionParameters, Mode};

/// Receives one decompressed chunk. 'chunk' is only valid during the call.
/// Returns the number of bytes consumed.
pub type DecompressCallback = unsafe extern "C" fn(
    data: *mut c_void,
    chunk: *const u8,
    len: usize,
) -> c_int;

/// Build a slice from a pointer that may be null when 'len' is zero.
unsafe fn input_slice<'a>(ptr: *const u8, len: usize) -> Option<&'a [u8]> {
    if len == 0 {
        return Some(&[]);
    }
    if ptr.is_null() {
        return None;
    }
    Some(slice::from_raw_parts(ptr, len))
}

#[no_mangle]
pub extern "C" fn bro_version() -> *const c_char {
    concat!(env!("CARGO_PKG_VERSION"), "\0").as_ptr() as *const c_char
}

/// Compress 'length' bytes at 'input' into 'output'.
///
/// On entry '*p_output_length' holds the capacity of 'output'; on success it
/// is updated with the number of bytes written. Invalid parameters fail
/// without touching the output.
///
/// # Safety
/// 'input' must point to 'length' readable bytes and 'output' to
/// '*p_output_length' writable bytes.
#[no_mangle]
pub unsafe extern "C" fn bro_compress(
    mode: c_int,
    quality: c_int,
    lgwin: c_int,
    lgblock: c_int,
    length: usize,
    input: *const u8,
    p_output_length: *mut usize,
    output: *mut u8,
) -> c_int {
    let mode = match Mode::try_from(mode) {
        Ok(mode) => mode,
        Err(_) => return 0,
    };
    let params = CompressionParameters::new(mode, quality, lgwin, lgblock);
    if params.validate(&Config::global().domain).is_err() {
        return 0;
    }
    if p_output_length.is_null() || output.is_null() {
        return 0;
    }
    let src = match input_slice(input, length) {
        Some(src) => src,
        None => return 0,
    };
    let dst = slice::from_raw_parts_mut(output, *p_output_length);

    match BrotliCodec::default().compress(&params, src, dst) {
        Ok(written) => {
            *p_output_length = written;
            1
        }
        Err(_) => 0,
    }
}

/// Decompress 'length' bytes at 'input', handing the output to 'callback' in
/// chunks. If the callback consumes less than a whole chunk the call fails.
///
/// # Safety
/// 'input' must point to 'length' readable bytes. 'callback' is called with
/// 'callback_data' as its first argument.
#[no_mangle]
pub unsafe extern "C" fn bro_decompress(
    input: *const u8,
    length: usize,
    callback: Option<DecompressCallback>,
    callback_data: *mut c_void,
) -> c_int {
    let callback = match callback {
        Some(callback) => callback,
        None => return 0,
    };
    let src = match input_slice(input, length) {
        Some(src) => src,
        None => return 0,
    };

    let mut sink = |chunk: &[u8]| -> usize {
        let consumed = callback(callback_data, chunk.as_ptr(), chunk.len());
        usize::try_from(consumed).unwrap_or(0)
    };
    match BrotliCodec::default().decompress(src, &mut sink) {
        Ok(()) => 1,
        Err(_) => 0,
    }
}
