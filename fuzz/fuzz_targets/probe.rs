#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // A size read from the headers must match what the stream decodes to.
    if let Some(size) = bro::probe::decompressed_size(data) {
        if let Ok(decoded) = bro::decompress(data) {
            assert_eq!(decoded.len(), size);
        }
    }
});
