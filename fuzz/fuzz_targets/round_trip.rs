#![no_main]

use bro::{Binding, CompressionParameters, Mode};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let binding = Binding::new();
    let params = CompressionParameters::new(Mode::Generic, 5, 18, 0);
    let compressed = binding.compress(data, &params).unwrap();
    let decompressed = binding.decompress(&compressed).unwrap();
    assert_eq!(decompressed, data);
});
