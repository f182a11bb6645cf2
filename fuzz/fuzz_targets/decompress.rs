#![no_main]

use bro::adaptive::AdaptiveDecompressor;
use bro::Binding;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Arbitrary input may fail, but must not panic or grow without bound.
    let binding = Binding::new();
    let strategy = AdaptiveDecompressor::new(&binding).with_max_size(1 << 24);
    let _ = strategy.decompress(data, None);
});
