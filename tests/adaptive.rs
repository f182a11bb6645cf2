use std::cell::Cell;

use bro::adaptive::{AdaptiveBudget, AdaptiveDecompressor};
use bro::codec::ChunkCallback;
use bro::config::GrowthPolicy;
use bro::{
    Binding, CompressionParameters, Error, FailureKind, Mode, NativeCodec,
    NativeFailure,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Uniform};

/// A codec that expands any input to 'output', delivered in chunks of
/// 'chunk' bytes.
struct Expanding {
    output: Vec<u8>,
    chunk: usize,
    /// What the size probe reports.
    probe: Option<usize>,
    /// Fail as if the stream were corrupt.
    corrupt: bool,
    calls: Cell<u32>,
}

impl Expanding {
    fn new(len: usize) -> Self {
        Self {
            output: (0..len).map(|i| (i % 251) as u8).collect(),
            chunk: 1000,
            probe: None,
            corrupt: false,
            calls: Cell::new(0),
        }
    }
}

impl NativeCodec for Expanding {
    fn compress(
        &self,
        _params: &CompressionParameters,
        _input: &[u8],
        _output: &mut [u8],
    ) -> Result<usize, NativeFailure> {
        Err(NativeFailure::silent())
    }

    fn decompress(
        &self,
        _input: &[u8],
        sink: &mut ChunkCallback,
    ) -> Result<(), NativeFailure> {
        self.calls.set(self.calls.get() + 1);
        if self.corrupt {
            return Err(NativeFailure::new("corrupt stream"));
        }
        for chunk in self.output.chunks(self.chunk) {
            if sink(chunk) != chunk.len() {
                return Err(NativeFailure::silent());
            }
        }
        Ok(())
    }

    fn decompressed_size(&self, _input: &[u8]) -> Option<usize> {
        self.probe
    }
}

/// Returns the smallest tier 5 * 10^k * len that can hold 'size' bytes.
fn expected_tier(len: usize, size: usize) -> (usize, u32) {
    let mut tier = 5 * len;
    let mut attempts = 1;
    while tier < size {
        tier *= 10;
        attempts += 1;
    }
    (tier, attempts)
}

#[test]
fn test_grow_picks_the_smallest_tier() {
    let input = vec![0u8; 100];
    for size in [1, 499, 500, 501, 4_999, 5_000, 25_000, 1_000_000] {
        let binding = Binding::with_codec(Expanding::new(size));
        let strategy = AdaptiveDecompressor::new(&binding);
        let recovered = strategy.run(&input, None).unwrap();

        let (tier, attempts) = expected_tier(input.len(), size);
        assert_eq!(recovered.data.len(), size);
        assert_eq!(recovered.data, binding.codec().output);
        assert_eq!(recovered.capacity, tier);
        assert_eq!(recovered.attempts, attempts);
        assert_eq!(binding.codec().calls.get(), attempts);
    }

    // Tiny inputs follow the same schedule.
    for len in 1..=3 {
        let binding = Binding::with_codec(Expanding::new(40));
        let recovered = AdaptiveDecompressor::new(&binding)
            .run(&vec![0u8; len], None)
            .unwrap();
        assert_eq!(recovered.capacity, 50 * len);
        assert_eq!(recovered.attempts, 2);
    }
}

#[test]
fn test_grow_stops_at_max_size() {
    let input = vec![0u8; 100];
    let binding = Binding::with_codec(Expanding::new(25_000));

    // Tiers 500 and 5000 are tried, 50000 is not below the limit.
    let strategy = AdaptiveDecompressor::new(&binding).with_max_size(50_000);
    let err = strategy.run(&input, None).unwrap_err();
    assert!(matches!(err, Error::BufferLimitExceeded { max_size: 50_000 }));
    assert_eq!(binding.codec().calls.get(), 2);
    assert_eq!(
        err.to_string(),
        "maximum buffer size reached (50000 bytes)"
    );

    let strategy = AdaptiveDecompressor::new(&binding).with_max_size(50_001);
    let recovered = strategy.run(&input, None).unwrap();
    assert_eq!(recovered.capacity, 50_000);
}

#[test]
fn test_first_budget_above_max() {
    let binding = Binding::with_codec(Expanding::new(10));
    let strategy = AdaptiveDecompressor::new(&binding).with_max_size(100);
    let res = strategy.run(&[0u8; 100], None);
    assert!(matches!(res, Err(Error::BufferLimitExceeded { .. })));
    assert_eq!(binding.codec().calls.get(), 0);
}

#[test]
fn test_corrupt_stream_is_not_retried() {
    let mut codec = Expanding::new(10);
    codec.corrupt = true;
    let binding = Binding::with_codec(codec);
    let err = AdaptiveDecompressor::new(&binding)
        .run(&[0u8; 10], None)
        .unwrap_err();
    match err {
        Error::CodecFailure { kind, detail, .. } => {
            assert_eq!(kind, FailureKind::Stream);
            assert_eq!(detail.as_deref(), Some("corrupt stream"));
        }
        other => panic!("Expected a codec failure, got {:?}", other),
    }
    assert_eq!(binding.codec().calls.get(), 1);
}

#[test]
fn test_empty_input_gets_a_positive_budget() {
    let binding = Binding::with_codec(Expanding::new(10));
    let strategy = AdaptiveDecompressor::new(&binding);
    let recovered = strategy.run(&[], None).unwrap();
    assert_eq!(recovered.capacity, strategy.policy().min_initial);
    assert_eq!(recovered.attempts, 1);
    assert_eq!(recovered.data.len(), 10);
}

#[test]
fn test_known_length() {
    let binding = Binding::with_codec(Expanding::new(3_000));
    let strategy = AdaptiveDecompressor::new(&binding);

    let recovered = strategy.run(&[0u8; 10], Some(3_000)).unwrap();
    assert_eq!(recovered.capacity, 3_000);
    assert_eq!(recovered.attempts, 1);
    assert_eq!(recovered.data.len(), 3_000);

    // A hint that is too small is final.
    let err = strategy.run(&[0u8; 10], Some(2_999)).unwrap_err();
    assert!(err.is_capacity());
    assert_eq!(binding.codec().calls.get(), 2);
}

#[test]
fn test_zero_hint_means_unknown() {
    let binding = Binding::with_codec(Expanding::new(30));
    let recovered = AdaptiveDecompressor::new(&binding)
        .run(&[0u8; 10], Some(0))
        .unwrap();
    assert_eq!(recovered.capacity, 50);
}

#[test]
fn test_probe_skips_growth() {
    let mut codec = Expanding::new(123_456);
    codec.probe = Some(123_456);
    let binding = Binding::with_codec(codec);
    let recovered = AdaptiveDecompressor::new(&binding)
        .run(&[0u8; 10], None)
        .unwrap();
    assert_eq!(recovered.capacity, 123_456);
    assert_eq!(recovered.attempts, 1);
    assert_eq!(binding.codec().calls.get(), 1);
}

#[test]
fn test_hint_wins_over_probe() {
    let mut codec = Expanding::new(500);
    codec.probe = Some(1);
    let binding = Binding::with_codec(codec);
    let recovered = AdaptiveDecompressor::new(&binding)
        .run(&[0u8; 10], Some(500))
        .unwrap();
    assert_eq!(recovered.capacity, 500);
}

#[test]
fn test_custom_policy() {
    let policy = GrowthPolicy {
        initial_factor: 1,
        growth_factor: 2,
        min_initial: 1,
        max_size: 1 << 20,
    };
    let binding = Binding::with_codec(Expanding::new(100));
    let recovered = AdaptiveDecompressor::new(&binding)
        .with_policy(policy)
        .run(&[0u8; 10], None)
        .unwrap();
    // 10, 20, 40, 80, 160.
    assert_eq!(recovered.capacity, 160);
    assert_eq!(recovered.attempts, 5);
}

#[test]
fn test_budget() {
    let policy = GrowthPolicy::default();
    let mut budget = AdaptiveBudget::new(policy.initial_budget(20), 10_000);
    assert_eq!(budget.current_size(), 100);
    assert!(budget.has_room());
    budget.grow(&policy);
    assert_eq!(budget.current_size(), 1_000);
    budget.grow(&policy);
    budget.grow(&policy);
    assert_eq!(budget.current_size(), 100_000);
    assert!(!budget.has_room());

    let mut budget = AdaptiveBudget::new(usize::MAX / 2, usize::MAX);
    budget.grow(&policy);
    assert_eq!(budget.current_size(), usize::MAX);
    assert!(!budget.has_room());
}

#[test]
fn test_brotli_size_from_header() {
    let binding = Binding::new();
    let strategy = AdaptiveDecompressor::new(&binding);

    let input = "a very repetitive line of text\n".repeat(20_000);
    let compressed =
        bro::compress(input.as_bytes(), Mode::Text, 9, 22, 0).unwrap();
    assert_eq!(binding.decompressed_size(&compressed), Some(input.len()));

    let recovered = strategy.run(&compressed, None).unwrap();
    assert_eq!(recovered.data, input.as_bytes());
    assert_eq!(recovered.capacity, input.len());
    assert_eq!(recovered.attempts, 1);
}

/// Returns random text over a four letter alphabet and its compressed form.
/// With a 16 bit window the encoder splits it into several compressed
/// meta-blocks, so the headers don't tell the total size.
fn get_split_stream(len: usize) -> (Vec<u8>, Vec<u8>) {
    let mut rng = StdRng::seed_from_u64(7);
    let letters = Uniform::from(0..4u8);
    let input: Vec<u8> =
        (0..len).map(|_| b'a' + letters.sample(&mut rng)).collect();
    let compressed = bro::compress(&input, Mode::Generic, 5, 16, 0).unwrap();
    (input, compressed)
}

#[test]
fn test_brotli_grow() {
    let (input, compressed) = get_split_stream(400_000);
    let binding = Binding::new();
    assert_eq!(binding.decompressed_size(&compressed), None);
    assert!(compressed.len() < input.len());

    let recovered = AdaptiveDecompressor::new(&binding)
        .run(&compressed, None)
        .unwrap();
    let (tier, attempts) = expected_tier(compressed.len(), input.len());
    assert_eq!(recovered.data, input);
    assert_eq!(recovered.capacity, tier);
    assert_eq!(recovered.attempts, attempts);

    // Start at the compressed size and double, so that the first attempts
    // are refused by the codec and retried.
    let policy = GrowthPolicy {
        initial_factor: 1,
        growth_factor: 2,
        min_initial: 1,
        max_size: 1 << 30,
    };
    let recovered = AdaptiveDecompressor::new(&binding)
        .with_policy(policy)
        .run(&compressed, None)
        .unwrap();
    let mut tier = compressed.len();
    let mut attempts = 1;
    while tier < input.len() {
        tier *= 2;
        attempts += 1;
    }
    assert!(attempts >= 2);
    assert_eq!(recovered.data, input);
    assert_eq!(recovered.capacity, tier);
    assert_eq!(recovered.attempts, attempts);
}

#[test]
fn test_brotli_grow_runs_out_of_budget() {
    let (input, compressed) = get_split_stream(400_000);
    let binding = Binding::new();
    assert_eq!(binding.decompressed_size(&compressed), None);

    // Every budget below the output size is tried and refused.
    let policy = GrowthPolicy {
        initial_factor: 1,
        growth_factor: 2,
        min_initial: 1,
        max_size: input.len(),
    };
    let res = AdaptiveDecompressor::new(&binding)
        .with_policy(policy)
        .run(&compressed, None);
    match res {
        Err(Error::BufferLimitExceeded { max_size }) => {
            assert_eq!(max_size, input.len())
        }
        other => panic!("Expected the limit to be reached, got {:?}", other),
    }

    let res = AdaptiveDecompressor::new(&binding)
        .with_max_size(1000)
        .decompress(&compressed, None);
    assert!(matches!(res, Err(Error::BufferLimitExceeded { max_size: 1000 })));

    // A known length skips the budget.
    let res = AdaptiveDecompressor::new(&binding)
        .with_max_size(1000)
        .decompress(&compressed, Some(input.len()));
    assert_eq!(res.unwrap(), input);
}

#[test]
fn test_brotli_corrupt_stream() {
    let binding = Binding::new();
    let res = AdaptiveDecompressor::new(&binding)
        .run(&[0x11, 0x00, 0x00, 0x00, 0x00, 0x00], None);
    match res {
        Err(e @ Error::CodecFailure { .. }) => assert!(!e.is_capacity()),
        other => panic!("Expected a codec failure, got {:?}", other),
    }
}
