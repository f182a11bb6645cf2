//! Policy constants for parameter validation, output sizing and adaptive
//! growth. They live in one immutable object that is created once per process.

use std::fmt;
use std::sync::OnceLock;

static GLOBAL: OnceLock<Config> = OnceLock::new();

/// An inclusive range of accepted integer values.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub min: u32,
    pub max: u32,
}

impl Bounds {
    pub const fn new(min: u32, max: u32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, val: i64) -> bool {
        val >= self.min as i64 && val <= self.max as i64
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..={}", self.min, self.max)
    }
}

/// The valid values for each compression parameter.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParameterDomain {
    pub quality: Bounds,
    pub window_bits: Bounds,
    /// Block bits also accept zero, which lets the codec pick a value.
    pub block_bits: Bounds,
}

impl Default for ParameterDomain {
    fn default() -> Self {
        Self {
            quality: Bounds::new(0, 11),
            window_bits: Bounds::new(10, 24),
            block_bits: Bounds::new(16, 24),
        }
    }
}

/// Decides the output buffer capacity for one-shot compression.
/// The capacity is `ceil(len * ratio_num / ratio_den) + slack`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OutputSizing {
    pub ratio_num: usize,
    pub ratio_den: usize,
    pub slack: usize,
}

impl Default for OutputSizing {
    fn default() -> Self {
        Self {
            ratio_num: 6,
            ratio_den: 5,
            slack: 10240,
        }
    }
}

impl OutputSizing {
    /// Returns the capacity for an input of 'len' bytes, or None if the
    /// computation overflows.
    pub fn capacity_for(&self, len: usize) -> Option<usize> {
        debug_assert!(self.ratio_den > 0, "Invalid sizing ratio");
        let scaled = len.checked_mul(self.ratio_num)?;
        let rounded = scaled.checked_add(self.ratio_den - 1)? / self.ratio_den;
        rounded.checked_add(self.slack)
    }
}

/// Retry schedule for decompressing streams of unknown size.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct GrowthPolicy {
    /// The first budget is 'initial_factor' times the compressed length.
    pub initial_factor: usize,
    /// Each retry multiplies the budget by this factor.
    pub growth_factor: usize,
    /// The first budget for an empty input.
    pub min_initial: usize,
    /// Budgets at or above this size are never attempted.
    pub max_size: usize,
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self {
            initial_factor: 5,
            growth_factor: 10,
            min_initial: 16,
            max_size: 1_000_000_000,
        }
    }
}

impl GrowthPolicy {
    /// Returns the first budget for a compressed input of 'len' bytes.
    pub fn initial_budget(&self, len: usize) -> usize {
        if len == 0 {
            return self.min_initial.max(1);
        }
        len.saturating_mul(self.initial_factor).max(1)
    }

    /// Returns the budget that follows 'current'. The budget always grows, a
    /// factor below two is treated as two.
    pub fn next_budget(&self, current: usize) -> usize {
        current.saturating_mul(self.growth_factor.max(2))
    }
}

/// Stores the process-wide policy.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub domain: ParameterDomain,
    pub sizing: OutputSizing,
    pub growth: GrowthPolicy,
    /// The size of each chunk that the streaming decoder hands out.
    pub chunk_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            domain: ParameterDomain::default(),
            sizing: OutputSizing::default(),
            growth: GrowthPolicy::default(),
            chunk_size: 1 << 16,
        }
    }
}

impl Config {
    /// Returns the process-wide configuration. The defaults are used unless
    /// 'install' was called first.
    pub fn global() -> &'static Config {
        GLOBAL.get_or_init(Config::default)
    }

    /// Install 'config' as the process-wide configuration. This can only
    /// happen once, before the first call to 'global'. On failure the rejected
    /// config is handed back.
    pub fn install(config: Config) -> Result<(), Config> {
        GLOBAL.set(config)
    }
}
