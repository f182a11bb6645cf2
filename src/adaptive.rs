//! Decompression of streams whose output size is not known up front.
//!
//! The strategy goes through up to three phases, one attempt at a time:
//!
//! 1. KnownLength: the caller supplied the length (or the probe found it).
//!    A single attempt is made with exactly that capacity.
//! 2. Probe: no length was supplied, so ask the codec to read it from the
//!    stream headers. On success continue with KnownLength.
//! 3. Grow: start with a budget proportional to the compressed size and
//!    multiply it after every attempt that ran out of room, until the budget
//!    reaches the configured maximum.
//!
//! Only failures caused by the output capacity are retried. A corrupt stream
//! fails on the first attempt.

use crate::binding::Binding;
use crate::codec::NativeCodec;
use crate::config::{Config, GrowthPolicy};
use crate::error::{Error, Result};

/// The budget of the current Grow attempt.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AdaptiveBudget {
    current_size: usize,
    max_size: usize,
}

impl AdaptiveBudget {
    pub fn new(current_size: usize, max_size: usize) -> Self {
        Self {
            current_size,
            max_size,
        }
    }

    pub fn current_size(&self) -> usize {
        self.current_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Returns true if another attempt fits in the budget.
    pub fn has_room(&self) -> bool {
        self.current_size < self.max_size
    }

    /// Move to the next tier of the schedule.
    pub fn grow(&mut self, policy: &GrowthPolicy) {
        self.current_size = policy.next_budget(self.current_size);
    }
}

/// The output of a successful adaptive decompression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recovered {
    /// The decompressed bytes.
    pub data: Vec<u8>,
    /// The capacity of the attempt that succeeded.
    pub capacity: usize,
    /// The number of decompression attempts that were made.
    pub attempts: u32,
}

/// Drives repeated bounded decompressions through a 'Binding'.
pub struct AdaptiveDecompressor<'a, C: NativeCodec> {
    binding: &'a Binding<C>,
    policy: GrowthPolicy,
}

impl<'a, C: NativeCodec> AdaptiveDecompressor<'a, C> {
    /// Creates a strategy that uses the process-wide growth policy.
    pub fn new(binding: &'a Binding<C>) -> Self {
        Self {
            binding,
            policy: Config::global().growth,
        }
    }

    /// Replace the whole growth policy.
    pub fn with_policy(mut self, policy: GrowthPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replace only the maximum buffer size.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.policy.max_size = max_size;
        self
    }

    pub fn policy(&self) -> GrowthPolicy {
        self.policy
    }

    /// Decompress 'data'. A 'length_hint' of zero counts as unknown.
    pub fn decompress(
        &self,
        data: &[u8],
        length_hint: Option<usize>,
    ) -> Result<Vec<u8>> {
        Ok(self.run(data, length_hint)?.data)
    }

    /// Decompress 'data' and report how the output was found.
    pub fn run(
        &self,
        data: &[u8],
        length_hint: Option<usize>,
    ) -> Result<Recovered> {
        if let Some(length) = length_hint.filter(|len| *len > 0) {
            return self.known_length(data, length);
        }

        if let Some(length) = self.binding.decompressed_size(data) {
            log::debug!("The stream header reports {} bytes", length);
            return self.known_length(data, length);
        }

        self.grow(data)
    }

    fn known_length(&self, data: &[u8], length: usize) -> Result<Recovered> {
        let data = self.binding.decompress_with_capacity(data, length)?;
        Ok(Recovered {
            data,
            capacity: length,
            attempts: 1,
        })
    }

    fn grow(&self, data: &[u8]) -> Result<Recovered> {
        let mut budget = AdaptiveBudget::new(
            self.policy.initial_budget(data.len()),
            self.policy.max_size,
        );
        let mut attempts = 0;

        while budget.has_room() {
            attempts += 1;
            let capacity = budget.current_size();
            log::debug!(
                "Attempt {} with a budget of {} bytes",
                attempts,
                capacity
            );

            match self.binding.decompress_with_capacity(data, capacity) {
                Ok(data) => {
                    return Ok(Recovered {
                        data,
                        capacity,
                        attempts,
                    })
                }
                Err(e) if e.is_capacity() => budget.grow(&self.policy),
                Err(e) => return Err(e),
            }
        }

        log::debug!(
            "Gave up after {} attempts, the budget reached {} bytes",
            attempts,
            budget.current_size()
        );
        Err(Error::BufferLimitExceeded {
            max_size: budget.max_size(),
        })
    }
}
