#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic sequence generator driving every random decision of the rain.
//!
//! This is a 16-bit Galois linear-feedback shift register rather than a
//! random number generator. With the `0xB400` tap mask it steps through every
//! nonzero 16-bit value exactly once before repeating, so each column sees a
//! uniform spread of values and a run can be reproduced from its seed.

use std::time::{SystemTime, UNIX_EPOCH};

const FEEDBACK_MASK: u16 = 0xB400;

/// Substituted for a zero seed, the only state the register never leaves.
const FALLBACK_SEED: u16 = 0xACE1;

/// Number of distinct states the register cycles through.
pub const PERIOD: u32 = u16::MAX as u32;

/// Shift register shared by every consumer of "random" values in the rain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceGenerator {
    register: u16,
}

impl SequenceGenerator {
    /// Creates a generator whose register starts at `seed`.
    ///
    /// A zero seed is replaced with a fixed nonzero value.
    #[must_use]
    pub const fn from_seed(seed: u16) -> Self {
        let register = if seed == 0 { FALLBACK_SEED } else { seed };
        Self { register }
    }

    /// Seeds the register from the low 16 bits of the wall clock in milliseconds.
    #[must_use]
    pub fn from_clock() -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis())
            .unwrap_or_default();
        Self::from_seed(millis as u16)
    }

    /// Current register contents.
    #[must_use]
    pub const fn register(&self) -> u16 {
        self.register
    }

    /// Steps the register once and returns the new contents.
    pub fn next_value(&mut self) -> u32 {
        self.register = if self.register & 1 == 1 {
            (self.register >> 1) ^ FEEDBACK_MASK
        } else {
            self.register >> 1
        };
        u32::from(self.register)
    }

    /// Steps the register and reduces the value modulo `range`.
    ///
    /// The reduction keeps the bias of a 16-bit stream over ranges that do
    /// not divide 65536; the rain's tuning depends on it.
    ///
    /// # Panics
    ///
    /// Panics when `range` is zero.
    pub fn below(&mut self, range: u32) -> u32 {
        assert!(range > 0, "sequence range must be positive");
        self.next_value() % range
    }
}
