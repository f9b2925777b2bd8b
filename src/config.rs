//! Rebalancing tunables.

use crate::error::ConfigError;

/// Largest accepted `min_rebalance_size`. Subtrees below the threshold are
/// never rebuilt, so it also bounds how long an unchecked chain can get.
pub const MAX_MIN_REBALANCE_SIZE: usize = 64;

/// Largest accepted skew threshold. Values near 1.0 let a tree degrade to a
/// chain one node per level.
pub const MAX_SKEW_THRESHOLD: f64 = 0.95;

/// Configuration for the tag trees owned by a [`NameTree`](crate::NameTree).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    min_rebalance_size: usize,
    skew_threshold: f64,
}

impl Config {
    /// Validates and builds a configuration.
    ///
    /// `min_rebalance_size` may be at most [`MAX_MIN_REBALANCE_SIZE`];
    /// `skew_threshold` must lie in `(0.0, MAX_SKEW_THRESHOLD]`.
    pub fn new(min_rebalance_size: usize, skew_threshold: f64) -> Result<Self, ConfigError> {
        if min_rebalance_size > MAX_MIN_REBALANCE_SIZE {
            return Err(ConfigError::MinRebalanceSize {
                value: min_rebalance_size,
                max: MAX_MIN_REBALANCE_SIZE,
            });
        }
        // Written so that NaN fails too.
        if !(skew_threshold > 0.0 && skew_threshold <= MAX_SKEW_THRESHOLD) {
            return Err(ConfigError::SkewThreshold {
                value: skew_threshold,
                max: MAX_SKEW_THRESHOLD,
            });
        }
        Ok(Self {
            min_rebalance_size,
            skew_threshold,
        })
    }

    /// Larger child subtree must hold at least this many nodes before a
    /// subtree is considered for a rebuild.
    #[inline]
    pub fn min_rebalance_size(&self) -> usize {
        self.min_rebalance_size
    }

    /// Smallest `(bigger - smaller) / bigger` child-size ratio that counts as
    /// imbalanced.
    #[inline]
    pub fn skew_threshold(&self) -> f64 {
        self.skew_threshold
    }

    /// Size-ratio imbalance test over the two child subtree sizes.
    pub fn is_imbalanced(&self, left: usize, right: usize) -> bool {
        if left == right {
            return false;
        }
        let bigger = left.max(right);
        let smaller = left.min(right);
        if bigger < self.min_rebalance_size {
            return false;
        }
        let rate = (bigger - smaller) as f64 / bigger as f64;
        rate >= self.skew_threshold
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_rebalance_size: 4,
            skew_threshold: 0.5,
        }
    }
}
