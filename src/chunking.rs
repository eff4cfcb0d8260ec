// src/chunking.rs

//! Read-buffer sizing.
//!
//! Larger files get larger buffers to amortize system-call overhead: the
//! size starts at [`MIN_CHUNK_SIZE`] and doubles once for every power of ten
//! by which the file exceeds [`GROWTH_THRESHOLD`], up to [`MAX_CHUNK_SIZE`].

use tracing::{debug, warn};

/// Smallest read buffer handed out (16 KiB)
pub const MIN_CHUNK_SIZE: usize = 16 * 1024;

/// Largest read buffer handed out, and largest accepted override (16 MiB)
pub const MAX_CHUNK_SIZE: usize = 16 * 1024 * 1024;

/// File size above which the buffer starts doubling (100 KiB)
pub const GROWTH_THRESHOLD: u64 = 100 * 1024;

/// Environment variable consulted by [`ChunkPolicy::from_env`]
pub const CHUNK_SIZE_ENV: &str = "SLICE_CHUNK_SIZE";

/// Smallest power of two >= `n`. Returns 1 for 0.
///
/// Saturates at the largest representable power of two.
pub fn next_power_of_two(n: u64) -> u64 {
    n.checked_next_power_of_two().unwrap_or(1 << 63)
}

/// Computed buffer size for a file of `file_size` bytes.
pub fn chunk_size(file_size: u64) -> usize {
    let mut size = MIN_CHUNK_SIZE;
    let mut threshold = GROWTH_THRESHOLD;
    while threshold < file_size && size < MAX_CHUNK_SIZE {
        size *= 2;
        threshold = threshold.saturating_mul(10);
    }
    size.min(MAX_CHUNK_SIZE)
}

/// Parses an override value. Only positive integers up to the ceiling count.
pub fn parse_override(raw: &str) -> Option<usize> {
    match raw.trim().parse::<usize>() {
        Ok(value) if value > 0 && value <= MAX_CHUNK_SIZE => Some(value),
        _ => None,
    }
}

/// Buffer size recommended for a corpus whose longest line is `max_line`
/// bytes: the next power of two leaving at least 20% headroom, kept within
/// the range an override may take.
pub fn recommended_chunk_size(max_line: u64) -> u64 {
    let with_headroom = max_line.saturating_add(max_line / 5);
    next_power_of_two(with_headroom).clamp(MIN_CHUNK_SIZE as u64, MAX_CHUNK_SIZE as u64)
}

/// Chunk-size policy with an optional caller override
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkPolicy {
    override_size: Option<usize>,
}

impl ChunkPolicy {
    /// Policy that always computes the size from the file size
    pub fn computed() -> Self {
        Self::default()
    }

    /// Policy honoring an override value. Invalid values are ignored.
    pub fn with_override(raw: Option<&str>) -> Self {
        let override_size = raw.and_then(|raw| {
            let parsed = parse_override(raw);
            if parsed.is_none() {
                warn!(value = raw, "invalid {CHUNK_SIZE_ENV} value, using calculated size");
            }
            parsed
        });
        Self { override_size }
    }

    /// Policy reading its override from `SLICE_CHUNK_SIZE`
    pub fn from_env() -> Self {
        let raw = std::env::var(CHUNK_SIZE_ENV).ok();
        Self::with_override(raw.as_deref())
    }

    pub fn override_size(&self) -> Option<usize> {
        self.override_size
    }

    /// Read-buffer size for a file of `file_size` bytes
    pub fn resolve(&self, file_size: u64) -> usize {
        match self.override_size {
            Some(size) => {
                debug!(size, "using {CHUNK_SIZE_ENV} override");
                size
            }
            None => {
                let size = chunk_size(file_size);
                debug!(file_size, size, "calculated chunk size");
                size
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn next_power_of_two_of_zero_is_one() {
        assert_eq!(next_power_of_two(0), 1);
        assert_eq!(next_power_of_two(1), 1);
        assert_eq!(next_power_of_two(3), 4);
        assert_eq!(next_power_of_two(4096), 4096);
        assert_eq!(next_power_of_two(4097), 8192);
        assert_eq!(next_power_of_two(u64::MAX), 1 << 63);
    }

    #[test]
    fn chunk_size_doubles_per_decade() {
        assert_eq!(chunk_size(0), MIN_CHUNK_SIZE);
        assert_eq!(chunk_size(100 * 1024), MIN_CHUNK_SIZE);
        assert_eq!(chunk_size(100 * 1024 + 1), MIN_CHUNK_SIZE * 2);
        assert_eq!(chunk_size(1_024_001), MIN_CHUNK_SIZE * 4);
        assert_eq!(chunk_size(u64::MAX), MAX_CHUNK_SIZE);
    }

    #[test]
    fn override_must_be_positive_and_bounded() {
        assert_eq!(parse_override("65536"), Some(65536));
        assert_eq!(parse_override(" 4096 "), Some(4096));
        assert_eq!(parse_override("0"), None);
        assert_eq!(parse_override("-5"), None);
        assert_eq!(parse_override("12kb"), None);
        assert_eq!(parse_override(&(MAX_CHUNK_SIZE + 1).to_string()), None);
    }

    #[test]
    fn invalid_override_falls_back_to_computed() {
        let policy = ChunkPolicy::with_override(Some("banana"));
        assert_eq!(policy.override_size(), None);
        assert_eq!(policy.resolve(0), MIN_CHUNK_SIZE);

        let policy = ChunkPolicy::with_override(Some("8192"));
        assert_eq!(policy.resolve(u64::MAX), 8192);
    }

    #[test]
    fn recommendation_leaves_headroom() {
        assert_eq!(recommended_chunk_size(0), MIN_CHUNK_SIZE as u64);
        assert_eq!(recommended_chunk_size(100_000), 131_072);
        // 120_000 * 1.2 = 144_000 does not fit in 131_072
        assert_eq!(recommended_chunk_size(120_000), 262_144);
        assert_eq!(recommended_chunk_size(u64::MAX), MAX_CHUNK_SIZE as u64);
    }

    proptest! {
        #[test]
        fn prop_next_power_of_two_is_smallest(n in 0u64..(1 << 62)) {
            let p = next_power_of_two(n);
            prop_assert!(p.is_power_of_two());
            prop_assert!(p >= n);
            prop_assert!(p == 1 || p / 2 < n);
        }

        #[test]
        fn prop_chunk_size_is_bounded_and_monotonic(a in any::<u64>(), b in any::<u64>()) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let small = chunk_size(lo);
            let large = chunk_size(hi);
            prop_assert!(small <= large);
            prop_assert!((MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&small));
            prop_assert!((MIN_CHUNK_SIZE..=MAX_CHUNK_SIZE).contains(&large));
        }
    }
}
