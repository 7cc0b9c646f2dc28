//! Deterministic random stream for every gameplay roll.
//!
//! The generator is fully described by one `u64` of state, which lives inside
//! [`GameState`](crate::state::GameState) and is persisted with it. Seed
//! strings are hashed once into that state; after that only the state moves.
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

const SEED_KEY: &[u8] = b"keyward-seed";
const ZERO_STATE_REPLACEMENT: u64 = 0x4B45_5957_4152_4421;
const GOLDEN_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

/// Single-state SplitMix64 generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameRng {
    state: u64,
}

impl Default for GameRng {
    fn default() -> Self {
        Self::from_state(ZERO_STATE_REPLACEMENT)
    }
}

impl GameRng {
    /// Rebuild a generator from a persisted state value.
    #[must_use]
    pub const fn from_state(state: u64) -> Self {
        Self { state }
    }

    /// Derive the initial state from a player-facing seed string.
    #[must_use]
    pub fn from_seed_str(seed: &str) -> Self {
        Self::from_state(derive_state(seed))
    }

    /// Current state; feeding it back into [`GameRng::from_state`] resumes the stream.
    #[must_use]
    pub const fn state(&self) -> u64 {
        self.state
    }

    fn step(&mut self) -> u64 {
        self.state = self.state.wrapping_add(GOLDEN_GAMMA);
        let mut z = self.state;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^ (z >> 31)
    }

    /// Uniform integer in `low..=high`. Swapped bounds are normalized.
    pub fn roll_range(&mut self, low: i32, high: i32) -> i32 {
        let (low, high) = if low <= high { (low, high) } else { (high, low) };
        let span = u64::try_from(i64::from(high) - i64::from(low) + 1).unwrap_or(1);
        let zone = u64::MAX - (u64::MAX % span);
        loop {
            let value = self.step();
            if value < zone {
                let offset = i64::try_from(value % span).unwrap_or(0);
                return i32::try_from(i64::from(low) + offset).unwrap_or(low);
            }
        }
    }

    /// Percentile roll in `1..=100`.
    pub fn roll_percent(&mut self) -> i32 {
        self.roll_range(1, 100)
    }

    /// Uniform float in `[0, 1)` built from the top 53 bits.
    pub fn next_unit(&mut self) -> f64 {
        let bits = self.step() >> 11;
        let mantissa = u32::try_from(bits >> 21).unwrap_or(0);
        let low = u32::try_from(bits & 0x1F_FFFF).unwrap_or(0);
        (f64::from(mantissa) * 2_097_152.0 + f64::from(low)) / 9_007_199_254_740_992.0
    }

    /// Returns true with probability `chance` (clamped to `0..=1`).
    pub fn roll_chance(&mut self, chance: f64) -> bool {
        self.next_unit() < chance.clamp(0.0, 1.0)
    }

    /// Uniform index in `0..len`; `None` for empty ranges.
    pub fn pick_index(&mut self, len: usize) -> Option<usize> {
        if len == 0 {
            return None;
        }
        let high = i32::try_from(len - 1).unwrap_or(i32::MAX);
        usize::try_from(self.roll_range(0, high)).ok()
    }

    /// Uniform choice from a slice; `None` when the slice is empty.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        self.pick_index(items.len()).and_then(|idx| items.get(idx))
    }

    /// Weighted choice; zero total weight yields `None`.
    pub fn choose_weighted<'a, T>(&mut self, items: &'a [(T, u32)]) -> Option<&'a T> {
        let total: u64 = items.iter().map(|(_, weight)| u64::from(*weight)).sum();
        if total == 0 {
            return None;
        }
        let high = i32::try_from(total - 1).unwrap_or(i32::MAX);
        let mut roll = u64::try_from(self.roll_range(0, high)).unwrap_or(0);
        for (item, weight) in items {
            let weight = u64::from(*weight);
            if roll < weight {
                return Some(item);
            }
            roll -= weight;
        }
        items.last().map(|(item, _)| item)
    }
}

impl rand::RngCore for GameRng {
    fn next_u32(&mut self) -> u32 {
        u32::try_from(self.step() >> 32).unwrap_or(0)
    }

    fn next_u64(&mut self) -> u64 {
        self.step()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(8) {
            let bytes = self.step().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Pure positional hash for decoration and layout variety; never advances a stream.
#[must_use]
pub fn hash_index(x: i32, y: i32, salt: u64) -> u64 {
    let mut probe = GameRng::from_state(
        salt ^ (u64::from(x.unsigned_abs()) << 32) ^ u64::from(y.unsigned_abs()),
    );
    probe.step()
}

fn derive_state(seed: &str) -> u64 {
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(SEED_KEY) else {
        return ZERO_STATE_REPLACEMENT;
    };
    mac.update(seed.as_bytes());
    let digest = mac.finalize().into_bytes();
    let mut seed_bytes = [0u8; 8];
    seed_bytes.copy_from_slice(&digest[..8]);
    match u64::from_le_bytes(seed_bytes) {
        0 => ZERO_STATE_REPLACEMENT,
        state => state,
    }
}
