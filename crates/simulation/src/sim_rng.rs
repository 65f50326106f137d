//! Deterministic simulation RNG resource.
//!
//! Every random draw in the city (move-ins, development rolls, disasters,
//! citizen names) goes through one `ChaCha8Rng`, so identical seeds and
//! identical player actions produce identical cities.

use bevy::prelude::*;
use bitcode::{Decode, Encode};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seed used when no explicit seed is provided.
pub const DEFAULT_SEED: u64 = 42;

// ---------------------------------------------------------------------------
// Serializable snapshot of ChaCha8Rng state
// ---------------------------------------------------------------------------

#[derive(Encode, Decode)]
struct RngSnapshot {
    seed: [u8; 32],
    word_pos: u128,
    stream: u64,
}

impl RngSnapshot {
    fn from_rng(rng: &ChaCha8Rng) -> Self {
        Self {
            seed: rng.get_seed(),
            word_pos: rng.get_word_pos(),
            stream: rng.get_stream(),
        }
    }

    fn to_rng(&self) -> ChaCha8Rng {
        let mut rng = ChaCha8Rng::from_seed(self.seed);
        rng.set_stream(self.stream);
        rng.set_word_pos(self.word_pos);
        rng
    }
}

// ---------------------------------------------------------------------------
// SimRng resource
// ---------------------------------------------------------------------------

/// Deterministic RNG resource for all simulation randomness.
#[derive(Resource)]
pub struct SimRng(pub ChaCha8Rng);

impl Default for SimRng {
    fn default() -> Self {
        Self(ChaCha8Rng::seed_from_u64(DEFAULT_SEED))
    }
}

impl SimRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Uniform draw in `[0, 1)`.
    pub fn roll(&mut self) -> f32 {
        self.0.gen::<f32>()
    }

    /// True with probability `p`. `p >= 1.0` always succeeds, `p <= 0.0` never does.
    pub fn chance(&mut self, p: f32) -> bool {
        self.roll() < p
    }

    /// Uniform index in `0..len`. `len` must be non-zero.
    pub fn pick(&mut self, len: usize) -> usize {
        self.0.gen_range(0..len)
    }

    /// Encode the full generator state (seed, stream, word position).
    pub fn snapshot_bytes(&self) -> Vec<u8> {
        bitcode::encode(&RngSnapshot::from_rng(&self.0))
    }

    /// Restore a generator from `snapshot_bytes` output.
    pub fn from_snapshot_bytes(bytes: &[u8]) -> Result<Self, bitcode::Error> {
        let snapshot = bitcode::decode::<RngSnapshot>(bytes)?;
        Ok(Self(snapshot.to_rng()))
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
