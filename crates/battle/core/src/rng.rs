//! RNG oracle for deterministic random number generation.
//!
//! Every roll in a battle (ambush checks, random repertoire picks, context
//! tokens) is derived from the battle seed, so a battle replays identically
//! from the same seed and inputs.

/// RNG oracle for deterministic random number generation.
///
/// Implementations must be deterministic and produce the same values
/// given the same seed.
pub trait RngOracle {
    /// Generate a random u32 value from a seed.
    fn next_u32(&self, seed: u64) -> u32;

    /// Generate a random u64 value from a seed.
    fn next_u64(&self, seed: u64) -> u64 {
        let high = u64::from(self.next_u32(seed));
        let low = u64::from(self.next_u32(seed ^ 0x9e37_79b9_7f4a_7c15));
        (high << 32) | low
    }

    /// Roll a d100 (1-100 inclusive).
    fn roll_d100(&self, seed: u64) -> u32 {
        (self.next_u32(seed) % 100) + 1
    }

    /// Generate a random index in `0..len`. Returns 0 for empty ranges.
    fn index(&self, seed: u64, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        (self.next_u32(seed) as usize) % len
    }
}

/// PCG random number generator (PCG-XSH-RR, 64-bit state, 32-bit output).
#[derive(Clone, Copy, Debug, Default)]
pub struct PcgRng;

impl PcgRng {
    const MULTIPLIER: u64 = 6364136223846793005;
    const INCREMENT: u64 = 1442695040888963407;

    #[inline]
    fn pcg_step(state: u64) -> u64 {
        state
            .wrapping_mul(Self::MULTIPLIER)
            .wrapping_add(Self::INCREMENT)
    }

    #[inline]
    fn pcg_output(state: u64) -> u32 {
        let xorshifted = (((state >> 18) ^ state) >> 27) as u32;
        let rot = (state >> 59) as u32;
        xorshifted.rotate_right(rot)
    }
}

impl RngOracle for PcgRng {
    fn next_u32(&self, seed: u64) -> u32 {
        Self::pcg_output(Self::pcg_step(seed))
    }
}

/// Compute a deterministic seed for one roll.
///
/// # Arguments
///
/// * `battle_seed` - Base seed from the battle configuration
/// * `turn` - Turn number the roll belongs to
/// * `entity` - Combatant the roll is made for
/// * `salt` - Distinguishes independent rolls for the same entity and turn
pub fn compute_seed(battle_seed: u64, turn: u64, entity: u32, salt: u64) -> u64 {
    let mut hash = battle_seed;
    hash ^= turn.wrapping_mul(0x9e3779b97f4a7c15);
    hash ^= u64::from(entity).wrapping_mul(0x517cc1b727220a95);
    hash ^= salt.wrapping_mul(0x85ebca6b);

    hash ^= hash >> 33;
    hash = hash.wrapping_mul(0xff51afd7ed558ccd);
    hash ^= hash >> 33;

    hash
}
