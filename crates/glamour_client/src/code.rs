//! Candidate promo codes.

use rand::Rng;
use std::ops::RangeInclusive;

/// Range candidates are drawn from: every 5-digit number.
pub const CODE_RANGE: RangeInclusive<u32> = 10_000..=99_999;

/// Draws a 5-digit candidate code uniformly from [`CODE_RANGE`].
///
/// The server keeps it only if the player has no code yet.
pub fn generate_candidate_code<R: Rng>(rng: &mut R) -> String {
    rng.random_range(CODE_RANGE).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_codes_are_five_digits() {
        let mut rng = SmallRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let code = generate_candidate_code(&mut rng);
            assert_eq!(code.len(), 5);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(code.as_bytes()[0], b'0');
        }
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let a = generate_candidate_code(&mut SmallRng::seed_from_u64(99));
        let b = generate_candidate_code(&mut SmallRng::seed_from_u64(99));
        assert_eq!(a, b);
    }
}
