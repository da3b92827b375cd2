use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of uniform integers for anchor sampling and word colors.
pub trait Dice {
    /// Uniform value in `0..upper`; `0` when `upper` is zero.
    fn roll(&mut self, upper: u32) -> u32;
}

pub struct SeededDice {
    rng: StdRng,
}

impl SeededDice {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Dice for SeededDice {
    fn roll(&mut self, upper: u32) -> u32 {
        if upper <= 1 {
            return 0;
        }
        self.rng.random_range(0..upper)
    }
}

pub fn seed_from_clock() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_nanos() as u64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_rolls_the_same_sequence() {
        let mut a = SeededDice::from_seed(7);
        let mut b = SeededDice::from_seed(7);
        let left: Vec<u32> = (0..32).map(|_| a.roll(1000)).collect();
        let right: Vec<u32> = (0..32).map(|_| b.roll(1000)).collect();
        assert_eq!(left, right);
        assert!(left.iter().all(|value| *value < 1000));
    }

    #[test]
    fn empty_range_rolls_zero() {
        let mut dice = SeededDice::from_seed(1);
        assert_eq!(dice.roll(0), 0);
        assert_eq!(dice.roll(1), 0);
    }
}
