use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};

/// One annealed site: an integer domain `[lower, upper]`, the current
/// state, and the site's own PRNG.
///
/// The state is an offset into the domain, `value = lower_bound + state`.
/// The PRNG is consumed only by the initial state draw and by
/// [`candidate`](Variable::candidate), so a site's proposal stream does
/// not depend on what happens at other sites.
#[derive(Clone, Debug)]
pub struct Variable {
    lower_bound: i64,
    num_states: usize,
    state: usize,
    value: i64,
    rng: SmallRng,
}

impl Variable {
    /// Build a variable on `[lower, upper]` with a uniformly drawn
    /// initial state.
    pub fn new(lower: i64, upper: i64, seed: u64) -> Result<Self> {
        if lower > upper {
            return Err(Error::InvalidDomain { lower, upper });
        }
        let num_states = (upper - lower + 1) as usize;
        let mut rng = SmallRng::seed_from_u64(seed);
        let state = rng.random_range(0..num_states);
        Ok(Self { lower_bound: lower, num_states, state, value: lower + state as i64, rng })
    }

    #[inline] pub fn value(&self) -> i64 { self.value }

    #[inline] pub fn state(&self) -> usize { self.state }

    #[inline] pub fn num_states(&self) -> usize { self.num_states }

    #[inline] pub fn lower_bound(&self) -> i64 { self.lower_bound }

    /// Value at a given state offset.
    #[inline] pub fn value_of(&self, state: usize) -> i64 { self.lower_bound + state as i64 }

    /// Uniform draw over the domain excluding the current value.
    ///
    /// Draws from the `num_states - 1` alternatives and skips over the
    /// current state, which keeps the draw uniform in O(1). A fixed
    /// domain (a single state) has no alternative: the current value is
    /// returned and no randomness is consumed.
    pub fn candidate(&mut self) -> i64 {
        if self.num_states == 1 {
            return self.value;
        }
        let mut state = self.rng.random_range(0..self.num_states - 1);
        if state >= self.state {
            state += 1;
        }
        self.lower_bound + state as i64
    }

    /// Commit a new value. Callers keep `value` within the domain.
    pub(crate) fn commit(&mut self, value: i64) {
        debug_assert!(
            value >= self.lower_bound && value < self.lower_bound + self.num_states as i64,
            "value out of domain"
        );
        self.state = (value - self.lower_bound) as usize;
        self.value = value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_value_is_within_bounds() {
        for seed in 0..32 {
            let var = Variable::new(0, 10, seed).unwrap();
            assert!((0..=10).contains(&var.value()));
            assert_eq!(var.value(), var.value_of(var.state()));
        }
    }

    #[test]
    fn fixed_domain_has_a_single_value() {
        let mut var = Variable::new(3, 3, 7).unwrap();
        assert_eq!(var.value(), 3);
        assert_eq!(var.num_states(), 1);
        assert_eq!(var.candidate(), 3);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = Variable::new(1, 0, 0).unwrap_err();
        assert_eq!(err, Error::InvalidDomain { lower: 1, upper: 0 });
    }

    #[test]
    fn candidate_never_returns_the_current_value() {
        let mut var = Variable::new(0, 1, 0).unwrap();
        for _ in 0..100 {
            let candidate = var.candidate();
            assert!((0..=1).contains(&candidate));
            assert_ne!(candidate, var.value());
        }
    }

    #[test]
    fn candidate_is_uniform_over_the_alternatives() {
        let mut var = Variable::new(0, 4, 42).unwrap();
        let draws = 20_000;
        let mut counts = [0usize; 5];
        for _ in 0..draws {
            counts[var.candidate() as usize] += 1;
        }

        assert_eq!(counts[var.value() as usize], 0);
        for (value, &count) in counts.iter().enumerate() {
            if value as i64 == var.value() {
                continue;
            }
            let freq = count as f64 / draws as f64;
            assert!((freq - 0.25).abs() < 0.02, "value {value}: frequency {freq}");
        }
    }
}
