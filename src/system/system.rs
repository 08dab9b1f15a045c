use std::collections::{BTreeMap, BTreeSet, HashMap};

use ahash::AHashMap;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::error::{Error, Result};
use crate::system::{Interaction, Key, Label, Variable};

/// Moves with |ΔE| at or below this are treated as flat when estimating
/// temperature bounds.
const FLAT_MOVE_EPS: f64 = 1e-7;

/// A normalized annealing problem: the quadratic form in flat indexed
/// arrays, the current assignment, and the per-site local-field cache.
///
/// Sites are the sorted distinct labels of the interaction. Hot paths
/// work on site indices only; [`state_map`](System::state_map) maps back
/// to labels at the end. The local field `local_fields[i]` is
/// `linear[i] + Σ_{(j,w)} w·value(j)` over the neighbor list of `i`
/// (the self term excluded), kept consistent by
/// [`set_value`](System::set_value) in O(deg) per commit.
///
/// The system PRNG is consumed only by kernels (acceptance and
/// inverse-CDF draws); each [`Variable`] carries its own stream for
/// candidate proposals, so one seed reproduces a whole trajectory.
#[derive(Clone, Debug)]
pub struct System<L: Label> {
    labels: Vec<L>,
    label_index: AHashMap<L, usize>,
    linear: Vec<f64>,
    self_coupling: Vec<f64>,
    neighbors: Vec<Vec<(usize, f64)>>,
    vars: Vec<Variable>,
    local_fields: Vec<f64>,
    rng: SmallRng,
}

impl<L: Label> System<L> {
    /// Normalize `interaction` into a solvable system.
    ///
    /// Entries whose sorted labels coincide are summed; labels missing
    /// from `ranges` get the binary domain `(0, 1)`. Fails with
    /// [`Error::InvalidInteraction`] on a key of length 0 or ≥ 3 and
    /// with [`Error::InvalidDomain`] on an inverted range.
    pub fn new(
        interaction: &Interaction<L>,
        ranges: &HashMap<L, (i64, i64)>,
        seed: Option<u64>,
    ) -> Result<Self> {
        // Sum entries that name the same unordered key. At most two
        // orderings of a pair can collapse onto one sorted key and f64
        // addition is commutative, so input iteration order cannot
        // perturb the sums.
        let mut reduced: BTreeMap<Key<L>, f64> = BTreeMap::new();
        for (labels, coefficient) in interaction.iter() {
            if labels.is_empty() || labels.len() > 2 {
                return Err(Error::InvalidInteraction { len: labels.len() });
            }
            let mut key = Key::from(labels);
            key.sort();
            *reduced.entry(key).or_insert(0.0) += coefficient;
        }

        let labels: Vec<L> = reduced
            .keys()
            .flat_map(|key| key.iter())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .cloned()
            .collect();
        let label_index: AHashMap<L, usize> =
            labels.iter().cloned().enumerate().map(|(site, label)| (label, site)).collect();
        let size = labels.len();

        let mut linear = vec![0.0; size];
        let mut self_coupling = vec![0.0; size];
        let mut neighbors: Vec<Vec<(usize, f64)>> = vec![Vec::new(); size];
        for (key, &coefficient) in &reduced {
            match key.as_slice() {
                [a] => linear[label_index[a]] = coefficient,
                [a, b] => {
                    let (i, j) = (label_index[a], label_index[b]);
                    if i == j {
                        self_coupling[i] = coefficient;
                    } else {
                        neighbors[i].push((j, coefficient));
                        neighbors[j].push((i, coefficient));
                    }
                }
                _ => unreachable!("key arity checked above"),
            }
        }
        for list in &mut neighbors {
            list.sort_unstable_by_key(|&(j, _)| j);
        }

        let mut rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };

        // A separate seed stream makes each variable's initial state a
        // function of its sorted position, not of label identity.
        let mut seed_stream = SmallRng::seed_from_u64(rng.random());
        let mut vars = Vec::with_capacity(size);
        for label in &labels {
            let (lower, upper) = ranges.get(label).copied().unwrap_or((0, 1));
            vars.push(Variable::new(lower, upper, seed_stream.random())?);
        }

        let local_fields = (0..size)
            .map(|i| {
                linear[i]
                    + neighbors[i].iter().map(|&(j, w)| w * vars[j].value() as f64).sum::<f64>()
            })
            .collect();

        Ok(Self { labels, label_index, linear, self_coupling, neighbors, vars, local_fields, rng })
    }

    /// Number of sites.
    #[inline] pub fn size(&self) -> usize { self.labels.len() }

    /// Sorted labels; position in this slice is the site index.
    #[inline] pub fn labels(&self) -> &[L] { &self.labels }

    /// Site index of a label.
    #[inline] pub fn index_of(&self, label: &L) -> Option<usize> {
        self.label_index.get(label).copied()
    }

    /// Read-only view of the per-site variables.
    #[inline] pub fn variables(&self) -> &[Variable] { &self.vars }

    /// Current value at a site.
    #[inline] pub fn value(&self, site: usize) -> i64 { self.vars[site].value() }

    /// Linear coefficients, one per site.
    #[inline] pub fn linear(&self) -> &[f64] { &self.linear }

    /// Diagonal self-couplings, one per site.
    #[inline] pub fn self_couplings(&self) -> &[f64] { &self.self_coupling }

    /// Neighbor list of a site: `(neighbor, weight)` sorted by neighbor.
    /// Pairs are double-listed, once under each endpoint.
    #[inline] pub fn neighbors(&self, site: usize) -> &[(usize, f64)] { &self.neighbors[site] }

    /// Local-field cache, one entry per site.
    #[inline] pub fn local_fields(&self) -> &[f64] { &self.local_fields }

    /// Largest domain size over all sites (1 for an empty system).
    pub fn max_num_states(&self) -> usize {
        self.vars.iter().map(Variable::num_states).max().unwrap_or(1)
    }

    /// Energy change if `site` moved from its current value to
    /// `candidate`, in O(1).
    ///
    /// With `a = candidate - value`, the self term contributes
    /// `S·((v+a)² − v²) = S·a·(2v + a)` and every other occurrence of
    /// the site's value enters linearly through the local field, so the
    /// total change is `a·(local_field + S·(2v + a))`.
    pub fn delta_energy(&self, site: usize, candidate: i64) -> f64 {
        let value = self.vars[site].value();
        let a = (candidate - value) as f64;
        a * (self.local_fields[site] + self.self_coupling[site] * (2.0 * value as f64 + a))
    }

    /// Commit `value` at `site`, updating neighbor local fields in
    /// O(deg).
    ///
    /// The neighbor lists are symmetric, so every local field in which
    /// the old value occurred is touched exactly once. The site's own
    /// local field does not depend on its value and stays put.
    pub fn set_value(&mut self, site: usize, value: i64) {
        let old = self.vars[site].value();
        if value == old {
            return;
        }
        let delta = (value - old) as f64;
        for &(j, w) in &self.neighbors[site] {
            self.local_fields[j] += w * delta;
        }
        self.vars[site].commit(value);
    }

    /// Total energy of the current assignment.
    pub fn energy(&self) -> f64 {
        let values: Vec<i64> = self.vars.iter().map(Variable::value).collect();
        self.energy_of(&values)
    }

    /// Total energy of an arbitrary assignment, in site order.
    ///
    /// Off-diagonal couplings are double-listed, hence the ½.
    pub fn energy_of(&self, values: &[i64]) -> f64 {
        debug_assert_eq!(values.len(), self.size(), "assignment length mismatch");
        let mut energy = 0.0;
        for i in 0..self.size() {
            let v = values[i] as f64;
            energy += self.linear[i] * v;
            energy += self.self_coupling[i] * v * v;
            for &(j, w) in &self.neighbors[i] {
                energy += 0.5 * w * v * values[j] as f64;
            }
        }
        energy
    }

    /// The state minimizing ΔE at `site`, with that ΔE. Ties go to the
    /// lowest state index.
    pub fn best_local_state(&self, site: usize) -> (usize, f64) {
        let var = &self.vars[site];
        let mut best_state = 0;
        let mut best_delta = f64::INFINITY;
        for state in 0..var.num_states() {
            let delta = self.delta_energy(site, var.value_of(state));
            if delta < best_delta {
                best_delta = delta;
                best_state = state;
            }
        }
        (best_state, best_delta)
    }

    /// Current assignment keyed by label.
    pub fn state_map(&self) -> HashMap<L, i64> {
        self.labels.iter().cloned().zip(self.vars.iter().map(Variable::value)).collect()
    }

    /// Estimate `(T_max, T_min)` from the spectrum of single-site moves.
    ///
    /// Over every site and state, take the smallest and largest |ΔE|
    /// above `FLAT_MOVE_EPS`. `T_max = dmax/ln 4` makes the worst
    /// uphill move acceptable about one time in four; `T_min =
    /// dmin/ln 100` makes the cheapest one acceptable about one time in
    /// a hundred. The two ratios are a calibration choice, and either
    /// bound can be overridden through
    /// [`SolverConfig`](crate::SolverConfig).
    pub fn estimate_temperatures(&self) -> Result<(f64, f64)> {
        let mut min_delta = f64::INFINITY;
        let mut max_delta = f64::NEG_INFINITY;
        for site in 0..self.size() {
            for state in 0..self.vars[site].num_states() {
                let delta = self.delta_energy(site, self.vars[site].value_of(state)).abs();
                if delta > FLAT_MOVE_EPS {
                    min_delta = min_delta.min(delta);
                    max_delta = max_delta.max(delta);
                }
            }
        }
        if !max_delta.is_finite() {
            return Err(Error::TrivialProblem);
        }
        Ok((max_delta / 4f64.ln(), min_delta / 100f64.ln()))
    }

    /// Candidate value at `site`, drawn from the site's own PRNG.
    #[inline]
    pub fn candidate(&mut self, site: usize) -> i64 {
        self.vars[site].candidate()
    }

    /// Uniform draw in [0, 1) from the system PRNG. Kernel use only.
    #[inline]
    pub(crate) fn uniform(&mut self) -> f64 {
        self.rng.random()
    }
}
