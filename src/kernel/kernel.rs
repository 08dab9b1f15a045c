//! Single-site transition kernels.
//!
//! A kernel proposes the next value for one site at temperature `T`;
//! the driver commits it through [`System::set_value`]. All three
//! kernels agree on the ΔE semantics of [`System::delta_energy`] and
//! differ only in proposal and acceptance statistics. Scratch buffers
//! are sized once at construction to the largest domain in the system
//! and reused across sites and sweeps.
//!
//! [`System::set_value`]: crate::System::set_value
//! [`System::delta_energy`]: crate::System::delta_energy

use std::fmt;

use crate::error::{Error, Result};
use crate::system::{Label, System};

/// `exp` underflows to zero below this argument.
const MIN_EXP_ARG: f64 = -745.0;

/// `exp(arg)` with the argument clamped at the underflow edge.
/// `f64::max` discards a NaN left operand, so a degenerate `0/0`
/// temperature ratio decays to zero instead of propagating NaN.
#[inline]
fn boltzmann(arg: f64) -> f64 {
    arg.max(MIN_EXP_ARG).exp()
}

#[derive(Clone, Debug)]
enum KernelKind {
    Metropolis,
    HeatBath {
        probs: Vec<f64>,
        deltas: Vec<f64>,
    },
    SuwaTodo {
        weights: Vec<f64>,
        ring: Vec<f64>,
        deltas: Vec<f64>,
    },
}

/// A single-site transition rule: Metropolis, Heat-Bath, or Suwa–Todo.
///
/// Kernels are stateless with respect to the problem; they hold only
/// scratch buffers. The driver selects one by name through
/// [`from_name`](Kernel::from_name).
#[derive(Clone, Debug)]
pub struct Kernel {
    kind: KernelKind,
}

impl Kernel {
    /// Metropolis: one random candidate, accepted on `ΔE ≤ 0` or with
    /// probability `exp(−ΔE/T)`.
    pub fn metropolis() -> Self {
        Self { kind: KernelKind::Metropolis }
    }

    /// Heat-Bath: samples the next state from the Boltzmann
    /// distribution over all of the site's states. `max_states` caps
    /// any site's domain size.
    pub fn heat_bath(max_states: usize) -> Self {
        Self {
            kind: KernelKind::HeatBath {
                probs: vec![0.0; max_states],
                deltas: vec![0.0; max_states],
            },
        }
    }

    /// Suwa–Todo: rejection-free sampling that maximizes the chance of
    /// leaving the current state while targeting the same Boltzmann
    /// distribution. `max_states` caps any site's domain size.
    pub fn suwa_todo(max_states: usize) -> Self {
        Self {
            kind: KernelKind::SuwaTodo {
                weights: vec![0.0; max_states],
                ring: vec![0.0; max_states + 1],
                deltas: vec![0.0; max_states],
            },
        }
    }

    /// Select a kernel by its canonical name. Names are case-sensitive.
    pub fn from_name(name: &str, max_states: usize) -> Result<Self> {
        match name {
            "METROPOLIS" => Ok(Self::metropolis()),
            "HEAT_BATH" => Ok(Self::heat_bath(max_states)),
            "SUWA-TODO" => Ok(Self::suwa_todo(max_states)),
            _ => Err(Error::UnknownKernel(name.to_owned())),
        }
    }

    /// Canonical name, as accepted by [`from_name`](Kernel::from_name).
    pub fn name(&self) -> &'static str {
        match self.kind {
            KernelKind::Metropolis => "METROPOLIS",
            KernelKind::HeatBath { .. } => "HEAT_BATH",
            KernelKind::SuwaTodo { .. } => "SUWA-TODO",
        }
    }

    /// Propose the next value for `site` at temperature `temp`.
    ///
    /// Never commits anything: the returned value may equal the current
    /// one, and the caller applies it through `System::set_value`.
    pub fn propose<L: Label>(&mut self, system: &mut System<L>, site: usize, temp: f64) -> i64 {
        match &mut self.kind {
            KernelKind::Metropolis => propose_metropolis(system, site, temp),
            KernelKind::HeatBath { probs, deltas } => {
                propose_heat_bath(system, site, temp, probs, deltas)
            }
            KernelKind::SuwaTodo { weights, ring, deltas } => {
                propose_suwa_todo(system, site, temp, weights, ring, deltas)
            }
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn propose_metropolis<L: Label>(system: &mut System<L>, site: usize, temp: f64) -> i64 {
    let candidate = system.candidate(site);
    let delta = system.delta_energy(site, candidate);
    // Drawn unconditionally so the system RNG stream does not depend on
    // which branch accepts.
    let u = system.uniform();
    if delta <= 0.0 || u < boltzmann(-delta / temp) {
        candidate
    } else {
        system.value(site)
    }
}

fn propose_heat_bath<L: Label>(
    system: &mut System<L>,
    site: usize,
    temp: f64,
    probs: &mut [f64],
    deltas: &mut [f64],
) -> i64 {
    let num_states = system.variables()[site].num_states();

    // Shift by the minimum so the largest weight is exp(0).
    let mut min_delta = f64::INFINITY;
    for state in 0..num_states {
        let value = system.variables()[site].value_of(state);
        deltas[state] = system.delta_energy(site, value);
        min_delta = min_delta.min(deltas[state]);
    }

    let mut z = 0.0;
    for state in 0..num_states {
        probs[state] = boltzmann(-(deltas[state] - min_delta) / temp);
        z += probs[state];
    }
    let norm = 1.0 / z;

    let u = system.uniform();
    let mut cumulative = 0.0;
    for state in 0..num_states {
        cumulative += probs[state] * norm;
        if u < cumulative {
            return system.variables()[site].value_of(state);
        }
    }
    // Floating-point slack can leave the CDF a hair under one.
    system.variables()[site].value_of(num_states - 1)
}

fn propose_suwa_todo<L: Label>(
    system: &mut System<L>,
    site: usize,
    temp: f64,
    weights: &mut [f64],
    ring: &mut [f64],
    deltas: &mut [f64],
) -> i64 {
    let num_states = system.variables()[site].num_states();
    let (mode, min_delta) = system.best_local_state(site);

    for state in 0..num_states {
        let value = system.variables()[site].value_of(state);
        deltas[state] = system.delta_energy(site, value) - min_delta;
    }

    fill_ring(deltas, mode, temp, weights, ring, num_states);

    // The current state rides the same 0 <-> mode swap as the weights.
    let current = swap_with_mode(system.variables()[site].state(), mode);

    let u = system.uniform();
    let mut cumulative = 0.0;
    for to in 0..num_states {
        cumulative += flow_probability(weights, ring, current, to);
        if u < cumulative {
            return system.variables()[site].value_of(swap_with_mode(to, mode));
        }
    }
    system.variables()[site].value_of(num_states - 1)
}

/// Index map that swaps 0 with the mode and leaves the rest alone.
/// It is an involution, so it maps in and out of the reordered space.
#[inline]
fn swap_with_mode(state: usize, mode: usize) -> usize {
    if state == 0 {
        mode
    } else if state == mode {
        0
    } else {
        state
    }
}

/// Build the mode-first weight array and its prefix-sum ring.
///
/// Index 0 and the mode swap places, so `weights[0]` is the largest
/// weight (exactly 1 after the min shift). `ring[k]` holds the sum of
/// the first `k` weights and `ring[0]` the full total, closing the
/// ring.
fn fill_ring(
    deltas: &[f64],
    mode: usize,
    temp: f64,
    weights: &mut [f64],
    ring: &mut [f64],
    num_states: usize,
) {
    ring[0] = 0.0;
    for state in 0..num_states {
        weights[state] = boltzmann(-deltas[swap_with_mode(state, mode)] / temp);
        ring[state + 1] = ring[state] + weights[state];
    }
    ring[0] = ring[num_states];
}

/// Transition probability from reordered state `from` to `to`: the
/// overlap of a unit window anchored past `from`'s prefix with `to`'s
/// segment on the ring. The window has length 1 ≤ total weight, so the
/// overlaps over `to` sum to exactly 1.
#[inline]
fn flow_probability(weights: &[f64], ring: &[f64], from: usize, to: usize) -> f64 {
    let d = ring[from + 1] - ring[to] + ring[1];
    d.min(1.0 + weights[to] - d).min(1.0).min(weights[to]).max(0.0)
}
