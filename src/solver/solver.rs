use std::collections::HashMap;
use std::time::{Duration, Instant};

use log::{debug, trace};

use crate::error::Result;
use crate::kernel::Kernel;
use crate::solver::schedule;
use crate::system::{Interaction, Label, System};

/// Solver configuration: schedule length, sample count, optional
/// temperature bounds, transition kernel, and base seed.
///
/// Bounds left as `None` are filled per sample from
/// [`System::estimate_temperatures`]; each can be overridden
/// independently. `state_updater` names the kernel as accepted by
/// [`Kernel::from_name`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    pub num_sweeps: usize,
    pub num_samples: usize,
    pub t_min: Option<f64>,
    pub t_max: Option<f64>,
    pub state_updater: String,
    pub seed: Option<u64>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            num_sweeps: 1000,
            num_samples: 1,
            t_min: None,
            t_max: None,
            state_updater: "METROPOLIS".to_owned(),
            seed: None,
        }
    }
}

/// The settings one sample actually ran with.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SampleMetadata {
    pub num_sweeps: usize,
    pub state_updater: String,
    pub seed: Option<u64>,
    pub t_min: f64,
    pub t_max: f64,
}

/// Aggregated output of [`solve`]: one entry per sample, in parallel
/// vectors.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Results<L: Label> {
    pub solutions: Vec<HashMap<L, i64>>,
    pub energies: Vec<f64>,
    pub durations: Vec<Duration>,
    pub metadata: Vec<SampleMetadata>,
}

impl<L: Label> Results<L> {
    /// Number of samples.
    #[inline] pub fn len(&self) -> usize { self.solutions.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.solutions.is_empty() }

    /// The subset of samples tied for the minimum energy.
    pub fn min_energy_solutions(&self) -> Results<L> {
        let min_energy = self.energies.iter().copied().fold(f64::INFINITY, f64::min);
        let keep: Vec<usize> =
            (0..self.len()).filter(|&i| self.energies[i] == min_energy).collect();
        Results {
            solutions: keep.iter().map(|&i| self.solutions[i].clone()).collect(),
            energies: keep.iter().map(|&i| self.energies[i]).collect(),
            durations: keep.iter().map(|&i| self.durations[i]).collect(),
            metadata: keep.iter().map(|&i| self.metadata[i].clone()).collect(),
        }
    }
}

/// Anneal `num_samples` independent samples and aggregate the results.
///
/// Samples run sequentially on their own freshly built [`System`],
/// seeded `seed`, `seed + 1`, ... from the configured base seed, or
/// from OS entropy per sample when unseeded. Each sample's wall-clock
/// duration is recorded.
pub fn solve<L: Label>(
    interaction: &Interaction<L>,
    ranges: &HashMap<L, (i64, i64)>,
    config: &SolverConfig,
) -> Result<Results<L>> {
    let mut results = Results {
        solutions: Vec::with_capacity(config.num_samples),
        energies: Vec::with_capacity(config.num_samples),
        durations: Vec::with_capacity(config.num_samples),
        metadata: Vec::with_capacity(config.num_samples),
    };

    for sample in 0..config.num_samples {
        let seed = config.seed.map(|base| base.wrapping_add(sample as u64));
        let start = Instant::now();
        let (solution, energy, metadata) = run_sample(interaction, ranges, config, seed)?;
        let duration = start.elapsed();

        debug!("sample {sample}: energy {energy} in {duration:?} (seed {seed:?})");

        results.solutions.push(solution);
        results.energies.push(energy);
        results.durations.push(duration);
        results.metadata.push(metadata);
    }

    Ok(results)
}

/// One annealing run: build the system, sweep the geometric schedule
/// over all sites in ascending order, return the final assignment.
fn run_sample<L: Label>(
    interaction: &Interaction<L>,
    ranges: &HashMap<L, (i64, i64)>,
    config: &SolverConfig,
    seed: Option<u64>,
) -> Result<(HashMap<L, i64>, f64, SampleMetadata)> {
    let mut system = System::new(interaction, ranges, seed)?;
    let mut kernel = Kernel::from_name(&config.state_updater, system.max_num_states())?;

    let (t_max, t_min) = match (config.t_max, config.t_min) {
        (Some(t_max), Some(t_min)) => (t_max, t_min),
        (t_max, t_min) => {
            let (est_max, est_min) = system.estimate_temperatures()?;
            trace!("estimated temperature bounds [{est_min}, {est_max}]");
            (t_max.unwrap_or(est_max), t_min.unwrap_or(est_min))
        }
    };

    for sweep in 0..config.num_sweeps {
        let temp = schedule::temperature(t_max, t_min, config.num_sweeps, sweep);
        for site in 0..system.size() {
            let next = kernel.propose(&mut system, site, temp);
            system.set_value(site, next);
        }
    }

    let metadata = SampleMetadata {
        num_sweeps: config.num_sweeps,
        state_updater: kernel.name().to_owned(),
        seed,
        t_min,
        t_max,
    };

    Ok((system.state_map(), system.energy(), metadata))
}
