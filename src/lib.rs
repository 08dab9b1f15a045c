//! Simulated annealing for integer-valued quadratic models.
//!
//! A problem is a sparse quadratic form over labeled integer variables:
//! linear terms `(x,) -> h`, pairwise couplings `(x, y) -> J`, and
//! diagonal self-couplings `(x, x) -> S`, with a bounded integer range
//! per variable. [`solve`] anneals one or more independently seeded
//! samples from `T_max` down to `T_min` under a geometric schedule and
//! returns the final assignments with their energies.
//!
//! ```
//! use std::collections::HashMap;
//! use quench::{solve, Interaction, SolverConfig};
//!
//! let mut interaction = Interaction::new();
//! interaction.set(&["x", "y"], -3.0);
//! interaction.set(&["x", "x"], 2.0);
//! interaction.set(&["y", "y"], 2.0);
//! interaction.set(&["x"], -4.0);
//! interaction.set(&["y"], 5.0);
//! let ranges = HashMap::from([("x", (-2, 3)), ("y", (0, 4))]);
//!
//! let config = SolverConfig {
//!     num_sweeps: 50,
//!     num_samples: 4,
//!     state_updater: "HEAT_BATH".to_owned(),
//!     seed: Some(0),
//!     ..Default::default()
//! };
//! let results = solve(&interaction, &ranges, &config)?;
//! assert_eq!(results.len(), 4);
//!
//! let best = results.min_energy_solutions();
//! assert!(best.energies[0] <= results.energies[0]);
//! # Ok::<(), quench::Error>(())
//! ```

mod error;
mod kernel;
mod solver;
mod system;

pub use error::{Error, Result};
pub use kernel::Kernel;
pub use solver::{Results, SampleMetadata, SolverConfig, solve};
pub use system::{Interaction, Label, System, Variable};
