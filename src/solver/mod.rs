mod schedule;
mod solver;

pub use solver::{Results, SampleMetadata, SolverConfig, solve};
