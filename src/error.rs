/// Errors surfaced while building or configuring a solve.
///
/// All variants are construction/configuration failures reported to the
/// caller; nothing is retried or recovered internally.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// An interaction key with an unsupported number of labels.
    #[error("interaction keys must have one or two labels (got {len})")]
    InvalidInteraction { len: usize },

    /// A variable range with `lower > upper`.
    #[error("lower bound {lower} exceeds upper bound {upper}")]
    InvalidDomain { lower: i64, upper: i64 },

    /// An unrecognized state-updater name.
    #[error("unknown state updater '{0}'")]
    UnknownKernel(String),

    /// Temperature estimation on a problem where no single-site move
    /// changes the energy.
    #[error("no single-site move changes the energy; supply explicit T_min and T_max")]
    TrivialProblem,
}

pub type Result<T> = std::result::Result<T, Error>;
