//! Error taxonomy of the solver library.

use thiserror::Error;

/// Errors surfaced by kernel evaluation, discretization and the solvers.
///
/// There is no transient-failure class: the library performs no I/O and
/// retries nothing. Every failure propagates synchronously to the caller
/// of the offending operation.
#[derive(Error, Debug)]
pub enum PcmError {
    /// A kernel/operator combination with no known analytic treatment was
    /// requested. Reported at first use, never silently approximated.
    #[error("{operation} not implemented for {kind}")]
    Unimplemented {
        /// The operation that was requested.
        operation: &'static str,
        /// The Green's function or solver kind it was requested for.
        kind: &'static str,
    },

    /// A potential or charge vector does not match the cavity or
    /// symmetry-block dimension it is applied to.
    #[error("dimension mismatch in {what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// What was being dimension-checked.
        what: &'static str,
        /// The dimension required by the cavity or symmetry block.
        expected: usize,
        /// The dimension actually supplied.
        actual: usize,
    },

    /// A system block turned out singular or too ill-conditioned to factor.
    #[error("{what} is singular or numerically not invertible")]
    Singular {
        /// The matrix that failed to factor.
        what: &'static str,
    },

    /// A charge computation was requested before the system matrix was built.
    #[error("{what}: system matrix has not been built")]
    NotBuilt {
        /// The solver that was asked to operate.
        what: &'static str,
    },

    /// A second build was requested on an already built solver.
    #[error("{what}: system matrix has already been built")]
    AlreadyBuilt {
        /// The solver that was asked to rebuild.
        what: &'static str,
    },

    /// Invalid medium parameters, unknown factory labels and similar
    /// configuration mistakes.
    #[error("configuration error: {0}")]
    Configuration(String),
}
