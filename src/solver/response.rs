//! Non-equilibrium (response) charge computations.
//!
//! Fast solvent degrees of freedom follow a sudden change of the solute
//! density with the dynamic (optical) permittivity instead of the static
//! one. The response solver carries the static operator and, when a
//! dynamic exterior medium is supplied, a second operator built from it;
//! response requests use the dynamic operator when present and fall back
//! to the static one otherwise.

use crate::cavity::Cavity;
use crate::error::PcmError;
use crate::green::GreensFunction;
use crate::solver::ief::{IefSolver, IefSolverOptions};
use nalgebra::DVector;

/// An IEF solver pair for equilibrium and response charges.
pub struct ResponseSolver {
    static_solver: IefSolver,
    dynamic_solver: Option<IefSolver>,
}

impl ResponseSolver {
    /// Build the static operator and, if a dynamic exterior medium is
    /// given, the dynamic one, over the same cavity and interior kernel.
    pub fn build(
        cavity: &Cavity,
        inside: &dyn GreensFunction,
        outside_static: &dyn GreensFunction,
        outside_dynamic: Option<&dyn GreensFunction>,
        options: IefSolverOptions,
    ) -> Result<Self, PcmError> {
        let mut static_solver = IefSolver::new(options);
        static_solver.build_system_matrix(cavity, inside, outside_static)?;
        let dynamic_solver = match outside_dynamic {
            Some(outside) => {
                let mut solver = IefSolver::new(options);
                solver.build_system_matrix(cavity, inside, outside)?;
                Some(solver)
            }
            None => None,
        };
        Ok(Self {
            static_solver,
            dynamic_solver,
        })
    }

    /// Equilibrium charge from the static operator.
    pub fn compute_charge(
        &self,
        mep: &DVector<f64>,
        irrep: usize,
    ) -> Result<DVector<f64>, PcmError> {
        self.static_solver.compute_charge_irrep(mep, irrep)
    }

    /// Response charge: dynamic operator when built, static fallback
    /// otherwise.
    pub fn compute_response_charge(
        &self,
        mep: &DVector<f64>,
        irrep: usize,
    ) -> Result<DVector<f64>, PcmError> {
        match &self.dynamic_solver {
            Some(solver) => solver.compute_charge_irrep(mep, irrep),
            None => self.static_solver.compute_charge_irrep(mep, irrep),
        }
    }

    /// The underlying static solver.
    pub fn static_solver(&self) -> &IefSolver {
        &self.static_solver
    }

    /// Whether a dynamic operator is available.
    pub fn has_dynamic(&self) -> bool {
        self.dynamic_solver.is_some()
    }
}
