//! Conductor-like screening solver.

use crate::assembly::collocation::{single_layer, CollocationOptions};
use crate::cavity::Cavity;
use crate::error::PcmError;
use crate::green::GreensFunction;
use crate::solver::ief::charge_from_blocks;
use crate::symmetry::{symmetry_blocking, symmetry_packing};
use crate::utils::hermitivitize;
use itertools::iproduct;
use log::debug;
use nalgebra::{DMatrix, DVector};

/// Options of the conductor-like solver.
#[derive(Clone, Copy, Debug)]
pub struct CpcmSolverOptions {
    /// Symmetrize the charge operator as `(K + K^t) / 2`.
    pub hermitivitize: bool,
    /// Dielectric scaling correction `k` in `f(eps) = (eps - 1) / (eps + k)`.
    pub correction: f64,
    /// Discretization options.
    pub collocation: CollocationOptions,
}

impl Default for CpcmSolverOptions {
    fn default() -> Self {
        Self {
            hermitivitize: true,
            correction: 0.0,
            collocation: CollocationOptions::default(),
        }
    }
}

/// Conductor-like variant: the interior single-layer operator scaled by a
/// permittivity-dependent factor stands in for the full integral
/// equation; the double-layer operators never enter.
pub struct CpcmSolver {
    options: CpcmSolverOptions,
    built: bool,
    cavity_size: usize,
    irreducible_size: usize,
    nr_irrep: usize,
    blocks: Vec<DMatrix<f64>>,
    full: DMatrix<f64>,
}

impl CpcmSolver {
    /// A fresh, unbuilt solver.
    pub fn new(options: CpcmSolverOptions) -> Self {
        Self {
            options,
            built: false,
            cavity_size: 0,
            irreducible_size: 0,
            nr_irrep: 1,
            blocks: Vec::new(),
            full: DMatrix::zeros(0, 0),
        }
    }

    /// Whether the system matrix has been assembled.
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Assemble `K = f(eps) S^-1`, blocked by irreducible representation.
    ///
    /// The exterior medium must expose a scalar permittivity; the
    /// conductor-like screening is undefined for anything else.
    pub fn build_system_matrix(
        &mut self,
        cavity: &Cavity,
        inside: &dyn GreensFunction,
        outside: &dyn GreensFunction,
    ) -> Result<(), PcmError> {
        if self.built {
            return Err(PcmError::AlreadyBuilt { what: "CpcmSolver" });
        }
        let epsilon = outside
            .uniform_permittivity()
            .ok_or(PcmError::Unimplemented {
                operation: "conductor-like screening",
                kind: outside.kind(),
            })?;
        let factor = (epsilon - 1.0) / (epsilon + self.options.correction);

        let nr_irrep = cavity.point_group().nr_irrep();
        let irreducible = cavity.irreducible_size();
        let size = cavity.size();

        let mut s = single_layer(inside, cavity.elements(), &self.options.collocation)?;
        if nr_irrep > 1 {
            symmetry_blocking(&mut s, irreducible, nr_irrep);
        }
        let s_blocks = symmetry_packing(&s, irreducible, nr_irrep);

        let mut blocks = Vec::with_capacity(nr_irrep);
        for s_b in &s_blocks {
            let inverse = s_b.clone().lu().try_inverse().ok_or(PcmError::Singular {
                what: "CPCM single-layer block",
            })?;
            let mut k = inverse * factor;
            if self.options.hermitivitize {
                hermitivitize(&mut k);
            }
            blocks.push(k);
        }

        let mut full = DMatrix::zeros(size, size);
        for (b, block) in blocks.iter().enumerate() {
            let off = b * irreducible;
            for (p, q) in iproduct!(0..irreducible, 0..irreducible) {
                full[(off + p, off + q)] = block[(p, q)];
            }
        }

        debug!(
            "CPCM system built: {} elements, factor {:.6}",
            size, factor
        );
        self.cavity_size = size;
        self.irreducible_size = irreducible;
        self.nr_irrep = nr_irrep;
        self.blocks = blocks;
        self.full = full;
        self.built = true;
        Ok(())
    }

    /// Apparent surface charge in the totally symmetric representation.
    pub fn compute_charge(&self, mep: &DVector<f64>) -> Result<DVector<f64>, PcmError> {
        self.compute_charge_irrep(mep, 0)
    }

    /// Apparent surface charge restricted to one irreducible
    /// representation; same conventions as the IEF solver.
    pub fn compute_charge_irrep(
        &self,
        mep: &DVector<f64>,
        irrep: usize,
    ) -> Result<DVector<f64>, PcmError> {
        charge_from_blocks(
            "CpcmSolver",
            &self.blocks,
            self.built,
            self.cavity_size,
            self.irreducible_size,
            mep,
            irrep,
        )
    }

    /// Read-only view of the assembled (block-diagonal) charge operator.
    pub fn system_matrix(&self) -> Result<&DMatrix<f64>, PcmError> {
        if !self.built {
            return Err(PcmError::NotBuilt { what: "CpcmSolver" });
        }
        Ok(&self.full)
    }

    /// Read-only view of one irreducible block of the charge operator.
    pub fn block(&self, irrep: usize) -> Result<&DMatrix<f64>, PcmError> {
        if !self.built {
            return Err(PcmError::NotBuilt { what: "CpcmSolver" });
        }
        self.blocks.get(irrep).ok_or(PcmError::DimensionMismatch {
            what: "irreducible representation index",
            expected: self.nr_irrep,
            actual: irrep,
        })
    }
}
