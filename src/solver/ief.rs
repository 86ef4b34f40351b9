//! Integral Equation Formalism solver.

use crate::assembly::collocation::{double_layer, single_layer, CollocationOptions};
use crate::cavity::Cavity;
use crate::error::PcmError;
use crate::green::GreensFunction;
use crate::solver::operators;
use crate::symmetry::{symmetry_blocking, symmetry_packing};
use crate::utils::hermitivitize;
use itertools::iproduct;
use log::debug;
use nalgebra::{DMatrix, DVector};

/// Options of the IEF solver.
#[derive(Clone, Copy, Debug)]
pub struct IefSolverOptions {
    /// Symmetrize the charge operator as `(K + K^t) / 2`: trades a little
    /// exactness for symmetric numerical behavior in iterative host uses.
    pub hermitivitize: bool,
    /// Discretization options.
    pub collocation: CollocationOptions,
}

impl Default for IefSolverOptions {
    fn default() -> Self {
        Self {
            hermitivitize: true,
            collocation: CollocationOptions::default(),
        }
    }
}

/// Boundary-element solver for the integral equation formalism.
///
/// One-way state machine: a fresh solver is unbuilt; `build_system_matrix`
/// moves it to the built state exactly once, after which any number of
/// charge computations may run against the assembled operator. Rebuilding
/// requires a new instance.
///
/// When the cavity carries a non-trivial point group the operator is
/// assembled blocked by irreducible representation and each small block is
/// factored independently.
pub struct IefSolver {
    options: IefSolverOptions,
    built: bool,
    cavity_size: usize,
    irreducible_size: usize,
    nr_irrep: usize,
    blocks: Vec<DMatrix<f64>>,
    full: DMatrix<f64>,
}

impl IefSolver {
    /// A fresh, unbuilt solver.
    pub fn new(options: IefSolverOptions) -> Self {
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

    /// Assemble and factor the charge operator `K` with `asc = -K mep`.
    ///
    /// The isotropic route applies when the exterior medium is uniform;
    /// any other exterior kernel goes through the full anisotropic
    /// formulation with explicit exterior operators.
    pub fn build_system_matrix(
        &mut self,
        cavity: &Cavity,
        inside: &dyn GreensFunction,
        outside: &dyn GreensFunction,
    ) -> Result<(), PcmError> {
        if self.built {
            return Err(PcmError::AlreadyBuilt { what: "IefSolver" });
        }
        let elements = cavity.elements();
        let nr_irrep = cavity.point_group().nr_irrep();
        let irreducible = cavity.irreducible_size();
        let size = cavity.size();

        let mut si = single_layer(inside, elements, &self.options.collocation)?;
        let mut di = double_layer(inside, elements, &self.options.collocation)?;
        let exterior_epsilon = outside.uniform_permittivity();
        let (mut se, mut de) = if exterior_epsilon.is_none() {
            (
                Some(single_layer(outside, elements, &self.options.collocation)?),
                Some(double_layer(outside, elements, &self.options.collocation)?),
            )
        } else {
            (None, None)
        };

        if nr_irrep > 1 {
            debug!("blocking operators over {} irreps", nr_irrep);
            symmetry_blocking(&mut si, irreducible, nr_irrep);
            symmetry_blocking(&mut di, irreducible, nr_irrep);
            if let Some(se) = se.as_mut() {
                symmetry_blocking(se, irreducible, nr_irrep);
            }
            if let Some(de) = de.as_mut() {
                symmetry_blocking(de, irreducible, nr_irrep);
            }
        }
        let si_blocks = symmetry_packing(&si, irreducible, nr_irrep);
        let di_blocks = symmetry_packing(&di, irreducible, nr_irrep);
        let se_blocks = se.map(|m| symmetry_packing(&m, irreducible, nr_irrep));
        let de_blocks = de.map(|m| symmetry_packing(&m, irreducible, nr_irrep));

        // Image elements have the areas of their representatives, so one
        // irreducible area vector serves every block.
        let areas_full = cavity.areas();
        let areas = DVector::from_fn(irreducible, |p, _| areas_full[p]);

        if let Some(epsilon) = exterior_epsilon {
            if (epsilon - 1.0).abs() < 1.0e-12 {
                return Err(PcmError::Configuration(
                    "isotropic IEF needs an exterior permittivity different from 1".to_string(),
                ));
            }
        }

        let mut blocks = Vec::with_capacity(nr_irrep);
        for b in 0..nr_irrep {
            let (t, r) = match exterior_epsilon {
                Some(epsilon) => (
                    operators::isotropic_t(&si_blocks[b], &di_blocks[b], &areas, epsilon),
                    operators::isotropic_r(&di_blocks[b], &areas),
                ),
                None => {
                    let se_b = &se_blocks.as_ref().expect("exterior blocks assembled")[b];
                    let de_b = &de_blocks.as_ref().expect("exterior blocks assembled")[b];
                    (
                        operators::anisotropic_t(
                            &si_blocks[b],
                            &di_blocks[b],
                            se_b,
                            de_b,
                            &areas,
                        ),
                        operators::anisotropic_r(
                            &si_blocks[b],
                            &di_blocks[b],
                            se_b,
                            de_b,
                            &areas,
                        )?,
                    )
                }
            };
            let mut k = t.lu().solve(&r).ok_or(PcmError::Singular {
                what: "IEF system block",
            })?;
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
            "IEF system built: {} elements, {} blocks of {}",
            size, nr_irrep, irreducible
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
    /// representation.
    ///
    /// `mep` is either the full cavity vector (the matching segment is
    /// selected) or already the irreducible segment. The result is a
    /// full-dimension vector, nonzero only on the block of `irrep`; the
    /// symmetry normalization is carried by the blocking transform, so the
    /// physical total charge is `sum(asc) * nr_irrep`.
    pub fn compute_charge_irrep(
        &self,
        mep: &DVector<f64>,
        irrep: usize,
    ) -> Result<DVector<f64>, PcmError> {
        charge_from_blocks(
            "IefSolver",
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
            return Err(PcmError::NotBuilt { what: "IefSolver" });
        }
        Ok(&self.full)
    }

    /// Read-only view of one irreducible block of the charge operator.
    pub fn block(&self, irrep: usize) -> Result<&DMatrix<f64>, PcmError> {
        if !self.built {
            return Err(PcmError::NotBuilt { what: "IefSolver" });
        }
        self.blocks.get(irrep).ok_or(PcmError::DimensionMismatch {
            what: "irreducible representation index",
            expected: self.nr_irrep,
            actual: irrep,
        })
    }
}

/// Shared charge-from-potential application for the block solvers:
/// `asc_block = -K_irrep * mep_irrep`, embedded in a full-size vector.
pub(crate) fn charge_from_blocks(
    what: &'static str,
    blocks: &[DMatrix<f64>],
    built: bool,
    cavity_size: usize,
    irreducible_size: usize,
    mep: &DVector<f64>,
    irrep: usize,
) -> Result<DVector<f64>, PcmError> {
    if !built {
        return Err(PcmError::NotBuilt { what });
    }
    if irrep >= blocks.len() {
        return Err(PcmError::DimensionMismatch {
            what: "irreducible representation index",
            expected: blocks.len(),
            actual: irrep,
        });
    }
    let offset = irrep * irreducible_size;
    let segment = if mep.len() == cavity_size {
        DVector::from_fn(irreducible_size, |p, _| mep[offset + p])
    } else if mep.len() == irreducible_size {
        mep.clone()
    } else {
        return Err(PcmError::DimensionMismatch {
            what: "potential vector",
            expected: cavity_size,
            actual: mep.len(),
        });
    };
    let block_charge = -(&blocks[irrep] * segment);
    let mut charge = DVector::zeros(cavity_size);
    for p in 0..irreducible_size {
        charge[offset + p] = block_charge[p];
    }
    Ok(charge)
}
