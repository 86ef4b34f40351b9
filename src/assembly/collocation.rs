//! One-point collocation of the single and double layer operators.
//!
//! Off-diagonal entries are plain kernel evaluations at element centroids;
//! the singular diagonal is replaced by the closed-form self-term the
//! kernel provides. Entries are independent, so rows are filled in
//! parallel; both operators are fully populated before they are returned,
//! which is the only ordering guarantee the solvers need.

use crate::cavity::Element;
use crate::error::PcmError;
use crate::green::GreensFunction;
use log::debug;
use nalgebra::DMatrix;
use rayon::prelude::*;

/// Options of the collocation discretization.
#[derive(Clone, Copy, Debug)]
pub struct CollocationOptions {
    /// Empirically tuned correction of the self-terms. Treated as given;
    /// regression tests pin the total apparent charge it produces.
    pub factor: f64,
}

impl Default for CollocationOptions {
    fn default() -> Self {
        Self { factor: 1.07 }
    }
}

/// Dense single-layer matrix: `S[(i, j)] = kernel_s(center_i, center_j)`
/// off-diagonal, analytic self-term on the diagonal.
pub fn single_layer(
    gf: &dyn GreensFunction,
    elements: &[Element],
    options: &CollocationOptions,
) -> Result<DMatrix<f64>, PcmError> {
    let n = elements.len();
    debug!("collocating single layer: {} elements, {}", n, gf.kind());
    let mut diagonal = Vec::with_capacity(n);
    for element in elements {
        diagonal.push(gf.diagonal_single_layer(element, options.factor)?);
    }
    let mut entries = vec![0.0; n * n];
    entries
        .par_chunks_mut(n)
        .enumerate()
        .for_each(|(i, row)| {
            let source = elements[i].center();
            for (j, element) in elements.iter().enumerate() {
                row[j] = if i == j {
                    diagonal[i]
                } else {
                    gf.kernel_s(&source, &element.center())
                };
            }
        });
    Ok(DMatrix::from_row_slice(n, n, &entries))
}

/// Dense double-layer matrix:
/// `D[(i, j)] = kernel_d(normal_j, center_i, center_j)` off-diagonal,
/// analytic self-term on the diagonal.
pub fn double_layer(
    gf: &dyn GreensFunction,
    elements: &[Element],
    options: &CollocationOptions,
) -> Result<DMatrix<f64>, PcmError> {
    let n = elements.len();
    debug!("collocating double layer: {} elements, {}", n, gf.kind());
    let mut diagonal = Vec::with_capacity(n);
    for element in elements {
        diagonal.push(gf.diagonal_double_layer(element, options.factor)?);
    }
    let mut entries = vec![0.0; n * n];
    entries
        .par_chunks_mut(n)
        .enumerate()
        .for_each(|(i, row)| {
            let source = elements[i].center();
            for (j, element) in elements.iter().enumerate() {
                row[j] = if i == j {
                    diagonal[i]
                } else {
                    gf.kernel_d(&element.normal(), &source, &element.center())
                };
            }
        });
    Ok(DMatrix::from_row_slice(n, n, &entries))
}

#[cfg(test)]
mod test {
    use super::{double_layer, single_layer, CollocationOptions};
    use crate::green::{Derivative, IonicLiquid, UniformDielectric, Vacuum};
    use crate::shapes::spherical_cavity;
    use crate::symmetry::PointGroup;
    use approx::assert_relative_eq;

    #[test]
    fn single_layer_is_symmetric_for_uniform_media() {
        let cavity =
            spherical_cavity(2.0, 3, 3, &PointGroup::trivial()).unwrap();
        let gf = UniformDielectric::new(78.39, Derivative::default()).unwrap();
        let s = single_layer(&gf, cavity.elements(), &CollocationOptions::default()).unwrap();
        for i in 0..s.nrows() {
            for j in 0..i {
                assert_relative_eq!(s[(i, j)], s[(j, i)], max_relative = 1.0e-12);
            }
        }
    }

    #[test]
    fn double_layer_is_not_symmetric() {
        let cavity = spherical_cavity(2.0, 3, 3, &PointGroup::trivial()).unwrap();
        let gf = Vacuum::default();
        let d = double_layer(&gf, cavity.elements(), &CollocationOptions::default()).unwrap();
        let mut max_asymmetry: f64 = 0.0;
        for i in 0..d.nrows() {
            for j in 0..i {
                max_asymmetry = max_asymmetry.max((d[(i, j)] - d[(j, i)]).abs());
            }
        }
        assert!(max_asymmetry > 1.0e-8);
    }

    /// Gauss' theorem on the sphere: the rows of D * diag(areas) must sum
    /// to about -2 pi for an observation point on the surface.
    #[test]
    fn double_layer_row_sums_approach_minus_two_pi() {
        let cavity = spherical_cavity(2.0, 6, 6, &PointGroup::trivial()).unwrap();
        let gf = Vacuum::default();
        let d = double_layer(&gf, cavity.elements(), &CollocationOptions::default()).unwrap();
        let areas = cavity.areas();
        for i in 0..d.nrows() {
            let mut sum = 0.0;
            for j in 0..d.ncols() {
                sum += d[(i, j)] * areas[j];
            }
            assert_relative_eq!(sum, -2.0 * std::f64::consts::PI, max_relative = 0.1);
        }
    }

    #[test]
    fn unimplemented_diagonal_surfaces_at_assembly() {
        let cavity = spherical_cavity(2.0, 2, 2, &PointGroup::trivial()).unwrap();
        let gf = IonicLiquid::new(78.39, 0.1, Derivative::default()).unwrap();
        assert!(single_layer(&gf, cavity.elements(), &CollocationOptions::default()).is_err());
        assert!(double_layer(&gf, cavity.elements(), &CollocationOptions::default()).is_err());
    }
}
