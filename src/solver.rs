//! Integral-equation solvers turning boundary potentials into apparent
//! surface charges.

pub mod cpcm;
pub mod ief;
mod operators;
pub mod response;

pub use cpcm::{CpcmSolver, CpcmSolverOptions};
pub use ief::{IefSolver, IefSolverOptions};
pub use response::ResponseSolver;

use crate::error::PcmError;
use nalgebra::DVector;

/// Polarization energy `E = (1/2) asc . mep` for matching element
/// orderings.
pub fn polarization_energy(mep: &DVector<f64>, asc: &DVector<f64>) -> Result<f64, PcmError> {
    if mep.len() != asc.len() {
        return Err(PcmError::DimensionMismatch {
            what: "polarization energy vectors",
            expected: mep.len(),
            actual: asc.len(),
        });
    }
    Ok(0.5 * mep.dot(asc))
}

/// Polarization energy from separate nuclear and electronic components:
/// the sum of the four pairwise cross dot-products, each halved. Equals
/// [`polarization_energy`] of the summed potentials and charges whenever
/// the components sum exactly to the totals.
pub fn polarization_energy_components(
    nuclear_mep: &DVector<f64>,
    electronic_mep: &DVector<f64>,
    nuclear_asc: &DVector<f64>,
    electronic_asc: &DVector<f64>,
) -> Result<f64, PcmError> {
    Ok(polarization_energy(nuclear_mep, nuclear_asc)?
        + polarization_energy(nuclear_mep, electronic_asc)?
        + polarization_energy(electronic_mep, nuclear_asc)?
        + polarization_energy(electronic_mep, electronic_asc)?)
}

#[cfg(test)]
mod test {
    use super::{polarization_energy, polarization_energy_components};
    use approx::assert_relative_eq;
    use nalgebra::DVector;

    #[test]
    fn componentwise_energy_matches_total() {
        let nuclear_mep = DVector::from_vec(vec![1.0, 0.5, -0.25]);
        let electronic_mep = DVector::from_vec(vec![-0.75, 0.1, 0.4]);
        let nuclear_asc = DVector::from_vec(vec![-0.3, 0.2, 0.6]);
        let electronic_asc = DVector::from_vec(vec![0.8, -0.9, 0.05]);
        let total = polarization_energy(
            &(&nuclear_mep + &electronic_mep),
            &(&nuclear_asc + &electronic_asc),
        )
        .unwrap();
        let componentwise = polarization_energy_components(
            &nuclear_mep,
            &electronic_mep,
            &nuclear_asc,
            &electronic_asc,
        )
        .unwrap();
        assert_relative_eq!(total, componentwise, max_relative = 1.0e-14);
    }

    #[test]
    fn mismatched_vectors_error() {
        let a = DVector::from_vec(vec![1.0, 2.0]);
        let b = DVector::from_vec(vec![1.0, 2.0, 3.0]);
        assert!(polarization_energy(&a, &b).is_err());
    }
}
