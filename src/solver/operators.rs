//! Assembly of the integral-equation operator combinations from the
//! discretized single and double layer blocks.

use crate::error::PcmError;
use nalgebra::{DMatrix, DVector};
use num::traits::FloatConst;

fn two_pi() -> f64 {
    2.0 * f64::PI()
}

/// `M * diag(areas)`.
pub(crate) fn scale_columns(matrix: &DMatrix<f64>, areas: &DVector<f64>) -> DMatrix<f64> {
    let mut scaled = matrix.clone();
    for (j, mut column) in scaled.column_iter_mut().enumerate() {
        column *= areas[j];
    }
    scaled
}

/// `diag(areas) * M`.
pub(crate) fn scale_rows(matrix: &DMatrix<f64>, areas: &DVector<f64>) -> DMatrix<f64> {
    let mut scaled = matrix.clone();
    for (i, mut row) in scaled.row_iter_mut().enumerate() {
        row *= areas[i];
    }
    scaled
}

/// Isotropic IEF operator `T = (2 pi f I - D_I A) S_I` with
/// `f = (eps + 1) / (eps - 1)`.
pub(crate) fn isotropic_t(
    si: &DMatrix<f64>,
    di: &DMatrix<f64>,
    areas: &DVector<f64>,
    epsilon: f64,
) -> DMatrix<f64> {
    let factor = (epsilon + 1.0) / (epsilon - 1.0);
    let da = scale_columns(di, areas);
    si * (two_pi() * factor) - da * si
}

/// Isotropic right-hand operator `R = 2 pi I - D_I A`.
pub(crate) fn isotropic_r(di: &DMatrix<f64>, areas: &DVector<f64>) -> DMatrix<f64> {
    let n = di.nrows();
    DMatrix::identity(n, n) * two_pi() - scale_columns(di, areas)
}

/// Anisotropic IEF operator
/// `T = (2 pi I - D_E A) S_I + S_E (2 pi I + A D_I^t)`.
pub(crate) fn anisotropic_t(
    si: &DMatrix<f64>,
    di: &DMatrix<f64>,
    se: &DMatrix<f64>,
    de: &DMatrix<f64>,
    areas: &DVector<f64>,
) -> DMatrix<f64> {
    let dea = scale_columns(de, areas);
    let adit = scale_rows(&di.transpose(), areas);
    si * two_pi() - dea * si + se * two_pi() + se * adit
}

/// Anisotropic right-hand operator
/// `R = (2 pi I - D_E A) - S_E S_I^-1 (2 pi I - D_I A)`.
pub(crate) fn anisotropic_r(
    si: &DMatrix<f64>,
    di: &DMatrix<f64>,
    se: &DMatrix<f64>,
    de: &DMatrix<f64>,
    areas: &DVector<f64>,
) -> Result<DMatrix<f64>, PcmError> {
    let n = si.nrows();
    let identity = DMatrix::identity(n, n);
    let inner = &identity * two_pi() - scale_columns(di, areas);
    let solved = si
        .clone()
        .lu()
        .solve(&inner)
        .ok_or(PcmError::Singular {
            what: "interior single-layer block",
        })?;
    Ok(identity * two_pi() - scale_columns(de, areas) - se * solved)
}
