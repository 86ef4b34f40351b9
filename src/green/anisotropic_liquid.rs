//! Anisotropic dielectric Green's function.

use crate::cavity::Element;
use crate::error::PcmError;
use crate::green::derivative::{derivative_probe, kernel_value, Derivative, KernelCore};
use crate::green::GreensFunction;
use nalgebra::{Matrix3, Vector3};
use num_dual::DualNum;

/// Green's function of a medium with a symmetric permittivity tensor,
/// `G(r1, r2) = (det eps)^(-1/2) * (r12^t eps^(-1) r12)^(-1/2)`.
///
/// The double-layer kernel is the conormal derivative: the gradient with
/// respect to the probe point contracted with `eps * direction`. No
/// analytic collocation self-term is known, so the diagonal requests fail
/// fast.
pub struct AnisotropicLiquid {
    epsilon: Matrix3<f64>,
    inverse: Matrix3<f64>,
    det_sqrt: f64,
    derivative: Derivative,
}

impl AnisotropicLiquid {
    /// New anisotropic medium from a symmetric positive-definite tensor.
    pub fn new(epsilon: Matrix3<f64>, derivative: Derivative) -> Result<Self, PcmError> {
        if (epsilon - epsilon.transpose()).norm() > 1.0e-12 * epsilon.norm() {
            return Err(PcmError::Configuration(
                "permittivity tensor must be symmetric".to_string(),
            ));
        }
        let det = epsilon.determinant();
        if det <= 0.0 {
            return Err(PcmError::Configuration(format!(
                "permittivity tensor must have positive determinant, got {det}"
            )));
        }
        let inverse = epsilon.try_inverse().ok_or_else(|| {
            PcmError::Configuration("permittivity tensor is not invertible".to_string())
        })?;
        Ok(Self {
            epsilon,
            inverse,
            det_sqrt: det.sqrt(),
            derivative,
        })
    }
}

impl KernelCore for AnisotropicLiquid {
    fn eval<D: DualNum<f64> + Copy>(&self, source: [D; 3], probe: [D; 3]) -> D {
        let diff = [
            source[0] - probe[0],
            source[1] - probe[1],
            source[2] - probe[2],
        ];
        let mut quadratic = D::from(0.0);
        for i in 0..3 {
            for j in 0..3 {
                quadratic = quadratic + diff[i] * diff[j] * D::from(self.inverse[(i, j)]);
            }
        }
        D::from(1.0 / self.det_sqrt) / quadratic.sqrt()
    }
}

impl GreensFunction for AnisotropicLiquid {
    fn kernel_s(&self, source: &Vector3<f64>, probe: &Vector3<f64>) -> f64 {
        kernel_value(self, source, probe)
    }

    fn kernel_d(
        &self,
        direction: &Vector3<f64>,
        source: &Vector3<f64>,
        probe: &Vector3<f64>,
    ) -> f64 {
        let conormal = self.epsilon * direction;
        derivative_probe(self, self.derivative, &conormal, source, probe)
    }

    fn uniform_permittivity(&self) -> Option<f64> {
        None
    }

    fn diagonal_single_layer(&self, _element: &Element, _factor: f64) -> Result<f64, PcmError> {
        Err(PcmError::Unimplemented {
            operation: "collocation single-layer diagonal",
            kind: self.kind(),
        })
    }

    fn diagonal_double_layer(&self, _element: &Element, _factor: f64) -> Result<f64, PcmError> {
        Err(PcmError::Unimplemented {
            operation: "collocation double-layer diagonal",
            kind: self.kind(),
        })
    }

    fn kind(&self) -> &'static str {
        "AnisotropicLiquid"
    }
}
