//! Uniform dielectric Green's function.

use crate::cavity::Element;
use crate::error::PcmError;
use crate::green::derivative::{derivative_probe, distance, kernel_value, Derivative, KernelCore};
use crate::green::GreensFunction;
use nalgebra::Vector3;
use num::traits::FloatConst;
use num_dual::DualNum;

/// `G(r1, r2) = 1 / (epsilon * |r1 - r2|)`.
pub struct UniformDielectric {
    epsilon: f64,
    derivative: Derivative,
}

impl UniformDielectric {
    /// New uniform medium of permittivity `epsilon > 0`.
    pub fn new(epsilon: f64, derivative: Derivative) -> Result<Self, PcmError> {
        if epsilon <= 0.0 {
            return Err(PcmError::Configuration(format!(
                "permittivity must be positive, got {epsilon}"
            )));
        }
        Ok(Self {
            epsilon,
            derivative,
        })
    }

    /// The medium permittivity.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl KernelCore for UniformDielectric {
    fn eval<D: DualNum<f64> + Copy>(&self, source: [D; 3], probe: [D; 3]) -> D {
        D::from(1.0) / (distance(source, probe) * D::from(self.epsilon))
    }
}

impl GreensFunction for UniformDielectric {
    fn kernel_s(&self, source: &Vector3<f64>, probe: &Vector3<f64>) -> f64 {
        kernel_value(self, source, probe)
    }

    // The conormal scaling by epsilon cancels the 1/epsilon of the kernel:
    // the double-layer kernel of a uniform medium equals the vacuum one.
    fn kernel_d(
        &self,
        direction: &Vector3<f64>,
        source: &Vector3<f64>,
        probe: &Vector3<f64>,
    ) -> f64 {
        self.epsilon * derivative_probe(self, self.derivative, direction, source, probe)
    }

    fn uniform_permittivity(&self) -> Option<f64> {
        Some(self.epsilon)
    }

    fn diagonal_single_layer(&self, element: &Element, factor: f64) -> Result<f64, PcmError> {
        Ok(factor * (4.0 * f64::PI() / element.area()).sqrt() / self.epsilon)
    }

    fn diagonal_double_layer(&self, element: &Element, factor: f64) -> Result<f64, PcmError> {
        Ok(-factor * (f64::PI() / element.area()).sqrt() / element.sphere().radius())
    }

    fn kind(&self) -> &'static str {
        "UniformDielectric"
    }
}
