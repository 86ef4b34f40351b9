//! Ionic liquid (screened Coulomb) Green's function.

use crate::cavity::Element;
use crate::error::PcmError;
use crate::green::derivative::{derivative_probe, distance, kernel_value, Derivative, KernelCore};
use crate::green::GreensFunction;
use nalgebra::Vector3;
use num_dual::DualNum;

/// Yukawa kernel of a uniform ionic solution,
/// `G(r1, r2) = exp(-kappa |r1 - r2|) / (epsilon |r1 - r2|)`.
///
/// No analytic collocation self-term is known for this kernel, so the
/// diagonal requests fail fast; the off-diagonal kernels are exact.
pub struct IonicLiquid {
    epsilon: f64,
    kappa: f64,
    derivative: Derivative,
}

impl IonicLiquid {
    /// New ionic medium with permittivity `epsilon > 0` and inverse Debye
    /// length `kappa >= 0`.
    pub fn new(epsilon: f64, kappa: f64, derivative: Derivative) -> Result<Self, PcmError> {
        if epsilon <= 0.0 {
            return Err(PcmError::Configuration(format!(
                "permittivity must be positive, got {epsilon}"
            )));
        }
        if kappa < 0.0 {
            return Err(PcmError::Configuration(format!(
                "inverse Debye length must be nonnegative, got {kappa}"
            )));
        }
        Ok(Self {
            epsilon,
            kappa,
            derivative,
        })
    }

    /// The medium permittivity.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// The inverse Debye screening length.
    pub fn kappa(&self) -> f64 {
        self.kappa
    }
}

impl KernelCore for IonicLiquid {
    fn eval<D: DualNum<f64> + Copy>(&self, source: [D; 3], probe: [D; 3]) -> D {
        let r = distance(source, probe);
        (-(r * D::from(self.kappa))).exp() / (r * D::from(self.epsilon))
    }
}

impl GreensFunction for IonicLiquid {
    fn kernel_s(&self, source: &Vector3<f64>, probe: &Vector3<f64>) -> f64 {
        kernel_value(self, source, probe)
    }

    fn kernel_d(
        &self,
        direction: &Vector3<f64>,
        source: &Vector3<f64>,
        probe: &Vector3<f64>,
    ) -> f64 {
        self.epsilon * derivative_probe(self, self.derivative, direction, source, probe)
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
        "IonicLiquid"
    }
}

#[cfg(test)]
mod test {
    use super::IonicLiquid;
    use crate::cavity::{Element, Sphere};
    use crate::green::{Derivative, GreensFunction, UniformDielectric};
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn unscreened_limit_is_uniform() {
        let ionic = IonicLiquid::new(78.39, 0.0, Derivative::default()).unwrap();
        let uniform = UniformDielectric::new(78.39, Derivative::default()).unwrap();
        let a = Vector3::new(0.0, 1.0, 0.0);
        let b = Vector3::new(2.0, 0.0, 1.0);
        assert_relative_eq!(
            ionic.kernel_s(&a, &b),
            uniform.kernel_s(&a, &b),
            max_relative = 1.0e-14
        );
    }

    #[test]
    fn screening_damps_the_kernel() {
        let ionic = IonicLiquid::new(80.0, 0.5, Derivative::default()).unwrap();
        let bare = IonicLiquid::new(80.0, 0.0, Derivative::default()).unwrap();
        let a = Vector3::zeros();
        let b = Vector3::new(0.0, 0.0, 3.0);
        assert!(ionic.kernel_s(&a, &b) < bare.kernel_s(&a, &b));
    }

    #[test]
    fn collocation_diagonal_fails_fast() {
        let ionic = IonicLiquid::new(80.0, 0.5, Derivative::default()).unwrap();
        let element = Element::new(
            Vector3::new(0.0, 0.0, 1.0),
            Vector3::new(0.0, 0.0, 1.0),
            0.4,
            Sphere::new(Vector3::zeros(), 1.0),
            0,
        );
        assert!(ionic.diagonal_single_layer(&element, 1.07).is_err());
        assert!(ionic.diagonal_double_layer(&element, 1.07).is_err());
    }
}
