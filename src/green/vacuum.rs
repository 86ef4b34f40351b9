//! Vacuum Green's function.

use crate::cavity::Element;
use crate::error::PcmError;
use crate::green::derivative::{derivative_probe, distance, kernel_value, Derivative, KernelCore};
use crate::green::GreensFunction;
use nalgebra::Vector3;
use num::traits::FloatConst;
use num_dual::DualNum;

/// `G(r1, r2) = 1 / |r1 - r2|`.
///
/// Used as the interior kernel of every solver variant: the solute cavity
/// is empty space as far as the continuum is concerned.
pub struct Vacuum {
    derivative: Derivative,
}

impl Vacuum {
    /// New vacuum kernel with the given derivative strategy.
    pub fn new(derivative: Derivative) -> Self {
        Self { derivative }
    }
}

impl Default for Vacuum {
    fn default() -> Self {
        Self::new(Derivative::default())
    }
}

impl KernelCore for Vacuum {
    fn eval<D: DualNum<f64> + Copy>(&self, source: [D; 3], probe: [D; 3]) -> D {
        D::from(1.0) / distance(source, probe)
    }
}

impl GreensFunction for Vacuum {
    fn kernel_s(&self, source: &Vector3<f64>, probe: &Vector3<f64>) -> f64 {
        kernel_value(self, source, probe)
    }

    fn kernel_d(
        &self,
        direction: &Vector3<f64>,
        source: &Vector3<f64>,
        probe: &Vector3<f64>,
    ) -> f64 {
        derivative_probe(self, self.derivative, direction, source, probe)
    }

    fn uniform_permittivity(&self) -> Option<f64> {
        Some(1.0)
    }

    fn diagonal_single_layer(&self, element: &Element, factor: f64) -> Result<f64, PcmError> {
        Ok(factor * (4.0 * f64::PI() / element.area()).sqrt())
    }

    fn diagonal_double_layer(&self, element: &Element, factor: f64) -> Result<f64, PcmError> {
        Ok(-factor * (f64::PI() / element.area()).sqrt() / element.sphere().radius())
    }

    fn kind(&self) -> &'static str {
        "Vacuum"
    }
}

#[cfg(test)]
mod test {
    use super::Vacuum;
    use crate::green::GreensFunction;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn kernel_is_inverse_distance() {
        let gf = Vacuum::default();
        let a = Vector3::new(0.0, 0.0, 0.0);
        let b = Vector3::new(3.0, 0.0, 4.0);
        assert_relative_eq!(gf.kernel_s(&a, &b), 0.2);
        assert_relative_eq!(gf.kernel_s(&b, &a), 0.2);
    }

    #[test]
    fn double_layer_kernel_sign_on_sphere() {
        // Source and probe on a sphere around the origin, outward normal at
        // the probe: the kernel must be negative.
        let gf = Vacuum::default();
        let source = Vector3::new(2.0, 0.0, 0.0);
        let probe = Vector3::new(0.0, 0.0, 2.0);
        let normal = probe.normalize();
        assert!(gf.kernel_d(&normal, &source, &probe) < 0.0);
    }
}
