//! Green's function of a solvated metallic nanoparticle.

use crate::cavity::Element;
use crate::error::PcmError;
use crate::green::derivative::{derivative_probe, distance, kernel_value, Derivative, KernelCore};
use crate::green::GreensFunction;
use nalgebra::Vector3;
use num::complex::Complex64;
use num_dual::DualNum;

/// Default truncation of the multipole image series.
const DEFAULT_MAX_L: usize = 200;

/// Solvent of permittivity `epsilon_solvent` containing a metal sphere of
/// complex permittivity `epsilon_metal` and radius `radius` at `center`:
///
/// ```text
/// G = 1 / (eps_S r12)
///   + sum_L Re[ L (eps_S - eps_M) / (L eps_M + (L+1) eps_S) ]
///     * a^(2L+1) / (eps_S (r1 r2)^(L+1)) * P_L(cos gamma)
/// ```
///
/// with `r1`, `r2` the distances of the two points from the sphere center.
/// The multipole coefficients are complex because the metal permittivity
/// is; their real parts are folded into the series at construction. The
/// L = 0 coefficient vanishes: the nanoparticle carries no net charge.
/// Both evaluation points must lie outside the metal sphere, otherwise
/// the series does not converge.
///
/// No analytic collocation self-term is known, so the diagonal requests
/// fail fast.
pub struct MetalSphere {
    epsilon_solvent: f64,
    epsilon_metal: Complex64,
    radius: f64,
    center: Vector3<f64>,
    coefficients: Vec<f64>,
    derivative: Derivative,
}

impl MetalSphere {
    /// New metal-sphere kernel with the default series truncation.
    pub fn new(
        epsilon_solvent: f64,
        epsilon_metal: Complex64,
        radius: f64,
        center: Vector3<f64>,
        derivative: Derivative,
    ) -> Result<Self, PcmError> {
        if epsilon_solvent <= 0.0 {
            return Err(PcmError::Configuration(format!(
                "solvent permittivity must be positive, got {epsilon_solvent}"
            )));
        }
        if radius <= 0.0 {
            return Err(PcmError::Configuration(format!(
                "sphere radius must be positive, got {radius}"
            )));
        }
        let mut sphere = Self {
            epsilon_solvent,
            epsilon_metal,
            radius,
            center,
            coefficients: Vec::new(),
            derivative,
        };
        sphere.truncate_series(DEFAULT_MAX_L);
        Ok(sphere)
    }

    /// Change the truncation of the image series.
    pub fn with_max_l(mut self, max_l: usize) -> Self {
        self.truncate_series(max_l);
        self
    }

    fn truncate_series(&mut self, max_l: usize) {
        let eps_s = Complex64::from(self.epsilon_solvent);
        let eps_m = self.epsilon_metal;
        self.coefficients = (0..=max_l)
            .map(|l| {
                let lc = Complex64::from(l as f64);
                let numerator = lc * (eps_s - eps_m);
                let denominator = lc * eps_m + (lc + 1.0) * eps_s;
                (numerator / denominator).re / self.epsilon_solvent
            })
            .collect();
    }
}

impl KernelCore for MetalSphere {
    fn eval<D: DualNum<f64> + Copy>(&self, source: [D; 3], probe: [D; 3]) -> D {
        let center = [
            D::from(self.center.x),
            D::from(self.center.y),
            D::from(self.center.z),
        ];
        let r1 = distance(source, center);
        let r2 = distance(probe, center);
        let r12 = distance(source, probe);
        let mut dot = D::from(0.0);
        for axis in 0..3 {
            dot = dot + (source[axis] - center[axis]) * (probe[axis] - center[axis]);
        }
        let cos_gamma = dot / (r1 * r2);

        let mut green = D::from(1.0 / self.epsilon_solvent) / r12;
        let base = D::from(self.radius * self.radius) / (r1 * r2);
        let mut radial = D::from(self.radius) / (r1 * r2);
        let mut p_prev = D::from(1.0);
        let mut p_curr = cos_gamma;
        for (l, coefficient) in self.coefficients.iter().enumerate() {
            let p_l = if l == 0 { p_prev } else { p_curr };
            green = green + radial * p_l * D::from(*coefficient);
            radial = radial * base;
            if l >= 1 {
                let lf = l as f64;
                let next = (cos_gamma * p_curr * D::from(2.0 * lf + 1.0)
                    - p_prev * D::from(lf))
                    / D::from(lf + 1.0);
                p_prev = p_curr;
                p_curr = next;
            }
        }
        green
    }
}

impl GreensFunction for MetalSphere {
    fn kernel_s(&self, source: &Vector3<f64>, probe: &Vector3<f64>) -> f64 {
        kernel_value(self, source, probe)
    }

    fn kernel_d(
        &self,
        direction: &Vector3<f64>,
        source: &Vector3<f64>,
        probe: &Vector3<f64>,
    ) -> f64 {
        self.epsilon_solvent * derivative_probe(self, self.derivative, direction, source, probe)
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
        "MetalSphere"
    }
}
