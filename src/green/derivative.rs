//! Derivative strategies for kernel evaluation.
//!
//! Every kernel core is written once, generically over a dual-number
//! scalar; seeding the dual components then produces first or second
//! derivatives from the same code path that produces the plain value.

use crate::utils::three_point_stencil;
use nalgebra::Vector3;
use num_dual::{first_derivative, second_derivative, Dual2_64, Dual64, DualNum};

/// How much differential information a kernel evaluation carries.
///
/// Chosen once per kernel instance and fixed for its lifetime. All
/// strategies agree on the values they produce; they differ in how the
/// probe-side derivative is obtained.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Derivative {
    /// Central finite differences of the plain kernel value.
    Numerical,
    /// One first-order dual evaluation seeded along the direction.
    #[default]
    Directional,
    /// Full gradient from basis-seeded dual evaluations, contracted with
    /// the direction.
    Gradient,
    /// Second-order dual evaluation; the first-derivative slot is read.
    Hessian,
}

/// Stencil half-width of the [`Derivative::Numerical`] strategy.
const STENCIL_STEP: f64 = 1.0e-4;

/// A kernel body evaluable on dual numbers.
pub(crate) trait KernelCore {
    fn eval<D: DualNum<f64> + Copy>(&self, source: [D; 3], probe: [D; 3]) -> D;
}

/// Euclidean distance between two dual-valued points.
pub(crate) fn distance<D: DualNum<f64> + Copy>(a: [D; 3], b: [D; 3]) -> D {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Plain value of the kernel core.
pub(crate) fn kernel_value<K: KernelCore>(
    core: &K,
    source: &Vector3<f64>,
    probe: &Vector3<f64>,
) -> f64 {
    core.eval::<f64>(
        [source.x, source.y, source.z],
        [probe.x, probe.y, probe.z],
    )
}

/// Directional derivative of the kernel with respect to the probe point.
///
/// `direction` need not be normalized: the derivative scales with its
/// length, which the anisotropic conormal evaluation relies on.
pub(crate) fn derivative_probe<K: KernelCore>(
    core: &K,
    strategy: Derivative,
    direction: &Vector3<f64>,
    source: &Vector3<f64>,
    probe: &Vector3<f64>,
) -> f64 {
    match strategy {
        Derivative::Numerical => three_point_stencil(
            |p| kernel_value(core, source, p),
            probe,
            direction,
            STENCIL_STEP,
        ),
        Derivative::Directional => {
            let (_, deriv) = first_derivative(
                |t: Dual64| eval_shifted(core, t, direction, source, probe),
                0.0,
            );
            deriv
        }
        Derivative::Gradient => {
            let mut contracted = 0.0;
            for axis in 0..3 {
                let mut basis = Vector3::zeros();
                basis[axis] = 1.0;
                let (_, deriv) = first_derivative(
                    |t: Dual64| eval_shifted(core, t, &basis, source, probe),
                    0.0,
                );
                contracted += deriv * direction[axis];
            }
            contracted
        }
        Derivative::Hessian => {
            let (_, deriv, _) = second_derivative(
                |t: Dual2_64| eval_shifted(core, t, direction, source, probe),
                0.0,
            );
            deriv
        }
    }
}

fn eval_shifted<K: KernelCore, D: DualNum<f64> + Copy>(
    core: &K,
    t: D,
    direction: &Vector3<f64>,
    source: &Vector3<f64>,
    probe: &Vector3<f64>,
) -> D {
    let s = [D::from(source.x), D::from(source.y), D::from(source.z)];
    let p = [
        D::from(probe.x) + t * D::from(direction.x),
        D::from(probe.y) + t * D::from(direction.y),
        D::from(probe.z) + t * D::from(direction.z),
    ];
    core.eval(s, p)
}
