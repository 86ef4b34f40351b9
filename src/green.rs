//! Green's functions of the supported medium models.
//!
//! A Green's function is a pure evaluator of the fundamental electrostatic
//! kernel and its derivatives for one medium. Instances are built once from
//! a medium descriptor (directly or through the [`factory::Factory`]
//! registry) and never mutated; the discretization in [`crate::assembly`]
//! and the solvers in [`crate::solver`] only see the [`GreensFunction`]
//! capability trait.

pub mod anisotropic_liquid;
pub mod derivative;
pub mod factory;
pub mod ionic_liquid;
pub mod metal_sphere;
pub mod profiles;
pub mod spherical_diffuse;
pub mod uniform_dielectric;
pub mod vacuum;

pub use anisotropic_liquid::AnisotropicLiquid;
pub use derivative::Derivative;
pub use factory::{Factory, GreenData};
pub use ionic_liquid::IonicLiquid;
pub use metal_sphere::MetalSphere;
pub use spherical_diffuse::{SphericalDiffuse, SphericalDiffuseOptions};
pub use uniform_dielectric::UniformDielectric;
pub use vacuum::Vacuum;

use crate::cavity::Element;
use crate::error::PcmError;
use nalgebra::Vector3;

/// Capability interface of an electrostatic kernel.
///
/// `kernel_s` is the single-layer kernel, symmetric in its two points for
/// homogeneous media. `kernel_d` is the double-layer kernel: the conormal
/// derivative of the Green's function with respect to the probe point,
/// evaluated along a probe-side direction. The diagonal methods supply the
/// closed-form collocation self-terms; media with no known analytic
/// treatment must fail fast there instead of returning silently wrong
/// numbers.
pub trait GreensFunction: Send + Sync {
    /// Kernel of the single-layer operator.
    fn kernel_s(&self, source: &Vector3<f64>, probe: &Vector3<f64>) -> f64;

    /// Kernel of the double-layer operator with a probe-side `direction`.
    fn kernel_d(&self, direction: &Vector3<f64>, source: &Vector3<f64>, probe: &Vector3<f64>)
        -> f64;

    /// The scalar permittivity of a uniform medium, if this medium is one.
    ///
    /// Solvers use this to pick the isotropic integral-equation route; a
    /// `None` forces the general anisotropic formulation.
    fn uniform_permittivity(&self) -> Option<f64>;

    /// Analytic collocation self-term of the single-layer operator.
    fn diagonal_single_layer(&self, element: &Element, factor: f64) -> Result<f64, PcmError>;

    /// Analytic collocation self-term of the double-layer operator.
    fn diagonal_double_layer(&self, element: &Element, factor: f64) -> Result<f64, PcmError>;

    /// Short label used in diagnostics and error reports.
    fn kind(&self) -> &'static str;
}
