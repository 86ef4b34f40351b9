//! Green's function of a radially diffuse dielectric interface.
//!
//! The medium permittivity varies smoothly along the radius of a layer
//! centered at `origin` (solvated nanodroplets, liquid-liquid interfaces
//! wrapped around the solute). The Green's function of such a medium has
//! no closed form; it is built from the radial solutions of
//!
//! ```text
//! (eps(r) r^2 u')' = eps(r) L (L+1) u
//! ```
//!
//! one pair per angular momentum: `u_L` regular at the origin (stored as
//! `zeta_L = ln u_L`) and `v_L` regular at infinity (stored as
//! `omega_L = ln v_L`), integrated once at construction with fixed-step
//! RK4 on a logarithmic radial grid and interpolated by cubic splines.
//!
//! The kernel itself is evaluated in separated form,
//!
//! ```text
//! G(r1, r2) = 1 / (C(r1, r2) |r1 - r2|)  +  image(r1, r2)
//! ```
//!
//! where the Coulomb singularity separation coefficient `C` is obtained
//! from the radial solution at a large angular momentum and the image
//! (nonsingular) part is the remainder of the Legendre series. The
//! separation matters twice: the collocation diagonal needs the two parts
//! individually, and their directional derivatives can be formed by a
//! stencil because each part is smooth — the full kernel could not be
//! differenced across its singularity without losing precision.

use crate::cavity::Element;
use crate::error::PcmError;
use crate::green::profiles::PermittivityProfile;
use crate::green::GreensFunction;
use crate::utils::{legendre, three_point_stencil, CubicSpline};
use log::debug;
use nalgebra::Vector3;
use num::traits::FloatConst;

/// Numerical parameters of the radial machinery.
#[derive(Clone, Copy, Debug)]
pub struct SphericalDiffuseOptions {
    /// Highest angular momentum kept in the image-potential series.
    pub max_l_green: usize,
    /// Angular momentum at which the Coulomb separation coefficient is
    /// extracted; must exceed `max_l_green`.
    pub max_l_coulomb: usize,
    /// Inner end of the radial grid.
    pub r_min: f64,
    /// Outer end of the radial grid; every kernel evaluation point must
    /// fall strictly inside `(r_min, r_max)`.
    pub r_max: f64,
    /// Number of radial grid nodes.
    pub grid_points: usize,
    /// Half-width of the stencil used for directional derivatives of the
    /// separated parts.
    pub stencil_step: f64,
}

impl Default for SphericalDiffuseOptions {
    fn default() -> Self {
        Self {
            max_l_green: 30,
            max_l_coulomb: 200,
            r_min: 0.01,
            r_max: 200.0,
            grid_points: 10_000,
            stencil_step: 1.0e-3,
        }
    }
}

/// One tabulated radial solution in logarithmic form.
struct RadialSolution {
    /// `ln u` as a function of `x = ln r`.
    log_value: CubicSpline,
    /// `d ln u / d x = r u' / u`.
    log_slope: CubicSpline,
}

impl RadialSolution {
    fn evaluate(&self, r: f64) -> (f64, f64) {
        let x = r.ln();
        (self.log_value.value(x), self.log_slope.value(x))
    }
}

/// Green's function of a spherically layered diffuse medium.
pub struct SphericalDiffuse<P: PermittivityProfile> {
    profile: P,
    origin: Vector3<f64>,
    options: SphericalDiffuseOptions,
    zeta: Vec<RadialSolution>,
    omega: Vec<RadialSolution>,
    zeta_coulomb: RadialSolution,
    omega_coulomb: RadialSolution,
}

impl<P: PermittivityProfile> SphericalDiffuse<P> {
    /// Build the kernel: integrates all radial solutions up front, after
    /// which the instance is immutable.
    pub fn new(
        profile: P,
        origin: Vector3<f64>,
        options: SphericalDiffuseOptions,
    ) -> Result<Self, PcmError> {
        if options.r_min <= 0.0 || options.r_max <= options.r_min {
            return Err(PcmError::Configuration(format!(
                "radial grid [{}, {}] is invalid",
                options.r_min, options.r_max
            )));
        }
        if options.grid_points < 10 {
            return Err(PcmError::Configuration(format!(
                "radial grid needs at least 10 points, got {}",
                options.grid_points
            )));
        }
        if options.max_l_coulomb <= options.max_l_green {
            return Err(PcmError::Configuration(format!(
                "max_l_coulomb ({}) must exceed max_l_green ({})",
                options.max_l_coulomb, options.max_l_green
            )));
        }
        if options.stencil_step <= 0.0 {
            return Err(PcmError::Configuration(format!(
                "stencil step must be positive, got {}",
                options.stencil_step
            )));
        }
        debug!(
            "integrating radial solutions: L = 0..={} plus L = {} on {} points",
            options.max_l_green, options.max_l_coulomb, options.grid_points
        );
        let mut zeta = Vec::with_capacity(options.max_l_green + 1);
        let mut omega = Vec::with_capacity(options.max_l_green + 1);
        for l in 0..=options.max_l_green {
            zeta.push(integrate_regular(&profile, &options, l));
            omega.push(integrate_decaying(&profile, &options, l));
        }
        let zeta_coulomb = integrate_regular(&profile, &options, options.max_l_coulomb);
        let omega_coulomb = integrate_decaying(&profile, &options, options.max_l_coulomb);
        Ok(Self {
            profile,
            origin,
            options,
            zeta,
            omega,
            zeta_coulomb,
            omega_coulomb,
        })
    }

    /// Local permittivity and its radial derivative at a point.
    pub fn epsilon_at(&self, point: &Vector3<f64>) -> (f64, f64) {
        self.profile.epsilon((point - self.origin).norm())
    }

    /// Coulomb singularity separation coefficient `C(p1, p2)`.
    pub fn coefficient_coulomb(&self, p1: &Vector3<f64>, p2: &Vector3<f64>) -> f64 {
        let (r1, r2, _) = self.radial_coordinates(p1, p2);
        self.coefficient_impl(r1, r2)
    }

    /// Directional derivative of `C` with respect to `p2`.
    pub fn coefficient_coulomb_derivative(
        &self,
        direction: &Vector3<f64>,
        p1: &Vector3<f64>,
        p2: &Vector3<f64>,
    ) -> f64 {
        three_point_stencil(
            |p| self.coefficient_coulomb(p1, p),
            p2,
            direction,
            self.options.stencil_step,
        )
    }

    /// Image (nonsingular) part of the Green's function.
    pub fn image_potential(&self, p1: &Vector3<f64>, p2: &Vector3<f64>) -> f64 {
        let (r1, r2, cos_gamma) = self.radial_coordinates(p1, p2);
        self.image_potential_impl(r1, r2, cos_gamma)
    }

    /// Directional derivative of the image part with respect to `p2`.
    pub fn image_potential_derivative(
        &self,
        direction: &Vector3<f64>,
        p1: &Vector3<f64>,
        p2: &Vector3<f64>,
    ) -> f64 {
        three_point_stencil(
            |p| self.image_potential(p1, p),
            p2,
            direction,
            self.options.stencil_step,
        )
    }

    fn radial_coordinates(&self, p1: &Vector3<f64>, p2: &Vector3<f64>) -> (f64, f64, f64) {
        let v1 = p1 - self.origin;
        let v2 = p2 - self.origin;
        let r1 = v1.norm();
        let r2 = v2.norm();
        let cos_gamma = (v1.dot(&v2) / (r1 * r2)).clamp(-1.0, 1.0);
        (r1, r2, cos_gamma)
    }

    /// `ln g_L(r<, r>)` from a tabulated solution pair.
    fn radial_log_green(
        &self,
        zeta: &RadialSolution,
        omega: &RadialSolution,
        two_l_plus_one: f64,
        r_less: f64,
        r_greater: f64,
    ) -> f64 {
        let (z_less, _) = zeta.evaluate(r_less);
        let (z_greater, z_slope) = zeta.evaluate(r_greater);
        let (_, w_slope) = omega.evaluate(r_greater);
        let (eps, _) = self.profile.epsilon(r_greater);
        // eps r^2 (zeta' - omega'), with the slopes taken in x = ln r.
        let wronskian = eps * r_greater * (z_slope - w_slope);
        two_l_plus_one.ln() + z_less - z_greater - wronskian.ln()
    }

    fn coefficient_impl(&self, r1: f64, r2: f64) -> f64 {
        let (r_less, r_greater) = if r1 < r2 { (r1, r2) } else { (r2, r1) };
        let l = self.options.max_l_coulomb as f64;
        let log_g = self.radial_log_green(
            &self.zeta_coulomb,
            &self.omega_coulomb,
            2.0 * l + 1.0,
            r_less,
            r_greater,
        );
        let log_coulomb = l * (r_less / r_greater).ln() - r_greater.ln();
        (log_coulomb - log_g).exp()
    }

    fn image_potential_impl(&self, r1: f64, r2: f64, cos_gamma: f64) -> f64 {
        let (r_less, r_greater) = if r1 < r2 { (r1, r2) } else { (r2, r1) };
        let coefficient = self.coefficient_impl(r1, r2);
        let pl = legendre(self.options.max_l_green, cos_gamma);
        let ratio = r_less / r_greater;
        let mut coulomb_radial = 1.0 / r_greater;
        let mut sum = 0.0;
        for (l, p) in pl.iter().enumerate() {
            let log_g = self.radial_log_green(
                &self.zeta[l],
                &self.omega[l],
                (2 * l + 1) as f64,
                r_less,
                r_greater,
            );
            sum += (log_g.exp() - coulomb_radial / coefficient) * p;
            coulomb_radial *= ratio;
        }
        sum
    }
}

impl<P: PermittivityProfile> GreensFunction for SphericalDiffuse<P> {
    fn kernel_s(&self, source: &Vector3<f64>, probe: &Vector3<f64>) -> f64 {
        let r12 = (source - probe).norm();
        let (r1, r2, cos_gamma) = self.radial_coordinates(source, probe);
        1.0 / (self.coefficient_impl(r1, r2) * r12) + self.image_potential_impl(r1, r2, cos_gamma)
    }

    // The full kernel is smooth away from coincidence, so the conormal
    // derivative may be formed by the same stencil as the separated parts;
    // the assembly only ever calls this off-diagonal.
    fn kernel_d(
        &self,
        direction: &Vector3<f64>,
        source: &Vector3<f64>,
        probe: &Vector3<f64>,
    ) -> f64 {
        let (eps, _) = self.epsilon_at(probe);
        eps * three_point_stencil(
            |p| self.kernel_s(source, p),
            probe,
            direction,
            self.options.stencil_step,
        )
    }

    fn uniform_permittivity(&self) -> Option<f64> {
        None
    }

    fn diagonal_single_layer(&self, element: &Element, factor: f64) -> Result<f64, PcmError> {
        let center = element.center();
        let s_homogeneous = factor * (4.0 * f64::PI() / element.area()).sqrt();
        let coefficient = self.coefficient_coulomb(&center, &center);
        let image = self.image_potential(&center, &center);
        Ok(s_homogeneous / coefficient + image)
    }

    fn diagonal_double_layer(&self, element: &Element, factor: f64) -> Result<f64, PcmError> {
        let center = element.center();
        let normal = element.normal();
        let area = element.area();
        let radius = element.sphere().radius();
        let s_homogeneous = factor * (4.0 * f64::PI() / area).sqrt();
        let d_homogeneous = -factor * (f64::PI() / area).sqrt() / radius;
        let coefficient = self.coefficient_coulomb(&center, &center);
        // d(1/C)/dn = -C'/C^2.
        let coefficient_grad =
            self.coefficient_coulomb_derivative(&normal, &center, &center) / coefficient.powi(2);
        let image_grad = self.image_potential_derivative(&normal, &center, &center);
        let (eps, _) = self.epsilon_at(&center);
        Ok(eps * (d_homogeneous / coefficient - s_homogeneous * coefficient_grad + image_grad))
    }

    fn kind(&self) -> &'static str {
        "SphericalDiffuse"
    }
}

/// Right-hand side of the Riccati form of the radial equation in
/// `x = ln r`: with `y = d ln u / d x`,
/// `y' = -y^2 - y (1 + r eps'/eps) + L(L+1)`.
fn slope_rhs<P: PermittivityProfile>(profile: &P, x: f64, y: f64, ll1: f64) -> f64 {
    let r = x.exp();
    let (eps, deps) = profile.epsilon(r);
    -y * y - y * (1.0 + r * deps / eps) + ll1
}

fn grid(options: &SphericalDiffuseOptions) -> (f64, f64) {
    let x_min = options.r_min.ln();
    let x_max = options.r_max.ln();
    let step = (x_max - x_min) / (options.grid_points - 1) as f64;
    (x_min, step)
}

/// Integrate `[ln u, d ln u / d x]` with RK4 from one end of the grid to
/// the other. `step` may be negative (integration from the outer end).
fn integrate<P: PermittivityProfile>(
    profile: &P,
    start_x: f64,
    step: f64,
    nodes: usize,
    init_value: f64,
    init_slope: f64,
    ll1: f64,
) -> (Vec<f64>, Vec<f64>) {
    let mut values = Vec::with_capacity(nodes);
    let mut slopes = Vec::with_capacity(nodes);
    let mut x = start_x;
    let mut z = init_value;
    let mut y = init_slope;
    values.push(z);
    slopes.push(y);
    for _ in 1..nodes {
        let k1z = y;
        let k1y = slope_rhs(profile, x, y, ll1);
        let k2z = y + 0.5 * step * k1y;
        let k2y = slope_rhs(profile, x + 0.5 * step, y + 0.5 * step * k1y, ll1);
        let k3z = y + 0.5 * step * k2y;
        let k3y = slope_rhs(profile, x + 0.5 * step, y + 0.5 * step * k2y, ll1);
        let k4z = y + step * k3y;
        let k4y = slope_rhs(profile, x + step, y + step * k3y, ll1);
        z += step / 6.0 * (k1z + 2.0 * k2z + 2.0 * k3z + k4z);
        y += step / 6.0 * (k1y + 2.0 * k2y + 2.0 * k3y + k4y);
        x += step;
        values.push(z);
        slopes.push(y);
    }
    (values, slopes)
}

/// Solution regular at the origin, `u ~ r^L` inside the grid start.
fn integrate_regular<P: PermittivityProfile>(
    profile: &P,
    options: &SphericalDiffuseOptions,
    l: usize,
) -> RadialSolution {
    let (x_min, step) = grid(options);
    let lf = l as f64;
    let (values, slopes) = integrate(
        profile,
        x_min,
        step,
        options.grid_points,
        lf * x_min,
        lf,
        lf * (lf + 1.0),
    );
    RadialSolution {
        log_value: CubicSpline::natural(x_min, step, values),
        log_slope: CubicSpline::natural(x_min, step, slopes),
    }
}

/// Solution decaying at infinity, `v ~ r^-(L+1)` beyond the grid end,
/// integrated inward (the decaying-outward mode is the growing one in
/// that direction, so the inward march is numerically stable).
fn integrate_decaying<P: PermittivityProfile>(
    profile: &P,
    options: &SphericalDiffuseOptions,
    l: usize,
) -> RadialSolution {
    let (x_min, step) = grid(options);
    let x_max = x_min + step * (options.grid_points - 1) as f64;
    let lf = l as f64;
    let (mut values, mut slopes) = integrate(
        profile,
        x_max,
        -step,
        options.grid_points,
        -(lf + 1.0) * x_max,
        -(lf + 1.0),
        lf * (lf + 1.0),
    );
    values.reverse();
    slopes.reverse();
    RadialSolution {
        log_value: CubicSpline::natural(x_min, step, values),
        log_slope: CubicSpline::natural(x_min, step, slopes),
    }
}

#[cfg(test)]
mod test {
    use super::{SphericalDiffuse, SphericalDiffuseOptions};
    use crate::cavity::{Element, Sphere};
    use crate::green::profiles::TanhProfile;
    use crate::green::{Derivative, GreensFunction, UniformDielectric};
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    fn test_options() -> SphericalDiffuseOptions {
        SphericalDiffuseOptions {
            max_l_green: 12,
            max_l_coulomb: 120,
            r_min: 0.05,
            r_max: 60.0,
            grid_points: 4000,
            stencil_step: 1.0e-3,
        }
    }

    fn flat(eps: f64) -> SphericalDiffuse<TanhProfile> {
        SphericalDiffuse::new(
            TanhProfile::new(eps, eps, 5.0, 1.0).unwrap(),
            Vector3::zeros(),
            test_options(),
        )
        .unwrap()
    }

    #[test]
    fn flat_profile_coefficient_is_the_permittivity() {
        let eps = 78.39;
        let gf = flat(eps);
        let p1 = Vector3::new(0.0, 0.0, 3.0);
        let p2 = Vector3::new(2.0, 1.0, -1.0);
        assert_relative_eq!(gf.coefficient_coulomb(&p1, &p2), eps, max_relative = 1.0e-6);
        assert_relative_eq!(gf.coefficient_coulomb(&p1, &p1), eps, max_relative = 1.0e-6);
    }

    #[test]
    fn flat_profile_image_vanishes() {
        let gf = flat(78.39);
        let p1 = Vector3::new(0.0, 0.0, 3.0);
        let p2 = Vector3::new(0.0, 2.5, 0.5);
        assert!(gf.image_potential(&p1, &p2).abs() < 1.0e-6);
        assert!(gf.image_potential(&p1, &p1).abs() < 1.0e-6);
    }

    #[test]
    fn flat_profile_kernel_reduces_to_uniform() {
        let eps = 78.39;
        let gf = flat(eps);
        let uniform = UniformDielectric::new(eps, Derivative::default()).unwrap();
        let p1 = Vector3::new(0.0, 1.0, 3.0);
        let p2 = Vector3::new(1.5, -1.0, 0.5);
        assert_relative_eq!(
            gf.kernel_s(&p1, &p2),
            uniform.kernel_s(&p1, &p2),
            max_relative = 1.0e-5
        );
        let n = Vector3::new(0.0, 0.0, 1.0);
        assert_relative_eq!(
            gf.kernel_d(&n, &p1, &p2),
            uniform.kernel_d(&n, &p1, &p2),
            max_relative = 1.0e-3
        );
    }

    #[test]
    fn flat_profile_diagonals_reduce_to_uniform() {
        let eps = 78.39;
        let gf = flat(eps);
        let uniform = UniformDielectric::new(eps, Derivative::default()).unwrap();
        let element = Element::new(
            Vector3::new(0.0, 0.0, 3.0),
            Vector3::new(0.0, 0.0, 1.0),
            0.4,
            Sphere::new(Vector3::zeros(), 3.0),
            0,
        );
        let s_diffuse = gf.diagonal_single_layer(&element, 1.07).unwrap();
        let s_uniform = uniform.diagonal_single_layer(&element, 1.07).unwrap();
        assert_relative_eq!(s_diffuse, s_uniform, max_relative = 1.0e-4);
        let d_diffuse = gf.diagonal_double_layer(&element, 1.07).unwrap();
        let d_uniform = uniform.diagonal_double_layer(&element, 1.07).unwrap();
        assert_relative_eq!(d_diffuse, d_uniform, max_relative = 1.0e-3);
    }

    #[test]
    fn coefficient_tracks_the_local_permittivity() {
        let profile = TanhProfile::new(1.0, 78.39, 6.0, 1.0).unwrap();
        let gf =
            SphericalDiffuse::new(profile, Vector3::zeros(), test_options()).unwrap();
        // Deep on either side of the interface the coefficient approaches
        // the bulk values; the extraction at finite L leaves a small bias.
        let inside = Vector3::new(0.0, 0.0, 2.0);
        let outside = Vector3::new(0.0, 0.0, 14.0);
        assert_relative_eq!(
            gf.coefficient_coulomb(&inside, &inside),
            1.0,
            max_relative = 0.1
        );
        assert_relative_eq!(
            gf.coefficient_coulomb(&outside, &outside),
            78.39,
            max_relative = 0.1
        );
    }

    #[test]
    fn invalid_options_are_rejected() {
        let profile = TanhProfile::new(1.0, 80.0, 5.0, 1.0).unwrap();
        let mut options = test_options();
        options.max_l_coulomb = options.max_l_green;
        assert!(SphericalDiffuse::new(profile, Vector3::zeros(), options).is_err());
        let mut options = test_options();
        options.r_max = options.r_min;
        assert!(SphericalDiffuse::new(profile, Vector3::zeros(), options).is_err());
    }
}
