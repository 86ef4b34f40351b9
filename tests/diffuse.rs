//! IEF solver with a radially diffuse exterior medium.

use approx::assert_relative_eq;
use nalgebra::Vector3;
use pcm::green::profiles::TanhProfile;
use pcm::green::{
    Derivative, SphericalDiffuse, SphericalDiffuseOptions, UniformDielectric, Vacuum,
};
use pcm::shapes::{point_charge_mep, spherical_cavity};
use pcm::solver::{IefSolver, IefSolverOptions};
use pcm::symmetry::PointGroup;

const PERMITTIVITY: f64 = 78.39;
const RADIUS: f64 = 2.0;
const CHARGE: f64 = 1.0;

fn diffuse_options() -> SphericalDiffuseOptions {
    SphericalDiffuseOptions {
        max_l_green: 12,
        max_l_coulomb: 120,
        r_min: 0.05,
        r_max: 60.0,
        grid_points: 4000,
        stencil_step: 1.0e-3,
    }
}

fn total_asc(outside: &dyn pcm::green::GreensFunction) -> f64 {
    let cavity = spherical_cavity(RADIUS, 3, 3, &PointGroup::trivial()).unwrap();
    let inside = Vacuum::default();
    let mut solver = IefSolver::new(IefSolverOptions::default());
    solver
        .build_system_matrix(&cavity, &inside, outside)
        .unwrap();
    let mep = point_charge_mep(cavity.elements(), CHARGE);
    solver.compute_charge(&mep).unwrap().sum()
}

/// A flat "diffuse" profile is a uniform dielectric in disguise; the
/// anisotropic route through the layered kernel must agree with the
/// isotropic route through the uniform one.
#[test]
fn flat_profile_matches_the_uniform_solver() {
    let profile = TanhProfile::new(PERMITTIVITY, PERMITTIVITY, 5.0, 1.0).unwrap();
    let diffuse = SphericalDiffuse::new(profile, Vector3::zeros(), diffuse_options()).unwrap();
    let uniform = UniformDielectric::new(PERMITTIVITY, Derivative::default()).unwrap();
    let diffuse_total = total_asc(&diffuse);
    let uniform_total = total_asc(&uniform);
    // The isotropic and anisotropic routes discretize the same physics
    // differently; their mismatch shrinks with the element count.
    assert_relative_eq!(diffuse_total, uniform_total, max_relative = 3.0e-2);
}

/// With the dielectric transition pushed beyond the cavity the continuum
/// responds more weakly than the bulk solvent but still screens.
#[test]
fn interface_beyond_the_cavity_screens_partially() {
    let profile = TanhProfile::new(1.0, PERMITTIVITY, RADIUS + 2.0, 0.5).unwrap();
    let diffuse = SphericalDiffuse::new(profile, Vector3::zeros(), diffuse_options()).unwrap();
    let uniform = UniformDielectric::new(PERMITTIVITY, Derivative::default()).unwrap();
    let diffuse_total = total_asc(&diffuse);
    let uniform_total = total_asc(&uniform);
    assert!(diffuse_total < 0.0, "the continuum must screen");
    assert!(
        diffuse_total.abs() < uniform_total.abs(),
        "a distant interface screens less than bulk solvent"
    );
}
