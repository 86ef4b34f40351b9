//! Symmetry-ordered test tessellations and bare test potentials.
//!
//! Cavity *generation* is an external collaborator of the solver; the
//! builders here produce just enough geometry to exercise it: a sphere
//! tessellated into latitude-longitude patches over one octant and
//! replicated across the full sphere in the element ordering the symmetry
//! machinery expects (irreducible block first, then one image block per
//! group operation).

use crate::cavity::{Cavity, Element, Sphere};
use crate::error::PcmError;
use crate::symmetry::PointGroup;
use nalgebra::{DVector, Vector3};
use num::traits::FloatConst;

/// Tessellate a sphere of `radius` centered at the origin.
///
/// The octant grid has `n_theta` polar bands; each band carries up to
/// `n_phi` azimuthal patches, thinned toward the pole so the patches stay
/// roughly round (the collocation self-term is tuned for compact
/// elements). The full cavity carries eight octant copies regardless of
/// `group`, ordered so that the group's blocking applies. Patch areas are
/// exact; centroids are collocated on the sphere.
pub fn spherical_cavity(
    radius: f64,
    n_theta: usize,
    n_phi: usize,
    group: &PointGroup,
) -> Result<Cavity, PcmError> {
    if radius <= 0.0 {
        return Err(PcmError::Configuration(format!(
            "cavity radius must be positive, got {radius}"
        )));
    }
    if n_theta == 0 || n_phi == 0 {
        return Err(PcmError::Configuration(
            "octant grid needs at least one patch per direction".to_string(),
        ));
    }
    let sphere = Sphere::new(Vector3::zeros(), radius);
    let half_pi = f64::FRAC_PI_2();
    let mut octant = Vec::new();
    for i in 0..n_theta {
        let theta_low = half_pi * i as f64 / n_theta as f64;
        let theta_high = half_pi * (i + 1) as f64 / n_theta as f64;
        let theta = 0.5 * (theta_low + theta_high);
        let band_patches = ((n_phi as f64 * theta.sin()).ceil() as usize).max(1);
        let d_phi = half_pi / band_patches as f64;
        for j in 0..band_patches {
            let phi = d_phi * (j as f64 + 0.5);
            let area = radius * radius * d_phi * (theta_low.cos() - theta_high.cos());
            let direction = Vector3::new(
                theta.sin() * phi.cos(),
                theta.sin() * phi.sin(),
                theta.cos(),
            );
            octant.push((direction * radius, direction, area));
        }
    }

    // Coset representatives of the group inside the full 8-element flip
    // group: the irreducible set is the octant grid replicated over one
    // representative per coset.
    let operations: Vec<u8> = (0..group.nr_irrep()).map(|g| group.operation(g)).collect();
    let mut covered = [false; 8];
    let mut representatives = Vec::new();
    for mask in 0u8..8 {
        if covered[mask as usize] {
            continue;
        }
        representatives.push(mask);
        for op in &operations {
            covered[(mask ^ op) as usize] = true;
        }
    }

    let mut elements = Vec::with_capacity(8 * octant.len());
    for op in &operations {
        for representative in &representatives {
            let mask = representative ^ op;
            for (center, normal, area) in &octant {
                elements.push(Element::new(
                    PointGroup::image(mask, center),
                    PointGroup::image(mask, normal),
                    *area,
                    sphere,
                    0,
                ));
            }
        }
    }
    Cavity::new(elements, group.clone())
}

/// A set of classical point charges, the test stand-in for the molecule
/// collaborator.
#[derive(Clone, Debug, Default)]
pub struct ChargeDistribution {
    charges: Vec<f64>,
    positions: Vec<Vector3<f64>>,
}

impl ChargeDistribution {
    /// An empty distribution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one point charge.
    pub fn with_charge(mut self, charge: f64, position: Vector3<f64>) -> Self {
        self.charges.push(charge);
        self.positions.push(position);
        self
    }

    /// Bare Coulomb potential of the distribution at the element centers.
    pub fn mep(&self, elements: &[Element]) -> DVector<f64> {
        DVector::from_iterator(
            elements.len(),
            elements.iter().map(|element| {
                self.charges
                    .iter()
                    .zip(&self.positions)
                    .map(|(q, x)| q / (element.center() - x).norm())
                    .sum()
            }),
        )
    }
}

/// Potential of a single point charge at the origin.
pub fn point_charge_mep(elements: &[Element], charge: f64) -> DVector<f64> {
    ChargeDistribution::new()
        .with_charge(charge, Vector3::zeros())
        .mep(elements)
}
