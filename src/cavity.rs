//! Read-side data model of the discretized cavity.
//!
//! Cavity *generation* (the GePol-style tessellation of overlapping atomic
//! spheres) is an external collaborator; the solver only ever consumes an
//! ordered sequence of finite surface elements plus the point group the
//! ordering respects. See [`crate::shapes`] for the test tessellations.

use crate::error::PcmError;
use crate::symmetry::PointGroup;
use nalgebra::{DVector, Vector3};

/// One of the atomic spheres the cavity surface was carved from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sphere {
    center: Vector3<f64>,
    radius: f64,
}

impl Sphere {
    /// New sphere; the radius must be positive.
    pub fn new(center: Vector3<f64>, radius: f64) -> Self {
        assert!(radius > 0.0, "sphere radius must be positive");
        Self { center, radius }
    }

    /// Sphere center.
    pub fn center(&self) -> Vector3<f64> {
        self.center
    }

    /// Sphere radius.
    pub fn radius(&self) -> f64 {
        self.radius
    }
}

/// A finite surface element (tessera): one collocation point with its
/// weight and orientation. Immutable after cavity construction.
#[derive(Clone, Debug)]
pub struct Element {
    center: Vector3<f64>,
    normal: Vector3<f64>,
    area: f64,
    sphere: Sphere,
    sphere_index: usize,
}

impl Element {
    /// New element. The normal is normalized here; the area must be
    /// positive. Violations are programmer errors, not runtime conditions.
    pub fn new(
        center: Vector3<f64>,
        normal: Vector3<f64>,
        area: f64,
        sphere: Sphere,
        sphere_index: usize,
    ) -> Self {
        assert!(area > 0.0, "element area must be positive");
        let norm = normal.norm();
        assert!(norm > 0.0, "element normal must be nonzero");
        Self {
            center,
            normal: normal / norm,
            area,
            sphere,
            sphere_index,
        }
    }

    /// Collocation point of the element.
    pub fn center(&self) -> Vector3<f64> {
        self.center
    }

    /// Outward unit normal at the collocation point.
    pub fn normal(&self) -> Vector3<f64> {
        self.normal
    }

    /// Element area.
    pub fn area(&self) -> f64 {
        self.area
    }

    /// The sphere this element was carved from.
    pub fn sphere(&self) -> Sphere {
        self.sphere
    }

    /// Index of the owning sphere in the cavity's sphere list.
    pub fn sphere_index(&self) -> usize {
        self.sphere_index
    }
}

/// The discretized dielectric boundary: an ordered element sequence plus
/// the point group its ordering respects.
///
/// Ordering contract: the first `irreducible_size()` elements form the
/// symmetry-irreducible set; for every group operation `g` (in the group's
/// operation indexing) block `g` holds the images of the irreducible
/// elements under `g`, in matching order. The symmetry blocking in
/// [`crate::symmetry`] is only valid on matrices assembled over such an
/// ordering.
#[derive(Clone, Debug)]
pub struct Cavity {
    elements: Vec<Element>,
    point_group: PointGroup,
    irreducible_size: usize,
}

impl Cavity {
    /// Wrap an ordered element list and its point group.
    ///
    /// Fails if the element count is not divisible by the group order.
    pub fn new(elements: Vec<Element>, point_group: PointGroup) -> Result<Self, PcmError> {
        let nr_ops = point_group.nr_irrep();
        if elements.is_empty() || elements.len() % nr_ops != 0 {
            return Err(PcmError::DimensionMismatch {
                what: "cavity elements per symmetry block",
                expected: nr_ops,
                actual: elements.len(),
            });
        }
        let irreducible_size = elements.len() / nr_ops;
        Ok(Self {
            elements,
            point_group,
            irreducible_size,
        })
    }

    /// Total number of elements.
    pub fn size(&self) -> usize {
        self.elements.len()
    }

    /// Number of symmetry-irreducible elements.
    pub fn irreducible_size(&self) -> usize {
        self.irreducible_size
    }

    /// The ordered element sequence.
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// The molecular point group.
    pub fn point_group(&self) -> &PointGroup {
        &self.point_group
    }

    /// Element areas as a vector, in element order.
    pub fn areas(&self) -> DVector<f64> {
        DVector::from_iterator(self.elements.len(), self.elements.iter().map(|e| e.area()))
    }

    /// Center of element `index`.
    pub fn element_center(&self, index: usize) -> Vector3<f64> {
        self.elements[index].center()
    }
}

#[cfg(test)]
mod test {
    use super::{Cavity, Element, Sphere};
    use crate::symmetry::PointGroup;
    use nalgebra::Vector3;

    fn element(z: f64) -> Element {
        Element::new(
            Vector3::new(0.0, 0.0, z),
            Vector3::new(0.0, 0.0, z),
            0.5,
            Sphere::new(Vector3::zeros(), 1.0),
            0,
        )
    }

    #[test]
    fn irreducible_size_divides() {
        let cavity = Cavity::new(
            vec![element(1.0), element(-1.0)],
            PointGroup::for_label("Cs").unwrap(),
        )
        .unwrap();
        assert_eq!(cavity.size(), 2);
        assert_eq!(cavity.irreducible_size(), 1);
    }

    #[test]
    fn indivisible_element_count_is_rejected() {
        let result = Cavity::new(
            vec![element(1.0), element(-1.0), element(2.0)],
            PointGroup::for_label("Cs").unwrap(),
        );
        assert!(result.is_err());
    }

    #[test]
    #[should_panic(expected = "area must be positive")]
    fn nonpositive_area_panics() {
        Element::new(
            Vector3::zeros(),
            Vector3::new(0.0, 0.0, 1.0),
            0.0,
            Sphere::new(Vector3::zeros(), 1.0),
            0,
        );
    }
}
