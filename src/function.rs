//! Named scalar fields over cavity elements.
//!
//! Potentials and charges cross the boundary to the host program as named
//! vectors with one entry per element. The host-facing bookkeeping of the
//! named slots is out of scope here; this module provides the value type
//! and its arithmetic.

use crate::error::PcmError;
use nalgebra::DVector;

/// A named vector of one scalar per cavity element.
#[derive(Clone, Debug)]
pub struct SurfaceFunction {
    name: String,
    values: DVector<f64>,
}

impl SurfaceFunction {
    /// A zero-initialized function of the given dimension.
    pub fn new(name: &str, size: usize) -> Self {
        Self {
            name: name.to_string(),
            values: DVector::zeros(size),
        }
    }

    /// Wrap an existing vector of values.
    pub fn from_vector(name: &str, values: DVector<f64>) -> Self {
        Self {
            name: name.to_string(),
            values,
        }
    }

    /// Slot name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the function has no entries.
    pub fn is_empty(&self) -> bool {
        self.values.len() == 0
    }

    /// Value at `index`.
    pub fn get(&self, index: usize) -> f64 {
        self.values[index]
    }

    /// Overwrite the value at `index`.
    pub fn set(&mut self, index: usize, value: f64) {
        self.values[index] = value;
    }

    /// Multiply every entry by `factor`.
    pub fn scale(&mut self, factor: f64) {
        self.values *= factor;
    }

    /// `self += coefficient * other`, dimension-checked.
    pub fn axpy(&mut self, coefficient: f64, other: &SurfaceFunction) -> Result<(), PcmError> {
        if other.len() != self.len() {
            return Err(PcmError::DimensionMismatch {
                what: "surface function axpy",
                expected: self.len(),
                actual: other.len(),
            });
        }
        self.values.axpy(coefficient, &other.values, 1.0);
        Ok(())
    }

    /// Dot product with another function of the same dimension.
    pub fn dot(&self, other: &SurfaceFunction) -> Result<f64, PcmError> {
        if other.len() != self.len() {
            return Err(PcmError::DimensionMismatch {
                what: "surface function dot product",
                expected: self.len(),
                actual: other.len(),
            });
        }
        Ok(self.values.dot(&other.values))
    }

    /// Zero all entries, keeping the dimension.
    ///
    /// Symmetry-reduced charge computations write into a shared named slot;
    /// clearing between computations of different symmetry keeps stale
    /// entries of the previous blocking from leaking into the next result.
    pub fn clear(&mut self) {
        self.values.fill(0.0);
    }

    /// Read-only view of the values.
    pub fn values(&self) -> &DVector<f64> {
        &self.values
    }

    /// Mutable view of the values.
    pub fn values_mut(&mut self) -> &mut DVector<f64> {
        &mut self.values
    }
}

#[cfg(test)]
mod test {
    use super::SurfaceFunction;
    use approx::assert_relative_eq;
    use nalgebra::DVector;

    #[test]
    fn axpy_and_dot() {
        let mut v = SurfaceFunction::from_vector("MEP", DVector::from_vec(vec![1.0, 2.0, 3.0]));
        let w = SurfaceFunction::from_vector("ASC", DVector::from_vec(vec![1.0, 1.0, 1.0]));
        v.axpy(2.0, &w).unwrap();
        assert_relative_eq!(v.get(0), 3.0);
        assert_relative_eq!(v.get(2), 5.0);
        assert_relative_eq!(v.dot(&w).unwrap(), 12.0);
    }

    #[test]
    fn mismatched_lengths_error() {
        let mut v = SurfaceFunction::new("MEP", 3);
        let w = SurfaceFunction::new("ASC", 4);
        assert!(v.axpy(1.0, &w).is_err());
        assert!(v.dot(&w).is_err());
    }

    #[test]
    fn clear_keeps_dimension() {
        let mut v = SurfaceFunction::from_vector("slot", DVector::from_vec(vec![4.0, 5.0]));
        v.clear();
        assert_eq!(v.len(), 2);
        assert_relative_eq!(v.get(0), 0.0);
        assert_relative_eq!(v.get(1), 0.0);
    }
}
