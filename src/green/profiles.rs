//! Permittivity profiles of radially layered media.

use crate::error::PcmError;
use num::traits::FloatConst;

/// A spherically symmetric permittivity profile.
///
/// Returns the permittivity and its radial derivative at a distance `r`
/// from the layer center; the kernel needs both in one call because the
/// double-layer self-term differentiates the local permittivity at
/// coincident points.
pub trait PermittivityProfile: Send + Sync {
    /// `(epsilon(r), d epsilon / d r)`.
    fn epsilon(&self, r: f64) -> (f64, f64);

    /// Bulk permittivity on the inner side of the layer.
    fn left(&self) -> f64;

    /// Bulk permittivity on the outer side of the layer.
    fn right(&self) -> f64;
}

fn validate(left: f64, right: f64, center: f64, width: f64) -> Result<(), PcmError> {
    for (name, value) in [("left", left), ("right", right)] {
        if value <= 0.0 {
            return Err(PcmError::Configuration(format!(
                "{name} permittivity must be positive, got {value}"
            )));
        }
    }
    if center <= 0.0 {
        return Err(PcmError::Configuration(format!(
            "profile center must be positive, got {center}"
        )));
    }
    if width <= 0.0 {
        return Err(PcmError::Configuration(format!(
            "profile width must be positive, got {width}"
        )));
    }
    Ok(())
}

/// Hyperbolic-tangent transition between two bulk permittivities.
#[derive(Clone, Copy, Debug)]
pub struct TanhProfile {
    left: f64,
    right: f64,
    center: f64,
    width: f64,
}

impl TanhProfile {
    /// New profile switching from `left` to `right` around radius `center`
    /// over a length scale `width`.
    pub fn new(left: f64, right: f64, center: f64, width: f64) -> Result<Self, PcmError> {
        validate(left, right, center, width)?;
        Ok(Self {
            left,
            right,
            center,
            width,
        })
    }
}

impl PermittivityProfile for TanhProfile {
    fn epsilon(&self, r: f64) -> (f64, f64) {
        let t = ((r - self.center) / self.width).tanh();
        let value = 0.5 * (self.left + self.right) + 0.5 * (self.right - self.left) * t;
        let derivative = 0.5 * (self.right - self.left) / self.width * (1.0 - t * t);
        (value, derivative)
    }

    fn left(&self) -> f64 {
        self.left
    }

    fn right(&self) -> f64 {
        self.right
    }
}

/// Error-function transition between two bulk permittivities.
#[derive(Clone, Copy, Debug)]
pub struct ErfProfile {
    left: f64,
    right: f64,
    center: f64,
    width: f64,
}

impl ErfProfile {
    /// New profile switching from `left` to `right` around radius `center`
    /// over a length scale `width`.
    pub fn new(left: f64, right: f64, center: f64, width: f64) -> Result<Self, PcmError> {
        validate(left, right, center, width)?;
        Ok(Self {
            left,
            right,
            center,
            width,
        })
    }
}

impl PermittivityProfile for ErfProfile {
    fn epsilon(&self, r: f64) -> (f64, f64) {
        let t = (r - self.center) / self.width;
        let value = 0.5 * (self.left + self.right)
            + 0.5 * (self.right - self.left) * libm::erf(t);
        let derivative =
            (self.right - self.left) / (self.width * f64::PI().sqrt()) * (-t * t).exp();
        (value, derivative)
    }

    fn left(&self) -> f64 {
        self.left
    }

    fn right(&self) -> f64 {
        self.right
    }
}

#[cfg(test)]
mod test {
    use super::{ErfProfile, PermittivityProfile, TanhProfile};
    use approx::assert_relative_eq;

    #[test]
    fn tanh_profile_limits_and_midpoint() {
        let profile = TanhProfile::new(1.0, 78.39, 5.0, 0.5).unwrap();
        let (far_left, _) = profile.epsilon(0.1);
        let (mid, slope) = profile.epsilon(5.0);
        let (far_right, _) = profile.epsilon(20.0);
        assert_relative_eq!(far_left, 1.0, max_relative = 1.0e-6);
        assert_relative_eq!(mid, 0.5 * (1.0 + 78.39));
        assert!(slope > 0.0);
        assert_relative_eq!(far_right, 78.39, max_relative = 1.0e-6);
    }

    #[test]
    fn erf_derivative_matches_difference_quotient() {
        let profile = ErfProfile::new(2.0, 40.0, 4.0, 1.0).unwrap();
        let r = 4.3;
        let h = 1.0e-6;
        let (_, analytic) = profile.epsilon(r);
        let (above, _) = profile.epsilon(r + h);
        let (below, _) = profile.epsilon(r - h);
        assert_relative_eq!(analytic, (above - below) / (2.0 * h), max_relative = 1.0e-6);
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(TanhProfile::new(0.0, 80.0, 5.0, 0.5).is_err());
        assert!(TanhProfile::new(1.0, 80.0, 5.0, 0.0).is_err());
        assert!(ErfProfile::new(1.0, -3.0, 5.0, 0.5).is_err());
        assert!(ErfProfile::new(1.0, 80.0, -5.0, 0.5).is_err());
    }
}
