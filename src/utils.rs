//! Small numerical helpers shared across the crate.

use nalgebra::{DMatrix, Vector3};

/// Evaluate the Legendre polynomials `P_0(x) .. P_max_l(x)` by upward
/// recurrence.
///
/// The three-term recurrence is stable for `|x| <= 1`, which is the only
/// range the kernels evaluate it on (`x` is the cosine of the angle
/// between two position vectors).
pub fn legendre(max_l: usize, x: f64) -> Vec<f64> {
    let mut p = Vec::with_capacity(max_l + 1);
    p.push(1.0);
    if max_l == 0 {
        return p;
    }
    p.push(x);
    for l in 1..max_l {
        let next = ((2 * l + 1) as f64 * x * p[l] - l as f64 * p[l - 1]) / (l + 1) as f64;
        p.push(next);
    }
    p
}

/// Central-difference directional derivative of `f` at `point` along
/// `direction`, with stencil half-width `step`.
///
/// Only valid for smooth integrands: the separated, nonsingular parts of a
/// layered-medium kernel, or an off-diagonal kernel evaluation. The full
/// kernel must never be differenced across its Coulomb singularity.
pub fn three_point_stencil<F>(f: F, point: &Vector3<f64>, direction: &Vector3<f64>, step: f64) -> f64
where
    F: Fn(&Vector3<f64>) -> f64,
{
    let forward = point + direction * step;
    let backward = point - direction * step;
    (f(&forward) - f(&backward)) / (2.0 * step)
}

/// Natural cubic spline over a uniformly spaced grid.
///
/// Used to interpolate the tabulated radial solutions of layered-medium
/// kernels; a linear interpolant is too rough there because small stencil
/// steps would amplify its kinks into derivative noise.
#[derive(Clone, Debug)]
pub struct CubicSpline {
    x0: f64,
    step: f64,
    values: Vec<f64>,
    second: Vec<f64>,
}

impl CubicSpline {
    /// Fit a natural spline (vanishing second derivative at both ends)
    /// through `values[i]` at `x0 + i * step`. Needs at least two nodes.
    pub fn natural(x0: f64, step: f64, values: Vec<f64>) -> Self {
        let n = values.len();
        assert!(n >= 2, "a spline needs at least two nodes");
        assert!(step > 0.0, "spline step must be positive");
        let mut second = vec![0.0; n];
        if n > 2 {
            // Thomas algorithm on the tridiagonal system (1, 4, 1).
            let m = n - 2;
            let mut rhs = vec![0.0; m];
            for i in 0..m {
                rhs[i] = 6.0 * (values[i + 2] - 2.0 * values[i + 1] + values[i]) / (step * step);
            }
            let mut diag = vec![4.0; m];
            for i in 1..m {
                let w = 1.0 / diag[i - 1];
                diag[i] -= w;
                rhs[i] -= w * rhs[i - 1];
            }
            second[m] = rhs[m - 1] / diag[m - 1];
            for i in (0..m - 1).rev() {
                second[i + 1] = (rhs[i] - second[i + 2]) / diag[i];
            }
        }
        Self {
            x0,
            step,
            values,
            second,
        }
    }

    /// Interpolated value at `x`; `x` must lie within the fitted range
    /// (a small overhang of one step is tolerated for stencil evaluations).
    pub fn value(&self, x: f64) -> f64 {
        let n = self.values.len();
        let t = (x - self.x0) / self.step;
        assert!(
            t > -1.0 && t < n as f64,
            "spline evaluated outside its grid"
        );
        let i = (t.floor() as isize).clamp(0, n as isize - 2) as usize;
        let s = t - i as f64;
        let (ya, yb) = (self.values[i], self.values[i + 1]);
        let (ma, mb) = (self.second[i], self.second[i + 1]);
        let u = 1.0 - s;
        ya * u
            + yb * s
            + self.step * self.step / 6.0 * ((u * u * u - u) * ma + (s * s * s - s) * mb)
    }
}

/// Symmetrize a square matrix in place: `M <- (M + M^t) / 2`.
pub fn hermitivitize(matrix: &mut DMatrix<f64>) {
    let n = matrix.nrows();
    for i in 0..n {
        for j in 0..i {
            let mean = 0.5 * (matrix[(i, j)] + matrix[(j, i)]);
            matrix[(i, j)] = mean;
            matrix[(j, i)] = mean;
        }
    }
}

#[cfg(test)]
mod test {
    use super::{hermitivitize, legendre, three_point_stencil, CubicSpline};
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, Vector3};

    #[test]
    fn legendre_low_orders() {
        let x = 0.3;
        let p = legendre(3, x);
        assert_relative_eq!(p[0], 1.0);
        assert_relative_eq!(p[1], x);
        assert_relative_eq!(p[2], 0.5 * (3.0 * x * x - 1.0));
        assert_relative_eq!(p[3], 0.5 * (5.0 * x * x * x - 3.0 * x));
    }

    #[test]
    fn legendre_at_unity() {
        for p in legendre(12, 1.0) {
            assert_relative_eq!(p, 1.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn stencil_matches_analytic_derivative() {
        let f = |p: &Vector3<f64>| p.norm();
        let point = Vector3::new(1.0, 2.0, 2.0);
        let direction = Vector3::new(0.0, 0.0, 1.0);
        let d = three_point_stencil(f, &point, &direction, 1.0e-4);
        assert_relative_eq!(d, 2.0 / 3.0, max_relative = 1.0e-6);
    }

    #[test]
    fn spline_reproduces_smooth_function() {
        let n = 200;
        let step = 0.05;
        let values: Vec<f64> = (0..n).map(|i| (1.0 + i as f64 * step).ln()).collect();
        let spline = CubicSpline::natural(0.0, step, values);
        for &x in &[0.31, 2.47, 6.123, 9.7] {
            assert_relative_eq!(spline.value(x), (1.0 + x).ln(), max_relative = 1.0e-6);
        }
    }

    #[test]
    fn spline_is_exact_at_nodes() {
        let values = vec![1.0, -2.0, 0.5, 3.0, 2.0];
        let spline = CubicSpline::natural(1.0, 0.5, values.clone());
        for (i, v) in values.iter().enumerate() {
            assert_relative_eq!(
                spline.value(1.0 + 0.5 * i as f64),
                *v,
                max_relative = 1.0e-12
            );
        }
    }

    #[test]
    fn hermitivitize_symmetrizes() {
        let mut m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 4.0, 3.0]);
        hermitivitize(&mut m);
        assert_relative_eq!(m[(0, 1)], 3.0);
        assert_relative_eq!(m[(1, 0)], 3.0);
        assert_relative_eq!(m[(0, 0)], 1.0);
    }
}
