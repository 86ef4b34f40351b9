//! Abelian point groups and symmetry-adapted matrix blocking.
//!
//! The supported groups are the eight Abelian subgroups of the full
//! rotation-reflection group that have real one-dimensional irreducible
//! representations: C1, C2, Cs, Ci, D2, C2v, C2h and D2h. Every group
//! operation either keeps or flips each Cartesian axis, so an operation is
//! encoded as a 3-bit mask (bit 0 flips x, bit 1 flips y, bit 2 flips z)
//! and the whole group is generated by at most three such masks under XOR.

use crate::error::PcmError;
use nalgebra::{DMatrix, Vector3};

/// Axis-flip mask of the C2 rotation about z.
pub const C2Z: u8 = 0b011;
/// Axis-flip mask of the C2 rotation about y.
pub const C2Y: u8 = 0b101;
/// Axis-flip mask of the C2 rotation about x.
pub const C2X: u8 = 0b110;
/// Axis-flip mask of the mirror plane xy.
pub const SIGMA_XY: u8 = 0b100;
/// Axis-flip mask of the mirror plane xz.
pub const SIGMA_XZ: u8 = 0b010;
/// Axis-flip mask of the mirror plane yz.
pub const SIGMA_YZ: u8 = 0b001;
/// Axis-flip mask of the inversion center.
pub const INVERSION: u8 = 0b111;

/// An Abelian molecular point group given by up to three generators.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PointGroup {
    label: String,
    nr_generators: usize,
    generators: [u8; 3],
}

impl PointGroup {
    /// Build a group from explicit generator masks.
    ///
    /// The generators must be independent: no generator may equal the XOR
    /// of a subset of the others, otherwise the group order would not be
    /// `2^nr_generators`.
    pub fn from_generators(
        label: &str,
        nr_generators: usize,
        generators: [u8; 3],
    ) -> Result<Self, PcmError> {
        if nr_generators > 3 {
            return Err(PcmError::Configuration(format!(
                "a point group has at most 3 generators, got {nr_generators}"
            )));
        }
        let group = Self {
            label: label.to_string(),
            nr_generators,
            generators,
        };
        let mut seen = vec![false; 8];
        for g in 0..group.nr_irrep() {
            let op = group.operation(g) as usize;
            if seen[op] {
                return Err(PcmError::Configuration(format!(
                    "generators of {label} are not independent"
                )));
            }
            seen[op] = true;
        }
        Ok(group)
    }

    /// Build one of the eight supported groups from its Schoenflies label.
    pub fn for_label(label: &str) -> Result<Self, PcmError> {
        let (nr, gens) = match label {
            "C1" => (0, [0, 0, 0]),
            "C2" => (1, [C2Z, 0, 0]),
            "Cs" => (1, [SIGMA_XY, 0, 0]),
            "Ci" => (1, [INVERSION, 0, 0]),
            "D2" => (2, [C2Z, C2Y, 0]),
            "C2v" => (2, [C2Z, SIGMA_XZ, 0]),
            "C2h" => (2, [C2Z, SIGMA_XY, 0]),
            "D2h" => (3, [C2Z, C2Y, SIGMA_XY]),
            _ => {
                return Err(PcmError::Configuration(format!(
                    "unknown point group label {label}"
                )))
            }
        };
        Self::from_generators(label, nr, gens)
    }

    /// The trivial group.
    pub fn trivial() -> Self {
        Self::for_label("C1").expect("C1 is always available")
    }

    /// Schoenflies label the group was built with.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of generators.
    pub fn nr_generators(&self) -> usize {
        self.nr_generators
    }

    /// Number of irreducible representations, `2^nr_generators`.
    ///
    /// For these groups this also equals the number of group operations.
    pub fn nr_irrep(&self) -> usize {
        1 << self.nr_generators
    }

    /// Axis-flip mask of group operation `index`, `0 <= index < nr_irrep()`.
    ///
    /// Bit `t` of `index` selects whether generator `t` enters the product;
    /// the indexing is therefore a group isomorphism onto XOR on bit
    /// strings, which is what the character formula below relies on.
    pub fn operation(&self, index: usize) -> u8 {
        let mut op = 0u8;
        for t in 0..self.nr_generators {
            if index & (1 << t) != 0 {
                op ^= self.generators[t];
            }
        }
        op
    }

    /// Character of operation `j` in irreducible representation `i`.
    pub fn character(i: usize, j: usize) -> f64 {
        parity(i & j)
    }

    /// Apply the operation with mask `op` to a point.
    pub fn image(op: u8, point: &Vector3<f64>) -> Vector3<f64> {
        let mut image = *point;
        for axis in 0..3 {
            if op & (1 << axis) != 0 {
                image[axis] = -image[axis];
            }
        }
        image
    }
}

/// `(-1)^popcount(i)`: the parity of a bit mask.
pub fn parity(i: usize) -> f64 {
    if i.count_ones() % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}

/// Threshold below which blocked matrix entries are discarded as numerical
/// noise.
const BLOCKING_THRESHOLD: f64 = 1.0e-14;

/// Block-diagonalize `matrix` over the irreducible representations of an
/// Abelian group of order `nr_irrep`.
///
/// The cavity ordering contract makes `matrix` group-circulant over
/// `nr_irrep x nr_irrep` blocks of size `irr_size`; the congruence with the
/// character table `U` (entries `parity(i & j)`) then turns it into
/// block-diagonal form, `M <- U M U^t / nr_irrep`. The division carries the
/// symmetry normalization: applying a diagonal block to the matching
/// segment of an untransformed potential yields the charges of the
/// irreducible elements directly.
pub fn symmetry_blocking(matrix: &mut DMatrix<f64>, irr_size: usize, nr_irrep: usize) {
    let size = matrix.nrows();
    debug_assert_eq!(size, irr_size * nr_irrep);
    if nr_irrep < 2 {
        return;
    }
    let u = DMatrix::from_fn(size, size, |a, b| {
        let (i, p) = (a / irr_size, a % irr_size);
        let (j, q) = (b / irr_size, b % irr_size);
        if p == q {
            PointGroup::character(i, j)
        } else {
            0.0
        }
    });
    let blocked = (&u * &*matrix * u.transpose()) / nr_irrep as f64;
    *matrix = blocked;
    for entry in matrix.iter_mut() {
        if entry.abs() < BLOCKING_THRESHOLD {
            *entry = 0.0;
        }
    }
}

/// Extract the diagonal blocks of a block-diagonalized matrix, one small
/// dense block per irreducible representation.
pub fn symmetry_packing(full: &DMatrix<f64>, irr_size: usize, nr_irrep: usize) -> Vec<DMatrix<f64>> {
    (0..nr_irrep)
        .map(|b| {
            let off = b * irr_size;
            DMatrix::from_fn(irr_size, irr_size, |p, q| full[(off + p, off + q)])
        })
        .collect()
}

#[cfg(test)]
mod test {
    use super::{parity, symmetry_blocking, symmetry_packing, PointGroup};
    use approx::assert_relative_eq;
    use nalgebra::{DMatrix, Vector3};

    #[test]
    fn parity_counts_bits() {
        assert_relative_eq!(parity(0), 1.0);
        assert_relative_eq!(parity(0b001), -1.0);
        assert_relative_eq!(parity(0b011), 1.0);
        assert_relative_eq!(parity(0b111), -1.0);
    }

    #[test]
    fn group_orders() {
        for (label, order) in [
            ("C1", 1),
            ("C2", 2),
            ("Cs", 2),
            ("Ci", 2),
            ("D2", 4),
            ("C2v", 4),
            ("C2h", 4),
            ("D2h", 8),
        ] {
            let group = PointGroup::for_label(label).unwrap();
            assert_eq!(group.nr_irrep(), order, "group {label}");
        }
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert!(PointGroup::for_label("C3v").is_err());
    }

    #[test]
    fn dependent_generators_are_rejected() {
        // C2z * C2y = C2x, so the third generator is redundant.
        assert!(PointGroup::from_generators(
            "bad",
            3,
            [super::C2Z, super::C2Y, super::C2X]
        )
        .is_err());
    }

    #[test]
    fn operations_close_under_xor() {
        let group = PointGroup::for_label("D2h").unwrap();
        for i in 0..group.nr_irrep() {
            for j in 0..group.nr_irrep() {
                let product = group.operation(i) ^ group.operation(j);
                assert_eq!(product, group.operation(i ^ j));
            }
        }
    }

    #[test]
    fn image_flips_axes() {
        let p = Vector3::new(1.0, 2.0, 3.0);
        let flipped = PointGroup::image(super::C2Z, &p);
        assert_relative_eq!(flipped.x, -1.0);
        assert_relative_eq!(flipped.y, -2.0);
        assert_relative_eq!(flipped.z, 3.0);
    }

    /// A group-circulant matrix must come out exactly block-diagonal, and
    /// applying the first block to a symmetric vector segment must
    /// reproduce the full-space product on that segment.
    #[test]
    fn blocking_diagonalizes_circulant() {
        let group = PointGroup::for_label("C2v").unwrap();
        let g = group.nr_irrep();
        let d = 3;
        // f(i XOR j) blocks, each a fixed small matrix scaled differently.
        let base = DMatrix::from_fn(d, d, |p, q| 1.0 / (1.0 + (p + 2 * q) as f64));
        let scale = [1.0, 0.3, 0.2, 0.1];
        let mut full = DMatrix::zeros(g * d, g * d);
        for i in 0..g {
            for j in 0..g {
                for p in 0..d {
                    for q in 0..d {
                        full[(i * d + p, j * d + q)] = scale[i ^ j] * base[(p, q)];
                    }
                }
            }
        }
        // A totally symmetric vector: identical segments in every block.
        let v = nalgebra::DVector::from_fn(g * d, |a, _| 1.0 + (a % d) as f64);
        let reference = &full * &v;

        let mut blocked = full.clone();
        symmetry_blocking(&mut blocked, d, g);
        for i in 0..g {
            for j in 0..g {
                if i == j {
                    continue;
                }
                for p in 0..d {
                    for q in 0..d {
                        assert_relative_eq!(blocked[(i * d + p, j * d + q)], 0.0);
                    }
                }
            }
        }
        let blocks = symmetry_packing(&blocked, d, g);
        let segment = nalgebra::DVector::from_fn(d, |p, _| v[p]);
        let from_block = &blocks[0] * &segment;
        for p in 0..d {
            assert_relative_eq!(from_block[p], reference[p], max_relative = 1.0e-12);
        }
    }
}
