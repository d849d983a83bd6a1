//! 3D simplex noise with analytic derivatives.
//!
//! The lattice hash comes from a [`PermutationTable`] seeded through Alea, so a
//! field is a pure function of its seed and the query point. Each sample
//! returns the scalar value together with its exact partial derivatives; the
//! curl construction in [`crate::curl`] consumes only the gradient.

use crate::error::EngineError;
use crate::permutation::PermutationTable;
use glam::DVec3;

/// Skew factor into simplex space.
const F3: f64 = 1.0 / 3.0;
/// Unskew factor back to Cartesian space.
const G3: f64 = 1.0 / 6.0;
/// Final output scale bringing values into roughly [-1, 1].
const OUTPUT_SCALE: f64 = 32.0;
/// Squared radius of each corner's kernel.
const KERNEL_RADIUS_SQ: f64 = 0.5;

/// Gradient directions: midpoints of the 12 edges of a cube.
const GRAD3: [[f64; 3]; 12] = [
    [1.0, 1.0, 0.0],
    [-1.0, 1.0, 0.0],
    [1.0, -1.0, 0.0],
    [-1.0, -1.0, 0.0],
    [1.0, 0.0, 1.0],
    [-1.0, 0.0, 1.0],
    [1.0, 0.0, -1.0],
    [-1.0, 0.0, -1.0],
    [0.0, 1.0, 1.0],
    [0.0, -1.0, 1.0],
    [0.0, 1.0, -1.0],
    [0.0, -1.0, -1.0],
];

/// Noise value and its analytic gradient at one point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseSample {
    pub value: f64,
    pub gradient: DVec3,
}

/// Contribution of one simplex corner.
struct Corner {
    t: f64,
    t2: f64,
    t4: f64,
    g: DVec3,
    d: DVec3,
}

impl Corner {
    fn new(d: DVec3, gradient_index: usize) -> Self {
        let t = KERNEL_RADIUS_SQ - d.x * d.x - d.y * d.y - d.z * d.z;
        if t < 0.0 {
            return Self {
                t,
                t2: 0.0,
                t4: 0.0,
                g: DVec3::ZERO,
                d,
            };
        }
        let t2 = t * t;
        let [gx, gy, gz] = GRAD3[gradient_index];
        Self {
            t,
            t2,
            t4: t2 * t2,
            g: DVec3::new(gx, gy, gz),
            d,
        }
    }

    #[inline]
    fn g_dot_d(&self) -> f64 {
        self.g.x * self.d.x + self.g.y * self.d.y + self.g.z * self.d.z
    }

    #[inline]
    fn value(&self) -> f64 {
        if self.t < 0.0 {
            0.0
        } else {
            self.t4 * self.g_dot_d()
        }
    }
}

/// Seeded 3D simplex noise field.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseField {
    seed: f64,
    table: PermutationTable,
}

impl NoiseField {
    /// Builds the field for `seed`.
    ///
    /// Returns `EngineError::NonFinite` for NaN or infinite seeds.
    pub fn new(seed: f64) -> Result<Self, EngineError> {
        if !seed.is_finite() {
            return Err(EngineError::non_finite("seed", seed));
        }
        Ok(Self {
            seed,
            table: PermutationTable::from_seed(seed),
        })
    }

    /// The seed this field was built from.
    pub fn seed(&self) -> f64 {
        self.seed
    }

    /// The permutation tables backing the lattice hash.
    pub fn table(&self) -> &PermutationTable {
        &self.table
    }

    /// Samples the field at `p`.
    pub fn sample(&self, p: DVec3) -> NoiseSample {
        self.sample3(p.x, p.y, p.z)
    }

    /// Samples value and analytic gradient at `(xin, yin, zin)`.
    pub fn sample3(&self, xin: f64, yin: f64, zin: f64) -> NoiseSample {
        let s = (xin + yin + zin) * F3;
        let i = (xin + s).floor();
        let j = (yin + s).floor();
        let k = (zin + s).floor();

        let t = (i + j + k) * G3;
        let x0 = xin - (i - t);
        let y0 = yin - (j - t);
        let z0 = zin - (k - t);

        // Pick the tetrahedron containing the point from the ordering of its
        // fractional coordinates.
        let (o1, o2): ([f64; 3], [f64; 3]) = if x0 >= y0 {
            if y0 >= z0 {
                ([1.0, 0.0, 0.0], [1.0, 1.0, 0.0])
            } else if x0 >= z0 {
                ([1.0, 0.0, 0.0], [1.0, 0.0, 1.0])
            } else {
                ([0.0, 0.0, 1.0], [1.0, 0.0, 1.0])
            }
        } else if y0 < z0 {
            ([0.0, 0.0, 1.0], [0.0, 1.0, 1.0])
        } else if x0 < z0 {
            ([0.0, 1.0, 0.0], [0.0, 1.0, 1.0])
        } else {
            ([0.0, 1.0, 0.0], [1.0, 1.0, 0.0])
        };

        let d0 = DVec3::new(x0, y0, z0);
        let d1 = DVec3::new(x0 - o1[0] + G3, y0 - o1[1] + G3, z0 - o1[2] + G3);
        let d2 = DVec3::new(
            x0 - o2[0] + 2.0 * G3,
            y0 - o2[1] + 2.0 * G3,
            z0 - o2[2] + 2.0 * G3,
        );
        let d3 = DVec3::new(
            x0 - 1.0 + 3.0 * G3,
            y0 - 1.0 + 3.0 * G3,
            z0 - 1.0 + 3.0 * G3,
        );

        let ii = lattice_index(i);
        let jj = lattice_index(j);
        let kk = lattice_index(k);
        let (i1, j1, k1) = (o1[0] as usize, o1[1] as usize, o1[2] as usize);
        let (i2, j2, k2) = (o2[0] as usize, o2[1] as usize, o2[2] as usize);

        let tab = &self.table;
        let gi0 = tab.gradient_index(ii + tab.perm(jj + tab.perm(kk)));
        let gi1 = tab.gradient_index(ii + i1 + tab.perm(jj + j1 + tab.perm(kk + k1)));
        let gi2 = tab.gradient_index(ii + i2 + tab.perm(jj + j2 + tab.perm(kk + k2)));
        let gi3 = tab.gradient_index(ii + 1 + tab.perm(jj + 1 + tab.perm(kk + 1)));

        let corners = [
            Corner::new(d0, gi0),
            Corner::new(d1, gi1),
            Corner::new(d2, gi2),
            Corner::new(d3, gi3),
        ];

        let value = OUTPUT_SCALE
            * (corners[0].value() + corners[1].value() + corners[2].value() + corners[3].value());

        // d/dp [t^4 (g . d)] = -8 t^3 (g . d) d + t^4 g
        let mut gradient = corners[0].d * (corners[0].t2 * corners[0].t * corners[0].g_dot_d());
        for c in &corners[1..] {
            gradient += c.d * (c.t2 * c.t * c.g_dot_d());
        }
        gradient *= -8.0;
        gradient += corners[0].g * corners[0].t4
            + corners[1].g * corners[1].t4
            + corners[2].g * corners[2].t4
            + corners[3].g * corners[3].t4;
        gradient *= OUTPUT_SCALE;

        NoiseSample { value, gradient }
    }
}

/// Wraps a floored lattice coordinate into `0..=255`.
#[inline]
fn lattice_index(cell: f64) -> usize {
    ((cell as i64) & 255) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOLDEN_EPS: f64 = 1e-12;

    fn field(seed: f64) -> NoiseField {
        NoiseField::new(seed).unwrap()
    }

    fn assert_close(actual: f64, expected: f64, eps: f64, what: &str) {
        assert!(
            (actual - expected).abs() <= eps,
            "{what}: expected {expected}, got {actual}"
        );
    }

    // -- Construction --

    #[test]
    fn non_finite_seed_is_rejected() {
        assert!(matches!(
            NoiseField::new(f64::NAN),
            Err(EngineError::NonFinite { .. })
        ));
        assert!(NoiseField::new(f64::INFINITY).is_err());
        assert!(NoiseField::new(f64::NEG_INFINITY).is_err());
    }

    #[test]
    fn same_seed_builds_identical_fields() {
        let a = field(42.0);
        let b = field(42.0);
        assert_eq!(a.table(), b.table());
        for &(x, y, z) in &[(0.1, 0.2, 0.3), (-4.0, 7.5, 1.25), (100.0, -3.0, 0.0)] {
            let sa = a.sample3(x, y, z);
            let sb = b.sample3(x, y, z);
            assert_eq!(sa.value.to_bits(), sb.value.to_bits());
            assert_eq!(sa.gradient.x.to_bits(), sb.gradient.x.to_bits());
            assert_eq!(sa.gradient.y.to_bits(), sb.gradient.y.to_bits());
            assert_eq!(sa.gradient.z.to_bits(), sb.gradient.z.to_bits());
        }
    }

    // -- Golden values (seed 42) --

    #[test]
    fn golden_sample_near_origin() {
        let s = field(42.0).sample3(0.1, 0.2, 0.3);
        assert_close(s.value, 0.274_961_749_333_333_3, GOLDEN_EPS, "value");
        assert_close(s.gradient.x, -0.564_555_164_444_444_5, GOLDEN_EPS, "dx");
        assert_close(s.gradient.y, -0.523_498_951_111_111_2, GOLDEN_EPS, "dy");
        assert_close(s.gradient.z, -1.206_783_431_111_111, GOLDEN_EPS, "dz");
    }

    #[test]
    fn golden_sample_negative_cell() {
        let s = field(42.0).sample3(-1.5, 2.25, 0.75);
        assert_close(s.value, 0.152_994_791_666_666_52, GOLDEN_EPS, "value");
        assert_close(s.gradient.x, 0.578_993_055_555_555_7, GOLDEN_EPS, "dx");
        assert_close(s.gradient.y, 1.065_972_222_222_222_5, GOLDEN_EPS, "dy");
        assert_close(s.gradient.z, -0.155_381_944_444_443_75, GOLDEN_EPS, "dz");
    }

    #[test]
    fn golden_sample_far_cell() {
        let s = field(42.0).sample3(10.5, -3.3, 7.1);
        assert_close(s.value, -0.029_464_855_967_078_235, GOLDEN_EPS, "value");
        assert_close(s.gradient.x, 0.269_147_325_102_879_2, GOLDEN_EPS, "dx");
        assert_close(s.gradient.y, -0.164_927_736_625_514_5, GOLDEN_EPS, "dy");
        assert_close(s.gradient.z, 0.079_391_275_720_162_87, GOLDEN_EPS, "dz");
    }

    // -- Analytic gradient --

    #[test]
    fn gradient_matches_central_differences_on_grid() {
        let f = field(7.0);
        let h = 1e-5;
        for ix in -4..4 {
            for iy in -4..4 {
                for iz in -4..4 {
                    let p = DVec3::new(ix as f64 * 0.37, iy as f64 * 0.41 + 0.05, iz as f64 * 0.29);
                    let analytic = f.sample(p).gradient;
                    let numeric = DVec3::new(
                        (f.sample(p + DVec3::X * h).value - f.sample(p - DVec3::X * h).value)
                            / (2.0 * h),
                        (f.sample(p + DVec3::Y * h).value - f.sample(p - DVec3::Y * h).value)
                            / (2.0 * h),
                        (f.sample(p + DVec3::Z * h).value - f.sample(p - DVec3::Z * h).value)
                            / (2.0 * h),
                    );
                    assert!(
                        (analytic - numeric).abs().max_element() < 1e-3,
                        "gradient mismatch at {p}: analytic {analytic}, numeric {numeric}"
                    );
                }
            }
        }
    }

    #[test]
    fn lattice_vertices_give_zero_value() {
        // At a lattice vertex the only contributing displacement is zero.
        let f = field(42.0);
        for &(x, y, z) in &[(0.0, 0.0, 0.0), (1.0, 1.0, 1.0), (-2.0, 3.0, 5.0)] {
            assert!(f.sample3(x, y, z).value.abs() < 1e-12);
        }
    }

    #[test]
    fn lattice_index_wraps_negative_cells() {
        assert_eq!(lattice_index(-1.0), 255);
        assert_eq!(lattice_index(256.0), 0);
        assert_eq!(lattice_index(-257.0), 255);
        assert_eq!(lattice_index(3.0), 3);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn coord() -> impl Strategy<Value = f64> {
            -500.0_f64..500.0
        }

        proptest! {
            #[test]
            fn value_is_bounded_and_finite(x in coord(), y in coord(), z in coord()) {
                let s = field(42.0).sample3(x, y, z);
                prop_assert!(s.value.is_finite());
                prop_assert!(s.value.abs() <= 1.2, "value {} out of range", s.value);
                prop_assert!(s.gradient.is_finite());
            }

            #[test]
            fn gradient_matches_finite_difference(
                seed in -1000.0_f64..1000.0,
                x in coord(),
                y in coord(),
                z in coord(),
            ) {
                let f = field(seed.round());
                let p = DVec3::new(x, y, z);
                let h = 1e-5;
                let analytic = f.sample(p).gradient;
                let dx = (f.sample(p + DVec3::X * h).value - f.sample(p - DVec3::X * h).value) / (2.0 * h);
                let dy = (f.sample(p + DVec3::Y * h).value - f.sample(p - DVec3::Y * h).value) / (2.0 * h);
                let dz = (f.sample(p + DVec3::Z * h).value - f.sample(p - DVec3::Z * h).value) / (2.0 * h);
                prop_assert!((analytic.x - dx).abs() < 1e-3, "dx {} vs {}", analytic.x, dx);
                prop_assert!((analytic.y - dy).abs() < 1e-3, "dy {} vs {}", analytic.y, dy);
                prop_assert!((analytic.z - dz).abs() < 1e-3, "dz {} vs {}", analytic.z, dz);
            }
        }
    }
}
