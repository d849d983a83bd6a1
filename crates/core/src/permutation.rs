//! Seeded byte permutation backing the simplex noise lattice hash.

use crate::prng::Alea;

/// Number of distinct lattice hash values.
pub const TABLE_SIZE: usize = 256;

/// Length of the doubled lookup tables; indices up to `255 + 1 + 255` stay in range.
pub const EXTENDED_SIZE: usize = TABLE_SIZE * 2;

/// Number of gradient directions in the 3D gradient set.
pub const GRADIENT_COUNT: u8 = 12;

/// Shuffles the identity permutation `0..=255` with Fisher-Yates, drawing
/// indices from `random`.
pub fn build_table(random: &mut Alea) -> [u8; TABLE_SIZE] {
    let mut p = [0u8; TABLE_SIZE];
    for (i, slot) in p.iter_mut().enumerate() {
        *slot = i as u8;
    }
    for i in 0..TABLE_SIZE - 1 {
        let r = i + (random.next_f64() * (TABLE_SIZE - i) as f64) as usize;
        p.swap(i, r);
    }
    p
}

/// The permutation extended to 512 entries plus its mod-12 gradient indices.
///
/// Immutable once built; identical seeds give identical tables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermutationTable {
    base: [u8; TABLE_SIZE],
    perm: [u8; EXTENDED_SIZE],
    perm_mod12: [u8; EXTENDED_SIZE],
}

impl PermutationTable {
    /// Builds the tables for a numeric seed.
    pub fn from_seed(seed: f64) -> Self {
        let mut random = Alea::from_seed(seed);
        Self::from_base(build_table(&mut random))
    }

    /// Extends an existing 256-entry permutation.
    pub fn from_base(base: [u8; TABLE_SIZE]) -> Self {
        let mut perm = [0u8; EXTENDED_SIZE];
        let mut perm_mod12 = [0u8; EXTENDED_SIZE];
        for i in 0..EXTENDED_SIZE {
            perm[i] = base[i & 255];
            perm_mod12[i] = perm[i] % GRADIENT_COUNT;
        }
        Self {
            base,
            perm,
            perm_mod12,
        }
    }

    /// The 256-entry shuffled permutation.
    pub fn base(&self) -> &[u8; TABLE_SIZE] {
        &self.base
    }

    #[inline]
    pub fn perm(&self, index: usize) -> usize {
        self.perm[index] as usize
    }

    #[inline]
    pub fn gradient_index(&self, index: usize) -> usize {
        self.perm_mod12[index] as usize
    }
}
