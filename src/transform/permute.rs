use crate::lp::Lp;
use crate::simplex::basis::Basis;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// A reordering of the columns: column `k` of the permuted LP is column
/// `perm[k]` of the original.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Permutation {
    perm: Vec<usize>,
    inverse: Vec<usize>,
}

impl Permutation {
    pub fn new(perm: Vec<usize>) -> Self {
        let mut inverse = vec![0; perm.len()];

        for (k, &col) in perm.iter().enumerate() {
            inverse[col] = k;
        }

        Self { perm, inverse }
    }

    pub fn random(num_col: usize, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut perm: Vec<usize> = (0..num_col).collect();
        perm.shuffle(&mut rng);
        Self::new(perm)
    }

    /// Original column of permuted column `k`.
    #[inline]
    pub fn original(&self, k: usize) -> usize {
        self.perm[k]
    }

    /// Permuted column of original column `col`.
    #[inline]
    pub fn permuted(&self, col: usize) -> usize {
        self.inverse[col]
    }

    pub fn apply(&self, lp: &mut Lp) {
        let source = lp.clone();

        lp.a_index.clear();
        lp.a_value.clear();
        lp.a_start = vec![0];

        for (k, &col) in self.perm.iter().enumerate() {
            lp.col_cost[k] = source.col_cost[col];
            lp.col_lower[k] = source.col_lower[col];
            lp.col_upper[k] = source.col_upper[col];

            for (row, value) in source.column(col) {
                lp.a_index.push(row);
                lp.a_value.push(value);
            }

            lp.a_start.push(lp.a_index.len());
        }
    }

    /// Values indexed by permuted column, reordered by original column.
    pub fn unpermute<T: Copy>(&self, values: &[T]) -> Vec<T> {
        self.inverse.iter().map(|&k| values[k]).collect()
    }

    /// Basis of the permuted LP matching `basis` of the original one.
    pub fn permute_basis(&self, basis: &Basis) -> Basis {
        map_basis(basis, &self.inverse, &self.perm)
    }

    /// Basis of the original LP matching `basis` of the permuted one.
    pub fn unpermute_basis(&self, basis: &Basis) -> Basis {
        map_basis(basis, &self.perm, &self.inverse)
    }
}

//variable j < num_col goes to forward[j], and the new variable k comes from backward[k]
fn map_basis(basis: &Basis, forward: &[usize], backward: &[usize]) -> Basis {
    let num_col = forward.len();
    let map = |var: usize, to: &[usize]| if var < num_col { to[var] } else { var };

    Basis {
        basic_index: basis.basic_index.iter().map(|&var| map(var, forward)).collect(),
        nonbasic_flag: (0..basis.num_tot())
            .map(|var| basis.nonbasic_flag[map(var, backward)])
            .collect(),
        nonbasic_move: (0..basis.num_tot())
            .map(|var| basis.nonbasic_move[map(var, backward)])
            .collect(),
    }
}
