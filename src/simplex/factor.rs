use crate::simplex::lu::SparseLu;
use crate::simplex::matrix::Matrix;
use crate::util::TINY;

use log::debug;

/// Times the basis may be repaired before a factorization is given up.
pub const MAX_REPAIR_ATTEMPTS: usize = 5;

//kernel entries below this (relative to the largest entry) are dropped as zero
const SINGULAR_TOL: f64 = 1e-11;

const TINY_PIVOT: f64 = 1e-8;

//eta entries allowed per entry of the base factorization
const ETA_FILL_FACTOR: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateHint {
    Continue,
    Refactor,
}

/// A singular basis: the structurals at `dependent_positions` are linearly
/// dependent on the other basic columns, and no basic column covers the
/// `uncovered_rows`. There are as many dependent positions as uncovered rows.
#[derive(Debug, Clone, PartialEq)]
pub struct RankDeficiency {
    pub dependent_positions: Vec<usize>,
    pub uncovered_rows: Vec<usize>,
}

//product form update: the basis position `position` was replaced by a column
//whose ftran result has `pivot` at that position and `entries` elsewhere
#[derive(Debug, Clone)]
struct Eta {
    position: usize,
    pivot: f64,
    entries: Vec<(usize, f64)>,
}

/// Factorization of the basis matrix `B` of `[A I]`.
///
/// The basic slacks are eliminated symbolically. What remains is the kernel:
/// the basic structural columns restricted to the rows whose slack is nonbasic.
/// It is factorized with a sparse Markowitz LU. Basis changes after the
/// factorization are held in an eta file.
///
/// `ftran` takes a vector indexed by row and returns one indexed by basis
/// position, `btran` the other way around.
#[derive(Debug, Clone)]
pub struct Factor {
    num_row: usize,

    kernel_rows: Vec<usize>,
    kernel_positions: Vec<usize>,
    kernel_columns: Vec<Vec<(usize, f64)>>,
    slack_positions: Vec<(usize, usize)>,
    slack_position_of_row: Vec<Option<usize>>,

    lu: SparseLu,

    etas: Vec<Eta>,
    eta_nnz: usize,
    base_size: usize,
    update_limit: usize,
}

impl Factor {
    pub fn build(
        matrix: &Matrix,
        basic_index: &[usize],
        update_limit: usize,
    ) -> Result<Self, RankDeficiency> {
        let num_col = matrix.num_col();
        let num_row = matrix.num_row();

        let mut slack_position_of_row = vec![None; num_row];
        let mut slack_positions = Vec::new();
        let mut kernel_positions = Vec::new();

        for (position, &var) in basic_index.iter().enumerate() {
            if var >= num_col {
                slack_position_of_row[var - num_col] = Some(position);
                slack_positions.push((position, var - num_col));
            } else {
                kernel_positions.push(position);
            }
        }

        let kernel_rows: Vec<usize> = (0..num_row)
            .filter(|&row| slack_position_of_row[row].is_none())
            .collect();

        let mut kernel_index_of_row = vec![None; num_row];

        for (k, &row) in kernel_rows.iter().enumerate() {
            kernel_index_of_row[row] = Some(k);
        }

        let kernel_columns: Vec<Vec<(usize, f64)>> = kernel_positions
            .iter()
            .map(|&position| matrix.column(basic_index[position]).collect())
            .collect();

        let kernel: Vec<Vec<(usize, f64)>> = kernel_columns
            .iter()
            .map(|column| {
                column
                    .iter()
                    .filter_map(|&(row, value)| kernel_index_of_row[row].map(|k| (k, value)))
                    .collect()
            })
            .collect();

        let dim = kernel_rows.len();
        let amax = kernel
            .iter()
            .flatten()
            .fold(0., |max: f64, (_, value)| max.max(value.abs()));

        let drop_tol = SINGULAR_TOL * amax.max(1.);

        //the columns and rows left without a pivot make up the deficiency
        let lu = SparseLu::factorize(dim, &kernel, drop_tol).map_err(|singular| {
            let deficiency = RankDeficiency {
                dependent_positions: singular.cols.iter().map(|&k| kernel_positions[k]).collect(),
                uncovered_rows: singular.rows.iter().map(|&k| kernel_rows[k]).collect(),
            };

            debug!(
                "singular basis, dependent positions: {:?}, uncovered rows: {:?}",
                deficiency.dependent_positions, deficiency.uncovered_rows
            );

            deficiency
        })?;

        let base_size = num_row + lu.nnz();

        debug!(
            "factorized basis with {} slacks and a kernel of dimension {}",
            slack_positions.len(),
            dim
        );

        Ok(Self {
            num_row,
            kernel_rows,
            kernel_positions,
            kernel_columns,
            slack_positions,
            slack_position_of_row,
            lu,
            etas: Vec::new(),
            eta_nnz: 0,
            base_size,
            update_limit,
        })
    }

    #[inline]
    pub fn num_row(&self) -> usize {
        self.num_row
    }

    #[inline]
    pub fn num_updates(&self) -> usize {
        self.etas.len()
    }

    /// No updates since the factorization was built.
    #[inline]
    pub fn is_fresh(&self) -> bool {
        self.etas.is_empty()
    }

    /// Solves `B x = rhs`, overwriting `rhs` with `x`.
    pub fn ftran(&self, rhs: &mut nalgebra::DVector<f64>) {
        let mut kernel_rhs: Vec<f64> = self.kernel_rows.iter().map(|&row| rhs[row]).collect();
        self.lu.solve(&mut kernel_rhs);

        let mut x = nalgebra::DVector::zeros(self.num_row);

        for (k, &position) in self.kernel_positions.iter().enumerate() {
            x[position] = kernel_rhs[k];
        }

        for &(position, row) in &self.slack_positions {
            x[position] = rhs[row];
        }

        for (k, column) in self.kernel_columns.iter().enumerate() {
            let x_k = kernel_rhs[k];

            if x_k == 0. {
                continue;
            }

            for &(row, value) in column {
                if let Some(position) = self.slack_position_of_row[row] {
                    x[position] -= value * x_k;
                }
            }
        }

        for eta in &self.etas {
            let x_p = x[eta.position] / eta.pivot;
            x[eta.position] = x_p;

            if x_p != 0. {
                for &(i, value) in &eta.entries {
                    x[i] -= value * x_p;
                }
            }
        }

        *rhs = x;
    }

    /// Solves `Bᵀ y = rhs`, overwriting `rhs` with `y`.
    pub fn btran(&self, rhs: &mut nalgebra::DVector<f64>) {
        for eta in self.etas.iter().rev() {
            let dot: f64 = eta.entries.iter().map(|&(i, value)| value * rhs[i]).sum();
            rhs[eta.position] = (rhs[eta.position] - dot) / eta.pivot;
        }

        let mut y = nalgebra::DVector::zeros(self.num_row);

        for &(position, row) in &self.slack_positions {
            y[row] = rhs[position];
        }

        let mut kernel_rhs: Vec<f64> = self
            .kernel_positions
            .iter()
            .zip(&self.kernel_columns)
            .map(|(&position, column)| {
                rhs[position]
                    - column
                        .iter()
                        .filter(|(row, _)| self.slack_position_of_row[*row].is_some())
                        .map(|&(row, value)| value * y[row])
                        .sum::<f64>()
            })
            .collect();

        self.lu.solve_transposed(&mut kernel_rhs);

        for (k, &row) in self.kernel_rows.iter().enumerate() {
            y[row] = kernel_rhs[k];
        }

        *rhs = y;
    }

    /// Records that the basic variable at `position` was replaced by a column
    /// whose ftran result is `col_aq`.
    pub fn update(&mut self, col_aq: &nalgebra::DVector<f64>, position: usize) -> UpdateHint {
        let pivot = col_aq[position];

        let entries: Vec<(usize, f64)> = col_aq
            .iter()
            .enumerate()
            .filter(|&(i, value)| i != position && value.abs() > TINY)
            .map(|(i, &value)| (i, value))
            .collect();

        self.eta_nnz += entries.len() + 1;
        self.etas.push(Eta {
            position,
            pivot,
            entries,
        });

        if self.etas.len() >= self.update_limit {
            debug!("reached {} basis updates", self.etas.len());
            UpdateHint::Refactor
        } else if self.eta_nnz > ETA_FILL_FACTOR * self.base_size {
            debug!("eta file has {} entries", self.eta_nnz);
            UpdateHint::Refactor
        } else if pivot.abs() < TINY_PIVOT {
            debug!("tiny pivot {:e} in basis update", pivot);
            UpdateHint::Refactor
        } else {
            UpdateHint::Continue
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::lp::Lp;
    use crate::simplex::basis::Basis;

    const TOL: f64 = 1e-10;

    // 2 0 1
    // 1 3 0
    // 0 1 4
    pub fn lp_3x3() -> Lp {
        let mut lp = Lp::new();
        lp.num_col = 3;
        lp.num_row = 3;
        lp.col_cost = vec![1., 1., 1.];
        lp.col_lower = vec![0.; 3];
        lp.col_upper = vec![f64::INFINITY; 3];
        lp.row_lower = vec![1.; 3];
        lp.row_upper = vec![f64::INFINITY; 3];
        lp.a_start = vec![0, 2, 4, 6];
        lp.a_index = vec![0, 1, 1, 2, 0, 2];
        lp.a_value = vec![2., 1., 3., 1., 1., 4.];
        lp
    }

    fn unit(dim: usize, i: usize) -> nalgebra::DVector<f64> {
        let mut e = nalgebra::DVector::zeros(dim);
        e[i] = 1.;
        e
    }

    fn check_round_trip(matrix: &Matrix, factor: &Factor, basic_index: &[usize]) {
        let m = basic_index.len();

        for i in 0..m {
            //B ftran(e_i) = e_i
            let mut x = unit(m, i);
            factor.ftran(&mut x);
            let mut bx = nalgebra::DVector::zeros(m);

            for (position, &var) in basic_index.iter().enumerate() {
                matrix.collect_aj(&mut bx, var, x[position]);
            }

            assert!((bx - unit(m, i)).amax() < TOL);

            //Bᵀ btran(e_i) = e_i
            let mut y = unit(m, i);
            factor.btran(&mut y);

            for (position, &var) in basic_index.iter().enumerate() {
                let dot: f64 = matrix
                    .total_column(var)
                    .iter()
                    .map(|&(row, value)| value * y[row])
                    .sum();
                let expected = if position == i { 1. } else { 0. };
                assert!((dot - expected).abs() < TOL, "{} vs {}", dot, expected);
            }
        }
    }

    #[test]
    fn logical_basis_round_trip() {
        let lp = lp_3x3();
        let basis = Basis::logical(&lp);
        let matrix = Matrix::setup(&lp, &basis.nonbasic_flag);
        let factor = Factor::build(&matrix, basis.basic_index(), 100).unwrap();
        check_round_trip(&matrix, &factor, basis.basic_index());
    }

    #[test]
    fn mixed_basis_round_trip() {
        let lp = lp_3x3();
        let basic_index = vec![0, 4, 2];
        let matrix = Matrix::setup(&lp, &[false, true, false, true, false, true]);
        let factor = Factor::build(&matrix, &basic_index, 100).unwrap();
        assert!(factor.is_fresh());
        check_round_trip(&matrix, &factor, &basic_index);
    }

    #[test]
    fn structural_basis_round_trip() {
        let lp = lp_3x3();
        let basic_index = vec![2, 0, 1];
        let matrix = Matrix::setup(&lp, &[false, false, false, true, true, true]);
        let factor = Factor::build(&matrix, &basic_index, 100).unwrap();

        //the kernel is all of A, with 6 entries and at most one filled in
        assert!(factor.base_size <= 3 + 6 + 1);
        check_round_trip(&matrix, &factor, &basic_index);
    }

    #[test]
    fn round_trip_after_updates() {
        let lp = lp_3x3();
        let mut basic_index = vec![0, 4, 2];
        let matrix = Matrix::setup(&lp, &[false, true, false, true, false, true]);
        let mut factor = Factor::build(&matrix, &basic_index, 100).unwrap();

        //column 1 replaces the slack of row 1
        let mut col_aq = nalgebra::DVector::zeros(3);
        matrix.collect_aj(&mut col_aq, 1, 1.);
        factor.ftran(&mut col_aq);
        assert_eq!(factor.update(&col_aq, 1), UpdateHint::Continue);
        basic_index[1] = 1;
        check_round_trip(&matrix, &factor, &basic_index);

        //slack of row 0 replaces column 0
        let mut col_aq = nalgebra::DVector::zeros(3);
        matrix.collect_aj(&mut col_aq, 3, 1.);
        factor.ftran(&mut col_aq);
        factor.update(&col_aq, 0);
        basic_index[0] = 3;
        check_round_trip(&matrix, &factor, &basic_index);
        assert_eq!(factor.num_updates(), 2);
        assert!(!factor.is_fresh());
    }

    #[test]
    fn update_limit_requests_refactor() {
        let lp = lp_3x3();
        let basis = Basis::logical(&lp);
        let matrix = Matrix::setup(&lp, &basis.nonbasic_flag);
        let mut factor = Factor::build(&matrix, basis.basic_index(), 1).unwrap();

        let mut col_aq = nalgebra::DVector::zeros(3);
        matrix.collect_aj(&mut col_aq, 0, 1.);
        factor.ftran(&mut col_aq);
        assert_eq!(factor.update(&col_aq, 0), UpdateHint::Refactor);
    }

    #[test]
    fn singular_basis_is_diagnosed() {
        let mut lp = lp_3x3();
        //column 2 becomes a multiple of column 0
        lp.a_index = vec![0, 1, 1, 2, 0, 1];
        lp.a_value = vec![2., 1., 3., 1., 4., 2.];

        let matrix = Matrix::setup(&lp, &[false, true, false, true, true, false]);
        let deficiency = Factor::build(&matrix, &[0, 2, 5], 100).unwrap_err();
        assert_eq!(deficiency.dependent_positions, vec![1]);
        assert_eq!(deficiency.uncovered_rows, vec![1]);
    }
}
