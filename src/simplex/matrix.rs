use crate::lp::Lp;
use crate::util::TINY;

use std::ops::Range;

//below this density of row_ep, the pivotal row is priced row-wise
const ROW_PRICE_DENSITY: f64 = 0.1;

/// Column-wise and row-wise copies of the constraint matrix of the solver LP.
///
/// The entries of each row are partitioned: the columns that are nonbasic come
/// first (up to `ar_n_end[row]`), followed by the basic ones, so that pricing
/// by row only touches nonbasic columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    num_col: usize,
    num_row: usize,

    a_start: Vec<usize>,
    a_index: Vec<usize>,
    a_value: Vec<f64>,

    ar_start: Vec<usize>,
    ar_n_end: Vec<usize>,
    ar_index: Vec<usize>,
    ar_value: Vec<f64>,

    //(column_in, column_out) for every update since setup
    change_log: Vec<(usize, usize)>,
}

impl Matrix {
    pub fn setup(lp: &Lp, nonbasic_flag: &[bool]) -> Self {
        let (ar_start, ar_index, ar_value) = lp.row_wise();

        let mut matrix = Self {
            num_col: lp.num_col,
            num_row: lp.num_row,
            a_start: lp.a_start.clone(),
            a_index: lp.a_index.clone(),
            a_value: lp.a_value.clone(),
            ar_n_end: vec![0; lp.num_row],
            ar_start,
            ar_index,
            ar_value,
            change_log: Vec::new(),
        };

        matrix.partition(nonbasic_flag);
        matrix
    }

    /// Reorders the row-wise copy for a new basis.
    pub fn partition(&mut self, nonbasic_flag: &[bool]) {
        for row in 0..self.num_row {
            let (start, end) = (self.ar_start[row], self.ar_start[row + 1]);
            let mut n_end = start;

            for k in start..end {
                if nonbasic_flag[self.ar_index[k]] {
                    self.ar_index.swap(k, n_end);
                    self.ar_value.swap(k, n_end);
                    n_end += 1;
                }
            }

            self.ar_n_end[row] = n_end;
        }

        self.change_log.clear();
    }

    #[inline]
    pub fn num_col(&self) -> usize {
        self.num_col
    }

    #[inline]
    pub fn num_row(&self) -> usize {
        self.num_row
    }

    pub fn num_nz(&self) -> usize {
        self.a_index.len()
    }

    /// Entries `(row, value)` of structural column `col`.
    pub fn column(&self, col: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.a_start[col]..self.a_start[col + 1];
        self.a_index[range.clone()]
            .iter()
            .copied()
            .zip(self.a_value[range].iter().copied())
    }

    /// Entries of total variable `var` of `[A I]`.
    pub fn total_column(&self, var: usize) -> Vec<(usize, f64)> {
        if var < self.num_col {
            self.column(var).collect()
        } else {
            vec![(var - self.num_col, 1.)]
        }
    }

    pub fn change_log(&self) -> &[(usize, usize)] {
        &self.change_log
    }

    /// `column_in` became basic and `column_out` nonbasic.
    pub fn update(&mut self, column_in: usize, column_out: usize) {
        if column_in < self.num_col {
            for k in self.a_start[column_in]..self.a_start[column_in + 1] {
                let row = self.a_index[k];
                let n_end = self.ar_n_end[row];

                if let Some(found) =
                    (self.ar_start[row]..n_end).find(|&kr| self.ar_index[kr] == column_in)
                {
                    self.ar_index.swap(found, n_end - 1);
                    self.ar_value.swap(found, n_end - 1);
                    self.ar_n_end[row] = n_end - 1;
                }
            }
        }

        if column_out < self.num_col {
            for k in self.a_start[column_out]..self.a_start[column_out + 1] {
                let row = self.a_index[k];
                let n_end = self.ar_n_end[row];

                if let Some(found) =
                    (n_end..self.ar_start[row + 1]).find(|&kr| self.ar_index[kr] == column_out)
                {
                    self.ar_index.swap(found, n_end);
                    self.ar_value.swap(found, n_end);
                    self.ar_n_end[row] = n_end + 1;
                }
            }
        }

        self.change_log.push((column_in, column_out));
    }

    /// Adds `multiplier` times column `var` of `[A I]` to `vec`.
    pub fn collect_aj(&self, vec: &mut nalgebra::DVector<f64>, var: usize, multiplier: f64) {
        if var < self.num_col {
            for (row, value) in self.column(var) {
                vec[row] += multiplier * value;
            }
        } else {
            vec[var - self.num_col] += multiplier;
        }
    }

    /// `row_ap[j] = row_epᵀ a_j` for the nonbasic structural columns, 0 for the basic ones.
    pub fn price_by_column(
        &self,
        row_ep: &nalgebra::DVector<f64>,
        nonbasic_flag: &[bool],
        row_ap: &mut [f64],
    ) {
        self.price_column_range(row_ep, nonbasic_flag, 0..self.num_col, row_ap);
    }

    /// Prices the columns in `cols` into `row_ap`, which holds just those columns.
    pub fn price_column_range(
        &self,
        row_ep: &nalgebra::DVector<f64>,
        nonbasic_flag: &[bool],
        cols: Range<usize>,
        row_ap: &mut [f64],
    ) {
        for (out, col) in row_ap.iter_mut().zip(cols) {
            *out = if nonbasic_flag[col] {
                self.column(col)
                    .map(|(row, value)| row_ep[row] * value)
                    .sum()
            } else {
                0.
            };
        }
    }

    pub fn price_by_row(&self, row_ep: &nalgebra::DVector<f64>, row_ap: &mut [f64]) {
        for out in row_ap.iter_mut() {
            *out = 0.;
        }

        for (row, &ep) in row_ep.iter().enumerate() {
            if ep.abs() <= TINY {
                continue;
            }

            for k in self.ar_start[row]..self.ar_n_end[row] {
                row_ap[self.ar_index[k]] += ep * self.ar_value[k];
            }
        }
    }

    /// Whether `row_ep` is sparse enough to be priced row-wise.
    pub fn price_by_row_preferred(&self, row_ep: &nalgebra::DVector<f64>) -> bool {
        let density = crate::util::count_nonzeros(row_ep) as f64 / self.num_row.max(1) as f64;
        density < ROW_PRICE_DENSITY
    }

    pub fn price(&self, row_ep: &nalgebra::DVector<f64>, nonbasic_flag: &[bool], row_ap: &mut [f64]) {
        if self.price_by_row_preferred(row_ep) {
            self.price_by_row(row_ep, row_ap);
        } else {
            self.price_by_column(row_ep, nonbasic_flag, row_ap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lp::tests::two_by_two;
    use crate::simplex::basis::{Basis, NonbasicMove};

    fn nonbasic_entries(matrix: &Matrix, row: usize) -> Vec<usize> {
        let mut cols = matrix.ar_index[matrix.ar_start[row]..matrix.ar_n_end[row]].to_vec();
        cols.sort_unstable();
        cols
    }

    #[test]
    fn partition_follows_basis() {
        let lp = two_by_two();
        let mut basis = Basis::logical(&lp);
        let mut matrix = Matrix::setup(&lp, &basis.nonbasic_flag);
        assert_eq!(nonbasic_entries(&matrix, 2), vec![0, 1]);

        basis.pivot(0, 2, NonbasicMove::Down);
        matrix.update(0, 4);
        assert_eq!(nonbasic_entries(&matrix, 0), Vec::<usize>::new());
        assert_eq!(nonbasic_entries(&matrix, 2), vec![1]);
        assert_eq!(matrix.change_log(), &[(0, 4)]);

        basis.pivot(2, 2, NonbasicMove::Up);
        matrix.update(4, 0);
        assert_eq!(nonbasic_entries(&matrix, 0), vec![0]);
        assert_eq!(nonbasic_entries(&matrix, 2), vec![0, 1]);

        let fresh = Matrix::setup(&lp, &basis.nonbasic_flag);
        for row in 0..lp.num_row {
            assert_eq!(nonbasic_entries(&matrix, row), nonbasic_entries(&fresh, row));
        }
    }

    #[test]
    fn pricing_by_row_and_column_agree() {
        let lp = two_by_two();
        let mut basis = Basis::logical(&lp);
        basis.pivot(1, 1, NonbasicMove::Down);
        let matrix = Matrix::setup(&lp, &basis.nonbasic_flag);

        let row_ep = nalgebra::DVector::from_vec(vec![1., -2., 0.5]);
        let mut by_row = vec![0.; 2];
        let mut by_col = vec![0.; 2];
        matrix.price_by_row(&row_ep, &mut by_row);
        matrix.price_by_column(&row_ep, &basis.nonbasic_flag, &mut by_col);

        assert_eq!(by_row, vec![1.5, 0.]);
        assert_eq!(by_col, vec![1.5, 0.]);
    }

    #[test]
    fn collect_structural_and_slack() {
        let lp = two_by_two();
        let basis = Basis::logical(&lp);
        let matrix = Matrix::setup(&lp, &basis.nonbasic_flag);
        let mut vec = nalgebra::DVector::zeros(3);
        matrix.collect_aj(&mut vec, 1, 2.);
        matrix.collect_aj(&mut vec, 3, -1.);
        assert_eq!(vec.as_slice(), &[0., 1., 2.]);
    }
}
