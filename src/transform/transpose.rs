use crate::error::DualplexError;
use crate::lp::{Lp, ObjSense};
use crate::simplex::basis::{Basis, NonbasicMove};

use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RowKind {
    Lower,
    Upper,
    Equality,
}

/// The dual of an LP whose columns all lie in `[0, ∞)` and whose rows are
/// one-sided or equalities:
///
/// ```text
/// min  -bᵀy
/// s.t. Aᵀy ≤ c
/// ```
///
/// with `y ≥ 0` for rows with a lower bound, `y ≤ 0` for rows with an upper
/// bound and `y` free for equalities. `c` is the cost of the minimization.
#[derive(Debug, Clone, PartialEq)]
pub struct Transposition {
    num_col: usize,
    num_row: usize,
    sense: ObjSense,
    cost: Vec<f64>,
    row_kinds: Vec<RowKind>,
}

fn row_kind(lower: f64, upper: f64) -> Option<RowKind> {
    match (lower.is_finite(), upper.is_finite()) {
        (true, true) if lower == upper => Some(RowKind::Equality),
        (true, false) => Some(RowKind::Lower),
        (false, true) => Some(RowKind::Upper),
        _ => None,
    }
}

impl Transposition {
    /// Wider than tall, nonnegative columns, no free or ranged rows.
    pub fn eligible(lp: &Lp) -> bool {
        lp.num_col > lp.num_row
            && (0..lp.num_col).all(|col| lp.col_lower[col] == 0. && lp.col_upper[col] == f64::INFINITY)
            && (0..lp.num_row).all(|row| row_kind(lp.row_lower[row], lp.row_upper[row]).is_some())
    }

    /// The transposition of `lp` and the transposed LP, `None` if `lp` is not eligible.
    pub fn new(lp: &Lp) -> Option<(Self, Lp)> {
        if !Self::eligible(lp) {
            return None;
        }

        let row_kinds: Vec<RowKind> = (0..lp.num_row)
            .filter_map(|row| row_kind(lp.row_lower[row], lp.row_upper[row]))
            .collect();

        let sign = lp.sense.sign();
        let cost: Vec<f64> = lp.col_cost.iter().map(|c| sign * c).collect();
        let (ar_start, ar_index, ar_value) = lp.row_wise();

        let mut transposed = Lp::new();
        transposed.num_col = lp.num_row;
        transposed.num_row = lp.num_col;
        transposed.sense = ObjSense::Minimize;
        transposed.a_start = ar_start;
        transposed.a_index = ar_index;
        transposed.a_value = ar_value;
        transposed.row_lower = vec![f64::NEG_INFINITY; lp.num_col];
        transposed.row_upper = cost.clone();

        for (row, kind) in row_kinds.iter().enumerate() {
            let (rhs, lower, upper) = match kind {
                RowKind::Lower => (lp.row_lower[row], 0., f64::INFINITY),
                RowKind::Upper => (lp.row_upper[row], f64::NEG_INFINITY, 0.),
                RowKind::Equality => (lp.row_lower[row], f64::NEG_INFINITY, f64::INFINITY),
            };

            transposed.col_cost.push(-rhs);
            transposed.col_lower.push(lower);
            transposed.col_upper.push(upper);
        }

        debug!(
            "transposed lp with {} columns and {} rows",
            transposed.num_col, transposed.num_row
        );

        Some((
            Self {
                num_col: lp.num_col,
                num_row: lp.num_row,
                sense: lp.sense,
                cost,
                row_kinds,
            },
            transposed,
        ))
    }

    /// Primal and dual values of the original LP `lp` from an optimal solution
    /// of the transposed LP, as `(col_value, col_dual, row_value, row_dual)`.
    pub fn recover_solution(
        &self,
        lp: &Lp,
        col_value: &[f64],
        row_value: &[f64],
        row_dual: &[f64],
    ) -> (Vec<f64>, Vec<f64>, Vec<f64>, Vec<f64>) {
        let sign = self.sense.sign();

        let x: Vec<f64> = row_dual.iter().map(|pi| -pi).collect();
        let col_dual: Vec<f64> = (0..self.num_col)
            .map(|col| sign * (self.cost[col] - row_value[col]))
            .collect();
        let activity = lp.row_activity(&x);
        let y: Vec<f64> = col_value.iter().map(|y| sign * y).collect();

        (x, col_dual, activity, y)
    }

    /// Basis of the original LP complementary to a basis of the transposed one.
    pub fn recover_basis(&self, transposed: &Basis) -> Result<Basis, DualplexError> {
        let mut basic_index = Vec::with_capacity(self.num_row);
        let mut moves = vec![NonbasicMove::Up; self.num_col + self.num_row];

        //column j of the original is basic when row j of the transposed lp is tight
        for col in 0..self.num_col {
            if !transposed.is_basic(self.num_row + col) {
                basic_index.push(col);
            }
        }

        for (row, kind) in self.row_kinds.iter().enumerate() {
            let slack = self.num_col + row;

            if !transposed.is_basic(row) {
                basic_index.push(slack);
            } else {
                moves[slack] = match kind {
                    RowKind::Lower => NonbasicMove::Down,
                    RowKind::Upper => NonbasicMove::Up,
                    RowKind::Equality => NonbasicMove::Zero,
                };
            }
        }

        Basis::new(basic_index, moves, self.num_col, self.num_row)
    }
}
