use crate::lp::Lp;
use crate::simplex::basis::{Basis, NonbasicMove};

use log::debug;

//entries within this fraction of the largest eligible one may be pivots
const RELATIVE_PIVOT: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum RowKind {
    Equality,
    OneSided,
    Ranged,
    Free,
}

fn row_kind(lp: &Lp, row: usize) -> RowKind {
    let (lower, upper) = (lp.row_lower[row], lp.row_upper[row]);

    match (lower.is_finite(), upper.is_finite()) {
        (true, true) if lower == upper => RowKind::Equality,
        (true, true) => RowKind::Ranged,
        (true, false) | (false, true) => RowKind::OneSided,
        (false, false) => RowKind::Free,
    }
}

/// Triangular crash: replaces slacks of the logical `basis` by structural
/// columns while the basis matrix stays triangular.
///
/// Columns are tried free first, then one-sided, then boxed, sparser ones
/// first within each group. A column is accepted when it has no entry in a row
/// that was pivoted on before, and it replaces the slack of its largest entry
/// among the rows whose slack is still basic, preferring equality rows. Free
/// rows keep their slacks. Returns the number of columns that entered.
pub fn crash(lp: &Lp, basis: &mut Basis) -> usize {
    let num_col = lp.num_col;

    let mut columns: Vec<(u8, usize, usize)> = (0..num_col)
        .filter_map(|col| {
            let (lower, upper) = (lp.col_lower[col], lp.col_upper[col]);
            let nnz = lp.a_start[col + 1] - lp.a_start[col];

            if lower == upper || nnz == 0 {
                return None;
            }

            let kind = match (lower.is_finite(), upper.is_finite()) {
                (false, false) => 0,
                (true, true) => 2,
                _ => 1,
            };

            Some((kind, nnz, col))
        })
        .collect();

    columns.sort_unstable();

    let mut pivoted = vec![false; lp.num_row];
    let mut num_entered = 0;

    for (_kind, _nnz, col) in columns {
        if lp.column(col).any(|(row, _value)| pivoted[row]) {
            continue;
        }

        let eligible: Vec<(usize, f64)> = lp
            .column(col)
            .filter(|&(row, value)| {
                value != 0.
                    && basis.is_basic(num_col + row)
                    && row_kind(lp, row) != RowKind::Free
            })
            .collect();

        let max_abs = eligible
            .iter()
            .fold(0f64, |max, (_row, value)| max.max(value.abs()));

        if max_abs == 0. {
            continue;
        }

        let pivot = eligible
            .iter()
            .filter(|(_row, value)| value.abs() >= RELATIVE_PIVOT * max_abs)
            .min_by(|(row1, value1), (row2, value2)| {
                row_kind(lp, *row1)
                    .cmp(&row_kind(lp, *row2))
                    .then(value2.abs().total_cmp(&value1.abs()))
                    .then(row1.cmp(row2))
            });

        let row = match pivot {
            Some(&(row, _value)) => row,
            None => continue,
        };

        let slack = num_col + row;
        let position = match basis.basic_index().iter().position(|&var| var == slack) {
            Some(position) => position,
            None => continue,
        };

        //the slack of row i has bounds [-row_upper, -row_lower]
        let slack_move = NonbasicMove::Up.for_bounds(-lp.row_upper[row], -lp.row_lower[row]);
        basis.pivot(col, position, slack_move);
        pivoted[row] = true;
        num_entered += 1;
    }

    debug!("crash replaced {} slacks", num_entered);
    num_entered
}
