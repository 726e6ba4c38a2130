use crate::error::DualplexError;
use crate::lp::Lp;
use crate::simplex::basis::{Basis, NonbasicMove};
use crate::simplex::SolutionStatus;

use log::debug;

/// Solves an LP without rows: every column sits at the bound that minimizes
/// its cost. Returns the column values and the all-nonbasic basis.
pub fn solve_trivial(lp: &Lp) -> Result<(SolutionStatus, Vec<f64>, Basis), DualplexError> {
    if lp.num_row != 0 {
        return Err(DualplexError::InvalidLp(format!(
            "trivial solve of an lp with {} rows",
            lp.num_row
        )));
    }

    let sign = lp.sense.sign();
    let mut status = SolutionStatus::Optimal;
    let mut x = vec![0.; lp.num_col];
    let mut moves = vec![NonbasicMove::Zero; lp.num_col];

    for (col, (x_j, move_j)) in x.iter_mut().zip(moves.iter_mut()).enumerate() {
        let cost = sign * lp.col_cost[col];
        let (lower, upper) = (lp.col_lower[col], lp.col_upper[col]);

        let preferred = if cost > 0. || (cost == 0. && lower.is_finite()) {
            NonbasicMove::Up
        } else {
            NonbasicMove::Down
        };

        if (cost > 0. && lower == f64::NEG_INFINITY) || (cost < 0. && upper == f64::INFINITY) {
            debug!("column {} is unbounded", col);
            status = SolutionStatus::Unbounded;
        }

        *move_j = preferred.for_bounds(lower, upper);
        *x_j = move_j.value(lower, upper);
    }

    let basis = Basis::new(Vec::new(), moves, lp.num_col, 0)?;
    Ok((status, x, basis))
}
