use crate::lp::Lp;

use log::debug;

//implied bounds are relaxed by this much (relative) before they are used
const MARGIN: f64 = 1e-6;

//activity bounds of a row: the finite part and the number of infinite terms
#[derive(Debug, Clone, Copy, Default)]
struct Activity {
    finite: f64,
    num_inf: usize,
}

impl Activity {
    fn add(&mut self, term: f64) {
        if term.is_finite() {
            self.finite += term;
        } else {
            self.num_inf += 1;
        }
    }

    //activity of the row without a term
    fn without(&self, term: f64) -> Option<f64> {
        match (self.num_inf, term.is_finite()) {
            (0, _) => Some(self.finite - term),
            (1, false) => Some(self.finite),
            _ => None,
        }
    }
}

fn relax(bound: f64, direction: f64) -> f64 {
    bound + direction * MARGIN * bound.abs().max(1.)
}

/// Tightens the column bounds of `lp` to the bounds implied by its rows, in one
/// pass. Returns the number of bounds that changed.
pub fn tighten_bounds(lp: &mut Lp) -> usize {
    let mut min_activity = vec![Activity::default(); lp.num_row];
    let mut max_activity = vec![Activity::default(); lp.num_row];

    for col in 0..lp.num_col {
        let (lower, upper) = (lp.col_lower[col], lp.col_upper[col]);

        for (row, value) in lp.column(col) {
            let (min, max) = if value > 0. {
                (value * lower, value * upper)
            } else {
                (value * upper, value * lower)
            };

            min_activity[row].add(min);
            max_activity[row].add(max);
        }
    }

    let mut num_tightened = 0;

    for col in 0..lp.num_col {
        let (mut lower, mut upper) = (lp.col_lower[col], lp.col_upper[col]);

        for (row, value) in lp.column(col) {
            if value == 0. {
                continue;
            }

            let (own_min, own_max) = if value > 0. {
                (value * lp.col_lower[col], value * lp.col_upper[col])
            } else {
                (value * lp.col_upper[col], value * lp.col_lower[col])
            };

            let rest_min = min_activity[row].without(own_min);
            let rest_max = max_activity[row].without(own_max);

            //value * x <= row_upper - rest_min and value * x >= row_lower - rest_max
            let to_upper = rest_min.map(|rest| (lp.row_upper[row] - rest) / value);
            let to_lower = rest_max.map(|rest| (lp.row_lower[row] - rest) / value);

            let (implied_upper, implied_lower) = if value > 0. {
                (to_upper, to_lower)
            } else {
                (to_lower, to_upper)
            };

            if let Some(bound) = implied_upper.filter(|b| b.is_finite()) {
                upper = upper.min(relax(bound, 1.));
            }

            if let Some(bound) = implied_lower.filter(|b| b.is_finite()) {
                lower = lower.max(relax(bound, -1.));
            }
        }

        //keep the bounds consistent if the implied ones cross
        if lower > upper {
            continue;
        }

        if lower != lp.col_lower[col] || upper != lp.col_upper[col] {
            num_tightened += 1;
        }

        lp.col_lower[col] = lower;
        lp.col_upper[col] = upper;
    }

    debug!("tightened bounds of {} columns", num_tightened);
    num_tightened
}
