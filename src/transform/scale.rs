use crate::lp::Lp;

use log::debug;

//matrices with all entries in this range are left unscaled
const MIN_UNSCALED: f64 = 0.2;
const MAX_UNSCALED: f64 = 5.;

const NUM_PASSES: usize = 6;
const MAX_SCALE: f64 = 1024.;

/// Row and column scale factors, all powers of two.
///
/// The scaled LP has matrix `R A C`, costs `c C`, column bounds divided by
/// the column factors and row bounds multiplied by the row factors.
#[derive(Debug, Clone, PartialEq)]
pub struct Scale {
    pub col: Vec<f64>,
    pub row: Vec<f64>,
}

//1/sqrt(min max) of the nonzero magnitudes, 1 if there are none
fn geometric_factor(min: f64, max: f64) -> f64 {
    if max > 0. {
        1. / (min * max).sqrt()
    } else {
        1.
    }
}

fn round_to_power_of_two(factor: f64) -> f64 {
    2f64.powf(factor.log2().round())
        .max(1. / MAX_SCALE)
        .min(MAX_SCALE)
}

impl Scale {
    pub fn identity(num_col: usize, num_row: usize) -> Self {
        Self {
            col: vec![1.; num_col],
            row: vec![1.; num_row],
        }
    }

    /// Geometric mean scaling, alternating rows and columns. `None` when the
    /// entries are already well scaled.
    pub fn compute(lp: &Lp) -> Option<Scale> {
        let well_scaled = lp
            .a_value
            .iter()
            .filter(|value| **value != 0.)
            .all(|value| (MIN_UNSCALED..=MAX_UNSCALED).contains(&value.abs()));

        if well_scaled {
            debug!("matrix is well scaled");
            return None;
        }

        let mut scale = Scale::identity(lp.num_col, lp.num_row);

        for _pass in 0..NUM_PASSES {
            let mut row_min = vec![f64::INFINITY; lp.num_row];
            let mut row_max = vec![0f64; lp.num_row];

            for col in 0..lp.num_col {
                for (row, value) in lp.column(col) {
                    let value = (value * scale.col[col]).abs();

                    if value > 0. {
                        row_min[row] = row_min[row].min(value);
                        row_max[row] = row_max[row].max(value);
                    }
                }
            }

            for row in 0..lp.num_row {
                scale.row[row] = geometric_factor(row_min[row], row_max[row]);
            }

            for col in 0..lp.num_col {
                let (min, max) = lp
                    .column(col)
                    .map(|(row, value)| (value * scale.row[row]).abs())
                    .filter(|value| *value > 0.)
                    .fold((f64::INFINITY, 0f64), |(min, max), value| {
                        (min.min(value), max.max(value))
                    });

                scale.col[col] = geometric_factor(min, max);
            }
        }

        for factor in scale.col.iter_mut().chain(scale.row.iter_mut()) {
            *factor = round_to_power_of_two(*factor);
        }

        debug!(
            "scaled with column factors in [{:e}, {:e}]",
            scale.col.iter().cloned().fold(f64::INFINITY, f64::min),
            scale.col.iter().cloned().fold(0., f64::max)
        );

        Some(scale)
    }

    pub fn apply(&self, lp: &mut Lp) {
        for col in 0..lp.num_col {
            let factor = self.col[col];

            for k in lp.a_start[col]..lp.a_start[col + 1] {
                lp.a_value[k] *= self.row[lp.a_index[k]] * factor;
            }

            lp.col_cost[col] *= factor;
            lp.col_lower[col] /= factor;
            lp.col_upper[col] /= factor;
        }

        for row in 0..lp.num_row {
            lp.row_lower[row] *= self.row[row];
            lp.row_upper[row] *= self.row[row];
        }
    }

    /// Undoes [`Scale::apply`].
    pub fn unapply(&self, lp: &mut Lp) {
        Scale {
            col: self.col.iter().map(|factor| 1. / factor).collect(),
            row: self.row.iter().map(|factor| 1. / factor).collect(),
        }
        .apply(lp);
    }

    #[inline]
    pub fn cost(&self, col: usize, cost: f64) -> f64 {
        cost * self.col[col]
    }

    #[inline]
    pub fn col_bounds(&self, col: usize, lower: f64, upper: f64) -> (f64, f64) {
        (lower / self.col[col], upper / self.col[col])
    }

    #[inline]
    pub fn row_bounds(&self, row: usize, lower: f64, upper: f64) -> (f64, f64) {
        (lower * self.row[row], upper * self.row[row])
    }

    #[inline]
    pub fn coeff(&self, row: usize, col: usize, value: f64) -> f64 {
        value * self.row[row] * self.col[col]
    }

    /// Turns primal and dual values of the scaled LP into values of the unscaled one.
    pub fn unscale_solution(
        &self,
        col_value: &mut [f64],
        col_dual: &mut [f64],
        row_value: &mut [f64],
        row_dual: &mut [f64],
    ) {
        for (col, factor) in self.col.iter().enumerate() {
            col_value[col] *= factor;
            col_dual[col] /= factor;
        }

        for (row, factor) in self.row.iter().enumerate() {
            row_value[row] /= factor;
            row_dual[row] *= factor;
        }
    }
}
