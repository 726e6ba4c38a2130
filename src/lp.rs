use crate::error::DualplexError;
use crate::problem::Problem;

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjSense {
    Minimize,
    Maximize,
}

impl ObjSense {
    /// Multiplier turning the objective into one that is minimized.
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            ObjSense::Minimize => 1.,
            ObjSense::Maximize => -1.,
        }
    }
}

impl std::default::Default for ObjSense {
    fn default() -> Self {
        ObjSense::Minimize
    }
}

/// A linear program
///
/// ```text
/// min/max  col_costᵀ x + offset
/// s.t.     row_lower ≤ A x ≤ row_upper
///          col_lower ≤ x ≤ col_upper
/// ```
///
/// with `A` held in compressed-column form: the entries of column `j` are
/// `a_index[a_start[j]..a_start[j + 1]]` (row indices) and the matching
/// slice of `a_value`. Missing bounds are infinite.
#[derive(Debug, Clone, PartialEq)]
pub struct Lp {
    pub num_col: usize,
    pub num_row: usize,
    pub sense: ObjSense,
    pub offset: f64,

    pub col_cost: Vec<f64>,
    pub col_lower: Vec<f64>,
    pub col_upper: Vec<f64>,
    pub row_lower: Vec<f64>,
    pub row_upper: Vec<f64>,

    pub a_start: Vec<usize>,
    pub a_index: Vec<usize>,
    pub a_value: Vec<f64>,
}

impl std::default::Default for Lp {
    fn default() -> Self {
        Self::new()
    }
}

impl Lp {
    pub fn new() -> Self {
        Self {
            num_col: 0,
            num_row: 0,
            sense: ObjSense::Minimize,
            offset: 0.,
            col_cost: Vec::new(),
            col_lower: Vec::new(),
            col_upper: Vec::new(),
            row_lower: Vec::new(),
            row_upper: Vec::new(),
            a_start: vec![0],
            a_index: Vec::new(),
            a_value: Vec::new(),
        }
    }

    /// Number of structural plus slack variables.
    #[inline]
    pub fn num_tot(&self) -> usize {
        self.num_col + self.num_row
    }

    #[inline]
    pub fn num_nz(&self) -> usize {
        self.a_index.len()
    }

    /// Entries `(row, value)` of column `col`.
    pub fn column(&self, col: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.a_start[col]..self.a_start[col + 1];
        self.a_index[range.clone()]
            .iter()
            .copied()
            .zip(self.a_value[range].iter().copied())
    }

    pub fn validate(&self) -> Result<(), DualplexError> {
        let invalid = |msg: String| Err(DualplexError::InvalidLp(msg));

        if self.col_cost.len() != self.num_col
            || self.col_lower.len() != self.num_col
            || self.col_upper.len() != self.num_col
        {
            return invalid(format!(
                "column vectors have lengths ({}, {}, {}), expected {}",
                self.col_cost.len(),
                self.col_lower.len(),
                self.col_upper.len(),
                self.num_col
            ));
        }

        if self.row_lower.len() != self.num_row || self.row_upper.len() != self.num_row {
            return invalid(format!(
                "row vectors have lengths ({}, {}), expected {}",
                self.row_lower.len(),
                self.row_upper.len(),
                self.num_row
            ));
        }

        if self.a_start.len() != self.num_col + 1 || self.a_start[0] != 0 {
            return invalid(format!(
                "a_start has {} entries starting at {:?}, expected {} starting at 0",
                self.a_start.len(),
                self.a_start.first(),
                self.num_col + 1
            ));
        }

        if self.a_start.windows(2).any(|w| w[0] > w[1]) {
            return invalid("a_start must be non-decreasing".to_string());
        }

        let num_nz = self.a_start[self.num_col];

        if self.a_index.len() != num_nz || self.a_value.len() != num_nz {
            return invalid(format!(
                "a_index has {} and a_value has {} entries, expected {}",
                self.a_index.len(),
                self.a_value.len(),
                num_nz
            ));
        }

        if !self.offset.is_finite() {
            return invalid(format!("invalid objective offset: {}", self.offset));
        }

        //last column that touched each row, to find repeated entries
        let mut last_col = vec![usize::MAX; self.num_row];

        for col in 0..self.num_col {
            for (row, value) in self.column(col) {
                if row >= self.num_row {
                    return invalid(format!(
                        "column {} has an entry in row {}, but there are {} rows",
                        col, row, self.num_row
                    ));
                }

                if !value.is_finite() {
                    return invalid(format!("entry ({}, {}) is {}", row, col, value));
                }

                if last_col[row] == col {
                    return invalid(format!("entry ({}, {}) is repeated", row, col));
                }

                last_col[row] = col;
            }
        }

        for col in 0..self.num_col {
            let (cost, lower, upper) = (self.col_cost[col], self.col_lower[col], self.col_upper[col]);

            if !cost.is_finite() {
                return invalid(format!("column {} has cost {}", col, cost));
            }

            if lower.is_nan() || upper.is_nan() || lower == f64::INFINITY || upper == f64::NEG_INFINITY
            {
                return invalid(format!("column {} has bounds [{}, {}]", col, lower, upper));
            }

            if lower > upper {
                return invalid(format!(
                    "column {} has inconsistent bounds [{}, {}]",
                    col, lower, upper
                ));
            }
        }

        for row in 0..self.num_row {
            let (lower, upper) = (self.row_lower[row], self.row_upper[row]);

            if lower.is_nan() || upper.is_nan() || lower == f64::INFINITY || upper == f64::NEG_INFINITY
            {
                return invalid(format!("row {} has bounds [{}, {}]", row, lower, upper));
            }
        }

        Ok(())
    }

    /// First row whose lower bound exceeds its upper bound.
    ///
    /// Such a row makes the LP infeasible; it is not rejected by [`Lp::validate`].
    pub fn inconsistent_row(&self, tolerance: f64) -> Option<usize> {
        (0..self.num_row).find(|&row| self.row_lower[row] > self.row_upper[row] + tolerance)
    }

    pub fn row_activity(&self, x: &[f64]) -> Vec<f64> {
        let mut activity = vec![0.; self.num_row];

        for (col, x_j) in x.iter().enumerate().take(self.num_col) {
            for (row, value) in self.column(col) {
                activity[row] += value * x_j;
            }
        }

        activity
    }

    pub fn objective(&self, x: &[f64]) -> f64 {
        self.offset
            + self
                .col_cost
                .iter()
                .zip(x.iter())
                .map(|(c, x_j)| c * x_j)
                .sum::<f64>()
    }

    /// Row-wise copy of `A` as `(ar_start, ar_index, ar_value)`.
    pub fn row_wise(&self) -> (Vec<usize>, Vec<usize>, Vec<f64>) {
        let mut ar_start = vec![0; self.num_row + 1];

        for &row in &self.a_index {
            ar_start[row + 1] += 1;
        }

        for row in 0..self.num_row {
            ar_start[row + 1] += ar_start[row];
        }

        let mut next = ar_start.clone();
        let mut ar_index = vec![0; self.num_nz()];
        let mut ar_value = vec![0.; self.num_nz()];

        for col in 0..self.num_col {
            for (row, value) in self.column(col) {
                let k = next[row];
                ar_index[k] = col;
                ar_value[k] = value;
                next[row] += 1;
            }
        }

        (ar_start, ar_index, ar_value)
    }

    /// Appends columns given in compressed-column form.
    pub fn add_cols(
        &mut self,
        cost: &[f64],
        lower: &[f64],
        upper: &[f64],
        a_start: &[usize],
        a_index: &[usize],
        a_value: &[f64],
    ) -> Result<(), DualplexError> {
        let num_new = cost.len();

        if lower.len() != num_new || upper.len() != num_new || a_start.len() != num_new {
            return Err(DualplexError::InvalidLp(format!(
                "adding {} columns needs {} bounds and starts",
                num_new, num_new
            )));
        }

        let mut extended = self.clone();

        for col in 0..num_new {
            let end = if col + 1 < num_new {
                a_start[col + 1]
            } else {
                a_index.len()
            };

            if a_start[col] > end || end > a_index.len() || a_value.len() != a_index.len() {
                return Err(DualplexError::InvalidLp(format!(
                    "column {} to add has an invalid start",
                    col
                )));
            }

            extended.col_cost.push(cost[col]);
            extended.col_lower.push(lower[col]);
            extended.col_upper.push(upper[col]);
            extended.a_index.extend_from_slice(&a_index[a_start[col]..end]);
            extended.a_value.extend_from_slice(&a_value[a_start[col]..end]);
            extended.a_start.push(extended.a_index.len());
        }

        extended.num_col += num_new;
        extended.validate()?;
        *self = extended;
        Ok(())
    }

    /// Appends rows given in compressed-row form.
    pub fn add_rows(
        &mut self,
        lower: &[f64],
        upper: &[f64],
        ar_start: &[usize],
        ar_index: &[usize],
        ar_value: &[f64],
    ) -> Result<(), DualplexError> {
        let num_new = lower.len();

        if upper.len() != num_new || ar_start.len() != num_new || ar_value.len() != ar_index.len() {
            return Err(DualplexError::InvalidLp(format!(
                "adding {} rows needs {} bounds and starts",
                num_new, num_new
            )));
        }

        let mut new_entries: Vec<Vec<(usize, f64)>> = vec![Vec::new(); self.num_col];

        for row in 0..num_new {
            let end = if row + 1 < num_new {
                ar_start[row + 1]
            } else {
                ar_index.len()
            };

            if ar_start[row] > end || end > ar_index.len() {
                return Err(DualplexError::InvalidLp(format!(
                    "row {} to add has an invalid start",
                    row
                )));
            }

            for k in ar_start[row]..end {
                let col = ar_index[k];

                if col >= self.num_col {
                    return Err(DualplexError::InvalidLp(format!(
                        "row {} to add refers to column {}, but there are {} columns",
                        row, col, self.num_col
                    )));
                }

                new_entries[col].push((self.num_row + row, ar_value[k]));
            }
        }

        let mut extended = self.clone();
        extended.a_start = vec![0];
        extended.a_index.clear();
        extended.a_value.clear();

        for (col, entries) in new_entries.iter().enumerate() {
            for (row, value) in self.column(col).chain(entries.iter().copied()) {
                extended.a_index.push(row);
                extended.a_value.push(value);
            }

            extended.a_start.push(extended.a_index.len());
        }

        extended.row_lower.extend_from_slice(lower);
        extended.row_upper.extend_from_slice(upper);
        extended.num_row += num_new;
        extended.validate()?;
        *self = extended;
        Ok(())
    }

    pub fn delete_cols(&mut self, cols: Range<usize>) -> Result<(), DualplexError> {
        if cols.start > cols.end || cols.end > self.num_col {
            return Err(DualplexError::InvalidLp(format!(
                "cannot delete columns {:?} of {}",
                cols, self.num_col
            )));
        }

        let first = self.a_start[cols.start];
        let last = self.a_start[cols.end];
        let removed = last - first;

        self.a_index.drain(first..last);
        self.a_value.drain(first..last);
        self.a_start.drain(cols.start + 1..cols.end + 1);

        for start in self.a_start.iter_mut().skip(cols.start + 1) {
            *start -= removed;
        }

        self.col_cost.drain(cols.clone());
        self.col_lower.drain(cols.clone());
        self.col_upper.drain(cols.clone());
        self.num_col -= cols.len();
        Ok(())
    }

    pub fn delete_rows(&mut self, rows: Range<usize>) -> Result<(), DualplexError> {
        if rows.start > rows.end || rows.end > self.num_row {
            return Err(DualplexError::InvalidLp(format!(
                "cannot delete rows {:?} of {}",
                rows, self.num_row
            )));
        }

        let num_deleted = rows.len();
        let mut a_start = vec![0];
        let mut a_index = Vec::with_capacity(self.num_nz());
        let mut a_value = Vec::with_capacity(self.num_nz());

        for col in 0..self.num_col {
            for (row, value) in self.column(col) {
                if rows.contains(&row) {
                    continue;
                }

                a_index.push(if row >= rows.end { row - num_deleted } else { row });
                a_value.push(value);
            }

            a_start.push(a_index.len());
        }

        self.a_start = a_start;
        self.a_index = a_index;
        self.a_value = a_value;
        self.row_lower.drain(rows.clone());
        self.row_upper.drain(rows);
        self.num_row -= num_deleted;
        Ok(())
    }

    /// Sets entry `(row, col)` of `A`; a zero value removes the entry.
    pub fn change_coeff(&mut self, row: usize, col: usize, value: f64) -> Result<(), DualplexError> {
        if row >= self.num_row || col >= self.num_col || !value.is_finite() {
            return Err(DualplexError::InvalidLp(format!(
                "cannot set entry ({}, {}) to {}",
                row, col, value
            )));
        }

        let range = self.a_start[col]..self.a_start[col + 1];

        match self.a_index[range.clone()].iter().position(|&r| r == row) {
            Some(offset) if value == 0. => {
                let k = range.start + offset;
                self.a_index.remove(k);
                self.a_value.remove(k);

                for start in self.a_start.iter_mut().skip(col + 1) {
                    *start -= 1;
                }
            }

            Some(offset) => self.a_value[range.start + offset] = value,

            None if value == 0. => (),

            None => {
                self.a_index.insert(range.end, row);
                self.a_value.insert(range.end, value);

                for start in self.a_start.iter_mut().skip(col + 1) {
                    *start += 1;
                }
            }
        }

        Ok(())
    }
}

impl std::convert::From<Problem> for Lp {
    fn from(prob: Problem) -> Lp {
        let num_col = prob.vars().len();
        let num_row = prob.constraints().len();

        let mut lp = Lp::new();
        lp.num_col = num_col;
        lp.num_row = num_row;
        lp.sense = prob.sense;

        for var in prob.vars() {
            let (lower, upper) = var.bound.as_pair();
            lp.col_cost.push(var.obj_coeff);
            lp.col_lower.push(lower);
            lp.col_upper.push(upper);
        }

        let mut entries: Vec<Vec<(usize, f64)>> = vec![Vec::new(); num_col];

        for (row, constraint) in prob.constraints().iter().enumerate() {
            let (lower, upper) = constraint.row_bounds();
            lp.row_lower.push(lower);
            lp.row_upper.push(upper);

            for (id, coeff) in &constraint.coeffs {
                let col_entries = &mut entries[usize::from(id)];

                //a variable may appear more than once in a constraint
                match col_entries.last_mut() {
                    Some((last_row, value)) if *last_row == row => *value += coeff,
                    _ => col_entries.push((row, *coeff)),
                }
            }
        }

        for col_entries in entries {
            for (row, value) in col_entries {
                if value != 0. {
                    lp.a_index.push(row);
                    lp.a_value.push(value);
                }
            }

            lp.a_start.push(lp.a_index.len());
        }

        lp
    }
}
