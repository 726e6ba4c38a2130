use crate::error::DualplexError;
use crate::lp::Lp;

use std::ops::Range;

/// Direction in which a nonbasic variable may move away from its bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonbasicMove {
    /// At its lower bound.
    Up,

    /// At its upper bound.
    Down,

    /// Fixed, or free and held at zero.
    Zero,
}

impl NonbasicMove {
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            NonbasicMove::Up => 1.,
            NonbasicMove::Down => -1.,
            NonbasicMove::Zero => 0.,
        }
    }

    /// Move consistent with the bounds `[lower, upper]`, keeping `self` where
    /// the bounds allow it.
    pub fn for_bounds(self, lower: f64, upper: f64) -> NonbasicMove {
        let lower_finite = lower.is_finite();
        let upper_finite = upper.is_finite();

        match (lower_finite, upper_finite) {
            (true, true) if lower == upper => NonbasicMove::Zero,
            (true, true) => match self {
                NonbasicMove::Down => NonbasicMove::Down,
                NonbasicMove::Up | NonbasicMove::Zero => NonbasicMove::Up,
            },
            (true, false) => NonbasicMove::Up,
            (false, true) => NonbasicMove::Down,
            (false, false) => NonbasicMove::Zero,
        }
    }

    /// Value of a nonbasic variable with this move.
    #[inline]
    pub fn value(self, lower: f64, upper: f64) -> f64 {
        match self {
            NonbasicMove::Up => lower,
            NonbasicMove::Down => upper,
            NonbasicMove::Zero if lower.is_finite() => lower,
            NonbasicMove::Zero => 0.,
        }
    }
}

/// Partition of the structural and slack variables into basic and nonbasic.
///
/// Variable `j < num_col` is structural column `j`, variable `num_col + i` is the
/// slack of row `i`. Position `p` of the basis holds variable `basic_index[p]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Basis {
    pub(crate) basic_index: Vec<usize>,
    pub(crate) nonbasic_flag: Vec<bool>,
    pub(crate) nonbasic_move: Vec<NonbasicMove>,
}

impl Basis {
    /// All slacks basic, structurals at the finite bound that minimizes their
    /// cost (0 if free).
    pub fn logical(lp: &Lp) -> Self {
        let num_col = lp.num_col;
        let num_tot = lp.num_tot();

        let mut nonbasic_flag = vec![true; num_tot];
        let mut nonbasic_move = vec![NonbasicMove::Zero; num_tot];

        for col in 0..num_col {
            let cost = lp.sense.sign() * lp.col_cost[col];
            let preferred = if cost < 0. {
                NonbasicMove::Down
            } else {
                NonbasicMove::Up
            };

            nonbasic_move[col] = preferred.for_bounds(lp.col_lower[col], lp.col_upper[col]);
        }

        for flag in nonbasic_flag.iter_mut().skip(num_col) {
            *flag = false;
        }

        Self {
            basic_index: (num_col..num_tot).collect(),
            nonbasic_flag,
            nonbasic_move,
        }
    }

    pub fn new(
        basic_index: Vec<usize>,
        nonbasic_move: Vec<NonbasicMove>,
        num_col: usize,
        num_row: usize,
    ) -> Result<Self, DualplexError> {
        let mut nonbasic_flag = vec![true; num_col + num_row];

        for &var in &basic_index {
            if var < nonbasic_flag.len() {
                nonbasic_flag[var] = false;
            }
        }

        let mut nonbasic_move = nonbasic_move;

        for (var, flag) in nonbasic_flag.iter().enumerate() {
            if !flag && var < nonbasic_move.len() {
                nonbasic_move[var] = NonbasicMove::Zero;
            }
        }

        let basis = Self {
            basic_index,
            nonbasic_flag,
            nonbasic_move,
        };

        basis.check(num_col, num_row)?;
        Ok(basis)
    }

    #[inline]
    pub fn basic_index(&self) -> &[usize] {
        &self.basic_index
    }

    #[inline]
    pub fn is_basic(&self, var: usize) -> bool {
        !self.nonbasic_flag[var]
    }

    #[inline]
    pub fn nonbasic_move(&self, var: usize) -> NonbasicMove {
        self.nonbasic_move[var]
    }

    #[inline]
    pub fn num_tot(&self) -> usize {
        self.nonbasic_flag.len()
    }

    /// Checks that the basic variables and the nonbasic flags form a partition.
    pub fn check(&self, num_col: usize, num_row: usize) -> Result<(), DualplexError> {
        let num_tot = num_col + num_row;

        if self.basic_index.len() != num_row {
            return Err(DualplexError::InvalidBasis(format!(
                "{} basic variables, expected {}",
                self.basic_index.len(),
                num_row
            )));
        }

        if self.nonbasic_flag.len() != num_tot || self.nonbasic_move.len() != num_tot {
            return Err(DualplexError::InvalidBasis(format!(
                "basis covers {} variables, expected {}",
                self.nonbasic_flag.len(),
                num_tot
            )));
        }

        let mut seen = vec![false; num_tot];

        for &var in &self.basic_index {
            if var >= num_tot {
                return Err(DualplexError::InvalidBasis(format!(
                    "basic variable {} out of range",
                    var
                )));
            }

            if seen[var] {
                return Err(DualplexError::InvalidBasis(format!(
                    "variable {} is basic twice",
                    var
                )));
            }

            seen[var] = true;
        }

        match (0..num_tot).find(|&var| seen[var] == self.nonbasic_flag[var]) {
            Some(var) => Err(DualplexError::InvalidBasis(format!(
                "nonbasic flag of variable {} is inconsistent with the basic variables",
                var
            ))),

            None => Ok(()),
        }
    }

    /// `var_in` replaces the basic variable at `position`, which leaves with `move_out`.
    pub fn pivot(&mut self, var_in: usize, position: usize, move_out: NonbasicMove) {
        let var_out = self.basic_index[position];
        self.basic_index[position] = var_in;
        self.nonbasic_flag[var_in] = false;
        self.nonbasic_move[var_in] = NonbasicMove::Zero;
        self.nonbasic_flag[var_out] = true;
        self.nonbasic_move[var_out] = move_out;
    }

    pub fn flip(&mut self, var: usize) {
        self.nonbasic_move[var] = match self.nonbasic_move[var] {
            NonbasicMove::Up => NonbasicMove::Down,
            NonbasicMove::Down => NonbasicMove::Up,
            NonbasicMove::Zero => NonbasicMove::Zero,
        };
    }

    pub(crate) fn set_move(&mut self, var: usize, nonbasic_move: NonbasicMove) {
        self.nonbasic_move[var] = nonbasic_move;
    }

    /// Inserts nonbasic columns with the given moves after the last of the
    /// `num_col` structurals.
    pub fn add_cols(&mut self, num_col: usize, moves: Vec<NonbasicMove>) {
        let num_new = moves.len();

        for var in self.basic_index.iter_mut() {
            if *var >= num_col {
                *var += num_new;
            }
        }

        let slack_flags = self.nonbasic_flag.split_off(num_col);
        self.nonbasic_flag.extend(std::iter::repeat(true).take(num_new));
        self.nonbasic_flag.extend(slack_flags);

        let slack_moves = self.nonbasic_move.split_off(num_col);
        self.nonbasic_move.extend(moves);
        self.nonbasic_move.extend(slack_moves);
    }

    /// Appends rows whose slacks are basic.
    pub fn add_rows(&mut self, num_new: usize) {
        let num_tot = self.num_tot();

        for var in num_tot..num_tot + num_new {
            self.basic_index.push(var);
            self.nonbasic_flag.push(false);
            self.nonbasic_move.push(NonbasicMove::Zero);
        }
    }

    /// Removes the columns `cols`. Returns `false`, leaving the basis
    /// unchanged, if one of them is basic.
    pub fn delete_cols(&mut self, cols: Range<usize>) -> bool {
        if cols.clone().any(|col| self.is_basic(col)) {
            return false;
        }

        self.remove_nonbasic(cols);
        true
    }

    /// Removes the rows `rows` of an LP with `num_col` columns. Returns `false`,
    /// leaving the basis unchanged, unless all their slacks are basic.
    pub fn delete_rows(&mut self, num_col: usize, rows: Range<usize>) -> bool {
        let slacks = num_col + rows.start..num_col + rows.end;

        if slacks.clone().any(|var| !self.is_basic(var)) {
            return false;
        }

        self.basic_index.retain(|var| !slacks.contains(var));

        for flag in &mut self.nonbasic_flag[slacks.clone()] {
            *flag = true;
        }

        self.remove_nonbasic(slacks);
        true
    }

    fn remove_nonbasic(&mut self, vars: Range<usize>) {
        let num_removed = vars.len();

        for var in self.basic_index.iter_mut() {
            if *var >= vars.end {
                *var -= num_removed;
            }
        }

        self.nonbasic_flag.drain(vars.clone());
        self.nonbasic_move.drain(vars);
    }
}
