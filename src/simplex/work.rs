use crate::lp::Lp;
use crate::simplex::basis::{Basis, NonbasicMove};
use crate::simplex::factor::Factor;
use crate::simplex::matrix::Matrix;

use log::{debug, trace};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

//bounds of the artificial phase 1 box
const FREE_BOX: f64 = 1000.;

const BIG_COST: f64 = 100.;
const PERTURBATION_BASE: f64 = 5e-7;
const ROW_PERTURBATION: f64 = 1e-12;

/// Which bounds the work arrays hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundSet {
    /// The true bounds of the solver LP.
    Original,

    /// A box around zero that makes every nonbasic variable flippable.
    Phase1,
}

/// Uniform random numbers in `[0, 1)`, one per variable, drawn from `seed`.
/// The stream is the same on every platform and release.
pub fn random_vector(num_tot: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..num_tot).map(|_| rng.gen::<f64>()).collect()
}

/// Costs, bounds, values and duals of all variables of `[A I]` for the
/// current phase. The solver minimizes, so the costs of a maximization are
/// negated. The slack of row `i` has bounds `[-row_upper, -row_lower]`.
#[derive(Debug, Clone, Default)]
pub struct WorkArrays {
    pub cost: Vec<f64>,
    pub shift: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub range: Vec<f64>,
    pub value: Vec<f64>,
    pub dual: Vec<f64>,

    pub base_value: Vec<f64>,
    pub base_lower: Vec<f64>,
    pub base_upper: Vec<f64>,

    pub cost_perturbed: bool,
    pub cost_shifted: bool,
    pub bounds: Option<BoundSet>,
}

impl WorkArrays {
    pub fn new(num_col: usize, num_row: usize) -> Self {
        let num_tot = num_col + num_row;

        Self {
            cost: vec![0.; num_tot],
            shift: vec![0.; num_tot],
            lower: vec![0.; num_tot],
            upper: vec![0.; num_tot],
            range: vec![0.; num_tot],
            value: vec![0.; num_tot],
            dual: vec![0.; num_tot],
            base_value: vec![0.; num_row],
            base_lower: vec![0.; num_row],
            base_upper: vec![0.; num_row],
            cost_perturbed: false,
            cost_shifted: false,
            bounds: None,
        }
    }

    #[inline]
    pub fn num_tot(&self) -> usize {
        self.cost.len()
    }

    /// Costs that are neither perturbed nor shifted.
    #[inline]
    pub fn costs_unaltered(&self) -> bool {
        !self.cost_perturbed && !self.cost_shifted
    }

    pub fn init_cost(&mut self, lp: &Lp, perturb: bool, random: &[f64]) {
        let sign = lp.sense.sign();

        for col in 0..lp.num_col {
            self.cost[col] = sign * lp.col_cost[col];
        }

        for cost in self.cost.iter_mut().skip(lp.num_col) {
            *cost = 0.;
        }

        for shift in self.shift.iter_mut() {
            *shift = 0.;
        }

        self.cost_shifted = false;
        self.cost_perturbed = perturb;

        if perturb {
            self.perturb_cost(lp, random);
        }
    }

    fn perturb_cost(&mut self, lp: &Lp, random: &[f64]) {
        let num_col = lp.num_col;

        let mut bigc = self.cost[..num_col]
            .iter()
            .fold(0f64, |max, cost| max.max(cost.abs()));

        if bigc > BIG_COST {
            bigc = bigc.sqrt().sqrt();
        }

        let num_boxed = (0..num_col)
            .filter(|&col| lp.col_lower[col].is_finite() && lp.col_upper[col].is_finite())
            .count();

        if (num_boxed as f64) < 0.01 * lp.num_tot() as f64 {
            bigc = bigc.min(1.);
        }

        let base = PERTURBATION_BASE * bigc;

        for col in 0..num_col {
            let (lower, upper) = (lp.col_lower[col], lp.col_upper[col]);
            let cost = self.cost[col];
            let perturbation = (cost.abs() + 1.) * base * (1. + random[col]);

            self.cost[col] += match (lower.is_finite(), upper.is_finite()) {
                (false, false) => 0.,
                (true, false) => perturbation,
                (false, true) => -perturbation,
                (true, true) if lower == upper => 0.,
                (true, true) if cost >= 0. => perturbation,
                (true, true) => -perturbation,
            };
        }

        for var in num_col..lp.num_tot() {
            self.cost[var] += (0.5 - random[var]) * ROW_PERTURBATION;
        }

        trace!("perturbed costs: {:?}", self.cost);
    }

    /// Zero costs, perturbed only for the nonbasic variables in the direction
    /// they may move, so that the initial duals are feasible.
    pub fn init_feasibility_cost(&mut self, basis: &Basis, random: &[f64]) {
        for var in 0..self.num_tot() {
            self.shift[var] = 0.;
            self.cost[var] = if basis.is_basic(var) {
                0.
            } else {
                basis.nonbasic_move(var).sign() * PERTURBATION_BASE * (1. + random[var])
            };
        }

        self.cost_perturbed = true;
        self.cost_shifted = false;
    }

    pub fn init_bound(&mut self, lp: &Lp, bounds: BoundSet) {
        let num_col = lp.num_col;

        for var in 0..lp.num_tot() {
            let (lower, upper) = if var < num_col {
                (lp.col_lower[var], lp.col_upper[var])
            } else {
                let row = var - num_col;
                (-lp.row_upper[row], -lp.row_lower[row])
            };

            let (lower, upper) = match bounds {
                BoundSet::Original => (lower, upper),
                BoundSet::Phase1 => match (lower.is_finite(), upper.is_finite()) {
                    (false, false) => (-FREE_BOX, FREE_BOX),
                    (true, false) => (0., 1.),
                    (false, true) => (-1., 0.),
                    (true, true) => (0., 0.),
                },
            };

            self.lower[var] = lower;
            self.upper[var] = upper;
            self.range[var] = upper - lower;
        }

        self.bounds = Some(bounds);
    }

    /// Moves every nonbasic variable to a bound consistent with its move.
    pub fn init_value(&mut self, basis: &mut Basis) {
        for var in 0..self.num_tot() {
            if basis.is_basic(var) {
                continue;
            }

            let (lower, upper) = (self.lower[var], self.upper[var]);
            let nonbasic_move = basis.nonbasic_move(var).for_bounds(lower, upper);
            basis.set_move(var, nonbasic_move);
            self.value[var] = nonbasic_move.value(lower, upper);
        }
    }

    pub fn compute_primal(&mut self, basis: &Basis, matrix: &Matrix, factor: &Factor) {
        let num_row = self.base_value.len();
        let mut rhs = nalgebra::DVector::zeros(num_row);

        for var in 0..self.num_tot() {
            if !basis.is_basic(var) && self.value[var] != 0. {
                matrix.collect_aj(&mut rhs, var, -self.value[var]);
            }
        }

        factor.ftran(&mut rhs);

        for (position, &var) in basis.basic_index().iter().enumerate() {
            self.base_value[position] = rhs[position];
            self.base_lower[position] = self.lower[var];
            self.base_upper[position] = self.upper[var];
        }
    }

    pub fn compute_dual(&mut self, basis: &Basis, matrix: &Matrix, factor: &Factor) {
        let num_col = matrix.num_col();
        let mut y = nalgebra::DVector::from_iterator(
            basis.basic_index().len(),
            basis
                .basic_index()
                .iter()
                .map(|&var| self.cost[var] + self.shift[var]),
        );

        factor.btran(&mut y);

        for var in 0..self.num_tot() {
            self.dual[var] = if basis.is_basic(var) {
                0.
            } else if var < num_col {
                self.cost[var] + self.shift[var]
                    - matrix.column(var).map(|(row, value)| value * y[row]).sum::<f64>()
            } else {
                self.cost[var] + self.shift[var] - y[var - num_col]
            };
        }
    }

    #[inline]
    fn is_boxed(&self, var: usize) -> bool {
        self.lower[var].is_finite() && self.upper[var].is_finite()
    }

    /// Dual infeasibility of a nonbasic variable, 0 when its dual has the right sign.
    pub fn dual_infeasibility(&self, basis: &Basis, var: usize) -> f64 {
        if self.lower[var] == self.upper[var] {
            return 0.;
        }

        match basis.nonbasic_move(var) {
            NonbasicMove::Up => (-self.dual[var]).max(0.),
            NonbasicMove::Down => self.dual[var].max(0.),
            NonbasicMove::Zero => self.dual[var].abs(),
        }
    }

    /// Number of dual infeasibilities above `tol` that a bound flip cannot remove.
    pub fn num_unflippable_dual_infeasibilities(&self, basis: &Basis, tol: f64) -> usize {
        (0..self.num_tot())
            .filter(|&var| {
                !basis.is_basic(var)
                    && !self.is_boxed(var)
                    && self.dual_infeasibility(basis, var) > tol
            })
            .count()
    }

    /// Removes dual infeasibilities, flipping boxed variables and shifting the
    /// cost of the others. Returns the number of flips; the basic values must be
    /// recomputed if there were any.
    pub fn correct_dual(&mut self, basis: &mut Basis, tol: f64, random: &[f64]) -> usize {
        let mut num_flip = 0;
        let mut num_shift = 0;

        for var in 0..self.num_tot() {
            if basis.is_basic(var) || self.dual_infeasibility(basis, var) <= tol {
                continue;
            }

            if self.is_boxed(var) {
                self.flip_bound(basis, var);
                num_flip += 1;
            } else {
                let target = match basis.nonbasic_move(var) {
                    NonbasicMove::Up => (1. + random[var]) * tol,
                    NonbasicMove::Down => -(1. + random[var]) * tol,
                    NonbasicMove::Zero => 0.,
                };

                self.shift_cost(var, target - self.dual[var]);
                num_shift += 1;
            }
        }

        if num_flip > 0 || num_shift > 0 {
            debug!(
                "corrected dual infeasibilities with {} flips and {} shifts",
                num_flip, num_shift
            );
        }

        num_flip
    }

    pub fn shift_cost(&mut self, var: usize, amount: f64) {
        self.shift[var] += amount;
        self.dual[var] += amount;
        self.cost_shifted = true;
    }

    pub fn shift_back(&mut self, var: usize) {
        self.dual[var] -= self.shift[var];
        self.shift[var] = 0.;
    }

    pub fn flip_bound(&mut self, basis: &mut Basis, var: usize) {
        basis.flip(var);
        self.value[var] = basis
            .nonbasic_move(var)
            .value(self.lower[var], self.upper[var]);
    }

    /// `Σ dual_j value_j` over the nonbasic variables, which equals the
    /// objective of the solver LP for the work costs.
    pub fn dual_objective(&self, basis: &Basis) -> f64 {
        (0..self.num_tot())
            .filter(|&var| !basis.is_basic(var))
            .map(|var| self.dual[var] * self.value[var])
            .sum()
    }

    /// Lower bound on the solver LP objective for the true costs, whatever the
    /// costs the work arrays hold. The duals of the true costs for the current
    /// basis give `Σ min(d_j l_j, d_j u_j)` over the nonbasic variables, which
    /// holds for any basis. `None` when a reduced cost beyond `tol` points at an
    /// infinite bound.
    pub fn true_dual_objective(
        &self,
        lp: &Lp,
        basis: &Basis,
        matrix: &Matrix,
        factor: &Factor,
        tol: f64,
    ) -> Option<f64> {
        let num_col = lp.num_col;
        let sign = lp.sense.sign();
        let true_cost = |var: usize| if var < num_col { sign * lp.col_cost[var] } else { 0. };

        let mut y = nalgebra::DVector::from_iterator(
            basis.basic_index().len(),
            basis.basic_index().iter().map(|&var| true_cost(var)),
        );

        factor.btran(&mut y);

        let mut objective = 0.;

        for var in (0..self.num_tot()).filter(|&var| !basis.is_basic(var)) {
            let dual = if var < num_col {
                true_cost(var) - matrix.column(var).map(|(row, value)| value * y[row]).sum::<f64>()
            } else {
                -y[var - num_col]
            };

            let bound = if dual > tol {
                self.lower[var]
            } else if dual < -tol {
                self.upper[var]
            } else {
                self.value[var]
            };

            if !bound.is_finite() {
                return None;
            }

            objective += dual * bound;
        }

        Some(objective)
    }

    /// Copies the basic values into `value`.
    pub fn sync_basic_values(&mut self, basis: &Basis) {
        for (position, &var) in basis.basic_index().iter().enumerate() {
            self.value[var] = self.base_value[position];
        }
    }

    /// Primal infeasibility of the basic variable at `position`.
    #[inline]
    pub fn primal_infeasibility(&self, position: usize, tol: f64) -> f64 {
        let value = self.base_value[position];

        if value < self.base_lower[position] - tol {
            self.base_lower[position] - value
        } else if value > self.base_upper[position] + tol {
            value - self.base_upper[position]
        } else {
            0.
        }
    }

    pub fn num_primal_infeasibilities(&self, tol: f64) -> usize {
        (0..self.base_value.len())
            .filter(|&position| self.primal_infeasibility(position, tol) > 0.)
            .count()
    }
}
