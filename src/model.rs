use crate::error::DualplexError;
use crate::flags::{ModelAction, ModelFlags};
use crate::lp::{Lp, ObjSense};
use crate::options::{CrashStrategy, SimplexOptions};
use crate::simplex::basis::{Basis, NonbasicMove};
use crate::simplex::crash::crash;
use crate::simplex::dual_simplex::DualSimplex;
use crate::simplex::factor::Factor;
use crate::simplex::matrix::Matrix;
use crate::simplex::pricing::pricing_for;
use crate::simplex::trivial::solve_trivial;
use crate::simplex::{Budget, SimplexInstance, SolutionStatus};
use crate::solver::{BaseStat, BasisInfo, DualplexResult, Solution, SolverResult};
use crate::transform::{tighten_bounds, Permutation, Scale, Transposition};

use log::{debug, info, warn};
use std::ops::Range;

fn check_indices(
    indices: &[usize],
    num_values: usize,
    len: usize,
    what: &str,
) -> Result<(), DualplexError> {
    if indices.len() != num_values {
        return Err(DualplexError::InvalidLp(format!(
            "{} {} indices for {} values",
            indices.len(),
            what,
            num_values
        )));
    }

    match indices.iter().find(|&&index| index >= len) {
        Some(index) => Err(DualplexError::InvalidLp(format!(
            "{} {} out of range, there are {}",
            what, index, len
        ))),

        None => Ok(()),
    }
}

//replaces a crashed basis that cannot be factorized by the logical one
fn crash_basis(inst: &mut SimplexInstance, update_limit: usize) {
    let logical = inst.basis.clone();

    if crash(&inst.lp, &mut inst.basis) == 0 {
        return;
    }

    let matrix = Matrix::setup(&inst.lp, &inst.basis.nonbasic_flag);

    if Factor::build(&matrix, inst.basis.basic_index(), update_limit).is_err() {
        warn!("crash basis is singular, starting from the logical basis");
        inst.basis = logical;
    }
}

/// An LP that is solved, modified and solved again.
///
/// The model derives a solver LP from the LP it holds (transposed, scaled and
/// permuted as the options ask) and keeps it, with its factorization and work
/// arrays, across modifications that leave it valid. The basis is kept in the
/// terms of the held LP and survives modifications where it stays a basis:
/// new columns are nonbasic, new rows get basic slacks, and deleting columns
/// or rows keeps the basis when only nonbasic columns or rows with basic
/// slacks go. A solve after a modification starts from the previous basis.
pub struct SimplexModel {
    lp: Lp,
    options: SimplexOptions,
    flags: ModelFlags,

    instance: Option<SimplexInstance>,
    transposition: Option<Transposition>,
    scale: Option<Scale>,
    permutation: Option<Permutation>,

    basis: Option<Basis>,
}

impl SimplexModel {
    pub fn new(lp: Lp, options: SimplexOptions) -> Self {
        Self {
            lp,
            options,
            flags: ModelFlags::new(),
            instance: None,
            transposition: None,
            scale: None,
            permutation: None,
            basis: None,
        }
    }

    pub fn lp(&self) -> &Lp {
        &self.lp
    }

    pub fn options(&self) -> &SimplexOptions {
        &self.options
    }

    pub fn flags(&self) -> &ModelFlags {
        &self.flags
    }

    /// Total number of simplex iterations on the current solver LP.
    pub fn iteration_count(&self) -> u64 {
        self.instance.as_ref().map_or(0, |inst| inst.iteration_count)
    }

    pub fn basis(&self) -> Option<&Basis> {
        self.basis.as_ref()
    }

    /// Variables of the basis by position; `num_col + i` is the slack of row `i`.
    pub fn basic_indices(&self) -> Option<&[usize]> {
        self.basis.as_ref().map(Basis::basic_index)
    }

    pub fn base_status(&self) -> Option<BasisInfo> {
        self.basis.as_ref().map(|basis| self.basis_info(basis))
    }

    pub fn set_base_status(&mut self, status: &BasisInfo) -> Result<(), DualplexError> {
        let lp = &self.lp;

        if status.col_status.len() != lp.num_col || status.row_status.len() != lp.num_row {
            return Err(DualplexError::InvalidBasis(format!(
                "status of {} columns and {} rows, expected {} and {}",
                status.col_status.len(),
                status.row_status.len(),
                lp.num_col,
                lp.num_row
            )));
        }

        let mut basic_index = Vec::with_capacity(lp.num_row);
        let mut moves = Vec::with_capacity(lp.num_tot());

        for (col, stat) in status.col_status.iter().enumerate() {
            let preferred = match stat {
                BaseStat::Basic => {
                    basic_index.push(col);
                    NonbasicMove::Zero
                }

                BaseStat::Lower => NonbasicMove::Up,
                BaseStat::Upper => NonbasicMove::Down,
                BaseStat::Zero => NonbasicMove::Zero,
            };

            moves.push(preferred.for_bounds(lp.col_lower[col], lp.col_upper[col]));
        }

        //a row at its upper bound has its slack at the lower bound
        for (row, stat) in status.row_status.iter().enumerate() {
            let preferred = match stat {
                BaseStat::Basic => {
                    basic_index.push(lp.num_col + row);
                    NonbasicMove::Zero
                }

                BaseStat::Lower => NonbasicMove::Down,
                BaseStat::Upper => NonbasicMove::Up,
                BaseStat::Zero => NonbasicMove::Zero,
            };

            moves.push(preferred.for_bounds(-lp.row_upper[row], -lp.row_lower[row]));
        }

        let basis = Basis::new(basic_index, moves, lp.num_col, lp.num_row)?;
        self.set_basis(basis)
    }

    pub fn set_basis(&mut self, basis: Basis) -> Result<(), DualplexError> {
        basis.check(self.lp.num_col, self.lp.num_row)?;

        if self.solver_lp_in_sync() {
            if let Some(inst) = self.instance.as_mut() {
                inst.basis = match &self.permutation {
                    Some(permutation) => permutation.permute_basis(&basis),
                    None => basis.clone(),
                };

                self.flags.apply(ModelAction::NewBasis);
            }
        }

        self.basis = Some(basis);
        Ok(())
    }

    pub fn change_objective_sense(&mut self, sense: ObjSense) {
        if self.lp.sense == sense {
            return;
        }

        self.lp.sense = sense;

        if self.solver_lp_in_sync() {
            if let Some(inst) = self.instance.as_mut() {
                inst.lp.sense = sense;
            }
        }

        self.flags.apply(ModelAction::NewCosts);
    }

    pub fn change_costs(&mut self, cols: &[usize], costs: &[f64]) -> Result<(), DualplexError> {
        check_indices(cols, costs.len(), self.lp.num_col, "column")?;

        for (&col, &cost) in cols.iter().zip(costs) {
            self.lp.col_cost[col] = cost;
        }

        if self.solver_lp_in_sync() {
            if let Some(inst) = self.instance.as_mut() {
                for &col in cols {
                    let k = self.permutation.as_ref().map_or(col, |p| p.permuted(col));
                    let cost = self.lp.col_cost[col];
                    inst.lp.col_cost[k] = self.scale.as_ref().map_or(cost, |s| s.cost(col, cost));
                }
            }
        }

        self.flags.apply(ModelAction::NewCosts);
        Ok(())
    }

    pub fn change_col_bounds(
        &mut self,
        cols: &[usize],
        lower: &[f64],
        upper: &[f64],
    ) -> Result<(), DualplexError> {
        check_indices(cols, lower.len(), self.lp.num_col, "column")?;
        check_indices(cols, upper.len(), self.lp.num_col, "column")?;

        for (k, &col) in cols.iter().enumerate() {
            self.lp.col_lower[col] = lower[k];
            self.lp.col_upper[col] = upper[k];
        }

        self.sync_col_bounds(cols);
        self.flags.apply(ModelAction::NewBounds);
        Ok(())
    }

    pub fn change_row_bounds(
        &mut self,
        rows: &[usize],
        lower: &[f64],
        upper: &[f64],
    ) -> Result<(), DualplexError> {
        check_indices(rows, lower.len(), self.lp.num_row, "row")?;
        check_indices(rows, upper.len(), self.lp.num_row, "row")?;

        for (k, &row) in rows.iter().enumerate() {
            self.lp.row_lower[row] = lower[k];
            self.lp.row_upper[row] = upper[k];
        }

        if self.solver_lp_in_sync() {
            if let Some(inst) = self.instance.as_mut() {
                for &row in rows {
                    let (lower, upper) = (self.lp.row_lower[row], self.lp.row_upper[row]);
                    let (lower, upper) = self
                        .scale
                        .as_ref()
                        .map_or((lower, upper), |s| s.row_bounds(row, lower, upper));

                    inst.lp.row_lower[row] = lower;
                    inst.lp.row_upper[row] = upper;
                }
            }
        }

        self.flags.apply(ModelAction::NewBounds);
        Ok(())
    }

    /// Appends columns in compressed-column form. They enter the basis nonbasic.
    pub fn add_cols(
        &mut self,
        cost: &[f64],
        lower: &[f64],
        upper: &[f64],
        a_start: &[usize],
        a_index: &[usize],
        a_value: &[f64],
    ) -> Result<(), DualplexError> {
        let num_col = self.lp.num_col;
        self.lp
            .add_cols(cost, lower, upper, a_start, a_index, a_value)?;

        let moves: Vec<NonbasicMove> = (num_col..self.lp.num_col)
            .map(|col| NonbasicMove::Up.for_bounds(self.lp.col_lower[col], self.lp.col_upper[col]))
            .collect();

        if let Some(basis) = self.basis.as_mut() {
            basis.add_cols(num_col, moves);
        }

        self.flags.apply(ModelAction::NewCols);
        Ok(())
    }

    /// Appends rows in compressed-row form. Their slacks enter the basis.
    pub fn add_rows(
        &mut self,
        lower: &[f64],
        upper: &[f64],
        ar_start: &[usize],
        ar_index: &[usize],
        ar_value: &[f64],
    ) -> Result<(), DualplexError> {
        self.lp
            .add_rows(lower, upper, ar_start, ar_index, ar_value)?;

        if let Some(basis) = self.basis.as_mut() {
            basis.add_rows(lower.len());
        }

        self.flags.apply(ModelAction::NewRows);
        Ok(())
    }

    pub fn delete_cols(&mut self, cols: Range<usize>) -> Result<(), DualplexError> {
        self.lp.delete_cols(cols.clone())?;

        let kept = match self.basis.as_mut() {
            Some(basis) => basis.delete_cols(cols),
            None => true,
        };

        if !kept {
            debug!("deleted a basic column, dropping the basis");
            self.basis = None;
        }

        self.flags.apply(ModelAction::DelCols);
        Ok(())
    }

    pub fn delete_rows(&mut self, rows: Range<usize>) -> Result<(), DualplexError> {
        let num_col = self.lp.num_col;
        self.lp.delete_rows(rows.clone())?;

        let kept = match self.basis.as_mut() {
            Some(basis) => basis.delete_rows(num_col, rows),
            None => true,
        };

        if kept {
            self.flags.apply(ModelAction::DelRowsBasisOk);
        } else {
            debug!("deleted a row with a nonbasic slack, dropping the basis");
            self.basis = None;
            self.flags.apply(ModelAction::DelRows);
        }

        Ok(())
    }

    pub fn change_coeff(&mut self, row: usize, col: usize, value: f64) -> Result<(), DualplexError> {
        self.lp.change_coeff(row, col, value)?;

        //the matrix and factor are rebuilt as for a new column
        self.flags.apply(ModelAction::NewCols);
        Ok(())
    }

    pub fn solve(&mut self) -> DualplexResult {
        self.options.validate()?;
        self.lp.validate()?;

        if let Some(row) = self
            .lp
            .inconsistent_row(self.options.primal_feasibility_tolerance)
        {
            info!(
                "row {} has bounds [{}, {}], problem is infeasible",
                row, self.lp.row_lower[row], self.lp.row_upper[row]
            );
            return Ok(SolverResult::Infeasible);
        }

        if self.lp.num_row == 0 {
            return self.solve_without_rows();
        }

        let mut budget = Budget::new(&self.options);

        let status = if self.options.tighten {
            self.solve_tightened(&mut budget)?
        } else {
            self.solve_lp(&mut budget)?
        };

        let wrap: fn(Solution) -> SolverResult = match status {
            SolutionStatus::Optimal => SolverResult::Optimal,
            SolutionStatus::OutOfTime => SolverResult::OutOfTime,
            SolutionStatus::ReachedDualObjectiveBound => SolverResult::ReachedDualObjectiveBound,
            SolutionStatus::Infeasible => return Ok(SolverResult::Infeasible),
            SolutionStatus::Unbounded => return Ok(SolverResult::Unbounded),
            SolutionStatus::Failed => return Ok(SolverResult::Failed),
        };

        Ok(self.solution().map_or(SolverResult::Failed, wrap))
    }

    fn solver_lp_in_sync(&self) -> bool {
        self.flags.have_solver_lp() && !self.flags.transposed_lp()
    }

    fn sync_col_bounds(&mut self, cols: &[usize]) {
        if !self.solver_lp_in_sync() {
            return;
        }

        if let Some(inst) = self.instance.as_mut() {
            for &col in cols {
                let k = self.permutation.as_ref().map_or(col, |p| p.permuted(col));
                let (lower, upper) = (self.lp.col_lower[col], self.lp.col_upper[col]);
                let (lower, upper) = self
                    .scale
                    .as_ref()
                    .map_or((lower, upper), |s| s.col_bounds(col, lower, upper));

                inst.lp.col_lower[k] = lower;
                inst.lp.col_upper[k] = upper;
            }
        }
    }

    fn solve_without_rows(&mut self) -> DualplexResult {
        let (status, col_value, basis) = solve_trivial(&self.lp)?;
        let info = self.basis_info(&basis);
        self.basis = Some(basis);

        if status == SolutionStatus::Unbounded {
            return Ok(SolverResult::Unbounded);
        }

        info!(
            "found optimal point with objective value {}",
            self.lp.objective(&col_value)
        );

        Ok(SolverResult::Optimal(Solution::new(
            self.lp.objective(&col_value),
            col_value,
            self.lp.col_cost.clone(),
            Vec::new(),
            Vec::new(),
            info,
        )))
    }

    //solves with implied bounds, then warm starts from that basis with the true
    //bounds; after a stop the second pass only evaluates the basis
    fn solve_tightened(&mut self, budget: &mut Budget) -> Result<SolutionStatus, DualplexError> {
        let saved_lower = self.lp.col_lower.clone();
        let saved_upper = self.lp.col_upper.clone();
        let num_tightened = tighten_bounds(&mut self.lp);

        if num_tightened == 0 {
            return self.solve_lp(budget);
        }

        info!("tightened the bounds of {} columns", num_tightened);

        let all_cols: Vec<usize> = (0..self.lp.num_col).collect();
        self.flags.mark_saved_bounds(true);
        self.sync_col_bounds(&all_cols);
        self.flags.apply(ModelAction::NewBounds);

        let tightened = self.solve_lp(budget);

        self.lp.col_lower = saved_lower;
        self.lp.col_upper = saved_upper;
        self.flags.mark_saved_bounds(false);
        self.sync_col_bounds(&all_cols);
        self.flags.apply(ModelAction::NewBounds);

        let tightened = tightened?;
        debug!("tightened lp ended {:?}", tightened);

        if tightened == SolutionStatus::OutOfTime {
            budget.iterations = 0;
        }

        self.solve_lp(budget)
    }

    fn solve_lp(&mut self, budget: &mut Budget) -> Result<SolutionStatus, DualplexError> {
        //the objective of the transposed lp is not the objective of this one
        let transpose = self.options.transpose
            && self.basis.is_none()
            && self.options.dual_objective_bound.is_none()
            && Transposition::eligible(&self.lp);

        if transpose {
            let status = self.run_simplex(true, budget)?;

            if status == SolutionStatus::Optimal {
                return Ok(status);
            }

            info!("transposed lp ended {:?}, solving the original lp", status);

            //the original lp is only evaluated at its starting basis
            if status == SolutionStatus::OutOfTime {
                budget.iterations = 0;
            }
        }

        self.run_simplex(false, budget)
    }

    fn run_simplex(
        &mut self,
        transpose: bool,
        budget: &mut Budget,
    ) -> Result<SolutionStatus, DualplexError> {
        if !self.flags.have_solver_lp() || self.flags.transposed_lp() != transpose {
            self.build_solver_lp(transpose)?;
        }

        let pricing = pricing_for(&self.options)?;

        let inst = match self.instance.as_mut() {
            Some(inst) => inst,
            None => return Ok(SolutionStatus::Failed),
        };

        let status = DualSimplex::new(inst, &mut self.flags, &self.options, pricing.as_ref())
            .solve_within(budget);

        //a basis of the transposed lp only maps back at an optimum
        if !self.flags.transposed_lp() || status == SolutionStatus::Optimal {
            self.basis = self.solver_basis()?;
        }

        Ok(status)
    }

    fn build_solver_lp(&mut self, transpose: bool) -> Result<(), DualplexError> {
        let mut flags = ModelFlags::new();
        flags.mark_saved_bounds(self.flags.have_saved_bounds());
        self.flags = flags;

        let mut lp = self.lp.clone();
        self.transposition = None;

        if transpose {
            if let Some((transposition, transposed)) = Transposition::new(&lp) {
                lp = transposed;
                self.transposition = Some(transposition);
                self.flags.apply(ModelAction::TransposeLp);
            }
        }

        self.scale = if self.options.scale {
            Scale::compute(&lp)
        } else {
            None
        };

        if let Some(scale) = &self.scale {
            scale.apply(&mut lp);
            self.flags.apply(ModelAction::ScaleLp);
        }

        self.permutation = if self.options.permute {
            Some(Permutation::random(lp.num_col, self.options.seed))
        } else {
            None
        };

        if let Some(permutation) = &self.permutation {
            permutation.apply(&mut lp);
            self.flags.apply(ModelAction::ShuffleLp);
        }

        let basis = match (&self.basis, &self.transposition) {
            (Some(basis), None) => {
                basis.check(lp.num_col, lp.num_row)?;

                match &self.permutation {
                    Some(permutation) => permutation.permute_basis(basis),
                    None => basis.clone(),
                }
            }

            _ => Basis::logical(&lp),
        };

        debug!(
            "solver lp with {} columns and {} rows, transposed: {}, scaled: {}, permuted: {}",
            lp.num_col,
            lp.num_row,
            self.transposition.is_some(),
            self.scale.is_some(),
            self.permutation.is_some()
        );

        let mut inst = SimplexInstance::new(lp, basis, self.options.seed);

        if self.basis.is_none() && self.options.crash == CrashStrategy::Triangular {
            crash_basis(&mut inst, self.options.update_limit);
        }

        self.instance = Some(inst);
        self.flags.mark_solver_lp(true);
        self.flags.apply(ModelAction::NewBasis);
        Ok(())
    }

    //basis of the solver lp in terms of the held lp
    fn solver_basis(&self) -> Result<Option<Basis>, DualplexError> {
        let inst = match &self.instance {
            Some(inst) => inst,
            None => return Ok(None),
        };

        let basis = match &self.permutation {
            Some(permutation) => permutation.unpermute_basis(&inst.basis),
            None => inst.basis.clone(),
        };

        match &self.transposition {
            Some(transposition) => transposition.recover_basis(&basis).map(Some),
            None => Ok(Some(basis)),
        }
    }

    fn solution(&self) -> Option<Solution> {
        let inst = self.instance.as_ref()?;
        let basis = self.basis.as_ref()?;
        let num_col = inst.lp.num_col;
        let sign = inst.lp.sense.sign();
        let work = &inst.work;

        //the solver minimizes and its slacks are -Ax
        let mut col_value = work.value[..num_col].to_vec();
        let mut col_dual: Vec<f64> = work.dual[..num_col].iter().map(|d| sign * d).collect();
        let mut row_value: Vec<f64> = work.value[num_col..].iter().map(|v| -v).collect();
        let mut row_dual: Vec<f64> = work.dual[num_col..].iter().map(|d| -sign * d).collect();

        if let Some(permutation) = &self.permutation {
            col_value = permutation.unpermute(&col_value);
            col_dual = permutation.unpermute(&col_dual);
        }

        if let Some(scale) = &self.scale {
            scale.unscale_solution(&mut col_value, &mut col_dual, &mut row_value, &mut row_dual);
        }

        if let Some(transposition) = &self.transposition {
            let (x, d, activity, y) =
                transposition.recover_solution(&self.lp, &col_value, &row_value, &row_dual);

            col_value = x;
            col_dual = d;
            row_value = activity;
            row_dual = y;
        }

        Some(Solution::new(
            self.lp.objective(&col_value),
            col_value,
            col_dual,
            row_value,
            row_dual,
            self.basis_info(basis),
        ))
    }

    fn basis_info(&self, basis: &Basis) -> BasisInfo {
        let lp = &self.lp;

        let col_status = (0..lp.num_col)
            .map(|col| {
                if basis.is_basic(col) {
                    return BaseStat::Basic;
                }

                match basis.nonbasic_move(col) {
                    NonbasicMove::Up => BaseStat::Lower,
                    NonbasicMove::Down => BaseStat::Upper,
                    NonbasicMove::Zero if lp.col_lower[col].is_finite() => BaseStat::Lower,
                    NonbasicMove::Zero => BaseStat::Zero,
                }
            })
            .collect();

        let row_status = (0..lp.num_row)
            .map(|row| {
                let slack = lp.num_col + row;

                if basis.is_basic(slack) {
                    return BaseStat::Basic;
                }

                match basis.nonbasic_move(slack) {
                    NonbasicMove::Up => BaseStat::Upper,
                    NonbasicMove::Down => BaseStat::Lower,
                    NonbasicMove::Zero if lp.row_lower[row].is_finite() => BaseStat::Lower,
                    NonbasicMove::Zero => BaseStat::Zero,
                }
            })
            .collect();

        BasisInfo {
            col_status,
            row_status,
        }
    }
}
