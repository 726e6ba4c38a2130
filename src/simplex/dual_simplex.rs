use crate::flags::{ModelAction, ModelFlags};
use crate::options::{EdgeWeightStrategy, SimplexOptions};
use crate::simplex::basis::NonbasicMove;
use crate::simplex::factor::{Factor, UpdateHint, MAX_REPAIR_ATTEMPTS};
use crate::simplex::matrix::Matrix;
use crate::simplex::pricing::{Candidate, Pricing};
use crate::simplex::work::BoundSet;
use crate::simplex::{Budget, SimplexInstance, SolutionStatus, SolvePhase};
use crate::util::ITER_WIDTH;

use log::{debug, info, trace, warn};

/// Times the costs are restored after a Phase 2 optimum before giving up.
pub const MAX_CLEANUPS: usize = 3;

const MIN_EDGE_WEIGHT: f64 = 1e-4;

//relative difference between the row and column pivots that triggers a rebuild
const ALPHA_MISMATCH: f64 = 1e-7;

#[derive(Debug, Clone, PartialEq)]
enum RatioTest {
    Enter { var: usize, flips: Vec<usize> },
    FlipOnly { flips: Vec<usize> },
    NoCandidate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Pivoted,
    Flipped,
    Rebuild,
    NoRow,
    NoCandidate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Exit {
    Optimal,
    NoCandidate,
    Stop(SolutionStatus),
}

/// Bound flipping ratio test with Harris tolerances.
///
/// Candidates are passed in order of their ratio. Each group of candidates
/// within the Harris bound of the smallest remaining ratio is flipped to its
/// other bound while the slope of the dual objective stays positive. The
/// first group that cannot be flipped supplies the entering variable, the
/// member with the largest `|alpha|`. When only degenerate candidates were met
/// and their flips remove the infeasibility of the leaving variable without
/// pushing it past its other bound, no variable enters.
fn ratio_test(
    mut candidates: Vec<Candidate>,
    mut slope: f64,
    leaving_range: f64,
    primal_tol: f64,
) -> RatioTest {
    candidates.sort_by(|a, b| a.ratio.total_cmp(&b.ratio).then(a.var.cmp(&b.var)));

    let mut flips = Vec::new();
    let mut all_degenerate = true;
    let mut start = 0;

    while start < candidates.len() {
        let theta_max = candidates[start..]
            .iter()
            .fold(f64::INFINITY, |min, c| min.min(c.harris));

        let end = start
            + candidates[start..]
                .iter()
                .take_while(|c| c.ratio <= theta_max)
                .count();

        let group = &candidates[start..end];
        let change: f64 = group.iter().map(|c| c.alpha * c.range).sum();

        if slope - change > 0. {
            all_degenerate &= group.iter().all(|c| c.degenerate);
            flips.extend(group.iter().map(|c| c.var));
            slope -= change;
            start = end;
            continue;
        }

        if all_degenerate && group.iter().all(|c| c.degenerate && c.range.is_finite()) {
            let mut remaining = slope;
            let mut group_flips = Vec::new();

            for c in group {
                if remaining <= primal_tol {
                    break;
                }

                remaining -= c.alpha * c.range;
                group_flips.push(c.var);
            }

            if remaining <= primal_tol && -remaining <= leaving_range {
                flips.extend(group_flips);
                return RatioTest::FlipOnly { flips };
            }
        }

        let entering = group.iter().fold(None, |best: Option<&Candidate>, c| match best {
            Some(best) if best.alpha > c.alpha || (best.alpha == c.alpha && best.var < c.var) => {
                Some(best)
            }

            _ => Some(c),
        });

        return match entering {
            Some(c) => RatioTest::Enter { var: c.var, flips },
            None => RatioTest::NoCandidate,
        };
    }

    RatioTest::NoCandidate
}

fn factored<'m>(
    matrix: &'m mut Option<Matrix>,
    factor: &'m mut Option<Factor>,
) -> Result<(&'m mut Matrix, &'m mut Factor), SolutionStatus> {
    match (matrix.as_mut(), factor.as_mut()) {
        (Some(matrix), Some(factor)) => Ok((matrix, factor)),
        _ => Err(SolutionStatus::Failed),
    }
}

fn compute_edge_weights(strategy: EdgeWeightStrategy, factor: &Factor, weights: &mut [f64]) {
    match strategy {
        EdgeWeightStrategy::Dantzig => {
            for weight in weights.iter_mut() {
                *weight = 1.;
            }
        }

        EdgeWeightStrategy::SteepestEdge => {
            for (position, weight) in weights.iter_mut().enumerate() {
                let mut row_ep = nalgebra::DVector::zeros(factor.num_row());
                row_ep[position] = 1.;
                factor.btran(&mut row_ep);
                *weight = row_ep.norm_squared().max(MIN_EDGE_WEIGHT);
            }
        }
    }
}

/// The dual simplex method on a [`SimplexInstance`].
///
/// Starts from whatever basis the instance holds, so a second solve after a
/// change to the LP is warm started.
pub struct DualSimplex<'a> {
    inst: &'a mut SimplexInstance,
    flags: &'a mut ModelFlags,
    options: &'a SimplexOptions,
    pricing: &'a dyn Pricing,

    phase: SolvePhase,
    budget: Budget,
    first_iteration: u64,
    row_ap: Vec<f64>,
    num_cleanups: usize,
    perturb: bool,
}

impl<'a> DualSimplex<'a> {
    pub fn new(
        inst: &'a mut SimplexInstance,
        flags: &'a mut ModelFlags,
        options: &'a SimplexOptions,
        pricing: &'a dyn Pricing,
    ) -> Self {
        let num_col = inst.lp.num_col;
        let first_iteration = inst.iteration_count;

        Self {
            inst,
            flags,
            options,
            pricing,
            phase: SolvePhase::Unknown,
            budget: Budget::new(options),
            first_iteration,
            row_ap: vec![0.; num_col],
            num_cleanups: 0,
            perturb: options.perturb_costs,
        }
    }

    pub fn phase(&self) -> SolvePhase {
        self.phase
    }

    pub fn solve(&mut self) -> SolutionStatus {
        let mut budget = Budget::new(self.options);
        self.solve_within(&mut budget)
    }

    /// Solves with the iterations and time left in `budget`, and charges it
    /// the iterations made.
    pub fn solve_within(&mut self, budget: &mut Budget) -> SolutionStatus {
        self.budget = *budget;
        self.first_iteration = self.inst.iteration_count;
        self.num_cleanups = 0;
        self.perturb = self.options.perturb_costs;
        self.prepare();

        info!(
            "solving problem with {} columns and {} rows",
            self.inst.lp.num_col, self.inst.lp.num_row
        );

        self.phase = SolvePhase::Unknown;

        loop {
            self.phase = match self.phase {
                SolvePhase::Unknown => self.initialize(),
                SolvePhase::Phase1 => self.solve_phase_1(),
                SolvePhase::Phase2 => self.solve_phase_2(),
                SolvePhase::Finished(status) => {
                    let status = self.finish(status);
                    budget.spend(self.inst.iteration_count - self.first_iteration);
                    return status;
                }
            };
        }
    }

    fn prepare(&mut self) {
        let inst = &mut *self.inst;

        if inst.matrix.is_none() || !self.flags.have_matrix_col_wise() {
            inst.matrix = Some(Matrix::setup(&inst.lp, &inst.basis.nonbasic_flag));
            self.flags.mark_matrix_col_wise(true);
            self.flags.mark_matrix_row_wise(true);
            self.flags.mark_invert(false);
        } else if !self.flags.have_matrix_row_wise() {
            if let Some(matrix) = inst.matrix.as_mut() {
                matrix.partition(&inst.basis.nonbasic_flag);
            }

            self.flags.mark_matrix_row_wise(true);
        }

        if !self.flags.have_invert() {
            inst.factor = None;
        }

        if inst.edge_weights.len() != inst.lp.num_row {
            inst.edge_weights = vec![1.; inst.lp.num_row];
            self.flags.mark_edge_weights(false);
        }

        if inst.random.len() != inst.lp.num_tot() {
            inst.random = crate::simplex::work::random_vector(inst.lp.num_tot(), self.options.seed);
        }

        self.row_ap = vec![0.; inst.lp.num_col];
    }

    fn initialize(&mut self) -> SolvePhase {
        let inst = &mut *self.inst;
        inst.work.init_cost(&inst.lp, self.perturb, &inst.random);
        self.flags.mark_nonbasic_duals(false);
        self.set_bounds(BoundSet::Original);

        if let Err(status) = self.rebuild(false) {
            return SolvePhase::Finished(status);
        }

        let num_infeasible = self.num_unflippable();
        debug!("{} dual infeasibilities cannot be flipped", num_infeasible);

        if num_infeasible > 0 {
            SolvePhase::Phase1
        } else {
            SolvePhase::Phase2
        }
    }

    fn solve_phase_1(&mut self) -> SolvePhase {
        info!("DUAL PHASE 1");
        self.set_bounds(BoundSet::Phase1);

        match self.run() {
            Exit::Optimal => {}

            Exit::NoCandidate => {
                warn!("no entering variable in phase 1");
                return SolvePhase::Finished(SolutionStatus::Failed);
            }

            Exit::Stop(status) => return SolvePhase::Finished(status),
        }

        self.set_bounds(BoundSet::Original);

        if let Err(status) = self.rebuild(false) {
            return SolvePhase::Finished(status);
        }

        if self.num_unflippable() == 0 {
            info!("found dual feasible basis");
            return SolvePhase::Phase2;
        }

        if self.perturb && self.inst.work.cost_perturbed {
            debug!("dual infeasible with perturbed costs, starting over without perturbation");
            self.perturb = false;
            return SolvePhase::Unknown;
        }

        info!("problem is dual infeasible");
        self.check_primal_feasibility()
    }

    //zero costs, so the dual is feasible and the simplex only seeks a feasible point
    fn check_primal_feasibility(&mut self) -> SolvePhase {
        info!("DUAL FEASIBILITY CHECK");

        let inst = &mut *self.inst;
        inst.work.init_feasibility_cost(&inst.basis, &inst.random);
        self.flags.mark_nonbasic_duals(false);
        self.flags.mark_fresh_rebuild(false);

        match self.run() {
            Exit::Optimal => {
                info!("problem is unbounded");
                SolvePhase::Finished(SolutionStatus::Unbounded)
            }

            Exit::NoCandidate => {
                info!("problem is infeasible");
                SolvePhase::Finished(SolutionStatus::Infeasible)
            }

            Exit::Stop(status) => SolvePhase::Finished(status),
        }
    }

    fn solve_phase_2(&mut self) -> SolvePhase {
        info!("DUAL PHASE 2");
        self.set_bounds(BoundSet::Original);

        match self.run() {
            Exit::Optimal => {}

            Exit::NoCandidate => {
                info!("problem is infeasible");
                return SolvePhase::Finished(SolutionStatus::Infeasible);
            }

            Exit::Stop(status) => return SolvePhase::Finished(status),
        }

        if self.inst.work.costs_unaltered() {
            info!(
                "found optimal point with objective value {}",
                self.objective()
            );
            return SolvePhase::Finished(SolutionStatus::Optimal);
        }

        self.num_cleanups += 1;

        if self.num_cleanups > MAX_CLEANUPS {
            warn!("costs still altered after {} cleanups", MAX_CLEANUPS);
            return SolvePhase::Finished(SolutionStatus::Failed);
        }

        debug!("restoring costs, cleanup {}", self.num_cleanups);
        self.perturb = false;

        let inst = &mut *self.inst;
        inst.work.init_cost(&inst.lp, false, &inst.random);

        if let Err(status) = self.compute_dual() {
            return SolvePhase::Finished(status);
        }

        if self.num_unflippable() > 0 {
            debug!("restored costs are dual infeasible");
            SolvePhase::Phase1
        } else {
            SolvePhase::Phase2
        }
    }

    fn finish(&mut self, status: SolutionStatus) -> SolutionStatus {
        //a stop inside phase 1 leaves the values of the artificial box
        if self.inst.work.bounds == Some(BoundSet::Phase1) {
            self.set_bounds(BoundSet::Original);

            let SimplexInstance {
                basis,
                matrix,
                factor,
                work,
                ..
            } = &mut *self.inst;

            if let Ok((matrix, factor)) = factored(matrix, factor) {
                work.compute_primal(basis, matrix, factor);
                self.flags.mark_basic_primals(true);
            }
        }

        let inst = &mut *self.inst;
        inst.work.sync_basic_values(&inst.basis);

        debug!(
            "dual simplex finished with {:?} after {} iterations",
            status,
            inst.iteration_count - self.first_iteration
        );

        status
    }

    fn set_bounds(&mut self, bounds: BoundSet) {
        let inst = &mut *self.inst;
        inst.work.init_bound(&inst.lp, bounds);
        inst.work.init_value(&mut inst.basis);
        self.flags.mark_basic_primals(false);
        self.flags.mark_fresh_rebuild(false);
    }

    fn num_unflippable(&self) -> usize {
        self.inst.work.num_unflippable_dual_infeasibilities(
            &self.inst.basis,
            self.options.dual_feasibility_tolerance,
        )
    }

    fn objective(&self) -> f64 {
        let lp = &self.inst.lp;
        lp.sense.sign() * self.inst.work.dual_objective(&self.inst.basis) + lp.offset
    }

    fn out_of_time(&self) -> bool {
        if self.inst.iteration_count - self.first_iteration >= self.budget.iterations {
            debug!("reached iteration limit");
            return true;
        }

        if self.budget.past_deadline() {
            debug!("reached time limit");
            return true;
        }

        false
    }

    /// Objective bound of the current basis for the true costs, in the sense
    /// of the LP. `None` when no such bound is finite.
    fn true_dual_objective(&self) -> Option<f64> {
        let inst = &*self.inst;
        let lp = &inst.lp;

        inst.work
            .true_dual_objective(
                lp,
                &inst.basis,
                inst.matrix.as_ref()?,
                inst.factor.as_ref()?,
                self.options.dual_feasibility_tolerance,
            )
            .map(|objective| lp.sense.sign() * objective + lp.offset)
    }

    //iterates from a fresh rebuild until the basis is primal feasible or a
    //leaving row has no entering variable
    fn run(&mut self) -> Exit {
        info!("Iteration  |  Objective");

        if !self.flags.have_fresh_rebuild() {
            if let Err(status) = self.rebuild(true) {
                return Exit::Stop(status);
            }
        }

        loop {
            if self.out_of_time() {
                return Exit::Stop(SolutionStatus::OutOfTime);
            }

            let step = match self.iterate() {
                Ok(step) => step,
                Err(status) => return Exit::Stop(status),
            };

            let fresh = self.flags.have_fresh_rebuild();

            let rebuilt = match step {
                Step::Pivoted | Step::Flipped => continue,
                Step::NoRow if fresh => return Exit::Optimal,
                Step::NoCandidate if fresh => return Exit::NoCandidate,
                Step::Rebuild | Step::NoRow | Step::NoCandidate => self.rebuild(true),
            };

            if let Err(status) = rebuilt {
                return Exit::Stop(status);
            }
        }
    }

    fn compute_dual(&mut self) -> Result<(), SolutionStatus> {
        let SimplexInstance {
            basis,
            matrix,
            factor,
            work,
            ..
        } = &mut *self.inst;

        let (matrix, factor) = factored(matrix, factor)?;
        work.compute_dual(basis, matrix, factor);
        self.flags.mark_nonbasic_duals(true);
        Ok(())
    }

    /// Factorizes the basis, replacing dependent columns by slacks when it is singular.
    fn invert(&mut self) -> Result<(), SolutionStatus> {
        let update_limit = self.options.update_limit;
        let inst = &mut *self.inst;
        let num_col = inst.lp.num_col;

        let matrix = match inst.matrix.as_mut() {
            Some(matrix) => matrix,
            None => return Err(SolutionStatus::Failed),
        };

        for attempt in 0..=MAX_REPAIR_ATTEMPTS {
            let deficiency = match Factor::build(matrix, inst.basis.basic_index(), update_limit) {
                Ok(factor) => {
                    inst.factor = Some(factor);
                    self.flags.mark_factor_arrays(true);
                    self.flags.mark_invert(true);
                    self.flags.mark_fresh_invert(true);
                    return Ok(());
                }

                Err(deficiency) => deficiency,
            };

            if attempt == MAX_REPAIR_ATTEMPTS {
                break;
            }

            warn!(
                "singular basis, replacing {} columns by slacks",
                deficiency.dependent_positions.len()
            );

            for (&position, &row) in deficiency
                .dependent_positions
                .iter()
                .zip(&deficiency.uncovered_rows)
            {
                let var_out = inst.basis.basic_index()[position];
                let (lower, upper) = (inst.work.lower[var_out], inst.work.upper[var_out]);
                let move_out = NonbasicMove::Up.for_bounds(lower, upper);

                inst.basis.pivot(num_col + row, position, move_out);
                inst.work.value[var_out] = move_out.value(lower, upper);
            }

            matrix.partition(&inst.basis.nonbasic_flag);
            self.flags.apply(ModelAction::NewBasis);
            self.flags.mark_matrix_row_wise(true);
        }

        warn!("basis still singular after {} repairs", MAX_REPAIR_ATTEMPTS);
        inst.factor = None;
        Err(SolutionStatus::Failed)
    }

    /// Refactorizes if there were updates, then recomputes duals, primals and
    /// (when missing) edge weights from scratch.
    fn rebuild(&mut self, correct: bool) -> Result<(), SolutionStatus> {
        let fresh =
            self.flags.have_invert() && self.inst.factor.as_ref().map_or(false, Factor::is_fresh);

        if !fresh {
            self.invert()?;
        }

        let dual_tol = self.options.dual_feasibility_tolerance;

        let SimplexInstance {
            basis,
            matrix,
            factor,
            work,
            edge_weights,
            random,
            ..
        } = &mut *self.inst;

        let (matrix, factor) = factored(matrix, factor)?;

        work.compute_dual(basis, matrix, factor);

        if correct {
            work.correct_dual(basis, dual_tol, random);
        }

        work.compute_primal(basis, matrix, factor);

        if !self.flags.have_edge_weights() {
            compute_edge_weights(self.options.edge_weights, factor, edge_weights);
            self.flags.mark_edge_weights(true);
        }

        self.flags.mark_nonbasic_duals(true);
        self.flags.mark_basic_primals(true);
        self.flags.mark_fresh_rebuild(true);

        let objective = self.objective();
        info!(
            "{:it$}  |  {:.8E}",
            self.inst.iteration_count,
            objective,
            it = ITER_WIDTH,
        );

        trace!("duals: {:?}", self.inst.work.dual);
        trace!("basic values: {:?}", self.inst.work.base_value);

        if let (SolvePhase::Phase2, Some(bound)) = (self.phase, self.options.dual_objective_bound) {
            let dual_objective = if self.inst.work.costs_unaltered() {
                Some(objective)
            } else {
                self.true_dual_objective()
            };

            if let Some(dual_objective) = dual_objective {
                if self.inst.lp.sense.sign() * (dual_objective - bound) > 0. {
                    info!("dual objective {} is beyond the bound {}", dual_objective, bound);
                    return Err(SolutionStatus::ReachedDualObjectiveBound);
                }
            }
        }

        Ok(())
    }

    fn iterate(&mut self) -> Result<Step, SolutionStatus> {
        let primal_tol = self.options.primal_feasibility_tolerance;
        let dual_tol = self.options.dual_feasibility_tolerance;
        let pivot_tol = self.options.pivot_tolerance;
        let steepest_edge = self.options.edge_weights == EdgeWeightStrategy::SteepestEdge;

        let SimplexInstance {
            lp,
            basis,
            matrix,
            factor,
            work,
            edge_weights,
            iteration_count,
            ..
        } = &mut *self.inst;

        let (matrix, factor) = factored(matrix, factor)?;
        let num_col = lp.num_col;
        let num_row = lp.num_row;

        let row_out = match self.pricing.choose_row(work, edge_weights, primal_tol) {
            Some(row_out) => row_out,
            None => return Ok(Step::NoRow),
        };

        let var_out = basis.basic_index()[row_out];
        let (sigma, bound) = if work.base_value[row_out] < work.base_lower[row_out] {
            (1., work.base_lower[row_out])
        } else {
            (-1., work.base_upper[row_out])
        };

        let slope = (work.base_value[row_out] - bound).abs();

        let mut row_ep = nalgebra::DVector::zeros(num_row);
        row_ep[row_out] = 1.;
        factor.btran(&mut row_ep);

        self.pricing
            .price_row(matrix, &row_ep, &basis.nonbasic_flag, &mut self.row_ap);

        let row_ap = &self.row_ap;
        let alpha = |var: usize| {
            if var < num_col {
                row_ap[var]
            } else {
                row_ep[var - num_col]
            }
        };

        let candidate = |var: usize| {
            if basis.is_basic(var) || work.lower[var] == work.upper[var] {
                return None;
            }

            let alpha = alpha(var);

            if alpha.abs() <= pivot_tol {
                return None;
            }

            //a free variable moves whichever way reduces the infeasibility
            let direction = match basis.nonbasic_move(var) {
                NonbasicMove::Zero if sigma * alpha > 0. => -1.,
                NonbasicMove::Zero => 1.,
                nonbasic_move => nonbasic_move.sign(),
            };

            if -sigma * direction * alpha <= 0. {
                return None;
            }

            let dual = direction * work.dual[var];
            let ratio = dual.max(0.) / alpha.abs();

            Some(Candidate {
                var,
                alpha: alpha.abs(),
                ratio,
                harris: ((dual + dual_tol) / alpha.abs()).max(ratio),
                range: work.range[var],
                degenerate: dual <= dual_tol,
            })
        };

        let candidates = self
            .pricing
            .collect_candidates(num_col + num_row, &candidate);

        trace!(
            "row {} (variable {}) leaves with {} candidates",
            row_out,
            var_out,
            candidates.len()
        );

        let (var_in, flips) = match ratio_test(candidates, slope, work.range[var_out], primal_tol) {
            RatioTest::Enter { var, flips } => (var, flips),

            RatioTest::FlipOnly { flips } => {
                debug!("{} bound flips remove the infeasibility of row {}", flips.len(), row_out);
                flip_bounds(&flips, basis, work, matrix, factor);
                *iteration_count += 1;
                self.flags.mark_fresh_rebuild(false);
                return Ok(Step::Flipped);
            }

            RatioTest::NoCandidate => {
                debug!("no entering variable for row {}", row_out);
                return Ok(Step::NoCandidate);
            }
        };

        let mut col_aq = nalgebra::DVector::zeros(num_row);
        matrix.collect_aj(&mut col_aq, var_in, 1.);
        factor.ftran(&mut col_aq);

        let alpha_row = alpha(var_in);
        let alpha_col = col_aq[row_out];

        if (alpha_col - alpha_row).abs() > ALPHA_MISMATCH * alpha_col.abs().max(1.) {
            if !factor.is_fresh() {
                debug!(
                    "pivot mismatch: {:e} in the row, {:e} in the column",
                    alpha_row, alpha_col
                );
                return Ok(Step::Rebuild);
            }

            if alpha_col.abs() <= pivot_tol {
                warn!("pivot {:e} too small after refactorization", alpha_col);
                return Err(SolutionStatus::Failed);
            }
        }

        let tau = if steepest_edge {
            let mut tau = row_ep.clone();
            factor.ftran(&mut tau);
            Some(tau)
        } else {
            None
        };

        flip_bounds(&flips, basis, work, matrix, factor);

        let theta_dual = work.dual[var_in] / alpha_row;

        for var in 0..num_col + num_row {
            if !basis.is_basic(var) {
                work.dual[var] -= theta_dual * alpha(var);
            }
        }

        work.dual[var_in] = 0.;
        work.dual[var_out] = -theta_dual;

        let theta_primal = (work.base_value[row_out] - bound) / alpha_col;

        for (value, a) in work.base_value.iter_mut().zip(col_aq.iter()) {
            *value -= theta_primal * a;
        }

        work.base_value[row_out] = work.value[var_in] + theta_primal;
        work.value[var_out] = bound;

        if let Some(tau) = tau {
            let weight_out = row_ep.norm_squared();

            for (position, weight) in edge_weights.iter_mut().enumerate() {
                if position == row_out || col_aq[position] == 0. {
                    continue;
                }

                let ratio = col_aq[position] / alpha_col;
                *weight = (*weight + ratio * (ratio * weight_out - 2. * tau[position]))
                    .max(MIN_EDGE_WEIGHT);
            }

            edge_weights[row_out] = (weight_out / (alpha_col * alpha_col)).max(MIN_EDGE_WEIGHT);
        }

        let move_out = if work.lower[var_out] == work.upper[var_out] {
            NonbasicMove::Zero
        } else if sigma > 0. {
            NonbasicMove::Up
        } else {
            NonbasicMove::Down
        };

        basis.pivot(var_in, row_out, move_out);
        work.base_lower[row_out] = work.lower[var_in];
        work.base_upper[row_out] = work.upper[var_in];
        matrix.update(var_in, var_out);
        let hint = factor.update(&col_aq, row_out);

        *iteration_count += 1;
        self.flags.mark_fresh_invert(false);
        self.flags.mark_fresh_rebuild(false);

        trace!(
            "iteration {}: {} enters, {} leaves, {} flips",
            iteration_count,
            var_in,
            var_out,
            flips.len()
        );

        Ok(match hint {
            UpdateHint::Continue => Step::Pivoted,
            UpdateHint::Refactor => Step::Rebuild,
        })
    }
}

//moves the flipped variables to their other bounds and updates the basic values
fn flip_bounds(
    flips: &[usize],
    basis: &mut crate::simplex::basis::Basis,
    work: &mut crate::simplex::work::WorkArrays,
    matrix: &Matrix,
    factor: &Factor,
) {
    if flips.is_empty() {
        return;
    }

    let mut col = nalgebra::DVector::zeros(work.base_value.len());

    for &var in flips {
        let before = work.value[var];
        work.flip_bound(basis, var);
        matrix.collect_aj(&mut col, var, work.value[var] - before);
    }

    factor.ftran(&mut col);

    for (value, delta) in work.base_value.iter_mut().zip(col.iter()) {
        *value -= delta;
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::lp::tests::two_by_two;
    use crate::lp::{Lp, ObjSense};
    use crate::options::SimplexStrategy;
    use crate::simplex::basis::Basis;
    use crate::simplex::pricing::pricing_for;

    const TOL: f64 = 1e-6;
    const INF: f64 = f64::INFINITY;

    fn candidate(var: usize, alpha: f64, dual: f64, range: f64) -> Candidate {
        let ratio = dual.max(0.) / alpha;
        Candidate {
            var,
            alpha,
            ratio,
            harris: ((dual + 1e-7) / alpha).max(ratio),
            range,
            degenerate: dual <= 1e-7,
        }
    }

    fn solve(lp: Lp, options: &SimplexOptions) -> (SolutionStatus, SimplexInstance) {
        let basis = Basis::logical(&lp);
        let mut inst = SimplexInstance::new(lp, basis, options.seed);
        let mut flags = ModelFlags::new();
        let pricing = pricing_for(options).unwrap();
        let status = DualSimplex::new(&mut inst, &mut flags, options, pricing.as_ref()).solve();
        (status, inst)
    }

    fn col_values(inst: &SimplexInstance) -> Vec<f64> {
        inst.work.value[..inst.lp.num_col].to_vec()
    }

    //primal and dual feasibility, and duals consistent with the costs
    fn check_optimal(inst: &SimplexInstance) {
        let lp = &inst.lp;
        let work = &inst.work;
        let basis = &inst.basis;
        let num_col = lp.num_col;

        assert!(basis.check(num_col, lp.num_row).is_ok());

        for var in 0..lp.num_tot() {
            assert!(work.value[var] >= work.lower[var] - TOL);
            assert!(work.value[var] <= work.upper[var] + TOL);

            if basis.is_basic(var) {
                assert_eq!(work.dual[var], 0.);
            } else {
                let expected = basis
                    .nonbasic_move(var)
                    .value(work.lower[var], work.upper[var]);
                assert!((work.value[var] - expected).abs() < TOL);
                assert!(work.dual_infeasibility(basis, var) < TOL);
            }
        }

        let activity = lp.row_activity(&work.value[..num_col]);

        for row in 0..lp.num_row {
            assert!((activity[row] + work.value[num_col + row]).abs() < TOL);
        }

        for col in 0..num_col {
            let reduced = lp.sense.sign() * lp.col_cost[col]
                + lp
                    .column(col)
                    .map(|(row, value)| value * work.dual[num_col + row])
                    .sum::<f64>();
            assert!((reduced - work.dual[col]).abs() < TOL);
        }
    }

    pub fn medium_lp() -> Lp {
        let num_col = 40;
        let num_row = 30;
        let mut lp = Lp::new();
        lp.sense = ObjSense::Maximize;
        lp.num_col = num_col;
        lp.num_row = num_row;
        lp.col_cost = (0..num_col).map(|j| 1. + (j % 5) as f64).collect();
        lp.col_lower = vec![0.; num_col];
        lp.col_upper = vec![10.; num_col];
        lp.row_lower = vec![-INF; num_row];
        lp.row_upper = (0..num_row).map(|i| 5. + (i % 4) as f64).collect();

        for col in 0..num_col {
            for row in 0..num_row {
                let value = ((row * 7 + col * 3) % 11) as f64 - 3.;

                if value != 0. && (row + col) % 3 != 0 {
                    lp.a_index.push(row);
                    lp.a_value.push(value);
                }
            }

            lp.a_start.push(lp.a_index.len());
        }

        lp
    }

    #[test]
    fn ratio_test_picks_largest_alpha_within_harris_bound() {
        let candidates = vec![
            candidate(0, 1., 1., INF),
            candidate(1, 2., 2. + 1e-8, INF),
            candidate(2, 1., 3., INF),
        ];

        //ratios 1, 1 + 5e-9 and 3, the first two tie within the tolerance
        assert_eq!(
            ratio_test(candidates, 1., INF, 1e-7),
            RatioTest::Enter {
                var: 1,
                flips: vec![]
            }
        );
    }

    #[test]
    fn ratio_test_flips_boxed_breakpoints() {
        let candidates = vec![
            candidate(0, 1., 1., 2.),
            candidate(1, 1., 2., INF),
            candidate(2, 1., 3., INF),
        ];

        //the slope 5 survives flipping variable 0 over its range 2
        assert_eq!(
            ratio_test(candidates.clone(), 5., INF, 1e-7),
            RatioTest::Enter {
                var: 1,
                flips: vec![0]
            }
        );

        assert_eq!(
            ratio_test(candidates, 1., INF, 1e-7),
            RatioTest::Enter {
                var: 0,
                flips: vec![]
            }
        );
    }

    #[test]
    fn ratio_test_flip_only() {
        let candidates = vec![candidate(3, 1., 0., 1.), candidate(4, 1., 5., 1.)];

        //degenerate flip covering the infeasibility 0.5, overshoot 0.5 within range
        assert_eq!(
            ratio_test(candidates.clone(), 0.5, 1., 1e-7),
            RatioTest::FlipOnly { flips: vec![3] }
        );

        //overshoot beyond the range of the leaving variable
        assert_eq!(
            ratio_test(candidates, 0.5, 0.25, 1e-7),
            RatioTest::Enter {
                var: 3,
                flips: vec![]
            }
        );
    }

    #[test]
    fn ratio_test_without_candidates() {
        assert_eq!(ratio_test(vec![], 1., INF, 1e-7), RatioTest::NoCandidate);

        //every candidate can be flipped and the slope stays positive
        let candidates = vec![candidate(0, 1., 1., 1.), candidate(1, 1., 2., 1.)];
        assert_eq!(ratio_test(candidates, 5., INF, 1e-7), RatioTest::NoCandidate);
    }

    #[test]
    fn solves_two_by_two() {
        let (status, inst) = solve(two_by_two(), &SimplexOptions::default());
        assert_eq!(status, SolutionStatus::Optimal);
        check_optimal(&inst);

        let x = col_values(&inst);
        assert!((inst.lp.objective(&x) - 6.).abs() < TOL);
    }

    #[test]
    fn free_column_needs_phase_1() {
        let mut lp = two_by_two();
        lp.col_lower[0] = -INF;

        let (status, inst) = solve(lp, &SimplexOptions::default());
        assert_eq!(status, SolutionStatus::Optimal);
        check_optimal(&inst);
        assert!((inst.lp.objective(&col_values(&inst)) - 6.).abs() < TOL);
    }

    #[test]
    fn dantzig_weights() {
        let mut options = SimplexOptions::default();
        options.edge_weights = EdgeWeightStrategy::Dantzig;
        options.perturb_costs = false;

        let (status, inst) = solve(medium_lp(), &options);
        assert_eq!(status, SolutionStatus::Optimal);
        check_optimal(&inst);

        let (_status, steepest) = solve(medium_lp(), &SimplexOptions::default());
        let obj = inst.lp.objective(&col_values(&inst));
        let steepest_obj = steepest.lp.objective(&col_values(&steepest));
        assert!((obj - steepest_obj).abs() < 1e-5);
    }

    #[test]
    fn detects_infeasibility() {
        let mut lp = two_by_two();
        lp.row_lower[2] = 9.;
        lp.row_upper[2] = INF;

        let (status, _inst) = solve(lp.clone(), &SimplexOptions::default());
        assert_eq!(status, SolutionStatus::Infeasible);

        lp.sense = ObjSense::Minimize;
        let (status, _inst) = solve(lp, &SimplexOptions::default());
        assert_eq!(status, SolutionStatus::Infeasible);
    }

    #[test]
    fn detects_unboundedness() {
        //minimize -x s.t. x - y <= 1
        let mut lp = Lp::new();
        lp.num_col = 2;
        lp.num_row = 1;
        lp.col_cost = vec![-1., 0.];
        lp.col_lower = vec![0., 0.];
        lp.col_upper = vec![INF, INF];
        lp.row_lower = vec![-INF];
        lp.row_upper = vec![1.];
        lp.a_start = vec![0, 1, 2];
        lp.a_index = vec![0, 0];
        lp.a_value = vec![1., -1.];

        let (status, _inst) = solve(lp, &SimplexOptions::default());
        assert_eq!(status, SolutionStatus::Unbounded);
    }

    #[test]
    fn reaches_dual_objective_bound() {
        //minimize x + y s.t. x + y >= 2, optimum 2
        let mut lp = Lp::new();
        lp.num_col = 2;
        lp.num_row = 1;
        lp.col_cost = vec![1., 1.];
        lp.col_lower = vec![0., 0.];
        lp.col_upper = vec![INF, INF];
        lp.row_lower = vec![2.];
        lp.row_upper = vec![INF];
        lp.a_start = vec![0, 1, 2];
        lp.a_index = vec![0, 0];
        lp.a_value = vec![1., 1.];

        for &perturb in &[true, false] {
            let mut options = SimplexOptions::default();
            options.perturb_costs = perturb;
            options.dual_objective_bound = Some(1.);

            let (status, _inst) = solve(lp.clone(), &options);
            assert_eq!(status, SolutionStatus::ReachedDualObjectiveBound);

            options.dual_objective_bound = Some(3.);
            let (status, inst) = solve(lp.clone(), &options);
            assert_eq!(status, SolutionStatus::Optimal);
            assert!((inst.lp.objective(&col_values(&inst)) - 2.).abs() < TOL);
        }
    }

    #[test]
    fn perturbed_solve_stops_at_dual_objective_bound() {
        let (status, full) = solve(medium_lp(), &SimplexOptions::default());
        assert_eq!(status, SolutionStatus::Optimal);

        //no point reaches 1e9, and the logical basis already proves it
        let mut options = SimplexOptions::default();
        options.dual_objective_bound = Some(1e9);

        let (status, inst) = solve(medium_lp(), &options);
        assert_eq!(status, SolutionStatus::ReachedDualObjectiveBound);
        assert!(inst.work.cost_perturbed);
        assert!(inst.iteration_count < full.iteration_count);
    }

    #[test]
    fn iteration_limit() {
        let mut options = SimplexOptions::default();
        options.iteration_limit = 0;

        let (status, inst) = solve(medium_lp(), &options);
        assert_eq!(status, SolutionStatus::OutOfTime);
        assert_eq!(inst.iteration_count, 0);
    }

    #[test]
    fn stop_in_phase_1_reports_true_bounds() {
        let mut lp = two_by_two();
        lp.col_lower[0] = -INF;

        let mut options = SimplexOptions::default();
        options.iteration_limit = 0;

        let (status, inst) = solve(lp, &options);
        assert_eq!(status, SolutionStatus::OutOfTime);

        let lp = &inst.lp;
        let work = &inst.work;
        let num_col = lp.num_col;
        assert_eq!(work.bounds, Some(BoundSet::Original));
        assert_eq!(work.lower[0], -INF);

        for var in 0..lp.num_tot() {
            if inst.basis.is_basic(var) {
                continue;
            }

            let (lower, upper) = if var < num_col {
                (lp.col_lower[var], lp.col_upper[var])
            } else {
                (-lp.row_upper[var - num_col], -lp.row_lower[var - num_col])
            };

            let expected = inst.basis.nonbasic_move(var).value(lower, upper);
            assert_eq!(work.value[var], expected);
        }

        assert_eq!(col_values(&inst), vec![0., 0.]);

        let activity = lp.row_activity(&work.value[..num_col]);

        for row in 0..lp.num_row {
            assert!((activity[row] + work.value[num_col + row]).abs() < TOL);
        }
    }

    #[test]
    fn budget_is_shared_between_solves() {
        let options = SimplexOptions::default();
        let lp = medium_lp();
        let basis = Basis::logical(&lp);
        let mut inst = SimplexInstance::new(lp, basis, options.seed);
        let mut flags = ModelFlags::new();
        let pricing = pricing_for(&options).unwrap();

        let mut budget = Budget::new(&options);
        budget.iterations = 3;

        let mut simplex = DualSimplex::new(&mut inst, &mut flags, &options, pricing.as_ref());
        assert_eq!(simplex.solve_within(&mut budget), SolutionStatus::OutOfTime);
        assert_eq!(budget.iterations, 0);

        let mut simplex = DualSimplex::new(&mut inst, &mut flags, &options, pricing.as_ref());
        assert_eq!(simplex.solve_within(&mut budget), SolutionStatus::OutOfTime);
        assert_eq!(inst.iteration_count, 3);
    }

    #[test]
    fn strategies_pivot_alike() {
        let mut results = Vec::new();

        for strategy in &[
            SimplexStrategy::Serial,
            SimplexStrategy::Tasks,
            SimplexStrategy::Multi,
        ] {
            let mut options = SimplexOptions::default();
            options.strategy = *strategy;
            options.num_threads = 3;

            let (status, inst) = solve(medium_lp(), &options);
            assert_eq!(status, SolutionStatus::Optimal);
            check_optimal(&inst);
            results.push((inst.iteration_count, inst.basis.basic_index().to_vec()));
        }

        assert_eq!(results[0], results[1]);
        assert_eq!(results[0], results[2]);
    }

    #[test]
    fn warm_start_after_cost_change() {
        let options = SimplexOptions::default();
        let lp = two_by_two();
        let basis = Basis::logical(&lp);
        let mut inst = SimplexInstance::new(lp, basis, 0);
        let mut flags = ModelFlags::new();
        let pricing = pricing_for(&options).unwrap();

        let status = DualSimplex::new(&mut inst, &mut flags, &options, pricing.as_ref()).solve();
        assert_eq!(status, SolutionStatus::Optimal);
        let first = inst.iteration_count;

        inst.lp.col_cost = vec![1., 1.1];
        flags.apply(ModelAction::NewCosts);

        let mut simplex = DualSimplex::new(&mut inst, &mut flags, &options, pricing.as_ref());
        assert_eq!(simplex.solve(), SolutionStatus::Optimal);
        assert_eq!(simplex.phase(), SolvePhase::Finished(SolutionStatus::Optimal));
        check_optimal(&inst);
        assert!(inst.iteration_count >= first);

        //x + y <= 6 binds and y <= 4 binds once y is worth more
        let x = col_values(&inst);
        assert!((inst.lp.objective(&x) - 6.4).abs() < TOL);
    }
}
