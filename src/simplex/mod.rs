pub mod basis;
pub mod crash;
pub mod dual_simplex;
pub mod factor;
pub mod lu;
pub mod matrix;
pub mod pricing;
pub mod trivial;
pub mod work;

use crate::lp::Lp;
use crate::options::SimplexOptions;
use basis::Basis;
use factor::Factor;
use matrix::Matrix;
use work::WorkArrays;

use std::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionStatus {
    Optimal,
    Infeasible,
    Unbounded,
    Failed,
    OutOfTime,
    ReachedDualObjectiveBound,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolvePhase {
    Unknown,
    Phase1,
    Phase2,
    Finished(SolutionStatus),
}

/// Iterations and time left to a solve. Every pass of the dual simplex made
/// for one solve of a model draws on the same budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    pub iterations: u64,
    pub deadline: Option<Instant>,
}

impl Budget {
    pub fn new(options: &SimplexOptions) -> Self {
        Self {
            iterations: options.iteration_limit,
            deadline: options
                .time_limit
                .and_then(|limit| Instant::now().checked_add(limit)),
        }
    }

    #[inline]
    pub fn spend(&mut self, iterations: u64) {
        self.iterations = self.iterations.saturating_sub(iterations);
    }

    #[inline]
    pub fn past_deadline(&self) -> bool {
        self.deadline.map_or(false, |deadline| Instant::now() >= deadline)
    }
}

/// The solver LP together with everything the dual simplex derives from it.
#[derive(Debug, Clone)]
pub struct SimplexInstance {
    pub lp: Lp,
    pub basis: Basis,
    pub matrix: Option<Matrix>,
    pub factor: Option<Factor>,
    pub work: WorkArrays,
    pub edge_weights: Vec<f64>,
    pub random: Vec<f64>,
    pub iteration_count: u64,
}

impl SimplexInstance {
    pub fn new(lp: Lp, basis: Basis, seed: u64) -> Self {
        let work = WorkArrays::new(lp.num_col, lp.num_row);
        let random = work::random_vector(lp.num_tot(), seed);

        Self {
            edge_weights: vec![1.; lp.num_row],
            lp,
            basis,
            matrix: None,
            factor: None,
            work,
            random,
            iteration_count: 0,
        }
    }
}
