use crate::error::DualplexError;

use std::time::Duration;

/// How the pricing work of an iteration is split up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimplexStrategy {
    Serial,

    /// Pivotal row pricing over column chunks on a thread pool.
    Tasks,

    /// Leaving row selection over row chunks on a thread pool.
    Multi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrashStrategy {
    Off,
    Triangular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeWeightStrategy {
    Dantzig,
    SteepestEdge,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimplexOptions {
    pub strategy: SimplexStrategy,
    pub num_threads: usize,

    pub scale: bool,
    pub permute: bool,
    pub transpose: bool,
    pub tighten: bool,

    pub crash: CrashStrategy,
    pub perturb_costs: bool,
    pub edge_weights: EdgeWeightStrategy,

    pub iteration_limit: u64,
    pub time_limit: Option<Duration>,

    /// Early termination once the objective is proved to exceed this value
    /// (for a minimization, below it for a maximization).
    pub dual_objective_bound: Option<f64>,

    pub primal_feasibility_tolerance: f64,
    pub dual_feasibility_tolerance: f64,
    pub pivot_tolerance: f64,

    /// Number of eta updates after which the basis is refactorized.
    pub update_limit: usize,

    pub seed: u64,
}

impl std::default::Default for SimplexOptions {
    fn default() -> Self {
        Self {
            strategy: SimplexStrategy::Serial,
            num_threads: 4,
            scale: true,
            permute: false,
            transpose: false,
            tighten: false,
            crash: CrashStrategy::Off,
            perturb_costs: true,
            edge_weights: EdgeWeightStrategy::SteepestEdge,
            iteration_limit: u64::MAX,
            time_limit: None,
            dual_objective_bound: None,
            primal_feasibility_tolerance: 1e-7,
            dual_feasibility_tolerance: 1e-7,
            pivot_tolerance: 1e-7,
            update_limit: 100,
            seed: 0,
        }
    }
}

impl SimplexOptions {
    pub fn validate(&self) -> Result<(), DualplexError> {
        let invalid = |msg: String| Err(DualplexError::InvalidOption(msg));

        if self.num_threads == 0 {
            return invalid("num_threads must be positive".to_string());
        }

        if self.update_limit == 0 {
            return invalid("update_limit must be positive".to_string());
        }

        for (name, tol) in &[
            ("primal_feasibility_tolerance", self.primal_feasibility_tolerance),
            ("dual_feasibility_tolerance", self.dual_feasibility_tolerance),
            ("pivot_tolerance", self.pivot_tolerance),
        ] {
            if !(tol.is_finite() && *tol > 0. && *tol < 1.) {
                return invalid(format!("{} must lie in (0, 1), got {}", name, tol));
            }
        }

        if let Some(bound) = self.dual_objective_bound {
            if bound.is_nan() {
                return invalid("dual_objective_bound is NaN".to_string());
            }
        }

        Ok(())
    }
}
