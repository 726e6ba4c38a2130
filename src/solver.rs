use crate::error::DualplexError;
use crate::lp::Lp;
use crate::model::SimplexModel;
use crate::options::SimplexOptions;

pub type DualplexResult = Result<SolverResult, DualplexError>;

/// Status of a column or row in a basis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BaseStat {
    Lower,
    Basic,
    Upper,

    /// Free and nonbasic at zero.
    Zero,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasisInfo {
    pub col_status: Vec<BaseStat>,
    pub row_status: Vec<BaseStat>,
}

/// Primal and dual values in the units of the LP that was passed in.
///
/// The column duals are the reduced costs `c - Aᵀ y`, with `y` the row duals.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    obj: f64,
    col_value: Vec<f64>,
    col_dual: Vec<f64>,
    row_value: Vec<f64>,
    row_dual: Vec<f64>,
    basis: BasisInfo,
}

impl Solution {
    pub(crate) fn new(
        obj: f64,
        col_value: Vec<f64>,
        col_dual: Vec<f64>,
        row_value: Vec<f64>,
        row_dual: Vec<f64>,
        basis: BasisInfo,
    ) -> Self {
        Self {
            obj,
            col_value,
            col_dual,
            row_value,
            row_dual,
            basis,
        }
    }

    #[inline]
    pub fn obj(&self) -> f64 {
        self.obj
    }

    #[inline]
    pub fn x(&self) -> &[f64] {
        &self.col_value
    }

    #[inline]
    pub fn col_value(&self) -> &[f64] {
        &self.col_value
    }

    #[inline]
    pub fn col_dual(&self) -> &[f64] {
        &self.col_dual
    }

    #[inline]
    pub fn row_value(&self) -> &[f64] {
        &self.row_value
    }

    #[inline]
    pub fn row_dual(&self) -> &[f64] {
        &self.row_dual
    }

    #[inline]
    pub fn basis(&self) -> &BasisInfo {
        &self.basis
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SolverResult {
    Optimal(Solution),
    Infeasible,
    Unbounded,

    /// The iteration or time limit was hit; the solution is the last iterate.
    OutOfTime(Solution),

    /// The objective passed the dual objective bound, so the optimum is
    /// beyond it.
    ReachedDualObjectiveBound(Solution),
    Failed,
}

impl SolverResult {
    pub fn solution(&self) -> Option<&Solution> {
        match self {
            SolverResult::Optimal(sol)
            | SolverResult::OutOfTime(sol)
            | SolverResult::ReachedDualObjectiveBound(sol) => Some(sol),
            SolverResult::Infeasible | SolverResult::Unbounded | SolverResult::Failed => None,
        }
    }
}

/// Solves one LP from scratch. Use a [`SimplexModel`] to modify an LP and
/// solve it again from the previous basis.
#[derive(Debug, Clone, Default)]
pub struct DualSimplexSolver {
    options: SimplexOptions,
}

impl DualSimplexSolver {
    pub fn new(options: SimplexOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &SimplexOptions {
        &self.options
    }

    pub fn solve<L: Into<Lp>>(&self, lp: L) -> DualplexResult {
        SimplexModel::new(lp.into(), self.options.clone()).solve()
    }
}
