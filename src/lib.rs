mod error;
pub mod flags;
pub mod lp;
pub mod model;
pub mod options;
pub mod problem;
pub mod simplex;
pub mod solver;
pub mod transform;
mod util;

pub use crate::error::DualplexError;
pub use crate::flags::{ModelAction, ModelFlags};
pub use crate::lp::{Lp, ObjSense};
pub use crate::model::SimplexModel;
pub use crate::options::{CrashStrategy, EdgeWeightStrategy, SimplexOptions, SimplexStrategy};
pub use crate::problem::{Bound, Constraint, ConstraintOp, Problem, Variable, VariableId};
pub use crate::simplex::basis::{Basis, NonbasicMove};
pub use crate::simplex::{SolutionStatus, SolvePhase};
pub use crate::solver::{
    BaseStat, BasisInfo, DualSimplexSolver, DualplexResult, Solution, SolverResult,
};
