use crate::error::DualplexError;
use crate::lp::ObjSense;

use std::collections::HashMap;

const LTE_STR: &str = "\u{2264}";
const INF_STR: &str = "\u{221E}";

//solutions coming back from the solver are only feasible up to the solver tolerances
const FEASIBILITY_TOL: f64 = 1e-6;

/// Builder for small LPs, one variable or constraint at a time.
///
/// A `Problem` is converted into the column-wise [`Lp`](crate::lp::Lp) container
/// before it is solved.
#[derive(Debug, Clone, Default)]
pub struct Problem {
    pub variables: Vec<Variable>,
    pub constraints: Vec<Constraint>,
    pub sense: ObjSense,
    ids_by_name: HashMap<String, VariableId>,
}

impl Problem {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn set_obj_sense(&mut self, sense: ObjSense) {
        self.sense = sense;
    }

    pub fn add_var(
        &mut self,
        obj_coeff: f64,
        bound: Bound,
        name: Option<String>,
    ) -> Result<VariableId, DualplexError> {
        bound.check()?;

        if !obj_coeff.is_finite() {
            return Err(DualplexError::InvalidLp(format!(
                "objective coefficient {} is not finite",
                obj_coeff
            )));
        }

        let id = VariableId(self.variables.len());

        if let Some(name) = &name {
            if self.ids_by_name.contains_key(name) {
                return Err(DualplexError::InvalidLp(format!(
                    "a variable named {} already exists",
                    name
                )));
            }

            self.ids_by_name.insert(name.clone(), id);
        }

        self.variables.push(Variable {
            id,
            obj_coeff,
            bound,
            name,
        });

        Ok(id)
    }

    /// Id of the variable called `name`.
    pub fn var_id(&self, name: &str) -> Option<VariableId> {
        self.ids_by_name.get(name).copied()
    }

    pub fn add_constraint(
        &mut self,
        coeffs: Vec<(VariableId, f64)>,
        op: ConstraintOp,
        rhs: f64,
    ) -> Result<(), DualplexError> {
        if !rhs.is_finite() {
            return Err(DualplexError::InvalidLp(format!(
                "right hand side {} is not finite",
                rhs
            )));
        }

        let (lower, upper) = op.row_bounds(rhs);
        self.add_ranged_constraint(coeffs, lower, upper)
    }

    /// Adds `lower <= coeffs x <= upper`. Either side may be infinite.
    pub fn add_ranged_constraint(
        &mut self,
        coeffs: Vec<(VariableId, f64)>,
        lower: f64,
        upper: f64,
    ) -> Result<(), DualplexError> {
        if lower.is_nan() || upper.is_nan() || lower == f64::INFINITY || upper == f64::NEG_INFINITY {
            return Err(DualplexError::InvalidLp(format!(
                "invalid row bounds: [{}, {}]",
                lower, upper
            )));
        }

        if let Some((id, _)) = coeffs.iter().find(|(id, _)| id.0 >= self.variables.len()) {
            return Err(DualplexError::InvalidLp(format!("{:?} does not exist", id)));
        }

        if let Some((id, coeff)) = coeffs.iter().find(|(_, coeff)| !coeff.is_finite()) {
            return Err(DualplexError::InvalidLp(format!(
                "coefficient {} of {:?} is not finite",
                coeff, id
            )));
        }

        self.constraints.push(Constraint {
            coeffs,
            lower,
            upper,
        });

        Ok(())
    }

    pub fn vars(&self) -> &[Variable] {
        &self.variables
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Objective value of `x`, in the sense of the problem.
    pub fn obj(&self, x: &[f64]) -> f64 {
        self.variables
            .iter()
            .zip(x)
            .map(|(var, value)| var.obj_coeff * value)
            .sum()
    }

    /// Whether `x` satisfies the bounds and constraints up to a small tolerance.
    pub fn is_feasible(&self, x: &[f64]) -> bool {
        x.len() == self.variables.len()
            && self.variables.iter().zip(x).all(|(var, &value)| {
                let (lower, upper) = var.bound.as_pair();
                within(value, lower, upper)
            })
            && self.constraints.iter().all(|constraint| {
                let (lower, upper) = constraint.row_bounds();
                within(constraint.activity(x), lower, upper)
            })
    }
}

fn within(value: f64, lower: f64, upper: f64) -> bool {
    value >= lower - FEASIBILITY_TOL && value <= upper + FEASIBILITY_TOL
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub id: VariableId,
    pub obj_coeff: f64,
    pub bound: Bound,
    pub name: Option<String>,
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        //add_var hands out a new id to every variable
        self.id == other.id
    }
}

impl Eq for Variable {}

impl std::hash::Hash for Variable {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Bound {
    Free,
    Lower(f64),
    Upper(f64),
    TwoSided(f64, f64),
    Fixed(f64),
}

impl Bound {
    /// The bound as a `(lower, upper)` pair with infinities for missing sides.
    pub fn as_pair(&self) -> (f64, f64) {
        match *self {
            Bound::Free => (f64::NEG_INFINITY, f64::INFINITY),
            Bound::Lower(lb) => (lb, f64::INFINITY),
            Bound::Upper(ub) => (f64::NEG_INFINITY, ub),
            Bound::TwoSided(lb, ub) => (lb, ub),
            Bound::Fixed(val) => (val, val),
        }
    }

    fn check(&self) -> Result<(), DualplexError> {
        let finite = match *self {
            Bound::Free => true,
            Bound::Lower(value) | Bound::Upper(value) | Bound::Fixed(value) => value.is_finite(),
            Bound::TwoSided(lb, ub) => lb.is_finite() && ub.is_finite(),
        };

        if !finite {
            return Err(DualplexError::InvalidLp(format!(
                "bound values must be finite: {:?}",
                self
            )));
        }

        match *self {
            Bound::TwoSided(lb, ub) if lb > ub => Err(DualplexError::InvalidLp(format!(
                "lower bound {} is above upper bound {}",
                lb, ub
            ))),
            _ => Ok(()),
        }
    }
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let (lower, upper) = self.as_pair();
        write_interval(f, lower, upper)
    }
}

fn write_interval(f: &mut std::fmt::Formatter, lower: f64, upper: f64) -> std::fmt::Result {
    match (lower.is_finite(), upper.is_finite()) {
        (true, true) => write!(f, "[{}, {}]", lower, upper),
        (true, false) => write!(f, "[{}, {inf})", lower, inf = INF_STR),
        (false, true) => write!(f, "(-{inf}, {}]", upper, inf = INF_STR),
        (false, false) => write!(f, "(-{inf}, {inf})", inf = INF_STR),
    }
}

/// A row `lower <= sum of coeff * x <= upper`.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub coeffs: Vec<(VariableId, f64)>,
    pub lower: f64,
    pub upper: f64,
}

impl Constraint {
    pub fn add_coeff(&mut self, var: VariableId, coeff: f64) {
        self.coeffs.push((var, coeff));
    }

    pub fn row_bounds(&self) -> (f64, f64) {
        (self.lower, self.upper)
    }

    pub fn activity(&self, x: &[f64]) -> f64 {
        self.coeffs
            .iter()
            .map(|(var, coeff)| coeff * x[usize::from(var)])
            .sum()
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VariableId(usize);

impl std::convert::From<usize> for VariableId {
    fn from(id: usize) -> Self {
        Self(id)
    }
}

impl std::convert::From<VariableId> for usize {
    fn from(id: VariableId) -> Self {
        id.0
    }
}

impl std::convert::From<&VariableId> for usize {
    fn from(id: &VariableId) -> Self {
        id.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintOp {
    Lte,
    Eq,
    Gte,
}

impl ConstraintOp {
    /// Row bounds of `lhs op rhs`.
    pub fn row_bounds(self, rhs: f64) -> (f64, f64) {
        match self {
            ConstraintOp::Lte => (f64::NEG_INFINITY, rhs),
            ConstraintOp::Eq => (rhs, rhs),
            ConstraintOp::Gte => (rhs, f64::INFINITY),
        }
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "x[{}]", self.id.0),
        }
    }
}

//writes "+ 2 x - 1 y", skipping zero coefficients
fn write_terms<'a, I>(f: &mut std::fmt::Formatter, terms: I) -> std::fmt::Result
where
    I: Iterator<Item = (f64, &'a Variable)>,
{
    for (coeff, var) in terms.filter(|(coeff, _)| *coeff != 0.) {
        let sign = if coeff > 0. { "+" } else { "-" };
        write!(f, " {} {} {}", sign, coeff.abs(), var)?;
    }

    Ok(())
}

impl std::fmt::Display for Problem {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.sense {
            ObjSense::Minimize => write!(f, "minimize")?,
            ObjSense::Maximize => write!(f, "maximize")?,
        }

        write_terms(f, self.variables.iter().map(|var| (var.obj_coeff, var)))?;
        writeln!(f, "\n\nsubject to")?;

        for constraint in &self.constraints {
            let mut terms = Vec::with_capacity(constraint.coeffs.len());

            for (id, coeff) in &constraint.coeffs {
                match self.variables.get(usize::from(id)) {
                    Some(var) => terms.push((*coeff, var)),
                    None => return Err(std::fmt::Error),
                }
            }

            write_terms(f, terms.into_iter())?;
            write!(f, " in ")?;
            write_interval(f, constraint.lower, constraint.upper)?;
            writeln!(f)?;
        }

        writeln!(f, "\nwith the bounds")?;

        for var in &self.variables {
            writeln!(f, " {} in {}", var, var.bound)?;
        }

        Ok(())
    }
}

impl std::fmt::Display for ConstraintOp {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ConstraintOp::Lte => write!(f, "{}", LTE_STR),
            ConstraintOp::Eq => write!(f, "="),
            ConstraintOp::Gte => write!(f, "\u{2265}"),
        }
    }
}
