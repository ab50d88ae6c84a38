//! Constraint solving seam
//!
//! The campaign only needs models for conjunctions of atomic
//! predicates. A real engine plugs an SMT backend in behind [`Solver`];
//! [`EqualitySolver`] decides the `==`/`!=`-over-literals fragment the
//! mock fixtures produce.

use super::{CmpOp, Model, Predicate, SymbolicVar};
use crate::value::{Value, ValueType};
use std::collections::{BTreeMap, BTreeSet};

/// Result of a satisfiability query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolverResult {
    /// Satisfiable, with a witness model
    Sat(Model),
    /// Unsatisfiable
    Unsat,
    /// Outside what the backend decides
    Unknown(String),
}

impl SolverResult {
    /// Returns `true` if the result is `Unsat`
    #[must_use]
    pub fn is_unsat(&self) -> bool {
        matches!(self, Self::Unsat)
    }

    /// Returns the model if satisfiable
    #[must_use]
    pub fn model(&self) -> Option<&Model> {
        match self {
            Self::Sat(model) => Some(model),
            _ => None,
        }
    }
}

/// Finds models for conjunctions of predicates
pub trait Solver: Send + Sync {
    /// Solve the conjunction of `predicates`
    fn solve(&self, predicates: &[Predicate]) -> SolverResult;
}

/// Per-variable equality/disequality solver
#[derive(Debug, Clone, Copy, Default)]
pub struct EqualitySolver;

#[derive(Default)]
struct VarConstraints {
    ty: Option<ValueType>,
    equal: BTreeSet<i64>,
    excluded: BTreeSet<i64>,
}

impl EqualitySolver {
    /// Create a solver
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn solve_var(var: &SymbolicVar, c: &VarConstraints) -> Result<Value, SolverResult> {
        let ty = c
            .ty
            .ok_or_else(|| SolverResult::Unknown(format!("{var} has no type")))?;

        if matches!(ty, ValueType::Object | ValueType::Void) {
            return Err(SolverResult::Unknown(format!(
                "{var}: {ty} values are not numeric"
            )));
        }

        if c.equal.len() > 1 {
            return Err(SolverResult::Unsat);
        }

        if let Some(&wanted) = c.equal.iter().next() {
            if c.excluded.contains(&wanted) {
                return Err(SolverResult::Unsat);
            }
            return Value::from_i64(ty, wanted).ok_or(SolverResult::Unsat);
        }

        // Smallest non-negative literal not excluded; at most |excluded| + 1 probes
        (0..=c.excluded.len() as i64)
            .filter(|candidate| !c.excluded.contains(candidate))
            .find_map(|candidate| Value::from_i64(ty, candidate))
            .ok_or(SolverResult::Unsat)
    }
}

impl Solver for EqualitySolver {
    fn solve(&self, predicates: &[Predicate]) -> SolverResult {
        let mut per_var: BTreeMap<&SymbolicVar, VarConstraints> = BTreeMap::new();

        for predicate in predicates {
            let entry = per_var.entry(&predicate.var).or_default();
            match entry.ty {
                Some(ty) if ty != predicate.ty => {
                    return SolverResult::Unknown(format!(
                        "{} used as both {ty} and {}",
                        predicate.var, predicate.ty
                    ));
                }
                _ => entry.ty = Some(predicate.ty),
            }
            let _ = match predicate.op {
                CmpOp::Eq => entry.equal.insert(predicate.rhs),
                CmpOp::Ne => entry.excluded.insert(predicate.rhs),
            };
        }

        let mut model = Model::new();
        for (var, constraints) in &per_var {
            match Self::solve_var(var, constraints) {
                Ok(value) => model.insert((*var).clone(), value),
                Err(result) => return result,
            }
        }
        SolverResult::Sat(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn pred(op: CmpOp, rhs: i64) -> Predicate {
        Predicate {
            var: SymbolicVar::for_call(0, "foo"),
            ty: ValueType::Int,
            op,
            rhs,
        }
    }

    #[test]
    fn test_equality_is_witnessed() {
        let result = EqualitySolver::new().solve(&[pred(CmpOp::Eq, 228)]);
        let model = result.model().unwrap();
        assert_eq!(
            model.get(&SymbolicVar::for_call(0, "foo")),
            Some(Value::Int(228))
        );
    }

    #[test]
    fn test_disequality_avoids_literal() {
        let result = EqualitySolver::new().solve(&[pred(CmpOp::Ne, 0), pred(CmpOp::Ne, 1)]);
        let value = result
            .model()
            .unwrap()
            .get(&SymbolicVar::for_call(0, "foo"))
            .unwrap();
        assert_eq!(value, Value::Int(2));
    }

    #[test]
    fn test_contradiction_is_unsat() {
        assert!(EqualitySolver::new()
            .solve(&[pred(CmpOp::Eq, 228), pred(CmpOp::Ne, 228)])
            .is_unsat());
        assert!(EqualitySolver::new()
            .solve(&[pred(CmpOp::Eq, 1), pred(CmpOp::Eq, 2)])
            .is_unsat());
    }

    #[test]
    fn test_out_of_range_literal_is_unsat() {
        assert!(EqualitySolver::new()
            .solve(&[pred(CmpOp::Eq, i64::from(i32::MAX) + 1)])
            .is_unsat());
    }

    #[test]
    fn test_long_and_boxed() {
        let var = SymbolicVar::for_call(0, "apply");
        let result = EqualitySolver::new().solve(&[Predicate {
            var: var.clone(),
            ty: ValueType::Long,
            op: CmpOp::Eq,
            rhs: 909,
        }]);
        assert_eq!(result.model().unwrap().get(&var), Some(Value::Long(909)));

        let var = SymbolicVar::for_call(0, "get");
        let result = EqualitySolver::new().solve(&[Predicate {
            var: var.clone(),
            ty: ValueType::BoxedInt,
            op: CmpOp::Eq,
            rhs: 333,
        }]);
        assert_eq!(
            result.model().unwrap().get(&var),
            Some(Value::Boxed(Some(333)))
        );
    }

    #[test]
    fn test_mixed_types_unknown() {
        let mut other = pred(CmpOp::Eq, 1);
        other.ty = ValueType::Long;
        let result = EqualitySolver::new().solve(&[pred(CmpOp::Eq, 1), other]);
        assert!(matches!(result, SolverResult::Unknown(_)));
    }

    #[test]
    fn test_empty_conjunction_is_empty_model() {
        let result = EqualitySolver::new().solve(&[]);
        assert!(result.model().unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn prop_sat_models_satisfy_every_predicate(
            ops in proptest::collection::vec((any::<bool>(), -5i64..5), 1..8)
        ) {
            let predicates: Vec<Predicate> = ops
                .iter()
                .map(|(eq, rhs)| pred(if *eq { CmpOp::Eq } else { CmpOp::Ne }, *rhs))
                .collect();
            if let SolverResult::Sat(model) = EqualitySolver::new().solve(&predicates) {
                let value = model.get(&SymbolicVar::for_call(0, "foo")).unwrap();
                for p in &predicates {
                    prop_assert!(p.holds(&value), "{p} violated by {value}");
                }
            }
        }
    }
}
