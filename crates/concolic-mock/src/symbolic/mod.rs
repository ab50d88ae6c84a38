//! Symbolic inputs, path conditions, and the resolver seam
//!
//! Mocked return values are the symbolic inputs of a concolic run. Each
//! one is named by a [`SymbolicVar`] that is stable across executions of a
//! campaign, so a [`Model`] computed from one run's path condition can be
//! replayed in the next.
//!
//! Two seams are consumed from outside the core:
//!
//! - [`ValueResolver`]: picks a concrete value for a fresh variable
//! - [`PathRecorder`]: collects inputs and branch clauses of one run

mod solver;

pub use solver::{EqualitySolver, Solver, SolverResult};

use crate::oracle::LocationId;
use crate::result::MockResult;
use crate::value::{Value, ValueType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Name of a symbolic input
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SymbolicVar(String);

impl SymbolicVar {
    /// Create a variable with an explicit name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Variable bound to the return value of `method` on mock slot `slot`
    #[must_use]
    pub fn for_call(slot: u32, method: &str) -> Self {
        Self(format!("mock{slot}.{method}"))
    }

    /// Variable name
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SymbolicVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A concrete value paired with the symbolic input it came from, if any
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcolicValue {
    concrete: Value,
    ty: ValueType,
    symbolic: Option<SymbolicVar>,
}

impl ConcolicValue {
    /// A value with no symbolic origin
    #[must_use]
    pub const fn concrete(value: Value, ty: ValueType) -> Self {
        Self {
            concrete: value,
            ty,
            symbolic: None,
        }
    }

    /// A value bound to a symbolic input
    #[must_use]
    pub const fn symbolic(value: Value, ty: ValueType, var: SymbolicVar) -> Self {
        Self {
            concrete: value,
            ty,
            symbolic: Some(var),
        }
    }

    /// Concrete value observed in this execution
    #[must_use]
    pub const fn value(&self) -> Value {
        self.concrete
    }

    /// Declared type
    #[must_use]
    pub const fn ty(&self) -> ValueType {
        self.ty
    }

    /// Symbolic variable, if the value is an engine-controlled input
    #[must_use]
    pub const fn var(&self) -> Option<&SymbolicVar> {
        self.symbolic.as_ref()
    }

    /// Condition `self == rhs`
    #[must_use]
    pub fn equals(&self, rhs: i64) -> Condition {
        Condition::new(self.clone(), CmpOp::Eq, rhs)
    }

    /// Condition `self != rhs`
    #[must_use]
    pub fn not_equals(&self, rhs: i64) -> Condition {
        Condition::new(self.clone(), CmpOp::Ne, rhs)
    }
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CmpOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
}

impl CmpOp {
    /// Logical negation
    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Self::Eq => Self::Ne,
            Self::Ne => Self::Eq,
        }
    }

    /// Apply to a numeric view; a null operand is unequal to every literal
    #[must_use]
    pub fn apply(self, lhs: Option<i64>, rhs: i64) -> bool {
        match self {
            Self::Eq => lhs == Some(rhs),
            Self::Ne => lhs != Some(rhs),
        }
    }
}

impl fmt::Display for CmpOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Eq => "==",
            Self::Ne => "!=",
        })
    }
}

/// A branch condition evaluated concolically
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    lhs: ConcolicValue,
    op: CmpOp,
    rhs: i64,
}

impl Condition {
    /// Create a condition
    #[must_use]
    pub const fn new(lhs: ConcolicValue, op: CmpOp, rhs: i64) -> Self {
        Self { lhs, op, rhs }
    }

    /// Concrete outcome
    #[must_use]
    pub fn evaluate(&self) -> bool {
        self.op.apply(self.lhs.value().as_i64(), self.rhs)
    }

    /// Predicate that held in this execution, if the left side is symbolic
    #[must_use]
    pub fn taken_predicate(&self) -> Option<Predicate> {
        let var = self.lhs.var()?.clone();
        let op = if self.evaluate() {
            self.op
        } else {
            self.op.negate()
        };
        Some(Predicate {
            var,
            ty: self.lhs.ty(),
            op,
            rhs: self.rhs,
        })
    }
}

/// An atomic constraint over one symbolic input
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Predicate {
    /// Constrained input
    pub var: SymbolicVar,
    /// Input type
    pub ty: ValueType,
    /// Operator
    pub op: CmpOp,
    /// Literal operand
    pub rhs: i64,
}

impl Predicate {
    /// Logical negation
    #[must_use]
    pub fn negate(&self) -> Self {
        Self {
            op: self.op.negate(),
            ..self.clone()
        }
    }

    /// Whether `value` satisfies this predicate
    #[must_use]
    pub fn holds(&self, value: &Value) -> bool {
        self.op.apply(value.as_i64(), self.rhs)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.var, self.op, self.rhs)
    }
}

/// A predicate tied to the branch location that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    /// Branch location
    pub location: LocationId,
    /// Predicate that held
    pub predicate: Predicate,
}

/// Collects the symbolic inputs and branch clauses of one concrete run
pub trait PathRecorder {
    /// Register a symbolic input source
    fn register_input(&mut self, var: &SymbolicVar, ty: ValueType);

    /// Append a branch clause
    fn record(&mut self, clause: Clause);
}

/// Ordered path condition of one execution
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathCondition {
    inputs: BTreeMap<SymbolicVar, ValueType>,
    clauses: Vec<Clause>,
}

impl PathCondition {
    /// Create an empty path
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registered inputs
    #[must_use]
    pub fn inputs(&self) -> &BTreeMap<SymbolicVar, ValueType> {
        &self.inputs
    }

    /// Clauses in execution order
    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Number of clauses
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether no clause was recorded
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Constraints selecting the sibling path at clause `index`:
    /// every predicate before it, then its negation
    #[must_use]
    pub fn flipped_at(&self, index: usize) -> Option<Vec<Predicate>> {
        let flipped = self.clauses.get(index)?;
        let mut predicates: Vec<Predicate> = self.clauses[..index]
            .iter()
            .map(|c| c.predicate.clone())
            .collect();
        predicates.push(flipped.predicate.negate());
        Some(predicates)
    }
}

impl PathRecorder for PathCondition {
    fn register_input(&mut self, var: &SymbolicVar, ty: ValueType) {
        let _ = self.inputs.entry(var.clone()).or_insert(ty);
    }

    fn record(&mut self, clause: Clause) {
        self.clauses.push(clause);
    }
}

/// Assignment of concrete values to symbolic inputs
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Model {
    assignments: BTreeMap<SymbolicVar, Value>,
}

impl Model {
    /// Create an empty model
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a value
    #[must_use]
    pub fn with(mut self, var: SymbolicVar, value: Value) -> Self {
        self.insert(var, value);
        self
    }

    /// Assign a value in place
    pub fn insert(&mut self, var: SymbolicVar, value: Value) {
        let _ = self.assignments.insert(var, value);
    }

    /// Look up a variable
    #[must_use]
    pub fn get(&self, var: &SymbolicVar) -> Option<Value> {
        self.assignments.get(var).copied()
    }

    /// Number of assignments
    #[must_use]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    /// Whether the model assigns nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    /// Iterate over assignments
    pub fn iter(&self) -> impl Iterator<Item = (&SymbolicVar, &Value)> {
        self.assignments.iter()
    }
}

/// Supplies concrete values for fresh symbolic inputs
pub trait ValueResolver {
    /// Concrete value for `var` of type `ty`
    fn resolve(&self, var: &SymbolicVar, ty: ValueType) -> MockResult<Value>;
}

impl<F> ValueResolver for F
where
    F: Fn(&SymbolicVar, ValueType) -> MockResult<Value>,
{
    fn resolve(&self, var: &SymbolicVar, ty: ValueType) -> MockResult<Value> {
        self(var, ty)
    }
}

/// Resolves from a model, falling back to the type's default value
#[derive(Debug, Clone, Default)]
pub struct ModelResolver {
    model: Model,
}

impl ModelResolver {
    /// Create a resolver over `model`
    #[must_use]
    pub const fn new(model: Model) -> Self {
        Self { model }
    }

    /// Underlying model
    #[must_use]
    pub const fn model(&self) -> &Model {
        &self.model
    }
}

impl ValueResolver for ModelResolver {
    fn resolve(&self, var: &SymbolicVar, ty: ValueType) -> MockResult<Value> {
        Ok(self.model.get(var).unwrap_or_else(|| ty.default_value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn foo() -> SymbolicVar {
        SymbolicVar::for_call(0, "foo")
    }

    #[test]
    fn test_var_naming_is_stable() {
        assert_eq!(foo().as_str(), "mock0.foo");
        assert_eq!(foo(), SymbolicVar::for_call(0, "foo"));
    }

    #[test]
    fn test_taken_predicate_follows_outcome() {
        let hit = ConcolicValue::symbolic(Value::Int(228), ValueType::Int, foo());
        let cond = hit.equals(228);
        assert!(cond.evaluate());
        assert_eq!(cond.taken_predicate().unwrap().op, CmpOp::Eq);

        let miss = ConcolicValue::symbolic(Value::Int(0), ValueType::Int, foo());
        let cond = miss.equals(228);
        assert!(!cond.evaluate());
        assert_eq!(cond.taken_predicate().unwrap().op, CmpOp::Ne);
    }

    #[test]
    fn test_concrete_condition_has_no_predicate() {
        let plain = ConcolicValue::concrete(Value::Int(1), ValueType::Int);
        assert!(plain.equals(1).taken_predicate().is_none());
    }

    #[test]
    fn test_null_box_is_unequal() {
        let null = ConcolicValue::symbolic(Value::Boxed(None), ValueType::BoxedInt, foo());
        assert!(!null.equals(333).evaluate());
        assert!(null.not_equals(333).evaluate());
    }

    #[test]
    fn test_flipped_at_negates_last_kept_clause() {
        let mut path = PathCondition::new();
        let p = Predicate {
            var: foo(),
            ty: ValueType::Int,
            op: CmpOp::Ne,
            rhs: 228,
        };
        path.register_input(&foo(), ValueType::Int);
        path.record(Clause {
            location: LocationId::new(1),
            predicate: p.clone(),
        });
        let flipped = path.flipped_at(0).unwrap();
        assert_eq!(flipped, vec![p.negate()]);
        assert!(path.flipped_at(1).is_none());
    }

    #[test]
    fn test_model_resolver_defaults() {
        let resolver = ModelResolver::new(Model::new().with(foo(), Value::Int(228)));
        assert_eq!(
            resolver.resolve(&foo(), ValueType::Int).unwrap(),
            Value::Int(228)
        );
        assert_eq!(
            resolver
                .resolve(&SymbolicVar::new("other"), ValueType::Long)
                .unwrap(),
            Value::Long(0)
        );
    }

    #[test]
    fn test_closure_resolver() {
        let resolver =
            |_: &SymbolicVar, _: ValueType| -> MockResult<Value> { Ok(Value::Int(7)) };
        assert_eq!(
            resolver.resolve(&foo(), ValueType::Int).unwrap(),
            Value::Int(7)
        );
    }
}
