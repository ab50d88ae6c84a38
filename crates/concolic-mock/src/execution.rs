//! One concrete execution
//!
//! An [`Execution`] owns the mock provider of a single run and stands in
//! for the instrumentation layer: [`Execution::branch`] evaluates a
//! condition concretely, appends the clause that held to the path, and
//! reports the outcome to the campaign's oracle.

use crate::config::MockConfig;
use crate::mock::{Binding, MockInstance, MockProvider};
use crate::oracle::{BranchOracle, LocationId};
use crate::result::MockResult;
use crate::symbolic::{
    Clause, Condition, Model, PathCondition, PathRecorder, Predicate, ValueResolver,
};
use crate::target::MockTarget;
use std::sync::Arc;

/// A single concrete run of a test case
#[derive(Debug)]
pub struct Execution {
    id: u64,
    provider: MockProvider,
    oracle: Arc<BranchOracle>,
    branches: u64,
    assertions: u64,
}

impl Execution {
    /// Create an execution whose mocks resolve through `resolver`
    #[must_use]
    pub fn new(
        id: u64,
        resolver: impl ValueResolver + 'static,
        oracle: Arc<BranchOracle>,
        config: MockConfig,
    ) -> Self {
        Self {
            id,
            provider: MockProvider::new(config, resolver),
            oracle,
            branches: 0,
            assertions: 0,
        }
    }

    /// Predicates the resolver's values must satisfy
    #[must_use]
    pub fn with_assumptions(mut self, assumptions: Vec<Predicate>) -> Self {
        self.provider = self.provider.with_assumptions(assumptions);
        self
    }

    /// Mirror inputs and branch clauses into an external recorder
    #[must_use]
    pub fn with_recorder(mut self, recorder: impl PathRecorder + 'static) -> Self {
        self.provider = self.provider.with_recorder(recorder);
        self
    }

    /// Execution number within its campaign
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Mock provider of this run
    #[must_use]
    pub const fn provider(&self) -> &MockProvider {
        &self.provider
    }

    /// Shared oracle
    #[must_use]
    pub fn oracle(&self) -> &Arc<BranchOracle> {
        &self.oracle
    }

    /// Mock a test-method parameter
    pub fn create_mock(&self, target: &MockTarget) -> MockResult<MockInstance> {
        self.provider.create_mock(target)
    }

    /// Evaluate a tracked conditional
    pub fn branch(&mut self, location: LocationId, condition: &Condition) -> bool {
        let outcome = condition.evaluate();
        if let Some(predicate) = condition.taken_predicate() {
            self.provider.record(Clause {
                location,
                predicate,
            });
        }
        self.oracle.on_branch(location, outcome);
        self.branches += 1;
        outcome
    }

    /// No-op assertion marking the current arm as reached
    pub fn assert_reached(&mut self, location: LocationId, literal: bool) {
        self.oracle.assert_reached(location, literal);
        self.assertions += 1;
    }

    /// End the run
    #[must_use]
    pub fn finish(self) -> ExecutionTrace {
        ExecutionTrace {
            id: self.id,
            path: self.provider.path(),
            bindings: self.provider.bindings(),
            branches: self.branches,
            assertions: self.assertions,
        }
    }
}

/// What one concrete run observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionTrace {
    /// Execution number
    pub id: u64,
    /// Clauses in evaluation order, with registered inputs
    pub path: PathCondition,
    /// Resolved mock return values
    pub bindings: Vec<Binding>,
    /// Tracked conditionals evaluated
    pub branches: u64,
    /// Assertion calls made
    pub assertions: u64,
}

impl ExecutionTrace {
    /// Inputs this run actually used
    #[must_use]
    pub fn model(&self) -> Model {
        let mut model = Model::new();
        for binding in &self.bindings {
            model.insert(binding.var.clone(), binding.value);
        }
        model
    }

    /// Locations of every recorded clause, in order, without repeats
    #[must_use]
    pub fn locations(&self) -> Vec<LocationId> {
        let mut seen = Vec::new();
        for clause in self.path.clauses() {
            if !seen.contains(&clause.location) {
                seen.push(clause.location);
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::BranchState;
    use crate::symbolic::{CmpOp, ModelResolver, SymbolicVar};
    use std::cell::RefCell;
    use std::rc::Rc;
    use crate::target::MethodSig;
    use crate::value::{Value, ValueType};

    const LOC: LocationId = LocationId::new(1);

    fn final_foo() -> MockTarget {
        MockTarget::class("Final")
            .final_class()
            .method(MethodSig::new("foo", ValueType::Int).final_method())
            .build()
    }

    fn run(oracle: &Arc<BranchOracle>, model: Model) -> (bool, ExecutionTrace) {
        let mut exec = Execution::new(
            0,
            ModelResolver::new(model),
            Arc::clone(oracle),
            MockConfig::default(),
        );
        let a = exec.create_mock(&final_foo()).unwrap();
        let foo = a.invoke("foo", &[]).unwrap();
        let taken = exec.branch(LOC, &foo.equals(228));
        exec.assert_reached(LOC, true);
        (taken, exec.finish())
    }

    #[test]
    fn test_default_run_takes_false_arm() {
        let oracle = BranchOracle::shared();
        let (taken, trace) = run(&oracle, Model::new());
        assert!(!taken);
        assert_eq!(oracle.state(LOC), BranchState::ReachedFalse);
        assert_eq!(trace.path.len(), 1);
        assert_eq!(trace.path.clauses()[0].predicate.op, CmpOp::Ne);
        assert_eq!(trace.branches, 1);
        assert_eq!(trace.assertions, 1);
    }

    #[test]
    fn test_flipped_model_completes_branch() {
        let oracle = BranchOracle::shared();
        let (_, first) = run(&oracle, Model::new());
        let flipped = first.path.flipped_at(0).unwrap();
        assert_eq!(flipped[0].op, CmpOp::Eq);
        let model = Model::new().with(SymbolicVar::for_call(0, "foo"), Value::Int(228));
        let (taken, second) = run(&oracle, model.clone());
        assert!(taken);
        assert!(oracle.is_complete(LOC));
        assert_eq!(second.model(), model);
        assert_eq!(oracle.tags(LOC), (2, 0));
    }

    #[test]
    fn test_concrete_condition_records_no_clause() {
        let oracle = BranchOracle::shared();
        let mut exec = Execution::new(
            7,
            ModelResolver::default(),
            Arc::clone(&oracle),
            MockConfig::default(),
        );
        let plain = crate::symbolic::ConcolicValue::concrete(Value::Int(1), ValueType::Int);
        assert!(exec.branch(LOC, &plain.equals(1)));
        let trace = exec.finish();
        assert_eq!(trace.id, 7);
        assert!(trace.path.is_empty());
        assert!(trace.locations().is_empty());
        assert_eq!(oracle.state(LOC), BranchState::ReachedTrue);
    }

    #[derive(Debug, Clone, Default)]
    struct Recorded(Rc<RefCell<(Vec<SymbolicVar>, Vec<Clause>)>>);

    impl PathRecorder for Recorded {
        fn register_input(&mut self, var: &SymbolicVar, _: ValueType) {
            self.0.borrow_mut().0.push(var.clone());
        }

        fn record(&mut self, clause: Clause) {
            self.0.borrow_mut().1.push(clause);
        }
    }

    #[test]
    fn test_branch_reaches_external_recorder() {
        let recorded = Recorded::default();
        let mut exec = Execution::new(
            0,
            ModelResolver::default(),
            BranchOracle::shared(),
            MockConfig::default(),
        )
        .with_recorder(recorded.clone());
        let a = exec.create_mock(&final_foo()).unwrap();
        let foo = a.invoke("foo", &[]).unwrap();
        let _ = exec.branch(LOC, &foo.equals(228));

        let (inputs, clauses) = recorded.0.borrow().clone();
        assert_eq!(inputs, vec![SymbolicVar::for_call(0, "foo")]);
        assert_eq!(clauses.len(), 1);
        assert_eq!(clauses[0].location, LOC);
        assert_eq!(exec.finish().path.clauses(), clauses.as_slice());
    }
}
