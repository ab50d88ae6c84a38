//! Mock provider and mock instances
//!
//! A [`MockProvider`] lives for one concrete execution. Every
//! [`MockInstance`] it creates shares the provider's interception state,
//! so a call on any mock is routed to the same resolver, binding table and
//! path recorder. Nothing here is `Send`: an execution owns its mocks
//! exclusively and never shares them with another worker.
//!
//! The resolver is called with no interception state borrowed, so it may
//! call other mocks of the same execution while answering. An attached
//! [`PathRecorder`] is called with the state borrowed and must not call
//! back into the provider.

use crate::config::MockConfig;
use crate::result::{MockError, MockResult};
use crate::symbolic::{
    Clause, ConcolicValue, PathCondition, PathRecorder, Predicate, SymbolicVar, ValueResolver,
};
use crate::target::{Interception, MethodSig, MockTarget};
use crate::value::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use super::Capability;

/// Slot of a mock within its execution, in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MockId(u32);

impl MockId {
    /// Create a mock ID
    #[inline]
    #[must_use]
    pub const fn new(slot: u32) -> Self {
        Self(slot)
    }

    /// Get the inner value
    #[inline]
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for MockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mock{}", self.0)
    }
}

/// Value bound to a `(mock, method)` pair for the rest of an execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Symbolic input
    pub var: SymbolicVar,
    /// Concrete value returned on every call
    pub value: Value,
    /// Arguments of the first call
    pub first_args: Vec<Value>,
    /// Number of calls served
    pub calls: u64,
}

type BindingKey = (MockId, String);

struct InterceptionState {
    path: PathCondition,
    recorder: Option<Box<dyn PathRecorder>>,
    assumptions: Vec<Predicate>,
    bindings: BTreeMap<BindingKey, Binding>,
    next_slot: u32,
}

impl fmt::Debug for InterceptionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterceptionState")
            .field("path", &self.path)
            .field("recorder", &self.recorder.is_some())
            .field("assumptions", &self.assumptions)
            .field("bindings", &self.bindings.len())
            .field("next_slot", &self.next_slot)
            .finish_non_exhaustive()
    }
}

impl InterceptionState {
    fn register_input(&mut self, var: &SymbolicVar, method: &MethodSig) {
        self.path.register_input(var, method.returns);
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.register_input(var, method.returns);
        }
    }

    fn record(&mut self, clause: Clause) {
        if let Some(recorder) = self.recorder.as_mut() {
            recorder.record(clause.clone());
        }
        self.path.record(clause);
    }

    fn replay(&mut self, key: &BindingKey, method: &MethodSig) -> Option<ConcolicValue> {
        let binding = self.bindings.get_mut(key)?;
        binding.calls += 1;
        Some(ConcolicValue::symbolic(
            binding.value,
            method.returns,
            binding.var.clone(),
        ))
    }

    fn bind(
        &mut self,
        key: BindingKey,
        var: SymbolicVar,
        value: Value,
        method: &MethodSig,
        args: &[Value],
    ) -> MockResult<ConcolicValue> {
        // A resolver that invoked the same mock method re-entrantly bound it first
        if let Some(replayed) = self.replay(&key, method) {
            return Ok(replayed);
        }
        if !value.conforms_to(method.returns) {
            return Err(MockError::inconsistent(
                var.as_str(),
                format!("resolver produced {value}, declared type is {}", method.returns),
            ));
        }
        if let Some(violated) = self
            .assumptions
            .iter()
            .find(|p| p.var == var && !p.holds(&value))
        {
            return Err(MockError::inconsistent(
                var.as_str(),
                format!("resolver produced {value}, path requires {violated}"),
            ));
        }

        tracing::debug!(%var, %value, "bound mock return value");
        let _ = self.bindings.insert(
            key,
            Binding {
                var: var.clone(),
                value,
                first_args: args.to_vec(),
                calls: 1,
            },
        );
        Ok(ConcolicValue::symbolic(value, method.returns, var))
    }
}

/// Creates mocks for one concrete execution
pub struct MockProvider {
    config: MockConfig,
    resolver: Rc<dyn ValueResolver>,
    state: Rc<RefCell<InterceptionState>>,
}

impl fmt::Debug for MockProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockProvider")
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl MockProvider {
    /// Create a provider that resolves return values through `resolver`
    #[must_use]
    pub fn new(config: MockConfig, resolver: impl ValueResolver + 'static) -> Self {
        Self {
            config,
            resolver: Rc::new(resolver),
            state: Rc::new(RefCell::new(InterceptionState {
                path: PathCondition::new(),
                recorder: None,
                assumptions: Vec::new(),
                bindings: BTreeMap::new(),
                next_slot: 0,
            })),
        }
    }

    /// Predicates this execution was derived from
    ///
    /// A resolved value that violates one of them is reported as
    /// [`MockError::ResolutionInconsistency`].
    #[must_use]
    pub fn with_assumptions(self, assumptions: Vec<Predicate>) -> Self {
        self.state.borrow_mut().assumptions = assumptions;
        self
    }

    /// Also report inputs and clauses to an external path recorder
    ///
    /// The provider keeps its own [`PathCondition`] for the trace; the
    /// recorder sees every `register_input` and `record` in the same order.
    #[must_use]
    pub fn with_recorder(self, recorder: impl PathRecorder + 'static) -> Self {
        self.state.borrow_mut().recorder = Some(Box::new(recorder));
        self
    }

    /// Mocking policy
    #[must_use]
    pub const fn config(&self) -> &MockConfig {
        &self.config
    }

    /// Substitute `target` with an engine-controlled instance
    ///
    /// Every interceptable method is registered as a symbolic input source.
    pub fn create_mock(&self, target: &MockTarget) -> MockResult<MockInstance> {
        let interception = target.classify(&self.config)?;

        let mut state = self.state.borrow_mut();
        let id = MockId::new(state.next_slot);
        state.next_slot += 1;
        for method in target.interceptable_methods() {
            let var = SymbolicVar::for_call(id.as_u32(), &method.name);
            state.register_input(&var, method);
        }

        tracing::debug!(
            mock = %id,
            target = target.name(),
            %interception,
            "created mock"
        );

        Ok(MockInstance {
            id,
            target: Rc::new(target.clone()),
            interception,
            resolver: Rc::clone(&self.resolver),
            state: Rc::clone(&self.state),
        })
    }

    /// Return value of `method` on mock `instance` for this execution
    ///
    /// The first call per `(instance, method)` binds a fresh symbolic input
    /// and asks the resolver for its value; later calls replay the binding.
    pub fn resolve_return(
        &self,
        instance: &MockInstance,
        method: &str,
        args: &[Value],
    ) -> MockResult<ConcolicValue> {
        instance.invoke(method, args)
    }

    /// Record a branch clause on this execution's path
    pub fn record(&self, clause: Clause) {
        self.state.borrow_mut().record(clause);
    }

    /// Path condition collected so far
    #[must_use]
    pub fn path(&self) -> PathCondition {
        self.state.borrow().path.clone()
    }

    /// Bindings made so far, by `(mock, method)`
    #[must_use]
    pub fn bindings(&self) -> Vec<Binding> {
        self.state.borrow().bindings.values().cloned().collect()
    }

    /// Number of mocks created
    #[must_use]
    pub fn mock_count(&self) -> u32 {
        self.state.borrow().next_slot
    }
}

/// Engine-controlled stand-in for a target type
#[derive(Clone)]
pub struct MockInstance {
    id: MockId,
    target: Rc<MockTarget>,
    interception: Interception,
    resolver: Rc<dyn ValueResolver>,
    state: Rc<RefCell<InterceptionState>>,
}

impl fmt::Debug for MockInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockInstance")
            .field("id", &self.id)
            .field("target", &self.target.name())
            .field("interception", &self.interception)
            .finish_non_exhaustive()
    }
}

impl MockInstance {
    /// Slot within the execution
    #[must_use]
    pub const fn id(&self) -> MockId {
        self.id
    }

    /// Mocked type
    #[must_use]
    pub fn target(&self) -> &MockTarget {
        &self.target
    }

    /// How calls are intercepted
    #[must_use]
    pub const fn interception(&self) -> Interception {
        self.interception
    }

    /// Call `method` on the mock
    pub fn invoke(&self, method: &str, args: &[Value]) -> MockResult<ConcolicValue> {
        let sig = self
            .target
            .method(method)
            .ok_or_else(|| MockError::UnknownMethod {
                type_name: self.target.name().to_string(),
                method: method.to_string(),
            })?;
        if sig.params.len() != args.len() {
            return Err(MockError::ArityMismatch {
                method: method.to_string(),
                expected: sig.params.len(),
                actual: args.len(),
            });
        }

        let key = (self.id, sig.name.clone());
        if let Some(replayed) = self.state.borrow_mut().replay(&key, sig) {
            return Ok(replayed);
        }
        let var = SymbolicVar::for_call(self.id.as_u32(), &sig.name);
        let value = self.resolver.resolve(&var, sig.returns)?;
        self.state.borrow_mut().bind(key, var, value, sig, args)
    }

    /// Call the target's only interceptable method
    pub fn call(&self, args: &[Value]) -> MockResult<ConcolicValue> {
        let mut methods = self.target.interceptable_methods();
        match (methods.next(), methods.next()) {
            (Some(sig), None) => self.invoke(&sig.name, args),
            _ => Err(MockError::UnknownMethod {
                type_name: self.target.name().to_string(),
                method: "<single abstract method>".to_string(),
            }),
        }
    }

    /// Typed view of a single-method capability
    pub fn capability<'a, C: Capability<'a>>(&'a self) -> MockResult<C> {
        let wanted = C::method();
        match self.target.method(&wanted.name) {
            Some(sig) if sig.returns == wanted.returns && sig.params == wanted.params => {
                Ok(C::from_instance(self))
            }
            _ => Err(MockError::UnknownMethod {
                type_name: self.target.name().to_string(),
                method: wanted.to_string(),
            }),
        }
    }
}
