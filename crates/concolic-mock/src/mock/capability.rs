//! Typed views of single-method capabilities
//!
//! A functional interface mock is still a [`MockInstance`]; a capability
//! view only gives its one method a typed call. The view borrows the
//! instance, so calls keep going through the execution's binding table.

use super::MockInstance;
use crate::result::MockResult;
use crate::symbolic::ConcolicValue;
use crate::target::{MethodSig, MockTarget};
use crate::value::{Value, ValueType};

/// A single-method capability a mock can be viewed as
pub trait Capability<'a>: Sized {
    /// Interface name
    const INTERFACE: &'static str;

    /// The capability's method
    fn method() -> MethodSig;

    /// Wrap an instance already checked to declare [`Capability::method`]
    fn from_instance(instance: &'a MockInstance) -> Self;

    /// Target descriptor for the bare interface
    #[must_use]
    fn descriptor() -> MockTarget {
        MockTarget::interface(Self::INTERFACE)
            .method(Self::method())
            .build()
    }
}

/// `int getAsInt()`
#[derive(Debug, Clone, Copy)]
pub struct IntSupplier<'a> {
    instance: &'a MockInstance,
}

impl IntSupplier<'_> {
    /// Supply an `int`
    pub fn get_as_int(&self) -> MockResult<ConcolicValue> {
        self.instance.invoke("getAsInt", &[])
    }
}

impl<'a> Capability<'a> for IntSupplier<'a> {
    const INTERFACE: &'static str = "IntSupplier";

    fn method() -> MethodSig {
        MethodSig::new("getAsInt", ValueType::Int)
    }

    fn from_instance(instance: &'a MockInstance) -> Self {
        Self { instance }
    }
}

/// `Integer get()`; the supplied box may be null
#[derive(Debug, Clone, Copy)]
pub struct Supplier<'a> {
    instance: &'a MockInstance,
}

impl Supplier<'_> {
    /// Supply a boxed integer
    pub fn get(&self) -> MockResult<ConcolicValue> {
        self.instance.invoke("get", &[])
    }
}

impl<'a> Capability<'a> for Supplier<'a> {
    const INTERFACE: &'static str = "Supplier";

    fn method() -> MethodSig {
        MethodSig::new("get", ValueType::BoxedInt)
    }

    fn from_instance(instance: &'a MockInstance) -> Self {
        Self { instance }
    }
}

/// `long apply(Object)`
#[derive(Debug, Clone, Copy)]
pub struct Function<'a> {
    instance: &'a MockInstance,
}

impl Function<'_> {
    /// Apply to `arg`
    ///
    /// The argument does not influence the result: the first call binds it.
    pub fn apply(&self, arg: Value) -> MockResult<ConcolicValue> {
        self.instance.invoke("apply", &[arg])
    }
}

impl<'a> Capability<'a> for Function<'a> {
    const INTERFACE: &'static str = "Function";

    fn method() -> MethodSig {
        MethodSig::new("apply", ValueType::Long).with_params([ValueType::Object])
    }

    fn from_instance(instance: &'a MockInstance) -> Self {
        Self { instance }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MockConfig;
    use crate::mock::MockProvider;
    use crate::symbolic::{Model, ModelResolver, SymbolicVar};
    use crate::target::Interception;

    fn provider(model: Model) -> MockProvider {
        MockProvider::new(MockConfig::default(), ModelResolver::new(model))
    }

    #[test]
    fn test_int_supplier_view() {
        let provider = provider(
            Model::new().with(SymbolicVar::for_call(0, "getAsInt"), Value::Int(42)),
        );
        let mock = provider.create_mock(&IntSupplier::descriptor()).unwrap();
        assert_eq!(mock.interception(), Interception::Proxy);
        let supplier = mock.capability::<IntSupplier<'_>>().unwrap();
        assert_eq!(supplier.get_as_int().unwrap().value(), Value::Int(42));
    }

    #[test]
    fn test_supplier_null_box_misses_literal() {
        let resolver =
            |_: &SymbolicVar, _: ValueType| -> MockResult<Value> { Ok(Value::Boxed(None)) };
        let provider = MockProvider::new(MockConfig::default(), resolver);
        let mock = provider.create_mock(&Supplier::descriptor()).unwrap();
        let supplier = mock.capability::<Supplier<'_>>().unwrap();
        let value = supplier.get().unwrap();
        assert_eq!(value.value(), Value::Boxed(None));
        assert!(!value.equals(333).evaluate());
    }

    #[test]
    fn test_supplier_defaults_to_zero_box() {
        let provider = provider(Model::new());
        let mock = provider.create_mock(&Supplier::descriptor()).unwrap();
        let value = mock.capability::<Supplier<'_>>().unwrap().get().unwrap();
        assert_eq!(value.value(), Value::Boxed(Some(0)));
    }

    #[test]
    fn test_function_ignores_argument_after_binding() {
        let provider = provider(
            Model::new().with(SymbolicVar::for_call(0, "apply"), Value::Long(909)),
        );
        let mock = provider.create_mock(&Function::descriptor()).unwrap();
        let function = mock.capability::<Function<'_>>().unwrap();
        let first = function.apply(Value::Null).unwrap();
        let second = function.apply(Value::Int(7)).unwrap();
        assert_eq!(first.value(), Value::Long(909));
        assert_eq!(first, second);
        assert_eq!(provider.bindings()[0].first_args, vec![Value::Null]);
    }

    #[test]
    fn test_wrong_capability_is_rejected() {
        let provider = provider(Model::new());
        let mock = provider.create_mock(&IntSupplier::descriptor()).unwrap();
        assert!(mock.capability::<Function<'_>>().is_err());
    }
}
