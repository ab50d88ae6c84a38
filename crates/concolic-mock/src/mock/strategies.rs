//! Proptest strategies for mock targets and values
//!
//! Used to check classification and resolution against arbitrary
//! descriptors rather than the handful of fixture types.
//!
//! ```rust,ignore
//! proptest! {
//!     #[test]
//!     fn prop_mockable_targets_mock(target in mockable_target()) {
//!         let provider = MockProvider::new(MockConfig::default(), ModelResolver::default());
//!         prop_assert!(provider.create_mock(&target).is_ok());
//!     }
//! }
//! ```

#[cfg(any(test, feature = "proptest"))]
use crate::target::{MethodSig, MockTarget};
#[cfg(any(test, feature = "proptest"))]
use crate::value::{Value, ValueType};

#[cfg(any(test, feature = "proptest"))]
use proptest::prelude::*;

/// Any resolvable return type
#[cfg(any(test, feature = "proptest"))]
pub fn resolvable_type() -> impl Strategy<Value = ValueType> {
    prop_oneof![
        Just(ValueType::Bool),
        Just(ValueType::Int),
        Just(ValueType::Long),
        Just(ValueType::BoxedInt),
        Just(ValueType::Object),
    ]
}

/// A value inhabiting `ty`
#[cfg(any(test, feature = "proptest"))]
pub fn value_of(ty: ValueType) -> BoxedStrategy<Value> {
    match ty {
        ValueType::Bool => any::<bool>().prop_map(Value::Bool).boxed(),
        ValueType::Int => any::<i32>().prop_map(Value::Int).boxed(),
        ValueType::Long => any::<i64>().prop_map(Value::Long).boxed(),
        ValueType::BoxedInt => proptest::option::of(any::<i32>())
            .prop_map(Value::Boxed)
            .boxed(),
        ValueType::Object | ValueType::Void => Just(Value::Null).boxed(),
    }
}

/// A method that can be intercepted
#[cfg(any(test, feature = "proptest"))]
pub fn interceptable_method() -> impl Strategy<Value = MethodSig> {
    ("[a-z][a-zA-Z]{0,8}", resolvable_type(), any::<bool>(), 0usize..3).prop_map(
        |(name, returns, is_final, arity)| {
            let sig = MethodSig::new(name, returns).with_params(vec![ValueType::Object; arity]);
            if is_final {
                sig.final_method()
            } else {
                sig
            }
        },
    )
}

/// A class or interface with at least one interceptable method
#[cfg(any(test, feature = "proptest"))]
pub fn mockable_target() -> impl Strategy<Value = MockTarget> {
    (
        "[A-Z][a-zA-Z]{0,8}",
        0u8..4,
        proptest::collection::vec(interceptable_method(), 1..4),
    )
        .prop_map(|(name, kind, methods)| {
            let builder = match kind {
                0 => MockTarget::interface(name),
                1 => MockTarget::class(name).final_class(),
                2 => MockTarget::class(name).abstract_class(),
                _ => MockTarget::class(name),
            };
            // Suffix keeps names unique within the target
            methods
                .into_iter()
                .enumerate()
                .fold(builder, |b, (i, mut m)| {
                    m.name = format!("{}{i}", m.name);
                    b.method(m)
                })
                .build()
        })
}

/// A class whose every method is private, static or `void`
#[cfg(any(test, feature = "proptest"))]
pub fn unmockable_target() -> impl Strategy<Value = MockTarget> {
    (
        "[A-Z][a-zA-Z]{0,8}",
        proptest::collection::vec(("[a-z]{1,6}", 0u8..3), 0..4),
    )
        .prop_map(|(name, methods)| {
            methods
                .into_iter()
                .fold(MockTarget::class(name).final_class(), |b, (m, how)| {
                    b.method(match how {
                        0 => MethodSig::new(m, ValueType::Int).private_method(),
                        1 => MethodSig::new(m, ValueType::Int).static_method(),
                        _ => MethodSig::new(m, ValueType::Void),
                    })
                })
                .build()
        })
}
