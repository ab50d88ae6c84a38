//! Mock Provider
//!
//! Substitutes engine-controlled instances for types a test depends on.
//! Return values of mocked calls become symbolic inputs of the run.
//!
//! ## Interception
//!
//! | Target                         | Mechanism   |
//! |--------------------------------|-------------|
//! | interface                      | proxy       |
//! | open class, no final methods   | subclass    |
//! | final class or final method    | call site   |
//! | primitive, array, no methods   | unmockable  |
//!
//! ```rust
//! use concolic_mock::{MethodSig, MockConfig, MockProvider, MockTarget, ModelResolver, ValueType};
//!
//! let target = MockTarget::class("Final")
//!     .final_class()
//!     .method(MethodSig::new("foo", ValueType::Int).final_method())
//!     .build();
//! let provider = MockProvider::new(MockConfig::default(), ModelResolver::default());
//! let a = provider.create_mock(&target)?;
//! let foo = a.invoke("foo", &[])?;
//! assert_eq!(foo.var().map(|v| v.as_str()), Some("mock0.foo"));
//! # Ok::<(), concolic_mock::MockError>(())
//! ```

mod capability;
mod provider;
pub mod strategies;

pub use capability::{Capability, Function, IntSupplier, Supplier};
pub use provider::{Binding, MockId, MockInstance, MockProvider};
