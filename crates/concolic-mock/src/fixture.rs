//! Mock lambda fixture
//!
//! Four test methods, each comparing the return value of a mocked
//! parameter against a literal and tagging both arms with
//! `assert_reached(_, true)`:
//!
//! | Case                   | Parameter                | Condition               |
//! |------------------------|--------------------------|-------------------------|
//! | `testFinal`            | `final class Final`      | `a.foo() == 228`        |
//! | `testIntSupplier`      | `IntSupplier`            | `a.getAsInt() == 42`    |
//! | `testBoxedIntSupplier` | `Supplier<Integer>`      | `a.get() == 333`        |
//! | `testFunction`         | `Function<Object, Long>` | `a.apply(null) == 909L` |
//!
//! A case is covered once its condition reached both outcomes.

use crate::campaign::{TestCase, TestFn};
use crate::execution::Execution;
use crate::mock::{Capability, Function, IntSupplier, Supplier};
use crate::oracle::LocationId;
use crate::result::MockResult;
use crate::symbolic::Condition;
use crate::target::{MethodSig, MockTarget};
use crate::value::{Value, ValueType};

/// Program points of one `if/else`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BranchSites {
    /// The condition
    pub condition: LocationId,
    /// Assertion in the `then` arm
    pub then_arm: LocationId,
    /// Assertion in the `else` arm
    pub else_arm: LocationId,
}

impl BranchSites {
    const fn at(base: u32) -> Self {
        Self {
            condition: LocationId::new(base),
            then_arm: LocationId::new(base + 1),
            else_arm: LocationId::new(base + 2),
        }
    }
}

/// `testFinal`
pub const FINAL: BranchSites = BranchSites::at(0x100);
/// `testIntSupplier`
pub const INT_SUPPLIER: BranchSites = BranchSites::at(0x200);
/// `testBoxedIntSupplier`
pub const BOXED_INT_SUPPLIER: BranchSites = BranchSites::at(0x300);
/// `testFunction`
pub const FUNCTION: BranchSites = BranchSites::at(0x400);

/// `final class Final { final int foo() }`
#[must_use]
pub fn final_target() -> MockTarget {
    MockTarget::class("MockLambdaTests.Final")
        .final_class()
        .method(MethodSig::new("foo", ValueType::Int).final_method())
        .build()
}

/// A final class with no interception point at all
#[must_use]
pub fn sealed_target() -> MockTarget {
    MockTarget::class("MockLambdaTests.Sealed")
        .final_class()
        .method(MethodSig::new("hidden", ValueType::Int).private_method())
        .build()
}

fn if_else(exec: &mut Execution, sites: BranchSites, condition: &Condition) {
    if exec.branch(sites.condition, condition) {
        exec.assert_reached(sites.then_arm, true);
    } else {
        exec.assert_reached(sites.else_arm, true);
    }
}

/// `if (a.foo() == 228)`
pub fn test_final(exec: &mut Execution) -> MockResult<()> {
    let a = exec.create_mock(&final_target())?;
    let foo = a.invoke("foo", &[])?;
    if_else(exec, FINAL, &foo.equals(228));
    Ok(())
}

/// `if (a.getAsInt() == 42)`
pub fn test_int_supplier(exec: &mut Execution) -> MockResult<()> {
    let a = exec.create_mock(&IntSupplier::descriptor())?;
    let value = a.capability::<IntSupplier<'_>>()?.get_as_int()?;
    if_else(exec, INT_SUPPLIER, &value.equals(42));
    Ok(())
}

/// `if (a.get() == 333)`
pub fn test_boxed_int_supplier(exec: &mut Execution) -> MockResult<()> {
    let a = exec.create_mock(&Supplier::descriptor())?;
    let value = a.capability::<Supplier<'_>>()?.get()?;
    if_else(exec, BOXED_INT_SUPPLIER, &value.equals(333));
    Ok(())
}

/// `if (a.apply(null) == 909L)`
pub fn test_function(exec: &mut Execution) -> MockResult<()> {
    let a = exec.create_mock(&Function::descriptor())?;
    let value = a.capability::<Function<'_>>()?.apply(Value::Null)?;
    if_else(exec, FUNCTION, &value.equals(909));
    Ok(())
}

/// Requests a mock of [`sealed_target`]; always fails
pub fn test_sealed(exec: &mut Execution) -> MockResult<()> {
    let _ = exec.create_mock(&sealed_target())?;
    Ok(())
}

fn case(
    name: &str,
    target: MockTarget,
    sites: BranchSites,
    label: &str,
    run: TestFn,
) -> TestCase {
    TestCase::new(name, run)
        .target(target)
        .location(sites.condition, label)
        .tag_site(sites.then_arm, format!("{label} (then)"))
        .tag_site(sites.else_arm, format!("{label} (else)"))
}

/// Every fixture case
#[must_use]
pub fn cases() -> Vec<TestCase> {
    vec![
        case("testFinal", final_target(), FINAL, "a.foo() == 228", test_final),
        case(
            "testIntSupplier",
            IntSupplier::descriptor(),
            INT_SUPPLIER,
            "a.getAsInt() == 42",
            test_int_supplier,
        ),
        case(
            "testBoxedIntSupplier",
            Supplier::descriptor(),
            BOXED_INT_SUPPLIER,
            "a.get() == 333",
            test_boxed_int_supplier,
        ),
        case(
            "testFunction",
            Function::descriptor(),
            FUNCTION,
            "a.apply(null) == 909L",
            test_function,
        ),
    ]
}

/// The unmockable case
#[must_use]
pub fn sealed_case() -> TestCase {
    TestCase::new("testSealed", test_sealed).target(sealed_target())
}

/// Look up a fixture case by name, including [`sealed_case`]
#[must_use]
pub fn find(name: &str) -> Option<TestCase> {
    cases()
        .into_iter()
        .chain(std::iter::once(sealed_case()))
        .find(|c| c.name == name)
}
