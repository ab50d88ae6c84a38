//! Concolic Mock: mock provider and branch oracle for concolic test generation
//!
//! A concolic engine explores a test method by running it concretely,
//! recording the branch conditions it took, and solving for inputs that
//! take the other side. This crate supplies the two pieces such an engine
//! needs when the inputs are *objects*:
//!
//! - a **mock provider** that stands in for a parameter's type, including
//!   `final` classes, and turns every mocked return value into a symbolic
//!   input;
//! - a **branch oracle** that records which outcome of which conditional
//!   was reached, plus a no-op assertion that tags each arm as a goal.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Campaign ──► worklist of models ──► workers                     │
//! │                                        │                         │
//! │                      Execution ◄───────┘ (one per model)         │
//! │                      │  create_mock ──► MockProvider ──► resolver│
//! │                      │  branch(loc, cond) ─┬─► PathCondition     │
//! │                      │                     └─► BranchOracle      │
//! │                      └─ finish() ──► trace ──► Solver ──► models │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust
//! use concolic_mock::{fixture, BranchOracle, Campaign, Config, EqualitySolver};
//!
//! let oracle = BranchOracle::shared();
//! let mut campaign = Campaign::new(Config::default(), oracle.clone(), EqualitySolver::new());
//! let report = campaign.run_all(&fixture::cases());
//! assert!(report.is_success());
//! assert!(oracle.is_complete(fixture::FINAL.condition));
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]
#![cfg_attr(
    test,
    allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)
)]

pub mod campaign;
pub mod config;
pub mod execution;
pub mod fixture;
pub mod mock;
pub mod oracle;
pub mod result;
pub mod symbolic;
pub mod target;
pub mod value;

pub use campaign::{
    Campaign, CampaignReport, CancelHandle, CaseReport, CaseStatus, TestCase, TestFn,
};
pub use config::{CampaignConfig, Config, MockConfig, MockingMode};
pub use execution::{Execution, ExecutionTrace};
pub use mock::{
    Binding, Capability, Function, IntSupplier, MockId, MockInstance, MockProvider, Supplier,
};
pub use oracle::{
    reached, AssertionTag, BranchOracle, BranchPointReport, BranchReport, BranchState,
    BranchSummary, LocationId, OracleGuard, Polarity, TagReport,
};
pub use result::{MockError, MockResult, Severity};
pub use symbolic::{
    Clause, CmpOp, ConcolicValue, Condition, EqualitySolver, Model, ModelResolver,
    PathCondition, PathRecorder, Predicate, Solver, SolverResult, SymbolicVar, ValueResolver,
};
pub use target::{Interception, MethodSig, MockTarget, MockTargetBuilder, Modifiers, TypeKind};
pub use value::{Value, ValueType};
