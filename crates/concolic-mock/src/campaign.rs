//! Exploration campaign
//!
//! Drives repeated concrete executions of a test case until every tracked
//! branch is complete or the campaign runs out of inputs, budget or time.
//!
//! ## Generational search
//!
//! ```text
//! worklist = [empty model]
//! while worklist not empty and budget left:
//!     batch  = pop(batch_size)           ─► workers run one Execution each
//!     for each trace, for each clause i:
//!         solve(path[..i] ∧ ¬path[i])    ─► unseen model? push
//! ```
//!
//! Executions of one batch run on scoped worker threads. Each worker owns
//! its executions and mocks outright; only the oracle is shared.

use crate::config::{CampaignConfig, Config, MockConfig};
use crate::execution::{Execution, ExecutionTrace};
use crate::oracle::{BranchOracle, BranchReport, LocationId};
use crate::result::{MockError, MockResult, Severity};
use crate::symbolic::{Model, ModelResolver, Predicate, Solver, SolverResult};
use crate::target::MockTarget;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Body of a test method, run once per concrete execution
pub type TestFn = fn(&mut Execution) -> MockResult<()>;

/// A test method the campaign explores
#[derive(Debug, Clone)]
pub struct TestCase {
    /// Test name
    pub name: String,
    /// Types mocked for the test's parameters
    pub targets: Vec<MockTarget>,
    /// Tracked conditionals, with report labels
    pub locations: Vec<(LocationId, String)>,
    /// Assertion call sites, with report labels
    pub tag_sites: Vec<(LocationId, String)>,
    /// Test body
    pub run: TestFn,
}

impl TestCase {
    /// Create a test case with no declared targets or locations
    #[must_use]
    pub fn new(name: impl Into<String>, run: TestFn) -> Self {
        Self {
            name: name.into(),
            targets: Vec::new(),
            locations: Vec::new(),
            tag_sites: Vec::new(),
            run,
        }
    }

    /// Declare a mocked parameter type
    #[must_use]
    pub fn target(mut self, target: MockTarget) -> Self {
        self.targets.push(target);
        self
    }

    /// Declare a tracked conditional
    #[must_use]
    pub fn location(mut self, location: LocationId, label: impl Into<String>) -> Self {
        self.locations.push((location, label.into()));
        self
    }

    /// Label an assertion call site
    #[must_use]
    pub fn tag_site(mut self, location: LocationId, label: impl Into<String>) -> Self {
        self.tag_sites.push((location, label.into()));
        self
    }
}

/// Stops a running campaign from scheduling further executions
#[derive(Debug, Clone, Default)]
pub struct CancelHandle {
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    /// Whether cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// How a test case ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CaseStatus {
    /// Every tracked conditional reached both outcomes
    Complete,
    /// No unseen input left to try
    Exhausted,
    /// Execution budget spent
    BudgetSpent,
    /// The case failed; other cases are unaffected
    Failed {
        /// Error message
        error: String,
    },
    /// The interception layer misbehaved
    Fatal {
        /// Error message
        error: String,
    },
    /// Cancelled before the case finished
    Cancelled,
}

impl CaseStatus {
    /// Whether the case reached full branch coverage
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Whether the case ended with an error
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::Fatal { .. })
    }
}

/// Per-case result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseReport {
    /// Test name
    pub name: String,
    /// Outcome
    pub status: CaseStatus,
    /// Concrete executions run
    pub executions: usize,
    /// Conditionals tracked for this case
    pub locations: Vec<LocationId>,
    /// Inputs of every successful execution, in run order
    pub inputs: Vec<Model>,
}

/// Result of a whole campaign
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignReport {
    /// Per-case results, in run order
    pub cases: Vec<CaseReport>,
    /// Total concrete executions
    pub executions: usize,
    /// Oracle state at the end of the campaign
    pub branches: BranchReport,
}

impl CampaignReport {
    /// Every case reached full branch coverage
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.cases.iter().all(|c| c.status.is_complete())
    }

    /// Some case hit a fatal error
    #[must_use]
    pub fn has_fatal(&self) -> bool {
        self.cases
            .iter()
            .any(|c| matches!(c.status, CaseStatus::Fatal { .. }))
    }

    /// Look up a case by name
    #[must_use]
    pub fn case(&self, name: &str) -> Option<&CaseReport> {
        self.cases.iter().find(|c| c.name == name)
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> MockResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[derive(Debug, Clone)]
struct Candidate {
    model: Model,
    assumptions: Vec<Predicate>,
}

/// Bounded exploration session over one oracle
pub struct Campaign {
    mock: MockConfig,
    config: CampaignConfig,
    oracle: Arc<BranchOracle>,
    solver: Box<dyn Solver>,
    cancel: CancelHandle,
    next_execution: u64,
}

impl std::fmt::Debug for Campaign {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Campaign")
            .field("mock", &self.mock)
            .field("config", &self.config)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl Campaign {
    /// Create a campaign
    #[must_use]
    pub fn new(config: Config, oracle: Arc<BranchOracle>, solver: impl Solver + 'static) -> Self {
        Self {
            mock: config.mock,
            config: config.campaign,
            oracle,
            solver: Box::new(solver),
            cancel: CancelHandle::default(),
            next_execution: 0,
        }
    }

    /// Handle for cancelling this campaign from another thread
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Shared oracle
    #[must_use]
    pub fn oracle(&self) -> &Arc<BranchOracle> {
        &self.oracle
    }

    /// Explore every case in order
    pub fn run_all(&mut self, cases: &[TestCase]) -> CampaignReport {
        let reports: Vec<CaseReport> = cases.iter().map(|case| self.run(case)).collect();
        let executions: usize = reports.iter().map(|r| r.executions).sum();
        tracing::info!(
            cases = reports.len(),
            executions,
            complete = reports.iter().filter(|r| r.status.is_complete()).count(),
            "campaign finished"
        );
        CampaignReport {
            cases: reports,
            executions,
            branches: self.oracle.report(),
        }
    }

    /// Explore one case
    pub fn run(&mut self, case: &TestCase) -> CaseReport {
        for (location, label) in case.locations.iter().chain(&case.tag_sites) {
            self.oracle.label(*location, label.as_str());
        }

        let mut tracked: BTreeSet<LocationId> = case.locations.iter().map(|(l, _)| *l).collect();
        let mut report = CaseReport {
            name: case.name.clone(),
            status: CaseStatus::Exhausted,
            executions: 0,
            locations: Vec::new(),
            inputs: Vec::new(),
        };

        let mut worklist = VecDeque::from([Candidate {
            model: Model::new(),
            assumptions: Vec::new(),
        }]);
        let mut seen_models: HashSet<Model> = HashSet::from([Model::new()]);
        let mut queried: HashSet<Vec<Predicate>> = HashSet::new();

        let status = loop {
            if self.cancel.is_cancelled() {
                break CaseStatus::Cancelled;
            }
            if self.config.stop_when_complete
                && report.executions > 0
                && self.oracle.all_complete(&tracked)
            {
                break CaseStatus::Complete;
            }
            let remaining = self.config.max_executions.saturating_sub(report.executions);
            if remaining == 0 {
                break CaseStatus::BudgetSpent;
            }
            if worklist.is_empty() {
                break CaseStatus::Exhausted;
            }

            // A zero batch size would never drain the worklist
            let take = self
                .config
                .batch_size
                .max(1)
                .min(remaining)
                .min(worklist.len());
            let batch: Vec<Candidate> = worklist.drain(..take).collect();
            let results = self.execute_batch(case, &batch);
            report.executions += batch.len();

            let mut failure = None;
            for result in results {
                match result {
                    Ok(trace) => {
                        tracked.extend(trace.locations());
                        report.inputs.push(trace.model());
                        self.expand(&trace, &mut queried, &mut seen_models, &mut worklist);
                    }
                    Err(err) => {
                        if failure.is_none() {
                            failure = Some(err);
                        }
                    }
                }
            }

            if let Some(err) = failure {
                tracing::warn!(case = %case.name, error = %err, "test case failed");
                break match err.severity() {
                    Severity::CaseLocal => CaseStatus::Failed {
                        error: err.to_string(),
                    },
                    Severity::Fatal => CaseStatus::Fatal {
                        error: err.to_string(),
                    },
                };
            }
        };

        report.status = match status {
            CaseStatus::Exhausted | CaseStatus::BudgetSpent
                if self.oracle.all_complete(&tracked) =>
            {
                CaseStatus::Complete
            }
            other => other,
        };
        report.locations = tracked.into_iter().collect();
        tracing::debug!(
            case = %report.name,
            status = ?report.status,
            executions = report.executions,
            "case finished"
        );
        report
    }

    /// Queue a model for every sibling path of `trace` not tried before
    fn expand(
        &self,
        trace: &ExecutionTrace,
        queried: &mut HashSet<Vec<Predicate>>,
        seen_models: &mut HashSet<Model>,
        worklist: &mut VecDeque<Candidate>,
    ) {
        let _ = seen_models.insert(trace.model());
        for index in 0..trace.path.len() {
            let Some(constraints) = trace.path.flipped_at(index) else {
                continue;
            };
            if !queried.insert(constraints.clone()) {
                continue;
            }
            match self.solver.solve(&constraints) {
                SolverResult::Sat(model) => {
                    if seen_models.insert(model.clone()) {
                        worklist.push_back(Candidate {
                            model,
                            assumptions: constraints,
                        });
                    }
                }
                SolverResult::Unsat => {
                    tracing::trace!(clause = index, "sibling path infeasible");
                }
                SolverResult::Unknown(reason) => {
                    tracing::debug!(clause = index, %reason, "solver gave up");
                }
            }
        }
    }

    fn execute_batch(
        &mut self,
        case: &TestCase,
        batch: &[Candidate],
    ) -> Vec<MockResult<ExecutionTrace>> {
        let first_id = self.next_execution;
        self.next_execution += batch.len() as u64;

        let workers = self.config.effective_workers().clamp(1, batch.len().max(1));
        let chunk_size = batch.len().div_ceil(workers).max(1);
        let oracle = &self.oracle;
        let mock = &self.mock;

        thread::scope(|scope| {
            let handles: Vec<_> = batch
                .chunks(chunk_size)
                .enumerate()
                .map(|(chunk, candidates)| {
                    let base = first_id + (chunk * chunk_size) as u64;
                    scope.spawn(move || {
                        let _guard = oracle.enter();
                        candidates
                            .iter()
                            .enumerate()
                            .map(|(i, candidate)| {
                                execute_one(case, base + i as u64, candidate, oracle, mock)
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();

            handles
                .into_iter()
                .zip(batch.chunks(chunk_size))
                .flat_map(|(handle, candidates)| {
                    handle.join().unwrap_or_else(|_| {
                        candidates
                            .iter()
                            .map(|_| {
                                Err(MockError::CasePanicked {
                                    case: case.name.clone(),
                                })
                            })
                            .collect()
                    })
                })
                .collect()
        })
    }
}

fn execute_one(
    case: &TestCase,
    id: u64,
    candidate: &Candidate,
    oracle: &Arc<BranchOracle>,
    mock: &MockConfig,
) -> MockResult<ExecutionTrace> {
    let mut exec = Execution::new(
        id,
        ModelResolver::new(candidate.model.clone()),
        Arc::clone(oracle),
        mock.clone(),
    )
    .with_assumptions(candidate.assumptions.clone());
    (case.run)(&mut exec)?;
    Ok(exec.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbolic::EqualitySolver;
    use crate::target::MethodSig;
    use crate::value::ValueType;

    const LOC: LocationId = LocationId::new(228);
    const TRUE_ARM: LocationId = LocationId::new(229);
    const FALSE_ARM: LocationId = LocationId::new(230);

    fn final_foo() -> MockTarget {
        MockTarget::class("Final")
            .final_class()
            .method(MethodSig::new("foo", ValueType::Int).final_method())
            .build()
    }

    fn foo_is_228(exec: &mut Execution) -> MockResult<()> {
        let a = exec.create_mock(&final_foo())?;
        let foo = a.invoke("foo", &[])?;
        if exec.branch(LOC, &foo.equals(228)) {
            exec.assert_reached(TRUE_ARM, true);
        } else {
            exec.assert_reached(FALSE_ARM, true);
        }
        Ok(())
    }

    fn unmockable(exec: &mut Execution) -> MockResult<()> {
        let _ = exec.create_mock(&MockTarget::class("Empty").final_class().build())?;
        Ok(())
    }

    fn campaign(config: CampaignConfig) -> Campaign {
        Campaign::new(
            Config {
                mock: MockConfig::default(),
                campaign: config,
            },
            BranchOracle::shared(),
            EqualitySolver::new(),
        )
    }

    fn foo_case() -> TestCase {
        TestCase::new("testFinal", foo_is_228)
            .target(final_foo())
            .location(LOC, "a.foo() == 228")
    }

    #[test]
    fn test_two_executions_complete_final_case() {
        let mut campaign = campaign(CampaignConfig::default());
        let report = campaign.run(&foo_case());
        assert_eq!(report.status, CaseStatus::Complete);
        assert_eq!(report.executions, 2);
        assert!(campaign.oracle().is_complete(LOC));
        assert_eq!(campaign.oracle().tags(TRUE_ARM), (1, 0));
        assert_eq!(campaign.oracle().tags(FALSE_ARM), (1, 0));
    }

    #[test]
    fn test_unmockable_fails_only_its_case() {
        let mut campaign = campaign(CampaignConfig::default());
        let report = campaign.run_all(&[TestCase::new("testEmpty", unmockable), foo_case()]);
        assert!(matches!(
            report.case("testEmpty").unwrap().status,
            CaseStatus::Failed { .. }
        ));
        assert!(report.case("testFinal").unwrap().status.is_complete());
        assert!(!report.is_success());
        assert!(!report.has_fatal());
    }

    #[test]
    fn test_budget_of_one_stops_early() {
        let mut campaign = campaign(CampaignConfig::builder().max_executions(1).build());
        let report = campaign.run(&foo_case());
        assert_eq!(report.status, CaseStatus::BudgetSpent);
        assert_eq!(report.executions, 1);
    }

    #[test]
    fn test_zero_batch_size_still_makes_progress() {
        let mut campaign = campaign(CampaignConfig {
            batch_size: 0,
            ..CampaignConfig::default()
        });
        let report = campaign.run(&foo_case());
        assert_eq!(report.status, CaseStatus::Complete);
        assert_eq!(report.executions, 2);
    }

    #[test]
    fn test_cancel_before_run_keeps_oracle_state() {
        let mut campaign = campaign(CampaignConfig::default());
        campaign.oracle().on_branch(LOC, true);
        campaign.cancel_handle().cancel();
        let report = campaign.run(&foo_case());
        assert_eq!(report.status, CaseStatus::Cancelled);
        assert_eq!(report.executions, 0);
        assert_eq!(
            campaign.oracle().state(LOC),
            crate::oracle::BranchState::ReachedTrue
        );
    }

    #[test]
    fn test_parallel_workers_reach_same_coverage() {
        let mut campaign = campaign(
            CampaignConfig::builder()
                .workers(4)
                .batch_size(8)
                .stop_when_complete(false)
                .build(),
        );
        let report = campaign.run(&foo_case());
        assert_eq!(report.status, CaseStatus::Complete);
        assert_eq!(report.executions, 2);
        assert_eq!(report.inputs.len(), 2);
    }

    #[test]
    fn test_report_json() {
        let mut campaign = campaign(CampaignConfig::default());
        let report = campaign.run_all(&[foo_case()]);
        let json = report.to_json().unwrap();
        assert!(json.contains("\"status\": \"complete\""));
        assert!(json.contains("a.foo() == 228"));
    }
}
