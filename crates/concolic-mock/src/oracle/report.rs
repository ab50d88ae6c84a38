//! Branch coverage report
//!
//! Snapshot of the oracle for drivers and the CLI: per-point reach state
//! and hit counts, assertion tag counts, and summary statistics.

use super::{BranchState, LocationId};
use crate::result::MockResult;
use serde::{Deserialize, Serialize};

/// Summary statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchSummary {
    /// Branch points seen
    pub total_points: usize,
    /// Branch points with both outcomes reached
    pub complete_points: usize,
    /// Outcomes reached, counting each polarity separately
    pub reached_outcomes: usize,
    /// `reached_outcomes / (2 * total_points)` as a percentage
    pub coverage_percent: f64,
}

/// Per-point coverage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BranchPointReport {
    /// Location
    pub location: LocationId,
    /// Optional label
    pub label: Option<String>,
    /// Reach state
    pub state: BranchState,
    /// Evaluations that took the true arm
    pub true_hits: u64,
    /// Evaluations that took the false arm
    pub false_hits: u64,
}

/// Per-location assertion tag counts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagReport {
    /// Location
    pub location: LocationId,
    /// Optional label
    pub label: Option<String>,
    /// Tags with literal `true`
    pub true_tags: u64,
    /// Tags with literal `false`
    pub false_tags: u64,
}

/// Branch coverage report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchReport {
    /// Branch points, sorted by location
    pub points: Vec<BranchPointReport>,
    /// Assertion tags, sorted by location
    pub tags: Vec<TagReport>,
    /// Summary
    pub summary: BranchSummary,
}

impl BranchReport {
    pub(crate) fn new(mut points: Vec<BranchPointReport>, mut tags: Vec<TagReport>) -> Self {
        points.sort_by_key(|p| p.location);
        tags.sort_by_key(|t| t.location);
        let summary = summarize(&points);
        Self {
            points,
            tags,
            summary,
        }
    }

    /// Points not yet complete
    #[must_use]
    pub fn incomplete(&self) -> Vec<&BranchPointReport> {
        self.points
            .iter()
            .filter(|p| !p.state.is_complete())
            .collect()
    }

    /// Every seen branch point is complete
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.points.iter().all(|p| p.state.is_complete())
    }

    /// Serialize as pretty JSON
    pub fn to_json(&self) -> MockResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn summarize(points: &[BranchPointReport]) -> BranchSummary {
    let reached_outcomes: usize = points
        .iter()
        .map(|p| match p.state {
            BranchState::Unreached => 0,
            BranchState::ReachedTrue | BranchState::ReachedFalse => 1,
            BranchState::ReachedBoth => 2,
        })
        .sum();
    let coverage_percent = if points.is_empty() {
        100.0 // Vacuously true
    } else {
        reached_outcomes as f64 / (2 * points.len()) as f64 * 100.0
    };
    BranchSummary {
        total_points: points.len(),
        complete_points: points.iter().filter(|p| p.state.is_complete()).count(),
        reached_outcomes,
        coverage_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(id: u32, state: BranchState) -> BranchPointReport {
        BranchPointReport {
            location: LocationId::new(id),
            label: None,
            state,
            true_hits: 0,
            false_hits: 0,
        }
    }

    #[test]
    fn test_summary_counts_outcomes() {
        let report = BranchReport::new(
            vec![
                point(2, BranchState::ReachedBoth),
                point(1, BranchState::ReachedTrue),
            ],
            Vec::new(),
        );
        assert_eq!(report.points[0].location, LocationId::new(1));
        assert_eq!(report.summary.total_points, 2);
        assert_eq!(report.summary.complete_points, 1);
        assert_eq!(report.summary.reached_outcomes, 3);
        assert!((report.summary.coverage_percent - 75.0).abs() < f64::EPSILON);
        assert!(!report.is_complete());
        assert_eq!(report.incomplete().len(), 1);
    }

    #[test]
    fn test_empty_report_is_vacuously_complete() {
        let report = BranchReport::new(Vec::new(), Vec::new());
        assert!(report.is_complete());
        assert!((report.summary.coverage_percent - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_json_contains_state() {
        let report = BranchReport::new(vec![point(7, BranchState::ReachedFalse)], Vec::new());
        let json = report.to_json().unwrap();
        assert!(json.contains("\"reached_false\""));
        assert!(json.contains("\"location\": 7"));
    }
}
