//! Output formatting

use concolic_mock::{BranchState, CampaignReport, CaseStatus, Config, MockTarget};
use console::{style, Style, Term};
use std::fmt::Write as _;

/// Status line printer on stderr
#[derive(Debug)]
pub struct Reporter {
    term: Term,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new(true, false)
    }
}

impl Reporter {
    /// Create a new reporter
    #[must_use]
    pub fn new(use_color: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            use_color,
            quiet,
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("✓").green().bold().to_string()
        } else {
            "PASS".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a failure message
    pub fn failure(&self, message: &str) {
        // Always print failures, even in quiet mode
        let prefix = if self.use_color {
            style("✗").red().bold().to_string()
        } else {
            "FAIL".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }

        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };

        let _ = self.term.write_line(&format!("{prefix} {message}"));
    }

    /// One status line per case
    pub fn cases(&self, report: &CampaignReport) {
        for case in &report.cases {
            let line = format!("{} ({} executions)", case.name, case.executions);
            match &case.status {
                CaseStatus::Complete => self.success(&line),
                CaseStatus::Exhausted => self.warning(&format!("{line}: no inputs left")),
                CaseStatus::BudgetSpent => self.warning(&format!("{line}: budget spent")),
                CaseStatus::Cancelled => self.warning(&format!("{line}: cancelled")),
                CaseStatus::Failed { error } => self.failure(&format!("{line}: {error}")),
                CaseStatus::Fatal { error } => {
                    self.failure(&format!("{line}: interception bug: {error}"));
                }
            }
        }
    }
}

fn state_cell(state: BranchState, use_color: bool) -> String {
    let (text, style) = match state {
        BranchState::ReachedBoth => ("both", Style::new().green()),
        BranchState::ReachedTrue => ("true only", Style::new().yellow()),
        BranchState::ReachedFalse => ("false only", Style::new().yellow()),
        BranchState::Unreached => ("unreached", Style::new().red()),
    };
    if use_color {
        style.apply_to(text).to_string()
    } else {
        text.to_string()
    }
}

/// Render a campaign report as text
#[must_use]
pub fn render_text(report: &CampaignReport, use_color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Cases");
    for case in &report.cases {
        let status = match &case.status {
            CaseStatus::Complete => "complete".to_string(),
            CaseStatus::Exhausted => "exhausted".to_string(),
            CaseStatus::BudgetSpent => "budget spent".to_string(),
            CaseStatus::Cancelled => "cancelled".to_string(),
            CaseStatus::Failed { error } => format!("failed: {error}"),
            CaseStatus::Fatal { error } => format!("fatal: {error}"),
        };
        let _ = writeln!(
            out,
            "  {:<24} {:>3} runs  {status}",
            case.name, case.executions
        );
        for (i, input) in case.inputs.iter().enumerate() {
            let assignments: Vec<String> =
                input.iter().map(|(var, value)| format!("{var} = {value}")).collect();
            let _ = writeln!(out, "      #{i}: {}", assignments.join(", "));
        }
    }

    let _ = writeln!(out, "\nBranches");
    for point in &report.branches.points {
        let label = point.label.as_deref().unwrap_or("-");
        let _ = writeln!(
            out,
            "  {}  {:<28} {:<10} (true {}, false {})",
            point.location,
            label,
            state_cell(point.state, use_color),
            point.true_hits,
            point.false_hits
        );
    }

    let summary = &report.branches.summary;
    let _ = writeln!(
        out,
        "\n{}/{} branch points complete, {:.1}% outcomes, {} executions",
        summary.complete_points, summary.total_points, summary.coverage_percent, report.executions
    );
    out
}

/// Render fixture targets with their interception under `config`
#[must_use]
pub fn render_targets(targets: &[(String, MockTarget)], config: &Config) -> String {
    let mut out = String::new();
    for (case, target) in targets {
        let how = match target.classify(&config.mock) {
            Ok(interception) => interception.to_string(),
            Err(err) => format!("unmockable ({err})"),
        };
        let _ = writeln!(out, "{case:<24} {:<28} {how}", target.name());
        for method in target.methods() {
            let marker = if method.is_interceptable() { "*" } else { " " };
            let _ = writeln!(out, "  {marker} {method}");
        }
    }
    out
}

/// Render fixture targets as JSON
pub fn render_targets_json(
    targets: &[(String, MockTarget)],
    config: &Config,
) -> serde_json::Result<String> {
    let entries: Vec<serde_json::Value> = targets
        .iter()
        .map(|(case, target)| {
            let interception = target.classify(&config.mock);
            serde_json::json!({
                "case": case,
                "target": target,
                "interception": interception.as_ref().ok(),
                "error": interception.as_ref().err().map(ToString::to_string),
            })
        })
        .collect();
    serde_json::to_string_pretty(&entries)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use concolic_mock::{fixture, BranchOracle, Campaign, EqualitySolver};

    fn fixture_report() -> CampaignReport {
        let mut campaign =
            Campaign::new(Config::default(), BranchOracle::shared(), EqualitySolver::new());
        campaign.run_all(&fixture::cases())
    }

    #[test]
    fn test_text_report_lists_cases_and_branches() {
        let text = render_text(&fixture_report(), false);
        assert!(text.contains("testFinal"));
        assert!(text.contains("a.foo() == 228"));
        assert!(text.contains("both"));
        assert!(text.contains("mock0.foo = 228"));
        assert!(text.contains("4/4 branch points complete"));
    }

    #[test]
    fn test_targets_show_interception() {
        let targets = vec![
            ("testFinal".to_string(), fixture::final_target()),
            ("testSealed".to_string(), fixture::sealed_target()),
        ];
        let text = render_targets(&targets, &Config::default());
        assert!(text.contains("call-site"));
        assert!(text.contains("unmockable"));
        assert!(text.contains("* final int foo()"));
    }

    #[test]
    fn test_targets_json() {
        let targets = vec![("testFinal".to_string(), fixture::final_target())];
        let json = render_targets_json(&targets, &Config::default()).unwrap();
        assert!(json.contains("\"interception\": \"call_site\""));
    }

    #[test]
    fn test_reporter_quiet_is_silent() {
        let reporter = Reporter::new(false, true);
        reporter.success("hidden");
        reporter.info("hidden");
        reporter.warning("hidden");
    }
}
