//! Subcommand implementations

use crate::commands::{ConfigArgs, ReportFormat, RunArgs, TargetsArgs};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::{render_targets, render_targets_json, render_text, Reporter};
use concolic_mock::{
    fixture, BranchOracle, Campaign, CampaignReport, Config, EqualitySolver, TestCase,
};
use std::fs;

/// Fixture cases selected by name; every regular case when `names` is empty
pub fn select_cases(names: &[String]) -> CliResult<Vec<TestCase>> {
    if names.is_empty() {
        return Ok(fixture::cases());
    }
    names
        .iter()
        .map(|name| {
            fixture::find(name)
                .ok_or_else(|| CliError::invalid_argument(format!("unknown case `{name}`")))
        })
        .collect()
}

/// Run a campaign over `cases`
#[must_use]
pub fn run_campaign(config: &CliConfig, cases: &[TestCase]) -> CampaignReport {
    let mut campaign = Campaign::new(
        config.settings.clone(),
        BranchOracle::shared(),
        EqualitySolver::new(),
    );
    campaign.run_all(cases)
}

/// `cmock run`
pub fn run(config: &CliConfig, args: &RunArgs) -> CliResult<()> {
    config.settings.validate()?;
    let reporter = Reporter::new(config.color.should_color(), config.verbosity.is_quiet());
    let cases = select_cases(&args.cases)?;
    if let Some(source) = &config.source {
        reporter.info(&format!("using {}", source.display()));
    }

    tracing::debug!(
        cases = cases.len(),
        workers = config.settings.campaign.workers,
        "starting campaign"
    );
    let report = run_campaign(config, &cases);
    reporter.cases(&report);

    let rendered = match args.format {
        ReportFormat::Text => {
            let use_color = config.color.should_color() && args.output.is_none();
            render_text(&report, use_color)
        }
        ReportFormat::Json => report.to_json()?,
    };
    match &args.output {
        Some(path) => {
            fs::write(path, rendered)?;
            reporter.info(&format!("report written to {}", path.display()));
        }
        None => {
            if !config.verbosity.is_quiet() || args.format == ReportFormat::Json {
                print!("{rendered}");
            }
        }
    }

    if report.is_success() {
        Ok(())
    } else {
        let uncovered = report
            .cases
            .iter()
            .filter(|c| !c.status.is_complete())
            .count();
        Err(CliError::incomplete(format!(
            "{uncovered} of {} cases not covered",
            report.cases.len()
        )))
    }
}

/// `cmock targets`
pub fn targets(config: &CliConfig, args: &TargetsArgs) -> CliResult<()> {
    let targets: Vec<_> = fixture::cases()
        .into_iter()
        .chain(std::iter::once(fixture::sealed_case()))
        .flat_map(|case| {
            let name = case.name;
            case.targets.into_iter().map(move |t| (name.clone(), t))
        })
        .collect();
    let rendered = match args.format {
        ReportFormat::Text => render_targets(&targets, &config.settings),
        ReportFormat::Json => render_targets_json(&targets, &config.settings)
            .map_err(|e| CliError::config(e.to_string()))?,
    };
    print!("{rendered}");
    Ok(())
}

/// `cmock config`
pub fn show_config(config: &CliConfig, args: &ConfigArgs) -> CliResult<()> {
    let settings = if args.defaults {
        Config::default()
    } else {
        config.settings.clone()
    };
    print!("{}", settings.to_yaml()?);
    Ok(())
}
