//! Mocking and campaign configuration
//!
//! Loaded from a YAML file (`cmock.yaml` by convention) with every field
//! optional:
//!
//! ```yaml
//! mock:
//!   enabled: true
//!   mode: full
//!   call_site_rewrite: true
//! campaign:
//!   max_executions: 64
//!   workers: 0
//!   batch_size: 4
//! ```

use crate::result::{MockError, MockResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Which targets are substituted with mocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MockingMode {
    /// Mock only types that cannot be instantiated (interfaces, abstract classes)
    Basic,
    /// Mock every mockable type
    #[default]
    Full,
}

/// Mock provider configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MockConfig {
    /// Master switch for mock creation
    pub enabled: bool,
    /// Mocking policy
    pub mode: MockingMode,
    /// Allow call-boundary rewriting for `final` classes and methods
    pub call_site_rewrite: bool,
}

impl MockConfig {
    /// Create a builder for mock config
    #[must_use]
    pub fn builder() -> MockConfigBuilder {
        MockConfigBuilder::default()
    }
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            mode: MockingMode::Full,
            call_site_rewrite: true,
        }
    }
}

/// Builder for mock configuration
#[derive(Debug)]
pub struct MockConfigBuilder {
    config: MockConfig,
}

impl Default for MockConfigBuilder {
    fn default() -> Self {
        Self {
            config: MockConfig::default(),
        }
    }
}

impl MockConfigBuilder {
    /// Enable or disable mocking
    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.config.enabled = enabled;
        self
    }

    /// Set the mocking mode
    #[must_use]
    pub fn mode(mut self, mode: MockingMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Allow or forbid call-site rewriting
    #[must_use]
    pub fn call_site_rewrite(mut self, enabled: bool) -> Self {
        self.config.call_site_rewrite = enabled;
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> MockConfig {
        self.config
    }
}

/// Exploration campaign configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignConfig {
    /// Upper bound on concrete executions per test case
    pub max_executions: usize,
    /// Worker threads (0 = available parallelism)
    pub workers: usize,
    /// Models handed to the worker pool per scheduling round
    pub batch_size: usize,
    /// Stop a case as soon as all of its branch points are complete
    pub stop_when_complete: bool,
}

impl CampaignConfig {
    /// Create a builder for campaign config
    #[must_use]
    pub fn builder() -> CampaignConfigBuilder {
        CampaignConfigBuilder::default()
    }

    /// Effective number of worker threads
    #[must_use]
    pub fn effective_workers(&self) -> usize {
        if self.workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.workers
        }
    }
}

impl Default for CampaignConfig {
    fn default() -> Self {
        Self {
            max_executions: 64,
            workers: 1,
            batch_size: 4,
            stop_when_complete: true,
        }
    }
}

/// Builder for campaign configuration
#[derive(Debug)]
pub struct CampaignConfigBuilder {
    config: CampaignConfig,
}

impl Default for CampaignConfigBuilder {
    fn default() -> Self {
        Self {
            config: CampaignConfig::default(),
        }
    }
}

impl CampaignConfigBuilder {
    /// Set the execution budget
    #[must_use]
    pub fn max_executions(mut self, max: usize) -> Self {
        self.config.max_executions = max;
        self
    }

    /// Set the worker count
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.config.workers = workers;
        self
    }

    /// Set the scheduling batch size
    #[must_use]
    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    /// Keep exploring after every branch point is complete
    #[must_use]
    pub fn stop_when_complete(mut self, stop: bool) -> Self {
        self.config.stop_when_complete = stop;
        self
    }

    /// Build the configuration
    #[must_use]
    pub fn build(self) -> CampaignConfig {
        let mut config = self.config;
        if config.batch_size == 0 {
            config.batch_size = 1;
        }
        config
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Mock provider settings
    pub mock: MockConfig,
    /// Campaign settings
    pub campaign: CampaignConfig,
}

impl Config {
    /// Parse configuration from YAML text
    pub fn from_yaml(yaml: &str) -> MockResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> MockResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    /// Render configuration as YAML
    pub fn to_yaml(&self) -> MockResult<String> {
        Ok(serde_yaml_ng::to_string(self)?)
    }

    /// Reject settings no campaign can run with
    pub fn validate(&self) -> MockResult<()> {
        if self.campaign.max_executions == 0 {
            return Err(MockError::config("campaign.max_executions must be positive"));
        }
        if self.campaign.batch_size == 0 {
            return Err(MockError::config("campaign.batch_size must be positive"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.mock.enabled);
        assert_eq!(config.mock.mode, MockingMode::Full);
        assert!(config.mock.call_site_rewrite);
        assert_eq!(config.campaign.max_executions, 64);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = Config::from_yaml("mock:\n  mode: basic\n").unwrap();
        assert_eq!(config.mock.mode, MockingMode::Basic);
        assert!(config.mock.enabled);
        assert_eq!(config.campaign, CampaignConfig::default());
    }

    #[test]
    fn test_zero_budget_rejected() {
        let err = Config::from_yaml("campaign:\n  max_executions: 0\n").unwrap_err();
        assert!(matches!(err, MockError::Config { .. }));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = Config::from_yaml("mock: [").unwrap_err();
        assert!(matches!(err, MockError::Yaml(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "campaign:\n  workers: 3\n  batch_size: 2").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.campaign.workers, 3);
        assert_eq!(config.campaign.batch_size, 2);
    }

    #[test]
    fn test_yaml_round_trip_is_stable() {
        let config = Config {
            mock: MockConfig::builder().call_site_rewrite(false).build(),
            campaign: CampaignConfig::builder().max_executions(8).build(),
        };
        let parsed = Config::from_yaml(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_builder_clamps_batch_size() {
        let config = CampaignConfig::builder().batch_size(0).build();
        assert_eq!(config.batch_size, 1);
    }

    #[test]
    fn test_effective_workers_auto() {
        let config = CampaignConfig::builder().workers(0).build();
        assert!(config.effective_workers() >= 1);
    }
}
