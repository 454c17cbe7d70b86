//! Scheduler configuration.
//!
//! Load trial-engine settings from TOML so runs can be tuned without
//! code changes.
//!
//! # Examples
//!
//! ```
//! use u_assign::config::{IncompletePolicy, SchedulerConfig};
//! use std::time::Duration;
//!
//! let config = SchedulerConfig::from_toml_str(r#"
//!     order = 2000
//!     random_seed = 42
//!     allow_incomplete = "forbid"
//!     time_limit_secs = 30
//! "#).unwrap();
//!
//! assert_eq!(config.order, 2000);
//! assert_eq!(config.allow_incomplete, IncompletePolicy::Forbid);
//! assert_eq!(config.time_limit(), Some(Duration::from_secs(30)));
//! ```
//!
//! Use defaults when the file is missing:
//!
//! ```
//! use u_assign::config::SchedulerConfig;
//!
//! let config = SchedulerConfig::load("assign.toml").unwrap_or_default();
//! assert_eq!(config.order, 10_000);
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of trials per variant.
pub const DEFAULT_ORDER: usize = 10_000;

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// What to do with a task nobody can take.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncompletePolicy {
    /// Close the task unfilled and keep going.
    Allow,
    /// Fail the trial.
    Forbid,
    /// `Allow` when there are fewer people than tasks, otherwise `Forbid`.
    /// Resolved separately for each variant.
    #[default]
    Standard,
}

impl IncompletePolicy {
    /// Resolves the policy for a table of the given `(people, tasks)` shape.
    ///
    /// Returns `true` when unfillable tasks may be left open.
    pub fn allows_incomplete(self, shape: (usize, usize)) -> bool {
        match self {
            IncompletePolicy::Allow => true,
            IncompletePolicy::Forbid => false,
            IncompletePolicy::Standard => shape.0 < shape.1,
        }
    }
}

impl std::str::FromStr for IncompletePolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "allow" | "true" => Ok(IncompletePolicy::Allow),
            "forbid" | "false" => Ok(IncompletePolicy::Forbid),
            "standard" => Ok(IncompletePolicy::Standard),
            other => Err(ConfigError::Invalid(format!(
                "unknown incomplete policy '{other}' (expected allow, forbid or standard)"
            ))),
        }
    }
}

/// Trial engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct SchedulerConfig {
    /// Trials per variant.
    pub order: usize,

    /// Random seed for reproducible runs. `None` draws one per run.
    pub random_seed: Option<u64>,

    /// Policy for unfillable tasks.
    pub allow_incomplete: IncompletePolicy,

    /// Run trials on the rayon thread pool.
    pub parallel: bool,

    /// Stop starting new trials after this many seconds.
    pub time_limit_secs: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
            random_seed: None,
            allow_incomplete: IncompletePolicy::Standard,
            parallel: false,
            time_limit_secs: None,
        }
    }
}

impl SchedulerConfig {
    /// Creates a default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist or contains invalid TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        Self::from_toml_file(path)
    }

    /// Loads configuration from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Sets the number of trials per variant.
    pub fn with_order(mut self, order: usize) -> Self {
        self.order = order;
        self
    }

    /// Sets the random seed.
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    /// Sets the incomplete-assignment policy.
    pub fn with_policy(mut self, policy: IncompletePolicy) -> Self {
        self.allow_incomplete = policy;
        self
    }

    /// Enables or disables parallel trials.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Sets the deadline for the trial loop.
    pub fn with_time_limit(mut self, seconds: u64) -> Self {
        self.time_limit_secs = Some(seconds);
        self
    }

    /// Returns the trial-loop deadline, if configured.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SchedulerConfig::default();
        assert_eq!(config.order, 10_000);
        assert_eq!(config.random_seed, None);
        assert_eq!(config.allow_incomplete, IncompletePolicy::Standard);
        assert!(!config.parallel);
        assert_eq!(config.time_limit(), None);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SchedulerConfig::from_toml_str("random_seed = 7").unwrap();
        assert_eq!(config.random_seed, Some(7));
        assert_eq!(config.order, DEFAULT_ORDER);
    }

    #[test]
    fn test_invalid_toml() {
        let err = SchedulerConfig::from_toml_str("allow_incomplete = \"sometimes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = SchedulerConfig::load("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_builders() {
        let config = SchedulerConfig::new()
            .with_order(50)
            .with_random_seed(9)
            .with_policy(IncompletePolicy::Allow)
            .with_parallel(true)
            .with_time_limit(3);
        assert_eq!(config.order, 50);
        assert_eq!(config.random_seed, Some(9));
        assert_eq!(config.allow_incomplete, IncompletePolicy::Allow);
        assert!(config.parallel);
        assert_eq!(config.time_limit(), Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_policy_resolution() {
        assert!(IncompletePolicy::Allow.allows_incomplete((5, 3)));
        assert!(!IncompletePolicy::Forbid.allows_incomplete((3, 5)));
        // Standard: fewer people than tasks → allow
        assert!(IncompletePolicy::Standard.allows_incomplete((3, 5)));
        assert!(!IncompletePolicy::Standard.allows_incomplete((5, 5)));
        assert!(!IncompletePolicy::Standard.allows_incomplete((6, 5)));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("allow".parse::<IncompletePolicy>().unwrap(), IncompletePolicy::Allow);
        assert_eq!("False".parse::<IncompletePolicy>().unwrap(), IncompletePolicy::Forbid);
        assert_eq!(
            "standard".parse::<IncompletePolicy>().unwrap(),
            IncompletePolicy::Standard
        );
        assert!("maybe".parse::<IncompletePolicy>().is_err());
    }
}
