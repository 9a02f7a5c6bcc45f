/*!
 * Harness Settings
 *
 * Environment-driven configuration shared by every session in the process.
 *
 * | variable                        | default                     |
 * |---------------------------------|-----------------------------|
 * | `HARNESS_GAME_DIR`              | `<tmp>/readiness/gamedir`   |
 * | `HARNESS_SHUTDOWN_ON_SUCCESS`   | `true`                      |
 * | `HARNESS_SHUTDOWN_ON_FAILURE`   | `true`                      |
 * | `HARNESS_SHUTDOWN_ON_ERROR`     | `true`                      |
 * | `HARNESS_STARTUP_TIMEOUT_SECS`  | `300` (`0` = no timeout)    |
 * | `HARNESS_DUPLICATE_POLICY`      | `ignore`                    |
 */

use crate::core::errors::HarnessError;
use crate::core::timeout::TimeoutPolicy;
use crate::core::types::{DuplicatePolicy, HarnessResult};
use std::path::PathBuf;
use std::time::Duration;

pub const GAME_DIR_VAR: &str = "HARNESS_GAME_DIR";
pub const SHUTDOWN_ON_SUCCESS_VAR: &str = "HARNESS_SHUTDOWN_ON_SUCCESS";
pub const SHUTDOWN_ON_FAILURE_VAR: &str = "HARNESS_SHUTDOWN_ON_FAILURE";
pub const SHUTDOWN_ON_ERROR_VAR: &str = "HARNESS_SHUTDOWN_ON_ERROR";
pub const STARTUP_TIMEOUT_VAR: &str = "HARNESS_STARTUP_TIMEOUT_SECS";
pub const DUPLICATE_POLICY_VAR: &str = "HARNESS_DUPLICATE_POLICY";

/// Harness configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessSettings {
    /// Base directory the launched client runs in
    pub game_dir: PathBuf,
    /// Close the client automatically when every test passed
    pub shutdown_on_success: bool,
    /// Close the client automatically when a test failed
    pub shutdown_on_failure: bool,
    /// Close the client automatically when the run aborted
    pub shutdown_on_error: bool,
    /// Bound on waiting for `loader-ready`
    pub startup_timeout: TimeoutPolicy,
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for HarnessSettings {
    fn default() -> Self {
        Self {
            game_dir: std::env::temp_dir().join("readiness").join("gamedir"),
            shutdown_on_success: true,
            shutdown_on_failure: true,
            shutdown_on_error: true,
            startup_timeout: TimeoutPolicy::default_startup(),
            duplicate_policy: DuplicatePolicy::default(),
        }
    }
}

impl HarnessSettings {
    /// Read settings from the process environment
    pub fn from_env() -> HarnessResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> HarnessResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut settings = Self::default();

        if let Some(dir) = lookup(GAME_DIR_VAR).filter(|d| !d.trim().is_empty()) {
            settings.game_dir = PathBuf::from(dir);
        }
        if let Some(value) = lookup(SHUTDOWN_ON_SUCCESS_VAR) {
            settings.shutdown_on_success = parse_bool(SHUTDOWN_ON_SUCCESS_VAR, &value)?;
        }
        if let Some(value) = lookup(SHUTDOWN_ON_FAILURE_VAR) {
            settings.shutdown_on_failure = parse_bool(SHUTDOWN_ON_FAILURE_VAR, &value)?;
        }
        if let Some(value) = lookup(SHUTDOWN_ON_ERROR_VAR) {
            settings.shutdown_on_error = parse_bool(SHUTDOWN_ON_ERROR_VAR, &value)?;
        }
        if let Some(value) = lookup(STARTUP_TIMEOUT_VAR) {
            let secs: u64 = value
                .trim()
                .parse()
                .map_err(|_| invalid(STARTUP_TIMEOUT_VAR, &value))?;
            settings.startup_timeout = if secs == 0 {
                TimeoutPolicy::None
            } else {
                TimeoutPolicy::Startup(Duration::from_secs(secs))
            };
        }
        if let Some(value) = lookup(DUPLICATE_POLICY_VAR) {
            settings.duplicate_policy =
                DuplicatePolicy::parse(&value).ok_or_else(|| invalid(DUPLICATE_POLICY_VAR, &value))?;
        }

        Ok(settings)
    }

    /// Settings that keep the client open after any outcome
    pub fn interactive() -> Self {
        Self {
            shutdown_on_success: false,
            shutdown_on_failure: false,
            shutdown_on_error: false,
            ..Self::default()
        }
    }

    pub fn with_startup_timeout(mut self, timeout: TimeoutPolicy) -> Self {
        self.startup_timeout = timeout;
        self
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }
}

fn parse_bool(key: &str, value: &str) -> HarnessResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "0" | "false" | "no" => Ok(false),
        _ => Err(invalid(key, value)),
    }
}

fn invalid(key: &str, value: &str) -> HarnessError {
    HarnessError::Configuration {
        key: key.to_string(),
        value: value.to_string(),
    }
}
