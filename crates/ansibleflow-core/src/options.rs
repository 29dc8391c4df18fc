//! ANSIBLE_PLAYBOOK stage options
//!
//! The stage payload is a JSON object with camelCase keys. Unknown keys are
//! ignored and missing keys take their empty value. Optional path and user
//! fields are `Option`s. An absent or empty `inventory` or `vault` falls back
//! to the plugin default; the other optional fields have no default and an
//! empty value means the flag is omitted.

use crate::error::{Result, StageError};
use ansibleflow_config::GlobalConfig;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Timeout applied when the stage does not set a positive one
pub const DEFAULT_TIMEOUT_SECS: i64 = 600;

/// Options of one ANSIBLE_PLAYBOOK stage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageOptions {
    /// Entry playbook, relative to the deployment source root
    #[serde(default)]
    pub playbook: String,

    /// Inventory override
    #[serde(default)]
    pub inventory: Option<String>,

    /// Variables passed with `--extra-vars`, kept sorted by key
    #[serde(default)]
    pub extra_vars: BTreeMap<String, String>,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub skip_tags: Vec<String>,

    /// Host pattern passed with `--limit`
    #[serde(default)]
    pub limit: Option<String>,

    #[serde(default)]
    pub verbosity: u32,

    #[serde(default)]
    pub check_mode: bool,

    #[serde(default)]
    pub diff_mode: bool,

    /// Vault password file override
    #[serde(default)]
    pub vault: Option<String>,

    #[serde(default)]
    pub private_key: Option<String>,

    #[serde(default)]
    pub remote_user: Option<String>,

    #[serde(default)]
    pub become_user: Option<String>,

    /// Timeout in seconds; `<= 0` becomes [`DEFAULT_TIMEOUT_SECS`] on validation
    #[serde(default)]
    pub timeout: i64,
}

impl StageOptions {
    pub fn new(playbook: impl Into<String>) -> Self {
        Self {
            playbook: playbook.into(),
            ..Default::default()
        }
    }

    /// Deserialize a raw stage payload without validating it
    pub fn parse(raw: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(raw)?)
    }

    /// Deserialize a raw stage payload and validate it
    pub fn parse_and_validate(raw: &[u8]) -> Result<Self> {
        let mut options = Self::parse(raw)?;
        options.validate()?;
        Ok(options)
    }

    /// Same as [`StageOptions::parse_and_validate`] for an already decoded payload
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        let mut options: Self = serde_json::from_value(value)?;
        options.validate()?;
        Ok(options)
    }

    /// Check required fields and normalize the timeout
    ///
    /// Idempotent: validating normalized options changes nothing.
    pub fn validate(&mut self) -> Result<()> {
        if self.playbook.is_empty() {
            return Err(StageError::Configuration("playbook is required".to_string()));
        }
        if self.timeout <= 0 {
            self.timeout = DEFAULT_TIMEOUT_SECS;
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        let secs = if self.timeout > 0 {
            self.timeout
        } else {
            DEFAULT_TIMEOUT_SECS
        };
        Duration::from_secs(secs as u64)
    }

    /// Inventory to pass: the stage override if present, else the plugin default
    pub fn select_inventory<'a>(&'a self, config: &'a GlobalConfig) -> Option<&'a str> {
        select_override(self.inventory.as_deref(), config.default_inventory())
    }

    /// Vault password file to pass: the stage override if present, else the plugin default
    pub fn select_vault<'a>(&'a self, config: &'a GlobalConfig) -> Option<&'a str> {
        select_override(self.vault.as_deref(), config.default_vault())
    }

    pub fn limit(&self) -> Option<&str> {
        non_empty(self.limit.as_deref())
    }

    pub fn private_key(&self) -> Option<&str> {
        non_empty(self.private_key.as_deref())
    }

    pub fn remote_user(&self) -> Option<&str> {
        non_empty(self.remote_user.as_deref())
    }

    pub fn become_user(&self) -> Option<&str> {
        non_empty(self.become_user.as_deref())
    }
}

fn select_override<'a>(stage: Option<&'a str>, default: Option<&'a str>) -> Option<&'a str> {
    non_empty(stage).or(default)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_options() {
        let mut opts = StageOptions {
            playbook: "playbook.yml".to_string(),
            timeout: 300,
            ..Default::default()
        };
        assert!(opts.validate().is_ok());
        assert_eq!(opts.timeout, 300);
    }

    #[test]
    fn test_validate_missing_playbook() {
        let mut opts = StageOptions {
            timeout: 300,
            ..Default::default()
        };
        let err = opts.validate().unwrap_err();
        assert!(matches!(err, StageError::Configuration(_)));
    }

    #[test]
    fn test_validate_sets_default_timeout() {
        for timeout in [0, -1, -600] {
            let mut opts = StageOptions {
                playbook: "playbook.yml".to_string(),
                timeout,
                ..Default::default()
            };
            opts.validate().unwrap();
            assert_eq!(opts.timeout, DEFAULT_TIMEOUT_SECS);
            assert_eq!(opts.timeout(), Duration::from_secs(600));
        }
    }

    #[test]
    fn test_validate_is_idempotent() {
        let mut opts = StageOptions::new("site.yml");
        opts.validate().unwrap();
        let once = opts.clone();
        opts.validate().unwrap();
        assert_eq!(opts, once);
    }

    #[test]
    fn test_parse_payload() {
        let json = br#"{
            "playbook": "deploy.yml",
            "inventory": "hosts",
            "extraVars": {
                "env": "production",
                "version": "1.0.0"
            },
            "tags": ["deploy", "configure"],
            "verbosity": 2,
            "checkMode": true
        }"#;

        let opts = StageOptions::parse_and_validate(json).unwrap();
        assert_eq!(opts.playbook, "deploy.yml");
        assert_eq!(opts.inventory.as_deref(), Some("hosts"));
        assert_eq!(opts.extra_vars.get("env").map(String::as_str), Some("production"));
        assert_eq!(opts.extra_vars.get("version").map(String::as_str), Some("1.0.0"));
        assert_eq!(opts.tags, vec!["deploy", "configure"]);
        assert_eq!(opts.verbosity, 2);
        assert!(opts.check_mode);
        assert!(!opts.diff_mode);
        assert_eq!(opts.timeout, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_parse_ignores_unknown_fields() {
        let opts =
            StageOptions::parse_and_validate(br#"{"playbook": "site.yml", "forks": 20}"#).unwrap();
        assert_eq!(opts.playbook, "site.yml");
    }

    #[test]
    fn test_parse_missing_playbook() {
        let err = StageOptions::parse_and_validate(br#"{"inventory": "hosts"}"#).unwrap_err();
        assert!(matches!(err, StageError::Configuration(_)));

        let err = StageOptions::parse_and_validate(br#"{"playbook": ""}"#).unwrap_err();
        assert!(matches!(err, StageError::Configuration(_)));
    }

    #[test]
    fn test_parse_malformed_payload() {
        let payloads: [&[u8]; 3] = [
            b"not json",
            b"",
            br#"{"playbook": "a.yml", "verbosity": -1}"#,
        ];
        for raw in payloads {
            let err = StageOptions::parse_and_validate(raw).unwrap_err();
            assert!(matches!(err, StageError::Configuration(_)), "{:?}", err);
        }
    }

    #[test]
    fn test_stage_override_beats_default() {
        let config = GlobalConfig::new()
            .with_inventory("default-hosts")
            .with_vault("default-vault");
        let opts = StageOptions {
            inventory: Some("stage-hosts".to_string()),
            vault: Some("stage-vault".to_string()),
            ..StageOptions::new("site.yml")
        };

        assert_eq!(opts.select_inventory(&config), Some("stage-hosts"));
        assert_eq!(opts.select_vault(&config), Some("stage-vault"));
    }

    #[test]
    fn test_absent_uses_default() {
        let config = GlobalConfig::new()
            .with_inventory("default-hosts")
            .with_vault("default-vault");
        let opts = StageOptions::new("site.yml");

        assert_eq!(opts.select_inventory(&config), Some("default-hosts"));
        assert_eq!(opts.select_vault(&config), Some("default-vault"));
    }

    #[test]
    fn test_explicit_empty_falls_back_to_default() {
        let config = GlobalConfig::new()
            .with_inventory("default-hosts")
            .with_vault("default-vault");
        let opts = StageOptions::parse_and_validate(
            br#"{"playbook": "site.yml", "inventory": "", "vault": ""}"#,
        )
        .unwrap();

        assert_eq!(opts.select_inventory(&config), Some("default-hosts"));
        assert_eq!(opts.select_vault(&config), Some("default-vault"));
    }

    #[test]
    fn test_explicit_empty_without_default() {
        let opts = StageOptions::parse_and_validate(
            br#"{"playbook": "site.yml", "inventory": "", "vault": ""}"#,
        )
        .unwrap();

        assert_eq!(opts.select_inventory(&GlobalConfig::default()), None);
        assert_eq!(opts.select_vault(&GlobalConfig::default()), None);
    }

    #[test]
    fn test_empty_optional_strings_are_absent() {
        let opts = StageOptions {
            limit: Some(String::new()),
            private_key: Some(String::new()),
            remote_user: Some(String::new()),
            become_user: Some(String::new()),
            ..StageOptions::new("site.yml")
        };
        assert_eq!(opts.limit(), None);
        assert_eq!(opts.private_key(), None);
        assert_eq!(opts.remote_user(), None);
        assert_eq!(opts.become_user(), None);
    }
}
