//! ansible-playbook command construction
//!
//! Turns plugin defaults, stage options and the deployment source root into
//! the exact argument vector handed to `ansible-playbook`. The argument order
//! is fixed and must not change between runs for the same input.

use crate::error::{Result, StageError};
use crate::options::StageOptions;
use ansibleflow_config::GlobalConfig;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Fully resolved process invocation for one stage execution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedInvocation {
    /// Executable to launch
    pub program: String,

    /// Working directory (the deployment source root)
    pub working_dir: PathBuf,

    pub playbook: PathBuf,
    pub inventory: Option<PathBuf>,
    pub vault: Option<PathBuf>,
    pub private_key: Option<PathBuf>,

    /// Arguments in the order they are passed to the program
    pub args: Vec<String>,
}

impl fmt::Display for ResolvedInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote_arg(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote_arg(arg))?;
        }
        Ok(())
    }
}

/// Quote an argument for display when it would not survive a shell split
fn quote_arg(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains(|c: char| c.is_whitespace() || c == '\'' || c == '"') {
        return arg.to_string();
    }
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// Builds [`ResolvedInvocation`]s against one deployment source root
pub struct CommandBuilder<'a> {
    config: &'a GlobalConfig,
    source_root: &'a Path,
}

impl<'a> CommandBuilder<'a> {
    pub fn new(config: &'a GlobalConfig, source_root: &'a Path) -> Self {
        Self {
            config,
            source_root,
        }
    }

    /// Build the invocation for validated stage options
    ///
    /// Fails with [`StageError::PlaybookNotFound`] when the resolved playbook
    /// does not exist, so no process is ever started for a missing playbook.
    /// A playbook path that cannot be checked is a configuration error.
    pub fn build(&self, options: &StageOptions) -> Result<ResolvedInvocation> {
        if options.playbook.is_empty() {
            return Err(StageError::Configuration("playbook is required".to_string()));
        }

        let playbook = resolve_path(self.source_root, &options.playbook);
        let exists = playbook.try_exists().map_err(|e| {
            StageError::Configuration(format!(
                "cannot access playbook {}: {}",
                playbook.display(),
                e
            ))
        })?;
        if !exists {
            return Err(StageError::PlaybookNotFound(playbook));
        }

        let mut args = vec![path_arg(&playbook)];

        let inventory = options
            .select_inventory(self.config)
            .map(|inventory| resolve_path(self.source_root, inventory));
        if let Some(ref path) = inventory {
            args.push("-i".to_string());
            args.push(path_arg(path));
        }

        if let Some(extra_vars) = render_extra_vars(&options.extra_vars) {
            args.push("--extra-vars".to_string());
            args.push(extra_vars);
        }

        if !options.tags.is_empty() {
            args.push("--tags".to_string());
            args.push(options.tags.join(","));
        }

        if !options.skip_tags.is_empty() {
            args.push("--skip-tags".to_string());
            args.push(options.skip_tags.join(","));
        }

        if let Some(limit) = options.limit() {
            args.push("--limit".to_string());
            args.push(limit.to_string());
        }

        if let Some(flag) = verbosity_flag(options.verbosity) {
            args.push(flag);
        }

        if options.check_mode {
            args.push("--check".to_string());
        }

        if options.diff_mode {
            args.push("--diff".to_string());
        }

        let vault = options
            .select_vault(self.config)
            .map(|vault| resolve_path(self.source_root, vault));
        if let Some(ref path) = vault {
            args.push("--vault-password-file".to_string());
            args.push(path_arg(path));
        }

        let private_key = options
            .private_key()
            .map(|key| resolve_path(self.source_root, key));
        if let Some(ref path) = private_key {
            args.push("--private-key".to_string());
            args.push(path_arg(path));
        }

        if let Some(user) = options.remote_user() {
            args.push("--user".to_string());
            args.push(user.to_string());
        }

        if let Some(user) = options.become_user() {
            args.push("--become".to_string());
            args.push("--become-user".to_string());
            args.push(user.to_string());
        }

        tracing::debug!("Built ansible-playbook arguments: {:?}", args);

        Ok(ResolvedInvocation {
            program: self.config.ansible_path().to_string(),
            working_dir: self.source_root.to_path_buf(),
            playbook,
            inventory,
            vault,
            private_key,
            args,
        })
    }
}

/// Resolve a stage path against the deployment source root
///
/// Relative paths land under `root`. Absolute paths are kept as they are so
/// that files outside the deployment source can still be referenced.
pub fn resolve_path(root: &Path, path: &str) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Highest verbosity ansible-playbook distinguishes (`-vvvvvv`)
pub const MAX_VERBOSITY: u32 = 6;

/// `-v` repeated `level` times as a single token, or nothing for level 0
///
/// Levels above [`MAX_VERBOSITY`] are clamped to it.
pub fn verbosity_flag(level: u32) -> Option<String> {
    if level == 0 {
        return None;
    }
    let level = level.min(MAX_VERBOSITY);
    Some(format!("-{}", "v".repeat(level as usize)))
}

/// Space-joined `key=value` pairs in key order, or nothing when empty
pub fn render_extra_vars(vars: &BTreeMap<String, String>) -> Option<String> {
    if vars.is_empty() {
        return None;
    }
    let pairs: Vec<String> = vars.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
    Some(pairs.join(" "))
}

fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
