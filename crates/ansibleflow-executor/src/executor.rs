//! ANSIBLE_PLAYBOOK stage executor
//!
//! Validation, command construction, process execution and status mapping for
//! one stage. Every failure ends up as an error line in the log sink and a
//! [`StageStatus::Failure`](ansibleflow_core::StageStatus) result; nothing is
//! retried.

use crate::log::LogSink;
use crate::runner::{ProcessRunner, TokioProcessRunner};
use ansibleflow_config::GlobalConfig;
use ansibleflow_core::{CommandBuilder, Result, StageError, StageOptions, StageResult};
use std::path::Path;
use tokio_util::sync::CancellationToken;

/// Runs ANSIBLE_PLAYBOOK stages through a [`ProcessRunner`]
pub struct StageExecutor<R = TokioProcessRunner> {
    runner: R,
}

impl StageExecutor<TokioProcessRunner> {
    pub fn new() -> Self {
        Self {
            runner: TokioProcessRunner::new(),
        }
    }
}

impl Default for StageExecutor<TokioProcessRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ProcessRunner> StageExecutor<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Parse a raw stage payload and execute it
    pub async fn execute_raw(
        &self,
        cancel: &CancellationToken,
        config: &GlobalConfig,
        raw: &[u8],
        source_root: &Path,
        sink: &dyn LogSink,
    ) -> StageResult {
        match StageOptions::parse_and_validate(raw) {
            Ok(options) => {
                self.execute(cancel, config, &options, source_root, sink)
                    .await
            }
            Err(e) => report(&e, sink),
        }
    }

    /// Same as [`StageExecutor::execute_raw`] for an already decoded payload
    pub async fn execute_value(
        &self,
        cancel: &CancellationToken,
        config: &GlobalConfig,
        value: serde_json::Value,
        source_root: &Path,
        sink: &dyn LogSink,
    ) -> StageResult {
        match StageOptions::from_value(value) {
            Ok(options) => {
                self.execute(cancel, config, &options, source_root, sink)
                    .await
            }
            Err(e) => report(&e, sink),
        }
    }

    /// Execute one stage and map the outcome to a [`StageResult`]
    pub async fn execute(
        &self,
        cancel: &CancellationToken,
        config: &GlobalConfig,
        options: &StageOptions,
        source_root: &Path,
        sink: &dyn LogSink,
    ) -> StageResult {
        match self
            .try_execute(cancel, config, options, source_root, sink)
            .await
        {
            Ok(()) => {
                sink.info("Ansible playbook executed successfully");
                StageResult::success()
            }
            Err(e) => report(&e, sink),
        }
    }

    /// Execute one stage, keeping the typed error
    ///
    /// Nothing is written to the sink for the final outcome; callers decide
    /// how to report it.
    pub async fn try_execute(
        &self,
        cancel: &CancellationToken,
        config: &GlobalConfig,
        options: &StageOptions,
        source_root: &Path,
        sink: &dyn LogSink,
    ) -> Result<()> {
        let mut options = options.clone();
        options.validate()?;

        let invocation = CommandBuilder::new(config, source_root).build(&options)?;

        sink.info(&format!("Executing ansible-playbook command: {}", invocation));
        tracing::info!(
            playbook = %invocation.playbook.display(),
            timeout_secs = options.timeout().as_secs(),
            "running ansible-playbook"
        );

        let exit = self
            .runner
            .run(&invocation, options.timeout(), cancel, sink)
            .await?;

        if !exit.success() {
            return Err(StageError::ProcessFailed { code: exit.code });
        }
        Ok(())
    }
}

/// Log `e` at error level and turn it into a failed result
fn report(e: &StageError, sink: &dyn LogSink) -> StageResult {
    let message = if e.is_pre_launch() {
        e.to_string()
    } else {
        format!("Failed to execute ansible-playbook: {}", e)
    };
    tracing::error!("{}", message);
    sink.error(&message);
    StageResult::from(e)
}
