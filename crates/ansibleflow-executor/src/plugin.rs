//! Stage plugin contract expected by the pipeline host

use crate::executor::StageExecutor;
use crate::log::LogSink;
use crate::runner::{ProcessRunner, TokioProcessRunner};
use ansibleflow_config::GlobalConfig;
use ansibleflow_core::{
    PipelineStage, Result, STAGE_ANSIBLE_PLAYBOOK, StageError, StageRequest, StageResult,
    build_pipeline_sync_stages, fetch_defined_stages,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

/// Request to execute one stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteStageRequest {
    /// Stage kind, e.g. `ANSIBLE_PLAYBOOK`
    pub stage_name: String,

    /// Raw stage configuration payload
    #[serde(default)]
    pub stage_config: serde_json::Value,

    /// Deployment source root all stage paths are resolved against
    pub source_root: PathBuf,
}

/// A pluggable stage implementation
///
/// The host discovers stage kinds with `fetch_defined_stages`, asks the plugin
/// to assemble pipelines, and calls `execute_stage` once per stage run.
#[async_trait]
pub trait StagePlugin: Send + Sync {
    fn fetch_defined_stages(&self) -> Vec<&'static str>;

    fn build_pipeline_sync_stages(&self, requests: &[StageRequest]) -> Vec<PipelineStage>;

    /// Execute a stage
    ///
    /// Stage failures come back as a failed [`StageResult`]; `Err` is
    /// reserved for requests the plugin cannot handle at all.
    async fn execute_stage(
        &self,
        cancel: &CancellationToken,
        config: &GlobalConfig,
        request: &ExecuteStageRequest,
        sink: &dyn LogSink,
    ) -> Result<StageResult>;
}

/// The ANSIBLE_PLAYBOOK stage plugin
pub struct AnsiblePlugin<R = TokioProcessRunner> {
    executor: StageExecutor<R>,
}

impl AnsiblePlugin<TokioProcessRunner> {
    pub fn new() -> Self {
        Self {
            executor: StageExecutor::new(),
        }
    }
}

impl Default for AnsiblePlugin<TokioProcessRunner> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ProcessRunner> AnsiblePlugin<R> {
    pub fn with_executor(executor: StageExecutor<R>) -> Self {
        Self { executor }
    }
}

#[async_trait]
impl<R: ProcessRunner> StagePlugin for AnsiblePlugin<R> {
    fn fetch_defined_stages(&self) -> Vec<&'static str> {
        fetch_defined_stages()
    }

    fn build_pipeline_sync_stages(&self, requests: &[StageRequest]) -> Vec<PipelineStage> {
        build_pipeline_sync_stages(requests)
    }

    async fn execute_stage(
        &self,
        cancel: &CancellationToken,
        config: &GlobalConfig,
        request: &ExecuteStageRequest,
        sink: &dyn LogSink,
    ) -> Result<StageResult> {
        match request.stage_name.as_str() {
            STAGE_ANSIBLE_PLAYBOOK => Ok(self
                .executor
                .execute_value(
                    cancel,
                    config,
                    request.stage_config.clone(),
                    &request.source_root,
                    sink,
                )
                .await),
            other => Err(StageError::UnsupportedStage(other.to_string())),
        }
    }
}
