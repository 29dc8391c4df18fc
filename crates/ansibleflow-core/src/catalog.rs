//! Stage catalog and pipeline assembly

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Stage kind that runs `ansible-playbook`
pub const STAGE_ANSIBLE_PLAYBOOK: &str = "ANSIBLE_PLAYBOOK";

/// Stage kinds this plugin can execute
pub fn fetch_defined_stages() -> Vec<&'static str> {
    vec![STAGE_ANSIBLE_PLAYBOOK]
}

/// A stage requested by the pipeline definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageRequest {
    pub index: i32,
    pub name: String,
}

/// Manual operation offered to users on a running stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManualOperation {
    #[default]
    None,
    Approve,
    Skip,
}

/// A stage in the assembled pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStage {
    pub index: i32,
    pub name: String,
    pub rollback: bool,
    pub metadata: HashMap<String, String>,
    pub available_operation: ManualOperation,
}

/// Build the sync pipeline, one stage per request, order preserved
pub fn build_pipeline_sync_stages(requests: &[StageRequest]) -> Vec<PipelineStage> {
    requests
        .iter()
        .map(|request| PipelineStage {
            index: request.index,
            name: request.name.clone(),
            rollback: false,
            metadata: HashMap::new(),
            available_operation: ManualOperation::None,
        })
        .collect()
}
