use super::read_input;
use ansibleflow_core::StageRequest;
use ansibleflow_executor::{AnsiblePlugin, StagePlugin};
use anyhow::Context;
use std::path::Path;

pub fn handle(request: &Path) -> anyhow::Result<()> {
    let raw = read_input(request)?;
    let requests: Vec<StageRequest> =
        serde_json::from_slice(&raw).context("Request must be a JSON list of {index, name}")?;

    let stages = AnsiblePlugin::new().build_pipeline_sync_stages(&requests);
    println!("{}", serde_json::to_string_pretty(&stages)?);
    Ok(())
}
