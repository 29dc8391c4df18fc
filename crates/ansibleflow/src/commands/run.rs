use super::read_input;
use crate::console::ConsoleLogSink;
use ansibleflow_config::GlobalConfig;
use ansibleflow_executor::{AnsiblePlugin, CancellationToken, ExecuteStageRequest, StagePlugin};
use anyhow::Context;
use colored::Colorize;
use std::path::Path;

pub async fn handle(
    config: &GlobalConfig,
    source: &Path,
    stage: &str,
    stage_config: &Path,
    json: bool,
) -> anyhow::Result<()> {
    let raw = read_input(stage_config)?;
    let stage_config: serde_json::Value =
        serde_json::from_slice(&raw).context("Stage config must be JSON")?;
    let source_root = source
        .canonicalize()
        .with_context(|| format!("Deployment source not found: {}", source.display()))?;

    let request = ExecuteStageRequest {
        stage_name: stage.to_string(),
        stage_config,
        source_root,
    };

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{}", "Interrupted, stopping ansible-playbook...".yellow());
            on_signal.cancel();
        }
    });

    // JSON 出力時は stdout を結果専用にする
    let sink = ConsoleLogSink::new(json);
    let result = AnsiblePlugin::new()
        .execute_stage(&cancel, config, &request, &sink)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    }

    if result.is_success() {
        eprintln!("{}", format!("✓ Stage {} succeeded", stage).green().bold());
        Ok(())
    } else {
        eprintln!("{}", format!("✗ Stage {} failed", stage).red().bold());
        anyhow::bail!(
            "{}",
            result.error.unwrap_or_else(|| "stage failed".to_string())
        )
    }
}
