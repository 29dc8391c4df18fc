use super::read_input;
use ansibleflow_config::GlobalConfig;
use ansibleflow_core::{CommandBuilder, StageOptions};
use colored::Colorize;
use std::path::Path;

/// ステージが実行するコマンドを実行せずに表示
pub fn handle(config: &GlobalConfig, source: &Path, stage_config: &Path) -> anyhow::Result<()> {
    let raw = read_input(stage_config)?;
    let options = StageOptions::parse_and_validate(&raw)?;
    let invocation = CommandBuilder::new(config, source).build(&options)?;

    eprintln!("{} {}", "Working directory:".bold(), invocation.working_dir.display());
    eprintln!("{} {}s", "Timeout:".bold(), options.timeout().as_secs());
    println!("{}", invocation);
    Ok(())
}
