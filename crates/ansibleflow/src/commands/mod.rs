pub mod command;
pub mod pipeline;
pub mod run;
pub mod stages;

use ansibleflow_config::GlobalConfig;
use anyhow::Context;
use std::io::Read;
use std::path::Path;

/// プラグイン設定を読み込み、コマンドラインの指定で上書きする
///
/// パスを明示した場合はそのファイルが必須。指定がなければ通常の検索を行い、
/// 見つからなければデフォルト設定を使う。
pub fn load_config(
    path: Option<&Path>,
    ansible_path: Option<String>,
) -> anyhow::Result<GlobalConfig> {
    let mut config = match path {
        Some(path) => ansibleflow_config::load_config(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => ansibleflow_config::load_or_default()?,
    };

    if let Some(ansible_path) = ansible_path {
        config = config.with_ansible_path(ansible_path);
    }

    tracing::debug!(?config, "plugin config");
    Ok(config)
}

/// ファイルを読む。パスが "-" なら標準入力
pub fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    if path == Path::new("-") {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read stdin")?;
        return Ok(buf);
    }
    std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))
}
