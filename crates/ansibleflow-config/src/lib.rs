//! ansibleflow のプラグイン設定
//!
//! ステージが上書きしなかった場合に使うデフォルト値を保持する。
//! 対象は `ansible-playbook` の実行ファイル、デフォルトのインベントリ、
//! デフォルトの vault パスワードファイル。

pub mod error;

pub use error::*;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 設定で指定がない場合に使う実行ファイル
pub const DEFAULT_ANSIBLE_PATH: &str = "ansible-playbook";

/// 設定ファイルを直接指定する環境変数
pub const CONFIG_PATH_ENV: &str = "ANSIBLEFLOW_CONFIG";

const CANDIDATES: [&str; 4] = [
    "ansibleflow.local.yaml",
    "ansibleflow.yaml",
    "ansibleflow.yml",
    "ansibleflow.json",
];

/// プラグイン全体のデフォルト値（全ステージ実行で読み取り専用に共有）
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalConfig {
    /// ansible-playbook 実行ファイルのパス
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ansible_path: Option<String>,

    /// ステージが指定しない場合のインベントリ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inventory: Option<String>,

    /// ステージが指定しない場合の vault パスワードファイル
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault: Option<String>,
}

impl GlobalConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ansible_path(mut self, path: impl Into<String>) -> Self {
        self.ansible_path = Some(path.into());
        self
    }

    pub fn with_inventory(mut self, inventory: impl Into<String>) -> Self {
        self.inventory = Some(inventory.into());
        self
    }

    pub fn with_vault(mut self, vault: impl Into<String>) -> Self {
        self.vault = Some(vault.into());
        self
    }

    /// 起動する実行ファイル（未設定なら `ansible-playbook`）
    pub fn ansible_path(&self) -> &str {
        non_empty(self.ansible_path.as_deref()).unwrap_or(DEFAULT_ANSIBLE_PATH)
    }

    pub fn default_inventory(&self) -> Option<&str> {
        non_empty(self.inventory.as_deref())
    }

    pub fn default_vault(&self) -> Option<&str> {
        non_empty(self.vault.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// ユーザー設定ファイルのパス (`~/.config/ansibleflow/config.yaml`)
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("ansibleflow").join("config.yaml"))
}

/// プラグイン設定ファイルを探す
///
/// 以下の優先順位で設定ファイルを検索:
/// 1. 環境変数 ANSIBLEFLOW_CONFIG (直接パス指定)
/// 2. カレントディレクトリ: ansibleflow.local.yaml, ansibleflow.yaml, ansibleflow.yml, ansibleflow.json
/// 3. ./.ansibleflow/ ディレクトリ内: 同様の順序
/// 4. ~/.config/ansibleflow/config.yaml (グローバル設定)
pub fn find_config_file() -> Result<PathBuf> {
    // 1. 環境変数で直接指定
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(path);
        }
        tracing::warn!(
            "{} points to a missing file: {}",
            CONFIG_PATH_ENV,
            path.display()
        );
    }

    let current_dir = std::env::current_dir()?;

    // 2. カレントディレクトリで検索
    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(path);
        }
    }

    // 3. ./.ansibleflow/ ディレクトリで検索
    let dot_dir = current_dir.join(".ansibleflow");
    if dot_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = dot_dir.join(filename);
            if path.exists() {
                return Ok(path);
            }
        }
    }

    // 4. グローバル設定ファイル
    if let Some(global_config) = global_config_path()
        && global_config.exists()
    {
        return Ok(global_config);
    }

    Err(ConfigError::ConfigFileNotFound)
}

/// 設定ファイルを読み込む
///
/// 拡張子が `.json` なら JSON、それ以外は YAML として解釈する。
/// 空のファイルはデフォルト設定になる。
pub fn load_config(path: &Path) -> Result<GlobalConfig> {
    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(GlobalConfig::default());
    }

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let config = if is_json {
        serde_json::from_str(&content).map_err(|source| ConfigError::Json {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        serde_yaml::from_str(&content).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })?
    };

    tracing::debug!("Loaded plugin config from {}", path.display());
    Ok(config)
}

/// 設定ファイルを探して読み込む。見つからなければデフォルト設定を返す
pub fn load_or_default() -> Result<GlobalConfig> {
    match find_config_file() {
        Ok(path) => load_config(&path),
        Err(ConfigError::ConfigFileNotFound) => {
            tracing::debug!("No plugin config file found, using defaults");
            Ok(GlobalConfig::default())
        }
        Err(e) => Err(e),
    }
}
