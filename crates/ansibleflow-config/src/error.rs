use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(
        "Config file not found. Looked in:\n\
        - current directory: ansibleflow.local.yaml, ansibleflow.yaml, ansibleflow.yml, ansibleflow.json\n\
        - ./.ansibleflow/ directory\n\
        - ~/.config/ansibleflow/config.yaml\n\
        A path can also be given with the ANSIBLEFLOW_CONFIG environment variable"
    )]
    ConfigFileNotFound,

    #[error("Failed to parse {path} as JSON: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to parse {path} as YAML: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
