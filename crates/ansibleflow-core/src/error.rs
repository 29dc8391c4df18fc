//! Stage execution error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while preparing or running a stage
#[derive(Error, Debug)]
pub enum StageError {
    #[error("Invalid stage configuration: {0}")]
    Configuration(String),

    #[error("Playbook file does not exist: {}", .0.display())]
    PlaybookNotFound(PathBuf),

    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("ansible-playbook exited with {}", exit_detail(.code))]
    ProcessFailed { code: Option<i32> },

    #[error("Stage execution was cancelled")]
    Cancelled,

    #[error("Stage execution timed out after {0}s")]
    Timeout(u64),

    #[error("Unsupported stage: {0}")]
    UnsupportedStage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn exit_detail(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl StageError {
    /// Whether the error was raised before any process was launched
    pub fn is_pre_launch(&self) -> bool {
        matches!(
            self,
            StageError::Configuration(_)
                | StageError::PlaybookNotFound(_)
                | StageError::UnsupportedStage(_)
        )
    }
}

impl From<serde_json::Error> for StageError {
    fn from(e: serde_json::Error) -> Self {
        StageError::Configuration(format!("failed to unmarshal the stage config ({})", e))
    }
}

pub type Result<T> = std::result::Result<T, StageError>;
