//! Stage result types reported back to the pipeline engine

use serde::{Deserialize, Serialize};

/// Final status of a stage execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageStatus {
    Success,
    Failure,
}

impl std::fmt::Display for StageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StageStatus::Success => write!(f, "success"),
            StageStatus::Failure => write!(f, "failure"),
        }
    }
}

/// Result of one stage execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageResult {
    pub status: StageStatus,

    /// Error detail when the stage failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StageResult {
    pub fn success() -> Self {
        Self {
            status: StageStatus::Success,
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            status: StageStatus::Failure,
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == StageStatus::Success
    }
}

impl From<&crate::error::StageError> for StageResult {
    fn from(e: &crate::error::StageError) -> Self {
        StageResult::failure(e.to_string())
    }
}
