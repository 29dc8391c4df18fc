//! ansibleflow core
//!
//! Pure stage logic for the ANSIBLE_PLAYBOOK pipeline stage: parsing and
//! validating stage options, resolving them into an `ansible-playbook`
//! invocation, and assembling pipeline stages for the orchestrator.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │             pipeline orchestrator                │
//! └─────────────────┬───────────────────────────────┘
//!                   │ stage payload + source root
//! ┌─────────────────▼───────────────────────────────┐
//! │               ansibleflow-core                   │
//! │  ┌──────────────┐  ┌──────────────────────────┐ │
//! │  │ StageOptions │─▶│ CommandBuilder           │ │
//! │  └──────────────┘  │  -> ResolvedInvocation   │ │
//! │                    └──────────────────────────┘ │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │   ansibleflow-executor (process + log sink)      │
//! └─────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod error;
pub mod invocation;
pub mod options;
pub mod status;

// Re-exports
pub use ansibleflow_config::GlobalConfig;
pub use catalog::{
    ManualOperation, PipelineStage, STAGE_ANSIBLE_PLAYBOOK, StageRequest,
    build_pipeline_sync_stages, fetch_defined_stages,
};
pub use error::{Result, StageError};
pub use invocation::{CommandBuilder, ResolvedInvocation, resolve_path};
pub use options::{DEFAULT_TIMEOUT_SECS, StageOptions};
pub use status::{StageResult, StageStatus};
