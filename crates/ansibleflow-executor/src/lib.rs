//! ansible-playbook stage execution for ansibleflow
//!
//! This crate runs ANSIBLE_PLAYBOOK stages: it validates the stage options,
//! builds the `ansible-playbook` command, runs it and maps the outcome to a
//! stage result for the pipeline host.
//!
//! # Requirements
//!
//! - `ansible-playbook` must be installed, or `ansiblePath` must point at it
//!
//! # Example
//!
//! ```ignore
//! use ansibleflow_executor::{MemoryLogSink, StageExecutor};
//! use ansibleflow_config::GlobalConfig;
//! use tokio_util::sync::CancellationToken;
//!
//! let executor = StageExecutor::new();
//! let sink = MemoryLogSink::new();
//! let result = executor
//!     .execute_raw(
//!         &CancellationToken::new(),
//!         &GlobalConfig::default(),
//!         br#"{"playbook": "site.yml", "checkMode": true}"#,
//!         std::path::Path::new("/srv/app"),
//!         &sink,
//!     )
//!     .await;
//! ```

pub mod executor;
pub mod log;
pub mod plugin;
pub mod runner;

pub use executor::StageExecutor;
pub use log::{LogEntry, LogLevel, LogSink, MemoryLogSink};
pub use plugin::{AnsiblePlugin, ExecuteStageRequest, StagePlugin};
pub use runner::{ProcessExit, ProcessRunner, TokioProcessRunner};
pub use tokio_util::sync::CancellationToken;
