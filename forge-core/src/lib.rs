//! Forge Core - requirement-to-code agent pipeline
//!
//! This crate strings a fixed sequence of chat-completion requests together:
//! requirement analysis, code development, a bounded review/revision gate,
//! documentation, tests and UI code. Every stage output is persisted through
//! an [`ArtifactSink`].

pub mod agent;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod review;
pub mod secrets;
pub mod sink;

pub use agent::{AgentRole, ChatBackend, OpenAiBackend};
pub use config::{Config, LlmConfig, PipelineConfig, Provider};
pub use error::{Error, Result};
pub use pipeline::{Pipeline, PipelineReport, ProgressHandler};
pub use review::{GateOutcome, ReviewGate, ReviewOutcome, ReviewVerdict, VerdictPolicy};
pub use secrets::Secrets;
pub use sink::{ArtifactSink, FsSink, MemorySink};
