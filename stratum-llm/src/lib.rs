#![deny(missing_docs)]
//! # stratum-llm — the LLM adapter contract
//!
//! Defines [`Provider`], the trait every generative and agentic executor
//! is generic over, plus the wire types ([`types::ProviderRequest`] /
//! [`types::ProviderResponse`]) that form the internal lingua franca
//! between executors and adapters. Concrete provider adapters are an
//! external collaborator per the platform's scope — [`http_provider`]
//! exists only to exercise the contract end-to-end against a real wire
//! format, and [`mock`] exists for tests throughout the workspace.

pub mod http_provider;
pub mod mock;
pub mod provider;
pub mod types;

pub use http_provider::HttpChatProvider;
pub use mock::MockProvider;
pub use provider::{Provider, ProviderError};
pub use types::{
    ContentPart, ProviderMessage, ProviderRequest, ProviderResponse, Role, StopReason, TokenUsage,
    ToolSchema,
};
