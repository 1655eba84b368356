//! # stratum-core — shared vocabulary for the stratum function platform
//!
//! This crate defines the types every other component crate depends on:
//! typed ids, a stable-wire-format duration, the shared error taxonomy,
//! and token-usage accounting. It has no async runtime dependency and no
//! knowledge of any specific component (registry, sandbox, executors) —
//! those live in their own crates and depend on this one, not the other
//! way around.
//!
//! Dynamic-typed payloads (tool inputs/outputs, invocation variables) are
//! represented as `serde_json::Value` throughout the platform rather than
//! a bespoke tagged-value enum: `serde_json::Value` already is the tagged
//! sum type over `{null, bool, number, string, array, object}`, and
//! reinventing it would only complicate interop with the LLM adapters and
//! tool implementations that speak JSON natively.

#![deny(missing_docs)]

pub mod duration;
pub mod error;
pub mod id;
pub mod usage;

pub use duration::DurationMs;
pub use error::CoreError;
pub use id::{validate_function_id, ExecutionId, FunctionId, KeyId, OwnerId, Version};
pub use usage::TokenUsage;
