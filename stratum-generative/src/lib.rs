#![deny(missing_docs)]
//! # stratum-generative — the generative-tier executor
//!
//! Implements a single-shot, templated LLM call: render the prompt,
//! pre-validate the declared output schema, check the response cache,
//! dispatch to a [`stratum_llm::Provider`], validate the response, and
//! report token/latency metadata. No tool loop — that's
//! `stratum-agentic`'s job.

mod cache;
mod error;
mod executor;
mod schema;
mod template;

pub use cache::{cache_key, CacheKeyInputs, CachedResponse, ResponseCache};
pub use error::GenerativeError;
pub use executor::{GenerativeExecutor, GenerativeMetadata};
pub use schema::{check_satisfiable, validate_against};
pub use template::render_template;
