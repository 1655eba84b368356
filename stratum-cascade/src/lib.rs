//! Cascade executor: ordered escalation across the Code, Generative,
//! Agentic, and Human tiers.

#![deny(missing_docs)]

mod error;
mod executor;
mod tier;
mod types;

pub use error::CascadeError;
pub use executor::CascadeExecutor;
pub use tier::{AgenticTier, CodeTier, GenerativeTier, TierExecutor};
pub use types::{
    AttemptStatus, CascadeAttempt, CascadeMetrics, CascadeOutcome, HumanTask, PreviousError,
};
