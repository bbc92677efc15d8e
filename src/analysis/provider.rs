//! Adapter contracts the bus depends on.
//!
//! Two narrow interfaces: one turns (role, source) into raw analysis
//! text, the other turns that text into structured findings. Both must
//! be safe to call concurrently, one call per agent per batch.

use crate::analysis::AnalysisError;
use crate::models::{AgentRole, Finding};
use async_trait::async_trait;

/// Turns a role and the source under review into raw analysis text.
#[async_trait]
pub trait AnalysisProvider: Send + Sync {
    /// Run one analysis. Fails with a categorized [`AnalysisError`];
    /// the caller records the failure and moves on, never retries.
    async fn analyze(&self, role: AgentRole, source: &str) -> Result<String, AnalysisError>;
}

/// Turns raw analysis text into zero or more structured findings.
#[async_trait]
pub trait FindingExtractor: Send + Sync {
    /// Extract findings. Malformed structured output must yield an
    /// empty list, not an error; only adapter-level failures (auth,
    /// network, ...) surface as `Err`.
    async fn extract_findings(&self, raw_text: &str) -> Result<Vec<Finding>, AnalysisError>;
}
