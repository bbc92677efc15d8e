//! Outward-facing bus notifications.
//!
//! Passive events for dashboards and collectors. Nothing listening on
//! the channel can call back into the bus; a full receiver or a closed
//! channel never stalls or fails the drain loop.

use crate::models::{AgentStatus, Finding, LogLevel, Trigger};
use serde::Serialize;

/// A notification emitted by the bus during a run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum BusEvent {
    /// A trigger was appended to the pending queue.
    TriggerEnqueued(Trigger),
    /// A trigger was popped and accepted for dispatch.
    TriggerConsumed(Trigger),
    /// An agent's status changed.
    AgentStatusChanged { agent_id: String, status: AgentStatus },
    /// Findings were appended to the run collection.
    FindingsAppended(Vec<Finding>),
    /// A workflow timeline line.
    Log {
        agent: String,
        message: String,
        level: LogLevel,
    },
}
