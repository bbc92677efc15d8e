//! Data models for the trigger-bus orchestrator.
//!
//! This module contains the core data structures shared across the
//! application: trigger types, findings, agent roles and statuses,
//! and the risk time series.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Severity level of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational - observations without direct risk
    Info,
    /// Low severity - style issues, minor suggestions
    Low,
    /// Medium severity - code quality issues, potential bugs
    Medium,
    /// High severity - exploitable vulnerabilities, major bugs
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "Info"),
            Severity::Low => write!(f, "Low"),
            Severity::Medium => write!(f, "Medium"),
            Severity::High => write!(f, "High"),
        }
    }
}

impl Severity {
    /// Returns an emoji representation of the severity.
    pub fn emoji(&self) -> &'static str {
        match self {
            Severity::Info => "🔵",
            Severity::Low => "🟢",
            Severity::Medium => "🟡",
            Severity::High => "🔴",
        }
    }

    /// Contribution of one finding at this severity to the run risk score.
    pub fn risk_weight(&self) -> u32 {
        match self {
            Severity::High => 40,
            Severity::Medium => 20,
            Severity::Low | Severity::Info => 10,
        }
    }
}

/// Role of an analysis agent. Closed set; the analysis prompt and the
/// derived-trigger policy both key off it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentRole {
    Security,
    Reviewer,
    Compliance,
    Refactor,
    Performance,
    Integration,
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentRole::Security => write!(f, "SECURITY"),
            AgentRole::Reviewer => write!(f, "REVIEWER"),
            AgentRole::Compliance => write!(f, "COMPLIANCE"),
            AgentRole::Refactor => write!(f, "REFACTOR"),
            AgentRole::Performance => write!(f, "PERFORMANCE"),
            AgentRole::Integration => write!(f, "INTEGRATION"),
        }
    }
}

/// Execution status of an agent within the current run.
///
/// `Acting` is a valid state reserved for external collaborators; the
/// bus itself only drives `Idle -> Thinking -> {Completed, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgentStatus {
    Idle,
    Thinking,
    Acting,
    Completed,
    Failed,
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentStatus::Idle => write!(f, "IDLE"),
            AgentStatus::Thinking => write!(f, "THINKING"),
            AgentStatus::Acting => write!(f, "ACTING"),
            AgentStatus::Completed => write!(f, "COMPLETED"),
            AgentStatus::Failed => write!(f, "FAILED"),
        }
    }
}

/// Typed signal that flows through the bus. Closed enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerType {
    CodeSubmitted,
    VulnerabilityDetected,
    InefficiencyDetected,
    SchemaMismatch,
    RefactorReady,
    RefactorComplete,
    BuildFailed,
    DeploymentStarted,
}

impl fmt::Display for TriggerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TriggerType::CodeSubmitted => "CODE_SUBMITTED",
            TriggerType::VulnerabilityDetected => "VULNERABILITY_DETECTED",
            TriggerType::InefficiencyDetected => "INEFFICIENCY_DETECTED",
            TriggerType::SchemaMismatch => "SCHEMA_MISMATCH",
            TriggerType::RefactorReady => "REFACTOR_READY",
            TriggerType::RefactorComplete => "REFACTOR_COMPLETE",
            TriggerType::BuildFailed => "BUILD_FAILED",
            TriggerType::DeploymentStarted => "DEPLOYMENT_STARTED",
        };
        write!(f, "{}", label)
    }
}

impl TriggerType {
    /// Human-readable label with underscores replaced by spaces.
    pub fn label(&self) -> String {
        self.to_string().replace('_', " ")
    }
}

/// One signal instance on the bus. Created with a fresh id, consumed
/// logically exactly once, then discarded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    /// Unique id, generated at creation.
    pub id: Uuid,
    /// Trigger type matched against agent subscriptions.
    #[serde(rename = "type")]
    pub trigger_type: TriggerType,
    /// Emitting agent's name, or a system label for workflow starts.
    pub source: String,
    /// Creation time.
    pub timestamp: DateTime<Utc>,
}

impl Trigger {
    /// Create a new trigger with a fresh id and the current time.
    pub fn new(trigger_type: TriggerType, source: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            trigger_type,
            source: source.into(),
            timestamp: Utc::now(),
        }
    }
}

/// A structured finding produced by the extraction adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    /// Severity of the finding.
    pub severity: Severity,
    /// Short description of the issue.
    pub issue: String,
    /// Where in the analyzed source the issue sits.
    #[serde(default)]
    pub location: String,
    /// Suggested remediation.
    pub remediation: String,
    /// Optional corrected code snippet.
    #[serde(rename = "fixedCode", skip_serializing_if = "Option::is_none", default)]
    pub fixed_code: Option<String>,
}

/// Summary of findings accumulated during a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindingSummary {
    /// Total number of findings.
    pub total: usize,
    /// Number of high severity findings.
    pub high: usize,
    /// Number of medium severity findings.
    pub medium: usize,
    /// Number of low severity findings.
    pub low: usize,
    /// Number of informational findings.
    pub info: usize,
}

impl FindingSummary {
    /// Creates a summary from a list of findings.
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = Self {
            total: findings.len(),
            ..Self::default()
        };

        for finding in findings {
            match finding.severity {
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
                Severity::Info => summary.info += 1,
            }
        }

        summary
    }
}

/// One point on the risk time series. Appended, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskPoint {
    /// When the score was recorded.
    pub timestamp: DateTime<Utc>,
    /// Risk score, clamped to [0, 100].
    pub score: u32,
}

/// Log level for workflow timeline entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warning,
    Error,
    Success,
    Trigger,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warning => write!(f, "warning"),
            LogLevel::Error => write!(f, "error"),
            LogLevel::Success => write!(f, "success"),
            LogLevel::Trigger => write!(f, "trigger"),
        }
    }
}

/// One line of the workflow timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the line was emitted.
    pub timestamp: DateTime<Utc>,
    /// Agent name or system label the line is attributed to.
    pub agent: String,
    /// The message itself.
    pub message: String,
    /// Timeline level.
    pub level: LogLevel,
}
