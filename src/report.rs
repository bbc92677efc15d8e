//! Run report generation.
//!
//! Renders the outcome of one workflow run as Markdown or JSON:
//! metadata, severity summary, findings, agent outcomes, the risk
//! trajectory, and the workflow timeline.

use crate::models::{
    AgentRole, AgentStatus, Finding, FindingSummary, LogEntry, RiskPoint, Severity,
};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Metadata about one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    /// Name of the LLM model used.
    pub model_used: String,
    /// Date and time the run started.
    pub analysis_date: DateTime<Utc>,
    /// Total run duration in seconds.
    pub duration_seconds: f64,
    /// Triggers consumed before the queue settled.
    pub triggers_consumed: usize,
    /// Agents in the registry.
    pub agents_total: usize,
    /// Agents that ended the run in FAILED.
    pub agents_failed: usize,
}

/// Final state of one agent after the run.
#[derive(Debug, Clone, Serialize)]
pub struct AgentOutcome {
    pub name: String,
    pub role: AgentRole,
    pub status: AgentStatus,
}

/// The complete run report.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub metadata: RunMetadata,
    pub summary: FindingSummary,
    pub findings: Vec<Finding>,
    pub agents: Vec<AgentOutcome>,
    pub risk_history: Vec<RiskPoint>,
    pub timeline: Vec<LogEntry>,
}

/// Generate a JSON report.
pub fn generate_json_report(report: &RunReport) -> Result<String> {
    let json = serde_json::to_string_pretty(report)?;
    Ok(json)
}

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &RunReport) -> String {
    let mut output = String::new();

    output.push_str("# DuoFlow Run Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(&report.summary));
    output.push_str(&generate_findings_section(&report.findings));
    output.push_str(&generate_agents_section(&report.agents));
    output.push_str(&generate_risk_section(&report.risk_history));
    output.push_str(&generate_timeline_section(&report.timeline));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &RunMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Analysis Date:** {}\n",
        metadata.analysis_date.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Model Used:** `{}`\n", metadata.model_used));
    section.push_str(&format!(
        "- **Triggers Consumed:** {}\n",
        metadata.triggers_consumed
    ));
    section.push_str(&format!("- **Agents:** {}\n", metadata.agents_total));
    if metadata.agents_failed > 0 {
        section.push_str(&format!("- **Agents Failed:** {}\n", metadata.agents_failed));
    }
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate the severity summary section.
fn generate_summary_section(summary: &FindingSummary) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");
    section.push_str(&format!("Total findings: **{}**\n\n", summary.total));
    section.push_str("| Severity | Count |\n");
    section.push_str("|----------|-------|\n");
    section.push_str(&format!(
        "| {} High | {} |\n",
        Severity::High.emoji(),
        summary.high
    ));
    section.push_str(&format!(
        "| {} Medium | {} |\n",
        Severity::Medium.emoji(),
        summary.medium
    ));
    section.push_str(&format!(
        "| {} Low | {} |\n",
        Severity::Low.emoji(),
        summary.low
    ));
    section.push_str(&format!(
        "| {} Info | {} |\n",
        Severity::Info.emoji(),
        summary.info
    ));
    section.push('\n');

    section
}

/// Generate the findings section.
fn generate_findings_section(findings: &[Finding]) -> String {
    let mut section = String::new();

    section.push_str("## Findings\n\n");

    if findings.is_empty() {
        section.push_str("No findings reported.\n\n");
        return section;
    }

    for (idx, finding) in findings.iter().enumerate() {
        section.push_str(&format!(
            "### {}. {} {} — {}\n\n",
            idx + 1,
            finding.severity.emoji(),
            finding.severity,
            finding.issue
        ));
        if !finding.location.is_empty() {
            section.push_str(&format!("**Location:** `{}`\n\n", finding.location));
        }
        section.push_str(&format!("**Remediation:** {}\n\n", finding.remediation));
        if let Some(ref fixed) = finding.fixed_code {
            section.push_str("**Suggested fix:**\n\n");
            section.push_str("```\n");
            section.push_str(fixed);
            if !fixed.ends_with('\n') {
                section.push('\n');
            }
            section.push_str("```\n\n");
        }
    }

    section
}

/// Generate the agent outcomes section.
fn generate_agents_section(agents: &[AgentOutcome]) -> String {
    let mut section = String::new();

    section.push_str("## Agent Outcomes\n\n");
    section.push_str("| Agent | Role | Status |\n");
    section.push_str("|-------|------|--------|\n");

    for agent in agents {
        section.push_str(&format!(
            "| {} | {} | {} |\n",
            agent.name, agent.role, agent.status
        ));
    }

    section.push('\n');
    section
}

/// Generate the risk trajectory section.
fn generate_risk_section(history: &[RiskPoint]) -> String {
    let mut section = String::new();

    section.push_str("## Risk Trajectory\n\n");

    if history.is_empty() {
        section.push_str("No risk points recorded.\n\n");
        return section;
    }

    section.push_str("| Time | Score |\n");
    section.push_str("|------|-------|\n");
    for point in history {
        section.push_str(&format!(
            "| {} | {} |\n",
            point.timestamp.format("%H:%M:%S"),
            point.score
        ));
    }

    let peak = history.iter().map(|p| p.score).max().unwrap_or(0);
    section.push_str(&format!("\nPeak risk score: **{}** / 100\n\n", peak));

    section
}

/// Generate the workflow timeline section.
fn generate_timeline_section(timeline: &[LogEntry]) -> String {
    let mut section = String::new();

    section.push_str("## Timeline\n\n");

    if timeline.is_empty() {
        section.push_str("No timeline entries.\n\n");
        return section;
    }

    for entry in timeline {
        section.push_str(&format!(
            "- `{}` **{}** [{}]: {}\n",
            entry.timestamp.format("%H:%M:%S"),
            entry.agent,
            entry.level,
            entry.message
        ));
    }

    section.push('\n');
    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    format!(
        "---\n\n*Generated by DuoFlow v{}*\n",
        env!("CARGO_PKG_VERSION")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LogLevel;

    fn sample_report() -> RunReport {
        RunReport {
            metadata: RunMetadata {
                model_used: "llama3.2:latest".to_string(),
                analysis_date: Utc::now(),
                duration_seconds: 12.5,
                triggers_consumed: 3,
                agents_total: 11,
                agents_failed: 1,
            },
            summary: FindingSummary {
                total: 2,
                high: 1,
                medium: 0,
                low: 1,
                info: 0,
            },
            findings: vec![
                Finding {
                    severity: Severity::High,
                    issue: "SQL injection".to_string(),
                    location: "line 7".to_string(),
                    remediation: "Use parameterized queries".to_string(),
                    fixed_code: Some("db.query(sql, [id])".to_string()),
                },
                Finding {
                    severity: Severity::Low,
                    issue: "Unused variable".to_string(),
                    location: String::new(),
                    remediation: "Remove it".to_string(),
                    fixed_code: None,
                },
            ],
            agents: vec![AgentOutcome {
                name: "SecGuard-V2".to_string(),
                role: AgentRole::Security,
                status: AgentStatus::Completed,
            }],
            risk_history: vec![RiskPoint {
                timestamp: Utc::now(),
                score: 50,
            }],
            timeline: vec![LogEntry {
                timestamp: Utc::now(),
                agent: "SYSTEM".to_string(),
                message: "Signal Emitted: CODE SUBMITTED (via DEV_COMMIT_WEBHOOK)".to_string(),
                level: LogLevel::Trigger,
            }],
        }
    }

    #[test]
    fn test_markdown_report_sections() {
        let markdown = generate_markdown_report(&sample_report());

        assert!(markdown.contains("# DuoFlow Run Report"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Summary"));
        assert!(markdown.contains("SQL injection"));
        assert!(markdown.contains("db.query(sql, [id])"));
        assert!(markdown.contains("| SecGuard-V2 | SECURITY | COMPLETED |"));
        assert!(markdown.contains("Peak risk score: **50**"));
        assert!(markdown.contains("- **Agents Failed:** 1"));
    }

    #[test]
    fn test_markdown_report_empty_findings() {
        let mut report = sample_report();
        report.findings.clear();
        report.risk_history.clear();

        let markdown = generate_markdown_report(&report);
        assert!(markdown.contains("No findings reported."));
        assert!(markdown.contains("No risk points recorded."));
    }

    #[test]
    fn test_json_report_roundtrips() {
        let json = generate_json_report(&sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["metadata"]["triggers_consumed"], 3);
        assert_eq!(value["findings"][0]["severity"], "high");
        assert_eq!(value["findings"][0]["fixedCode"], "db.query(sql, [id])");
        assert_eq!(value["agents"][0]["status"], "COMPLETED");
    }
}
