//! Risk scoring and the run time series.
//!
//! A simple reducer over the accumulated findings: severities carry
//! fixed weights and the sum is clamped to [0, 100]. The aggregator
//! consumes findings-appended notifications and records one point per
//! change, so the series traces how risk built up over the run.

use crate::models::{Finding, RiskPoint};
use chrono::Utc;

/// Maximum risk score; raw sums above this are clamped.
pub const MAX_SCORE: u32 = 100;

/// Compute the risk score for a set of findings.
pub fn risk_score(findings: &[Finding]) -> u32 {
    let raw: u32 = findings.iter().map(|f| f.severity.risk_weight()).sum();
    raw.min(MAX_SCORE)
}

/// Append-only risk time series for one run.
#[derive(Debug, Clone, Default)]
pub struct RiskHistory {
    accumulated: Vec<Finding>,
    points: Vec<RiskPoint>,
}

impl RiskHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a batch of newly appended findings into the series and
    /// record a point for the updated score.
    pub fn observe(&mut self, findings: &[Finding]) {
        if findings.is_empty() {
            return;
        }
        self.accumulated.extend_from_slice(findings);
        self.points.push(RiskPoint {
            timestamp: Utc::now(),
            score: risk_score(&self.accumulated),
        });
    }

    /// The recorded points, in insertion order.
    pub fn points(&self) -> &[RiskPoint] {
        &self.points
    }

    /// The latest score, or 0 if nothing was observed.
    pub fn current_score(&self) -> u32 {
        self.points.last().map_or(0, |p| p.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;

    fn finding(severity: Severity) -> Finding {
        Finding {
            severity,
            issue: "x".to_string(),
            location: String::new(),
            remediation: String::new(),
            fixed_code: None,
        }
    }

    #[test]
    fn test_risk_score_weights() {
        assert_eq!(risk_score(&[]), 0);
        assert_eq!(risk_score(&[finding(Severity::High)]), 40);
        assert_eq!(
            risk_score(&[finding(Severity::Medium), finding(Severity::Low)]),
            30
        );
        assert_eq!(
            risk_score(&[finding(Severity::Info), finding(Severity::Low)]),
            20
        );
    }

    #[test]
    fn test_risk_score_clamps_at_100() {
        // 3 HIGH = 120 raw, clamped.
        let findings = vec![
            finding(Severity::High),
            finding(Severity::High),
            finding(Severity::High),
        ];
        assert_eq!(risk_score(&findings), 100);
    }

    #[test]
    fn test_history_accumulates_across_batches() {
        let mut history = RiskHistory::new();

        history.observe(&[finding(Severity::High)]);
        assert_eq!(history.current_score(), 40);

        history.observe(&[finding(Severity::Medium)]);
        assert_eq!(history.current_score(), 60);
        assert_eq!(history.points().len(), 2);

        // Scores are monotone within a run: findings only accumulate.
        assert!(history.points()[0].score <= history.points()[1].score);
    }

    #[test]
    fn test_empty_batch_records_nothing() {
        let mut history = RiskHistory::new();
        history.observe(&[]);
        assert!(history.points().is_empty());
        assert_eq!(history.current_score(), 0);
    }
}
