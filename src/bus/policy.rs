//! Derived-trigger policy.
//!
//! The only business logic in the system: given a completed dispatch,
//! decide whether it spawns a follow-up trigger. Priority-ordered,
//! first match wins, at most one emission per dispatch. Failed
//! dispatches never reach this table.

use crate::models::{AgentRole, Finding, Severity, TriggerType};
use crate::registry::Agent;

/// Agent name singled out by the policy: its non-empty finding sets
/// signal a contract break rather than a generic compliance note.
const SCHEMA_GUARDIAN: &str = "SchemaGuardian";

/// Decide the follow-up trigger for one completed dispatch.
pub fn derived_trigger(agent: &Agent, findings: &[Finding]) -> Option<TriggerType> {
    let any_at_least = |min: Severity| findings.iter().any(|f| f.severity >= min);

    match agent.role {
        AgentRole::Security if any_at_least(Severity::Medium) => {
            Some(TriggerType::VulnerabilityDetected)
        }
        AgentRole::Performance if !findings.is_empty() => Some(TriggerType::InefficiencyDetected),
        _ if agent.name == SCHEMA_GUARDIAN && !findings.is_empty() => {
            Some(TriggerType::SchemaMismatch)
        }
        AgentRole::Refactor => Some(TriggerType::RefactorComplete),
        AgentRole::Integration if any_at_least(Severity::High) => Some(TriggerType::BuildFailed),
        AgentRole::Integration => Some(TriggerType::DeploymentStarted),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent(name: &str, role: AgentRole) -> Agent {
        Agent {
            id: name.to_lowercase(),
            name: name.to_string(),
            role,
            description: String::new(),
            subscriptions: vec![],
        }
    }

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
    fn test_security_needs_medium_or_high() {
        let a = agent("SecGuard-V2", AgentRole::Security);

        assert_eq!(
            derived_trigger(&a, &[finding(Severity::High)]),
            Some(TriggerType::VulnerabilityDetected)
        );
        assert_eq!(
            derived_trigger(&a, &[finding(Severity::Medium)]),
            Some(TriggerType::VulnerabilityDetected)
        );
        assert_eq!(derived_trigger(&a, &[finding(Severity::Low)]), None);
        assert_eq!(derived_trigger(&a, &[]), None);
    }

    #[test]
    fn test_security_emits_once_for_mixed_severities() {
        // One HIGH plus one LOW yields exactly one emission, never two.
        let a = agent("SecGuard-V2", AgentRole::Security);
        let findings = vec![finding(Severity::High), finding(Severity::Low)];
        assert_eq!(
            derived_trigger(&a, &findings),
            Some(TriggerType::VulnerabilityDetected)
        );
    }

    #[test]
    fn test_performance_needs_any_finding() {
        let a = agent("PerfOptima-X", AgentRole::Performance);
        assert_eq!(
            derived_trigger(&a, &[finding(Severity::Info)]),
            Some(TriggerType::InefficiencyDetected)
        );
        assert_eq!(derived_trigger(&a, &[]), None);
    }

    #[test]
    fn test_schema_guardian_is_name_keyed() {
        let guardian = agent("SchemaGuardian", AgentRole::Compliance);
        assert_eq!(
            derived_trigger(&guardian, &[finding(Severity::Low)]),
            Some(TriggerType::SchemaMismatch)
        );
        assert_eq!(derived_trigger(&guardian, &[]), None);

        // Other compliance agents never emit.
        let other = agent("AuditPro", AgentRole::Compliance);
        assert_eq!(derived_trigger(&other, &[finding(Severity::High)]), None);
    }

    #[test]
    fn test_refactor_always_emits() {
        let a = agent("AutoRefactor", AgentRole::Refactor);
        assert_eq!(
            derived_trigger(&a, &[]),
            Some(TriggerType::RefactorComplete)
        );
        assert_eq!(
            derived_trigger(&a, &[finding(Severity::High)]),
            Some(TriggerType::RefactorComplete)
        );
    }

    #[test]
    fn test_integration_branches_on_high() {
        let a = agent("CICDIntegrator", AgentRole::Integration);
        assert_eq!(
            derived_trigger(&a, &[finding(Severity::High)]),
            Some(TriggerType::BuildFailed)
        );
        assert_eq!(
            derived_trigger(&a, &[finding(Severity::Medium)]),
            Some(TriggerType::DeploymentStarted)
        );
        assert_eq!(
            derived_trigger(&a, &[]),
            Some(TriggerType::DeploymentStarted)
        );
    }

    #[test]
    fn test_reviewer_never_emits() {
        let a = agent("CodeCritic", AgentRole::Reviewer);
        assert_eq!(derived_trigger(&a, &[finding(Severity::High)]), None);
    }
}
