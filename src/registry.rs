//! Agent registry and the production agent roster.
//!
//! Agents are immutable, defined at process start. The registry's one
//! job is the subscription lookup the bus performs per trigger.

use crate::models::{AgentRole, TriggerType};
use anyhow::{bail, Result};
use serde::Serialize;
use std::collections::HashSet;

/// An analysis agent: identity, role, and subscription set.
#[derive(Debug, Clone, Serialize)]
pub struct Agent {
    /// Unique id across the registry.
    pub id: String,
    /// Display name. Self-exclusion on the bus matches this, not the id.
    pub name: String,
    /// Role, driving prompt selection and the derived-trigger policy.
    pub role: AgentRole,
    /// What this agent specializes in.
    pub description: String,
    /// Trigger types this agent reacts to. An agent with an empty set
    /// is permanently dormant.
    pub subscriptions: Vec<TriggerType>,
}

impl Agent {
    /// Whether this agent reacts to the given trigger type.
    pub fn subscribes_to(&self, trigger_type: TriggerType) -> bool {
        self.subscriptions.contains(&trigger_type)
    }
}

/// Static lookup over the agent set. No mutable state.
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    agents: Vec<Agent>,
}

impl AgentRegistry {
    /// Build a registry, rejecting duplicate agent ids.
    pub fn new(agents: Vec<Agent>) -> Result<Self> {
        let mut seen = HashSet::new();
        for agent in &agents {
            if !seen.insert(agent.id.as_str()) {
                bail!("duplicate agent id in registry: {}", agent.id);
            }
        }
        Ok(Self { agents })
    }

    /// Every agent subscribed to `trigger_type`, excluding the agent
    /// named `exclude_name` so an agent never reacts to its own
    /// emission. An empty result is the normal dead-end case.
    pub fn subscribers(&self, trigger_type: TriggerType, exclude_name: &str) -> Vec<&Agent> {
        self.agents
            .iter()
            .filter(|a| a.subscribes_to(trigger_type) && a.name != exclude_name)
            .collect()
    }

    /// Look up an agent by id.
    pub fn get(&self, id: &str) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }

    /// All agents, in roster order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Number of registered agents.
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// The production agent roster.
pub fn default_agents() -> Vec<Agent> {
    fn agent(
        id: &str,
        name: &str,
        role: AgentRole,
        description: &str,
        subscriptions: Vec<TriggerType>,
    ) -> Agent {
        Agent {
            id: id.to_string(),
            name: name.to_string(),
            role,
            description: description.to_string(),
            subscriptions,
        }
    }

    vec![
        agent(
            "sec-guard",
            "SecGuard-V2",
            AgentRole::Security,
            "Proactively detects OWASP Top 10 risks including SQL Injection, Broken Access \
             Control, and SSRF. Specialized in identifying hardcoded secrets and insecure \
             cryptographic patterns.",
            vec![TriggerType::CodeSubmitted],
        ),
        agent(
            "code-scanner",
            "CodeScanner",
            AgentRole::Security,
            "Deep-dives into lower-level code flaws such as memory safety violations, buffer \
             overflows, and complex race conditions. Also triggered during build failures for \
             deep diagnostics.",
            vec![TriggerType::VulnerabilityDetected, TriggerType::BuildFailed],
        ),
        agent(
            "code-critic",
            "CodeCritic",
            AgentRole::Reviewer,
            "Evaluates cognitive complexity and cyclomatic metrics. Ensures adherence to \
             industry-standard style guides and identifies architectural smells like God \
             objects or deep nesting.",
            vec![TriggerType::CodeSubmitted],
        ),
        agent(
            "perf-optima",
            "PerfOptima-X",
            AgentRole::Performance,
            "Algorithmic auditor focusing on Big O efficiency. Identifies redundant database \
             queries (N+1), heavy synchronous operations on the main thread, and leaky \
             closure patterns.",
            vec![TriggerType::CodeSubmitted],
        ),
        agent(
            "risk-analyzer",
            "RiskAnalyzer",
            AgentRole::Performance,
            "Calculates the reliability impact of changes on high-traffic critical paths. \
             Detects fragile error handling, unhandled rejections, and potential cascading \
             failures in distributed environments.",
            vec![TriggerType::InefficiencyDetected],
        ),
        agent(
            "schema-guardian",
            "SchemaGuardian",
            AgentRole::Compliance,
            "Strict validator for OpenAPI and GraphQL contracts. Detects breaking changes in \
             JSON structures, mismatched data types, and missing mandatory fields across \
             service boundaries.",
            vec![TriggerType::SchemaMismatch],
        ),
        agent(
            "refactor-engine",
            "AutoRefactor",
            AgentRole::Refactor,
            "Autonomous patch generator that converts security and performance findings into \
             verified fixes. Specializes in transforming legacy callback hell into modern \
             async/await patterns.",
            vec![
                TriggerType::VulnerabilityDetected,
                TriggerType::InefficiencyDetected,
                TriggerType::SchemaMismatch,
            ],
        ),
        agent(
            "code-refactorer",
            "CodeRefactorer",
            AgentRole::Refactor,
            "Architectural modernization specialist. Orchestrates large-scale transformations \
             like migrating from CommonJS to ES Modules. Invoked once code is pre-validated \
             for refactoring.",
            vec![TriggerType::RefactorReady],
        ),
        agent(
            "cicd-integrator",
            "CICDIntegrator",
            AgentRole::Integration,
            "Pipeline orchestrator. Monitors build statuses and deployment events. \
             Automatically triggers diagnostic agents upon build failure and manages canary \
             release cycles.",
            vec![
                TriggerType::CodeSubmitted,
                TriggerType::RefactorComplete,
                TriggerType::BuildFailed,
                TriggerType::DeploymentStarted,
            ],
        ),
        agent(
            "compliance-bot",
            "AuditPro",
            AgentRole::Compliance,
            "Regulated industry specialist (GDPR, HIPAA, SOC2). Verifies data PII masking, \
             encryption-at-rest implementations, and generates mandatory audit-trail logs \
             for every change.",
            vec![TriggerType::RefactorComplete],
        ),
        agent(
            "compliance-master",
            "ComplianceMaster",
            AgentRole::Compliance,
            "Ensures adherence to industry regulations like GDPR, HIPAA, and SOC2 by \
             analyzing code for data handling, encryption, and logging practices.",
            vec![TriggerType::CodeSubmitted, TriggerType::RefactorComplete],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_agent(id: &str, name: &str, role: AgentRole, subs: Vec<TriggerType>) -> Agent {
        Agent {
            id: id.to_string(),
            name: name.to_string(),
            role,
            description: String::new(),
            subscriptions: subs,
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let agents = vec![
            test_agent("a", "One", AgentRole::Security, vec![]),
            test_agent("a", "Two", AgentRole::Reviewer, vec![]),
        ];
        assert!(AgentRegistry::new(agents).is_err());
    }

    #[test]
    fn test_subscribers_filters_by_type() {
        let registry = AgentRegistry::new(vec![
            test_agent(
                "a",
                "Alpha",
                AgentRole::Security,
                vec![TriggerType::CodeSubmitted],
            ),
            test_agent(
                "b",
                "Beta",
                AgentRole::Reviewer,
                vec![TriggerType::BuildFailed],
            ),
        ])
        .unwrap();

        let subs = registry.subscribers(TriggerType::CodeSubmitted, "SYSTEM");
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].name, "Alpha");
    }

    #[test]
    fn test_subscribers_excludes_source_by_name() {
        let registry = AgentRegistry::new(vec![
            test_agent(
                "a",
                "Alpha",
                AgentRole::Security,
                vec![TriggerType::VulnerabilityDetected],
            ),
            test_agent(
                "b",
                "Beta",
                AgentRole::Security,
                vec![TriggerType::VulnerabilityDetected],
            ),
        ])
        .unwrap();

        // Same role, different name: Beta still reacts to Alpha's emission.
        let subs = registry.subscribers(TriggerType::VulnerabilityDetected, "Alpha");
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].name, "Beta");
    }

    #[test]
    fn test_subscribers_empty_is_not_an_error() {
        let registry = AgentRegistry::new(vec![test_agent(
            "a",
            "Alpha",
            AgentRole::Security,
            vec![TriggerType::CodeSubmitted],
        )])
        .unwrap();

        let subs = registry.subscribers(TriggerType::DeploymentStarted, "SYSTEM");
        assert!(subs.is_empty());
    }

    #[test]
    fn test_default_roster() {
        let agents = default_agents();
        assert_eq!(agents.len(), 11);

        let registry = AgentRegistry::new(agents).unwrap();
        let guardian = registry.get("schema-guardian").unwrap();
        assert_eq!(guardian.name, "SchemaGuardian");
        assert!(guardian.subscribes_to(TriggerType::SchemaMismatch));

        // CICDIntegrator is the only DEPLOYMENT_STARTED subscriber, so its
        // own deployment emissions dead-end.
        let subs = registry.subscribers(TriggerType::DeploymentStarted, "CICDIntegrator");
        assert!(subs.is_empty());
    }
}
