//! The trigger bus: the orchestration kernel.
//!
//! Owns the pending-trigger queue, the processed-trigger set, and the
//! per-agent status map. Drains one trigger at a time in FIFO order,
//! fans out to subscribed agents as one concurrent batch, applies the
//! returned outcomes, and enqueues derived triggers for the next
//! iteration. No locks: dispatch tasks are pure functions over their
//! inputs, and only the drain loop mutates bus state.

pub mod events;
pub mod policy;

use crate::analysis::{AnalysisError, AnalysisProvider, FindingExtractor};
use crate::models::{AgentStatus, Finding, LogLevel, Trigger, TriggerType};
use crate::registry::{Agent, AgentRegistry};
use events::BusEvent;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Source label attached to the trigger that starts a run.
pub const SYSTEM_SOURCE: &str = "DEV_COMMIT_WEBHOOK";

/// Bus tuning knobs.
#[derive(Debug, Clone, Default)]
pub struct BusConfig {
    /// Optional bound on triggers consumed per run. `None` (the
    /// default) lets a run propagate until the queue empties.
    pub max_triggers: Option<usize>,
}

/// Terminal result of one agent's dispatch, produced by the dispatch
/// task and applied by the drain loop.
#[derive(Debug)]
struct DispatchOutcome {
    agent: Agent,
    status: AgentStatus,
    findings: Vec<Finding>,
    derived: Option<TriggerType>,
    error: Option<AnalysisError>,
}

/// Snapshot returned by [`TriggerBus::drain`] once the queue settles.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Triggers accepted for processing (deduplicated skips excluded).
    pub triggers_consumed: usize,
    /// Duplicate trigger ids discarded by the processed-set guard.
    pub triggers_skipped: usize,
    /// Findings accumulated during the run, in arrival order.
    pub findings: Vec<Finding>,
    /// Final per-agent statuses, keyed by agent id.
    pub statuses: HashMap<String, AgentStatus>,
    /// False only when the `max_triggers` valve cut the run short.
    pub settled: bool,
}

/// The event bus coordinating the agent workflow.
pub struct TriggerBus {
    registry: AgentRegistry,
    provider: Arc<dyn AnalysisProvider>,
    extractor: Arc<dyn FindingExtractor>,
    config: BusConfig,
    /// The code under analysis. Read-only during a run.
    source: String,
    pending: VecDeque<Trigger>,
    processed: HashSet<Uuid>,
    statuses: HashMap<String, AgentStatus>,
    findings: Vec<Finding>,
    triggers_consumed: usize,
    triggers_skipped: usize,
    event_tx: Option<mpsc::UnboundedSender<BusEvent>>,
}

impl TriggerBus {
    /// Create a bus over a registry and the two analysis adapters.
    pub fn new(
        registry: AgentRegistry,
        provider: Arc<dyn AnalysisProvider>,
        extractor: Arc<dyn FindingExtractor>,
        config: BusConfig,
    ) -> Self {
        let statuses = registry
            .agents()
            .iter()
            .map(|a| (a.id.clone(), AgentStatus::Idle))
            .collect();

        Self {
            registry,
            provider,
            extractor,
            config,
            source: String::new(),
            pending: VecDeque::new(),
            processed: HashSet::new(),
            statuses,
            findings: Vec::new(),
            triggers_consumed: 0,
            triggers_skipped: 0,
            event_tx: None,
        }
    }

    /// Attach a notification channel for dashboards and collectors.
    pub fn with_event_channel(mut self, tx: mpsc::UnboundedSender<BusEvent>) -> Self {
        self.event_tx = Some(tx);
        self
    }

    /// Reset all run-scoped state and enqueue the initial
    /// `CODE_SUBMITTED` trigger for the given source code.
    pub fn start_run(&mut self, source: impl Into<String>) {
        self.source = source.into();
        self.pending.clear();
        self.processed.clear();
        self.findings.clear();
        self.triggers_consumed = 0;
        self.triggers_skipped = 0;

        for agent in self.registry.agents() {
            self.statuses.insert(agent.id.clone(), AgentStatus::Idle);
        }
        for agent_id in self.statuses.keys() {
            self.emit(BusEvent::AgentStatusChanged {
                agent_id: agent_id.clone(),
                status: AgentStatus::Idle,
            });
        }

        self.enqueue(TriggerType::CodeSubmitted, SYSTEM_SOURCE);
    }

    /// Construct a fresh trigger and append it to the pending queue.
    /// Pure append; never blocks.
    pub fn enqueue(&mut self, trigger_type: TriggerType, source: impl Into<String>) {
        let trigger = Trigger::new(trigger_type, source);
        info!(
            "Signal emitted: {} (via {})",
            trigger.trigger_type, trigger.source
        );
        self.log(
            "SYSTEM",
            format!(
                "Signal Emitted: {} (via {})",
                trigger.trigger_type.label(),
                trigger.source
            ),
            LogLevel::Trigger,
        );
        self.emit(BusEvent::TriggerEnqueued(trigger.clone()));
        self.pending.push_back(trigger);
    }

    /// Drain the pending queue until it settles.
    ///
    /// Triggers are consumed strictly in FIFO order, one at a time;
    /// the subscriber batch for each trigger runs concurrently and is
    /// fully resolved before the next trigger is popped. Triggers
    /// enqueued by a batch become visible to the next iteration only.
    /// Calling this on an empty queue is a no-op.
    pub async fn drain(&mut self) -> RunSummary {
        while let Some(trigger) = self.pending.pop_front() {
            if let Some(max) = self.config.max_triggers {
                if self.triggers_consumed >= max {
                    warn!(
                        "Trigger bound of {} reached with {} still pending; stopping drain",
                        max,
                        self.pending.len() + 1
                    );
                    self.pending.push_front(trigger);
                    break;
                }
            }

            // Idempotent skip: a trigger id is processed at most once.
            if !self.processed.insert(trigger.id) {
                debug!("Discarding already-processed trigger {}", trigger.id);
                self.triggers_skipped += 1;
                continue;
            }

            self.triggers_consumed += 1;
            self.emit(BusEvent::TriggerConsumed(trigger.clone()));

            let batch: Vec<Agent> = self
                .registry
                .subscribers(trigger.trigger_type, &trigger.source)
                .into_iter()
                .cloned()
                .collect();

            if batch.is_empty() {
                // A trigger with no listeners is valid and silently absorbed.
                debug!("No subscribers for {}", trigger.trigger_type);
                continue;
            }

            info!(
                "Dispatching {} to {} agent(s)",
                trigger.trigger_type,
                batch.len()
            );
            self.run_batch(batch, trigger.trigger_type).await;
        }

        RunSummary {
            triggers_consumed: self.triggers_consumed,
            triggers_skipped: self.triggers_skipped,
            findings: self.findings.clone(),
            statuses: self.statuses.clone(),
            settled: self.pending.is_empty(),
        }
    }

    /// Run one concurrent batch and apply every outcome. Partial
    /// failures never cancel siblings; the batch is complete when all
    /// members reached a terminal status.
    async fn run_batch(&mut self, batch: Vec<Agent>, trigger_type: TriggerType) {
        let mut tasks = JoinSet::new();

        for agent in batch {
            self.set_status(&agent.id, AgentStatus::Thinking);
            self.log(
                &agent.name,
                format!("Reacting to {}...", trigger_type.label()),
                LogLevel::Info,
            );

            let provider = Arc::clone(&self.provider);
            let extractor = Arc::clone(&self.extractor);
            let source = self.source.clone();
            tasks.spawn(run_dispatch(agent, source, provider, extractor));
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => self.apply_outcome(outcome),
                // A panicking dispatch task loses its agent identity;
                // log it and keep the batch going.
                Err(e) => warn!("Dispatch task panicked: {}", e),
            }
        }
    }

    /// Fold one dispatch outcome into bus state.
    fn apply_outcome(&mut self, outcome: DispatchOutcome) {
        let DispatchOutcome {
            agent,
            status,
            findings,
            derived,
            error,
        } = outcome;

        self.set_status(&agent.id, status);

        match status {
            AgentStatus::Completed => {
                self.log(
                    &agent.name,
                    format!("Task complete. Found {} actionable items.", findings.len()),
                    LogLevel::Success,
                );
                if !findings.is_empty() {
                    self.emit(BusEvent::FindingsAppended(findings.clone()));
                    self.findings.extend(findings);
                }
                if let Some(trigger_type) = derived {
                    self.enqueue(trigger_type, agent.name.clone());
                }
            }
            AgentStatus::Failed => {
                let message = error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "unknown execution error".to_string());
                warn!("Agent {} failed: {}", agent.name, message);
                self.log(
                    &agent.name,
                    format!("CRITICAL FAILURE: {}", message),
                    LogLevel::Error,
                );
            }
            other => {
                debug!("Agent {} ended dispatch in state {}", agent.name, other);
            }
        }
    }

    fn set_status(&mut self, agent_id: &str, status: AgentStatus) {
        self.statuses.insert(agent_id.to_string(), status);
        self.emit(BusEvent::AgentStatusChanged {
            agent_id: agent_id.to_string(),
            status,
        });
    }

    fn emit(&self, event: BusEvent) {
        if let Some(tx) = &self.event_tx {
            let _ = tx.send(event);
        }
    }

    fn log(&self, agent: &str, message: String, level: LogLevel) {
        self.emit(BusEvent::Log {
            agent: agent.to_string(),
            message,
            level,
        });
    }

    /// Number of triggers waiting in the queue.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

/// One agent's execution in response to one trigger. Pure: reads its
/// inputs, calls the two adapters, and returns an outcome for the
/// drain loop to apply. Failures at either call end the dispatch with
/// `Failed` and no findings; the derived-trigger policy runs only on
/// the success path.
async fn run_dispatch(
    agent: Agent,
    source: String,
    provider: Arc<dyn AnalysisProvider>,
    extractor: Arc<dyn FindingExtractor>,
) -> DispatchOutcome {
    let raw = match provider.analyze(agent.role, &source).await {
        Ok(raw) => raw,
        Err(e) => return failed(agent, e),
    };

    match extractor.extract_findings(&raw).await {
        Ok(findings) => {
            let derived = policy::derived_trigger(&agent, &findings);
            DispatchOutcome {
                agent,
                status: AgentStatus::Completed,
                findings,
                derived,
                error: None,
            }
        }
        Err(e) => failed(agent, e),
    }
}

fn failed(agent: Agent, error: AnalysisError) -> DispatchOutcome {
    DispatchOutcome {
        agent,
        status: AgentStatus::Failed,
        findings: Vec::new(),
        derived: None,
        error: Some(error),
    }
}
