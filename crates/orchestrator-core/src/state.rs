use chrono::{DateTime, Utc};
use llm::{ProviderId, ProviderRegistry};
use serde::Serialize;
use uuid::Uuid;

use crate::outcome::{ErrorKind, QueryOutcome};

/// Identifies one comparison run; completions from any other run are stale.
pub type RunId = Uuid;

/// Lifecycle of one provider within a run. Only moves forward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProviderStatus {
    Idle,
    Pending,
    Succeeded { text: String, model: String },
    Failed { kind: ErrorKind, message: String },
}

impl ProviderStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, ProviderStatus::Pending)
    }

    pub fn is_succeeded(&self) -> bool {
        matches!(self, ProviderStatus::Succeeded { .. })
    }

    pub fn is_settled(&self) -> bool {
        matches!(self, ProviderStatus::Succeeded { .. } | ProviderStatus::Failed { .. })
    }
}

impl From<QueryOutcome> for ProviderStatus {
    fn from(outcome: QueryOutcome) -> Self {
        match outcome {
            QueryOutcome::Success { text, model } => ProviderStatus::Succeeded { text, model },
            QueryOutcome::Failure(f) => ProviderStatus::Failed { kind: f.kind, message: f.message },
        }
    }
}

/// The synthesized summary. `Skipped` is where a failed summary ends up: the
/// panel stays empty and nothing is reported to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SummarySlot {
    NotStarted,
    Pending,
    Done { text: String },
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProviderSlot {
    pub id: ProviderId,
    pub display_name: String,
    pub model: String,
    pub status: ProviderStatus,
}

/// Live record of one comparison run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonState {
    pub run_id: RunId,
    pub prompt: String,
    pub started_at: DateTime<Utc>,
    pub providers: Vec<ProviderSlot>,
    pub summary: SummarySlot,
}

impl ComparisonState {
    /// Fresh run: every registered provider `Idle`, summary not started.
    pub fn new(prompt: String, registry: &ProviderRegistry) -> Self {
        let providers = registry
            .iter()
            .map(|d| ProviderSlot {
                id: d.id,
                display_name: d.display_name.to_string(),
                model: d.model.clone(),
                status: ProviderStatus::Idle,
            })
            .collect();
        Self {
            run_id: Uuid::new_v4(),
            prompt,
            started_at: Utc::now(),
            providers,
            summary: SummarySlot::NotStarted,
        }
    }

    pub fn mark_all_pending(&mut self) {
        for slot in &mut self.providers {
            if matches!(slot.status, ProviderStatus::Idle) {
                slot.status = ProviderStatus::Pending;
            }
        }
    }

    /// Record a provider's result. Only a `Pending` slot accepts one; returns
    /// whether the state changed.
    pub fn settle(&mut self, id: ProviderId, outcome: QueryOutcome) -> bool {
        match self.providers.iter_mut().find(|s| s.id == id) {
            Some(slot) if slot.status.is_pending() => {
                slot.status = outcome.into();
                true
            }
            _ => false,
        }
    }

    /// Record the summary result. Only a `Pending` summary accepts one.
    pub fn finish_summary(&mut self, outcome: QueryOutcome) -> bool {
        if self.summary != SummarySlot::Pending {
            return false;
        }
        self.summary = match outcome {
            QueryOutcome::Success { text, .. } => SummarySlot::Done { text },
            QueryOutcome::Failure(_) => SummarySlot::Skipped,
        };
        true
    }

    pub fn slot(&self, id: ProviderId) -> Option<&ProviderSlot> {
        self.providers.iter().find(|s| s.id == id)
    }

    pub fn status(&self, id: ProviderId) -> Option<&ProviderStatus> {
        self.slot(id).map(|s| &s.status)
    }

    pub fn pending_count(&self) -> usize {
        self.providers.iter().filter(|s| s.status.is_pending()).count()
    }

    pub fn succeeded_count(&self) -> usize {
        self.providers.iter().filter(|s| s.status.is_succeeded()).count()
    }

    pub fn any_pending(&self) -> bool {
        self.providers.iter().any(|s| s.status.is_pending())
    }

    /// No provider in flight and no summary in flight.
    pub fn is_settled(&self) -> bool {
        !self.any_pending() && self.summary != SummarySlot::Pending
    }

    pub fn summary_text(&self) -> Option<&str> {
        match &self.summary {
            SummarySlot::Done { text } => Some(text),
            _ => None,
        }
    }
}
