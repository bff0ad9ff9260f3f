//! Fan-out/fan-in core: dispatch one prompt to every provider concurrently,
//! track each result independently, and request one synthesized summary once
//! enough providers have answered.

pub mod classify;
pub mod coordinator;
pub mod dispatcher;
pub mod outcome;
pub mod ports;
pub mod state;
pub mod summary;

pub use coordinator::Coordinator;
pub use dispatcher::Dispatcher;
pub use outcome::{ErrorKind, QueryFailure, QueryOutcome};
pub use ports::QueryPort;
pub use state::{ComparisonState, ProviderSlot, ProviderStatus, RunId, SummarySlot};

// Simple in-crate mocks for demo/testing
pub mod mocks {
    use super::*;
    use async_trait::async_trait;
    use llm::ProviderId;
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex, PoisonError};
    use tokio::sync::Notify;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Call {
        pub provider: String,
        pub prompt: String,
    }

    struct Step {
        outcome: QueryOutcome,
        gate: Option<Arc<Notify>>,
    }

    /// Per-provider scripted replies, consumed in order. A step can be gated
    /// on a `Notify` so tests decide when (and in which order) it settles.
    /// A provider with no steps left answers with a transport failure.
    #[derive(Default)]
    pub struct ScriptedQuery {
        steps: Mutex<HashMap<String, VecDeque<Step>>>,
        calls: Mutex<Vec<Call>>,
    }

    impl ScriptedQuery {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn reply(self, provider: ProviderId, outcome: QueryOutcome) -> Self {
            self.push(provider, Step { outcome, gate: None });
            self
        }

        pub fn reply_after(self, provider: ProviderId, outcome: QueryOutcome, gate: Arc<Notify>) -> Self {
            self.push(provider, Step { outcome, gate: Some(gate) });
            self
        }

        pub fn succeed(self, provider: ProviderId, text: &str) -> Self {
            let model = format!("{}-model", provider);
            self.reply(provider, QueryOutcome::success(text, model))
        }

        pub fn fail(self, provider: ProviderId, kind: ErrorKind, message: &str) -> Self {
            self.reply(provider, QueryOutcome::failure(kind, message))
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
        }

        pub fn calls_to(&self, provider: ProviderId) -> usize {
            self.calls()
                .iter()
                .filter(|c| c.provider == provider.as_str())
                .count()
        }

        fn push(&self, provider: ProviderId, step: Step) {
            self.steps
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .entry(provider.as_str().to_string())
                .or_default()
                .push_back(step);
        }
    }

    #[async_trait]
    impl QueryPort for ScriptedQuery {
        async fn dispatch(&self, prompt: &str, provider: &str) -> QueryOutcome {
            self.calls
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(Call { provider: provider.to_string(), prompt: prompt.to_string() });

            let step = self
                .steps
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .get_mut(provider)
                .and_then(VecDeque::pop_front);

            match step {
                Some(Step { outcome, gate }) => {
                    if let Some(gate) = gate {
                        gate.notified().await;
                    }
                    outcome
                }
                None => QueryOutcome::failure(ErrorKind::Transport, format!("no scripted reply for {}", provider)),
            }
        }
    }
}
