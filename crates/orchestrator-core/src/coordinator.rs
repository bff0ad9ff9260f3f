use llm::{ProviderId, ProviderRegistry};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::outcome::QueryOutcome;
use crate::ports::QueryPort;
use crate::state::{ComparisonState, RunId};
use crate::summary::{self, SUMMARY_PROVIDER};

/// A settled call, tagged by what it was for.
#[derive(Debug)]
enum Completion {
    Provider { id: ProviderId, outcome: QueryOutcome },
    Summary(QueryOutcome),
}

struct Inner<Q> {
    query: Arc<Q>,
    registry: Arc<ProviderRegistry>,
    summary_provider: ProviderId,
    state: watch::Sender<Option<ComparisonState>>,
    dropped: AtomicU64,
}

/// Fans one prompt out to every registered provider and tracks the results.
///
/// The current run lives in a `watch` channel. Every change goes through
/// `send_if_modified`, so each provider's result lands as one atomic update
/// and subscribers see every step.
pub struct Coordinator<Q> {
    inner: Arc<Inner<Q>>,
}

impl<Q> Clone for Coordinator<Q> {
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<Q: QueryPort + 'static> Coordinator<Q> {
    pub fn new(query: Arc<Q>, registry: Arc<ProviderRegistry>) -> Self {
        let (state, _) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                query,
                registry,
                summary_provider: SUMMARY_PROVIDER,
                state,
                dropped: AtomicU64::new(0),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<ComparisonState>> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> Option<ComparisonState> {
        self.inner.state.borrow().clone()
    }

    /// Whether the current run still has a provider or the summary in flight.
    pub fn is_busy(&self) -> bool {
        self.inner
            .state
            .borrow()
            .as_ref()
            .is_some_and(|run| !run.is_settled())
    }

    /// Completions that arrived for a run that had already been replaced.
    pub fn dropped_completions(&self) -> u64 {
        self.inner.dropped.load(Ordering::SeqCst)
    }

    /// Start a new run and return immediately. A blank prompt is ignored.
    ///
    /// Any run still in flight is discarded; its late results are dropped.
    /// Must be called from inside a Tokio runtime.
    pub fn start_comparison(&self, prompt: &str) -> Option<RunId> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return None;
        }

        let mut run = ComparisonState::new(prompt.to_string(), &self.inner.registry);
        run.mark_all_pending();
        let run_id = run.run_id;
        let providers = self.inner.registry.ids();

        if let Some(previous) = self.inner.state.send_replace(Some(run)) {
            if !previous.is_settled() {
                debug!(run = %previous.run_id, "superseding run still in flight");
            }
        }
        info!(run = %run_id, providers = providers.len(), "comparison started");

        let (tx, rx) = mpsc::unbounded_channel();
        for id in providers {
            let tx = tx.clone();
            let query = Arc::clone(&self.inner.query);
            let prompt = prompt.to_string();
            tokio::spawn(async move {
                let outcome = query.dispatch(&prompt, id.as_str()).await;
                let _ = tx.send(Completion::Provider { id, outcome });
            });
        }

        tokio::spawn(Arc::clone(&self.inner).drain(run_id, tx, rx));
        Some(run_id)
    }
}

impl<Q: QueryPort + 'static> Inner<Q> {
    /// Apply one run's completions as they arrive, arming the summary when its
    /// condition first holds. Ends once every sender for the run is gone.
    async fn drain(
        self: Arc<Self>,
        run_id: RunId,
        tx: mpsc::UnboundedSender<Completion>,
        mut rx: mpsc::UnboundedReceiver<Completion>,
    ) {
        // Kept only while a summary could still be armed.
        let mut summary_tx = self.has_pending(run_id).then_some(tx);

        while let Some(completion) = rx.recv().await {
            match completion {
                Completion::Provider { id, outcome } => {
                    let (applied, armed, open) = self.apply_provider(run_id, id, outcome);
                    if !applied {
                        self.dropped.fetch_add(1, Ordering::SeqCst);
                        debug!(run = %run_id, provider = %id, "dropping stale completion");
                    }
                    if let (Some(request), Some(tx)) = (armed, summary_tx.as_ref()) {
                        info!(run = %run_id, sources = request.sources, "requesting summary");
                        self.spawn_summary(request.prompt, tx.clone());
                    }
                    if !open {
                        summary_tx = None;
                    }
                }
                Completion::Summary(outcome) => self.apply_summary(run_id, outcome),
            }
        }

        debug!(run = %run_id, "run drained");
    }

    /// Returns (applied, armed summary, providers still pending).
    fn apply_provider(
        &self,
        run_id: RunId,
        id: ProviderId,
        outcome: QueryOutcome,
    ) -> (bool, Option<summary::SummaryRequest>, bool) {
        let mut applied = false;
        let mut armed = None;
        let mut open = false;

        self.state.send_if_modified(|current| {
            let Some(run) = current.as_mut().filter(|r| r.run_id == run_id) else {
                return false;
            };
            applied = run.settle(id, outcome);
            if applied {
                armed = summary::arm(run);
            }
            open = run.any_pending();
            applied
        });

        (applied, armed, open)
    }

    fn apply_summary(&self, run_id: RunId, outcome: QueryOutcome) {
        match &outcome {
            QueryOutcome::Success { .. } => info!(run = %run_id, "summary ready"),
            QueryOutcome::Failure(failure) => {
                warn!(run = %run_id, error = %failure, "summary generation failed")
            }
        }

        let applied = self.state.send_if_modified(|current| {
            match current.as_mut().filter(|r| r.run_id == run_id) {
                Some(run) => run.finish_summary(outcome),
                None => false,
            }
        });
        if !applied {
            self.dropped.fetch_add(1, Ordering::SeqCst);
            debug!(run = %run_id, "dropping stale summary");
        }
    }

    fn spawn_summary(&self, prompt: String, tx: mpsc::UnboundedSender<Completion>) {
        let query = Arc::clone(&self.query);
        let provider = self.summary_provider;
        tokio::spawn(async move {
            let outcome = query.dispatch(&prompt, provider.as_str()).await;
            let _ = tx.send(Completion::Summary(outcome));
        });
    }

    fn has_pending(&self, run_id: RunId) -> bool {
        self.state
            .borrow()
            .as_ref()
            .is_some_and(|r| r.run_id == run_id && r.any_pending())
    }
}
