use async_trait::async_trait;

use crate::outcome::QueryOutcome;

/// One prompt to one provider, normalized. Implemented by [`crate::Dispatcher`]
/// in production and by [`crate::mocks::ScriptedQuery`] in tests.
///
/// Implementations never fail out-of-band: every problem is a
/// [`QueryOutcome::Failure`].
#[async_trait]
pub trait QueryPort: Send + Sync {
    async fn dispatch(&self, prompt: &str, provider: &str) -> QueryOutcome;
}
