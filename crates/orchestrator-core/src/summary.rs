//! When and how the synthesized summary is requested.

use llm::ProviderId;

use crate::state::{ComparisonState, ProviderStatus, SummarySlot};

/// The provider that writes every summary.
pub const SUMMARY_PROVIDER: ProviderId = ProviderId::ChatGpt;

/// Successful responses needed before a summary is worth writing.
pub const MIN_SUCCESSES: usize = 2;

const INSTRUCTION: &str = "Synthesize these responses in 3-5 sentences. \
Point out where they agree, where they disagree, and any unique insights. \
Write it as one cohesive summary; do not go through the assistants one by one.";

/// One succeeded provider's contribution to the synthesis prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceResponse<'a> {
    pub name: &'a str,
    pub model: &'a str,
    pub text: &'a str,
}

/// A summary call that has been armed and must be dispatched once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    pub prompt: String,
    pub sources: usize,
}

/// No provider pending, enough successes, summary not yet started.
pub fn should_fire(state: &ComparisonState) -> bool {
    state.summary == SummarySlot::NotStarted
        && !state.any_pending()
        && state.succeeded_count() >= MIN_SUCCESSES
}

/// If the trigger condition holds, move the summary to `Pending` and return
/// the request built from the providers that have succeeded right now.
/// Later calls on the same run return `None`.
pub fn arm(state: &mut ComparisonState) -> Option<SummaryRequest> {
    if !should_fire(state) {
        return None;
    }

    let sources: Vec<SourceResponse<'_>> = state
        .providers
        .iter()
        .filter_map(|slot| match &slot.status {
            ProviderStatus::Succeeded { text, model } => Some(SourceResponse {
                name: &slot.display_name,
                model,
                text,
            }),
            _ => None,
        })
        .collect();

    let request = SummaryRequest {
        prompt: synthesis_prompt(&state.prompt, &sources),
        sources: sources.len(),
    };
    state.summary = SummarySlot::Pending;
    Some(request)
}

/// The prompt sent to the summary provider: the original question, each
/// response under its own delimiter in the order given, then the instruction.
pub fn synthesis_prompt(original: &str, responses: &[SourceResponse<'_>]) -> String {
    let mut out = format!(
        "A user asked the following question:\n\n\"{}\"\n\nHere are the responses from {} AI assistants:\n",
        original,
        responses.len()
    );
    for r in responses {
        out.push_str(&format!("\n--- {} ({}) ---\n{}\n", r.name, r.model, r.text));
    }
    out.push_str("\n--- End of responses ---\n\n");
    out.push_str(INSTRUCTION);
    out
}
