//! Bounded request/validate/correct loop shared by every generation flow.

use crate::llm::{ChatMessage, LlmClient, LlmError};
use crate::mermaid::{repair, sanitize, sanitize_bare, CheckedDiagram, Diagnostic};
use crate::prompt::correction_message;

/// How a response is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// Prose with an optional marked diagram. A response without one is accepted.
    Conversation,
    /// A diagram is required, marked or bare.
    Diagram,
}

/// Prose answer and diagram read from one response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub answer: String,
    pub diagram: Option<CheckedDiagram>,
}

impl Outcome {
    fn read(response: &str, mode: ResponseMode) -> Self {
        match mode {
            ResponseMode::Conversation => {
                let sanitized = sanitize(response);
                Self { answer: sanitized.answer, diagram: sanitized.diagram }
            }
            ResponseMode::Diagram => {
                let sanitized = sanitize_bare(response);
                // Without any diagram, validating the whole response yields the
                // diagnostics quoted back to the model.
                let diagram = sanitized.diagram.unwrap_or_else(|| repair(response));
                Self { answer: sanitized.answer, diagram: Some(diagram) }
            }
        }
    }

    /// Diagnostics of a diagram that must be corrected, `None` when acceptable.
    fn rejection(&self) -> Option<&[Diagnostic]> {
        self.diagram.as_ref().filter(|d| !d.is_valid()).map(|d| d.diagnostics.as_slice())
    }
}

/// Result of a finished loop.
#[derive(Debug)]
pub enum Finished {
    Accepted(Outcome),
    /// Every attempt was used; carries the last response read.
    Rejected(Outcome),
}

#[derive(Debug)]
enum RetryState {
    Attempting(usize),
    Correcting { attempt: usize, response: String, diagnostics: Vec<Diagnostic> },
    Accepted(Outcome),
    GaveUp { last: Option<Outcome>, error: Option<LlmError> },
}

/// Send `messages`, validating each response, until one is accepted or
/// `max_attempts` requests were made. A model error consumes an attempt and
/// the same messages are sent again; an invalid diagram appends the response
/// and a correction request first. Fails only when no response was ever read.
pub async fn run(
    llm: &dyn LlmClient,
    mut messages: Vec<ChatMessage>,
    mode: ResponseMode,
    max_attempts: usize,
) -> Result<Finished, LlmError> {
    let max_attempts = max_attempts.max(1);
    let mut last: Option<Outcome> = None;
    let mut state = RetryState::Attempting(1);

    loop {
        state = match state {
            RetryState::Attempting(attempt) => {
                tracing::debug!(attempt, max_attempts, "requesting completion");
                match llm.complete(&messages).await {
                    Ok(response) => {
                        let outcome = Outcome::read(&response, mode);
                        let rejected = outcome.rejection().map(<[Diagnostic]>::to_vec);
                        match rejected {
                            None => RetryState::Accepted(outcome),
                            Some(diagnostics) if attempt < max_attempts => {
                                tracing::info!(
                                    attempt,
                                    errors = diagnostics.len(),
                                    "diagram rejected, requesting a correction"
                                );
                                last = Some(outcome);
                                RetryState::Correcting { attempt, response, diagnostics }
                            }
                            Some(_) => RetryState::GaveUp { last: Some(outcome), error: None },
                        }
                    }
                    Err(err) if attempt < max_attempts => {
                        tracing::warn!(attempt, "model request failed, retrying: {err}");
                        RetryState::Attempting(attempt + 1)
                    }
                    Err(err) => RetryState::GaveUp { last: last.take(), error: Some(err) },
                }
            }
            RetryState::Correcting { attempt, response, diagnostics } => {
                messages.push(ChatMessage::assistant(response));
                messages.push(correction_message(&diagnostics));
                RetryState::Attempting(attempt + 1)
            }
            RetryState::Accepted(outcome) => return Ok(Finished::Accepted(outcome)),
            RetryState::GaveUp { last: Some(outcome), error } => {
                if let Some(err) = error {
                    tracing::warn!("model request failed after a rejected diagram: {err}");
                }
                tracing::warn!(max_attempts, "giving up on diagram");
                return Ok(Finished::Rejected(outcome));
            }
            RetryState::GaveUp { last: None, error } => {
                return Err(error.unwrap_or(LlmError::EmptyResponse));
            }
        };
    }
}
