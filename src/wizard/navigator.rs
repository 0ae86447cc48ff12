//! Step navigator — resolves the next step id from the graph and an answer.

use crate::error::NavigationError;
use crate::graph::QuestionGraph;
use crate::wizard::form::AnswerValue;

/// Resolves transitions against a validated [`QuestionGraph`].
///
/// Resolution order: a static `next_step_id` wins unconditionally; otherwise
/// the step's branch table is consulted with the answer's text value. The
/// builder guarantees every target exists and no reachable cycle exists, so
/// a single-hop resolver is sufficient.
#[derive(Debug, Clone, Copy)]
pub struct StepNavigator<'g> {
    graph: &'g QuestionGraph,
}

impl<'g> StepNavigator<'g> {
    pub fn new(graph: &'g QuestionGraph) -> Self {
        Self { graph }
    }

    /// Compute the next step id for `(current_step_id, answer)`.
    pub fn resolve(
        &self,
        current_step_id: &str,
        answer: &AnswerValue,
    ) -> Result<String, NavigationError> {
        let question = self
            .graph
            .get(current_step_id)
            .map_err(|_| NavigationError::UnknownStep(current_step_id.to_string()))?;

        if question.is_terminal() {
            return Err(NavigationError::TerminalStep(question.id.clone()));
        }

        if let Some(ref next) = question.next_step_id {
            return Ok(next.clone());
        }

        let routing = answer.routing_value().unwrap_or_default();
        question
            .branches
            .get(routing)
            .cloned()
            .ok_or_else(|| NavigationError::NoRoute {
                step: current_step_id.to_string(),
                answer: routing.to_string(),
            })
    }
}
