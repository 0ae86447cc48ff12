//! The wizard's step graph: immutable question definitions plus the
//! validated lookup table the navigator resolves transitions against.

pub mod catalog;
pub mod question;

pub use question::{
    Question, QuestionKind, QuestionOption, SliderConfig, RESULTS_STEP, START_STEP,
};

use std::collections::HashMap;

use crate::error::GraphError;

/// Validated, immutable step graph.
///
/// Construction goes through [`GraphBuilder`], which rejects duplicate ids,
/// dangling edges, missing entry points, and cycles reachable from `start`.
#[derive(Debug, Clone)]
pub struct QuestionGraph {
    steps: HashMap<String, Question>,
}

impl QuestionGraph {
    /// Look up a step by id.
    pub fn get(&self, id: &str) -> Result<&Question, GraphError> {
        self.steps
            .get(id)
            .ok_or_else(|| GraphError::UnknownStep(id.to_string()))
    }

    /// Whether a step exists.
    pub fn contains(&self, id: &str) -> bool {
        self.steps.contains_key(id)
    }

    /// Number of steps in the graph.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Accumulates steps and validates the whole graph on `build()`.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    steps: Vec<Question>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a step. Duplicates are caught at `build()`.
    pub fn step(mut self, question: Question) -> Self {
        self.steps.push(question);
        self
    }

    /// Validate and freeze the graph.
    pub fn build(self) -> Result<QuestionGraph, GraphError> {
        let mut steps: HashMap<String, Question> = HashMap::with_capacity(self.steps.len());
        for question in self.steps {
            if steps.contains_key(&question.id) {
                return Err(GraphError::DuplicateStep(question.id));
            }
            steps.insert(question.id.clone(), question);
        }

        if !steps.contains_key(START_STEP) {
            return Err(GraphError::MissingEntryPoint(START_STEP.to_string()));
        }
        if !steps.contains_key(RESULTS_STEP) {
            return Err(GraphError::MissingEntryPoint(RESULTS_STEP.to_string()));
        }

        // Every referenced successor must exist.
        for question in steps.values() {
            for target in question.successors() {
                if !steps.contains_key(target) {
                    return Err(GraphError::DanglingEdge {
                        from: question.id.clone(),
                        to: target.to_string(),
                    });
                }
            }
        }

        // Reject cycles reachable from start so the navigator can never
        // loop indefinitely on a well-built graph.
        detect_cycle(&steps)?;

        Ok(QuestionGraph { steps })
    }
}

/// DFS from `start` with a three-color marking; returns the first step
/// found on a back edge.
fn detect_cycle(steps: &HashMap<String, Question>) -> Result<(), GraphError> {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        Unvisited,
        InProgress,
        Done,
    }

    let mut marks: HashMap<&str, Mark> =
        steps.keys().map(|id| (id.as_str(), Mark::Unvisited)).collect();
    // Explicit stack: (step id, next successor index to try).
    let mut stack: Vec<(&str, usize)> = vec![(START_STEP, 0)];
    marks.insert(START_STEP, Mark::InProgress);

    while let Some((id, idx)) = stack.pop() {
        let successors = steps[id].successors();
        if idx >= successors.len() {
            marks.insert(id, Mark::Done);
            continue;
        }
        stack.push((id, idx + 1));
        let next = successors[idx];
        match marks[next] {
            Mark::Unvisited => {
                marks.insert(next, Mark::InProgress);
                stack.push((next, 0));
            }
            Mark::InProgress => {
                return Err(GraphError::CycleDetected(next.to_string()));
            }
            Mark::Done => {}
        }
    }
    Ok(())
}
