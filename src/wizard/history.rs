//! Step history — the back-navigation stack.

/// Ordered stack of previously visited step ids.
///
/// Pushed on forward navigation, popped on back navigation. The stack never
/// underflows: backing out of the first step is a no-op for the caller.
#[derive(Debug, Clone, Default)]
pub struct StepHistory {
    visited: Vec<String>,
}

impl StepHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the step being left during forward navigation.
    pub fn push(&mut self, step_id: impl Into<String>) {
        self.visited.push(step_id.into());
    }

    /// Pop the predecessor to return to, if any.
    pub fn pop(&mut self) -> Option<String> {
        self.visited.pop()
    }

    /// The current step's predecessor.
    pub fn last(&self) -> Option<&str> {
        self.visited.last().map(String::as_str)
    }

    pub fn depth(&self) -> usize {
        self.visited.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }
}
