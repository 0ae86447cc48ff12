//! One user's pass through the wizard: current step, collected answers,
//! back-navigation history, and the session-scoped submission flag.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{Error, NavigationError};
use crate::graph::{Question, QuestionGraph, START_STEP};
use crate::quote::{Quote, calculate_quote};
use crate::submit::SubmissionPayload;
use crate::wizard::form::{AnswerValue, FormData};
use crate::wizard::history::StepHistory;
use crate::wizard::navigator::StepNavigator;
use crate::wizard::validate::validate_answer;

/// Result of a forward navigation.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// Moved to another question.
    Advanced { step: Question },
    /// Reached the terminal step; the quote is computed locally and the
    /// submission (if not already fired this session) is ready to dispatch.
    Completed { step: Question, quote: Quote },
}

/// A single active wizard session.
///
/// Created empty at wizard mount, mutated one answer at a time, discarded
/// when pruned. All mutation happens behind the manager's lock, so writes
/// never interleave within a session.
#[derive(Debug, Clone)]
pub struct WizardSession {
    id: Uuid,
    graph: Arc<QuestionGraph>,
    form: FormData,
    history: StepHistory,
    current: String,
    submitted: bool,
    last_activity: DateTime<Utc>,
}

impl WizardSession {
    pub fn new(graph: Arc<QuestionGraph>) -> Self {
        Self {
            id: Uuid::new_v4(),
            graph,
            form: FormData::new(),
            history: StepHistory::new(),
            current: START_STEP.to_string(),
            submitted: false,
            last_activity: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn current_step_id(&self) -> &str {
        &self.current
    }

    /// The question the user is currently on.
    pub fn current_question(&self) -> Result<&Question, Error> {
        Ok(self.graph.get(&self.current)?)
    }

    /// Depth of the back stack (number of steps behind the current one).
    pub fn depth(&self) -> usize {
        self.history.depth()
    }

    pub fn form(&self) -> &FormData {
        &self.form
    }

    pub fn last_activity(&self) -> DateTime<Utc> {
        self.last_activity
    }

    /// Whether the session is sitting on the terminal step.
    pub fn is_completed(&self) -> bool {
        self.graph
            .get(&self.current)
            .map(Question::is_terminal)
            .unwrap_or(false)
    }

    /// Answer the current step and advance.
    ///
    /// The answer is validated and the transition resolved before anything
    /// is written, so a failure leaves form and history untouched.
    pub fn answer(&mut self, value: AnswerValue) -> Result<StepOutcome, Error> {
        self.last_activity = Utc::now();
        let question = self.graph.get(&self.current)?.clone();

        if question.is_terminal() {
            return Err(NavigationError::TerminalStep(question.id).into());
        }

        validate_answer(&question, &value)?;
        let next_id = StepNavigator::new(&self.graph).resolve(&self.current, &value)?;

        self.form.set_answer(question.answer_key().to_string(), value);
        self.history.push(std::mem::replace(&mut self.current, next_id));

        let step = self.graph.get(&self.current)?.clone();
        if step.is_terminal() {
            Ok(StepOutcome::Completed {
                quote: calculate_quote(&self.form),
                step,
            })
        } else {
            Ok(StepOutcome::Advanced { step })
        }
    }

    /// Navigate back one step. At the first step this is a no-op.
    /// Previously collected answers are kept.
    pub fn back(&mut self) -> Result<&Question, Error> {
        self.last_activity = Utc::now();
        if let Some(previous) = self.history.pop() {
            self.current = previous;
        }
        self.current_question()
    }

    /// The quote for the current form state, available once terminal.
    pub fn quote(&self) -> Option<Quote> {
        self.is_completed().then(|| calculate_quote(&self.form))
    }

    /// Take the submission payload if the session is at the terminal step
    /// and has not submitted yet. At most one payload per session: the
    /// flag survives re-renders, back/forward hops, and repeated calls.
    pub fn take_submission(&mut self) -> Option<SubmissionPayload> {
        if self.submitted || !self.is_completed() {
            return None;
        }
        self.submitted = true;
        Some(SubmissionPayload {
            session_id: self.id,
            submitted_at: Utc::now(),
            form: self.form.clone(),
        })
    }

    /// Whether the dispatch already fired for this session.
    pub fn has_submitted(&self) -> bool {
        self.submitted
    }
}
