//! Session manager — owns every active wizard session and the submission
//! side effect that fires when one completes.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::WizardConfig;
use crate::error::{Error, SessionError};
use crate::graph::{Question, QuestionGraph};
use crate::quote::Quote;
use crate::submit::SubmissionDispatcher;
use crate::wizard::form::AnswerValue;
use crate::wizard::session::{StepOutcome, WizardSession};

/// Counters the chatbot's query tools read.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct WizardStats {
    pub active_sessions: usize,
    pub sessions_started: u64,
    pub sessions_completed: u64,
    pub submissions_dispatched: u64,
}

/// The step a session is on, as returned to the API layer.
#[derive(Debug, Clone, Serialize)]
pub struct StepView {
    pub session_id: Uuid,
    pub step: Question,
    /// Back-stack depth; zero means the back action is a no-op.
    pub depth: usize,
    /// Present only on the terminal step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<Quote>,
}

/// Registry of active sessions, keyed by session id.
///
/// Each operation takes the write lock for the duration of one discrete
/// user action, so a session's answer writes and transitions are strictly
/// ordered and never interleave.
pub struct SessionManager {
    graph: Arc<QuestionGraph>,
    sessions: RwLock<HashMap<Uuid, WizardSession>>,
    dispatcher: Arc<dyn SubmissionDispatcher>,
    started: AtomicU64,
    completed: AtomicU64,
    dispatched: Arc<AtomicU64>,
}

impl SessionManager {
    pub fn new(graph: Arc<QuestionGraph>, dispatcher: Arc<dyn SubmissionDispatcher>) -> Self {
        Self {
            graph,
            sessions: RwLock::new(HashMap::new()),
            dispatcher,
            started: AtomicU64::new(0),
            completed: AtomicU64::new(0),
            dispatched: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create a fresh session positioned on the first step.
    pub async fn create_session(&self) -> Result<StepView, Error> {
        let session = WizardSession::new(Arc::clone(&self.graph));
        let view = StepView {
            session_id: session.id(),
            step: session.current_question()?.clone(),
            depth: 0,
            quote: None,
        };
        self.sessions.write().await.insert(session.id(), session);
        self.started.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(session_id = %view.session_id, "Wizard session created");
        Ok(view)
    }

    /// The step a session is currently on.
    pub async fn current_step(&self, session_id: Uuid) -> Result<StepView, Error> {
        let sessions = self.sessions.read().await;
        let session = sessions
            .get(&session_id)
            .ok_or(SessionError::NotFound(session_id))?;
        Ok(StepView {
            session_id,
            step: session.current_question()?.clone(),
            depth: session.depth(),
            quote: session.quote(),
        })
    }

    /// Answer the current step of a session and advance it.
    ///
    /// On first arrival at the terminal step the submission dispatch is
    /// spawned fire-and-forget; delivery failure is logged and never
    /// blocks the returned quote.
    pub async fn answer(&self, session_id: Uuid, value: AnswerValue) -> Result<StepView, Error> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&session_id)
            .ok_or(SessionError::NotFound(session_id))?;

        let outcome = session.answer(value)?;
        let view = match outcome {
            StepOutcome::Advanced { step } => StepView {
                session_id,
                depth: session.depth(),
                step,
                quote: None,
            },
            StepOutcome::Completed { step, quote } => {
                // First completion only: the session's submission flag
                // guards both the counter and the dispatch.
                if let Some(payload) = session.take_submission() {
                    self.completed.fetch_add(1, Ordering::Relaxed);
                    let dispatcher = Arc::clone(&self.dispatcher);
                    let dispatched = Arc::clone(&self.dispatched);
                    tokio::spawn(async move {
                        match dispatcher.submit(payload).await {
                            Ok(()) => {
                                dispatched.fetch_add(1, Ordering::Relaxed);
                            }
                            Err(e) => {
                                tracing::warn!(session_id = %session_id, "Submission failed: {e}");
                            }
                        }
                    });
                }
                StepView {
                    session_id,
                    depth: session.depth(),
                    step,
                    quote: Some(quote),
                }
            }
        };
        Ok(view)
    }

    /// Navigate a session back one step.
    pub async fn back(&self, session_id: Uuid) -> Result<StepView, Error> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(&session_id)
            .ok_or(SessionError::NotFound(session_id))?;
        let step = session.back()?.clone();
        Ok(StepView {
            session_id,
            depth: session.depth(),
            quote: session.quote(),
            step,
        })
    }

    /// Drop sessions idle longer than `idle_timeout`. Returns the count.
    pub async fn prune_stale_sessions(&self, idle_timeout: Duration) -> usize {
        let cutoff = chrono::Utc::now()
            - chrono::Duration::from_std(idle_timeout).unwrap_or(chrono::Duration::hours(1));
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.last_activity() > cutoff);
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::info!(pruned, "Pruned stale wizard sessions");
        }
        pruned
    }

    /// Live counters for the chatbot's analytics tools.
    pub async fn stats(&self) -> WizardStats {
        WizardStats {
            active_sessions: self.sessions.read().await.len(),
            sessions_started: self.started.load(Ordering::Relaxed),
            sessions_completed: self.completed.load(Ordering::Relaxed),
            submissions_dispatched: self.dispatched.load(Ordering::Relaxed),
        }
    }
}

/// Spawn the periodic pruning task.
pub fn spawn_prune_task(
    manager: Arc<SessionManager>,
    config: WizardConfig,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(config.prune_interval);
        interval.tick().await; // Skip immediate first tick
        loop {
            interval.tick().await;
            manager
                .prune_stale_sessions(config.session_idle_timeout)
                .await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SubmissionError;
    use crate::graph::catalog::insurance_graph;
    use crate::graph::{RESULTS_STEP, START_STEP};
    use crate::submit::SubmissionPayload;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    /// Dispatcher that counts calls and optionally fails.
    struct CountingDispatcher {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    #[async_trait]
    impl SubmissionDispatcher for CountingDispatcher {
        async fn submit(&self, _payload: SubmissionPayload) -> Result<(), SubmissionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(SubmissionError::BadStatus(503))
            } else {
                Ok(())
            }
        }
    }

    fn manager(fail: bool) -> (Arc<SessionManager>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let dispatcher = Arc::new(CountingDispatcher {
            calls: Arc::clone(&calls),
            fail,
        });
        let manager = Arc::new(SessionManager::new(
            Arc::new(insurance_graph().unwrap()),
            dispatcher,
        ));
        (manager, calls)
    }

    async fn walk_to_results(manager: &SessionManager, session_id: Uuid) -> StepView {
        manager
            .answer(session_id, AnswerValue::from("life"))
            .await
            .unwrap();
        manager
            .answer(session_id, AnswerValue::from("comprehensive"))
            .await
            .unwrap();
        manager
            .answer(session_id, AnswerValue::from(500_000.0))
            .await
            .unwrap();
        manager
            .answer(session_id, AnswerValue::from("25-34"))
            .await
            .unwrap();
        manager
            .answer(session_id, AnswerValue::from("no"))
            .await
            .unwrap();
        let contact = AnswerValue::Fields(
            [
                ("name", "Ada Lovelace"),
                ("email", "ada@example.com"),
                ("phone", "+1 555 010 7788"),
                ("postcode", "94107"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        );
        manager.answer(session_id, contact).await.unwrap()
    }

    #[tokio::test]
    async fn create_answer_complete_flow() {
        let (manager, calls) = manager(false);
        let view = manager.create_session().await.unwrap();
        assert_eq!(view.step.id, START_STEP);

        let terminal = walk_to_results(&manager, view.session_id).await;
        assert_eq!(terminal.step.id, RESULTS_STEP);
        let quote = terminal.quote.expect("terminal view carries a quote");
        assert!(quote.monthly_premium > rust_decimal::Decimal::ZERO);

        // Let the fire-and-forget dispatch run.
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let stats = manager.stats().await;
        assert_eq!(stats.sessions_started, 1);
        assert_eq!(stats.sessions_completed, 1);
        assert_eq!(stats.submissions_dispatched, 1);
    }

    #[tokio::test]
    async fn repeated_terminal_views_do_not_redispatch() {
        let (manager, calls) = manager(false);
        let view = manager.create_session().await.unwrap();
        let id = view.session_id;
        walk_to_results(&manager, id).await;

        // Re-render the results view a few times.
        for _ in 0..3 {
            let step = manager.current_step(id).await.unwrap();
            assert!(step.quote.is_some());
        }
        // Back off the terminal step and forward again.
        manager.back(id).await.unwrap();
        let contact = AnswerValue::Fields(
            [
                ("name", "Ada Lovelace"),
                ("email", "ada@example.com"),
                ("phone", "+1 555 010 7788"),
                ("postcode", "94107"),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        );
        manager.answer(id, contact).await.unwrap();

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1, "at most once per session");
    }

    #[tokio::test]
    async fn dispatch_failure_does_not_block_quote() {
        let (manager, calls) = manager(true);
        let view = manager.create_session().await.unwrap();
        let terminal = walk_to_results(&manager, view.session_id).await;
        assert!(terminal.quote.is_some());
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        // Session still readable afterwards.
        let step = manager.current_step(view.session_id).await.unwrap();
        assert_eq!(step.step.id, RESULTS_STEP);
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let (manager, _) = manager(false);
        let err = manager.current_step(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, Error::Session(SessionError::NotFound(_))));
    }

    #[tokio::test]
    async fn prune_drops_idle_sessions() {
        let (manager, _) = manager(false);
        manager.create_session().await.unwrap();
        assert_eq!(manager.prune_stale_sessions(Duration::from_secs(3600)).await, 0);
        assert_eq!(manager.prune_stale_sessions(Duration::ZERO).await, 1);
        assert_eq!(manager.stats().await.active_sessions, 0);
    }
}
