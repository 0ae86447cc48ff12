//! The chatbot's tool-dispatch loop.
//!
//! One exchange per user message: the query goes out with the fixed system
//! prompt and the static tool manifest; a requested tool call runs locally
//! and its typed result comes back through a second phrasing call. There is
//! no retry anywhere — an LLM failure degrades to a static apology and the
//! conversation history is left exactly as it was before the message.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::chatbot::commands::{CommandHandlers, CommandResult};
use crate::chatbot::history::ConversationHistory;
use crate::llm::{ChatMessage, CompletionRequest, LlmProvider, ToolCompletionRequest};

const SYSTEM_PROMPT: &str = "You are the QuoteFlow admin assistant. You help internal staff \
     understand the quote wizard funnel, move around the admin console, and answer product \
     questions. Use the provided tools when a question needs live data or an action; answer \
     directly otherwise. Keep replies short and factual.";

const PHRASING_PROMPT: &str = "You turn raw tool output into one short, friendly sentence or \
     two for an internal admin user. Do not invent numbers.";

const APOLOGY: &str = "Sorry, I'm having trouble answering right now. Please try again.";

/// Assistant reply returned by the chatbot endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ChatbotReply {
    pub id: Uuid,
    /// Echoed back so clients can continue the same conversation.
    pub conversation_id: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<String>,
}

impl ChatbotReply {
    fn text(conversation_id: &str, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            conversation_id: conversation_id.to_string(),
            content: content.into(),
            timestamp: Utc::now(),
            data: None,
            chart: None,
        }
    }
}

/// Coordinates histories, the LLM, and the command handlers.
pub struct ChatbotEngine {
    llm: Arc<dyn LlmProvider>,
    handlers: CommandHandlers,
    histories: RwLock<HashMap<String, Arc<Mutex<ConversationHistory>>>>,
    max_history: usize,
}

impl ChatbotEngine {
    pub fn new(llm: Arc<dyn LlmProvider>, handlers: CommandHandlers, max_history: usize) -> Self {
        Self {
            llm,
            handlers,
            histories: RwLock::new(HashMap::new()),
            max_history,
        }
    }

    /// Handle one user query. Never fails: every error path degrades to a
    /// displayable reply.
    pub async fn handle_query(&self, conversation_id: &str, query: &str) -> ChatbotReply {
        // The map lock is held only long enough to find or create the
        // conversation. The conversation's own lock then spans the whole
        // exchange, so one conversation admits one request at a time
        // without stalling the others on its network I/O.
        let history = {
            let mut histories = self.histories.write().await;
            Arc::clone(histories.entry(conversation_id.to_string()).or_insert_with(
                || Arc::new(Mutex::new(ConversationHistory::new(self.max_history))),
            ))
        };
        let mut history = history.lock().await;

        history.push(ChatMessage::user(query));

        let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT)];
        messages.extend(history.messages());

        let request = ToolCompletionRequest::new(messages, CommandHandlers::manifest());
        let response = match self.llm.complete_with_tools(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(conversation_id, "Chatbot LLM call failed: {e}");
                // Roll the user message back so a retry starts clean.
                history.pop();
                return ChatbotReply::text(conversation_id, APOLOGY);
            }
        };

        let reply = match response.tool_calls.first() {
            Some(call) => {
                tracing::debug!(tool = %call.name, "Chatbot dispatching tool call");
                match self.handlers.handle(call).await {
                    Ok(result) => {
                        let content = self.phrase(query, &result).await;
                        let (data, chart) = result_payload(&result);
                        ChatbotReply {
                            id: Uuid::new_v4(),
                            conversation_id: conversation_id.to_string(),
                            content,
                            timestamp: Utc::now(),
                            data,
                            chart,
                        }
                    }
                    Err(e) => {
                        tracing::warn!(tool = %call.name, "Chatbot tool failed: {e}");
                        ChatbotReply::text(conversation_id, format!("I couldn't do that: {e}"))
                    }
                }
            }
            None => {
                let content = response
                    .content
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| APOLOGY.to_string());
                ChatbotReply::text(conversation_id, content)
            }
        };

        history.push(ChatMessage::assistant(&reply.content));
        reply
    }

    /// Second phase: phrase a command result for display. Falls back to the
    /// result's own template when the phrasing call fails.
    async fn phrase(&self, query: &str, result: &CommandResult) -> String {
        let template = result.template();
        let messages = vec![
            ChatMessage::system(PHRASING_PROMPT),
            ChatMessage::user(format!(
                "Question: {query}\nTool result: {template}\nReply to the user."
            )),
        ];
        let request = CompletionRequest::new(messages)
            .with_max_tokens(256)
            .with_temperature(0.3);
        match self.llm.complete(request).await {
            Ok(response) if !response.content.trim().is_empty() => response.content,
            Ok(_) => template,
            Err(e) => {
                tracing::warn!("Chatbot phrasing call failed, using template: {e}");
                template
            }
        }
    }

    /// Number of retained messages for one conversation.
    pub async fn history_len(&self, conversation_id: &str) -> usize {
        let history = {
            let histories = self.histories.read().await;
            histories.get(conversation_id).map(Arc::clone)
        };
        match history {
            Some(history) => history.lock().await.len(),
            None => 0,
        }
    }
}

fn result_payload(result: &CommandResult) -> (Option<serde_json::Value>, Option<String>) {
    match result {
        CommandResult::Query { data, chart, .. } => (Some(data.clone()), chart.clone()),
        CommandResult::Navigation { path, .. } => {
            (Some(serde_json::json!({ "navigate": path })), None)
        }
        CommandResult::Action { .. } | CommandResult::Info { .. } => (None, None),
    }
}
