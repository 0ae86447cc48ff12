//! Local command handlers behind the chatbot's tool manifest.
//!
//! Every tool the model can call resolves to one of these handlers; each
//! returns a typed [`CommandResult`] that the engine's second phase turns
//! into the final assistant message.

use std::sync::Arc;

use serde_json::json;

use crate::error::ChatbotError;
use crate::llm::{ToolCall, ToolDefinition};
use crate::wizard::manager::SessionManager;

/// Typed result of one executed command.
#[derive(Debug, Clone)]
pub enum CommandResult {
    /// A data lookup, optionally with a chart hint for the admin UI.
    Query {
        summary: String,
        data: serde_json::Value,
        chart: Option<String>,
    },
    /// A request to move the admin UI to another page.
    Navigation { path: String, summary: String },
    /// A state-changing operation that was carried out.
    Action { status: String },
    /// A plain informational answer.
    Info { text: String },
}

impl CommandResult {
    /// Deterministic fallback text, used when the phrasing call fails.
    pub fn template(&self) -> String {
        match self {
            Self::Query { summary, .. } => summary.clone(),
            Self::Navigation { path, summary } => format!("{summary} Opening {path}."),
            Self::Action { status } => status.clone(),
            Self::Info { text } => text.clone(),
        }
    }
}

/// Upper bound on the prune tool's idle window (30 days, in minutes).
/// Model-supplied arguments are untrusted input.
const MAX_PRUNE_IDLE_MINUTES: u64 = 60 * 24 * 30;

/// Admin pages the bot may navigate to.
const ADMIN_PAGES: &[(&str, &str)] = &[
    ("dashboard", "/admin/dashboard"),
    ("analytics", "/admin/analytics"),
    ("campaigns", "/admin/campaigns"),
    ("crm", "/admin/crm"),
    ("pages", "/admin/pages"),
    ("integrations", "/admin/integrations"),
];

/// Product blurbs served by the info tool.
const PRODUCT_INFO: &[(&str, &str)] = &[
    (
        "life",
        "Life cover from 50k to 2M with basic, standard and comprehensive levels. \
         Premiums depend on age band and smoker status.",
    ),
    (
        "auto",
        "Auto cover for personal, commercial and rideshare use, priced on vehicle value.",
    ),
    (
        "home",
        "Home cover for houses, townhouses and apartments, priced on rebuild value.",
    ),
    (
        "solar",
        "Solar installations in eco, plus and max plans, with battery, EV charger \
         and heat pump extras.",
    ),
];

/// Executes tool calls against live wizard state.
pub struct CommandHandlers {
    wizard: Arc<SessionManager>,
}

impl CommandHandlers {
    pub fn new(wizard: Arc<SessionManager>) -> Self {
        Self { wizard }
    }

    /// The static tool manifest sent with every first-phase request.
    pub fn manifest() -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                name: "query_wizard_stats".to_string(),
                description: "Look up live quote wizard funnel numbers: active, started, \
                              completed sessions and dispatched submissions."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {},
                }),
            },
            ToolDefinition {
                name: "navigate_to".to_string(),
                description: "Open an admin page. One of: dashboard, analytics, campaigns, \
                              crm, pages, integrations."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "page": { "type": "string" }
                    },
                    "required": ["page"],
                }),
            },
            ToolDefinition {
                name: "prune_sessions".to_string(),
                description: "Drop wizard sessions that have been idle for more than the \
                              given number of minutes."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "idle_minutes": {
                            "type": "integer",
                            "minimum": 1,
                            "maximum": MAX_PRUNE_IDLE_MINUTES,
                        }
                    },
                    "required": ["idle_minutes"],
                }),
            },
            ToolDefinition {
                name: "product_info".to_string(),
                description: "Describe one of the quoted products: life, auto, home, solar."
                    .to_string(),
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "product": { "type": "string" }
                    },
                    "required": ["product"],
                }),
            },
        ]
    }

    /// Run one tool call.
    pub async fn handle(&self, call: &ToolCall) -> Result<CommandResult, ChatbotError> {
        match call.name.as_str() {
            "query_wizard_stats" => {
                let stats = self.wizard.stats().await;
                Ok(CommandResult::Query {
                    summary: format!(
                        "{} active sessions; {} started, {} completed, {} submissions sent.",
                        stats.active_sessions,
                        stats.sessions_started,
                        stats.sessions_completed,
                        stats.submissions_dispatched
                    ),
                    data: serde_json::to_value(stats).unwrap_or_default(),
                    chart: Some("funnel".to_string()),
                })
            }
            "navigate_to" => {
                let page = str_param(call, "page")?;
                let path = ADMIN_PAGES
                    .iter()
                    .find(|(name, _)| *name == page)
                    .map(|(_, path)| *path)
                    .ok_or_else(|| ChatbotError::InvalidParameters {
                        name: call.name.clone(),
                        reason: format!("unknown page {page:?}"),
                    })?;
                Ok(CommandResult::Navigation {
                    path: path.to_string(),
                    summary: format!("Taking you to {page}."),
                })
            }
            "prune_sessions" => {
                let minutes = call
                    .arguments
                    .get("idle_minutes")
                    .and_then(serde_json::Value::as_u64)
                    .filter(|m| (1..=MAX_PRUNE_IDLE_MINUTES).contains(m))
                    .ok_or_else(|| ChatbotError::InvalidParameters {
                        name: call.name.clone(),
                        reason: format!(
                            "idle_minutes must be an integer between 1 and \
                             {MAX_PRUNE_IDLE_MINUTES}"
                        ),
                    })?;
                let pruned = self
                    .wizard
                    .prune_stale_sessions(std::time::Duration::from_secs(minutes * 60))
                    .await;
                Ok(CommandResult::Action {
                    status: format!("Pruned {pruned} idle sessions."),
                })
            }
            "product_info" => {
                let product = str_param(call, "product")?;
                let text = PRODUCT_INFO
                    .iter()
                    .find(|(name, _)| *name == product)
                    .map(|(_, text)| (*text).to_string())
                    .unwrap_or_else(|| {
                        format!("We don't quote {product:?}. Available: life, auto, home, solar.")
                    });
                Ok(CommandResult::Info { text })
            }
            other => Err(ChatbotError::ToolNotFound {
                name: other.to_string(),
            }),
        }
    }
}

fn str_param<'c>(call: &'c ToolCall, key: &str) -> Result<&'c str, ChatbotError> {
    call.arguments
        .get(key)
        .and_then(serde_json::Value::as_str)
        .ok_or_else(|| ChatbotError::InvalidParameters {
            name: call.name.clone(),
            reason: format!("missing string parameter {key:?}"),
        })
}
