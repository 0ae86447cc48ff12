use std::sync::Arc;

use quoteflow::api::{AppState, app_routes};
use quoteflow::chatbot::{ChatbotEngine, CommandHandlers};
use quoteflow::config::{ChatbotConfig, ServerConfig, WizardConfig};
use quoteflow::graph::catalog::insurance_graph;
use quoteflow::llm::create_provider;
use quoteflow::submit::{HttpDispatcher, NoopDispatcher, SubmissionDispatcher};
use quoteflow::wizard::manager::{SessionManager, spawn_prune_task};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let wizard_config = WizardConfig::from_env();
    let server_config = ServerConfig::from_env()?;

    eprintln!("QuoteFlow v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Wizard API: http://{}:{}/api/wizard/sessions",
        server_config.bind_addr, server_config.port
    );
    eprintln!(
        "   Chatbot:    http://{}:{}/api/ai/chatbot",
        server_config.bind_addr, server_config.port
    );

    // ── Question graph ───────────────────────────────────────────────
    let graph = Arc::new(insurance_graph()?);
    eprintln!("   Graph: {} steps validated", graph.len());

    // ── Submission dispatcher ────────────────────────────────────────
    let dispatcher: Arc<dyn SubmissionDispatcher> = match wizard_config.submission_endpoint {
        Some(ref endpoint) => {
            eprintln!("   Submissions: {endpoint}");
            Arc::new(HttpDispatcher::new(endpoint.clone()))
        }
        None => {
            eprintln!("   Submissions: disabled (QUOTEFLOW_SUBMISSION_URL not set)");
            Arc::new(NoopDispatcher)
        }
    };

    // ── Wizard sessions ──────────────────────────────────────────────
    let wizard = Arc::new(SessionManager::new(graph, dispatcher));
    let _prune_handle = spawn_prune_task(Arc::clone(&wizard), wizard_config.clone());

    // ── Chatbot ──────────────────────────────────────────────────────
    let chatbot_config = ChatbotConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        eprintln!("  export OPENAI_API_KEY=sk-...");
        std::process::exit(1);
    });
    let llm = create_provider(&chatbot_config)?;
    let chatbot = Arc::new(ChatbotEngine::new(
        llm,
        CommandHandlers::new(Arc::clone(&wizard)),
        chatbot_config.max_history,
    ));

    // ── Server ───────────────────────────────────────────────────────
    let app = app_routes(AppState { wizard, chatbot });
    let listener = tokio::net::TcpListener::bind(format!(
        "{}:{}",
        server_config.bind_addr, server_config.port
    ))
    .await?;
    tracing::info!(port = server_config.port, "QuoteFlow server started");
    axum::serve(listener, app).await?;

    Ok(())
}
