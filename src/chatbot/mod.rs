//! AI chatbot query assistant for the admin console.

pub mod commands;
pub mod engine;
pub mod history;

pub use commands::{CommandHandlers, CommandResult};
pub use engine::{ChatbotEngine, ChatbotReply};
pub use history::ConversationHistory;
