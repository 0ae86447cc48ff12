//! QuoteFlow — quote wizard engine and admin assistant.

pub mod api;
pub mod chatbot;
pub mod config;
pub mod error;
pub mod graph;
pub mod llm;
pub mod quote;
pub mod submit;
pub mod wizard;
