//! Bounded conversation history for the chatbot.

use std::collections::VecDeque;

use crate::llm::ChatMessage;

/// Keeps the most recent messages of one conversation.
///
/// The system prompt is not stored here; it is prepended per request.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    messages: VecDeque<ChatMessage>,
    max_messages: usize,
}

impl ConversationHistory {
    pub fn new(max_messages: usize) -> Self {
        Self {
            messages: VecDeque::with_capacity(max_messages),
            max_messages,
        }
    }

    /// Append a message, evicting the oldest when over the bound.
    pub fn push(&mut self, message: ChatMessage) {
        if self.messages.len() == self.max_messages {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    /// Remove and return the newest message.
    pub fn pop(&mut self) -> Option<ChatMessage> {
        self.messages.pop_back()
    }

    /// Oldest-first snapshot for building a request.
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
