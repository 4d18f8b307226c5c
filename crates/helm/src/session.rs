use chat_api::{ChatMessage, Usage};

/// History length above which `/compact` acts.
pub const COMPACT_THRESHOLD: usize = 6;
/// Entries kept by `/compact`.
pub const COMPACT_KEEP: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompactOutcome {
    Compacted { removed: usize },
    AlreadyShort,
}

/// Live conversation plus running token counters. Lives only as long as the process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    messages: Vec<SessionMessage>,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[SessionMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(SessionMessage {
            role: Role::User,
            content: content.into(),
        });
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(SessionMessage {
            role: Role::Assistant,
            content: content.into(),
        });
    }

    pub fn add_usage(&mut self, usage: Usage) {
        self.prompt_tokens = self.prompt_tokens.saturating_add(usage.prompt_tokens);
        self.completion_tokens = self
            .completion_tokens
            .saturating_add(usage.completion_tokens);
        self.total_tokens = self.total_tokens.saturating_add(usage.total_tokens);
    }

    /// Keeps the last [`COMPACT_KEEP`] entries when more than [`COMPACT_THRESHOLD`] exist.
    pub fn compact(&mut self) -> CompactOutcome {
        if self.messages.len() <= COMPACT_THRESHOLD {
            return CompactOutcome::AlreadyShort;
        }
        let removed = self.messages.len() - COMPACT_KEEP;
        self.messages.drain(..removed);
        CompactOutcome::Compacted { removed }
    }

    /// Drops every message and zeroes the counters.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// History as wire messages, without the system prompt.
    pub fn conversation(&self) -> Vec<ChatMessage> {
        self.messages
            .iter()
            .map(|message| match message.role {
                Role::User => ChatMessage::user(message.content.clone()),
                Role::Assistant => ChatMessage::assistant(message.content.clone()),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_accumulates() {
        let mut session = Session::new();
        session.add_usage(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        });
        session.add_usage(Usage {
            prompt_tokens: 1,
            completion_tokens: 2,
            total_tokens: 3,
        });
        assert_eq!(
            (
                session.prompt_tokens,
                session.completion_tokens,
                session.total_tokens
            ),
            (11, 7, 18)
        );
    }

    #[test]
    fn conversation_preserves_order_and_roles() {
        let mut session = Session::new();
        session.push_user("hi");
        session.push_assistant("hello");
        let roles: Vec<&str> = session
            .conversation()
            .iter()
            .map(ChatMessage::role)
            .collect();
        assert_eq!(roles, vec!["user", "assistant"]);
    }
}
