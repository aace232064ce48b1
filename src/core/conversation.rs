use std::fmt;

use crate::core::message::{Message, Role};

/// Ordered messages of one chat: a fixed system header followed by turns.
///
/// Turns are append-only. An assistant message must answer a user message,
/// and a user message may follow another one only when the earlier turn
/// failed to get a reply.
#[derive(Debug, Clone, Default)]
pub struct ConversationHistory {
    header: Vec<Message>,
    turns: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// System messages belong in the header, not among the turns.
    SystemInTurns,
    /// Header messages must all be system messages.
    NonSystemHeader(Role),
    /// An assistant reply with no user message before it.
    UnansweredAssistant,
}

impl fmt::Display for HistoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryError::SystemInTurns => {
                write!(f, "system messages can only appear at the start of a conversation")
            }
            HistoryError::NonSystemHeader(role) => {
                write!(f, "conversation header cannot hold a {} message", role.as_str())
            }
            HistoryError::UnansweredAssistant => {
                write!(f, "assistant message must follow a user message")
            }
        }
    }
}

impl std::error::Error for HistoryError {}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(header: Vec<Message>) -> Result<Self, HistoryError> {
        if let Some(message) = header.iter().find(|m| m.role() != Role::System) {
            return Err(HistoryError::NonSystemHeader(message.role()));
        }
        Ok(Self {
            header,
            turns: Vec::new(),
        })
    }

    pub fn append(&mut self, message: Message) -> Result<(), HistoryError> {
        match message.role() {
            Role::System => return Err(HistoryError::SystemInTurns),
            Role::Assistant => {
                if !self.turns.last().is_some_and(Message::is_user) {
                    return Err(HistoryError::UnansweredAssistant);
                }
            }
            Role::User => {}
        }
        self.turns.push(message);
        Ok(())
    }

    /// Drops every turn; the header stays.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Number of turn messages, not counting the header.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn header(&self) -> &[Message] {
        &self.header
    }

    pub fn turns(&self) -> &[Message] {
        &self.turns
    }

    pub fn last(&self) -> Option<&Message> {
        self.turns.last()
    }

    /// Completed exchanges, i.e. assistant replies.
    pub fn reply_count(&self) -> usize {
        self.turns.iter().filter(|m| m.is_assistant()).count()
    }

    /// Header then turns, in the order a backend should see them.
    pub fn iter(&self) -> impl Iterator<Item = &Message> {
        self.header.iter().chain(self.turns.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(text: &str) -> Message {
        Message::from_text(Role::User, text)
    }

    fn assistant(text: &str) -> Message {
        Message::from_text(Role::Assistant, text)
    }

    #[test]
    fn assistant_needs_a_preceding_user() {
        let mut history = ConversationHistory::new();
        assert_eq!(
            history.append(assistant("hi")),
            Err(HistoryError::UnansweredAssistant)
        );

        history.append(user("hello")).unwrap();
        history.append(assistant("hi")).unwrap();
        assert_eq!(
            history.append(assistant("again")),
            Err(HistoryError::UnansweredAssistant)
        );
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn user_may_follow_an_unanswered_user() {
        let mut history = ConversationHistory::new();
        history.append(user("first try")).unwrap();
        history.append(user("second try")).unwrap();
        history.append(assistant("answer")).unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history.reply_count(), 1);
    }

    #[test]
    fn header_survives_clear() {
        let header = vec![Message::from_text(Role::System, "be brief")];
        let mut history = ConversationHistory::with_header(header).unwrap();
        history.append(user("hello")).unwrap();

        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.header().len(), 1);
        assert_eq!(history.iter().count(), 1);
    }

    #[test]
    fn system_messages_stay_in_header() {
        let mut history = ConversationHistory::new();
        assert_eq!(
            history.append(Message::from_text(Role::System, "late")),
            Err(HistoryError::SystemInTurns)
        );
        assert!(ConversationHistory::with_header(vec![user("nope")]).is_err());
    }

    #[test]
    fn iter_puts_header_first() {
        let header = vec![Message::from_text(Role::System, "sys")];
        let mut history = ConversationHistory::with_header(header).unwrap();
        history.append(user("u")).unwrap();
        history.append(assistant("a")).unwrap();

        let roles: Vec<Role> = history.iter().map(Message::role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
    }
}
