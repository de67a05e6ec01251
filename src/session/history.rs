//! Conversation history.

use crate::rag::ContextChunk;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One completed question/answer exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub question: String,
    pub answer: String,
    /// Chunks the answer was generated from.
    pub sources: Vec<ContextChunk>,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(question: String, answer: String, sources: Vec<ContextChunk>) -> Self {
        Self {
            question,
            answer,
            sources,
            timestamp: Utc::now(),
        }
    }
}

/// Ordered, append-only list of turns.
///
/// Turns are only added by a successful answer and only removed by
/// replacing the session's video or resetting the session.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
}

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    /// The last `n` turns, oldest first.
    pub fn recent(&self, n: usize) -> &[ConversationTurn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub(crate) fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    pub(crate) fn clear(&mut self) {
        self.turns.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recent_returns_tail_in_order() {
        let mut history = ConversationHistory::new();
        for i in 0..5 {
            history.push(ConversationTurn::new(format!("q{}", i), format!("a{}", i), vec![]));
        }

        let recent: Vec<&str> = history.recent(2).iter().map(|t| t.question.as_str()).collect();
        assert_eq!(recent, vec!["q3", "q4"]);
        assert_eq!(history.recent(10).len(), 5);
        assert!(history.recent(0).is_empty());
        assert_eq!(history.last().map(|t| t.answer.as_str()), Some("a4"));
    }
}
