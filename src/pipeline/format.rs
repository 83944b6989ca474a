//! Record formatting: each QA pair becomes a user turn followed by an
//! assistant turn.

use crate::types::{ConversationTurn, QaPair};

/// Expand pairs into turns, preserving order. Always `2 * pairs.len()` turns.
pub fn to_turns(pairs: &[QaPair]) -> Vec<ConversationTurn> {
    pairs
        .iter()
        .flat_map(|pair| {
            [
                ConversationTurn::user(pair.question.clone()),
                ConversationTurn::assistant(pair.answer.clone()),
            ]
        })
        .collect()
}
