//! History replay window.
//!
//! The router and checker replay conversation history to their models. By
//! default every prior turn is sent; an optional window caps the replay to
//! the most recent messages, rounded down to whole user/assistant pairs so a
//! window never starts on an orphaned assistant reply.

use tracing::debug;

use crate::domain::models::Message;
use crate::domain::ports::ChatMessage;

/// Tail of `history` that fits in `window` messages.
pub fn replay_window(history: &[Message], window: Option<usize>) -> &[Message] {
    let Some(window) = window else {
        return history;
    };

    let keep = window.min(history.len());
    let keep = keep - keep % 2;
    &history[history.len() - keep..]
}

/// Windowed history converted to model messages, order preserved.
pub fn replay_messages(history: &[Message], window: Option<usize>) -> Vec<ChatMessage> {
    let replayed = replay_window(history, window);
    let dropped = history.len() - replayed.len();
    if dropped > 0 {
        debug!(
            dropped,
            replayed = replayed.len(),
            window = window.unwrap_or_default(),
            "history window truncated model context"
        );
    }
    replayed.iter().map(ChatMessage::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(turns: usize) -> Vec<Message> {
        (0..turns)
            .flat_map(|i| {
                [
                    Message::user(format!("q{i}")),
                    Message::assistant(format!("a{i}")),
                ]
            })
            .collect()
    }

    #[test]
    fn test_no_window_replays_everything() {
        let history = history(3);
        assert_eq!(replay_window(&history, None), history.as_slice());
        assert_eq!(replay_messages(&history, None).len(), 6);
    }

    #[test]
    fn test_window_keeps_latest_pairs_in_order() {
        let history = history(3);
        let window = replay_window(&history, Some(4));
        assert_eq!(window.len(), 4);
        assert_eq!(window[0], Message::user("q1"));
        assert_eq!(window[3], Message::assistant("a2"));
    }

    #[test]
    fn test_odd_window_rounds_down_to_pairs() {
        let history = history(3);
        let window = replay_window(&history, Some(3));
        assert_eq!(window.len(), 2);
        assert_eq!(window[0], Message::user("q2"));
        assert_eq!(
            replay_messages(&history, Some(3)),
            vec![ChatMessage::user("q2"), ChatMessage::assistant("a2")]
        );
    }

    #[test]
    fn test_window_larger_than_history() {
        let history = history(1);
        assert_eq!(replay_window(&history, Some(50)).len(), 2);
        assert!(replay_window(&[], Some(4)).is_empty());
    }

    #[test]
    fn test_replay_messages_preserves_roles() {
        let messages = replay_messages(&history(1), None);
        assert_eq!(
            messages,
            vec![ChatMessage::user("q0"), ChatMessage::assistant("a0")]
        );
    }
}
