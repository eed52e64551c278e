use crate::models::chat::{ ChatMessage, Direction, Message, Role };

pub fn format_history_for_prompt(history: &[Message]) -> Vec<ChatMessage> {
    history
        .iter()
        .map(|msg| ChatMessage {
            role: Role::from(msg.direction),
            content: msg.text.clone(),
        })
        .collect()
}

/// Keeps only the most recent `limit` messages; `None` keeps everything.
pub fn truncate_history(history: &[Message], limit: Option<usize>) -> &[Message] {
    match limit {
        Some(limit) if history.len() > limit => &history[history.len() - limit..],
        _ => history,
    }
}

/// Most recent first, one labelled line per message.
pub fn render_history_for_display(history: &[Message]) -> Vec<String> {
    if history.is_empty() {
        return vec!["(No history)".to_string()];
    }
    history
        .iter()
        .rev()
        .map(|msg| {
            let label = match msg.direction {
                Direction::Out => "CONSULTANT",
                Direction::In => "CLIENT",
            };
            format!("({}) {}", label, msg.text)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Message> {
        vec![
            Message::outbound("welcome", 1.0),
            Message::inbound("hi", 2.0),
            Message::outbound("hello", 3.0)
        ]
    }

    #[test]
    fn formats_roles_in_order() {
        let formatted = format_history_for_prompt(&sample());
        let roles: Vec<Role> = formatted.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::Assistant, Role::User, Role::Assistant]);
        assert_eq!(formatted[1].content, "hi");
    }

    #[test]
    fn truncation_keeps_the_tail() {
        let history = sample();
        assert_eq!(truncate_history(&history, None).len(), 3);
        assert_eq!(truncate_history(&history, Some(10)).len(), 3);
        let tail = truncate_history(&history, Some(2));
        assert_eq!(tail[0].text, "hi");
        assert_eq!(tail[1].text, "hello");
        assert!(truncate_history(&history, Some(0)).is_empty());
    }

    #[test]
    fn display_is_reversed_and_labelled() {
        let lines = render_history_for_display(&sample());
        assert_eq!(lines, vec!["(CONSULTANT) hello", "(CLIENT) hi", "(CONSULTANT) welcome"]);
        assert_eq!(render_history_for_display(&[]), vec!["(No history)"]);
    }
}
