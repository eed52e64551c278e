use crate::models::chat::{ Conversation, Message };
use serde::{ Deserialize, Serialize };

/// A client turn paired with the consultant turn that answered it.
///
/// `history` is a snapshot of everything that preceded the client turn in the
/// same conversation, including earlier unanswered client turns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub history: Vec<Message>,
    pub client_sequence: Vec<Message>,
    pub consultant_reply_sequence: Vec<Message>,
}

/// Stable ascending sort by timestamp; equal timestamps keep their input order.
/// See [`Timestamp`](crate::models::chat::Timestamp) for how mixed kinds order.
pub fn sort_chronologically(messages: &mut [Message]) {
    messages.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
}

/// Segments an already sorted message list into extraction records.
///
/// Each maximal run of inbound messages that is immediately followed by a run
/// of outbound messages yields one record. Runs left unanswered are folded
/// into the history of later records.
pub fn extract_sequences(messages: &[Message]) -> Vec<ExtractionRecord> {
    let mut records = Vec::new();
    let mut history: Vec<Message> = Vec::new();
    let n = messages.len();
    let mut i = 0;

    while i < n {
        if messages[i].is_outbound() {
            history.push(messages[i].clone());
            i += 1;
            continue;
        }

        let client_start = i;
        while i < n && messages[i].is_inbound() {
            i += 1;
        }
        let client_run = &messages[client_start..i];

        let reply_start = i;
        while i < n && messages[i].is_outbound() {
            i += 1;
        }
        let reply_run = &messages[reply_start..i];

        if !reply_run.is_empty() {
            records.push(ExtractionRecord {
                history: history.clone(),
                client_sequence: client_run.to_vec(),
                consultant_reply_sequence: reply_run.to_vec(),
            });
        }
        history.extend_from_slice(client_run);
        history.extend_from_slice(reply_run);
    }

    records
}

pub fn extract_conversation(conversation: &Conversation) -> Vec<ExtractionRecord> {
    let mut messages = conversation.messages.clone();
    sort_chronologically(&mut messages);
    extract_sequences(&messages)
}

pub fn extract_all(conversations: &[Conversation]) -> Vec<ExtractionRecord> {
    conversations.iter().flat_map(extract_conversation).collect()
}
