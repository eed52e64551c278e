use serde::{ Serialize, Deserialize };
use std::cmp::Ordering;

/// Which side of the conversation a message came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Sent by the client.
    #[serde(rename = "in")]
    In,
    /// Sent by the consultant.
    #[serde(rename = "out")]
    Out,
}

/// Opaque ordering key, kept as the scalar it was read as.
///
/// Integers compare exactly (no float conversion), floats compare against
/// integers by value, and every number sorts before every string. Strings
/// compare lexically, which orders ISO-8601 stamps chronologically.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
}

impl Default for Timestamp {
    fn default() -> Self {
        Timestamp::Int(0)
    }
}

impl From<i64> for Timestamp {
    fn from(value: i64) -> Self {
        Timestamp::Int(value)
    }
}

impl From<u64> for Timestamp {
    fn from(value: u64) -> Self {
        Timestamp::UInt(value)
    }
}

impl From<f64> for Timestamp {
    fn from(value: f64) -> Self {
        Timestamp::Float(value)
    }
}

impl From<&str> for Timestamp {
    fn from(value: &str) -> Self {
        Timestamp::Text(value.to_string())
    }
}

impl From<String> for Timestamp {
    fn from(value: String) -> Self {
        Timestamp::Text(value)
    }
}

const TWO_POW_127: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

/// Exact comparison of an integer against a float; NaN sorts above everything.
fn cmp_int_float(int: i128, float: f64) -> Ordering {
    if float.is_nan() || float >= TWO_POW_127 {
        return Ordering::Less;
    }
    if float < -TWO_POW_127 {
        return Ordering::Greater;
    }
    let whole = float.trunc();
    match int.cmp(&(whole as i128)) {
        Ordering::Equal => {
            if float > whole {
                Ordering::Less
            } else if float < whole {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        }
        other => other,
    }
}

impl Timestamp {
    fn as_integer(&self) -> Option<i128> {
        match self {
            Timestamp::Int(v) => Some(*v as i128),
            Timestamp::UInt(v) => Some(*v as i128),
            _ => None,
        }
    }
}

impl Ord for Timestamp {
    fn cmp(&self, other: &Self) -> Ordering {
        use Timestamp::{ Float, Text };
        match (self, other) {
            (Text(a), Text(b)) => a.cmp(b),
            (Text(_), _) => Ordering::Greater,
            (_, Text(_)) => Ordering::Less,
            (Float(a), Float(b)) => a.total_cmp(b),
            (Float(a), b) => cmp_int_float(b.as_integer().unwrap_or_default(), *a).reverse(),
            (a, Float(b)) => cmp_int_float(a.as_integer().unwrap_or_default(), *b),
            (a, b) => a.as_integer().cmp(&b.as_integer()),
        }
    }
}

impl PartialOrd for Timestamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Timestamp {}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub direction: Direction,
    pub text: String,
    #[serde(default)]
    pub timestamp: Timestamp,
}

impl Message {
    pub fn new(direction: Direction, text: impl Into<String>, timestamp: impl Into<Timestamp>) -> Self {
        Self {
            direction,
            text: text.into(),
            timestamp: timestamp.into(),
        }
    }

    pub fn inbound(text: impl Into<String>, timestamp: impl Into<Timestamp>) -> Self {
        Self::new(Direction::In, text, timestamp)
    }

    pub fn outbound(text: impl Into<String>, timestamp: impl Into<Timestamp>) -> Self {
        Self::new(Direction::Out, text, timestamp)
    }

    pub fn is_inbound(&self) -> bool {
        self.direction == Direction::In
    }

    pub fn is_outbound(&self) -> bool {
        self.direction == Direction::Out
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(default, rename = "conversation")]
    pub messages: Vec<Message>,
}

impl Conversation {
    pub fn new(messages: Vec<Message>) -> Self {
        Self { messages }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl From<Direction> for Role {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::In => Role::User,
            Direction::Out => Role::Assistant,
        }
    }
}

/// Role-tagged message as handed to the generator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_deserializes_wire_directions() {
        let msg: Message = serde_json
            ::from_str(r#"{"direction": "in", "text": "hi", "timestamp": 3}"#)
            .unwrap();
        assert_eq!(msg, Message::inbound("hi", 3.0));

        let msg: Message = serde_json
            ::from_str(r#"{"direction": "out", "text": "hello", "timestamp": 4.5}"#)
            .unwrap();
        assert_eq!(msg, Message::outbound("hello", 4.5));
    }

    #[test]
    fn missing_timestamp_defaults_to_zero() {
        let msg: Message = serde_json::from_str(r#"{"direction": "in", "text": "hi"}"#).unwrap();
        assert_eq!(msg.timestamp, Timestamp::Int(0));
    }

    #[test]
    fn timestamp_keeps_the_json_scalar_kind() {
        let parse = |json: &str| serde_json::from_str::<Timestamp>(json).unwrap();
        assert!(matches!(parse("3"), Timestamp::Int(3)));
        assert!(matches!(parse("-3"), Timestamp::Int(-3)));
        assert!(matches!(parse("18446744073709551615"), Timestamp::UInt(u64::MAX)));
        assert!(matches!(parse("3.5"), Timestamp::Float(f) if f == 3.5));
        assert!(matches!(parse(r#""2024-01-01T10:00:00Z""#), Timestamp::Text(ref s) if s == "2024-01-01T10:00:00Z"));

        assert_eq!(serde_json::to_string(&Timestamp::Int(3)).unwrap(), "3");
        assert_eq!(serde_json::to_string(&Timestamp::from("t1")).unwrap(), r#""t1""#);
    }

    #[test]
    fn large_integers_compare_exactly() {
        let earlier = Timestamp::Int(1_700_000_000_000_000_000);
        let later = Timestamp::Int(1_700_000_000_000_000_001);
        assert!(earlier < later);
        assert!(Timestamp::Int(-1) < Timestamp::UInt(u64::MAX));
        assert!(Timestamp::Int(i64::MAX) < Timestamp::UInt(i64::MAX as u64 + 1));
        assert_eq!(Timestamp::Int(7), Timestamp::UInt(7));
    }

    #[test]
    fn floats_compare_with_integers_by_value() {
        assert!(Timestamp::Int(2) < Timestamp::Float(2.5));
        assert!(Timestamp::Float(2.5) < Timestamp::Int(3));
        assert_eq!(Timestamp::Float(3.0), Timestamp::Int(3));
        assert!(Timestamp::Float(-0.5) < Timestamp::Int(0));
        assert!(Timestamp::UInt(u64::MAX) < Timestamp::Float(f64::NAN));
        // 2^53 + 1 is not representable as f64
        assert!(Timestamp::Float(9_007_199_254_740_992.0) < Timestamp::Int(9_007_199_254_740_993));
    }

    #[test]
    fn numbers_sort_before_text() {
        assert!(Timestamp::Float(1e300) < Timestamp::from("0"));
        assert!(Timestamp::UInt(u64::MAX) < Timestamp::from(""));
        assert!(Timestamp::from("2024-01-01T10:00:00Z") < Timestamp::from("2024-01-01T10:01:00Z"));
    }

    #[test]
    fn unknown_direction_is_rejected() {
        let parsed = serde_json::from_str::<Message>(
            r#"{"direction": "sideways", "text": "hi", "timestamp": 1}"#
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn conversation_reads_conversation_field() {
        let conv: Conversation = serde_json
            ::from_str(r#"{"conversation": [{"direction": "out", "text": "welcome", "timestamp": 1}]}"#)
            .unwrap();
        assert_eq!(conv.messages.len(), 1);

        let empty: Conversation = serde_json::from_str("{}").unwrap();
        assert!(empty.messages.is_empty());
    }

    #[test]
    fn role_serializes_lowercase() {
        let msg = ChatMessage { role: Role::from(Direction::Out), content: "ok".into() };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "ok");
    }
}
