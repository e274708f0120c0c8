//! Messages produced by the backend.
//!
//! The CLI emits one message per stdout line. In `stream-json` mode each line
//! is a JSON object tagged by `type`; in `text` mode lines are plain text.
//! Anything that does not decode as a known JSON message is kept verbatim.

use serde::Deserialize;
use std::fmt;

/// A single message received from the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    /// Session bookkeeping (e.g. `init`).
    System { subtype: String },
    /// Text produced by the assistant.
    Assistant { text: String },
    /// Final summary of the turn.
    Result {
        subtype: String,
        result: Option<String>,
        is_error: bool,
    },
    /// A line that is not a recognised JSON message.
    Raw(String),
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireMessage {
    System {
        #[serde(default)]
        subtype: String,
    },
    Assistant {
        message: WireContent,
    },
    Result {
        #[serde(default)]
        subtype: String,
        #[serde(default)]
        result: Option<String>,
        #[serde(default)]
        is_error: bool,
    },
}

#[derive(Deserialize)]
struct WireContent {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    #[serde(other)]
    Other,
}

impl Message {
    pub fn assistant(text: impl Into<String>) -> Self {
        Message::Assistant { text: text.into() }
    }

    /// Decode one line of CLI output.
    pub fn from_line(line: &str) -> Self {
        let trimmed = line.trim();
        if !trimmed.starts_with('{') {
            return Message::Raw(trimmed.to_string());
        }

        match serde_json::from_str::<WireMessage>(trimmed) {
            Ok(WireMessage::System { subtype }) => Message::System { subtype },
            Ok(WireMessage::Assistant { message }) => {
                let text = message
                    .content
                    .into_iter()
                    .filter_map(|block| match block {
                        ContentBlock::Text { text } => Some(text),
                        ContentBlock::Other => None,
                    })
                    .collect::<Vec<_>>()
                    .join("");
                Message::Assistant { text }
            }
            Ok(WireMessage::Result {
                subtype,
                result,
                is_error,
            }) => Message::Result {
                subtype,
                result,
                is_error,
            },
            Err(_) => Message::Raw(trimmed.to_string()),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::System { subtype } => write!(f, "SystemMessage(subtype={})", subtype),
            Message::Assistant { text } => f.write_str(text),
            Message::Result {
                subtype,
                result,
                is_error,
            } => {
                write!(f, "ResultMessage(subtype={}, is_error={}", subtype, is_error)?;
                if let Some(result) = result {
                    write!(f, ", result={}", result)?;
                }
                f.write_str(")")
            }
            Message::Raw(line) => f.write_str(line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_line_is_raw() {
        let msg = Message::from_line("2+2は4です。\n");
        assert_eq!(msg, Message::Raw("2+2は4です。".into()));
        assert_eq!(msg.to_string(), "2+2は4です。");
    }

    #[test]
    fn test_system_init_line() {
        let msg = Message::from_line(r#"{"type":"system","subtype":"init","session_id":"abc","tools":[]}"#);
        assert_eq!(msg, Message::System { subtype: "init".into() });
        assert_eq!(msg.to_string(), "SystemMessage(subtype=init)");
    }

    #[test]
    fn test_assistant_text_blocks_are_joined() {
        let line = r#"{"type":"assistant","message":{"content":[{"type":"text","text":"2+2"},{"type":"tool_use","id":"x","name":"Bash","input":{}},{"type":"text","text":"=4"}]}}"#;
        assert_eq!(Message::from_line(line), Message::assistant("2+2=4"));
    }

    #[test]
    fn test_result_line() {
        let line = r#"{"type":"result","subtype":"success","is_error":false,"result":"4"}"#;
        let msg = Message::from_line(line);
        assert_eq!(
            msg,
            Message::Result {
                subtype: "success".into(),
                result: Some("4".into()),
                is_error: false,
            }
        );
        assert_eq!(msg.to_string(), "ResultMessage(subtype=success, is_error=false, result=4)");
    }

    #[test]
    fn test_unknown_json_is_kept_verbatim() {
        let line = r#"{"type":"user","message":{}}"#;
        assert_eq!(Message::from_line(line), Message::Raw(line.into()));
    }
}
