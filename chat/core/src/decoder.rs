//! Protocol Decoder
//!
//! Turns raw inbound text frames into [`ServerEvent`]s. Each frame is a
//! complete JSON document, so there is no reassembly. Decoding never fails:
//! anything unusable comes back as [`ServerEvent::Ignored`] with the reason,
//! and the session carries on.

use serde::Deserialize;
use serde_json::Value;

use crate::messages::{IgnoreReason, QuickAction, ServerEvent};
use crate::profile::Profile;

/// Wire shape of inbound frames, before normalisation
#[derive(Deserialize)]
#[serde(tag = "type")]
enum WireEvent {
    #[serde(rename = "message")]
    Message {
        #[serde(default)]
        message: Option<String>,
        #[serde(default, rename = "isFinished")]
        is_finished: Option<bool>,
    },
    #[serde(rename = "tool_call")]
    ToolCall {
        name: String,
        #[serde(default)]
        args: Option<Value>,
    },
    #[serde(rename = "quick_actions")]
    QuickActions {
        #[serde(default)]
        loading: Option<bool>,
        #[serde(default)]
        actions: Option<Vec<QuickAction>>,
    },
    #[serde(rename = "user_profile_updated")]
    ProfileUpdated { user_profile: Profile },
    #[serde(other)]
    Unknown,
}

impl From<WireEvent> for ServerEvent {
    fn from(wire: WireEvent) -> Self {
        match wire {
            WireEvent::Message {
                message,
                is_finished,
            } => Self::Message {
                content: message,
                finished: is_finished.unwrap_or(false),
            },
            WireEvent::ToolCall { name, args } => Self::ToolCall {
                name,
                args: args.map(|v| match v {
                    Value::String(s) => s,
                    other => other.to_string(),
                }),
            },
            WireEvent::QuickActions { loading, actions } => Self::QuickActions {
                loading: loading.unwrap_or(false),
                actions,
            },
            WireEvent::ProfileUpdated { user_profile } => Self::ProfileUpdated {
                profile: user_profile,
            },
            WireEvent::Unknown => Self::Ignored(IgnoreReason::Malformed),
        }
    }
}

/// Decode one inbound text frame
///
/// Never fails. Unusable frames decode to [`ServerEvent::Ignored`].
#[must_use]
pub fn decode(raw: &str) -> ServerEvent {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!(error = %e, "Dropping non-JSON frame");
            return ServerEvent::Ignored(IgnoreReason::Malformed);
        }
    };

    let kind = match value.as_object() {
        None => return ServerEvent::Ignored(IgnoreReason::Malformed),
        Some(object) => match object.get("type").and_then(Value::as_str) {
            Some(kind) => kind.to_string(),
            None => return ServerEvent::Ignored(IgnoreReason::MissingKind),
        },
    };

    match serde_json::from_value::<WireEvent>(value) {
        Ok(WireEvent::Unknown) => ServerEvent::Ignored(IgnoreReason::UnknownKind(kind)),
        Ok(wire) => wire.into(),
        Err(e) => {
            tracing::debug!(kind = %kind, error = %e, "Dropping frame with unusable fields");
            ServerEvent::Ignored(IgnoreReason::Malformed)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_decode_streaming_chunk() {
        let event = decode(r#"{"type":"message","message":"ab","isFinished":false}"#);
        assert_eq!(
            event,
            ServerEvent::Message {
                content: Some("ab".to_string()),
                finished: false,
            }
        );
    }

    #[test]
    fn test_decode_final_frame_with_null_content() {
        let event = decode(r#"{"type":"message","message":null,"isFinished":true}"#);
        assert_eq!(
            event,
            ServerEvent::Message {
                content: None,
                finished: true,
            }
        );
    }

    #[test]
    fn test_decode_missing_finished_flag_means_unfinished() {
        let event = decode(r#"{"type":"message","message":"a"}"#);
        assert!(matches!(event, ServerEvent::Message { finished: false, .. }));
    }

    #[test]
    fn test_decode_tool_call_keeps_string_args() {
        let event = decode(r#"{"type":"tool_call","name":"create_scatter_plot","args":"{\"x\":\"age\"}"}"#);
        assert_eq!(
            event,
            ServerEvent::ToolCall {
                name: "create_scatter_plot".to_string(),
                args: Some(r#"{"x":"age"}"#.to_string()),
            }
        );
    }

    #[test]
    fn test_decode_tool_call_without_args() {
        let event = decode(r#"{"type":"tool_call","name":"get_column_headers"}"#);
        assert_eq!(
            event,
            ServerEvent::ToolCall {
                name: "get_column_headers".to_string(),
                args: None,
            }
        );
    }

    #[test]
    fn test_decode_quick_actions_loading() {
        let event = decode(r#"{"type":"quick_actions","loading":true}"#);
        assert_eq!(
            event,
            ServerEvent::QuickActions {
                loading: true,
                actions: None,
            }
        );
    }

    #[test]
    fn test_decode_quick_actions_delivery() {
        let event =
            decode(r#"{"type":"quick_actions","actions":[{"label":"A","prompt":"P"}]}"#);
        assert_eq!(
            event,
            ServerEvent::QuickActions {
                loading: false,
                actions: Some(vec![QuickAction::new("A", "P")]),
            }
        );
    }

    #[test]
    fn test_decode_profile_update() {
        let event = decode(r#"{"type":"user_profile_updated","user_profile":"expert"}"#);
        assert_eq!(
            event,
            ServerEvent::ProfileUpdated {
                profile: Profile::Expert,
            }
        );
    }

    #[test]
    fn test_decode_rejects_non_json() {
        assert_eq!(
            decode("not json at all"),
            ServerEvent::Ignored(IgnoreReason::Malformed)
        );
        assert_eq!(decode("[1,2,3]"), ServerEvent::Ignored(IgnoreReason::Malformed));
    }

    #[test]
    fn test_decode_missing_discriminator() {
        assert_eq!(
            decode(r#"{"message":"hello"}"#),
            ServerEvent::Ignored(IgnoreReason::MissingKind)
        );
        assert_eq!(
            decode(r#"{"type":5}"#),
            ServerEvent::Ignored(IgnoreReason::MissingKind)
        );
    }

    #[test]
    fn test_decode_unknown_discriminator() {
        assert_eq!(
            decode(r#"{"type":"heartbeat","seq":1}"#),
            ServerEvent::Ignored(IgnoreReason::UnknownKind("heartbeat".to_string()))
        );
    }

    #[test]
    fn test_decode_known_kind_with_bad_fields() {
        assert_eq!(
            decode(r#"{"type":"user_profile_updated","user_profile":"wizard"}"#),
            ServerEvent::Ignored(IgnoreReason::Malformed)
        );
        assert_eq!(
            decode(r#"{"type":"tool_call"}"#),
            ServerEvent::Ignored(IgnoreReason::Malformed)
        );
    }
}
