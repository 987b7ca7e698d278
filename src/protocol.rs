//! Messages exchanged with the embedded game frame.
//!
//! Payloads are JSON objects `{ "type": TAG, ...fields }`. There is no version
//! field, so unknown fields are ignored on decode. Unknown tags, payloads
//! missing a required field, and anything not sent by the game frame itself
//! are dropped at this boundary.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::settings::Settings;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InboundMessage {
    GameReady,
    GameScore {
        score: f64,
    },
    /// The whole payload minus the tag is kept for the completion log.
    GameComplete {
        #[serde(flatten)]
        data: Map<String, Value>,
    },
    RequestFullscreen,
    ExitGame,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutboundMessage {
    Init { settings: Settings },
    PageHidden,
    PageVisible,
}

impl InboundMessage {
    /// Decodes a message event. `from_game_frame` must be true only when the
    /// event source is the embedded frame's own window.
    pub fn accept(from_game_frame: bool, data: Value) -> Option<Self> {
        if !from_game_frame {
            debug!("dropping message from foreign source");
            return None;
        }
        match serde_json::from_value(data) {
            Ok(msg) => Some(msg),
            Err(err) => {
                debug!(error = %err, "ignoring unrecognized frame message");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_known_tags_and_ignores_extra_fields() {
        assert_eq!(
            InboundMessage::accept(true, json!({"type": "GAME_READY", "version": 2})),
            Some(InboundMessage::GameReady)
        );
        assert_eq!(
            InboundMessage::accept(true, json!({"type": "GAME_SCORE", "score": 42, "lives": 3})),
            Some(InboundMessage::GameScore { score: 42.0 })
        );
        assert_eq!(
            InboundMessage::accept(true, json!({"type": "EXIT_GAME"})),
            Some(InboundMessage::ExitGame)
        );
    }

    #[test]
    fn completion_keeps_payload_without_tag() {
        let msg = InboundMessage::accept(true, json!({"type": "GAME_COMPLETE", "score": 9, "level": "3"}));
        let Some(InboundMessage::GameComplete { data }) = msg else {
            panic!("expected completion, got {msg:?}");
        };
        assert_eq!(data.get("score"), Some(&json!(9)));
        assert!(!data.contains_key("type"));
    }

    #[test]
    fn rejects_unknown_tags_foreign_sources_and_missing_fields() {
        assert!(InboundMessage::accept(true, json!({"type": "SELF_DESTRUCT"})).is_none());
        assert!(InboundMessage::accept(true, json!({"type": "GAME_SCORE"})).is_none());
        assert!(InboundMessage::accept(true, json!("GAME_READY")).is_none());
        assert!(InboundMessage::accept(false, json!({"type": "GAME_READY"})).is_none());
    }

    #[test]
    fn outbound_messages_are_tagged() {
        let hidden = serde_json::to_value(OutboundMessage::PageHidden).unwrap();
        assert_eq!(hidden, json!({"type": "PAGE_HIDDEN"}));
        let init = serde_json::to_value(OutboundMessage::Init {
            settings: Settings::default(),
        })
        .unwrap();
        assert_eq!(init["type"], "INIT");
        assert_eq!(init["settings"]["theme"], "dark");
    }
}
