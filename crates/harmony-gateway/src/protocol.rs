//! Browser-facing wire protocol. Field shapes round-trip through the wire
//! serialization unchanged; the browser extension depends on them.

use serde::{Deserialize, Serialize};

/// Messages a client sends over the WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// A user text turn (typed, or transcribed upstream).
    UserInput { text: String },
    /// Ask for the connection greeting.
    Activate,
    /// Ask for a signed room-access token.
    GetToken {
        #[serde(default)]
        identity: Option<String>,
        #[serde(default)]
        room: Option<String>,
    },
}

/// Messages the gateway sends back.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Response { message: String },
    Greeting { message: String },
    Token { token: String, url: String, room: String },
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_input_decodes() {
        let msg: ClientMessage =
            serde_json::from_str(r#"{"type":"user_input","text":"buy ds003"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::UserInput { text } if text == "buy ds003"));
    }

    #[test]
    fn activate_decodes() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"activate"}"#).unwrap();
        assert!(matches!(msg, ClientMessage::Activate));
    }

    #[test]
    fn get_token_decodes_with_and_without_fields() {
        let msg: ClientMessage = serde_json::from_str(r#"{"type":"get_token"}"#).unwrap();
        assert!(matches!(
            msg,
            ClientMessage::GetToken {
                identity: None,
                room: None
            }
        ));

        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"get_token","identity":"alice","room":"demo-room"}"#,
        )
        .unwrap();
        match msg {
            ClientMessage::GetToken { identity, room } => {
                assert_eq!(identity.as_deref(), Some("alice"));
                assert_eq!(room.as_deref(), Some("demo-room"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn unknown_type_is_rejected() {
        let result = serde_json::from_str::<ClientMessage>(r#"{"type":"shutdown"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn response_shape_is_stable() {
        let json = serde_json::to_string(&ServerMessage::Response {
            message: "Hi.".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"response","message":"Hi."}"#);
    }

    #[test]
    fn greeting_shape_is_stable() {
        let json = serde_json::to_string(&ServerMessage::Greeting {
            message: "Hey, how can I help you?".into(),
        })
        .unwrap();
        assert_eq!(json, r#"{"type":"greeting","message":"Hey, how can I help you?"}"#);
    }

    #[test]
    fn token_shape_is_stable() {
        let json = serde_json::to_string(&ServerMessage::Token {
            token: "abc".into(),
            url: "ws://localhost:7880".into(),
            room: "harmony-room".into(),
        })
        .unwrap();
        assert_eq!(
            json,
            r#"{"type":"token","token":"abc","url":"ws://localhost:7880","room":"harmony-room"}"#
        );
    }
}
