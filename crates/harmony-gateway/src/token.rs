//! Room access token signing.
//!
//! Mints HS256 JWTs with room grants for the realtime room service. The
//! room service itself is external; the gateway only issues credentials
//! it will accept.

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("room credentials not configured: set {0}")]
    MissingEnv(&'static str),
}

/// Signing credentials and room defaults.
#[derive(Clone)]
pub struct TokenConfig {
    pub api_key: String,
    api_secret: String,
    pub url: String,
    pub default_room: String,
    pub ttl_secs: i64,
}

impl fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenConfig")
            .field("api_key", &self.api_key)
            .field("api_secret", &"[REDACTED]")
            .field("url", &self.url)
            .field("default_room", &self.default_room)
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl TokenConfig {
    pub fn new(api_key: impl Into<String>, api_secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            url: "ws://localhost:7880".to_string(),
            default_room: "harmony-room".to_string(),
            ttl_secs: 6 * 3600,
        }
    }

    /// Read `ROOM_API_KEY` / `ROOM_API_SECRET` (required) and `ROOM_URL`
    /// (optional) from the environment.
    pub fn from_env() -> Result<Self, TokenError> {
        let api_key =
            std::env::var("ROOM_API_KEY").map_err(|_| TokenError::MissingEnv("ROOM_API_KEY"))?;
        let api_secret = std::env::var("ROOM_API_SECRET")
            .map_err(|_| TokenError::MissingEnv("ROOM_API_SECRET"))?;

        let mut config = Self::new(api_key, api_secret);
        if let Ok(url) = std::env::var("ROOM_URL") {
            config.url = url;
        }
        Ok(config)
    }

    /// Sign a room-access token for `identity` in `room`, granting join,
    /// publish, subscribe, and data-channel publish.
    pub fn mint(&self, identity: &str, room: &str) -> String {
        let header = serde_json::json!({"alg": "HS256", "typ": "JWT"});
        let now = chrono::Utc::now().timestamp();
        let claims = serde_json::json!({
            "iss": self.api_key,
            "sub": identity,
            "name": identity,
            "nbf": now,
            "exp": now + self.ttl_secs,
            "video": {
                "roomJoin": true,
                "room": room,
                "canPublish": true,
                "canSubscribe": true,
                "canPublishData": true,
            },
        });

        let signing_input = format!("{}.{}", encode_json(&header), encode_json(&claims));
        let mut mac = Hmac::<Sha256>::new_from_slice(self.api_secret.as_bytes())
            .expect("HMAC accepts any key length");
        mac.update(signing_input.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        format!("{signing_input}.{signature}")
    }
}

fn encode_json(value: &serde_json::Value) -> String {
    URL_SAFE_NO_PAD.encode(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> TokenConfig {
        TokenConfig::new("devkey", "devsecret")
    }

    fn decode_segment(segment: &str) -> serde_json::Value {
        let bytes = URL_SAFE_NO_PAD.decode(segment).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn token_has_three_segments_and_hs256_header() {
        let token = config().mint("browser-user", "harmony-room");
        let segments: Vec<&str> = token.split('.').collect();
        assert_eq!(segments.len(), 3);

        let header = decode_segment(segments[0]);
        assert_eq!(header["alg"], "HS256");
        assert_eq!(header["typ"], "JWT");
    }

    #[test]
    fn claims_carry_identity_and_grants() {
        let token = config().mint("alice", "demo-room");
        let segments: Vec<&str> = token.split('.').collect();
        let claims = decode_segment(segments[1]);

        assert_eq!(claims["iss"], "devkey");
        assert_eq!(claims["sub"], "alice");
        assert_eq!(claims["video"]["roomJoin"], true);
        assert_eq!(claims["video"]["room"], "demo-room");
        assert_eq!(claims["video"]["canPublishData"], true);
        assert!(claims["exp"].as_i64().unwrap() > chrono::Utc::now().timestamp());
    }

    #[test]
    fn signature_verifies_with_the_secret() {
        let token = config().mint("browser-user", "harmony-room");
        let (signing_input, signature) = token.rsplit_once('.').unwrap();

        let mut mac = Hmac::<Sha256>::new_from_slice(b"devsecret").unwrap();
        mac.update(signing_input.as_bytes());
        let expected = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        assert_eq!(signature, expected);
    }

    #[test]
    fn debug_redacts_secret() {
        let rendered = format!("{:?}", config());
        assert!(!rendered.contains("devsecret"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
