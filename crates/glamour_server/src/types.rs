//! Identifier and value types shared across the server.

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Stable anonymous player identity, generated by the client.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    /// Wraps a raw id. Returns `None` for an empty or blank string.
    pub fn parse(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// The raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Messaging-bot chat id a player linked to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Wraps a raw chat id.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The raw chat id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque promo code. Issued at most once per player.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(transparent)]
pub struct PromoCode(String);

impl PromoCode {
    /// Wraps a raw code. Returns `None` for an empty or blank string.
    pub fn parse(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    /// The raw code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
