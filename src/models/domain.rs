use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

/// Candidate profile as served by `GET /devs` and the `match` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct Profile {
    #[validate(length(min = 1))]
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(rename = "avatar", default)]
    pub avatar_uri: String,
}

impl Profile {
    /// Where the avatar should be loaded from
    pub fn avatar_source(&self) -> AvatarSource {
        AvatarSource::parse(&self.avatar_uri)
    }
}

/// Avatar reference, either a remote URI or an asset already bundled with the app
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "uri", rename_all = "lowercase")]
pub enum AvatarSource {
    Remote(String),
    Local(String),
    Missing,
}

impl AvatarSource {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return AvatarSource::Missing;
        }

        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            AvatarSource::Remote(raw.to_string())
        } else {
            AvatarSource::Local(raw.to_string())
        }
    }
}

/// Opaque identity of the signed-in user, fixed for the lifetime of a screen
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Verdict on the top card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Like,
    Dislike,
}

impl Decision {
    /// Collection segment used by `POST /devs/{id}/{segment}`
    pub fn path_segment(self) -> &'static str {
        match self {
            Decision::Like => "likes",
            Decision::Dislike => "dislikes",
        }
    }
}

/// Match announced by the backend over the realtime channel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchNotification {
    pub profile: Profile,
    pub received_at: chrono::DateTime<chrono::Utc>,
}

impl MatchNotification {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            received_at: chrono::Utc::now(),
        }
    }
}
