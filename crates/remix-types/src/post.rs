use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

use crate::platform::Platform;

/// Unique identifier for a saved post, wrapping a UUID v7 (time-sortable).
///
/// Only the Curation Store mints these; callers receive them back from
/// `create` and never construct one for a record that does not exist yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PostId(pub Uuid);

impl PostId {
    /// Create a new PostId using UUID v7.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Create a PostId from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for PostId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PostId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

/// Opaque identifier of the user owning a saved post.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One segmented unit of a generation reply, held only in memory.
///
/// Identity is positional: `ordinal` is the index within the filtered
/// reply and `cycle` the generation cycle that produced it. Two candidates
/// with identical text are still distinct, and so are identical replies from
/// different cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub content: String,
    pub platform: Platform,
    pub ordinal: usize,
    /// Zero until a controller stamps its cycle on it.
    #[serde(default)]
    pub cycle: u64,
}

impl Candidate {
    /// Number of characters, as counted against the platform limit.
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// A persisted, identity-bearing post record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SavedPost {
    pub id: PostId,
    pub content: String,
    pub platform: Platform,
    pub owner_id: OwnerId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Payload for creating a saved post. The Store assigns id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPost {
    pub content: String,
    pub platform: Platform,
    pub owner_id: OwnerId,
}

/// Review state of a working candidate.
///
/// `Generated -> Saving -> Saved` or `Generated -> Saving -> SaveFailed`,
/// from which a new save attempt moves back to `Saving`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CandidateState {
    Generated,
    Saving,
    Saved { id: PostId },
    SaveFailed { reason: String },
}

impl CandidateState {
    /// Whether a save may be started from this state.
    pub fn can_save(&self) -> bool {
        matches!(self, CandidateState::Generated | CandidateState::SaveFailed { .. })
    }
}

impl fmt::Display for CandidateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateState::Generated => write!(f, "generated"),
            CandidateState::Saving => write!(f, "saving"),
            CandidateState::Saved { .. } => write!(f, "saved"),
            CandidateState::SaveFailed { .. } => write!(f, "save_failed"),
        }
    }
}

/// Interaction state of a saved post on display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PostState {
    Viewing,
    Editing { draft: String },
    Updating { draft: String },
    Deleting,
}

impl Default for PostState {
    fn default() -> Self {
        PostState::Viewing
    }
}

impl fmt::Display for PostState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostState::Viewing => write!(f, "viewing"),
            PostState::Editing { .. } => write!(f, "editing"),
            PostState::Updating { .. } => write!(f, "updating"),
            PostState::Deleting => write!(f, "deleting"),
        }
    }
}

/// Stable key for transient "just saved" feedback.
///
/// Keyed by position before a save and by id after it, never by content,
/// so duplicate texts in one reply get independent feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedbackKey {
    Candidate { cycle: u64, ordinal: usize },
    Post { id: PostId },
}

/// A candidate together with its review state, for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct CandidateView {
    pub candidate: Candidate,
    pub state: CandidateState,
    pub just_saved: bool,
}

/// A saved post together with its interaction state, for presentation.
#[derive(Debug, Clone, Serialize)]
pub struct SavedPostView {
    pub post: SavedPost,
    pub state: PostState,
    pub just_saved: bool,
}
