//! Report record, submission draft, author identity and vote transitions.

use serde::{Deserialize, Serialize};

use crate::types::{BusynessLevel, PlaceId, ReportId, VoteDirection, VoteState};

/// Maximum note length in characters accepted from the submission form.
pub const MAX_NOTE_CHARS: usize = 200;
/// Net votes (`upvotes - downvotes`) at which a report counts as verified.
pub const VERIFIED_NET_VOTES: i64 = 3;

/// Identity of a report submitter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Stable author id.
    pub id: String,
    /// Display name.
    pub name: String,
}

impl Author {
    /// Fixed identity used while no account system exists.
    pub fn guest() -> Self {
        Self {
            id: "guest".to_string(),
            name: "Guest User".to_string(),
        }
    }
}

/// Authoritative busyness report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    /// Stable report identifier.
    pub id: ReportId,
    /// Place this report belongs to.
    pub place_id: PlaceId,
    /// Submitter id.
    pub author_id: String,
    /// Submitter display name.
    pub author_name: String,
    /// Reported crowd level.
    #[serde(default)]
    pub busyness: BusynessLevel,
    /// Reported wait in minutes.
    #[serde(default)]
    pub wait_minutes: Option<u32>,
    /// Free text note.
    #[serde(default)]
    pub note: Option<String>,
    /// Opaque image reference.
    #[serde(default)]
    pub photo_ref: Option<String>,
    /// Creation timestamp in milliseconds since epoch.
    pub created_at_ms: u64,
    /// Upvote count including the viewer's vote.
    #[serde(default)]
    pub upvotes: u32,
    /// Downvote count including the viewer's vote.
    #[serde(default)]
    pub downvotes: u32,
    /// The viewer's own vote.
    #[serde(default, deserialize_with = "VoteState::deserialize_lenient")]
    pub vote_state: VoteState,
}

impl Report {
    /// `upvotes - downvotes`.
    pub fn net_votes(&self) -> i64 {
        i64::from(self.upvotes) - i64::from(self.downvotes)
    }

    /// True when net votes reach [`VERIFIED_NET_VOTES`].
    pub fn is_verified(&self) -> bool {
        self.net_votes() >= VERIFIED_NET_VOTES
    }

    /// Age relative to `now_ms`; zero for timestamps in the future.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.created_at_ms)
    }

    /// Applies one vote press and returns the previous state.
    ///
    /// Counters move so the viewer contributes to at most one of them.
    pub fn apply_vote(&mut self, direction: VoteDirection) -> VoteState {
        let prev = self.vote_state;
        let next = prev.toggled(direction);

        match prev {
            VoteState::Up => self.upvotes = self.upvotes.saturating_sub(1),
            VoteState::Down => self.downvotes = self.downvotes.saturating_sub(1),
            VoteState::None => {}
        }
        match next {
            VoteState::Up => self.upvotes = self.upvotes.saturating_add(1),
            VoteState::Down => self.downvotes = self.downvotes.saturating_add(1),
            VoteState::None => {}
        }

        self.vote_state = next;
        prev
    }
}

/// Submission payload used to create a new [`Report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDraft {
    /// Place being reported on.
    pub place_id: PlaceId,
    /// Reported crowd level.
    pub busyness: BusynessLevel,
    /// Reported wait in minutes.
    pub wait_minutes: Option<u32>,
    /// Free text note; the ledger stores whatever is set here.
    pub note: Option<String>,
    /// Opaque image reference.
    pub photo_ref: Option<String>,
    /// Submitter.
    pub author: Author,
}

impl ReportDraft {
    /// Draft from the guest identity with no optional fields.
    pub fn new(place_id: impl Into<PlaceId>, busyness: BusynessLevel) -> Self {
        Self {
            place_id: place_id.into(),
            busyness,
            wait_minutes: None,
            note: None,
            photo_ref: None,
            author: Author::guest(),
        }
    }

    /// Sets the wait time.
    pub fn with_wait(mut self, minutes: u32) -> Self {
        self.wait_minutes = Some(minutes);
        self
    }

    /// Sets the note, cut to the first [`MAX_NOTE_CHARS`] characters.
    ///
    /// Whitespace is kept as typed; only an empty note is dropped.
    pub fn with_note(mut self, note: &str) -> Self {
        self.note = if note.is_empty() {
            None
        } else {
            Some(note.chars().take(MAX_NOTE_CHARS).collect())
        };
        self
    }

    /// Sets the photo reference.
    pub fn with_photo(mut self, photo_ref: impl Into<String>) -> Self {
        self.photo_ref = Some(photo_ref.into());
        self
    }

    /// Overrides the author.
    pub fn with_author(mut self, author: Author) -> Self {
        self.author = author;
        self
    }
}
