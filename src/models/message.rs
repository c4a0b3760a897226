use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

/// A single chat message.
///
/// Identity is the numeric `id` alone: two messages with the same id are the
/// same message even if their text differs. Ids are ordered but not dense,
/// and may be negative once the list has been extended past the origin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message identifier
    pub id: i64,
    /// Message body
    pub text: String,
}

impl Message {
    /// Create a new message.
    pub fn new(id: i64, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    /// Number of text lines, used by hosts to size rows.
    pub fn line_count(&self) -> usize {
        self.text.lines().count().max(1)
    }
}

impl PartialEq for Message {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Message {}

impl Hash for Message {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
