use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How many of the most recent entries the history view shows.
pub const HISTORY_DISPLAY_LIMIT: usize = 5;

/// One generate action: what was asked, against which schema, and what came back.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub question: String,
    pub schema: String,
    pub sql: String,
}

impl HistoryEntry {
    pub fn new(
        question: impl Into<String>,
        schema: impl Into<String>,
        sql: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            question: question.into(),
            schema: schema.into(),
            sql: sql.into(),
        }
    }
}

/// Append-only record of the session's generate actions, oldest first.
#[derive(Clone, Debug, Default)]
pub struct History {
    entries: Vec<HistoryEntry>,
}

impl History {
    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// The entries on display: the last [`HISTORY_DISPLAY_LIMIT`], most recent last.
    pub fn recent(&self) -> &[HistoryEntry] {
        let start = self.entries.len().saturating_sub(HISTORY_DISPLAY_LIMIT);
        &self.entries[start..]
    }

    /// Look up an entry by its 1-based position in [`History::recent`].
    pub fn recent_nth(&self, position: usize) -> Option<&HistoryEntry> {
        position
            .checked_sub(1)
            .and_then(|index| self.recent().get(index))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// State owned by one interactive session.
#[derive(Clone, Debug, Default)]
pub struct Session {
    pub schema: String,
    pub history: History,
}
