//! The extracted unit: one open-day session of one programme

use serde::{Deserialize, Serialize};

/// One session row harvested from a detail page
///
/// Every field is a plain string; absent values are stored as `""`, never
/// as null. The serialized field names match the documents already in the
/// store, including the accented `présence`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Programme name, taken from the detail page title
    pub formation: String,

    /// Session date badge
    pub date: String,

    /// Session schedule
    pub horaire: String,

    /// Attendance mode text
    #[serde(rename = "présence")]
    pub presence: String,

    /// Free-text comment left by the institution
    pub commentaire: String,

    /// Link found inside the arrow affordance
    pub lien: String,
}

impl Record {
    /// Builds the placeholder row emitted for a programme without sessions
    pub fn no_sessions(formation: impl Into<String>) -> Self {
        Self {
            formation: formation.into(),
            ..Self::default()
        }
    }

    /// Returns true if this is the placeholder row of [`Record::no_sessions`]
    pub fn is_sentinel(&self) -> bool {
        self.date.is_empty()
            && self.horaire.is_empty()
            && self.presence.is_empty()
            && self.commentaire.is_empty()
            && self.lien.is_empty()
    }
}
