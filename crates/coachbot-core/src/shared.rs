//! Shared record types persisted in the encrypted user store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Date format used for journal entries (`YYYY-MM-DD`).
pub const JOURNAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// One mood entry ("ressenti") in a user's journal. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub text: String,
    /// Local calendar date, `YYYY-MM-DD`.
    pub date: String,
}

impl JournalEntry {
    pub fn new(text: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            date: date.into(),
        }
    }

    /// Case-insensitive substring match on the entry text.
    pub fn mentions(&self, word: &str) -> bool {
        self.text.to_lowercase().contains(&word.to_lowercase())
    }

    /// `"{date}: {text}"`, the line format used in chat replies.
    pub fn display_line(&self) -> String {
        format!("{}: {}", self.date, self.text)
    }
}

/// Everything stored for one chat user.
///
/// All three sequences are always present (serde defaults them to empty), so a
/// record is never partially initialized even if an older file omitted a field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    #[serde(default)]
    pub journal: Vec<JournalEntry>,
    #[serde(default)]
    pub agenda: Vec<String>,
    #[serde(default)]
    pub exams: Vec<String>,
}

impl UserRecord {
    /// Journal entries whose text contains `word` (case-insensitive), in insertion order.
    pub fn search_journal(&self, word: &str) -> Vec<&JournalEntry> {
        self.journal.iter().filter(|e| e.mentions(word)).collect()
    }
}

/// All users' records keyed by chat user id. Serialized as
/// `{ uid: { journal: [{text, date}], agenda: [..], exams: [..] } }`.
pub type Dataset = BTreeMap<String, UserRecord>;

/// Today's local date formatted as [`JOURNAL_DATE_FORMAT`].
pub fn today_string() -> String {
    chrono::Local::now().format(JOURNAL_DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_missing_fields_default_to_empty() {
        let rec: UserRecord = serde_json::from_str(r#"{"agenda":["a"]}"#).unwrap();
        assert!(rec.journal.is_empty());
        assert_eq!(rec.agenda, vec!["a"]);
        assert!(rec.exams.is_empty());
    }

    #[test]
    fn search_is_case_insensitive() {
        let rec = UserRecord {
            journal: vec![
                JournalEntry::new("Très Fatigué ce matin", "2025-01-02"),
                JournalEntry::new("bonne journée", "2025-01-03"),
            ],
            ..Default::default()
        };
        let hits = rec.search_journal("fatigué");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].display_line(), "2025-01-02: Très Fatigué ce matin");
    }

    #[test]
    fn today_has_journal_shape() {
        let d = today_string();
        assert_eq!(d.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(&d, JOURNAL_DATE_FORMAT).is_ok());
    }
}
