use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::row::Question;

const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Bookmark {
    pub question: Question,
    pub added_at: DateTime<Utc>,
}

/// The persisted bookmark document. One file, one fixed name; every mutation
/// rewrites the whole set. Corrupt or missing data deserializes to default.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BookmarkData {
    pub schema_version: u32,
    pub bookmarks: Vec<Bookmark>,
}

impl Default for BookmarkData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            bookmarks: Vec::new(),
        }
    }
}

impl BookmarkData {
    pub fn contains(&self, text: &str) -> bool {
        self.bookmarks.iter().any(|b| b.question.text == text)
    }

    pub fn len(&self) -> usize {
        self.bookmarks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookmarks.is_empty()
    }

    /// Add or remove by question text. Returns true when the question ends
    /// up bookmarked. Toggling twice restores the prior set.
    pub fn toggle(&mut self, question: &Question) -> bool {
        if let Some(pos) = self
            .bookmarks
            .iter()
            .position(|b| b.question.text == question.text)
        {
            self.bookmarks.remove(pos);
            false
        } else {
            self.bookmarks.push(Bookmark {
                question: question.clone(),
                added_at: Utc::now(),
            });
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(text: &str) -> Question {
        Question {
            text: text.to_string(),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer: "a".to_string(),
            explanation: String::new(),
            subject: "S".to_string(),
            topic: "T".to_string(),
        }
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut data = BookmarkData::default();
        assert!(data.toggle(&question("Q1")));
        assert!(data.contains("Q1"));
        assert!(!data.toggle(&question("Q1")));
        assert!(data.is_empty());
    }

    #[test]
    fn double_toggle_restores_prior_set() {
        let mut data = BookmarkData::default();
        data.toggle(&question("Q1"));
        data.toggle(&question("Q2"));

        let before: Vec<String> = data.bookmarks.iter().map(|b| b.question.text.clone()).collect();
        data.toggle(&question("Q3"));
        data.toggle(&question("Q3"));
        let after: Vec<String> = data.bookmarks.iter().map(|b| b.question.text.clone()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn identity_is_question_text_only() {
        let mut data = BookmarkData::default();
        data.toggle(&question("Q1"));
        let mut other = question("Q1");
        other.subject = "Different".to_string();
        assert!(!data.toggle(&other), "same text removes despite other fields");
        assert!(data.is_empty());
    }
}
