use std::collections::{HashMap, HashSet};

use csv::ReaderBuilder;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::engine::row::{self, Question};
use crate::source::FetchError;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch question feed: {0}")]
    Fetch(#[from] FetchError),
    #[error("question feed contained no usable questions")]
    EmptyCatalog,
}

/// Configured display order for subjects and, per subject, for topics.
/// Names listed here sort first (in list order, only when present in the
/// data); everything else sorts alphabetically after them.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OrderingPolicy {
    #[serde(default)]
    pub subjects: Vec<String>,
    #[serde(default)]
    pub topics: HashMap<String, Vec<String>>,
}

/// The full validated question bank plus its subject/topic index.
/// Read-only after build; a reload replaces it wholesale.
#[derive(Clone, Debug)]
pub struct Catalog {
    pub questions: Vec<Question>,
    pub subjects: Vec<String>,
    pub topics_by_subject: HashMap<String, Vec<String>>,
}

impl Catalog {
    /// Parse the raw feed text (first line is a header) into a catalog.
    /// Rows are parsed independently; a malformed row is skipped. Zero
    /// surviving questions is an error, distinct from a fetch failure.
    pub fn build(
        raw: &str,
        ordering: &OrderingPolicy,
        rng: &mut impl Rng,
    ) -> Result<Self, LoadError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(raw.as_bytes());

        let mut questions: Vec<Question> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for record in reader.records() {
            let Ok(record) = record else { continue };
            if let Some(q) = row::parse_record(&record, rng) {
                // First occurrence wins when a feed repeats a question
                if seen.insert(q.text.clone()) {
                    questions.push(q);
                }
            }
        }
        if questions.is_empty() {
            return Err(LoadError::EmptyCatalog);
        }

        let present: Vec<String> = unique_in_order(questions.iter().map(|q| q.subject.clone()));
        let subjects = apply_preferred_order(present, &ordering.subjects);

        let mut topics_by_subject: HashMap<String, Vec<String>> = HashMap::new();
        for subject in &subjects {
            let present = unique_in_order(
                questions
                    .iter()
                    .filter(|q| &q.subject == subject)
                    .map(|q| q.topic.clone()),
            );
            let preferred = ordering
                .topics
                .get(subject)
                .map(Vec::as_slice)
                .unwrap_or(&[]);
            topics_by_subject.insert(subject.clone(), apply_preferred_order(present, preferred));
        }

        Ok(Self {
            questions,
            subjects,
            topics_by_subject,
        })
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn topics(&self, subject: &str) -> &[String] {
        self.topics_by_subject
            .get(subject)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

fn unique_in_order(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    names.filter(|n| seen.insert(n.clone())).collect()
}

/// Preferred names first (list order, present-only), the rest alphabetical.
fn apply_preferred_order(present: Vec<String>, preferred: &[String]) -> Vec<String> {
    let mut ordered: Vec<String> = preferred
        .iter()
        .filter(|p| present.contains(p))
        .cloned()
        .collect();
    let mut rest: Vec<String> = present
        .into_iter()
        .filter(|n| !preferred.contains(n))
        .collect();
    rest.sort();
    ordered.extend(rest);
    ordered
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    const HEADER: &str = "Question,Option1,Option2,Option3,Option4,CorrectAnswer,Explanation,Topic,Subject\n";

    fn build(raw: &str, ordering: &OrderingPolicy) -> Result<Catalog, LoadError> {
        let mut rng = SmallRng::seed_from_u64(1);
        Catalog::build(raw, ordering, &mut rng)
    }

    #[test]
    fn skips_bad_rows_and_keeps_good_ones() {
        let raw = format!(
            "{HEADER}Q1,a,b,c,d,a,,T1,S1\nbroken row\nQ2,a,b,c,d,z,,T1,S1\nQ3,a,b,c,d,b,,T2,S1\n"
        );
        let catalog = build(&raw, &OrderingPolicy::default()).unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn empty_feed_is_a_distinct_error() {
        let err = build(HEADER, &OrderingPolicy::default()).unwrap_err();
        assert!(matches!(err, LoadError::EmptyCatalog));

        let err = build(&format!("{HEADER}not,enough,fields\n"), &OrderingPolicy::default())
            .unwrap_err();
        assert!(matches!(err, LoadError::EmptyCatalog));
    }

    #[test]
    fn header_row_is_discarded() {
        // Header text would itself be a parseable row shape; it must not be.
        let raw = format!("{HEADER}Q1,a,b,c,d,a,,T1,S1\n");
        let catalog = build(&raw, &OrderingPolicy::default()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.questions[0].text, "Q1");
    }

    #[test]
    fn duplicate_question_text_keeps_first() {
        let raw = format!("{HEADER}Q1,a,b,c,d,a,first,T1,S1\nQ1,e,f,g,h,e,second,T2,S2\n");
        let catalog = build(&raw, &OrderingPolicy::default()).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.questions[0].explanation, "first");
    }

    #[test]
    fn subjects_follow_preferred_order_then_alphabetical() {
        let raw = format!(
            "{HEADER}Q1,a,b,c,d,a,,T,Zoology\nQ2,a,b,c,d,a,,T,Math\nQ3,a,b,c,d,a,,T,Art\nQ4,a,b,c,d,a,,T,History\n"
        );
        let ordering = OrderingPolicy {
            subjects: vec!["Math".into(), "Absent".into(), "History".into()],
            topics: HashMap::new(),
        };
        let catalog = build(&raw, &ordering).unwrap();
        assert_eq!(catalog.subjects, vec!["Math", "History", "Art", "Zoology"]);
    }

    #[test]
    fn topics_sorted_per_subject_with_fallback_alphabetical() {
        let raw = format!(
            "{HEADER}Q1,a,b,c,d,a,,Zeta,S1\nQ2,a,b,c,d,a,,Alpha,S1\nQ3,a,b,c,d,a,,Beta,S2\nQ4,a,b,c,d,a,,Acid,S2\n"
        );
        let mut topics = HashMap::new();
        topics.insert("S1".to_string(), vec!["Zeta".to_string()]);
        let ordering = OrderingPolicy {
            subjects: Vec::new(),
            topics,
        };
        let catalog = build(&raw, &ordering).unwrap();
        assert_eq!(catalog.topics("S1"), ["Zeta", "Alpha"]);
        assert_eq!(catalog.topics("S2"), ["Acid", "Beta"]);
        assert!(catalog.topics("S3").is_empty());
    }
}
