use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::engine::catalog::Catalog;
use crate::engine::row::Question;

/// Mixed-mode sessions always draw 25 questions.
pub const MIXED_COUNT: usize = 25;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizMode {
    Mixed,
    Topic,
}

impl QuizMode {
    pub fn as_str(self) -> &'static str {
        match self {
            QuizMode::Mixed => "mixed",
            QuizMode::Topic => "topic",
        }
    }
}

/// Topic quizzes let the user pick a length; `All` resolves to the size of
/// the filtered pool at selection time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QuizLength {
    Questions(usize),
    All,
}

impl QuizLength {
    fn resolve(self, pool_len: usize) -> usize {
        match self {
            QuizLength::Questions(n) => n,
            QuizLength::All => pool_len,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PoolSpec {
    pub mode: QuizMode,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub length: QuizLength,
    /// Subjects kept out of randomized mixed play. Policy, not domain
    /// knowledge; comes from config and defaults to empty.
    pub excluded_subjects: Vec<String>,
}

impl PoolSpec {
    pub fn mixed(excluded_subjects: Vec<String>) -> Self {
        Self {
            mode: QuizMode::Mixed,
            subject: None,
            topic: None,
            length: QuizLength::Questions(MIXED_COUNT),
            excluded_subjects,
        }
    }

    pub fn topic(subject: &str, topic: &str, length: QuizLength) -> Self {
        Self {
            mode: QuizMode::Topic,
            subject: Some(subject.to_string()),
            topic: Some(topic.to_string()),
            length,
            excluded_subjects: Vec::new(),
        }
    }

    fn matches(&self, q: &Question) -> bool {
        match self.mode {
            QuizMode::Mixed => !self.excluded_subjects.iter().any(|s| s == &q.subject),
            QuizMode::Topic => {
                self.subject.as_deref() == Some(q.subject.as_str())
                    && self.topic.as_deref() == Some(q.topic.as_str())
            }
        }
    }
}

/// Compute the working set for one quiz instance and record it in `history`.
///
/// Questions already served this play streak are excluded. When fewer unseen
/// questions remain than the spec asks for, the streak has effectively
/// exhausted the pool: the history is cleared and selection restarts from
/// the full pool rather than serving a dwindling tail. An empty result means
/// the pool itself had nothing for this selection; the caller must not start
/// a session from it.
pub fn select_pool(
    catalog: &Catalog,
    spec: &PoolSpec,
    history: &mut HashSet<String>,
    rng: &mut impl Rng,
) -> Vec<Question> {
    let pool: Vec<&Question> = catalog.questions.iter().filter(|q| spec.matches(q)).collect();
    let desired = spec.length.resolve(pool.len());

    let mut available: Vec<&Question> = pool
        .iter()
        .copied()
        .filter(|q| !history.contains(&q.text))
        .collect();

    if available.len() < desired && !history.is_empty() {
        history.clear();
        available = pool;
    }
    if available.is_empty() {
        return Vec::new();
    }

    available.shuffle(rng);
    let take = desired.min(available.len());
    let working: Vec<Question> = available[..take].iter().map(|&q| q.clone()).collect();
    for q in &working {
        history.insert(q.text.clone());
    }
    working
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::engine::catalog::{Catalog, OrderingPolicy};

    fn catalog(rows: &[(&str, &str, &str)]) -> Catalog {
        let mut raw =
            String::from("Question,Option1,Option2,Option3,Option4,CorrectAnswer,Explanation,Topic,Subject\n");
        for (text, topic, subject) in rows {
            raw.push_str(&format!("{text},a,b,c,d,a,,{topic},{subject}\n"));
        }
        let mut rng = SmallRng::seed_from_u64(3);
        Catalog::build(&raw, &OrderingPolicy::default(), &mut rng).unwrap()
    }

    fn numbered(n: usize) -> Catalog {
        let rows: Vec<(String, &str, &str)> =
            (0..n).map(|i| (format!("Q{i}"), "T", "S")).collect();
        let refs: Vec<(&str, &str, &str)> =
            rows.iter().map(|(t, tp, s)| (t.as_str(), *tp, *s)).collect();
        catalog(&refs)
    }

    #[test]
    fn takes_desired_count_and_records_history() {
        let cat = numbered(30);
        let mut history = HashSet::new();
        let mut rng = SmallRng::seed_from_u64(9);
        let set = select_pool(&cat, &PoolSpec::mixed(Vec::new()), &mut history, &mut rng);
        assert_eq!(set.len(), MIXED_COUNT);
        assert_eq!(history.len(), MIXED_COUNT);
        assert!(set.iter().all(|q| history.contains(&q.text)));
    }

    #[test]
    fn short_pool_yields_short_set_not_padding() {
        let cat = catalog(&[("Q1", "T", "S"), ("Q2", "T", "S"), ("Q3", "T", "S")]);
        let mut history = HashSet::new();
        let mut rng = SmallRng::seed_from_u64(9);
        let spec = PoolSpec::topic("S", "T", QuizLength::Questions(10));
        let set = select_pool(&cat, &spec, &mut history, &mut rng);
        assert_eq!(set.len(), 3);
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn exhausted_pool_resets_history_and_serves_full_pool_again() {
        let cat = numbered(5);
        let mut history = HashSet::new();
        let mut rng = SmallRng::seed_from_u64(9);
        let spec = PoolSpec::topic("S", "T", QuizLength::Questions(5));

        let first = select_pool(&cat, &spec, &mut history, &mut rng);
        assert_eq!(first.len(), 5);
        assert_eq!(history.len(), 5);

        let second = select_pool(&cat, &spec, &mut history, &mut rng);
        assert_eq!(second.len(), 5, "reset must serve the full pool, not zero");
        assert_eq!(history.len(), 5);
    }

    #[test]
    fn partial_exhaustion_also_resets() {
        let cat = numbered(8);
        let mut history: HashSet<String> =
            (0..6).map(|i| format!("Q{i}")).collect();
        let mut rng = SmallRng::seed_from_u64(9);
        let spec = PoolSpec::topic("S", "T", QuizLength::Questions(5));

        // Only 2 unseen remain, fewer than desired: full reset, full draw.
        let set = select_pool(&cat, &spec, &mut history, &mut rng);
        assert_eq!(set.len(), 5);
        assert_eq!(history.len(), 5);
    }

    #[test]
    fn empty_pool_returns_empty_set() {
        let cat = numbered(3);
        let mut history = HashSet::new();
        let mut rng = SmallRng::seed_from_u64(9);
        let spec = PoolSpec::topic("S", "Nope", QuizLength::Questions(10));
        assert!(select_pool(&cat, &spec, &mut history, &mut rng).is_empty());
        assert!(history.is_empty());
    }

    #[test]
    fn mixed_mode_honors_subject_exclusions() {
        let cat = catalog(&[
            ("Q1", "T", "General"),
            ("Q2", "T", "General"),
            ("Q3", "T", "Language"),
        ]);
        let mut history = HashSet::new();
        let mut rng = SmallRng::seed_from_u64(9);
        let spec = PoolSpec {
            length: QuizLength::Questions(10),
            ..PoolSpec::mixed(vec!["Language".to_string()])
        };
        let set = select_pool(&cat, &spec, &mut history, &mut rng);
        assert_eq!(set.len(), 2);
        assert!(set.iter().all(|q| q.subject == "General"));
    }

    #[test]
    fn all_length_resolves_to_pool_size_at_selection() {
        let cat = numbered(7);
        let mut history = HashSet::new();
        let mut rng = SmallRng::seed_from_u64(9);
        let spec = PoolSpec::topic("S", "T", QuizLength::All);
        let set = select_pool(&cat, &spec, &mut history, &mut rng);
        assert_eq!(set.len(), 7);
    }

    #[test]
    fn topic_filter_requires_subject_and_topic_match() {
        let cat = catalog(&[
            ("Q1", "Algebra", "Math"),
            ("Q2", "Algebra", "Physics"),
            ("Q3", "Geometry", "Math"),
        ]);
        let mut history = HashSet::new();
        let mut rng = SmallRng::seed_from_u64(9);
        let spec = PoolSpec::topic("Math", "Algebra", QuizLength::All);
        let set = select_pool(&cat, &spec, &mut history, &mut rng);
        assert_eq!(set.len(), 1);
        assert_eq!(set[0].text, "Q1");
    }
}
