use csv::StringRecord;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// Feed column order: question, option1..4, correct answer, explanation,
/// topic, subject. Columns past the ninth are ignored.
pub const FIELD_COUNT: usize = 9;

/// One validated multiple-choice question. Immutable once parsed; the option
/// order is shuffled exactly once, at parse time, and then fixed for the
/// lifetime of the value. Identity for dedup/history purposes is `text`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
    pub subject: String,
    pub topic: String,
}

impl Question {
    pub fn is_correct(&self, answer: &str) -> bool {
        answer == self.correct_answer
    }
}

/// Decode one feed record into a `Question`. Returns `None` for malformed
/// rows; the catalog skips those without failing the batch. Rejections:
/// fewer than 9 fields, empty question/answer/topic/subject, anything other
/// than exactly 4 non-empty options, or an answer key matching no option.
pub fn parse_record(record: &StringRecord, rng: &mut impl Rng) -> Option<Question> {
    if record.len() < FIELD_COUNT {
        return None;
    }
    let field = |i: usize| record.get(i).unwrap_or("").trim();

    let text = field(0);
    let correct_answer = field(5);
    let topic = field(7);
    let subject = field(8);
    if text.is_empty() || correct_answer.is_empty() || topic.is_empty() || subject.is_empty() {
        return None;
    }

    let mut options: Vec<String> = (1..=4)
        .map(field)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect();
    if options.len() != 4 {
        return None;
    }
    if !options.iter().any(|opt| opt == correct_answer) {
        return None;
    }
    options.shuffle(rng);

    Some(Question {
        text: text.to_string(),
        options,
        correct_answer: correct_answer.to_string(),
        explanation: field(6).to_string(),
        subject: subject.to_string(),
        topic: topic.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn record_from_row(row: &str) -> StringRecord {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(row.as_bytes());
        reader
            .records()
            .next()
            .expect("one record")
            .expect("valid csv")
    }

    fn parse_row(row: &str) -> Option<Question> {
        let mut rng = SmallRng::seed_from_u64(7);
        parse_record(&record_from_row(row), &mut rng)
    }

    #[test]
    fn parses_quoted_row_with_all_fields() {
        let q = parse_row(
            r#""What is 2+2?","3","4","5","6","4","Basic math",Arithmetic,Math"#,
        )
        .unwrap();
        assert_eq!(q.text, "What is 2+2?");
        assert_eq!(q.subject, "Math");
        assert_eq!(q.topic, "Arithmetic");
        assert_eq!(q.correct_answer, "4");
        assert_eq!(q.explanation, "Basic math");
        assert_eq!(q.options.len(), 4);
        assert!(q.options.contains(&"4".to_string()));
    }

    #[test]
    fn doubled_quotes_decode_to_literal_quote() {
        let q = parse_row(
            r#""He said ""go"", right?",a,b,c,d,a,,T,S"#,
        )
        .unwrap();
        assert_eq!(q.text, r#"He said "go", right?"#);
    }

    #[test]
    fn quoted_comma_is_not_a_separator() {
        let q = parse_row(r#"Q,"one, two",b,c,d,"one, two",why,T,S"#).unwrap();
        assert!(q.options.contains(&"one, two".to_string()));
        assert_eq!(q.correct_answer, "one, two");
    }

    #[test]
    fn fields_are_trimmed() {
        let q = parse_row("  Q  , a , b , c , d , a , e ,  T , S ").unwrap();
        assert_eq!(q.text, "Q");
        assert_eq!(q.topic, "T");
        assert!(q.options.contains(&"a".to_string()));
    }

    #[test]
    fn rejects_short_rows() {
        assert!(parse_row("Q,a,b,c,d,a,e,T").is_none());
        assert!(parse_row("Q").is_none());
    }

    #[test]
    fn rejects_blank_required_fields() {
        assert!(parse_row("Q,a,b,c,d,,e,T,S").is_none()); // no answer
        assert!(parse_row("Q,a,b,c,d,a,e,,S").is_none()); // no topic
        assert!(parse_row("Q,a,b,c,d,a,e,T,").is_none()); // no subject
        assert!(parse_row(",a,b,c,d,a,e,T,S").is_none()); // no question
    }

    #[test]
    fn rejects_blank_option() {
        assert!(parse_row("Q,a,b,c,,a,e,T,S").is_none());
        assert!(parse_row("Q,a,,,,a,e,T,S").is_none());
    }

    #[test]
    fn rejects_answer_not_among_options() {
        assert!(parse_row("Q,a,b,c,d,z,e,T,S").is_none());
    }

    #[test]
    fn empty_explanation_is_allowed() {
        let q = parse_row("Q,a,b,c,d,a,,T,S").unwrap();
        assert!(q.explanation.is_empty());
    }

    #[test]
    fn extra_trailing_columns_ignored() {
        let q = parse_row("Q,a,b,c,d,a,e,T,S,ignored,also").unwrap();
        assert_eq!(q.subject, "S");
        assert_eq!(q.options.len(), 4);
    }

    #[test]
    fn option_shuffle_is_deterministic_per_seed() {
        let row = "Q,a,b,c,d,a,e,T,S";
        let mut rng = SmallRng::seed_from_u64(42);
        let first = parse_record(&record_from_row(row), &mut rng).unwrap();
        let mut rng = SmallRng::seed_from_u64(42);
        let second = parse_record(&record_from_row(row), &mut rng).unwrap();
        assert_eq!(first.options, second.options);
    }

    #[test]
    fn shuffle_preserves_all_four_options() {
        let q = parse_row("Q,a,b,c,d,a,e,T,S").unwrap();
        let mut sorted = q.options.clone();
        sorted.sort();
        assert_eq!(sorted, vec!["a", "b", "c", "d"]);
        assert!(q.options.iter().any(|o| q.is_correct(o)));
    }
}
