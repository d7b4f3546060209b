//! Answer segmentation
//!
//! Partitions the flat stream of OCR lines into per-question answer spans.
//! A "current question" cursor starts at the default identifier and advances
//! whenever a line classified as a question header carries a numeric token.
//! Single left-to-right pass, no lookahead: a misclassified header cannot be
//! corrected later in the same run.

use crate::types::{AnswerMap, QuestionId};

/// Classifies a line as structural metadata (a question header) vs content.
///
/// Kept behind a trait so alternative grammars (regex-based, model-based)
/// can be substituted without touching the aggregation logic.
pub trait HeaderRule {
    fn is_header(&self, line: &str) -> bool;
}

/// Default header grammar: "Q2", "12.", "3)" and friends.
///
/// A line is a header when, after trimming and lowercasing, it
/// - starts with 'q' followed by a digit, or
/// - starts with one or two digits followed by '.' or ')', or
/// - has an entirely numeric first token once trailing '.' / ')' are
///   stripped.
#[derive(Debug, Default, Clone, Copy)]
pub struct NumericHeaderRule;

impl HeaderRule for NumericHeaderRule {
    fn is_header(&self, line: &str) -> bool {
        let t = line.trim().to_lowercase();
        let mut chars = t.chars();
        let (c0, c1, c2) = (chars.next(), chars.next(), chars.next());

        let q_prefix = c0 == Some('q') && c1.is_some_and(|c| c.is_ascii_digit());

        let digit_punct = match (c0, c1, c2) {
            (Some(a), Some(b), Some(c))
                if a.is_ascii_digit() && b.is_ascii_digit() && (c == '.' || c == ')') =>
            {
                true
            }
            (Some(a), Some(b), _) if a.is_ascii_digit() && (b == '.' || b == ')') => true,
            _ => false,
        };

        let numeric_token = t
            .split_whitespace()
            .next()
            .map(strip_header_token)
            .is_some_and(|token| is_numeric(&token));

        q_prefix || digit_punct || numeric_token
    }
}

/// Strip trailing "." / ")" then a leading "q"/"Q" from a header token.
fn strip_header_token(token: &str) -> String {
    token
        .trim_end_matches(['.', ')'])
        .trim_start_matches(['q', 'Q'])
        .to_string()
}

fn is_numeric(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|c| c.is_ascii_digit())
}

/// Group OCR lines into per-question answer spans.
///
/// Every line is assigned to exactly one question: the current one at the
/// time it is read. The default question exists even when the input is
/// empty or no header is ever detected. Fragments are joined with single
/// spaces and the result is trimmed.
pub fn segment(lines: &[String], rule: &dyn HeaderRule) -> AnswerMap {
    let mut grouped: indexmap::IndexMap<QuestionId, Vec<String>> = indexmap::IndexMap::new();
    let mut current = QuestionId::default();
    grouped.entry(current.clone()).or_default();

    for line in lines {
        if rule.is_header(line) {
            let trimmed = line.trim();
            let token = trimmed.split_whitespace().next().unwrap_or_default();
            let number = strip_header_token(token);
            if is_numeric(&number) {
                current = QuestionId::new(number);
                grouped.entry(current.clone()).or_default();
                // Text after the header token stays part of the answer
                let rest = trimmed[token.len()..].trim();
                if !rest.is_empty() {
                    grouped[&current].push(rest.to_string());
                }
            } else {
                grouped[&current].push(line.clone());
            }
        } else {
            grouped[&current].push(line.clone());
        }
    }

    grouped
        .into_iter()
        .map(|(qid, fragments)| (qid, fragments.join(" ").trim().to_string()))
        .collect()
}

/// Raw mode: fold every line into a single span under the default question.
pub fn flatten(lines: &[String]) -> AnswerMap {
    let mut answers = AnswerMap::new();
    let joined = lines
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();
    answers.insert(QuestionId::default(), joined);
    answers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn run(items: &[&str]) -> AnswerMap {
        segment(&lines(items), &NumericHeaderRule)
    }

    #[test]
    fn test_empty_input_yields_default_question() {
        let answers = run(&[]);
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[&QuestionId::default()], "");
    }

    #[test]
    fn test_no_headers_joins_under_default() {
        let answers = run(&["the mitochondria", "is the powerhouse"]);
        assert_eq!(answers.len(), 1);
        assert_eq!(
            answers[&QuestionId::default()],
            "the mitochondria is the powerhouse"
        );
    }

    #[test]
    fn test_q_prefixed_header_starts_new_span() {
        let answers = run(&["first answer", "Q2", "second answer"]);
        assert_eq!(answers[&QuestionId::new("1")], "first answer");
        assert_eq!(answers[&QuestionId::new("2")], "second answer");
    }

    #[test]
    fn test_dot_and_paren_headers() {
        let answers = run(&["2. photosynthesis", "2) also matches", "12) twelve"]);
        assert_eq!(
            answers[&QuestionId::new("2")],
            "photosynthesis also matches"
        );
        assert_eq!(answers[&QuestionId::new("12")], "twelve");
    }

    #[test]
    fn test_header_trailing_text_joins_new_span() {
        let answers = run(&["1) Paris", "is in France", "2) Berlin"]);
        assert_eq!(answers[&QuestionId::new("1")], "Paris is in France");
        assert_eq!(answers[&QuestionId::new("2")], "Berlin");
    }

    #[test]
    fn test_header_with_no_trailing_text_leaves_span_empty() {
        let answers = run(&["3."]);
        assert_eq!(answers[&QuestionId::new("3")], "");
        assert_eq!(answers[&QuestionId::default()], "");
    }

    #[test]
    fn test_prior_spans_unaffected_by_later_headers() {
        let answers = run(&["1. alpha", "beta", "2. gamma"]);
        assert_eq!(answers[&QuestionId::new("1")], "alpha beta");
        assert_eq!(answers[&QuestionId::new("2")], "gamma");
        assert_eq!(answers.len(), 2); // default "1" merged with header "1"
    }

    #[test]
    fn test_non_numeric_token_in_header_shaped_line_is_content() {
        // "3.14" trips the digit-punct grammar but the extracted token is
        // not numeric, so the line stays in the current span unchanged.
        let answers = run(&["1) pi", "3.14 approximately"]);
        assert_eq!(answers[&QuestionId::new("1")], "pi 3.14 approximately");
        assert_eq!(answers.len(), 1);
    }

    #[test]
    fn test_bare_numeric_token_header() {
        let answers = run(&["4 the fourth answer"]);
        assert_eq!(answers[&QuestionId::new("4")], "the fourth answer");
    }

    #[test]
    fn test_blank_lines_do_not_panic_and_stay_in_span() {
        let answers = run(&["1.", "", "  ", "text"]);
        assert_eq!(answers[&QuestionId::new("1")], "text");
    }

    #[test]
    fn test_revisiting_a_question_appends() {
        let answers = run(&["1. alpha", "2. beta", "1. gamma"]);
        assert_eq!(answers[&QuestionId::new("1")], "alpha gamma");
        assert_eq!(answers[&QuestionId::new("2")], "beta");
    }

    #[test]
    fn test_flatten_single_span() {
        let answers = flatten(&lines(&["1. alpha", "beta"]));
        assert_eq!(answers.len(), 1);
        assert_eq!(answers[&QuestionId::default()], "1. alpha beta");
    }

    #[test]
    fn test_flatten_empty() {
        let answers = flatten(&[]);
        assert_eq!(answers[&QuestionId::default()], "");
    }
}
