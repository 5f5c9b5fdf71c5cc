//! Answer Evaluator — scores one free-text answer against its question.
//!
//! `HeuristicScorer` is local and deterministic. `OracleScorer` blends in the
//! text-similarity service score when one is configured.
//!
//! `InterviewService` holds an `Arc<dyn AnswerScorer>` and falls back to the
//! heuristic whenever the configured scorer errors or times out.

use async_trait::async_trait;
use tracing::debug;

use crate::interview::models::{Evaluation, Question, QuestionCategory};
use crate::scoring_oracle::{OracleClient, OracleError};

// ────────────────────────────────────────────────────────────────────────────
// Scoring constants
// ────────────────────────────────────────────────────────────────────────────

pub const KEYWORD_POINTS: f64 = 60.0;
pub const LENGTH_POINTS: u32 = 20;
pub const EXAMPLE_POINTS: u32 = 10;
pub const METRIC_POINTS: u32 = 10;

/// Coverage credited when a question declares no expected keywords.
const NEUTRAL_COVERAGE: f64 = 0.5;
/// Below this many words an answer earns no length credit.
pub const MIN_ANSWER_WORDS: usize = 10;
/// Word count at which length credit is saturated; also the "detailed answer" threshold.
pub const TARGET_ANSWER_WORDS: usize = 60;
/// Improvements are only suggested below this score.
pub const IMPROVEMENT_THRESHOLD: u32 = 70;

const MAX_LISTED_ITEMS: usize = 5;
/// Weight of the oracle similarity score when blended with the heuristic.
const ORACLE_WEIGHT: f64 = 0.4;

const TOO_BRIEF: &str = "Answer is too brief. Provide more detail and specific examples.";
const NEEDS_METRICS: &str = "Add metrics or measurable results to show impact";
const NEEDS_EXAMPLE: &str = "Support your answer with a specific example from your experience";

const EXAMPLE_PHRASES: &[&str] = &[
    "for example",
    "for instance",
    "specifically",
    "such as",
    "e.g.",
];

const ACTION_VERBS: &[&str] = &[
    "achieved",
    "built",
    "created",
    "designed",
    "developed",
    "delivered",
    "implemented",
    "improved",
    "increased",
    "led",
    "managed",
    "optimized",
    "reduced",
    "resolved",
];

const SITUATION_SIGNALS: &[&str] = &[
    "situation",
    "context",
    "background",
    "project",
    "when i",
    "while",
];
const TASK_SIGNALS: &[&str] = &[
    "task",
    "responsib",
    "goal",
    "objective",
    "challenge",
    "problem",
];
const ACTION_SIGNALS: &[&str] = &[
    "action",
    "i did",
    "implemented",
    "created",
    "developed",
    "led",
    "decided",
    "approach",
];
const RESULT_SIGNALS: &[&str] = &[
    "result",
    "outcome",
    "achieved",
    "improved",
    "increased",
    "reduced",
    "learned",
    "impact",
];

/// STAR component → phrases that signal it in an answer.
const STAR_SIGNALS: &[(&str, &[&str])] = &[
    ("situation", SITUATION_SIGNALS),
    ("task", TASK_SIGNALS),
    ("action", ACTION_SIGNALS),
    ("result", RESULT_SIGNALS),
];

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Answer scoring strategy. Implement this to swap backends without touching
/// the session state machine or handlers.
#[async_trait]
pub trait AnswerScorer: Send + Sync {
    fn backend(&self) -> &'static str;

    async fn evaluate(
        &self,
        question: &Question,
        answer_text: &str,
    ) -> Result<Evaluation, OracleError>;
}

// ────────────────────────────────────────────────────────────────────────────
// HeuristicScorer — local default
// ────────────────────────────────────────────────────────────────────────────

pub struct HeuristicScorer;

#[async_trait]
impl AnswerScorer for HeuristicScorer {
    fn backend(&self) -> &'static str {
        "heuristic"
    }

    async fn evaluate(
        &self,
        question: &Question,
        answer_text: &str,
    ) -> Result<Evaluation, OracleError> {
        Ok(evaluate(question, answer_text))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// OracleScorer — remote similarity blended with the heuristic
// ────────────────────────────────────────────────────────────────────────────

pub struct OracleScorer(pub OracleClient);

#[async_trait]
impl AnswerScorer for OracleScorer {
    fn backend(&self) -> &'static str {
        "oracle"
    }

    async fn evaluate(
        &self,
        question: &Question,
        answer_text: &str,
    ) -> Result<Evaluation, OracleError> {
        let reference = format!("{} {}", question.text, question.expected_keywords.join(" "));
        let similarity = self.0.score(answer_text, &reference).await?;

        let signals = AnswerSignals::extract(question, answer_text);
        let heuristic = signals.score();
        let similarity_score = similarity.score.clamp(0.0, 100.0);
        let blended = heuristic as f64 * (1.0 - ORACLE_WEIGHT) + similarity_score * ORACLE_WEIGHT;
        let blended = blended.round() as u32;

        debug!(
            "Oracle similarity {:.2} blended with heuristic {} -> {}",
            similarity.score, heuristic, blended
        );

        let mut evaluation = signals.into_evaluation(blended, "oracle");
        if blended < IMPROVEMENT_THRESHOLD && !similarity.missing_keywords.is_empty() {
            let terms: Vec<&str> = similarity
                .missing_keywords
                .iter()
                .take(3)
                .map(String::as_str)
                .collect();
            push_capped(
                &mut evaluation.improvements,
                format!("Relate your answer more closely to: {}", terms.join(", ")),
            );
        }
        Ok(evaluation)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core heuristic
// ────────────────────────────────────────────────────────────────────────────

/// Scores an answer against the question's expected keywords, length and
/// evidence markers. Pure: identical inputs always produce identical output.
pub fn evaluate(question: &Question, answer_text: &str) -> Evaluation {
    let signals = AnswerSignals::extract(question, answer_text);
    let score = signals.score();
    signals.into_evaluation(score, "heuristic")
}

struct AnswerSignals {
    category: QuestionCategory,
    word_count: usize,
    keyword_total: usize,
    keywords_found: Vec<String>,
    keywords_missed: Vec<String>,
    has_example: bool,
    has_metric: bool,
    action_verbs: usize,
    star_missing: Vec<&'static str>,
}

impl AnswerSignals {
    fn extract(question: &Question, answer_text: &str) -> Self {
        let lower = answer_text.to_lowercase();

        let (keywords_found, keywords_missed): (Vec<String>, Vec<String>) = question
            .expected_keywords
            .iter()
            .cloned()
            .partition(|kw| lower.contains(&kw.to_lowercase()));

        let star_missing = STAR_SIGNALS
            .iter()
            .filter(|(_, phrases)| !phrases.iter().any(|p| lower.contains(p)))
            .map(|(component, _)| *component)
            .collect();

        Self {
            category: question.category,
            word_count: answer_text.split_whitespace().count(),
            keyword_total: question.expected_keywords.len(),
            keywords_found,
            keywords_missed,
            has_example: EXAMPLE_PHRASES.iter().any(|p| lower.contains(p)),
            has_metric: answer_text.chars().any(|c| c.is_ascii_digit()),
            action_verbs: ACTION_VERBS
                .iter()
                .filter(|v| contains_word(&lower, v))
                .count(),
            star_missing,
        }
    }

    fn coverage(&self) -> f64 {
        if self.keyword_total == 0 {
            NEUTRAL_COVERAGE
        } else {
            self.keywords_found.len() as f64 / self.keyword_total as f64
        }
    }

    fn score(&self) -> u32 {
        let keyword = (self.coverage() * KEYWORD_POINTS).round() as u32;
        let length = if self.word_count < MIN_ANSWER_WORDS {
            0
        } else {
            let scaled = LENGTH_POINTS * self.word_count as u32 / TARGET_ANSWER_WORDS as u32;
            scaled.min(LENGTH_POINTS)
        };
        let example = if self.has_example { EXAMPLE_POINTS } else { 0 };
        let metric = if self.has_metric { METRIC_POINTS } else { 0 };
        (keyword + length + example + metric).min(100)
    }

    fn into_evaluation(self, score: u32, backend: &str) -> Evaluation {
        let behavioral = self.category == QuestionCategory::Behavioral;

        let mut strengths = Vec::new();
        if self.keyword_total > 0 && self.coverage() >= 0.5 {
            strengths.push("Covers the core concept".to_string());
        }
        if self.word_count >= TARGET_ANSWER_WORDS || self.has_example {
            strengths.push("Includes specific examples".to_string());
        }
        if self.has_metric {
            strengths.push("Includes quantifiable results".to_string());
        }
        if behavioral && self.star_missing.len() <= 1 {
            strengths.push("Good use of STAR method structure".to_string());
        }
        if self.action_verbs >= 3 {
            strengths.push(
                "Strong use of action verbs demonstrating ownership".to_string(),
            );
        }
        if strengths.is_empty() {
            strengths.push("Answered the question directly".to_string());
        }
        strengths.truncate(MAX_LISTED_ITEMS);

        let mut improvements = Vec::new();
        if score < IMPROVEMENT_THRESHOLD {
            if self.word_count < MIN_ANSWER_WORDS {
                improvements.push(TOO_BRIEF.to_string());
            }
            if !self.has_metric {
                improvements.push(NEEDS_METRICS.to_string());
            }
            if !self.has_example {
                improvements.push(NEEDS_EXAMPLE.to_string());
            }
            if !self.keywords_missed.is_empty() {
                let missed: Vec<&str> = self
                    .keywords_missed
                    .iter()
                    .take(3)
                    .map(String::as_str)
                    .collect();
                improvements.push(format!("Consider addressing: {}", missed.join(", ")));
            }
            if behavioral && !self.star_missing.is_empty() {
                improvements.push(format!(
                    "Consider adding more about: {}",
                    self.star_missing.join(", ")
                ));
            }
            improvements.truncate(MAX_LISTED_ITEMS);
        }

        Evaluation {
            score,
            feedback: feedback_for(score).to_string(),
            strengths,
            improvements,
            keywords_found: self.keywords_found,
            keywords_missed: self.keywords_missed,
            scorer_backend: backend.to_string(),
        }
    }
}

fn feedback_for(score: u32) -> &'static str {
    match score {
        s if s >= 85 => {
            "Excellent answer! You demonstrated strong understanding and communicated effectively."
        }
        s if s >= 70 => {
            "Good answer with solid points. Some areas could be strengthened with more detail or examples."
        }
        s if s >= 55 => {
            "Adequate answer, but missing key elements. Focus on specific examples and address every part of the question."
        }
        _ => {
            "Answer needs improvement. Use the STAR method for behavioral questions and give concrete examples."
        }
    }
}

/// Whole-word match so "led" does not fire on "handled".
fn contains_word(haystack: &str, word: &str) -> bool {
    haystack
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| token == word)
}

fn push_capped(items: &mut Vec<String>, item: String) {
    if items.len() < MAX_LISTED_ITEMS {
        items.push(item);
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use axum::http::StatusCode;
    use serde_json::json;
    use uuid::Uuid;

    use crate::interview::generator::STAR_KEYWORDS;
    use crate::interview::models::Complexity;
    use crate::scoring_oracle::mock;

    /// Score at or above which an answer is in the top band.
    const TOP_BAND_SCORE: u32 = 80;
    const NODE_KEYWORDS: [&str; 3] = ["node", "experience", "implementation"];
    const STREAMING_KEYWORDS: [&str; 2] = ["kafka", "streaming"];

    fn question(category: QuestionCategory, keywords: &[&str]) -> Question {
        Question {
            id: Uuid::new_v4(),
            text: "How would you structure error handling in a Node.js API?".to_string(),
            category,
            complexity: Complexity::Medium,
            expected_keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    fn words(n: usize) -> String {
        vec!["word"; n].join(" ")
    }

    fn oracle_scorer(base_url: String) -> OracleScorer {
        OracleScorer(OracleClient::new(base_url, Duration::from_secs(2)).unwrap())
    }

    fn has_item(items: &[String], expected: &str) -> bool {
        items.iter().any(|item| item == expected)
    }

    #[test]
    fn test_all_keywords_and_long_answer_is_top_band() {
        let q = question(QuestionCategory::Technical, &NODE_KEYWORDS);
        let answer = format!(
            "In my node experience the implementation used middleware. {}",
            words(60)
        );
        let eval = evaluate(&q, &answer);
        // 60 keyword + 20 length, no example phrase or digits
        assert_eq!(eval.score, 80);
        assert!(eval.score >= TOP_BAND_SCORE);
        assert!(eval.improvements.is_empty());
        assert!(has_item(&eval.strengths, "Covers the core concept"));
        assert!(has_item(&eval.strengths, "Includes specific examples"));
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let q = question(QuestionCategory::Behavioral, &STAR_KEYWORDS);
        let answer = "The situation was a failed release; my task was to fix it. Result: good.";
        assert_eq!(evaluate(&q, answer), evaluate(&q, answer));
    }

    #[test]
    fn test_exact_score_for_partial_answer() {
        let q = question(QuestionCategory::Technical, &NODE_KEYWORDS);
        // 1/3 keywords -> 20, 12 words -> 20*12/60 = 4, no example, digit -> 10
        let answer = "I used node to cut latency by 30 ms in one service last year";
        let eval = evaluate(&q, answer);
        assert_eq!(eval.score, 34);
        assert_eq!(eval.keywords_found, vec!["node"]);
        assert_eq!(eval.keywords_missed, vec!["experience", "implementation"]);
        let expected = "Consider addressing: experience, implementation";
        assert!(has_item(&eval.improvements, expected));
        assert!(eval.feedback.starts_with("Answer needs improvement"));
    }

    #[test]
    fn test_empty_keywords_use_neutral_coverage() {
        let q = question(QuestionCategory::Technical, &[]);
        let eval = evaluate(&q, "short");
        assert_eq!(eval.score, 30);
        assert_eq!(eval.strengths, vec!["Answered the question directly"]);
    }

    #[test]
    fn test_brief_answer_gets_brief_feedback_first() {
        let q = question(QuestionCategory::Technical, &["node"]);
        let eval = evaluate(&q, "not sure");
        assert_eq!(eval.score, 0);
        assert_eq!(eval.improvements[0], TOO_BRIEF);
        assert!(eval.improvements.len() <= 5);
    }

    #[test]
    fn test_keyword_match_is_case_insensitive() {
        let q = question(QuestionCategory::Technical, &["Docker"]);
        let eval = evaluate(&q, "We ran everything in DOCKER containers");
        assert_eq!(eval.keywords_found, vec!["Docker"]);
    }

    #[test]
    fn test_behavioral_star_answer_scores_high() {
        let q = question(QuestionCategory::Behavioral, &STAR_KEYWORDS);
        let answer = format!(
            "The situation: our checkout service kept failing. My task was to stabilise it. \
             The action I took, for example, was adding retries and I led the rollout. \
             The result was a 40% drop in errors. {}",
            words(30)
        );
        let eval = evaluate(&q, &answer);
        // 60 keyword + 20 length (>= 60 words) + 10 example + 10 metric
        assert_eq!(eval.score, 100);
        assert!(has_item(
            &eval.strengths,
            "Good use of STAR method structure"
        ));
        assert!(eval.feedback.starts_with("Excellent"));
    }

    #[test]
    fn test_behavioral_missing_star_components_listed() {
        let q = question(QuestionCategory::Behavioral, &STAR_KEYWORDS);
        let eval = evaluate(&q, "I just worked hard and it was fine, honestly.");
        assert!(eval.score < IMPROVEMENT_THRESHOLD);
        let star_hint = eval
            .improvements
            .iter()
            .find(|i| i.starts_with("Consider adding more about:"));
        assert!(star_hint.is_some());
    }

    #[test]
    fn test_contains_word_is_whole_word() {
        assert!(contains_word("i led the team", "led"));
        assert!(!contains_word("i handled the team", "led"));
    }

    #[test]
    fn test_feedback_bands() {
        assert!(feedback_for(85).starts_with("Excellent"));
        assert!(feedback_for(70).starts_with("Good"));
        assert!(feedback_for(55).starts_with("Adequate"));
        assert!(feedback_for(54).starts_with("Answer needs improvement"));
    }

    #[tokio::test]
    async fn test_heuristic_scorer_matches_pure_function() {
        let q = question(QuestionCategory::Technical, &["node"]);
        let via_trait = HeuristicScorer.evaluate(&q, "node answer").await.unwrap();
        assert_eq!(via_trait, evaluate(&q, "node answer"));
        assert_eq!(via_trait.scorer_backend, "heuristic");
    }

    #[tokio::test]
    async fn test_oracle_scorer_blends_similarity_with_heuristic() {
        let reply = json!({ "score": 90, "matched_keywords": [], "missing_keywords": ["kafka"] });
        let (base_url, captured) = mock::spawn_analyze(StatusCode::OK, reply).await;
        let scorer = oracle_scorer(base_url);
        let q = question(QuestionCategory::Technical, &STREAMING_KEYWORDS);

        let eval = scorer.evaluate(&q, "short").await.unwrap();
        // heuristic 0, similarity 90: 0.6 * 0 + 0.4 * 90
        assert_eq!(eval.score, 36);
        assert_eq!(eval.scorer_backend, "oracle");
        assert_eq!(eval.keywords_missed, vec!["kafka", "streaming"]);
        assert_eq!(eval.improvements.len(), 5);
        let hint = "Relate your answer more closely to: kafka";
        assert!(has_item(&eval.improvements, hint));

        let request = captured.lock().unwrap().clone().unwrap();
        assert_eq!(request["resume_text"], "short");
        assert_eq!(
            request["job_description"],
            format!("{} kafka streaming", q.text)
        );
    }

    #[tokio::test]
    async fn test_oracle_scorer_skips_hint_in_passing_band() {
        let q = question(QuestionCategory::Technical, &NODE_KEYWORDS);
        let answer = format!(
            "In my node experience the implementation used middleware. {}",
            words(60)
        );
        let reply = json!({ "score": 50, "missing_keywords": ["kafka"] });
        let (base_url, _) = mock::spawn_analyze(StatusCode::OK, reply).await;
        let scorer = oracle_scorer(base_url);

        let eval = scorer.evaluate(&q, &answer).await.unwrap();
        // heuristic 80, similarity 50: 0.6 * 80 + 0.4 * 50
        assert_eq!(eval.score, 68);
        let hint = "Relate your answer more closely to: kafka";
        assert!(has_item(&eval.improvements, hint));

        let reply = json!({ "score": 100, "missing_keywords": ["kafka"] });
        let (base_url, _) = mock::spawn_analyze(StatusCode::OK, reply).await;
        let scorer = oracle_scorer(base_url);
        let eval = scorer.evaluate(&q, &answer).await.unwrap();
        assert_eq!(eval.score, 88);
        assert!(eval.improvements.is_empty());
    }

    #[tokio::test]
    async fn test_oracle_scorer_surfaces_service_errors() {
        let reply = json!({ "detail": "model not loaded" });
        let (base_url, _) = mock::spawn_analyze(StatusCode::SERVICE_UNAVAILABLE, reply).await;
        let scorer = oracle_scorer(base_url);
        let q = question(QuestionCategory::Technical, &NODE_KEYWORDS);

        let err = scorer.evaluate(&q, "answer").await.unwrap_err();
        assert!(matches!(err, OracleError::Api { status: 503, .. }));
    }
}
