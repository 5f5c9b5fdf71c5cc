//! Session Summary Aggregator — rolls answer scores up into a readiness assessment.

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use crate::interview::models::{
    Answer, Question, QuestionCategory, ReadinessLevel, SessionSummary,
};

/// Overall score at or above which readiness is `High`.
pub const HIGH_READINESS_MIN: u32 = 75;
/// Overall score at or above which readiness is `Medium` (below `HIGH_READINESS_MIN`).
pub const MEDIUM_READINESS_MIN: u32 = 50;
/// Category average at or above which the category is a strong area.
pub const STRONG_AREA_MIN: u32 = 70;
/// Category average below which the category is a weak area.
pub const WEAK_AREA_BELOW: u32 = 50;

const EXCELLENT_OVERALL_MIN: u32 = 85;

pub fn readiness_for(score: u32) -> ReadinessLevel {
    if score >= HIGH_READINESS_MIN {
        ReadinessLevel::High
    } else if score >= MEDIUM_READINESS_MIN {
        ReadinessLevel::Medium
    } else {
        ReadinessLevel::Low
    }
}

/// Half-up rounded mean of non-negative integer scores. Empty input yields 0.
pub fn rounded_mean(scores: &[u32]) -> u32 {
    if scores.is_empty() {
        return 0;
    }
    let n = scores.len() as u64;
    let sum: u64 = scores.iter().map(|&s| s as u64).sum();
    ((2 * sum + n) / (2 * n)) as u32
}

/// Computes the summary for a session's answer set.
///
/// Answers whose question id is not in `questions` are ignored. Output depends
/// only on the inputs, so repeated calls are bit-identical.
pub fn summarize(questions: &[Question], answers: &[Answer], role: &str) -> SessionSummary {
    let categories: HashMap<Uuid, QuestionCategory> =
        questions.iter().map(|q| (q.id, q.category)).collect();

    let mut overall = Vec::with_capacity(answers.len());
    let mut grouped: BTreeMap<QuestionCategory, Vec<u32>> = BTreeMap::new();
    for answer in answers {
        let Some(category) = categories.get(&answer.question_id) else {
            continue;
        };
        overall.push(answer.score);
        grouped.entry(*category).or_default().push(answer.score);
    }

    let overall_score = rounded_mean(&overall);
    let readiness_level = readiness_for(overall_score);

    let category_scores: BTreeMap<QuestionCategory, u32> = grouped
        .iter()
        .map(|(category, scores)| (*category, rounded_mean(scores)))
        .collect();

    let strong_areas: Vec<QuestionCategory> = category_scores
        .iter()
        .filter(|&(_, &score)| score >= STRONG_AREA_MIN)
        .map(|(category, _)| *category)
        .collect();
    let weak_areas: Vec<QuestionCategory> = category_scores
        .iter()
        .filter(|&(_, &score)| score < WEAK_AREA_BELOW)
        .map(|(category, _)| *category)
        .collect();

    let recommendations = build_recommendations(overall.len(), overall_score, &weak_areas);
    let feedback_summary = build_feedback_summary(overall.len(), readiness_level, role);

    SessionSummary {
        overall_score,
        readiness_level,
        category_scores,
        strong_areas,
        weak_areas,
        recommendations,
        feedback_summary,
        answered_count: overall.len(),
        total_questions: questions.len(),
    }
}

fn recommendation_for(category: QuestionCategory) -> &'static str {
    match category {
        QuestionCategory::Behavioral => {
            "Practice more behavioral questions using the STAR method (Situation, Task, Action, Result)"
        }
        QuestionCategory::Technical => {
            "Review technical fundamentals and practice explaining concepts clearly with concrete examples"
        }
    }
}

fn build_recommendations(
    answered: usize,
    overall_score: u32,
    weak_areas: &[QuestionCategory],
) -> Vec<String> {
    if answered == 0 {
        return vec!["Complete the interview to receive feedback".to_string()];
    }
    if !weak_areas.is_empty() {
        return weak_areas
            .iter()
            .map(|c| recommendation_for(*c).to_string())
            .collect();
    }
    if overall_score >= EXCELLENT_OVERALL_MIN {
        vec!["Continue practicing to maintain your strong interview skills".to_string()]
    } else {
        vec!["Practice with more mock interviews to build confidence".to_string()]
    }
}

fn build_feedback_summary(answered: usize, readiness: ReadinessLevel, role: &str) -> String {
    if answered == 0 {
        return "Interview incomplete: no answers were submitted.".to_string();
    }
    match readiness {
        ReadinessLevel::High => format!(
            "Excellent interview performance for {role}. You communicated clearly and showed relevant experience."
        ),
        ReadinessLevel::Medium => format!(
            "Good performance with room for improvement. You have a solid foundation for {role}; strengthen answers with specific examples and clearer structure."
        ),
        ReadinessLevel::Low => format!(
            "Your performance shows areas to develop for {role}. Work through the recommendations and practice regularly."
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::models::Complexity;
    use chrono::{TimeZone, Utc};

    fn question(category: QuestionCategory) -> Question {
        Question {
            id: Uuid::new_v4(),
            text: format!("{category} question"),
            category,
            complexity: Complexity::Medium,
            expected_keywords: vec![],
        }
    }

    fn answer(question: &Question, score: u32) -> Answer {
        Answer {
            question_id: question.id,
            answer_text: "answer".to_string(),
            score,
            feedback: String::new(),
            strengths: vec![],
            improvements: vec![],
            scorer_backend: "heuristic".to_string(),
            submitted_at: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_mixed_scores_average_to_medium() {
        let qs = vec![
            question(QuestionCategory::Technical),
            question(QuestionCategory::Technical),
            question(QuestionCategory::Technical),
            question(QuestionCategory::Behavioral),
            question(QuestionCategory::Behavioral),
        ];
        let scores = [90, 80, 40, 60, 70];
        let answers: Vec<Answer> = qs.iter().zip(scores).map(|(q, s)| answer(q, s)).collect();

        let summary = summarize(&qs, &answers, "Frontend Engineer");
        assert_eq!(summary.overall_score, 68);
        assert_eq!(summary.readiness_level, ReadinessLevel::Medium);
        // technical (90+80+40)/3 = 70, behavioral (60+70)/2 = 65
        assert_eq!(summary.category_scores[&QuestionCategory::Technical], 70);
        assert_eq!(summary.category_scores[&QuestionCategory::Behavioral], 65);
        assert_eq!(summary.strong_areas, vec![QuestionCategory::Technical]);
        assert!(summary.weak_areas.is_empty());
        assert_eq!(summary.answered_count, 5);
    }

    #[test]
    fn test_zero_answers_is_low_with_no_areas() {
        let qs = vec![question(QuestionCategory::Behavioral)];
        let summary = summarize(&qs, &[], "Engineer");
        assert_eq!(summary.overall_score, 0);
        assert_eq!(summary.readiness_level, ReadinessLevel::Low);
        assert!(summary.strong_areas.is_empty());
        assert!(summary.weak_areas.is_empty());
        assert!(summary.category_scores.is_empty());
        assert_eq!(
            summary.recommendations,
            vec!["Complete the interview to receive feedback".to_string()]
        );
        assert_eq!(summary.total_questions, 1);
    }

    #[test]
    fn test_readiness_boundaries() {
        assert_eq!(readiness_for(75), ReadinessLevel::High);
        assert_eq!(readiness_for(74), ReadinessLevel::Medium);
        assert_eq!(readiness_for(50), ReadinessLevel::Medium);
        assert_eq!(readiness_for(49), ReadinessLevel::Low);
        assert_eq!(readiness_for(0), ReadinessLevel::Low);
        assert_eq!(readiness_for(100), ReadinessLevel::High);
    }

    #[test]
    fn test_weak_category_gets_one_recommendation() {
        let tech = question(QuestionCategory::Technical);
        let beh = question(QuestionCategory::Behavioral);
        let answers = vec![answer(&tech, 85), answer(&beh, 30)];
        let summary = summarize(&[tech, beh], &answers, "Engineer");
        assert_eq!(summary.weak_areas, vec![QuestionCategory::Behavioral]);
        assert_eq!(summary.strong_areas, vec![QuestionCategory::Technical]);
        assert_eq!(summary.recommendations.len(), 1);
        assert!(summary.recommendations[0].contains("STAR"));
    }

    #[test]
    fn test_middle_band_category_is_neither_strong_nor_weak() {
        let tech = question(QuestionCategory::Technical);
        let summary = summarize(&[tech.clone()], &[answer(&tech, 60)], "Engineer");
        assert!(summary.strong_areas.is_empty());
        assert!(summary.weak_areas.is_empty());
        assert_eq!(
            summary.recommendations,
            vec!["Practice with more mock interviews to build confidence".to_string()]
        );
    }

    #[test]
    fn test_summarize_is_idempotent() {
        let tech = question(QuestionCategory::Technical);
        let beh = question(QuestionCategory::Behavioral);
        let answers = vec![answer(&tech, 77), answer(&beh, 41)];
        let qs = vec![tech, beh];
        assert_eq!(
            summarize(&qs, &answers, "Dev"),
            summarize(&qs, &answers, "Dev")
        );
    }

    #[test]
    fn test_rounded_mean_half_up() {
        assert_eq!(rounded_mean(&[]), 0);
        assert_eq!(rounded_mean(&[1, 2]), 2);
        assert_eq!(rounded_mean(&[1, 1, 2]), 1);
        assert_eq!(rounded_mean(&[100, 100]), 100);
    }

    #[test]
    fn test_answers_for_unknown_questions_are_ignored() {
        let tech = question(QuestionCategory::Technical);
        let stray = question(QuestionCategory::Behavioral);
        let answers = vec![answer(&tech, 80), answer(&stray, 0)];
        let summary = summarize(&[tech], &answers, "Dev");
        assert_eq!(summary.overall_score, 80);
        assert_eq!(summary.answered_count, 1);
    }
}
