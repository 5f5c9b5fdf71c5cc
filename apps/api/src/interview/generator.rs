//! Question Generator — turns resume skills and a target role into a bounded,
//! deduplicated question list.
//!
//! Flow: skills → bank category match → one random template per skill →
//!       cap technical questions → two behavioral questions → dedup → truncate.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use crate::interview::models::{Complexity, Question, QuestionCategory};
use crate::interview::question_bank::{QuestionBank, ROLE_PLACEHOLDER};
use crate::interview::random::RandomSource;

pub const DEFAULT_MAX_QUESTIONS: usize = 5;
pub const BEHAVIORAL_QUESTION_COUNT: usize = 2;
pub const STAR_KEYWORDS: [&str; 4] = ["situation", "task", "action", "result"];

#[derive(Debug, Clone)]
pub struct QuestionGenerator {
    bank: Arc<QuestionBank>,
    max_questions: usize,
}

impl QuestionGenerator {
    /// `max_questions` is clamped to at least the behavioral question count.
    pub fn new(bank: Arc<QuestionBank>, max_questions: usize) -> Self {
        Self {
            bank,
            max_questions: max_questions.max(BEHAVIORAL_QUESTION_COUNT),
        }
    }

    pub fn max_questions(&self) -> usize {
        self.max_questions
    }

    /// Generates the ordered question list for a new session.
    ///
    /// The job description does not influence selection; it is accepted so the
    /// call mirrors the session inputs and is logged for traceability.
    pub fn generate_questions(
        &self,
        resume_skills: &[String],
        job_description: &str,
        role: &str,
        rng: &mut dyn RandomSource,
    ) -> Vec<Question> {
        let technical_budget = self.max_questions - BEHAVIORAL_QUESTION_COUNT;
        let mut seen: HashSet<String> = HashSet::new();
        let mut questions = Vec::with_capacity(self.max_questions);

        for skill in resume_skills {
            if questions.len() >= technical_budget {
                break;
            }
            let normalized = skill.trim().to_lowercase();
            if normalized.is_empty() {
                continue;
            }
            let Some((category, templates)) = self.bank.match_category(&normalized) else {
                continue;
            };
            let template = &templates[rng.pick(templates.len())];
            if !seen.insert(template.text.clone()) {
                continue;
            }
            questions.push(Question {
                id: Uuid::new_v4(),
                text: template.text.clone(),
                category: QuestionCategory::Technical,
                complexity: template.complexity,
                expected_keywords: vec![
                    category.to_string(),
                    "experience".to_string(),
                    "implementation".to_string(),
                ],
            });
        }

        for text in self.pick_behavioral(role, rng) {
            if !seen.insert(text.clone()) {
                continue;
            }
            questions.push(Question {
                id: Uuid::new_v4(),
                text,
                category: QuestionCategory::Behavioral,
                complexity: Complexity::Medium,
                expected_keywords: STAR_KEYWORDS.iter().map(|k| k.to_string()).collect(),
            });
        }

        questions.truncate(self.max_questions);

        debug!(
            "Generated {} questions for role '{}' ({} skills, jd {} chars)",
            questions.len(),
            role,
            resume_skills.len(),
            job_description.len()
        );

        questions
    }

    /// Draws behavioral questions without replacement from the pool.
    fn pick_behavioral(&self, role: &str, rng: &mut dyn RandomSource) -> Vec<String> {
        let mut pool: Vec<&String> = self.bank.behavioral_pool().iter().collect();
        let mut picked = Vec::with_capacity(BEHAVIORAL_QUESTION_COUNT);
        while picked.len() < BEHAVIORAL_QUESTION_COUNT && !pool.is_empty() {
            let text = pool.remove(rng.pick(pool.len()));
            picked.push(text.replace(ROLE_PLACEHOLDER, role.trim()));
        }
        picked
    }
}
