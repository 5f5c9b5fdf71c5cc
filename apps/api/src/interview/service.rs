//! Interview orchestration: the operations behind the HTTP surface.
//!
//! Flow per write: load → ownership check → validate → (evaluate) → mutate →
//! conditional update. A lost optimistic-concurrency race reloads and re-runs
//! the whole operation, so a concurrent duplicate answer surfaces as Conflict.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::evaluator::{evaluate, AnswerScorer};
use crate::interview::generator::QuestionGenerator;
use crate::interview::models::{Evaluation, Question, SessionSummary};
use crate::interview::random::StdRandom;
use crate::interview::session::{AnswerOutcome, InterviewSession};
use crate::interview::store::{HistoryQuery, SessionStore};

/// Attempts per write before giving up on a heavily contended session.
const MAX_WRITE_ATTEMPTS: u32 = 3;
pub const MAX_ROLE_CHARS: usize = 200;
pub const MAX_JOB_DESCRIPTION_CHARS: usize = 20_000;

/// Input for starting a session. Skills may come from a stored resume, the request, or both.
#[derive(Debug, Clone)]
pub struct StartParams {
    pub user_id: Uuid,
    pub target_role: String,
    pub job_description: String,
    pub resume_id: Option<Uuid>,
    pub skills: Vec<String>,
}

pub struct InterviewService {
    store: Arc<dyn SessionStore>,
    generator: QuestionGenerator,
    scorer: Arc<dyn AnswerScorer>,
    scorer_timeout: Duration,
    question_seed: Option<u64>,
}

impl InterviewService {
    pub fn new(
        store: Arc<dyn SessionStore>,
        generator: QuestionGenerator,
        scorer: Arc<dyn AnswerScorer>,
        scorer_timeout: Duration,
        question_seed: Option<u64>,
    ) -> Self {
        Self {
            store,
            generator,
            scorer,
            scorer_timeout,
            question_seed,
        }
    }

    /// Validates input, generates questions and persists a new in-progress session.
    pub async fn start(&self, params: StartParams) -> Result<InterviewSession, AppError> {
        let target_role = params.target_role.trim().to_string();
        let job_description = params.job_description.trim().to_string();
        validate_start(&target_role, &job_description)?;

        let mut skills = Vec::new();
        if let Some(resume_id) = params.resume_id {
            let resume_skills = self
                .store
                .resume_skills(params.user_id, resume_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Resume {resume_id} not found")))?;
            skills.extend(resume_skills);
        }
        skills.extend(params.skills);

        let mut rng = StdRandom::new(self.question_seed);
        let questions =
            self.generator
                .generate_questions(&skills, &job_description, &target_role, &mut rng);

        let session = InterviewSession::start(
            params.user_id,
            target_role,
            job_description,
            questions,
            Utc::now(),
        )?;
        self.store.insert(&session).await?;

        info!(
            "Started interview {} for user {} with {} questions",
            session.id,
            session.user_id,
            session.questions.len()
        );
        Ok(session)
    }

    /// Loads a session the caller owns. Foreign sessions are reported as not found.
    pub async fn get(&self, user_id: Uuid, id: Uuid) -> Result<InterviewSession, AppError> {
        let session = self
            .store
            .fetch(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Interview {id} not found")))?;
        if session.user_id != user_id {
            warn!("User {user_id} requested interview {id} owned by another user");
            return Err(AppError::Forbidden);
        }
        Ok(session)
    }

    pub async fn history(
        &self,
        user_id: Uuid,
        query: HistoryQuery,
    ) -> Result<(Vec<InterviewSession>, u64), AppError> {
        Ok(self.store.list(user_id, query).await?)
    }

    pub async fn submit_answer(
        &self,
        user_id: Uuid,
        id: Uuid,
        question_id: Uuid,
        answer_text: &str,
    ) -> Result<AnswerOutcome, AppError> {
        // Scored and stored text must be identical.
        let text = answer_text.trim();
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let mut session = self.get(user_id, id).await?;
            let question = session.prepare_answer(question_id, text)?.clone();

            let evaluation = self.evaluate_with_fallback(&question, text).await;
            let now = Utc::now();
            let outcome = session.record_answer(question_id, text, evaluation, now)?;

            if self.store.update(&session).await? {
                info!(
                    "Interview {id}: question {question_id} scored {} ({}% complete)",
                    outcome.answer.score, outcome.progress
                );
                return Ok(outcome);
            }
            warn!("Interview {id}: concurrent update on answer attempt {attempt}, retrying");
        }
        Err(AppError::Conflict(format!(
            "Interview {id} is being modified concurrently; retry the request"
        )))
    }

    pub async fn complete(&self, user_id: Uuid, id: Uuid) -> Result<SessionSummary, AppError> {
        for attempt in 1..=MAX_WRITE_ATTEMPTS {
            let mut session = self.get(user_id, id).await?;
            let summary = session.complete(Utc::now())?;

            if self.store.update(&session).await? {
                info!(
                    "Interview {id} completed: score {} ({:?})",
                    summary.overall_score, summary.readiness_level
                );
                return Ok(summary);
            }
            warn!("Interview {id}: concurrent update on complete attempt {attempt}, retrying");
        }
        Err(AppError::Conflict(format!(
            "Interview {id} is being modified concurrently; retry the request"
        )))
    }

    /// Runs the configured scorer under a timeout. Any failure degrades to the
    /// local heuristic; scorer errors never reach the caller.
    async fn evaluate_with_fallback(&self, question: &Question, answer_text: &str) -> Evaluation {
        match tokio::time::timeout(
            self.scorer_timeout,
            self.scorer.evaluate(question, answer_text),
        )
        .await
        {
            Ok(Ok(evaluation)) => evaluation,
            Ok(Err(e)) => {
                warn!(
                    "{} scorer failed, using heuristic evaluator: {e}",
                    self.scorer.backend()
                );
                evaluate(question, answer_text)
            }
            Err(_) => {
                warn!(
                    "{} scorer timed out after {:?}, using heuristic evaluator",
                    self.scorer.backend(),
                    self.scorer_timeout
                );
                evaluate(question, answer_text)
            }
        }
    }
}

fn validate_start(target_role: &str, job_description: &str) -> Result<(), AppError> {
    if target_role.is_empty() {
        return Err(AppError::Validation(
            "targetRole cannot be empty".to_string(),
        ));
    }
    if target_role.chars().count() > MAX_ROLE_CHARS {
        return Err(AppError::Validation(format!(
            "targetRole cannot exceed {MAX_ROLE_CHARS} characters"
        )));
    }
    if job_description.is_empty() {
        return Err(AppError::Validation(
            "jobDescription cannot be empty".to_string(),
        ));
    }
    if job_description.chars().count() > MAX_JOB_DESCRIPTION_CHARS {
        return Err(AppError::Validation(format!(
            "jobDescription cannot exceed {MAX_JOB_DESCRIPTION_CHARS} characters"
        )));
    }
    Ok(())
}
