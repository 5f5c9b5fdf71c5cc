//! Interview Session State Machine.
//!
//! Transition table:
//!   not_started --start-->    in_progress
//!   in_progress --answer-->   in_progress
//!   in_progress --complete--> completed
//! Every other (status, action) pair is rejected. `completed` is terminal.
//!
//! Mutating methods validate fully before touching any field, so a failed
//! operation leaves the session unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::interview::models::{
    Answer, Evaluation, Question, SessionAction, SessionStatus, SessionSummary,
};
use crate::interview::summary::summarize;

pub const MAX_ANSWER_CHARS: usize = 10_000;

#[derive(Debug, Error, PartialEq)]
pub enum SessionError {
    #[error("Question {0} does not belong to this interview")]
    QuestionNotFound(Uuid),

    #[error("Question {0} has already been answered")]
    AlreadyAnswered(Uuid),

    #[error("Answer text cannot be empty")]
    EmptyAnswer,

    #[error("Answer text exceeds {} characters", MAX_ANSWER_CHARS)]
    AnswerTooLong,

    #[error("Interview has no questions")]
    NoQuestions,

    #[error("Cannot {action} an interview that is {status}")]
    InvalidTransition {
        status: SessionStatus,
        action: SessionAction,
    },
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::QuestionNotFound(_) => AppError::NotFound(err.to_string()),
            SessionError::AlreadyAnswered(_) => AppError::Conflict(err.to_string()),
            SessionError::EmptyAnswer | SessionError::AnswerTooLong | SessionError::NoQuestions => {
                AppError::Validation(err.to_string())
            }
            SessionError::InvalidTransition {
                status: SessionStatus::Completed,
                action: SessionAction::Answer,
            } => AppError::Gone(err.to_string()),
            SessionError::InvalidTransition { .. } => AppError::InvalidState(err.to_string()),
        }
    }
}

/// Looks up the status an action leads to from `status`, or `None` if illegal.
pub fn transition(status: SessionStatus, action: SessionAction) -> Option<SessionStatus> {
    use SessionAction::*;
    use SessionStatus::*;

    match (status, action) {
        (NotStarted, Start) => Some(InProgress),
        (InProgress, Answer) => Some(InProgress),
        (InProgress, Complete) => Some(Completed),
        _ => None,
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSession {
    pub id: Uuid,
    pub user_id: Uuid,
    pub target_role: String,
    pub job_description: String,
    pub status: SessionStatus,
    pub questions: Vec<Question>,
    pub answers: Vec<Answer>,
    pub summary: Option<SessionSummary>,
    /// Optimistic concurrency revision. Bumped by the store on every successful write.
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

/// Result of a successful answer submission.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    pub answer: Answer,
    pub evaluation: Evaluation,
    pub progress: u32,
    pub has_more_questions: bool,
    pub next_question: Option<Question>,
    /// Present when this answer finalized the session.
    pub summary: Option<SessionSummary>,
}

impl InterviewSession {
    /// Builds a session in `not_started` and applies the `start` transition.
    pub fn start(
        user_id: Uuid,
        target_role: String,
        job_description: String,
        questions: Vec<Question>,
        now: DateTime<Utc>,
    ) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::NoQuestions);
        }
        let mut session = Self {
            id: Uuid::new_v4(),
            user_id,
            target_role,
            job_description,
            status: SessionStatus::NotStarted,
            questions,
            answers: Vec::new(),
            summary: None,
            version: 0,
            created_at: now,
            completed_at: None,
        };
        session.status = session.guard(SessionAction::Start)?;
        Ok(session)
    }

    fn guard(&self, action: SessionAction) -> Result<SessionStatus, SessionError> {
        transition(self.status, action).ok_or(SessionError::InvalidTransition {
            status: self.status,
            action,
        })
    }

    pub fn is_answered(&self, question_id: Uuid) -> bool {
        self.answers.iter().any(|a| a.question_id == question_id)
    }

    /// The earliest question without an answer. `None` once every question is answered.
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.iter().find(|q| !self.is_answered(q.id))
    }

    /// `round(100 * answered / total)`, 0 for an empty session.
    pub fn progress(&self) -> u32 {
        let total = self.questions.len() as u64;
        if total == 0 {
            return 0;
        }
        let answered = self.answers.len() as u64;
        ((200 * answered + total) / (2 * total)) as u32
    }

    /// Runs every check `record_answer` performs and returns the target question.
    /// Call before evaluating so no scoring work is spent on a doomed submission.
    pub fn prepare_answer(
        &self,
        question_id: Uuid,
        answer_text: &str,
    ) -> Result<&Question, SessionError> {
        self.guard(SessionAction::Answer)?;
        let question = self
            .questions
            .iter()
            .find(|q| q.id == question_id)
            .ok_or(SessionError::QuestionNotFound(question_id))?;
        if self.is_answered(question_id) {
            return Err(SessionError::AlreadyAnswered(question_id));
        }
        let trimmed = answer_text.trim();
        if trimmed.is_empty() {
            return Err(SessionError::EmptyAnswer);
        }
        if trimmed.chars().count() > MAX_ANSWER_CHARS {
            return Err(SessionError::AnswerTooLong);
        }
        Ok(question)
    }

    /// Appends the evaluated answer. Answering the last open question finalizes the session.
    pub fn record_answer(
        &mut self,
        question_id: Uuid,
        answer_text: &str,
        evaluation: Evaluation,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, SessionError> {
        self.prepare_answer(question_id, answer_text)?;

        let answer = Answer {
            question_id,
            answer_text: answer_text.trim().to_string(),
            score: evaluation.score,
            feedback: evaluation.feedback.clone(),
            strengths: evaluation.strengths.clone(),
            improvements: evaluation.improvements.clone(),
            scorer_backend: evaluation.scorer_backend.clone(),
            submitted_at: now,
        };
        self.answers.push(answer.clone());

        let next_question = self.current_question().cloned();
        let summary = if next_question.is_none() {
            Some(self.complete(now)?)
        } else {
            None
        };

        Ok(AnswerOutcome {
            answer,
            evaluation,
            progress: self.progress(),
            has_more_questions: next_question.is_some(),
            next_question,
            summary,
        })
    }

    /// Summarizes the answers so far and moves the session to `completed`.
    pub fn complete(&mut self, now: DateTime<Utc>) -> Result<SessionSummary, SessionError> {
        let next = self.guard(SessionAction::Complete)?;
        let summary = summarize(&self.questions, &self.answers, &self.target_role);
        self.status = next;
        self.completed_at = Some(now);
        self.summary = Some(summary.clone());
        Ok(summary)
    }
}
