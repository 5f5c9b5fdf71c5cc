use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::interview::models::{Answer, Question, SessionStatus, SessionSummary};
use crate::interview::session::InterviewSession;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewSessionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub target_role: String,
    pub job_description: String,
    pub status: String,
    pub questions: Json<Vec<Question>>,
    pub answers: Json<Vec<Answer>>,
    pub summary: Option<Json<SessionSummary>>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TryFrom<InterviewSessionRow> for InterviewSession {
    type Error = anyhow::Error;

    fn try_from(row: InterviewSessionRow) -> Result<Self, Self::Error> {
        let status = SessionStatus::parse(&row.status)
            .ok_or_else(|| anyhow::anyhow!("Unknown interview status '{}'", row.status))?;
        Ok(InterviewSession {
            id: row.id,
            user_id: row.user_id,
            target_role: row.target_role,
            job_description: row.job_description,
            status,
            questions: row.questions.0,
            answers: row.answers.0,
            summary: row.summary.map(|s| s.0),
            version: row.version,
            created_at: row.created_at,
            completed_at: row.completed_at,
        })
    }
}
