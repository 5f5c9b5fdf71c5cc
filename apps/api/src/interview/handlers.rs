use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::CallerId;
use crate::errors::AppError;
use crate::interview::models::{Answer, Evaluation, Question, SessionStatus, SessionSummary};
use crate::interview::service::StartParams;
use crate::interview::session::InterviewSession;
use crate::interview::store::HistoryQuery;
use crate::state::AppState;

pub const DEFAULT_HISTORY_LIMIT: u32 = 10;
pub const MAX_HISTORY_LIMIT: u32 = 50;

/// `{ "success": true, "data": … }`
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Json<Self> {
        Json(Self {
            success: true,
            data,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Request bodies
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInterviewRequest {
    #[serde(default)]
    pub target_role: String,
    #[serde(default)]
    pub job_description: String,
    pub resume_id: Option<Uuid>,
    #[serde(default)]
    pub skills: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerRequest {
    #[serde(default)]
    pub question_id: String,
    #[serde(default)]
    pub answer_text: String,
}

#[derive(Deserialize)]
pub struct HistoryParams {
    pub status: Option<String>,
    pub limit: Option<u32>,
    pub page: Option<u32>,
}

impl HistoryParams {
    fn into_query(self) -> Result<HistoryQuery, AppError> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => Some(SessionStatus::parse(raw).ok_or_else(|| {
                AppError::Validation(format!("Unknown interview status '{raw}'"))
            })?),
        };

        let limit = self.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        if !(1..=MAX_HISTORY_LIMIT).contains(&limit) {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {MAX_HISTORY_LIMIT}"
            )));
        }
        let page = self.page.unwrap_or(1);
        if page < 1 {
            return Err(AppError::Validation("page must be at least 1".to_string()));
        }

        Ok(HistoryQuery {
            status,
            limit,
            page,
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Response bodies
// ────────────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartInterviewResponse {
    pub interview_id: Uuid,
    pub status: SessionStatus,
    pub questions: Vec<Question>,
    pub current_question: Option<Question>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewDetailResponse {
    pub interview_id: Uuid,
    pub target_role: String,
    pub status: SessionStatus,
    pub progress: u32,
    pub questions: Vec<Question>,
    pub answers: Vec<Answer>,
    pub next_question: Option<Question>,
    pub summary: Option<SessionSummary>,
}

impl From<InterviewSession> for InterviewDetailResponse {
    fn from(session: InterviewSession) -> Self {
        let progress = session.progress();
        let next_question = session.current_question().cloned();
        Self {
            interview_id: session.id,
            target_role: session.target_role,
            status: session.status,
            progress,
            questions: session.questions,
            answers: session.answers,
            next_question,
            summary: session.summary,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswerResponse {
    pub evaluation: Evaluation,
    pub progress: u32,
    pub has_more_questions: bool,
    pub next_question: Option<Question>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SessionSummary>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub interview_id: Uuid,
    pub target_role: String,
    pub status: SessionStatus,
    pub progress: u32,
    pub question_count: usize,
    pub overall_score: Option<u32>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub completed_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub interviews: Vec<HistoryItem>,
    pub pagination: Pagination,
}

#[derive(Serialize)]
pub struct CompleteResponse {
    pub summary: SessionSummary,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/interview/start
pub async fn handle_start(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    payload: Result<Json<StartInterviewRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<StartInterviewResponse>>), AppError> {
    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;

    let session = state
        .interviews
        .start(StartParams {
            user_id,
            target_role: req.target_role,
            job_description: req.job_description,
            resume_id: req.resume_id,
            skills: req.skills,
        })
        .await?;

    let current_question = session.current_question().cloned();
    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(StartInterviewResponse {
            interview_id: session.id,
            status: session.status,
            questions: session.questions,
            current_question,
        }),
    ))
}

/// GET /api/v1/interview/history
pub async fn handle_history(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    params: Result<Query<HistoryParams>, QueryRejection>,
) -> Result<Json<ApiResponse<HistoryResponse>>, AppError> {
    let Query(params) = params.map_err(|e| AppError::Validation(e.body_text()))?;
    let query = params.into_query()?;

    let (sessions, total) = state.interviews.history(user_id, query).await?;
    let interviews = sessions
        .into_iter()
        .map(|s| HistoryItem {
            interview_id: s.id,
            progress: s.progress(),
            question_count: s.questions.len(),
            overall_score: s.summary.as_ref().map(|summary| summary.overall_score),
            target_role: s.target_role,
            status: s.status,
            created_at: s.created_at,
            completed_at: s.completed_at,
        })
        .collect();

    let limit = query.limit as u64;
    Ok(ApiResponse::ok(HistoryResponse {
        interviews,
        pagination: Pagination {
            page: query.page,
            limit: query.limit,
            total,
            total_pages: total.div_ceil(limit),
        },
    }))
}

/// GET /api/v1/interview/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<InterviewDetailResponse>>, AppError> {
    let id = parse_interview_id(&id)?;
    let session = state.interviews.get(user_id, id).await?;
    Ok(ApiResponse::ok(session.into()))
}

/// POST /api/v1/interview/:id/answer
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Path(id): Path<String>,
    payload: Result<Json<SubmitAnswerRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<SubmitAnswerResponse>>, AppError> {
    let id = parse_interview_id(&id)?;
    let Json(req) = payload.map_err(|e| AppError::Validation(e.body_text()))?;
    let question_id = Uuid::parse_str(req.question_id.trim()).map_err(|_| {
        AppError::NotFound(format!("Question {} not found", req.question_id.trim()))
    })?;

    let outcome = state
        .interviews
        .submit_answer(user_id, id, question_id, &req.answer_text)
        .await?;

    Ok(ApiResponse::ok(SubmitAnswerResponse {
        evaluation: outcome.evaluation,
        progress: outcome.progress,
        has_more_questions: outcome.has_more_questions,
        next_question: outcome.next_question,
        summary: outcome.summary,
    }))
}

/// POST /api/v1/interview/:id/complete
pub async fn handle_complete(
    State(state): State<AppState>,
    CallerId(user_id): CallerId,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<CompleteResponse>>, AppError> {
    let id = parse_interview_id(&id)?;
    let summary = state.interviews.complete(user_id, id).await?;
    Ok(ApiResponse::ok(CompleteResponse { summary }))
}

/// Malformed ids cannot name an existing interview.
fn parse_interview_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound(format!("Interview {raw} not found")))
}
