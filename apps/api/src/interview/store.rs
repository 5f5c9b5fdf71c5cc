//! Session persistence. Writes are conditional on the session `version`
//! (optimistic concurrency); a lost race reports `false` and the caller reloads.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::interview::models::SessionStatus;
use crate::interview::session::InterviewSession;
use crate::models::interview::InterviewSessionRow;
use crate::models::resume::ResumeRow;

/// Filter + paging for the history listing. `page` is 1-based.
#[derive(Debug, Clone, Copy)]
pub struct HistoryQuery {
    pub status: Option<SessionStatus>,
    pub limit: u32,
    pub page: u32,
}

impl HistoryQuery {
    pub fn offset(&self) -> u64 {
        (self.page.saturating_sub(1) as u64) * self.limit as u64
    }
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn insert(&self, session: &InterviewSession) -> Result<()>;

    async fn fetch(&self, id: Uuid) -> Result<Option<InterviewSession>>;

    /// Persists `session` only if the stored version still equals `session.version`.
    /// Returns `false` when another writer got there first.
    async fn update(&self, session: &InterviewSession) -> Result<bool>;

    /// Newest first. Returns the page and the total number of matching sessions.
    async fn list(
        &self,
        user_id: Uuid,
        query: HistoryQuery,
    ) -> Result<(Vec<InterviewSession>, u64)>;

    /// Extracted skills of a resume owned by `user_id`, or `None` if there is no such resume.
    async fn resume_skills(&self, user_id: Uuid, resume_id: Uuid) -> Result<Option<Vec<String>>>;
}

// ────────────────────────────────────────────────────────────────────────────
// PgSessionStore
// ────────────────────────────────────────────────────────────────────────────

pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn insert(&self, session: &InterviewSession) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO interview_sessions
                (id, user_id, target_role, job_description, status,
                 questions, answers, summary, version, created_at, completed_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(session.id)
        .bind(session.user_id)
        .bind(&session.target_role)
        .bind(&session.job_description)
        .bind(session.status.as_str())
        .bind(Json(&session.questions))
        .bind(Json(&session.answers))
        .bind(session.summary.as_ref().map(Json))
        .bind(session.version)
        .bind(session.created_at)
        .bind(session.completed_at)
        .execute(&self.pool)
        .await?;

        info!(
            "Inserted interview session {} for user {}",
            session.id, session.user_id
        );
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<InterviewSession>> {
        let row = sqlx::query_as::<_, InterviewSessionRow>(
            "SELECT * FROM interview_sessions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(InterviewSession::try_from).transpose()
    }

    async fn update(&self, session: &InterviewSession) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE interview_sessions
            SET status = $1, answers = $2, summary = $3, completed_at = $4,
                version = version + 1
            WHERE id = $5 AND version = $6
            "#,
        )
        .bind(session.status.as_str())
        .bind(Json(&session.answers))
        .bind(session.summary.as_ref().map(Json))
        .bind(session.completed_at)
        .bind(session.id)
        .bind(session.version)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn list(
        &self,
        user_id: Uuid,
        query: HistoryQuery,
    ) -> Result<(Vec<InterviewSession>, u64)> {
        let status = query.status.map(|s| s.as_str());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM interview_sessions
            WHERE user_id = $1 AND ($2::TEXT IS NULL OR status = $2)
            "#,
        )
        .bind(user_id)
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, InterviewSessionRow>(
            r#"
            SELECT * FROM interview_sessions
            WHERE user_id = $1 AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY created_at DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(user_id)
        .bind(status)
        .bind(query.limit as i64)
        .bind(query.offset() as i64)
        .fetch_all(&self.pool)
        .await?;

        let sessions = rows
            .into_iter()
            .map(InterviewSession::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok((sessions, total.max(0) as u64))
    }

    async fn resume_skills(&self, user_id: Uuid, resume_id: Uuid) -> Result<Option<Vec<String>>> {
        let row = sqlx::query_as::<_, ResumeRow>(
            "SELECT id, user_id, skills, created_at FROM resumes WHERE id = $1 AND user_id = $2",
        )
        .bind(resume_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.skills))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MemorySessionStore — local runs without Postgres, and tests
// ────────────────────────────────────────────────────────────────────────────

/// Resumes are owned by another service and only reachable through Postgres,
/// so outside tests this store holds none and any `resumeId` resolves to 404.
#[derive(Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<Uuid, InterviewSession>>,
    resumes: RwLock<HashMap<Uuid, ResumeRow>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn add_resume(&self, resume: ResumeRow) {
        self.resumes.write().await.insert(resume.id, resume);
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn insert(&self, session: &InterviewSession) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&session.id) {
            anyhow::bail!("Interview session {} already exists", session.id);
        }
        sessions.insert(session.id, session.clone());
        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<InterviewSession>> {
        Ok(self.sessions.read().await.get(&id).cloned())
    }

    async fn update(&self, session: &InterviewSession) -> Result<bool> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&session.id) {
            Some(stored) if stored.version == session.version => {
                let mut next = session.clone();
                next.version += 1;
                *stored = next;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list(
        &self,
        user_id: Uuid,
        query: HistoryQuery,
    ) -> Result<(Vec<InterviewSession>, u64)> {
        let sessions = self.sessions.read().await;
        let mut matching: Vec<&InterviewSession> = sessions
            .values()
            .filter(|s| s.user_id == user_id)
            .filter(|s| query.status.map_or(true, |status| s.status == status))
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as u64;
        let page = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .cloned()
            .collect();
        Ok((page, total))
    }

    async fn resume_skills(&self, user_id: Uuid, resume_id: Uuid) -> Result<Option<Vec<String>>> {
        Ok(self
            .resumes
            .read()
            .await
            .get(&resume_id)
            .filter(|r| r.user_id == user_id)
            .map(|r| r.skills.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interview::models::{Complexity, Question, QuestionCategory};
    use chrono::{Duration, Utc};

    fn query(status: Option<SessionStatus>, limit: u32, page: u32) -> HistoryQuery {
        HistoryQuery {
            status,
            limit,
            page,
        }
    }

    fn session(user_id: Uuid, minutes_ago: i64) -> InterviewSession {
        InterviewSession::start(
            user_id,
            "Engineer".to_string(),
            "jd".to_string(),
            vec![Question {
                id: Uuid::new_v4(),
                text: "Tell me about yourself.".to_string(),
                category: QuestionCategory::Behavioral,
                complexity: Complexity::Easy,
                expected_keywords: vec![],
            }],
            Utc::now() - Duration::minutes(minutes_ago),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_stale_version_update_rejected() {
        let store = MemorySessionStore::new();
        let s = session(Uuid::new_v4(), 0);
        store.insert(&s).await.unwrap();

        let mut first = store.fetch(s.id).await.unwrap().unwrap();
        let mut second = first.clone();

        first.complete(Utc::now()).unwrap();
        assert!(store.update(&first).await.unwrap());

        second.complete(Utc::now()).unwrap();
        assert!(!store.update(&second).await.unwrap());

        let stored = store.fetch(s.id).await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.completed_at, first.completed_at);
    }

    #[tokio::test]
    async fn test_list_filters_and_pages_newest_first() {
        let store = MemorySessionStore::new();
        let user = Uuid::new_v4();
        let oldest = session(user, 30);
        let middle = session(user, 20);
        let mut newest = session(user, 10);
        newest.complete(Utc::now()).unwrap();
        for s in [&oldest, &middle, &newest] {
            store.insert(s).await.unwrap();
        }
        store.insert(&session(Uuid::new_v4(), 0)).await.unwrap();

        let (page, total) = store.list(user, query(None, 2, 1)).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(
            page.iter().map(|s| s.id).collect::<Vec<_>>(),
            vec![newest.id, middle.id]
        );

        let (page, _) = store.list(user, query(None, 2, 2)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, oldest.id);

        let (page, total) = store
            .list(user, query(Some(SessionStatus::Completed), 10, 1))
            .await
            .unwrap();
        assert_eq!(total, 1);
        assert_eq!(page[0].id, newest.id);
    }

    #[tokio::test]
    async fn test_resume_skills_scoped_to_owner() {
        let store = MemorySessionStore::new();
        let owner = Uuid::new_v4();
        let resume_id = Uuid::new_v4();
        store
            .add_resume(ResumeRow {
                id: resume_id,
                user_id: owner,
                skills: vec!["rust".to_string()],
                created_at: Utc::now(),
            })
            .await;

        assert_eq!(
            store.resume_skills(owner, resume_id).await.unwrap(),
            Some(vec!["rust".to_string()])
        );
        let stranger = Uuid::new_v4();
        assert_eq!(
            store.resume_skills(stranger, resume_id).await.unwrap(),
            None
        );
    }
}
