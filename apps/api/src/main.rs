mod auth;
mod config;
mod db;
mod errors;
mod interview;
mod models;
mod routes;
mod scoring_oracle;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::db::create_pool;
use crate::interview::evaluator::{AnswerScorer, HeuristicScorer, OracleScorer};
use crate::interview::generator::QuestionGenerator;
use crate::interview::question_bank::QuestionBank;
use crate::interview::service::InterviewService;
use crate::interview::store::{MemorySessionStore, PgSessionStore, SessionStore};
use crate::routes::build_router;
use crate::scoring_oracle::OracleClient;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Session store: Postgres when configured, otherwise in-process memory
    let store: Arc<dyn SessionStore> = match &config.database_url {
        Some(url) => Arc::new(PgSessionStore::new(create_pool(url).await?)),
        None => {
            warn!("DATABASE_URL not set; interview sessions are kept in memory");
            Arc::new(MemorySessionStore::new())
        }
    };

    // Answer scorer (HeuristicScorer unless a scoring oracle is configured)
    let scorer: Arc<dyn AnswerScorer> = match &config.scoring_oracle_url {
        Some(url) => {
            let client = OracleClient::new(url.as_str(), config.scoring_oracle_timeout)?;
            info!(
                "Scoring oracle enabled at {} (timeout {:?})",
                client.base_url(),
                config.scoring_oracle_timeout
            );
            Arc::new(OracleScorer(client))
        }
        None => Arc::new(HeuristicScorer),
    };

    let bank = Arc::new(QuestionBank::default());
    info!(
        "Question bank loaded: {} skill categories, {} behavioral questions",
        bank.category_keys().count(),
        bank.behavioral_pool().len()
    );
    let generator = QuestionGenerator::new(bank, config.max_questions);
    info!(
        "Question generator: up to {} questions per session",
        generator.max_questions()
    );

    // Build app state
    let interviews = InterviewService::new(
        store,
        generator,
        scorer,
        config.scoring_oracle_timeout,
        config.question_seed,
    );
    let state = AppState {
        interviews: Arc::new(interviews),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
