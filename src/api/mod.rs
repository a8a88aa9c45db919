use axum::{routing::get, Router};
use sqlx::PgPool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod debit_card_transactions;
pub mod debit_cards;
pub mod health;
pub mod middleware;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

/// Assembles the full application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .merge(debit_cards::router())
        .merge(debit_card_transactions::router())
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
