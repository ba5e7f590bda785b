use axum::{extract::State, response::Json};
use serde::Serialize;

use super::error::{Result as WebResult, WebError};
use crate::state::AppState;

#[derive(Serialize, Debug)]
pub struct HealthStatus {
    pub status: &'static str,
}

pub async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus { status: "ok" })
}

#[derive(Serialize, Debug)]
pub struct QuestionCount {
    pub questions: usize,
}

/// Store connectivity diagnostic: fetches the bank and reports its size.
pub async fn question_count_handler(
    State(app_state): State<AppState>,
) -> WebResult<Json<QuestionCount>> {
    tracing::info!("HTTP: Received question_count request");

    let questions = app_state.store.fetch_all_questions().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch questions for count");
        WebError::InternalServerError(e.to_string())
    })?;

    Ok(Json(QuestionCount {
        questions: questions.len(),
    }))
}
