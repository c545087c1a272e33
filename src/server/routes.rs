//! Request handlers for the ask endpoint

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::server::state::AppState;

/// Request body for `POST /ask-buddy`
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    /// The user's question
    #[serde(default)]
    pub prompt: String,
}

/// Response body for `POST /ask-buddy`
#[derive(Debug, Serialize)]
pub struct AskResponse {
    /// The generated answer
    pub response: String,
}

/// POST /ask-buddy - answer a question from the knowledge base
pub async fn ask_buddy(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>> {
    if request.prompt.trim().is_empty() {
        return Err(Error::EmptyPrompt);
    }

    tracing::info!("Received prompt: {:?}", request.prompt);

    let service = state.query_service()?;
    let response = service.answer(&request.prompt).await.map_err(|e| {
        tracing::error!("Failed to answer prompt: {}", e);
        e
    })?;

    Ok(Json(AskResponse { response }))
}
