//! Minting new endpoints. Nothing is stored until the first capture arrives.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::Json;
use serde::Serialize;

use crate::capture::{generate, DEFAULT_KEY_BYTES};
use crate::server::error::ServerError;
use crate::server::templates::INDEX;
use crate::PreviewEngine;

#[derive(Debug, Serialize)]
pub struct NewEndpoint {
    pub id: String,
    pub view_url: String,
    pub endpoint_url: String,
}

/// Fresh key plus the URLs built on it. Fails only if the OS random source does.
pub fn mint(engine: &PreviewEngine) -> Result<NewEndpoint, ServerError> {
    let key = generate(DEFAULT_KEY_BYTES)?;
    Ok(NewEndpoint {
        view_url: engine.server.url(&format!("/view/{}", key)),
        endpoint_url: engine.server.url(&format!("/endpoint/{}", key)),
        id: key.into_string(),
    })
}

pub async fn index(State(engine): State<PreviewEngine>) -> Result<Html<String>, ServerError> {
    let endpoint = mint(&engine)?;
    Ok(Html(engine.templates.render(INDEX, &endpoint)?))
}

pub async fn create(
    State(engine): State<PreviewEngine>,
) -> Result<(StatusCode, Json<NewEndpoint>), ServerError> {
    let endpoint = mint(&engine)?;
    tracing::debug!(tenant = %endpoint.id, "[Endpoint] Minted endpoint");
    Ok((StatusCode::CREATED, Json(endpoint)))
}
