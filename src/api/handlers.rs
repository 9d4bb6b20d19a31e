//! Request handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{Method, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::error::{AppError, Result};
use crate::prompt::DesignRequest;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub image_url: String,
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishRequest {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub alt_text: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishResponse {
    pub image_url: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::InvalidRequest(rejection.body_text()))
}

/// `POST /api/generate`
pub async fn generate(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<DesignRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>> {
    let request = json_body(payload)?;
    info!(breed = %request.subject_breed, "Received design request");

    let output = state.pipeline.run(request).await?;

    Ok(Json(GenerateResponse {
        image_url: output.image_url,
        prompt: output.prompt,
    }))
}

/// `POST /api/publish`
pub async fn publish(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<PublishRequest>, JsonRejection>,
) -> Result<Json<PublishResponse>> {
    let request = json_body(payload)?;

    let image_url = request
        .image_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::InvalidRequest("imageUrl is required".to_string()))?;

    if !(image_url.starts_with("https://")
        || image_url.starts_with("http://")
        || image_url.starts_with("data:"))
    {
        return Err(AppError::InvalidRequest(
            "imageUrl must be an http(s) or data URL".to_string(),
        ));
    }

    let alt_text = request
        .alt_text
        .as_deref()
        .map(str::trim)
        .filter(|alt| !alt.is_empty());

    let published = state.pipeline.publish_from_url(image_url, alt_text).await?;

    Ok(Json(PublishResponse {
        image_url: published.durable_url,
    }))
}

/// Answer `OPTIONS` with an empty 200; CORS headers come from the layer.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed(method: Method) -> AppError {
    AppError::UnsupportedMethod(format!("{} is not allowed, use POST", method))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
