use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use futures_util::TryStreamExt;
use mathlens_core::{
    ImageUpload, ParsedResult, ProviderKind, SolveResult, UploadError, UploadValidator, VERSION,
};
use serde_json::{json, Value};

use super::error::ApiError;
use super::state::AppState;

/// Multipart field carrying the image.
const FILE_FIELD: &str = "file";

pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Backend running. POST to /solve-gemini, /solve-perplexity or /solve-openai"
    }))
}

pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let providers: Vec<&str> = state
        .solver
        .configured()
        .into_iter()
        .map(|kind| kind.as_str())
        .collect();
    Json(json!({
        "status": "ok",
        "version": VERSION,
        "providers": providers,
    }))
}

pub async fn solve_perplexity(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    solve(state, ProviderKind::Perplexity, multipart).await
}

pub async fn solve_gemini(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    solve(state, ProviderKind::Gemini, multipart).await
}

pub async fn solve_openai(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    solve(state, ProviderKind::OpenAi, multipart).await
}

async fn solve(
    state: AppState,
    kind: ProviderKind,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    match run_solve(&state, kind, multipart).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(e) => ApiError::new(e, state.expose_upstream_errors).into_response(),
    }
}

async fn run_solve(
    state: &AppState,
    kind: ProviderKind,
    multipart: Result<Multipart, MultipartRejection>,
) -> SolveResult<ParsedResult> {
    let mut multipart =
        multipart.map_err(|rejection| UploadError::ReadFailure(rejection.body_text()))?;
    let upload = read_upload(&state.validator, &mut multipart).await?;
    state.solver.solve(kind, &upload).await
}

/// Find the `file` field and stream it through the validator.
async fn read_upload(
    validator: &UploadValidator,
    multipart: &mut Multipart,
) -> Result<ImageUpload, UploadError> {
    let max_bytes = validator.max_bytes();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(e, max_bytes))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_string);
        let filename = field.file_name().map(str::to_string);
        let chunks = field.map_err(|e| upload_error(e, max_bytes));
        return validator
            .validate_stream(content_type.as_deref(), filename, chunks)
            .await;
    }

    Err(UploadError::MissingFile)
}

fn upload_error(error: MultipartError, max_bytes: u64) -> UploadError {
    // The body limit layer surfaces as a multipart error with status 413
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge { max_bytes }
    } else {
        UploadError::ReadFailure(error.body_text())
    }
}
