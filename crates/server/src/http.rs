//! HTTP surface: upload validation, single-name classification, health.

use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, Multipart, Path, State,
    },
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::trace::TraceLayer;
use validasexo_io::XLSX_CONTENT_TYPE;
use validasexo_model::{first_name, Prediction, SexClassifier};

use crate::pipeline::{self, PipelineError};

/// Multipart field carrying the uploaded table.
pub const UPLOAD_FIELD: &str = "arquivo";

const DEFAULT_STEM: &str = "saida";

#[derive(Clone)]
pub struct AppState {
    pub classifier: Arc<dyn SexClassifier>,
}

impl AppState {
    pub fn new(classifier: Arc<dyn SexClassifier>) -> Self {
        Self { classifier }
    }
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/validar", post(validar))
        .route("/classificar/:nome", get(classificar))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Every request failure is answered the same way: 400 with a `detail` message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Multipart(String),
    #[error("campo 'arquivo' ausente")]
    MissingFile,
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error("tarefa interrompida: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        Self::Multipart(rejection.body_text())
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        Self::Multipart(err.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        tracing::error!(error = ?self, "request failed");
        let body = Json(json!({ "detail": format!("Erro ao processar: {self}") }));
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn classificar(State(state): State<AppState>, Path(nome): Path<String>) -> Json<Prediction> {
    Json(state.classifier.classify_with_proba(&first_name(Some(&nome))))
}

async fn validar(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, AppError> {
    let mut multipart = multipart?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let filename = field.file_name().map(str::to_string);
        let bytes = field.bytes().await?;
        upload = Some((filename, bytes));
        break;
    }
    let (filename, bytes) = upload.ok_or(AppError::MissingFile)?;
    tracing::debug!(filename = ?filename, size = bytes.len(), "received upload");

    let classifier = Arc::clone(&state.classifier);
    let processed =
        tokio::task::spawn_blocking(move || pipeline::process_file(&bytes, classifier.as_ref())).await??;

    let output_name = output_filename(filename.as_deref());
    let headers = [
        (header::CONTENT_TYPE, HeaderValue::from_static(XLSX_CONTENT_TYPE)),
        (header::CONTENT_DISPOSITION, content_disposition(&output_name)),
    ];
    Ok((headers, processed.xlsx).into_response())
}

/// `<stem>_validado.xlsx`, where the stem is everything before the last `.`.
pub fn output_filename(uploaded: Option<&str>) -> String {
    let name = uploaded.filter(|n| !n.is_empty()).unwrap_or(DEFAULT_STEM);
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    format!("{stem}_validado.xlsx")
}

fn content_disposition(filename: &str) -> HeaderValue {
    let ascii: String = filename
        .chars()
        .map(|c| if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' { c } else { '_' })
        .collect();
    let value = format!(
        "attachment; filename=\"{ascii}\"; filename*=UTF-8''{}",
        urlencoding::encode(filename)
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_name_uses_last_dot() {
        assert_eq!(output_filename(Some("clientes.xlsx")), "clientes_validado.xlsx");
        assert_eq!(output_filename(Some("lote.2024.csv")), "lote.2024_validado.xlsx");
        assert_eq!(output_filename(Some("planilha")), "planilha_validado.xlsx");
        assert_eq!(output_filename(Some("")), "saida_validado.xlsx");
        assert_eq!(output_filename(None), "saida_validado.xlsx");
    }

    #[test]
    fn disposition_escapes_non_ascii() {
        let value = content_disposition("relação_validado.xlsx");
        let text = value.to_str().unwrap();
        assert!(text.starts_with("attachment; filename=\"rela__o_validado.xlsx\""), "{text}");
        assert!(text.contains("filename*=UTF-8''rela%C3%A7%C3%A3o_validado.xlsx"), "{text}");
    }
}
