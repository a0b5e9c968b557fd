use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::careers::documents::{is_pdf, pdf_to_text, Document};
use crate::careers::pipeline::CareerSuggestion;
use crate::errors::AppError;
use crate::state::AppState;

const SINGLE_FILE_FIELD: &str = "file";
const BATCH_FILE_FIELD: &str = "files";

#[derive(Serialize)]
pub struct ExtractSkillsResponse {
    pub extracted_skills: Vec<String>,
}

#[derive(Serialize)]
pub struct SuggestCareerResponse {
    pub results: Vec<CareerSuggestion>,
}

/// POST /extract-skills
pub async fn handle_extract_skills(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ExtractSkillsResponse>, AppError> {
    let upload = collect_pdf_uploads(&mut multipart, SINGLE_FILE_FIELD, Some(1))
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            AppError::Validation(format!(
                "a PDF upload in field '{SINGLE_FILE_FIELD}' is required"
            ))
        })?;

    let text = pdf_to_text(&upload.name, upload.bytes).await?;
    let skills = state.pipeline.extract_skills(&text).await?;
    info!(file = %upload.name, skills = skills.len(), "extracted skills");

    Ok(Json(ExtractSkillsResponse {
        extracted_skills: skills.into_vec(),
    }))
}

/// POST /suggest-career
pub async fn handle_suggest_career(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SuggestCareerResponse>, AppError> {
    let uploads = collect_pdf_uploads(&mut multipart, BATCH_FILE_FIELD, None).await?;
    if uploads.is_empty() {
        return Err(AppError::Validation(format!(
            "at least one PDF upload in field '{BATCH_FILE_FIELD}' is required"
        )));
    }

    let mut documents = Vec::with_capacity(uploads.len());
    for upload in uploads {
        let text = pdf_to_text(&upload.name, upload.bytes).await?;
        documents.push(Document::new(upload.name, text));
    }

    let results = state.pipeline.suggest_careers(documents).await?;
    Ok(Json(SuggestCareerResponse { results }))
}

/// A raw PDF part, not yet parsed.
#[derive(Debug)]
struct PdfUpload {
    name: String,
    bytes: Bytes,
}

/// Reads uploads in `field_name`, in request order, stopping after `limit` of them.
/// Other fields are skipped. A single non-PDF upload rejects the whole request.
async fn collect_pdf_uploads(
    multipart: &mut Multipart,
    field_name: &str,
    limit: Option<usize>,
) -> Result<Vec<PdfUpload>, AppError> {
    let mut uploads = Vec::new();

    while limit.map_or(true, |max| uploads.len() < max) {
        let Some(field) = multipart.next_field().await.map_err(multipart_error)? else {
            break;
        };
        if field.name() != Some(field_name) {
            continue;
        }

        let name = field
            .file_name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("upload-{}", uploads.len() + 1));

        if !is_pdf(field.content_type()) {
            return Err(AppError::UnsupportedInputType(name));
        }

        let bytes = field.bytes().await.map_err(multipart_error)?;
        uploads.push(PdfUpload { name, bytes });
    }

    Ok(uploads)
}

fn multipart_error(e: MultipartError) -> AppError {
    AppError::Validation(format!("invalid multipart body: {}", e.body_text()))
}
