//! Axum route handlers for the generation and export API.
//!
//! Every handler is one catch boundary: it claims the submission slot where
//! one is needed, runs the pipeline, and converts any failure into an
//! `AppError` — nothing propagates as an unhandled crash.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::export;
use crate::models::{JobContext, PersonalProfile};
use crate::pipeline::encoder::ResumeAttachment;
use crate::pipeline::grading::GradeReport;
use crate::pipeline::sanitize::clean_document;
use crate::pipeline::{self, PipelineOutput, TailorRequest};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct BuildRequest {
    pub profile: PersonalProfile,
    pub job: JobContext,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub html: String,
}

#[derive(Debug, Deserialize)]
pub struct ExportRequest {
    pub html: String,
    /// Profile name, used for the download filename; falls back to "resume".
    #[serde(default)]
    pub name: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/build
///
/// Generates a complete new résumé from profile + job context. No attachment.
pub async fn handle_build(
    State(state): State<AppState>,
    Json(request): Json<BuildRequest>,
) -> Result<Json<DocumentResponse>, AppError> {
    let _permit = state.submissions.try_begin()?;

    let output = pipeline::run(
        state.llm.as_ref(),
        TailorRequest::Build {
            profile: request.profile,
            job: request.job,
        },
    )
    .await?;

    document_response(output)
}

/// POST /api/v1/resumes/refine
///
/// Multipart: `resume` (PDF file) + `job_description` (text). Rewrites the
/// attached résumé tailored to the description.
pub async fn handle_refine(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<DocumentResponse>, AppError> {
    let _permit = state.submissions.try_begin()?;

    let (attachment, job_description) = read_resume_upload(multipart, "job_description").await?;
    let output = pipeline::run(
        state.llm.as_ref(),
        TailorRequest::Refine {
            attachment,
            job_description,
        },
    )
    .await?;

    document_response(output)
}

/// POST /api/v1/resumes/grade
///
/// Multipart: `resume` (PDF file) + `job_title` (text). Returns the aggregated
/// grade report for the five fixed metrics.
pub async fn handle_grade(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<GradeReport>, AppError> {
    let _permit = state.submissions.try_begin()?;

    let (attachment, job_title) = read_resume_upload(multipart, "job_title").await?;
    let output = pipeline::run(
        state.llm.as_ref(),
        TailorRequest::Grade {
            attachment,
            job_title,
        },
    )
    .await?;

    match output {
        PipelineOutput::Grades(report) => Ok(Json(report)),
        PipelineOutput::Document(_) => Err(AppError::Internal(anyhow::anyhow!(
            "grade pipeline produced a document"
        ))),
    }
}

/// POST /api/v1/export
///
/// Renders the generated document into a downloadable PDF. Not gated by the
/// submission slot — export failures never touch generated content.
pub async fn handle_export(
    State(_state): State<AppState>,
    Json(request): Json<ExportRequest>,
) -> Result<Response, AppError> {
    if request.html.trim().is_empty() {
        return Err(AppError::Validation(
            "there is no generated document to export".to_string(),
        ));
    }

    let filename = export_filename(request.name.as_deref());
    // Re-sanitize on the way out: the export boundary does not trust the
    // caller any more than the display boundary trusts the model.
    let html = clean_document(&request.html);
    let title = filename.trim_end_matches(".pdf").to_string();

    // Rasterizing/paginating is CPU-bound — keep it off the async executor.
    let bytes = tokio::task::spawn_blocking(move || export::render_pdf(&html, &title))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in export: {e}")))?
        .map_err(|e| AppError::Export(e.to_string()))?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, bytes).into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn document_response(output: PipelineOutput) -> Result<Json<DocumentResponse>, AppError> {
    match output {
        PipelineOutput::Document(doc) => Ok(Json(DocumentResponse { html: doc.html })),
        PipelineOutput::Grades(_) => Err(AppError::Internal(anyhow::anyhow!(
            "document pipeline produced a grade report"
        ))),
    }
}

/// Pulls the `resume` file and one named text field out of a multipart form.
/// The MIME gate runs here, before any network call is possible.
async fn read_resume_upload(
    mut multipart: Multipart,
    text_field: &str,
) -> Result<(ResumeAttachment, String), AppError> {
    let mut attachment: Option<ResumeAttachment> = None;
    let mut text: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::DocumentRead(e.to_string()))?
    {
        match field.name() {
            Some("resume") => {
                let filename = field.file_name().unwrap_or("resume.pdf").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::DocumentRead(e.to_string()))?;
                // Re-selecting a file replaces the previous attachment.
                let accepted =
                    ResumeAttachment::from_upload(&filename, content_type.as_deref(), bytes)?;
                tracing::debug!(filename = %accepted.filename, "resume attachment accepted");
                attachment = Some(accepted);
            }
            Some(name) if name == text_field => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("'{text_field}' must be text: {e}")))?;
                text = Some(value);
            }
            _ => {} // unknown fields are ignored
        }
    }

    let attachment = attachment
        .ok_or_else(|| AppError::Validation("a resume PDF attachment is required".to_string()))?;
    let text = text
        .ok_or_else(|| AppError::Validation(format!("the '{text_field}' field is required")))?;

    Ok((attachment, text))
}

/// Derives the download filename from the profile name, falling back to
/// "resume" when absent. Path separators and quotes are stripped so the
/// header value stays well-formed.
fn export_filename(name: Option<&str>) -> String {
    let stem: String = name
        .unwrap_or("")
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '"') && !c.is_control())
        .collect::<String>()
        .trim()
        .to_string();

    if stem.is_empty() {
        "resume.pdf".to_string()
    } else {
        format!("{stem}.pdf")
    }
}
