//! The consolidated generation pipeline.
//!
//! Flow: validate → compose prompt (+ encode attachment) → one inference
//! call → sanitize / parse → document or grade report.
//!
//! All three product flows (build / refine / grade) run through `run()`,
//! parametrized by `TailorRequest`, instead of each re-implementing prompt
//! composition, encoding, and error handling.

pub mod encoder;
pub mod grading;
pub mod prompts;
pub mod sanitize;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::{GenerativeModel, InferenceRequest, ResponseShape};
use crate::models::{GeneratedDocument, JobContext, PersonalProfile};

use encoder::ResumeAttachment;
use grading::{GradeReport, GradingRecord};

/// Which of the three product flows a submission belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    Build,
    Refine,
    Grade,
}

/// A validated-on-entry tagged union — the request shape sent downstream
/// differs by mode, so the variants carry exactly what each mode needs.
#[derive(Debug)]
pub enum TailorRequest {
    Build {
        profile: PersonalProfile,
        job: JobContext,
    },
    Refine {
        attachment: ResumeAttachment,
        job_description: String,
    },
    Grade {
        attachment: ResumeAttachment,
        job_title: String,
    },
}

/// Pipeline output: a sanitized document for build/refine, an aggregated
/// grade report for grade.
#[derive(Debug)]
pub enum PipelineOutput {
    Document(GeneratedDocument),
    Grades(GradeReport),
}

impl TailorRequest {
    pub fn mode(&self) -> GenerationMode {
        match self {
            TailorRequest::Build { .. } => GenerationMode::Build,
            TailorRequest::Refine { .. } => GenerationMode::Refine,
            TailorRequest::Grade { .. } => GenerationMode::Grade,
        }
    }

    /// Server-side re-validation of the mode's required fields. The client
    /// disables submission on missing fields, but that gating is advisory
    /// only — nothing stops a caller from bypassing it.
    fn validate(&self) -> Result<(), AppError> {
        match self {
            TailorRequest::Build { profile, job } => {
                if profile.name.trim().is_empty() {
                    return Err(AppError::Validation("name is required".to_string()));
                }
                if profile.email.trim().is_empty() {
                    return Err(AppError::Validation("email is required".to_string()));
                }
                if job.title.trim().is_empty() {
                    return Err(AppError::Validation("job title is required".to_string()));
                }
                // An empty job description is allowed and interpolates as an
                // empty data block.
                Ok(())
            }
            TailorRequest::Refine {
                job_description, ..
            } => {
                if job_description.trim().is_empty() {
                    return Err(AppError::Validation(
                        "job description is required".to_string(),
                    ));
                }
                Ok(())
            }
            TailorRequest::Grade { job_title, .. } => {
                if job_title.trim().is_empty() {
                    return Err(AppError::Validation("job title is required".to_string()));
                }
                Ok(())
            }
        }
    }

    /// Composes the instruction string and transport-ready attachment for
    /// this request. Pure; the inference call happens in `run()`.
    fn compose(&self) -> InferenceRequest {
        match self {
            TailorRequest::Build { profile, job } => InferenceRequest {
                prompt: prompts::compose_build_prompt(profile, job),
                attachment: None,
                shape: ResponseShape::FreeText,
            },
            TailorRequest::Refine {
                attachment,
                job_description,
            } => InferenceRequest {
                prompt: prompts::compose_refine_prompt(job_description),
                attachment: Some(attachment.encode()),
                shape: ResponseShape::FreeText,
            },
            TailorRequest::Grade {
                attachment,
                job_title,
            } => InferenceRequest {
                prompt: prompts::compose_grade_prompt(job_title),
                attachment: Some(attachment.encode()),
                shape: ResponseShape::GradingArray,
            },
        }
    }
}

/// Runs one submission through the pipeline, issuing exactly one inference
/// call. Every failure kind maps to its own `AppError` variant so the caller
/// can tell "fix your input" from "retry" from "report a model bug".
pub async fn run(
    llm: &dyn GenerativeModel,
    request: TailorRequest,
) -> Result<PipelineOutput, AppError> {
    request.validate()?;

    let mode = request.mode();
    let inference = request.compose();
    info!(
        ?mode,
        attachment = inference.attachment.is_some(),
        "submitting inference request"
    );

    let raw = llm.generate(&inference).await?;

    match mode {
        GenerationMode::Build | GenerationMode::Refine => {
            let html = sanitize::clean_document(&raw);
            info!(?mode, bytes = html.len(), "generated document ready");
            Ok(PipelineOutput::Document(GeneratedDocument { html }))
        }
        GenerationMode::Grade => {
            let cleaned = sanitize::strip_fences(&raw);
            let records: Vec<GradingRecord> = serde_json::from_str(cleaned)
                .map_err(|e| AppError::ResponseShape(format!("expected a grading array: {e}")))?;
            if records.is_empty() {
                return Err(AppError::ResponseShape(
                    "the model returned an empty grading array".to_string(),
                ));
            }
            let report = GradeReport::from_records(records);
            info!(
                total = report.total,
                max = report.max_possible,
                "grade report ready"
            );
            Ok(PipelineOutput::Grades(report))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use std::sync::Mutex;

    use crate::llm_client::{LlmError, PDF_MIME};

    /// Records every request it receives and replays a canned response.
    struct MockModel {
        response: String,
        calls: Mutex<Vec<InferenceRequest>>,
    }

    impl MockModel {
        fn returning(response: &str) -> Self {
            Self {
                response: response.to_string(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn last_call(&self) -> InferenceRequest {
            self.calls.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl GenerativeModel for MockModel {
        async fn generate(&self, request: &InferenceRequest) -> Result<String, LlmError> {
            self.calls.lock().unwrap().push(request.clone());
            Ok(self.response.clone())
        }
    }

    fn pdf_attachment() -> ResumeAttachment {
        ResumeAttachment::from_upload(
            "resume.pdf",
            Some(PDF_MIME),
            Bytes::from_static(b"%PDF-1.4 body"),
        )
        .unwrap()
    }

    fn five_grades_json() -> String {
        serde_json::to_string(&serde_json::json!([
            {"metric": "Clarity & Structure", "grade": "A", "feedback": "Clean sections."},
            {"metric": "Keyword Optimization", "grade": "B", "feedback": "Add role keywords."},
            {"metric": "Achievements & Impact", "grade": "C", "feedback": "Quantify results."},
            {"metric": "Professionalism", "grade": "A", "feedback": "Consistent tone."},
            {"metric": "Relevance to Role", "grade": "B", "feedback": "Lead with backend work."}
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn test_build_flow_embeds_profile_and_sends_no_attachment() {
        let mock = MockModel::returning("<h1>Jane Doe</h1><p>Data Analyst</p>");
        let request = TailorRequest::Build {
            profile: PersonalProfile {
                name: "Jane Doe".to_string(),
                email: "jane@x.com".to_string(),
                ..Default::default()
            },
            job: JobContext {
                title: "Data Analyst".to_string(),
                description: "SQL and dashboards".to_string(),
            },
        };

        let output = run(&mock, request).await.unwrap();

        assert_eq!(mock.call_count(), 1);
        let call = mock.last_call();
        assert!(call.attachment.is_none());
        assert_eq!(call.shape, ResponseShape::FreeText);
        assert!(call.prompt.contains("Jane Doe"));
        assert!(call.prompt.contains("jane@x.com"));
        assert!(call.prompt.contains("Data Analyst"));

        match output {
            PipelineOutput::Document(doc) => assert!(doc.html.contains("Jane Doe")),
            PipelineOutput::Grades(_) => panic!("build must produce a document"),
        }
    }

    #[tokio::test]
    async fn test_build_rejects_missing_email_before_any_call() {
        let mock = MockModel::returning("unused");
        let request = TailorRequest::Build {
            profile: PersonalProfile {
                name: "Jane Doe".to_string(),
                email: "".to_string(),
                ..Default::default()
            },
            job: JobContext {
                title: "Data Analyst".to_string(),
                description: String::new(),
            },
        };

        let err = run(&mock, request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(mock.call_count(), 0, "validation must precede the network");
    }

    #[tokio::test]
    async fn test_refine_rejects_empty_job_description() {
        let mock = MockModel::returning("unused");
        let request = TailorRequest::Refine {
            attachment: pdf_attachment(),
            job_description: "   ".to_string(),
        };

        let err = run(&mock, request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_refine_sends_encoded_pdf_and_sanitizes_output() {
        let mock = MockModel::returning("```html\n<h2>Experience</h2><script>x()</script>\n```");
        let request = TailorRequest::Refine {
            attachment: pdf_attachment(),
            job_description: "Backend role with Rust".to_string(),
        };

        let output = run(&mock, request).await.unwrap();

        let call = mock.last_call();
        let pdf = call.attachment.expect("refine must attach the resume");
        assert_eq!(pdf.mime_type, PDF_MIME);
        assert!(!pdf.data_base64.is_empty());

        match output {
            PipelineOutput::Document(doc) => {
                assert!(doc.html.contains("<h2>Experience</h2>"));
                assert!(!doc.html.contains("script"));
                assert!(!doc.html.starts_with("```"));
            }
            PipelineOutput::Grades(_) => panic!("refine must produce a document"),
        }
    }

    #[tokio::test]
    async fn test_grade_flow_end_to_end() {
        let mock = MockModel::returning(&five_grades_json());
        let request = TailorRequest::Grade {
            attachment: pdf_attachment(),
            job_title: "Backend Developer".to_string(),
        };

        let output = run(&mock, request).await.unwrap();

        assert_eq!(mock.call_count(), 1);
        let call = mock.last_call();
        assert_eq!(call.shape, ResponseShape::GradingArray);
        assert!(call.prompt.contains("Backend Developer"));
        assert!(call.attachment.is_some());

        match output {
            PipelineOutput::Grades(report) => {
                assert_eq!(report.records.len(), 5);
                assert_eq!(report.max_possible, 100);
                assert!(report.total <= 100);
                assert_eq!(report.total, 20 + 16 + 12 + 20 + 16);
            }
            PipelineOutput::Document(_) => panic!("grade must produce a report"),
        }
    }

    #[tokio::test]
    async fn test_grade_tolerates_fenced_json() {
        let fenced = format!("```json\n{}\n```", five_grades_json());
        let mock = MockModel::returning(&fenced);
        let request = TailorRequest::Grade {
            attachment: pdf_attachment(),
            job_title: "Backend Developer".to_string(),
        };

        match run(&mock, request).await.unwrap() {
            PipelineOutput::Grades(report) => assert_eq!(report.records.len(), 5),
            PipelineOutput::Document(_) => panic!("grade must produce a report"),
        }
    }

    #[tokio::test]
    async fn test_grade_shape_mismatch_is_a_response_shape_error() {
        let mock = MockModel::returning("Here are my thoughts on your resume...");
        let request = TailorRequest::Grade {
            attachment: pdf_attachment(),
            job_title: "Backend Developer".to_string(),
        };

        let err = run(&mock, request).await.unwrap_err();
        assert!(matches!(err, AppError::ResponseShape(_)));
    }

    #[tokio::test]
    async fn test_grade_empty_array_is_a_response_shape_error() {
        let mock = MockModel::returning("[]");
        let request = TailorRequest::Grade {
            attachment: pdf_attachment(),
            job_title: "Backend Developer".to_string(),
        };

        let err = run(&mock, request).await.unwrap_err();
        assert!(matches!(err, AppError::ResponseShape(_)));
    }

    #[test]
    fn test_mode_tags_match_variants() {
        let build = TailorRequest::Build {
            profile: PersonalProfile::default(),
            job: JobContext::default(),
        };
        assert_eq!(build.mode(), GenerationMode::Build);

        let grade = TailorRequest::Grade {
            attachment: pdf_attachment(),
            job_title: "X".to_string(),
        };
        assert_eq!(grade.mode(), GenerationMode::Grade);
    }
}
