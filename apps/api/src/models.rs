//! Session-scoped data carried through the pipeline.
//! Nothing here is persisted — every value lives for one submission.

use serde::{Deserialize, Serialize};

/// Candidate contact details used by the BUILD flow.
/// Free-text fields; only `name` and `email` are required, and that check
/// happens at submission validation, not here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalProfile {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub linkedin: Option<String>,
}

/// Target role context. The description is unbounded free text and is treated
/// as untrusted data when composing prompts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobContext {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Sanitized model output — the source of truth for both on-screen preview
/// and export. Replaced wholesale on each new submission.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedDocument {
    pub html: String,
}
