//! Zero-shot text classification behind a trait.
//!
//! The query endpoint only needs "which of these labels fits this text
//! best". [`HttpClassifier`] asks a hosted model; [`KeywordClassifier`] is a
//! deterministic stand-in for tests and offline use.

mod http;
mod keyword;

use std::sync::Arc;

use async_trait::async_trait;
use crm_core::config::{ClassifierBackend, ClassifierSettings};
use crm_core::CrmError;
use serde::{Deserialize, Serialize};

pub use http::HttpClassifier;
pub use keyword::KeywordClassifier;

/// One candidate label with the classifier's confidence in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    #[error("classifier request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("classifier returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected classifier response: {0}")]
    Malformed(String),

    #[error("classifier returned no labels")]
    Empty,

    #[error("classifier chose `{0}`, which is not a candidate label")]
    UnknownLabel(String),
}

impl From<ClassifierError> for CrmError {
    fn from(err: ClassifierError) -> Self {
        CrmError::Classification(err.to_string())
    }
}

/// Ranks candidate labels for a piece of text.
#[async_trait]
pub trait Classifier: Send + Sync {
    /// Score every label in `labels` against `text`, best first.
    async fn classify(&self, text: &str, labels: &[&str]) -> Result<Vec<LabelScore>, ClassifierError>;
}

/// Build the classifier selected by configuration.
pub fn from_settings(settings: &ClassifierSettings) -> Result<Arc<dyn Classifier>, ClassifierError> {
    match settings.backend {
        ClassifierBackend::Http => Ok(Arc::new(HttpClassifier::from_settings(settings)?)),
        ClassifierBackend::Keyword => Ok(Arc::new(KeywordClassifier::default())),
    }
}

/// Sort scores best first. NaN scores sink to the end.
pub(crate) fn rank(scores: &mut [LabelScore]) {
    scores.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or_else(|| a.score.is_nan().cmp(&b.score.is_nan()))
    });
}
