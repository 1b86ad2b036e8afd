use std::time::Duration;

use async_trait::async_trait;
use crm_core::config::ClassifierSettings;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{rank, Classifier, ClassifierError, LabelScore};

#[derive(Debug, Serialize)]
struct ZeroShotRequest<'a> {
    inputs: &'a str,
    parameters: ZeroShotParameters<'a>,
}

#[derive(Debug, Serialize)]
struct ZeroShotParameters<'a> {
    candidate_labels: &'a [&'a str],
    multi_label: bool,
}

#[derive(Debug, Deserialize)]
struct RankedLabels {
    labels: Vec<String>,
    scores: Vec<f64>,
}

/// Response shapes served by zero-shot inference endpoints.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ZeroShotResponse {
    Ranked(RankedLabels),
    Pairs(Vec<LabelScore>),
    Batched(Vec<RankedLabels>),
}

/// Zero-shot classifier backed by a Hugging Face Inference API compatible
/// endpoint (`facebook/bart-large-mnli` by default).
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
}

impl HttpClassifier {
    pub fn new(
        endpoint: impl Into<String>,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClassifierError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_token,
        })
    }

    pub fn from_settings(settings: &ClassifierSettings) -> Result<Self, ClassifierError> {
        Self::new(
            settings.endpoint.clone(),
            settings.api_token.clone(),
            Duration::from_secs(settings.timeout_secs),
        )
    }
}

#[async_trait]
impl Classifier for HttpClassifier {
    async fn classify(&self, text: &str, labels: &[&str]) -> Result<Vec<LabelScore>, ClassifierError> {
        let request = ZeroShotRequest {
            inputs: text,
            parameters: ZeroShotParameters {
                candidate_labels: labels,
                multi_label: false,
            },
        };

        let mut builder = self.client.post(&self.endpoint).json(&request);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ClassifierError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(endpoint = %self.endpoint, "Classifier responded");
        parse_response(&body)
    }
}

fn parse_response(body: &str) -> Result<Vec<LabelScore>, ClassifierError> {
    let parsed: ZeroShotResponse =
        serde_json::from_str(body).map_err(|e| ClassifierError::Malformed(e.to_string()))?;

    let mut scores = match parsed {
        ZeroShotResponse::Ranked(ranked) => zip_ranked(ranked)?,
        ZeroShotResponse::Pairs(pairs) => pairs,
        ZeroShotResponse::Batched(batch) => match batch.into_iter().next() {
            Some(ranked) => zip_ranked(ranked)?,
            None => Vec::new(),
        },
    };

    if scores.is_empty() {
        return Err(ClassifierError::Empty);
    }
    rank(&mut scores);
    Ok(scores)
}

fn zip_ranked(ranked: RankedLabels) -> Result<Vec<LabelScore>, ClassifierError> {
    if ranked.labels.len() != ranked.scores.len() {
        return Err(ClassifierError::Malformed(format!(
            "{} labels but {} scores",
            ranked.labels.len(),
            ranked.scores.len()
        )));
    }
    Ok(ranked
        .labels
        .into_iter()
        .zip(ranked.scores)
        .map(|(label, score)| LabelScore { label, score })
        .collect())
}
