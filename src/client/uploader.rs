use crate::core::Record;
use crate::utils::error::{IntakeError, Result};
use crate::utils::validation::validate_url;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadPayload<'a> {
    candidates: &'a [Record],
    #[serde(skip_serializing_if = "Option::is_none")]
    upload_batch: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct UploadReply {
    #[serde(default)]
    success: bool,
    count: Option<u64>,
    error: Option<String>,
}

pub struct CandidateUploader {
    client: Client,
    endpoint: String,
}

impl CandidateUploader {
    pub fn new(server_url: &str) -> Result<Self> {
        validate_url("server", server_url)?;
        Ok(Self {
            client: Client::new(),
            endpoint: format!("{}/candidates/upload", server_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts one batch and returns the number of candidates the server inserted.
    pub async fn upload(&self, candidates: &[Record], upload_batch: Option<&str>) -> Result<u64> {
        tracing::debug!("Posting {} candidates to {}", candidates.len(), self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .json(&UploadPayload {
                candidates,
                upload_batch,
            })
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Upload response status: {}", status);
        let body = response.text().await?;

        match serde_json::from_str::<UploadReply>(&body) {
            Ok(reply) if status.is_success() && reply.success => Ok(reply.count.unwrap_or(0)),
            Ok(reply) => Err(IntakeError::UploadRejected {
                status: status.as_u16(),
                message: reply
                    .error
                    .unwrap_or_else(|| format!("server answered with status {}", status)),
            }),
            Err(_) => Err(IntakeError::UploadRejected {
                status: status.as_u16(),
                message: if body.is_empty() {
                    format!("server answered with status {}", status)
                } else {
                    body
                },
            }),
        }
    }
}
