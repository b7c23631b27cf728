//! HTTP notification client.
//!
//! Fire-and-forget from the core's perspective: the submission coordinator
//! dispatches this after the job is already live, and a failure only feeds
//! the "email pending" banner.

use async_trait::async_trait;
use tracing::info;

use quotedesk_core::collaborators::{CollaboratorError, Notifier};
use quotedesk_core::models::JobCategory;

use crate::error::BackendError;

/// `Notifier` posting job-live notifications to an HTTP endpoint.
pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct JobLiveMail<'a> {
    email: &'a str,
    name: &'a str,
    region: &'a str,
    job_id: &'a str,
    category: &'a str,
}

impl HttpNotifier {
    pub fn new(endpoint: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
        }
    }

    async fn post_job_live(
        &self,
        email: &str,
        name: &str,
        region: &str,
        job_id: &str,
        category: JobCategory,
    ) -> Result<(), BackendError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&JobLiveMail {
                email,
                name,
                region,
                job_id,
                category: category.as_str(),
            })
            .send()
            .await
            .map_err(|e| BackendError::Http(e.to_string()))?;
        if !response.status().is_success() {
            return Err(BackendError::Http(format!(
                "notify endpoint answered {}",
                response.status()
            )));
        }
        info!(job_id, "job-live notification sent");
        Ok(())
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn notify_job_live(
        &self,
        email: &str,
        name: &str,
        region: &str,
        job_id: &str,
        category: JobCategory,
    ) -> Result<(), CollaboratorError> {
        self.post_job_live(email, name, region, job_id, category)
            .await
            .map_err(CollaboratorError::from)
    }
}
