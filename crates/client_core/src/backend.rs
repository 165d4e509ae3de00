use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use shared::{
    domain::{HackCode, TeamId},
    protocol::{
        HackathonDefinition, PlagiarismCheckRequest, PlagiarismCheckResponse, PlagiarismReport,
        SubmitRequest, TeamContext, TeamDetailsDocument, TeamDetailsRequest,
    },
};

use crate::PortalBackend;

/// reqwest-backed [`PortalBackend`] speaking the hosted portal API. No
/// retries, and no timeout beyond the transport defaults.
pub struct HttpPortalBackend {
    http: Client,
    base_url: String,
}

impl HttpPortalBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

#[async_trait]
impl PortalBackend for HttpPortalBackend {
    async fn fetch_hackathon(&self, hack_code: &HackCode) -> Result<HackathonDefinition> {
        let hackathon = self
            .http
            .get(self.url("/fetchhack"))
            .query(&[("hackCode", hack_code.as_str())])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("invalid hackathon payload for {hack_code}"))?;
        Ok(hackathon)
    }

    async fn fetch_team_details(&self, request: &TeamDetailsRequest) -> Result<TeamContext> {
        let document: TeamDetailsDocument = self
            .http
            .post(self.url("/getTeamDetails"))
            .bearer_auth(&request.auth_token)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("invalid team details payload")?;
        Ok(document.into_context())
    }

    async fn fetch_submissions(
        &self,
        team_id: &TeamId,
        hack_code: &HackCode,
        auth_token: Option<&str>,
    ) -> Result<Value> {
        let mut request = self
            .http
            .get(self.url("/fetchsubmissions"))
            .query(&[("teamId", team_id.as_str()), ("hackCode", hack_code.as_str())]);
        if let Some(token) = auth_token {
            request = request.bearer_auth(token);
        }
        let payload = request
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(payload)
    }

    async fn submit(&self, request: SubmitRequest, auth_token: Option<&str>) -> Result<()> {
        let mut builder = self
            .http
            .post(self.url("/submissions"))
            .query(&[
                ("teamId", request.team_id.as_str()),
                ("hackCode", request.hack_code.as_str()),
            ])
            .json(&request);
        if let Some(token) = auth_token {
            builder = builder.bearer_auth(token);
        }
        builder.send().await?.error_for_status()?;
        Ok(())
    }

    async fn check_plagiarism(
        &self,
        repository_url: &str,
        auth_token: &str,
    ) -> Result<PlagiarismReport> {
        // This endpoint authenticates through a bare `auth_token` header
        // rather than a bearer Authorization header.
        let response: PlagiarismCheckResponse = self
            .http
            .post(self.url("/check-plagiarism"))
            .header("auth_token", auth_token)
            .json(&PlagiarismCheckRequest {
                repository_url: repository_url.to_string(),
            })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await
            .context("invalid plagiarism report payload")?;

        if !response.success {
            bail!("plagiarism check reported failure");
        }
        Ok(response.data)
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
