use std::{
    collections::{BTreeMap, HashMap},
    sync::Arc,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use shared::{
    domain::{HackCode, PhaseStatus, TeamId},
    protocol::{
        HackathonDefinition, Phase, PlagiarismReport, SubmissionRecord, SubmitRequest,
        TeamContext, TeamDetailsRequest,
    },
};
use tracing::{info, warn};

pub mod backend;
pub mod error;

pub use backend::HttpPortalBackend;
pub use error::{LoadError, SubmitError};

/// Local credential store for the current viewer. Absence of either value is
/// the valid "not logged in" state, not a fault.
pub trait CredentialStore: Send + Sync {
    fn email(&self) -> Option<String>;
    fn auth_token(&self) -> Option<String>;
}

/// Credential store for an unauthenticated session.
pub struct MissingCredentialStore;

impl CredentialStore for MissingCredentialStore {
    fn email(&self) -> Option<String> {
        None
    }

    fn auth_token(&self) -> Option<String> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct StaticCredentials {
    pub email: String,
    pub auth_token: String,
}

impl CredentialStore for StaticCredentials {
    fn email(&self) -> Option<String> {
        Some(self.email.clone())
    }

    fn auth_token(&self) -> Option<String> {
        Some(self.auth_token.clone())
    }
}

/// Remote portal API. The submissions payload crosses this seam as loose
/// JSON because the backing store answers with an array, a bare object, or
/// nothing; the controller owns the fallback.
#[async_trait]
pub trait PortalBackend: Send + Sync {
    async fn fetch_hackathon(&self, hack_code: &HackCode) -> Result<HackathonDefinition>;
    async fn fetch_team_details(&self, request: &TeamDetailsRequest) -> Result<TeamContext>;
    async fn fetch_submissions(
        &self,
        team_id: &TeamId,
        hack_code: &HackCode,
        auth_token: Option<&str>,
    ) -> Result<Value>;
    async fn submit(&self, request: SubmitRequest, auth_token: Option<&str>) -> Result<()>;
    async fn check_plagiarism(
        &self,
        repository_url: &str,
        auth_token: &str,
    ) -> Result<PlagiarismReport>;
}

pub struct MissingPortalBackend;

#[async_trait]
impl PortalBackend for MissingPortalBackend {
    async fn fetch_hackathon(&self, hack_code: &HackCode) -> Result<HackathonDefinition> {
        Err(anyhow!("portal backend unavailable for event {hack_code}"))
    }

    async fn fetch_team_details(&self, _request: &TeamDetailsRequest) -> Result<TeamContext> {
        Err(anyhow!("portal backend is unavailable"))
    }

    async fn fetch_submissions(
        &self,
        _team_id: &TeamId,
        hack_code: &HackCode,
        _auth_token: Option<&str>,
    ) -> Result<Value> {
        Err(anyhow!("portal backend unavailable for event {hack_code}"))
    }

    async fn submit(&self, _request: SubmitRequest, _auth_token: Option<&str>) -> Result<()> {
        Err(anyhow!("portal backend is unavailable"))
    }

    async fn check_plagiarism(
        &self,
        _repository_url: &str,
        _auth_token: &str,
    ) -> Result<PlagiarismReport> {
        Err(anyhow!("portal backend is unavailable"))
    }
}

/// Classifies a phase against the wall clock. Pure; both window ends are
/// inclusive, so `now == start` and `now == end` are both active.
pub fn phase_status(phase: &Phase, now: DateTime<Utc>) -> PhaseStatus {
    PhaseStatus::for_window(phase.start_date, phase.end_date, now)
}

/// Builds the per-phase lookup from whatever the backend returned. An array
/// is indexed with first-match-wins on duplicate phase indices, a bare
/// object counts as a one-element collection, and anything else yields an
/// empty map. The empty map is a deliberate fallback, not an error.
pub fn index_submissions(payload: Value) -> BTreeMap<usize, SubmissionRecord> {
    let candidates = match payload {
        Value::Array(items) => items,
        value @ Value::Object(_) => vec![value],
        _ => Vec::new(),
    };

    let mut index = BTreeMap::new();
    for candidate in candidates {
        match serde_json::from_value::<SubmissionRecord>(candidate) {
            Ok(record) => {
                index.entry(record.phase_index).or_insert(record);
            }
            Err(err) => warn!("discarding malformed submission record: {err}"),
        }
    }
    index
}

/// Draft for a phase: a copy of the stored values when a record exists,
/// otherwise empty.
pub fn derive_draft(
    index: &BTreeMap<usize, SubmissionRecord>,
    active_phase: usize,
) -> HashMap<String, String> {
    index
        .get(&active_phase)
        .map(|record| record.submissions.clone())
        .unwrap_or_default()
}

/// The phase submission controller: holds read-only working copies of the
/// hackathon definition, the viewer's team and the submission index, plus
/// the one piece of state it owns outright, the current phase's draft.
pub struct SubmissionPortal {
    backend: Arc<dyn PortalBackend>,
    credentials: Arc<dyn CredentialStore>,
    hack_code: HackCode,
    hackathon: Option<HackathonDefinition>,
    team: Option<TeamContext>,
    submission_index: BTreeMap<usize, SubmissionRecord>,
    active_phase: usize,
    draft: HashMap<String, String>,
}

impl SubmissionPortal {
    pub fn new(
        backend: Arc<dyn PortalBackend>,
        credentials: Arc<dyn CredentialStore>,
        hack_code: HackCode,
    ) -> Self {
        Self {
            backend,
            credentials,
            hack_code,
            hackathon: None,
            team: None,
            submission_index: BTreeMap::new(),
            active_phase: 0,
            draft: HashMap::new(),
        }
    }

    /// Initial load. The hackathon definition and team context are fetched
    /// concurrently; the submission index is fetched only once team context
    /// has resolved, since it needs the team id. Only the definition fetch
    /// is fatal; everything else degrades to an absent/empty state.
    pub async fn load(&mut self) -> Result<(), LoadError> {
        let (hackathon, team) = tokio::join!(
            self.backend.fetch_hackathon(&self.hack_code),
            self.fetch_team_context(),
        );

        let hackathon = hackathon.map_err(|source| LoadError::HackathonUnavailable {
            hack_code: self.hack_code.to_string(),
            source,
        })?;
        info!(
            hack_code = %self.hack_code,
            phases = hackathon.phases.len(),
            "hackathon definition loaded"
        );

        self.hackathon = Some(hackathon);
        self.team = team;
        self.active_phase = 0;
        self.reload_submissions().await;
        Ok(())
    }

    async fn fetch_team_context(&self) -> Option<TeamContext> {
        let (Some(email), Some(auth_token)) =
            (self.credentials.email(), self.credentials.auth_token())
        else {
            info!("no stored credentials; skipping team lookup");
            return None;
        };

        let request = TeamDetailsRequest {
            email,
            hack_code: self.hack_code.clone(),
            auth_token,
        };
        match self.backend.fetch_team_details(&request).await {
            Ok(team) => Some(team),
            Err(err) => {
                warn!("team lookup failed; rendering without a team: {err}");
                None
            }
        }
    }

    /// Re-fetches the submission index and re-derives the draft from it.
    /// Without a team there is nothing to fetch; a fetch failure falls back
    /// to an empty index. Never fatal.
    pub async fn reload_submissions(&mut self) {
        let index = match &self.team {
            Some(team) => {
                let token = self.credentials.auth_token();
                match self
                    .backend
                    .fetch_submissions(&team.team_id, &self.hack_code, token.as_deref())
                    .await
                {
                    Ok(payload) => index_submissions(payload),
                    Err(err) => {
                        warn!(
                            team_id = %team.team_id,
                            "submission fetch failed; treating as none: {err}"
                        );
                        BTreeMap::new()
                    }
                }
            }
            None => BTreeMap::new(),
        };
        self.submission_index = index;
        self.refresh_draft();
    }

    /// Switches the viewed phase and re-derives the draft so the previous
    /// phase's values never leak into the new one.
    pub fn select_phase(&mut self, index: usize) {
        self.active_phase = index;
        self.refresh_draft();
    }

    fn refresh_draft(&mut self) {
        self.draft = derive_draft(&self.submission_index, self.active_phase);
    }

    pub fn hackathon(&self) -> Option<&HackathonDefinition> {
        self.hackathon.as_ref()
    }

    pub fn team(&self) -> Option<&TeamContext> {
        self.team.as_ref()
    }

    pub fn active_phase(&self) -> usize {
        self.active_phase
    }

    pub fn draft(&self) -> &HashMap<String, String> {
        &self.draft
    }

    pub fn has_submission(&self, phase_index: usize) -> bool {
        self.submission_index.contains_key(&phase_index)
    }

    pub fn submission_for(&self, phase_index: usize) -> Option<&SubmissionRecord> {
        self.submission_index.get(&phase_index)
    }

    /// Gates both the input form and the submit action: the phase window
    /// must be open, and the viewer must be on a team that is not inactive.
    pub fn can_submit(&self, phase_index: usize, now: DateTime<Utc>) -> bool {
        let Some(hackathon) = &self.hackathon else {
            return false;
        };
        let Some(phase) = hackathon.phases.get(phase_index) else {
            return false;
        };
        let Some(team) = &self.team else {
            return false;
        };
        phase_status(phase, now) == PhaseStatus::Active && !team.activity.is_inactive()
    }

    /// Upsert into the current draft. Values are free text; empty strings
    /// are accepted.
    pub fn update_draft_field(&mut self, kind: impl Into<String>, value: impl Into<String>) {
        self.draft.insert(kind.into(), value.into());
    }

    /// Sends the current draft for the active phase. Create and update are
    /// the same operation: the backend keys on phase index. On success the
    /// submission index is reloaded so callers see the saved values; on any
    /// failure the draft is left untouched for a retry.
    pub async fn submit_draft(&mut self, now: DateTime<Utc>) -> Result<(), SubmitError> {
        let hackathon = self.hackathon.as_ref().ok_or(SubmitError::MissingHackathon)?;
        let team = self.team.as_ref().ok_or(SubmitError::MissingTeam)?;
        let phase = hackathon
            .phases
            .get(self.active_phase)
            .ok_or(SubmitError::UnknownPhase(self.active_phase))?;

        if team.activity.is_inactive() {
            return Err(SubmitError::InactiveTeam);
        }
        if phase_status(phase, now) != PhaseStatus::Active {
            return Err(SubmitError::PhaseClosed(self.active_phase));
        }
        if self.draft.is_empty() {
            return Err(SubmitError::EmptyDraft);
        }

        let request = SubmitRequest {
            submissions: self.draft.clone(),
            team_id: team.team_id.clone(),
            hack_code: self.hack_code.clone(),
            phase_index: self.active_phase,
        };
        let token = self.credentials.auth_token();
        self.backend
            .submit(request, token.as_deref())
            .await
            .map_err(SubmitError::Backend)?;
        info!(phase_index = self.active_phase, "submission saved");

        self.reload_submissions().await;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
