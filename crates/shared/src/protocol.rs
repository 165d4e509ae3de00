use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{HackCode, TeamActivity, TeamId};

/// One required artifact for a phase. `kind` (`"type"` on the wire) is the
/// key submissions are stored under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deliverable {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub deliverables: Vec<Deliverable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organiser {
    #[serde(default)]
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prize {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sponsor {
    pub name: String,
}

/// Immutable event definition as served by the backend. Phase order is
/// significant: the positional index is the identity submissions are keyed by.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HackathonDefinition {
    pub hack_code: HackCode,
    pub event_name: String,
    #[serde(default)]
    pub event_tagline: String,
    #[serde(default)]
    pub event_description: String,
    #[serde(default)]
    pub event_type: String,
    pub event_start_date: DateTime<Utc>,
    pub event_end_date: DateTime<Utc>,
    #[serde(default)]
    pub registration_start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub registration_end_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub team_size: String,
    #[serde(default)]
    pub max_teams: String,
    #[serde(default)]
    pub has_fee: bool,
    #[serde(default)]
    pub fee: String,
    #[serde(default)]
    pub upi_id: String,
    #[serde(default)]
    pub admins: Vec<String>,
    #[serde(default)]
    pub organisers: Vec<Organiser>,
    #[serde(default)]
    pub phases: Vec<Phase>,
    #[serde(default)]
    pub prizes: Vec<Prize>,
    #[serde(default)]
    pub sponsors: Vec<Sponsor>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub role: String,
}

/// The current viewer's team for one event. Absent entirely when the viewer
/// is unauthenticated or not on a team.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamContext {
    pub team_id: TeamId,
    pub team_name: String,
    #[serde(default)]
    pub members: Vec<TeamMember>,
    #[serde(default)]
    pub activity: TeamActivity,
}

/// Raw `getTeamDetails` document: the interesting fields live on a nested
/// `team` object, with the roster alongside. Validated into [`TeamContext`]
/// at the boundary.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamDetailsDocument {
    pub team: TeamRecord,
    #[serde(default)]
    pub members: Vec<TeamMember>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamRecord {
    pub team_id: TeamId,
    pub team_name: String,
    #[serde(default)]
    pub status: Option<String>,
}

impl TeamDetailsDocument {
    pub fn into_context(self) -> TeamContext {
        TeamContext {
            activity: TeamActivity::parse(self.team.status.as_deref()),
            team_id: self.team.team_id,
            team_name: self.team.team_name,
            members: self.members,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TeamDetailsRequest {
    pub email: String,
    #[serde(rename = "hackCode")]
    pub hack_code: HackCode,
    pub auth_token: String,
}

/// One stored submission: a per-phase mapping from deliverable type to the
/// free-text value the team entered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub phase_index: usize,
    #[serde(default)]
    pub submissions: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    pub submissions: HashMap<String, String>,
    pub team_id: TeamId,
    pub hack_code: HackCode,
    pub phase_index: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct PlagiarismCheckRequest {
    pub repository_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlagiarismCheckResponse {
    pub success: bool,
    pub data: PlagiarismReport,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlagiarismReport {
    pub analysis: PlagiarismAnalysis,
    pub repository: RepositoryInfo,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlagiarismAnalysis {
    pub commit_patterns: CommitPatterns,
    pub final_assessment: FinalAssessment,
    pub inter_repository_similarity: InterRepositorySimilarity,
    pub intra_repository_similarity: IntraRepositorySimilarity,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitPatterns {
    pub commit_count: u64,
    pub details: CommitPatternDetails,
    #[serde(default)]
    pub indicators: Vec<String>,
    pub score: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommitPatternDetails {
    pub author_score: f64,
    pub message_score: f64,
    pub size_score: f64,
    pub timing_score: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InterRepositorySimilarity {
    pub files_checked: u64,
    #[serde(default)]
    pub matches: Vec<serde_json::Value>,
    pub score: f64,
    pub search_attempts: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IntraRepositorySimilarity {
    pub file_count: u64,
    pub score: f64,
    #[serde(default)]
    pub similar_files: Vec<SimilarFilePair>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SimilarFilePair {
    pub file1: String,
    pub file2: String,
    pub similarity: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FinalAssessment {
    pub component_scores: ComponentScores,
    #[serde(default)]
    pub confidence: String,
    pub final_score: f64,
    #[serde(default)]
    pub indicators: Vec<String>,
    #[serde(default)]
    pub risk_level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComponentScores {
    pub commit_patterns: f64,
    pub inter_repository_similarity: f64,
    pub intra_repository_similarity: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryInfo {
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub language: String,
    pub name: String,
    #[serde(default)]
    pub owner: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub url: String,
}
