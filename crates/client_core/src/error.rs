use thiserror::Error;

/// Fatal load failure: without the hackathon definition there is nothing to
/// render. The caller's retry is a full `load()`.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to load hackathon {hack_code}: {source}")]
    HackathonUnavailable {
        hack_code: String,
        source: anyhow::Error,
    },
}

/// Outcomes of `submit_draft`. Everything except `Backend` is a local
/// precondition failure; in all cases the draft is left untouched.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("no hackathon definition is loaded")]
    MissingHackathon,
    #[error("no team context for this event")]
    MissingTeam,
    #[error("team is inactive; submissions are not allowed")]
    InactiveTeam,
    #[error("phase {0} does not exist")]
    UnknownPhase(usize),
    #[error("phase {0} is not accepting submissions")]
    PhaseClosed(usize),
    #[error("draft has no fields to submit")]
    EmptyDraft,
    #[error("submission failed: {0}")]
    Backend(anyhow::Error),
}
