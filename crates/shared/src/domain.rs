use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

macro_rules! code_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }
    };
}

code_newtype!(HackCode);
code_newtype!(TeamId);

/// Lifecycle of a phase relative to wall-clock time. Monotonic for a fixed
/// window: a phase only ever moves forward through these states, and no user
/// action changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhaseStatus {
    Upcoming,
    Active,
    Completed,
}

impl PhaseStatus {
    /// Classifies `now` against a closed `[start, end]` window.
    pub fn for_window(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        if now < start {
            PhaseStatus::Upcoming
        } else if now > end {
            PhaseStatus::Completed
        } else {
            PhaseStatus::Active
        }
    }
}

impl fmt::Display for PhaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseStatus::Upcoming => f.write_str("upcoming"),
            PhaseStatus::Active => f.write_str("active"),
            PhaseStatus::Completed => f.write_str("completed"),
        }
    }
}

/// Server-asserted team status. Anything other than an explicit `"inactive"`
/// counts as active, including an absent field on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamActivity {
    #[default]
    Active,
    Inactive,
}

impl TeamActivity {
    /// Maps a raw status string to the flag. Unknown or missing values count
    /// as active rather than failing the whole team payload.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("inactive") => TeamActivity::Inactive,
            _ => TeamActivity::Active,
        }
    }

    pub fn is_inactive(self) -> bool {
        matches!(self, TeamActivity::Inactive)
    }
}
