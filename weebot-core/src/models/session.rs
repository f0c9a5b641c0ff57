use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Discriminator for the two practice flows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    Communication,
    Coding,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Communication => "communication",
            SessionKind::Coding => "coding",
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for SessionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "communication" => Ok(SessionKind::Communication),
            "coding" => Ok(SessionKind::Coding),
            other => Err(format!(
                "unknown session type '{}': expected communication or coding",
                other
            )),
        }
    }
}

/// One completed practice run. Serialized with a `type` tag so the persisted
/// JSON matches `{"type": "coding", ...}` records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Session {
    Communication(CommunicationSession),
    Coding(CodingSession),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationSession {
    pub id: String,
    pub date: DateTime<Utc>,
    /// Whole seconds
    pub duration: u64,
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub questions: Vec<String>,
    #[serde(default)]
    pub questions_answered: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodingSession {
    pub id: String,
    pub date: DateTime<Utc>,
    /// Whole seconds
    pub duration: u64,
    pub problems_solved: u32,
    pub total_problems: u32,
    pub accuracy: u8,
    pub score: u8,
}

impl CommunicationSession {
    pub fn new(
        id: impl Into<String>,
        date: DateTime<Utc>,
        duration: u64,
        transcript: impl Into<String>,
        questions: Vec<String>,
        questions_answered: u32,
        score: Option<u8>,
    ) -> Self {
        Self {
            id: id.into(),
            date,
            duration,
            transcript: transcript.into(),
            questions,
            questions_answered,
            score,
        }
    }
}

impl CodingSession {
    /// Build a coding record from the end-of-run tally. Accuracy is the rounded
    /// solve rate and doubles as the score; zero total problems yields 0.
    pub fn from_progress(
        id: impl Into<String>,
        date: DateTime<Utc>,
        duration: u64,
        problems_solved: u32,
        total_problems: u32,
    ) -> Self {
        let accuracy = percent(problems_solved, total_problems);
        Self {
            id: id.into(),
            date,
            duration,
            problems_solved,
            total_problems,
            accuracy,
            score: accuracy,
        }
    }
}

/// `round(part / whole * 100)` with half-up rounding, capped at 100.
fn percent(part: u32, whole: u32) -> u8 {
    if whole == 0 {
        return 0;
    }
    let scaled = (u64::from(part) * 200 + u64::from(whole)) / (u64::from(whole) * 2);
    scaled.min(100) as u8
}

impl Session {
    pub fn id(&self) -> &str {
        match self {
            Session::Communication(s) => &s.id,
            Session::Coding(s) => &s.id,
        }
    }

    pub fn kind(&self) -> SessionKind {
        match self {
            Session::Communication(_) => SessionKind::Communication,
            Session::Coding(_) => SessionKind::Coding,
        }
    }

    pub fn date(&self) -> DateTime<Utc> {
        match self {
            Session::Communication(s) => s.date,
            Session::Coding(s) => s.date,
        }
    }

    pub fn duration(&self) -> u64 {
        match self {
            Session::Communication(s) => s.duration,
            Session::Coding(s) => s.duration,
        }
    }

    pub fn score(&self) -> Option<u8> {
        match self {
            Session::Communication(s) => s.score,
            Session::Coding(s) => Some(s.score),
        }
    }
}

impl From<CommunicationSession> for Session {
    fn from(s: CommunicationSession) -> Self {
        Session::Communication(s)
    }
}

impl From<CodingSession> for Session {
    fn from(s: CodingSession) -> Self {
        Session::Coding(s)
    }
}
