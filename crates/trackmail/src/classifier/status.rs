//! Application lifecycle status taxonomy.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Terminal classification for one ingested email. A later status always
/// supersedes an earlier one when appended as a new event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    InterviewScheduled,
    InterviewCompleted,
    OfferReceived,
    Rejected,
    Withdrawn,
    NotJobRelated,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::InterviewScheduled => "interview_scheduled",
            Self::InterviewCompleted => "interview_completed",
            Self::OfferReceived => "offer_received",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
            Self::NotJobRelated => "not_job_related",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "applied" => Some(Self::Applied),
            "interview_scheduled" => Some(Self::InterviewScheduled),
            "interview_completed" => Some(Self::InterviewCompleted),
            "offer_received" => Some(Self::OfferReceived),
            "rejected" => Some(Self::Rejected),
            "withdrawn" => Some(Self::Withdrawn),
            "not_job_related" => Some(Self::NotJobRelated),
            _ => None,
        }
    }

    pub fn is_job_related(&self) -> bool {
        !matches!(self, Self::NotJobRelated)
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Follow-up urgency, derived purely from the selected status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl Urgency {
    /// Offers and scheduled interviews demand attention; rejections don't.
    pub fn for_status(status: ApplicationStatus) -> Self {
        match status {
            ApplicationStatus::OfferReceived | ApplicationStatus::InterviewScheduled => Self::High,
            ApplicationStatus::Rejected => Self::Low,
            _ => Self::Medium,
        }
    }
}
