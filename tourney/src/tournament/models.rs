//! Tournament data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned tournament identifier.
///
/// Opaque to the client: the hosted backend hands out UUID strings, the
/// in-memory store does the same, and nothing here parses them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TournamentId(String);

impl TournamentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TournamentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for TournamentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for TournamentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Tournament status
///
/// Any value may be set directly; there is no enforced transition order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TournamentStatus {
    #[default]
    Upcoming,
    InProgress,
    Completed,
    Closed,
}

impl TournamentStatus {
    /// All statuses in the order the form offers them.
    pub const ALL: [TournamentStatus; 4] = [
        TournamentStatus::Upcoming,
        TournamentStatus::InProgress,
        TournamentStatus::Completed,
        TournamentStatus::Closed,
    ];

    /// Wire value, as stored in the `status` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentStatus::Upcoming => "upcoming",
            TournamentStatus::InProgress => "in-progress",
            TournamentStatus::Completed => "completed",
            TournamentStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for TournamentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TournamentStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upcoming" => Ok(TournamentStatus::Upcoming),
            "in-progress" => Ok(TournamentStatus::InProgress),
            "completed" => Ok(TournamentStatus::Completed),
            "closed" => Ok(TournamentStatus::Closed),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Returned when a status string is not one of the four known values
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown tournament status: {0}")]
pub struct UnknownStatus(pub String);

/// A tournament row as fetched from the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    /// Server-assigned ID
    pub id: TournamentId,
    /// Display name
    pub title: String,
    /// Banner image URL (not validated as a URL)
    pub banner_url: String,
    /// Current status
    pub status: TournamentStatus,
    /// Capacity, at least 1 when entered through the form
    pub max_participants: i32,
    /// Registered players; only ever defaulted to 0 on creation
    pub current_participants: i32,
    /// Prize pool amount
    pub prize_pool: f64,
    /// Scheduled start
    pub start_date: DateTime<Utc>,
    /// Explicit display position, used only when reordering by rank
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rank: Option<i32>,
    /// Server bookkeeping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Server bookkeeping
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Tournament {
    /// Build a fresh row from validated fields, as a store does on insert.
    pub fn from_draft(id: TournamentId, draft: &TournamentDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title.clone(),
            banner_url: draft.banner_url.clone(),
            status: draft.status,
            max_participants: draft.max_participants,
            current_participants: 0,
            prize_pool: draft.prize_pool,
            start_date: draft.start_date,
            rank: None,
            created_at: Some(now),
            updated_at: Some(now),
        }
    }

    /// Overwrite every form-editable field with the draft's values.
    pub fn apply(&mut self, draft: &TournamentDraft) {
        self.title = draft.title.clone();
        self.banner_url = draft.banner_url.clone();
        self.status = draft.status;
        self.max_participants = draft.max_participants;
        self.prize_pool = draft.prize_pool;
        self.start_date = draft.start_date;
    }
}

/// Validated, form-editable tournament fields.
///
/// Used both as the insert payload (the store adds `current_participants = 0`)
/// and as the full-field update patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentDraft {
    pub title: String,
    pub banner_url: String,
    pub status: TournamentStatus,
    pub max_participants: i32,
    pub prize_pool: f64,
    pub start_date: DateTime<Utc>,
}

/// Sort order requested from the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOrder {
    /// `start_date` ascending, ties by `id`
    #[default]
    StartDate,
    /// `rank` ascending with unranked rows last, then `start_date`, then `id`
    Rank,
}

impl ListOrder {
    /// Sort a slice in place the same way the remote store orders results.
    pub fn sort(&self, tournaments: &mut [Tournament]) {
        match self {
            ListOrder::StartDate => tournaments
                .sort_by(|a, b| a.start_date.cmp(&b.start_date).then_with(|| a.id.cmp(&b.id))),
            ListOrder::Rank => tournaments.sort_by(|a, b| {
                let rank_a = a.rank.unwrap_or(i32::MAX);
                let rank_b = b.rank.unwrap_or(i32::MAX);
                rank_a
                    .cmp(&rank_b)
                    .then_with(|| a.start_date.cmp(&b.start_date))
                    .then_with(|| a.id.cmp(&b.id))
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample(id: &str, day: u32) -> Tournament {
        Tournament {
            id: TournamentId::from(id),
            title: format!("Cup {id}"),
            banner_url: "https://example.com/b.png".to_string(),
            status: TournamentStatus::Upcoming,
            max_participants: 64,
            current_participants: 0,
            prize_pool: 1000.0,
            start_date: Utc.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap(),
            rank: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_status_wire_values() {
        assert_eq!(
            serde_json::to_string(&TournamentStatus::InProgress).unwrap(),
            "\"in-progress\""
        );
        let parsed: TournamentStatus = serde_json::from_str("\"closed\"").unwrap();
        assert_eq!(parsed, TournamentStatus::Closed);
        for status in TournamentStatus::ALL {
            assert_eq!(status.as_str().parse::<TournamentStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = "cancelled".parse::<TournamentStatus>().unwrap_err();
        assert!(err.to_string().contains("cancelled"));
    }

    #[test]
    fn test_deserialize_backend_row() {
        let json = r#"{
            "id": "0b4f6a3e-1c1e-4b8e-9d1f-7f1f2a3b4c5d",
            "title": "Spring Championship 2024",
            "banner_url": "https://images.example.com/spring.jpg",
            "status": "in-progress",
            "max_participants": 100,
            "current_participants": 75,
            "prize_pool": 10000,
            "start_date": "2024-04-15T00:00:00+00:00",
            "created_at": "2024-03-01T10:00:00+00:00",
            "updated_at": "2024-03-01T10:00:00+00:00"
        }"#;

        let tournament: Tournament = serde_json::from_str(json).unwrap();
        assert_eq!(tournament.status, TournamentStatus::InProgress);
        assert_eq!(tournament.prize_pool, 10000.0);
        assert_eq!(tournament.rank, None);
        assert!(tournament.created_at.is_some());
    }

    #[test]
    fn test_from_draft_zeroes_participants() {
        let draft = TournamentDraft {
            title: "Open".to_string(),
            banner_url: "b".to_string(),
            status: TournamentStatus::Closed,
            max_participants: 8,
            prize_pool: 0.0,
            start_date: Utc::now(),
        };
        let row = Tournament::from_draft(TournamentId::from("x"), &draft, Utc::now());
        assert_eq!(row.current_participants, 0);
        assert_eq!(row.status, TournamentStatus::Closed);
    }

    #[test]
    fn test_sort_by_start_date() {
        let mut list = vec![sample("b", 3), sample("a", 3), sample("c", 1)];
        ListOrder::StartDate.sort(&mut list);
        let ids: Vec<_> = list.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_sort_by_rank_puts_unranked_last() {
        let mut first = sample("a", 9);
        first.rank = Some(0);
        let mut second = sample("b", 1);
        second.rank = Some(1);
        let unranked = sample("c", 1);

        let mut list = vec![unranked, second, first];
        ListOrder::Rank.sort(&mut list);
        let ids: Vec<_> = list.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
