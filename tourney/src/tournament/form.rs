//! Create/edit form input and its validation.
//!
//! [`TournamentInput`] carries the form exactly as submitted (strings for the
//! numeric and date fields) so a rejected submission can be re-rendered with
//! the user's values intact. [`validate`] is pure: it never touches the store.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::models::{Tournament, TournamentDraft, TournamentStatus};

/// Default capacity offered on a new form
pub const DEFAULT_MAX_PARTICIPANTS: i32 = 100;

/// `<input type="datetime-local">` value with millisecond precision, so an
/// edit that leaves the date alone writes back the stored instant
const DATETIME_LOCAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// Form fields as submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TournamentInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub banner_url: String,
    #[serde(default)]
    pub max_participants: String,
    #[serde(default)]
    pub prize_pool: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub status: String,
}

impl TournamentInput {
    /// Blank form for create mode. The start date defaults to `now`.
    pub fn new_defaults(now: DateTime<Utc>) -> Self {
        Self {
            title: String::new(),
            banner_url: String::new(),
            max_participants: DEFAULT_MAX_PARTICIPANTS.to_string(),
            prize_pool: "0".to_string(),
            start_date: to_datetime_local(now),
            status: TournamentStatus::Upcoming.to_string(),
        }
    }

    /// Form pre-populated from an existing row for edit mode.
    pub fn from_tournament(tournament: &Tournament) -> Self {
        Self {
            title: tournament.title.clone(),
            banner_url: tournament.banner_url.clone(),
            max_participants: tournament.max_participants.to_string(),
            prize_pool: tournament.prize_pool.to_string(),
            start_date: to_datetime_local(tournament.start_date),
            status: tournament.status.to_string(),
        }
    }
}

/// Which form field an error belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormField {
    Title,
    BannerUrl,
    MaxParticipants,
    PrizePool,
    StartDate,
    Status,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::Title => "title",
            FormField::BannerUrl => "banner_url",
            FormField::MaxParticipants => "max_participants",
            FormField::PrizePool => "prize_pool",
            FormField::StartDate => "start_date",
            FormField::Status => "status",
        }
    }

    fn message(&self) -> &'static str {
        match self {
            FormField::Title => "Title is required",
            FormField::BannerUrl => "Banner URL is required",
            FormField::MaxParticipants => "Valid max participants is required",
            FormField::PrizePool => "Valid prize pool is required",
            FormField::StartDate => "Start date is required",
            FormField::Status => "Status is invalid",
        }
    }
}

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: FormField,
    pub message: String,
}

impl FieldError {
    fn new(field: FormField) -> Self {
        Self {
            field,
            message: field.message().to_string(),
        }
    }
}

/// Every field error found in one submission, in form order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Error message for a field, if it was rejected.
    pub fn get(&self, field: FormField) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn contains(&self, field: FormField) -> bool {
        self.get(field).is_some()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<&str> = self.0.iter().map(|e| e.message.as_str()).collect();
        f.write_str(&messages.join("; "))
    }
}

/// Validate a submission.
///
/// Returns the typed fields on success, or every failing field.
pub fn validate(input: &TournamentInput) -> Result<TournamentDraft, FieldErrors> {
    let mut errors = Vec::new();

    let title = input.title.trim();
    if title.is_empty() {
        errors.push(FieldError::new(FormField::Title));
    }

    let banner_url = input.banner_url.trim();
    if banner_url.is_empty() {
        errors.push(FieldError::new(FormField::BannerUrl));
    }

    let max_participants = input
        .max_participants
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|n| *n >= 1);
    if max_participants.is_none() {
        errors.push(FieldError::new(FormField::MaxParticipants));
    }

    let prize_pool = input
        .prize_pool
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0);
    if prize_pool.is_none() {
        errors.push(FieldError::new(FormField::PrizePool));
    }

    let start_date = parse_start_date(&input.start_date);
    if start_date.is_none() {
        errors.push(FieldError::new(FormField::StartDate));
    }

    let status = input.status.trim().parse::<TournamentStatus>().ok();
    if status.is_none() {
        errors.push(FieldError::new(FormField::Status));
    }

    match (max_participants, prize_pool, start_date, status) {
        (Some(max_participants), Some(prize_pool), Some(start_date), Some(status))
            if errors.is_empty() =>
        {
            Ok(TournamentDraft {
                title: title.to_string(),
                banner_url: banner_url.to_string(),
                status,
                max_participants,
                prize_pool,
                start_date,
            })
        }
        _ => Err(FieldErrors(errors)),
    }
}

/// Accepts RFC 3339 or the `datetime-local` shape (read as UTC).
pub fn parse_start_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    // `%.f` also matches a missing fraction
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .ok()
        .map(|naive| naive.and_utc())
}

/// Render a timestamp for a `datetime-local` input.
pub fn to_datetime_local(dt: DateTime<Utc>) -> String {
    dt.format(DATETIME_LOCAL_FORMAT).to_string()
}
