//! Card view-model: everything a tournament card displays, already formatted.

use chrono::{DateTime, Utc};

use super::models::{Tournament, TournamentStatus};

/// Badge label and style class for a status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusBadge {
    pub label: &'static str,
    pub class: &'static str,
}

/// Fixed status lookup
pub fn status_badge(status: TournamentStatus) -> StatusBadge {
    match status {
        TournamentStatus::InProgress => StatusBadge {
            label: "In Progress",
            class: "status-progress",
        },
        TournamentStatus::Closed => StatusBadge {
            label: "Closed",
            class: "status-closed",
        },
        TournamentStatus::Completed => StatusBadge {
            label: "Completed",
            class: "status-completed",
        },
        TournamentStatus::Upcoming => StatusBadge {
            label: "Upcoming",
            class: "status-upcoming",
        },
    }
}

/// Summary of one tournament as shown on a card
#[derive(Debug, Clone, PartialEq)]
pub struct TournamentCard {
    pub banner: String,
    pub title: String,
    pub badge: StatusBadge,
    pub current: i32,
    pub max: i32,
    pub prize_pool: String,
    pub start_date: String,
}

impl TournamentCard {
    /// Fill percentage. Not clamped: over-full tournaments exceed 100 and a
    /// zero capacity yields `inf` or `NaN`.
    pub fn progress(&self) -> f64 {
        f64::from(self.current) / f64::from(self.max) * 100.0
    }

    /// Whole-number percentage for display, or a dash when not finite.
    pub fn progress_label(&self) -> String {
        let progress = self.progress();
        if progress.is_finite() {
            format!("{progress:.0}%")
        } else {
            "–".to_string()
        }
    }

    /// Width of the progress bar fill, kept inside `0..=100`.
    pub fn bar_width(&self) -> f64 {
        let progress = self.progress();
        if progress.is_finite() {
            progress.clamp(0.0, 100.0)
        } else {
            0.0
        }
    }

    pub fn participants_label(&self) -> String {
        format!("{}/{} Players", self.current, self.max)
    }
}

impl From<&Tournament> for TournamentCard {
    fn from(tournament: &Tournament) -> Self {
        Self {
            banner: tournament.banner_url.clone(),
            title: tournament.title.clone(),
            badge: status_badge(tournament.status),
            current: tournament.current_participants,
            max: tournament.max_participants,
            prize_pool: format_prize_pool(tournament.prize_pool),
            start_date: format_start_date(tournament.start_date),
        }
    }
}

/// `$` followed by the amount with en-US digit grouping, e.g. `$10,000`.
///
/// Up to three fraction digits are kept, trailing zeros dropped.
pub fn format_prize_pool(amount: f64) -> String {
    if !amount.is_finite() {
        return format!("${amount}");
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    let fixed = format!("{:.3}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let fraction = fraction.trim_end_matches('0');

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    if fraction.is_empty() {
        format!("{sign}${grouped}")
    } else {
        format!("{sign}${grouped}.{fraction}")
    }
}

/// Short US date, e.g. `Apr 15, 2024`.
pub fn format_start_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}
