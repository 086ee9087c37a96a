//! Manual re-ordering of the admin list.
//!
//! Moving a tournament swaps it with its neighbour in the currently fetched,
//! sorted list. How the new order is persisted depends on [`ReorderMode`].

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::models::{ListOrder, Tournament};

/// Direction of a move in the displayed list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoveDirection {
    Up,
    Down,
}

impl MoveDirection {
    /// Neighbour index, or `None` when the move would leave the list.
    pub fn target(&self, index: usize, len: usize) -> Option<usize> {
        if index >= len {
            return None;
        }
        match self {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1).filter(|t| *t < len),
        }
    }
}

impl FromStr for MoveDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(MoveDirection::Up),
            "down" => Ok(MoveDirection::Down),
            other => Err(format!("Unknown move direction: {other}")),
        }
    }
}

impl fmt::Display for MoveDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoveDirection::Up => f.write_str("up"),
            MoveDirection::Down => f.write_str("down"),
        }
    }
}

/// How a new display order is written back to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReorderMode {
    /// Display order is `start_date` order. The swapped pair is re-dated to
    /// the click time, which overwrites the dates the admin entered, and the
    /// whole list is upserted.
    #[default]
    StartDate,
    /// Display order is an explicit `rank` column. Dates are left alone and
    /// only rows whose rank changed are upserted.
    Rank,
}

impl ReorderMode {
    /// Order the store must list in for this mode.
    pub fn list_order(&self) -> ListOrder {
        match self {
            ReorderMode::StartDate => ListOrder::StartDate,
            ReorderMode::Rank => ListOrder::Rank,
        }
    }
}

impl FromStr for ReorderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "start-date" | "start_date" => Ok(ReorderMode::StartDate),
            "rank" => Ok(ReorderMode::Rank),
            other => Err(format!("Unknown reorder mode: {other}")),
        }
    }
}

/// Result of planning a move
#[derive(Debug, Clone, PartialEq)]
pub struct MovePlan {
    /// The list in its new display order, with rewritten fields applied
    pub swapped: Vec<Tournament>,
    /// Rows to send to `upsert_many`
    pub upserts: Vec<Tournament>,
}

/// Plan swapping `index` with its neighbour in `direction`.
///
/// Returns `None` when the move is out of range, in which case nothing
/// should be written.
pub fn plan_move(
    tournaments: &[Tournament],
    index: usize,
    direction: MoveDirection,
    mode: ReorderMode,
    now: DateTime<Utc>,
) -> Option<MovePlan> {
    let target = direction.target(index, tournaments.len())?;

    let mut swapped = tournaments.to_vec();
    swapped.swap(index, target);

    match mode {
        ReorderMode::StartDate => {
            let (earlier, later) = (index.min(target), index.max(target));
            swapped[earlier].start_date = now;
            // Identical timestamps would leave the pair's order to the id tiebreak.
            swapped[later].start_date = now + Duration::milliseconds(1);

            Some(MovePlan {
                upserts: swapped.clone(),
                swapped,
            })
        }
        ReorderMode::Rank => {
            let mut upserts = Vec::new();
            for (position, tournament) in swapped.iter_mut().enumerate() {
                let rank = position as i32;
                if tournament.rank != Some(rank) {
                    tournament.rank = Some(rank);
                    upserts.push(tournament.clone());
                }
            }

            Some(MovePlan { swapped, upserts })
        }
    }
}
