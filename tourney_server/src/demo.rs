//! Sample tournaments for `--demo` runs on the in-memory store.

use chrono::{DateTime, Duration, Utc};
use tourney::tournament::{Tournament, TournamentId, TournamentStatus};
use uuid::Uuid;

struct Sample {
    title: &'static str,
    banner_url: &'static str,
    status: TournamentStatus,
    current: i32,
    max: i32,
    prize_pool: f64,
    days_from_now: i64,
}

const SAMPLES: [Sample; 4] = [
    Sample {
        title: "Pro League Season 5",
        banner_url: "https://images.unsplash.com/photo-1587825140708-dfaf72ae4b04?w=800&auto=format&fit=crop&q=60",
        status: TournamentStatus::Closed,
        current: 45,
        max: 50,
        prize_pool: 7500.0,
        days_from_now: -30,
    },
    Sample {
        title: "Winter Classic",
        banner_url: "https://images.unsplash.com/photo-1493711662062-fa541adb3fc8?w=800&auto=format&fit=crop&q=60",
        status: TournamentStatus::Completed,
        current: 64,
        max: 64,
        prize_pool: 15000.0,
        days_from_now: -14,
    },
    Sample {
        title: "Spring Championship 2024",
        banner_url: "https://images.unsplash.com/photo-1542751371-adc38448a05e?w=800&auto=format&fit=crop&q=60",
        status: TournamentStatus::InProgress,
        current: 75,
        max: 100,
        prize_pool: 10000.0,
        days_from_now: 0,
    },
    Sample {
        title: "Summer Invitational",
        banner_url: "https://images.unsplash.com/photo-1511512578047-dfb367046420?w=800&auto=format&fit=crop&q=60",
        status: TournamentStatus::Upcoming,
        current: 25,
        max: 128,
        prize_pool: 5000.0,
        days_from_now: 45,
    },
];

/// Four sample rows spread around `now`, one per status
pub fn tournaments(now: DateTime<Utc>) -> Vec<Tournament> {
    SAMPLES
        .iter()
        .map(|s| Tournament {
            id: TournamentId::new(Uuid::new_v4().to_string()),
            title: s.title.to_string(),
            banner_url: s.banner_url.to_string(),
            status: s.status,
            max_participants: s.max,
            current_participants: s.current,
            prize_pool: s.prize_pool,
            start_date: now + Duration::days(s.days_from_now),
            rank: None,
            created_at: Some(now),
            updated_at: Some(now),
        })
        .collect()
}
