//! Tournament listing and admin web server.
//!
//! Serves the public page (tournament cards plus admin controls), the
//! admin-only page, and a JSON API, all backed by one
//! [`tourney::TournamentAdmin`] and its shared cache.

pub mod api;
pub mod config;
pub mod demo;
pub mod instrumented;
pub mod logging;
pub mod metrics;
pub mod render;
