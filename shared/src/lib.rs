//! Shared library for the assignment service Lambda functions.
//!
//! This crate provides the domain logic used by the handler binaries:
//! models, the record store, fuzzy address matching, and calendar event
//! reconciliation.

pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod matcher;
pub mod models;
pub mod reconcile;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use matcher::{best_match, MatchResult, NucleoScorer, Scorer};
pub use models::{Assignment, CalendarEvent, CreateAssignment, NewAssignment};
pub use reconcile::reconcile;
pub use store::{AssignmentFilter, AssignmentStore, PgStore};
