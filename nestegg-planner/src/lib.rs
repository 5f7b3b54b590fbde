//! nestegg-planner: plan/goal controller, persistence, and CSV backup.
//!
//! The engine in `nestegg-core` is pure; this crate decides when it runs and
//! stores what it returns.

pub mod backup;
pub mod controller;
pub mod error;
pub mod store;

pub use backup::{export_goals_csv, import_goals_csv};
pub use controller::{Clock, Contribution, GoalPatch, NewGoal, Planner};
pub use error::PlannerError;
pub use store::{JsonStore, MemoryStore, Snapshot, Store};
