//! Activity logging and reporting.
//!
//! Every sign-in, sign-out and API fetch appends one JSON line to
//! `~/.binwatch/activity.jsonl`. `binwatch history` aggregates it.

pub mod logger;
pub mod reporter;
