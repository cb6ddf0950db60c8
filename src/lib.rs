//! Small terminal habit tracker. Habits are marked done per calendar day, shown over a rolling
//! week, and scored by their current streak. Everything lives in one JSON document on disk that
//! can be exported and imported as is.
//!

pub mod cli;
pub mod error;
pub mod fs;
pub mod ledger;
pub mod streak;
pub mod utils;
