//! Patent Portal - passcode-gated search over a CSV of patent records.
//!
//! The dataset is loaded once into memory and served as an immutable
//! snapshot. Filtering is a pure function over that snapshot; results can be
//! browsed on the dashboard or downloaded as a spreadsheet.

pub mod auth;
pub mod config;
pub mod export;
pub mod models;
pub mod repository;
pub mod scrapers;
pub mod search;
pub mod server;
