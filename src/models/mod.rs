//! Data models for the patent dataset.

mod patent;

pub use patent::{Column, PatentRecord};
