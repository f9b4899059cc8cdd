//! Patent dataset storage.
//!
//! The dataset lives in a single CSV file. It is read once into memory and
//! served as an immutable snapshot until an explicit reload or replace.

mod csv_store;

pub use csv_store::{read_records, write_records, Dataset, DatasetState, RecordStore, StoreError};
