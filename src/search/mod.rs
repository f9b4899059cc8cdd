//! Record filtering.
//!
//! A [`Filter`] holds per-column substring queries, combined with AND, plus an
//! optional global query that matches when any column contains it. Matching is
//! literal and case-insensitive; numbers and dates are compared as text.
//! [`apply`] is a pure function over a slice of records and keeps the input
//! order.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use thiserror::Error;

use crate::models::{Column, PatentRecord};

/// Query parameter carrying the all-columns search.
pub const GLOBAL_PARAM: &str = "q";

/// Default number of rows shown on the dashboard.
pub const DEFAULT_DISPLAY_LIMIT: usize = 50;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SearchError {
    #[error("unknown filter column: {0}")]
    UnknownColumn(String),
    #[error("filter must look like COLUMN=TEXT, got: {0}")]
    MalformedPair(String),
    #[error("column filtered more than once: {0}")]
    DuplicateColumn(String),
}

/// A lowercased query term. Whitespace is part of the query.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Term {
    raw: String,
    folded: String,
}

impl Term {
    fn new(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        Some(Self {
            raw: raw.to_string(),
            folded: raw.to_lowercase(),
        })
    }

    fn matches(&self, text: &str) -> bool {
        text.to_lowercase().contains(&self.folded)
    }
}

/// A set of active queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    columns: BTreeMap<Column, Term>,
    global: Option<Term>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column query. An empty query clears the column instead.
    pub fn with_column(mut self, column: Column, query: &str) -> Self {
        self.set_column(column, query);
        self
    }

    /// Set the all-columns query. Empty clears it.
    pub fn with_global(mut self, query: &str) -> Self {
        self.global = Term::new(query);
        self
    }

    pub fn set_column(&mut self, column: Column, query: &str) {
        match Term::new(query) {
            Some(term) => {
                self.columns.insert(column, term);
            }
            None => {
                self.columns.remove(&column);
            }
        }
    }

    /// Build a filter from query-string style parameters.
    ///
    /// Keys name a column by parameter name or CSV header; `q` is the global
    /// query. Unknown keys, and two keys naming the same column, are rejected.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, SearchError> {
        let mut filter = Self::new();
        let mut seen = BTreeSet::new();
        for (key, value) in params {
            if key == GLOBAL_PARAM {
                filter.global = Term::new(value);
                continue;
            }
            let column =
                Column::lookup(key).ok_or_else(|| SearchError::UnknownColumn(key.clone()))?;
            if !seen.insert(column) {
                return Err(SearchError::DuplicateColumn(column.param().to_string()));
            }
            filter.set_column(column, value);
        }
        Ok(filter)
    }

    /// Build a filter from `COLUMN=TEXT` pairs, as given on the command line.
    pub fn from_pairs<I, S>(pairs: I, global: Option<&str>) -> Result<Self, SearchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filter = Self::new();
        let mut seen = BTreeSet::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| SearchError::MalformedPair(pair.to_string()))?;
            let column = Column::lookup(key)
                .ok_or_else(|| SearchError::UnknownColumn(key.trim().to_string()))?;
            if !seen.insert(column) {
                return Err(SearchError::DuplicateColumn(column.param().to_string()));
            }
            filter.set_column(column, value);
        }
        if let Some(global) = global {
            filter.global = Term::new(global);
        }
        Ok(filter)
    }

    /// Whether no query is active.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty() && self.global.is_none()
    }

    /// The active query for a column, as typed.
    pub fn column(&self, column: Column) -> Option<&str> {
        self.columns.get(&column).map(|t| t.raw.as_str())
    }

    /// The active global query, as typed.
    pub fn global(&self) -> Option<&str> {
        self.global.as_ref().map(|t| t.raw.as_str())
    }

    /// Active filters as query-string pairs, for building export links.
    pub fn to_params(&self) -> Vec<(&'static str, &str)> {
        let mut params: Vec<(&'static str, &str)> = self
            .columns
            .iter()
            .map(|(c, t)| (c.param(), t.raw.as_str()))
            .collect();
        if let Some(ref global) = self.global {
            params.push((GLOBAL_PARAM, global.raw.as_str()));
        }
        params
    }

    /// Test a single record.
    pub fn matches(&self, record: &PatentRecord) -> bool {
        let columns_match = self
            .columns
            .iter()
            .all(|(column, term)| term.matches(record.get(*column)));
        if !columns_match {
            return false;
        }
        match self.global {
            Some(ref term) => Column::ALL.iter().any(|c| term.matches(record.get(*c))),
            None => true,
        }
    }
}

/// Apply a filter, keeping dataset order.
pub fn apply<'a>(records: &'a [PatentRecord], filter: &Filter) -> Vec<&'a PatentRecord> {
    if filter.is_empty() {
        return records.iter().collect();
    }
    records.iter().filter(|r| filter.matches(r)).collect()
}
