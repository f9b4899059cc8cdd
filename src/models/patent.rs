//! Patent record and column definitions.
//!
//! Every field is kept as text. Application numbers, dates and type IDs are
//! compared and exported exactly as they appear in the source CSV.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single patent application, one row of the dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatentRecord {
    #[serde(rename = "Application Number", default)]
    pub application_number: String,
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Abstract", default)]
    pub abstract_text: String,
    #[serde(rename = "Agent Name", default)]
    pub agent_name: String,
    #[serde(rename = "Application Date", default)]
    pub application_date: String,
    #[serde(rename = "Classification", default)]
    pub classification: String,
    #[serde(rename = "Country Name (Priority)", default)]
    pub priority_country: String,
    #[serde(rename = "Priority Number", default)]
    pub priority_number: String,
    #[serde(rename = "Priority Date", default)]
    pub priority_date: String,
    #[serde(rename = "Application Type (ID)", default)]
    pub application_type: String,
}

impl PatentRecord {
    /// Get the text of a column.
    pub fn get(&self, column: Column) -> &str {
        match column {
            Column::ApplicationNumber => &self.application_number,
            Column::Title => &self.title,
            Column::Abstract => &self.abstract_text,
            Column::AgentName => &self.agent_name,
            Column::ApplicationDate => &self.application_date,
            Column::Classification => &self.classification,
            Column::PriorityCountry => &self.priority_country,
            Column::PriorityNumber => &self.priority_number,
            Column::PriorityDate => &self.priority_date,
            Column::ApplicationType => &self.application_type,
        }
    }

    /// All column values in canonical column order.
    pub fn values(&self) -> [&str; Column::COUNT] {
        Column::ALL.map(|c| self.get(c))
    }
}

/// A named column of the patent dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    ApplicationNumber,
    Title,
    Abstract,
    AgentName,
    ApplicationDate,
    Classification,
    PriorityCountry,
    PriorityNumber,
    PriorityDate,
    ApplicationType,
}

impl Column {
    pub const COUNT: usize = 10;

    /// Canonical column order, matching the CSV header order.
    pub const ALL: [Column; Column::COUNT] = [
        Column::ApplicationNumber,
        Column::Title,
        Column::Abstract,
        Column::AgentName,
        Column::ApplicationDate,
        Column::Classification,
        Column::PriorityCountry,
        Column::PriorityNumber,
        Column::PriorityDate,
        Column::ApplicationType,
    ];

    /// Header name as it appears in `master_patents.csv`.
    pub fn header(self) -> &'static str {
        match self {
            Column::ApplicationNumber => "Application Number",
            Column::Title => "Title",
            Column::Abstract => "Abstract",
            Column::AgentName => "Agent Name",
            Column::ApplicationDate => "Application Date",
            Column::Classification => "Classification",
            Column::PriorityCountry => "Country Name (Priority)",
            Column::PriorityNumber => "Priority Number",
            Column::PriorityDate => "Priority Date",
            Column::ApplicationType => "Application Type (ID)",
        }
    }

    /// Query-string / form parameter name.
    pub fn param(self) -> &'static str {
        match self {
            Column::ApplicationNumber => "application_number",
            Column::Title => "title",
            Column::Abstract => "abstract",
            Column::AgentName => "agent_name",
            Column::ApplicationDate => "application_date",
            Column::Classification => "classification",
            Column::PriorityCountry => "priority_country",
            Column::PriorityNumber => "priority_number",
            Column::PriorityDate => "priority_date",
            Column::ApplicationType => "application_type",
        }
    }

    /// Label shown next to the filter input.
    pub fn label(self) -> &'static str {
        match self {
            Column::ApplicationNumber => "Application #",
            Column::Title => "Title Keyword",
            Column::Abstract => "Abstract",
            Column::AgentName => "Agent Name",
            Column::ApplicationDate => "Application Date",
            Column::Classification => "Classification",
            Column::PriorityCountry => "Priority Country",
            Column::PriorityNumber => "Priority Number",
            Column::PriorityDate => "Priority Date",
            Column::ApplicationType => "Application Type",
        }
    }

    /// Resolve a column from either its parameter name or its CSV header.
    /// Matching is case-insensitive.
    pub fn lookup(name: &str) -> Option<Column> {
        let name = name.trim();
        Column::ALL.into_iter().find(|c| {
            c.param().eq_ignore_ascii_case(name) || c.header().eq_ignore_ascii_case(name)
        })
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}
