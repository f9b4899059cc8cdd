//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

pub const HEADER: &str = "Application Number,Title,Abstract,Agent Name,Application Date,Classification,Country Name (Priority),Priority Number,Priority Date,Application Type (ID)";

/// Rows covering mixed case, numeric-looking cells, quoting and empty cells.
pub const ROWS: &[&str] = &[
    r#"US123,Widget,"A widget, for holding things",Smith & Partners,2021-03-04,A47B 88/00,Japan,JP2020-111,2020-03-04,1"#,
    "US456,Gadget,A handheld gadget,Jones IP,2021-05-06,G06F 3/01,Germany,DE102020,2020-05-06,2",
    "EP789,Hydraulic PUMP,Rotary pump with sealed housing,smith & partners,2022-01-10,F04C 2/00,United States,US63000,2021-01-10,1",
    "WO1001,Gadget holder,,Acme Legal,2022-07-21,A47B 81/00,,,,3",
];

/// Write the fixture dataset into a fresh temp dir.
pub fn write_dataset() -> (PathBuf, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("master_patents.csv");
    let mut contents = String::from(HEADER);
    for row in ROWS {
        contents.push('\n');
        contents.push_str(row);
    }
    contents.push('\n');
    std::fs::write(&path, contents).expect("Failed to write dataset");
    (path, dir)
}
