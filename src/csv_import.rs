//! CSV upload parsing.
//!
//! Turns a spreadsheet export into candidate rows for the bulk importer. The
//! first record is the header; columns are matched case-insensitively against
//! the five employee fields and anything else is ignored. Cells are trimmed,
//! so padded exports import cleanly. Rows with nothing in
//! any recognized column are dropped here, the way the upload form drops them.

use crate::validation::CandidateEmployee;
use serde_json::{Map, Value};
use std::io::Read;
use thiserror::Error;

const FIELDS: [&str; 5] = ["name", "email", "phone", "department", "salary"];

#[derive(Debug, Error)]
pub enum CsvImportError {
    #[error("Malformed CSV: {0}")]
    Parse(#[from] csv::Error),
    #[error("CSV header must name at least one of the name, email, phone, department or salary columns")]
    UnrecognizedHeader,
}

/// Parse CSV text into candidate rows, preserving input order.
pub fn parse_candidates<R: Read>(input: R) -> Result<Vec<CandidateEmployee>, CsvImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input);

    let columns: Vec<(usize, &'static str)> = reader
        .headers()?
        .iter()
        .enumerate()
        .filter_map(|(index, header)| {
            FIELDS
                .iter()
                .find(|field| header.eq_ignore_ascii_case(field))
                .map(|field| (index, *field))
        })
        .collect();

    if columns.is_empty() {
        return Err(CsvImportError::UnrecognizedHeader);
    }

    let mut candidates = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = Map::new();
        for (index, field) in &columns {
            if let Some(cell) = record.get(*index).filter(|cell| !cell.is_empty()) {
                row.entry(field.to_string())
                    .or_insert_with(|| Value::String(cell.to_string()));
            }
        }

        let candidate = CandidateEmployee::from_value(&Value::Object(row));
        if !candidate.is_blank() {
            candidates.push(candidate);
        }
    }

    log::debug!("parsed {} candidate rows from CSV upload", candidates.len());
    Ok(candidates)
}
