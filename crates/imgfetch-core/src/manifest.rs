//! Manifest workbook parsing: directory columns to URL lists.
//!
//! The first worksheet's header row names one destination directory per
//! column; every later string cell in that column is one URL of the
//! directory. Columns that end up with zero URLs are omitted.

use std::collections::HashMap;
use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use crate::error::SheetError;

/// Parses uploaded xlsx bytes into the directory-to-URLs mapping.
///
/// Only string cells are considered, matching the upload format; numeric or
/// formula cells are ignored. A workbook without a worksheet or without a
/// header row is rejected.
pub fn mapping_from_workbook_bytes(
    bytes: &[u8],
) -> Result<HashMap<String, Vec<String>>, SheetError> {
    let mut workbook = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SheetError::NoWorksheet)??;

    let rows: Vec<Vec<Option<String>>> = range
        .rows()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::String(s) => Some(s.clone()),
                    _ => None,
                })
                .collect()
        })
        .collect();

    column_mapping(&rows)
}

/// Column extraction over pre-extracted string cells: row 0 is the header,
/// each later row contributes at most one URL per column.
pub(crate) fn column_mapping(
    rows: &[Vec<Option<String>>],
) -> Result<HashMap<String, Vec<String>>, SheetError> {
    let Some(header) = rows.first() else {
        return Err(SheetError::MissingHeader);
    };

    let mut mapping = HashMap::new();
    for (col, name) in header.iter().enumerate() {
        let Some(name) = name else { continue };
        if name.trim().is_empty() {
            continue;
        }

        let mut urls = Vec::new();
        for row in &rows[1..] {
            if let Some(Some(cell)) = row.get(col) {
                let url = cell.trim();
                if !url.is_empty() {
                    urls.push(url.to_string());
                }
            }
        }

        if !urls.is_empty() {
            mapping.insert(name.clone(), urls);
        }
    }

    Ok(mapping)
}
