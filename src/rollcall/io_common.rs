use std::path::Path;

use crate::rollcall::{io_csv::read_csv_table, io_excel::read_excel_table, *};

/// The file formats accepted for rosters and attendance exports.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TableFormat {
    Csv,
    Workbook,
}

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
        .to_string()
}

pub fn detect_format(path: &str) -> AppResult<TableFormat> {
    let extension = Path::new(path)
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "csv" => Ok(TableFormat::Csv),
        "xlsx" | "xls" | "xlsm" | "xlsb" | "ods" => Ok(TableFormat::Workbook),
        _ => UnsupportedFormatSnafu { extension }.fail(),
    }
}

/// Reads all the rows of a CSV file or of the first sheet of a workbook.
pub fn read_table(path: &str) -> AppResult<Vec<Vec<Cell>>> {
    let format = detect_format(path)?;
    info!(
        "Attempting to read {:?} as {:?}",
        simplify_file_name(path),
        format
    );
    let rows = match format {
        TableFormat::Csv => read_csv_table(path)?,
        TableFormat::Workbook => read_excel_table(path)?,
    };
    debug!("read_table: {} rows", rows.len());
    Ok(rows)
}
