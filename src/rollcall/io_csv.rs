// Primitives for reading CSV files.

use crate::rollcall::*;

fn cell_from_str(s: &str) -> Cell {
    if s.is_empty() {
        Cell::Empty
    } else {
        Cell::Text(s.to_string())
    }
}

/// Reads every line of a CSV file. Lines may have different lengths.
pub fn read_csv_table(path: &str) -> AppResult<Vec<Vec<Cell>>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    read_csv_records(rdr)
}

fn read_csv_records<R: std::io::Read>(rdr: csv::Reader<R>) -> AppResult<Vec<Vec<Cell>>> {
    let mut res: Vec<Vec<Cell>> = Vec::new();
    for (idx, line_r) in rdr.into_records().enumerate() {
        let lineno = idx + 1;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("read_csv_table: lineno: {:?} line: {:?}", lineno, line);
        res.push(line.iter().map(cell_from_str).collect());
    }
    Ok(res)
}
