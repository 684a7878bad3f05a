use calamine::{open_workbook_auto, DataType, Reader};

use crate::rollcall::*;

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Maps a workbook cell onto an engine cell.
///
/// Time-formatted cells hold a fraction of a day and are converted to minutes.
pub fn cell_from_calamine(cell: &DataType) -> Cell {
    match cell {
        DataType::String(s) if s.is_empty() => Cell::Empty,
        DataType::String(s) => Cell::Text(s.clone()),
        DataType::Float(f) => Cell::Number(*f),
        DataType::Int(i) => Cell::Number(*i as f64),
        DataType::Bool(b) => Cell::Text(b.to_string()),
        DataType::DateTime(f) => Cell::Number(f * MINUTES_PER_DAY),
        DataType::Error(e) => {
            warn!("cell_from_calamine: error cell {:?}", e);
            Cell::Empty
        }
        DataType::Empty => Cell::Empty,
        #[allow(unreachable_patterns)]
        _ => Cell::Empty,
    }
}

/// Reads the first sheet of a workbook.
pub fn read_excel_table(path: &str) -> AppResult<Vec<Vec<Cell>>> {
    let mut workbook = open_workbook_auto(path).context(OpeningExcelSnafu { path })?;
    let wrange = workbook
        .worksheet_range_at(0)
        .context(EmptyExcelSnafu { path })?
        .context(OpeningExcelSnafu { path })?;
    debug!("read_excel_table: path: {:?} size: {:?}", path, wrange.get_size());

    let mut res: Vec<Vec<Cell>> = Vec::new();
    for (idx, row) in wrange.rows().enumerate() {
        debug!("read_excel_table: idx: {:?} row: {:?}", idx, row);
        res.push(row.iter().map(cell_from_calamine).collect());
    }
    Ok(res)
}
