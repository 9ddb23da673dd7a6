// Reading the survey from an Excel workbook, as exported by the usual forms
// providers.

use calamine::{open_workbook, DataType, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;

use crate::report::*;

pub fn read_excel_survey(
    path: &str,
    worksheet: Option<&str>,
) -> ReportResult<Vec<ParsedRespondent>> {
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;
    let wrange = match worksheet {
        Some(name) => workbook
            .worksheet_range(name)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })?,
        None => workbook
            .worksheet_range_at(0)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })?,
    };

    let mut iter = wrange.rows();
    let header = iter.next().context(EmptyExcelSnafu {})?;
    let mut headers: Vec<String> = Vec::new();
    for cell in header {
        headers.push(read_cell(cell, 1)?);
    }
    debug!("read_excel_survey: headers: {:?}", headers);

    let mut res: Vec<ParsedRespondent> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let lineno = idx + 2;
        let mut cells: Vec<(String, String)> = Vec::new();
        for (name, cell) in headers.iter().zip(row.iter()) {
            cells.push((name.clone(), read_cell(cell, lineno as u64)?));
        }
        debug!("read_excel_survey: lineno: {:?} cells: {:?}", lineno, cells);
        res.push(ParsedRespondent { lineno, cells });
    }
    Ok(res)
}

// Numeric cells carry the Likert levels and the role flags; they are
// rendered without a decimal point so they match the CSV representation.
fn read_cell(cell: &DataType, lineno: u64) -> ReportResult<String> {
    match cell {
        DataType::String(s) => Ok(s.trim().to_string()),
        DataType::Float(f) if f.fract() == 0.0 => Ok(format!("{}", *f as i64)),
        DataType::Float(f) => Ok(format!("{}", f)),
        DataType::Int(i) => Ok(format!("{}", i)),
        DataType::Bool(b) => Ok(if *b { "1" } else { "0" }.to_string()),
        DataType::Empty => Ok("".to_string()),
        _ => Err(ReportError::ExcelWrongCellType {
            lineno,
            content: format!("{:?}", cell),
        }),
    }
}
