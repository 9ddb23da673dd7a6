// Primitives for reading the survey CSV export.

use csv::Reader;
use log::debug;
use snafu::prelude::*;

use crate::report::*;

pub fn read_csv_survey(path: &str) -> ReportResult<Vec<ParsedRespondent>> {
    let mut rdr = Reader::from_path(path).context(OpeningCsvSnafu { path })?;
    let headers: Vec<String> = rdr
        .headers()
        .context(OpeningCsvSnafu { path })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    debug!("read_csv_survey: headers: {:?}", headers);

    let mut res: Vec<ParsedRespondent> = Vec::new();
    for (idx, record_r) in rdr.records().enumerate() {
        // The header occupies the first line of the file.
        let lineno = idx + 2;
        let record = record_r.context(CsvRowSnafu { lineno })?;
        let cells: Vec<(String, String)> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(|v| v.trim().to_string()))
            .collect();
        debug!("read_csv_survey: lineno: {:?} cells: {:?}", lineno, cells);
        res.push(ParsedRespondent { lineno, cells });
    }
    Ok(res)
}
