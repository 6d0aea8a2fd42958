// Primitives for reading CSV response files.

use log::debug;
use snafu::prelude::*;

use crate::quiz::config_reader::SourceSettings;
use crate::quiz::io_common::row_to_response;
use crate::quiz::{CsvLineParseSnafu, CsvOpenSnafu, ParsedResponse, QuizCliResult};

pub fn read_csv_responses(
    path: &str,
    source: &SourceSettings,
    labels: Option<&[String]>,
) -> QuizCliResult<Vec<ParsedResponse>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu {})?;
    let mut records = rdr.into_records();

    let mut row_offset = 1;
    if source.header_row() {
        let _ = records.next();
        row_offset = 2;
    }

    let mut res: Vec<ParsedResponse> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        let lineno = idx + row_offset;
        let line = line_r.context(CsvLineParseSnafu {})?;
        debug!("read_csv_responses: lineno {} row: {:?}", lineno, line);
        let cells: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        res.push(row_to_response(&cells, lineno, source, labels)?);
    }
    Ok(res)
}
