// Reader for Excel workbooks, the export format of Google Forms and
// Google Sheets collections.

use log::debug;
use snafu::prelude::*;

use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::quiz::config_reader::SourceSettings;
use crate::quiz::io_common::row_to_response;
use crate::quiz::{
    EmptyExcelSnafu, ExcelWrongCellTypeSnafu, OpeningExcelSnafu, ParsedResponse, QuizCliResult,
};

pub fn read_xlsx_responses(
    path: &str,
    source: &SourceSettings,
    labels: Option<&[String]>,
) -> QuizCliResult<Vec<ParsedResponse>> {
    let wrange = get_range(path, source)?;
    let mut iter = wrange.rows();

    let mut row_offset = 1;
    if source.header_row() {
        let header = iter.next().context(EmptyExcelSnafu {})?;
        debug!("read_xlsx_responses: header: {:?}", header);
        row_offset = 2;
    }

    let mut res: Vec<ParsedResponse> = Vec::new();
    for (idx, row) in iter.enumerate() {
        let lineno = idx + row_offset;
        debug!("read_xlsx_responses: lineno {} row: {:?}", lineno, row);
        let mut cells: Vec<String> = Vec::new();
        for cell in row {
            cells.push(read_cell(cell, lineno)?);
        }
        res.push(row_to_response(&cells, lineno, source, labels)?);
    }
    Ok(res)
}

fn read_cell(cell: &DataType, lineno: usize) -> QuizCliResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Float(f) if f.fract() == 0.0 => Ok(format!("{}", *f as i64)),
        DataType::Int(i) => Ok(format!("{}", i)),
        DataType::Empty => Ok("".to_string()),
        _ => ExcelWrongCellTypeSnafu {
            lineno: lineno as u64,
            content: format!("{:?}", cell),
        }
        .fail(),
    }
}

fn get_range(path: &str, source: &SourceSettings) -> QuizCliResult<calamine::Range<DataType>> {
    let worksheet_name_o = source.worksheet_name.clone();
    debug!(
        "get_range: path: {:?} worksheet: {:?}",
        path, &worksheet_name_o
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = worksheet_name_o {
        let wrange = workbook
            .worksheet_range(&worksheet_name)
            .context(EmptyExcelSnafu {})?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => whatever!("Empty workbook {}", path),
            [(worksheet_name, wrange)] => {
                debug!("get_range: path: {:?} worksheet: {:?}", path, worksheet_name);
                Ok(wrange.clone())
            }
            _ => {
                whatever!(
                    "Several worksheets in {}, the worksheet name must be provided",
                    path
                )
            }
        }
    }
}
