use clap::Parser;

/// This is a persona questionnaire tabulation program.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The questionnaire definition in JSON format: personas, teams,
    /// questions with their weight maps, and optionally the export endpoint. The built-in
    /// questionnaire is used when this option is not provided.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference file containing the summary of a previous tabulation in JSON
    /// format. If provided, personaq will check that the tabulated output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the tabulation will be
    /// written in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) The file containing the collected responses, one row per participant.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input: csv, xlsx or json. See documentation for the
    /// expected layouts.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// If passed as an argument, runs a single questionnaire session interactively on the
    /// terminal instead of tabulating a response file.
    #[clap(long, takes_value = false)]
    pub interactive: bool,

    /// If passed as an argument, every computed result is appended as a row to the configured
    /// spreadsheet endpoint.
    #[clap(long, takes_value = false)]
    pub export: bool,

    /// (url) Overrides the export endpoint from the questionnaire definition.
    #[clap(long, value_parser)]
    pub export_url: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use. The first
    /// worksheet is used when not specified.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
