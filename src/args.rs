use clap::Parser;

/// Tabulates the dancefloor talking survey and emits chart-ready summaries.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path) The survey export to analyze.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default csv) The type of the input file: csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (first worksheet if empty) When using an Excel file, indicates the name of the worksheet
    /// holding the responses.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    /// (list, all if empty) The report sections to compute: demographics, talking, impact,
    /// quiet, yapping.
    #[clap(short, long, value_parser)]
    pub section: Option<Vec<String>>,

    /// (file path, 'stdout' or empty) Where the JSON summary is written. Standard output when
    /// not specified.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference summary in JSON format. If provided, yapstat will check that
    /// the tabulated output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (default talk-frequency) The demographic axis of the impact breakdown tables: age,
    /// gender, attendance, experience, talk-frequency, talk-duration or perception.
    #[clap(long, value_parser)]
    pub breakdown: Option<String>,

    /// (default age) The demographic axis used to group the quiet-importance and yapping
    /// tables.
    #[clap(long, value_parser)]
    pub group_by: Option<String>,

    /// Talk frequency for an ad-hoc Yapping Factor calculation. Requires --duration.
    #[clap(long, value_parser)]
    pub frequency: Option<String>,

    /// Talk duration for an ad-hoc Yapping Factor calculation. Requires --frequency.
    #[clap(long, value_parser)]
    pub duration: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
