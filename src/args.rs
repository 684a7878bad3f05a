use clap::{Parser, Subcommand};

/// This is an attendance reporting program for online classes.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, default rollcall.json) The JSON file holding the roster and the report settings.
    /// It is created on the first change if it does not exist.
    #[clap(short, long, value_parser, global = true, default_value = "rollcall.json")]
    pub state: String,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false, global = true)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Manage the list of students.
    #[clap(subcommand)]
    Roster(RosterCommand),
    /// Show or change the report settings.
    #[clap(subcommand)]
    Settings(SettingsCommand),
    /// Process a meeting attendance export and write the report.
    Process(ProcessArgs),
}

#[derive(Subcommand, Debug, Clone)]
pub enum RosterCommand {
    /// (file path) Add the students of a CSV or Excel file. Existing students are kept.
    Import {
        #[clap(value_parser)]
        file: String,
    },
    /// Add a single student.
    Add {
        #[clap(value_parser)]
        name: String,
    },
    /// Remove a student, using the name as shown by `roster list`.
    Remove {
        #[clap(value_parser)]
        name: String,
    },
    /// Remove all the students. Requires --yes.
    Clear {
        #[clap(long, takes_value = false)]
        yes: bool,
    },
    /// Print the students in alphabetical order.
    List,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SettingsCommand {
    /// Print the current settings.
    Show,
    /// Change some settings. Passing an empty string clears a field.
    Set(SettingsValues),
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct SettingsValues {
    #[clap(long, value_parser)]
    pub batch_name: Option<String>,
    /// (YYYY-MM-DD) The date printed on the report. Today if not set.
    #[clap(long, value_parser)]
    pub report_date: Option<String>,
    /// The name of the trainer. The trainer does not appear in the attendance.
    #[clap(long, value_parser)]
    pub trainer_name: Option<String>,
    #[clap(long, value_parser)]
    pub coordinators: Option<String>,
    #[clap(long, value_parser)]
    pub report_creator: Option<String>,
    /// Link to the recording of the session.
    #[clap(long, value_parser)]
    pub tldv_link: Option<String>,
    #[clap(long, value_parser)]
    pub session_summary: Option<String>,
    /// (minutes, default 48) Minimum time in the call to be counted as present.
    #[clap(long, value_parser)]
    pub threshold: Option<f64>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ProcessArgs {
    /// (file path) The attendance export, in CSV or Excel format.
    #[clap(value_parser)]
    pub input: String,

    /// (file path, 'stdout' or empty) Where to write the report. Defaults to the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference report. If provided, the generated report must match it.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (YYYY-MM-DD) The date of the session. Saved in the settings.
    #[clap(long, value_parser)]
    pub report_date: Option<String>,

    /// Link to the recording of the session. Saved in the settings.
    #[clap(long, value_parser)]
    pub tldv_link: Option<String>,

    /// Summary of the session. Saved in the settings.
    #[clap(long, value_parser)]
    pub session_summary: Option<String>,
}
