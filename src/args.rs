use clap::{Parser, Subcommand};

/// Frequency summaries of survey exports, for the survey dashboard.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file. Without it, the defaults for the
    /// Education Landscape and Organisational Adoption surveys are used.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (directory, optional) The directory holding the exports and the schemas. Setting this
    /// option overrides the directory that may be specified with the --config option.
    #[clap(short, long, value_parser)]
    pub data_dir: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the JSON output is written to the given
    /// location instead of the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file in JSON format. If provided, surveydash will check that
    /// the output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Lists the modules and countries for which an export is available.
    Manifest,
    /// Prints the questions of each schema section.
    Schema {
        /// (module code, optional) Only this module. All the configured modules otherwise.
        #[clap(short, long, value_parser)]
        module: Option<String>,
    },
    /// Prints the answer frequencies of one export.
    Summary {
        /// (module code, optional) Defaults to the configured module, else the first one found.
        #[clap(short, long, value_parser)]
        module: Option<String>,
        /// (country code or ALL, optional) Defaults to the configured country, else the first
        /// one found for the module.
        #[clap(long, value_parser)]
        country: Option<String>,
        /// (section key, optional) Only the questions of this schema section.
        #[clap(short, long, value_parser)]
        section: Option<String>,
        /// (text, optional) Only the questions whose title or identifier contains this text.
        #[clap(long, value_parser)]
        search: Option<String>,
        /// Also reports how the questions distribute over the schema sections.
        #[clap(long, takes_value = false)]
        grouped: bool,
    },
}
