use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "proteinbee developers",
    version,
    about = "proteinbee - motif bookkeeping and motif RMSD for protein design pipelines.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print where a motif's residues sit in the designed structure.
    Design(DesignArgs),
    /// List the selectors, segments and selector counts of a motif.
    Inspect(InspectArgs),
    /// Extract the atoms of a motif from a structure file.
    Select(SelectArgs),
    /// Compute the motif RMSD between two structures after superposition.
    Rmsd(RmsdArgs),
    /// Run a batch of motif comparisons described in a TOML file.
    Batch(BatchArgs),
}

/// Arguments for the `design` subcommand.
#[derive(Args, Debug)]
pub struct DesignArgs {
    /// Motif string in native numbering (e.g., A24-42/4/B64-82).
    #[arg(required = true, value_name = "MOTIF", allow_hyphen_values = true)]
    pub motif: String,

    /// Delimiter separating motif components.
    #[arg(short, long, default_value_t = '/', value_name = "CHAR")]
    pub delimiter: char,

    /// Chain of the designed structure.
    #[arg(short, long, default_value_t = 'A', value_name = "CHAR", conflicts_with = "multi_chain")]
    pub chain: char,

    /// Split the motif on '0' segments and letter each designed chain A, B, C, ...
    #[arg(short, long)]
    pub multi_chain: bool,
}

/// Arguments for the `inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Motif string (e.g., A24-42/4/B64-82).
    #[arg(required = true, value_name = "MOTIF", allow_hyphen_values = true)]
    pub motif: String,

    /// Delimiter separating motif components.
    #[arg(short, long, default_value_t = '/', value_name = "CHAR")]
    pub delimiter: char,
}

/// Arguments for the `select` subcommand.
#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Path to the input structure file (.pdb or .cif).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Motif whose atoms are selected.
    #[arg(short, long, required = true, value_name = "MOTIF", allow_hyphen_values = true)]
    pub motif: String,

    /// Keep only these atom names (e.g., N,CA,C,O).
    #[arg(short, long, value_delimiter = ',', value_name = "NAMES")]
    pub atom_types: Vec<String>,

    /// Write the selected atoms to this file (.pdb or .cif).
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

/// Arguments for the `rmsd` subcommand.
#[derive(Args, Debug)]
pub struct RmsdArgs {
    /// Path to the reference structure file.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub reference: PathBuf,

    /// Motif selecting the reference atoms.
    #[arg(long, required = true, value_name = "MOTIF", allow_hyphen_values = true)]
    pub reference_motif: String,

    /// Path to the structure superimposed onto the reference.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub mobile: PathBuf,

    /// Motif selecting the mobile atoms. Defaults to the reference motif
    /// renumbered onto the designed chain.
    #[arg(long, value_name = "MOTIF", allow_hyphen_values = true)]
    pub mobile_motif: Option<String>,

    /// Designed chain used when deriving the mobile motif.
    #[arg(long, default_value_t = 'A', value_name = "CHAR")]
    pub designed_chain: char,

    /// Keep only these atom names in both selections (e.g., N,CA,C,O).
    #[arg(short, long, value_delimiter = ',', value_name = "NAMES")]
    pub atom_types: Vec<String>,
}

/// Arguments for the `batch` subcommand.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Path to the batch file in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub config: PathBuf,

    /// Write the CSV report to this file instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}
