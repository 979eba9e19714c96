use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::Deserialize;

#[derive(Parser, Debug)]
#[command(
    name = "license-gen",
    about = "Gather the license text of every project dependency into text, JSON, CSV and HTML reports",
    version
)]
pub struct Cli {
    /// Config file [default: <directory>/.license-gen/config.toml, fallback ~/.config/license-gen/config.toml]
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print the summary line
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve the license text of every dependency and write the reports
    Generate(GenerateArgs),
    /// Convert a licenses.json file into other formats
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Project directory whose node_modules is scanned
    #[arg(long, default_value = ".")]
    pub directory: PathBuf,

    /// Read dependencies from a license-checker/nlf JSON document instead of node_modules
    #[arg(long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// JSON cache file ({ name: { version: text } }) for looking up missing licenses
    #[arg(long = "cache-file", value_name = "FILE")]
    pub cache_file: Option<PathBuf>,

    /// Comma separated package names to ignore
    #[arg(long, value_name = "NAME1,NAME2")]
    pub ignore: Option<String>,

    /// Only production dependencies
    #[arg(long)]
    pub production: bool,

    /// Verify an online link to each license file and add it to licenses.json
    #[arg(long)]
    pub links: bool,

    /// Use the README as a fallback when no LICENSE file is available
    #[arg(long)]
    pub readme: bool,

    /// Like --readme, but keep only the README's license section
    #[arg(long = "readme-parse")]
    pub readme_parse: bool,

    /// Try downloading LICENSE files from the package's GitHub repository
    #[arg(long)]
    pub download: bool,

    /// Output formats [default: text,json]
    #[arg(long, value_delimiter = ',', value_name = "FORMAT")]
    pub formats: Vec<OutputFormat>,

    /// Base name of the CSV and HTML outputs [default: output]
    #[arg(long)]
    pub name: Option<String>,

    /// Directory the reports are written to [default: .]
    #[arg(long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// licenses.json file produced by `generate`
    #[arg(long, value_name = "FILE", default_value = "licenses.json")]
    pub input: PathBuf,

    /// Output formats
    #[arg(long, value_delimiter = ',', value_name = "FORMAT", default_value = "csv")]
    pub formats: Vec<OutputFormat>,

    /// Base name of the outputs
    #[arg(long, default_value = "output")]
    pub name: String,

    /// Directory the outputs are written to
    #[arg(long = "out-dir", value_name = "DIR", default_value = ".")]
    pub out_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
    Csv,
    Html,
}
